//! End-to-end billing flows through the command handlers against an
//! in-memory database.

use haveli_db::{Database, DbConfig, NewProduct};
use haveli_terminal::commands::{cart, insights, product, sale, settings};
use haveli_terminal::error::ErrorCode;
use haveli_terminal::session::SessionState;

async fn setup() -> (Database, SessionState) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    (db, SessionState::new())
}

async fn seed(db: &Database, name: &str, price_paise: i64, stock: i64) -> String {
    db.products()
        .insert(NewProduct {
            name: name.to_string(),
            category: "General".to_string(),
            cost_price_paise: price_paise / 2,
            selling_price_paise: price_paise,
            current_stock: stock,
            min_stock_level: 2,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn add_then_finalize_decrements_stock() {
    let (db, session) = setup().await;
    let id = seed(&db, "Switch", 5000, 5).await;

    // 3 x Rs. 50.00
    let view = cart::add_to_cart(&db, &session, "Switch", 3).await.unwrap();
    assert_eq!(view.total_paise, 15000);
    assert_eq!(view.total_display, "150.00");

    let resp = sale::finalize_bill(&db, &session, None, "cash").await.unwrap();
    assert_eq!(resp.total_paise, 15000);
    assert_eq!(resp.item_count, 1);
    assert!(resp.whatsapp_link.is_none());

    // Stock 5 -> 2, cart cleared, last sale retained
    let p = db.products().get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(p.current_stock, 2);
    assert!(session.with_session(|s| s.cart.is_empty()));
    assert!(session.with_session(|s| s.last_sale.is_some()));
}

#[tokio::test]
async fn add_beyond_stock_is_rejected() {
    let (db, session) = setup().await;
    seed(&db, "Switch", 5000, 2).await;

    let err = cart::add_to_cart(&db, &session, "Switch", 3).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert!(session.with_session(|s| s.cart.is_empty()));
}

#[tokio::test]
async fn merge_add_checks_combined_quantity() {
    let (db, session) = setup().await;
    seed(&db, "Switch", 5000, 5).await;

    cart::add_to_cart(&db, &session, "Switch", 3).await.unwrap();
    let err = cart::add_to_cart(&db, &session, "Switch", 3).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    // Existing line untouched
    let view = cart::get_cart(&session);
    assert_eq!(view.lines[0].quantity, 3);
}

#[tokio::test]
async fn finalize_empty_cart_is_rejected() {
    let (db, session) = setup().await;

    let err = sale::finalize_bill(&db, &session, None, "cash").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CartError);
}

#[tokio::test]
async fn finalize_with_unknown_mode_is_rejected() {
    let (db, session) = setup().await;
    seed(&db, "Switch", 5000, 5).await;
    cart::add_to_cart(&db, &session, "Switch", 1).await.unwrap();

    let err = sale::finalize_bill(&db, &session, None, "cheque").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn stale_cart_conflict_keeps_bill_for_retry() {
    let (db, session) = setup().await;
    let id = seed(&db, "Switch", 5000, 5).await;

    cart::add_to_cart(&db, &session, "Switch", 4).await.unwrap();

    // A concurrent sale drains the stock after the cart was built.
    db.products().adjust_stock(&id, -3).await.unwrap();

    let err = sale::finalize_bill(&db, &session, None, "cash").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::StockConflict);

    // Nothing was written and the bill survives for adjustment.
    assert_eq!(db.sales().count().await.unwrap(), 0);
    assert_eq!(cart::get_cart(&session).line_count, 1);

    // Operator trims the line and retries successfully.
    cart::edit_cart_line(&session, "Switch", 2, 5000).unwrap();
    let resp = sale::finalize_bill(&db, &session, None, "cash").await.unwrap();
    assert_eq!(resp.total_paise, 10000);
}

#[tokio::test]
async fn void_last_sale_restores_stock() {
    let (db, session) = setup().await;
    let id = seed(&db, "Switch", 5000, 10).await;

    cart::add_to_cart(&db, &session, "Switch", 3).await.unwrap();
    sale::finalize_bill(&db, &session, None, "cash").await.unwrap();

    assert_eq!(
        db.products().get_by_id(&id).await.unwrap().unwrap().current_stock,
        7
    );

    sale::void_last_sale(&db, &session).await.unwrap();

    assert_eq!(
        db.products().get_by_id(&id).await.unwrap().unwrap().current_stock,
        10
    );

    // The shortcut is spent; a second press is NotFound.
    let err = sale::void_last_sale(&db, &session).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn double_void_by_id_is_not_found() {
    let (db, session) = setup().await;
    seed(&db, "Switch", 5000, 10).await;

    cart::add_to_cart(&db, &session, "Switch", 2).await.unwrap();
    let resp = sale::finalize_bill(&db, &session, None, "upi").await.unwrap();

    sale::void_sale_by_id(&db, &resp.sale_id).await.unwrap();
    let err = sale::void_sale_by_id(&db, &resp.sale_id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn receipt_and_whatsapp_link_for_phone_customer() {
    let (db, session) = setup().await;
    seed(&db, "Switch", 5000, 10).await;

    cart::add_to_cart(&db, &session, "Switch", 2).await.unwrap();
    let resp = sale::finalize_bill(&db, &session, Some("9825012345"), "upi")
        .await
        .unwrap();

    let link = resp.whatsapp_link.expect("phone customer gets a link");
    assert!(link.starts_with("https://wa.me/919825012345?text="));

    let last = sale::last_receipt(&session).unwrap();
    let text = String::from_utf8(last.document).unwrap();
    assert!(text.contains("HAVELI ELECTRICALS"));
    assert!(text.contains("Switch"));
    assert!(text.contains("TOTAL AMOUNT: Rs. 100.00"));
    assert!(text.contains(&resp.short_id));
}

#[tokio::test]
async fn invalid_phone_rejected_before_commit() {
    let (db, session) = setup().await;
    let id = seed(&db, "Switch", 5000, 10).await;

    cart::add_to_cart(&db, &session, "Switch", 2).await.unwrap();
    let err = sale::finalize_bill(&db, &session, Some("98-25"), "cash")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // Nothing committed
    assert_eq!(db.sales().count().await.unwrap(), 0);
    assert_eq!(
        db.products().get_by_id(&id).await.unwrap().unwrap().current_stock,
        10
    );
}

#[tokio::test]
async fn settings_flow_updates_receipt_header() {
    let (db, session) = setup().await;
    seed(&db, "Switch", 5000, 10).await;

    settings::save_settings(
        &db,
        settings::SettingsInput {
            shop_name: "Sharma Electricals".to_string(),
            shop_address: "12 Market Road".to_string(),
            shop_contact: "0281-1234567".to_string(),
            upi_id: "sharma@upi".to_string(),
            tax_rate_bps: 0,
        },
    )
    .await
    .unwrap();

    cart::add_to_cart(&db, &session, "Switch", 1).await.unwrap();
    sale::finalize_bill(&db, &session, None, "cash").await.unwrap();

    let last = sale::last_receipt(&session).unwrap();
    let text = String::from_utf8(last.document).unwrap();
    assert!(text.contains("SHARMA ELECTRICALS"));
    assert!(text.contains("Pay via UPI: sharma@upi"));
}

#[tokio::test]
async fn insights_reflect_committed_and_voided_sales() {
    let (db, session) = setup().await;
    seed(&db, "Switch", 5000, 50).await;
    seed(&db, "Bulb", 2000, 50).await;

    cart::add_to_cart(&db, &session, "Switch", 2).await.unwrap();
    sale::finalize_bill(&db, &session, None, "cash").await.unwrap();

    cart::add_to_cart(&db, &session, "Bulb", 3).await.unwrap();
    let bulb_sale = sale::finalize_bill(&db, &session, None, "upi").await.unwrap();

    let summary = insights::sales_summary(&db).await.unwrap();
    assert_eq!(summary.sale_count, 2);
    assert_eq!(summary.revenue_paise, 16000);

    // Voiding removes the sale from every aggregate.
    sale::void_sale_by_id(&db, &bulb_sale.sale_id).await.unwrap();
    let summary = insights::sales_summary(&db).await.unwrap();
    assert_eq!(summary.sale_count, 1);
    assert_eq!(summary.revenue_paise, 10000);

    let top = insights::top_products(&db, 5).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].name, "Switch");
}

#[tokio::test]
async fn inventory_commands_round_trip() {
    let (db, _session) = setup().await;

    let added = product::add_product(
        &db,
        product::ProductInput {
            name: "Ceiling Fan".to_string(),
            category: "Fans".to_string(),
            cost_price_paise: 110000,
            selling_price_paise: 165000,
            current_stock: 1,
            min_stock_level: 2,
        },
    )
    .await
    .unwrap();
    assert!(added.low_stock);

    let restocked = product::restock_product(&db, &added.id, 5).await.unwrap();
    assert_eq!(restocked.current_stock, 6);
    assert!(!restocked.low_stock);

    let low = product::low_stock_report(&db, 3).await.unwrap();
    assert!(low.is_empty());

    product::delete_product(&db, &added.id).await.unwrap();
    assert!(product::list_products(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_ids_rejected_before_database() {
    let (db, _session) = setup().await;
    seed(&db, "Switch", 5000, 5).await;

    let err = product::restock_product(&db, "not-a-uuid", 3).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = product::delete_product(&db, "not-a-uuid").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = sale::void_sale_by_id(&db, "not-a-uuid").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // The catalogue is untouched.
    assert_eq!(db.products().count().await.unwrap(), 1);
}

#[tokio::test]
async fn update_product_never_touches_stock() {
    let (db, _session) = setup().await;
    let id = seed(&db, "Switch", 5000, 7).await;

    let updated = product::update_product(
        &db,
        &id,
        product::ProductInput {
            name: "Modular Switch 6A".to_string(),
            category: "Switches".to_string(),
            cost_price_paise: 3200,
            selling_price_paise: 5500,
            current_stock: 999, // ignored; stock moves only through restock and sales
            min_stock_level: 4,
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Modular Switch 6A");
    assert_eq!(updated.selling_price_paise, 5500);
    assert_eq!(updated.current_stock, 7);
}

#[tokio::test]
async fn import_rejects_bad_rows_atomically() {
    let (db, _session) = setup().await;

    let err = product::import_products(
        &db,
        vec![
            product::ProductInput {
                name: "Good".to_string(),
                category: String::new(),
                cost_price_paise: 100,
                selling_price_paise: 200,
                current_stock: 5,
                min_stock_level: 0,
            },
            product::ProductInput {
                name: "".to_string(), // invalid
                category: String::new(),
                cost_price_paise: 100,
                selling_price_paise: 200,
                current_stock: 5,
                min_stock_level: 0,
            },
        ],
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // Nothing imported
    assert!(product::list_products(&db).await.unwrap().is_empty());
}
