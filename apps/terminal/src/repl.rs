//! # Interactive Command Loop
//!
//! A line-oriented console for the counter desk. Each line is parsed into
//! a command, dispatched to the handlers in [`crate::commands`], and the
//! resulting view is printed. Errors are printed as `[CODE] message` and
//! never end the session.
//!
//! ```text
//! haveli> add 3 Modular Switch 6A
//! haveli> cart
//! haveli> finalize upi 9825012345
//! haveli> receipt
//! haveli> void
//! ```

use std::io::{self, BufRead, Write as _};

use crate::commands::{cart, insights, product, sale, settings};
use crate::error::ApiError;
use crate::session::SessionState;
use haveli_db::Database;

/// Default reorder threshold for the `low` command.
const LOW_STOCK_THRESHOLD: i64 = 3;

/// Runs the interactive loop until `quit` or EOF.
///
/// Reading stdin blocks the runtime thread; this terminal is single-user,
/// so nothing else is waiting on it.
pub async fn run_loop(
    db: &Database,
    session: &SessionState,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Haveli POS terminal. Type 'help' for commands.");

    loop {
        print!("haveli> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break, // EOF
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        if let Err(e) = dispatch(db, session, line).await {
            println!("{}", e);
        }
    }

    println!("Goodbye.");
    Ok(())
}

/// Parses and executes one command line.
async fn dispatch(db: &Database, session: &SessionState, line: &str) -> Result<(), ApiError> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    match verb {
        "help" => print_help(),

        // --- Bill assembly -------------------------------------------------
        "cart" => print_cart(&cart::get_cart(session)),
        "add" => {
            let (qty, name) = split_leading_number(rest)
                .ok_or_else(|| ApiError::validation("Usage: add <qty> <product name>"))?;
            let view = cart::add_to_cart(db, session, name, qty).await?;
            print_cart(&view);
        }
        "edit" => {
            // edit <qty> <price rupees> <name...>
            let (qty, rest) = split_leading_number(rest)
                .ok_or_else(|| ApiError::validation("Usage: edit <qty> <price> <product name>"))?;
            let (price_paise, name) = split_leading_rupees(rest)
                .ok_or_else(|| ApiError::validation("Usage: edit <qty> <price> <product name>"))?;
            let view = cart::edit_cart_line(session, name, qty, price_paise)?;
            print_cart(&view);
        }
        "remove" => {
            if rest.is_empty() {
                return Err(ApiError::validation("Usage: remove <product id>"));
            }
            let view = cart::remove_from_cart(session, rest)?;
            print_cart(&view);
        }
        "clear" => {
            cart::clear_cart(session);
            println!("Bill cleared.");
        }

        // --- Finalize / void / receipts ------------------------------------
        "finalize" => {
            let mut args = rest.split_whitespace();
            let mode = args
                .next()
                .ok_or_else(|| ApiError::validation("Usage: finalize <cash|upi|card> [phone]"))?;
            let phone = args.next();

            let resp = sale::finalize_bill(db, session, phone, mode).await?;
            println!(
                "Sale {} finalized: Rs. {} ({} items, {})",
                resp.short_id, resp.total_display, resp.item_count, resp.payment_mode
            );
            if let Some(link) = resp.whatsapp_link {
                println!("WhatsApp: {}", link);
            }
        }
        "receipt" => {
            let last = sale::last_receipt(session)?;
            println!("{}", String::from_utf8_lossy(&last.document));
        }
        "void" => {
            let view = if rest.is_empty() {
                sale::void_last_sale(db, session).await?
            } else {
                sale::void_sale_by_id(db, rest).await?
            };
            println!(
                "Sale {} voided; stock restored (was Rs. {}).",
                view.short_id, view.total_display
            );
        }
        "sales" => {
            let limit = rest.parse().unwrap_or(10);
            for s in sale::list_recent_sales(db, limit).await? {
                println!(
                    "{}  {}  Rs. {:>12}  {}  {}",
                    s.short_id, s.created_at, s.total_display, s.payment_mode, s.customer
                );
            }
        }

        // --- Inventory -----------------------------------------------------
        "products" => print_products(&product::list_products(db).await?),
        "sellable" => print_products(&product::list_sellable(db).await?),
        "find" => print_products(&product::search_products(db, rest).await?),
        "low" => {
            let threshold = rest.parse().unwrap_or(LOW_STOCK_THRESHOLD);
            print_products(&product::low_stock_report(db, threshold).await?);
        }
        "restock" => {
            let (qty, id) = split_leading_number(rest)
                .ok_or_else(|| ApiError::validation("Usage: restock <qty> <product id>"))?;
            let view = product::restock_product(db, id, qty).await?;
            println!("{}: stock now {}", view.name, view.current_stock);
        }

        // --- Shop profile & insights ---------------------------------------
        "settings" => {
            let s = settings::get_settings(db).await;
            println!("{}", s.shop_name);
            if !s.shop_address.is_empty() {
                println!("{}", s.shop_address);
            }
            if !s.shop_contact.is_empty() {
                println!("Contact: {}", s.shop_contact);
            }
            if !s.upi_id.is_empty() {
                println!("UPI: {}", s.upi_id);
            }
            println!("GST: {}", s.tax_rate_display);
        }
        "summary" => {
            let s = insights::sales_summary(db).await?;
            println!(
                "{} sales, {} units. Revenue Rs. {}, profit Rs. {}",
                s.sale_count, s.units_sold, s.revenue_display, s.profit_display
            );
        }
        "daily" => {
            for d in insights::daily_sales(db, 30).await? {
                println!(
                    "{}  {:>3} sales  Rs. {:>12}  profit Rs. {:>12}",
                    d.day, d.sale_count, d.revenue_display, d.profit_display
                );
            }
        }
        "top" => {
            for p in insights::top_products(db, 10).await? {
                println!(
                    "{:<30} {:>5} units  Rs. {:>12}",
                    p.name, p.units_sold, p.revenue_display
                );
            }
        }
        "payments" => {
            for b in insights::payment_breakdown(db).await? {
                println!(
                    "{:<6} {:>4} sales  Rs. {:>12}",
                    b.payment_mode, b.sale_count, b.revenue_display
                );
            }
        }

        other => {
            return Err(ApiError::validation(format!(
                "Unknown command '{}'; type 'help'",
                other
            )));
        }
    }

    Ok(())
}

fn print_help() {
    println!("Bill:      cart | add <qty> <name> | edit <qty> <price> <name>");
    println!("           remove <product id> | clear");
    println!("Sale:      finalize <cash|upi|card> [phone] | receipt | void [sale id]");
    println!("           sales [n]");
    println!("Inventory: products | sellable | find <text> | low [threshold]");
    println!("           restock <qty> <id>");
    println!("Shop:      settings | summary | daily | top | payments");
    println!("           quit");
}

fn print_cart(view: &cart::CartView) {
    if view.lines.is_empty() {
        println!("Bill is empty.");
        return;
    }
    for l in &view.lines {
        println!(
            "{:<30} {:>4} x Rs. {:>10} = Rs. {:>12}",
            l.name, l.quantity, l.unit_price_display, l.line_total_display
        );
    }
    println!(
        "{:>62}",
        format!("TOTAL: Rs. {} ({} items)", view.total_display, view.total_quantity)
    );
}

fn print_products(views: &[product::ProductView]) {
    for p in views {
        let flag = if p.low_stock { " LOW" } else { "" };
        println!(
            "{:<30} {:<14} Rs. {:>10}  stock {:>4}{}",
            p.name, p.category, p.selling_price_display, p.current_stock, flag
        );
    }
    if views.is_empty() {
        println!("No products.");
    }
}

/// Splits "3 Modular Switch" into (3, "Modular Switch").
fn split_leading_number(input: &str) -> Option<(i64, &str)> {
    let mut parts = input.splitn(2, char::is_whitespace);
    let n = parts.next()?.parse().ok()?;
    let rest = parts.next().unwrap_or("").trim();
    if rest.is_empty() {
        None
    } else {
        Some((n, rest))
    }
}

/// Splits "50.00 Modular Switch" into (5000 paise, "Modular Switch").
/// Accepts whole rupees ("50") or rupees.paise ("50.25").
fn split_leading_rupees(input: &str) -> Option<(i64, &str)> {
    let mut parts = input.splitn(2, char::is_whitespace);
    let amount = parts.next()?;
    let rest = parts.next().unwrap_or("").trim();
    if rest.is_empty() {
        return None;
    }

    let paise = match amount.split_once('.') {
        Some((rupees, fraction)) => {
            let rupees: i64 = rupees.parse().ok()?;
            // "5" means 50 paise, "05" means 5 paise
            let fraction = format!("{:0<2}", fraction);
            let paise_part: i64 = fraction.get(..2)?.parse().ok()?;
            rupees * 100 + paise_part
        }
        None => amount.parse::<i64>().ok()? * 100,
    };

    Some((paise, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_leading_number() {
        assert_eq!(
            split_leading_number("3 Modular Switch 6A"),
            Some((3, "Modular Switch 6A"))
        );
        assert_eq!(split_leading_number("3"), None);
        assert_eq!(split_leading_number("x Switch"), None);
    }

    #[test]
    fn test_split_leading_rupees() {
        assert_eq!(split_leading_rupees("50.00 Switch"), Some((5000, "Switch")));
        assert_eq!(split_leading_rupees("50.5 Switch"), Some((5050, "Switch")));
        assert_eq!(split_leading_rupees("50 Switch"), Some((5000, "Switch")));
        assert_eq!(split_leading_rupees("50.00"), None);
    }
}
