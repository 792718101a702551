//! # Seed Data Generator
//!
//! Populates the database with a small electricals catalogue for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p haveli-db --bin seed
//!
//! # Specify database path
//! cargo run -p haveli-db --bin seed -- --db ./data/haveli.db
//! ```

use std::env;

use haveli_db::{Database, DbConfig, NewProduct};

/// (name, category, cost paise, price paise, stock, min level)
const CATALOGUE: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("Modular Switch 6A", "Switches", 2500, 4500, 40, 5),
    ("Modular Switch 16A", "Switches", 4000, 7000, 25, 5),
    ("2-Way Switch", "Switches", 3500, 6000, 18, 5),
    ("LED Bulb 9W", "Lighting", 4500, 9000, 60, 10),
    ("LED Bulb 12W", "Lighting", 6000, 11000, 45, 10),
    ("LED Tube Light 20W", "Lighting", 12000, 22000, 20, 4),
    ("Panel Light 15W", "Lighting", 18000, 32000, 12, 3),
    ("Ceiling Fan 1200mm", "Fans", 110000, 165000, 8, 2),
    ("Table Fan 400mm", "Fans", 85000, 130000, 6, 2),
    ("Exhaust Fan 250mm", "Fans", 65000, 105000, 5, 2),
    ("Extension Board 4-Socket", "Accessories", 22000, 38000, 15, 3),
    ("Multi-Plug Adapter", "Accessories", 4500, 9500, 30, 5),
    ("Copper Wire 1.5mm (90m)", "Wires", 145000, 195000, 10, 2),
    ("Copper Wire 2.5mm (90m)", "Wires", 225000, 295000, 7, 2),
    ("MCB 16A Single Pole", "Protection", 12000, 19500, 14, 3),
    ("MCB 32A Double Pole", "Protection", 32000, 48000, 9, 2),
    ("Door Bell Musical", "Accessories", 15000, 27500, 11, 3),
    ("Iron Box 1000W", "Appliances", 55000, 85000, 4, 2),
    ("Immersion Rod 1500W", "Appliances", 32000, 52000, 7, 2),
    ("Voltage Stabilizer 4kVA", "Appliances", 185000, 265000, 3, 1),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./haveli_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Haveli POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./haveli_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Haveli POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Importing catalogue...");

    let rows: Vec<NewProduct> = CATALOGUE
        .iter()
        .map(
            |(name, category, cost, price, stock, min_level)| NewProduct {
                name: name.to_string(),
                category: category.to_string(),
                cost_price_paise: *cost,
                selling_price_paise: *price,
                current_stock: *stock,
                min_stock_level: *min_level,
            },
        )
        .collect();

    let inserted = db.products().bulk_insert(rows).await?;
    println!("✓ Imported {} products", inserted.len());

    let low = db.products().low_stock(3).await?;
    println!("  Products at or below reorder level 3: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
