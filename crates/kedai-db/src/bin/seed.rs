//! # Seed Data Generator
//!
//! Populates the database with tables and a café menu for development.
//!
//! ## Usage
//! ```bash
//! # 10 tables (default) and the standard menu
//! cargo run -p kedai-db --bin seed
//!
//! # Custom table count and database path
//! cargo run -p kedai-db --bin seed -- --tables 16 --db ./data/kedai.db
//! ```
//!
//! ## Generated Data
//! - Tables `Meja 1..N`, alternating 2 and 4 seats
//! - Menu across four categories: coffee, non-coffee, food, snack
//!
//! Existing data is left alone: seeding is skipped when the database
//! already has tables or menu items.

use std::env;

use kedai_db::repository::menu::NewMenuItem;
use kedai_db::{Database, DbConfig};

/// (category, name, description, price in rupiah)
const MENU: &[(&str, &str, &str, i64)] = &[
    ("coffee", "Espresso", "Single shot espresso", 15_000),
    ("coffee", "Americano", "Espresso dengan air panas", 18_000),
    ("coffee", "Cappuccino", "Espresso, susu, foam tebal", 22_000),
    ("coffee", "Cafe Latte", "Espresso dengan susu steamed", 22_000),
    ("coffee", "Es Kopi Susu Aren", "Kopi susu dengan gula aren", 20_000),
    ("coffee", "Kopi Tubruk", "Kopi hitam tradisional", 12_000),
    ("non-coffee", "Es Teh Manis", "Teh melati dingin", 8_000),
    ("non-coffee", "Matcha Latte", "Matcha dengan susu", 25_000),
    ("non-coffee", "Coklat Panas", "Coklat premium dengan susu", 22_000),
    ("non-coffee", "Jus Alpukat", "Alpukat segar dengan coklat", 20_000),
    ("food", "Nasi Goreng Spesial", "Nasi goreng dengan telur dan ayam", 28_000),
    ("food", "Mie Goreng", "Mie goreng dengan sayuran", 25_000),
    ("food", "Ayam Geprek", "Ayam crispy sambal bawang", 27_000),
    ("food", "Nasi Ayam Bakar", "Ayam bakar bumbu kecap", 30_000),
    ("snack", "Roti Bakar Coklat Keju", "Roti bakar isi coklat dan keju", 18_000),
    ("snack", "Pisang Goreng", "Pisang goreng crispy", 15_000),
    ("snack", "Kentang Goreng", "French fries dengan saus", 17_000),
    ("snack", "Cireng Rujak", "Cireng dengan bumbu rujak", 15_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut tables: i64 = 10;
    let mut db_path = String::from("./kedai_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    tables = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kedai POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --tables <N>   Number of tables to create (default: 10)");
                println!("  -d, --db <PATH>    Database file path (default: ./kedai_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Kedai POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Tables:   {}", tables);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing_tables = db.tables().list().await?.len();
    let existing_menu = db.menu().count().await?;
    if existing_tables > 0 || existing_menu > 0 {
        println!(
            "⚠ Database already has {} tables and {} menu items",
            existing_tables, existing_menu
        );
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating tables...");
    for number in 1..=tables {
        let capacity = if number % 2 == 0 { 4 } else { 2 };
        let name = format!("Meja {}", number);
        if let Err(e) = db.tables().create(number, &name, capacity).await {
            eprintln!("Failed to create {}: {}", name, e);
        }
    }
    println!("✓ Created {} tables", tables);

    println!();
    println!("Creating menu...");
    let mut created = 0;
    for &(category, name, description, price) in MENU {
        let item = NewMenuItem {
            category,
            name,
            description: Some(description),
            // Rupiah prices stored in minor units (sen).
            price_cents: price * 100,
            is_available: true,
        };
        match db.menu().insert(item).await {
            Ok(_) => created += 1,
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }
    println!("✓ Created {} menu items", created);

    let rate = db.settings().tax_rate().await?;
    println!();
    println!("Tax rate: {}", rate.to_decimal_string());
    println!("✓ Seed complete!");

    Ok(())
}
