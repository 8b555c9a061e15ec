//! # Seed Data Generator
//!
//! Populates the database with a realistic hall setup for development.
//!
//! ## Usage
//! ```bash
//! # Default: 12 tables plus packages and menu
//! cargo run -p baize-db --bin seed
//!
//! # Custom table count
//! cargo run -p baize-db --bin seed -- --tables 20
//!
//! # Specify database path
//! cargo run -p baize-db --bin seed -- --db ./data/baize.db
//! ```
//!
//! ## Generated Data
//! - Pricing packages: a default hourly plan, a VIP hourly plan, and a
//!   per-minute plan
//! - Billiard tables: most linked to the default package; a couple left
//!   on legacy per-table rates to exercise the fallback pricing path
//! - Menu items: drinks, food and snacks with rupiah prices and stock

use chrono::Utc;
use std::env;
use uuid::Uuid;

use baize_core::{BilliardTable, BillingKind, MenuItem, PricingPackage, TableStatus};
use baize_db::{Database, DbConfig};

/// (name, category, hourly_rate_minor, per_minute_rate_minor, is_default)
const PACKAGES: &[(&str, BillingKind, Option<i64>, Option<i64>, bool)] = &[
    ("Regular Hourly", BillingKind::Hourly, Some(50_000), None, true),
    ("VIP Hourly", BillingKind::Hourly, Some(75_000), None, false),
    ("Paket Menit", BillingKind::PerMinute, None, Some(1_000), false),
];

/// (sku, name, category, price_minor, stock)
const MENU: &[(&str, &str, &str, i64, i64)] = &[
    ("DRK-001", "Es Teh Manis", "drinks", 8_000, 100),
    ("DRK-002", "Es Jeruk", "drinks", 10_000, 80),
    ("DRK-003", "Kopi Hitam", "drinks", 10_000, 60),
    ("DRK-004", "Kopi Susu", "drinks", 15_000, 60),
    ("DRK-005", "Air Mineral", "drinks", 6_000, 200),
    ("DRK-006", "Teh Botol", "drinks", 7_000, 120),
    ("FOOD-001", "Indomie Goreng", "food", 15_000, 50),
    ("FOOD-002", "Nasi Goreng", "food", 25_000, 40),
    ("FOOD-003", "Mie Goreng Spesial", "food", 22_000, 40),
    ("FOOD-004", "Ayam Goreng", "food", 28_000, 30),
    ("FOOD-005", "Kentang Goreng", "food", 18_000, 50),
    ("FOOD-006", "Roti Bakar", "food", 15_000, 30),
    ("SNK-001", "Kerupuk", "snacks", 5_000, 100),
    ("SNK-002", "Kacang Goreng", "snacks", 8_000, 80),
    ("SNK-003", "Pisang Goreng", "snacks", 12_000, 40),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut table_count: usize = 12;
    let mut db_path = String::from("./baize_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    table_count = args[i + 1].parse().unwrap_or(12);
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
                println!("Baize POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --tables <N>   Number of tables to generate (default: 12)");
                println!("  -d, --db <PATH>    Database file path (default: ./baize_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🎱 Baize POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Tables:   {}", table_count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing data
    let existing = db.menu().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} menu items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    // Pricing packages
    println!();
    println!("Creating pricing packages...");

    let mut default_package_id = None;
    for (name, category, hourly, per_minute, is_default) in PACKAGES {
        let package = PricingPackage {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: *category,
            hourly_rate_minor: *hourly,
            per_minute_rate_minor: *per_minute,
            is_default: *is_default,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.packages().insert(&package).await?;
        if *is_default {
            default_package_id = Some(package.id.clone());
        }
        println!("  + {}", name);
    }

    // Tables: most on the default package, the last two on legacy
    // per-table rates so the fallback pricing path stays exercised
    println!();
    println!("Creating tables...");

    for n in 1..=table_count {
        let legacy = n + 2 > table_count;
        let table = BilliardTable {
            id: Uuid::new_v4().to_string(),
            name: format!("Table {:02}", n),
            status: TableStatus::Available,
            hourly_rate_minor: if legacy { 45_000 } else { 0 },
            per_minute_rate_minor: if n == table_count { Some(900) } else { None },
            pricing_package_id: if legacy {
                None
            } else {
                default_package_id.clone()
            },
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.tables().insert(&table).await?;
    }
    println!("  + {} tables ({} legacy-rate)", table_count, 2.min(table_count));

    // Menu
    println!();
    println!("Creating menu items...");

    for (sku, name, category, price, stock) in MENU {
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            category: Some(category.to_string()),
            price_minor: *price,
            stock_quantity: *stock,
            track_stock: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.menu().insert(&item).await?;
    }
    println!("  + {} menu items", MENU.len());

    // Report
    println!();
    println!("✓ Seed complete!");
    println!("  Packages: {}", db.packages().list_active().await?.len());
    println!("  Tables:   {}", db.tables().list_active().await?.len());
    println!("  Menu:     {}", db.menu().count().await?);

    Ok(())
}
