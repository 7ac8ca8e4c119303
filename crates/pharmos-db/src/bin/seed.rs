//! # Seed Data Generator
//!
//! Populates the catalog with sample medicines for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 items (default)
//! cargo run -p pharmos-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p pharmos-db --bin seed -- --db ./pharmos.db --count 500
//! ```
//!
//! ## Generated Items
//! Each item gets a name `{medicine} {strength}`, a category, a unique
//! barcode and deterministic pseudo-random prices. Stock levels and expiry
//! dates are spread so the catalog shows all three statuses:
//! roughly one in ten expired, one in five low on stock, the rest valid.

use chrono::{Duration, Utc};
use pharmos_core::{NewItem, StatusPolicy};
use pharmos_db::{Database, DbConfig};
use std::env;

/// Medicine categories for realistic sample data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Analgesic",
        &["Paracetamol", "Ibuprofen", "Aspirin", "Naproxen", "Diclofenac"],
    ),
    (
        "Antibiotic",
        &["Amoxicillin", "Azithromycin", "Ciprofloxacin", "Doxycycline", "Cefalexin"],
    ),
    (
        "Antihistamine",
        &["Cetirizine", "Loratadine", "Fexofenadine", "Chlorphenamine"],
    ),
    (
        "Gastro",
        &["Omeprazole", "Pantoprazole", "Loperamide", "Domperidone", "Ranitidine"],
    ),
    (
        "Cardio",
        &["Amlodipine", "Atorvastatin", "Bisoprolol", "Lisinopril", "Losartan"],
    ),
    (
        "Supplement",
        &["Vitamin C", "Vitamin D3", "Zinc", "Folic Acid", "Iron"],
    ),
];

/// Strengths with a price add-on in cents
const STRENGTHS: &[(&str, i64)] = &[("100mg", 0), ("250mg", 150), ("500mg", 300), ("1g", 600)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./pharmos.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Pharmos Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./pharmos.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Pharmos Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    'outer: for (category, medicines) in CATEGORIES {
        for medicine in medicines.iter() {
            for (strength, price_addon) in STRENGTHS {
                if generated >= count {
                    break 'outer;
                }

                let item = generate_item(category, medicine, strength, *price_addon, generated);
                if let Err(e) = db.items().create(&item).await {
                    eprintln!("Failed to insert {}: {}", item.name, e);
                    continue;
                }
                generated += 1;
            }
        }
    }

    // Names repeat once the combinations run out; barcodes stay unique
    while generated < count {
        let (category, medicines) = CATEGORIES[generated % CATEGORIES.len()];
        let medicine = medicines[generated % medicines.len()];
        let (strength, addon) = STRENGTHS[generated % STRENGTHS.len()];
        let item = generate_item(category, medicine, strength, addon, generated);
        db.items().create(&item).await?;
        generated += 1;
    }

    println!("✓ Generated {} items in {:?}", generated, start.elapsed());

    let today = Utc::now().date_naive();
    let sellable = db
        .items()
        .list_sellable(today, &StatusPolicy::default())
        .await?
        .len();
    println!("  Sellable on the POS today: {}", sellable);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single item with deterministic pseudo-random data.
fn generate_item(category: &str, medicine: &str, strength: &str, price_addon: i64, seed: usize) -> NewItem {
    let today = Utc::now().date_naive();

    let price_buy_cents = 150 + ((seed * 37) % 900) as i64 + price_addon;
    // 25% - 60% margin
    let margin_pct = 25 + (seed * 13 % 36) as i64;
    let price_sell_cents = price_buy_cents + price_buy_cents * margin_pct / 100;

    let (stock, expire_date) = match seed % 10 {
        0 => (20 + (seed % 40) as i64, today - Duration::days(1 + (seed % 90) as i64)),
        1 | 2 => ((seed % 6) as i64, today + Duration::days(60 + (seed % 300) as i64)),
        _ => (6 + (seed * 7 % 150) as i64, today + Duration::days(30 + (seed * 11 % 700) as i64)),
    };

    NewItem {
        name: format!("{} {}", medicine, strength),
        description: Some(format!("{} {} tablets, box of {}", medicine, strength, 10 + seed % 3 * 10)),
        price_buy_cents,
        price_sell_cents,
        stock,
        expire_date,
        category: Some(category.to_string()),
        barcode: Some(format!("629{:010}", seed)),
    }
}
