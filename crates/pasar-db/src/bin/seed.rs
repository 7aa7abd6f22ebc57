//! # Seed Data Generator
//!
//! Populates the database with a development catalogue, a few accounts and
//! some orders for the admin screens.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p pasar-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p pasar-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p pasar-db --bin seed -- --db ./data/pasar.db
//! ```
//!
//! ## Generated Data
//! - Products: `{name} {variant}`, slug `{name}-{variant}-{n}`,
//!   price Rp.5.000 - Rp.84.000, stock 0 - 50 (some sold out on purpose)
//! - Users: one admin and three shoppers
//! - Orders: a handful per shopper, a mix of paid/delivered states
//!
//! Seeded accounts carry a placeholder password hash and cannot sign in.

use chrono::{Duration, Utc};
use pasar_core::{Money, Product};
use pasar_db::{generate_product_id, Database, DbConfig, NewOrder, NewUser};
use std::env;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Base products for realistic test data
const PRODUCTS: &[&str] = &[
    "Kopi Susu",
    "Kopi Tubruk",
    "Teh Manis",
    "Teh Tarik",
    "Es Jeruk",
    "Beras Pandan Wangi",
    "Gula Aren",
    "Minyak Goreng",
    "Kecap Manis",
    "Sambal Terasi",
    "Kerupuk Udang",
    "Keripik Singkong",
    "Mie Goreng",
    "Tempe",
    "Tahu Putih",
    "Telur Ayam",
    "Susu UHT",
    "Roti Tawar",
    "Bawang Merah",
    "Cabai Rawit",
];

/// Variants with their price addon (minor units)
const VARIANTS: &[(&str, i64)] = &[
    ("250g", 0),
    ("500g", 4_000),
    ("1kg", 9_000),
    ("Sachet", 0),
    ("Botol", 6_000),
    ("Kemasan Hemat", 15_000),
    ("Isi Ulang", 2_000),
    ("Premium", 20_000),
    ("Kecil", 0),
    ("Besar", 8_000),
];

const SHOPPERS: &[(&str, &str)] = &[
    ("Sari Wulandari", "sari@example.com"),
    ("Budi Santoso", "budi@example.com"),
    ("Ani Rahmawati", "ani@example.com"),
];

const PLACEHOLDER_HASH: &str = "!seed";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./pasar_dev.db");

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
                println!("Pasar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./pasar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, products = count, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has products, skipping seed (delete the file to regenerate)"
        );
        return Ok(());
    }

    let start = std::time::Instant::now();
    let generated = seed_products(&db, count).await;
    info!(generated, elapsed = ?start.elapsed(), "Products generated");

    let users = seed_users(&db).await?;
    let orders = seed_orders(&db, &users).await?;
    info!(users = users.len() + 1, orders, "Accounts and orders generated");

    db.close().await;
    println!("✓ Seed complete!");

    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pasar=trace` - Show trace for pasar crates only
/// - Default: INFO, DEBUG for pasar crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pasar=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}

async fn seed_products(db: &Database, count: usize) -> usize {
    let repo = db.products();
    let mut generated = 0;

    let combos = PRODUCTS
        .iter()
        .flat_map(|name| VARIANTS.iter().map(move |variant| (*name, *variant)));

    for (seed, (name, (variant, addon))) in combos.take(count).enumerate() {
        let product = generate_product(name, variant, addon, seed);

        if let Err(e) = repo.insert(&product).await {
            warn!(slug = %product.slug, error = %e, "Failed to insert product");
            continue;
        }

        generated += 1;
        if generated % 50 == 0 {
            info!(generated, "Generating products...");
        }
    }

    generated
}

/// Inserts the admin account and the shoppers; returns the shopper ids.
async fn seed_users(db: &Database) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let repo = db.users();

    repo.insert(&NewUser {
        name: "Admin Pasar".to_string(),
        email: "admin@example.com".to_string(),
        password_hash: PLACEHOLDER_HASH.to_string(),
        is_admin: true,
    })
    .await?;

    let mut ids = Vec::with_capacity(SHOPPERS.len());
    for (name, email) in SHOPPERS {
        let user = repo
            .insert(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: PLACEHOLDER_HASH.to_string(),
                is_admin: false,
            })
            .await?;
        ids.push(user.id);
    }

    Ok(ids)
}

async fn seed_orders(
    db: &Database,
    shopper_ids: &[String],
) -> Result<usize, Box<dyn std::error::Error>> {
    let repo = db.orders();
    let now = Utc::now();
    let mut inserted = 0;

    for (u, user_id) in shopper_ids.iter().enumerate() {
        for n in 0..3 {
            let seed = (u * 3 + n) as i64;
            let placed = now - Duration::days(seed + 1);
            let mut order = NewOrder::new(user_id, Money::from_minor(25_000 + seed * 7_500));
            order.created_at = placed;

            // Oldest orders are paid and delivered, newest still open.
            if n > 0 {
                order = order.paid(placed + Duration::hours(2));
            }
            if n > 1 {
                order = order.delivered(placed + Duration::days(1));
            }

            repo.insert(&order).await?;
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Generates a single product with realistic data.
fn generate_product(name: &str, variant: &str, price_addon: i64, seed: usize) -> Product {
    let now = Utc::now();

    let slug = format!("{}-{}-{}", name, variant, seed)
        .to_lowercase()
        .replace(' ', "-");

    // Base Rp.5.000 - Rp.64.000 in steps of Rp.1.000, plus the variant addon
    let base_price = 5_000 + ((seed * 17) % 60) as i64 * 1_000;

    // Every seventh product is sold out
    let count_in_stock = if seed % 7 == 0 { 0 } else { (seed % 51) as i64 };

    Product {
        id: generate_product_id(),
        name: format!("{} {}", name, variant),
        image: Some(format!("/images/{}.jpg", slug)),
        slug,
        price: Money::from_minor(base_price + price_addon),
        count_in_stock,
        created_at: now,
        updated_at: now,
    }
}
