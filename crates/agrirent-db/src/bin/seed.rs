//! # Seed Data Generator
//!
//! Populates the database with demo farmers and tools for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p agrirent-db --bin seed
//!
//! # Specify database path
//! cargo run -p agrirent-db --bin seed -- --db ./data/agrirent.db
//! ```
//!
//! ## Generated Data
//! - One administrator (`9999999999`)
//! - Four farmers in two pincodes, verified
//! - One approved listing per category per farmer, plus one unapproved
//! - A pending booking so the first farmer has an incoming request
//!
//! Every seeded account uses the password `password123`.

use agrirent_core::booking::quote_total;
use agrirent_core::{Account, Booking, BookingStatus, Listing, Money, Profile, ToolCategory};
use agrirent_db::password::hash_password;
use agrirent_db::repository::generate_id;
use agrirent_db::{Database, DbConfig};
use chrono::{Duration, NaiveDate, Utc};
use std::env;

const DEMO_PASSWORD: &str = "password123";

/// (mobile, village, district, pincode)
const FARMERS: &[(&str, &str, &str, &str)] = &[
    ("9000000001", "Khed", "Pune", "410501"),
    ("9000000002", "Manchar", "Pune", "410503"),
    ("9000000003", "Sinnar", "Nashik", "422103"),
    ("9000000004", "Niphad", "Nashik", "422303"),
];

/// Tool names per category with a base daily rate in rupees.
const TOOLS: &[(ToolCategory, &str, i64)] = &[
    (ToolCategory::Tractor, "Mahindra 575 DI Tractor", 1500),
    (ToolCategory::Plow, "Reversible MB Plow", 400),
    (ToolCategory::Harvester, "Mini Combine Harvester", 3000),
    (ToolCategory::Irrigation, "Drip Irrigation Kit", 250),
    (ToolCategory::Other, "Power Sprayer", 150),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./agrirent_dev.db");

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
                println!("AgriRent Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./agrirent_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 AgriRent Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.accounts().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} accounts", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let password_hash = hash_password(DEMO_PASSWORD)?;

    // Administrator
    let admin = account("9999999999", &password_hash);
    db.accounts()
        .create(&admin, &profile(&admin, "Head Office", "Pune", "411001"))
        .await?;
    db.accounts().set_admin(&admin.id, true).await?;
    println!("✓ Admin 9999999999");

    // Farmers and their tools
    let mut farmers = Vec::new();
    let mut first_listing: Option<Listing> = None;

    for (idx, (mobile, village, district, pincode)) in FARMERS.iter().enumerate() {
        let farmer = account(mobile, &password_hash);
        db.accounts()
            .create(&farmer, &profile(&farmer, village, district, pincode))
            .await?;
        db.accounts().set_verified(&farmer.id, true).await?;

        for (category, name, base_rupees) in TOOLS {
            let listing = tool(&farmer, *category, name, base_rupees + idx as i64 * 50);
            db.listings().insert(&listing).await?;
            db.listings().set_approved(&listing.id, true).await?;
            if first_listing.is_none() {
                first_listing = Some(listing);
            }
        }

        // Awaiting admin approval
        let pending = tool(&farmer, ToolCategory::Other, "Seed Drill (awaiting approval)", 300);
        db.listings().insert(&pending).await?;

        println!("✓ Farmer {} ({}, {}) with {} tools", mobile, village, pincode, TOOLS.len() + 1);
        farmers.push(farmer);
    }

    // One incoming request for the first farmer, from the second
    if let (Some(listing), Some(borrower)) = (first_listing, farmers.get(1)) {
        let start = Utc::now().date_naive() + Duration::days(7);
        let end = start + Duration::days(3);
        let total = quote_total(listing.price_per_day(), start, end)?;
        let now = Utc::now();

        db.bookings()
            .insert(&Booking {
                id: generate_id(),
                listing_id: listing.id.clone(),
                borrower_id: borrower.id.clone(),
                start_date: start,
                end_date: end,
                status: BookingStatus::Pending,
                total_price_paise: total.paise(),
                delivery_requested: false,
                delivery_fee_paise: 0,
                pickup_proof: None,
                return_proof: None,
                created_at: now,
                updated_at: now,
                version: 0,
            })
            .await?;
        println!("✓ Pending booking for '{}' ({})", listing.name, total);
    }

    let approved = db.listings().recent(100).await?;
    println!();
    println!("✓ Seed complete! {} approved tools", approved.len());
    println!("  Log in with any seeded number and password '{}'", DEMO_PASSWORD);

    Ok(())
}

fn account(mobile: &str, password_hash: &str) -> Account {
    Account {
        id: generate_id(),
        mobile_number: mobile.to_string(),
        password_hash: password_hash.to_string(),
        is_admin: false,
        created_at: Utc::now(),
    }
}

fn profile(account: &Account, village: &str, district: &str, pincode: &str) -> Profile {
    Profile {
        account_id: account.id.clone(),
        village: village.to_string(),
        district: district.to_string(),
        pincode: pincode.to_string(),
        is_verified: false,
    }
}

fn tool(owner: &Account, category: ToolCategory, name: &str, rupees_per_day: i64) -> Listing {
    let today = Utc::now().date_naive();
    Listing {
        id: generate_id(),
        owner_id: owner.id.clone(),
        name: name.to_string(),
        category,
        description: format!("{} available for rent. {}.", name, category.label()),
        price_per_day_paise: Money::from_rupees(rupees_per_day).paise(),
        image: None,
        is_approved: false,
        available_from: today,
        available_to: today
            .checked_add_signed(Duration::days(365))
            .unwrap_or(NaiveDate::MAX),
        created_at: Utc::now(),
    }
}
