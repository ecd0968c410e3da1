//! Check that the configured project has every table the dashboard needs.
//!
//! Run with: cargo run --example verify_schema -p plugged-data
//!
//! Reads saved settings, falling back to SUPABASE_URL and
//! SUPABASE_SERVICE_ROLE_KEY.

use plugged_data::prelude::*;
use plugged_data::{test_connection, verify_schema, TableStatus};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = SettingsStore::default_location()?.connect()?;

    println!("=== Connection ===");
    match test_connection(&client).await.into_result() {
        Ok(products) => println!("  Connected; {} products", products.unwrap_or(0)),
        Err(e) => {
            println!("  Connection failed: {e}");
            return Ok(());
        }
    }

    println!("\n=== Tables ===");
    let report = verify_schema(&client).await;
    for check in &report.tables {
        match &check.status {
            TableStatus::Present { rows } => match rows {
                Some(n) => println!("  {:<22} ok ({n} rows)", check.table),
                None => println!("  {:<22} ok", check.table),
            },
            TableStatus::Missing => println!("  {:<22} MISSING", check.table),
            TableStatus::Failed(e) => println!("  {:<22} error: {e}", check.table),
        }
    }

    if report.is_complete() {
        println!("\nAll required tables are present.");
    } else {
        println!("\nMissing: {}", report.missing().join(", "));
    }
    Ok(())
}
