//! Structured logging example
//!
//! Demonstrates JSON Lines output and how the requested tokens shape each line.
//!
//! Run with: cargo run --example json_logging

use rust_file_logger::prelude::*;
use serde_json::json;

fn main() -> Result<()> {
    println!("=== Rust File Logger - JSON Logging Example ===\n");

    let factory = LoggerFactory::new(LoggerConfig {
        base_directory: "demo_logs".into(),
        ..LoggerConfig::default()
    });

    println!("1. Default keys (datetime, level, message):");
    let mut logger = factory.info_json();
    logger.add("User logged in");
    for line in logger.contents() {
        println!("   {}", line);
    }
    logger.logging()?;

    println!("\n2. Attached values use the message as key:");
    let mut logger = factory.warning_json();
    logger
        .add_value("order_id", "A-1001")
        .add_value("items", json!([{"sku": "X1", "qty": 2}]));
    for line in logger.contents() {
        println!("   {}", line);
    }
    logger.logging()?;

    println!("\n3. Choosing keys:");
    let mut logger = factory.critical_json();
    logger
        .add_log_format(FormatToken::Message)
        .add_log_format(FormatToken::FileName)
        .add_log_format(FormatToken::LineNumber)
        .add_log_format(FormatToken::MemoryPeakUsage);
    logger.add("Disk usage above threshold");
    for line in logger.contents() {
        println!("   {}", line);
    }
    logger.logging()?;

    println!("\n4. One-shot JSON entry:");
    factory.error_log("Payment declined", json!({"code": 402}), true)?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
