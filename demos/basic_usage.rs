//! Basic logger usage example
//!
//! Demonstrates buffered logging at different severities through a factory.
//!
//! Run with: cargo run --example basic_usage

use rust_file_logger::prelude::*;
use rust_file_logger::{info, warning};

fn main() -> Result<()> {
    println!("=== Rust File Logger - Basic Usage Example ===\n");

    // Defaults come from LOGGER_* environment variables
    let factory = LoggerFactory::from_env()?;

    println!("1. Buffering entries and writing them at once:");
    let mut logger = factory.info();
    logger
        .add("Application started")
        .add_value("pid", std::process::id())
        .add_value("features", LogValue::serialized(&["stack-trace"])?);
    println!("   {} entries buffered", logger.len());
    logger.logging()?;
    println!("   written to {}", logger.file_path()?.display());

    println!("\n2. One directory per severity:");
    for severity in Severity::ALL {
        let mut logger = factory.make(severity);
        logger.add(format!("This is a {} message", severity));
        logger.logging()?;
        println!("   {:<9} -> {}", severity, logger.output_directory().display());
    }

    println!("\n3. One-shot shortcuts and macros:");
    factory.notice_log("Cache warmed", 1280, false)?;
    info!(factory, "Listening on port {}", 8080)?;
    warning!(factory, "Retry attempt {} of {}", 3, 5)?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
