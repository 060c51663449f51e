//! File logging example
//!
//! Demonstrates custom locations, templates and retention for file output.
//!
//! Run with: cargo run --example file_logging

use rust_file_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust File Logger - File Logging Example ===\n");

    let config = LoggerConfig {
        base_directory: "demo_logs".into(),
        retention_days: 14,
        ..LoggerConfig::default()
    };
    let factory = LoggerFactory::new(config);

    println!("1. Custom directory, file name and template:");
    let mut logger = factory.error();
    logger
        .add_directory("payments")
        .add_directory("gateway")
        .set_file_name_format("%Y-%m")
        .set_log_format("[%datetime%] %level% %file%:%line% %message%");

    logger.add_divider();
    for i in 1..=5 {
        logger.add_value("Processing item", format!("{}/5", i));
        if i == 3 {
            logger.add("Item 3 took longer than expected");
        }
    }
    logger.add_divider();
    logger.logging()?;
    println!("   written to {}", logger.file_path()?.display());

    println!("\n2. Building a template token by token:");
    let mut logger = factory.debug();
    logger
        .add_log_format_with(FormatToken::Datetime, "[", "]")
        .add_log_format(" ")
        .add_log_format(FormatToken::MemoryUsage)
        .add_log_format(FormatToken::Message);
    logger.add("Loaded configuration").logging()?;
    println!("   template: {}", logger.log_format());

    println!("\n3. Rotation settings:");
    let mut logger = factory.info();
    logger.set_retention_days(3);
    println!("   retention window: {:?}", logger.retention_window());
    logger.set_rotate_log(false);
    println!("   rotation disabled: {:?}", logger.retention_window());
    logger.logging()?;

    println!("\n=== Example completed successfully! ===");
    println!("Check 'demo_logs/' for the log output");

    Ok(())
}
