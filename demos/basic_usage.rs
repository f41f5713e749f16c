//! Basic logger usage example
//!
//! Demonstrates console logging, context snapshots and the formatting macros.
//!
//! Run with: cargo run --example basic_usage

use multisink_logger::prelude::*;
use multisink_logger::{error, info, warn};

fn main() -> Result<()> {
    println!("=== Multi-sink Logger - Basic Usage Example ===\n");

    // Default logger writes JSON lines to the console
    let logger = Logger::new();
    let ctx = LogContext::new().attach("service", "checkout");

    println!("1. Logging at each level (ERROR goes to stderr):");
    logger.info(&ctx, "This is an info message");
    logger.warn(&ctx, "This is a warning message");
    logger.error(&ctx, "This is an error message");

    println!("\n2. Deriving request contexts:");
    let first = ctx.attach("request_id", "r-1");
    let second = ctx.attach("request_id", "r-2").attach("user_id", 42);
    info!(logger, &first, "Handling request {}", 1);
    info!(logger, &second, "Handling request {}", 2);
    println!("   Parent context still has {} field(s)", ctx.len());

    println!("\n3. Formatting macros:");
    let latency_ms = 870;
    warn!(logger, &second, "Upstream slow: {}ms", latency_ms);
    error!(logger, &second, "Upstream returned {}", 503);

    logger.flush()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
