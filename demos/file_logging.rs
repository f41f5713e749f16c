//! File logging example
//!
//! Routes errors to their own file, keeps everything in a rotating log and
//! buffers writes to the rotating file.
//!
//! Run with: cargo run --example file_logging

use multisink_logger::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Multi-sink Logger - File Logging Example ===\n");

    let dir = std::env::temp_dir().join("multisink_logger_demo");
    let app_log = dir.join("app.log");
    let error_log = dir.join("errors.log");

    let rotating = Arc::new(RotatingFileSink::new(&app_log, 4 * 1024, 3)?);
    let buffered = BufferedSink::new(rotating.clone(), 20, Duration::from_millis(500))?;
    let errors = FilterSink::new(Arc::new(FileSink::new(&error_log)?), [LogLevel::Error]);

    let logger = Logger::builder()
        .console()
        .sink(errors)
        .sink(buffered)
        .build();

    println!("1. Writing 200 records through a 4 KiB rotating file:");
    let ctx = LogContext::new().attach("job", "import");
    for i in 0..200 {
        let item = ctx.attach("item", i);
        if i % 50 == 49 {
            logger.error(&item, format!("Item {} failed validation", i));
        } else {
            logger.info(&item, format!("Imported item {}", i));
        }
    }

    // Push buffered records out before inspecting the files
    logger.flush()?;

    println!("\n2. Files on disk:");
    println!("   {} ({} bytes)", app_log.display(), rotating.current_size());
    for index in 1..rotating.max_files() {
        let backup = rotating.backup_path(index);
        if backup.exists() {
            println!("   {}", backup.display());
        }
    }
    println!("   {}", error_log.display());

    println!("\n3. Sink health:");
    let metrics = logger.metrics();
    println!(
        "   dispatched={} delivered={} failures={}",
        metrics.records_dispatched(),
        metrics.writes_delivered(),
        metrics.sink_failures()
    );

    logger.close()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
