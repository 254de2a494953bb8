use std::time::Instant;

use anyhow::{Context, Result};
use log::LevelFilter;

/// Log to stderr as `[LEVEL] [hh:mm:ss] message`, time elapsed since start.
pub fn init(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let start = Instant::now();

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let secs = start.elapsed().as_secs();
            out.finish(format_args!(
                "[{}] [{:0>2}:{:0>2}:{:0>2}] {}",
                record.level(),
                secs / 3600,
                (secs / 60) % 60,
                secs % 60,
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("Failed to initialise logger")?;
    Ok(())
}
