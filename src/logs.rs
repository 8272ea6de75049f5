use std::path::Path;

use anyhow::Result;
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    {ContentLimit, FileRotate},
};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

pub const MAX_LOG_FILES: usize = 3;
pub const MAX_LINES_PER_FILE: usize = 1000;

/// Installs the global logger: a rolling file under `{cache_dir}/logs/`.
/// Fails if a logger is already installed.
pub fn init(cache_dir: &str, level: LevelFilter) -> Result<()> {
    let path = Path::new(cache_dir).join("logs/main.log");
    let log = FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::MaxFiles(MAX_LOG_FILES)),
        ContentLimit::Lines(MAX_LINES_PER_FILE),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    WriteLogger::init(level, config, log)?;
    info!("logging initialized, level={}", level);
    Ok(())
}
