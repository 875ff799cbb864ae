//! Tracing setup: stdout plus an optional size-capped rotating file.

use anyhow::Context;
use std::{fmt, sync::Mutex};
use tracing_subscriber::{
    EnvFilter,
    fmt::{format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weather_core::LogSettings;

use crate::rotating::RotatingFile;

/// Local wall-clock timestamps, matching the report's time zone.
#[derive(Debug, Clone, Copy)]
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .with_context(|| format!("Invalid log level: {}", settings.level))?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTime)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = match &settings.file {
        Some(path) => {
            let writer = RotatingFile::open(path, settings.max_bytes, settings.max_files)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_timer(LocalTime)
                    .with_ansi(false)
                    .with_target(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(Mutex::new(writer)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}
