use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, LevelFilter};
use std::io::Write;
use std::time::{Duration, Instant};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// `HH:MM:SS LEVEL message`
    Compact,
    /// Full timestamp plus the emitting module.
    Pretty,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: LevelFilter::Info,
            format: LogFormat::Compact,
        }
    }
}

/// Initialize the logging system. `RUST_LOG` overrides the configured level.
///
/// Calling this more than once is harmless; only the first logger is installed.
pub fn init_logging(config: LogConfig) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    match config.format {
        LogFormat::Compact => builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        }),
        LogFormat::Pretty => builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        }),
    };

    let _ = builder.try_init();
}

pub fn init_simple_logger() {
    init_logging(LogConfig::default());
}

/// A bar over `len` steps, or a hidden one when progress output is off.
pub fn create_progress_bar(len: u64, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar
}

pub fn create_spinner(message: impl Into<String>, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Logs the start, progress and end of a long-running stage with elapsed times.
pub struct OperationLogger {
    operation: String,
    start_time: Instant,
    metadata: Vec<(String, String)>,
}

impl OperationLogger {
    pub fn new(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        info!("{} started", operation);

        OperationLogger {
            operation,
            start_time: Instant::now(),
            metadata: Vec::new(),
        }
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl ToString) {
        self.metadata.push((key.into(), value.to_string()));
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_progress(&self, message: impl AsRef<str>) {
        info!(
            "{} [{:.1}s] {}",
            self.operation,
            self.elapsed().as_secs_f64(),
            message.as_ref()
        );
    }

    pub fn log_error(&self, error: &dyn std::error::Error) {
        error!(
            "{} failed after {:.1}s: {}",
            self.operation,
            self.elapsed().as_secs_f64(),
            error
        );
    }

    pub fn complete(self) -> Duration {
        let elapsed = self.elapsed();
        let details: Vec<String> = self
            .metadata
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        info!(
            "{} completed in {:.1}s {}",
            self.operation,
            elapsed.as_secs_f64(),
            details.join(" ")
        );
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_bars_when_progress_is_off() {
        assert!(create_progress_bar(10, false).is_hidden());
        assert!(create_spinner("loading", false).is_hidden());
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_simple_logger();
        init_logging(LogConfig {
            level: LevelFilter::Debug,
            format: LogFormat::Pretty,
        });
    }

    #[test]
    fn operation_logger_reports_elapsed() {
        let mut op = OperationLogger::new("test stage");
        op.add_metadata("images", 3);
        op.log_progress("halfway");
        assert!(op.complete() >= Duration::from_secs(0));
    }
}
