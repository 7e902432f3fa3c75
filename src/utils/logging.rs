use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::{format::FmtSpan, writer::MakeWriterExt};

const LOG_FILES_KEPT: usize = 5;
const DEFAULT_LEVEL: &str = "debug";

/// Which part of the application writes the log. Each gets its own rolling files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Cli,
    Session,
}

impl LogTarget {
    fn file_prefix(&self) -> &'static str {
        match self {
            LogTarget::Cli => "cli",
            LogTarget::Session => "session",
        }
    }
}

/// Filter directive scoped to this crate. An explicit level wins over `RUST_LOG`.
fn filter_directive(level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = level
        .map(|v| v.to_string())
        .or(env_level)
        .unwrap_or_else(|| DEFAULT_LEVEL.into());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

pub fn enable_logging(
    target: LogTarget,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_console: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(LOG_FILES_KEPT)
        .filename_prefix(target.file_prefix())
        .build(application_data_path.join("logs"))?;

    // Sessions draw on stdout.
    let console = std::io::stderr.with_filter(move |_| show_console);

    let directive = filter_directive(log_level, std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(directive))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(console.and(appender))
        .pretty()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::{filter_directive, LogTarget};

    #[test]
    fn explicit_level_beats_environment() {
        assert_eq!(
            filter_directive(Some(LevelFilter::TRACE), Some("warn".into())),
            "quicknotes=trace"
        );
        assert_eq!(filter_directive(None, Some("warn".into())), "quicknotes=warn");
        assert_eq!(filter_directive(None, None), "quicknotes=debug");
    }

    #[test]
    fn targets_log_into_separate_files() {
        assert_ne!(LogTarget::Cli.file_prefix(), LogTarget::Session.file_prefix());
    }
}
