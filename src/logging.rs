//! Tracing subscriber setup shared by both binaries.
//!
//! Console output is human readable unless `LOG_FORMAT=json`. When `LOG_DIR`
//! is set, a daily rolling `dotawatch.log` copy is written there as well,
//! keeping at most `LOG_MAX_FILES` files.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    sync::OnceLock,
};

use tracing_appender::{
    non_blocking,
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::ChronoLocal, layer::SubscriberExt,
    util::SubscriberInitExt,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_PREFIX: &str = "dotawatch.log";

/// Flushes the file writer on shutdown.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown LOG_FORMAT `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub max_files: Option<usize>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            format: lookup("LOG_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            dir: lookup("LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            max_files: lookup("LOG_MAX_FILES").and_then(|v| v.trim().parse().ok()),
        }
    }
}

pub fn init() {
    let settings = LogSettings::from_env();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(settings.format)];
    let writer = settings
        .dir
        .as_deref()
        .and_then(|dir| file_writer(dir, settings.max_files));
    if let Some(writer) = writer {
        layers.push(file_layer(writer, settings.format));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    tracing::info!(
        format = ?settings.format,
        file = settings.dir.is_some(),
        "📝 Logger initialized"
    );
}

fn console_layer(format: LogFormat) -> BoxedLayer {
    let layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(false);

    match format {
        LogFormat::Pretty => layer.with_ansi(true).boxed(),
        LogFormat::Json => layer.json().with_current_span(true).boxed(),
    }
}

fn file_layer(writer: NonBlocking, format: LogFormat) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(writer)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(false);

    match format {
        LogFormat::Pretty => layer.boxed(),
        LogFormat::Json => layer.json().with_current_span(true).boxed(),
    }
}

fn file_writer(dir: &Path, max_files: Option<usize>) -> Option<NonBlocking> {
    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(FILE_PREFIX);

    if let Some(n) = max_files {
        builder = builder.max_log_files(n);
    }

    // No subscriber yet, report on stderr.
    let appender = match builder.build(dir) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!(
                "cannot log to {}: {e}, falling back to console only",
                dir.display()
            );
            return None;
        }
    };

    let (writer, guard) = non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    Some(writer)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> LogSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_pretty_console_only() {
        assert_eq!(settings(&[]), LogSettings::default());
    }

    #[test]
    fn reads_format_dir_and_retention() {
        let s = settings(&[
            ("LOG_FORMAT", " JSON "),
            ("LOG_DIR", "/var/log/dotawatch"),
            ("LOG_MAX_FILES", "7"),
        ]);

        assert_eq!(s.format, LogFormat::Json);
        assert_eq!(s.dir, Some(PathBuf::from("/var/log/dotawatch")));
        assert_eq!(s.max_files, Some(7));
    }

    #[test]
    fn malformed_values_fall_back() {
        let s = settings(&[
            ("LOG_FORMAT", "xml"),
            ("LOG_DIR", "  "),
            ("LOG_MAX_FILES", "lots"),
        ]);

        assert_eq!(s, LogSettings::default());
    }
}
