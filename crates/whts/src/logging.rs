use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Per-target override, e.g. `WHTS_LOG=whts_frame=trace,warn`.
pub const LOG_ENV: &str = "WHTS_LOG";

/// Crates whose events follow `--log-level`. Everything else is capped at warn.
const WHTS_TARGETS: [&str; 5] = [
    "whts",
    "whts_transport",
    "whts_frame",
    "whts_message",
    "whts_processor",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Protocol crates at `level`, dependencies no chattier than warn.
pub fn default_targets(level: LogLevel) -> Targets {
    let level = level.as_filter();
    WHTS_TARGETS.iter().fold(
        Targets::new().with_default(level.min(LevelFilter::WARN)),
        |targets, target| targets.with_target(*target, level),
    )
}

/// Pick the filter: a valid `WHTS_LOG` value wins over `--log-level`.
///
/// An unparsable override is returned alongside the default so the caller
/// can report it once logging is up.
fn resolve_filter(level: LogLevel, env: Option<&str>) -> (Targets, Option<String>) {
    match env.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => (default_targets(level), None),
        Some(raw) => match raw.parse::<Targets>() {
            Ok(targets) => (targets, None),
            Err(err) => (default_targets(level), Some(format!("{raw:?}: {err}"))),
        },
    }
}

/// Route library and CLI diagnostics to stderr so stdout stays parseable.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let env = std::env::var(LOG_ENV).ok();
    let (filter, rejected) = resolve_filter(level, env.as_deref());

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    let _ = match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(layer.json().with_filter(filter))
            .try_init(),
    };

    if let Some(rejected) = rejected {
        tracing::warn!(env = LOG_ENV, value = %rejected, "ignoring invalid log filter");
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn protocol_crates_follow_the_level() {
        let targets = default_targets(LogLevel::Debug);
        assert!(targets.would_enable("whts_frame::reassembly", &Level::DEBUG));
        assert!(targets.would_enable("whts", &Level::DEBUG));
        assert!(!targets.would_enable("whts_processor", &Level::TRACE));
    }

    #[test]
    fn dependencies_are_capped_at_warn() {
        let targets = default_targets(LogLevel::Trace);
        assert!(targets.would_enable("mio::poll", &Level::WARN));
        assert!(!targets.would_enable("mio::poll", &Level::INFO));

        let quiet = default_targets(LogLevel::Error);
        assert!(!quiet.would_enable("mio::poll", &Level::WARN));
        assert!(!quiet.would_enable("whts_transport", &Level::WARN));
    }

    #[test]
    fn env_override_replaces_the_default() {
        let (targets, rejected) =
            resolve_filter(LogLevel::Error, Some("whts_frame=trace,info"));
        assert!(rejected.is_none());
        assert!(targets.would_enable("whts_frame", &Level::TRACE));
        assert!(targets.would_enable("whts_message", &Level::INFO));
        assert!(!targets.would_enable("whts_message", &Level::DEBUG));
    }

    #[test]
    fn invalid_or_blank_override_falls_back() {
        let (targets, rejected) = resolve_filter(LogLevel::Info, Some("whts=loud"));
        assert!(rejected.is_some_and(|msg| msg.contains("whts=loud")));
        assert!(targets.would_enable("whts", &Level::INFO));

        let (_, rejected) = resolve_filter(LogLevel::Info, Some("  "));
        assert!(rejected.is_none());
    }
}
