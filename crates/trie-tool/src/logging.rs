use tracing_subscriber::prelude::*;

/// Environment variable read for a full `EnvFilter` directive when
/// `--log-level` is not given.
pub const LOG_ENV: &str = "TRIE_TOOL_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    #[default]
    None,
    Debug,
    Info,
    Warn,
    Error,
}

impl core::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "expected 'none', 'debug', 'info', 'warn', or 'error', got '{s}'"
            )),
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Installs the stderr subscriber. An explicit `--log-level` wins over
/// `TRIE_TOOL_LOG`; with neither, only warnings and errors are shown.
pub fn init(level: LogLevel) {
    let (filter, explicit) = match level {
        LogLevel::None => match tracing_subscriber::EnvFilter::try_from_env(LOG_ENV) {
            Ok(f) => (f, true),
            Err(_) => (tracing_subscriber::EnvFilter::new("warn"), false),
        },
        level => (tracing_subscriber::EnvFilter::new(level.to_string()), true),
    };
    tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_indent_lines(true)
                .with_verbose_exit(explicit)
                .with_verbose_entry(explicit)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::LogLevel;

    #[test]
    fn log_level_round_trips_through_text() {
        for level in [
            LogLevel::None,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
        assert!("trace".parse::<LogLevel>().is_err());
    }
}
