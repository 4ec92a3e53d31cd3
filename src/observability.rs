//! Observability utilities.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::{LogFormat, LogLevel};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing subscriber once for the process.
///
/// `RUST_LOG` wins over the configured level when set. `debug` adds
/// per-request logging from `tower_http`.
pub fn init_tracing(level: LogLevel, format: LogFormat, debug: bool) {
    TRACING_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter_directives(level, debug)));

        let result = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init(),
            LogFormat::Text => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact())
                .try_init(),
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}

fn filter_directives(level: LogLevel, debug: bool) -> String {
    if debug {
        format!("{},tower_http=debug", level.as_directive())
    } else {
        level.as_directive().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing(LogLevel::Info, LogFormat::Text, false);
        init_tracing(LogLevel::Debug, LogFormat::Json, true);
    }

    #[test]
    fn debug_enables_http_tracing() {
        assert_eq!(filter_directives(LogLevel::Warn, false), "warn");
        assert_eq!(
            filter_directives(LogLevel::Info, true),
            "info,tower_http=debug"
        );
    }
}
