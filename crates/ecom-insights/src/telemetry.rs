// ecom-insights/crates/ecom-insights/src/telemetry.rs

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global fmt subscriber.
///
/// `.env` is loaded first so a `RUST_LOG` kept there applies to the
/// startup logs too. A blank or unparsable `RUST_LOG` falls back to `info`.
pub fn init_tracing() {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn log_filter(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|directive| !directive.is_empty())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_filter_defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("   ")).to_string(), "info");
    }

    #[test]
    fn test_filter_directive_is_honoured() {
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
        assert_eq!(log_filter(Some(" warn ")).to_string(), "warn");
    }
}
