//! Logging initialization module

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for interactive use
    Development,
    /// JSON structured output for wrapping tools
    Production,
    /// No-op registry; tests install `init_test_capture()` instead
    Test,
}

impl Profile {
    /// Parse a `--log-format` value (`pretty` or `json`)
    pub fn from_format(format: &str) -> Option<Self> {
        match format {
            "pretty" => Some(Profile::Development),
            "json" => Some(Profile::Production),
            _ => None,
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call has an effect. `RUST_LOG` overrides the profile's
/// default filter.
///
/// # Profiles
///
/// - **Development**: human-readable logs, `reword=debug`
/// - **Production**: JSON logs, `reword=info`
/// - **Test**: bare registry
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("reword=debug")),
                )
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("reword=info")),
                )
                .init();
        }
        Profile::Test => {
            tracing_subscriber::registry().init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_format() {
        assert_eq!(Profile::from_format("pretty"), Some(Profile::Development));
        assert_eq!(Profile::from_format("json"), Some(Profile::Production));
        assert_eq!(Profile::from_format("xml"), None);
    }
}
