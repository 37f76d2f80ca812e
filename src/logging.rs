//! Tracing subscriber setup

use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of log lines. Chosen per environment unless `LOG_FORMAT`
/// overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }

    pub fn default_for(env: &Environment) -> Self {
        match env {
            Environment::Dev => Self::Pretty,
            Environment::Staging => Self::Compact,
            Environment::Prod => Self::Json,
        }
    }
}

/// Filter used when `RUST_LOG` is not set.
fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "pagekit_backend=debug,tower_http=debug,info",
        Environment::Staging => "pagekit_backend=debug,tower_http=info,info",
        Environment::Prod => "pagekit_backend=info,tower_http=info,warn",
    }
}

pub fn init_logging(env: &Environment, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    // Source locations only help while developing
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt_layer.json()).init(),
        LogFormat::Pretty => registry.with(fmt_layer.pretty()).init(),
        LogFormat::Compact => registry.with(fmt_layer.compact()).init(),
    }

    tracing::info!(?format, "Logging initialized for {:?} environment", env);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_parse() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse(" compact "), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn environment_picks_format_and_filter() {
        assert_eq!(LogFormat::default_for(&Environment::Prod), LogFormat::Json);
        assert_eq!(LogFormat::default_for(&Environment::Dev), LogFormat::Pretty);
        assert!(default_directives(&Environment::Prod).starts_with("pagekit_backend=info"));
        assert!(EnvFilter::try_new(default_directives(&Environment::Staging)).is_ok());
    }
}
