use anyhow::{bail, Context, Result};
use std::env;

use crate::api::PaginationSettings;
use crate::logging::LogFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,
    pub log_format: LogFormat,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Pagination
    pub pagination: PaginationSettings,

    /// Number of demo records inserted at startup
    pub seed_records: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let log_format = match env::var("LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw)
                .with_context(|| format!("LOG_FORMAT must be json, pretty or compact, got '{raw}'"))?,
            Err(_) => LogFormat::default_for(&env),
        };

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Pagination
        let default_page_size = parse_var("DEFAULT_PAGE_SIZE", 20)?;
        let max_page_size = parse_var("MAX_PAGE_SIZE", 100)?;
        let pagination = PaginationSettings::new(default_page_size, max_page_size)?;

        let seed_records = parse_var("SEED_RECORDS", 0)?;

        Ok(Settings {
            env,
            server_addr,
            log_format,
            cors_allow_origins,
            pagination,
            seed_records,
        })
    }
}

/// Reads a numeric variable, falling back to `default` when unset.
/// A set but unparsable value is a configuration error.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a non-negative integer, got '{raw}'")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => bail!("{name} is not valid unicode: {e}"),
    }
}

impl PaginationSettings {
    /// Validated constructor used when loading configuration.
    pub fn new(default_page_size: u32, max_page_size: u32) -> Result<Self> {
        if default_page_size == 0 {
            bail!("DEFAULT_PAGE_SIZE must be at least 1");
        }
        if default_page_size > max_page_size {
            bail!(
                "DEFAULT_PAGE_SIZE ({default_page_size}) must not exceed MAX_PAGE_SIZE ({max_page_size})"
            );
        }

        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing_is_case_insensitive() {
        assert_eq!(Environment::from_str("PRODUCTION"), Environment::Prod);
        assert_eq!(Environment::from_str("staging"), Environment::Staging);
        assert_eq!(Environment::from_str("anything-else"), Environment::Dev);
    }

    #[test]
    fn pagination_settings_reject_zero_default() {
        assert!(PaginationSettings::new(0, 10).is_err());
    }

    #[test]
    fn pagination_settings_reject_default_above_max() {
        assert!(PaginationSettings::new(50, 10).is_err());
        let settings = PaginationSettings::new(10, 10).unwrap();
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.max_page_size, 10);
    }
}
