use crate::error::ConfigError;
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/files/upload";
pub const DEFAULT_FIELD_NAME: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Where the multipart POST goes
    pub endpoint: Url,
    /// Form field shared by every file part
    pub field_name: String,
    /// Whole-request timeout; `None` leaves it to the transport
    pub timeout: Option<Duration>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, applying defaults per key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("UPLOAD_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(endpoint.trim()).map_err(|e| {
            ConfigError::ValidationError(format!("UPLOAD_ENDPOINT {endpoint:?}: {e}"))
        })?;

        let field_name = lookup("UPLOAD_FIELD_NAME")
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| DEFAULT_FIELD_NAME.to_string());

        let timeout = match lookup("UPLOAD_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ConfigError::ValidationError(format!(
                        "UPLOAD_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let log_format = match lookup("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Plain,
        };

        let config = Config {
            endpoint,
            field_name,
            timeout,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "UPLOAD_ENDPOINT must use http or https, got {}",
                self.endpoint.scheme()
            )));
        }
        if self.field_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "UPLOAD_FIELD_NAME must not be empty".to_string(),
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ValidationError(
                "UPLOAD_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
