//! Configuration management
//!
//! Loads settings from a TOML file. Every section has defaults except the
//! webhook URL, which must be provided before anything is submitted.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Lead webhook settings
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Form surface behaviour
    #[serde(default)]
    pub form: FormConfig,

    /// Routing settings
    #[serde(default)]
    pub router: RouterConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WebhookConfig {
    /// Endpoint receiving the lead JSON
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds; unset leaves the transport default
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Connection timeout in seconds
    #[serde(default)]
    pub connect_timeout: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FormConfig {
    /// Fallback for `utm_source` when the query string has none
    #[serde(default)]
    pub default_utm_source: String,

    /// Delay between the success acknowledgement and the redirect
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            default_utm_source: String::new(),
            redirect_delay_ms: default_redirect_delay_ms(),
        }
    }
}

impl FormConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RouterConfig {
    /// Path prefix the site is served under, e.g. "/Updated-landing"
    #[serde(default)]
    pub basename: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_user_agent() -> String {
    format!("leadcap/{}", env!("CARGO_PKG_VERSION"))
}

fn default_redirect_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from `explicit`, or the first file found in the
    /// standard locations, or use defaults if none exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let config_paths = vec![
            PathBuf::from("config.toml"),
            PathBuf::from("/etc/leadcap/config.toml"),
            dirs::home_dir()
                .map(|h| h.join(".config/leadcap/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        // Logging is not initialised yet, so nothing is reported here
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// The webhook endpoint, checked to be an absolute http(s) URL
    pub fn webhook_url(&self) -> Result<reqwest::Url> {
        if self.webhook.url.trim().is_empty() {
            bail!("webhook.url is not configured");
        }
        let url = reqwest::Url::parse(self.webhook.url.trim())
            .context("webhook.url is not a valid URL")?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("webhook.url must use http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.form.redirect_delay(), Duration::from_secs(1));
        assert_eq!(cfg.form.default_utm_source, "");
        assert_eq!(cfg.http.timeout, None);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.webhook_url().is_err());
    }

    #[test]
    fn test_parse_full() {
        let cfg = Config::parse(
            r#"
            [webhook]
            url = "https://hooks.example.com/lead?sig=abc"

            [http]
            timeout = 15

            [form]
            default_utm_source = "direct"
            redirect_delay_ms = 250

            [router]
            basename = "/Updated-landing"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.http.timeout, Some(15));
        assert_eq!(cfg.form.default_utm_source, "direct");
        assert_eq!(cfg.form.redirect_delay(), Duration::from_millis(250));
        assert_eq!(cfg.router.basename, "/Updated-landing");
        assert_eq!(cfg.webhook_url().unwrap().query(), Some("sig=abc"));
    }

    #[test]
    fn test_rejects_non_http_webhook() {
        let cfg = Config::parse("[webhook]\nurl = \"ftp://example.com/x\"").unwrap();
        assert!(cfg.webhook_url().is_err());

        let cfg = Config::parse("[webhook]\nurl = \"not a url\"").unwrap();
        assert!(cfg.webhook_url().is_err());
    }
}
