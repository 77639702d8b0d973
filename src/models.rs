//! Data models and structures
//!
//! Defines the client configuration and the records exchanged with the
//! storage API.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://bunnycdn.com/api/";
pub const DEFAULT_STORAGE_URL: &str = "https://storage.bunnycdn.com/";
pub const DEFAULT_CDN_SUFFIX: &str = "b-cdn.net";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One record of a directory listing.
///
/// The service returns more fields than this client cares about, so the
/// object is kept as-is and read field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingEntry(pub Map<String, Value>);

impl ListingEntry {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn object_name(&self) -> Option<&str> {
        self.str_field("ObjectName")
    }

    pub fn is_directory(&self) -> bool {
        self.field("IsDirectory")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Result of an upload: whether the service confirmed creation, and the
/// remote path the body was written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub stored: bool,
    pub remote_path: String,
}

// Configuration
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub storage_key: String,
    pub zone_name: String,
    pub timeout: Duration,
    pub debug: bool,
    pub api_url: String,
    pub storage_url: String,
    pub cdn_suffix: String,
}

impl Config {
    pub fn new(
        api_key: impl Into<String>,
        storage_key: impl Into<String>,
        zone_name: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            api_key: api_key.into(),
            storage_key: storage_key.into(),
            zone_name: zone_name.into(),
            timeout: DEFAULT_TIMEOUT,
            debug: false,
            api_url: DEFAULT_API_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            cdn_suffix: DEFAULT_CDN_SUFFIX.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the process environment, reading a `.env`
    /// file first when one exists.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Err(e) if !e.not_found() => return Err(e.into()),
            _ => {}
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup using the
    /// `BUNNYCDN_*` variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    Error::Configuration(format!(
                        "You need to set {} in your environment variables",
                        key
                    ))
                })
        };

        let mut config = Self::new(
            required("BUNNYCDN_API_KEY")?,
            required("BUNNYCDN_STORAGE_KEY")?,
            required("BUNNYCDN_PULLZONE")?,
        )?;

        if let Some(debug) = lookup("BUNNYCDN_DEBUG") {
            config.debug = parse_flag(&debug);
        }

        if let Some(secs) = lookup("BUNNYCDN_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Configuration(format!("Invalid BUNNYCDN_TIMEOUT_SECS '{}'", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("api_key", &self.api_key),
            ("storage_key", &self.storage_key),
            ("zone_name", &self.zone_name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Configuration(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_storage_url(mut self, storage_url: impl Into<String>) -> Self {
        self.storage_url = storage_url.into();
        self
    }

    pub fn with_cdn_suffix(mut self, cdn_suffix: impl Into<String>) -> Self {
        self.cdn_suffix = cdn_suffix.into();
        self
    }
}

// Keys stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("storage_key", &"<redacted>")
            .field("zone_name", &self.zone_name)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .field("api_url", &self.api_url)
            .field("storage_url", &self.storage_url)
            .field("cdn_suffix", &self.cdn_suffix)
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_new_rejects_each_empty_field() {
        assert!(matches!(
            Config::new("", "storage", "zone"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Config::new("api", "", "zone"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Config::new("api", "storage", "  "),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_new_applies_defaults() {
        let config = Config::new("api", "storage", "zone").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.debug);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.storage_url, DEFAULT_STORAGE_URL);
        assert_eq!(config.cdn_suffix, "b-cdn.net");
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = Config::from_lookup(lookup_from(&[
            ("BUNNYCDN_API_KEY", "api"),
            ("BUNNYCDN_STORAGE_KEY", "storage"),
            ("BUNNYCDN_PULLZONE", "myzone"),
            ("BUNNYCDN_DEBUG", "true"),
            ("BUNNYCDN_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "api");
        assert_eq!(config.storage_key, "storage");
        assert_eq!(config.zone_name, "myzone");
        assert!(config.debug);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_names_missing_variable() {
        let err = Config::from_lookup(lookup_from(&[
            ("BUNNYCDN_API_KEY", "api"),
            ("BUNNYCDN_PULLZONE", "myzone"),
        ]))
        .unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("BUNNYCDN_STORAGE_KEY"));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = Config::from_lookup(lookup_from(&[
            ("BUNNYCDN_API_KEY", "api"),
            ("BUNNYCDN_STORAGE_KEY", "storage"),
            ("BUNNYCDN_PULLZONE", "myzone"),
            ("BUNNYCDN_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_debug_output_redacts_keys() {
        let config = Config::new("secret-api", "secret-storage", "zone").unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-api"));
        assert!(!rendered.contains("secret-storage"));
        assert!(rendered.contains("zone"));
    }

    #[test]
    fn test_listing_entry_passes_fields_through() {
        let entry: ListingEntry = serde_json::from_str(
            r#"{"ObjectName":"a.jpg","IsDirectory":false,"Length":42,"Custom":"x"}"#,
        )
        .unwrap();

        assert_eq!(entry.object_name(), Some("a.jpg"));
        assert!(!entry.is_directory());
        assert_eq!(entry.field("Length").and_then(Value::as_u64), Some(42));
        assert_eq!(entry.str_field("Custom"), Some("x"));
    }
}
