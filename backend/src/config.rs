use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub bridge_url: Option<String>,
    pub bridge_timeout: Option<Duration>,
    pub max_concurrency: usize,
    pub max_upload_bytes: usize,
    pub csrf_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
            bridge_url: None,
            bridge_timeout: None,
            max_concurrency: 1,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            csrf_enabled: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Unset or
    /// blank variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let max_concurrency = match get("INFERENCE_MAX_CONCURRENCY") {
            Some(raw) => {
                let parsed: usize = parse("INFERENCE_MAX_CONCURRENCY", &raw)?;
                if parsed == 0 {
                    return Err(ConfigError::InvalidValue {
                        name: "INFERENCE_MAX_CONCURRENCY",
                        value: raw,
                        reason: "must be at least 1".to_string(),
                    });
                }
                parsed
            }
            None => defaults.max_concurrency,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .map(|raw| parse("PORT", &raw))
                .transpose()?
                .unwrap_or(defaults.port),
            static_dir: get("STATIC_DIR").unwrap_or(defaults.static_dir),
            bridge_url: get("YOLOV9_BRIDGE_URL"),
            bridge_timeout: get("YOLOV9_BRIDGE_TIMEOUT_SECS")
                .map(|raw| parse::<u64>("YOLOV9_BRIDGE_TIMEOUT_SECS", &raw))
                .transpose()?
                .map(Duration::from_secs),
            max_concurrency,
            max_upload_bytes: get("MAX_UPLOAD_BYTES")
                .map(|raw| parse("MAX_UPLOAD_BYTES", &raw))
                .transpose()?
                .unwrap_or(defaults.max_upload_bytes),
            csrf_enabled: get("CSRF_ENABLED")
                .map(|raw| parse_bool("CSRF_ENABLED", &raw))
                .transpose()?
                .unwrap_or(defaults.csrf_enabled),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.bridge_url, None);
        assert_eq!(config.bridge_timeout, None);
        assert_eq!(config.max_concurrency, 1);
        assert!(config.csrf_enabled);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("YOLOV9_BRIDGE_URL", "http://127.0.0.1:7000"),
            ("YOLOV9_BRIDGE_TIMEOUT_SECS", "30"),
            ("INFERENCE_MAX_CONCURRENCY", "4"),
            ("CSRF_ENABLED", "off"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bridge_url.as_deref(), Some("http://127.0.0.1:7000"));
        assert_eq!(config.bridge_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_concurrency, 4);
        assert!(!config.csrf_enabled);
    }

    #[test]
    fn blank_bridge_url_counts_as_unset() {
        let config = config_from(&[("YOLOV9_BRIDGE_URL", "  ")]).unwrap();
        assert_eq!(config.bridge_url, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("PORT", "http")]).is_err());
        assert!(config_from(&[("INFERENCE_MAX_CONCURRENCY", "0")]).is_err());
        assert!(config_from(&[("CSRF_ENABLED", "maybe")]).is_err());
    }
}
