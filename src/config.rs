use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

use crate::clock::{DEFAULT_REFRESH, REFERENCE_TIMEZONE};

pub const ENV_TIMEZONE: &str = "IDADE_TIMEZONE";
pub const ENV_REFRESH_SECS: &str = "IDADE_REFRESH_SECS";
pub const ENV_STORAGE: &str = "IDADE_STORAGE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub timezone: Tz,
    pub refresh: Duration,
    pub storage_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: REFERENCE_TIMEZONE,
            refresh: DEFAULT_REFRESH,
            storage_path: default_storage_path(),
        }
    }
}

impl Config {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable lookup; unset or empty variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(tz) = var(ENV_TIMEZONE) {
            config.timezone = tz
                .trim()
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("{ENV_TIMEZONE}={tz:?} is not an IANA timezone"))?;
        }

        if let Some(secs) = var(ENV_REFRESH_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{ENV_REFRESH_SECS}={secs:?} is not a number of seconds"))?;
            if secs == 0 {
                bail!("{ENV_REFRESH_SECS} must be greater than zero");
            }
            config.refresh = Duration::from_secs(secs);
        }

        if let Some(path) = var(ENV_STORAGE) {
            config.storage_path = PathBuf::from(path);
        }

        Ok(config)
    }
}

/// `<data dir>/idade/storage.json`, or the working directory when the
/// platform has no data dir.
fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("idade"))
        .unwrap_or_default()
        .join("storage.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(config.refresh, Duration::from_secs(60));
        assert!(config.storage_path.ends_with("storage.json"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_TIMEZONE, "Europe/Lisbon"),
            (ENV_REFRESH_SECS, "5"),
            (ENV_STORAGE, "/tmp/idade.json"),
        ]))
        .unwrap();
        assert_eq!(config.timezone, chrono_tz::Europe::Lisbon);
        assert_eq!(config.refresh, Duration::from_secs(5));
        assert_eq!(config.storage_path, PathBuf::from("/tmp/idade.json"));
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = Config::from_lookup(lookup(&[(ENV_TIMEZONE, "  ")])).unwrap();
        assert_eq!(config.timezone, REFERENCE_TIMEZONE);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[(ENV_TIMEZONE, "Mars/Olympus")])).is_err());
        assert!(Config::from_lookup(lookup(&[(ENV_REFRESH_SECS, "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[(ENV_REFRESH_SECS, "soon")])).is_err());
    }
}
