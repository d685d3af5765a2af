use anyhow::{Context, Result};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_LAT: &str = "16.0544";
pub const DEFAULT_LON: &str = "108.2022";
pub const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_LAT: &str = "WEATHER_LAT";
pub const ENV_LON: &str = "WEATHER_LON";
pub const ENV_OUTPUT_PATH: &str = "CSV_OUTPUT_PATH";
pub const ENV_API_URL: &str = "WEATHER_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "WEATHER_TIMEOUT_SECS";

/// One layer of configuration: the config file, the environment, or CLI flags.
///
/// Every key is optional; layers are combined with [`Config::merge`] and the
/// result turned into [`Settings`] with [`Config::resolve`].
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// lat = "16.0544"
/// lon = "108.2022"
/// output_path = "/var/lib/weather/danang.csv"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<String>,
    /// Used verbatim when set; otherwise the file name is derived per run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub lat: String,
    pub lon: String,
    pub output_path: Option<PathBuf>,
    pub api_url: Url,
    pub timeout: Duration,
}

impl Config {
    /// Load config from disk, or return an empty layer if it doesn't exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weather-csv", "weather-csv")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Read the environment layer from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the environment layer through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = get(ENV_TIMEOUT_SECS)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(raw))
            })
            .transpose()?;

        Ok(Self {
            api_key: get(ENV_API_KEY),
            lat: get(ENV_LAT),
            lon: get(ENV_LON),
            output_path: get(ENV_OUTPUT_PATH).map(PathBuf::from),
            api_url: get(ENV_API_URL),
            timeout_secs,
        })
    }

    /// Overlay `higher` on top of `self`; keys set in `higher` win.
    pub fn merge(self, higher: Config) -> Config {
        Config {
            api_key: higher.api_key.or(self.api_key),
            lat: higher.lat.or(self.lat),
            lon: higher.lon.or(self.lon),
            output_path: higher.output_path.or(self.output_path),
            api_url: higher.api_url.or(self.api_url),
            timeout_secs: higher.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Apply defaults and validate.
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let api_key = self.api_key.ok_or(ConfigError::MissingApiKey)?;

        let lat = coordinate("latitude", self.lat.as_deref().unwrap_or(DEFAULT_LAT))?;
        let lon = coordinate("longitude", self.lon.as_deref().unwrap_or(DEFAULT_LON))?;

        let raw_url = self.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        let api_url = Url::parse(raw_url).map_err(|e| ConfigError::InvalidUrl {
            url: raw_url.to_string(),
            reason: e.to_string(),
        })?;

        let timeout = Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        Ok(Settings {
            api_key,
            lat,
            lon,
            output_path: self.output_path,
            api_url,
            timeout,
        })
    }
}

impl Settings {
    /// The complete current-weather request URL: `lat`, `lon` and `appid`.
    pub fn request_url(&self) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("lat", &self.lat)
            .append_pair("lon", &self.lon)
            .append_pair("appid", &self.api_key);
        url
    }
}

fn coordinate(axis: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidCoordinate {
            axis,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned()).expect("env layer should parse")
    }

    #[test]
    fn resolve_errors_when_api_key_missing() {
        let err = Config::default().resolve().unwrap_err();

        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(err.to_string().contains("WEATHER_API_KEY"));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let settings = env(&[(ENV_API_KEY, "KEY")]).resolve().unwrap();

        assert_eq!(settings.lat, DEFAULT_LAT);
        assert_eq!(settings.lon, DEFAULT_LON);
        assert_eq!(settings.output_path, None);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(settings.api_url.as_str(), DEFAULT_API_URL);
    }

    #[test]
    fn request_url_carries_three_query_parameters() {
        let settings = env(&[(ENV_API_KEY, "abc123"), (ENV_LAT, "21.0285"), (ENV_LON, "105.8542")])
            .resolve()
            .unwrap();

        assert_eq!(
            settings.request_url().as_str(),
            "https://api.openweathermap.org/data/2.5/weather?lat=21.0285&lon=105.8542&appid=abc123"
        );
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let layer = env(&[(ENV_API_KEY, ""), (ENV_LAT, "  "), (ENV_OUTPUT_PATH, "")]);
        assert_eq!(layer, Config::default());
    }

    #[test]
    fn env_reads_output_path_and_timeout() {
        let layer = env(&[(ENV_OUTPUT_PATH, "/tmp/w.csv"), (ENV_TIMEOUT_SECS, "5")]);

        assert_eq!(layer.output_path, Some(PathBuf::from("/tmp/w.csv")));
        assert_eq!(layer.timeout_secs, Some(5));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = Config::from_lookup(|k| (k == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(v) if v == "soon"));
    }

    #[test]
    fn bad_coordinate_is_rejected() {
        let err = env(&[(ENV_API_KEY, "KEY"), (ENV_LAT, "north")])
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCoordinate { axis: "latitude", .. }));
    }

    #[test]
    fn bad_api_url_is_rejected() {
        let err = env(&[(ENV_API_KEY, "KEY"), (ENV_API_URL, "not a url")])
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn higher_layer_wins_on_merge() {
        let file = Config {
            api_key: Some("FILE_KEY".into()),
            lat: Some("1.0".into()),
            lon: Some("2.0".into()),
            ..Default::default()
        };
        let from_env = env(&[(ENV_LAT, "3.5")]);

        let merged = file.merge(from_env);
        assert_eq!(merged.api_key.as_deref(), Some("FILE_KEY"));
        assert_eq!(merged.lat.as_deref(), Some("3.5"));
        assert_eq!(merged.lon.as_deref(), Some("2.0"));
    }

    #[test]
    fn save_and_load_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("OPEN_KEY".into()),
            lat: Some("16.0544".into()),
            ..Default::default()
        };
        cfg.save_to(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("api_key = \"OPEN_KEY\""));
        assert!(!written.contains("lon"));

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn unparsable_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "lat = [unterminated").unwrap();

        let err = Config::load_from(&path).unwrap_err();

        assert!(matches!(err, ConfigError::ParseFile { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a file.
        let err = Config::load_from(dir.path()).unwrap_err();

        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn missing_file_loads_as_empty_layer() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
