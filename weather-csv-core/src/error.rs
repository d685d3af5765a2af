use std::path::PathBuf;

use thiserror::Error;

/// The observation could not be retrieved or decoded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to send request to OpenWeather")]
    Transport(#[source] reqwest::Error),

    #[error("OpenWeather request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to read OpenWeather response body")]
    Body(#[source] reqwest::Error),

    #[error("failed to parse OpenWeather response as JSON")]
    Decode(#[from] serde_json::Error),
}

/// The observation could not be appended to the output file.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write a row to {}", path.display())]
    Row {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to flush {}", path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No OpenWeather API key configured.\n\
         Hint: set WEATHER_API_KEY, pass --api-key, or run `weather-csv configure`."
    )]
    MissingApiKey,

    #[error("Invalid {axis} coordinate '{value}': expected a decimal number")]
    InvalidCoordinate { axis: &'static str, value: String },

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid timeout '{0}': expected a whole number of seconds")]
    InvalidTimeout(String),

    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to read config file: {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {}", path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure of one pipeline run, split by the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
