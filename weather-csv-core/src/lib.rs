//! Core library for the `weather-csv` tool.
//!
//! This crate defines:
//! - Layered configuration (config file, environment, flags)
//! - The flattened observation record and its CSV layout
//! - Fetching the raw OpenWeatherMap response
//! - Flattening and appending it to a CSV file
//!
//! It is used by `weather-csv-cli`, but the pipeline can be driven by any
//! [`ObservationSource`].

pub mod config;
pub mod error;
pub mod flatten;
pub mod lookup;
pub mod model;
pub mod pipeline;
pub mod source;
pub mod writer;

pub use config::{Config, Settings};
pub use error::{ConfigError, FetchError, PipelineError, WriteError};
pub use flatten::{flatten, flatten_at};
pub use lookup::JsonLookup;
pub use model::{FIELD_NAMES, WeatherObservation};
pub use pipeline::{Recorded, preview_observation, record_observation};
pub use source::{ObservationSource, openweather::OpenWeatherSource, source_from_settings};
pub use writer::{AppendOutcome, append_observation, csv_filename, resolve_output_path};
