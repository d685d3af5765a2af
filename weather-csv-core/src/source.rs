use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::fmt::Debug;

use crate::{config::Settings, error::FetchError, source::openweather::OpenWeatherSource};

pub mod openweather;

/// Somewhere a raw current-weather response can be fetched from.
///
/// The response is handed back unvalidated; shaping it is the flattener's job.
#[async_trait]
pub trait ObservationSource: Send + Sync + Debug {
    async fn fetch(&self, url: &Url) -> Result<Value, FetchError>;
}

/// Construct the HTTP source from resolved settings.
pub fn source_from_settings(settings: &Settings) -> Result<Box<dyn ObservationSource>, FetchError> {
    let source = OpenWeatherSource::with_timeout(settings.timeout)?;
    Ok(Box::new(source))
}
