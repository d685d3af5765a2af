use chrono::{Datelike, Local};
use tracing::info;

use crate::{
    config::Settings,
    error::PipelineError,
    flatten::flatten,
    model::WeatherObservation,
    source::ObservationSource,
    writer::{AppendOutcome, append_observation, resolve_output_path},
};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub observation: WeatherObservation,
    pub outcome: AppendOutcome,
}

/// Fetch one observation and flatten it, without touching the filesystem.
pub async fn preview_observation(
    settings: &Settings,
    source: &dyn ObservationSource,
) -> Result<WeatherObservation, PipelineError> {
    let response = source.fetch(&settings.request_url()).await?;
    Ok(flatten(&response))
}

/// Fetch one observation, flatten it and append it to the output file.
///
/// Nothing is written unless the fetch succeeds.
pub async fn record_observation(
    settings: &Settings,
    source: &dyn ObservationSource,
) -> Result<Recorded, PipelineError> {
    let observation = preview_observation(settings, source).await?;

    let year = Local::now().year();
    let path = resolve_output_path(settings.output_path.as_deref(), &observation, year);
    info!(path = %path.display(), "writing observation");

    let outcome = append_observation(&path, &observation)?;

    Ok(Recorded {
        observation,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        error::FetchError,
        model::FIELD_NAMES,
        source::openweather::OpenWeatherSource,
    };
    use async_trait::async_trait;
    use reqwest::Url;
    use serde_json::{Value, json};
    use std::{
        path::Path,
        sync::{Arc, Mutex},
    };

    #[derive(Debug, Default)]
    struct StubSource {
        response: Value,
        requested: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ObservationSource for StubSource {
        async fn fetch(&self, url: &Url) -> Result<Value, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(self.response.clone())
        }
    }

    fn settings(output: Option<&Path>) -> Settings {
        Config {
            api_key: Some("KEY".into()),
            output_path: output.map(Path::to_path_buf),
            ..Default::default()
        }
        .resolve()
        .unwrap()
    }

    #[tokio::test]
    async fn records_to_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("danang.csv");
        let source = StubSource {
            response: json!({"name": "Danang", "coord": {"lat": 16.05, "lon": 108.2}}),
            ..Default::default()
        };

        let recorded = record_observation(&settings(Some(&path)), &source)
            .await
            .unwrap();

        assert_eq!(recorded.outcome.path, path);
        assert!(recorded.outcome.header_written);
        assert_eq!(recorded.observation.city_name.as_deref(), Some("Danang"));

        let requested = source.requested.lock().unwrap();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].ends_with("?lat=16.0544&lon=108.2022&appid=KEY"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().next(), Some(FIELD_NAMES.join(",").as_str()));
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn two_runs_share_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("danang.csv");
        let source = StubSource {
            response: json!({"dt": 1}),
            ..Default::default()
        };
        let settings = settings(Some(&path));

        record_observation(&settings, &source).await.unwrap();
        let second = record_observation(&settings, &source).await.unwrap();

        assert!(!second.outcome.header_written);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[tokio::test]
    async fn preview_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("danang.csv");
        let source = StubSource {
            response: json!({"id": 42}),
            ..Default::default()
        };

        let obs = preview_observation(&settings(Some(&path)), &source)
            .await
            .unwrap();

        assert_eq!(obs.city_id, Some(42));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn transport_failure_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("danang.csv");
        let settings = Config {
            api_key: Some("KEY".into()),
            api_url: Some("http://127.0.0.1:1/data/2.5/weather".into()),
            output_path: Some(path.clone()),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        let err = record_observation(&settings, &OpenWeatherSource::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Fetch(FetchError::Transport(_))));
        assert!(!path.exists());
    }
}
