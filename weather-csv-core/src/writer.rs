//! Appending observations to the output CSV file.

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    error::WriteError,
    model::{FIELD_NAMES, WeatherObservation},
};

/// What a single append did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    pub path: PathBuf,
    /// True when the file did not exist and the header row was written first.
    pub header_written: bool,
}

/// Append `observation` as one row to `path`, creating the file with a
/// header row if it does not exist yet.
///
/// Existence is checked before opening, so two processes appending to the
/// same fresh path at once can both write a header.
pub fn append_observation(
    path: &Path,
    observation: &WeatherObservation,
) -> Result<AppendOutcome, WriteError> {
    let header_written = !path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| WriteError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    let row_err = |source: csv::Error| WriteError::Row {
        path: path.to_path_buf(),
        source,
    };

    if header_written {
        debug!(path = %path.display(), "creating output file with header");
        wtr.write_record(FIELD_NAMES).map_err(row_err)?;
    }
    wtr.serialize(observation).map_err(row_err)?;

    wtr.flush().map_err(|source| WriteError::Flush {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), header_written, "appended observation");

    Ok(AppendOutcome {
        path: path.to_path_buf(),
        header_written,
    })
}

/// `{year}-{lat}-{lon}.csv`, with `unknown` standing in for a missing coordinate.
///
/// Integral coordinates keep their `.0` (`16.0`), matching how the CSV cells render them.
pub fn csv_filename(year: i32, lat: Option<f64>, lon: Option<f64>) -> String {
    let coord = |v: Option<f64>| v.map_or_else(|| "unknown".to_string(), |v| format!("{v:?}"));
    format!("{year}-{}-{}.csv", coord(lat), coord(lon))
}

/// The configured path verbatim if there is one, else a name derived from the
/// coordinates the API reported for this observation.
pub fn resolve_output_path(
    configured: Option<&Path>,
    observation: &WeatherObservation,
    year: i32,
) -> PathBuf {
    match configured {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(csv_filename(year, observation.lat, observation.lon)),
    }
}
