use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Column names of the output file, in the order every row is written.
pub const FIELD_NAMES: [&str; 25] = [
    "timestamp",
    "api_timestamp",
    "city_id",
    "city_name",
    "country",
    "lat",
    "lon",
    "timezone",
    "weather_id",
    "weather_main",
    "weather_description",
    "temp",
    "feels_like",
    "temp_min",
    "temp_max",
    "pressure",
    "humidity",
    "sea_level_pressure",
    "grnd_level_pressure",
    "visibility",
    "wind_speed",
    "wind_direction",
    "clouds_all",
    "sunrise",
    "sunset",
];

/// One flattened observation, one row of the output file.
///
/// Field declaration order is the column order: serializing this struct
/// through `csv` relies on it matching [`FIELD_NAMES`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Local wall-clock time the observation was captured, ISO-8601.
    pub timestamp: Option<String>,
    /// Measurement time reported by the API, Unix seconds.
    pub api_timestamp: Option<i64>,
    pub city_id: Option<i64>,
    pub city_name: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// UTC offset in seconds.
    pub timezone: Option<i64>,

    pub weather_id: Option<i64>,
    pub weather_main: Option<String>,
    pub weather_description: Option<String>,

    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    // Readings are kept as the API's own number, integral or not.
    pub pressure: Option<Number>,
    pub humidity: Option<Number>,
    pub sea_level_pressure: Option<Number>,
    pub grnd_level_pressure: Option<Number>,

    /// Meters.
    pub visibility: Option<i64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<Number>,
    pub clouds_all: Option<i64>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}
