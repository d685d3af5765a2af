use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use crate::{lookup::JsonLookup, model::WeatherObservation};

/// Flatten a current-weather response, stamped with the local time now.
pub fn flatten(response: &Value) -> WeatherObservation {
    flatten_at(response, Local::now().naive_local())
}

/// Flatten a current-weather response captured at `captured_at`.
///
/// Never fails: anything the response lacks, including the whole object when
/// the top level is not an object, comes out as `None`.
pub fn flatten_at(response: &Value, captured_at: NaiveDateTime) -> WeatherObservation {
    let r = response;

    WeatherObservation {
        timestamp: Some(iso_timestamp(captured_at)),
        api_timestamp: r.i64_at("/dt"),
        city_id: r.i64_at("/id"),
        city_name: r.string_at("/name"),
        country: r.string_at("/sys/country"),
        lat: r.f64_at("/coord/lat"),
        lon: r.f64_at("/coord/lon"),
        timezone: r.i64_at("/timezone"),

        // Only the primary condition is recorded.
        weather_id: r.i64_at("/weather/0/id"),
        weather_main: r.string_at("/weather/0/main"),
        weather_description: r.string_at("/weather/0/description"),

        temp: r.f64_at("/main/temp"),
        feels_like: r.f64_at("/main/feels_like"),
        temp_min: r.f64_at("/main/temp_min"),
        temp_max: r.f64_at("/main/temp_max"),
        pressure: r.number_at("/main/pressure"),
        humidity: r.number_at("/main/humidity"),
        sea_level_pressure: r.number_at("/main/sea_level"),
        grnd_level_pressure: r.number_at("/main/grnd_level"),

        visibility: r.i64_at("/visibility"),
        wind_speed: r.f64_at("/wind/speed"),
        wind_direction: r.number_at("/wind/deg"),
        clouds_all: r.i64_at("/clouds/all"),
        sunrise: r.i64_at("/sys/sunrise"),
        sunset: r.i64_at("/sys/sunset"),
    }
}

fn iso_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
