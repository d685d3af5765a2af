use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use weather_csv_core::{
    Config, PipelineError, Settings,
    config::{DEFAULT_LAT, DEFAULT_LON},
    preview_observation, record_observation, source_from_settings,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-csv",
    version,
    about = "Append the current OpenWeatherMap observation to a CSV file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub overrides: Overrides,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Flags that override the config file and the environment.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// OpenWeatherMap API key [env: WEATHER_API_KEY]
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Latitude to query [env: WEATHER_LAT, default: 16.0544]
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub lat: Option<String>,

    /// Longitude to query [env: WEATHER_LON, default: 108.2022]
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub lon: Option<String>,

    /// Output CSV path [env: CSV_OUTPUT_PATH, default: {year}-{lat}-{lon}.csv]
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds [env: WEATHER_TIMEOUT_SECS, default: 30]
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the current observation and append it to the CSV file (default).
    Record,

    /// Fetch and flatten the current observation, print it as JSON, write nothing.
    Preview,

    /// Interactively store the API key and coordinates in the config file.
    Configure,

    /// Print the location of the config file.
    ConfigPath,
}

impl Overrides {
    fn into_layer(self) -> Config {
        Config {
            api_key: self.api_key,
            lat: self.lat,
            lon: self.lon,
            output_path: self.output,
            api_url: None,
            timeout_secs: self.timeout,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Record) {
            Command::Record => {
                let settings = load_settings(self.overrides)?;
                let source = source_from_settings(&settings).map_err(PipelineError::from)?;

                println!("Fetching weather data...");
                let recorded = record_observation(&settings, source.as_ref()).await?;

                println!(
                    "Weather data appended to {}",
                    recorded.outcome.path.display()
                );
            }
            Command::Preview => {
                let settings = load_settings(self.overrides)?;
                let source = source_from_settings(&settings).map_err(PipelineError::from)?;

                let observation = preview_observation(&settings, source.as_ref()).await?;
                let json = serde_json::to_string_pretty(&observation)
                    .context("Failed to render observation as JSON")?;
                println!("{json}");
            }
            Command::Configure => configure()?,
            Command::ConfigPath => {
                let path = Config::config_file_path().map_err(PipelineError::from)?;
                println!("{}", path.display());
            }
        }

        Ok(())
    }
}

fn load_settings(overrides: Overrides) -> anyhow::Result<Settings> {
    let path = Config::config_file_path().map_err(PipelineError::from)?;
    load_settings_from(&path, overrides)
}

/// Config file at `path`, then environment, then flags.
fn load_settings_from(path: &Path, overrides: Overrides) -> anyhow::Result<Settings> {
    let file = Config::load_from(path).map_err(PipelineError::from)?;
    let env = Config::from_env().map_err(PipelineError::from)?;

    let settings = file
        .merge(env)
        .merge(overrides.into_layer())
        .resolve()
        .map_err(PipelineError::from)?;

    tracing::debug!(lat = %settings.lat, lon = %settings.lon, "resolved settings");
    Ok(settings)
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load().map_err(PipelineError::from)?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(inquire::required!("API key must not be empty"))
        .prompt()
        .context("Failed to read API key")?;

    let lat = prompt_coordinate("Latitude:", cfg.lat.as_deref().unwrap_or(DEFAULT_LAT))?;
    let lon = prompt_coordinate("Longitude:", cfg.lon.as_deref().unwrap_or(DEFAULT_LON))?;

    let output = Text::new("Output CSV path (leave empty to derive from year and coordinates):")
        .with_initial_value(
            &cfg.output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
        .prompt()
        .context("Failed to read output path")?;

    cfg.api_key = Some(api_key.trim().to_string());
    cfg.lat = Some(lat.to_string());
    cfg.lon = Some(lon.to_string());
    cfg.output_path = Some(output.trim())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    // Validate the result the same way a run would.
    cfg.clone().resolve().map_err(PipelineError::from)?;

    let path = cfg.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

fn prompt_coordinate(label: &str, default: &str) -> anyhow::Result<f64> {
    let default: f64 = default.trim().parse().unwrap_or_default();

    CustomType::<f64>::new(label)
        .with_default(default)
        .with_error_message("Please enter a decimal number")
        .prompt()
        .with_context(|| format!("Failed to read {}", label.trim_end_matches(':').to_lowercase()))
}
