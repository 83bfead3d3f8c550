use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select};
use tracing::{debug, info};
use weatherpanel_core::{
    Config, PanelDriver, Services, ViewModel, WeatherPanel, WeatherQuery,
};

use crate::render::render_text;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherpanel", version, about = "Current weather and a short forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show weather for a single city.
    Show {
        /// City name, e.g. "Lagos".
        city: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Interactive panel: weather for the current location, then pick a
    /// country and city.
    Panel {
        /// Latitude to use instead of detecting the location.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude to use instead of detecting the location.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Skip the startup location lookup.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        no_locate: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Print the view model as JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl OutputArgs {
    fn print(&self, driver: &PanelDriver) -> Result<()> {
        let view = ViewModel::derive(driver.panel(), &chrono::Local);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            print!("{}", render_text(&view)?);
        }
        Ok(())
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, output } => {
                let config = Config::load()?.with_env_overrides();
                let mut driver = driver_for(&config)?;

                debug!(%city, policy = ?config.fetch_policy, "fetching weather");
                driver.fetch(WeatherQuery::city(city));
                driver.run_until_idle().await;
                output.print(&driver)
            }
            Command::Panel {
                lat,
                lon,
                no_locate,
                output,
            } => {
                let mut config = Config::load()?.with_env_overrides();
                if lat.is_some() {
                    config.location.latitude = lat;
                    config.location.longitude = lon;
                }
                if no_locate {
                    config.location.latitude = None;
                    config.location.longitude = None;
                    config.location.auto_detect = false;
                }
                run_panel(&config, &output).await
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.require_api_key()?;
    config.save()?;

    let path = Config::config_file_path()?;
    info!(path = %path.display(), "configuration saved");
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn driver_for(config: &Config) -> Result<PanelDriver> {
    let services = Services::from_config(config)?;
    let panel = WeatherPanel::new(config.fetch_policy).with_position_units(config.units);
    Ok(PanelDriver::new(panel, services))
}

async fn run_panel(config: &Config, output: &OutputArgs) -> Result<()> {
    let mut driver = driver_for(config)?;

    driver.mount();
    driver.run_until_idle().await;
    output.print(&driver)?;

    loop {
        let countries: Vec<String> = driver.panel().country_options().map(str::to_string).collect();
        if countries.is_empty() {
            info!("country list unavailable, leaving panel");
            println!("No countries available; city selection is disabled.");
            return Ok(());
        }

        let Some(country) = choose("Country", countries).await? else {
            return Ok(());
        };
        driver.select_country(&country)?;

        let cities = driver.panel().cities().to_vec();
        if cities.is_empty() {
            debug!(%country, "country has no cities");
            println!("No cities listed for {country}.");
            continue;
        }

        let Some(city) = choose("City", cities).await? else {
            continue;
        };
        driver.select_city(&city)?;

        output.print(&driver)?;
        driver.run_until_idle().await;
        output.print(&driver)?;
    }
}

/// Run a selector prompt off the async runtime. `None` when the user escapes.
async fn choose(label: &'static str, options: Vec<String>) -> Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(move || Select::new(label, options).prompt()).await?;

    match answer {
        Ok(choice) => Ok(Some(choice)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_show_with_json() {
        let cli = Cli::try_parse_from(["weatherpanel", "show", "Lagos", "--json"]).unwrap();
        match cli.command {
            Command::Show { city, output } => {
                assert_eq!(city, "Lagos");
                assert!(output.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn panel_coordinates_must_come_in_pairs() {
        assert!(Cli::try_parse_from(["weatherpanel", "panel", "--lat", "6.45"]).is_err());

        let cli =
            Cli::try_parse_from(["weatherpanel", "panel", "--lat", "-33.9", "--lon", "18.4"])
                .unwrap();
        match cli.command {
            Command::Panel { lat, lon, no_locate, .. } => {
                assert_eq!(lat, Some(-33.9));
                assert_eq!(lon, Some(18.4));
                assert!(!no_locate);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_locate_conflicts_with_coordinates() {
        assert!(
            Cli::try_parse_from([
                "weatherpanel",
                "panel",
                "--no-locate",
                "--lat",
                "1",
                "--lon",
                "2"
            ])
            .is_err()
        );
    }
}
