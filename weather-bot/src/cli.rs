use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use weather_core::{
    Config, Credentials, OpenWeatherProvider, Settings, TelegramClient, WeatherBot,
    config::{API_KEY_VAR, check_tokens, env_lookup},
    weather_report,
};

use crate::logging;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-bot",
    version,
    about = "Telegram bot that answers a city name with the current weather"
)]
pub struct Cli {
    /// Settings file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Greet the configured chat and answer messages until Ctrl-C.
    Run,

    /// Verify that all required credentials are set.
    Check,

    /// Print the weather report for a city without touching Telegram.
    Show {
        /// City name, passed to the provider as is.
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = Settings::load(self.config.as_deref()).context("Failed to load settings")?;
        logging::init(&settings.log)?;

        match self.command {
            Command::Run => {
                let credentials =
                    Credentials::from_env().context("Program stopped: credentials are missing")?;
                let config = Config {
                    credentials,
                    settings,
                };

                let messenger = TelegramClient::from_config(&config)
                    .context("Failed to initialise the Telegram client")?;
                let bot = WeatherBot::from_config(
                    OpenWeatherProvider::from_config(&config),
                    messenger,
                    &config,
                );

                bot.run().await.context("Failed to greet the configured chat")?;
                info!("Bot stopped");
            }
            Command::Check => {
                if !check_tokens(env_lookup) {
                    bail!("Some required credentials are missing");
                }
                info!("All credentials are present");
            }
            Command::Show { city } => {
                let api_key = env_lookup(API_KEY_VAR)
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| anyhow!("{API_KEY_VAR} is not set"))?;

                let provider = OpenWeatherProvider::new(api_key, settings.weather);
                let report = weather_report(&provider, &city).await?;
                print!("{report}");
            }
        }

        Ok(())
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
    fn parses_show_with_global_config() {
        let cli = Cli::try_parse_from([
            "weather-bot",
            "show",
            "Saint Petersburg",
            "--config",
            "bot.toml",
        ])
        .expect("valid arguments");

        assert_eq!(cli.config, Some(PathBuf::from("bot.toml")));
        match cli.command {
            Command::Show { city } => assert_eq!(city, "Saint Petersburg"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["weather-bot"]).is_err());
    }
}
