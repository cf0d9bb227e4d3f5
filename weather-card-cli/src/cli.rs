use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};
use std::{process::ExitCode, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use weather_card_core::{Config, Debouncer, FileStorage, WeatherProvider, provider_from_config};

use crate::search::{Outcome, search};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-card", version, about = "Current weather for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, proxy mode and timing options.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name; multiple words are joined, e.g. `show New York`.
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Read city names from stdin, one per line, looking up the last one
    /// after input pauses for the debounce window.
    Watch,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city } => {
                let config = load_config()?;
                let provider = build_provider(&config)?;

                let city = city.join(" ");
                let ok = print_outcome(search(provider.as_ref(), &city, show_loading).await);
                Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Watch => {
                let config = load_config()?;
                watch(&config).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Config from disk with environment overrides, resolved once per process.
fn load_config() -> anyhow::Result<Config> {
    Ok(Config::load()?.with_overrides(|name| std::env::var(name).ok()))
}

fn build_provider(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let storage = FileStorage::new(Config::cache_dir()?);
    tracing::debug!("Caching weather records in {}", storage.dir().display());
    provider_from_config(config, storage)
}

fn show_loading(city: &str) {
    eprintln!("Fetching weather for {city}...");
}

fn print_outcome(outcome: Outcome) -> bool {
    match outcome {
        Outcome::Card(card) => {
            println!("{card}");
            true
        }
        Outcome::Failed(message) => {
            eprintln!("{message}");
            false
        }
        Outcome::Nothing => true,
    }
}

async fn watch(config: &Config) -> anyhow::Result<()> {
    let provider: Arc<dyn WeatherProvider> = Arc::from(build_provider(config)?);
    let debouncer = Debouncer::new(config.debounce_window());

    eprintln!("Type a city name per line (Ctrl-D to quit).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        let provider = Arc::clone(&provider);
        debouncer.trigger(async move {
            print_outcome(search(provider.as_ref(), &line, show_loading).await);
        });
    }

    debouncer.settle().await;
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.use_proxy = Confirm::new("Route requests through a proxy that holds the API key?")
        .with_default(config.use_proxy)
        .prompt()?;

    if config.use_proxy {
        let proxy_url = Text::new("Proxy URL:").with_default(&config.proxy_url).prompt()?;
        config.proxy_url = proxy_url.trim().to_string();
    } else {
        let key = Password::new("OpenWeather API key (leave blank to keep current):")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()?;
        if !key.trim().is_empty() {
            config.api_key = Some(key.trim().to_string());
        }
    }

    let ttl = Text::new("Cache lifetime in milliseconds:")
        .with_default(&config.cache_ttl().as_millis().to_string())
        .prompt()?;
    config.cache_ttl_ms = Some(ttl.trim().parse::<u64>().context("Cache lifetime must be a number")?);

    let debounce = Text::new("Debounce window in milliseconds:")
        .with_default(&config.debounce_window().as_millis().to_string())
        .prompt()?;
    config.debounce_ms = Some(debounce.trim().parse::<u64>().context("Debounce window must be a number")?);

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
