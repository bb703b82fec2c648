use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, Text};
use myweather_core::{Config, SourceId};

use crate::{app::App, screens::ShowOptions};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "myweather", version, about = "Daily weather forecasts")]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG overrides).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a forecast source, the default source and the default location.
    Configure {
        /// Source short name: "open-meteo", "weatherapi" or "offline".
        source: String,
    },

    /// List forecast sources and whether they are ready to use.
    Sources,

    /// Show the forecast for the default location, or another one.
    Show {
        /// Location to search after the default forecast is loaded.
        #[arg(long)]
        location: Option<String>,

        /// Source to read from instead of the configured default.
        #[arg(long)]
        source: Option<String>,

        /// Use the bundled offline dataset.
        #[arg(long, conflicts_with = "source")]
        offline: bool,

        /// Open the detail of the forecast with this id.
        #[arg(long)]
        detail: Option<String>,

        /// Browse days and search locations from a menu.
        #[arg(long, short)]
        interactive: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { source } => configure(&source),
            Command::Sources => list_sources(),
            Command::Show { location, source, offline, detail, interactive } => {
                let config = Config::load()?;
                let source_id = match (offline, source) {
                    (true, _) => SourceId::Offline,
                    (false, Some(name)) => SourceId::try_from(name.as_str())?,
                    (false, None) => config.default_source_id()?,
                };

                let mut app = App::build(&config, source_id)?;
                crate::screens::show(&mut app, ShowOptions { location, detail, interactive }).await
            }
        }
    }
}

fn configure(source: &str) -> anyhow::Result<()> {
    let id = SourceId::try_from(source)?;
    let mut config = Config::load()?;

    if id.requires_api_key() {
        let api_key = Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            bail!("API key for '{id}' must not be empty");
        }
        config.upsert_source_api_key(id, api_key.to_string());
    }

    let make_default = Confirm::new(&format!("Use {id} by default?"))
        .with_default(true)
        .prompt()
        .context("Failed to read answer")?;
    if make_default {
        config.set_default_source(id);
    }

    let current_location = config.default_location().to_string();
    let location = Text::new("Default location:")
        .with_default(&current_location)
        .prompt()
        .context("Failed to read default location")?;
    config.set_default_location(&location);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn list_sources() -> anyhow::Result<()> {
    let config = Config::load()?;
    let default = config.default_source_id().ok();

    for id in SourceId::all() {
        let marker = if Some(*id) == default { "*" } else { " " };
        let status = if config.is_source_configured(*id) { "ready" } else { "needs API key" };
        println!("{marker} {:<12} {status}", id.as_str());
    }
    println!("Default location: {}", config.default_location());

    Ok(())
}
