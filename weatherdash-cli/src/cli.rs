use std::fmt;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use weatherdash_core::{
    Config, Coordinates, Dashboard, DashboardOptions, FileStorage, HistoryStore,
    provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and optional home location.
    Configure,

    /// Show current weather and forecast for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,
    },

    /// Show weather for coordinates given as `lat,lon`.
    Here {
        #[arg(allow_hyphen_values = true)]
        at: Coordinates,
    },

    /// List city names matching a prefix.
    Suggest { prefix: String },

    /// Print recent searches.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Interactive dashboard.
    Dashboard {
        /// Start at these coordinates (`lat,lon`) instead of the configured home.
        #[arg(long, allow_hyphen_values = true)]
        at: Option<Coordinates>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Show { city } => {
                let dash = build_dashboard(&config)?;
                dash.search(&city).await;
                print!("{}", render::dashboard(&dash.state(), Utc::now()));
            }
            Command::Here { at } => {
                let dash = build_dashboard(&config)?;
                dash.search_by_location(at.lat, at.lon).await;
                print!("{}", render::dashboard(&dash.state(), Utc::now()));
            }
            Command::Suggest { prefix } => {
                let dash = build_dashboard(&config)?;
                if let Some(lookup) = dash.update_query(&prefix) {
                    lookup.await.context("Suggestion lookup panicked")?;
                }
                println!("{}", render::suggestions(&dash.state().suggestions));
            }
            Command::History { clear } => {
                let mut history = history_store(&config)?;
                if clear {
                    history.clear();
                    println!("Search history cleared");
                } else {
                    for city in history.load() {
                        println!("{city}");
                    }
                }
            }
            Command::Dashboard { at } => {
                let dash = build_dashboard(&config)?;
                interactive(&dash, at.or_else(|| config.home_coordinates())).await?;
            }
        }

        Ok(())
    }
}

fn history_store(config: &Config) -> anyhow::Result<HistoryStore> {
    let dir = config.data_dir()?;
    Ok(HistoryStore::new(Box::new(FileStorage::new(dir))))
}

fn build_dashboard(config: &Config) -> anyhow::Result<Dashboard> {
    let provider = provider_from_config(config)?;
    let options = DashboardOptions {
        debounce: config.debounce(),
        theme: config.theme,
    };

    Ok(Dashboard::new(provider, history_store(config)?, options))
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(key.trim().to_string());

    let home = Text::new("Home location as lat,lon (leave empty to skip):")
        .with_initial_value(config.home_location.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read home location")?;
    config.home_location = match home.trim() {
        "" => None,
        value => {
            value.parse::<Coordinates>()?;
            Some(value.to_string())
        }
    };

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Search,
    Recent,
    Refresh,
    ToggleTheme,
    Quit,
}

impl Action {
    const ALL: [Action; 5] = [
        Action::Search,
        Action::Recent,
        Action::Refresh,
        Action::ToggleTheme,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Search => "Search a city",
            Action::Recent => "Recent searches",
            Action::Refresh => "Refresh",
            Action::ToggleTheme => "Toggle theme",
            Action::Quit => "Quit",
        })
    }
}

/// Escape or Ctrl-C at any prompt ends the session instead of failing it.
fn answered<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn interactive(dash: &Dashboard, start: Option<Coordinates>) -> anyhow::Result<()> {
    if let Some(at) = start {
        tracing::info!(%at, "Looking up startup location");
        dash.search_by_location(at.lat, at.lon).await;
    }
    print!("{}", render::dashboard(&dash.state(), Utc::now()));

    loop {
        let Some(action) = answered(Select::new("Action:", Action::ALL.to_vec()).prompt())? else {
            break;
        };

        match action {
            Action::Search => {
                if !search_prompt(dash).await? {
                    continue;
                }
            }
            Action::Recent => {
                let history = dash.state().history;
                if history.is_empty() {
                    println!("No recent searches");
                    continue;
                }
                let Some(city) = answered(Select::new("Recent:", history).prompt())? else {
                    continue;
                };
                dash.select_history(&city).await;
            }
            Action::Refresh => dash.refresh().await,
            Action::ToggleTheme => dash.toggle_theme(),
            Action::Quit => break,
        }

        print!("{}", render::dashboard(&dash.state(), Utc::now()));
    }

    Ok(())
}

/// Read a city, offer suggestions, and submit. Returns false when the user backed out.
async fn search_prompt(dash: &Dashboard) -> anyhow::Result<bool> {
    let current = dash.state().query;
    let Some(text) = answered(Text::new("City:").with_initial_value(&current).prompt())? else {
        return Ok(false);
    };

    if let Some(lookup) = dash.update_query(&text) {
        lookup.await.context("Suggestion lookup panicked")?;
    }

    let suggestions = dash.state().suggestions;
    if !suggestions.is_empty() {
        let as_typed = format!("Search \"{}\" as typed", text.trim());
        let mut choices = suggestions.clone();
        choices.push(as_typed.clone());

        let Some(choice) = answered(Select::new("Did you mean:", choices).prompt())? else {
            return Ok(false);
        };
        if choice != as_typed {
            dash.select_suggestion(&choice);
        }
    }

    dash.submit().await;
    Ok(true)
}
