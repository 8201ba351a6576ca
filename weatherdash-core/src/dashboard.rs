//! The dashboard's single state owner.
//!
//! Every action mutates the state held inside a `watch` channel, so each
//! change is published as a fresh [`DashboardState`] value to subscribers.
//! Network work happens in the async actions; everything else is synchronous.
//!
//! Suggestion and search requests are tagged with generation counters so a
//! response that arrives after a newer request for the same slot is dropped.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    config::DEFAULT_DEBOUNCE_MS,
    error::SEARCH_FAILED_MESSAGE,
    history::HistoryStore,
    model::{ForecastEntry, RequestStatus, Theme, WeatherSnapshot},
    provider::{WeatherProvider, is_suggestible},
};

/// Everything the presentation layer reads. Consumers get clones; the
/// dashboard is the only writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub query: String,
    pub weather: Option<WeatherSnapshot>,
    pub forecast: Option<Vec<ForecastEntry>>,
    pub loading: bool,
    pub error: Option<String>,
    pub theme: Theme,
    pub suggestions: Vec<String>,
    pub history: Vec<String>,
}

impl DashboardState {
    pub fn status(&self) -> RequestStatus {
        if self.loading {
            RequestStatus::Loading
        } else if let Some(message) = &self.error {
            RequestStatus::Error(message.clone())
        } else {
            RequestStatus::Idle
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub debounce: Duration,
    pub theme: Theme,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            theme: Theme::default(),
        }
    }
}

/// How a primary lookup was started.
#[derive(Clone, Copy)]
enum Lookup<'a> {
    City(&'a str),
    Coordinates { lat: f64, lon: f64 },
}

#[derive(Debug)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    history: Mutex<HistoryStore>,
    state: Arc<watch::Sender<DashboardState>>,
    search_generation: AtomicU64,
    suggestion_generation: Arc<AtomicU64>,
    debounce: Duration,
}

impl Dashboard {
    /// Build the dashboard, loading persisted history into the initial state.
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        mut history: HistoryStore,
        options: DashboardOptions,
    ) -> Self {
        let initial = DashboardState {
            theme: options.theme,
            history: history.load(),
            ..DashboardState::default()
        };
        let (state, _) = watch::channel(initial);

        Self {
            provider,
            history: Mutex::new(history),
            state: Arc::new(state),
            search_generation: AtomicU64::new(0),
            suggestion_generation: Arc::new(AtomicU64::new(0)),
            debounce: options.debounce,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Look up `city`; on success also refresh the forecast and record history.
    pub async fn search(&self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            return;
        }

        self.run_lookup(Lookup::City(city)).await;
    }

    /// Same as [`Dashboard::search`], starting from coordinates. The query
    /// becomes the resolved location name.
    pub async fn search_by_location(&self, lat: f64, lon: f64) {
        self.run_lookup(Lookup::Coordinates { lat, lon }).await;
    }

    /// Search whatever is in the query box.
    pub async fn submit(&self) {
        let query = self.state.borrow().query.clone();
        self.search(&query).await;
    }

    /// Re-run the lookup for the location currently shown.
    pub async fn refresh(&self) {
        let shown = self.state.borrow().weather.as_ref().map(|w| w.name.clone());
        if let Some(name) = shown {
            self.search(&name).await;
        }
    }

    pub async fn select_history(&self, name: &str) {
        self.set_query_and_clear_suggestions(name);
        self.search(name).await;
    }

    /// Set the query text and schedule a debounced suggestion lookup.
    ///
    /// Returns the handle of the scheduled lookup, or `None` when the text is
    /// too short and suggestions were cleared instead. Must be called from
    /// within a Tokio runtime.
    pub fn update_query(&self, text: &str) -> Option<JoinHandle<()>> {
        let generation = self.suggestion_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let suggestible = is_suggestible(text);

        self.state.send_modify(|s| {
            s.query = text.to_owned();
            if !suggestible {
                s.suggestions.clear();
            }
        });

        if !suggestible {
            return None;
        }

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.suggestion_generation);
        let debounce = self.debounce;
        let prefix = text.to_owned();

        Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != generation {
                tracing::trace!(%prefix, "Suggestion lookup superseded during debounce");
                return;
            }

            let names = provider.fetch_suggestions(&prefix).await;

            state.send_if_modified(|s| {
                if latest.load(Ordering::SeqCst) != generation {
                    tracing::debug!(%prefix, "Discarding stale suggestions");
                    return false;
                }
                s.suggestions = names;
                true
            });
        }))
    }

    /// Take a suggestion into the query box without searching.
    pub fn select_suggestion(&self, name: &str) {
        self.set_query_and_clear_suggestions(name);
    }

    pub fn toggle_theme(&self) {
        self.state.send_modify(|s| s.theme = s.theme.toggled());
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().entries().to_vec()
    }

    pub fn clear_history(&self) {
        let list = self.history.lock().clear();
        self.state.send_modify(|s| s.history = list);
    }

    fn set_query_and_clear_suggestions(&self, name: &str) {
        // Any lookup still pending belongs to older text.
        self.suggestion_generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.query = name.to_owned();
            s.suggestions.clear();
        });
    }

    fn is_current(&self, generation: u64) -> bool {
        self.search_generation.load(Ordering::SeqCst) == generation
    }

    async fn run_lookup(&self, lookup: Lookup<'_>) {
        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = match lookup {
            Lookup::City(city) => self.provider.fetch_current_by_name(city).await,
            Lookup::Coordinates { lat, lon } => {
                self.provider.fetch_current_by_coordinates(lat, lon).await
            }
        };

        if !self.is_current(generation) {
            tracing::debug!("Dropping result of a superseded search");
            return;
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                err.log("search");
                self.state.send_modify(|s| {
                    s.weather = None;
                    s.forecast = None;
                    s.error = Some(SEARCH_FAILED_MESSAGE.to_string());
                    s.loading = false;
                });
                return;
            }
        };

        let city = match lookup {
            Lookup::City(city) => city.to_owned(),
            Lookup::Coordinates { .. } => snapshot.name.clone(),
        };
        let from_location = matches!(lookup, Lookup::Coordinates { .. });

        tracing::info!(location = %snapshot.name, "Weather updated");
        self.state.send_modify(|s| {
            if from_location {
                s.query = city.clone();
            }
            s.weather = Some(snapshot);
            // The previous forecast belongs to another location.
            s.forecast = None;
            s.loading = false;
        });

        let forecast = match self.provider.fetch_forecast(&city).await {
            Ok(days) => Some(days),
            Err(err) => {
                err.log("forecast");
                None
            }
        };

        if !self.is_current(generation) {
            tracing::debug!("Dropping forecast of a superseded search");
            return;
        }

        let history = self.history.lock().record(&city);

        self.state.send_modify(|s| {
            s.forecast = forecast;
            s.history = history;
        });
    }
}
