//! Weather dashboard state and fetch lifecycle.
//!
//! Each fetch walks `Idle -> Loading -> {Success, Failed}`. A failed fetch
//! keeps the last good data on screen next to the error message. Concurrent
//! fetches are not fenced: whichever response lands last wins.

use std::sync::Arc;

use habitdash_store::{load_snapshot, save_snapshot, BlobStore};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::client::WeatherClient;
use crate::mapper::{map_current, map_forecast};
use crate::types::{City, ForecastDay, Weather, WeatherError};

/// Backend key for the persisted favourites
pub const WEATHER_STORE_NAME: &str = "weather-storage";

const WEATHER_STORE_VERSION: u32 = 1;

/// Outcome of the most recent fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    pub current_weather: Option<Weather>,
    pub forecast: Vec<ForecastDay>,
    pub favorite_cities: Vec<City>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub status: FetchStatus,
}

/// The persisted part of the state
#[derive(Debug, Default, Serialize, Deserialize)]
struct FavoritesState {
    favorite_cities: Vec<City>,
}

pub struct WeatherStore {
    state: watch::Sender<WeatherState>,
    client: WeatherClient,
    backend: Arc<dyn BlobStore>,
}

impl WeatherStore {
    /// Create the store, restoring favourites from the backend.
    pub fn new(client: WeatherClient, backend: Arc<dyn BlobStore>) -> Self {
        let favorites = match load_snapshot::<FavoritesState>(
            backend.as_ref(),
            WEATHER_STORE_NAME,
            WEATHER_STORE_VERSION,
        ) {
            Ok(Some(saved)) => saved.favorite_cities,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load favourite cities, starting empty: {}", e);
                Vec::new()
            }
        };

        let (state, _) = watch::channel(WeatherState {
            favorite_cities: favorites,
            ..WeatherState::default()
        });

        Self {
            state,
            client,
            backend,
        }
    }

    /// Fetch current conditions for `city`.
    pub async fn fetch_weather(&self, city: &str) {
        let Some(city) = self.begin_fetch(city) else {
            return;
        };

        let result = match self.client.current(city).await {
            Ok(dto) => map_current(dto),
            Err(e) => Err(e),
        };

        self.finish_fetch(city, result, |state, weather| {
            state.current_weather = Some(weather);
        });
    }

    /// Fetch the daily forecast for `city`.
    pub async fn fetch_forecast(&self, city: &str) {
        let Some(city) = self.begin_fetch(city) else {
            return;
        };

        let result = match self.client.forecast(city).await {
            Ok(dto) => map_forecast(dto),
            Err(e) => Err(e),
        };

        self.finish_fetch(city, result, |state, forecast| {
            state.forecast = forecast;
        });
    }

    /// Add `city` unless a favourite with the same id exists.
    pub fn add_favorite(&self, city: City) {
        self.mutate_favorites(|favorites| {
            if favorites.iter().any(|c| c.id == city.id) {
                return false;
            }
            tracing::debug!("Added favourite city {} ({})", city.name, city.id);
            favorites.push(city);
            true
        });
    }

    /// Add the city of the current weather, if any.
    pub fn favorite_current(&self) {
        let city = self.state.borrow().current_weather.as_ref().map(Weather::to_city);
        if let Some(city) = city {
            self.add_favorite(city);
        }
    }

    /// Remove the favourite with `id`. Unknown ids are ignored.
    pub fn remove_favorite(&self, id: &str) {
        self.mutate_favorites(|favorites| {
            let before = favorites.len();
            favorites.retain(|c| c.id != id);
            favorites.len() != before
        });
    }

    /// Reset the error without touching weather data.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| {
            if state.error.is_none() {
                return false;
            }
            state.error = None;
            if state.status == FetchStatus::Failed {
                state.status = FetchStatus::Idle;
            }
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    pub fn current_weather(&self) -> Option<Weather> {
        self.state.borrow().current_weather.clone()
    }

    pub fn forecast(&self) -> Vec<ForecastDay> {
        self.state.borrow().forecast.clone()
    }

    pub fn favorite_cities(&self) -> Vec<City> {
        self.state.borrow().favorite_cities.clone()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.state.borrow().favorite_cities.iter().any(|c| c.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.state.borrow().status
    }

    /// Enter `Loading`; a blank city fails immediately without a request.
    fn begin_fetch<'a>(&self, city: &'a str) -> Option<&'a str> {
        let city = city.trim();
        if city.is_empty() {
            self.fail(WeatherError::Validation("Enter a city name".to_string()));
            return None;
        }

        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
            state.status = FetchStatus::Loading;
        });
        Some(city)
    }

    fn finish_fetch<T>(
        &self,
        city: &str,
        result: Result<T, WeatherError>,
        apply: impl FnOnce(&mut WeatherState, T),
    ) {
        match result {
            Ok(value) => {
                tracing::info!("Weather fetch for {} succeeded", city);
                self.state.send_modify(|state| {
                    apply(state, value);
                    state.is_loading = false;
                    state.error = None;
                    state.status = FetchStatus::Success;
                });
            }
            Err(e) => {
                tracing::warn!("Weather fetch for {} failed: {}", city, e);
                self.fail(e);
            }
        }
    }

    fn fail(&self, error: WeatherError) {
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error = Some(error.user_message());
            state.status = FetchStatus::Failed;
        });
    }

    fn mutate_favorites(&self, f: impl FnOnce(&mut Vec<City>) -> bool) {
        self.state.send_if_modified(|state| {
            if !f(&mut state.favorite_cities) {
                return false;
            }
            // Saved under the write lock so backend writes land in mutation order
            let saved = FavoritesState {
                favorite_cities: state.favorite_cities.clone(),
            };
            if let Err(e) = save_snapshot(
                self.backend.as_ref(),
                WEATHER_STORE_NAME,
                WEATHER_STORE_VERSION,
                &saved,
            ) {
                tracing::error!("Failed to persist favourite cities: {}", e);
            }
            true
        });
    }
}
