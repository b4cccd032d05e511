use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use habitdash_habits::HabitStore;
use habitdash_store::{BlobStore, FileBlobStore, MemoryBlobStore, SqliteBlobStore};
use habitdash_weather::{WeatherClient, WeatherStore};

use crate::config::{StorageBackend, StorageConfig, WeatherConfig};
use crate::error::AppError;
use crate::Config;

const SQLITE_FILE: &str = "habitdash.db";

/// Main application state and lifecycle manager.
///
/// Owns the one instance of each store for the session; consumers receive
/// references or `Arc` clones from here.
pub struct App {
    config: Arc<Config>,
    habits: Arc<HabitStore>,
    weather: Arc<WeatherStore>,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    pub fn new() -> Result<Self, AppError> {
        let (config, _) = Config::load_validated()?;
        Self::with_config(config)
    }

    /// Create an application instance from an explicit configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let backend = open_backend(&config.storage)?;
        let habits = HabitStore::load(backend.clone())
            .with_default_category(&config.habits.default_category);
        let weather = WeatherStore::new(weather_client(&config.weather)?, backend);

        tracing::info!(
            "Application initialized ({} habits, {} favourite cities, {:?} storage)",
            habits.len(),
            weather.favorite_cities().len(),
            config.storage.backend
        );

        Ok(Self {
            config: Arc::new(config),
            habits: Arc::new(habits),
            weather: Arc::new(weather),
        })
    }

    /// Fetch weather and forecast for the configured default city, if any
    pub async fn refresh_weather(&self) {
        let city = self.config.weather.default_city.trim();
        if city.is_empty() {
            tracing::debug!("No default city configured, skipping weather refresh");
            return;
        }
        if !self.config.weather.is_configured() {
            tracing::warn!("Weather API key not configured, skipping weather refresh");
            return;
        }

        tokio::join!(
            self.weather.fetch_weather(city),
            self.weather.fetch_forecast(city)
        );
    }

    /// Shutdown the application
    pub fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down application");

        if let Some(e) = self.habits.last_persist_error() {
            tracing::error!("Habits were not saved: {}", e);
        }

        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn habits(&self) -> Arc<HabitStore> {
        self.habits.clone()
    }

    pub fn weather(&self) -> Arc<WeatherStore> {
        self.weather.clone()
    }
}

/// Open the configured store backend, creating the data directory if needed
pub fn open_backend(storage: &StorageConfig) -> Result<Arc<dyn BlobStore>, AppError> {
    let backend: Arc<dyn BlobStore> = match storage.backend {
        StorageBackend::Memory => Arc::new(MemoryBlobStore::new()),
        StorageBackend::File => Arc::new(FileBlobStore::new(storage.effective_data_dir())),
        StorageBackend::Sqlite => {
            let dir = storage.effective_data_dir();
            std::fs::create_dir_all(&dir)?;
            Arc::new(SqliteBlobStore::open(dir.join(SQLITE_FILE))?)
        }
    };
    Ok(backend)
}

fn weather_client(config: &WeatherConfig) -> Result<WeatherClient, AppError> {
    let client = WeatherClient::with_base_url(config.api_key(), &config.api_base_url)?
        .with_timeout(Duration::from_secs(config.request_timeout_secs))?
        .with_units(config.units)
        .with_lang(config.lang.as_str());
    Ok(client)
}
