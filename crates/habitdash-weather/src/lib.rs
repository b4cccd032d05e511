//! Weather dashboard state for habitdash
//!
//! Fetches current conditions and forecasts from the OpenWeatherMap API,
//! shapes them into display-ready view models and keeps a persisted list of
//! favourite cities.

pub mod client;
pub mod dto;
pub mod mapper;
pub mod store;
pub mod types;

pub use client::{WeatherClient, DEFAULT_BASE_URL};
pub use mapper::{map_current, map_forecast, MAX_FORECAST_DAYS};
pub use store::{FetchStatus, WeatherState, WeatherStore, WEATHER_STORE_NAME};
pub use types::*;
