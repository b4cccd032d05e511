use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Measurement system requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    /// Value of the `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
            Self::Standard => "standard",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
            Self::Standard => "K",
        }
    }

    pub fn wind_speed_suffix(&self) -> &'static str {
        match self {
            Self::Metric | Self::Standard => "m/s",
            Self::Imperial => "mph",
        }
    }
}

/// Current conditions for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub id: String,
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub timestamp: DateTime<Utc>,
}

impl Weather {
    pub fn icon_url(&self) -> String {
        icon_url(&self.icon)
    }

    /// The city as a favourite entry
    pub fn to_city(&self) -> City {
        City {
            id: self.id.clone(),
            name: self.city.clone(),
            country: self.country.clone(),
        }
    }
}

/// One day of the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub description: String,
    pub icon: String,
}

impl ForecastDay {
    pub fn icon_url(&self) -> String {
        icon_url(&self.icon)
    }
}

/// A favourite city, identified by `id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub country: String,
}

fn icon_url(icon: &str) -> String {
    format!("{}/{}@2x.png", ICON_BASE_URL, icon)
}

/// Weather fetch errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Rate limited")]
    RateLimited,
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl WeatherError {
    /// Malformed response naming the missing field path
    pub fn malformed(field: &str) -> Self {
        Self::MalformedResponse(format!("missing {}", field))
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(e) if e.is_timeout() => {
                "The weather request timed out. Please try again.".to_string()
            }
            Self::Network(_) => "Unable to reach the weather service. Check your connection.".to_string(),
            Self::CityNotFound(city) => format!("City \"{}\" not found", city),
            Self::InvalidApiKey => "Weather API key is invalid. Check settings.".to_string(),
            Self::RateLimited => "Too many weather requests. Please wait a moment.".to_string(),
            Self::Api { status, .. } if *status >= 500 => {
                "Weather service unavailable. Please try again later.".to_string()
            }
            Self::Api { status, .. } => format!("Weather request failed ({})", status),
            Self::MalformedResponse(_) => "Received unexpected weather data.".to_string(),
            Self::Validation(msg) => msg.clone(),
        }
    }
}
