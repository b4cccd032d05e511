//! OpenWeatherMap API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::instrument;

use crate::dto::{CurrentWeatherDto, ForecastDto};
use crate::types::{Units, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    units: Units,
    lang: Option<String>,
}

impl WeatherClient {
    pub fn new(api_key: &str) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Client against a different API root (proxies, mock servers).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            units: Units::default(),
            lang: None,
        })
    }

    /// Replace the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, WeatherError> {
        self.client = Arc::new(Client::builder().timeout(timeout).build()?);
        Ok(self)
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        let lang = lang.into();
        self.lang = (!lang.is_empty()).then_some(lang);
        self
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str, city: &str) -> String {
        let mut url = format!(
            "{}/{}?q={}&appid={}&units={}",
            self.base_url,
            path,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key),
            self.units.as_query(),
        );
        if let Some(lang) = &self.lang {
            url.push_str(&format!("&lang={}", urlencoding::encode(lang)));
        }
        url
    }

    /// Current conditions for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn current(&self, city: &str) -> Result<CurrentWeatherDto, WeatherError> {
        let response = self
            .client
            .get(self.endpoint("weather", city))
            .send()
            .await?;

        self.handle_response(response, city).await
    }

    /// 5-day / 3-hour forecast for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(&self, city: &str) -> Result<ForecastDto, WeatherError> {
        let response = self
            .client
            .get(self.endpoint("forecast", city))
            .send()
            .await?;

        self.handle_response(response, city).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        city: &str,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| WeatherError::MalformedResponse(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(WeatherError::InvalidApiKey)
        } else if status.as_u16() == 404 {
            Err(WeatherError::CityNotFound(city.to_string()))
        } else if status.as_u16() == 429 {
            Err(WeatherError::RateLimited)
        } else {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!("Weather API returned {}: {}", status, text);
            Err(WeatherError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}
