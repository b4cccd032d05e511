//! OpenWeatherMap response shapes.
//!
//! Every field is optional so that a partial body still deserializes; the
//! mapper decides which fields are required.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainDto {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConditionDto {
    pub id: Option<i64>,
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindDto {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SysDto {
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

/// `GET /weather` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentWeatherDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub dt: Option<i64>,
    pub timezone: Option<i64>,
    pub main: Option<MainDto>,
    #[serde(default)]
    pub weather: Vec<ConditionDto>,
    pub wind: Option<WindDto>,
    pub sys: Option<SysDto>,
}

/// One 3-hour slot of `GET /forecast`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastEntryDto {
    pub dt: Option<i64>,
    pub main: Option<MainDto>,
    #[serde(default)]
    pub weather: Vec<ConditionDto>,
    pub wind: Option<WindDto>,
    pub dt_txt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastCityDto {
    pub name: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<i64>,
}

/// `GET /forecast` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastDto {
    pub list: Option<Vec<ForecastEntryDto>>,
    pub city: Option<ForecastCityDto>,
}
