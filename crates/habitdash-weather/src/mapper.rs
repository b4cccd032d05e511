//! Maps OpenWeatherMap responses onto the display model.
//!
//! Pure functions: a missing required field fails the whole mapping, no
//! partially-populated value is ever returned.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Timelike, Utc};

use crate::dto::{CurrentWeatherDto, ForecastDto, ForecastEntryDto};
use crate::types::{ForecastDay, Weather, WeatherError};

/// Number of days kept from the forecast list
pub const MAX_FORECAST_DAYS: usize = 5;

const NOON_SECS: i64 = 12 * 3600;

fn required<T>(value: Option<T>, field: &str) -> Result<T, WeatherError> {
    value.ok_or_else(|| WeatherError::malformed(field))
}

fn timestamp(dt: i64, field: &str) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(dt, 0).ok_or_else(|| WeatherError::malformed(field))
}

fn humidity_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Map a `GET /weather` body to `Weather`.
///
/// # Errors
/// Returns `WeatherError::MalformedResponse` naming the first missing field.
pub fn map_current(dto: CurrentWeatherDto) -> Result<Weather, WeatherError> {
    let city = required(dto.name.filter(|n| !n.is_empty()), "name")?;
    let country = required(dto.sys.and_then(|s| s.country), "sys.country")?;
    let main = required(dto.main, "main")?;
    let temperature = required(main.temp, "main.temp")?;
    let humidity = required(main.humidity, "main.humidity")?;
    let condition = required(dto.weather.into_iter().next(), "weather[0]")?;
    let description = required(condition.description, "weather[0].description")?;
    let icon = required(condition.icon, "weather[0].icon")?;
    let wind_speed = required(dto.wind.and_then(|w| w.speed), "wind.speed")?;
    let timestamp = timestamp(required(dto.dt, "dt")?, "dt")?;

    let id = match dto.id {
        Some(id) => id.to_string(),
        None => format!("{},{}", city, country).to_lowercase(),
    };

    Ok(Weather {
        id,
        city,
        country,
        temperature,
        feels_like: main.feels_like.unwrap_or(temperature),
        description,
        icon,
        humidity: humidity_percent(humidity),
        wind_speed,
        timestamp,
    })
}

/// A forecast slot with its required fields resolved
struct Slot {
    at: DateTime<Utc>,
    temp_max: f64,
    temp_min: f64,
    description: String,
    icon: String,
}

fn resolve_slot(index: usize, entry: ForecastEntryDto) -> Result<Slot, WeatherError> {
    let field = |name: &str| format!("list[{}].{}", index, name);

    let dt = entry.dt.ok_or_else(|| WeatherError::malformed(&field("dt")))?;
    let at = timestamp(dt, &field("dt"))?;
    let main = entry.main.ok_or_else(|| WeatherError::malformed(&field("main")))?;
    let temp_max = main
        .temp_max
        .ok_or_else(|| WeatherError::malformed(&field("main.temp_max")))?;
    let temp_min = main
        .temp_min
        .ok_or_else(|| WeatherError::malformed(&field("main.temp_min")))?;
    let condition = entry
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::malformed(&field("weather[0]")))?;
    let description = condition
        .description
        .ok_or_else(|| WeatherError::malformed(&field("weather[0].description")))?;
    let icon = condition
        .icon
        .ok_or_else(|| WeatherError::malformed(&field("weather[0].icon")))?;

    Ok(Slot {
        at,
        temp_max,
        temp_min,
        description,
        icon,
    })
}

fn distance_from_noon(at: &DateTime<Utc>) -> i64 {
    (i64::from(at.num_seconds_from_midnight()) - NOON_SECS).abs()
}

/// Map a `GET /forecast` body to at most `MAX_FORECAST_DAYS` days.
///
/// Slots are grouped by UTC date: the day's extremes come from all slots,
/// the description and icon from the slot closest to midday.
///
/// # Errors
/// Returns `WeatherError::MalformedResponse` if `list` or any slot's
/// required field is missing.
pub fn map_forecast(dto: ForecastDto) -> Result<Vec<ForecastDay>, WeatherError> {
    let list = required(dto.list, "list")?;

    let mut days: BTreeMap<NaiveDate, Vec<Slot>> = BTreeMap::new();
    for (index, entry) in list.into_iter().enumerate() {
        let slot = resolve_slot(index, entry)?;
        days.entry(slot.at.date_naive()).or_default().push(slot);
    }

    let forecast = days
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .filter_map(|(date, slots)| {
            let temp_max = slots.iter().map(|s| s.temp_max).fold(f64::MIN, f64::max);
            let temp_min = slots.iter().map(|s| s.temp_min).fold(f64::MAX, f64::min);
            let representative = slots.into_iter().min_by_key(|s| distance_from_noon(&s.at))?;

            Some(ForecastDay {
                date,
                temp_max,
                temp_min,
                description: representative.description,
                icon: representative.icon,
            })
        })
        .collect();

    Ok(forecast)
}
