use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, WeatherError},
    model::{self, DailyForecastModel, day_label, forecast_id},
    source::check_status,
};

use super::ForecastSource;

const FORECAST_URL: &str = "https://api.weatherapi.com/v1/forecast.json";
const FORECAST_DAYS: &str = "7";

/// Error code WeatherAPI.com returns when `q` does not resolve.
const NO_LOCATION_FOUND: u32 = 1006;

#[derive(Debug, Clone)]
pub struct WeatherApiSource {
    api_key: String,
    http: Client,
}

impl WeatherApiSource {
    pub fn new(api_key: String) -> Self {
        Self { api_key, http: Client::new() }
    }
}

#[async_trait]
impl ForecastSource for WeatherApiSource {
    async fn daily_forecasts(&self, location: &str) -> Result<Vec<DailyForecastModel>> {
        let res = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("days", FORECAST_DAYS),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if let Some(err) = parse_api_error(&body) {
            if err.code == NO_LOCATION_FOUND {
                return Err(WeatherError::LocationNotFound(location.to_string()));
            }
        }
        check_status(status, &body)?;

        parse_forecast(&body)
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: Option<f64>,
    maxwind_kph: Option<f64>,
    avghumidity: Option<f64>,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
struct WaApiError {
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaApiError,
}

fn parse_api_error(body: &str) -> Option<WaApiError> {
    serde_json::from_str::<WaErrorResponse>(body).ok().map(|r| r.error)
}

fn parse_forecast(body: &str) -> Result<Vec<DailyForecastModel>> {
    let parsed: WaForecastResponse = serde_json::from_str(body)?;
    let location = parsed.location.name;

    parsed
        .forecast
        .forecastday
        .into_iter()
        .map(|entry| {
            let date = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
                .map_err(|e| WeatherError::Parse(format!("invalid date '{}': {e}", entry.date)))?;

            Ok(DailyForecastModel {
                id: forecast_id(&location, date),
                location: location.clone(),
                day: day_label(date),
                icon: icon_for_condition(entry.day.condition.code).to_string(),
                temperature: entry.day.maxtemp_c,
                short_text: entry.day.condition.text.trim().to_string(),
                temperature_low: entry.day.mintemp_c,
                wind_kph: entry.day.maxwind_kph,
                humidity_pct: entry.day.avghumidity.map(|h| h.round().clamp(0.0, 100.0) as u8),
            })
        })
        .collect()
}

fn icon_for_condition(code: u32) -> &'static str {
    match code {
        1000 => model::ICON_CLEAR,
        1003 => model::ICON_PARTLY_CLOUDY,
        1006 | 1009 => model::ICON_CLOUDY,
        1030 | 1135 | 1147 => model::ICON_FOG,
        1087 | 1273..=1282 => model::ICON_STORM,
        1069 | 1072 | 1168 | 1171 | 1198 | 1201 | 1204..=1207 | 1237 | 1249..=1264 => {
            model::ICON_SLEET
        }
        1066 | 1114 | 1117 | 1210..=1225 => model::ICON_SNOW,
        1063 | 1150..=1195 | 1240..=1246 => model::ICON_RAIN,
        _ => model::ICON_UNKNOWN,
    }
}
