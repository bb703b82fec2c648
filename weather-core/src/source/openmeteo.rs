use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{Result, WeatherError},
    model::{self, DailyForecastModel, day_label, forecast_id},
    source::check_status,
};

use super::ForecastSource;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Keyless source backed by the Open-Meteo geocoding and forecast APIs.
#[derive(Debug, Clone, Default)]
pub struct OpenMeteoSource {
    http: Client,
}

impl OpenMeteoSource {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    async fn geocode(&self, location: &str) -> Result<Place> {
        let res = self
            .http
            .get(GEOCODING_URL)
            .query(&[("name", location), ("count", "1"), ("language", "en"), ("format", "json")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        check_status(status, &body)?;

        parse_geocoding(location, &body)
    }

    async fn fetch_daily(&self, place: &Place) -> Result<Vec<DailyForecastModel>> {
        let res = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("latitude", place.latitude.to_string()),
                ("longitude", place.longitude.to_string()),
                (
                    "daily",
                    "weathercode,temperature_2m_max,temperature_2m_min,windspeed_10m_max,relative_humidity_2m_mean"
                        .to_string(),
                ),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        check_status(status, &body)?;

        parse_daily(&place.name, &body)
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoSource {
    async fn daily_forecasts(&self, location: &str) -> Result<Vec<DailyForecastModel>> {
        let place = self.geocode(location).await?;
        debug!(query = location, place = %place.name, "geocoded location");
        self.fetch_daily(&place).await
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Place {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<Place>>,
}

#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<String>,
    weathercode: Vec<Option<u8>>,
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    windspeed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m_mean: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyData,
}

fn parse_geocoding(query: &str, body: &str) -> Result<Place> {
    let parsed: GeocodingResponse = serde_json::from_str(body)?;
    parsed
        .results
        .and_then(|places| places.into_iter().next())
        .ok_or_else(|| WeatherError::LocationNotFound(query.to_string()))
}

fn parse_daily(location: &str, body: &str) -> Result<Vec<DailyForecastModel>> {
    let parsed: ForecastResponse = serde_json::from_str(body)?;
    let daily = parsed.daily;

    let mut days = Vec::with_capacity(daily.time.len());
    for (i, time) in daily.time.iter().enumerate() {
        let date = NaiveDate::parse_from_str(time, "%Y-%m-%d")
            .map_err(|e| WeatherError::Parse(format!("invalid date '{time}': {e}")))?;

        // Days past the model horizon come back as nulls.
        let Some(high) = daily.temperature_2m_max.get(i).copied().flatten() else {
            continue;
        };

        let code = daily.weathercode.get(i).copied().flatten();
        let (icon, text) = describe_wmo(code);

        days.push(DailyForecastModel {
            id: forecast_id(location, date),
            location: location.to_string(),
            day: day_label(date),
            icon: icon.to_string(),
            temperature: high,
            short_text: text.to_string(),
            temperature_low: daily.temperature_2m_min.get(i).copied().flatten(),
            wind_kph: daily.windspeed_10m_max.get(i).copied().flatten(),
            humidity_pct: daily
                .relative_humidity_2m_mean
                .get(i)
                .copied()
                .flatten()
                .map(|h| h.round().clamp(0.0, 100.0) as u8),
        });
    }

    Ok(days)
}

/// WMO weather interpretation code to icon code and summary.
fn describe_wmo(code: Option<u8>) -> (&'static str, &'static str) {
    match code {
        Some(0) => (model::ICON_CLEAR, "Clear sky"),
        Some(1) => (model::ICON_CLEAR, "Mainly clear"),
        Some(2) => (model::ICON_PARTLY_CLOUDY, "Partly cloudy"),
        Some(3) => (model::ICON_CLOUDY, "Overcast"),
        Some(45 | 48) => (model::ICON_FOG, "Fog"),
        Some(51 | 53 | 55) => (model::ICON_RAIN, "Drizzle"),
        Some(56 | 57 | 66 | 67) => (model::ICON_SLEET, "Freezing rain"),
        Some(61 | 63 | 65) => (model::ICON_RAIN, "Rain"),
        Some(80..=82) => (model::ICON_RAIN, "Rain showers"),
        Some(71 | 73 | 75 | 77) => (model::ICON_SNOW, "Snow"),
        Some(85 | 86) => (model::ICON_SNOW, "Snow showers"),
        Some(95..=99) => (model::ICON_STORM, "Thunderstorm"),
        _ => (model::ICON_UNKNOWN, "Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: &str = r#"{
        "latitude": 48.86,
        "longitude": 2.35,
        "daily": {
            "time": ["2018-03-12", "2018-03-13", "2018-03-14"],
            "weathercode": [61, 2, null],
            "temperature_2m_max": [12.4, 14.0, null],
            "temperature_2m_min": [5.1, 6.3, null],
            "windspeed_10m_max": [18.0, 9.5, null],
            "relative_humidity_2m_mean": [81.6, 70.0, null]
        }
    }"#;

    #[test]
    fn daily_response_maps_to_models_and_skips_empty_days() {
        let days = parse_daily("Paris", DAILY).unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].id, "paris:2018-03-12");
        assert_eq!(days[0].day, "Monday, March 12");
        assert_eq!(days[0].icon, "rain");
        assert_eq!(days[0].temperature, 12.4);
        assert_eq!(days[0].temperature_low, Some(5.1));
        assert_eq!(days[0].humidity_pct, Some(82));
        assert_eq!(days[1].short_text, "Partly cloudy");
    }

    #[test]
    fn all_null_days_parse_to_an_empty_list() {
        let body = r#"{"daily": {
            "time": ["2018-03-12"],
            "weathercode": [null],
            "temperature_2m_max": [null]
        }}"#;

        assert!(parse_daily("Paris", body).unwrap().is_empty());
    }

    #[test]
    fn geocoding_without_results_is_location_not_found() {
        let err = parse_geocoding("Atlantis", r#"{"generationtime_ms": 0.5}"#).unwrap_err();
        assert_eq!(err, WeatherError::LocationNotFound("Atlantis".into()));
    }

    #[test]
    fn geocoding_takes_first_match() {
        let body = r#"{"results": [
            {"name": "Lyon", "latitude": 45.75, "longitude": 4.85, "country": "France"},
            {"name": "Lyons", "latitude": 43.07, "longitude": -77.0}
        ]}"#;
        let place = parse_geocoding("lyon", body).unwrap();
        assert_eq!(place.name, "Lyon");
        assert_eq!(place.latitude, 45.75);
    }

    #[test]
    fn unknown_wmo_code_is_unknown_icon() {
        assert_eq!(describe_wmo(Some(42)).0, model::ICON_UNKNOWN);
        assert_eq!(describe_wmo(None).0, model::ICON_UNKNOWN);
    }
}
