use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::{Result, WeatherError},
    model::{DailyForecastModel, day_label, forecast_id},
};

use super::ForecastSource;

const BUNDLED: &str = include_str!("../../data/forecasts.json");

/// Serves forecasts from a dataset held in memory, by default the one
/// compiled into the binary.
#[derive(Debug, Clone)]
pub struct OfflineSource {
    dataset: Dataset,
}

impl OfflineSource {
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Ok(Self { dataset })
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.dataset.locations.iter().map(|l| l.name.as_str())
    }
}

#[async_trait]
impl ForecastSource for OfflineSource {
    async fn daily_forecasts(&self, location: &str) -> Result<Vec<DailyForecastModel>> {
        let wanted = location.trim();
        let entry = self
            .dataset
            .locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| WeatherError::LocationNotFound(location.to_string()))?;

        entry.days.iter().map(|day| day.to_model(&entry.name)).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Dataset {
    locations: Vec<DatasetLocation>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatasetLocation {
    name: String,
    days: Vec<DatasetDay>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatasetDay {
    date: String,
    icon: String,
    high: f64,
    low: Option<f64>,
    text: String,
    wind_kph: Option<f64>,
    humidity: Option<u8>,
}

impl DatasetDay {
    fn to_model(&self, location: &str) -> Result<DailyForecastModel> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| WeatherError::Parse(format!("invalid date '{}': {e}", self.date)))?;

        Ok(DailyForecastModel {
            id: forecast_id(location, date),
            location: location.to_string(),
            day: day_label(date),
            icon: self.icon.clone(),
            temperature: self.high,
            short_text: self.text.clone(),
            temperature_low: self.low,
            wind_kph: self.wind_kph,
            humidity_pct: self.humidity,
        })
    }
}
