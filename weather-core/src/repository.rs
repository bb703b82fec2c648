//! Forecast repository sitting between the screens and a [`ForecastSource`].

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::{
    error::{Result, WeatherError},
    model::DailyForecastModel,
    source::ForecastSource,
};

/// Data access used by the screen view models.
///
/// Every method is lazy (nothing happens until the returned future is
/// polled) and resolves exactly once.
#[async_trait]
pub trait WeatherRepository: Send + Sync {
    /// Forecast list for the configured default location.
    async fn get_weather(&self) -> Result<Vec<DailyForecastModel>>;

    /// Forecast list for `location`, passed to the source as given.
    async fn get_weather_at(&self, location: &str) -> Result<Vec<DailyForecastModel>>;

    /// Single forecast by id, or [`WeatherError::NotFound`].
    async fn get_weather_detail(&self, id: &str) -> Result<DailyForecastModel>;
}

/// Repository over a single source. Every list request reads the source;
/// the latest successful list backs detail lookups. A source answering with
/// no days is reported as [`WeatherError::NoForecast`], so a successful list
/// is never empty.
#[derive(Debug)]
pub struct WeatherRepositoryImpl {
    source: Arc<dyn ForecastSource>,
    default_location: String,
    latest: Mutex<Vec<DailyForecastModel>>,
}

impl WeatherRepositoryImpl {
    pub fn new(source: Arc<dyn ForecastSource>, default_location: impl Into<String>) -> Self {
        Self {
            source,
            default_location: default_location.into(),
            latest: Mutex::new(Vec::new()),
        }
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    async fn fetch(&self, location: &str) -> Result<Vec<DailyForecastModel>> {
        debug!(location, "fetching daily forecasts");
        let days = self.source.daily_forecasts(location).await?;
        debug!(location, count = days.len(), "received daily forecasts");
        if days.is_empty() {
            return Err(WeatherError::NoForecast(location.to_string()));
        }

        {
            let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            latest.clone_from(&days);
        }

        Ok(days)
    }
}

#[async_trait]
impl WeatherRepository for WeatherRepositoryImpl {
    async fn get_weather(&self) -> Result<Vec<DailyForecastModel>> {
        self.fetch(&self.default_location).await
    }

    async fn get_weather_at(&self, location: &str) -> Result<Vec<DailyForecastModel>> {
        self.fetch(location).await
    }

    async fn get_weather_detail(&self, id: &str) -> Result<DailyForecastModel> {
        debug!(id, "looking up forecast detail");
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest
            .iter()
            .find(|day| day.id == id)
            .cloned()
            .ok_or_else(|| WeatherError::NotFound(id.to_string()))
    }
}
