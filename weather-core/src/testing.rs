//! Fakes shared by the unit tests.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use futures::channel::oneshot;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    error::{Result, WeatherError},
    model::{DailyForecastModel, day_label, forecast_id},
    repository::WeatherRepository,
    source::ForecastSource,
};

pub(crate) fn forecast(location: &str, offset: u64) -> DailyForecastModel {
    let date = NaiveDate::from_ymd_opt(2018, 3, 12).unwrap() + Days::new(offset);
    DailyForecastModel {
        id: forecast_id(location, date),
        location: location.to_string(),
        day: day_label(date),
        icon: "clear".to_string(),
        temperature: 10.0 + offset as f64,
        short_text: "Sunny".to_string(),
        temperature_low: None,
        wind_kph: None,
        humidity_pct: None,
    }
}

pub(crate) fn forecasts(location: &str, count: u64) -> Vec<DailyForecastModel> {
    (0..count).map(|i| forecast(location, i)).collect()
}

/// Collects every value handed to the returned observer.
pub(crate) fn recorder<T: Clone + Send + 'static>()
-> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |v: &T| sink.lock().unwrap().push(v.clone()))
}

/// Source answering three days for any location but "Atlantis" (not found)
/// and "Nowhere" (no days).
#[derive(Debug, Default)]
pub(crate) struct CountingSource {
    requests: Mutex<Vec<String>>,
}

impl CountingSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForecastSource for CountingSource {
    async fn daily_forecasts(&self, location: &str) -> Result<Vec<DailyForecastModel>> {
        self.requests.lock().unwrap().push(location.to_string());
        if location == "Atlantis" {
            return Err(WeatherError::LocationNotFound(location.to_string()));
        }
        if location == "Nowhere" {
            return Ok(Vec::new());
        }
        Ok(forecasts(location, 3))
    }
}

/// Repository with canned answers.
#[derive(Default)]
pub(crate) struct FakeRepository {
    default: Option<Result<Vec<DailyForecastModel>>>,
    by_location: HashMap<String, Result<Vec<DailyForecastModel>>>,
    details: HashMap<String, DailyForecastModel>,
    calls: Mutex<Vec<String>>,
}

impl FakeRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_default(mut self, reply: Result<Vec<DailyForecastModel>>) -> Self {
        self.default = Some(reply);
        self
    }

    pub(crate) fn with_location(
        mut self,
        location: &str,
        reply: Result<Vec<DailyForecastModel>>,
    ) -> Self {
        self.by_location.insert(location.to_string(), reply);
        self
    }

    pub(crate) fn with_detail(mut self, detail: DailyForecastModel) -> Self {
        self.details.insert(detail.id.clone(), detail);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherRepository for FakeRepository {
    async fn get_weather(&self) -> Result<Vec<DailyForecastModel>> {
        self.calls.lock().unwrap().push("default".to_string());
        self.default.clone().unwrap_or_else(|| Err(WeatherError::Io("no default reply".into())))
    }

    async fn get_weather_at(&self, location: &str) -> Result<Vec<DailyForecastModel>> {
        self.calls.lock().unwrap().push(format!("location:{location}"));
        self.by_location
            .get(location)
            .cloned()
            .unwrap_or_else(|| Err(WeatherError::LocationNotFound(location.to_string())))
    }

    async fn get_weather_detail(&self, id: &str) -> Result<DailyForecastModel> {
        self.calls.lock().unwrap().push(format!("detail:{id}"));
        self.details.get(id).cloned().ok_or_else(|| WeatherError::NotFound(id.to_string()))
    }
}

/// Repository whose answers are released by the test through a sender.
#[derive(Default)]
pub(crate) struct PendingRepository {
    lists: Mutex<Vec<oneshot::Receiver<Result<Vec<DailyForecastModel>>>>>,
    details: Mutex<Vec<oneshot::Receiver<Result<DailyForecastModel>>>>,
}

impl PendingRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues the reply for the next list request.
    pub(crate) fn next_list(&self) -> oneshot::Sender<Result<Vec<DailyForecastModel>>> {
        let (tx, rx) = oneshot::channel();
        self.lists.lock().unwrap().push(rx);
        tx
    }

    pub(crate) fn next_detail(&self) -> oneshot::Sender<Result<DailyForecastModel>> {
        let (tx, rx) = oneshot::channel();
        self.details.lock().unwrap().push(rx);
        tx
    }

    async fn list(&self) -> Result<Vec<DailyForecastModel>> {
        let rx = self.lists.lock().unwrap().remove(0);
        rx.await.unwrap_or_else(|_| Err(WeatherError::Io("reply dropped".into())))
    }
}

#[async_trait]
impl WeatherRepository for PendingRepository {
    async fn get_weather(&self) -> Result<Vec<DailyForecastModel>> {
        self.list().await
    }

    async fn get_weather_at(&self, _location: &str) -> Result<Vec<DailyForecastModel>> {
        self.list().await
    }

    async fn get_weather_detail(&self, _id: &str) -> Result<DailyForecastModel> {
        let rx = self.details.lock().unwrap().remove(0);
        rx.await.unwrap_or_else(|_| Err(WeatherError::Io("reply dropped".into())))
    }
}
