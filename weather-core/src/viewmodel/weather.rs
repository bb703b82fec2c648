use std::sync::Arc;
use tracing::debug;

use crate::{
    error::WeatherError,
    live::{LiveEvent, LiveState},
    model::DailyForecastModel,
    repository::WeatherRepository,
    scheduler::{Disposables, SchedulerProvider, WithSchedulers},
};

/// A forecast list split for display: the first day gets the header, the
/// rest go below it in their original order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherListState {
    pub location: String,
    pub first: DailyForecastModel,
    pub rest: Vec<DailyForecastModel>,
}

impl WeatherListState {
    /// `None` for an empty list.
    pub fn try_from_forecasts(mut list: Vec<DailyForecastModel>) -> Option<Self> {
        if list.is_empty() {
            return None;
        }
        let rest = list.split_off(1);
        let first = list.remove(0);
        Some(Self { location: first.location.clone(), first, rest })
    }

    /// # Panics
    ///
    /// On an empty list. Sources promise at least one day on success, so an
    /// empty list is a broken source, not a condition to show the user.
    pub fn from_forecasts(list: Vec<DailyForecastModel>) -> Self {
        match Self::try_from_forecasts(list) {
            Some(state) => state,
            None => panic!("weather list should not be empty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherState {
    Loading,
    List(WeatherListState),
    Error(WeatherError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherEvent {
    LoadingLocation(String),
    LocationSearchFailed { location: String, error: WeatherError },
}

/// Main screen: the forecast list plus location search.
pub struct WeatherViewModel {
    repository: Arc<dyn WeatherRepository>,
    schedulers: Arc<dyn SchedulerProvider>,
    states: LiveState<WeatherState>,
    events: LiveEvent<WeatherEvent>,
    disposables: Disposables,
}

impl WeatherViewModel {
    pub fn new(repository: Arc<dyn WeatherRepository>, schedulers: Arc<dyn SchedulerProvider>) -> Self {
        Self {
            repository,
            schedulers,
            states: LiveState::new(),
            events: LiveEvent::new(),
            disposables: Disposables::new(),
        }
    }

    pub fn states(&self) -> &LiveState<WeatherState> {
        &self.states
    }

    pub fn events(&self) -> &LiveEvent<WeatherEvent> {
        &self.events
    }

    /// Loads the default location's forecast into `states`.
    pub fn get_weather(&self) {
        debug!("weather: loading default forecast");
        self.states.publish(WeatherState::Loading);

        let repository = Arc::clone(&self.repository);
        let states = self.states.clone();
        let subscription = async move { repository.get_weather().await }
            .with_schedulers(&self.schedulers)
            .subscribe(move |result| match result {
                Ok(list) => states.publish(WeatherState::List(WeatherListState::from_forecasts(list))),
                Err(error) => states.publish(WeatherState::Error(error)),
            });

        self.disposables.add(subscription);
    }

    /// Searches `location`. Progress and failure go to `events`; a found
    /// forecast replaces the list in `states`.
    ///
    /// Searches are not cancelled by newer ones; the last answer to arrive
    /// wins.
    pub fn load_new_location(&self, location: impl Into<String>) {
        let location = location.into();
        debug!(location = %location, "weather: searching location");
        self.events.publish(WeatherEvent::LoadingLocation(location.clone()));

        let repository = Arc::clone(&self.repository);
        let states = self.states.clone();
        let events = self.events.clone();
        let query = location.clone();
        let subscription = async move { repository.get_weather_at(&query).await }
            .with_schedulers(&self.schedulers)
            .subscribe(move |result| match result {
                Ok(list) => states.publish(WeatherState::List(WeatherListState::from_forecasts(list))),
                Err(error) => events.publish(WeatherEvent::LocationSearchFailed { location, error }),
            });

        self.disposables.add(subscription);
    }

    /// Disposes outstanding work. Also happens on drop.
    pub fn clear(&self) {
        self.disposables.clear();
    }
}
