//! Core library for `myweather`.
//!
//! This crate defines:
//! - Forecast sources (Open-Meteo, WeatherAPI.com, bundled offline data)
//! - The forecast repository the screens read from
//! - Scheduling of repository calls onto background and UI contexts
//! - Observable state/event slots and the splash, weather and detail view models
//! - Configuration & credentials handling
//!
//! It is used by `myweather-cli`, but any host able to drain a [`UiLoop`]
//! can drive the screens.

pub mod config;
pub mod error;
pub mod live;
pub mod model;
pub mod repository;
pub mod scheduler;
pub mod source;
pub mod viewmodel;

#[cfg(test)]
mod testing;

pub use config::{Config, DEFAULT_LOCATION, SourceConfig};
pub use error::{Result, WeatherError};
pub use live::{LiveEvent, LiveState, Observation};
pub use model::DailyForecastModel;
pub use repository::{WeatherRepository, WeatherRepositoryImpl};
pub use scheduler::{
    AppSchedulers, Disposables, ImmediateSchedulers, SchedulerProvider, Subscription, UiLoop,
    WithSchedulers,
};
pub use source::{ForecastSource, SourceId};
