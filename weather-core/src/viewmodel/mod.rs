//! Screen view models.
//!
//! Each view model runs one repository call per user action through the
//! scheduler pair and publishes the outcome to a [`LiveState`] or
//! [`LiveEvent`] slot. Outstanding calls are disposed when the view model is
//! cleared or dropped, after which nothing is published.
//!
//! [`LiveState`]: crate::live::LiveState
//! [`LiveEvent`]: crate::live::LiveEvent

pub mod detail;
pub mod splash;
pub mod weather;

pub use detail::{DetailState, DetailViewModel};
pub use splash::{SplashEvent, SplashViewModel};
pub use weather::{WeatherEvent, WeatherListState, WeatherState, WeatherViewModel};
