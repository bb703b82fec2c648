use anyhow::Context;
use myweather_core::{
    AppSchedulers, Config, SchedulerProvider, SourceId, UiLoop, WeatherRepository,
    WeatherRepositoryImpl,
    source::source_from_config,
    viewmodel::{DetailViewModel, SplashViewModel, WeatherViewModel},
};
use std::sync::Arc;
use tracing::debug;

/// Object graph for one run: repository, schedulers and the UI loop that
/// delivers results to the screens.
pub struct App {
    repository: Arc<dyn WeatherRepository>,
    schedulers: Arc<dyn SchedulerProvider>,
    pub ui: UiLoop,
}

impl App {
    pub fn build(config: &Config, source_id: SourceId) -> anyhow::Result<Self> {
        let source = source_from_config(source_id, config)?;
        let location = config.default_location();
        debug!(source = %source_id, location, "building app");

        let repository: Arc<dyn WeatherRepository> =
            Arc::new(WeatherRepositoryImpl::new(source, location));
        let (schedulers, ui) =
            AppSchedulers::current().context("myweather must run inside a tokio runtime")?;

        Ok(Self { repository, schedulers: Arc::new(schedulers), ui })
    }

    pub fn splash(&self) -> SplashViewModel {
        SplashViewModel::new(Arc::clone(&self.repository), Arc::clone(&self.schedulers))
    }

    pub fn weather(&self) -> WeatherViewModel {
        WeatherViewModel::new(Arc::clone(&self.repository), Arc::clone(&self.schedulers))
    }

    pub fn detail(&self) -> DetailViewModel {
        DetailViewModel::new(Arc::clone(&self.repository), Arc::clone(&self.schedulers))
    }
}
