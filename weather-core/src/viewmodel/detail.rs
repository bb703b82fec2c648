use std::sync::Arc;
use tracing::debug;

use crate::{
    error::WeatherError,
    live::LiveState,
    model::DailyForecastModel,
    repository::WeatherRepository,
    scheduler::{Disposables, SchedulerProvider, WithSchedulers},
};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    WeatherDetail(DailyForecastModel),
    Error(WeatherError),
}

/// Detail screen for a single day. Unlike the other screens it has no
/// loading state: the slot stays empty until the lookup resolves.
pub struct DetailViewModel {
    repository: Arc<dyn WeatherRepository>,
    schedulers: Arc<dyn SchedulerProvider>,
    states: LiveState<DetailState>,
    disposables: Disposables,
}

impl DetailViewModel {
    pub fn new(repository: Arc<dyn WeatherRepository>, schedulers: Arc<dyn SchedulerProvider>) -> Self {
        Self { repository, schedulers, states: LiveState::new(), disposables: Disposables::new() }
    }

    pub fn states(&self) -> &LiveState<DetailState> {
        &self.states
    }

    pub fn get_detail(&self, id: impl Into<String>) {
        let id = id.into();
        debug!(id = %id, "detail: loading forecast");

        let repository = Arc::clone(&self.repository);
        let states = self.states.clone();
        let subscription = async move { repository.get_weather_detail(&id).await }
            .with_schedulers(&self.schedulers)
            .subscribe(move |result| match result {
                Ok(detail) => states.publish(DetailState::WeatherDetail(detail)),
                Err(error) => states.publish(DetailState::Error(error)),
            });

        self.disposables.add(subscription);
    }

    /// Disposes outstanding work. Also happens on drop.
    pub fn clear(&self) {
        self.disposables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        scheduler::{AppSchedulers, ImmediateSchedulers},
        testing::{FakeRepository, PendingRepository, forecast, recorder},
    };

    #[test]
    fn detail_is_the_only_published_state() {
        let mut item = forecast("Paris", 0);
        item.id = "42".into();
        let repo = Arc::new(FakeRepository::new().with_detail(item.clone()));
        let vm = DetailViewModel::new(repo, Arc::new(ImmediateSchedulers::new()));
        let (seen, observer) = recorder();
        let _obs = vm.states().observe(observer);

        vm.get_detail("42");

        assert_eq!(*seen.lock().unwrap(), vec![DetailState::WeatherDetail(item)]);
    }

    #[test]
    fn unknown_id_publishes_not_found() {
        let repo = Arc::new(FakeRepository::new());
        let vm = DetailViewModel::new(repo, Arc::new(ImmediateSchedulers::new()));

        vm.get_detail("missing");

        assert_eq!(
            vm.states().value(),
            Some(DetailState::Error(WeatherError::NotFound("missing".into())))
        );
    }

    #[tokio::test]
    async fn nothing_is_published_while_pending_or_after_drop() {
        let (app, mut ui) = AppSchedulers::current().unwrap();
        let repo = Arc::new(PendingRepository::new());
        let reply = repo.next_detail();
        let vm = DetailViewModel::new(repo, Arc::new(app));
        let states = vm.states().clone();

        vm.get_detail("42");
        tokio::task::yield_now().await;
        assert_eq!(states.value(), None);

        drop(vm);
        let _ = reply.send(Ok(forecast("Paris", 0)));
        tokio::task::yield_now().await;
        ui.run_pending().await;

        assert_eq!(states.value(), None);
    }
}
