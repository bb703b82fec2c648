use std::sync::Arc;
use tracing::debug;

use crate::{
    error::WeatherError,
    live::LiveEvent,
    repository::WeatherRepository,
    scheduler::{Disposables, SchedulerProvider, WithSchedulers},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SplashEvent {
    Loading,
    Success,
    Failed(WeatherError),
}

/// Warms up the default forecast before the main screen opens.
pub struct SplashViewModel {
    repository: Arc<dyn WeatherRepository>,
    schedulers: Arc<dyn SchedulerProvider>,
    events: LiveEvent<SplashEvent>,
    disposables: Disposables,
}

impl SplashViewModel {
    pub fn new(repository: Arc<dyn WeatherRepository>, schedulers: Arc<dyn SchedulerProvider>) -> Self {
        Self { repository, schedulers, events: LiveEvent::new(), disposables: Disposables::new() }
    }

    pub fn events(&self) -> &LiveEvent<SplashEvent> {
        &self.events
    }

    /// Publishes `Loading`, then `Success` or `Failed` once the default
    /// forecast resolves. Calling it again retries.
    pub fn get_last_weather(&self) {
        debug!("splash: loading default forecast");
        self.events.publish(SplashEvent::Loading);

        let repository = Arc::clone(&self.repository);
        let events = self.events.clone();
        let subscription = async move { repository.get_weather().await }
            .with_schedulers(&self.schedulers)
            .subscribe(move |result| match result {
                Ok(_) => events.publish(SplashEvent::Success),
                Err(error) => events.publish(SplashEvent::Failed(error)),
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
        testing::{FakeRepository, PendingRepository, forecasts, recorder},
    };

    fn immediate() -> Arc<dyn SchedulerProvider> {
        Arc::new(ImmediateSchedulers::new())
    }

    #[test]
    fn success_follows_loading_exactly_once() {
        let repo = Arc::new(FakeRepository::new().with_default(Ok(forecasts("Paris", 5))));
        let vm = SplashViewModel::new(repo.clone(), immediate());
        let (seen, observer) = recorder();
        let _obs = vm.events().observe(observer);

        vm.get_last_weather();

        assert_eq!(*seen.lock().unwrap(), vec![SplashEvent::Loading, SplashEvent::Success]);
        assert_eq!(repo.calls(), vec!["default"]);
    }

    #[test]
    fn failure_carries_the_repository_error() {
        let timeout = WeatherError::Io("timeout".into());
        let repo = Arc::new(FakeRepository::new().with_default(Err(timeout.clone())));
        let vm = SplashViewModel::new(repo, immediate());
        let (seen, observer) = recorder();
        let _obs = vm.events().observe(observer);

        vm.get_last_weather();

        assert_eq!(*seen.lock().unwrap(), vec![SplashEvent::Loading, SplashEvent::Failed(timeout)]);
    }

    #[test]
    fn retry_reenters_loading() {
        let repo = Arc::new(
            FakeRepository::new().with_default(Err(WeatherError::Transport("offline".into()))),
        );
        let vm = SplashViewModel::new(repo.clone(), immediate());
        let (seen, observer) = recorder();
        let _obs = vm.events().observe(observer);

        vm.get_last_weather();
        vm.get_last_weather();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[2], SplashEvent::Loading);
        assert_eq!(repo.calls().len(), 2);
    }

    #[tokio::test]
    async fn loading_is_published_before_the_repository_answers() {
        let (app, mut ui) = AppSchedulers::current().unwrap();
        let repo = Arc::new(PendingRepository::new());
        let reply = repo.next_list();
        let vm = SplashViewModel::new(repo, Arc::new(app));
        let (seen, observer) = recorder();
        let _obs = vm.events().observe(observer);

        vm.get_last_weather();
        assert_eq!(*seen.lock().unwrap(), vec![SplashEvent::Loading]);

        reply.send(Ok(forecasts("Paris", 2))).unwrap();
        assert!(ui.turn().await);
        assert_eq!(*seen.lock().unwrap(), vec![SplashEvent::Loading, SplashEvent::Success]);
    }

    #[tokio::test]
    async fn nothing_is_published_after_teardown() {
        let (app, mut ui) = AppSchedulers::current().unwrap();
        let repo = Arc::new(PendingRepository::new());
        let reply = repo.next_list();
        let vm = SplashViewModel::new(repo, Arc::new(app));
        let events = vm.events().clone();
        let (seen, observer) = recorder();
        let _obs = events.observe(observer);

        vm.get_last_weather();
        tokio::task::yield_now().await;
        drop(vm);

        let _ = reply.send(Ok(forecasts("Paris", 2)));
        tokio::task::yield_now().await;
        ui.run_pending().await;

        assert_eq!(*seen.lock().unwrap(), vec![SplashEvent::Loading]);
    }
}
