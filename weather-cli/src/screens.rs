//! Terminal views for the splash, weather and detail screens.
//!
//! Views observe the view model slots and render from inside the observers.
//! The main task drains the UI loop until the screen it waits on settles.

use anyhow::anyhow;
use inquire::{Confirm, InquireError, Select, Text};
use myweather_core::{
    DailyForecastModel, Observation, WeatherError,
    viewmodel::{DetailState, SplashEvent, WeatherEvent, WeatherState, WeatherViewModel},
};
use std::{
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{app::App, render};

#[derive(Debug)]
pub struct ShowOptions {
    pub location: Option<String>,
    pub detail: Option<String>,
    pub interactive: bool,
}

pub async fn show(app: &mut App, opts: ShowOptions) -> anyhow::Result<()> {
    splash(app, opts.interactive).await?;

    let weather = app.weather();
    let screen = WeatherScreen::attach(&weather);

    weather.get_weather();
    screen.settle(app).await;
    if let Some(WeatherState::Error(error)) = weather.states().value() {
        return Err(anyhow!(error).context("Failed to load the forecast"));
    }

    if let Some(location) = opts.location {
        search(app, &weather, &screen, location, opts.interactive).await?;
    }

    if let Some(id) = opts.detail {
        detail(app, id).await?;
    }

    if opts.interactive {
        browse(app, &weather, &screen).await?;
    }

    Ok(())
}

async fn splash(app: &mut App, interactive: bool) -> anyhow::Result<()> {
    let vm = app.splash();
    let outcome: Arc<Mutex<Option<SplashEvent>>> = Arc::default();
    let sink = Arc::clone(&outcome);
    let _observation = vm.events().observe(move |event| match event {
        SplashEvent::Loading => eprintln!("Loading forecast..."),
        done => *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(done.clone()),
    });

    loop {
        vm.get_last_weather();
        app.ui.run_until(|| outcome.lock().unwrap_or_else(PoisonError::into_inner).is_some()).await;

        let result = outcome.lock().unwrap_or_else(PoisonError::into_inner).take();
        match result {
            Some(SplashEvent::Failed(error)) => {
                eprintln!("Could not load the forecast: {error}");
                if !interactive || !ask(Confirm::new("Retry?").with_default(true).prompt())? {
                    return Err(anyhow!(error));
                }
            }
            // Closed loop or success.
            _ => return Ok(()),
        }
    }
}

/// Renders the weather screen and counts settled outcomes so the flow knows
/// when to stop draining the UI loop.
struct WeatherScreen {
    settled: Arc<AtomicUsize>,
    failed_search: Arc<Mutex<Option<(String, WeatherError)>>>,
    _states: Observation,
    _events: Observation,
}

impl WeatherScreen {
    fn attach(vm: &WeatherViewModel) -> Self {
        let settled = Arc::new(AtomicUsize::new(0));
        let failed_search: Arc<Mutex<Option<(String, WeatherError)>>> = Arc::default();

        let on_state = Arc::clone(&settled);
        let states = vm.states().observe(move |state| match state {
            WeatherState::Loading => eprintln!("Loading..."),
            WeatherState::List(list) => {
                println!("\n{}\n", render::header(&list.location, &list.first));
                for day in &list.rest {
                    println!("{}", render::day_line(day));
                }
                on_state.fetch_add(1, Ordering::SeqCst);
            }
            WeatherState::Error(error) => {
                eprintln!("Error: {error}");
                on_state.fetch_add(1, Ordering::SeqCst);
            }
        });

        let on_event = Arc::clone(&settled);
        let failures = Arc::clone(&failed_search);
        let events = vm.events().observe(move |event| match event {
            WeatherEvent::LoadingLocation(location) => eprintln!("Loading location {location} ..."),
            WeatherEvent::LocationSearchFailed { location, error } => {
                eprintln!("Could not load {location}: {error}");
                *failures.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some((location.clone(), error.clone()));
                on_event.fetch_add(1, Ordering::SeqCst);
            }
        });

        Self { settled, failed_search, _states: states, _events: events }
    }

    /// Drains the UI loop until one more outcome has been rendered.
    async fn settle(&self, app: &mut App) {
        let target = self.settled.load(Ordering::SeqCst) + 1;
        app.ui.run_until(|| self.settled.load(Ordering::SeqCst) >= target).await;
    }

    fn take_failed_search(&self) -> Option<(String, WeatherError)> {
        self.failed_search.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

async fn search(
    app: &mut App,
    vm: &WeatherViewModel,
    screen: &WeatherScreen,
    location: String,
    interactive: bool,
) -> anyhow::Result<()> {
    let mut location = location;
    loop {
        vm.load_new_location(location.clone());
        screen.settle(app).await;

        let Some((failed, error)) = screen.take_failed_search() else {
            return Ok(());
        };
        if !interactive {
            return Err(anyhow!(error).context(format!("Failed to load location '{failed}'")));
        }
        if !ask(Confirm::new("Retry?").with_default(true).prompt())? {
            return Ok(());
        }
        location = failed;
    }
}

async fn detail(app: &mut App, id: String) -> anyhow::Result<()> {
    let vm = app.detail();
    let states = vm.states().clone();

    vm.get_detail(id);
    app.ui.run_until(|| states.value().is_some()).await;

    match states.value() {
        Some(DetailState::WeatherDetail(day)) => {
            println!("\n{}\n", render::detail(&day));
            Ok(())
        }
        Some(DetailState::Error(error)) => Err(anyhow!(error)),
        None => Err(anyhow!("UI loop closed before the detail arrived")),
    }
}

enum MenuChoice {
    Day(Box<DailyForecastModel>),
    Search,
    Quit,
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuChoice::Day(day) => f.write_str(&render::day_line(day)),
            MenuChoice::Search => f.write_str("Search another location"),
            MenuChoice::Quit => f.write_str("Quit"),
        }
    }
}

async fn browse(app: &mut App, vm: &WeatherViewModel, screen: &WeatherScreen) -> anyhow::Result<()> {
    loop {
        let Some(WeatherState::List(list)) = vm.states().value() else {
            return Ok(());
        };

        let mut choices: Vec<MenuChoice> = std::iter::once(list.first)
            .chain(list.rest)
            .map(|day| MenuChoice::Day(Box::new(day)))
            .collect();
        choices.push(MenuChoice::Search);
        choices.push(MenuChoice::Quit);

        let Some(choice) = ask_optional(Select::new(&list.location, choices).prompt())? else {
            return Ok(());
        };

        match choice {
            MenuChoice::Day(day) => {
                if let Err(err) = detail(app, day.id).await {
                    eprintln!("Error: {err:#}");
                }
            }
            MenuChoice::Search => {
                let Some(location) = ask_optional(Text::new("Location:").prompt())? else {
                    continue;
                };
                let location = location.trim().to_string();
                if !location.is_empty() {
                    search(app, vm, screen, location, true).await?;
                }
            }
            MenuChoice::Quit => return Ok(()),
        }
    }
}

/// Esc or Ctrl-C on a prompt means "no".
fn ask(answer: Result<bool, InquireError>) -> anyhow::Result<bool> {
    Ok(ask_optional(answer)?.unwrap_or(false))
}

fn ask_optional<T>(answer: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
