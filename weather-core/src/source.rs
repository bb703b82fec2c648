use crate::{
    Config, DailyForecastModel,
    error::{Result, WeatherError},
    source::{offline::OfflineSource, openmeteo::OpenMeteoSource, weatherapi::WeatherApiSource},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod offline;
pub mod openmeteo;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    OpenMeteo,
    WeatherApi,
    Offline,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::OpenMeteo => "open-meteo",
            SourceId::WeatherApi => "weatherapi",
            SourceId::Offline => "offline",
        }
    }

    pub const fn all() -> &'static [SourceId] {
        &[SourceId::OpenMeteo, SourceId::WeatherApi, SourceId::Offline]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, SourceId::WeatherApi)
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SourceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "open-meteo" | "openmeteo" => Ok(SourceId::OpenMeteo),
            "weatherapi" => Ok(SourceId::WeatherApi),
            "offline" | "local" => Ok(SourceId::Offline),
            _ => Err(anyhow::anyhow!(
                "Unknown source '{value}'. Supported sources: open-meteo, weatherapi, offline."
            )),
        }
    }
}

/// Where daily forecasts come from: a remote API or the bundled dataset.
///
/// Each call is one network or storage read. An empty list is turned into
/// [`WeatherError::NoForecast`] by the repository.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn daily_forecasts(&self, location: &str) -> Result<Vec<DailyForecastModel>>;
}

/// Construct a source from config and explicit SourceId.
pub fn source_from_config(id: SourceId, config: &Config) -> anyhow::Result<Arc<dyn ForecastSource>> {
    let source: Arc<dyn ForecastSource> = match id {
        SourceId::OpenMeteo => Arc::new(OpenMeteoSource::new()),
        SourceId::Offline => Arc::new(OfflineSource::bundled()?),
        SourceId::WeatherApi => {
            let api_key = config.source_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for source '{id}'.\n\
                         Hint: run `myweather configure {id}` and enter your API key."
                )
            })?;
            Arc::new(WeatherApiSource::new(api_key.to_owned()))
        }
    };

    Ok(source)
}

/// Construct the default source from config, using `default_source` field.
pub fn default_source_from_config(config: &Config) -> anyhow::Result<Arc<dyn ForecastSource>> {
    let id = config.default_source_id()?;
    source_from_config(id, config)
}

/// Turns a non-success HTTP status into [`WeatherError::Http`].
pub(crate) fn check_status(status: reqwest::StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(WeatherError::Http { status: status.as_u16(), body: truncate_body(body) })
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn source_id_as_str_roundtrip() {
        for id in SourceId::all() {
            let parsed = SourceId::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_source_error() {
        let err = SourceId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown source"));
    }

    #[test]
    fn weatherapi_requires_api_key() {
        let cfg = Config::default();
        let err = source_from_config(SourceId::WeatherApi, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for source"));
    }

    #[test]
    fn keyless_sources_build_without_config() {
        let cfg = Config::default();
        assert!(source_from_config(SourceId::OpenMeteo, &cfg).is_ok());
        assert!(source_from_config(SourceId::Offline, &cfg).is_ok());
    }

    #[test]
    fn default_source_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_source_api_key(SourceId::WeatherApi, "KEY".to_string());

        assert_eq!(cfg.default_source_id().unwrap(), SourceId::WeatherApi);
        assert!(default_source_from_config(&cfg).is_ok());
    }

    #[test]
    fn check_status_truncates_long_bodies() {
        let body = "x".repeat(500);
        let err = check_status(reqwest::StatusCode::BAD_GATEWAY, &body).unwrap_err();
        match err {
            WeatherError::Http { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body.len(), 203);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
