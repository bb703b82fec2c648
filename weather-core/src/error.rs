use thiserror::Error;

/// Failure reported by a forecast source or the repository.
///
/// Payloads are plain strings so the error can be cloned into screen states
/// and events and compared in tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("No forecast days returned for '{0}'")]
    NoForecast(String),

    #[error("No forecast with id '{0}'")]
    NotFound(String),

    #[error("No API key configured for source '{0}'")]
    MissingApiKey(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for WeatherError {
    fn from(err: std::io::Error) -> Self {
        WeatherError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;
