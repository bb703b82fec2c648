use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of forecast for a location, as produced by a forecast source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastModel {
    /// Stable identifier, `<location-slug>:<yyyy-mm-dd>`.
    pub id: String,
    pub location: String,
    /// Human readable day label, e.g. "Monday, March 12".
    pub day: String,
    /// Icon code, one of [`ICON_CODES`].
    pub icon: String,
    /// Daytime high in °C.
    pub temperature: f64,
    pub short_text: String,
    #[serde(default)]
    pub temperature_low: Option<f64>,
    #[serde(default)]
    pub wind_kph: Option<f64>,
    #[serde(default)]
    pub humidity_pct: Option<u8>,
}

pub const ICON_CLEAR: &str = "clear";
pub const ICON_PARTLY_CLOUDY: &str = "partlycloudy";
pub const ICON_CLOUDY: &str = "cloudy";
pub const ICON_FOG: &str = "fog";
pub const ICON_RAIN: &str = "rain";
pub const ICON_SLEET: &str = "sleet";
pub const ICON_SNOW: &str = "snow";
pub const ICON_STORM: &str = "tstorms";
pub const ICON_UNKNOWN: &str = "unknown";

pub const ICON_CODES: &[&str] = &[
    ICON_CLEAR,
    ICON_PARTLY_CLOUDY,
    ICON_CLOUDY,
    ICON_FOG,
    ICON_RAIN,
    ICON_SLEET,
    ICON_SNOW,
    ICON_STORM,
    ICON_UNKNOWN,
];

/// Builds the stable id of the forecast for `location` on `date`.
pub fn forecast_id(location: &str, date: NaiveDate) -> String {
    let slug: String = location
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();

    format!("{}:{}", slug, date.format("%Y-%m-%d"))
}

pub fn day_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}
