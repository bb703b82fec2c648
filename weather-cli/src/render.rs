use myweather_core::DailyForecastModel;

pub fn glyph(icon: &str) -> &'static str {
    match icon {
        "clear" => "☀",
        "partlycloudy" => "⛅",
        "cloudy" => "☁",
        "fog" => "🌫",
        "rain" => "🌧",
        "sleet" => "🌨",
        "snow" => "❄",
        "tstorms" => "⛈",
        _ => "·",
    }
}

pub fn temperature(celsius: f64) -> String {
    format!("{celsius:.0}°C")
}

/// Today's card at the top of the weather screen.
pub fn header(location: &str, first: &DailyForecastModel) -> String {
    format!(
        "{location}\n{} {}  {}\n{}\n(id: {})",
        glyph(&first.icon),
        first.day,
        temperature(first.temperature),
        first.short_text,
        first.id,
    )
}

/// One row of the list under the header.
pub fn day_line(day: &DailyForecastModel) -> String {
    format!("{} {:<22} {:>5}  {}", glyph(&day.icon), day.day, temperature(day.temperature), day.short_text)
}

pub fn detail(day: &DailyForecastModel) -> String {
    let mut out = format!(
        "{} - {}\n{} {}\nHigh: {}",
        day.location,
        day.day,
        glyph(&day.icon),
        day.short_text,
        temperature(day.temperature),
    );

    if let Some(low) = day.temperature_low {
        out.push_str(&format!("\nLow: {}", temperature(low)));
    }
    if let Some(wind) = day.wind_kph {
        out.push_str(&format!("\nWind: {wind:.0} km/h"));
    }
    if let Some(humidity) = day.humidity_pct {
        out.push_str(&format!("\nHumidity: {humidity}%"));
    }

    out
}
