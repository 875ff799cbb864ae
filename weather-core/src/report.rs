//! Human-readable weather report.

use chrono::{DateTime, TimeZone};
use serde_json::Value;
use std::fmt::Display;

use crate::{error::ReportError, model::WeatherReading};

/// Rendered in place of any field the provider did not send.
pub const NO_DATA: &str = "нет данных";

pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

fn or_no_data<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| v.to_string())
}

/// Render the fixed seven-line report, stamped with `at`.
pub fn render<Tz>(reading: &WeatherReading, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{timestamp}\n\
         {city}\n\
         Погода: {temp_min}-{temp_max}°C, {description}\n\
         Температура: {temp}°C\n\
         Влажность: {humidity}%\n\
         Давление: {pressure} мм.рт.ст\n\
         Ветер: {direction}, {speed} м/с\n",
        timestamp = at.format(TIMESTAMP_FORMAT),
        city = reading.city,
        temp_min = or_no_data(reading.temp_min),
        temp_max = or_no_data(reading.temp_max),
        description = or_no_data(reading.description.as_deref()),
        temp = or_no_data(reading.temp.as_ref()),
        humidity = or_no_data(reading.humidity.as_ref()),
        pressure = or_no_data(reading.pressure_mm_hg.as_ref()),
        direction = or_no_data(reading.wind_direction.as_ref()),
        speed = or_no_data(reading.wind_speed.as_ref()),
    )
}

/// Decode a validated payload and render it.
pub fn format_report<Tz>(response: &Value, at: &DateTime<Tz>) -> Result<String, ReportError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let reading = WeatherReading::from_response(response)?;
    Ok(render(&reading, at))
}
