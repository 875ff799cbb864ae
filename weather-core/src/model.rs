//! Typed view of an OpenWeather "current weather" payload.
//!
//! The provider marks almost every field optional, so the decode step keeps
//! each one as an `Option` and the formatter renders `None` as a placeholder.
//! The city name is the exception: without it the report is meaningless and
//! decoding fails.

use serde_json::{Number, Value};
use std::fmt;

use crate::error::ReportError;

/// Hectopascals in one millimetre of mercury, as used for reporting.
pub const HPA_PER_MM_HG: f64 = 1.333;

/// Convert hectopascals to millimetres of mercury, always rounding up.
pub fn hpa_to_mm_hg(hpa: f64) -> i64 {
    (hpa / HPA_PER_MM_HG).ceil() as i64
}

/// One of the eight 45° compass sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompassPoint {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassPoint {
    /// Sectors in clockwise order starting at 0°.
    pub const ALL: [CompassPoint; 8] = [
        CompassPoint::North,
        CompassPoint::NorthEast,
        CompassPoint::East,
        CompassPoint::SouthEast,
        CompassPoint::South,
        CompassPoint::SouthWest,
        CompassPoint::West,
        CompassPoint::NorthWest,
    ];

    /// Bucket a heading in degrees; any real value maps to a sector.
    pub fn from_degrees(degrees: f64) -> Self {
        let sector = (degrees.rem_euclid(360.0) / 45.0) as usize;
        // rem_euclid may yield exactly 360.0 for tiny negative inputs.
        Self::ALL[sector % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            CompassPoint::North => "Северный",
            CompassPoint::NorthEast => "Северо-восточный",
            CompassPoint::East => "Восточный",
            CompassPoint::SouthEast => "Юго-восточный",
            CompassPoint::South => "Южный",
            CompassPoint::SouthWest => "Юго-западный",
            CompassPoint::West => "Западный",
            CompassPoint::NorthWest => "Северо-западный",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A report slot: a number, a derived compass point, or whatever else the
/// provider sent, rendered as is.
#[derive(Debug, Clone, PartialEq)]
pub enum Measure {
    Number(Number),
    Compass(CompassPoint),
    Raw(String),
}

impl Measure {
    fn raw(value: &Value) -> Self {
        match value {
            Value::Number(n) => Measure::Number(n.clone()),
            Value::String(s) => Measure::Raw(s.clone()),
            other => Measure::Raw(other.to_string()),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Number(n) => write!(f, "{n}"),
            Measure::Compass(point) => write!(f, "{point}"),
            Measure::Raw(s) => f.write_str(s),
        }
    }
}

/// Fields of one observation that end up in the report.
///
/// Pass-through numbers keep their JSON form so `12` renders as `12` and
/// `12.5` as `12.5`. Pressure and wind direction are converted only when
/// numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub city: String,
    pub description: Option<String>,
    pub temp_min: Option<i64>,
    pub temp_max: Option<i64>,
    pub temp: Option<Measure>,
    pub humidity: Option<Measure>,
    pub pressure_mm_hg: Option<Measure>,
    pub wind_speed: Option<Measure>,
    pub wind_direction: Option<Measure>,
}

impl WeatherReading {
    /// Decode a payload that already passed [`crate::validate::validate_response`].
    pub fn from_response(response: &Value) -> Result<Self, ReportError> {
        let city = match response.get("name") {
            Some(Value::String(name)) => name.clone(),
            None | Some(Value::Null) => return Err(ReportError::MissingCity),
            Some(other) => other.to_string(),
        };

        let description = response
            .get("weather")
            .and_then(|weather| weather.get(0))
            .and_then(|first| first.get("description"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(Self {
            city,
            description,
            temp_min: rounded(response, "temp_min", "main.temp_min")?,
            temp_max: rounded(response, "temp_max", "main.temp_max")?,
            temp: field(response, "main", "temp").map(Measure::raw),
            humidity: field(response, "main", "humidity").map(Measure::raw),
            pressure_mm_hg: field(response, "main", "pressure").map(|hpa| match hpa.as_f64() {
                Some(hpa) => Measure::Number(hpa_to_mm_hg(hpa).into()),
                None => Measure::raw(hpa),
            }),
            wind_speed: field(response, "wind", "speed").map(Measure::raw),
            wind_direction: field(response, "wind", "deg").map(|deg| match deg.as_f64() {
                Some(deg) => Measure::Compass(CompassPoint::from_degrees(deg)),
                None => Measure::raw(deg),
            }),
        })
    }
}

fn field<'a>(response: &'a Value, section: &str, key: &str) -> Option<&'a Value> {
    response
        .get(section)?
        .get(key)
        .filter(|value| !value.is_null())
}

/// Temperature bounds are rounded half-to-even; a non-numeric value is an error.
fn rounded(
    response: &Value,
    key: &str,
    name: &'static str,
) -> Result<Option<i64>, ReportError> {
    match field(response, "main", key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(|t| Some(t.round_ties_even() as i64))
            .ok_or(ReportError::NotANumber { field: name }),
    }
}
