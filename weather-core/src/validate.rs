//! Shape checks on the raw provider payload.

use serde_json::Value;

use crate::error::ShapeError;

/// Top-level keys every usable response carries.
pub const REQUIRED_KEYS: [&str; 3] = ["weather", "main", "wind"];

/// Pass the response through if it has the expected top-level shape.
///
/// Only the envelope is checked; fields inside `main` and `wind` may be
/// absent and get placeholders later.
pub fn validate_response(response: Value) -> Result<Value, ShapeError> {
    let Some(map) = response.as_object() else {
        return Err(ShapeError::NotAMapping);
    };

    if let Some(key) = REQUIRED_KEYS.into_iter().find(|key| !map.contains_key(*key)) {
        return Err(ShapeError::MissingKey(key));
    }

    if !map.get("weather").is_some_and(Value::is_array) {
        return Err(ShapeError::WeatherNotSequence);
    }

    Ok(response)
}
