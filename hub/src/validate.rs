use crate::errors::{Error, Result};
use crate::model::{
    GenericInput, LinkState, Measurement, NewReading, ReadingFilter, TemperatureInput, UNKNOWN,
};
use serde_json::Value;

const TEMP_MIN: f64 = -50.0;
const TEMP_MAX: f64 = 100.0;

/// Validates a temperature ingestion request and fills in defaults
pub fn temperature_reading(input: TemperatureInput) -> Result<NewReading> {
    let (device_id, raw_temperature) = match (non_empty(input.device_id), input.temperature) {
        (Some(id), Some(t)) if !t.is_null() => (id, t),
        _ => {
            return Err(Error::Validation(
                "Missing required fields: deviceId and temperature".to_string(),
            ))
        }
    };

    let temperature = coerce_number("temperature", &raw_temperature)?;
    if !(TEMP_MIN..=TEMP_MAX).contains(&temperature) {
        return Err(Error::Range(format!(
            "Temperature {} out of range [{}, {}]",
            temperature, TEMP_MIN, TEMP_MAX
        )));
    }

    let humidity = match input.humidity {
        Some(raw) if !raw.is_null() => Some(coerce_number("humidity", &raw)?),
        _ => None,
    };

    Ok(NewReading {
        device_id,
        device_type: or_unknown(input.device_type),
        location: or_unknown(input.location),
        measurement: Measurement::Climate {
            temperature,
            humidity,
        },
    })
}

/// Validates a generic sensor ingestion request
pub fn generic_reading(input: GenericInput) -> Result<NewReading> {
    match (
        non_empty(input.device_id),
        non_empty(input.device_type),
        input.data,
    ) {
        (Some(device_id), Some(device_type), Some(data)) if !data.is_null() => Ok(NewReading {
            device_id,
            device_type,
            location: or_unknown(input.location),
            measurement: Measurement::Generic { data },
        }),
        _ => Err(Error::Validation(
            "Missing required fields: deviceId, deviceType, data".to_string(),
        )),
    }
}

/// Filter strings, when present, must name something.
pub fn filter(filter: &ReadingFilter) -> Result<()> {
    for (name, value) in [
        ("deviceId", &filter.device_id),
        ("deviceType", &filter.device_type),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(Error::Validation(format!("{} filter cannot be empty", name)));
        }
    }
    Ok(())
}

pub fn device_id(raw: Option<String>) -> Result<String> {
    non_empty(raw).ok_or_else(|| Error::Validation("Missing device ID".to_string()))
}

/// Blank means "keep the previous state"; anything else must name a state.
pub fn link_state(raw: Option<String>) -> Result<Option<LinkState>> {
    match non_empty(raw).as_deref().map(str::trim) {
        None => Ok(None),
        Some("online") => Ok(Some(LinkState::Online)),
        Some("offline") => Ok(Some(LinkState::Offline)),
        Some(other) => Err(Error::Validation(format!(
            "status must be \"online\" or \"offline\", got {:?}",
            other
        ))),
    }
}

/// Accepts JSON numbers and numeric strings; rejects anything non-finite
fn coerce_number(field: &str, raw: &Value) -> Result<f64> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(Error::Validation(format!(
            "Field {} must be a number, got {}",
            field, raw
        ))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn or_unknown(value: Option<String>) -> String {
    non_empty(value).unwrap_or_else(|| UNKNOWN.to_string())
}
