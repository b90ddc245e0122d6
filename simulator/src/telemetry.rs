use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};

/// Body posted to `/api/sensors/temperature`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperaturePayload {
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub location: String,
}

/// Body posted to `/api/sensors`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericPayload {
    pub device_id: String,
    pub device_type: String,
    pub data: Value,
    pub location: String,
}

/// Body sent with PUT `/api/devices/status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    pub device_id: String,
    pub device_type: String,
    pub status: &'static str,
    pub location: String,
}

pub fn device_id(index: usize) -> String {
    format!("ESP8266_{:03}", index + 1)
}

pub fn location(index: usize) -> String {
    format!("Room {}", (b'A' + (index % 26) as u8) as char)
}

pub fn temperature_reading(rng: &mut impl Rng, index: usize) -> TemperaturePayload {
    let temperature = if rng.gen_bool(0.05) {
        rng.gen_range(100.5..150.0) // 5% outliers the hub must reject
    } else {
        rng.gen_range(18.0..30.0)
    };

    TemperaturePayload {
        device_id: device_id(index),
        temperature: round1(temperature),
        humidity: round1(rng.gen_range(30.0..80.0)),
        location: location(index),
    }
}

pub fn generic_reading(rng: &mut impl Rng, index: usize) -> GenericPayload {
    GenericPayload {
        device_id: device_id(index),
        device_type: "environment".to_string(),
        data: json!({
            "pressure": round1(rng.gen_range(990.0..1030.0)),
            "lightLevel": rng.gen_range(0..1024),
            "rssi": rng.gen_range(-90..-40),
        }),
        location: location(index),
    }
}

pub fn status(index: usize, online: bool) -> StatusPayload {
    StatusPayload {
        device_id: device_id(index),
        device_type: "ESP8266".to_string(),
        status: if online { "online" } else { "offline" },
        location: location(index),
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
