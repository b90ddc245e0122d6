use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

pub const UNKNOWN: &str = "unknown";

/// Endpoint family a reading belongs to. Each family has its own bounded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Temperature,
    Generic,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Temperature => "temperature",
            Family::Generic => "generic",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a device measured. Temperature readings carry climate values,
/// generic readings carry an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measurement {
    Climate {
        temperature: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        humidity: Option<f64>,
    },
    Generic {
        data: Value,
    },
}

/// One immutable telemetry sample as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: Uuid,
    /// Insertion sequence within the store, used to break timestamp ties.
    pub seq: u64,
    pub device_id: String,
    pub device_type: String,
    pub location: String,
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Server receipt time.
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn temperature(&self) -> Option<f64> {
        match self.measurement {
            Measurement::Climate { temperature, .. } => Some(temperature),
            Measurement::Generic { .. } => None,
        }
    }

    pub fn humidity(&self) -> Option<f64> {
        match self.measurement {
            Measurement::Climate { humidity, .. } => humidity,
            Measurement::Generic { .. } => None,
        }
    }
}

/// A validated reading that has not been stamped with id and receipt time yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub device_id: String,
    pub device_type: String,
    pub location: String,
    pub measurement: Measurement,
}

/// Body of a temperature ingestion request. Numeric fields stay raw JSON so
/// numeric strings from device firmware can be coerced during validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureInput {
    #[serde(default, alias = "device_id")]
    pub device_id: Option<String>,
    #[serde(default)]
    pub temperature: Option<Value>,
    #[serde(default)]
    pub humidity: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "device_type")]
    pub device_type: Option<String>,
}

/// Body of a generic sensor ingestion request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericInput {
    #[serde(default, alias = "device_id")]
    pub device_id: Option<String>,
    #[serde(default, alias = "device_type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Filter for `TelemetryStore::query`. A `None` limit means the family default.
#[derive(Debug, Clone, Default)]
pub struct ReadingFilter {
    pub device_id: Option<String>,
    pub device_type: Option<String>,
    pub limit: Option<i64>,
}

/// Explicitly reported connectivity, as opposed to staleness derived from readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Online,
    Offline,
}

/// Entry in the device registry. Created on first upsert, merged on every later one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub device_id: String,
    pub device_type: String,
    pub status: LinkState,
    pub last_seen: DateTime<Utc>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Partial device status update. Omitted or blank fields keep their previous value.
/// `status` stays a string so a blank value can be told apart from a bad one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    #[serde(default, alias = "device_id")]
    pub device_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "device_type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCounts {
    pub total_devices: usize,
    pub online_devices: usize,
    pub offline_devices: usize,
}

impl DeviceCounts {
    pub fn tally(online: impl Iterator<Item = bool>) -> Self {
        let mut counts = DeviceCounts::default();
        for is_online in online {
            counts.total_devices += 1;
            if is_online {
                counts.online_devices += 1;
            } else {
                counts.offline_devices += 1;
            }
        }
        counts
    }
}

/// All registry entries plus a summary of their explicit status flags.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub summary: DeviceCounts,
    pub data: Vec<DeviceStatus>,
}

/// Latest reading of a device classified by how long ago it arrived.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLiveness {
    #[serde(flatten)]
    pub reading: Reading,
    pub online: bool,
    pub seconds_since_report: i64,
}

/// Dashboard aggregate derived from reading recency.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub staleness_secs: i64,
    pub summary: DeviceCounts,
    pub data: Vec<DeviceLiveness>,
}

/// REST envelope for successful writes
#[derive(Debug, Serialize)]
pub struct Ack<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> Ack<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// REST envelope for list reads
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> Listing<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// REST envelope for device status reads, either one entry or the whole registry.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Single {
        success: bool,
        data: DeviceStatus,
    },
    Report {
        success: bool,
        #[serde(flatten)]
        report: StatusReport,
    },
}
