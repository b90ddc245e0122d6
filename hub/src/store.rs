//! In-memory telemetry store.
//!
//! Two bounded reading buffers (temperature and generic families) plus an
//! unbounded device status registry, all guarded by one mutex so every
//! operation is atomic with respect to the others.
//!
//! The registry never evicts. Growth is bounded only by the number of distinct
//! device ids that ever report status.

use crate::clock::Clock;
use crate::errors::{Error, Result};
use crate::metrics::{
    KNOWN_DEVICES, READINGS_ACCEPTED_TOTAL, READINGS_EVICTED_TOTAL, READINGS_REJECTED_TOTAL,
    RETAINED_READINGS, STATUS_UPDATES_TOTAL,
};
use crate::model::{
    DeviceCounts, DeviceLiveness, DeviceStatus, Family, GenericInput, LinkState,
    NewReading, Overview, Reading, ReadingFilter, StatusReport, StatusUpdate, TemperatureInput,
    UNKNOWN,
};
use crate::ring::BoundedLog;
use crate::validate;
use chrono::{DateTime, Duration, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub temperature_capacity: usize,
    pub generic_capacity: usize,
    pub temperature_default_limit: usize,
    pub generic_default_limit: usize,
    pub staleness: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            temperature_capacity: 100,
            generic_capacity: 200,
            temperature_default_limit: 20,
            generic_default_limit: 50,
            staleness: Duration::seconds(60),
        }
    }
}

struct Inner {
    temperature: BoundedLog<Reading>,
    generic: BoundedLog<Reading>,
    devices: HashMap<String, DeviceStatus>,
    next_seq: u64,
}

impl Inner {
    fn log(&self, family: Family) -> &BoundedLog<Reading> {
        match family {
            Family::Temperature => &self.temperature,
            Family::Generic => &self.generic,
        }
    }

    fn log_mut(&mut self, family: Family) -> &mut BoundedLog<Reading> {
        match family {
            Family::Temperature => &mut self.temperature,
            Family::Generic => &mut self.generic,
        }
    }
}

pub struct TelemetryStore {
    inner: Mutex<Inner>,
    config: StoreConfig,
    clock: Arc<dyn Clock>,
}

impl TelemetryStore {
    pub fn new(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let inner = Inner {
            temperature: BoundedLog::with_capacity(config.temperature_capacity),
            generic: BoundedLog::with_capacity(config.generic_capacity),
            devices: HashMap::new(),
            next_seq: 0,
        };

        Self {
            inner: Mutex::new(inner),
            config,
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Internal("telemetry store lock poisoned".to_string()))
    }

    /// Validates and stores a temperature/humidity reading.
    pub fn record_temperature(&self, input: TemperatureInput) -> Result<Reading> {
        let draft =
            validate::temperature_reading(input).map_err(|e| reject(Family::Temperature, e))?;
        self.record(Family::Temperature, draft)
    }

    /// Validates and stores a generic sensor reading.
    pub fn record_generic(&self, input: GenericInput) -> Result<Reading> {
        let draft = validate::generic_reading(input).map_err(|e| reject(Family::Generic, e))?;
        self.record(Family::Generic, draft)
    }

    fn record(&self, family: Family, draft: NewReading) -> Result<Reading> {
        let mut inner = self.lock()?;

        let seq = inner.next_seq;
        inner.next_seq += 1;

        let reading = Reading {
            id: Uuid::new_v4(),
            seq,
            device_id: draft.device_id,
            device_type: draft.device_type,
            location: draft.location,
            measurement: draft.measurement,
            timestamp: self.clock.now(),
        };

        let log = inner.log_mut(family);
        if let Some(evicted) = log.push(reading.clone()) {
            READINGS_EVICTED_TOTAL.inc();
            debug!(
                family = %family,
                evicted_id = %evicted.id,
                capacity = log.capacity(),
                "Evicted oldest reading"
            );
        }
        RETAINED_READINGS
            .with_label_values(&[family.as_str()])
            .set(log.len() as i64);
        drop(inner);

        READINGS_ACCEPTED_TOTAL.inc();
        match reading.temperature() {
            Some(temperature) => info!(
                device_id = %reading.device_id,
                family = %family,
                temperature,
                humidity = ?reading.humidity(),
                "Received temperature reading"
            ),
            None => info!(
                device_id = %reading.device_id,
                family = %family,
                device_type = %reading.device_type,
                "Received device reading"
            ),
        }

        Ok(reading)
    }

    /// Most recent readings first, filtered by exact device id and/or type.
    ///
    /// A limit of zero or below yields an empty result; `None` uses the family default.
    pub fn query(&self, family: Family, filter: &ReadingFilter) -> Result<Vec<Reading>> {
        validate::filter(filter)?;

        let limit = match filter.limit {
            None => self.default_limit(family),
            Some(n) if n <= 0 => return Ok(Vec::new()),
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        };

        let mut matches: Vec<Reading> = {
            let inner = self.lock()?;
            let found: Vec<Reading> = inner
                .log(family)
                .iter()
                .filter(|r| {
                    filter.device_id.as_ref().map_or(true, |id| &r.device_id == id)
                        && filter
                            .device_type
                            .as_ref()
                            .map_or(true, |t| &r.device_type == t)
                })
                .cloned()
                .collect();
            found
        };

        sort_newest_first(&mut matches);
        matches.truncate(limit);
        Ok(matches)
    }

    /// One reading per device seen in the retained window: its newest one.
    ///
    /// Devices whose readings were all evicted do not appear.
    pub fn latest_per_device(&self, family: Family) -> Result<Vec<Reading>> {
        let mut latest: Vec<Reading> = {
            let inner = self.lock()?;
            let mut by_device: HashMap<&str, &Reading> = HashMap::new();
            for reading in inner.log(family).iter() {
                match by_device.entry(reading.device_id.as_str()) {
                    Entry::Vacant(slot) => {
                        slot.insert(reading);
                    }
                    Entry::Occupied(mut slot) => {
                        if newer(reading, slot.get()) {
                            slot.insert(reading);
                        }
                    }
                }
            }
            let newest: Vec<Reading> = by_device.into_values().cloned().collect();
            newest
        };

        sort_newest_first(&mut latest);
        Ok(latest)
    }

    /// Latest temperature reading per device, classified online when it
    /// arrived less than the staleness threshold ago.
    pub fn device_overview(&self) -> Result<Overview> {
        let latest = self.latest_per_device(Family::Temperature)?;
        let now = self.clock.now();

        let data: Vec<DeviceLiveness> = latest
            .into_iter()
            .map(|reading| {
                let elapsed = now - reading.timestamp;
                DeviceLiveness {
                    online: is_fresh(reading.timestamp, now, self.config.staleness),
                    seconds_since_report: elapsed.num_seconds().max(0),
                    reading,
                }
            })
            .collect();

        Ok(Overview {
            staleness_secs: self.config.staleness.num_seconds(),
            summary: DeviceCounts::tally(data.iter().map(|d| d.online)),
            data,
        })
    }

    /// Creates or merges a device registry entry. `lastSeen` is always refreshed.
    pub fn upsert_device_status(&self, update: StatusUpdate) -> Result<DeviceStatus> {
        let (device_id, link_state) = match (
            validate::device_id(update.device_id),
            validate::link_state(update.status),
        ) {
            (Ok(device_id), Ok(link_state)) => (device_id, link_state),
            (Err(e), _) | (Ok(_), Err(e)) => {
                warn!("Rejected device status update: {}", e);
                return Err(e);
            }
        };

        let device_type = update.device_type.filter(|v| !v.trim().is_empty());
        let location = update.location.filter(|v| !v.trim().is_empty());

        let mut inner = self.lock()?;
        let now = self.clock.now();

        let status = match inner.devices.entry(device_id) {
            Entry::Vacant(slot) => {
                let created = DeviceStatus {
                    device_id: slot.key().clone(),
                    device_type: device_type.unwrap_or_else(|| UNKNOWN.to_string()),
                    status: link_state.unwrap_or(LinkState::Online),
                    last_seen: now,
                    location: location.unwrap_or_else(|| UNKNOWN.to_string()),
                    data: update.data,
                };
                slot.insert(created).clone()
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if let Some(status) = link_state {
                    existing.status = status;
                }
                if let Some(device_type) = device_type {
                    existing.device_type = device_type;
                }
                if let Some(location) = location {
                    existing.location = location;
                }
                if let Some(data) = update.data {
                    existing.data = Some(data);
                }
                existing.last_seen = now;
                existing.clone()
            }
        };
        KNOWN_DEVICES.set(inner.devices.len() as i64);
        drop(inner);

        STATUS_UPDATES_TOTAL.inc();
        info!(
            device_id = %status.device_id,
            status = ?status.status,
            "Device status updated"
        );
        Ok(status)
    }

    pub fn device_status(&self, device_id: &str) -> Result<DeviceStatus> {
        let found = self.lock()?.devices.get(device_id).cloned();
        found.ok_or_else(|| Error::NotFound(format!("Device {} not found", device_id)))
    }

    /// Every registry entry, ordered by device id.
    pub fn device_statuses(&self) -> Result<StatusReport> {
        let mut data: Vec<DeviceStatus> = {
            let inner = self.lock()?;
            let entries: Vec<DeviceStatus> = inner.devices.values().cloned().collect();
            entries
        };
        data.sort_by(|a, b| a.device_id.cmp(&b.device_id));

        Ok(StatusReport {
            summary: DeviceCounts::tally(data.iter().map(|d| d.status == LinkState::Online)),
            data,
        })
    }

    pub fn retained(&self, family: Family) -> Result<usize> {
        let len = self.lock()?.log(family).len();
        Ok(len)
    }

    fn default_limit(&self, family: Family) -> usize {
        match family {
            Family::Temperature => self.config.temperature_default_limit,
            Family::Generic => self.config.generic_default_limit,
        }
    }
}

fn reject(family: Family, err: Error) -> Error {
    READINGS_REJECTED_TOTAL.inc();
    warn!(family = %family, "Rejected reading: {}", err);
    err
}

fn newer(a: &Reading, b: &Reading) -> bool {
    (a.timestamp, a.seq) > (b.timestamp, b.seq)
}

fn sort_newest_first(readings: &mut [Reading]) {
    readings.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.seq.cmp(&a.seq))
    });
}

/// A report from the future (clock skew) counts as fresh.
pub fn is_fresh(reported: DateTime<Utc>, now: DateTime<Utc>, staleness: Duration) -> bool {
    now - reported < staleness
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn store_with(config: StoreConfig) -> (TelemetryStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (TelemetryStore::new(config, clock.clone()), clock)
    }

    fn store() -> (TelemetryStore, Arc<ManualClock>) {
        store_with(StoreConfig::default())
    }

    fn temp(device_id: &str, temperature: f64) -> TemperatureInput {
        TemperatureInput {
            device_id: Some(device_id.to_string()),
            temperature: Some(json!(temperature)),
            ..Default::default()
        }
    }

    fn generic(device_id: &str, device_type: &str) -> GenericInput {
        GenericInput {
            device_id: Some(device_id.to_string()),
            device_type: Some(device_type.to_string()),
            data: Some(json!({"value": 1})),
            location: None,
        }
    }

    fn by_device(device_id: &str, limit: i64) -> ReadingFilter {
        ReadingFilter {
            device_id: Some(device_id.to_string()),
            limit: Some(limit),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_then_query_returns_it() {
        let (store, _clock) = store();
        let stored = store
            .record_temperature(TemperatureInput {
                humidity: Some(json!(62.3)),
                ..temp("D1", 24.5)
            })
            .unwrap();

        assert_eq!(stored.temperature(), Some(24.5));
        assert_eq!(stored.humidity(), Some(62.3));

        let found = store.query(Family::Temperature, &by_device("D1", 1)).unwrap();
        assert_eq!(found, vec![stored]);
    }

    #[test]
    fn test_out_of_range_is_not_stored() {
        let (store, _clock) = store();
        let err = store.record_temperature(temp("D1", 150.0)).unwrap_err();

        assert!(matches!(err, Error::Range(_)));
        assert_eq!(store.retained(Family::Temperature).unwrap(), 0);
    }

    #[test]
    fn test_missing_device_is_not_stored() {
        let (store, _clock) = store();
        let err = store
            .record_temperature(TemperatureInput {
                temperature: Some(json!(20)),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.retained(Family::Temperature).unwrap(), 0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let (store, clock) = store();
        let first = store.record_temperature(temp("D0", 20.0)).unwrap();
        for i in 1..=100 {
            clock.advance(Duration::seconds(1));
            store
                .record_temperature(temp(&format!("D{}", i), 20.0))
                .unwrap();
        }

        assert_eq!(store.retained(Family::Temperature).unwrap(), 100);
        let all = store
            .query(
                Family::Temperature,
                &ReadingFilter {
                    limit: Some(200),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(all.len(), 100);
        assert!(all.iter().all(|r| r.id != first.id));
        assert_eq!(all.last().unwrap().device_id, "D1");
    }

    #[test]
    fn test_families_are_bounded_independently() {
        let (store, _clock) = store_with(StoreConfig {
            temperature_capacity: 2,
            generic_capacity: 3,
            ..StoreConfig::default()
        });
        for _ in 0..5 {
            store.record_temperature(temp("T", 20.0)).unwrap();
            store.record_generic(generic("G", "light")).unwrap();
        }

        assert_eq!(store.retained(Family::Temperature).unwrap(), 2);
        assert_eq!(store.retained(Family::Generic).unwrap(), 3);
    }

    #[test]
    fn test_query_orders_newest_first_with_stable_ties() {
        let (store, clock) = store();
        let a = store.record_temperature(temp("D1", 20.0)).unwrap();
        let b = store.record_temperature(temp("D1", 21.0)).unwrap();
        clock.advance(Duration::seconds(5));
        let c = store.record_temperature(temp("D1", 22.0)).unwrap();

        let first = store.query(Family::Temperature, &by_device("D1", 10)).unwrap();
        let ids: Vec<Uuid> = first.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);

        let second = store.query(Family::Temperature, &by_device("D1", 10)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_query_orders_by_timestamp_not_insertion() {
        let (store, clock) = store();
        clock.advance(Duration::seconds(10));
        let later = store.record_temperature(temp("D1", 20.0)).unwrap();
        clock.rewind(Duration::seconds(30));
        let earlier = store.record_temperature(temp("D1", 21.0)).unwrap();

        let found = store.query(Family::Temperature, &by_device("D1", 10)).unwrap();
        assert_eq!(found[0].id, later.id);
        assert_eq!(found[1].id, earlier.id);
    }

    #[test]
    fn test_query_limits() {
        let (store, _clock) = store();
        for _ in 0..30 {
            store.record_temperature(temp("D1", 20.0)).unwrap();
        }

        let default = store
            .query(Family::Temperature, &ReadingFilter::default())
            .unwrap();
        assert_eq!(default.len(), 20);

        assert!(store.query(Family::Temperature, &by_device("D1", 0)).unwrap().is_empty());
        assert!(store.query(Family::Temperature, &by_device("D1", -3)).unwrap().is_empty());
        assert_eq!(
            store.query(Family::Temperature, &by_device("D1", 5)).unwrap().len(),
            5
        );
    }

    #[test]
    fn test_generic_query_filters_combine() {
        let (store, _clock) = store();
        store.record_generic(generic("S1", "light")).unwrap();
        store.record_generic(generic("S1", "motion")).unwrap();
        store.record_generic(generic("S2", "light")).unwrap();

        let lights = store
            .query(
                Family::Generic,
                &ReadingFilter {
                    device_type: Some("light".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(lights.len(), 2);

        let s1_lights = store
            .query(
                Family::Generic,
                &ReadingFilter {
                    device_id: Some("S1".to_string()),
                    device_type: Some("light".to_string()),
                    limit: None,
                },
            )
            .unwrap();
        assert_eq!(s1_lights.len(), 1);
        assert_eq!(s1_lights[0].device_type, "light");

        // families never see each other's readings
        assert!(store
            .query(Family::Temperature, &ReadingFilter::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_latest_per_device() {
        let (store, clock) = store();
        store.record_temperature(temp("D1", 20.0)).unwrap();
        clock.advance(Duration::seconds(1));
        let d2 = store.record_temperature(temp("D2", 30.0)).unwrap();
        clock.advance(Duration::seconds(1));
        let d1 = store.record_temperature(temp("D1", 21.0)).unwrap();

        let latest = store.latest_per_device(Family::Temperature).unwrap();
        assert_eq!(latest, vec![d1, d2]);
    }

    #[test]
    fn test_latest_per_device_tie_prefers_later_insertion() {
        let (store, _clock) = store();
        store.record_temperature(temp("D1", 20.0)).unwrap();
        let second = store.record_temperature(temp("D1", 25.0)).unwrap();

        let latest = store.latest_per_device(Family::Temperature).unwrap();
        assert_eq!(latest, vec![second]);
    }

    #[test]
    fn test_evicted_device_disappears_from_latest() {
        let (store, _clock) = store_with(StoreConfig {
            temperature_capacity: 3,
            ..StoreConfig::default()
        });
        store.record_temperature(temp("OLD", 20.0)).unwrap();
        for _ in 0..3 {
            store.record_temperature(temp("NEW", 20.0)).unwrap();
        }

        let latest = store.latest_per_device(Family::Temperature).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].device_id, "NEW");
    }

    #[test]
    fn test_overview_uses_staleness_threshold() {
        let (store, clock) = store();
        store.record_temperature(temp("STALE", 20.0)).unwrap();
        clock.advance(Duration::seconds(60));
        store.record_temperature(temp("FRESH", 20.0)).unwrap();
        clock.advance(Duration::seconds(59));

        let overview = store.device_overview().unwrap();
        assert_eq!(overview.staleness_secs, 60);
        assert_eq!(overview.summary.total_devices, 2);
        assert_eq!(overview.summary.online_devices, 1);

        let fresh = &overview.data[0];
        assert_eq!(fresh.reading.device_id, "FRESH");
        assert!(fresh.online);
        assert_eq!(fresh.seconds_since_report, 59);

        let stale = &overview.data[1];
        assert!(!stale.online);
        assert_eq!(stale.seconds_since_report, 119);
    }

    #[test]
    fn test_is_fresh_boundary() {
        let now = Utc::now();
        let threshold = Duration::seconds(60);
        assert!(is_fresh(now - Duration::seconds(59), now, threshold));
        assert!(!is_fresh(now - Duration::seconds(60), now, threshold));
        assert!(is_fresh(now + Duration::seconds(5), now, threshold));
    }

    #[test]
    fn test_upsert_creates_with_defaults() {
        let (store, clock) = store();
        let created = store
            .upsert_device_status(StatusUpdate {
                device_id: Some("D1".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(created.status, LinkState::Online);
        assert_eq!(created.device_type, "unknown");
        assert_eq!(created.location, "unknown");
        assert_eq!(created.last_seen, clock.now());
        assert_eq!(created.data, None);
    }

    #[test]
    fn test_upsert_merges_partial_updates() {
        let (store, clock) = store();
        let first = store
            .upsert_device_status(StatusUpdate {
                device_id: Some("D1".to_string()),
                status: Some("online".to_string()),
                data: Some(json!({"rssi": -60})),
                ..Default::default()
            })
            .unwrap();

        clock.advance(Duration::seconds(3));
        let second = store
            .upsert_device_status(StatusUpdate {
                device_id: Some("D1".to_string()),
                location: Some("Room A".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(second.status, LinkState::Online);
        assert_eq!(second.location, "Room A");
        assert_eq!(second.data, Some(json!({"rssi": -60})));
        assert!(second.last_seen > first.last_seen);
        assert_eq!(store.device_status("D1").unwrap(), second);
    }

    #[test]
    fn test_upsert_ignores_blank_fields() {
        let (store, _clock) = store();
        store
            .upsert_device_status(StatusUpdate {
                device_id: Some("D1".to_string()),
                location: Some("Lab".to_string()),
                ..Default::default()
            })
            .unwrap();
        let merged = store
            .upsert_device_status(StatusUpdate {
                device_id: Some("D1".to_string()),
                location: Some("".to_string()),
                status: Some("offline".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(merged.location, "Lab");
        assert_eq!(merged.status, LinkState::Offline);

        let merged = store
            .upsert_device_status(StatusUpdate {
                device_id: Some("D1".to_string()),
                status: Some("".to_string()),
                location: Some("Attic".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(merged.status, LinkState::Offline);
        assert_eq!(merged.location, "Attic");
    }

    #[test]
    fn test_upsert_rejects_unknown_status() {
        let (store, _clock) = store();
        let err = store
            .upsert_device_status(StatusUpdate {
                device_id: Some("D1".to_string()),
                status: Some("sleeping".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(matches!(store.device_status("D1"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_upsert_requires_device_id() {
        let (store, _clock) = store();
        let err = store
            .upsert_device_status(StatusUpdate::default())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.device_statuses().unwrap().summary.total_devices, 0);
    }

    #[test]
    fn test_status_is_independent_of_readings() {
        let (store, _clock) = store();
        store.record_temperature(temp("D1", 20.0)).unwrap();

        assert!(matches!(store.device_status("D1"), Err(Error::NotFound(_))));

        store
            .upsert_device_status(StatusUpdate {
                device_id: Some("D9".to_string()),
                status: Some("offline".to_string()),
                ..Default::default()
            })
            .unwrap();
        store
            .upsert_device_status(StatusUpdate {
                device_id: Some("D3".to_string()),
                ..Default::default()
            })
            .unwrap();

        let report = store.device_statuses().unwrap();
        assert_eq!(report.summary.total_devices, 2);
        assert_eq!(report.summary.online_devices, 1);
        assert_eq!(report.summary.offline_devices, 1);
        assert_eq!(report.data[0].device_id, "D3");
        assert_eq!(report.data[1].device_id, "D9");
    }

    #[test]
    fn test_concurrent_writers_keep_buffer_consistent() {
        let store = Arc::new(TelemetryStore::new(
            StoreConfig {
                temperature_capacity: 50,
                ..StoreConfig::default()
            },
            Arc::new(crate::clock::SystemClock),
        ));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .record_temperature(temp(&format!("T{}", t), 20.0))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.retained(Family::Temperature).unwrap(), 50);
        let all = store
            .query(
                Family::Temperature,
                &ReadingFilter {
                    limit: Some(1000),
                    ..Default::default()
                },
            )
            .unwrap();
        let mut seqs: Vec<u64> = all.iter().map(|r| r.seq).collect();
        seqs.sort_unstable();
        // the survivors are exactly the last 50 insertions
        assert_eq!(seqs, (750..800).collect::<Vec<u64>>());
    }
}
