use crate::errors::{Error, Result};
use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref READINGS_ACCEPTED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "hub_readings_accepted_total",
        "Total readings stored across both families"
    ))
    .expect("valid metric definition");
    pub static ref READINGS_REJECTED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "hub_readings_rejected_total",
        "Total readings rejected by validation"
    ))
    .expect("valid metric definition");
    pub static ref READINGS_EVICTED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "hub_readings_evicted_total",
        "Total readings dropped because a family buffer was full"
    ))
    .expect("valid metric definition");
    pub static ref STATUS_UPDATES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "hub_status_updates_total",
        "Total device status upserts"
    ))
    .expect("valid metric definition");
    pub static ref RETAINED_READINGS: IntGaugeVec = IntGaugeVec::new(
        Opts::new("hub_retained_readings", "Readings currently retained per family"),
        &["family"]
    )
    .expect("valid metric definition");
    pub static ref KNOWN_DEVICES: IntGauge = IntGauge::with_opts(Opts::new(
        "hub_known_devices",
        "Entries in the device status registry"
    ))
    .expect("valid metric definition");
}

pub fn init_metrics() -> Result<()> {
    REGISTRY.register(Box::new(READINGS_ACCEPTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(READINGS_REJECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(READINGS_EVICTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STATUS_UPDATES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RETAINED_READINGS.clone()))?;
    REGISTRY.register(Box::new(KNOWN_DEVICES.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::Internal(format!("metrics not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_after_init() {
        init_metrics().unwrap();
        STATUS_UPDATES_TOTAL.inc();

        let text = gather_metrics().unwrap();
        assert!(text.contains("hub_status_updates_total"));
        assert!(text.contains("hub_readings_accepted_total"));
        assert!(text.contains("hub_known_devices"));
    }
}
