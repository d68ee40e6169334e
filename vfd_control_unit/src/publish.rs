//! Periodic drive data records.
//!
//! One JSON record per poll cycle at most, throttled to one per second
//! whatever the poll rate, handed to an injected [`RecordSink`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use vfd_common::clock::Clock;
use vfd_common::config::LoadConfig;
use vfd_common::drive::types::DriveStatus;

/// Channel name records are published on.
pub const DATA_CHANNEL: &str = "vfd_data";

/// Minimum spacing between two records.
pub const PUBLISH_INTERVAL: Duration = Duration::from_secs(1);

/// One published data record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveRecord {
    pub timestamp: DateTime<Utc>,
    pub load_name: String,
    pub load_type: String,
    pub state: String,
    pub running: bool,
    pub ready: bool,
    pub fault: bool,
    pub fault_code: u16,
    pub warning: bool,
    pub warning_code: u16,
    pub at_reference: bool,
    pub remote_control: bool,
    pub direction_forward: bool,
    pub output_frequency_hz: f64,
    pub output_current_a: f64,
    pub output_voltage_v: f64,
    pub output_power_kw: f64,
    pub motor_speed_rpm: f64,
    pub motor_torque_pct: f64,
    pub dc_bus_voltage_v: f64,
    pub drive_temperature_c: f64,
    pub run_hours: f64,
    pub energy_kwh: f64,
    pub speed_reference_hz: f64,
}

impl DriveRecord {
    pub fn new(timestamp: DateTime<Utc>, load: &LoadConfig, status: &DriveStatus) -> Self {
        Self {
            timestamp,
            load_name: load.load_name.clone(),
            load_type: load.load_type.clone(),
            state: status.state_description(),
            running: status.running,
            ready: status.ready,
            fault: status.fault,
            fault_code: status.fault_code,
            warning: status.warning,
            warning_code: status.warning_code,
            at_reference: status.at_reference,
            remote_control: status.remote_control,
            direction_forward: status.direction_forward,
            output_frequency_hz: status.output_frequency_hz,
            output_current_a: status.output_current_a,
            output_voltage_v: status.output_voltage_v,
            output_power_kw: status.output_power_kw,
            motor_speed_rpm: status.motor_speed_rpm,
            motor_torque_pct: status.motor_torque_pct,
            dc_bus_voltage_v: status.dc_bus_voltage_v,
            drive_temperature_c: status.drive_temperature_c,
            run_hours: status.run_hours,
            energy_kwh: status.energy_kwh,
            speed_reference_hz: status.speed_reference_hz,
        }
    }
}

/// Destination for serialized records.
pub trait RecordSink {
    fn publish(&mut self, channel: &str, payload: &str);
}

/// Sink that writes records to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RecordSink for LogSink {
    fn publish(&mut self, channel: &str, payload: &str) {
        info!(target: "vfd_data", channel, "{}", payload);
    }
}

/// Throttled record publisher.
pub struct DataPublisher<C: Clock> {
    enabled: bool,
    load: LoadConfig,
    clock: C,
    last_published: Option<Instant>,
}

impl<C: Clock> DataPublisher<C> {
    pub fn new(enabled: bool, load: LoadConfig, clock: C) -> Self {
        Self {
            enabled,
            load,
            clock,
            last_published: None,
        }
    }

    /// Publish a record for `status` unless disabled or throttled.
    /// Returns true if a record was handed to the sink.
    pub fn publish(&mut self, status: &DriveStatus, sink: &mut dyn RecordSink) -> bool {
        if !self.enabled {
            return false;
        }

        let now = self.clock.now();
        if let Some(last) = self.last_published {
            if now.saturating_duration_since(last) < PUBLISH_INTERVAL {
                debug!("Record throttled");
                return false;
            }
        }

        let record = DriveRecord::new(self.clock.wall_time().into(), &self.load, status);
        match serde_json::to_string(&record) {
            Ok(payload) => {
                sink.publish(DATA_CHANNEL, &payload);
                self.last_published = Some(now);
                true
            }
            Err(e) => {
                error!("Failed to serialize drive record: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use vfd_common::clock::ManualClock;

    #[derive(Default)]
    struct Captured(Vec<(String, String)>);

    impl RecordSink for Captured {
        fn publish(&mut self, channel: &str, payload: &str) {
            self.0.push((channel.to_string(), payload.to_string()));
        }
    }

    fn running_status() -> DriveStatus {
        DriveStatus {
            ready: true,
            running: true,
            at_reference: true,
            remote_control: true,
            direction_forward: true,
            warning: true,
            warning_code: 7,
            output_frequency_hz: 42.5,
            speed_reference_hz: 42.5,
            ..Default::default()
        }
    }

    #[test]
    fn record_carries_load_and_measurements() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let clock = ManualClock::at(start);
        let mut publisher = DataPublisher::new(true, LoadConfig::default(), clock);
        let mut sink = Captured::default();

        assert!(publisher.publish(&running_status(), &mut sink));
        let (channel, payload) = &sink.0[0];
        assert_eq!(channel, DATA_CHANNEL);

        let json: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(json["load_name"], "Main Pump");
        assert_eq!(json["load_type"], "Pump");
        assert_eq!(json["state"], "RUNNING");
        assert_eq!(json["running"], true);
        assert_eq!(json["output_frequency_hz"], 42.5);
        assert_eq!(json["warning"], true);
        assert_eq!(json["warning_code"], 7);
        assert_eq!(json["at_reference"], true);
        assert_eq!(json["remote_control"], true);
        assert_eq!(json["direction_forward"], true);

        let timestamp: DateTime<Utc> = json["timestamp"].as_str().unwrap().parse().unwrap();
        assert_eq!(timestamp, DateTime::<Utc>::from(start));
    }

    #[test]
    fn throttled_to_once_per_second() {
        let clock = ManualClock::new();
        let mut publisher = DataPublisher::new(true, LoadConfig::default(), clock.clone());
        let mut sink = Captured::default();
        let status = running_status();

        assert!(publisher.publish(&status, &mut sink));
        clock.advance(Duration::from_millis(500));
        assert!(!publisher.publish(&status, &mut sink));
        clock.advance(Duration::from_millis(499));
        assert!(!publisher.publish(&status, &mut sink));
        clock.advance(Duration::from_millis(1));
        assert!(publisher.publish(&status, &mut sink));
        assert_eq!(sink.0.len(), 2);
    }

    #[test]
    fn disabled_publisher_is_silent() {
        let mut publisher = DataPublisher::new(false, LoadConfig::default(), ManualClock::new());
        let mut sink = Captured::default();
        assert!(!publisher.publish(&running_status(), &mut sink));
        assert!(sink.0.is_empty());
    }
}
