//! Run report encoding
//!
//! This module encodes a completed offline run into a versioned, serializable
//! payload: producer metadata, provenance timestamp, the effective
//! configuration, and the full event sequence. Downstream tooling
//! (visualization, evaluation) consumes this payload rather than crate
//! internals.

use crate::config::TrackerConfig;
use crate::error::TrackError;
use crate::types::SleepWakeEvent;
use crate::{PRODUCER_NAME, SOMN_VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Producer metadata embedded in every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Payload describing one completed offline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub report_version: String,
    pub producer: RunProducer,
    /// When the report was computed (RFC 3339, UTC)
    pub computed_at_utc: String,
    /// Configuration the run was tracked with
    pub config: TrackerConfig,
    /// Number of uniform samples ingested
    pub n_samples: usize,
    /// Seed event first, then one event per completed window after the first
    pub events: Vec<SleepWakeEvent>,
}

/// Report builder with a stable per-process instance ID
pub struct Reporter {
    instance_id: String,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    /// Create a reporter with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a reporter with a specific instance ID (reproducible output)
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build a report for a completed run
    pub fn report(
        &self,
        config: &TrackerConfig,
        n_samples: usize,
        events: Vec<SleepWakeEvent>,
    ) -> RunReport {
        RunReport {
            report_version: REPORT_VERSION.to_string(),
            producer: RunProducer {
                name: PRODUCER_NAME.to_string(),
                version: SOMN_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            config: config.clone(),
            n_samples,
            events,
        }
    }

    /// Build a report and serialize it as pretty JSON
    pub fn encode_to_json(
        &self,
        config: &TrackerConfig,
        n_samples: usize,
        events: Vec<SleepWakeEvent>,
    ) -> Result<String, TrackError> {
        serde_json::to_string_pretty(&self.report(config, n_samples, events))
            .map_err(TrackError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SleepState;

    #[test]
    fn test_report_contents() {
        let reporter = Reporter::with_instance_id("test-instance".to_string());
        let config = TrackerConfig::default();
        let events = vec![
            SleepWakeEvent::seed(),
            SleepWakeEvent::new(5.0, SleepState::Asleep),
        ];

        let report = reporter.report(&config, 100, events);

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.n_samples, 100);
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.events[0], SleepWakeEvent::seed());
    }

    #[test]
    fn test_report_json_round_trip() {
        let reporter = Reporter::with_instance_id("test-instance".to_string());
        let json = reporter
            .encode_to_json(&TrackerConfig::default(), 10, vec![SleepWakeEvent::seed()])
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["events"][0]["state"], 0);

        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.n_samples, 10);
    }

    #[test]
    fn test_fresh_reporters_get_distinct_instances() {
        let a = Reporter::new();
        let b = Reporter::new();
        let ra = a.report(&TrackerConfig::default(), 0, vec![]);
        let rb = b.report(&TrackerConfig::default(), 0, vec![]);
        assert_ne!(ra.producer.instance_id, rb.producer.instance_id);
    }
}
