use serde::Serialize;

use crate::pipeline::{FocusState, StepResult};

/// Outward push event for one processed window, ready for a transport layer
/// to relay. Carries the result fields plus a wall-clock timestamp.
#[derive(Clone, Debug, Serialize)]
pub struct MetricEvent {
    pub timestamp: f64,
    pub band_power: f32,
    pub smoothed_power: f32,
    pub z_score: Option<f32>,
    pub ui_score: Option<f32>,
    pub status: FocusState,
    pub is_artifact: bool,
}

impl MetricEvent {
    pub fn new(result: &StepResult, timestamp: f64) -> Self {
        Self {
            timestamp,
            band_power: result.band_power,
            smoothed_power: result.smoothed_power,
            z_score: result.z_score,
            ui_score: result.ui_score,
            status: result.status,
            is_artifact: result.is_artifact,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_status_as_uppercase_tag() {
        let event = MetricEvent {
            timestamp: 12.5,
            band_power: 3.0,
            smoothed_power: 2.5,
            z_score: Some(1.2),
            ui_score: Some(0.8),
            status: FocusState::Artifact,
            is_artifact: true,
        };
        let json = event.to_json().unwrap();
        assert!(json.contains("\"status\":\"ARTIFACT\""), "{json}");
        assert!(json.contains("\"is_artifact\":true"));
    }

    #[test]
    fn missing_z_score_serializes_as_null() {
        let event = MetricEvent {
            timestamp: 0.0,
            band_power: 1.0,
            smoothed_power: 1.0,
            z_score: None,
            ui_score: None,
            status: FocusState::Off,
            is_artifact: false,
        };
        let json = event.to_json().unwrap();
        assert!(json.contains("\"z_score\":null"), "{json}");
    }
}
