//! Pre-tracking detection filtering.

use tracing::warn;

use crate::config::CounterConfig;
use crate::tracker::Detection;

/// Drops detections that should never reach the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionFilter {
    confidence_threshold: f32,
    class_id: Option<u32>,
}

impl DetectionFilter {
    pub fn new(confidence_threshold: f32, class_id: Option<u32>) -> Self {
        Self {
            confidence_threshold,
            class_id,
        }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(config.confidence_threshold, config.person_class)
    }

    /// Keep well-formed detections of the wanted class at or above the threshold.
    ///
    /// Malformed detections are logged and dropped one at a time.
    pub fn apply(&self, frame_index: u64, detections: Vec<Detection>) -> Vec<Detection> {
        detections
            .into_iter()
            .filter(|det| {
                if let Err(err) = det.validate() {
                    warn!(frame_index, %err, "dropping detection");
                    return false;
                }
                det.confidence >= self.confidence_threshold
                    && self.class_id.is_none_or(|class_id| det.class_id == class_id)
            })
            .collect()
    }
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self::from_config(&CounterConfig::default())
    }
}
