//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::counting::{DirectionMapping, LineOrientation};
use crate::error::{Error, Result};
use crate::tracker::{PERSON_CLASS, TrackerConfig};

/// Every option a counting run recognizes.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Line position as a fraction of frame height (width for vertical lines)
    pub roi_position: f32,
    pub orientation: LineOrientation,
    /// Detections scoring below this never reach the tracker
    pub confidence_threshold: f32,
    /// Class id kept; `None` keeps every class
    pub person_class: Option<u32>,
    /// Association gate in pixels
    pub max_match_distance: f32,
    /// Frames a track is kept without a match
    pub max_missed_frames: u64,
    /// Centroids kept per track
    pub history_len: usize,
    pub direction_mapping: DirectionMapping,
    /// Frames between progress logs, 0 disables them
    pub progress_interval: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            roi_position: 0.5,
            orientation: LineOrientation::Horizontal,
            confidence_threshold: 0.5,
            person_class: Some(PERSON_CLASS),
            max_match_distance: 80.0,
            max_missed_frames: 30,
            history_len: 30,
            direction_mapping: DirectionMapping::BelowIsEntry,
            progress_interval: 30,
        }
    }
}

impl CounterConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.roi_position) {
            return Err(Error::invalid_config(format!(
                "roi_position must be within [0.0, 1.0], got {}",
                self.roi_position
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::invalid_config(format!(
                "confidence_threshold must be within [0.0, 1.0], got {}",
                self.confidence_threshold
            )));
        }
        if !self.max_match_distance.is_finite() || self.max_match_distance <= 0.0 {
            return Err(Error::invalid_config(format!(
                "max_match_distance must be a positive number of pixels, got {}",
                self.max_match_distance
            )));
        }
        if self.history_len < 2 {
            return Err(Error::invalid_config(format!(
                "history_len must keep at least 2 centroids, got {}",
                self.history_len
            )));
        }
        Ok(())
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            max_match_distance: self.max_match_distance,
            max_missed_frames: self.max_missed_frames,
            history_len: self.history_len,
        }
    }
}
