//! Greedy nearest-centroid tracker.

use std::collections::BTreeMap;

use nalgebra::Point2;
use tracing::{debug, warn};

use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::track::Track;

/// Configuration for the CentroidTracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Largest centroid displacement, in pixels, accepted as the same person
    pub max_match_distance: f32,
    /// Frames a track survives without a match before it is evicted
    pub max_missed_frames: u64,
    /// Centroids kept per track
    pub history_len: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_match_distance: 80.0,
            max_missed_frames: 30,
            history_len: 30,
        }
    }
}

/// Owns every live track, keyed by id.
///
/// Frames must be fed in increasing index order.
#[derive(Debug)]
pub struct CentroidTracker {
    tracks: BTreeMap<u64, Track>,
    next_id: u64,
    last_frame: Option<u64>,
    config: TrackerConfig,
}

impl CentroidTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: 1,
            last_frame: None,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Associate this frame's detections with the live tracks.
    ///
    /// Returns every live track, matched or retained, ordered by id. A frame
    /// whose index does not advance past the previous one is ignored and the
    /// current tracks are returned unchanged.
    pub fn update(&mut self, detections: &[Detection], frame_index: u64) -> Vec<Track> {
        if let Some(last_frame) = self.last_frame {
            if frame_index <= last_frame {
                warn!(frame_index, last_frame, "out-of-order frame ignored by tracker");
                return self.tracks.values().cloned().collect();
            }
        }
        self.last_frame = Some(frame_index);

        // Step 1: Evict tracks missing for too long, before they can be matched
        let max_missed = self.config.max_missed_frames;
        self.tracks.retain(|&track_id, track| {
            let keep = track.frames_missed(frame_index) <= max_missed;
            if !keep {
                debug!(track_id, frame_index, last_seen = track.last_seen_frame, "track evicted");
            }
            keep
        });

        // Step 2: Associate by centroid distance, rows in id order
        let track_ids: Vec<u64> = self.tracks.keys().copied().collect();
        let track_points: Vec<Point2<f32>> =
            self.tracks.values().map(|t| t.centroid()).collect();
        let det_points: Vec<Point2<f32>> = detections.iter().map(|d| d.centroid()).collect();
        let dists = matching::centroid_distance(&track_points, &det_points);

        let AssignmentResult {
            matches,
            unmatched_detections,
            ..
        } = matching::greedy_assignment(&dists, self.config.max_match_distance);

        // Step 3: Update matched tracks
        for (itrack, idet) in matches {
            if let Some(track) = self.tracks.get_mut(&track_ids[itrack]) {
                track.update(&detections[idet], frame_index);
            }
        }

        // Step 4: Init new tracks
        for idet in unmatched_detections {
            let track_id = self.next_id;
            self.next_id += 1;
            let track = Track::new(
                track_id,
                &detections[idet],
                frame_index,
                self.config.history_len,
            );
            debug!(track_id, frame_index, x = track.centroid().x, y = track.centroid().y, "track created");
            self.tracks.insert(track_id, track);
        }

        self.tracks.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Mutable access for the crossing state machine and the counter.
    pub(crate) fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.values_mut()
    }

    /// Drop every track and restart ids at 1.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.next_id = 1;
        self.last_frame = None;
    }
}
