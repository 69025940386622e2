//! Single tracked identity.

use std::collections::VecDeque;

use nalgebra::Point2;

use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::side::Side;

/// Single object track.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Unique track identifier, increasing in creation order
    pub track_id: u64,
    /// Latest matched bounding box
    pub bbox: Rect,
    /// Confidence of the latest matched detection
    pub confidence: f32,
    /// Frame index of the latest match
    pub last_seen_frame: u64,
    /// Frame index the track was created on
    pub start_frame: u64,
    /// Centroids keyed by frame index, oldest first
    history: VecDeque<(u64, Point2<f32>)>,
    history_len: usize,
    side: Side,
    counted: bool,
}

impl Track {
    /// Create a track from an unmatched detection.
    pub fn new(track_id: u64, det: &Detection, frame_index: u64, history_len: usize) -> Self {
        let mut track = Self {
            track_id,
            bbox: det.bbox,
            confidence: det.confidence,
            last_seen_frame: frame_index,
            start_frame: frame_index,
            history: VecDeque::with_capacity(history_len.max(1)),
            history_len: history_len.max(1),
            side: Side::Unknown,
            counted: false,
        };
        track.push_centroid(frame_index, det.centroid());
        track
    }

    /// Apply a matched detection.
    pub fn update(&mut self, det: &Detection, frame_index: u64) {
        self.bbox = det.bbox;
        self.confidence = det.confidence;
        self.last_seen_frame = frame_index;
        self.push_centroid(frame_index, det.centroid());
    }

    fn push_centroid(&mut self, frame_index: u64, centroid: Point2<f32>) {
        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back((frame_index, centroid));
    }

    /// Last known centroid.
    pub fn centroid(&self) -> Point2<f32> {
        match self.history.back() {
            Some((_, point)) => *point,
            None => self.bbox.center(),
        }
    }

    pub fn history(&self) -> impl ExactSizeIterator<Item = &(u64, Point2<f32>)> {
        self.history.iter()
    }

    /// Centroids only, oldest first. Used for trail overlays.
    pub fn trail(&self) -> Vec<Point2<f32>> {
        self.history.iter().map(|(_, p)| *p).collect()
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub(crate) fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    pub fn is_counted(&self) -> bool {
        self.counted
    }

    /// Returns `false` when the track had already been counted.
    pub(crate) fn mark_counted(&mut self) -> bool {
        !std::mem::replace(&mut self.counted, true)
    }

    /// Matched on `frame_index`, as opposed to retained while missing.
    pub fn is_visible(&self, frame_index: u64) -> bool {
        self.last_seen_frame == frame_index
    }

    pub fn frames_missed(&self, frame_index: u64) -> u64 {
        frame_index.saturating_sub(self.last_seen_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_track_starts_unknown() {
        let det = Detection::new(0.0, 0.0, 20.0, 40.0, 0.9);
        let track = Track::new(1, &det, 3, 30);
        assert_eq!(track.side(), Side::Unknown);
        assert!(!track.is_counted());
        assert_eq!(track.centroid(), Point2::new(10.0, 20.0));
        assert_eq!(track.start_frame, 3);
        assert!(track.is_visible(3));
        assert_eq!(track.frames_missed(5), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let det = Detection::new(0.0, 0.0, 10.0, 10.0, 0.9);
        let mut track = Track::new(1, &det, 1, 3);
        for frame in 2..=6 {
            let y = frame as f32 * 10.0;
            track.update(&Detection::new(0.0, y, 10.0, y + 10.0, 0.9), frame);
        }
        let frames: Vec<u64> = track.history().map(|(f, _)| *f).collect();
        assert_eq!(frames, vec![4, 5, 6]);
        assert_eq!(track.centroid(), Point2::new(5.0, 65.0));
        assert_eq!(track.trail().len(), 3);
    }

    #[test]
    fn test_mark_counted_once() {
        let det = Detection::new(0.0, 0.0, 10.0, 10.0, 0.9);
        let mut track = Track::new(7, &det, 1, 30);
        assert!(track.mark_counted());
        assert!(!track.mark_counted());
        assert!(track.is_counted());
    }
}
