//! Matching utilities for centroid tracking.

use nalgebra::Point2;
use ndarray::Array2;

use crate::error::{Error, Result};
use crate::tracker::rect::Rect;

/// COCO class id of `person`.
pub const PERSON_CLASS: u32 = 0;

/// Detection input for the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box
    pub bbox: Rect,
    /// Detection confidence score
    pub confidence: f32,
    /// Class label reported by the detector
    pub class_id: u32,
}

impl Detection {
    /// Person detection from a TLBR box.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            confidence,
            class_id: PERSON_CLASS,
        }
    }

    pub fn from_rect(bbox: Rect, confidence: f32) -> Self {
        Self {
            bbox,
            confidence,
            class_id: PERSON_CLASS,
        }
    }

    pub fn with_class(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn centroid(&self) -> Point2<f32> {
        self.bbox.center()
    }

    /// Reject boxes the tracker cannot reason about.
    pub fn validate(&self) -> Result<()> {
        if !self.bbox.is_well_formed() {
            return Err(Error::malformed(format!(
                "box {:?} has non-finite coordinates or negative dimensions",
                self.bbox.to_tlwh()
            )));
        }
        if !self.confidence.is_finite() {
            return Err(Error::malformed(format!(
                "confidence {} is not finite",
                self.confidence
            )));
        }
        Ok(())
    }
}

/// Compute the Euclidean distance matrix between track centroids and detection centroids.
pub fn centroid_distance(track_points: &[Point2<f32>], det_points: &[Point2<f32>]) -> Array2<f32> {
    let mut dists = Array2::zeros((track_points.len(), det_points.len()));
    for (i, t) in track_points.iter().enumerate() {
        for (j, d) in det_points.iter().enumerate() {
            dists[[i, j]] = nalgebra::distance(t, d);
        }
    }
    dists
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Greedy nearest-neighbour assignment.
///
/// Every row proposes its nearest column (lowest column index on ties) when
/// that distance is within `max_distance`. Proposals are granted in order of
/// increasing distance, then increasing row index. A row whose nearest column
/// was already granted stays unmatched for this call; it is never paired with
/// its second choice.
///
/// Rows must be ordered by track id for the tie-break to follow track ids.
pub fn greedy_assignment(cost_matrix: &Array2<f32>, max_distance: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    let mut proposals: Vec<(f32, usize, usize)> = Vec::with_capacity(num_rows);
    for (row_idx, row) in cost_matrix.outer_iter().enumerate() {
        let nearest = row
            .iter()
            .enumerate()
            .min_by(|(ja, a), (jb, b)| a.total_cmp(b).then(ja.cmp(jb)));
        if let Some((col_idx, &dist)) = nearest {
            if dist <= max_distance {
                proposals.push((dist, row_idx, col_idx));
            }
        }
    }
    proposals.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut row_matched = vec![false; num_rows];
    let mut col_matched = vec![false; num_cols];
    let mut matches = Vec::new();

    for (_, row_idx, col_idx) in proposals {
        if col_matched[col_idx] {
            continue;
        }
        row_matched[row_idx] = true;
        col_matched[col_idx] = true;
        matches.push((row_idx, col_idx));
    }
    matches.sort_unstable();

    let unmatched_tracks = (0..num_rows).filter(|&i| !row_matched[i]).collect();
    let unmatched_detections = (0..num_cols).filter(|&j| !col_matched[j]).collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
