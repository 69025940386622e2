//! Region-of-interest line.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tracker::Side;

/// Pixel dimensions of the frames a source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineOrientation {
    /// Spans the frame width at a fraction of its height
    #[default]
    Horizontal,
    /// Spans the frame height at a fraction of its width
    Vertical,
}

/// Counting line, fixed in pixel space for the whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiLine {
    orientation: LineOrientation,
    pixel: f32,
}

impl RoiLine {
    /// Place the line at `position` (0.0 = top/left, 1.0 = bottom/right) of the frame.
    pub fn new(position: f32, orientation: LineOrientation, frame: FrameSize) -> Result<Self> {
        if !(0.0..=1.0).contains(&position) {
            return Err(Error::invalid_config(format!(
                "roi_position must be within [0.0, 1.0], got {position}"
            )));
        }
        let extent = match orientation {
            LineOrientation::Horizontal => frame.height,
            LineOrientation::Vertical => frame.width,
        };
        if extent == 0 {
            return Err(Error::invalid_config(format!(
                "cannot place a {orientation:?} line in a {}x{} frame",
                frame.width, frame.height
            )));
        }
        Ok(Self {
            orientation,
            pixel: (extent as f32 * position).floor(),
        })
    }

    pub fn from_pixel(pixel: f32, orientation: LineOrientation) -> Self {
        Self { orientation, pixel }
    }

    pub fn pixel(&self) -> f32 {
        self.pixel
    }

    pub fn orientation(&self) -> LineOrientation {
        self.orientation
    }

    /// Side of the line `point` falls on, `None` when exactly on it.
    pub fn classify(&self, point: Point2<f32>) -> Option<Side> {
        let coord = match self.orientation {
            LineOrientation::Horizontal => point.y,
            LineOrientation::Vertical => point.x,
        };
        if coord < self.pixel {
            Some(Side::Above)
        } else if coord > self.pixel {
            Some(Side::Below)
        } else {
            None
        }
    }

    /// Line endpoints in pixel coordinates, for overlay drawing.
    pub fn endpoints(&self, frame: FrameSize) -> (Point2<f32>, Point2<f32>) {
        match self.orientation {
            LineOrientation::Horizontal => (
                Point2::new(0.0, self.pixel),
                Point2::new(frame.width as f32, self.pixel),
            ),
            LineOrientation::Vertical => (
                Point2::new(self.pixel, 0.0),
                Point2::new(self.pixel, frame.height as f32),
            ),
        }
    }
}
