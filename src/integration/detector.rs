//! Traits for object detection backends and per-frame detection sources.

use std::collections::VecDeque;
use std::convert::Infallible;

use crate::counting::FrameSize;
use crate::tracker::Detection;

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any person detection model to the counter.
///
/// # Example
///
/// ```ignore
/// use footfall_rs::{Detector, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl Detector for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Detector {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Detections produced for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameDetections {
    pub frame_index: u64,
    pub detections: Vec<Detection>,
}

impl FrameDetections {
    pub fn new(frame_index: u64, detections: Vec<Detection>) -> Self {
        Self {
            frame_index,
            detections,
        }
    }
}

/// Yields `(frame_index, detections)` pairs in frame order.
pub trait DetectionSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Size of every frame this source produces.
    fn frame_size(&self) -> FrameSize;

    /// Next frame's detections, or `None` once the stream is exhausted.
    ///
    /// May block while waiting on the underlying video.
    fn next_frame(&mut self) -> Result<Option<FrameDetections>, Self::Error>;

    /// Total frame count when known up front, for progress reporting.
    fn total_frames(&self) -> Option<u64> {
        None
    }
}

/// Replays detections computed ahead of time.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    frame_size: FrameSize,
    frames: VecDeque<FrameDetections>,
    total: u64,
}

impl ReplaySource {
    pub fn new(width: u32, height: u32, frames: impl IntoIterator<Item = FrameDetections>) -> Self {
        let frames: VecDeque<FrameDetections> = frames.into_iter().collect();
        Self {
            frame_size: FrameSize::new(width, height),
            total: frames.len() as u64,
            frames,
        }
    }

    /// Number the frames 1, 2, 3... in iteration order.
    pub fn from_sequence(width: u32, height: u32, frames: impl IntoIterator<Item = Vec<Detection>>) -> Self {
        Self::new(
            width,
            height,
            frames
                .into_iter()
                .enumerate()
                .map(|(i, dets)| FrameDetections::new(i as u64 + 1, dets)),
        )
    }
}

impl DetectionSource for ReplaySource {
    type Error = Infallible;

    fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    fn next_frame(&mut self) -> Result<Option<FrameDetections>, Self::Error> {
        Ok(self.frames.pop_front())
    }

    fn total_frames(&self) -> Option<u64> {
        Some(self.total)
    }
}

/// A decoded video frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Runs a [`Detector`] over decoded frames.
///
/// Frames are numbered from 1 in the order the iterator yields them.
pub struct DetectingSource<I, D> {
    frames: I,
    detector: D,
    frame_size: FrameSize,
    frame_index: u64,
}

impl<I, D> DetectingSource<I, D>
where
    I: Iterator<Item = Frame>,
    D: Detector,
{
    pub fn new(frames: I, detector: D, frame_size: FrameSize) -> Self {
        Self {
            frames,
            detector,
            frame_size,
            frame_index: 0,
        }
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }
}

impl<I, D> DetectionSource for DetectingSource<I, D>
where
    I: Iterator<Item = Frame>,
    D: Detector,
    D::Error: std::error::Error + Send + Sync + 'static,
{
    type Error = D::Error;

    fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    fn next_frame(&mut self) -> Result<Option<FrameDetections>, Self::Error> {
        let Some(frame) = self.frames.next() else {
            return Ok(None);
        };
        self.frame_index += 1;
        let detections = self.detector.detect(&frame.data, frame.width, frame.height)?;
        Ok(Some(FrameDetections::new(self.frame_index, detections)))
    }
}
