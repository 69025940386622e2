//! Integration module for connecting detection backends, the counter and the
//! presentation layer.
//!
//! This module provides the traits a video pipeline implements around the
//! counter, plus the per-frame orchestration loop.

mod builder;
mod detector;
mod filter;
mod pipeline;
mod presenter;

pub use builder::DetectionBuilder;
pub use detector::{
    DetectingSource, DetectionSource, Detector, Frame, FrameDetections, ReplaySource,
};
pub use filter::DetectionFilter;
pub use pipeline::{CountingPipeline, ProcessedFrame};
pub use presenter::{FrameUpdate, JsonLinesPresenter, Presenter, SummaryPresenter};
