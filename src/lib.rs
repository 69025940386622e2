//! # footfall-rs
//!
//! Counts people crossing a virtual line in video.
//!
//! Per-frame person detections are associated into persistent tracks by a
//! greedy nearest-centroid tracker; each track's side of the region-of-interest
//! line is followed by a small state machine, and the first crossing of every
//! track is recorded as an entry or an exit.
//!
//! The detection model, video decoding and overlay rendering stay outside this
//! crate and plug in through [`Detector`], [`DetectionSource`] and [`Presenter`].
//!
//! ```rust,ignore
//! use footfall_rs::{CounterConfig, CountingPipeline, ReplaySource, SummaryPresenter};
//!
//! let source = ReplaySource::new(1280, 720, frames);
//! let mut pipeline = CountingPipeline::new(source, CounterConfig::default())?;
//! let mut summary = SummaryPresenter::new(std::io::stdout(), "output_footfall.mp4");
//! let tally = pipeline.run(&mut summary, &stop)?;
//! ```

pub mod config;
pub mod counting;
pub mod error;
pub mod integration;
pub mod tracker;

pub use config::CounterConfig;
pub use counting::{
    Counter, CrossingEvaluator, Direction, DirectionMapping, Event, FrameSize, LineOrientation,
    RoiLine, Tally,
};
pub use error::{Error, Result};
pub use integration::{
    CountingPipeline, DetectingSource, DetectionBuilder, DetectionFilter, DetectionSource,
    Detector, Frame, FrameDetections, FrameUpdate, JsonLinesPresenter, Presenter,
    ProcessedFrame, ReplaySource, SummaryPresenter,
};
pub use tracker::{CentroidTracker, Detection, Rect, Side, Track, TrackerConfig};
