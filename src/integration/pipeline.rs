//! CountingPipeline for driving detection, tracking and counting frame by frame.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::config::CounterConfig;
use crate::counting::{Counter, CrossingEvaluator, Event, FrameSize, RoiLine, Tally};
use crate::error::{Error, Result};
use crate::tracker::{CentroidTracker, Track};

use super::detector::{DetectionSource, FrameDetections};
use super::filter::DetectionFilter;
use super::presenter::{FrameUpdate, Presenter};

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFrame {
    pub frame_index: u64,
    /// Live tracks after this frame, ordered by id
    pub tracks: Vec<Track>,
    /// Events accepted on this frame
    pub events: Vec<Event>,
    pub tally: Tally,
}

/// Bundles a detection source with the tracker, crossing evaluator and counter.
///
/// Frames are processed strictly one after another; each run owns fresh
/// tracker and counter state.
pub struct CountingPipeline<S: DetectionSource> {
    source: S,
    filter: DetectionFilter,
    tracker: CentroidTracker,
    evaluator: CrossingEvaluator,
    counter: Counter,
    frame_size: FrameSize,
    progress_interval: u64,
    last_frame: Option<u64>,
    frames_processed: u64,
}

impl<S: DetectionSource> CountingPipeline<S> {
    /// Validate `config` and place the ROI line for the source's frame size.
    pub fn new(source: S, config: CounterConfig) -> Result<Self> {
        config.validate()?;
        let frame_size = source.frame_size();
        let line = RoiLine::new(config.roi_position, config.orientation, frame_size)?;
        info!(
            width = frame_size.width,
            height = frame_size.height,
            roi_pixel = line.pixel(),
            orientation = ?config.orientation,
            mapping = ?config.direction_mapping,
            "counting line placed"
        );

        Ok(Self {
            filter: DetectionFilter::from_config(&config),
            tracker: CentroidTracker::new(config.tracker_config()),
            evaluator: CrossingEvaluator::new(line, config.direction_mapping),
            counter: Counter::new(),
            frame_size,
            progress_interval: config.progress_interval,
            last_frame: None,
            frames_processed: 0,
            source,
        })
    }

    /// Track and count one frame of detections.
    ///
    /// Returns `None`, leaving all state untouched, when `frame_index` does
    /// not advance past the previously processed frame.
    pub fn process_frame(&mut self, frame: FrameDetections) -> Option<ProcessedFrame> {
        let FrameDetections {
            frame_index,
            detections,
        } = frame;
        if let Some(last) = self.last_frame {
            if frame_index <= last {
                warn!(frame_index, last, "out-of-order frame skipped");
                return None;
            }
        }
        self.last_frame = Some(frame_index);
        self.frames_processed += 1;

        let detections = self.filter.apply(frame_index, detections);
        self.tracker.update(&detections, frame_index);

        let already_recorded = self.counter.events().len();
        for track in self.tracker.tracks_mut() {
            if let Some(event) = self.evaluator.evaluate(track) {
                self.counter.record(&event, track);
            }
        }

        let events = self.counter.events()[already_recorded..].to_vec();
        debug!(
            frame_index,
            detections = detections.len(),
            tracks = self.tracker.len(),
            events = events.len(),
            "frame processed"
        );

        Some(ProcessedFrame {
            frame_index,
            tracks: self.tracker.tracks().cloned().collect(),
            events,
            tally: self.counter.tally(),
        })
    }

    /// Process frames until the source is exhausted or `stop` is set.
    ///
    /// The presenter is finalized with the tallies so far on every exit path,
    /// including a source failure, which is then returned as [`Error::Source`].
    pub fn run<P: Presenter>(&mut self, presenter: &mut P, stop: &AtomicBool) -> Result<Tally> {
        info!("processing started");
        loop {
            if stop.load(Ordering::Relaxed) {
                info!(frames = self.frames_processed, "stop requested");
                break;
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    debug!(frames = self.frames_processed, "source exhausted");
                    break;
                }
                Err(err) => {
                    warn!(frames = self.frames_processed, %err, "detection source failed");
                    return Err(self.finish_after_failure(presenter, Error::Source(Box::new(err))));
                }
            };

            let Some(processed) = self.process_frame(frame) else {
                continue;
            };
            let presented = presenter.on_frame(&FrameUpdate {
                frame_index: processed.frame_index,
                tracks: &processed.tracks,
                line: self.evaluator.line(),
                tally: processed.tally,
                events: &processed.events,
            });
            if let Err(err) = presented {
                warn!(frame_index = processed.frame_index, %err, "presenter failed");
                return Err(self.finish_after_failure(presenter, err));
            }
            self.report_progress();
        }

        let tally = self.counter.tally();
        presenter.finish(&tally, self.counter.events())?;
        info!(
            entries = tally.entries,
            exits = tally.exits,
            net = tally.net(),
            frames = self.frames_processed,
            "processing finished"
        );
        Ok(tally)
    }

    /// Finalize the presenter on a failing exit, keeping `err` as the reported cause.
    fn finish_after_failure<P: Presenter>(&self, presenter: &mut P, err: Error) -> Error {
        if let Err(finish_err) = presenter.finish(&self.counter.tally(), self.counter.events()) {
            warn!(%finish_err, "presenter failed to finish");
        }
        err
    }

    fn report_progress(&self) {
        if self.progress_interval == 0 || self.frames_processed % self.progress_interval != 0 {
            return;
        }
        match self.source.total_frames() {
            Some(total) if total > 0 => {
                let percent = self.frames_processed as f64 / total as f64 * 100.0;
                info!(frames = self.frames_processed, total, "progress {percent:.1}%");
            }
            _ => info!(frames = self.frames_processed, "progress"),
        }
    }

    pub fn tally(&self) -> Tally {
        self.counter.tally()
    }

    /// Accepted events in order.
    pub fn events(&self) -> &[Event] {
        self.counter.events()
    }

    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }

    pub fn line(&self) -> &RoiLine {
        self.evaluator.line()
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }
}
