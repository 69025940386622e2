//! Output side of a counting run.
//!
//! Overlay rendering and video encoding live outside this crate; a
//! [`Presenter`] receives everything they need after each frame, then once
//! more when the run ends.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::counting::{Event, RoiLine, Tally};
use crate::error::Result;
use crate::tracker::Track;

/// State handed to a presenter after a frame has been fully processed.
#[derive(Debug, Clone, Copy)]
pub struct FrameUpdate<'a> {
    pub frame_index: u64,
    /// Live tracks ordered by id, including ones missed this frame
    pub tracks: &'a [Track],
    pub line: &'a RoiLine,
    pub tally: Tally,
    /// Events accepted on this frame
    pub events: &'a [Event],
}

pub trait Presenter {
    fn on_frame(&mut self, _update: &FrameUpdate<'_>) -> Result<()> {
        Ok(())
    }

    /// Called exactly once, after end of stream, a stop request, or a source failure.
    fn finish(&mut self, tally: &Tally, events: &[Event]) -> Result<()>;
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn on_frame(&mut self, update: &FrameUpdate<'_>) -> Result<()> {
        (**self).on_frame(update)
    }

    fn finish(&mut self, tally: &Tally, events: &[Event]) -> Result<()> {
        (**self).finish(tally, events)
    }
}

impl<A: Presenter, B: Presenter> Presenter for (A, B) {
    fn on_frame(&mut self, update: &FrameUpdate<'_>) -> Result<()> {
        self.0.on_frame(update)?;
        self.1.on_frame(update)
    }

    fn finish(&mut self, tally: &Tally, events: &[Event]) -> Result<()> {
        self.0.finish(tally, events)?;
        self.1.finish(tally, events)
    }
}

/// Writes the final console summary.
#[derive(Debug)]
pub struct SummaryPresenter<W: Write> {
    writer: W,
    output: PathBuf,
}

impl<W: Write> SummaryPresenter<W> {
    /// `output` is the annotated video written by the renderer.
    pub fn new(writer: W, output: impl AsRef<Path>) -> Self {
        Self {
            writer,
            output: output.as_ref().to_path_buf(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Presenter for SummaryPresenter<W> {
    fn finish(&mut self, tally: &Tally, _events: &[Event]) -> Result<()> {
        writeln!(self.writer, "{tally}")?;
        writeln!(self.writer, "Output: {}", self.output.display())?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CrossingLog<'a> {
    event: &'static str,
    #[serde(flatten)]
    crossing: &'a Event,
    entries: u64,
    exits: u64,
}

#[derive(Serialize)]
struct SummaryLog {
    event: &'static str,
    frames: u64,
    entries: u64,
    exits: u64,
    net: i64,
}

/// Writes one JSON object per accepted crossing and a closing summary.
#[derive(Debug)]
pub struct JsonLinesPresenter<W: Write> {
    writer: W,
    frames: u64,
}

impl<W: Write> JsonLinesPresenter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event<T: Serialize>(&mut self, event: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> Presenter for JsonLinesPresenter<W> {
    fn on_frame(&mut self, update: &FrameUpdate<'_>) -> Result<()> {
        self.frames += 1;
        for crossing in update.events {
            self.write_event(&CrossingLog {
                event: "crossing",
                crossing,
                entries: update.tally.entries,
                exits: update.tally.exits,
            })?;
        }
        Ok(())
    }

    fn finish(&mut self, tally: &Tally, _events: &[Event]) -> Result<()> {
        self.write_event(&SummaryLog {
            event: "summary",
            frames: self.frames,
            entries: tally.entries,
            exits: tally.exits,
            net: tally.net(),
        })?;
        self.writer.flush()?;
        Ok(())
    }
}
