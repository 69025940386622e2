//! Line-crossing state machine.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::counting::roi::RoiLine;
use crate::tracker::{Side, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Entry,
    Exit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "ENTRY",
            Self::Exit => "EXIT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the line a person enters into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionMapping {
    /// `Above -> Below` is an entry, `Below -> Above` an exit
    #[default]
    BelowIsEntry,
    /// `Below -> Above` is an entry, `Above -> Below` an exit
    AboveIsEntry,
}

impl DirectionMapping {
    /// Direction of a side transition, `None` unless it goes from one known side to the other.
    pub fn direction(&self, from: Side, to: Side) -> Option<Direction> {
        let entered = match (from, to) {
            (Side::Above, Side::Below) => Side::Below,
            (Side::Below, Side::Above) => Side::Above,
            _ => return None,
        };
        let entry_side = match self {
            Self::BelowIsEntry => Side::Below,
            Self::AboveIsEntry => Side::Above,
        };
        Some(if entered == entry_side {
            Direction::Entry
        } else {
            Direction::Exit
        })
    }
}

/// A crossing of the ROI line by one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub track_id: u64,
    pub direction: Direction,
    pub frame_index: u64,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.direction {
            Direction::Entry => "[+] ENTRY",
            Direction::Exit => "[-] EXIT ",
        };
        write!(f, "{marker} | ID:{} | frame {}", self.track_id, self.frame_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingEvaluator {
    line: RoiLine,
    mapping: DirectionMapping,
}

impl CrossingEvaluator {
    pub fn new(line: RoiLine, mapping: DirectionMapping) -> Self {
        Self { line, mapping }
    }

    pub fn line(&self) -> &RoiLine {
        &self.line
    }

    pub fn mapping(&self) -> DirectionMapping {
        self.mapping
    }

    /// Classify the track's latest centroid and advance its side state.
    ///
    /// Emits an event only on a transition between the two known sides. A
    /// centroid exactly on the line leaves the side unchanged, and re-evaluating
    /// a track with no new sample is a no-op.
    pub fn evaluate(&self, track: &mut Track) -> Option<Event> {
        let current = self.line.classify(track.centroid())?;
        let previous = track.side();
        if previous == current {
            return None;
        }
        track.set_side(current);
        debug!(
            track_id = track.track_id,
            from = previous.as_str(),
            to = current.as_str(),
            frame_index = track.last_seen_frame,
            "side changed"
        );

        self.mapping
            .direction(previous, current)
            .map(|direction| Event {
                track_id: track.track_id,
                direction,
                frame_index: track.last_seen_frame,
            })
    }
}
