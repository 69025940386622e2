//! Entry/exit tallies and the ordered event log.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::counting::crossing::{Direction, Event};
use crate::tracker::Track;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub entries: u64,
    pub exits: u64,
}

impl Tally {
    pub fn net(&self) -> i64 {
        self.entries as i64 - self.exits as i64
    }

    pub fn total(&self) -> u64 {
        self.entries + self.exits
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entries: {}\nExits: {}\nNet: {}",
            self.entries,
            self.exits,
            self.net()
        )
    }
}

/// Records each track's first crossing.
///
/// A run starts from an empty counter; nothing carries over between runs.
#[derive(Debug, Default)]
pub struct Counter {
    tally: Tally,
    events: Vec<Event>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `event` unless `track` has already been counted.
    pub fn record(&mut self, event: &Event, track: &mut Track) -> Tally {
        if !track.mark_counted() {
            debug!(
                track_id = event.track_id,
                direction = event.direction.as_str(),
                frame_index = event.frame_index,
                "track already counted, event dropped"
            );
            return self.tally;
        }

        match event.direction {
            Direction::Entry => self.tally.entries += 1,
            Direction::Exit => self.tally.exits += 1,
        }
        self.events.push(*event);
        info!(
            track_id = event.track_id,
            direction = event.direction.as_str(),
            frame_index = event.frame_index,
            entries = self.tally.entries,
            exits = self.tally.exits,
            "{event}"
        );
        self.tally
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Accepted events in the order they were recorded.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// One human-readable line per accepted event.
    pub fn log_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.events.iter().map(|e| e.to_string())
    }

    pub fn reset(&mut self) {
        self.tally = Tally::default();
        self.events.clear();
    }
}
