mod counter;
mod crossing;
mod roi;

pub use counter::{Counter, Tally};
pub use crossing::{CrossingEvaluator, Direction, DirectionMapping, Event};
pub use roi::{FrameSize, LineOrientation, RoiLine};
