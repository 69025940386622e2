mod centroid_tracker;
mod matching;
mod rect;
mod side;
mod track;

pub use centroid_tracker::{CentroidTracker, TrackerConfig};
pub use matching::{
    AssignmentResult, Detection, PERSON_CLASS, centroid_distance, greedy_assignment,
};
pub use rect::Rect;
pub use side::Side;
pub use track::Track;
