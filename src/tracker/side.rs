use serde::{Deserialize, Serialize};

/// Side of the ROI line a track was last classified on.
///
/// For a vertical line `Above` is the left-hand side and `Below` the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Not yet classified; every track starts here
    #[default]
    Unknown,
    /// Centroid before the line (smaller coordinate)
    Above,
    /// Centroid past the line (larger coordinate)
    Below,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Above => "ABOVE",
            Self::Below => "BELOW",
        }
    }
}
