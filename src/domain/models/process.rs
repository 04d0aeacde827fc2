use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduling class requested for a worker
///
/// Levels map onto contiguous bands: anything below -1 is `Idle`, -1 is
/// `BelowNormal`, 0 is `Normal`, 1 is `AboveNormal`, 2 is `High` and 3 or
/// more is `RealTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    Idle,
    BelowNormal,
    Normal,
    AboveNormal,
    High,
    RealTime,
}

impl PriorityClass {
    /// Map a configured priority level onto a class
    pub const fn from_level(level: i16) -> Self {
        match level {
            i16::MIN..=-2 => Self::Idle,
            -1 => Self::BelowNormal,
            0 => Self::Normal,
            1 => Self::AboveNormal,
            2 => Self::High,
            _ => Self::RealTime,
        }
    }

    /// Unix nice value for the class
    ///
    /// Values below zero need `CAP_SYS_NICE`; `RealTime` is approximated by
    /// the strongest nice value rather than a real-time scheduler policy.
    pub const fn nice_value(self) -> i32 {
        match self {
            Self::Idle => 19,
            Self::BelowNormal => 10,
            Self::Normal => 0,
            Self::AboveNormal => -5,
            Self::High => -10,
            Self::RealTime => -20,
        }
    }
}

impl Default for PriorityClass {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::BelowNormal => write!(f, "below_normal"),
            Self::Normal => write!(f, "normal"),
            Self::AboveNormal => write!(f, "above_normal"),
            Self::High => write!(f, "high"),
            Self::RealTime => write!(f, "real_time"),
        }
    }
}
