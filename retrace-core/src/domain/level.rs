//! Support and resistance levels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// A local extremum found by the detector, before touch validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelCandidate {
    pub kind: LevelKind,
    pub price: f64,
    pub bar_index: usize,
}

/// A candidate that survived touch validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub kind: LevelKind,
    pub price: f64,
    pub touch_count: usize,
}
