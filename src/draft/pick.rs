// Individual pick representation.

use serde::{Deserialize, Serialize};

/// A single committed draft pick.
///
/// Picks are immutable once committed: the pick log is append-only and
/// `pick_no` is strictly increasing (1-indexed). Everything else about the
/// draft (whose turn it is, budgets, rosters) is derived by replaying the
/// log, never stored alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    /// Sequential pick number (1-indexed).
    pub pick_no: u32,
    /// Name of the coach who made the pick.
    pub coach: String,
    /// Dex number of the drafted pokemon.
    pub dex: u32,
    /// Point cost at the time of the pick.
    pub points: u32,
}
