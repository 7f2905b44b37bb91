// Match results and standings computation.
//
// Each reported result is a series score (0-2 game wins per side).
// Standings rank coaches by total game wins, breaking exact ties by
// head-to-head game wins within the tied group, then game differential,
// then name for a stable final order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ResultError {
    #[error("wins must be between 0 and 2, got {wins}")]
    InvalidWins { wins: u8 },

    #[error("a coach cannot play themselves: {coach}")]
    SelfMatch { coach: String },
}

/// A reported series result. Construct through [`MatchResult::new`] so the
/// score range is validated once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_key: String,
    pub coach1: String,
    pub coach2: String,
    pub wins1: u8,
    pub wins2: u8,
}

impl MatchResult {
    pub fn new(
        match_key: impl Into<String>,
        coach1: impl Into<String>,
        coach2: impl Into<String>,
        wins1: u8,
        wins2: u8,
    ) -> Result<Self, ResultError> {
        for wins in [wins1, wins2] {
            if wins > 2 {
                return Err(ResultError::InvalidWins { wins });
            }
        }
        let coach1 = coach1.into();
        let coach2 = coach2.into();
        if coach1 == coach2 {
            return Err(ResultError::SelfMatch { coach: coach1 });
        }
        Ok(MatchResult {
            match_key: match_key.into(),
            coach1,
            coach2,
            wins1,
            wins2,
        })
    }

    /// The series winner, or `None` for an unfinished/tied score.
    pub fn winner(&self) -> Option<&str> {
        match self.wins1.cmp(&self.wins2) {
            std::cmp::Ordering::Greater => Some(&self.coach1),
            std::cmp::Ordering::Less => Some(&self.coach2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// One row of the computed table. `seed` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub seed: usize,
    pub coach: String,
    /// Total game wins across all series.
    pub points: u32,
    /// Games won minus games lost across all series.
    pub diff: i32,
}

/// Rank all configured coaches from the reported results. Coaches with no
/// results yet appear with zero points. Results naming a coach outside the
/// configured set still count for the configured side's tally.
pub fn compute_standings(coaches: &[String], results: &[MatchResult]) -> Vec<StandingRow> {
    let mut points: HashMap<&str, u32> = coaches.iter().map(|c| (c.as_str(), 0)).collect();
    let mut diff: HashMap<&str, i32> = coaches.iter().map(|c| (c.as_str(), 0)).collect();

    for r in results {
        if let Some(p) = points.get_mut(r.coach1.as_str()) {
            *p += u32::from(r.wins1);
        }
        if let Some(p) = points.get_mut(r.coach2.as_str()) {
            *p += u32::from(r.wins2);
        }
        let delta = i32::from(r.wins1) - i32::from(r.wins2);
        if let Some(d) = diff.get_mut(r.coach1.as_str()) {
            *d += delta;
        }
        if let Some(d) = diff.get_mut(r.coach2.as_str()) {
            *d -= delta;
        }
    }

    // Head-to-head game wins within each exact-points group.
    let mut h2h: HashMap<&str, u32> = coaches.iter().map(|c| (c.as_str(), 0)).collect();
    for r in results {
        let (Some(&p1), Some(&p2)) = (
            points.get(r.coach1.as_str()),
            points.get(r.coach2.as_str()),
        ) else {
            continue;
        };
        if p1 != p2 {
            continue;
        }
        if let Some(w) = h2h.get_mut(r.coach1.as_str()) {
            *w += u32::from(r.wins1);
        }
        if let Some(w) = h2h.get_mut(r.coach2.as_str()) {
            *w += u32::from(r.wins2);
        }
    }

    let mut ordered: Vec<&String> = coaches.iter().collect();
    ordered.sort_by(|a, b| {
        let (pa, pb) = (points[a.as_str()], points[b.as_str()]);
        pb.cmp(&pa)
            .then(h2h[b.as_str()].cmp(&h2h[a.as_str()]))
            .then(diff[b.as_str()].cmp(&diff[a.as_str()]))
            .then(a.cmp(b))
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, coach)| StandingRow {
            seed: i + 1,
            coach: coach.clone(),
            points: points[coach.as_str()],
            diff: diff[coach.as_str()],
        })
        .collect()
}
