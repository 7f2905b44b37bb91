// Draft order state and snake-order turn computation.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// The authoritative draft-order row: the base coach order, whether it has
/// been locked (the draft has started), and when.
///
/// `base_order` may only be reshuffled while `locked` is false and no picks
/// have been committed; the engine enforces that rule, this struct just
/// carries the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOrderState {
    /// Permutation of the full coach set; first-round pick order.
    pub base_order: Vec<String>,
    /// Once true, the order is frozen for the remainder of the draft.
    pub locked: bool,
    /// Set when the order is locked.
    pub started_at: Option<DateTime<Utc>>,
}

impl DraftOrderState {
    /// Fresh, unlocked state seeded with the configured coach order.
    pub fn new(coaches: &[String]) -> Self {
        DraftOrderState {
            base_order: coaches.to_vec(),
            locked: false,
            started_at: None,
        }
    }

    /// A uniformly random permutation of `base_order` (Fisher-Yates).
    /// Does not mutate `self`; the engine decides whether the shuffle is
    /// permitted and persists the result.
    pub fn shuffled(&self) -> Vec<String> {
        let mut order = self.base_order.clone();
        order.shuffle(&mut rand::thread_rng());
        order
    }
}

/// The full pick sequence for a snake draft: `base_order` repeated `rounds`
/// times, with every odd round reversed. Length is `coaches * rounds`.
///
/// Pure and deterministic: same inputs, same output, no hidden state.
pub fn snake_order(base_order: &[String], rounds: usize) -> Vec<String> {
    let mut order = Vec::with_capacity(base_order.len() * rounds);
    for r in 0..rounds {
        if r % 2 == 0 {
            order.extend(base_order.iter().cloned());
        } else {
            order.extend(base_order.iter().rev().cloned());
        }
    }
    order
}

/// Derived turn state. Never stored: recomputed from the base order and the
/// committed pick count whenever it is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    /// The full snake-order pick sequence.
    pub order: Vec<String>,
    /// Count of committed picks so far; index of the next slot.
    pub pick_index: usize,
    /// The coach whose turn it is, or `None` once the draft is done.
    pub on_the_clock: Option<String>,
    /// Total number of slots in the draft (coaches * rounds).
    pub total_picks: usize,
    /// True once every slot is filled.
    pub done: bool,
}

/// Compute the current turn from the base order, round count, and committed
/// pick count.
pub fn compute_turn(base_order: &[String], rounds: usize, picks_so_far: usize) -> TurnState {
    let order = snake_order(base_order, rounds);
    let total_picks = order.len();
    let on_the_clock = order.get(picks_so_far).cloned();
    TurnState {
        order,
        pick_index: picks_so_far,
        on_the_clock,
        total_picks,
        done: picks_so_far >= total_picks,
    }
}
