// Automatic drafting from stored wishlists.
//
// When the coach on the clock has auto-pick enabled, their wishlist is
// resolved against the live draft snapshot and the chosen pick is submitted
// through the normal accept-pick protocol. Picks chain: if the next coach
// up also has auto-pick on, the loop keeps going until it reaches a manual
// coach, an unresolvable queue, or the end of the draft.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::draft::engine::{DraftEngine, DraftError, PickStore};
use crate::draft::pick::Pick;
use crate::queue::{normalize_queue, resolve_next_pick, Decision, SkipPolicy};

/// Per-coach auto-pick settings, stored alongside the wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachPrefs {
    #[serde(default)]
    pub auto_pick: bool,
    #[serde(default = "default_policy")]
    pub policy: SkipPolicy,
}

fn default_policy() -> SkipPolicy {
    SkipPolicy::SkipInvalid
}

impl Default for CoachPrefs {
    fn default() -> Self {
        CoachPrefs {
            auto_pick: false,
            policy: SkipPolicy::SkipInvalid,
        }
    }
}

/// Wishlist and preference persistence, keyed by coach name. Wishlists are
/// stored raw (as entered) and normalized on read.
pub trait WishlistStore {
    fn wishlist(&self, coach: &str) -> anyhow::Result<Vec<String>>;
    fn set_wishlist(&self, coach: &str, queue: &[u32]) -> anyhow::Result<()>;
    fn preferences(&self, coach: &str) -> anyhow::Result<CoachPrefs>;
    fn set_preferences(&self, coach: &str, prefs: &CoachPrefs) -> anyhow::Result<()>;
}

/// Drives auto-picks after every state change.
///
/// Holds one piece of memory between runs: the last `(pick_index, dex)`
/// submission attempt. If the same attempt comes around again without the
/// log having advanced, the loop stops instead of hammering the store with
/// a pick it already tried.
#[derive(Debug, Default)]
pub struct AutoPicker {
    last_attempt: Option<(usize, u32)>,
}

impl AutoPicker {
    pub fn new() -> Self {
        AutoPicker::default()
    }

    /// Make as many consecutive auto-picks as the current state allows.
    /// Returns the picks that were committed, in order.
    pub fn run<S, W>(
        &mut self,
        engine: &DraftEngine<'_, S>,
        wishlists: &W,
    ) -> anyhow::Result<Vec<Pick>>
    where
        S: PickStore,
        W: WishlistStore,
    {
        let mut made = Vec::new();

        loop {
            let turn = engine.turn()?;
            if turn.done {
                break;
            }
            let Some(coach) = turn.on_the_clock.clone() else {
                break;
            };

            let prefs = wishlists.preferences(&coach)?;
            if !prefs.auto_pick {
                break;
            }

            let raw = wishlists.wishlist(&coach)?;
            let queue = normalize_queue(&raw);
            let drafted = engine.drafted()?;
            let remaining = engine.budgets()?.remaining_for(&coach);

            match resolve_next_pick(&queue, &drafted, engine.pool(), remaining, prefs.policy) {
                Decision::Pick {
                    dex,
                    queue_after,
                    removed,
                } => {
                    if self.last_attempt == Some((turn.pick_index, dex)) {
                        warn!(
                            "auto-pick for {coach} retried dex {dex} at slot {}; stopping",
                            turn.pick_index
                        );
                        break;
                    }
                    self.last_attempt = Some((turn.pick_index, dex));

                    match engine.submit_pick(&coach, dex) {
                        Ok(pick) => {
                            self.last_attempt = None;
                            wishlists.set_wishlist(&coach, &queue_after)?;
                            if !removed.is_empty() {
                                debug!("pruned {removed:?} from {coach}'s wishlist");
                            }
                            info!("auto-picked dex {dex} for {coach}");
                            made.push(pick);
                        }
                        Err(DraftError::Conflict) => {
                            // Someone else filled the slot first; re-read
                            // and resolve against the new log.
                            debug!("auto-pick for {coach} lost a race; re-evaluating");
                        }
                        Err(err) => {
                            warn!("auto-pick for {coach} rejected: {err}");
                            break;
                        }
                    }
                }
                Decision::NoAction {
                    reason,
                    queue_after,
                    removed,
                } => {
                    // In skip mode the resolver consumed the whole queue;
                    // persist the pruning so dead entries don't linger.
                    if prefs.policy == SkipPolicy::SkipInvalid && !removed.is_empty() {
                        wishlists.set_wishlist(&coach, &queue_after)?;
                    }
                    info!("no auto-pick for {coach}: {reason:?}");
                    break;
                }
            }
        }

        Ok(made)
    }
}
