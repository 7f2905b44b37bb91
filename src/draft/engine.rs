// The accept-pick protocol and draft lifecycle operations.
//
// The engine owns no state: every call re-reads the committed log and the
// order row from the store, derives turn/budget state, and either rejects
// the operation with a specific reason or asks the store to commit exactly
// one change. Concurrent submissions are resolved by the store's
// compare-and-append primitive, not by locks held here.

use std::collections::HashSet;

use chrono::Utc;
use tracing::info;

use crate::draft::budget::{compute_budgets, BudgetState};
use crate::draft::order::{compute_turn, DraftOrderState, TurnState};
use crate::draft::pick::Pick;
use crate::pool::{Pool, PoolItem};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Every way a draft operation can be refused. One variant per condition so
/// callers can present (or retry) each case distinctly; nothing here is
/// fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("draft not started yet (waiting for the order to be locked)")]
    NotStarted,

    #[error("draft complete")]
    DraftComplete,

    #[error("not your turn (on the clock: {on_the_clock})")]
    WrongTurn { on_the_clock: String },

    #[error("dex {dex} is not in the pool")]
    UnknownItem { dex: u32 },

    #[error("dex {dex} has already been drafted")]
    AlreadyTaken { dex: u32 },

    #[error("over budget (remaining {remaining}, cost {cost})")]
    OverBudget { remaining: u32, cost: u32 },

    #[error("cannot reshuffle: {reason}")]
    InvalidReshuffle { reason: &'static str },

    #[error("pick log advanced during submission; re-evaluate and retry")]
    Conflict,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

/// The persistence collaborator: a linear, serializable, append-only pick
/// log plus one authoritative row of order/lock state.
///
/// `append_pick_if_current` is the single mutual-exclusion point in the
/// system: it must commit the pick only if the log still holds exactly
/// `expected_len` picks, evaluated atomically, so two concurrent callers
/// cannot both fill the same slot.
pub trait PickStore {
    fn list_picks(&self) -> anyhow::Result<Vec<Pick>>;
    fn order_state(&self) -> anyhow::Result<DraftOrderState>;
    fn set_order_state(&self, state: &DraftOrderState) -> anyhow::Result<()>;
    /// Optimistic compare-and-append. Returns `false` when the log moved.
    fn append_pick_if_current(&self, pick: &Pick, expected_len: usize) -> anyhow::Result<bool>;
    /// Remove and return the most recent pick, if any.
    fn remove_last_pick(&self) -> anyhow::Result<Option<Pick>>;
    fn clear_picks(&self) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// League rules
// ---------------------------------------------------------------------------

/// The configuration the engine needs: who drafts, how much they may spend,
/// and how many rounds each coach picks.
#[derive(Debug, Clone)]
pub struct LeagueRules {
    pub coaches: Vec<String>,
    pub budget_cap: u32,
    pub team_size: usize,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Stateless front door for all draft mutations. Holds references only;
/// cheap to construct per call site.
pub struct DraftEngine<'a, S: PickStore> {
    store: &'a S,
    pool: &'a Pool,
    rules: &'a LeagueRules,
}

impl<'a, S: PickStore> DraftEngine<'a, S> {
    pub fn new(store: &'a S, pool: &'a Pool, rules: &'a LeagueRules) -> Self {
        DraftEngine { store, pool, rules }
    }

    pub fn pool(&self) -> &Pool {
        self.pool
    }

    pub fn rules(&self) -> &LeagueRules {
        self.rules
    }

    /// Current turn state derived from the committed log.
    pub fn turn(&self) -> Result<TurnState, DraftError> {
        let picks = self.store.list_picks()?;
        let ds = self.store.order_state()?;
        Ok(compute_turn(&ds.base_order, self.rules.team_size, picks.len()))
    }

    /// Current budgets derived from the committed log.
    pub fn budgets(&self) -> Result<BudgetState, DraftError> {
        let picks = self.store.list_picks()?;
        Ok(compute_budgets(&picks, &self.rules.coaches, self.rules.budget_cap))
    }

    /// A coach's committed picks joined with pool data (missing pool
    /// entries yield `None` rather than failing).
    pub fn roster(&self, coach: &str) -> Result<Vec<(Pick, Option<PoolItem>)>, DraftError> {
        let picks = self.store.list_picks()?;
        Ok(picks
            .into_iter()
            .filter(|p| p.coach == coach)
            .map(|p| {
                let item = self.pool.get(p.dex).cloned();
                (p, item)
            })
            .collect())
    }

    /// Dex numbers of every committed pick.
    pub fn drafted(&self) -> Result<HashSet<u32>, DraftError> {
        let picks = self.store.list_picks()?;
        Ok(picks.iter().map(|p| p.dex).collect())
    }

    /// Submit a pick for `coach`, enforcing the accept-pick protocol
    /// against the current committed log:
    ///
    /// 1. order is locked, 2. draft not done, 3. `coach` is on the clock,
    /// 4. `dex` is a known pool item, 5. `dex` not already taken,
    /// 6. cost fits the coach's remaining budget.
    ///
    /// On success exactly one pick is appended with
    /// `pick_no = log length + 1`. A concurrent append between our read and
    /// our write surfaces as [`DraftError::Conflict`]; the caller re-reads
    /// and retries if still eligible.
    pub fn submit_pick(&self, coach: &str, dex: u32) -> Result<Pick, DraftError> {
        let ds = self.store.order_state()?;
        if !ds.locked {
            return Err(DraftError::NotStarted);
        }

        let picks = self.store.list_picks()?;
        let turn = compute_turn(&ds.base_order, self.rules.team_size, picks.len());
        if turn.done {
            return Err(DraftError::DraftComplete);
        }
        match turn.on_the_clock.as_deref() {
            Some(on_clock) if on_clock == coach => {}
            Some(on_clock) => {
                return Err(DraftError::WrongTurn {
                    on_the_clock: on_clock.to_string(),
                });
            }
            // Unreachable when !done, but never panic on it.
            None => return Err(DraftError::DraftComplete),
        }

        let item = self.pool.get(dex).ok_or(DraftError::UnknownItem { dex })?;

        if picks.iter().any(|p| p.dex == dex) {
            return Err(DraftError::AlreadyTaken { dex });
        }

        let budgets = compute_budgets(&picks, &self.rules.coaches, self.rules.budget_cap);
        let remaining = budgets.remaining_for(coach);
        if item.points > remaining {
            return Err(DraftError::OverBudget {
                remaining,
                cost: item.points,
            });
        }

        let pick = Pick {
            pick_no: picks.len() as u32 + 1,
            coach: coach.to_string(),
            dex,
            points: item.points,
        };

        if !self.store.append_pick_if_current(&pick, picks.len())? {
            return Err(DraftError::Conflict);
        }

        info!(
            "pick #{}: {} -> {} ({} pts, {} remaining)",
            pick.pick_no,
            coach,
            item.name,
            item.points,
            remaining - item.points
        );
        Ok(pick)
    }

    /// Replace the base order with a fresh random permutation. Only allowed
    /// before the draft starts: unlocked order and an empty pick log.
    pub fn reshuffle(&self) -> Result<DraftOrderState, DraftError> {
        let ds = self.store.order_state()?;
        if ds.locked {
            return Err(DraftError::InvalidReshuffle {
                reason: "draft already locked",
            });
        }
        let picks = self.store.list_picks()?;
        if !picks.is_empty() {
            return Err(DraftError::InvalidReshuffle {
                reason: "picks have already been made",
            });
        }

        let next = DraftOrderState {
            base_order: ds.shuffled(),
            ..ds
        };
        self.store.set_order_state(&next)?;
        info!("draft order reshuffled: {:?}", next.base_order);
        Ok(next)
    }

    /// Lock the order and start the draft. Idempotent: a second lock
    /// returns the current state unchanged, since concurrent callers may
    /// race to lock.
    pub fn lock(&self) -> Result<DraftOrderState, DraftError> {
        let ds = self.store.order_state()?;
        if ds.locked {
            return Ok(ds);
        }
        let next = DraftOrderState {
            locked: true,
            started_at: Some(Utc::now()),
            ..ds
        };
        self.store.set_order_state(&next)?;
        info!("draft order locked: {:?}", next.base_order);
        Ok(next)
    }

    /// Remove the most recent pick (admin correction). Returns the removed
    /// pick, or `None` on an empty log.
    pub fn undo_last(&self) -> Result<Option<Pick>, DraftError> {
        let removed = self.store.remove_last_pick()?;
        if let Some(pick) = &removed {
            info!("undid pick #{}: {} -> dex {}", pick.pick_no, pick.coach, pick.dex);
        }
        Ok(removed)
    }

    /// Wipe all picks and unlock the order so a fresh draft can be
    /// reshuffled. The base order itself is kept.
    pub fn reset(&self) -> Result<(), DraftError> {
        self.store.clear_picks()?;
        let ds = self.store.order_state()?;
        self.store.set_order_state(&DraftOrderState {
            locked: false,
            started_at: None,
            ..ds
        })?;
        info!("draft reset");
        Ok(())
    }
}
