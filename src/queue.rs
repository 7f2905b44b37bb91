// Pure wishlist/queue resolution.
//
// A coach's wishlist is a private ranked list of dex numbers, stored on the
// coach's own device and never validated until it is consulted. This module
// decides the next actionable pick from that list against a snapshot of the
// draft (what's taken, what exists, what fits the budget). It never commits
// anything: the caller submits the chosen pick through the accept-pick
// protocol and persists the surviving queue.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::pool::Pool;

/// Policy for handling an invalid head-of-queue entry.
///
/// Stop mode exists so a coach can be told their top choice became
/// unavailable instead of silently receiving a lower preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipPolicy {
    /// Drop invalid entries and keep scanning for a valid one.
    SkipInvalid,
    /// Halt on the first invalid entry and report why.
    StopOnInvalid,
}

/// Why a resolution produced no pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoPickReason {
    /// Head entry is already drafted or not in the pool.
    Unavailable,
    /// Head entry costs more than the remaining budget.
    OverBudget,
    /// The queue ran out without finding a valid entry.
    Empty,
}

/// The outcome of consulting a wishlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// A valid head entry was found. `queue_after` is the wishlist with the
    /// chosen entry (and any skipped entries) removed; `removed` lists the
    /// invalid entries that were dropped along the way.
    Pick {
        dex: u32,
        queue_after: Vec<u32>,
        removed: Vec<u32>,
    },
    /// No pick can be made. In stop mode `queue_after` still contains the
    /// offending head so the coach sees what blocked them.
    NoAction {
        reason: NoPickReason,
        queue_after: Vec<u32>,
        removed: Vec<u32>,
    },
}

/// Coerce raw stored wishlist entries into dex numbers, discarding anything
/// non-numeric. Deduplication happens in [`resolve_next_pick`], so this is
/// safe to skip for queues that are already `Vec<u32>`.
pub fn normalize_queue<S: AsRef<str>>(entries: &[S]) -> Vec<u32> {
    entries
        .iter()
        .filter_map(|e| e.as_ref().trim().parse::<u32>().ok())
        .collect()
}

/// Order-preserving dedupe, keeping the first occurrence of each dex.
fn dedupe_first(queue: &[u32]) -> Vec<u32> {
    let mut seen = HashSet::new();
    queue.iter().copied().filter(|d| seen.insert(*d)).collect()
}

/// Decide the next actionable pick from `queue`.
///
/// The queue is deduplicated (first occurrence wins), then the head is
/// examined repeatedly: an entry already in `drafted` or missing from the
/// pool is *unavailable*; one costing more than `remaining_budget` is *over
/// budget*; otherwise it is the pick. What happens to an invalid head
/// depends on `policy`; see [`SkipPolicy`].
///
/// Pure function of its inputs; never returns a pick that is drafted,
/// unknown, or over budget.
pub fn resolve_next_pick(
    queue: &[u32],
    drafted: &HashSet<u32>,
    pool: &Pool,
    remaining_budget: u32,
    policy: SkipPolicy,
) -> Decision {
    let q = dedupe_first(queue);
    let mut removed = Vec::new();

    let mut idx = 0;
    while idx < q.len() {
        let dex = q[idx];

        let reason = match pool.get(dex) {
            Some(item) if !drafted.contains(&dex) => {
                if item.points > remaining_budget {
                    NoPickReason::OverBudget
                } else {
                    return Decision::Pick {
                        dex,
                        queue_after: q[idx + 1..].to_vec(),
                        removed,
                    };
                }
            }
            _ => NoPickReason::Unavailable,
        };

        match policy {
            SkipPolicy::StopOnInvalid => {
                return Decision::NoAction {
                    reason,
                    queue_after: q[idx..].to_vec(),
                    removed,
                };
            }
            SkipPolicy::SkipInvalid => {
                removed.push(dex);
                idx += 1;
            }
        }
    }

    Decision::NoAction {
        reason: NoPickReason::Empty,
        queue_after: Vec::new(),
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolItem;

    fn pool_with_costs(entries: &[(u32, u32)]) -> Pool {
        let items = entries
            .iter()
            .map(|&(dex, points)| PoolItem {
                dex,
                name: format!("mon{dex}"),
                types: "normal".to_string(),
                bst: 400,
                points,
                tier: "B".to_string(),
            })
            .collect();
        Pool::from_items(items).expect("test pool should build")
    }

    fn drafted(dexes: &[u32]) -> HashSet<u32> {
        dexes.iter().copied().collect()
    }

    #[test]
    fn picks_first_available_in_order() {
        let pool = pool_with_costs(&[(1, 10), (2, 12)]);
        let d = resolve_next_pick(&[2, 1], &drafted(&[]), &pool, 110, SkipPolicy::SkipInvalid);
        assert_eq!(
            d,
            Decision::Pick {
                dex: 2,
                queue_after: vec![1],
                removed: vec![],
            }
        );
    }

    #[test]
    fn skips_drafted_head_and_picks_next() {
        let pool = pool_with_costs(&[(1, 10), (2, 12)]);
        let d = resolve_next_pick(&[2, 1], &drafted(&[2]), &pool, 110, SkipPolicy::SkipInvalid);
        assert_eq!(
            d,
            Decision::Pick {
                dex: 1,
                queue_after: vec![],
                removed: vec![2],
            }
        );
    }

    #[test]
    fn stop_mode_unavailable_head_leaves_queue_untouched() {
        let pool = pool_with_costs(&[(1, 10)]);
        let d = resolve_next_pick(&[999, 1], &drafted(&[]), &pool, 110, SkipPolicy::StopOnInvalid);
        assert_eq!(
            d,
            Decision::NoAction {
                reason: NoPickReason::Unavailable,
                queue_after: vec![999, 1],
                removed: vec![],
            }
        );
    }

    #[test]
    fn skips_over_budget_entries() {
        let pool = pool_with_costs(&[(1, 200), (2, 10)]);
        let d = resolve_next_pick(&[1, 2], &drafted(&[]), &pool, 50, SkipPolicy::SkipInvalid);
        assert_eq!(
            d,
            Decision::Pick {
                dex: 2,
                queue_after: vec![],
                removed: vec![1],
            }
        );
    }

    #[test]
    fn stop_mode_over_budget_head_does_nothing() {
        let pool = pool_with_costs(&[(1, 200), (2, 10)]);
        let d = resolve_next_pick(&[1, 2], &drafted(&[]), &pool, 50, SkipPolicy::StopOnInvalid);
        assert_eq!(
            d,
            Decision::NoAction {
                reason: NoPickReason::OverBudget,
                queue_after: vec![1, 2],
                removed: vec![],
            }
        );
    }

    #[test]
    fn dedupes_preserving_order() {
        let pool = pool_with_costs(&[(1, 10), (2, 10)]);
        let d = resolve_next_pick(&[1, 1, 2, 2], &drafted(&[]), &pool, 110, SkipPolicy::SkipInvalid);
        assert_eq!(
            d,
            Decision::Pick {
                dex: 1,
                queue_after: vec![2],
                removed: vec![],
            }
        );
    }

    #[test]
    fn exhausted_queue_reports_empty() {
        let pool = pool_with_costs(&[(1, 10)]);
        let d = resolve_next_pick(&[1, 999], &drafted(&[1]), &pool, 110, SkipPolicy::SkipInvalid);
        assert_eq!(
            d,
            Decision::NoAction {
                reason: NoPickReason::Empty,
                queue_after: vec![],
                removed: vec![1, 999],
            }
        );
    }

    #[test]
    fn empty_queue_reports_empty() {
        let pool = pool_with_costs(&[]);
        let d = resolve_next_pick(&[], &drafted(&[]), &pool, 110, SkipPolicy::SkipInvalid);
        assert_eq!(
            d,
            Decision::NoAction {
                reason: NoPickReason::Empty,
                queue_after: vec![],
                removed: vec![],
            }
        );
    }

    #[test]
    fn never_picks_drafted_or_unknown() {
        // Exhaustive small-space check of the core safety property.
        let pool = pool_with_costs(&[(1, 10), (2, 20), (3, 30)]);
        let taken = drafted(&[2]);
        let queues: &[&[u32]] = &[&[2, 99, 1], &[99, 2, 3], &[2, 2, 99], &[3, 1]];
        for queue in queues {
            for policy in [SkipPolicy::SkipInvalid, SkipPolicy::StopOnInvalid] {
                for budget in [0u32, 15, 1000] {
                    if let Decision::Pick { dex, .. } =
                        resolve_next_pick(queue, &taken, &pool, budget, policy)
                    {
                        assert!(pool.contains(dex), "picked unknown dex {dex}");
                        assert!(!taken.contains(&dex), "picked drafted dex {dex}");
                        let cost = pool.get(dex).unwrap().points;
                        assert!(cost <= budget, "picked over-budget dex {dex}");
                    }
                }
            }
        }
    }

    #[test]
    fn normalize_discards_non_numeric() {
        let raw = ["94", " 6 ", "gengar", "", "-3", "143"];
        assert_eq!(normalize_queue(&raw), vec![94, 6, 143]);
    }
}
