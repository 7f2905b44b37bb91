// Per-coach budget accounting derived from the pick log.

use std::collections::HashMap;

use crate::draft::pick::Pick;

/// Spent and remaining points for every coach, derived by replaying the
/// committed pick log against the configured budget cap.
#[derive(Debug, Clone, Default)]
pub struct BudgetState {
    pub spent: HashMap<String, u32>,
    pub remaining: HashMap<String, u32>,
}

impl BudgetState {
    /// Remaining budget for `coach`; zero for an unknown coach.
    pub fn remaining_for(&self, coach: &str) -> u32 {
        self.remaining.get(coach).copied().unwrap_or(0)
    }

    /// Spent total for `coach`; zero for an unknown coach.
    pub fn spent_for(&self, coach: &str) -> u32 {
        self.spent.get(coach).copied().unwrap_or(0)
    }
}

/// Compute budgets for all coaches from the full pick log.
///
/// Every configured coach starts at `spent = 0`, so a coach with no picks
/// reports the full cap remaining and an empty log is a valid input.
/// `remaining` saturates at zero; the accept-pick protocol guarantees an
/// accepted pick never actually drives it negative.
pub fn compute_budgets(picks: &[Pick], coaches: &[String], budget_cap: u32) -> BudgetState {
    let mut spent: HashMap<String, u32> = coaches.iter().map(|c| (c.clone(), 0)).collect();
    for pick in picks {
        *spent.entry(pick.coach.clone()).or_insert(0) += pick.points;
    }
    let remaining = spent
        .iter()
        .map(|(coach, &s)| (coach.clone(), budget_cap.saturating_sub(s)))
        .collect();
    BudgetState { spent, remaining }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coaches(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn pick(no: u32, coach: &str, dex: u32, points: u32) -> Pick {
        Pick {
            pick_no: no,
            coach: coach.to_string(),
            dex,
            points,
        }
    }

    #[test]
    fn empty_log_full_cap_for_everyone() {
        let budgets = compute_budgets(&[], &coaches(&["A", "B", "C"]), 110);
        for c in ["A", "B", "C"] {
            assert_eq!(budgets.spent_for(c), 0);
            assert_eq!(budgets.remaining_for(c), 110);
        }
    }

    #[test]
    fn accumulates_per_coach() {
        let picks = vec![
            pick(1, "A", 6, 20),
            pick(2, "B", 9, 15),
            pick(3, "A", 94, 18),
        ];
        let budgets = compute_budgets(&picks, &coaches(&["A", "B"]), 110);
        assert_eq!(budgets.spent_for("A"), 38);
        assert_eq!(budgets.remaining_for("A"), 72);
        assert_eq!(budgets.spent_for("B"), 15);
        assert_eq!(budgets.remaining_for("B"), 95);
    }

    #[test]
    fn unknown_coach_reports_zero_remaining() {
        let budgets = compute_budgets(&[], &coaches(&["A"]), 110);
        assert_eq!(budgets.remaining_for("nobody"), 0);
    }

    #[test]
    fn remaining_saturates_at_zero() {
        // The engine rejects over-budget picks; if the log somehow contains
        // one anyway (e.g. cap lowered after the fact), remaining clamps.
        let picks = vec![pick(1, "A", 6, 200)];
        let budgets = compute_budgets(&picks, &coaches(&["A"]), 110);
        assert_eq!(budgets.remaining_for("A"), 0);
        assert_eq!(budgets.spent_for("A"), 200);
    }
}
