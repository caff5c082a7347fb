//! Achievement engine
//!
//! Built-in honor thresholds, evaluated after any counter change for an
//! identity. Built-in honors are separate from the admin-curated honor
//! catalog: catalog entries are descriptive metadata, the engine grants only
//! the honors in [`THRESHOLDS`].
//!
//! Evaluation is idempotent. Only a not-held -> criteria-met transition
//! produces a grant; honors already held are never re-granted or removed.

/// Granted on first-ever registration, directly (not threshold-driven).
pub const HONOR_FOUNDING_MEMBER: i64 = 0;
/// Granted when submission count reaches 5.
pub const HONOR_DEDICATED_OBSERVER: i64 = 1;
/// Granted when validation count reaches 10.
pub const HONOR_SEASONED_VALIDATOR: i64 = 2;

/// Which activity counter a threshold watches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Submissions,
    Validations,
}

/// A built-in honor threshold
#[derive(Debug, Clone, Copy)]
pub struct Threshold {
    pub honor_id: i64,
    pub counter: Counter,
    pub at: u32,
}

/// Built-in threshold table. The founding-member honor is granted at
/// registration time and does not appear here.
pub const THRESHOLDS: [Threshold; 2] = [
    Threshold {
        honor_id: HONOR_DEDICATED_OBSERVER,
        counter: Counter::Submissions,
        at: 5,
    },
    Threshold {
        honor_id: HONOR_SEASONED_VALIDATOR,
        counter: Counter::Validations,
        at: 10,
    },
];

/// Honors newly earned by the given counters, excluding those already held.
pub fn newly_earned(submissions: u32, validations: u32, held: &[i64]) -> Vec<i64> {
    THRESHOLDS
        .iter()
        .filter(|t| {
            let value = match t.counter {
                Counter::Submissions => submissions,
                Counter::Validations => validations,
            };
            value >= t.at && !held.contains(&t.honor_id)
        })
        .map(|t| t.honor_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedicated_observer_at_exactly_five() {
        assert!(newly_earned(4, 0, &[HONOR_FOUNDING_MEMBER]).is_empty());
        assert_eq!(
            newly_earned(5, 0, &[HONOR_FOUNDING_MEMBER]),
            vec![HONOR_DEDICATED_OBSERVER]
        );
    }

    #[test]
    fn test_seasoned_validator_at_exactly_ten() {
        assert!(newly_earned(0, 9, &[]).is_empty());
        assert_eq!(newly_earned(0, 10, &[]), vec![HONOR_SEASONED_VALIDATOR]);
    }

    #[test]
    fn test_held_honors_are_not_regranted() {
        assert!(newly_earned(7, 0, &[HONOR_FOUNDING_MEMBER, HONOR_DEDICATED_OBSERVER]).is_empty());
        assert!(newly_earned(100, 100, &[HONOR_DEDICATED_OBSERVER, HONOR_SEASONED_VALIDATOR])
            .is_empty());
    }

    #[test]
    fn test_both_thresholds_can_fire_together() {
        let earned = newly_earned(5, 10, &[]);
        assert!(earned.contains(&HONOR_DEDICATED_OBSERVER));
        assert!(earned.contains(&HONOR_SEASONED_VALIDATOR));
    }
}
