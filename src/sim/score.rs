//! Running score: the furthest row reached this run

use crate::observer::{Observers, SubscriptionId};

#[derive(Debug, Default)]
pub struct Score {
    value: u32,
    observers: Observers<u32>,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Raise the score to `row` if it is a new maximum. Returns true when the
    /// score changed. Negative and non-increasing rows are ignored.
    pub fn update_max_row(&mut self, row: i32) -> bool {
        let Ok(row) = u32::try_from(row) else {
            return false;
        };
        if row <= self.value {
            return false;
        }
        self.value = row;
        self.observers.notify(&row);
        true
    }

    /// Back to zero for a new run
    pub fn reset(&mut self) {
        if self.value != 0 {
            self.value = 0;
            self.observers.notify(&0);
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&u32) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_update_max_row() {
        let mut score = Score::new();
        assert!(score.update_max_row(3));
        assert!(!score.update_max_row(3));
        assert!(!score.update_max_row(1));
        assert!(!score.update_max_row(-4));
        assert_eq!(score.value(), 3);

        score.reset();
        assert_eq!(score.value(), 0);
    }

    proptest! {
        #[test]
        fn prop_score_never_decreases(rows in prop::collection::vec(-50i32..500, 0..64)) {
            let mut score = Score::new();
            let mut previous = score.value();
            for row in rows {
                score.update_max_row(row);
                prop_assert!(score.value() >= previous);
                prop_assert!(i64::from(score.value()) >= i64::from(row));
                previous = score.value();
            }
        }
    }
}
