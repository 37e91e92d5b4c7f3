//! Round → level mapping for a single layout pass.

use std::collections::HashMap;

/// Maps absolute rounds to zero-based levels relative to the lowest round in
/// the pass. Rebuilt every pass, since the lowest round moves as old rounds
/// leave the window.
#[derive(Debug, Default, Clone)]
pub struct RoundLevels {
    lowest_round: u64,
    highest_level: u64,
    levels: HashMap<u64, u64>,
}

impl RoundLevels {
    /// Build the mapping from every round in the pass.
    pub fn from_rounds<I>(rounds: I) -> Self
    where
        I: IntoIterator<Item = u64>,
        I::IntoIter: Clone,
    {
        let rounds = rounds.into_iter();
        let Some(lowest_round) = rounds.clone().min() else {
            return Self::default();
        };

        let mut levels = HashMap::new();
        let mut highest_level = 0;
        for round in rounds {
            let level = *levels
                .entry(round)
                .or_insert_with(|| round.saturating_sub(lowest_round));
            highest_level = highest_level.max(level);
        }

        Self {
            lowest_round,
            highest_level,
            levels,
        }
    }

    /// Level for `round`. Rounds that were not part of the pass are mapped
    /// with the same formula, saturating at zero.
    pub fn level_of(&self, round: u64) -> u64 {
        self.levels
            .get(&round)
            .copied()
            .unwrap_or_else(|| round.saturating_sub(self.lowest_round))
    }

    /// Minimum round seen in the pass (0 for an empty pass).
    pub fn lowest_round(&self) -> u64 {
        self.lowest_round
    }

    /// Maximum level in the pass (0 for an empty pass).
    pub fn highest_level(&self) -> u64 {
        self.highest_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_relative_to_lowest_round() {
        let levels = RoundLevels::from_rounds([7, 5, 9, 5]);
        assert_eq!(levels.lowest_round(), 5);
        assert_eq!(levels.level_of(5), 0);
        assert_eq!(levels.level_of(7), 2);
        assert_eq!(levels.level_of(9), 4);
        assert_eq!(levels.highest_level(), 4);
    }

    #[test]
    fn test_empty_pass() {
        let levels = RoundLevels::from_rounds(std::iter::empty());
        assert_eq!(levels.lowest_round(), 0);
        assert_eq!(levels.highest_level(), 0);
        assert_eq!(levels.level_of(3), 3);
    }

    #[test]
    fn test_round_below_window_saturates() {
        let levels = RoundLevels::from_rounds([10, 11]);
        assert_eq!(levels.level_of(2), 0);
    }
}
