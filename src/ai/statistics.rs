use std::collections::HashMap;

use crate::game::{Board, Player};

/// Play and win counters for one position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub plays: u32,
    pub wins: u32,
}

impl NodeStats {
    /// Fraction of plays won, `None` before the first play.
    pub fn win_ratio(&self) -> Option<f64> {
        if self.plays == 0 {
            None
        } else {
            Some(f64::from(self.wins) / f64::from(self.plays))
        }
    }
}

/// Statistics key: the player who made the last move and the board it
/// produced. Different move orders reaching the same board share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub player: Player,
    pub board: Board,
}

impl StateKey {
    pub fn new(player: Player, board: Board) -> Self {
        StateKey { player, board }
    }
}

/// Statistics for every position the search has expanded.
#[derive(Debug, Clone, Default)]
pub struct StatisticsTable {
    entries: HashMap<StateKey, NodeStats>,
}

impl StatisticsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counters for a key; unknown positions read as zero.
    pub fn get(&self, key: &StateKey) -> NodeStats {
        self.entries.get(key).copied().unwrap_or_default()
    }

    /// Counters for a key only if it has been played at least once.
    pub fn played(&self, key: &StateKey) -> Option<NodeStats> {
        self.entries.get(key).copied().filter(|stats| stats.plays > 0)
    }

    /// Add a zeroed entry. Returns false if the key was already present.
    pub fn expand(&mut self, key: StateKey) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, NodeStats::default());
        true
    }

    /// Count one finished simulation through `key`. Keys that were never
    /// expanded are ignored.
    pub fn record(&mut self, key: &StateKey, winner: Option<Player>) {
        if let Some(stats) = self.entries.get_mut(key) {
            stats.plays += 1;
            if winner == Some(key.player) {
                stats.wins += 1;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &NodeStats)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(player: Player, col: usize) -> StateKey {
        StateKey::new(player, Board::new().apply(col, player).unwrap())
    }

    #[test]
    fn test_unknown_key_reads_as_zero() {
        let table = StatisticsTable::new();
        assert_eq!(table.get(&key(Player::One, 0)), NodeStats::default());
        assert!(table.played(&key(Player::One, 0)).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_expand_only_inserts_once() {
        let mut table = StatisticsTable::new();
        assert!(table.expand(key(Player::One, 3)));
        assert!(!table.expand(key(Player::One, 3)));
        assert_eq!(table.len(), 1);
        // Expanded but unplayed
        assert_eq!(table.get(&key(Player::One, 3)), NodeStats::default());
        assert!(table.played(&key(Player::One, 3)).is_none());
    }

    #[test]
    fn test_record_credits_only_the_winner() {
        let mut table = StatisticsTable::new();
        let one = key(Player::One, 2);
        let two = StateKey::new(Player::Two, one.board.apply(2, Player::Two).unwrap());
        table.expand(one.clone());
        table.expand(two.clone());

        table.record(&one, Some(Player::One));
        table.record(&two, Some(Player::One));
        table.record(&one, None);
        table.record(&two, None);

        assert_eq!(table.get(&one), NodeStats { plays: 2, wins: 1 });
        assert_eq!(table.get(&two), NodeStats { plays: 2, wins: 0 });
    }

    #[test]
    fn test_record_ignores_unexpanded_keys() {
        let mut table = StatisticsTable::new();
        table.record(&key(Player::One, 1), Some(Player::One));
        assert!(table.is_empty());
    }

    #[test]
    fn test_transpositions_share_an_entry() {
        let a = Board::new()
            .apply(0, Player::One)
            .and_then(|b| b.apply(1, Player::Two))
            .and_then(|b| b.apply(2, Player::One))
            .unwrap();
        let b = Board::new()
            .apply(2, Player::One)
            .and_then(|b| b.apply(1, Player::Two))
            .and_then(|b| b.apply(0, Player::One))
            .unwrap();
        let mut table = StatisticsTable::new();
        assert!(table.expand(StateKey::new(Player::One, a)));
        assert!(!table.expand(StateKey::new(Player::One, b)));
    }

    #[test]
    fn test_win_ratio() {
        assert_eq!(NodeStats::default().win_ratio(), None);
        assert_eq!(NodeStats { plays: 4, wins: 1 }.win_ratio(), Some(0.25));
    }
}
