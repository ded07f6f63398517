use super::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
    Ongoing,
}

impl GameOutcome {
    /// True for a win or a draw.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameOutcome::Ongoing)
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Winner(player) => Some(player),
            _ => None,
        }
    }
}
