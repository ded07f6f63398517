use std::any::Any;

use crate::error::SearchError;
use crate::game::{Board, Player};

/// Opaque state an agent may hand back to itself on its next turn. Only the
/// agent that produced it knows its concrete type.
pub type SavedState = Box<dyn Any + Send>;

/// Universal interface for move generators.
///
/// The caller owns the game loop: it alternates turns, stops on a win or a
/// draw, and passes back whatever state the agent returned last time.
pub trait Agent {
    /// Pick a column for `player` on `board`. The returned column is always
    /// open. A full board yields [`SearchError::NoLegalMove`].
    fn generate_move(
        &mut self,
        board: &Board,
        player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(usize, Option<SavedState>), SearchError>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}

/// Open columns of `board`, or `NoLegalMove` when there are none.
pub(crate) fn legal_actions_or_err(board: &Board) -> Result<Vec<usize>, SearchError> {
    let legal = board.legal_actions();
    if legal.is_empty() {
        return Err(SearchError::NoLegalMove);
    }
    Ok(legal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_board_has_no_legal_move() {
        let mut board = Board::with_size(2, 2).unwrap();
        for col in 0..2 {
            board = board.apply(col, Player::One).unwrap();
            board = board.apply(col, Player::Two).unwrap();
        }
        assert!(matches!(
            legal_actions_or_err(&board),
            Err(SearchError::NoLegalMove)
        ));
    }

    #[test]
    fn test_open_board_lists_columns() {
        let board = Board::with_size(3, 4).unwrap();
        assert_eq!(legal_actions_or_err(&board).unwrap(), vec![0, 1, 2, 3]);
    }
}
