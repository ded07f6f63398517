//! Core Connect-N game logic: gravity board, player types, and outcome
//! detection with pure board transitions.

mod board;
mod outcome;
mod player;

pub use board::{Board, BoardParseError, Cell, GeometryError, MoveError, Window, COLS, ROWS};
pub use outcome::GameOutcome;
pub use player::Player;
