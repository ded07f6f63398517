use crate::game::{Board, Player, Window};

/// Largest score a heuristic may produce. Kept an order of magnitude below the
/// alpha-beta sentinels so a real score is never mistaken for "no bound yet".
pub const MAX_HEURISTIC_SCORE: i64 = 1_000_000_000;

/// Trait for evaluating a board position from a player's perspective.
///
/// The bundled [`ConnectionHeuristic`] only counts the player's own runs.
/// Evaluators that also weigh the opponent's threats plug in here; none ships
/// with the crate.
pub trait Heuristic: Send {
    fn evaluate(&self, board: &Board, player: Player, connect_n: usize) -> i64;
}

/// Baseline evaluator. Every window of `connect_n` cells that fits on the
/// board is read from its start cell: the left end, or the bottom end for
/// vertical windows. Each leading run of length `1..connect_n` filled with the
/// player's pieces adds `length^degree`, so longer partial lines dominate.
///
/// It never subtracts anything for the opponent. A position where the opponent
/// is one move from winning scores the same as one where they have nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHeuristic {
    degree: u32,
}

impl ConnectionHeuristic {
    pub const DEFAULT_DEGREE: u32 = 5;

    pub fn new(degree: u32) -> Self {
        ConnectionHeuristic { degree }
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    fn weight(&self, len: usize) -> i64 {
        (len as i64).saturating_pow(self.degree)
    }

    /// Upper bound on [`Heuristic::evaluate`] over every board of this
    /// geometry, reached when every window is full of the player's pieces.
    pub fn max_score(&self, rows: usize, cols: usize, connect_n: usize) -> i64 {
        if connect_n == 0 {
            return 0;
        }
        let reach = connect_n - 1;
        let row_starts = rows.saturating_sub(reach);
        let col_starts = cols.saturating_sub(reach);
        let windows = (rows * col_starts + row_starts * cols + 2 * row_starts * col_starts) as i64;
        (1..connect_n).fold(0i64, |acc, len| {
            acc.saturating_add(windows.saturating_mul(self.weight(len)))
        })
    }
}

/// Re-anchor a window at its left end, or at its bottom end when vertical.
fn from_start(window: Window, connect_n: usize) -> Window {
    let (dr, dc) = window.step;
    if dc > 0 || (dc == 0 && dr < 0) {
        return window;
    }
    let reach = connect_n as isize - 1;
    Window {
        row: (window.row as isize + dr * reach) as usize,
        col: (window.col as isize + dc * reach) as usize,
        step: (-dr, -dc),
    }
}

impl Default for ConnectionHeuristic {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEGREE)
    }
}

impl Heuristic for ConnectionHeuristic {
    fn evaluate(&self, board: &Board, player: Player, connect_n: usize) -> i64 {
        let mut score = 0i64;
        for window in board.windows(connect_n) {
            let start = from_start(window, connect_n);
            for len in 1..connect_n {
                if !board.window_owned_by(&start, len, player) {
                    break;
                }
                score = score.saturating_add(self.weight(len));
            }
        }
        score
    }
}
