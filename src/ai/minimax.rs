use tracing::debug;

use crate::config::GameConfig;
use crate::error::{ConfigError, SearchError};
use crate::game::{Board, MoveError, Player};

use super::agent::{legal_actions_or_err, Agent, SavedState};
use super::heuristic::{ConnectionHeuristic, Heuristic, MAX_HEURISTIC_SCORE};

/// "No bound yet" for alpha and beta. Heuristic scores stay far below it.
pub const SCORE_SENTINEL: i64 = 10_000_000_000;

/// Value of a completed line, above any heuristic score and below the
/// sentinels. Remaining depth is added so nearer wins rank higher.
pub const WIN_SCORE: i64 = MAX_HEURISTIC_SCORE;

/// Minimax hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MinimaxConfig {
    /// Plies searched below the root; at least 1.
    pub depth: u32,
    /// Exponent of the baseline heuristic's run weights.
    pub degree: u32,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        MinimaxConfig {
            depth: 4,
            degree: ConnectionHeuristic::DEFAULT_DEGREE,
        }
    }
}

impl MinimaxConfig {
    pub fn validate(&self, game: &GameConfig) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::Validation(
                "minimax.depth must be >= 1".into(),
            ));
        }
        let bound = ConnectionHeuristic::new(self.degree).max_score(game.rows, game.cols, game.connect_n);
        if bound >= MAX_HEURISTIC_SCORE {
            return Err(ConfigError::Validation(format!(
                "minimax.degree {} lets heuristic scores reach {bound}, limit is {MAX_HEURISTIC_SCORE}",
                self.degree
            )));
        }
        Ok(())
    }
}

/// Per-column values computed at the root, ascending by column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimaxReport {
    pub values: Vec<(usize, i64)>,
}

impl MinimaxReport {
    /// Column with the highest value, first one on ties.
    pub fn best_action(&self) -> Option<usize> {
        self.values
            .iter()
            .fold(None, |best: Option<(usize, i64)>, &(col, value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((col, value)),
            })
            .map(|(col, _)| col)
    }

    /// True when every column scored the same.
    pub fn all_equal(&self) -> bool {
        self.values.windows(2).all(|pair| pair[0].1 == pair[1].1)
    }
}

/// Depth-bounded minimax with alpha-beta pruning.
pub struct MinimaxSearch {
    depth: u32,
    connect_n: usize,
    heuristic: Box<dyn Heuristic>,
}

impl MinimaxSearch {
    pub fn new(game: &GameConfig, config: &MinimaxConfig) -> Result<Self, SearchError> {
        game.validate()?;
        config.validate(game)?;
        Self::with_heuristic(
            config.depth,
            game.connect_n,
            Box::new(ConnectionHeuristic::new(config.degree)),
        )
    }

    /// Search with a custom evaluator. Its scores must stay below
    /// [`MAX_HEURISTIC_SCORE`] so completed lines always outrank them.
    pub fn with_heuristic(
        depth: u32,
        connect_n: usize,
        heuristic: Box<dyn Heuristic>,
    ) -> Result<Self, SearchError> {
        if depth == 0 {
            return Err(SearchError::InvalidConfiguration(
                "minimax depth must be >= 1".into(),
            ));
        }
        if connect_n == 0 {
            return Err(SearchError::InvalidConfiguration(
                "connect_n must be >= 1".into(),
            ));
        }
        Ok(MinimaxSearch {
            depth,
            connect_n,
            heuristic,
        })
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Value of every open column for `player`. Each root child gets a full
    /// window, so the values are exact; pruning happens below the root.
    pub fn root_values(&self, board: &Board, player: Player) -> Result<MinimaxReport, SearchError> {
        let legal = legal_actions_or_err(board)?;
        let mut values = Vec::with_capacity(legal.len());
        for col in legal {
            let child = board.apply(col, player)?;
            let value = match won_value(&child, col, player, self.depth - 1, self.connect_n) {
                Some(value) => value,
                None => min_of(&self.alpha_beta(
                    &child,
                    player,
                    self.depth - 1,
                    false,
                    -SCORE_SENTINEL,
                    SCORE_SENTINEL,
                )?),
            };
            values.push((col, value));
        }
        Ok(MinimaxReport { values })
    }

    /// Returns the values of the children evaluated at this node, or the
    /// heuristic score alone at a leaf. `player` is always the root player;
    /// minimizing nodes move for the opponent. A move that completes a line
    /// is scored with [`WIN_SCORE`] and not searched further.
    fn alpha_beta(
        &self,
        board: &Board,
        player: Player,
        depth: u32,
        maximizing: bool,
        mut alpha: i64,
        mut beta: i64,
    ) -> Result<Vec<i64>, MoveError> {
        let legal = board.legal_actions();
        if depth == 0 || legal.is_empty() {
            return Ok(vec![self.heuristic.evaluate(board, player, self.connect_n)]);
        }

        let mut values = Vec::with_capacity(legal.len());
        if maximizing {
            let mut best = -SCORE_SENTINEL;
            for col in legal {
                let child = board.apply(col, player)?;
                let value = match won_value(&child, col, player, depth - 1, self.connect_n) {
                    Some(value) => value,
                    None => min_of(&self.alpha_beta(&child, player, depth - 1, false, alpha, beta)?),
                };
                values.push(value);
                best = best.max(value);
                if best >= beta {
                    break;
                }
                alpha = alpha.max(best);
            }
        } else {
            let mut best = SCORE_SENTINEL;
            for col in legal {
                let child = board.apply(col, player.other())?;
                let value = match won_value(&child, col, player, depth - 1, self.connect_n) {
                    Some(value) => value,
                    None => max_of(&self.alpha_beta(&child, player, depth - 1, true, alpha, beta)?),
                };
                values.push(value);
                best = best.min(value);
                if best <= alpha {
                    break;
                }
                beta = beta.min(best);
            }
        }
        Ok(values)
    }
}

/// Plain minimax without pruning, returning the value of every open column.
/// Same leaf rules as [`MinimaxSearch`]; used to check that pruning never
/// changes the answer.
pub fn minimax_values(
    board: &Board,
    player: Player,
    depth: u32,
    connect_n: usize,
    heuristic: &dyn Heuristic,
) -> Result<MinimaxReport, SearchError> {
    if depth == 0 {
        return Err(SearchError::InvalidConfiguration(
            "minimax depth must be >= 1".into(),
        ));
    }
    let legal = legal_actions_or_err(board)?;
    let mut values = Vec::with_capacity(legal.len());
    for col in legal {
        let child = board.apply(col, player)?;
        let value = match won_value(&child, col, player, depth - 1, connect_n) {
            Some(value) => value,
            None => full_minimax(&child, player, depth - 1, false, connect_n, heuristic)?,
        };
        values.push((col, value));
    }
    Ok(MinimaxReport { values })
}

fn full_minimax(
    board: &Board,
    player: Player,
    depth: u32,
    maximizing: bool,
    connect_n: usize,
    heuristic: &dyn Heuristic,
) -> Result<i64, MoveError> {
    let legal = board.legal_actions();
    if depth == 0 || legal.is_empty() {
        return Ok(heuristic.evaluate(board, player, connect_n));
    }
    let mover = if maximizing { player } else { player.other() };
    let mut best = if maximizing { -SCORE_SENTINEL } else { SCORE_SENTINEL };
    for col in legal {
        let child = board.apply(col, mover)?;
        let value = match won_value(&child, col, player, depth - 1, connect_n) {
            Some(value) => value,
            None => full_minimax(&child, player, depth - 1, !maximizing, connect_n, heuristic)?,
        };
        best = if maximizing { best.max(value) } else { best.min(value) };
    }
    Ok(best)
}

/// Terminal value of `child` for `player` if the piece just dropped in `col`
/// completed a line, `None` otherwise.
fn won_value(child: &Board, col: usize, player: Player, depth: u32, connect_n: usize) -> Option<i64> {
    let winner = child.outcome_after(col, connect_n).winner()?;
    let value = WIN_SCORE + i64::from(depth);
    Some(if winner == player { value } else { -value })
}

fn min_of(values: &[i64]) -> i64 {
    values.iter().copied().min().unwrap_or(SCORE_SENTINEL)
}

fn max_of(values: &[i64]) -> i64 {
    values.iter().copied().max().unwrap_or(-SCORE_SENTINEL)
}

/// Minimax agent with alpha-beta pruning.
pub struct MinimaxAgent {
    search: MinimaxSearch,
}

impl MinimaxAgent {
    pub fn new(game: &GameConfig, config: &MinimaxConfig) -> Result<Self, SearchError> {
        Ok(MinimaxAgent {
            search: MinimaxSearch::new(game, config)?,
        })
    }

    pub fn with_search(search: MinimaxSearch) -> Self {
        MinimaxAgent { search }
    }

    /// Pick the best column from a report.
    ///
    /// When every column scores the same the center column is played if it
    /// is open. This mostly papers over a heuristic too coarse to separate
    /// the moves rather than encoding any strategy.
    fn choose(report: &MinimaxReport, board: &Board) -> Option<usize> {
        let center = board.cols() / 2;
        if report.all_equal() && !board.is_column_full(center) {
            debug!("All columns tied, defaulting to center column {}", center);
            return Some(center);
        }
        report.best_action()
    }
}

impl Agent for MinimaxAgent {
    fn generate_move(
        &mut self,
        board: &Board,
        player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(usize, Option<SavedState>), SearchError> {
        let report = self.search.root_values(board, player)?;
        debug!("Minimax values at depth {}: {:?}", self.search.depth(), report.values);
        let col = Self::choose(&report, board).ok_or(SearchError::NoLegalMove)?;
        debug!("Minimax plays column {} for {}", col, player.name());
        Ok((col, saved_state))
    }

    fn name(&self) -> &str {
        "Minimax"
    }
}
