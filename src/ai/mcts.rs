use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::error::{ConfigError, SearchError};
use crate::game::{Board, GameOutcome, Player};

use super::agent::{legal_actions_or_err, Agent, SavedState};
use super::statistics::{StateKey, StatisticsTable};

/// How long one decision may search. Checked between simulations only, so
/// the simulation in flight always finishes.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchBudget {
    /// Wall-clock limit in seconds.
    Seconds(f64),
    /// Fixed number of simulations.
    Simulations(u32),
}

/// MCTS hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// UCB1 exploration constant.
    pub exploration: f64,
    pub budget: SearchBudget,
    /// Moves per simulation before it is abandoned without a result.
    /// 0 means the board area.
    pub max_moves: usize,
    /// Hand the statistics table back as saved state and resume from it on
    /// the next decision instead of starting fresh.
    pub retain_statistics: bool,
    /// RNG seed for reproducible searches; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            exploration: std::f64::consts::SQRT_2,
            budget: SearchBudget::Seconds(1.0),
            max_moves: 0,
            retain_statistics: false,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Create a config with a fixed simulation count.
    pub fn with_simulations(simulations: u32) -> Self {
        MctsConfig {
            budget: SearchBudget::Simulations(simulations),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration.is_finite() || self.exploration <= 0.0 {
            return Err(ConfigError::Validation(
                "mcts.exploration must be a finite value > 0".into(),
            ));
        }
        match self.budget {
            SearchBudget::Seconds(secs) if !secs.is_finite() || secs <= 0.0 => {
                return Err(ConfigError::Validation(
                    "mcts.budget.seconds must be a finite value > 0".into(),
                ));
            }
            SearchBudget::Simulations(0) => {
                return Err(ConfigError::Validation(
                    "mcts.budget.simulations must be >= 1".into(),
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Limit {
    Time(Duration),
    Count(u32),
}

/// Summary of one decision.
#[derive(Debug, Clone)]
pub struct MctsReport {
    /// Play count of the child reached by each open column, ascending.
    pub visits: Vec<(usize, u32)>,
    pub simulations: u32,
    pub elapsed: Duration,
    /// Deepest ply (1 = a root child) at which an expansion happened.
    pub max_depth: usize,
}

impl MctsReport {
    /// The most played column, first one on ties.
    pub fn best_action(&self) -> Option<usize> {
        self.visits
            .iter()
            .fold(None, |best: Option<(usize, u32)>, &(col, plays)| match best {
                Some((_, best_plays)) if best_plays >= plays => best,
                _ => Some((col, plays)),
            })
            .map(|(col, _)| col)
    }
}

/// Monte Carlo tree search over a statistics table keyed by position.
/// One instance serves one decision unless its table is carried over.
pub struct Mcts {
    exploration: f64,
    limit: Limit,
    max_moves: usize,
    connect_n: usize,
    stats: StatisticsTable,
    rng: StdRng,
    max_depth: usize,
}

impl Mcts {
    pub fn new(config: &MctsConfig, connect_n: usize) -> Result<Self, SearchError> {
        config.validate()?;
        if connect_n == 0 {
            return Err(SearchError::InvalidConfiguration(
                "connect_n must be >= 1".into(),
            ));
        }
        let limit = match config.budget {
            SearchBudget::Seconds(secs) => Limit::Time(
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| SearchError::InvalidConfiguration(e.to_string()))?,
            ),
            SearchBudget::Simulations(count) => Limit::Count(count),
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Mcts {
            exploration: config.exploration,
            limit,
            max_moves: config.max_moves,
            connect_n,
            stats: StatisticsTable::new(),
            rng,
            max_depth: 0,
        })
    }

    /// Continue from an earlier table.
    pub fn with_statistics(mut self, stats: StatisticsTable) -> Self {
        self.stats = stats;
        self
    }

    pub fn statistics(&self) -> &StatisticsTable {
        &self.stats
    }

    pub fn into_statistics(self) -> StatisticsTable {
        self.stats
    }

    /// Run simulations from `root` until the budget runs out and report the
    /// play count of every root child. Zero or one open column returns at
    /// once without simulating.
    pub fn search(&mut self, root: &Board) -> Result<MctsReport, SearchError> {
        let start = Instant::now();
        let legal = legal_actions_or_err(root)?;
        if legal.len() == 1 {
            return Ok(MctsReport {
                visits: vec![(legal[0], 0)],
                simulations: 0,
                elapsed: start.elapsed(),
                max_depth: 0,
            });
        }

        let mut simulations = 0u32;
        while self.has_budget(start, simulations) {
            self.run_simulation(root);
            simulations += 1;
        }

        let player = root.player_to_move();
        let mut visits = Vec::with_capacity(legal.len());
        for col in legal {
            let key = StateKey::new(player, root.apply(col, player)?);
            visits.push((col, self.stats.get(&key).plays));
        }

        let report = MctsReport {
            visits,
            simulations,
            elapsed: start.elapsed(),
            max_depth: self.max_depth,
        };
        debug!(
            "MCTS ran {} simulations in {:?}, deepest expansion at ply {}",
            report.simulations, report.elapsed, report.max_depth
        );
        self.log_children(root, player, &report);
        Ok(report)
    }

    fn has_budget(&self, start: Instant, simulations: u32) -> bool {
        match self.limit {
            Limit::Time(limit) => start.elapsed() < limit,
            Limit::Count(count) => simulations < count,
        }
    }

    /// One selection/expansion/rollout pass followed by backpropagation.
    fn run_simulation(&mut self, root: &Board) {
        let max_moves = if self.max_moves == 0 {
            root.rows() * root.cols()
        } else {
            self.max_moves
        };

        let mut visited: HashSet<StateKey> = HashSet::new();
        let mut expanded = false;
        let mut winner = None;
        let mut board = root.clone();

        for ply in 1..=max_moves {
            let player = board.player_to_move();
            let mut children: Vec<(usize, Board)> = board
                .legal_actions()
                .into_iter()
                .filter_map(|col| board.apply(col, player).ok().map(|child| (col, child)))
                .collect();
            if children.is_empty() {
                break;
            }

            let choice = self.select_child(player, &children);
            let (col, next) = children.swap_remove(choice);
            let key = StateKey::new(player, next);

            if !expanded && self.stats.expand(key.clone()) {
                expanded = true;
                self.max_depth = self.max_depth.max(ply);
            }

            let outcome = key.board.outcome_after(col, self.connect_n);
            board = key.board.clone();
            visited.insert(key);

            match outcome {
                GameOutcome::Winner(player) => {
                    winner = Some(player);
                    break;
                }
                GameOutcome::Draw => break,
                GameOutcome::Ongoing => {}
            }
        }

        for key in &visited {
            self.stats.record(key, winner);
        }
    }

    /// UCB1 over the children once all of them have been played; until then
    /// a uniformly random child, which also serves as the rollout policy.
    fn select_child(&mut self, player: Player, children: &[(usize, Board)]) -> usize {
        let known: Option<Vec<(u32, u32)>> = children
            .iter()
            .map(|(_, child)| {
                self.stats
                    .played(&StateKey::new(player, child.clone()))
                    .map(|s| (s.plays, s.wins))
            })
            .collect();

        let Some(known) = known else {
            return self.rng.random_range(0..children.len());
        };

        let total: u32 = known.iter().map(|&(plays, _)| plays).sum();
        let log_total = f64::from(total).ln();
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, &(plays, wins)) in known.iter().enumerate() {
            let plays = f64::from(plays);
            let score = f64::from(wins) / plays + self.exploration * (log_total / plays).sqrt();
            if score > best_score {
                best_score = score;
                best = i;
            }
        }
        best
    }

    fn log_children(&self, root: &Board, player: Player, report: &MctsReport) {
        for &(col, _) in &report.visits {
            if let Ok(child) = root.apply(col, player) {
                let stats = self.stats.get(&StateKey::new(player, child));
                debug!(
                    "  column {}: {:.2}% ({} / {})",
                    col,
                    100.0 * stats.win_ratio().unwrap_or(0.0),
                    stats.wins,
                    stats.plays
                );
            }
        }
    }
}

/// Agent that builds a fresh [`Mcts`] for every decision.
pub struct MctsAgent {
    config: MctsConfig,
    connect_n: usize,
}

impl MctsAgent {
    pub fn new(game: &GameConfig, config: MctsConfig) -> Result<Self, SearchError> {
        game.validate()?;
        config.validate()?;
        Ok(MctsAgent {
            config,
            connect_n: game.connect_n,
        })
    }
}

impl Agent for MctsAgent {
    fn generate_move(
        &mut self,
        board: &Board,
        player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(usize, Option<SavedState>), SearchError> {
        let to_move = board.player_to_move();
        if player != to_move {
            warn!(
                "Asked to move for {} but piece counts give the turn to {}",
                player.name(),
                to_move.name()
            );
        }

        let mut engine = Mcts::new(&self.config, self.connect_n)?;
        let passthrough = if self.config.retain_statistics {
            if let Some(state) = saved_state {
                match state.downcast::<StatisticsTable>() {
                    Ok(table) => engine = engine.with_statistics(*table),
                    Err(_) => warn!("Ignoring saved state that is not an MCTS statistics table"),
                }
            }
            None
        } else {
            saved_state
        };

        let report = engine.search(board)?;
        let col = report.best_action().ok_or(SearchError::NoLegalMove)?;
        debug!("MCTS plays column {} for {}", col, to_move.name());

        let saved = if self.config.retain_statistics {
            Some(Box::new(engine.into_statistics()) as SavedState)
        } else {
            passthrough
        };
        Ok((col, saved))
    }

    fn name(&self) -> &str {
        "MCTS"
    }
}
