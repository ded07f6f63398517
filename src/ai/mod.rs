mod agent;
pub mod heuristic;
pub mod mcts;
pub mod minimax;
pub mod statistics;

pub use agent::{Agent, SavedState};
pub use heuristic::{ConnectionHeuristic, Heuristic};
pub use mcts::{Mcts, MctsAgent, MctsConfig, MctsReport, SearchBudget};
pub use minimax::{minimax_values, MinimaxAgent, MinimaxConfig, MinimaxReport, MinimaxSearch};
pub use statistics::{NodeStats, StateKey, StatisticsTable};
