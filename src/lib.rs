//! # Connect-N Search
//!
//! Move generators for Connect-N on a gravity board: depth-limited minimax
//! with alpha-beta pruning, and Monte Carlo tree search with UCB1 selection.
//! Both implement the [`ai::Agent`] contract; the game loop that calls them
//! lives outside this crate.
//!
//! ## Modules
//!
//! - [`game`]: Board, players, legality and win/draw detection
//! - [`ai`]: Agent trait, heuristic, minimax and MCTS engines
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
