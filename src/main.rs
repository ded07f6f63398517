use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use connectn_search::ai::{Agent, MctsAgent, MinimaxAgent, SearchBudget};
use connectn_search::config::AppConfig;
use connectn_search::game::Board;

/// Suggest one move for a Connect-N position.
#[derive(Parser)]
#[command(name = "connectn-search", about = "Suggest a Connect-N move")]
struct Cli {
    /// Engine to ask: minimax or mcts
    #[arg(long, default_value = "minimax")]
    engine: String,

    /// Board rows top to bottom, '/' separated; '.' empty, 'X' first player,
    /// 'O' second player. Defaults to the empty board from the config.
    #[arg(long)]
    board: Option<String>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override minimax search depth
    #[arg(long)]
    depth: Option<u32>,

    /// Override MCTS budget with a fixed number of simulations
    #[arg(long)]
    simulations: Option<u32>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if cli.print_config {
        print!("{}", AppConfig::default_toml()?);
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(depth) = cli.depth {
        config.minimax.depth = depth;
    }
    if let Some(simulations) = cli.simulations {
        config.mcts.budget = SearchBudget::Simulations(simulations);
    }
    config.validate().context("validating configuration")?;

    let board = match &cli.board {
        Some(text) => text.parse::<Board>().context("parsing --board")?,
        None => config.game.empty_board()?,
    };
    if board.rows() != config.game.rows || board.cols() != config.game.cols {
        bail!(
            "board is {}x{} but the config expects {}x{}",
            board.rows(),
            board.cols(),
            config.game.rows,
            config.game.cols
        );
    }

    let mut agent: Box<dyn Agent> = match cli.engine.as_str() {
        "minimax" => Box::new(MinimaxAgent::new(&config.game, &config.minimax)?),
        "mcts" => Box::new(MctsAgent::new(&config.game, config.mcts.clone())?),
        other => bail!("unknown engine '{}' (expected 'minimax' or 'mcts')", other),
    };

    let player = board.player_to_move();
    let (col, _) = agent
        .generate_move(&board, player, None)
        .with_context(|| format!("{} failed to pick a move", agent.name()))?;
    info!("{} chose column {} for player {}", agent.name(), col, player.name());
    println!("{col}");
    Ok(())
}
