//! goban-gtp: a GTP front end for a neural-network Go player.
//!
//! ## Usage
//!
//! - `goban-gtp` - Show a demo
//! - `goban-gtp gtp` - Start GTP server for GUI integration
//! - `goban-gtp demo` - Play a few random moves and print the game

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use goban_gtp::constants::DEFAULT_KOMI;
use goban_gtp::genmove::random_move;
use goban_gtp::gtp::{EngineConfig, GtpEngine};
use goban_gtp::history::Game;
use goban_gtp::model::{Difficulty, ModelSet};
use goban_gtp::position::str_coord;
use goban_gtp::sgf::save_sgf;

/// goban-gtp: Go Text Protocol engine backed by a policy network
#[derive(Parser)]
#[command(name = "goban-gtp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp(GtpArgs),
    /// Play a few random moves and print the result
    Demo,
}

#[derive(Args)]
struct GtpArgs {
    /// Playing strength
    #[arg(long, value_enum, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    #[arg(long, default_value_t = DEFAULT_KOMI)]
    komi: f32,

    /// Answer `pass` when no move is legal instead of forcing D10
    #[arg(long)]
    allow_pass: bool,

    /// Give up on a model call after this many milliseconds
    #[arg(long, value_name = "MS")]
    model_timeout_ms: Option<u64>,

    /// Seed for move sampling
    #[arg(long)]
    seed: Option<u64>,
}

impl From<GtpArgs> for EngineConfig {
    fn from(args: GtpArgs) -> Self {
        EngineConfig {
            difficulty: args.difficulty,
            komi: args.komi,
            allow_pass: args.allow_pass,
            model_timeout: args.model_timeout_ms.map(Duration::from_millis),
            seed: args.seed,
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    // stdout carries the protocol, so logs go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Some(Commands::Gtp(args)) => {
            let config = EngineConfig::from(args);
            // No weights ship with the binary; embedders attach models via `ModelSet::new`.
            warn!("no policy model loaded, moves will be chosen at random");
            info!("starting GTP session ({:?}, komi {})", config.difficulty, config.komi);
            let mut engine = GtpEngine::with_config(config, ModelSet::unavailable());
            engine.run().context("GTP session failed")?;
        }
        Some(Commands::Demo) | None => run_demo()?,
    }
    Ok(())
}

fn run_demo() -> anyhow::Result<()> {
    println!("goban-gtp: Go Text Protocol engine\n");

    let mut game = Game::new();
    let mut rng = fastrand::Rng::new();
    for _ in 0..8 {
        let side = game.side();
        let pt = random_move(&mut game, side, &mut rng)?;
        println!("{side} plays {}", str_coord(pt));
    }

    println!("\n{}\n", game.position());
    println!("SGF: {}", save_sgf(&game));
    Ok(())
}
