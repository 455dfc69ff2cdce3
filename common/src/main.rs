use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;
use minesweeper_kb::{Board, Bot, GameState, Move};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Autonomous Minesweeper bot: probes cells its knowledge base proves safe and
/// guesses only when nothing can be proven.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of rows on the board
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Number of columns on the board
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Number of mines placed on the board
    #[arg(long, default_value_t = 8)]
    mines: usize,

    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut wins = 0;
    for game in 1..=args.games {
        let board = Board::new(args.height, args.width, args.mines, &mut rng)
            .context("failed to create board")?;
        let state = play_game(Bot::new(board), &mut rng, Duration::from_millis(args.delay_ms))
            .with_context(|| format!("game {game} failed"))?;

        match state {
            GameState::Won => {
                wins += 1;
                info!("game {game}: won");
            }
            GameState::Lost => info!("game {game}: hit a mine"),
            GameState::Playing => info!("game {game}: ended unexpectedly"),
        }
    }

    println!("Won {wins} of {} games", args.games);
    Ok(())
}

fn play_game(mut bot: Bot, rng: &mut StdRng, delay: Duration) -> anyhow::Result<GameState> {
    let mut move_count = 0;
    while let Some(next) = bot.step(rng)? {
        move_count += 1;
        match next {
            Move::Safe(point) => info!("move {move_count}: {point} is known to be safe"),
            Move::Guess(point) => info!("move {move_count}: no safe cell known, guessing {point}"),
        }

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    info!(
        "{} mines identified after {move_count} moves",
        bot.knowledge.mines().len()
    );
    Ok(bot.state)
}
