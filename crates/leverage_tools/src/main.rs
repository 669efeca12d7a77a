//! Leverage development tools.
//!
//! # Usage
//!
//! ```bash
//! # Check every level under assets/levels
//! cargo run -p leverage_tools -- validate
//!
//! # Play over stdin/stdout, recording a replay
//! cargo run -p leverage_tools -- play --level assets/levels/city_hall.ron --seed 7 --record game.json
//!
//! # Run 1000 scripted playthroughs
//! cargo run -p leverage_tools -- simulate --level assets/levels/city_hall.ron --games 1000 --output results.json
//!
//! # Verify a replay
//! cargo run -p leverage_tools -- replay game.json
//! ```
//!
//! Logs go to stderr; stdout carries the play protocol.

use std::io;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leverage_core::data::LevelData;
use leverage_tools::batch::{run_batch, BatchConfig};
use leverage_tools::level_loader::{load_level, DEFAULT_LEVEL_DIR};
use leverage_tools::protocol::{run_session, Session};
use leverage_tools::replay_file::{save_replay, verify_replay_file};
use leverage_tools::strategies::Strategy;
use leverage_tools::validate::validate_path;

#[derive(Parser)]
#[command(name = "leverage-tools")]
#[command(about = "Development tools for Leverage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate level files
    Validate {
        /// Level file or directory
        #[arg(default_value = DEFAULT_LEVEL_DIR)]
        path: PathBuf,
    },
    /// Play a level over JSON lines on stdin/stdout
    Play {
        /// Level file
        #[arg(short, long)]
        level: PathBuf,
        /// World seed
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Write the session's replay here on exit
        #[arg(short, long)]
        record: Option<PathBuf>,
    },
    /// Run scripted playthroughs across many seeds
    Simulate {
        /// Level file
        #[arg(short, long)]
        level: PathBuf,
        /// Number of games
        #[arg(short, long, default_value_t = 100)]
        games: u32,
        /// First seed
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Day limit per game
        #[arg(long, default_value_t = 60)]
        max_days: u32,
        /// Strategy preset (greedy, cautious)
        #[arg(long, default_value = "greedy")]
        strategy: String,
        /// Run games one at a time
        #[arg(long)]
        sequential: bool,
        /// Write results JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-run a replay and check its final state
    Replay {
        /// Replay file
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => cmd_validate(&path),
        Commands::Play {
            level,
            seed,
            record,
        } => cmd_play(&level, seed, record.as_deref()),
        Commands::Simulate {
            level,
            games,
            seed,
            max_days,
            strategy,
            sequential,
            output,
        } => {
            let Some(strategy) = Strategy::by_name(&strategy) else {
                fail(&format!("Unknown strategy: {strategy}"));
            };
            let mut config = BatchConfig::new(games)
                .with_seed(seed)
                .with_max_days(max_days)
                .with_strategy(strategy);
            if sequential {
                config = config.sequential();
            }
            cmd_simulate(&level, &config, output.as_deref());
        }
        Commands::Replay { file } => match verify_replay_file(&file) {
            Ok(hash) => tracing::info!("Replay verified, final hash {hash:#018x}"),
            Err(e) => fail(&format!("Replay failed: {e}")),
        },
    }
}

fn fail(message: &str) -> ! {
    tracing::error!("{message}");
    exit(1);
}

fn load_or_exit(path: &Path) -> LevelData {
    load_level(path).unwrap_or_else(|e| fail(&e.to_string()))
}

fn cmd_validate(path: &Path) {
    tracing::info!("Validating levels in: {}", path.display());
    let report = match validate_path(path) {
        Ok(report) => report,
        Err(e) => fail(&format!("Validation failed: {e}")),
    };

    for file in &report.files {
        let name = file.level.as_deref().unwrap_or("?");
        for warning in &file.warnings {
            tracing::warn!("{} ({name}): {warning}", file.path.display());
        }
        for error in &file.errors {
            tracing::error!("{} ({name}): {error}", file.path.display());
        }
    }

    if report.is_ok() {
        tracing::info!(
            files = report.files.len(),
            warnings = report.warning_count(),
            "Validation passed"
        );
    } else {
        fail(&format!(
            "Validation failed with {} error(s)",
            report.error_count()
        ));
    }
}

fn cmd_play(level: &Path, seed: u64, record: Option<&Path>) {
    let level = load_or_exit(level);
    let session = Session::new(level, seed).unwrap_or_else(|e| fail(&e.to_string()));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let replay = match run_session(session, stdin.lock(), &mut stdout) {
        Ok(replay) => replay,
        Err(e) => fail(&format!("Protocol IO failed: {e}")),
    };

    if let Some(path) = record {
        match save_replay(&replay, path) {
            Ok(()) => tracing::info!("Replay written to {}", path.display()),
            Err(e) => fail(&e.to_string()),
        }
    }
}

fn cmd_simulate(level: &Path, config: &BatchConfig, output: Option<&Path>) {
    let level = load_or_exit(level);
    let results = run_batch(&level, config);

    let summary = &results.summary;
    println!("Level: {}", results.level);
    println!("Strategy: {}", config.strategy.name);
    println!("Games: {}", summary.games);
    println!(
        "Wins: {} ({:.1}%)",
        summary.wins,
        summary.win_rate * 100.0
    );
    println!("Losses: {}", summary.losses);
    println!("Ongoing: {}", summary.ongoing);
    println!("Average days: {:.2}", summary.avg_days);
    println!("Duration: {:.2}s", results.duration_seconds);

    if let Some(path) = output {
        if let Err(e) = results.save(path) {
            fail(&format!("Failed to write results: {e}"));
        }
        tracing::info!("Results written to {}", path.display());
    }

    if !results.errors.is_empty() {
        fail(&format!("{} game(s) failed", results.errors.len()));
    }
}
