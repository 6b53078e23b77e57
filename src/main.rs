//! Tetris engine command-line tool.
//!
//! Inspects and resets the persisted records in `TETRIS_DATA_DIR`, and runs a
//! headless session driven by action names read line by line from stdin.

use std::future::Future;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use tetris_engine::driver::{Command, Driver, DriverConfig, DriverEvent};
use tetris_engine::store::{FileStore, Settings, Storage};
use tetris_engine::types::{AchievementId, GameAction};

#[derive(Debug, Parser)]
#[command(name = "tetris-engine")]
#[command(about = "Falling-block engine: records, settings and headless play")]
struct Cli {
    /// Data directory (overrides TETRIS_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lifetime stats and the best-runs table
    Stats,
    /// Unlocked and locked achievements
    Achievements,
    /// Show settings, or update them with key=value pairs
    Settings { assignments: Vec<String> },
    /// Reset persisted records (settings are kept)
    Reset {
        #[arg(value_enum)]
        target: ResetTarget,
    },
    /// Play a headless session; one action name per stdin line
    Play {
        /// Continue the saved game if there is one
        #[arg(long, default_value_t = false)]
        resume: bool,
        #[arg(long)]
        seed: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResetTarget {
    Stats,
    Achievements,
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("TETRIS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DriverConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let storage = Storage::new(FileStore::new(&config.data_dir));

    match cli.command {
        Commands::Stats => cmd_stats(&storage).await,
        Commands::Achievements => cmd_achievements(&storage).await,
        Commands::Settings { assignments } => cmd_settings(&storage, &assignments).await,
        Commands::Reset { target } => cmd_reset(&storage, target).await,
        Commands::Play { resume, seed } => {
            config.resume |= resume;
            if seed.is_some() {
                config.seed = seed;
            }
            cmd_play(storage, config).await
        }
    }
}

async fn cmd_stats(storage: &Storage<FileStore>) -> Result<()> {
    let stats = storage.load_stats().await;

    println!("Games played:      {}", stats.total_games_played);
    println!("Best score:        {}", stats.best_score);
    println!("Best level:        {}", stats.best_level);
    println!("Most rows cleared: {}", stats.most_rows_cleared);
    println!("Best combo:        {}", stats.best_combo);
    println!("Total score:       {}", stats.total_score);
    println!("Total play time:   {}", format_play_time(stats.total_play_time_ms));

    if stats.best_runs.is_empty() {
        return Ok(());
    }
    println!();
    println!("Best runs:");
    for (rank, run) in stats.best_runs.iter().enumerate() {
        println!(
            "  {}. {:>8}  level {:>2}  rows {:>3}  {:>9}  {:<7}  {}",
            rank + 1,
            run.score,
            run.level,
            run.rows_cleared,
            format_play_time(run.play_time_ms),
            run.difficulty.as_str(),
            run.timestamp.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

async fn cmd_achievements(storage: &Storage<FileStore>) -> Result<()> {
    let record = storage.load_achievements().await;

    println!(
        "Unlocked {}/{}",
        record.unlocked.len(),
        record.total_achievements
    );
    for id in AchievementId::ALL {
        match record.unlocked_at(id) {
            Some(at) => println!(
                "  [x] {:<18} {}  ({})",
                id.name(),
                id.description(),
                at.format("%Y-%m-%d")
            ),
            None if id.is_secret() => println!("  [ ] {:<18} ???", "???"),
            None => println!("  [ ] {:<18} {}", id.name(), id.description()),
        }
    }
    Ok(())
}

async fn cmd_settings(storage: &Storage<FileStore>, assignments: &[String]) -> Result<()> {
    let mut settings = storage.load_settings().await;

    if !assignments.is_empty() {
        for assignment in assignments {
            let Some((key, value)) = assignment.split_once('=') else {
                bail!("Expected key=value, got {:?}", assignment);
            };
            settings.apply(key.trim(), value.trim())?;
        }
        if !storage.save_settings(&settings).await {
            bail!("Failed to save settings");
        }
    }

    print_settings(&settings);
    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("difficulty           = {}", settings.difficulty.as_str());
    println!("visualEffectsEnabled = {}", settings.visual_effects_enabled);
    println!("colorPalette         = {}", settings.color_palette.as_str());
    println!("controlMode          = {}", settings.control_mode.as_str());
    println!("pauseKey             = {}", settings.pause_key);
    println!("primaryKey           = {}", settings.primary_key);
    println!("secondaryKey         = {}", settings.secondary_key);
}

async fn cmd_reset(storage: &Storage<FileStore>, target: ResetTarget) -> Result<()> {
    let ok = match target {
        ResetTarget::Stats => storage.reset_stats().await,
        ResetTarget::Achievements => storage.reset_achievements().await,
        ResetTarget::All => storage.reset_all().await,
    };
    if !ok {
        bail!("Failed to reset {:?}", target);
    }
    println!("Reset {:?}", target);
    Ok(())
}

async fn cmd_play(storage: Storage<FileStore>, config: DriverConfig) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let driver = Driver::load(storage, &config).await.with_events(event_tx);
    let view = driver.view();
    println!(
        "Started: level {}, score {}, next {:?}",
        view.level,
        view.score,
        view.next.iter().map(|p| p.kind.as_str()).collect::<Vec<_>>()
    );

    let (tx, rx) = mpsc::channel::<Command>(32);
    let game = tokio::spawn(driver.run(rx));
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                DriverEvent::LineClear {
                    clear,
                    points,
                    combo,
                } => println!("{} +{} (combo {})", clear.name(), points, combo),
                DriverEvent::AchievementUnlocked(id) => println!("Achievement: {}", id.name()),
                DriverEvent::GameOver(summary) => println!("Game over at {}", summary.score),
            }
        }
    });

    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let forwarded = forward_commands(BufReader::new(tokio::io::stdin()), &tx, interrupt).await;
    drop(tx);

    let summary = game.await.context("Session task failed")?;
    printer.await.context("Event printer failed")?;
    forwarded?;

    if let Some(summary) = summary {
        println!(
            "Score {}  level {}  rows {}  best combo {}  time {}",
            summary.score,
            summary.level,
            summary.rows_cleared,
            summary.best_combo,
            format_play_time(summary.play_time_ms)
        );
    }
    Ok(())
}

/// Forward parsed input lines to the session until input ends, the session
/// stops, or `interrupt` fires. An interrupt tears the session down with
/// `Command::Exit` so the run is still recorded.
async fn forward_commands<R>(
    input: R,
    tx: &mpsc::Sender<Command>,
    interrupt: impl Future<Output = ()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    tokio::pin!(interrupt);
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tx.closed() => break,
            _ = &mut interrupt => {
                let _ = tx.send(Command::Exit).await;
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let Some(command) = parse_command(&line) else {
            if !line.trim().is_empty() {
                warn!(input = line.trim(), "unknown command");
            }
            continue;
        };
        if tx.send(command).await.is_err() || command == Command::Exit {
            break;
        }
    }
    Ok(())
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "pause" => Some(Command::Pause),
        "resume" => Some(Command::Resume),
        "exit" | "quit" => Some(Command::Exit),
        other => GameAction::from_str(other).map(Command::Action),
    }
}

fn format_play_time(ms: u64) -> String {
    let secs = ms / 1000;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{:02}m{:02}s", h, m, s)
    } else {
        format!("{}m{:02}s", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("hardDrop"), Some(Command::Action(GameAction::HardDrop)));
        assert_eq!(parse_command("  PAUSE "), Some(Command::Pause));
        assert_eq!(parse_command("quit"), Some(Command::Exit));
        assert_eq!(parse_command("restart"), None);
    }

    #[tokio::test]
    async fn test_forward_commands_stops_at_exit() {
        let (tx, mut rx) = mpsc::channel(8);
        let input: &[u8] = b"hardDrop\nbogus\n\nexit\nrotate\n";
        forward_commands(input, &tx, std::future::pending())
            .await
            .unwrap();
        drop(tx);

        assert_eq!(rx.recv().await, Some(Command::Action(GameAction::HardDrop)));
        assert_eq!(rx.recv().await, Some(Command::Exit));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_interrupt_sends_exit_while_input_is_idle() {
        let (tx, mut rx) = mpsc::channel(8);
        // The writer stays open, so stdin never reaches end of input.
        let (_writer, reader) = tokio::io::duplex(64);
        forward_commands(BufReader::new(reader), &tx, async {})
            .await
            .unwrap();
        drop(tx);

        assert_eq!(rx.recv().await, Some(Command::Exit));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_format_play_time() {
        assert_eq!(format_play_time(0), "0m00s");
        assert_eq!(format_play_time(61_500), "1m01s");
        assert_eq!(format_play_time(3_723_000), "1h02m03s");
    }
}
