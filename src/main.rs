use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::io;
use std::path::{Path, PathBuf};

use typist::config::Config;
use typist::frame::FrameLoop;
use typist::playback::{CancelToken, Player};
use typist::script::{Script, Typist};
use typist::surface::{shared, TerminalLine};
use typist::text_diff::{compute_text_diff, edit_steps};

#[derive(Parser)]
#[command(name = "typist")]
#[command(about = "Type and delete text like a human would", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.typist/settings.yaml
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a typing script on the current terminal line
    Play {
        /// Texts to type; whole numbers are pauses in milliseconds
        #[arg(required = true)]
        items: Vec<String>,
        /// Start over when the script ends
        #[arg(long = "loop")]
        repeat: bool,
        /// Base delay between steps in milliseconds
        #[arg(short, long)]
        speed: Option<u64>,
        /// How far each delay may vary, as a fraction of the speed
        #[arg(short, long)]
        jitter: Option<f64>,
    },
    /// Print the edit steps between two texts
    Steps {
        current: String,
        target: String,
    },
    /// Show the config file location and effective settings
    Config,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config_file {
        Some(path) => Config::load(path)?,
        None => Config::load_or_create()?,
    };

    match cli.command {
        Commands::Play { items, repeat, speed, jitter } => {
            play_command(&config, &items, repeat, speed, jitter)
        }
        Commands::Steps { current, target } => {
            steps_command(&current, &target);
            Ok(())
        }
        Commands::Config => config_command(cli.config_file.as_deref(), &config),
    }
}

fn play_command(
    config: &Config,
    items: &[String],
    repeat: bool,
    speed: Option<u64>,
    jitter: Option<f64>,
) -> Result<()> {
    let mut playback = config.playback.clone();
    if let Some(speed) = speed {
        playback.speed_ms = speed;
    }
    if let Some(jitter) = jitter {
        playback.jitter = jitter;
    }
    Config { playback: playback.clone() }
        .validate()
        .context("Invalid playback options")?;

    let mut script = Script::parse_args(items);
    if repeat {
        script = script.repeat();
    }

    let surface = shared(TerminalLine::new(io::stdout()));
    let frames = FrameLoop::start(playback.frame_interval())?;
    let player = Player::new(playback.pacing());
    let mut typist = Typist::new(surface, frames, player);

    let outcome = typist.run(&mut script, &CancelToken::new())?;
    typist.into_frames().shutdown()?;
    println!();

    info!("⌨️  Played {} steps", outcome.steps());
    Ok(())
}

fn steps_command(current: &str, target: &str) {
    let diff = compute_text_diff(current, target);
    println!("Overlap: {} codepoints", diff.overlap);
    println!("Delete:  {} codepoints", diff.chars_to_delete);
    println!("Write:   {} codepoints", diff.chars_to_write);
    println!("─────────────────────────────────────────────────────");
    for (i, step) in edit_steps(current, target).enumerate() {
        println!("{:4}  {:?}", i + 1, step);
    }
}

fn config_command(path: Option<&Path>, config: &Config) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };
    let pacing = config.playback.pacing();

    println!("Config file: {}", path.display());
    println!("  speed:          {:?}", pacing.speed);
    println!("  jitter:         ±{:.0}%", pacing.jitter * 100.0);
    println!("  frame interval: {:?}", config.playback.frame_interval());
    println!(
        "  delay range:    {:?} .. {:?}",
        pacing.speed.mul_f64(1.0 - pacing.jitter),
        pacing.speed.mul_f64(1.0 + pacing.jitter)
    );
    Ok(())
}
