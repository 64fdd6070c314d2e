//! chordline - chord timeline and key analysis from the command line
//!
//! Subcommands:
//! - `chordline decode <features.json>` - Decode a beat-feature file
//! - `chordline analyze <source-ref>` - Analyze a song from the audio directory
//! - `chordline templates` - List chord templates
//! - `chordline config` - Show the effective configuration

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chordconf::ChordConfig;
use chordline::commands::{self, Overrides};
use chordline::telemetry;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chordline")]
#[command(about = "Chord timeline and key analysis for beat-synchronous chroma")]
#[command(version)]
struct Cli {
    /// Config file, replacing ./chordline.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Cost of changing chord between beats
    #[arg(long, global = true)]
    switch_penalty: Option<f64>,

    /// Shortest segment kept, in seconds
    #[arg(long, global = true)]
    min_duration: Option<f64>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a beat-feature JSON file (chroma, beat_times, tempo)
    Decode {
        /// Path to the feature file
        features: PathBuf,
    },

    /// Analyze a song by reference, resolved against the audio directory
    Analyze {
        /// File name or absolute path of the audio
        source_ref: String,
    },

    /// List the 24 chord templates
    Templates,

    /// Show the effective configuration as TOML
    Config,
}

fn run(cli: Cli) -> Result<String> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }

    let (config, sources) = ChordConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load config")?;
    telemetry::init(&config.telemetry.log_level);

    let overrides = Overrides {
        switch_penalty: cli.switch_penalty,
        min_duration: cli.min_duration,
    };

    match cli.command {
        Commands::Decode { features } => {
            commands::decode_file(&features, &config, &overrides, cli.pretty)
        }
        Commands::Analyze { source_ref } => {
            commands::analyze_source(&source_ref, &config, &overrides, cli.pretty)
        }
        Commands::Templates => Ok(commands::templates()),
        Commands::Config => Ok(commands::show_config(&config, &sources)),
    }
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
