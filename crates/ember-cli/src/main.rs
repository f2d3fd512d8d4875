//! Ember CLI - Command-line interface for the Ember particle engine

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, simulate, triangulate};
use ember_core::Vec2;

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Headless 2D particle emitter simulation", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step a scene headlessly and report populations
    Simulate {
        /// Path to scene file
        scene: String,

        /// Simulated time in seconds
        #[arg(long, default_value = "2.0")]
        seconds: f32,

        /// Update rate
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Random seed (OS entropy when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Disable emission globally
        #[arg(long)]
        no_emit: bool,
    },

    /// Validate a scene and summarise its emitters
    Check {
        /// Path to scene file
        scene: String,
    },

    /// Triangulate a polygon given as x,y points
    Triangulate {
        /// Polygon vertices (e.g. 0,0 100,0 100,100)
        #[arg(value_parser = parse_vec2, num_args = 3.., required = true)]
        points: Vec<Vec2>,
    },
}

fn parse_vec2(s: &str) -> Result<Vec2, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("expected 2 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    Ok(Vec2::new(x, y))
}

fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    match (verbose, quiet) {
        (0, true) => log::LevelFilter::Error,
        (0, false) => log::LevelFilter::Warn,
        (1, _) => log::LevelFilter::Info,
        (2, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still wins when set
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level(cli.verbose, cli.quiet).as_str()),
    )
    .init();

    match cli.command {
        Commands::Simulate {
            scene,
            seconds,
            fps,
            seed,
            no_emit,
        } => simulate::run(simulate::SimulateArgs {
            scene,
            seconds,
            fps,
            seed,
            no_emit,
        }),
        Commands::Check { scene } => check::run(&scene),
        Commands::Triangulate { points } => triangulate::run(&points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_points() {
        assert_eq!(parse_vec2("1.5, -2").unwrap(), Vec2::new(1.5, -2.0));
        assert!(parse_vec2("1,2,3").is_err());
        assert!(parse_vec2("a,2").is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(log_level(0, false), log::LevelFilter::Warn);
        assert_eq!(log_level(0, true), log::LevelFilter::Error);
        assert_eq!(log_level(2, true), log::LevelFilter::Debug);
        assert_eq!(log_level(5, false), log::LevelFilter::Trace);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["ember", "-vv", "simulate", "scene.toml", "--seed", "3"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Simulate { seed: Some(3), fps: 60, .. }
        ));

        let cli = Cli::parse_from(["ember", "triangulate", "0,0", "10,0", "10,10"]);
        assert!(matches!(cli.command, Commands::Triangulate { ref points } if points.len() == 3));
    }
}
