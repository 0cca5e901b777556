use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voxcast_client::{ClientProjection, ProjectionConfig};
use voxcast_common::Timestamp;

mod script;

use script::Script;

#[derive(Parser)]
#[command(name = "voxcast-cli", about = "CLI tool for the voxcast client projection")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the default projection config
    Info,
    /// Replay a recorded session script
    Replay {
        /// JSON session script
        #[arg(short, long)]
        script: PathBuf,
        /// YAML projection config; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Milliseconds between rendered frames
        #[arg(long, default_value = "16")]
        frame_ms: u64,
    },
    /// Run the built-in demo session
    Demo {
        /// Milliseconds between rendered frames
        #[arg(long, default_value = "50")]
        frame_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("voxcast-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("cache: {}", voxcast_cache::crate_info());
            println!("raycast: {}", voxcast_raycast::crate_info());
            println!("particles: {}", voxcast_particles::crate_info());
            println!("animation: {}", voxcast_animation::crate_info());
            println!("client: {}", voxcast_client::crate_info());
            println!("default config:");
            print!("{}", ProjectionConfig::default().to_yaml_string()?);
        }
        Commands::Replay {
            script,
            config,
            frame_ms,
        } => {
            let config = match config {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading config {}", path.display()))?;
                    ProjectionConfig::from_yaml_str(&text)?
                }
                None => ProjectionConfig::default(),
            };
            let script = Script::load(&script)?;
            tracing::info!(ticks = script.ticks.len(), until = %script.until, "replaying session");
            let mut projection = ClientProjection::new(config, script.local.clone(), Timestamp::ZERO)?;
            script::run(&script, &mut projection, frame_ms)?;
        }
        Commands::Demo { frame_ms } => {
            let script = Script::demo();
            let mut projection =
                ClientProjection::new(ProjectionConfig::default(), script.local.clone(), Timestamp::ZERO)?;
            script::run(&script, &mut projection, frame_ms)?;
        }
    }

    Ok(())
}
