//! nether-gltf - glTF 2.0 / GLB inspection and conversion tool
//!
//! Decodes `.gltf` and `.glb` files, reports their binary layout, and
//! converts between the JSON and GLB container forms.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::ToolConfig;

#[derive(Parser)]
#[command(name = "nether-gltf")]
#[command(about = "glTF 2.0 / GLB inspection and conversion tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with [decode] / [encode] settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum number of external buffers to load
    #[arg(long, global = true)]
    max_external_buffers: Option<usize>,

    /// Maximum total declared buffer size in bytes
    #[arg(long, global = true)]
    max_memory: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print buffers, views, and accessors of a file
    Info {
        /// Input glTF/GLB file
        input: PathBuf,
    },

    /// Convert to GLB
    Pack {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .glb file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert to JSON glTF
    Unpack {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .gltf file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Embed the binary buffer as a data URI instead of writing a .bin
        #[arg(long)]
        embed: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ToolConfig::load_or_default(cli.config.as_deref())?
        .with_overrides(cli.max_external_buffers, cli.max_memory);

    match cli.command {
        Commands::Info { input } => {
            commands::info(&input, &config)?;
        }

        Commands::Pack { input, output } => {
            commands::pack(&input, output.as_deref(), &config)?;
            tracing::info!("Done!");
        }

        Commands::Unpack {
            input,
            output,
            embed,
        } => {
            commands::unpack(&input, output.as_deref(), embed, &config)?;
            tracing::info!("Done!");
        }
    }

    Ok(())
}
