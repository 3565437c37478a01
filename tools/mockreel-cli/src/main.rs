//! MockReel CLI: plan, record, and inspect phone-mockup storyboards.
//!
//! Usage:
//!   mockreel init <PATH>          Write a sample storyboard
//!   mockreel info <STORYBOARD>    Show the scenes of a storyboard
//!   mockreel plan <STORYBOARD>    Print the recording timeline
//!   mockreel record <STORYBOARD>  Record a full pass over every scene
//!   mockreel check                Check capture capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mockreel_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "mockreel",
    about = "Phone-mockup promo videos from app screenshots",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an automated pass over every scene
    Record {
        /// Path to the storyboard JSON
        storyboard: PathBuf,

        /// Directory to write the video to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Capture backend: simulated or gstreamer
        #[arg(long, default_value = "simulated")]
        backend: String,

        /// Stage region on screen as x,y,width,height
        #[arg(long)]
        stage: Option<String>,

        /// Pace the pass in wall-clock time
        #[arg(long)]
        realtime: bool,

        /// Record the full surface even when cropping is available
        #[arg(long)]
        no_crop: bool,

        /// Container preference, e.g. --formats video/webm,video/mp4
        #[arg(long, value_delimiter = ',')]
        formats: Vec<String>,
    },

    /// Print the timeline a recording pass would follow
    Plan {
        /// Path to the storyboard JSON
        storyboard: PathBuf,

        /// Emit the timeline as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the scenes of a storyboard
    Info {
        /// Path to the storyboard JSON
        storyboard: PathBuf,
    },

    /// Check capture capabilities
    Check {
        /// Capture backend to probe
        #[arg(long, default_value = "simulated")]
        backend: String,
    },

    /// Write a sample storyboard
    Init {
        /// Where to write the storyboard
        path: PathBuf,

        /// Storyboard name
        #[arg(short, long, default_value = "My App")]
        name: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    mockreel_common::logging::init_logging(&config.logging)?;
    tracing::debug!(output_dir = %config.output_dir.display(), "Loaded config");

    match cli.command {
        Commands::Record {
            storyboard,
            output,
            backend,
            stage,
            realtime,
            no_crop,
            formats,
        } => {
            commands::record::run(
                &config,
                commands::record::RecordArgs {
                    storyboard,
                    output,
                    backend,
                    stage,
                    realtime,
                    no_crop,
                    formats,
                },
            )
            .await
        }
        Commands::Plan { storyboard, json } => commands::plan::run(&config, storyboard, json).await,
        Commands::Info { storyboard } => commands::info::run(storyboard),
        Commands::Check { backend } => commands::check::run(&config, &backend),
        Commands::Init { path, name, force } => commands::init::run(path, name, force),
    }
}
