use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use angles_application::{AngleGenerator, SessionManager};
use angles_core::{Direction, MediaAttachment};
use angles_interaction::{GeminiApiAgent, GenerativeModel};

mod commands;
mod render;
mod repl;

#[derive(Parser)]
#[command(name = "angles")]
#[command(about = "Turn a video transcript into community-targeted post drafts", long_about = None)]
struct Cli {
    /// Log progress to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Gemini model name (defaults to ANGLES_MODEL or gemini-2.5-flash)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate drafts once and print them
    Generate {
        /// Transcript file, or '-' for stdin
        #[arg(short, long)]
        transcript: PathBuf,

        /// Image or clip sent with the transcript (image/*, mp4, webm)
        #[arg(short, long)]
        media: Option<PathBuf>,

        /// Link to the source video
        #[arg(short, long)]
        url: Option<String>,

        /// Refinement rounds to run after the first pass, in order
        #[arg(short, long, value_name = "narrow|broad")]
        refine: Vec<Direction>,

        /// Print drafts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive session
    Interactive {
        /// Image or clip attached to every analysis
        #[arg(short, long)]
        media: Option<PathBuf>,

        /// Link to the source video
        #[arg(short, long)]
        url: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn session_manager(model_override: Option<String>) -> SessionManager {
    let mut agent = GeminiApiAgent::from_env();
    if let Some(model) = model_override {
        agent = agent.with_model(model);
    }
    tracing::info!("[Angles] Using model {}", agent.model_name());
    SessionManager::new(Arc::new(AngleGenerator::new(Arc::new(agent))))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let manager = session_manager(cli.model);

    match cli.command {
        Commands::Generate {
            transcript,
            media,
            url,
            refine,
            json,
        } => {
            commands::generate::run(
                &manager,
                commands::generate::GenerateArgs {
                    transcript,
                    media,
                    url,
                    refine,
                    json,
                },
            )
            .await?
        }
        Commands::Interactive { media, url } => {
            let media = match media {
                Some(path) => Some(MediaAttachment::from_path(&path).await?),
                None => None,
            };
            repl::run(&manager, media, url).await?
        }
    }

    Ok(())
}
