use std::io::Read;
use std::path::{Path, PathBuf};

use angles_application::SessionManager;
use angles_core::{Direction, MediaAttachment, SourceInput};
use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::render::render_drafts;

pub struct GenerateArgs {
    pub transcript: PathBuf,
    pub media: Option<PathBuf>,
    pub url: Option<String>,
    pub refine: Vec<Direction>,
    pub json: bool,
}

/// Reads the transcript from a file, or stdin when the path is `-`.
pub fn read_transcript(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read transcript from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript {}", path.display()))
}

/// Builds the source input from CLI arguments.
pub async fn build_input(
    transcript: String,
    media: Option<&Path>,
    url: Option<&str>,
) -> Result<SourceInput> {
    let mut input = SourceInput::new(transcript)?;
    if let Some(path) = media {
        input = input.with_media(MediaAttachment::from_path(path).await?);
    }
    if let Some(url) = url {
        input = input.with_reference_url(url);
    }
    Ok(input)
}

/// One-shot generation followed by optional refinement rounds.
pub async fn run(manager: &SessionManager, args: GenerateArgs) -> Result<()> {
    let transcript = read_transcript(&args.transcript)?;
    let input = build_input(transcript, args.media.as_deref(), args.url.as_deref()).await?;

    if let Err(err) = manager.analyze(input).await {
        tracing::debug!("analysis error: {err}");
        let message = manager.last_error().await.unwrap_or_else(|| err.to_string());
        bail!(message);
    }

    for direction in args.refine {
        if !args.json {
            eprintln!(
                "{}",
                format!(
                    "Refining ({})...",
                    angles_application::prompts::direction_label(direction)
                )
                .bright_black()
            );
        }
        if let Err(err) = manager.refine(direction).await {
            tracing::debug!("refinement error: {err}");
            let message = manager.last_error().await.unwrap_or_else(|| err.to_string());
            eprintln!("{}", message.red());
        }
    }

    let drafts = manager.drafts().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&drafts)?);
    } else {
        print!("{}", render_drafts(&drafts));
    }
    Ok(())
}
