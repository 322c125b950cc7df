//! Interactive session: paste a transcript, then refine or inspect drafts.

mod command;
mod helper;

use std::path::Path;

use angles_application::SessionManager;
use angles_application::prompts::direction_label;
use angles_core::{DraftPost, MediaAttachment, SourceInput};
use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;

use crate::render::{render_draft, render_drafts};
use command::ReplCommand;
use helper::CliHelper;

const HELP: &str = "\
  <text>                 analyze pasted transcript text
  /load <file>           analyze a transcript file
  /media <file|none>     attach an image or clip to the next analysis
  /url <url|none>        reference video URL for the next analysis
  /refine narrow|broad   ask for more drafts in new communities
  /list                  show all drafts
  /show <n>              show draft n
  /reset                 clear drafts (startup --media/--url are kept)
  /quit                  exit";

/// Source details set between analyses.
#[derive(Debug, Clone)]
struct PendingSource {
    media: Option<MediaAttachment>,
    url: Option<String>,
}

impl PendingSource {
    fn build(&self, transcript: String) -> angles_core::Result<SourceInput> {
        let mut input = SourceInput::new(transcript)?;
        if let Some(media) = &self.media {
            input = input.with_media(media.clone());
        }
        if let Some(url) = &self.url {
            input = input.with_reference_url(url.as_str());
        }
        Ok(input)
    }
}

/// Pending source plus the values given on the command line, which `/reset`
/// restores.
struct ReplState {
    pending: PendingSource,
    startup: PendingSource,
}

impl ReplState {
    fn new(media: Option<MediaAttachment>, url: Option<String>) -> Self {
        let startup = PendingSource { media, url };
        Self {
            pending: startup.clone(),
            startup,
        }
    }

    fn reset(&mut self) {
        self.pending = self.startup.clone();
    }
}

fn attached_message(media: &MediaAttachment) -> String {
    format!(
        "Attached {} ({})",
        media.file_name.as_deref().unwrap_or("media"),
        media.mime_type
    )
}

fn url_message(url: Option<&str>) -> String {
    match url {
        Some(url) => format!("Reference URL set to {url}"),
        None => "Reference URL cleared.".to_string(),
    }
}

fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

fn print_drafts(drafts: &[DraftPost]) {
    if drafts.is_empty() {
        println!("{}", "No drafts yet. Paste a transcript to start.".bright_black());
    } else {
        print!("{}", render_drafts(drafts));
    }
}

async fn analyze(manager: &SessionManager, pending: &PendingSource, transcript: String) {
    let input = match pending.build(transcript) {
        Ok(input) => input,
        Err(err) => return print_error(&err.to_string()),
    };

    println!("{}", "Analyzing...".bright_black());
    match manager.analyze(input).await {
        Ok(drafts) => print_drafts(&drafts),
        Err(err) => {
            tracing::debug!("analysis error: {err}");
            print_error(&manager.last_error().await.unwrap_or_else(|| err.to_string()));
        }
    }
}

async fn handle(manager: &SessionManager, state: &mut ReplState, command: ReplCommand) {
    match command {
        ReplCommand::Transcript(text) => analyze(manager, &state.pending, text).await,
        ReplCommand::Load(path) => match std::fs::read_to_string(&path) {
            Ok(text) => analyze(manager, &state.pending, text).await,
            Err(err) => print_error(&format!("Failed to read {path}: {err}")),
        },
        ReplCommand::Media(None) => {
            state.pending.media = None;
            println!("{}", "Media cleared.".bright_black());
        }
        ReplCommand::Media(Some(path)) => match MediaAttachment::from_path(Path::new(&path)).await {
            Ok(media) => {
                println!("{}", attached_message(&media).bright_black());
                state.pending.media = Some(media);
            }
            Err(err) => print_error(&err.to_string()),
        },
        ReplCommand::Url(url) => {
            println!("{}", url_message(url.as_deref()).bright_black());
            state.pending.url = url;
        }
        ReplCommand::Refine(direction) => {
            println!(
                "{}",
                format!("Refining ({})...", direction_label(direction)).bright_black()
            );
            let before = manager.drafts().await.len();
            match manager.refine(direction).await {
                Ok(0) => println!("{}", "No new communities found.".yellow()),
                Ok(appended) => {
                    let drafts = manager.drafts().await;
                    for (i, draft) in drafts.iter().enumerate().skip(before) {
                        print!("{}", render_draft(i, draft));
                    }
                    println!("{}", format!("Added {appended} draft(s).").green());
                }
                Err(err) if err.is_generation() => {
                    tracing::debug!("refinement error: {err}");
                    print_error(&manager.last_error().await.unwrap_or_else(|| err.to_string()));
                }
                Err(err) => print_error(&err.to_string()),
            }
        }
        ReplCommand::List => print_drafts(&manager.drafts().await),
        ReplCommand::Show(n) => match manager.drafts().await.get(n - 1) {
            Some(draft) => {
                print!("{}", render_draft(n - 1, draft));
                println!();
                println!("{}", "Copy text:".bright_black());
                println!("{}", draft.to_clipboard_text());
            }
            None => print_error(&format!("No draft #{n}")),
        },
        ReplCommand::Reset => {
            manager.reset().await;
            state.reset();
            println!("{}", "Session reset.".bright_black());
        }
        ReplCommand::Help => println!("{}", HELP.bright_black()),
        ReplCommand::Quit => {}
    }
}

/// Runs the REPL until `/quit` or end of input.
pub async fn run(
    manager: &SessionManager,
    media: Option<MediaAttachment>,
    url: Option<String>,
) -> Result<()> {
    let mut state = ReplState::new(media, url);

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    println!("{}", "=== Angles ===".bright_magenta().bold());
    println!(
        "{}",
        "Paste a transcript to generate drafts, '/help' for commands, or '/quit' to exit."
            .bright_black()
    );
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed.parse::<ReplCommand>() {
                    Ok(ReplCommand::Quit) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Ok(command) => handle(manager, &mut state, command).await,
                    Err(message) => print_error(&message),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                print_error(&format!("Error: {err:?}"));
                break;
            }
        }
    }

    Ok(())
}
