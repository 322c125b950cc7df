use std::str::FromStr;

use angles_core::Direction;

/// Slash commands understood by the REPL, used for completion and hints.
pub const COMMANDS: &[&str] = &[
    "/refine narrow",
    "/refine broad",
    "/list",
    "/show",
    "/load",
    "/media",
    "/url",
    "/reset",
    "/help",
    "/quit",
];

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text: analyze it as a transcript.
    Transcript(String),
    /// Read a transcript file and analyze it.
    Load(String),
    /// Attach media to the next analysis (`None` clears it).
    Media(Option<String>),
    /// Reference video URL for the next analysis (`None` clears it).
    Url(Option<String>),
    Refine(Direction),
    List,
    /// 1-based draft number.
    Show(usize),
    Reset,
    Help,
    Quit,
}

impl FromStr for ReplCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if !line.starts_with('/') {
            if line == "quit" || line == "exit" {
                return Ok(Self::Quit);
            }
            return Ok(Self::Transcript(line.to_string()));
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        let optional = |arg: &str| match arg {
            "" | "none" => None,
            other => Some(other.to_string()),
        };

        match name {
            "/refine" => arg
                .parse::<Direction>()
                .map(Self::Refine)
                .map_err(|_| "usage: /refine narrow|broad".to_string()),
            "/list" => Ok(Self::List),
            "/show" => arg
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Self::Show)
                .ok_or_else(|| "usage: /show <number>".to_string()),
            "/load" if !arg.is_empty() => Ok(Self::Load(arg.to_string())),
            "/load" => Err("usage: /load <transcript file>".to_string()),
            "/media" => Ok(Self::Media(optional(arg))),
            "/url" => Ok(Self::Url(optional(arg))),
            "/reset" => Ok(Self::Reset),
            "/help" => Ok(Self::Help),
            "/quit" | "/exit" => Ok(Self::Quit),
            other => Err(format!("unknown command {other}, try /help")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<ReplCommand, String> {
        line.parse()
    }

    #[test]
    fn test_plain_text_is_transcript() {
        assert_eq!(
            parse("  How I built a scraper  "),
            Ok(ReplCommand::Transcript("How I built a scraper".to_string()))
        );
        assert_eq!(parse("quit"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn test_refine() {
        assert_eq!(
            parse("/refine narrow"),
            Ok(ReplCommand::Refine(Direction::Narrow))
        );
        assert_eq!(
            parse("/refine   Broad"),
            Ok(ReplCommand::Refine(Direction::Broad))
        );
        assert!(parse("/refine").is_err());
        assert!(parse("/refine sideways").is_err());
    }

    #[test]
    fn test_show_is_one_based() {
        assert_eq!(parse("/show 2"), Ok(ReplCommand::Show(2)));
        assert!(parse("/show 0").is_err());
        assert!(parse("/show x").is_err());
    }

    #[test]
    fn test_media_and_url() {
        assert_eq!(
            parse("/media thumb.png"),
            Ok(ReplCommand::Media(Some("thumb.png".to_string())))
        );
        assert_eq!(parse("/media none"), Ok(ReplCommand::Media(None)));
        assert_eq!(parse("/url"), Ok(ReplCommand::Url(None)));
        assert_eq!(
            parse("/url https://youtu.be/x"),
            Ok(ReplCommand::Url(Some("https://youtu.be/x".to_string())))
        );
    }

    #[test]
    fn test_load_requires_path() {
        assert_eq!(
            parse("/load talk.txt"),
            Ok(ReplCommand::Load("talk.txt".to_string()))
        );
        assert!(parse("/load").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse("/plan").unwrap_err().contains("unknown command"));
    }
}
