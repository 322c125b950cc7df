//! Terminal rendering of drafts as mock posts.

use angles_core::{DraftPost, RiskLevel};
use colored::{ColoredString, Colorize};

fn risk_badge(risk: RiskLevel) -> ColoredString {
    let label = format!("{risk} promo risk");
    match risk {
        RiskLevel::Low => label.green(),
        RiskLevel::Medium => label.yellow(),
        RiskLevel::High => label.red().bold(),
    }
}

/// Renders one draft as a post card: header, title, body, strategy note.
pub fn render_draft(index: usize, draft: &DraftPost) -> String {
    let mut out = String::new();

    let mut header = format!(
        "#{} {}  {}",
        index + 1,
        draft.community.bright_cyan().bold(),
        risk_badge(draft.risk)
    );
    if let Some(flair) = &draft.flair {
        header.push_str(&format!("  [{}]", flair.magenta()));
    }
    out.push_str(&header);
    out.push('\n');
    out.push_str(&draft.title.bold().to_string());
    out.push_str("\n\n");
    for line in draft.body.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format!(
        "{} {}",
        "Strategy:".bright_black(),
        draft.rationale.italic()
    ));
    out.push('\n');
    out
}

/// Renders every draft separated by a rule.
pub fn render_drafts(drafts: &[DraftPost]) -> String {
    let rule = "─".repeat(60).bright_black().to_string();
    drafts
        .iter()
        .enumerate()
        .map(|(i, d)| render_draft(i, d))
        .collect::<Vec<_>>()
        .join(&format!("{rule}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> DraftPost {
        DraftPost {
            community: "r/webdev".to_string(),
            title: "I rebuilt my portfolio".to_string(),
            body: "First line\n- bullet".to_string(),
            flair: Some("Showoff Saturday".to_string()),
            rationale: "Visual results land well here".to_string(),
            risk: RiskLevel::Medium,
        }
    }

    #[test]
    fn test_render_draft_plain() {
        colored::control::set_override(false);
        let text = render_draft(0, &draft());

        assert!(text.starts_with("#1 r/webdev  Medium promo risk  [Showoff Saturday]\n"));
        assert!(text.contains("I rebuilt my portfolio\n\n  First line\n  - bullet\n"));
        assert!(text.ends_with("Strategy: Visual results land well here\n"));
    }

    #[test]
    fn test_render_drafts_numbers_each() {
        colored::control::set_override(false);
        let mut second = draft();
        second.community = "r/Frontend".to_string();
        second.flair = None;

        let text = render_drafts(&[draft(), second]);
        assert!(text.contains("#1 r/webdev"));
        assert!(text.contains("#2 r/Frontend  Medium promo risk\n"));
    }
}
