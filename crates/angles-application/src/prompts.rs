//! Prompt text and response schema for draft generation.

use angles_core::error::{AnglesError, Result};
use angles_core::{Direction, RefinementContext, SourceInput};
use minijinja::{Environment, context};
use serde_json::{Value, json};

/// Fixed system instruction sent with every generation call.
pub const SYSTEM_INSTRUCTION: &str = r#"You are a social media strategist who grows Reddit communities.
You take a video transcript (and optional visual context) and repurpose it into posts that feel native to specific subreddits.

RULES:
1. **The 9:1 Rule**: 90% of every post is genuine value for the reader, at most 10% promotion. No marketing speak.
2. **Community Fit**: Match the tone, structure and slang of the targeted subreddit.
3. **Angles**: Find distinct angles in the content. One video can become a debate post for r/unpopularopinion, a technical deep dive for r/webdev and a founder story for r/entrepreneur.
4. **Formatting**: Use Markdown (bold, lists) the way Reddit users expect.

OUTPUT:
Return a JSON object with an array named 'angles'."#;

/// Number of drafts requested by a refinement call.
pub const REFINEMENT_DRAFT_COUNT: usize = 3;

const FRESH_TEMPLATE: &str = r#"Here is the transcript of the video content:

{{ transcript }}
{% if reference_url %}
Source video: {{ reference_url }}
{% endif %}
Based on this, generate 3-4 distinct Reddit posts for different suitable subreddits."#;

const REFINE_TEMPLATE: &str = r#"Here is the transcript of the video content:

{{ transcript }}
{% if reference_url %}
Source video: {{ reference_url }}
{% endif %}
You have already written posts for these subreddits, do NOT target any of them again:
{% for community in excluded -%}
- {{ community }}
{% endfor %}
{% if direction == "narrow" -%}
Go NARROWER: pick highly specific communities that match the exact technologies, tools or niche topics in the content.
{%- else -%}
Go BROADER: pick tangential communities interested in the underlying themes, lifestyle or big-picture implications of the content.
{%- endif %}

Generate exactly {{ count }} new, distinct Reddit posts."#;

fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("fresh", FRESH_TEMPLATE)
        .map_err(|e| AnglesError::Template(e.to_string()))?;
    env.add_template("refine", REFINE_TEMPLATE)
        .map_err(|e| AnglesError::Template(e.to_string()))?;
    Ok(env)
}

/// Renders the user instruction for a fresh or refinement call.
pub fn render_instruction(
    input: &SourceInput,
    refinement: Option<&RefinementContext>,
) -> Result<String> {
    let env = environment()?;

    let rendered = match refinement {
        None => env.get_template("fresh").and_then(|t| {
            t.render(context! {
                transcript => input.transcript,
                reference_url => input.reference_url,
            })
        }),
        Some(ctx) => env.get_template("refine").and_then(|t| {
            t.render(context! {
                transcript => input.transcript,
                reference_url => input.reference_url,
                excluded => ctx.excluded_communities,
                direction => ctx.direction.to_string(),
                count => REFINEMENT_DRAFT_COUNT,
            })
        }),
    };

    rendered.map_err(|e| AnglesError::Template(e.to_string()))
}

/// Strict output schema declared to the service: `{ angles: DraftPost[] }`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "angles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "subreddit": {
                            "type": "STRING",
                            "description": "Target subreddit (e.g. r/webdev)"
                        },
                        "title": {
                            "type": "STRING",
                            "description": "Catchy, native-feeling post title"
                        },
                        "body": {
                            "type": "STRING",
                            "description": "The full post content in Markdown"
                        },
                        "flair": {
                            "type": "STRING",
                            "description": "Suggested post flair if applicable"
                        },
                        "angleExplanation": {
                            "type": "STRING",
                            "description": "Brief explanation of the strategy used here"
                        },
                        "selfPromotionRisk": {
                            "type": "STRING",
                            "enum": ["Low", "Medium", "High"]
                        }
                    },
                    "required": ["subreddit", "title", "body", "angleExplanation", "selfPromotionRisk"]
                }
            }
        },
        "required": ["angles"]
    })
}

/// Short label for a direction, used in logs and the CLI.
pub fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Narrow => "narrower / niche",
        Direction::Broad => "broader / thematic",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> SourceInput {
        SourceInput::new("How I built a scraper in Python").unwrap()
    }

    #[test]
    fn test_fresh_instruction() {
        let text = render_instruction(&input(), None).unwrap();
        assert!(text.contains("How I built a scraper in Python"));
        assert!(text.contains("generate 3-4 distinct Reddit posts"));
        assert!(!text.contains("do NOT target"));
        assert!(!text.contains("Source video"));
    }

    #[test]
    fn test_fresh_instruction_with_reference_url() {
        let input = input().with_reference_url("https://youtube.com/watch?v=abc");
        let text = render_instruction(&input, None).unwrap();
        assert!(text.contains("Source video: https://youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_narrow_refinement_instruction() {
        let ctx = RefinementContext::new(
            Direction::Narrow,
            vec!["r/Python".to_string(), "r/webscraping".to_string()],
        );
        let text = render_instruction(&input(), Some(&ctx)).unwrap();

        assert!(text.contains("- r/Python\n"));
        assert!(text.contains("- r/webscraping\n"));
        assert!(text.contains("Go NARROWER"));
        assert!(!text.contains("Go BROADER"));
        assert!(text.contains("Generate exactly 3 new"));
    }

    #[test]
    fn test_broad_refinement_instruction() {
        let ctx = RefinementContext::new(Direction::Broad, vec!["r/Python".to_string()]);
        let text = render_instruction(&input(), Some(&ctx)).unwrap();
        assert!(text.contains("Go BROADER"));
        assert!(!text.contains("Go NARROWER"));
    }

    #[test]
    fn test_transcript_is_not_html_escaped() {
        let input = SourceInput::new("Tips & tricks for <div> layouts").unwrap();
        let text = render_instruction(&input, None).unwrap();
        assert!(text.contains("Tips & tricks for <div> layouts"));
    }

    #[test]
    fn test_schema_required_fields() {
        let schema = response_schema();
        let required = schema["properties"]["angles"]["items"]["required"]
            .as_array()
            .unwrap();
        let names: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(
            names,
            vec!["subreddit", "title", "body", "angleExplanation", "selfPromotionRisk"]
        );
        assert!(!names.contains(&"flair"));
    }
}
