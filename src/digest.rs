//! Plain-text news digest.

use chrono::{DateTime, TimeZone};
use newswire_search::Article;

const RULE_WIDTH: usize = 60;

/// Topic shown when the digest covers headlines rather than a query.
pub const TOP_STORIES: &str = "Top Stories";

/// Render `articles` as a plain-text digest suitable for pasting into an email.
///
/// Each entry lists the title, publisher and link, plus the description
/// folded onto one line when there is one.
pub fn render_digest<Tz>(articles: &[Article], query: &str, generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let separator = "=".repeat(RULE_WIDTH);
    let divider = "-".repeat(RULE_WIDTH);
    let topic = match query.trim() {
        "" => TOP_STORIES,
        q => q,
    };

    let mut out = format!("{separator}\nNEWS DIGEST\n{separator}\n");
    out.push_str(&format!("Topic: {topic}\n"));
    out.push_str(&format!(
        "Generated: {}\n",
        generated_at.format("%A, %B %-d, %Y, %I:%M %p")
    ));
    out.push_str(&format!("{separator}\n\n"));

    for (index, article) in articles.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", index + 1, article.title));
        out.push_str(&format!("   Source: {}\n", article.source.name));
        out.push_str(&format!("   Link: {}\n", article.link().unwrap_or("(no link)")));
        let summary = article.description.as_deref().map(single_line);
        if let Some(summary) = summary.filter(|s| !s.is_empty()) {
            out.push_str(&format!("   Summary: {summary}\n"));
        }
        out.push_str(&format!("\n{divider}\n\n"));
    }

    out.push_str("End of Digest\n");
    out.push_str(&separator);
    out
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
