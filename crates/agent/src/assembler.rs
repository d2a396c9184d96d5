//! Prompt assembly.
//!
//! The outgoing conversation is always:
//!
//! 1. a date message in the caller's timezone
//! 2. the markdown formatting rules
//! 3. zero or more search digests, in the order given
//! 4. the caller's messages, unchanged and in order

use askrelay_core::message::Message;
use askrelay_core::search::SearchResult;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Heading for the recency-filtered web results.
pub const FRESH_RESULTS_HEADING: &str = "Fresh Search Results";

/// Heading for the opt-in deep search results.
pub const DEEP_INSIGHTS_HEADING: &str = "DeepSeek Insights";

/// Formatting rules sent with every request.
pub const MARKDOWN_RULES: &str = "Please respond **in Markdown** only.
- Use `##` for headings.
- Use `1.` for numbered lists.
- Use `-` for bullet points.

```md
## Example Heading
1. **Point**: detail
- **Note**: info
```";

/// A titled block of search results ready to become a system message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub heading: String,
    pub body: String,
}

impl Digest {
    /// `None` when there is nothing to report.
    pub fn from_results(heading: impl Into<String>, results: &[SearchResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        Some(Self {
            heading: heading.into(),
            body: build_digest(results),
        })
    }

    fn into_message(self) -> Message {
        Message::system(format!("## {}\n{}", self.heading, self.body))
    }
}

/// Render results as a numbered list, one line per result.
pub fn build_digest(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. **{}**: {}", i + 1, r.title, r.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render results as the direct reply for the passthrough model.
pub fn format_passthrough(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. [{}]({}): {}", i + 1, r.title, r.link, r.snippet))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parse an IANA zone name, falling back to UTC.
pub fn resolve_timezone(name: &str) -> Tz {
    name.trim().parse().unwrap_or(Tz::UTC)
}

/// "Current date (Europe/London): **Sunday, 18 October 2026**."
pub fn date_message(timezone: &str, now: DateTime<Utc>) -> Message {
    let tz = resolve_timezone(timezone);
    let local = now.with_timezone(&tz);
    Message::system(format!(
        "Current date ({}): **{}**.",
        tz.name(),
        local.format("%A, %-d %B %Y")
    ))
}

/// Assemble the outgoing conversation using the current time.
pub fn assemble(conversation: &[Message], timezone: &str, digests: Vec<Digest>) -> Vec<Message> {
    assemble_at(conversation, timezone, digests, Utc::now())
}

pub fn assemble_at(
    conversation: &[Message],
    timezone: &str,
    digests: Vec<Digest>,
    now: DateTime<Utc>,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2 + digests.len() + conversation.len());
    messages.push(date_message(timezone, now));
    messages.push(Message::system(MARKDOWN_RULES));
    messages.extend(digests.into_iter().map(Digest::into_message));
    messages.extend_from_slice(conversation);
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use askrelay_core::message::Role;
    use chrono::TimeZone;

    fn hit(n: usize) -> SearchResult {
        SearchResult {
            title: format!("Title {n}"),
            link: format!("https://example.com/{n}"),
            snippet: format!("Snippet {n}"),
        }
    }

    fn noon_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn digest_numbers_entries_from_one() {
        let digest = build_digest(&[hit(1), hit(2)]);
        assert_eq!(digest, "1. **Title 1**: Snippet 1\n2. **Title 2**: Snippet 2");
    }

    #[test]
    fn empty_results_give_no_digest() {
        assert_eq!(build_digest(&[]), "");
        assert!(Digest::from_results(FRESH_RESULTS_HEADING, &[]).is_none());
    }

    #[test]
    fn passthrough_formats_links() {
        assert_eq!(
            format_passthrough(&[hit(1), hit(2)]),
            "1. [Title 1](https://example.com/1): Snippet 1\n\n\
             2. [Title 2](https://example.com/2): Snippet 2"
        );
        assert_eq!(format_passthrough(&[]), "No results found.");
    }

    #[test]
    fn date_uses_requested_timezone() {
        let msg = date_message("Pacific/Auckland", noon_utc());
        assert_eq!(msg.role, Role::System);
        // 12:00 UTC is already the next day in Auckland.
        assert_eq!(
            msg.content,
            "Current date (Pacific/Auckland): **Monday, 19 October 2026**."
        );
    }

    #[test]
    fn invalid_timezone_falls_back_to_utc() {
        let msg = date_message("Mars/Olympus_Mons", noon_utc());
        assert_eq!(msg.content, "Current date (UTC): **Sunday, 18 October 2026**.");
    }

    #[test]
    fn conversation_without_digests() {
        let convo = vec![Message::user("what's 2+2")];
        let out = assemble_at(&convo, "UTC", Vec::new(), noon_utc());

        assert_eq!(out.len(), 3);
        assert!(out[0].content.starts_with("Current date (UTC)"));
        assert_eq!(out[1].content, MARKDOWN_RULES);
        assert_eq!(out[2], convo[0]);
    }

    #[test]
    fn digests_sit_between_rules_and_conversation() {
        let convo = vec![
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("today's news"),
        ];
        let digests = vec![
            Digest::from_results(FRESH_RESULTS_HEADING, &[hit(1)]).unwrap(),
            Digest::from_results(DEEP_INSIGHTS_HEADING, &[hit(2)]).unwrap(),
        ];
        let out = assemble_at(&convo, "UTC", digests, noon_utc());

        assert_eq!(out.len(), 7);
        assert!(out[2].content.starts_with("## Fresh Search Results\n1. **Title 1**: Snippet 1"));
        assert!(out[3].content.starts_with("## DeepSeek Insights\n1. **Title 2**: Snippet 2"));
        assert_eq!(&out[4..], convo.as_slice());
        assert!(out[..4].iter().all(|m| m.role == Role::System));
    }
}
