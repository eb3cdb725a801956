//! Full-mode transcript: every turn, labelled, content preserved.
//!
//! Content lines that would read as a turn header are written with a leading
//! backslash and restored by [`parse_transcript`].

use regex::Regex;
use std::sync::LazyLock;

use super::Section;
use crate::conversation::{Conversation, Message, Role};

static TURN_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^--- Turn (\d+): (USER|ASSISTANT) ---\n").expect("turn header regex is valid")
});
/// Content lines that look like a header, already escaped any number of times
static HEADER_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\\*--- Turn \d+: (?:USER|ASSISTANT) ---)$").expect("header-like regex is valid")
});
static ESCAPED_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\\(\\*--- Turn \d+: (?:USER|ASSISTANT) ---)$").expect("escaped header regex is valid")
});

pub fn turn_header(index: usize, role: Role) -> String {
    format!("--- Turn {}: {} ---", index, role.label())
}

/// Prefix header-like content lines with one backslash so they cannot start a turn.
fn escape_content(content: &str) -> String {
    HEADER_LIKE_RE.replace_all(content, r"\${1}").into_owned()
}

fn unescape_content(content: &str) -> String {
    ESCAPED_HEADER_RE.replace_all(content, "${1}").into_owned()
}

pub(crate) fn sections(conversation: &Conversation) -> Vec<Section> {
    conversation
        .iter()
        .enumerate()
        .map(|(i, message)| {
            Section::new(
                turn_header(i + 1, message.role),
                escape_content(&message.content),
            )
        })
        .collect()
}

/// Recover the `(role, content)` sequence from plain-text full-mode output.
/// Text before the first turn header (title, preamble) is ignored.
pub fn parse_transcript(text: &str) -> Conversation {
    let headers: Vec<_> = TURN_HEADER_RE.captures_iter(text).collect();
    let mut messages = Vec::with_capacity(headers.len());

    for (i, caps) in headers.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let Some(role) = Role::from_label(label.as_str()) else {
            continue;
        };
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        let body = &text[whole.end()..end];
        let content = body.strip_suffix("\n\n").unwrap_or(body);
        messages.push(Message {
            role,
            content: unescape_content(content),
            timestamp: None,
        });
    }
    Conversation::from(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers() {
        assert_eq!(turn_header(3, Role::Assistant), "--- Turn 3: ASSISTANT ---");
    }

    #[test]
    fn test_parse_ignores_preamble() {
        let text = "Legal Consultation Record\n\n--- Turn 1: USER ---\nhello\n\n--- Turn 2: ASSISTANT ---\nhi\nthere\n\n";
        let conversation = parse_transcript(text);
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0].role, Role::User);
        assert_eq!(conversation.messages()[0].content, "hello");
        assert_eq!(conversation.messages()[1].content, "hi\nthere");
    }

    #[test]
    fn test_header_like_content_is_escaped() {
        let content = "see below\n--- Turn 9: ASSISTANT ---\nold answer\n\\--- Turn 2: USER ---";
        let escaped = escape_content(content);
        assert_eq!(
            escaped,
            "see below\n\\--- Turn 9: ASSISTANT ---\nold answer\n\\\\--- Turn 2: USER ---"
        );
        assert!(!TURN_HEADER_RE.is_match(&format!("{}\n", escaped)));
        assert_eq!(unescape_content(&escaped), content);
        assert_eq!(escape_content("--- Turn one: USER ---"), "--- Turn one: USER ---");
    }

    #[test]
    fn test_parse_without_headers_is_empty() {
        assert!(parse_transcript("no turns here").is_empty());
    }
}
