//! Byte-level output for synthesized documents

pub mod pdf;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::synthesis::{DocumentType, SynthesisMode, SynthesizedDocument};

pub use pdf::PdfRenderer;

/// Turns a synthesized document into file contents
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &SynthesizedDocument) -> Result<Vec<u8>>;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn content_type(&self) -> &'static str;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, document: &SynthesizedDocument) -> Result<Vec<u8>> {
        Ok(document.to_plain_text().into_bytes())
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }
}

pub fn suggested_filename(
    doc_type: &DocumentType,
    mode: SynthesisMode,
    timestamp: DateTime<Utc>,
    extension: &str,
) -> String {
    let stem = match mode {
        SynthesisMode::Template => doc_type.slug(),
        SynthesisMode::Full => format!("{}_transcript", doc_type.slug()),
    };
    format!("{}_{}.{}", stem, timestamp.format("%Y%m%d_%H%M%S"), extension)
}

/// Greedy word wrap on `max_chars`. Explicit newlines are kept; a single word
/// longer than the limit gets a line of its own.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.chars().count() <= max_chars {
            lines.push(paragraph.to_string());
            continue;
        }
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Conversation, Message};
    use crate::synthesis::DocumentSynthesizer;
    use chrono::TimeZone;

    #[test]
    fn test_suggested_filename() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap();
        assert_eq!(
            suggested_filename(&DocumentType::BreachOfContractNotice, SynthesisMode::Template, ts, "pdf"),
            "breach_of_contract_notice_20240301_101500.pdf"
        );
        assert_eq!(
            suggested_filename(&DocumentType::LegalNotice, SynthesisMode::Full, ts, "txt"),
            "legal_notice_transcript_20240301_101500.txt"
        );
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four\nshort", 9);
        assert_eq!(lines, vec!["one two", "three", "four", "short"]);
        assert!(wrap_text(&"word ".repeat(40), 20).iter().all(|l| l.chars().count() <= 20));
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_plain_text_renderer() {
        let conversation = Conversation::from(vec![Message::user("legal notice for Hassan Ali")]);
        let doc = DocumentSynthesizer::default()
            .synthesize(&conversation, SynthesisMode::Template, None)
            .unwrap();
        let bytes = PlainTextRenderer.render(&doc).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), doc.to_plain_text());
    }
}
