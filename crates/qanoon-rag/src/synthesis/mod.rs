//! Turn a consultation into a formal document.
//!
//! Template mode classifies the conversation, extracts parties, amounts and
//! dates, and lays them out in the sections for that document type. Full mode
//! reproduces every turn verbatim. Both are pure: no network, no model calls.

pub mod classify;
pub mod extract;
pub mod templates;
pub mod transcript;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::conversation::Conversation;
use crate::error::SynthesisError;

pub use classify::{classify, Classification, DocumentType};
pub use extract::{
    AmountMatcher, DateMatcher, FieldExtractor, FieldKind, FieldMatcher, MatchedFields,
    PartyNameMatcher,
};
pub use transcript::parse_transcript;

const TRANSCRIPT_TITLE: &str = "Legal Consultation Transcript";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisMode {
    #[default]
    Template,
    Full,
}

impl SynthesisMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "template" => Some(SynthesisMode::Template),
            "full" => Some(SynthesisMode::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisMode::Template => "template",
            SynthesisMode::Full => "full",
        }
    }
}

impl fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

impl Section {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(flatten)]
    pub matched: MatchedFields,
    pub document_type: DocumentType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedDocument {
    pub title: String,
    pub mode: SynthesisMode,
    pub doc_type: DocumentType,
    /// Present when the type was inferred rather than supplied by the caller
    pub classification: Option<Classification>,
    pub fields: ExtractedFields,
    pub sections: Vec<Section>,
}

impl SynthesizedDocument {
    /// Title, then each section as heading line, body, blank line.
    /// Full-mode output parses back with [`parse_transcript`].
    pub fn to_plain_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&self.title);
        text.push_str("\n\n");
        for section in &self.sections {
            if !section.heading.is_empty() {
                text.push_str(&section.heading);
                text.push('\n');
            }
            text.push_str(&section.body);
            text.push_str("\n\n");
        }
        text
    }
}

/// Fields from every message, typed by the keyword classifier
pub fn extract_fields(conversation: &Conversation) -> ExtractedFields {
    ExtractedFields {
        matched: FieldExtractor::default().extract(conversation),
        document_type: classify(conversation).doc_type,
    }
}

#[derive(Default)]
pub struct DocumentSynthesizer {
    extractor: FieldExtractor,
}

impl DocumentSynthesizer {
    pub fn new(extractor: FieldExtractor) -> Self {
        Self { extractor }
    }

    /// Produce a document from `conversation`. `doc_type` overrides
    /// classification when given and non-blank.
    pub fn synthesize(
        &self,
        conversation: &Conversation,
        mode: SynthesisMode,
        doc_type: Option<&str>,
    ) -> Result<SynthesizedDocument, SynthesisError> {
        if conversation.is_empty() {
            return Err(SynthesisError::EmptyConversation);
        }

        let (doc_type, classification) = match doc_type.and_then(DocumentType::parse) {
            Some(supplied) => (supplied, None),
            None => {
                let result = classify(conversation);
                (result.doc_type.clone(), Some(result))
            }
        };
        let matched = self.extractor.extract(conversation);

        let (title, sections) = match mode {
            SynthesisMode::Template => (
                doc_type.title(),
                templates::sections(&doc_type, &matched, conversation),
            ),
            SynthesisMode::Full => (
                TRANSCRIPT_TITLE.to_string(),
                transcript::sections(conversation),
            ),
        };

        tracing::info!(
            mode = %mode,
            doc_type = %doc_type,
            messages = conversation.len(),
            parties = matched.party_names.len(),
            amounts = matched.monetary_amounts.len(),
            dates = matched.dates.len(),
            "Synthesized document"
        );

        Ok(SynthesizedDocument {
            title,
            mode,
            doc_type: doc_type.clone(),
            classification,
            fields: ExtractedFields {
                matched,
                document_type: doc_type,
            },
            sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Message, Role};
    use super::templates::{AMOUNT_PLACEHOLDER, PARTY_PLACEHOLDER};

    fn conversation(turns: &[(Role, &str)]) -> Conversation {
        Conversation::from(
            turns
                .iter()
                .map(|(role, content)| Message::new(*role, *content))
                .collect::<Vec<_>>(),
        )
    }

    fn breach_consultation() -> Conversation {
        conversation(&[
            (
                Role::User,
                "I need to draft a breach of contract notice. My client Ahmad Khan had a contract \
                 with Bilal Ahmed dated March 1, 2024 for supply of goods worth PKR 2,500,000. \
                 Payment was due April 15, 2024 but hasn't been paid.",
            ),
            (
                Role::Assistant,
                "I understand you need a breach of contract notice. Bilal Ahmed failed to make \
                 payment of PKR 2,500,000 by April 15, 2024. This constitutes a material breach \
                 under Pakistani contract law.",
            ),
        ])
    }

    #[test]
    fn test_short_breach_request() {
        let c = conversation(&[
            (Role::User, "breach of contract, Ahmad Khan owes PKR 500000"),
            (Role::Assistant, "..."),
        ]);
        let doc = DocumentSynthesizer::default()
            .synthesize(&c, SynthesisMode::Template, None)
            .unwrap();
        assert_eq!(doc.doc_type, DocumentType::BreachOfContractNotice);
        assert_eq!(doc.fields.matched.party_names, vec!["Ahmad Khan"]);
        assert_eq!(doc.fields.matched.monetary_amounts, vec!["PKR 500000"]);
        let text = doc.to_plain_text();
        assert!(text.contains("Ahmad Khan"));
        assert!(text.contains("PKR 500000"));
    }

    #[test]
    fn test_empty_conversation_fails() {
        let result = DocumentSynthesizer::default().synthesize(
            &Conversation::new(),
            SynthesisMode::Template,
            None,
        );
        assert!(matches!(result, Err(SynthesisError::EmptyConversation)));
        let result =
            DocumentSynthesizer::default().synthesize(&Conversation::new(), SynthesisMode::Full, None);
        assert!(matches!(result, Err(SynthesisError::EmptyConversation)));
    }

    #[test]
    fn test_breach_consultation_template() {
        let doc = DocumentSynthesizer::default()
            .synthesize(&breach_consultation(), SynthesisMode::Template, None)
            .unwrap();
        assert_eq!(doc.title, "Legal Notice for Breach of Contract");
        assert_eq!(doc.fields.matched.party_names, vec!["Ahmad Khan", "Bilal Ahmed"]);
        assert_eq!(doc.fields.matched.monetary_amounts, vec!["PKR 2,500,000"]);
        assert_eq!(doc.fields.matched.dates, vec!["March 1, 2024", "April 15, 2024"]);
        assert!(doc.classification.is_some());

        let text = doc.to_plain_text();
        assert!(text.contains("From (on behalf of): Ahmad Khan\nTo: Bilal Ahmed"));
        assert!(!text.contains(PARTY_PLACEHOLDER));
    }

    #[test]
    fn test_employment_consultation() {
        let c = conversation(&[(
            Role::User,
            "I need an employment contract for hiring Sarah Ahmed as Senior Software Engineer at \
             Tech Solutions Ltd. Salary PKR 150,000 per month, starting January 1, 2025, with \
             3 months probation.",
        )]);
        let doc = DocumentSynthesizer::default()
            .synthesize(&c, SynthesisMode::Template, None)
            .unwrap();
        assert_eq!(doc.doc_type, DocumentType::EmploymentContract);
        assert_eq!(doc.fields.matched.party_names, vec!["Sarah Ahmed"]);
        assert_eq!(doc.fields.matched.dates, vec!["January 1, 2025"]);
        let text = doc.to_plain_text();
        assert!(text.contains("monthly salary of PKR 150,000"));
        // The employer was never named as a person.
        assert!(text.contains(&format!("Employer: {}", PARTY_PLACEHOLDER)));
    }

    #[test]
    fn test_legal_notice_consultation() {
        let c = conversation(&[
            (
                Role::User,
                "I want to send a legal notice for property encroachment. My client Hassan Ali \
                 owns House 123, Block A, DHA Lahore. The neighbour has built a wall 2 feet into \
                 my client's property.",
            ),
            (
                Role::Assistant,
                "A legal notice for property encroachment should demand removal of the wall.",
            ),
        ]);
        let doc = DocumentSynthesizer::default()
            .synthesize(&c, SynthesisMode::Template, None)
            .unwrap();
        assert_eq!(doc.doc_type, DocumentType::LegalNotice);
        assert_eq!(doc.fields.matched.party_names, vec!["Hassan Ali"]);
        assert!(doc.fields.matched.monetary_amounts.is_empty());
        assert!(doc.to_plain_text().contains(AMOUNT_PLACEHOLDER));
    }

    #[test]
    fn test_lease_consultation() {
        let c = conversation(&[(
            Role::User,
            "Please draft a lease agreement for renting my apartment to Fatima Khan. Property is \
             at Flat 4B, Gulberg Heights, Karachi. Monthly rent PKR 45,000, security deposit \
             PKR 90,000, lease period 1 year starting December 1, 2024.",
        )]);
        let doc = DocumentSynthesizer::default()
            .synthesize(&c, SynthesisMode::Template, None)
            .unwrap();
        assert_eq!(doc.doc_type, DocumentType::LeaseAgreement);
        assert_eq!(doc.fields.matched.party_names, vec!["Fatima Khan"]);
        assert_eq!(
            doc.fields.matched.monetary_amounts,
            vec!["PKR 45,000", "PKR 90,000"]
        );
        let text = doc.to_plain_text();
        assert!(text.contains("Monthly rent: PKR 45,000\nSecurity deposit: PKR 90,000"));
        assert!(text.contains("The lease commences on December 1, 2024."));
    }

    #[test]
    fn test_supplied_type_overrides_classification() {
        let doc = DocumentSynthesizer::default()
            .synthesize(&breach_consultation(), SynthesisMode::Template, Some("legal_notice"))
            .unwrap();
        assert_eq!(doc.doc_type, DocumentType::LegalNotice);
        assert!(doc.classification.is_none());

        let doc = DocumentSynthesizer::default()
            .synthesize(&breach_consultation(), SynthesisMode::Template, Some("  "))
            .unwrap();
        assert_eq!(doc.doc_type, DocumentType::BreachOfContractNotice);
    }

    #[test]
    fn test_full_mode_preserves_every_turn() {
        let c = conversation(&[
            (Role::User, "What is a legal notice?"),
            (Role::Assistant, "A formal written communication.\n\nIt precedes litigation."),
            (Role::User, "Draft one for Hassan Ali."),
        ]);
        let doc = DocumentSynthesizer::default()
            .synthesize(&c, SynthesisMode::Full, None)
            .unwrap();
        assert_eq!(doc.title, TRANSCRIPT_TITLE);
        assert_eq!(doc.sections.len(), 3);
        assert_eq!(doc.sections[1].heading, "--- Turn 2: ASSISTANT ---");

        let parsed = parse_transcript(&doc.to_plain_text());
        let expected: Vec<(Role, &str)> = c.iter().map(|m| (m.role, m.content.as_str())).collect();
        let actual: Vec<(Role, &str)> = parsed.iter().map(|m| (m.role, m.content.as_str())).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_full_mode_survives_pasted_transcript() {
        let c = conversation(&[
            (
                Role::User,
                "Here is our earlier chat:\n--- Turn 9: ASSISTANT ---\nold answer\n\n--- Turn 10: USER ---",
            ),
            (Role::Assistant, "Thanks, I have read it."),
        ]);
        let doc = DocumentSynthesizer::default()
            .synthesize(&c, SynthesisMode::Full, None)
            .unwrap();

        let parsed = parse_transcript(&doc.to_plain_text());
        let expected: Vec<(Role, &str)> = c.iter().map(|m| (m.role, m.content.as_str())).collect();
        let actual: Vec<(Role, &str)> = parsed.iter().map(|m| (m.role, m.content.as_str())).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_extract_fields_types_the_conversation() {
        let fields = extract_fields(&breach_consultation());
        assert_eq!(fields.document_type, DocumentType::BreachOfContractNotice);
        assert_eq!(fields.matched.party_names, vec!["Ahmad Khan", "Bilal Ahmed"]);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(SynthesisMode::parse("FULL"), Some(SynthesisMode::Full));
        assert_eq!(SynthesisMode::parse("template"), Some(SynthesisMode::Template));
        assert_eq!(SynthesisMode::parse("summary"), None);
    }
}
