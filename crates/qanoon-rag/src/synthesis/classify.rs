//! Keyword-weighted document type classification

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::conversation::{Conversation, Role};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    BreachOfContractNotice,
    EmploymentContract,
    LegalNotice,
    LeaseAgreement,
    /// Caller-named or unrecognised type; empty when nothing matched
    Other(String),
}

impl DocumentType {
    /// Tie-break order when two types score the same
    pub const PRIORITY: [DocumentType; 4] = [
        DocumentType::BreachOfContractNotice,
        DocumentType::EmploymentContract,
        DocumentType::LeaseAgreement,
        DocumentType::LegalNotice,
    ];

    /// Interpret a caller-supplied type name. Blank input means "not supplied".
    pub fn parse(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = trimmed.to_lowercase().replace(['_', '-'], " ");
        let doc_type = if normalized.contains("breach") {
            DocumentType::BreachOfContractNotice
        } else if normalized.contains("employment") || normalized.contains("job") {
            DocumentType::EmploymentContract
        } else if normalized.contains("lease")
            || normalized.contains("tenancy")
            || normalized.contains("rent")
        {
            DocumentType::LeaseAgreement
        } else if normalized.contains("notice") {
            DocumentType::LegalNotice
        } else {
            DocumentType::Other(trimmed.to_string())
        };
        Some(doc_type)
    }

    pub fn title(&self) -> String {
        match self {
            DocumentType::BreachOfContractNotice => "Legal Notice for Breach of Contract".to_string(),
            DocumentType::EmploymentContract => "Employment Contract".to_string(),
            DocumentType::LegalNotice => "Legal Notice".to_string(),
            DocumentType::LeaseAgreement => "Lease Agreement".to_string(),
            DocumentType::Other(name) if name.trim().is_empty() => "Legal Document".to_string(),
            DocumentType::Other(name) => title_case(name),
        }
    }

    /// Lowercase, underscore-separated name used in file names
    pub fn slug(&self) -> String {
        match self {
            DocumentType::BreachOfContractNotice => "breach_of_contract_notice".to_string(),
            DocumentType::EmploymentContract => "employment_contract".to_string(),
            DocumentType::LegalNotice => "legal_notice".to_string(),
            DocumentType::LeaseAgreement => "lease_agreement".to_string(),
            DocumentType::Other(name) => {
                let slug = name
                    .split(|c: char| !c.is_ascii_alphanumeric())
                    .filter(|part| !part.is_empty())
                    .map(|part| part.to_ascii_lowercase())
                    .collect::<Vec<_>>()
                    .join("_");
                if slug.is_empty() {
                    "legal_document".to_string()
                } else {
                    slug
                }
            }
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub doc_type: DocumentType,
    pub score: u32,
    /// Another type scored the same; the choice came from the tie-break order
    pub ambiguous: bool,
}

/// User text counts double: it states the need, assistant text mostly echoes it.
const USER_WEIGHT: u32 = 2;
const ASSISTANT_WEIGHT: u32 = 1;

struct Cue {
    pattern: Regex,
    weight: u32,
}

fn cues(words: &[(&str, u32)]) -> Vec<Cue> {
    words
        .iter()
        .map(|(phrase, weight)| Cue {
            pattern: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
                .expect("keyword regex is valid"),
            weight: *weight,
        })
        .collect()
}

static KEYWORDS: LazyLock<Vec<(DocumentType, Vec<Cue>)>> = LazyLock::new(|| {
    vec![
        (
            DocumentType::BreachOfContractNotice,
            cues(&[
                ("breach of contract", 5),
                ("breach", 3),
                ("non-payment", 2),
                ("not paid", 2),
                ("hasn't been paid", 2),
                ("unpaid", 2),
                ("owes", 2),
                ("payment was due", 2),
                ("default", 1),
                ("damages", 1),
                ("recovery", 1),
            ]),
        ),
        (
            DocumentType::EmploymentContract,
            cues(&[
                ("employment contract", 5),
                ("employment", 3),
                ("employee", 2),
                ("employer", 2),
                ("salary", 2),
                ("hiring", 2),
                ("probation", 1),
                ("designation", 1),
                ("job", 1),
            ]),
        ),
        (
            DocumentType::LeaseAgreement,
            cues(&[
                ("lease agreement", 5),
                ("lease", 3),
                ("tenancy", 3),
                ("monthly rent", 2),
                ("rent", 2),
                ("renting", 2),
                ("tenant", 2),
                ("landlord", 2),
                ("security deposit", 2),
            ]),
        ),
        (
            DocumentType::LegalNotice,
            cues(&[
                ("legal notice", 4),
                ("cease and desist", 3),
                ("encroachment", 3),
                ("eviction", 2),
                ("trespass", 2),
                ("defamation", 2),
                ("notice", 1),
                ("property", 1),
                ("ownership", 1),
                ("possession", 1),
            ]),
        ),
    ]
});

fn score_text(text: &str, cues: &[Cue]) -> u32 {
    cues.iter()
        .map(|cue| cue.pattern.find_iter(text).count() as u32 * cue.weight)
        .sum()
}

/// Score every known type over the whole conversation. A zero score for all
/// types yields a generic document.
pub fn classify(conversation: &Conversation) -> Classification {
    let mut scores: Vec<(DocumentType, u32)> = KEYWORDS
        .iter()
        .map(|(doc_type, cues)| {
            let score = conversation
                .iter()
                .map(|message| {
                    let weight = match message.role {
                        Role::User => USER_WEIGHT,
                        Role::Assistant => ASSISTANT_WEIGHT,
                    };
                    score_text(&message.content, cues) * weight
                })
                .sum();
            (doc_type.clone(), score)
        })
        .collect();

    // Stable sort keeps PRIORITY order among equal scores.
    scores.sort_by_key(|(doc_type, _)| {
        DocumentType::PRIORITY
            .iter()
            .position(|p| p == doc_type)
            .unwrap_or(usize::MAX)
    });
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    let (best, score) = scores[0].clone();
    if score == 0 {
        return Classification {
            doc_type: DocumentType::Other(String::new()),
            score: 0,
            ambiguous: false,
        };
    }
    let ambiguous = scores.get(1).is_some_and(|(_, s)| *s == score);
    if ambiguous {
        tracing::debug!(chosen = %best, score, "Document type tie broken by priority");
    }
    Classification {
        doc_type: best,
        score,
        ambiguous,
    }
}
