//! Pattern matchers that pull party names, amounts and dates out of chat text.
//!
//! Matching is best effort: a miss becomes a placeholder in the rendered
//! document, never a silent omission.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::conversation::Conversation;

static CAPITALISED_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)+\b").expect("capitalised run regex is valid")
});
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:pkr|rs\.?|rupees)\s*\d[\d,]*(?:\.\d+)?(?:\s*(?:million|lakhs?|lacs?|crores?))?|\b\d[\d,]*(?:\.\d+)?\s*(?:(?:million|lakhs?|lacs?|crores?)\s+)?(?:rupees|pkr)\b",
    )
    .expect("amount regex is valid")
});
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    const MONTH: &str = "(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec)";
    let pattern = format!(
        r"(?i)\b{m}\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}\b|\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?{m}\.?,?\s+\d{{4}}\b|\b\d{{4}}-\d{{2}}-\d{{2}}\b|\b\d{{1,2}}[/.-]\d{{1,2}}[/.-]\d{{4}}\b",
        m = MONTH
    );
    Regex::new(&pattern).expect("date regex is valid")
});
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Capitalised words that are never part of a person's name in this domain
const NON_NAME_WORDS: &[&str] = &[
    // calendar
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday",
    // legal and document vocabulary
    "legal", "notice", "contract", "agreement", "breach", "act", "ordinance", "law", "laws",
    "court", "high", "supreme", "section", "article", "clause", "code", "civil", "criminal",
    "procedure", "constitution", "penal", "employment", "lease", "tenancy", "property", "deed",
    "sale", "transfer", "registration", "rent", "industrial", "relations", "shops",
    "establishments", "minimum", "wages", "factories", "compensation", "demand", "subject",
    "payment", "amount", "total", "date", "dated", "rupees", "terms", "conditions",
    // jurisdictions and places
    "indian", "pakistan", "pakistani", "islamic", "republic", "government", "federal",
    "provincial", "punjab", "sindh", "balochistan", "khyber", "pakhtunkhwa", "islamabad",
    "karachi", "lahore", "peshawar", "quetta", "rawalpindi", "multan", "faisalabad", "gulberg",
    "heights", "block", "house", "flat", "street", "road", "town", "colony", "phase", "sector",
    "plaza", "tower", "apartment", "society",
    // organisations
    "ltd", "limited", "pvt", "private", "company", "corporation", "corp", "inc", "bank",
    "solutions", "technologies", "services", "enterprises", "industries", "traders", "group",
    "associates",
    // roles and titles
    "senior", "junior", "software", "engineer", "manager", "director", "officer", "developer",
    "executive", "chief", "head", "advocate", "lawyer", "attorney", "counsel", "plaintiff",
    "defendant", "tenant", "landlord", "employer", "employee", "client", "party", "parties",
    // sentence openers and salutations
    "dear", "sir", "madam", "regards", "sincerely", "yours", "truly", "faithfully", "the",
    "this", "that", "these", "please", "thank", "thanks", "kindly", "under", "according",
    "however", "therefore", "also", "and", "if", "when", "we", "my", "our", "your", "his",
    "her", "their", "help", "draft", "create", "include", "understood", "first", "second",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    PartyName,
    MonetaryAmount,
    Date,
}

/// One independently testable extraction rule
pub trait FieldMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> FieldKind;

    /// Matches in order of appearance; may contain duplicates
    fn find(&self, text: &str) -> Vec<String>;
}

/// Two to four consecutive capitalised words, minus known non-name vocabulary
#[derive(Debug, Default, Clone, Copy)]
pub struct PartyNameMatcher;

impl PartyNameMatcher {
    fn is_name_word(word: &str) -> bool {
        !NON_NAME_WORDS.contains(&word.to_lowercase().as_str())
    }
}

impl FieldMatcher for PartyNameMatcher {
    fn name(&self) -> &'static str {
        "party_name"
    }

    fn kind(&self) -> FieldKind {
        FieldKind::PartyName
    }

    fn find(&self, text: &str) -> Vec<String> {
        let mut names = Vec::new();
        for candidate in CAPITALISED_RUN_RE.find_iter(text) {
            // Split the run at vocabulary words; what remains between them may still be a name.
            let mut run: Vec<&str> = Vec::new();
            let words = candidate.as_str().split_whitespace().map(Some).chain(std::iter::once(None));
            for word in words {
                match word {
                    Some(w) if Self::is_name_word(w) => run.push(w),
                    _ => {
                        if (2..=4).contains(&run.len()) {
                            names.push(run.join(" "));
                        }
                        run.clear();
                    }
                }
            }
        }
        names
    }
}

/// Rupee amounts: `PKR 500,000`, `Rs. 2.5 million`, `45,000 rupees`
#[derive(Debug, Default, Clone, Copy)]
pub struct AmountMatcher;

impl FieldMatcher for AmountMatcher {
    fn name(&self) -> &'static str {
        "amount"
    }

    fn kind(&self) -> FieldKind {
        FieldKind::MonetaryAmount
    }

    fn find(&self, text: &str) -> Vec<String> {
        AMOUNT_RE
            .find_iter(text)
            .map(|m| {
                let amount = m.as_str().trim_end_matches([',', '.']);
                WHITESPACE_RE.replace_all(amount, " ").into_owned()
            })
            .collect()
    }
}

/// `March 1, 2024`, `1st of March, 2024`, `2024-03-01`, `01/03/2024`
#[derive(Debug, Default, Clone, Copy)]
pub struct DateMatcher;

impl FieldMatcher for DateMatcher {
    fn name(&self) -> &'static str {
        "date"
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Date
    }

    fn find(&self, text: &str) -> Vec<String> {
        DATE_RE
            .find_iter(text)
            .map(|m| WHITESPACE_RE.replace_all(m.as_str(), " ").into_owned())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedFields {
    /// Unique, in first-seen order
    pub party_names: Vec<String>,
    pub monetary_amounts: Vec<String>,
    pub dates: Vec<String>,
}

impl MatchedFields {
    fn values_mut(&mut self, kind: FieldKind) -> &mut Vec<String> {
        match kind {
            FieldKind::PartyName => &mut self.party_names,
            FieldKind::MonetaryAmount => &mut self.monetary_amounts,
            FieldKind::Date => &mut self.dates,
        }
    }

    fn insert(&mut self, kind: FieldKind, value: String) {
        let values = self.values_mut(kind);
        if !values.iter().any(|v| v.eq_ignore_ascii_case(&value)) {
            values.push(value);
        }
    }
}

pub struct FieldExtractor {
    matchers: Vec<Box<dyn FieldMatcher>>,
}

impl FieldExtractor {
    pub fn new(matchers: Vec<Box<dyn FieldMatcher>>) -> Self {
        Self { matchers }
    }

    pub fn extract_text(&self, text: &str) -> MatchedFields {
        let mut fields = MatchedFields::default();
        self.collect(text, &mut fields);
        fields
    }

    /// Union of matches across every message, user and assistant alike
    pub fn extract(&self, conversation: &Conversation) -> MatchedFields {
        let mut fields = MatchedFields::default();
        for message in conversation {
            self.collect(&message.content, &mut fields);
        }
        fields
    }

    fn collect(&self, text: &str, fields: &mut MatchedFields) {
        for matcher in &self.matchers {
            for value in matcher.find(text) {
                tracing::trace!(matcher = matcher.name(), value = %value, "Field matched");
                fields.insert(matcher.kind(), value);
            }
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(PartyNameMatcher),
            Box::new(AmountMatcher),
            Box::new(DateMatcher),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;

    #[test]
    fn test_party_names() {
        let text = "I need to draft a breach of contract notice. My client Ahmad Khan had a contract \
                    with Bilal Ahmed dated March 1, 2024 under the Contract Act.";
        assert_eq!(PartyNameMatcher.find(text), vec!["Ahmad Khan", "Bilal Ahmed"]);
    }

    #[test]
    fn test_four_word_party_name() {
        assert_eq!(
            PartyNameMatcher.find("My client Muhammad Ahmad Khan Niazi owes PKR 5000 to Bilal Ahmed."),
            vec!["Muhammad Ahmad Khan Niazi", "Bilal Ahmed"]
        );
    }

    #[test]
    fn test_party_names_split_around_vocabulary() {
        assert_eq!(PartyNameMatcher.find("Dear Hassan Ali,"), vec!["Hassan Ali"]);
        assert_eq!(
            PartyNameMatcher.find("Property is at Flat 4B, Gulberg Heights, Karachi."),
            Vec::<String>::new()
        );
        assert_eq!(
            PartyNameMatcher.find("hiring Sarah Ahmed as Senior Software Engineer at Tech Solutions Ltd"),
            vec!["Sarah Ahmed"]
        );
        assert!(PartyNameMatcher.find("Under Pakistani contract law").is_empty());
    }

    #[test]
    fn test_amounts() {
        let text = "Monthly rent PKR 45,000, security deposit Rs. 90,000 and 2,500,000 rupees owed; \
                    also pkr 500000.";
        assert_eq!(
            AmountMatcher.find(text),
            vec!["PKR 45,000", "Rs. 90,000", "2,500,000 rupees", "pkr 500000"]
        );
        assert_eq!(AmountMatcher.find("Rs 2.5 million"), vec!["Rs 2.5 million"]);
        assert!(AmountMatcher.find("a wall 2 feet into my property").is_empty());
    }

    #[test]
    fn test_dates() {
        let text = "dated January 15, 2024, due on 1st of March, 2024, signed 2024-03-05 \
                    and received 15/01/2024; starting 1 December 2024";
        assert_eq!(
            DateMatcher.find(text),
            vec![
                "January 15, 2024",
                "1st of March, 2024",
                "2024-03-05",
                "15/01/2024",
                "1 December 2024"
            ]
        );
        assert!(DateMatcher.find("a period of 2 years").is_empty());
    }

    #[test]
    fn test_extract_dedups_across_messages() {
        let conversation = Conversation::from(vec![
            Message::user("breach of contract, Ahmad Khan owes PKR 500000"),
            Message::assistant("Ahmad Khan may claim PKR 500000 from the date of default."),
            Message::user("The payment was due on February 1, 2024."),
        ]);

        let fields = FieldExtractor::default().extract(&conversation);
        assert_eq!(fields.party_names, vec!["Ahmad Khan"]);
        assert_eq!(fields.monetary_amounts, vec!["PKR 500000"]);
        assert_eq!(fields.dates, vec!["February 1, 2024"]);
    }

    #[test]
    fn test_custom_matcher_set() {
        let extractor = FieldExtractor::new(vec![Box::new(DateMatcher)]);
        let fields = extractor.extract_text("Ahmad Khan paid PKR 10 on 2024-01-01");
        assert!(fields.party_names.is_empty());
        assert!(fields.monetary_amounts.is_empty());
        assert_eq!(fields.dates, vec!["2024-01-01"]);
    }
}
