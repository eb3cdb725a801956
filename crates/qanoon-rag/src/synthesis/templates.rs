//! Section layouts for each document type.
//!
//! Every slot is filled from extracted fields or shows an explicit placeholder.
//! Nothing here invents facts.

use super::classify::DocumentType;
use super::extract::MatchedFields;
use super::Section;
use crate::conversation::{Conversation, Role};

pub const PARTY_PLACEHOLDER: &str = "[PARTY NAME NOT PROVIDED]";
pub const AMOUNT_PLACEHOLDER: &str = "[AMOUNT NOT PROVIDED]";
pub const DATE_PLACEHOLDER: &str = "[DATE NOT PROVIDED]";
pub const FACTS_PLACEHOLDER: &str = "[FACTS NOT PROVIDED]";

const SIGNATURE_BLOCK: &str = "Signature: ____________________\nDate: ____________________";

fn slot<'a>(values: &'a [String], index: usize, placeholder: &'a str) -> &'a str {
    values.get(index).map(String::as_str).unwrap_or(placeholder)
}

fn list_or_placeholder(values: &[String], placeholder: &str) -> String {
    if values.is_empty() {
        placeholder.to_string()
    } else {
        values.join(", ")
    }
}

/// What the user told us, verbatim, for slots no pattern could fill
fn statement_of_facts(conversation: &Conversation) -> String {
    let facts: Vec<&str> = conversation
        .contents_by(Role::User)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if facts.is_empty() {
        FACTS_PLACEHOLDER.to_string()
    } else {
        facts.join("\n\n")
    }
}

fn extracted_details(fields: &MatchedFields) -> Section {
    Section::new(
        "Extracted Details",
        format!(
            "Parties: {}\nAmounts: {}\nDates: {}",
            list_or_placeholder(&fields.party_names, PARTY_PLACEHOLDER),
            list_or_placeholder(&fields.monetary_amounts, AMOUNT_PLACEHOLDER),
            list_or_placeholder(&fields.dates, DATE_PLACEHOLDER),
        ),
    )
}

pub(crate) fn sections(
    doc_type: &DocumentType,
    fields: &MatchedFields,
    conversation: &Conversation,
) -> Vec<Section> {
    let first_party = slot(&fields.party_names, 0, PARTY_PLACEHOLDER);
    let second_party = slot(&fields.party_names, 1, PARTY_PLACEHOLDER);
    let first_amount = slot(&fields.monetary_amounts, 0, AMOUNT_PLACEHOLDER);
    let second_amount = slot(&fields.monetary_amounts, 1, AMOUNT_PLACEHOLDER);
    let first_date = slot(&fields.dates, 0, DATE_PLACEHOLDER);
    let second_date = slot(&fields.dates, 1, DATE_PLACEHOLDER);
    let facts = statement_of_facts(conversation);

    let mut sections = match doc_type {
        DocumentType::BreachOfContractNotice => vec![
            Section::new(
                "Parties",
                format!("From (on behalf of): {}\nTo: {}", first_party, second_party),
            ),
            Section::new("Subject", "Legal notice for breach of contract and demand for payment"),
            Section::new("Statement of Facts", facts),
            Section::new(
                "Breach",
                format!(
                    "Under the contract dated {} between {} and {}, the sum of {} fell due on {} \
                     and remains unpaid. This failure to perform constitutes a breach of contract.",
                    first_date, first_party, second_party, first_amount, second_date
                ),
            ),
            Section::new(
                "Demand",
                format!(
                    "You are called upon to pay {} to {} within fifteen (15) days of receipt of \
                     this notice, failing which proceedings for recovery of the amount, together \
                     with damages and costs, will be initiated without further notice.",
                    first_amount, first_party
                ),
            ),
        ],
        DocumentType::EmploymentContract => vec![
            Section::new(
                "Parties",
                format!("Employer: {}\nEmployee: {}", second_party, first_party),
            ),
            Section::new(
                "Appointment and Commencement",
                format!("The employment commences on {}.", first_date),
            ),
            Section::new(
                "Remuneration",
                format!("The Employee shall receive a monthly salary of {}.", first_amount),
            ),
            Section::new("Background", facts),
            Section::new(
                "Termination",
                "Either party may terminate this contract by giving written notice as agreed \
                 between the parties and subject to applicable labour law.",
            ),
        ],
        DocumentType::LeaseAgreement => vec![
            Section::new(
                "Parties",
                format!("Lessor (Landlord): {}\nLessee (Tenant): {}", first_party, second_party),
            ),
            Section::new("Premises and Background", facts),
            Section::new(
                "Term",
                format!("The lease commences on {}.", first_date),
            ),
            Section::new(
                "Rent and Security Deposit",
                format!(
                    "Monthly rent: {}\nSecurity deposit: {}",
                    first_amount, second_amount
                ),
            ),
            Section::new(
                "Obligations",
                "The Lessee shall pay rent on time, keep the premises in good condition and not \
                 sublet without the Lessor's written consent.",
            ),
        ],
        DocumentType::LegalNotice => vec![
            Section::new(
                "Parties",
                format!("From (on behalf of): {}\nTo: {}", first_party, second_party),
            ),
            Section::new("Subject", "Legal notice"),
            Section::new("Statement of Facts", facts),
            Section::new(
                "Demand",
                format!(
                    "You are called upon to remedy the matters stated above within fifteen (15) \
                     days of receipt of this notice. Relevant date: {}.",
                    first_date
                ),
            ),
            Section::new(
                "Consequences",
                "Failing compliance, legal proceedings will be initiated against you at your \
                 risk as to costs.",
            ),
        ],
        DocumentType::Other(_) => vec![
            Section::new(
                "Parties",
                format!("First party: {}\nSecond party: {}", first_party, second_party),
            ),
            Section::new("Statement of Facts", facts),
        ],
    };

    sections.push(extracted_details(fields));
    sections.push(Section::new("Execution", SIGNATURE_BLOCK));
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;

    fn render(sections: &[Section]) -> String {
        sections
            .iter()
            .map(|s| format!("{}\n{}", s.heading, s.body))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let conversation = Conversation::from(vec![Message::user("I need a lease.")]);
        let text = render(&sections(
            &DocumentType::LeaseAgreement,
            &MatchedFields::default(),
            &conversation,
        ));
        assert!(text.contains(PARTY_PLACEHOLDER));
        assert!(text.contains(AMOUNT_PLACEHOLDER));
        assert!(text.contains(DATE_PLACEHOLDER));
        assert!(text.contains("I need a lease."));
    }

    #[test]
    fn test_extracted_fields_fill_slots() {
        let fields = MatchedFields {
            party_names: vec!["Ahmad Khan".into(), "Bilal Ahmed".into()],
            monetary_amounts: vec!["PKR 2,500,000".into()],
            dates: vec!["March 1, 2024".into(), "April 15, 2024".into()],
        };
        let conversation = Conversation::from(vec![Message::user("breach")]);
        let text = render(&sections(
            &DocumentType::BreachOfContractNotice,
            &fields,
            &conversation,
        ));
        assert!(text.contains("From (on behalf of): Ahmad Khan\nTo: Bilal Ahmed"));
        assert!(text.contains("fell due on April 15, 2024"));
        assert!(text.contains("You are called upon to pay PKR 2,500,000 to Ahmad Khan"));
        assert!(!text.contains(PARTY_PLACEHOLDER));
    }

    #[test]
    fn test_facts_placeholder_without_user_text() {
        let conversation = Conversation::from(vec![Message::assistant("How can I help?")]);
        let text = render(&sections(
            &DocumentType::Other(String::new()),
            &MatchedFields::default(),
            &conversation,
        ));
        assert!(text.contains(FACTS_PLACEHOLDER));
        assert!(!text.contains("How can I help?"));
    }
}
