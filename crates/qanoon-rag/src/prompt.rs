//! Evidence-grounded prompt construction
//!
//! The prompt confines the model to the supplied passages and asks it to say so
//! when they are not enough. Evidence is added whole, in rank order, until the
//! character budget is spent.

use std::collections::HashSet;

use crate::types::EvidenceItem;

const INSTRUCTIONS: &str = "You are a legal research assistant for Pakistani law.\n\
Answer the question using ONLY the evidence passages provided below. \
Do not use outside knowledge and do not invent statutes, sections, case names, parties, dates or amounts.\n\
If the evidence does not contain enough information to answer, say clearly that the available evidence \
is insufficient to answer instead of guessing.\n\
Cite the passages you rely on by their number, written as [Evidence N].";

const NO_EVIDENCE: &str = "(No evidence passages are available for this question.)";

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_context_chars: usize,
}

impl PromptBuilder {
    pub fn new(max_context_chars: usize) -> Self {
        Self { max_context_chars }
    }

    /// Evidence that fits the budget, duplicates removed, rank order kept.
    /// The first item is always kept so a single long passage still grounds the answer.
    pub fn select<'a>(&self, evidence: &'a [EvidenceItem]) -> Vec<&'a EvidenceItem> {
        let mut seen = HashSet::new();
        let mut used = 0usize;
        let mut selected = Vec::new();

        for item in evidence {
            if !seen.insert(item.text.as_str()) {
                tracing::debug!(distance = item.distance, "Skipping duplicate evidence passage");
                continue;
            }
            if !selected.is_empty() && used + item.length > self.max_context_chars {
                tracing::debug!(
                    chars = item.length,
                    used,
                    budget = self.max_context_chars,
                    "Evidence passage exceeds context budget"
                );
                continue;
            }
            used += item.length;
            selected.push(item);
        }
        selected
    }

    pub fn build(&self, query: &str, evidence: &[EvidenceItem]) -> String {
        let selected = self.select(evidence);

        let mut prompt = String::with_capacity(
            INSTRUCTIONS.len() + query.len() + selected.iter().map(|e| e.text.len() + 64).sum::<usize>(),
        );
        prompt.push_str(INSTRUCTIONS);
        prompt.push_str("\n\nEVIDENCE:\n");

        if selected.is_empty() {
            prompt.push_str(NO_EVIDENCE);
            prompt.push('\n');
        }
        for (i, item) in selected.iter().enumerate() {
            prompt.push_str(&format!("[Evidence {}]", i + 1));
            if let Some(label) = source_label(item) {
                prompt.push_str(&format!(" ({})", label));
            }
            prompt.push('\n');
            prompt.push_str(&item.text);
            prompt.push_str("\n\n");
        }

        prompt.push_str("QUESTION:\n");
        prompt.push_str(query);
        prompt.push_str(
            "\n\nAnswer strictly from the evidence above. \
If it is insufficient, state that the evidence is insufficient.\n\nANSWER:\n",
        );
        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(crate::config::RetrievalConfig::default().max_context_chars)
    }
}

fn source_label(item: &EvidenceItem) -> Option<String> {
    let parts: Vec<String> = [("source", &item.source), ("topic", &item.topic)]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}: {}", key, v)))
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}
