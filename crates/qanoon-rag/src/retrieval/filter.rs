//! Evidence filtering: drop index noise and foreign-language passages, rank the rest

use crate::config::RetrievalConfig;
use crate::types::{EvidenceItem, RawHit};

/// Why a raw hit did not become evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    TooShort,
    Language,
    InvalidDistance,
}

#[derive(Debug, Clone)]
pub struct EvidenceFilter {
    min_chars: usize,
    language_prefix: String,
}

impl EvidenceFilter {
    pub fn new(min_chars: usize, language_prefix: impl Into<String>) -> Self {
        Self {
            min_chars,
            language_prefix: language_prefix.into().to_lowercase(),
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.min_passage_chars, config.language_prefix.clone())
    }

    /// Returns the reason a hit is rejected, or `None` if it is admissible.
    pub fn check(&self, hit: &RawHit) -> Option<DropReason> {
        if !hit.distance.is_finite() {
            return Some(DropReason::InvalidDistance);
        }
        if hit.text.chars().count() < self.min_chars {
            return Some(DropReason::TooShort);
        }
        if !self.language_allowed(&hit.metadata.lang) {
            return Some(DropReason::Language);
        }
        None
    }

    /// Untagged and `unknown` passages pass; anything else must carry the prefix.
    fn language_allowed(&self, lang: &str) -> bool {
        let lang = lang.trim().to_lowercase();
        lang.is_empty() || lang == "unknown" || lang.starts_with(&self.language_prefix)
    }

    /// Filter, sort nearest-first and keep at most `return_top` items.
    /// An empty result means "no grounding available", not a failure.
    pub fn filter(&self, raw: Vec<RawHit>, return_top: usize) -> Vec<EvidenceItem> {
        let total = raw.len();
        let mut kept: Vec<EvidenceItem> = raw
            .into_iter()
            .filter(|hit| match self.check(hit) {
                Some(reason) => {
                    tracing::debug!(
                        reason = ?reason,
                        chars = hit.text.chars().count(),
                        lang = %hit.metadata.lang,
                        distance = hit.distance,
                        "Dropping retrieved passage"
                    );
                    false
                }
                None => true,
            })
            .map(EvidenceItem::from)
            .collect();

        kept.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        kept.truncate(return_top);

        tracing::debug!(raw = total, kept = kept.len(), "Evidence filter applied");
        kept
    }
}

impl Default for EvidenceFilter {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}
