use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata stored next to each passage in the vector index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Language tag such as `en`, `en-PK` or `ur`. Empty when the index has none.
    #[serde(default)]
    pub lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, flatten)]
    pub extra: HashMap<String, String>,
}

impl DocumentMetadata {
    pub fn with_lang(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            ..Self::default()
        }
    }

    /// Build from a loosely typed metadata map as returned by the index.
    /// Non-string scalars are stringified; nulls are skipped.
    pub fn from_json_map(map: HashMap<String, serde_json::Value>) -> Self {
        let mut metadata = Self::default();
        for (key, value) in map {
            let value = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            match key.as_str() {
                "lang" => metadata.lang = value,
                "source" => metadata.source = Some(value),
                "topic" => metadata.topic = Some(value),
                _ => {
                    metadata.extra.insert(key, value);
                }
            }
        }
        metadata
    }
}

/// One nearest-neighbour result, before filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    pub text: String,
    pub metadata: DocumentMetadata,
    /// Lower is more relevant
    pub distance: f32,
}

impl RawHit {
    pub fn new(text: impl Into<String>, metadata: DocumentMetadata, distance: f32) -> Self {
        Self {
            text: text.into(),
            metadata,
            distance,
        }
    }
}

/// A passage that survived filtering and may ground an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub text: String,
    pub distance: f32,
    /// Length of `text` in characters
    pub length: usize,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl From<RawHit> for EvidenceItem {
    fn from(hit: RawHit) -> Self {
        let length = hit.text.chars().count();
        Self {
            length,
            text: hit.text,
            distance: hit.distance,
            language: hit.metadata.lang,
            source: hit.metadata.source,
            topic: hit.metadata.topic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_from_json_map() {
        let map: HashMap<String, serde_json::Value> = serde_json::from_value(json!({
            "lang": "en",
            "topic": "contract_law",
            "page": 4,
            "reviewed": true,
            "source": null
        }))
        .unwrap();

        let metadata = DocumentMetadata::from_json_map(map);
        assert_eq!(metadata.lang, "en");
        assert_eq!(metadata.topic.as_deref(), Some("contract_law"));
        assert_eq!(metadata.source, None);
        assert_eq!(metadata.extra.get("page").map(String::as_str), Some("4"));
        assert_eq!(metadata.extra.get("reviewed").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_evidence_length_counts_characters() {
        let hit = RawHit::new("قانون law", DocumentMetadata::with_lang("ur"), 0.4);
        let item = EvidenceItem::from(hit);
        assert_eq!(item.length, 9);
        assert_eq!(item.length, item.text.chars().count());
        assert_eq!(item.language, "ur");
    }
}
