//! History entries and the exchange document used by persistence collaborators
//!
//! The document shape is
//! `{"history": [{"chord": "0:maj7", "voicing": [48, 64, 67]}, "7:7", ...], "timestamp": 1700000000000}`.
//! Bare encoded strings are accepted on import and get an empty voicing.

use crate::types::chord::Chord;
use crate::types::voicing::Voicing;

/// A chord together with the voicing that was sounding when it was chosen
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryEntry {
    pub chord: Chord,
    #[cfg_attr(feature = "serde", serde(default))]
    pub voicing: Voicing,
}

impl HistoryEntry {
    pub fn new(chord: Chord, voicing: Voicing) -> Self {
        HistoryEntry { chord, voicing }
    }

    /// Entry with no recorded voicing (e.g. seeded from an imported song)
    pub fn unvoiced(chord: Chord) -> Self {
        HistoryEntry {
            chord,
            voicing: Vec::new(),
        }
    }
}

/// Exported history
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HistoryDocument {
    pub history: Vec<HistoryEntry>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub timestamp: Option<u64>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum HistoryItem {
    Encoded(String),
    Entry(HistoryEntry),
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawDocument {
    #[serde(default)]
    history: Vec<serde_json::Value>,
    #[serde(default)]
    timestamp: Option<u64>,
}

#[cfg(feature = "serde")]
impl HistoryDocument {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, skipping items that are neither shape
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        let raw: RawDocument = serde_json::from_str(text)?;
        let mut history = Vec::with_capacity(raw.history.len());
        for (idx, value) in raw.history.into_iter().enumerate() {
            match serde_json::from_value::<HistoryItem>(value) {
                Ok(HistoryItem::Encoded(encoded)) => {
                    history.push(HistoryEntry::unvoiced(Chord::decode(&encoded)))
                }
                Ok(HistoryItem::Entry(entry)) => history.push(entry),
                Err(e) => tracing::warn!("skipping history item {}: {}", idx, e),
            }
        }
        Ok(HistoryDocument {
            history,
            timestamp: raw.timestamp,
        })
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_shape() {
        let doc = HistoryDocument {
            history: vec![HistoryEntry::new(Chord::new(2, "m7"), vec![50, 65, 69])],
            timestamp: None,
        };
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"history": [{"chord": "2:m7", "voicing": [50, 65, 69]}]})
        );
    }

    #[test]
    fn test_import_accepts_both_item_shapes() {
        let doc = HistoryDocument::from_json(
            r#"{"history": ["7:7", {"chord": "0:maj7", "voicing": [48, 64, 71]}, {"chord": "5:"}],
                "timestamp": 12}"#,
        )
        .unwrap();
        assert_eq!(
            doc.history,
            vec![
                HistoryEntry::unvoiced(Chord::new(7, "7")),
                HistoryEntry::new(Chord::new(0, "maj7"), vec![48, 64, 71]),
                HistoryEntry::unvoiced(Chord::new(5, "")),
            ]
        );
        assert_eq!(doc.timestamp, Some(12));
    }

    #[test]
    fn test_import_skips_malformed_items() {
        let doc = HistoryDocument::from_json(
            r#"{"history": [42, {"voicing": [1]}, {"chord": "9:m7", "voicing": [999]}, "bogus"]}"#,
        )
        .unwrap();
        // "bogus" is still a string, so it decodes to the default chord
        assert_eq!(doc.history, vec![HistoryEntry::unvoiced(Chord::default())]);
    }

    #[test]
    fn test_import_rejects_non_documents() {
        assert!(HistoryDocument::from_json("not json").is_err());
    }
}
