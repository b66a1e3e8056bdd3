use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::backend::Level;

/// Number of recent searches shown next to the search form.
pub const RECENT_LIMIT: usize = 10;

/// A normalized search-history record.
///
/// The backend has stored history both as bare term strings (older accounts)
/// and as `{term, level, explanation}` objects. Both shapes collapse into this
/// record as soon as they are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub term: String,
    pub level: Option<Level>,
    pub explanation: Option<String>,
}

impl HistoryEntry {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            level: None,
            explanation: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireHistoryItem {
    Legacy(String),
    Record {
        term: String,
        #[serde(default)]
        level: Option<String>,
        #[serde(default)]
        explanation: Option<String>,
    },
}

pub fn normalize(items: Vec<Value>) -> Vec<HistoryEntry> {
    items.into_iter().filter_map(normalize_item).collect()
}

fn normalize_item(value: Value) -> Option<HistoryEntry> {
    let entry = match serde_json::from_value::<WireHistoryItem>(value).ok()? {
        WireHistoryItem::Legacy(term) => HistoryEntry::new(term),
        WireHistoryItem::Record {
            term,
            level,
            explanation,
        } => HistoryEntry {
            term,
            level: level.as_deref().and_then(Level::parse),
            explanation,
        },
    };

    if entry.term.trim().is_empty() {
        return None;
    }

    Some(entry)
}

/// Accepts either a bare array or an object wrapping it under `search_history`
/// or `history`.
pub fn from_response(body: Value) -> Vec<HistoryEntry> {
    match body {
        Value::Array(items) => normalize(items),
        Value::Object(mut map) => ["search_history", "history"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .map(normalize)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// `deserialize_with` adapter for embedded history arrays that may be `null`.
pub fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(normalize(raw.unwrap_or_default()))
}

/// Most recent entries first. The backend appends, so the tail is newest.
pub fn recent(entries: &[HistoryEntry], limit: usize) -> impl Iterator<Item = &HistoryEntry> {
    entries.iter().rev().take(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_legacy_and_record_shapes() {
        let entries = normalize(vec![
            json!("osmosis"),
            json!({"term": "entropy", "level": "expert", "explanation": "Disorder."}),
            json!({"term": "ion", "level": "wizard"}),
        ]);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], HistoryEntry::new("osmosis"));
        assert_eq!(entries[1].level, Some(Level::Expert));
        assert_eq!(entries[1].explanation.as_deref(), Some("Disorder."));
        assert_eq!(entries[2].level, None);
    }

    #[test]
    fn drops_entries_without_a_term() {
        let entries = normalize(vec![
            json!({"level": "student"}),
            json!(42),
            json!(null),
            json!("   "),
            json!({"term": null}),
            json!("atom"),
        ]);

        assert_eq!(entries, vec![HistoryEntry::new("atom")]);
    }

    #[test]
    fn unwraps_object_responses() {
        let wrapped = from_response(json!({"search_history": ["cell", {"term": "gene"}]}));
        assert_eq!(
            wrapped.iter().map(|e| e.term.as_str()).collect::<Vec<_>>(),
            vec!["cell", "gene"]
        );

        assert!(from_response(json!({"message": "nothing"})).is_empty());
        assert!(from_response(json!("oops")).is_empty());
    }

    #[test]
    fn null_history_deserializes_as_empty() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "deserialize_entries")]
            search_history: Vec<HistoryEntry>,
        }

        let holder: Holder = serde_json::from_value(json!({"search_history": null})).unwrap();
        assert!(holder.search_history.is_empty());

        let holder: Holder = serde_json::from_value(json!({})).unwrap();
        assert!(holder.search_history.is_empty());
    }

    #[test]
    fn recent_lists_newest_first() {
        let entries = vec![
            HistoryEntry::new("a"),
            HistoryEntry::new("b"),
            HistoryEntry::new("c"),
        ];
        let terms: Vec<_> = recent(&entries, 2).map(|e| e.term.as_str()).collect();
        assert_eq!(terms, vec!["c", "b"]);
    }
}
