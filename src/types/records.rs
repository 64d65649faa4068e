//! Retrieval-stage types: schema-flexible records and degraded-mode batches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which store a batch came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RetrieverKind {
    Tabular,
    Graph,
    Document,
}

impl std::fmt::Display for RetrieverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrieverKind::Tabular => write!(f, "tabular"),
            RetrieverKind::Graph => write!(f, "graph"),
            RetrieverKind::Document => write!(f, "document"),
        }
    }
}

/// One row returned by a retriever: field name to scalar/string value.
///
/// The field set depends on the producing retriever and operation. Records
/// are never mutated once a retriever hands them out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RetrievalRecord(Map<String, Value>);

impl RetrievalRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style field insertion, used while constructing a record.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String view of a field. Numbers are rendered, nulls and missing fields
    /// are `None`.
    pub fn get_str(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RetrievalRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl std::fmt::Display for RetrievalRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

/// Records from one retriever call.
///
/// `degraded` is set when the backend failed and the records are the canned
/// fallback dataset rather than live data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordBatch {
    pub source: RetrieverKind,
    pub records: Vec<RetrievalRecord>,
    pub degraded: bool,
}

impl RecordBatch {
    pub fn live(source: RetrieverKind, records: Vec<RetrievalRecord>) -> Self {
        Self {
            source,
            records,
            degraded: false,
        }
    }

    pub fn degraded(source: RetrieverKind, records: Vec<RetrievalRecord>) -> Self {
        Self {
            source,
            records,
            degraded: true,
        }
    }

    pub fn empty(source: RetrieverKind) -> Self {
        Self::live(source, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&RetrievalRecord> {
        self.records.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_string_view() {
        let record = RetrievalRecord::new()
            .with("rig", "Rig Alpha")
            .with("reading", 1850.5)
            .with("note", Value::Null);

        assert_eq!(record.get_str("rig").as_deref(), Some("Rig Alpha"));
        assert_eq!(record.get_str("reading").as_deref(), Some("1850.5"));
        assert_eq!(record.get_str("note"), None);
        assert_eq!(record.get_str("missing"), None);
        assert_eq!(record.get_f64("reading"), Some(1850.5));
    }

    #[test]
    fn test_record_serializes_as_flat_object() {
        let record = RetrievalRecord::new().with("well", "Well W-12");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"well": "Well W-12"}));
    }

    #[test]
    fn test_batch_degraded_flag() {
        let live = RecordBatch::live(RetrieverKind::Graph, vec![RetrievalRecord::new()]);
        let canned = RecordBatch::degraded(RetrieverKind::Graph, vec![RetrievalRecord::new()]);
        assert!(!live.degraded);
        assert!(canned.degraded);
        assert_eq!(live.records, canned.records);
        assert!(RecordBatch::empty(RetrieverKind::Document).is_empty());
    }
}
