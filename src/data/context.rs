//! Data context handed to one generation call.

use serde::{Deserialize, Serialize};

use super::{Record, RecordList, Value};
use crate::error::{Error, Result};

/// The data one output document is generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataContext {
    /// One record; loop data comes from its list-valued fields
    Single(Record),
    /// A chunk of records; the whole list drives every loop region
    List(RecordList),
}

impl DataContext {
    /// Parse JSON: an object becomes `Single`, an array becomes `List`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value {
            serde_json::Value::Object(_) => Ok(DataContext::Single(serde_json::from_value(value)?)),
            serde_json::Value::Array(_) => Ok(DataContext::List(serde_json::from_value(value)?)),
            other => Err(Error::InvalidData(format!(
                "expected a JSON object or array, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// The record single values are filled from: the sole record, or the
    /// first record of a list.
    pub fn primary(&self) -> Option<&Record> {
        match self {
            DataContext::Single(record) => Some(record),
            DataContext::List(list) => list.first(),
        }
    }

    /// Records that drive the loop region `name`.
    ///
    /// Returns an empty list (zero iterations) when no data is found.
    pub fn loop_records(&self, name: &str) -> RecordList {
        match self {
            DataContext::List(list) => list.clone(),
            DataContext::Single(record) => match record.get(name) {
                Some(Value::List(list)) => list.clone(),
                Some(Value::Text(text)) if looks_like_json_array(text) => {
                    match RecordList::from_json_str(text.trim()) {
                        Ok(list) => list,
                        Err(e) => {
                            log::warn!("loop data for '{name}' is not a valid record array: {e}");
                            RecordList::new()
                        }
                    }
                }
                _ => {
                    log::warn!("no loop data found for '{name}'");
                    RecordList::new()
                }
            },
        }
    }

    /// Number of records in the context.
    pub fn record_count(&self) -> usize {
        match self {
            DataContext::Single(_) => 1,
            DataContext::List(list) => list.len(),
        }
    }
}

impl From<Record> for DataContext {
    fn from(record: Record) -> Self {
        DataContext::Single(record)
    }
}

impl From<RecordList> for DataContext {
    fn from(list: RecordList) -> Self {
        DataContext::List(list)
    }
}

fn looks_like_json_array(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('[') && trimmed.ends_with(']')
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_object_and_array() {
        let single = DataContext::from_json_str(r#"{"Name": "张三"}"#).unwrap();
        assert!(matches!(single, DataContext::Single(_)));
        assert_eq!(single.primary().unwrap().text("Name"), Some("张三".to_string()));

        let list = DataContext::from_json_str(r#"[{"Name": "A"}, {"Name": "B"}]"#).unwrap();
        assert_eq!(list.record_count(), 2);
        assert_eq!(list.primary().unwrap().text("Name"), Some("A".to_string()));

        assert!(matches!(
            DataContext::from_json_str("42"),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_list_drives_every_loop() {
        let context = DataContext::from_json_str(r#"[{"Item": "A"}, {"Item": "B"}]"#).unwrap();
        assert_eq!(context.loop_records("Anything").len(), 2);
    }

    #[test]
    fn test_single_uses_named_list_or_json_text() {
        let items: RecordList = vec![Record::new().with("Item", "A")].into();
        let record = Record::new()
            .with("Items", items)
            .with("Rows", r#" [{"Cell": "x"}, {"Cell": "y"}] "#)
            .with("Broken", "[not json]")
            .with("Name", "plain");
        let context = DataContext::Single(record);

        assert_eq!(context.loop_records("Items").len(), 1);
        assert_eq!(context.loop_records("Rows").len(), 2);
        assert!(context.loop_records("Broken").is_empty());
        assert!(context.loop_records("Name").is_empty());
        assert!(context.loop_records("Missing").is_empty());
    }

    #[test]
    fn test_string_array_field_is_accepted() {
        let context = DataContext::from_json_str(r#"{"Name":"A","Tags":["x","y"]}"#).unwrap();
        let record = context.primary().unwrap();
        assert_eq!(record.text("Name").as_deref(), Some("A"));
        assert_eq!(record.text("Tags").as_deref(), Some(r#"["x","y"]"#));
        assert!(context.loop_records("Tags").is_empty());
    }

    #[test]
    fn test_empty_list_has_no_primary() {
        let context = DataContext::List(RecordList::new());
        assert!(context.primary().is_none());
    }
}
