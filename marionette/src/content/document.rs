use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::ContentType;
use crate::{ContentError, ContentResult};

/// Sections every document must have, even if empty
pub const REQUIRED_SECTIONS: [&str; 7] = [
    "meshes",
    "nodes",
    "skins",
    "animations",
    "accessors",
    "bufferViews",
    "buffers",
];

/// The parsed scene document. Read-only for the lifetime of a load.
#[derive(Debug, Clone)]
pub struct Document {
    root: Map<String, Value>,
    empty: Map<String, Value>,
}

impl Document {
    /// Parse a document, checking that all of the required sections are present
    pub fn from_slice(bytes: &[u8]) -> ContentResult<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> ContentResult<Self> {
        let Value::Object(root) = value else {
            return Err(ContentError::format("the document is not an object"));
        };

        for section in REQUIRED_SECTIONS {
            match root.get(section) {
                Some(Value::Object(_)) => {}
                Some(_) => {
                    return Err(ContentError::format(format!(
                        "section {section} is not an object"
                    )))
                }
                None => {
                    return Err(ContentError::format(format!(
                        "required section {section} is missing"
                    )))
                }
            }
        }

        Ok(Self {
            root,
            empty: Map::new(),
        })
    }

    /// A named section. Optional sections that are absent read as empty.
    pub fn section(&self, name: &str) -> &Map<String, Value> {
        match self.root.get(name) {
            Some(Value::Object(section)) => section,
            _ => &self.empty,
        }
    }

    /// Find the entry for `name` in the section holding `content_type`
    pub fn entry(&self, content_type: ContentType, name: &str) -> ContentResult<&Value> {
        self.section(content_type.section()).get(name).ok_or_else(|| {
            ContentError::format(format!(
                "{} {name} does not exist in section {}",
                content_type.type_name(),
                content_type.section()
            ))
        })
    }

    /// All entries of the section holding `content_type`, in key order
    pub fn entries(&self, content_type: ContentType) -> impl Iterator<Item = (&str, &Value)> {
        self.section(content_type.section())
            .iter()
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Any other top level value, eg. `scene`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }
}

/// Deserialize a document entry, reporting problems against its key
pub(crate) fn from_entry<T: DeserializeOwned>(key: &str, entry: &Value) -> ContentResult<T> {
    T::deserialize(entry).map_err(|e| ContentError::format(format!("{key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "meshes": {}, "nodes": {"a": {}}, "skins": {}, "animations": {},
            "accessors": {}, "bufferViews": {}, "buffers": {}
        })
    }

    #[test]
    pub fn test_sections() {
        let document = Document::from_value(minimal()).unwrap();
        assert!(document.entry(ContentType::Node, "a").is_ok());
        assert!(document
            .entry(ContentType::Node, "b")
            .unwrap_err()
            .is_format_error());
        assert!(document.section("textures").is_empty());
        assert_eq!(document.entries(ContentType::Node).count(), 1);
    }

    #[test]
    pub fn test_missing_section() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("skins");
        assert!(Document::from_value(value).unwrap_err().is_format_error());
        assert!(Document::from_slice(b"[1, 2]").unwrap_err().is_format_error());
        assert!(Document::from_slice(b"{ nope").unwrap_err().is_format_error());
    }
}
