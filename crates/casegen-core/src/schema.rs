use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::Result;

/// Top-level option schema document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OptionSchema {
    /// Categories keyed by name. The strategy plan decides processing order.
    #[serde(default)]
    pub test_categories: BTreeMap<String, CategoryConfig>,
}

impl OptionSchema {
    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.test_categories.get(name)
    }
}

/// Option dimensions for one category of test cases.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryConfig {
    /// Entity under test (ex.: `BufferCreation`).
    pub base_type: String,
    /// Dimensions in declaration order.
    #[schemars(with = "BTreeMap<String, DimensionSpec>")]
    pub option_dimensions: OptionDimensions,
}

/// Ordered list of legal values for one dimension.
///
/// Position matters: strategies pick the first, last, and middle values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DimensionSpec {
    pub values: Vec<Value>,
}

impl DimensionSpec {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Named dimensions kept in the order they were declared in the document.
///
/// Serialized as a JSON object. A repeated key replaces the earlier spec but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionDimensions {
    entries: Vec<(String, DimensionSpec)>,
}

impl OptionDimensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: DimensionSpec) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = spec,
            None => self.entries.push((name, spec)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DimensionSpec> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, spec)| spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DimensionSpec)> {
        self.entries
            .iter()
            .map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, DimensionSpec)> for OptionDimensions {
    fn from_iter<I: IntoIterator<Item = (N, DimensionSpec)>>(iter: I) -> Self {
        let mut dimensions = OptionDimensions::new();
        for (name, spec) in iter {
            dimensions.insert(name, spec);
        }
        dimensions
    }
}

impl Serialize for OptionDimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, spec) in &self.entries {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionDimensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(OptionDimensionsVisitor)
    }
}

struct OptionDimensionsVisitor;

impl<'de> Visitor<'de> for OptionDimensionsVisitor {
    type Value = OptionDimensions;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of dimension name to {\"values\": [...]}")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut dimensions = OptionDimensions::new();
        while let Some((name, spec)) = access.next_entry::<String, DimensionSpec>()? {
            dimensions.insert(name, spec);
        }
        Ok(dimensions)
    }
}

/// Read and parse an option schema document from disk.
pub fn load_schema(path: &Path) -> Result<OptionSchema> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn dimensions_keep_declaration_order() {
        let raw = r#"{
            "base_type": "BufferCreation",
            "option_dimensions": {
                "usage": { "values": ["Vertex", "Index"] },
                "size": { "values": [0, 256] },
                "mapped_at_creation": { "values": [false, true] }
            }
        }"#;

        let config: CategoryConfig = serde_json::from_str(raw).expect("parse category");
        let names: Vec<&str> = config.option_dimensions.names().collect();
        assert_eq!(names, vec!["usage", "size", "mapped_at_creation"]);

        let encoded = serde_json::to_string(&config.option_dimensions).expect("encode");
        assert!(encoded.find("usage") < encoded.find("mapped_at_creation"));
    }

    #[test]
    fn repeated_dimension_replaces_in_place() {
        let raw = r#"{ "a": { "values": [1] }, "b": { "values": [2] }, "a": { "values": [3] } }"#;
        let dimensions: OptionDimensions = serde_json::from_str(raw).expect("parse dims");

        assert_eq!(dimensions.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(dimensions.get("a").map(|d| d.values.clone()), Some(vec![json!(3)]));
    }

    #[test]
    fn unknown_category_is_absent() {
        let schema: OptionSchema =
            serde_json::from_str(r#"{ "test_categories": {} }"#).expect("parse schema");
        assert!(schema.category("buffer_creation").is_none());
    }
}
