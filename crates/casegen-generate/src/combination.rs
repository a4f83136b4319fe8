use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::canonical::to_canonical_string;

/// One selected value per dimension.
///
/// Entries keep the dimension declaration order for serialization, while
/// equality is structural: two combinations with the same key/value pairs
/// are equal regardless of entry order.
#[derive(Debug, Clone, Default)]
pub struct OptionCombination {
    entries: Vec<(String, Value)>,
}

impl OptionCombination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a dimension value, replacing an existing entry in place.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Copy of this combination with one dimension overridden.
    pub fn with_override(&self, name: &str, value: &Value) -> Self {
        let mut combination = self.clone();
        combination.set(name, value.clone());
        combination
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Python-style JSON text with object keys sorted at every level.
    ///
    /// See [`crate::canonical`] for the exact layout.
    pub fn canonical_json(&self) -> String {
        let sorted: BTreeMap<&str, Value> = self
            .entries
            .iter()
            .map(|(name, value)| (name.as_str(), canonical_value(value)))
            .collect();
        // Keys are strings and values are already JSON, so encoding cannot fail.
        to_canonical_string(&sorted).unwrap_or_default()
    }
}

fn canonical_value(value: &Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut keys: Vec<&String> = object.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(inner) = object.get(key) {
                    sorted.insert(key.clone(), canonical_value(inner));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_value).collect()),
        other => other.clone(),
    }
}

impl PartialEq for OptionCombination {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for OptionCombination {}

impl<N: Into<String>> FromIterator<(N, Value)> for OptionCombination {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        let mut combination = OptionCombination::new();
        for (name, value) in iter {
            combination.set(name, value);
        }
        combination
    }
}

impl Serialize for OptionCombination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionCombination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CombinationVisitor)
    }
}

struct CombinationVisitor;

impl<'de> Visitor<'de> for CombinationVisitor {
    type Value = OptionCombination;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of dimension name to option value")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut combination = OptionCombination::new();
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            combination.set(name, value);
        }
        Ok(combination)
    }
}
