use std::fmt;

use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::SequenceType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceInput {
    pub sequence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_type: Option<SequenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<String>,
}

impl SequenceInput {
    pub fn new(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            sequence_type: None,
            sequence_id: None,
        }
    }

    pub fn with_type(mut self, sequence_type: SequenceType) -> Self {
        self.sequence_type = Some(sequence_type);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastaInput {
    pub fasta_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_type: Option<SequenceType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceOutput {
    pub result: String,
    pub original_sequence: String,
    pub sequence_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceStats {
    pub length: u64,
    pub composition: Composition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc_content: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<f64>,
    pub sequence_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<String>,
}

/// Outcome of a single tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformResult {
    Sequence(SequenceOutput),
    Statistics(SequenceStats),
}

impl From<SequenceOutput> for TransformResult {
    fn from(value: SequenceOutput) -> Self {
        Self::Sequence(value)
    }
}

impl From<SequenceStats> for TransformResult {
    fn from(value: SequenceStats) -> Self {
        Self::Statistics(value)
    }
}

/// Symbol counts in the order the backend listed them.
///
/// JSON objects decode into this without losing key order; a repeated key is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composition {
    entries: Vec<(String, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate composition symbol '{0}'")]
pub struct DuplicateSymbol(pub String);

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, count: u64) -> Result<(), DuplicateSymbol> {
        let symbol = symbol.into();
        if self.get(&symbol).is_some() {
            return Err(DuplicateSymbol(symbol));
        }
        self.entries.push((symbol, count));
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == symbol)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries
            .iter()
            .map(|(symbol, count)| (symbol.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, (_, count)| total.saturating_add(*count))
    }
}

impl<S: Into<String>> TryFrom<Vec<(S, u64)>> for Composition {
    type Error = DuplicateSymbol;

    fn try_from(pairs: Vec<(S, u64)>) -> Result<Self, Self::Error> {
        let mut composition = Self::new();
        for (symbol, count) in pairs {
            composition.insert(symbol, count)?;
        }
        Ok(composition)
    }
}

impl Serialize for Composition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (symbol, count) in &self.entries {
            map.serialize_entry(symbol, count)?;
        }
        map.end()
    }
}

struct CompositionVisitor;

impl<'de> Visitor<'de> for CompositionVisitor {
    type Value = Composition;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of symbol to non-negative count")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut composition = Composition {
            entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
        };
        while let Some((symbol, count)) = access.next_entry::<String, u64>()? {
            composition.insert(symbol, count).map_err(de::Error::custom)?;
        }
        Ok(composition)
    }
}

impl<'de> Deserialize<'de> for Composition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CompositionVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemError {
    #[serde(default)]
    pub sequence_id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSequenceOutput {
    pub results: Vec<SequenceOutput>,
    pub total_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    #[serde(default)]
    pub errors: Vec<BatchItemError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSequenceStats {
    pub results: Vec<SequenceStats>,
    pub total_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    #[serde(default)]
    pub errors: Vec<BatchItemError>,
}
