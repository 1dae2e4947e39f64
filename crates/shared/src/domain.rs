use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceType {
    Dna,
    Rna,
    Protein,
    #[default]
    Auto,
}

impl SequenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dna => "dna",
            Self::Rna => "rna",
            Self::Protein => "protein",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sequence type '{0}' (expected dna, rna, protein or auto)")]
pub struct UnknownSequenceType(pub String);

impl FromStr for SequenceType {
    type Err = UnknownSequenceType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dna" => Ok(Self::Dna),
            "rna" => Ok(Self::Rna),
            "protein" => Ok(Self::Protein),
            "auto" => Ok(Self::Auto),
            _ => Err(UnknownSequenceType(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Basic,
    Conversion,
    Analysis,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 3] = [Self::Basic, Self::Conversion, Self::Analysis];

    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic operations",
            Self::Conversion => "Sequence conversion",
            Self::Analysis => "Sequence analysis",
        }
    }
}

/// Stable identifiers of the tools a session can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    ReverseComplement,
    Transcribe,
    ReverseTranscribe,
    Translate,
    Uppercase,
    Lowercase,
    Stats,
}

impl ToolId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReverseComplement => "reverse-complement",
            Self::Transcribe => "transcribe",
            Self::ReverseTranscribe => "reverse-transcribe",
            Self::Translate => "translate",
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Stats => "stats",
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool '{0}'")]
pub struct UnknownToolId(pub String);

impl FromStr for ToolId {
    type Err = UnknownToolId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        let id = match normalized.as_str() {
            "reverse-complement" | "revcomp" => Self::ReverseComplement,
            "transcribe" => Self::Transcribe,
            "reverse-transcribe" => Self::ReverseTranscribe,
            "translate" => Self::Translate,
            "uppercase" | "upper" => Self::Uppercase,
            "lowercase" | "lower" => Self::Lowercase,
            "stats" => Self::Stats,
            _ => return Err(UnknownToolId(raw.to_string())),
        };
        Ok(id)
    }
}
