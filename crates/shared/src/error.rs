use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(ErrorDetail::Message(detail.into())),
        }
    }

    pub fn message(&self) -> Option<String> {
        self.detail.as_ref().and_then(ErrorDetail::message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
    Other(Value),
}

/// One entry of a request validation failure list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub loc: Vec<Value>,
    pub msg: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ValidationIssue {
    fn describe(&self) -> String {
        let location = self
            .loc
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        if location.is_empty() {
            self.msg.clone()
        } else {
            format!("{location}: {}", self.msg)
        }
    }
}

impl ErrorDetail {
    /// Human readable text, `None` when the detail carries nothing to show.
    pub fn message(&self) -> Option<String> {
        let text = match self {
            Self::Message(message) => message.trim().to_string(),
            Self::Validation(issues) => issues
                .iter()
                .map(ValidationIssue::describe)
                .collect::<Vec<_>>()
                .join("; "),
            Self::Other(Value::Null) => String::new(),
            Self::Other(value) => value.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}
