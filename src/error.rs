//! Structured errors for callers and AI agents to parse

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{code:?}] {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    InvalidSelector,
    InvalidArgument,
    SnapshotInvalid,
    Io,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            context: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Add one key to the context object, creating it when absent
    pub fn with_context_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        let context = self
            .context
            .get_or_insert_with(|| serde_json::Value::Object(Default::default()));
        if let Some(map) = context.as_object_mut() {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn not_found(selector: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("No element matching: {}", selector),
        )
    }

    /// Collection search miss, e.g. `for text= "Save"`
    pub fn search_not_found(attribute: &str, text: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("No child found for {}= \"{}\"", attribute, text),
        )
        .with_context(serde_json::json!({
            "attribute": attribute,
            "text": text,
        }))
    }

    pub fn selector_invalid(selector: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::InvalidSelector,
            format!("Invalid selector '{}': {}", selector, reason),
        )
    }

    pub fn invalid_argument(name: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::InvalidArgument,
            format!("Invalid argument '{}': {}", name, reason),
        )
    }

    pub fn snapshot_invalid(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::SnapshotInvalid, reason)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::snapshot_invalid(e.to_string())
    }
}
