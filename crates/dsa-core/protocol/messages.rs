//! JSON request and response messages
//!
//! Both directions are objects tagged by `type` in kebab-case, with the
//! payload under `data` (or `message` for errors).

use crate::analysis::AnalysisResult;
use crate::document::VariableRef;
use crate::utils::CoreError;
use crate::variables::BindReport;
use serde::{Deserialize, Serialize};

/// Payload carrying a color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPayload {
    pub hex: String,
}

/// Payload of a bind request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindPayload {
    pub hex: String,
    pub variable_key: String,
}

/// Payload of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePayload {
    pub hex: String,
    /// Collection name to create the variable in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

/// Incoming request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    AnalyzeDesignSystem,
    FindVariables { data: ColorPayload },
    UseVariable { data: BindPayload },
    ReplaceColor { data: BindPayload },
    CreateVariable { data: CreatePayload },
}

impl Request {
    /// Every accepted `type` tag.
    pub const KINDS: [&'static str; 5] = [
        "analyze-design-system",
        "find-variables",
        "use-variable",
        "replace-color",
        "create-variable",
    ];
}

/// Variables matching a searched color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableOptions {
    pub hex: String,
    pub variables: Vec<VariableRef>,
}

/// Outgoing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    AnalysisResults { data: AnalysisResult },
    VariableOptions { data: VariableOptions },
    VariableCreated { data: VariableRef },
    ColorsReplaced { data: BindReport },
    Error { message: String },
}

impl Response {
    /// Error response carrying the error's message.
    #[must_use]
    pub fn error(err: &CoreError) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }

    /// Whether this is an error response.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
