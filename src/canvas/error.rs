// SPDX-License-Identifier: MIT

//! Typed error handling for kinetic-canvas
//!
//! Edit-time failures (`EditError`, `ConnectionError`) are resolved locally by
//! the session; everything that crosses a file or process boundary funnels
//! into `CanvasError`.

use thiserror::Error;

/// Top-level error type for kinetic-canvas
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Configuration errors (bad env values, unreadable catalog path)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Graph editing errors
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// Wire document could not be turned into a typed document
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Capability catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Why a proposed edge was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// One of the endpoint ids is not in the document
    #[error("unresolvable endpoint")]
    UnresolvableEndpoint,

    #[error("tools cannot connect directly to other tools; route through an agent")]
    ToolToTool,

    #[error("agents cannot connect directly to other agents")]
    AgentToAgent,
}

/// Errors raised by edit session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Connection refused by the rule evaluator
    #[error("connection rejected: {0}")]
    Rejected(#[from] ConnectionError),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node id already in use: {0}")]
    DuplicateNode(String),

    /// Configuration applied to a node of another role
    #[error("node {id} is a {actual} node, expected {expected}")]
    WrongRole {
        id: String,
        expected: String,
        actual: String,
    },
}

/// Errors converting a loose wire node into a typed node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("node {0} has no recognizable role")]
    UnknownRole(String),

    #[error("node {id} is missing {field}")]
    MissingField { id: String, field: String },

    #[error("node {id} has an unknown {field}: {value}")]
    InvalidField {
        id: String,
        field: String,
        value: String,
    },
}

/// Capability catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {message}")]
    Source { path: String, message: String },
}

impl CanvasError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl EditError {
    pub fn wrong_role(id: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::WrongRole {
            id: id.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
