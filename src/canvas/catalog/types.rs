// SPDX-License-Identifier: MIT

//! Capability descriptor types

use serde::{Deserialize, Serialize};

/// Whether a catalog entry becomes a tool node or an agent node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    #[default]
    Tool,
    Agent,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Agent => "agent",
        }
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry. Only `id` and `kind` mean anything to the engine; the
/// rest is carried along as metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    /// JSON schema as a string
    pub input_schema: String,
    /// JSON schema as a string
    pub output_schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, alias = "type")]
    pub kind: CapabilityKind,
}
