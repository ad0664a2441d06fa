// SPDX-License-Identifier: MIT

//! Workflow submission
//!
//! Accepts a raw graph document, checks its shape, runs the structural
//! validator and answers with a [`Verdict`]. Nothing is executed or stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::types::FlowDocument;
use super::validator;

/// Outcome status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Received,
    Validated,
    Error,
}

/// Structured submission outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub message: String,
    pub workflow_id: String,
    pub status: VerdictStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Set only by [`Verdict::internal`]; not part of the wire shape
    #[serde(skip)]
    internal: bool,
}

impl Verdict {
    pub const RECEIVED: &'static str = "workflow data received and logged";
    pub const VALIDATION_FAILED: &'static str = "workflow validation failed";
    pub const MALFORMED: &'static str = "invalid workflow data structure";
    pub const INTERNAL: &'static str = "internal server error during workflow processing";

    /// Verdict for an unexpected failure outside validation
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: Self::INTERNAL.to_string(),
            workflow_id: error_id(),
            status: VerdictStatus::Error,
            errors: Some(vec![message.into()]),
            internal: true,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == VerdictStatus::Error
    }

    /// HTTP status convention for this verdict
    pub fn http_status(&self) -> u16 {
        match self.status {
            VerdictStatus::Received | VerdictStatus::Validated => 200,
            VerdictStatus::Error if self.internal => 500,
            VerdictStatus::Error => 400,
        }
    }
}

fn workflow_id() -> String {
    format!("workflow-{}", Uuid::new_v4())
}

fn error_id() -> String {
    format!("error-{}", Uuid::new_v4())
}

/// Stateless submission handler; every call mints a new workflow id
#[derive(Debug, Clone, Default)]
pub struct SubmissionHandler;

impl SubmissionHandler {
    pub fn new() -> Self {
        Self
    }

    /// Submit an already-parsed JSON payload
    pub fn submit(&self, raw: &Value) -> Verdict {
        match FlowDocument::deserialize(raw) {
            Ok(doc) => self.submit_document(&doc),
            Err(e) => Self::malformed(e.to_string()),
        }
    }

    /// Submit a request body; invalid JSON is a malformed submission
    pub fn submit_bytes(&self, body: &[u8]) -> Verdict {
        match serde_json::from_slice::<FlowDocument>(body) {
            Ok(doc) => self.submit_document(&doc),
            Err(e) => Self::malformed(e.to_string()),
        }
    }

    /// Validate a well-formed document
    pub fn submit_document(&self, doc: &FlowDocument) -> Verdict {
        let workflow_id = workflow_id();
        log::info!(
            "Workflow {} received at {}: {} nodes, {} edges",
            workflow_id,
            chrono::Utc::now().to_rfc3339(),
            doc.nodes.len(),
            doc.edges.len()
        );
        if log::log_enabled!(log::Level::Debug) {
            match serde_json::to_string_pretty(doc) {
                Ok(json) => log::debug!("Workflow {} data:\n{}", workflow_id, json),
                Err(e) => log::warn!("Could not render workflow {}: {}", workflow_id, e),
            }
        }

        let errors = validator::validate(doc);
        if !errors.is_empty() {
            log::warn!(
                "Workflow {} failed validation with {} errors",
                workflow_id,
                errors.len()
            );
            return Verdict {
                message: Verdict::VALIDATION_FAILED.to_string(),
                workflow_id,
                status: VerdictStatus::Error,
                errors: Some(errors),
                internal: false,
            };
        }

        Verdict {
            message: Verdict::RECEIVED.to_string(),
            workflow_id,
            status: VerdictStatus::Received,
            errors: None,
            internal: false,
        }
    }

    fn malformed(reason: String) -> Verdict {
        log::warn!("Rejected malformed workflow submission: {}", reason);
        Verdict {
            message: Verdict::MALFORMED.to_string(),
            workflow_id: error_id(),
            status: VerdictStatus::Error,
            errors: Some(vec![reason]),
            internal: false,
        }
    }
}
