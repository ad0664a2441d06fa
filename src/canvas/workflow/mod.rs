// SPDX-License-Identifier: MIT

//! Workflow graph consistency engine
//!
//! Edits flow through [`session::EditSession`]: the connection rules admit
//! or reject an edge, capability sync updates agent payloads, and the
//! document changes in place. Saved documents go through
//! [`submission::SubmissionHandler`], which runs the structural validator.

pub mod loader;
pub mod rules;
pub mod session;
pub mod submission;
pub mod sync;
pub mod types;
pub mod validator;

pub use session::{AgentSettings, Connection, EditEvent, EditSession, IoUpdate};
pub use submission::{SubmissionHandler, Verdict, VerdictStatus};
pub use types::{
    AgentPayload, Edge, FlowDocument, FlowEdge, FlowNode, IoKind, IoPayload, IoSettings, Node,
    NodePayload, NodeRole, Position, TextFormat, ToolPayload, Viewport, WorkflowDocument,
};
pub use validator::validate;
