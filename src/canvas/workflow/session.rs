// SPDX-License-Identifier: MIT

//! Edit session
//!
//! An `EditSession` owns one graph document and is the only way edits reach
//! it. Connection attempts go through the rule evaluator first, admitted
//! edges through capability sync, and every applied change is announced as
//! an [`EditEvent`] to subscribers.

use serde::Serialize;
use tokio::sync::mpsc;

use super::rules;
use super::sync::{self, CapabilityChange};
use super::types::{
    AgentPayload, Edge, FlowDocument, IoKind, IoPayload, IoSettings, Node, NodePayload,
    NodeRole, Position, ToolPayload, Viewport, WorkflowDocument,
};
use super::validator;
use crate::canvas::catalog::{CapabilityDescriptor, CapabilityKind};
use crate::canvas::error::EditError;

/// A requested edge, as produced by the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_handles(
        mut self,
        source_handle: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        self.source_handle = Some(source_handle.into());
        self.target_handle = Some(target_handle.into());
        self
    }
}

/// Partial update of an agent node's configuration
#[derive(Debug, Clone, Default)]
pub struct AgentSettings {
    pub instructions: Option<String>,
    pub model_provider: Option<String>,
    pub model_name: Option<String>,
}

/// Partial update of an input/output node's configuration
#[derive(Debug, Clone, Default)]
pub struct IoUpdate {
    pub placeholder: Option<String>,
    pub settings: Option<IoSettings>,
}

/// Something that happened to the document, for UI feedback
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditEvent {
    NodeAdded { node_id: String, name: String },
    NodeMoved { node_id: String, position: Position },
    NodeConfigured { node_id: String },
    NodesRemoved { node_ids: Vec<String> },
    EdgeAdded { edge_id: String, source: String, target: String },
    EdgesRemoved { edge_ids: Vec<String> },
    ConnectionRejected { source: String, target: String, reason: String },
    CapabilityAssigned { agent_id: String, capability: String },
    CapabilityRevoked { agent_id: String, capability: String },
}

impl EditEvent {
    /// Human-readable notice for this event
    pub fn notice(&self) -> String {
        match self {
            EditEvent::NodeAdded { name, .. } => format!("Added {} to workflow", name),
            EditEvent::NodeMoved { node_id, .. } => format!("Moved {}", node_id),
            EditEvent::NodeConfigured { node_id } => format!("Updated {}", node_id),
            EditEvent::NodesRemoved { node_ids } => {
                format!("Removed {} node(s)", node_ids.len())
            }
            EditEvent::EdgeAdded { source, target, .. } => {
                format!("Connected {} to {}", source, target)
            }
            EditEvent::EdgesRemoved { edge_ids } => {
                format!("Removed {} connection(s)", edge_ids.len())
            }
            EditEvent::ConnectionRejected { reason, .. } => reason.clone(),
            EditEvent::CapabilityAssigned {
                agent_id,
                capability,
            } => format!("{} can now use {}", agent_id, capability),
            EditEvent::CapabilityRevoked {
                agent_id,
                capability,
            } => format!("{} can no longer use {}", agent_id, capability),
        }
    }
}

impl From<CapabilityChange> for EditEvent {
    fn from(change: CapabilityChange) -> Self {
        match change {
            CapabilityChange::Assigned {
                agent_id,
                capability,
            } => EditEvent::CapabilityAssigned {
                agent_id,
                capability,
            },
            CapabilityChange::Revoked {
                agent_id,
                capability,
            } => EditEvent::CapabilityRevoked {
                agent_id,
                capability,
            },
        }
    }
}

/// Single-owner editing session over one graph document
#[derive(Debug, Default)]
pub struct EditSession {
    document: WorkflowDocument,
    next_node: u64,
    next_edge: u64,
    subscribers: Vec<mpsc::UnboundedSender<EditEvent>>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume editing an existing document
    pub fn from_document(document: WorkflowDocument) -> Self {
        Self {
            document,
            ..Default::default()
        }
    }

    pub fn document(&self) -> &WorkflowDocument {
        &self.document
    }

    /// Owned copy; later edits never reach it
    pub fn snapshot(&self) -> WorkflowDocument {
        self.document.clone()
    }

    /// Wire rendering of the current document, ready for submission
    pub fn to_flow(&self) -> FlowDocument {
        self.document.to_flow()
    }

    pub fn validate(&self) -> Vec<String> {
        validator::validate(&self.document)
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EditEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: EditEvent) {
        log::debug!("{}", event.notice());
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn mint_node_id(&mut self) -> String {
        loop {
            let id = format!("node_{}", self.next_node);
            self.next_node += 1;
            if !self.document.contains_node(&id) {
                return id;
            }
        }
    }

    fn mint_edge_id(&mut self) -> String {
        loop {
            let id = format!("edge_{}", self.next_edge);
            self.next_edge += 1;
            if !self.document.contains_edge(&id) {
                return id;
            }
        }
    }

    fn push_node(&mut self, node: Node) -> String {
        let id = node.id.clone();
        let name = node.display_name();
        log::info!("Adding {} node {} ({})", node.role(), id, name);
        self.document.nodes.push(node);
        self.emit(EditEvent::NodeAdded {
            node_id: id.clone(),
            name,
        });
        id
    }

    /// Drop a catalog component onto the canvas
    pub fn add_component(&mut self, descriptor: &CapabilityDescriptor, position: Position) -> String {
        let payload = match descriptor.kind {
            CapabilityKind::Tool => NodePayload::Tool(ToolPayload {
                tool_id: descriptor.id.clone(),
                name: descriptor.name.clone(),
                description: descriptor.description.clone(),
                category: descriptor.category.clone(),
                input_schema: descriptor.input_schema.clone(),
                output_schema: descriptor.output_schema.clone(),
            }),
            CapabilityKind::Agent => {
                NodePayload::Agent(AgentPayload::new(&descriptor.id, &descriptor.name))
            }
        };
        let id = self.mint_node_id();
        self.push_node(Node::new(id, position, payload))
    }

    /// Drop a chat/text input or output component onto the canvas
    pub fn add_io_node(
        &mut self,
        role: NodeRole,
        kind: IoKind,
        position: Position,
    ) -> Result<String, EditError> {
        let payload = match role {
            NodeRole::Input => NodePayload::Input(IoPayload::new(true, kind)),
            NodeRole::Output => NodePayload::Output(IoPayload::new(false, kind)),
            other => {
                return Err(EditError::wrong_role(
                    "(new node)",
                    "input or output",
                    other.as_str(),
                ))
            }
        };
        let id = self.mint_node_id();
        Ok(self.push_node(Node::new(id, position, payload)))
    }

    /// Add a node under its own id
    pub fn insert_node(&mut self, node: Node) -> Result<String, EditError> {
        if self.document.contains_node(&node.id) {
            return Err(EditError::DuplicateNode(node.id));
        }
        Ok(self.push_node(node))
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), EditError> {
        let node = self
            .document
            .node_mut(id)
            .ok_or_else(|| EditError::NodeNotFound(id.to_string()))?;
        node.position = position;
        self.emit(EditEvent::NodeMoved {
            node_id: id.to_string(),
            position,
        });
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.document.viewport = Some(viewport);
    }

    /// Try to add an edge. Rejected attempts leave the document untouched.
    pub fn connect(&mut self, connection: Connection) -> Result<String, EditError> {
        let admitted = rules::evaluate(
            self.document.node(&connection.source),
            self.document.node(&connection.target),
        );

        if let Err(reason) = admitted {
            log::warn!(
                "Rejected connection {} -> {}: {}",
                connection.source,
                connection.target,
                reason
            );
            self.emit(EditEvent::ConnectionRejected {
                source: connection.source,
                target: connection.target,
                reason: reason.to_string(),
            });
            return Err(reason.into());
        }

        let edge = Edge {
            id: self.mint_edge_id(),
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
        };
        self.document.edges.push(edge.clone());
        self.emit(EditEvent::EdgeAdded {
            edge_id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        });

        if let Some(change) = sync::on_edge_added(&mut self.document, &edge) {
            self.emit(change.into());
        }

        Ok(edge.id)
    }

    /// Delete a batch of edges. Unknown ids are skipped.
    pub fn remove_edges(&mut self, ids: &[&str]) -> Vec<Edge> {
        let (removed, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.document.edges)
            .into_iter()
            .partition(|e| ids.contains(&e.id.as_str()));
        self.document.edges = kept;

        if removed.is_empty() {
            return removed;
        }

        self.emit(EditEvent::EdgesRemoved {
            edge_ids: removed.iter().map(|e| e.id.clone()).collect(),
        });
        for change in sync::on_edges_removed(&mut self.document, &removed) {
            self.emit(change.into());
        }

        removed
    }

    /// Delete nodes together with their incident edges. Edges go first so
    /// capability sync still sees the tools they came from.
    pub fn remove_nodes(&mut self, ids: &[&str]) -> Vec<Node> {
        let incident: Vec<String> = self
            .document
            .edges
            .iter()
            .filter(|e| ids.contains(&e.source.as_str()) || ids.contains(&e.target.as_str()))
            .map(|e| e.id.clone())
            .collect();
        let incident: Vec<&str> = incident.iter().map(String::as_str).collect();
        self.remove_edges(&incident);

        let (removed, kept): (Vec<Node>, Vec<Node>) = std::mem::take(&mut self.document.nodes)
            .into_iter()
            .partition(|n| ids.contains(&n.id.as_str()));
        self.document.nodes = kept;

        if !removed.is_empty() {
            self.emit(EditEvent::NodesRemoved {
                node_ids: removed.iter().map(|n| n.id.clone()).collect(),
            });
        }

        removed
    }

    /// Write agent configuration straight into the document
    pub fn configure_agent(&mut self, id: &str, settings: AgentSettings) -> Result<(), EditError> {
        let node = self
            .document
            .node_mut(id)
            .ok_or_else(|| EditError::NodeNotFound(id.to_string()))?;
        let role = node.role();
        let agent = node
            .as_agent_mut()
            .ok_or_else(|| EditError::wrong_role(id, "agent", role.as_str()))?;

        if let Some(instructions) = settings.instructions {
            agent.instructions = instructions;
        }
        if settings.model_provider.is_some() {
            agent.model_provider = settings.model_provider;
        }
        if settings.model_name.is_some() {
            agent.model_name = settings.model_name;
        }

        self.emit(EditEvent::NodeConfigured {
            node_id: id.to_string(),
        });
        Ok(())
    }

    /// Write input/output configuration straight into the document
    pub fn configure_io(&mut self, id: &str, update: IoUpdate) -> Result<(), EditError> {
        let node = self
            .document
            .node_mut(id)
            .ok_or_else(|| EditError::NodeNotFound(id.to_string()))?;
        let role = node.role();
        let io = node
            .as_io_mut()
            .ok_or_else(|| EditError::wrong_role(id, "input or output", role.as_str()))?;

        if let Some(placeholder) = update.placeholder {
            io.placeholder = placeholder;
        }
        if let Some(settings) = update.settings {
            io.settings = settings;
        }

        self.emit(EditEvent::NodeConfigured {
            node_id: id.to_string(),
        });
        Ok(())
    }
}
