// SPDX-License-Identifier: MIT

//! Graph document types
//!
//! Two shapes live here. `WorkflowDocument` is the typed model the editing
//! engine works on: every node carries a payload variant chosen by its role.
//! `FlowDocument` is the loose shape clients submit, where node `data` is a
//! free JSON object. The two convert into each other.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::canvas::error::DocumentError;

/// 2D canvas coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Canvas viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Fixed category of a node, governs connection rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Tool,
    Agent,
    Input,
    Output,
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Tool => "tool",
            NodeRole::Agent => "agent",
            NodeRole::Input => "input",
            NodeRole::Output => "output",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tool" => Some(NodeRole::Tool),
            "agent" => Some(NodeRole::Agent),
            "input" => Some(NodeRole::Input),
            "output" => Some(NodeRole::Output),
            _ => None,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-kind of an input/output node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoKind {
    Chat,
    Text,
}

/// Content format of a text input/output node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
    Json,
    Xml,
}

impl TextFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextFormat::Plain => "plain",
            TextFormat::Markdown => "markdown",
            TextFormat::Json => "json",
            TextFormat::Xml => "xml",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "plain" => Some(TextFormat::Plain),
            "markdown" => Some(TextFormat::Markdown),
            "json" => Some(TextFormat::Json),
            "xml" => Some(TextFormat::Xml),
            _ => None,
        }
    }
}

/// Payload of a tool node
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPayload {
    /// Capability identifier granted to agents this tool connects to
    pub tool_id: String,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    /// Opaque JSON schema text
    pub input_schema: String,
    /// Opaque JSON schema text
    pub output_schema: String,
}

/// Payload of an agent node
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPayload {
    /// Catalog id of the agent component
    pub agent_id: String,
    pub name: String,
    pub instructions: String,
    /// Assigned capability ids. Set semantics, append order kept for display.
    pub available_tools: Vec<String>,
    pub model_provider: Option<String>,
    pub model_name: Option<String>,
}

impl AgentPayload {
    pub const DEFAULT_INSTRUCTIONS: &'static str =
        "You are a helpful assistant that can use tools to complete tasks.";

    pub fn new(agent_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            instructions: Self::DEFAULT_INSTRUCTIONS.to_string(),
            available_tools: Vec::new(),
            model_provider: None,
            model_name: None,
        }
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.available_tools.iter().any(|t| t == capability)
    }

    /// Append a capability if absent. Returns whether the set changed.
    pub fn assign(&mut self, capability: &str) -> bool {
        if self.has_capability(capability) {
            return false;
        }
        self.available_tools.push(capability.to_string());
        true
    }

    /// Remove one occurrence of a capability. Returns whether the set changed.
    pub fn revoke(&mut self, capability: &str) -> bool {
        match self.available_tools.iter().position(|t| t == capability) {
            Some(idx) => {
                self.available_tools.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// Sub-kind specific settings of an input/output node
#[derive(Debug, Clone, PartialEq)]
pub enum IoSettings {
    Chat { system_message: Option<String> },
    Text { format: TextFormat, max_length: u32 },
}

/// Payload of an input or output node
#[derive(Debug, Clone, PartialEq)]
pub struct IoPayload {
    pub placeholder: String,
    pub settings: IoSettings,
}

impl IoPayload {
    pub const DEFAULT_MAX_LENGTH: u32 = 1000;

    /// Payload with the palette defaults for the given direction and sub-kind
    pub fn new(is_input: bool, kind: IoKind) -> Self {
        let (placeholder, settings) = match (kind, is_input) {
            (IoKind::Chat, true) => (
                "Enter your message...",
                IoSettings::Chat {
                    system_message: None,
                },
            ),
            (IoKind::Chat, false) => (
                "Response will appear here...",
                IoSettings::Chat {
                    system_message: None,
                },
            ),
            (IoKind::Text, true) => ("Enter text...", Self::default_text()),
            (IoKind::Text, false) => ("Output will appear here...", Self::default_text()),
        };
        Self {
            placeholder: placeholder.to_string(),
            settings,
        }
    }

    fn default_text() -> IoSettings {
        IoSettings::Text {
            format: TextFormat::Plain,
            max_length: Self::DEFAULT_MAX_LENGTH,
        }
    }

    pub fn kind(&self) -> IoKind {
        match self.settings {
            IoSettings::Chat { .. } => IoKind::Chat,
            IoSettings::Text { .. } => IoKind::Text,
        }
    }
}

/// Role-specific node payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Tool(ToolPayload),
    Agent(AgentPayload),
    Input(IoPayload),
    Output(IoPayload),
}

impl NodePayload {
    pub fn role(&self) -> NodeRole {
        match self {
            NodePayload::Tool(_) => NodeRole::Tool,
            NodePayload::Agent(_) => NodeRole::Agent,
            NodePayload::Input(_) => NodeRole::Input,
            NodePayload::Output(_) => NodeRole::Output,
        }
    }
}

/// A node of the typed graph document
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub payload: NodePayload,
}

impl Node {
    pub fn new(id: impl Into<String>, position: Position, payload: NodePayload) -> Self {
        Self {
            id: id.into(),
            position,
            payload,
        }
    }

    pub fn role(&self) -> NodeRole {
        self.payload.role()
    }

    pub fn as_tool(&self) -> Option<&ToolPayload> {
        match &self.payload {
            NodePayload::Tool(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_agent(&self) -> Option<&AgentPayload> {
        match &self.payload {
            NodePayload::Agent(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn as_agent_mut(&mut self) -> Option<&mut AgentPayload> {
        match &mut self.payload {
            NodePayload::Agent(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn as_io_mut(&mut self) -> Option<&mut IoPayload> {
        match &mut self.payload {
            NodePayload::Input(io) | NodePayload::Output(io) => Some(io),
            _ => None,
        }
    }

    /// Label used in user notices
    pub fn display_name(&self) -> String {
        match &self.payload {
            NodePayload::Tool(tool) => tool.name.clone(),
            NodePayload::Agent(agent) => agent.name.clone(),
            NodePayload::Input(io) => format!("{} Input", kind_label(io.kind())),
            NodePayload::Output(io) => format!("{} Output", kind_label(io.kind())),
        }
    }
}

fn kind_label(kind: IoKind) -> &'static str {
    match kind {
        IoKind::Chat => "Chat",
        IoKind::Text => "Text",
    }
}

/// A directed edge between two node ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }
}

/// Typed graph document, the single source of truth of an editing session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub viewport: Option<Viewport>,
}

impl WorkflowDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }

    /// Render into the wire shape clients submit
    pub fn to_flow(&self) -> FlowDocument {
        FlowDocument {
            nodes: self.nodes.iter().map(FlowNode::from).collect(),
            edges: self.edges.iter().map(FlowEdge::from).collect(),
            viewport: self.viewport,
        }
    }

    /// Interpret a wire document. Node ids are copied as-is; uniqueness is
    /// the validator's concern.
    pub fn from_flow(flow: &FlowDocument) -> Result<Self, DocumentError> {
        let nodes = flow
            .nodes
            .iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let edges = flow
            .edges
            .iter()
            .map(|e| Edge {
                id: e.id.clone(),
                source: e.source.clone(),
                target: e.target.clone(),
                source_handle: e.source_handle.clone(),
                target_handle: e.target_handle.clone(),
            })
            .collect();

        Ok(Self {
            nodes,
            edges,
            viewport: flow.viewport,
        })
    }
}

// ============================================================================
// Wire shape
// ============================================================================

/// Submitted graph document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowDocument {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

/// Submitted node; `data` is not interpreted by validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dragging: Option<bool>,
}

/// Submitted edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

/// Flat record stored in a wire node's `data`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_config: Option<AgentConfigData>,
    /// Direction ("input"/"output") of a chat node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chat_type: Option<String>,
    /// Direction ("input"/"output") of a text node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_length: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentConfigData {
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    available_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_name: Option<String>,
}

impl From<&Node> for FlowNode {
    fn from(node: &Node) -> Self {
        let role = node.role();
        let mut data = NodeData {
            role: Some(role.as_str().to_string()),
            ..Default::default()
        };

        let node_type = match &node.payload {
            NodePayload::Tool(tool) => {
                data.tool_id = Some(tool.tool_id.clone());
                data.tool_name = Some(tool.name.clone());
                data.tool_description = Some(tool.description.clone());
                data.input_schema = Some(tool.input_schema.clone());
                data.output_schema = Some(tool.output_schema.clone());
                data.category = tool.category.clone();
                "toolNode"
            }
            NodePayload::Agent(agent) => {
                data.tool_id = Some(agent.agent_id.clone());
                data.tool_name = Some(agent.name.clone());
                data.agent_config = Some(AgentConfigData {
                    instructions: Some(agent.instructions.clone()),
                    available_tools: agent.available_tools.clone(),
                    model_provider: agent.model_provider.clone(),
                    model_name: agent.model_name.clone(),
                });
                "agentNode"
            }
            NodePayload::Input(io) | NodePayload::Output(io) => {
                data.placeholder = Some(io.placeholder.clone());
                match &io.settings {
                    IoSettings::Chat { system_message } => {
                        data.chat_type = Some(role.as_str().to_string());
                        data.system_message = system_message.clone();
                        "chatNode"
                    }
                    IoSettings::Text { format, max_length } => {
                        data.text_type = Some(role.as_str().to_string());
                        data.format = Some(format.as_str().to_string());
                        data.max_length = Some(*max_length);
                        "textNode"
                    }
                }
            }
        };

        let data = match serde_json::to_value(data) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        };

        FlowNode {
            id: node.id.clone(),
            node_type: Some(node_type.to_string()),
            position: node.position,
            data,
            width: None,
            height: None,
            selected: None,
            dragging: None,
        }
    }
}

impl From<&Edge> for FlowEdge {
    fn from(edge: &Edge) -> Self {
        FlowEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            source_handle: edge.source_handle.clone(),
            target_handle: edge.target_handle.clone(),
            edge_type: None,
            animated: None,
            style: None,
            data: None,
        }
    }
}

impl TryFrom<&FlowNode> for Node {
    type Error = DocumentError;

    fn try_from(flow: &FlowNode) -> Result<Self, Self::Error> {
        let data: NodeData = match &flow.data {
            Some(map) => serde_json::from_value(Value::Object(map.clone())).map_err(|e| {
                DocumentError::InvalidField {
                    id: flow.id.clone(),
                    field: "data".to_string(),
                    value: e.to_string(),
                }
            })?,
            None => NodeData::default(),
        };

        let role = resolve_role(flow, &data)?;
        let payload = match role {
            NodeRole::Tool => NodePayload::Tool(ToolPayload {
                tool_id: require(&flow.id, "toolId", data.tool_id)?,
                name: data.tool_name.unwrap_or_default(),
                description: data.tool_description.unwrap_or_default(),
                category: data.category,
                input_schema: data.input_schema.unwrap_or_default(),
                output_schema: data.output_schema.unwrap_or_default(),
            }),
            NodeRole::Agent => {
                let config = data.agent_config.unwrap_or_default();
                NodePayload::Agent(AgentPayload {
                    agent_id: data.tool_id.unwrap_or_default(),
                    name: data.tool_name.unwrap_or_default(),
                    instructions: config
                        .instructions
                        .unwrap_or_else(|| AgentPayload::DEFAULT_INSTRUCTIONS.to_string()),
                    available_tools: dedup(config.available_tools),
                    model_provider: config.model_provider,
                    model_name: config.model_name,
                })
            }
            NodeRole::Input | NodeRole::Output => {
                let io = io_payload(flow, role, data)?;
                if role == NodeRole::Input {
                    NodePayload::Input(io)
                } else {
                    NodePayload::Output(io)
                }
            }
        };

        Ok(Node {
            id: flow.id.clone(),
            position: flow.position,
            payload,
        })
    }
}

fn resolve_role(flow: &FlowNode, data: &NodeData) -> Result<NodeRole, DocumentError> {
    let declared = data
        .role
        .as_deref()
        .or(data.chat_type.as_deref())
        .or(data.text_type.as_deref());

    if let Some(value) = declared {
        return NodeRole::parse(value).ok_or_else(|| DocumentError::InvalidField {
            id: flow.id.clone(),
            field: "type".to_string(),
            value: value.to_string(),
        });
    }

    match flow.node_type.as_deref() {
        Some("toolNode") => Ok(NodeRole::Tool),
        Some("agentNode") => Ok(NodeRole::Agent),
        _ => Err(DocumentError::UnknownRole(flow.id.clone())),
    }
}

fn io_payload(flow: &FlowNode, role: NodeRole, data: NodeData) -> Result<IoPayload, DocumentError> {
    let kind = if data.chat_type.is_some() {
        IoKind::Chat
    } else if data.text_type.is_some() || data.format.is_some() || data.max_length.is_some() {
        IoKind::Text
    } else {
        match flow.node_type.as_deref() {
            Some("textNode") => IoKind::Text,
            _ => IoKind::Chat,
        }
    };

    let mut io = IoPayload::new(role == NodeRole::Input, kind);
    if let Some(placeholder) = data.placeholder {
        io.placeholder = placeholder;
    }

    io.settings = match kind {
        IoKind::Chat => IoSettings::Chat {
            system_message: data.system_message,
        },
        IoKind::Text => {
            let format = match data.format.as_deref() {
                Some(value) => {
                    TextFormat::parse(value).ok_or_else(|| DocumentError::InvalidField {
                        id: flow.id.clone(),
                        field: "format".to_string(),
                        value: value.to_string(),
                    })?
                }
                None => TextFormat::Plain,
            };
            IoSettings::Text {
                format,
                max_length: data.max_length.unwrap_or(IoPayload::DEFAULT_MAX_LENGTH),
            }
        }
    };

    Ok(io)
}

fn require(id: &str, field: &str, value: Option<String>) -> Result<String, DocumentError> {
    value.ok_or_else(|| DocumentError::MissingField {
        id: id.to_string(),
        field: field.to_string(),
    })
}

fn dedup(tools: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tools.len());
    for tool in tools {
        if !out.contains(&tool) {
            out.push(tool);
        }
    }
    out
}
