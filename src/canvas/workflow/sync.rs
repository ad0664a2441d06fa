// SPDX-License-Identifier: MIT

//! Capability synchronization
//!
//! Keeps an agent's `available_tools` in step with the tool→agent edges of
//! the document. Edges of any other shape, and edges whose endpoints are
//! gone, are ignored.

use serde::Serialize;

use super::types::{Edge, WorkflowDocument};

/// Observable result of a sync step, separate from the mutation itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum CapabilityChange {
    Assigned { agent_id: String, capability: String },
    Revoked { agent_id: String, capability: String },
}

/// Capability carried by a tool→agent edge, if the edge is one
fn linked_capability(doc: &WorkflowDocument, edge: &Edge) -> Option<String> {
    let tool = doc.node(&edge.source)?.as_tool()?;
    doc.node(&edge.target)?.as_agent()?;
    Some(tool.tool_id.clone())
}

/// Whether a live tool→agent edge still grants `capability` to `agent_id`
fn still_supplied(doc: &WorkflowDocument, agent_id: &str, capability: &str) -> bool {
    doc.edges.iter().any(|e| {
        e.target == agent_id
            && doc
                .node(&e.source)
                .and_then(|n| n.as_tool())
                .is_some_and(|t| t.tool_id == capability)
    })
}

/// Apply a newly admitted edge. The edge must already have passed the
/// connection rules; this never rejects.
pub fn on_edge_added(doc: &mut WorkflowDocument, edge: &Edge) -> Option<CapabilityChange> {
    let capability = linked_capability(doc, edge)?;
    let agent = doc.node_mut(&edge.target)?.as_agent_mut()?;

    if !agent.assign(&capability) {
        log::debug!(
            "Agent {} already holds capability {}",
            edge.target,
            capability
        );
        return None;
    }

    log::info!("Assigned capability {} to agent {}", capability, edge.target);
    Some(CapabilityChange::Assigned {
        agent_id: edge.target.clone(),
        capability,
    })
}

/// Undo the effect of a removed edge. The edge must already be detached
/// from `doc.edges`. Removing a capability the agent no longer holds, or one
/// another live edge still supplies, is a no-op.
pub fn on_edge_removed(doc: &mut WorkflowDocument, edge: &Edge) -> Option<CapabilityChange> {
    let capability = linked_capability(doc, edge)?;
    if still_supplied(doc, &edge.target, &capability) {
        log::debug!(
            "Agent {} keeps capability {} through another edge",
            edge.target,
            capability
        );
        return None;
    }
    let agent = doc.node_mut(&edge.target)?.as_agent_mut()?;

    if !agent.revoke(&capability) {
        return None;
    }

    log::info!(
        "Revoked capability {} from agent {}",
        capability,
        edge.target
    );
    Some(CapabilityChange::Revoked {
        agent_id: edge.target.clone(),
        capability,
    })
}

/// Process a batch of removed edges, each independently
pub fn on_edges_removed(doc: &mut WorkflowDocument, edges: &[Edge]) -> Vec<CapabilityChange> {
    edges
        .iter()
        .filter_map(|edge| on_edge_removed(doc, edge))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::workflow::types::{
        AgentPayload, IoKind, IoPayload, Node, NodePayload, Position, ToolPayload,
    };

    fn tool(id: &str, capability: &str) -> Node {
        Node::new(
            id,
            Position::default(),
            NodePayload::Tool(ToolPayload {
                tool_id: capability.to_string(),
                name: capability.to_string(),
                description: String::new(),
                category: None,
                input_schema: String::new(),
                output_schema: String::new(),
            }),
        )
    }

    fn agent(id: &str) -> Node {
        Node::new(
            id,
            Position::default(),
            NodePayload::Agent(AgentPayload::new("general-assistant", "General Assistant")),
        )
    }

    fn doc() -> WorkflowDocument {
        WorkflowDocument {
            nodes: vec![
                tool("t1", "bing-search"),
                tool("t2", "web-scraper"),
                agent("a1"),
                Node::new(
                    "out",
                    Position::default(),
                    NodePayload::Output(IoPayload::new(false, IoKind::Chat)),
                ),
            ],
            edges: vec![],
            viewport: None,
        }
    }

    fn tools_of(doc: &WorkflowDocument, id: &str) -> Vec<String> {
        doc.node(id).unwrap().as_agent().unwrap().available_tools.clone()
    }

    #[test]
    fn test_add_assigns_capability() {
        let mut doc = doc();
        let change = on_edge_added(&mut doc, &Edge::new("e1", "t1", "a1"));
        assert_eq!(
            change,
            Some(CapabilityChange::Assigned {
                agent_id: "a1".to_string(),
                capability: "bing-search".to_string()
            })
        );
        assert_eq!(tools_of(&doc, "a1"), vec!["bing-search"]);
    }

    #[test]
    fn test_duplicate_add_suppressed() {
        let mut doc = doc();
        on_edge_added(&mut doc, &Edge::new("e1", "t1", "a1"));
        assert_eq!(on_edge_added(&mut doc, &Edge::new("e2", "t1", "a1")), None);
        assert_eq!(tools_of(&doc, "a1"), vec!["bing-search"]);
    }

    #[test]
    fn test_append_order_is_stable() {
        let mut doc = doc();
        on_edge_added(&mut doc, &Edge::new("e1", "t2", "a1"));
        on_edge_added(&mut doc, &Edge::new("e2", "t1", "a1"));
        assert_eq!(tools_of(&doc, "a1"), vec!["web-scraper", "bing-search"]);
    }

    #[test]
    fn test_other_shapes_ignored() {
        let mut doc = doc();
        // agent -> tool is admitted by the rules but grants nothing
        assert_eq!(on_edge_added(&mut doc, &Edge::new("e1", "a1", "t1")), None);
        assert_eq!(on_edge_added(&mut doc, &Edge::new("e2", "a1", "out")), None);
        assert!(tools_of(&doc, "a1").is_empty());
    }

    #[test]
    fn test_remove_revokes_capability() {
        let mut doc = doc();
        let edge = Edge::new("e1", "t1", "a1");
        on_edge_added(&mut doc, &edge);
        let change = on_edge_removed(&mut doc, &edge);
        assert!(matches!(change, Some(CapabilityChange::Revoked { .. })));
        assert!(tools_of(&doc, "a1").is_empty());
    }

    #[test]
    fn test_remove_absent_capability_is_noop() {
        let mut doc = doc();
        assert_eq!(on_edge_removed(&mut doc, &Edge::new("e1", "t1", "a1")), None);
    }

    #[test]
    fn test_remove_keeps_capability_supplied_elsewhere() {
        let mut doc = doc();
        doc.nodes.push(tool("t3", "bing-search"));
        let first = Edge::new("e1", "t1", "a1");
        let second = Edge::new("e2", "t3", "a1");
        on_edge_added(&mut doc, &first);
        on_edge_added(&mut doc, &second);
        doc.edges = vec![first.clone()];

        assert_eq!(on_edge_removed(&mut doc, &second), None);
        assert_eq!(tools_of(&doc, "a1"), vec!["bing-search"]);

        doc.edges.clear();
        assert!(on_edge_removed(&mut doc, &first).is_some());
        assert!(tools_of(&doc, "a1").is_empty());
    }

    #[test]
    fn test_twin_edge_keeps_capability() {
        let mut doc = doc();
        let edge = Edge::new("e1", "t1", "a1");
        let twin = Edge::new("e2", "t1", "a1");
        on_edge_added(&mut doc, &edge);
        doc.edges = vec![edge];

        assert_eq!(on_edge_removed(&mut doc, &twin), None);
        assert_eq!(tools_of(&doc, "a1"), vec!["bing-search"]);
    }

    #[test]
    fn test_batch_tolerates_missing_endpoints() {
        let mut doc = doc();
        on_edge_added(&mut doc, &Edge::new("e1", "t1", "a1"));
        on_edge_added(&mut doc, &Edge::new("e2", "t2", "a1"));

        let changes = on_edges_removed(
            &mut doc,
            &[
                Edge::new("gone", "deleted-tool", "a1"),
                Edge::new("e1", "t1", "a1"),
                Edge::new("gone2", "t2", "deleted-agent"),
            ],
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(tools_of(&doc, "a1"), vec!["web-scraper"]);
    }
}
