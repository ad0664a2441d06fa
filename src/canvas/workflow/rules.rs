// SPDX-License-Identifier: MIT

//! Connection rules
//!
//! Decides whether a proposed edge may enter the document. Only the two
//! endpoint roles matter; payload contents and handles are ignored.

use super::types::{Node, NodeRole};
use crate::canvas::error::ConnectionError;

/// Evaluate a proposed edge between two resolved (or unresolved) nodes.
///
/// Must be called on every connection attempt: the document can change
/// between attempts.
pub fn evaluate(source: Option<&Node>, target: Option<&Node>) -> Result<(), ConnectionError> {
    match (source, target) {
        (Some(source), Some(target)) => evaluate_roles(source.role(), target.role()),
        _ => Err(ConnectionError::UnresolvableEndpoint),
    }
}

/// Role-only form of [`evaluate`]
pub fn evaluate_roles(source: NodeRole, target: NodeRole) -> Result<(), ConnectionError> {
    match (source, target) {
        (NodeRole::Tool, NodeRole::Tool) => Err(ConnectionError::ToolToTool),
        (NodeRole::Agent, NodeRole::Agent) => Err(ConnectionError::AgentToAgent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::workflow::types::{
        AgentPayload, IoKind, IoPayload, NodePayload, Position, ToolPayload,
    };

    const ROLES: [NodeRole; 4] = [
        NodeRole::Tool,
        NodeRole::Agent,
        NodeRole::Input,
        NodeRole::Output,
    ];

    fn tool(id: &str) -> Node {
        Node::new(
            id,
            Position::default(),
            NodePayload::Tool(ToolPayload {
                tool_id: id.to_string(),
                name: id.to_string(),
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
            NodePayload::Agent(AgentPayload::new(id, id)),
        )
    }

    #[test]
    fn test_same_role_tool_and_agent_rejected() {
        assert_eq!(
            evaluate(Some(&tool("a")), Some(&tool("b"))),
            Err(ConnectionError::ToolToTool)
        );
        assert_eq!(
            evaluate(Some(&agent("a")), Some(&agent("b"))),
            Err(ConnectionError::AgentToAgent)
        );
    }

    #[test]
    fn test_payload_contents_do_not_matter() {
        let mut busy = AgentPayload::new("x", "x");
        busy.assign("bing-search");
        busy.instructions = "anything".to_string();
        let busy = Node::new("busy", Position::default(), NodePayload::Agent(busy));
        assert_eq!(
            evaluate(Some(&busy), Some(&agent("b"))),
            Err(ConnectionError::AgentToAgent)
        );
        // Same node on both ends is still tool-to-tool
        let t = tool("self");
        assert_eq!(evaluate(Some(&t), Some(&t)), Err(ConnectionError::ToolToTool));
    }

    #[test]
    fn test_mixed_pairs_admitted() {
        assert!(evaluate(Some(&tool("t")), Some(&agent("a"))).is_ok());
        assert!(evaluate(Some(&agent("a")), Some(&tool("t"))).is_ok());

        let input = Node::new(
            "in",
            Position::default(),
            NodePayload::Input(IoPayload::new(true, IoKind::Chat)),
        );
        assert!(evaluate(Some(&input), Some(&agent("a"))).is_ok());
        assert!(evaluate(Some(&input), Some(&input)).is_ok());
    }

    #[test]
    fn test_every_role_pair() {
        for source in ROLES {
            for target in ROLES {
                let result = evaluate_roles(source, target);
                let rejected = (source == NodeRole::Tool && target == NodeRole::Tool)
                    || (source == NodeRole::Agent && target == NodeRole::Agent);
                assert_eq!(result.is_err(), rejected, "{} -> {}", source, target);
            }
        }
    }

    #[test]
    fn test_unresolvable_endpoint() {
        assert_eq!(
            evaluate(None, Some(&agent("a"))),
            Err(ConnectionError::UnresolvableEndpoint)
        );
        assert_eq!(
            evaluate(Some(&tool("t")), None),
            Err(ConnectionError::UnresolvableEndpoint)
        );
        assert_eq!(evaluate(None, None), Err(ConnectionError::UnresolvableEndpoint));
    }
}
