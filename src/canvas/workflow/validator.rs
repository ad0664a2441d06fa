// SPDX-License-Identifier: MIT

//! Structural validation of a complete graph document
//!
//! Every check runs; nothing short-circuits. Error order is part of the
//! contract: node count, then dangling edge endpoints in edge order, then
//! the duplicate id summary.

use std::collections::HashSet;

use super::types::{FlowDocument, WorkflowDocument};

pub const EMPTY_WORKFLOW: &str = "workflow must contain at least one node.";

/// The parts of a graph the validator looks at
pub trait GraphShape {
    fn node_ids(&self) -> Vec<&str>;
    fn edge_endpoints(&self) -> Vec<(&str, &str)>;
}

impl GraphShape for FlowDocument {
    fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn edge_endpoints(&self) -> Vec<(&str, &str)> {
        self.edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }
}

impl GraphShape for WorkflowDocument {
    fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn edge_endpoints(&self) -> Vec<(&str, &str)> {
        self.edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }
}

/// Validate a document. An empty result means valid.
pub fn validate<G: GraphShape + ?Sized>(graph: &G) -> Vec<String> {
    let mut errors = Vec::new();
    let ids = graph.node_ids();

    if ids.is_empty() {
        errors.push(EMPTY_WORKFLOW.to_string());
    }

    let known: HashSet<&str> = ids.iter().copied().collect();
    for (source, target) in graph.edge_endpoints() {
        if !known.contains(source) {
            errors.push(format!(
                "edge references non-existent source node: {}",
                source
            ));
        }
        if !known.contains(target) {
            errors.push(format!(
                "edge references non-existent target node: {}",
                target
            ));
        }
    }

    let duplicates = find_duplicate_ids(&ids);
    if !duplicates.is_empty() {
        errors.push(format!(
            "duplicate node IDs found: {}",
            duplicates.join(", ")
        ));
    }

    errors
}

/// Ids appearing more than once, each listed once, in order of their
/// first repeat
fn find_duplicate_ids<'a>(ids: &[&'a str]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for id in ids {
        if !seen.insert(*id) && reported.insert(*id) {
            duplicates.push(*id);
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flow(value: serde_json::Value) -> FlowDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_document() {
        let doc = flow(json!({"nodes": [], "edges": []}));
        assert_eq!(validate(&doc), vec![EMPTY_WORKFLOW.to_string()]);
    }

    #[test]
    fn test_dangling_target_only() {
        let doc = flow(json!({
            "nodes": [{"id": "n1", "position": {"x": 0, "y": 0}}],
            "edges": [{"id": "e1", "source": "n1", "target": "n2"}]
        }));
        let errors = validate(&doc);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("target"));
        assert!(errors[0].ends_with("n2"));
    }

    #[test]
    fn test_duplicate_listed_once() {
        let doc = flow(json!({
            "nodes": [
                {"id": "dup", "position": {"x": 0, "y": 0}},
                {"id": "dup", "position": {"x": 1, "y": 1}},
                {"id": "dup", "position": {"x": 2, "y": 2}}
            ],
            "edges": []
        }));
        assert_eq!(validate(&doc), vec!["duplicate node IDs found: dup"]);
    }

    #[test]
    fn test_error_order() {
        let doc = flow(json!({
            "nodes": [
                {"id": "b", "position": {"x": 0, "y": 0}},
                {"id": "a", "position": {"x": 0, "y": 0}},
                {"id": "b", "position": {"x": 0, "y": 0}},
                {"id": "a", "position": {"x": 0, "y": 0}}
            ],
            "edges": [
                {"id": "e1", "source": "x", "target": "y"},
                {"id": "e2", "source": "a", "target": "z"}
            ]
        }));
        assert_eq!(
            validate(&doc),
            vec![
                "edge references non-existent source node: x",
                "edge references non-existent target node: y",
                "edge references non-existent target node: z",
                "duplicate node IDs found: b, a",
            ]
        );
    }

    #[test]
    fn test_empty_with_dangling_edge_reports_all() {
        let doc = flow(json!({
            "nodes": [],
            "edges": [{"id": "e1", "source": "a", "target": "b"}]
        }));
        let errors = validate(&doc);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], EMPTY_WORKFLOW);
    }

    #[test]
    fn test_valid_document_and_idempotence() {
        let doc = flow(json!({
            "nodes": [
                {"id": "a", "position": {"x": 0, "y": 0}},
                {"id": "b", "position": {"x": 0, "y": 0}}
            ],
            "edges": [{"id": "e1", "source": "a", "target": "b"}]
        }));
        assert!(validate(&doc).is_empty());
        assert_eq!(validate(&doc), validate(&doc));
    }

    #[test]
    fn test_typed_document_shape() {
        let doc = WorkflowDocument::new();
        assert_eq!(validate(&doc), vec![EMPTY_WORKFLOW.to_string()]);
    }
}
