// SPDX-License-Identifier: MIT

//! Graph document loading
//!
//! Reads a submitted-shape document from disk. Files ending in `.yaml` or
//! `.yml` are parsed as YAML, anything else as JSON.

use serde_json::Value;
use std::fs;
use std::path::Path;

use super::types::{FlowDocument, WorkflowDocument};
use crate::canvas::error::CanvasError;

/// Loads graph documents from files
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load the raw JSON value, leaving shape checks to the submission handler
    pub fn load_value<P: AsRef<Path>>(&self, path: P) -> Result<Value, CanvasError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        if is_yaml(path) {
            Self::parse_yaml(&content)
        } else {
            Self::parse_json(&content)
        }
    }

    /// Load and shape-check a document
    pub fn load_document<P: AsRef<Path>>(&self, path: P) -> Result<FlowDocument, CanvasError> {
        let value = self.load_value(path)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Load a saved document as a typed graph, ready to resume editing
    pub fn load_workflow<P: AsRef<Path>>(&self, path: P) -> Result<WorkflowDocument, CanvasError> {
        let flow = self.load_document(path)?;
        Ok(WorkflowDocument::from_flow(&flow)?)
    }

    pub fn parse_yaml(content: &str) -> Result<Value, CanvasError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn parse_json(content: &str) -> Result<Value, CanvasError> {
        Ok(serde_json::from_str(content)?)
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_document() {
        let yaml = r#"
nodes:
  - id: node_0
    type: toolNode
    position: { x: 10, y: 20 }
    data:
      toolId: bing-search
      type: tool
  - id: node_1
    type: agentNode
    position: { x: 200, y: 20 }
    data:
      type: agent
      agentConfig:
        instructions: "Find things"
        availableTools: [bing-search]
edges:
  - id: edge_0
    source: node_0
    target: node_1
"#;
        let value = DocumentLoader::parse_yaml(yaml).unwrap();
        let doc: FlowDocument = serde_json::from_value(value).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.edges[0].target, "node_1");
        assert_eq!(doc.nodes[0].position.y, 20.0);
    }

    #[test]
    fn test_invalid_json_returns_error() {
        let result = DocumentLoader::parse_json("{\"nodes\": [");
        assert!(matches!(result, Err(CanvasError::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = DocumentLoader::new().load_value("/no/such/workflow.json");
        assert!(matches!(result, Err(CanvasError::Io(_))));
    }

    #[test]
    fn test_load_document_from_disk() {
        let path = std::env::temp_dir().join(format!("workflow-{}.json", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            r#"{"nodes": [{"id": "n1", "position": {"x": 0, "y": 0}}], "edges": []}"#,
        )
        .unwrap();

        let doc = DocumentLoader::new().load_document(&path).unwrap();
        assert_eq!(doc.nodes[0].id, "n1");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_workflow_typed() {
        let path = std::env::temp_dir().join(format!("workflow-{}.yml", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            r#"
nodes:
  - id: node_0
    type: toolNode
    position: { x: 0, y: 0 }
    data: { toolId: exa-search, type: tool }
  - id: node_1
    type: agentNode
    position: { x: 200, y: 0 }
    data:
      type: agent
      agentConfig: { instructions: Research, availableTools: [exa-search] }
edges:
  - { id: edge_0, source: node_0, target: node_1 }
"#,
        )
        .unwrap();

        let doc = DocumentLoader::new().load_workflow(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(doc.nodes[0].as_tool().unwrap().tool_id, "exa-search");
        assert_eq!(
            doc.nodes[1].as_agent().unwrap().available_tools,
            vec!["exa-search"]
        );
    }

    #[test]
    fn test_load_workflow_unknown_role() {
        let path = std::env::temp_dir().join(format!("workflow-{}.json", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            r#"{"nodes": [{"id": "n1", "position": {"x": 0, "y": 0}}], "edges": []}"#,
        )
        .unwrap();

        let result = DocumentLoader::new().load_workflow(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(CanvasError::Document(_))));
    }

    #[test]
    fn test_yaml_extension_detection() {
        assert!(is_yaml(Path::new("flow.yaml")));
        assert!(is_yaml(Path::new("flow.yml")));
        assert!(!is_yaml(Path::new("flow.json")));
    }
}
