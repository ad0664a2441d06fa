// SPDX-License-Identifier: MIT

//! Where catalog entries come from

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::json;
use std::path::{Path, PathBuf};

use super::types::{CapabilityDescriptor, CapabilityKind};
use crate::canvas::error::CatalogError;

/// A provider of capability descriptors
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<CapabilityDescriptor>, CatalogError>;
}

/// Descriptors shipped with the binary
pub struct BuiltinCatalog;

#[async_trait]
impl CatalogSource for BuiltinCatalog {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn fetch(&self) -> Result<Vec<CapabilityDescriptor>, CatalogError> {
        Ok(builtin_descriptors())
    }
}

/// Descriptors read from a JSON or YAML list on disk
pub struct FileCatalog {
    path: PathBuf,
    label: String,
}

impl FileCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let label = path.display().to_string();
        Self { path, label }
    }

    /// Parse catalog text; YAML is a superset of JSON so one parser covers both
    pub fn parse(content: &str) -> Result<Vec<CapabilityDescriptor>, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<Vec<CapabilityDescriptor>, CatalogError> {
        let source_err = |message: String| CatalogError::Source {
            path: self.label.clone(),
            message,
        };
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| source_err(e.to_string()))?;
        Self::parse(&content).map_err(|e| source_err(e.to_string()))
    }
}

fn tool(
    id: &str,
    name: &str,
    description: &str,
    category: &str,
    input: serde_json::Value,
    output: serde_json::Value,
) -> CapabilityDescriptor {
    CapabilityDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        input_schema: input.to_string(),
        output_schema: output.to_string(),
        category: Some(category.to_string()),
        version: Some("1.0.0".to_string()),
        kind: CapabilityKind::Tool,
    }
}

static BUILTIN: Lazy<Vec<CapabilityDescriptor>> = Lazy::new(|| {
    let mut agent = tool(
        "general-assistant",
        "General Assistant",
        "A configurable AI agent that can use tools to complete complex tasks",
        "agent",
        json!({
            "type": "object",
            "properties": {
                "task": {"type": "string"},
                "context": {"type": "object"}
            },
            "required": ["task"]
        }),
        json!({
            "type": "object",
            "properties": {
                "result": {"type": "string"},
                "toolsUsed": {"type": "array", "items": {"type": "string"}},
                "reasoning": {"type": "string"}
            }
        }),
    );
    agent.kind = CapabilityKind::Agent;

    vec![
        tool(
            "bing-search",
            "Bing Search API",
            "Call the Bing Search API to search the web for information",
            "search",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "count": {"type": "number", "default": 10}
                },
                "required": ["query"]
            }),
            json!({"type": "object", "properties": {"results": {"type": "array"}}}),
        ),
        tool(
            "exa-search",
            "Exa Search",
            "Exa Search toolkit for search and content retrieval",
            "search",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "type": {"type": "string", "enum": ["neural", "keyword"]},
                    "numResults": {"type": "number", "default": 5}
                },
                "required": ["query"]
            }),
            json!({"type": "object", "properties": {"results": {"type": "array"}}}),
        ),
        tool(
            "web-scraper",
            "Web Scraper",
            "Extract content from web pages",
            "data",
            json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string"},
                    "selector": {"type": "string"}
                },
                "required": ["url"]
            }),
            json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string"},
                    "title": {"type": "string"},
                    "metadata": {"type": "object"}
                }
            }),
        ),
        tool(
            "email-sender",
            "Email Sender",
            "Send emails with customizable content",
            "communication",
            json!({
                "type": "object",
                "properties": {
                    "to": {"type": "string"},
                    "subject": {"type": "string"},
                    "body": {"type": "string"}
                },
                "required": ["to", "subject", "body"]
            }),
            json!({
                "type": "object",
                "properties": {
                    "messageId": {"type": "string"},
                    "status": {"type": "string"},
                    "timestamp": {"type": "string"}
                }
            }),
        ),
        tool(
            "data-processor",
            "Data Processor",
            "Process and transform data in various formats",
            "data",
            json!({
                "type": "object",
                "properties": {
                    "data": {"type": "object"},
                    "operation": {"type": "string", "enum": ["filter", "transform", "aggregate", "sort"]},
                    "parameters": {"type": "object"}
                },
                "required": ["data", "operation"]
            }),
            json!({
                "type": "object",
                "properties": {
                    "processedData": {"type": "object"},
                    "summary": {"type": "string"},
                    "recordsProcessed": {"type": "number"}
                }
            }),
        ),
        tool(
            "file-reader",
            "File Reader",
            "Read and parse files in various formats",
            "file",
            json!({
                "type": "object",
                "properties": {
                    "filePath": {"type": "string"},
                    "format": {"type": "string", "enum": ["json", "csv", "txt", "xml"]}
                },
                "required": ["filePath"]
            }),
            json!({
                "type": "object",
                "properties": {
                    "content": {"type": "object"},
                    "metadata": {"type": "object"}
                }
            }),
        ),
        agent,
    ]
});

/// The descriptors served when no catalog file is configured
pub fn builtin_descriptors() -> Vec<CapabilityDescriptor> {
    BUILTIN.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_ids_unique() {
        let descriptors = builtin_descriptors();
        let mut ids: Vec<&str> = descriptors.iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), descriptors.len());
    }

    #[test]
    fn test_builtin_schemas_are_json() {
        for d in builtin_descriptors() {
            assert!(serde_json::from_str::<serde_json::Value>(&d.input_schema).is_ok());
            assert!(serde_json::from_str::<serde_json::Value>(&d.output_schema).is_ok());
        }
    }

    #[test]
    fn test_single_builtin_agent() {
        let agents: Vec<_> = builtin_descriptors()
            .into_iter()
            .filter(|d| d.kind == CapabilityKind::Agent)
            .collect();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].id, "general-assistant");
    }

    #[test]
    fn test_parse_json_list() {
        let parsed = FileCatalog::parse(
            r#"[{"id": "a", "name": "A", "description": "", "inputSchema": "{}", "outputSchema": "{}", "type": "agent"}]"#,
        )
        .unwrap();
        assert_eq!(parsed[0].kind, CapabilityKind::Agent);
    }

    #[tokio::test]
    async fn test_file_catalog_fetch() {
        let path = std::env::temp_dir().join(format!("catalog-{}.yaml", uuid::Uuid::new_v4()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(
                file,
                "- id: pdf-reader\n  name: PDF Reader\n  description: Reads PDFs\n  inputSchema: '{{}}'\n  outputSchema: '{{}}'\n  category: file"
            )
            .unwrap();
        }

        let fetched = FileCatalog::new(&path).fetch().await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "pdf-reader");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_source_error() {
        let result = FileCatalog::new("/definitely/not/here.yaml").fetch().await;
        assert!(matches!(result, Err(CatalogError::Source { .. })));
    }
}
