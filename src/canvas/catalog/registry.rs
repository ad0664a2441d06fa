// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::sync::RwLock;

use super::source::CatalogSource;
use super::types::{CapabilityDescriptor, CapabilityKind};
use crate::canvas::error::CatalogError;

/// Shared, ordered set of capability descriptors
#[derive(Clone)]
pub struct ToolCatalog {
    entries: Arc<RwLock<Vec<CapabilityDescriptor>>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add a descriptor, replacing any entry with the same id in place
    pub async fn register(&self, descriptor: CapabilityDescriptor) {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|d| d.id == descriptor.id) {
            Some(existing) => *existing = descriptor,
            None => entries.push(descriptor),
        }
    }

    pub async fn get(&self, id: &str) -> Option<CapabilityDescriptor> {
        let entries = self.entries.read().await;
        entries.iter().find(|d| d.id == id).cloned()
    }

    pub async fn list(&self) -> Vec<CapabilityDescriptor> {
        self.entries.read().await.clone()
    }

    pub async fn of_kind(&self, kind: CapabilityKind) -> Vec<CapabilityDescriptor> {
        let entries = self.entries.read().await;
        entries.iter().filter(|d| d.kind == kind).cloned().collect()
    }

    pub async fn tools(&self) -> Vec<CapabilityDescriptor> {
        self.of_kind(CapabilityKind::Tool).await
    }

    pub async fn agents(&self) -> Vec<CapabilityDescriptor> {
        self.of_kind(CapabilityKind::Agent).await
    }

    /// Returns whether an entry was removed
    pub async fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|d| d.id != id);
        entries.len() < before
    }

    /// Register everything a source provides. Returns how many entries it had.
    pub async fn load_from(&self, source: &dyn CatalogSource) -> Result<usize, CatalogError> {
        let descriptors = source.fetch().await?;
        let count = descriptors.len();
        for descriptor in descriptors {
            self.register(descriptor).await;
        }
        log::info!("Loaded {} capabilities from {}", count, source.name());
        Ok(count)
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::catalog::BuiltinCatalog;

    fn descriptor(id: &str, kind: CapabilityKind) -> CapabilityDescriptor {
        CapabilityDescriptor {
            id: id.to_string(),
            name: format!("Mock {}", id),
            description: String::new(),
            input_schema: "{}".to_string(),
            output_schema: "{}".to_string(),
            category: None,
            version: None,
            kind,
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let catalog = ToolCatalog::new();
        catalog.register(descriptor("bing-search", CapabilityKind::Tool)).await;

        let found = catalog.get("bing-search").await;
        assert_eq!(found.unwrap().name, "Mock bing-search");
        assert!(catalog.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_register_replaces_in_place() {
        let catalog = ToolCatalog::new();
        catalog.register(descriptor("a", CapabilityKind::Tool)).await;
        catalog.register(descriptor("b", CapabilityKind::Tool)).await;

        let mut updated = descriptor("a", CapabilityKind::Tool);
        updated.version = Some("2.0.0".to_string());
        catalog.register(updated).await;

        let ids: Vec<String> = catalog.list().await.into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(
            catalog.get("a").await.unwrap().version.as_deref(),
            Some("2.0.0")
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let catalog = ToolCatalog::new();
        catalog.register(descriptor("a", CapabilityKind::Tool)).await;
        assert!(catalog.remove("a").await);
        assert!(!catalog.remove("a").await);
    }

    #[tokio::test]
    async fn test_split_by_kind() {
        let catalog = ToolCatalog::new();
        catalog.register(descriptor("t", CapabilityKind::Tool)).await;
        catalog.register(descriptor("g", CapabilityKind::Agent)).await;

        assert_eq!(catalog.of_kind(CapabilityKind::Tool).await.len(), 1);
        assert_eq!(catalog.agents().await[0].id, "g");
        assert_eq!(catalog.tools().await[0].id, "t");
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let catalog = ToolCatalog::new();
        let cloned = catalog.clone();
        cloned.register(descriptor("shared", CapabilityKind::Tool)).await;
        assert!(catalog.get("shared").await.is_some());
    }

    #[tokio::test]
    async fn test_load_builtin() {
        let catalog = ToolCatalog::new();
        let count = catalog.load_from(&BuiltinCatalog).await.unwrap();
        assert_eq!(count, 7);
        assert!(catalog.get("general-assistant").await.is_some());
    }
}
