use async_trait::async_trait;
use models::{CatalogWriteEntry, ServiceTypeEntry, SOURCE_TAG};
use tokio::sync::RwLock;

use crate::catalog::CatalogClient;
use crate::errors::ClientError;

/// In-memory catalog for tests and local development.
///
/// `replace` mimics the Web API's tag policy: tags are server-side
/// provenance, so entries already known keep their tags and new entries get
/// the catalog source tag.
#[derive(Default)]
pub struct MemoryCatalog {
    inner: RwLock<Vec<ServiceTypeEntry>>,
}

impl MemoryCatalog {
    pub fn new(entries: Vec<ServiceTypeEntry>) -> Self {
        Self { inner: RwLock::new(entries) }
    }
}

#[async_trait]
impl CatalogClient for MemoryCatalog {
    async fn fetch(&self) -> Result<Vec<ServiceTypeEntry>, ClientError> {
        Ok(self.inner.read().await.clone())
    }

    async fn replace(&self, entries: &[CatalogWriteEntry]) -> Result<(), ClientError> {
        let mut inner = self.inner.write().await;
        let next: Vec<ServiceTypeEntry> = entries
            .iter()
            .map(|w| {
                let tags = inner
                    .iter()
                    .find(|e| e.name == w.name)
                    .map(|e| e.tags.clone())
                    .unwrap_or_else(|| vec![SOURCE_TAG.to_string()]);
                ServiceTypeEntry {
                    name: w.name.clone(),
                    title: if w.title.is_empty() { None } else { Some(w.title.clone()) },
                    description: w.description.clone(),
                    tags,
                }
            })
            .collect();
        *inner = next;
        Ok(())
    }
}
