// src/core/memory_store.rs
//! In-process document store

use anyhow::Result;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::core::store::{
    matches_all, split_doc_path, validate_collection_path, Document, DocumentStore, Fields, Filter,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Document>> {
        split_doc_path(path)?;
        let docs = self.docs.read().await;
        Ok(docs.get(path).map(|data| Document::new(path, data.clone())))
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>> {
        validate_collection_path(collection)?;
        let prefix = format!("{}/", collection);
        let docs = self.docs.read().await;

        Ok(docs
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| !path[prefix.len()..].contains('/'))
            .filter(|(_, data)| matches_all(filters, data))
            .map(|(path, data)| Document::new(path, data.clone()))
            .collect())
    }

    async fn set(&self, path: &str, data: Fields) -> Result<()> {
        split_doc_path(path)?;
        self.docs.write().await.insert(path.to_string(), data);
        Ok(())
    }

    async fn update(&self, path: &str, patch: Fields) -> Result<()> {
        split_doc_path(path)?;
        let mut docs = self.docs.write().await;
        let data = docs
            .get_mut(path)
            .ok_or_else(|| anyhow::anyhow!("Document not found: {}", path))?;
        data.extend(patch);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        split_doc_path(path)?;
        self.docs.write().await.remove(path);
        Ok(())
    }
}
