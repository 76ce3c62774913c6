//! Schema Resolver Interfaces
//!
//! A [`SchemaResolver`] is the authority that hands out schema ids (normally
//! a remote schema registry service). The registry cache obtains one from a
//! [`SchemaResolverFactory`] at construction.
//!
//! Timeouts and retries belong to the resolver implementation; the cache
//! propagates whatever it returns.

use crate::error::BoxError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[async_trait]
pub trait SchemaResolver: Send + Sync {
    /// Register `definition` under `subject` and return its id
    async fn register_new_schema(
        &self,
        subject: &str,
        definition: &str,
    ) -> std::result::Result<i32, BoxError>;

    /// Id of `version` of `subject`, or `None` if the authority does not
    /// know that subject+version. `Err` means the call itself failed.
    async fn get_schema_by_subject(
        &self,
        subject: &str,
        version: i32,
    ) -> std::result::Result<Option<i32>, BoxError>;
}

/// Produces the resolver a `SchemaRegistry` talks to
pub trait SchemaResolverFactory: Send + Sync {
    fn new_schema_resolver(&self) -> std::result::Result<Arc<dyn SchemaResolver>, BoxError>;
}

impl<F> SchemaResolverFactory for F
where
    F: Fn() -> std::result::Result<Arc<dyn SchemaResolver>, BoxError> + Send + Sync,
{
    fn new_schema_resolver(&self) -> std::result::Result<Arc<dyn SchemaResolver>, BoxError> {
        self()
    }
}

/// In-process schema authority.
///
/// Ids are assigned sequentially from 1 and versions per subject from 1.
/// Registering a definition a subject already holds returns the existing id.
pub struct MemorySchemaResolver {
    next_id: AtomicI32,
    /// Subject -> (version, schema ID), in registration order
    subject_versions: RwLock<HashMap<String, Vec<(i32, i32)>>>,
    /// Schema ID -> definition
    definitions: RwLock<HashMap<i32, String>>,
}

impl Default for MemorySchemaResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySchemaResolver {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(1),
            subject_versions: RwLock::new(HashMap::new()),
            definitions: RwLock::new(HashMap::new()),
        }
    }

    /// Factory that always hands out this resolver
    pub fn factory(self: &Arc<Self>) -> impl SchemaResolverFactory {
        let resolver = self.clone();
        move || -> std::result::Result<Arc<dyn SchemaResolver>, BoxError> {
            Ok(resolver.clone() as Arc<dyn SchemaResolver>)
        }
    }

    /// Definition stored under `id`
    pub async fn definition(&self, id: i32) -> Option<String> {
        self.definitions.read().await.get(&id).cloned()
    }

    fn generate_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaResolver for MemorySchemaResolver {
    async fn register_new_schema(
        &self,
        subject: &str,
        definition: &str,
    ) -> std::result::Result<i32, BoxError> {
        // Both locks held so concurrent registrations see a consistent view
        let mut versions = self.subject_versions.write().await;
        let mut definitions = self.definitions.write().await;

        let entries = versions.entry(subject.to_string()).or_default();
        if let Some((_, existing_id)) = entries
            .iter()
            .find(|(_, id)| definitions.get(id).map(String::as_str) == Some(definition))
        {
            return Ok(*existing_id);
        }

        let id = self.generate_id();
        let version = entries.iter().map(|(v, _)| *v).max().unwrap_or(0) + 1;
        entries.push((version, id));
        definitions.insert(id, definition.to_string());

        info!(id = id, subject = subject, version = version, "Schema registered");

        Ok(id)
    }

    async fn get_schema_by_subject(
        &self,
        subject: &str,
        version: i32,
    ) -> std::result::Result<Option<i32>, BoxError> {
        let versions = self.subject_versions.read().await;
        Ok(versions
            .get(subject)
            .and_then(|entries| entries.iter().find(|(v, _)| *v == version))
            .map(|(_, id)| *id))
    }
}
