//! Schema Registry Cache
//!
//! Process-lifetime cache tying `subject + version + id` to a codec pair.
//!
//! ## Indices
//!
//! One owned table of records keyed by schema id, plus two auxiliary maps that
//! point into it by id:
//!
//! - **by id**: `id -> record` (owns the `Arc<AvroSchema>`)
//! - **by subject**: `subject -> id` of the most recently registered record
//! - **by subject+version**: `(subject, version) -> id`
//!
//! All three live behind a single lock, so a reader never sees a record in one
//! index but not the others, and the same id always resolves to the same
//! `Arc` whichever path is used.

use crate::{
    error::{Result, SchemaError},
    loader::{FileSchemaLoader, SchemaLoader},
    resolver::{SchemaResolver, SchemaResolverFactory},
    types::{AvroSchema, Decoder, Encoder, Value},
    wire,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Default)]
struct SchemaCache {
    by_id: HashMap<i32, Arc<AvroSchema>>,
    by_subject: HashMap<String, i32>,
    by_subject_version: HashMap<(String, i32), i32>,
}

impl SchemaCache {
    fn get_by_id(&self, id: i32) -> Option<Arc<AvroSchema>> {
        self.by_id.get(&id).cloned()
    }

    fn get_by_subject(&self, subject: &str) -> Option<Arc<AvroSchema>> {
        self.by_subject
            .get(subject)
            .and_then(|id| self.get_by_id(*id))
    }

    fn get_by_subject_version(&self, subject: &str, version: i32) -> Option<Arc<AvroSchema>> {
        self.by_subject_version
            .get(&(subject.to_string(), version))
            .and_then(|id| self.get_by_id(*id))
    }

    /// Insert `schema` into every index, evicting whatever it displaces.
    ///
    /// Displaced records are the previous holder of the same
    /// `(subject, version)` and the previous holder of the same id.
    fn insert(&mut self, schema: Arc<AvroSchema>) {
        let key = (schema.subject.clone(), schema.version);

        if let Some(old_id) = self.by_subject_version.get(&key).copied() {
            if old_id != schema.id {
                self.by_id.remove(&old_id);
            }
        }

        if let Some(previous) = self.by_id.get(&schema.id).cloned() {
            if previous.subject != schema.subject || previous.version != schema.version {
                self.evict(&previous);
            }
        }

        self.by_id.insert(schema.id, schema.clone());
        self.by_subject_version.insert(key, schema.id);
        self.by_subject.insert(schema.subject.clone(), schema.id);
    }

    /// Drop `record`'s `(subject, version)` entry and, if it was the subject's
    /// latest, fall back to the highest remaining cached version.
    fn evict(&mut self, record: &AvroSchema) {
        self.by_subject_version
            .remove(&(record.subject.clone(), record.version));

        if self.by_subject.get(&record.subject) == Some(&record.id) {
            let fallback = self
                .by_subject_version
                .iter()
                .filter(|((subject, _), _)| *subject == record.subject)
                .max_by_key(|((_, version), _)| *version)
                .map(|(_, id)| *id);

            match fallback {
                Some(id) => {
                    self.by_subject.insert(record.subject.clone(), id);
                }
                None => {
                    self.by_subject.remove(&record.subject);
                }
            }
        }
    }
}

/// Local schema cache backed by a [`SchemaResolver`]
pub struct SchemaRegistry {
    resolver: Arc<dyn SchemaResolver>,
    loader: Arc<dyn SchemaLoader>,
    cache: RwLock<SchemaCache>,
}

impl SchemaRegistry {
    /// Create a registry using the resolver produced by `factory`
    pub fn new(factory: &dyn SchemaResolverFactory) -> Result<Self> {
        let resolver = factory
            .new_schema_resolver()
            .map_err(|e| SchemaError::ResolverUnavailable(e.to_string()))?;
        Ok(Self::with_resolver(resolver))
    }

    pub fn with_resolver(resolver: Arc<dyn SchemaResolver>) -> Self {
        Self {
            resolver,
            loader: Arc::new(FileSchemaLoader),
            cache: RwLock::new(SchemaCache::default()),
        }
    }

    /// Replace the schema file loader (defaults to [`FileSchemaLoader`])
    pub fn with_loader(mut self, loader: Arc<dyn SchemaLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Register the schema in `schema_file` under `subject` and cache it.
    ///
    /// An existing entry for the same `(subject, version)` is replaced in all
    /// indices, and the subject's latest pointer moves to the new record.
    pub async fn register(
        &self,
        subject: &str,
        version: i32,
        schema_file: impl AsRef<Path>,
        decoder: Arc<dyn Decoder>,
        encoder: Arc<dyn Encoder>,
    ) -> Result<Arc<AvroSchema>> {
        let definition = self.loader.load(schema_file.as_ref()).await?;

        let id = self
            .resolver
            .register_new_schema(subject, &definition)
            .await
            .map_err(|e| SchemaError::ResolverError(e.to_string()))?;

        let schema = Arc::new(AvroSchema::new(subject, id, version).with_codec(decoder, encoder));

        self.cache.write().await.insert(schema.clone());

        info!(
            subject = subject,
            version = version,
            id = id,
            "Schema cached"
        );

        Ok(schema)
    }

    /// Schema for `(subject, version)`.
    ///
    /// A cache miss asks the resolver for the id and returns a record without
    /// a codec. The miss result is not cached. An unknown subject+version is
    /// `SchemaNotFound`; a failed resolver call is `ResolverError`.
    pub async fn lookup(&self, subject: &str, version: i32) -> Result<Arc<AvroSchema>> {
        if let Some(schema) = self
            .cache
            .read()
            .await
            .get_by_subject_version(subject, version)
        {
            return Ok(schema);
        }

        let id = self
            .resolver
            .get_schema_by_subject(subject, version)
            .await
            .map_err(|e| SchemaError::ResolverError(e.to_string()))?
            .ok_or_else(|| SchemaError::SchemaNotFound {
                subject: subject.to_string(),
                version,
            })?;

        debug!(
            subject = subject,
            version = version,
            id = id,
            "Schema resolved remotely"
        );

        Ok(Arc::new(AvroSchema::new(subject, id, version)))
    }

    /// Cached schema for `id`; only ids registered through this registry resolve
    pub async fn get_schema_by_id(&self, id: i32) -> Result<Arc<AvroSchema>> {
        self.cache
            .read()
            .await
            .get_by_id(id)
            .ok_or(SchemaError::UnknownSchemaId(id))
    }

    /// Most recently registered schema for `subject`
    pub async fn get_schema_by_name(&self, subject: &str) -> Result<Arc<AvroSchema>> {
        self.cache
            .read()
            .await
            .get_by_subject(subject)
            .ok_or_else(|| SchemaError::UnknownSubject(subject.to_string()))
    }

    /// Parse the wire header of `record` and decode its payload with the
    /// cached decoder for the embedded schema id
    pub async fn decode_record(&self, record: &[u8]) -> Result<(Arc<AvroSchema>, Value)> {
        let (id, payload) = wire::read_header(record)?;
        let schema = self.get_schema_by_id(id).await?;
        let value = schema.decode_payload(payload)?;
        Ok((schema, value))
    }

    /// Subjects with at least one cached schema, sorted
    pub async fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self.cache.read().await.by_subject.keys().cloned().collect();
        subjects.sort();
        subjects
    }

    /// Number of cached schema records
    pub async fn len(&self) -> usize {
        self.cache.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
