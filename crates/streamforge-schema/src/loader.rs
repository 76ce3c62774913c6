//! Schema definition loading
//!
//! `SchemaRegistry::register` takes a schema file reference; a [`SchemaLoader`]
//! turns it into the definition string handed to the resolver.

use crate::error::{Result, SchemaError};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

#[async_trait]
pub trait SchemaLoader: Send + Sync {
    /// Load and validate the schema stored at `schema_file`
    async fn load(&self, schema_file: &Path) -> Result<String>;
}

/// Reads Avro schema files (`.avsc`) from disk.
///
/// The file must parse as an Avro schema; the Parsing Canonical Form is
/// returned so equivalent files produce identical definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSchemaLoader;

#[async_trait]
impl SchemaLoader for FileSchemaLoader {
    async fn load(&self, schema_file: &Path) -> Result<String> {
        let contents = tokio::fs::read_to_string(schema_file).await?;

        let schema = apache_avro::Schema::parse_str(&contents).map_err(|e| {
            SchemaError::InvalidSchema(format!("{}: {}", schema_file.display(), e))
        })?;

        let canonical = schema.canonical_form();
        debug!(
            file = %schema_file.display(),
            bytes = canonical.len(),
            "Schema file loaded"
        );

        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn schema_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_canonical_form() {
        let file = schema_file(
            r#"{
                "type": "record",
                "name": "User",
                "doc": "dropped from the canonical form",
                "fields": [{"name": "name", "type": "string"}]
            }"#,
        );

        let definition = FileSchemaLoader.load(file.path()).await.unwrap();
        assert!(definition.contains(r#""name":"User""#));
        assert!(!definition.contains("doc"));
        assert!(!definition.contains(char::is_whitespace));
    }

    #[tokio::test]
    async fn test_load_invalid_schema() {
        let file = schema_file("not valid json");
        let result = FileSchemaLoader.load(file.path()).await;
        assert!(matches!(result, Err(SchemaError::InvalidSchema(_))));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSchemaLoader.load(&dir.path().join("missing.avsc")).await;
        assert!(matches!(result, Err(SchemaError::IoError(_))));
    }
}
