//! Schema Registry Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Failure reported by a resolver, factory or loader collaborator
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Schema resolver unavailable: {0}")]
    ResolverUnavailable(String),

    #[error("Schema resolver error: {0}")]
    ResolverError(String),

    #[error("Schema not found: {subject} version {version}")]
    SchemaNotFound { subject: String, version: i32 },

    #[error("Unknown schema id: {0}")]
    UnknownSchemaId(i32),

    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid wire header: {0}")]
    InvalidHeader(String),

    #[error("Schema {0} has no {1} registered")]
    MissingCodec(i32, &'static str),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
