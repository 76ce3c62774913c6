//! StreamForge Schema
//!
//! Local schema cache for producers and consumers that tag every record with a
//! compact schema id instead of an embedded schema.
//!
//! # Features
//!
//! - **Cache**: one table of schema records reachable by id, by subject
//!   (latest registration) and by subject+version
//! - **Wire format**: `[0x00][schema_id: 4 bytes big-endian][payload]`
//! - **Pluggable authority**: ids come from a [`SchemaResolver`], injected
//!   through a [`SchemaResolverFactory`]
//! - **Avro**: [`FileSchemaLoader`] validates `.avsc` files and [`AvroCodec`]
//!   encodes/decodes datum payloads
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use streamforge_schema::{AvroCodec, MemorySchemaResolver, SchemaRegistry};
//!
//! let resolver = Arc::new(MemorySchemaResolver::new());
//! let registry = SchemaRegistry::new(&resolver.factory())?;
//!
//! let codec = Arc::new(AvroCodec::parse(&std::fs::read_to_string("order.avsc")?)?);
//! let schema = registry
//!     .register("orders-value", 1, "order.avsc", codec.clone(), codec)
//!     .await?;
//!
//! // Producer side
//! let record = schema.encode_record(&order)?;
//!
//! // Consumer side
//! let (schema, order) = registry.decode_record(&record).await?;
//! ```

pub mod codec;
pub mod error;
pub mod loader;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod wire;

pub use codec::AvroCodec;
pub use error::{BoxError, Result, SchemaError};
pub use loader::{FileSchemaLoader, SchemaLoader};
pub use registry::SchemaRegistry;
pub use resolver::{MemorySchemaResolver, SchemaResolver, SchemaResolverFactory};
pub use types::{AvroSchema, Decoder, Encoder, Value};
pub use wire::{frame, read_header, MAGIC_BYTE};
