//! Cached Schema Record and Codec Interfaces

use crate::error::{Result, SchemaError};
use crate::wire;
use bytes::Bytes;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

pub use apache_avro::types::Value;

/// Decodes one payload (wire header already stripped) into a value
pub trait Decoder: Send + Sync {
    fn decode(&self, reader: &mut dyn Read) -> Result<Value>;
}

/// Encodes a value and writes the bytes to `writer`
pub trait Encoder: Send + Sync {
    fn encode(&self, value: &Value, writer: &mut dyn Write) -> Result<()>;
}

/// One schema version known to the registry.
///
/// Records created by `SchemaRegistry::register` carry the codec pair that was
/// registered with them. Records returned by a `lookup` cache miss only carry
/// `subject`, `id` and `version`.
#[derive(Clone)]
pub struct AvroSchema {
    pub subject: String,
    pub id: i32,
    pub version: i32,
    decoder: Option<Arc<dyn Decoder>>,
    encoder: Option<Arc<dyn Encoder>>,
}

impl AvroSchema {
    /// Record without a codec
    pub fn new(subject: impl Into<String>, id: i32, version: i32) -> Self {
        Self {
            subject: subject.into(),
            id,
            version,
            decoder: None,
            encoder: None,
        }
    }

    pub fn with_codec(mut self, decoder: Arc<dyn Decoder>, encoder: Arc<dyn Encoder>) -> Self {
        self.decoder = Some(decoder);
        self.encoder = Some(encoder);
        self
    }

    pub fn decoder(&self) -> Option<&Arc<dyn Decoder>> {
        self.decoder.as_ref()
    }

    pub fn encoder(&self) -> Option<&Arc<dyn Encoder>> {
        self.encoder.as_ref()
    }

    /// Write the 5-byte wire header: magic byte `0x00` then the id, big-endian.
    pub fn write_header<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(&wire::header_bytes(self.id))
    }

    /// Encode `value` and prefix it with this schema's wire header
    pub fn encode_record(&self, value: &Value) -> Result<Bytes> {
        let encoder = self
            .encoder
            .as_ref()
            .ok_or(SchemaError::MissingCodec(self.id, "encoder"))?;

        let mut out = Vec::with_capacity(wire::HEADER_LEN + 64);
        wire::put_header(&mut out, self.id);
        encoder.encode(value, &mut out)?;
        Ok(Bytes::from(out))
    }

    /// Decode a payload whose wire header has already been consumed
    pub fn decode_payload(&self, payload: &[u8]) -> Result<Value> {
        let decoder = self
            .decoder
            .as_ref()
            .ok_or(SchemaError::MissingCodec(self.id, "decoder"))?;

        let mut reader = payload;
        decoder.decode(&mut reader)
    }
}

impl fmt::Debug for AvroSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvroSchema")
            .field("subject", &self.subject)
            .field("id", &self.id)
            .field("version", &self.version)
            .field("has_decoder", &self.decoder.is_some())
            .field("has_encoder", &self.encoder.is_some())
            .finish()
    }
}
