//! Avro datum codec
//!
//! [`Decoder`]/[`Encoder`] pair backed by `apache_avro` datum encoding (no
//! container header, no embedded schema).

use crate::error::{Result, SchemaError};
use crate::types::{Decoder, Encoder, Value};
use std::io::{Read, Write};

#[derive(Debug, Clone)]
pub struct AvroCodec {
    schema: apache_avro::Schema,
}

impl AvroCodec {
    pub fn new(schema: apache_avro::Schema) -> Self {
        Self { schema }
    }

    /// Parse an Avro schema definition (JSON)
    pub fn parse(definition: &str) -> Result<Self> {
        let schema = apache_avro::Schema::parse_str(definition)
            .map_err(|e| SchemaError::InvalidSchema(format!("Invalid Avro schema: {}", e)))?;
        Ok(Self::new(schema))
    }

    pub fn schema(&self) -> &apache_avro::Schema {
        &self.schema
    }
}

impl Decoder for AvroCodec {
    fn decode(&self, mut reader: &mut dyn Read) -> Result<Value> {
        apache_avro::from_avro_datum(&self.schema, &mut reader, None)
            .map_err(|e| SchemaError::DeserializationError(e.to_string()))
    }
}

impl Encoder for AvroCodec {
    fn encode(&self, value: &Value, writer: &mut dyn Write) -> Result<()> {
        let datum = apache_avro::to_avro_datum(&self.schema, value.clone())
            .map_err(|e| SchemaError::SerializationError(e.to_string()))?;
        writer.write_all(&datum)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_SCHEMA: &str = r#"{
        "type": "record",
        "name": "User",
        "fields": [
            {"name": "id", "type": "long"},
            {"name": "name", "type": "string"}
        ]
    }"#;

    fn user(id: i64, name: &str) -> Value {
        Value::Record(vec![
            ("id".to_string(), Value::Long(id)),
            ("name".to_string(), Value::String(name.to_string())),
        ])
    }

    #[test]
    fn test_string_datum() {
        let codec = AvroCodec::parse(r#"{"type": "string"}"#).unwrap();
        let value = Value::String("test".to_string());

        let mut buf = Vec::new();
        codec.encode(&value, &mut buf).unwrap();
        assert!(!buf.is_empty());

        let mut reader = &buf[..];
        assert_eq!(codec.decode(&mut reader).unwrap(), value);
    }

    #[test]
    fn test_record_datum() {
        let codec = AvroCodec::parse(USER_SCHEMA).unwrap();

        let mut buf = Vec::new();
        codec.encode(&user(42, "ada"), &mut buf).unwrap();

        let mut reader = &buf[..];
        assert_eq!(codec.decode(&mut reader).unwrap(), user(42, "ada"));
    }

    #[test]
    fn test_encode_rejects_mismatched_value() {
        let codec = AvroCodec::parse(USER_SCHEMA).unwrap();
        let mut buf = Vec::new();
        let result = codec.encode(&Value::Int(1), &mut buf);
        assert!(matches!(result, Err(SchemaError::SerializationError(_))));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let codec = AvroCodec::parse(USER_SCHEMA).unwrap();
        let mut reader: &[u8] = &[];
        assert!(matches!(
            codec.decode(&mut reader),
            Err(SchemaError::DeserializationError(_))
        ));
    }

    #[test]
    fn test_parse_invalid_schema() {
        assert!(matches!(
            AvroCodec::parse("not valid json"),
            Err(SchemaError::InvalidSchema(_))
        ));
    }
}
