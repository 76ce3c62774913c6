//! Schema ID Wire Header
//!
//! Every encoded record is prefixed with a 5-byte header:
//!
//! ```text
//! [magic_byte(1) = 0x00][schema_id(4), big-endian][payload(N)]
//! ```
//!
//! Consumers read exactly these 5 bytes, resolve the id to a decoder and
//! decode the remainder with it.

use crate::error::{Result, SchemaError};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Magic byte indicating schema ID is present
pub const MAGIC_BYTE: u8 = 0x00;

/// Length of the wire header in bytes
pub const HEADER_LEN: usize = 5;

/// Header for `schema_id` as a fixed array
pub fn header_bytes(schema_id: i32) -> [u8; HEADER_LEN] {
    let id = schema_id.to_be_bytes();
    [MAGIC_BYTE, id[0], id[1], id[2], id[3]]
}

/// Append the header for `schema_id` to `buf`
pub fn put_header<B: BufMut>(buf: &mut B, schema_id: i32) {
    buf.put_slice(&header_bytes(schema_id));
}

/// Header followed by `payload`
pub fn frame(schema_id: i32, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    put_header(&mut buf, schema_id);
    buf.put_slice(payload);
    buf.freeze()
}

/// Split a framed record into `(schema_id, payload)`
pub fn read_header(data: &[u8]) -> Result<(i32, &[u8])> {
    if data.len() < HEADER_LEN {
        return Err(SchemaError::InvalidHeader(format!(
            "need {} bytes, got {}",
            HEADER_LEN,
            data.len()
        )));
    }

    if data[0] != MAGIC_BYTE {
        return Err(SchemaError::InvalidHeader(format!(
            "expected magic byte 0x00, got 0x{:02x}",
            data[0]
        )));
    }

    let mut id_bytes = &data[1..HEADER_LEN];
    let schema_id = id_bytes.get_i32();

    Ok((schema_id, &data[HEADER_LEN..]))
}
