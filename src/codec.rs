//! Record codec
//!
//! Encoding and decoding of key-value records shared by the WAL and SSTables.
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬──────────────┬─────────────┬───────────────┐
//! │ Total (4)    │ KeyLen (4)   │     Key     │     Value     │
//! └──────────────┴──────────────┴─────────────┴───────────────┘
//! ```
//! Both sizes are big-endian. The value length is implicit:
//! `total - RECORD_HEADER_SIZE - key_len`.

use crate::error::{LodeError, Result};
use crate::model::KeyValuePair;

/// Width of the total-size field
pub const TOTAL_SIZE_LEN: usize = 4;

/// Width of the key-size field
pub const KEY_SIZE_LEN: usize = 4;

/// Fixed bytes preceding the key in every record
pub const RECORD_HEADER_SIZE: usize = TOTAL_SIZE_LEN + KEY_SIZE_LEN;

/// Size in bytes of the framed record for `key` and `value`
pub fn encoded_len(key: &[u8], value: &[u8]) -> usize {
    RECORD_HEADER_SIZE + key.len() + value.len()
}

/// Encode one record, appending it to `buf`
pub fn encode_record_into(buf: &mut Vec<u8>, key: &[u8], value: &[u8]) {
    let total = encoded_len(key, value);
    buf.reserve(total);
    buf.extend_from_slice(&(total as u32).to_be_bytes());
    buf.extend_from_slice(&(key.len() as u32).to_be_bytes());
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);
}

/// Encode one record into a fresh buffer
pub fn encode_record(key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(key, value));
    encode_record_into(&mut buf, key, value);
    buf
}

/// Read the total-size field at the start of a record
pub fn record_size(header: &[u8]) -> Result<usize> {
    read_u32(header, 0).map(|size| size as usize)
}

/// Decode a single record occupying exactly `bytes`
pub fn decode_record(bytes: &[u8]) -> Result<KeyValuePair> {
    let (pair, consumed) = decode_at(bytes, 0)?;
    if consumed != bytes.len() {
        return Err(LodeError::Corruption(format!(
            "record declares {} bytes but buffer holds {}",
            consumed,
            bytes.len()
        )));
    }
    Ok(pair)
}

/// Decode successive records until the buffer is exhausted
pub fn decode_records(bytes: &[u8]) -> Result<Vec<KeyValuePair>> {
    let mut pairs = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (pair, end) = decode_at(bytes, pos)?;
        pairs.push(pair);
        pos = end;
    }
    Ok(pairs)
}

/// Decode the record starting at `pos`, returning it and the offset just past it
fn decode_at(bytes: &[u8], pos: usize) -> Result<(KeyValuePair, usize)> {
    let total = read_u32(bytes, pos)? as usize;
    let key_len = read_u32(bytes, pos + TOTAL_SIZE_LEN)? as usize;

    if total < RECORD_HEADER_SIZE + key_len {
        return Err(LodeError::Corruption(format!(
            "record at {} has total size {} smaller than its key ({} bytes)",
            pos, total, key_len
        )));
    }

    let end = pos + total;
    if end > bytes.len() {
        return Err(LodeError::Corruption(format!(
            "record at {} needs {} bytes, only {} available",
            pos,
            total,
            bytes.len() - pos
        )));
    }

    let key_start = pos + RECORD_HEADER_SIZE;
    let key_end = key_start + key_len;
    let pair = KeyValuePair::new(&bytes[key_start..key_end], &bytes[key_end..end]);
    Ok((pair, end))
}

fn read_u32(bytes: &[u8], pos: usize) -> Result<u32> {
    let field = bytes.get(pos..pos + 4).ok_or_else(|| {
        LodeError::Corruption(format!(
            "truncated size field at {} (buffer holds {} bytes)",
            pos,
            bytes.len()
        ))
    })?;
    Ok(u32::from_be_bytes([field[0], field[1], field[2], field[3]]))
}
