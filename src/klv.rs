//! Local-set (tag/length/value) coding for framework payloads.
//!
//! A framework payload is a sequence of local-set items: 2-byte big-endian
//! tag, 2-byte big-endian length, then that many value bytes, repeated until
//! the declared payload length is exhausted. Reference-valued properties use
//! either a bare 16-byte value (single reference) or a
//! `{4-byte count, 4-byte element size = 16, count x 16-byte ids}` encoding
//! (batch of references). These byte layouts are fixed by the container
//! format and must be preserved for interoperability.
//!
//! Every read is bounds-checked against the remaining payload; a truncated
//! payload yields a [`DmError::Malformed`] with the offset where decoding
//! stopped, never an out-of-bounds slice.

use crate::error::{DmError, Result};
use crate::ul::InstanceId;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;

/// One decoded local-set item, borrowing its value from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSetItem<'a> {
    /// File-local 2-byte tag.
    pub tag: u16,
    /// Value bytes (exactly the declared item length).
    pub value: &'a [u8],
}

/// Cursor over a framework payload yielding local-set items.
pub struct LocalSetReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> LocalSetReader<'a> {
    /// Create a reader over a full payload.
    pub fn new(data: &'a [u8]) -> Self {
        LocalSetReader { data, position: 0 }
    }

    /// Current byte offset into the payload.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Read the next item, or `None` when the payload is cleanly exhausted.
    ///
    /// 1-3 trailing bytes, or an item length that overruns the payload,
    /// are malformed: the cursor stops where the inconsistency was found.
    pub fn next_item(&mut self) -> Result<Option<LocalSetItem<'a>>> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Ok(None);
        }
        if remaining < 4 {
            return Err(DmError::Malformed {
                offset: self.position,
                reason: format!("{} trailing bytes, item header needs 4", remaining),
            });
        }

        let tag = u16::from_be_bytes([self.data[self.position], self.data[self.position + 1]]);
        let length =
            u16::from_be_bytes([self.data[self.position + 2], self.data[self.position + 3]])
                as usize;

        if length > remaining - 4 {
            return Err(DmError::Malformed {
                offset: self.position,
                reason: format!(
                    "item declares {} value bytes, only {} remain",
                    length,
                    remaining - 4
                ),
            });
        }

        let value = &self.data[self.position + 4..self.position + 4 + length];
        self.position += 4 + length;

        Ok(Some(LocalSetItem { tag, value }))
    }
}

/// Write one local-set item (2-byte BE tag, 2-byte BE length, value).
pub fn write_local_set<W: Write>(writer: &mut W, tag: u16, value: &[u8]) -> Result<usize> {
    writer.write_u16::<BigEndian>(tag)?;
    writer.write_u16::<BigEndian>(value.len() as u16)?;
    writer.write_all(value)?;
    Ok(4 + value.len())
}

/// Parse a batch-of-references value: `{count: u32, element size: u32 (= 16),
/// count x 16-byte instance ids}`, all big-endian.
///
/// Returns `None` when the value does not carry that shape (wrong element
/// size, short header, count inconsistent with the value length). The caller
/// treats such a value as opaque rather than failing.
pub fn parse_reference_batch(value: &[u8]) -> Option<Vec<InstanceId>> {
    if value.len() < 8 {
        return None;
    }
    let count = u32::from_be_bytes([value[0], value[1], value[2], value[3]]) as usize;
    let element_size = u32::from_be_bytes([value[4], value[5], value[6], value[7]]) as usize;
    if element_size != 16 {
        return None;
    }
    if value.len() - 8 < count * 16 {
        return None;
    }

    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let start = 8 + i * 16;
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&value[start..start + 16]);
        ids.push(InstanceId(bytes));
    }
    Some(ids)
}

/// Encode a batch of references in wire form.
pub fn write_reference_batch(ids: &[InstanceId]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + ids.len() * 16);
    out.extend_from_slice(&(ids.len() as u32).to_be_bytes());
    out.extend_from_slice(&16u32.to_be_bytes());
    for id in ids {
        out.extend_from_slice(id.as_bytes());
    }
    out
}

/// Decode a big-endian unsigned integer of width 1, 2, 4 or 8 bytes.
pub fn read_be_uint(value: &[u8]) -> Option<u64> {
    match value.len() {
        1 => Some(value[0] as u64),
        2 => Some(u16::from_be_bytes([value[0], value[1]]) as u64),
        4 => Some(u32::from_be_bytes([value[0], value[1], value[2], value[3]]) as u64),
        8 => Some(u64::from_be_bytes([
            value[0], value[1], value[2], value[3], value[4], value[5], value[6], value[7],
        ])),
        _ => None,
    }
}

/// Decode a big-endian UTF-16 string, dropping trailing NUL padding.
pub fn decode_utf16_be(value: &[u8]) -> String {
    let units: Vec<u16> = value
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    let end = units
        .iter()
        .rposition(|&u| u != 0)
        .map(|p| p + 1)
        .unwrap_or(0);
    String::from_utf16_lossy(&units[..end])
}

/// Encode a string as big-endian UTF-16 (used when building fixtures).
pub fn encode_utf16_be(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

/// Decode a UTF-8 string, dropping trailing NUL padding.
pub fn decode_utf8(value: &[u8]) -> String {
    let end = value
        .iter()
        .rposition(|&b| b != 0)
        .map(|p| p + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&value[..end]).into_owned()
}
