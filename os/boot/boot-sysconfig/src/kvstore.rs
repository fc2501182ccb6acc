//! # Key-Value Store Format
//!
//! A store occupies a fixed-size region and starts with a 16-byte header:
//!
//! | offset | field      | meaning                                   |
//! |--------|------------|-------------------------------------------|
//! | 0      | `magic`    | [`KVSTORE_MAGIC`] (`"KVS1"`)              |
//! | 4      | `crc32`    | CRC-32 of the record bytes                |
//! | 8      | `length`   | number of record bytes after the header   |
//! | 12     | `reserved` | zero                                      |
//!
//! Records are `key\0value\0` pairs back to back. Keys are non-empty; both
//! keys and values are UTF-8. The rest of the region is zero. An erased
//! (all-zero) region fails with [`Corruption::BadMagic`].

use crate::crc32;
use alloc::vec::Vec;

/// Store magic, `"KVS1"` in little-endian.
pub const KVSTORE_MAGIC: u32 = u32::from_le_bytes(*b"KVS1");

pub const KVSTORE_HEADER_SIZE: usize = 16;

/// Reason a buffer failed to parse.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Corruption {
    #[error("buffer is shorter than the store header")]
    TooShort,
    #[error("bad magic {0:#010x}")]
    BadMagic(u32),
    #[error("record length {0} exceeds the region")]
    BadLength(u32),
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    BadChecksum { stored: u32, computed: u32 },
    #[error("malformed record at offset {0:#x}")]
    MalformedRecord(usize),
    #[error("record at offset {0:#x} is not valid UTF-8")]
    NotUtf8(usize),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum KvError {
    #[error("key-value store is corrupt")]
    Corrupt(#[source] Corruption),
    #[error("records do not fit into a {0}-byte region")]
    Full(usize),
    #[error("keys must be non-empty and records must not contain NUL bytes")]
    InvalidRecord,
}

impl From<Corruption> for KvError {
    fn from(value: Corruption) -> Self {
        Self::Corrupt(value)
    }
}

/// Validated, read-only view of the records of one store.
#[derive(Debug, Copy, Clone)]
pub struct KvRecord<'a> {
    records: &'a [u8],
}

/// Iterator over `(key, value)` pairs.
pub struct Pairs<'a> {
    rest: &'a [u8],
}

impl<'a> KvRecord<'a> {
    /// Parse a store region.
    ///
    /// # Errors
    /// [`KvError::Corrupt`] if the header, checksum or records are invalid.
    pub fn parse(buf: &'a [u8]) -> Result<Self, KvError> {
        let header = buf.get(..KVSTORE_HEADER_SIZE).ok_or(Corruption::TooShort)?;
        let word = |off: usize| {
            u32::from_le_bytes([header[off], header[off + 1], header[off + 2], header[off + 3]])
        };

        let magic = word(0);
        if magic != KVSTORE_MAGIC {
            return Err(Corruption::BadMagic(magic).into());
        }

        let stored = word(4);
        let length = word(8);
        let records = KVSTORE_HEADER_SIZE
            .checked_add(length as usize)
            .and_then(|end| buf.get(KVSTORE_HEADER_SIZE..end))
            .ok_or(Corruption::BadLength(length))?;

        let computed = crc32::checksum(records);
        if computed != stored {
            return Err(Corruption::BadChecksum { stored, computed }.into());
        }

        let mut rest = records;
        let mut offset = KVSTORE_HEADER_SIZE;
        while !rest.is_empty() {
            let (key, after_key) = split_cstr(rest).ok_or(Corruption::MalformedRecord(offset))?;
            let (value, after_value) =
                split_cstr(after_key).ok_or(Corruption::MalformedRecord(offset))?;
            if key.is_empty() {
                return Err(Corruption::MalformedRecord(offset).into());
            }
            if core::str::from_utf8(key).is_err() || core::str::from_utf8(value).is_err() {
                return Err(Corruption::NotUtf8(offset).into());
            }
            offset += key.len() + value.len() + 2;
            rest = after_value;
        }

        Ok(Self { records })
    }

    /// Value of the first record with the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub const fn pairs(&self) -> Pairs<'a> {
        Pairs { rest: self.records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs().count()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, rest) = split_cstr(self.rest)?;
        let (value, rest) = split_cstr(rest)?;
        self.rest = rest;
        Some((
            core::str::from_utf8(key).ok()?,
            core::str::from_utf8(value).ok()?,
        ))
    }
}

/// Serialize `pairs` into a zero-padded region of `size` bytes.
///
/// # Errors
/// [`KvError::InvalidRecord`] for an empty key or embedded NUL;
/// [`KvError::Full`] if the records do not fit.
pub fn encode_kvstore(pairs: &[(&str, &str)], size: usize) -> Result<Vec<u8>, KvError> {
    let mut records = Vec::new();
    for (key, value) in pairs {
        if key.is_empty() || key.contains('\0') || value.contains('\0') {
            return Err(KvError::InvalidRecord);
        }
        records.extend_from_slice(key.as_bytes());
        records.push(0);
        records.extend_from_slice(value.as_bytes());
        records.push(0);
    }

    if KVSTORE_HEADER_SIZE + records.len() > size {
        return Err(KvError::Full(size));
    }
    let length = u32::try_from(records.len()).map_err(|_| KvError::Full(size))?;

    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&KVSTORE_MAGIC.to_le_bytes());
    out.extend_from_slice(&crc32::checksum(&records).to_le_bytes());
    out.extend_from_slice(&length.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&records);
    out.resize(size, 0);
    Ok(out)
}

fn split_cstr(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let nul = buf.iter().position(|&b| b == 0)?;
    Some((&buf[..nul], &buf[nul + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_get() {
        let buf = encode_kvstore(&[("boot", "a"), ("verbose", "")], 256).unwrap();
        assert_eq!(buf.len(), 256);

        let kv = KvRecord::parse(&buf).unwrap();
        assert_eq!(kv.get("boot"), Some("a"));
        assert_eq!(kv.get("verbose"), Some(""));
        assert_eq!(kv.get("missing"), None);
        assert_eq!(kv.len(), 2);
    }

    #[test]
    fn first_duplicate_wins() {
        let buf = encode_kvstore(&[("boot", "b"), ("boot", "a")], 64).unwrap();
        assert_eq!(KvRecord::parse(&buf).unwrap().get("boot"), Some("b"));
    }

    #[test]
    fn erased_region_is_corrupt() {
        assert_eq!(
            KvRecord::parse(&[0u8; 128]).unwrap_err(),
            KvError::Corrupt(Corruption::BadMagic(0))
        );
    }

    #[test]
    fn short_buffer_is_corrupt() {
        assert_eq!(
            KvRecord::parse(&[0u8; 4]).unwrap_err(),
            KvError::Corrupt(Corruption::TooShort)
        );
    }

    #[test]
    fn flipped_bit_fails_checksum() {
        let mut buf = encode_kvstore(&[("boot", "a")], 64).unwrap();
        buf[KVSTORE_HEADER_SIZE + 5] = b'b';
        assert!(matches!(
            KvRecord::parse(&buf),
            Err(KvError::Corrupt(Corruption::BadChecksum { .. }))
        ));
    }

    #[test]
    fn oversized_length_is_corrupt() {
        let mut buf = encode_kvstore(&[("boot", "a")], 64).unwrap();
        buf[8..12].copy_from_slice(&1000u32.to_le_bytes());
        assert_eq!(
            KvRecord::parse(&buf).unwrap_err(),
            KvError::Corrupt(Corruption::BadLength(1000))
        );
    }

    #[test]
    fn dangling_key_is_malformed() {
        let records = b"boot\0a";
        let mut buf = Vec::new();
        buf.extend_from_slice(&KVSTORE_MAGIC.to_le_bytes());
        buf.extend_from_slice(&crc32::checksum(records).to_le_bytes());
        buf.extend_from_slice(&6u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(records);

        assert_eq!(
            KvRecord::parse(&buf).unwrap_err(),
            KvError::Corrupt(Corruption::MalformedRecord(KVSTORE_HEADER_SIZE))
        );
    }

    #[test]
    fn encode_limits() {
        assert_eq!(encode_kvstore(&[("", "a")], 64), Err(KvError::InvalidRecord));
        assert_eq!(encode_kvstore(&[("k", "a\0b")], 64), Err(KvError::InvalidRecord));
        assert_eq!(encode_kvstore(&[("boot", "a")], 20), Err(KvError::Full(20)));
    }
}
