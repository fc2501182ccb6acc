//! File-backed stand-ins for the bootloader's storage collaborators.

use crate::error::ToolError;
use boot_partitions::{BlockDevice, DeviceKind, PartitionInfo};
use boot_sysconfig::{Storage, StorageError};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

const DEFAULT_BLOCK_SIZE: u64 = 512;

/// A partition image on the host file system.
pub struct FileStorage {
    partition: String,
    file: File,
}

impl FileStorage {
    /// Open `path` as the contents of `partition`.
    pub fn open(partition: &str, path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self {
            partition: partition.to_string(),
            file,
        })
    }

    fn seek(&mut self, partition: &str, offset: u64) -> Result<(), StorageError> {
        if partition != self.partition {
            return Err(StorageError::NoSuchPartition);
        }
        self.file
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|_| StorageError::Io)
    }
}

impl Storage for FileStorage {
    fn read(&mut self, partition: &str, offset: u64, buf: &mut [u8]) -> Result<(), StorageError> {
        self.seek(partition, offset)?;
        self.file.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => StorageError::OutOfRange {
                offset,
                len: buf.len(),
            },
            _ => StorageError::Io,
        })
    }

    fn write(&mut self, partition: &str, offset: u64, data: &[u8]) -> Result<(), StorageError> {
        self.seek(partition, offset)?;
        self.file
            .write_all(data)
            .and_then(|()| self.file.flush())
            .map_err(|_| StorageError::Io)
    }
}

/// Physical partitions read from a text table.
///
/// One partition per line: `name start size [block_size]`, numbers in
/// decimal or `0x` hex, in blocks. `#` starts a comment.
#[derive(Debug, Default)]
pub struct PartitionTable {
    parts: Vec<(String, PartitionInfo)>,
}

impl PartitionTable {
    pub fn parse(text: &str) -> Result<Self, ToolError> {
        let mut parts = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let err = |reason| ToolError::PartitionTable {
                line: index + 1,
                reason,
            };
            let mut fields = line.split_whitespace();
            let name = fields.next().ok_or_else(|| err("missing name"))?;
            let mut number = |what| {
                fields
                    .next()
                    .map(parse_number)
                    .transpose()
                    .map_err(|()| err(what))
            };
            let start = number("bad start")?.ok_or_else(|| err("missing start"))?;
            let size = number("bad size")?.ok_or_else(|| err("missing size"))?;
            let block_size = number("bad block size")?.unwrap_or(DEFAULT_BLOCK_SIZE);
            if fields.next().is_some() {
                return Err(err("trailing fields"));
            }

            parts.push((
                name.to_string(),
                PartitionInfo {
                    start,
                    size,
                    block_size,
                },
            ));
        }
        Ok(Self { parts })
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

fn parse_number(s: &str) -> Result<u64, ()> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|_| ())
}

impl BlockDevice for PartitionTable {
    fn kind(&self) -> DeviceKind {
        if self.is_empty() {
            DeviceKind::Unknown
        } else {
            DeviceKind::Mmc
        }
    }

    fn find_partition_by_name(&self, name: &str) -> Option<PartitionInfo> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, info)| *info)
    }
}
