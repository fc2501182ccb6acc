//! # Board Descriptors
//!
//! Typed forms of the fixed-shape items a board contributes. Each knows its
//! own wire encoding; see [`boot_items::abi`] for the sizes.

use crate::BoardError;
use alloc::vec::Vec;
use boot_items::DriverKind;
use boot_items::abi::{
    BOARD_NAME_LEN, CPU_CLUSTER_SIZE, CPU_CONFIG_HEADER_SIZE, MAC_ADDRESS_LEN, MAX_CPU_CLUSTERS,
    MEM_RANGE_SIZE, PLATFORM_ID_SIZE,
};

/// CPU topology: one CPU count per cluster.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CpuConfig {
    clusters: heapless::Vec<u32, MAX_CPU_CLUSTERS>,
}

impl CpuConfig {
    /// # Errors
    /// [`BoardError::TooManyClusters`] beyond [`MAX_CPU_CLUSTERS`].
    pub fn new(cpu_counts: &[u32]) -> Result<Self, BoardError> {
        let clusters = heapless::Vec::from_slice(cpu_counts)
            .map_err(|_| BoardError::TooManyClusters(cpu_counts.len()))?;
        Ok(Self { clusters })
    }

    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    #[must_use]
    pub fn cpu_count(&self) -> u32 {
        self.clusters.iter().sum()
    }

    /// Header plus one record per cluster.
    #[must_use]
    pub fn serialized_len(&self) -> usize {
        CPU_CONFIG_HEADER_SIZE + self.clusters.len() * CPU_CLUSTER_SIZE
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        // bounded by MAX_CPU_CLUSTERS
        #[allow(clippy::cast_possible_truncation)]
        let count = self.clusters.len() as u32;
        push_record(&mut out, count, CPU_CONFIG_HEADER_SIZE);
        for &cpus in &self.clusters {
            push_record(&mut out, cpus, CPU_CLUSTER_SIZE);
        }
        out
    }
}

fn push_record(out: &mut Vec<u8>, word: u32, size: usize) {
    out.extend_from_slice(&word.to_le_bytes());
    out.resize(out.len() + size - 4, 0);
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MemRangeKind {
    Ram = 1,
    Peripheral = 2,
    Reserved = 3,
}

/// One physical memory range.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MemoryRange {
    pub kind: MemRangeKind,
    pub paddr: u64,
    pub length: u64,
}

impl MemoryRange {
    #[must_use]
    pub const fn ram(paddr: u64, length: u64) -> Self {
        Self {
            kind: MemRangeKind::Ram,
            paddr,
            length,
        }
    }

    #[must_use]
    pub const fn peripheral(paddr: u64, length: u64) -> Self {
        Self {
            kind: MemRangeKind::Peripheral,
            paddr,
            length,
        }
    }

    #[must_use]
    pub const fn reserved(paddr: u64, length: u64) -> Self {
        Self {
            kind: MemRangeKind::Reserved,
            paddr,
            length,
        }
    }
}

/// Memory config payload for `ranges`, in order.
#[must_use]
pub fn encode_memory_ranges(ranges: &[MemoryRange]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ranges.len() * MEM_RANGE_SIZE);
    for range in ranges {
        out.extend_from_slice(&range.paddr.to_le_bytes());
        out.extend_from_slice(&range.length.to_le_bytes());
        out.extend_from_slice(&(range.kind as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
    }
    out
}

/// Opaque driver configuration, tagged with the hardware it configures.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DriverConfig {
    pub kind: DriverKind,
    pub blob: Vec<u8>,
}

/// Board name; one byte of the wire field is kept for the NUL terminator.
pub type BoardName = heapless::String<{ BOARD_NAME_LEN - 1 }>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PlatformIdentity {
    pub vendor_id: u32,
    pub product_id: u32,
    pub board_name: BoardName,
}

impl PlatformIdentity {
    /// # Errors
    /// [`BoardError::BoardNameTooLong`] if `board_name` does not fit.
    pub fn new(vendor_id: u32, product_id: u32, board_name: &str) -> Result<Self, BoardError> {
        let mut name = BoardName::new();
        name.push_str(board_name)
            .map_err(|_| BoardError::BoardNameTooLong(board_name.len()))?;
        Ok(Self {
            vendor_id,
            product_id,
            board_name: name,
        })
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PLATFORM_ID_SIZE);
        out.extend_from_slice(&self.vendor_id.to_le_bytes());
        out.extend_from_slice(&self.product_id.to_le_bytes());
        out.extend_from_slice(self.board_name.as_bytes());
        out.resize(PLATFORM_ID_SIZE, 0);
        out
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MacAddress(pub [u8; MAC_ADDRESS_LEN]);

impl MacAddress {
    /// Parse `xx:xx:xx:xx:xx:xx` (hex digits of either case). Anything after
    /// the sixth octet is ignored.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() < 3 * MAC_ADDRESS_LEN - 1 {
            return None;
        }

        let mut addr = [0u8; MAC_ADDRESS_LEN];
        for (i, octet) in addr.iter_mut().enumerate() {
            let at = 3 * i;
            if i + 1 < MAC_ADDRESS_LEN && bytes[at + 2] != b':' {
                return None;
            }
            *octet = (hex_digit(bytes[at])? << 4) | hex_digit(bytes[at + 1])?;
        }
        Some(Self(addr))
    }
}

const fn hex_digit(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_config_grows_by_one_cluster_record() {
        let one = CpuConfig::new(&[4]).unwrap();
        let two = CpuConfig::new(&[4, 4]).unwrap();
        assert_eq!(one.to_bytes().len(), one.serialized_len());
        assert_eq!(
            two.to_bytes().len() - one.to_bytes().len(),
            CPU_CLUSTER_SIZE
        );
        assert_eq!(two.cpu_count(), 8);
        assert_eq!(&two.to_bytes()[..4], &2u32.to_le_bytes());
    }

    #[test]
    fn cpu_config_cluster_limit() {
        assert!(CpuConfig::new(&[1; MAX_CPU_CLUSTERS]).is_ok());
        assert_eq!(
            CpuConfig::new(&[1; MAX_CPU_CLUSTERS + 1]),
            Err(BoardError::TooManyClusters(MAX_CPU_CLUSTERS + 1))
        );
    }

    #[test]
    fn memory_range_layout() {
        let bytes = encode_memory_ranges(&[MemoryRange::peripheral(0xc000_0000, 0x2000_0000)]);
        assert_eq!(bytes.len(), MEM_RANGE_SIZE);
        assert_eq!(&bytes[0..8], &0xc000_0000u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &0x2000_0000u64.to_le_bytes());
        assert_eq!(&bytes[16..20], &2u32.to_le_bytes());
    }

    #[test]
    fn platform_id_is_nul_padded() {
        let id = PlatformIdentity::new(4, 2, "vim2").unwrap();
        let bytes = id.to_bytes();
        assert_eq!(bytes.len(), PLATFORM_ID_SIZE);
        assert_eq!(&bytes[8..12], b"vim2");
        assert!(bytes[12..].iter().all(|&b| b == 0));

        let long = "x".repeat(BOARD_NAME_LEN);
        assert_eq!(
            PlatformIdentity::new(4, 2, &long),
            Err(BoardError::BoardNameTooLong(BOARD_NAME_LEN))
        );
    }

    #[test]
    fn mac_address_parsing() {
        assert_eq!(
            MacAddress::parse("00:1A:2b:3C:4d:ff"),
            Some(MacAddress([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0xff]))
        );
        assert_eq!(
            MacAddress::parse("00:1a:2b:3c:4d:5e:ff"),
            Some(MacAddress([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]))
        );
        assert_eq!(
            MacAddress::parse("00:1a:2b:3c:4d:5e\n"),
            Some(MacAddress([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]))
        );
        assert_eq!(MacAddress::parse("00:1a:2b:3c:4d"), None);
        assert_eq!(MacAddress::parse("00:1a:2b:3c:4d:5"), None);
        assert_eq!(MacAddress::parse("00-1a-2b-3c-4d-5e"), None);
        assert_eq!(MacAddress::parse("00:1a:2b:3c:4d:5g"), None);
        assert_eq!(MacAddress::parse(""), None);
    }
}
