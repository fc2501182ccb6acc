//! # Wire ABI
//!
//! Numbering and header layout shared with the kernel's boot item reader.
//! Every value in here is part of a stable contract; change nothing without
//! changing the reader.

use bitfield_struct::bitfield;

/// Type code of the container header (`"BOOT"`).
pub const CONTAINER_TYPE: u32 = 0x544F_4F42;

/// `extra` value of the container header.
pub const CONTAINER_MAGIC: u32 = 0x868C_F7E6;

/// Magic value carried by every item header.
pub const ITEM_MAGIC: u32 = 0xB578_1729;

/// Value of [`ItemHeader::crc32`] when [`ItemFlags::crc32`] is not set.
pub const ITEM_NO_CRC32: u32 = 0x4A87_E8D6;

/// Size of a single item (and container) header in bytes.
pub const ITEM_HEADER_SIZE: usize = 32;

/// Default payload alignment. Each payload is zero-padded to this boundary.
pub const ITEM_ALIGNMENT: usize = 8;

/// Upper bound for [`ItemType::CpuConfig`] cluster records.
pub const MAX_CPU_CLUSTERS: usize = 4;

/// CPU config header: `cluster_count u32` plus three reserved words.
pub const CPU_CONFIG_HEADER_SIZE: usize = 16;

/// CPU cluster record: `cpu_count u32` plus three reserved words.
pub const CPU_CLUSTER_SIZE: usize = 16;

/// Memory range record: `paddr u64, length u64, type u32, reserved u32`.
pub const MEM_RANGE_SIZE: usize = 24;

/// Length of the NUL-padded board name field of the platform id.
pub const BOARD_NAME_LEN: usize = 32;

/// Platform id record: `vid u32, pid u32, board_name [u8; 32]`.
pub const PLATFORM_ID_SIZE: usize = 8 + BOARD_NAME_LEN;

/// Length of a GUID field.
pub const GUID_LEN: usize = 16;

/// Length of the NUL-padded partition name field.
pub const PARTITION_NAME_LEN: usize = 32;

/// Partition map header:
/// `block_count u64, block_size u64, partition_count u32, reserved u32, guid [u8; 16]`.
pub const PARTITION_MAP_HEADER_SIZE: usize = 8 + 8 + 4 + 4 + GUID_LEN;

/// Partition record:
/// `type_guid, uniq_guid, first_block u64, last_block u64, flags u64, name [u8; 32]`.
pub const PARTITION_ENTRY_SIZE: usize = 2 * GUID_LEN + 3 * 8 + PARTITION_NAME_LEN;

/// Length of a MAC address payload.
pub const MAC_ADDRESS_LEN: usize = 6;

const _: () = {
    assert!(size_of::<ItemHeader>() == ITEM_HEADER_SIZE);
    assert!(ITEM_ALIGNMENT.is_power_of_two());
    assert!(PLATFORM_ID_SIZE == 40);
    assert!(PARTITION_MAP_HEADER_SIZE == 40);
    assert!(PARTITION_ENTRY_SIZE == 88);
};

/// Semantic kind of a boot item.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ItemType {
    /// CPU topology (`"CPUC"`).
    CpuConfig = 0x4355_5043,
    /// Physical memory ranges (`"MEMC"`).
    MemConfig = 0x434D_454D,
    /// Opaque early driver configuration; `extra` holds the [`DriverKind`] (`"KDRV"`).
    KernelDriver = 0x5652_444B,
    /// NUL-terminated kernel command line fragment (`"CMDL"`).
    Cmdline = 0x4C44_4D43,
    /// Vendor, product and board name (`"PLID"`).
    PlatformId = 0x4449_4C50,
    /// Logical partition map of the boot device (`"mPRT"`).
    PartitionMap = 0x5452_506D,
    /// Primary Ethernet MAC address (`"mMAC"`).
    MacAddress = 0x4341_4D6D,
    /// Item the reader skips (`"SKIP"`).
    Discard = 0x5049_4B53,
}

impl ItemType {
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0x4355_5043 => Self::CpuConfig,
            0x434D_454D => Self::MemConfig,
            0x5652_444B => Self::KernelDriver,
            0x4C44_4D43 => Self::Cmdline,
            0x4449_4C50 => Self::PlatformId,
            0x5452_506D => Self::PartitionMap,
            0x4341_4D6D => Self::MacAddress,
            0x5049_4B53 => Self::Discard,
            _ => return None,
        })
    }

    /// Whether an item of this type may carry zero payload bytes.
    #[must_use]
    pub const fn permits_empty(self) -> bool {
        matches!(self, Self::Discard)
    }

    /// Checks the payload length against the shape this type mandates.
    ///
    /// Variable-shape types (drivers, command line, discard) only require a
    /// non-empty payload unless [`permits_empty`](Self::permits_empty).
    #[must_use]
    pub fn payload_fits(self, payload: &[u8]) -> bool {
        let len = payload.len();
        if len == 0 {
            return self.permits_empty();
        }

        match self {
            Self::CpuConfig => {
                let Some(count) = read_u32(payload, 0) else {
                    return false;
                };
                let count = count as usize;
                count <= MAX_CPU_CLUSTERS
                    && len == CPU_CONFIG_HEADER_SIZE + count * CPU_CLUSTER_SIZE
            }
            Self::MemConfig => len % MEM_RANGE_SIZE == 0,
            Self::PlatformId => len == PLATFORM_ID_SIZE,
            Self::PartitionMap => {
                let Some(count) = read_u32(payload, 16) else {
                    return false;
                };
                (count as usize)
                    .checked_mul(PARTITION_ENTRY_SIZE)
                    .and_then(|entries| entries.checked_add(PARTITION_MAP_HEADER_SIZE))
                    == Some(len)
            }
            Self::MacAddress => len == MAC_ADDRESS_LEN,
            Self::KernelDriver | Self::Cmdline | Self::Discard => true,
        }
    }
}

impl TryFrom<u32> for ItemType {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or(value)
    }
}

/// Hardware a [`ItemType::KernelDriver`] blob configures.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DriverKind {
    /// ARM power state coordination interface (`"PSCI"`).
    ArmPsci = 0x4943_5350,
    /// ARM `GICv2` interrupt controller (`"GIC2"`).
    ArmGicV2 = 0x3243_4947,
    /// ARM `GICv3` interrupt controller (`"GIC3"`).
    ArmGicV3 = 0x3343_4947,
    /// ARM generic timer (`"ATIM"`).
    ArmGenericTimer = 0x4D49_5441,
    /// Amlogic UART (`"AMLU"`).
    AmlogicUart = 0x554C_4D41,
    /// Amlogic HDCP block (`"AMLH"`).
    AmlogicHdcp = 0x484C_4D41,
    /// NXP i.MX UART (`"IMXU"`).
    NxpImxUart = 0x5558_4D49,
}

impl DriverKind {
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0x4943_5350 => Self::ArmPsci,
            0x3243_4947 => Self::ArmGicV2,
            0x3343_4947 => Self::ArmGicV3,
            0x4D49_5441 => Self::ArmGenericTimer,
            0x554C_4D41 => Self::AmlogicUart,
            0x484C_4D41 => Self::AmlogicHdcp,
            0x5558_4D49 => Self::NxpImxUart,
            _ => return None,
        })
    }
}

/// Bitfield wrapper for [`ItemHeader::flags`].
///
/// Layout, least significant bit first:
/// - bits 0 to 15: reserved
/// - bit 16: header version 2 (always set)
/// - bit 17: the `crc32` field is valid
/// - bits 18 to 31: reserved
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct ItemFlags {
    #[bits(16)]
    __: u16,
    pub version: bool,
    pub crc32: bool,
    #[bits(14)]
    __: u16,
}

/// Header preceding every payload, and the container itself.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ItemHeader {
    pub item_type: u32,
    pub length: u32,
    pub extra: u32,
    pub flags: ItemFlags,
    pub reserved0: u32,
    pub reserved1: u32,
    pub magic: u32,
    pub crc32: u32,
}

impl ItemHeader {
    /// Header for a regular item without checksum.
    #[must_use]
    pub const fn item(item_type: ItemType, extra: u32, length: u32) -> Self {
        Self {
            item_type: item_type.code(),
            length,
            extra,
            flags: ItemFlags::new().with_version(true),
            reserved0: 0,
            reserved1: 0,
            magic: ITEM_MAGIC,
            crc32: ITEM_NO_CRC32,
        }
    }

    /// Header for the container, covering `length` bytes of items.
    #[must_use]
    pub const fn container(length: u32) -> Self {
        Self {
            item_type: CONTAINER_TYPE,
            length,
            extra: CONTAINER_MAGIC,
            flags: ItemFlags::new().with_version(true),
            reserved0: 0,
            reserved1: 0,
            magic: ITEM_MAGIC,
            crc32: ITEM_NO_CRC32,
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; ITEM_HEADER_SIZE] {
        let words = [
            self.item_type,
            self.length,
            self.extra,
            self.flags.into_bits(),
            self.reserved0,
            self.reserved1,
            self.magic,
            self.crc32,
        ];

        let mut out = [0u8; ITEM_HEADER_SIZE];
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Decode a header from the first [`ITEM_HEADER_SIZE`] bytes of `buf`.
    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < ITEM_HEADER_SIZE {
            return None;
        }

        Some(Self {
            item_type: read_u32(buf, 0)?,
            length: read_u32(buf, 4)?,
            extra: read_u32(buf, 8)?,
            flags: ItemFlags::from_bits(read_u32(buf, 12)?),
            reserved0: read_u32(buf, 16)?,
            reserved1: read_u32(buf, 20)?,
            magic: read_u32(buf, 24)?,
            crc32: read_u32(buf, 28)?,
        })
    }
}

/// Round `len` up to a multiple of `alignment` (a power of two).
#[inline]
#[must_use]
pub const fn align_up(len: usize, alignment: usize) -> usize {
    (len + (alignment - 1)) & !(alignment - 1)
}

#[inline]
fn read_u32(buf: &[u8], off: usize) -> Option<u32> {
    let s = buf.get(off..off.checked_add(4)?)?;
    Some(u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
}
