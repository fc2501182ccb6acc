use alloc::vec::Vec;
use boot_items::abi::{GUID_LEN, PARTITION_ENTRY_SIZE, PARTITION_MAP_HEADER_SIZE, PARTITION_NAME_LEN};
use boot_items::{BootContainer, ContainerError, ItemType};
use uuid::Uuid;

/// Partition name; one byte of the wire field is kept for the NUL terminator.
pub type PartitionName = heapless::String<{ PARTITION_NAME_LEN - 1 }>;

/// One logical partition of the map.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PartitionEntry {
    pub type_guid: Uuid,
    pub instance_guid: Uuid,
    pub first_block: u64,
    pub last_block: u64,
    pub flags: u64,
    pub name: PartitionName,
}

/// Logical partition map of the boot device.
///
/// Built fresh on every boot; entries may overlap.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PartitionMap {
    pub block_count: u64,
    pub block_size: u64,
    pub guid: Uuid,
    pub entries: Vec<PartitionEntry>,
}

impl PartitionMap {
    /// Payload of a partition map boot item.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(PARTITION_MAP_HEADER_SIZE + self.entries.len() * PARTITION_ENTRY_SIZE);
        out.extend_from_slice(&self.block_count.to_le_bytes());
        out.extend_from_slice(&self.block_size.to_le_bytes());
        // entries are bounded by the layout, never near u32::MAX
        #[allow(clippy::cast_possible_truncation)]
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&self.guid.to_bytes_le());

        for entry in &self.entries {
            out.extend_from_slice(&entry.type_guid.to_bytes_le());
            out.extend_from_slice(&entry.instance_guid.to_bytes_le());
            out.extend_from_slice(&entry.first_block.to_le_bytes());
            out.extend_from_slice(&entry.last_block.to_le_bytes());
            out.extend_from_slice(&entry.flags.to_le_bytes());

            let name = entry.name.as_bytes();
            out.extend_from_slice(name);
            out.resize(out.len() + PARTITION_NAME_LEN - name.len(), 0);
        }

        debug_assert_eq!(
            out.len(),
            PARTITION_MAP_HEADER_SIZE + self.entries.len() * PARTITION_ENTRY_SIZE
        );
        out
    }

    /// Append the map as a [`ItemType::PartitionMap`] item.
    ///
    /// # Errors
    /// Propagates [`ContainerError`] from the container.
    pub fn append_to(&self, container: &mut BootContainer) -> Result<(), ContainerError> {
        container.append(ItemType::PartitionMap, 0, &self.to_bytes())
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&PartitionEntry> {
        self.entries.iter().find(|e| e.name.as_str() == name)
    }
}

const _: () = assert!(GUID_LEN == size_of::<uuid::Bytes>());
