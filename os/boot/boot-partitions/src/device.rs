/// Kind of block device reported by the storage layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeviceKind {
    /// The device was enumerated but never initialized.
    Unknown,
    Mmc,
    Nand,
}

/// Location of a physical partition, in device blocks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PartitionInfo {
    pub start: u64,
    pub size: u64,
    pub block_size: u64,
}

/// Block device collaborator able to look up physical partitions by name.
pub trait BlockDevice {
    fn kind(&self) -> DeviceKind;

    fn find_partition_by_name(&self, name: &str) -> Option<PartitionInfo>;
}

impl<T: BlockDevice + ?Sized> BlockDevice for &T {
    fn kind(&self) -> DeviceKind {
        (**self).kind()
    }

    fn find_partition_by_name(&self, name: &str) -> Option<PartitionInfo> {
        (**self).find_partition_by_name(name)
    }
}
