/// Size of one key-value store region.
pub const KVSTORE_SIZE: usize = 32 * 1024;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("the partition does not exist")]
    NoSuchPartition,
    #[error("region {offset:#x}+{len:#x} lies outside the partition")]
    OutOfRange { offset: u64, len: usize },
    #[error("the storage device reported an I/O error")]
    Io,
}

/// Byte-addressable, synchronous access to named storage partitions.
pub trait Storage {
    /// Fill `buf` from `partition` starting at `offset`.
    ///
    /// # Errors
    /// Any failure of the device; the buffer content is then unspecified.
    fn read(&mut self, partition: &str, offset: u64, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` to `partition` starting at `offset`.
    ///
    /// # Errors
    /// Any failure of the device.
    fn write(&mut self, partition: &str, offset: u64, data: &[u8]) -> Result<(), StorageError>;
}

impl<T: Storage + ?Sized> Storage for &mut T {
    fn read(&mut self, partition: &str, offset: u64, buf: &mut [u8]) -> Result<(), StorageError> {
        (**self).read(partition, offset, buf)
    }

    fn write(&mut self, partition: &str, offset: u64, data: &[u8]) -> Result<(), StorageError> {
        (**self).write(partition, offset, data)
    }
}

/// Placement of the key-value stores inside the sysconfig partition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SysconfigLayout {
    pub kvstore_size: usize,
    pub boot_default_offset: u64,
    pub boot_oneshot_offset: u64,
}

impl SysconfigLayout {
    /// Sysconfig store at 0, followed by boot-default and boot-oneshot.
    pub const STANDARD: Self = Self {
        kvstore_size: KVSTORE_SIZE,
        boot_default_offset: KVSTORE_SIZE as u64,
        boot_oneshot_offset: 2 * KVSTORE_SIZE as u64,
    };
}

impl Default for SysconfigLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

const _: () = {
    assert!(SysconfigLayout::STANDARD.boot_oneshot_offset == 0x1_0000);
    assert!(SysconfigLayout::STANDARD.boot_default_offset == 0x8000);
};
