use crate::abi::{ITEM_ALIGNMENT, ITEM_HEADER_SIZE, ItemHeader, ItemType, align_up};
use alloc::vec::Vec;
use log::debug;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ContainerError {
    #[error("payload of {len} bytes does not fit the shape of a {item_type:?} item")]
    InvalidItemSize { item_type: ItemType, len: usize },
    #[error("the container holds no items")]
    Empty,
    #[error("alignment {0} is not a power of two")]
    BadAlignment(usize),
    #[error("the container exceeds the 32-bit length field")]
    TooLarge,
}

/// One typed record of the container. Immutable once appended.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BootItem {
    pub item_type: ItemType,
    pub extra: u32,
    pub payload: Vec<u8>,
}

impl BootItem {
    /// Bytes this item occupies in a container with the given alignment.
    #[must_use]
    pub fn serialized_len(&self, alignment: usize) -> usize {
        ITEM_HEADER_SIZE + align_up(self.payload.len(), alignment)
    }
}

/// Append-only builder for the boot item stream.
///
/// Items keep their insertion order. Duplicate types are accepted; the kernel
/// coalesces them.
#[derive(Debug)]
pub struct BootContainer {
    items: Vec<BootItem>,
    alignment: usize,
}

impl Default for BootContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl BootContainer {
    /// An empty container padding payloads to [`ITEM_ALIGNMENT`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            alignment: ITEM_ALIGNMENT,
        }
    }

    /// An empty container padding payloads to `alignment` bytes; `1` disables padding.
    ///
    /// # Errors
    /// [`ContainerError::BadAlignment`] if `alignment` is not a power of two.
    pub const fn with_alignment(alignment: usize) -> Result<Self, ContainerError> {
        if !alignment.is_power_of_two() {
            return Err(ContainerError::BadAlignment(alignment));
        }
        Ok(Self {
            items: Vec::new(),
            alignment,
        })
    }

    /// Append one item.
    ///
    /// # Errors
    /// [`ContainerError::InvalidItemSize`] if the payload is empty (and the type
    /// does not allow that) or does not match the shape the type mandates.
    pub fn append(
        &mut self,
        item_type: ItemType,
        extra: u32,
        payload: &[u8],
    ) -> Result<(), ContainerError> {
        if !item_type.payload_fits(payload) {
            return Err(ContainerError::InvalidItemSize {
                item_type,
                len: payload.len(),
            });
        }

        debug!(
            "boot item #{}: {item_type:?} extra={extra:#010x} len={}",
            self.items.len(),
            payload.len()
        );

        self.items.push(BootItem {
            item_type,
            extra,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn alignment(&self) -> usize {
        self.alignment
    }

    #[must_use]
    pub fn items(&self) -> &[BootItem] {
        &self.items
    }

    /// Total size of the finalized buffer, container header included.
    #[must_use]
    pub fn serialized_len(&self) -> usize {
        ITEM_HEADER_SIZE
            + self
                .items
                .iter()
                .map(|item| item.serialized_len(self.alignment))
                .sum::<usize>()
    }

    /// Serialize the container for hand-off.
    ///
    /// # Errors
    /// [`ContainerError::Empty`] if nothing was appended;
    /// [`ContainerError::TooLarge`] if a length overflows its `u32` field.
    pub fn finalize(self) -> Result<Vec<u8>, ContainerError> {
        if self.items.is_empty() {
            return Err(ContainerError::Empty);
        }

        let total = self.serialized_len();
        let body = u32::try_from(total - ITEM_HEADER_SIZE).map_err(|_| ContainerError::TooLarge)?;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&ItemHeader::container(body).to_bytes());

        for item in &self.items {
            let len = u32::try_from(item.payload.len()).map_err(|_| ContainerError::TooLarge)?;
            out.extend_from_slice(&ItemHeader::item(item.item_type, item.extra, len).to_bytes());
            out.extend_from_slice(&item.payload);
            out.resize(align_up(out.len(), self.alignment), 0);
        }

        debug_assert_eq!(out.len(), total);
        debug!("boot container finalized: {} items, {total} bytes", self.items.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{CONTAINER_MAGIC, CONTAINER_TYPE, DriverKind};

    #[test]
    fn finalize_empty_fails() {
        assert_eq!(BootContainer::new().finalize(), Err(ContainerError::Empty));
    }

    #[test]
    fn append_rejects_empty_payload() {
        let mut c = BootContainer::new();
        assert_eq!(
            c.append(ItemType::Cmdline, 0, &[]),
            Err(ContainerError::InvalidItemSize {
                item_type: ItemType::Cmdline,
                len: 0
            })
        );
        assert!(c.is_empty());
        assert!(c.append(ItemType::Discard, 0, &[]).is_ok());
    }

    #[test]
    fn append_rejects_wrong_shape() {
        let mut c = BootContainer::new();
        let err = c.append(ItemType::PlatformId, 0, &[0; 12]).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidItemSize { len: 12, .. }));
    }

    #[test]
    fn payloads_are_padded() {
        let mut c = BootContainer::new();
        c.append(ItemType::KernelDriver, DriverKind::ArmPsci.code(), &[1, 2, 3])
            .unwrap();
        c.append(ItemType::Cmdline, 0, b"x=1\0").unwrap();
        assert_eq!(c.serialized_len(), 32 + (32 + 8) + (32 + 8));

        let bytes = c.finalize().unwrap();
        assert_eq!(bytes.len(), 112);
        let hdr = ItemHeader::from_bytes(&bytes).unwrap();
        assert_eq!(hdr.item_type, CONTAINER_TYPE);
        assert_eq!(hdr.extra, CONTAINER_MAGIC);
        assert_eq!(hdr.length, 80);
        assert_eq!(&bytes[64..67], &[1, 2, 3]);
        assert_eq!(&bytes[67..72], &[0; 5]);
    }

    #[test]
    fn unaligned_container_has_no_padding() {
        let mut c = BootContainer::with_alignment(1).unwrap();
        c.append(ItemType::Cmdline, 0, b"abc\0").unwrap();
        c.append(ItemType::Cmdline, 0, b"de\0").unwrap();
        assert_eq!(c.finalize().unwrap().len(), 32 + 32 + 4 + 32 + 3);
    }

    #[test]
    fn bad_alignment() {
        assert_eq!(
            BootContainer::with_alignment(12).unwrap_err(),
            ContainerError::BadAlignment(12)
        );
    }
}
