//! Read-only view over a finalized container.

use crate::abi::{
    CONTAINER_MAGIC, CONTAINER_TYPE, ITEM_ALIGNMENT, ITEM_HEADER_SIZE, ITEM_MAGIC, ItemHeader,
    ItemType, align_up,
};
use crate::container::BootItem;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("buffer too short for a container header")]
    TooShort,
    #[error("container header has a bad type, extra or magic value")]
    BadContainer,
    #[error("item at offset {0:#x} has a bad magic value")]
    BadItemMagic(usize),
    #[error("unknown item type {0:#010x}")]
    UnknownType(u32),
    #[error("item at offset {0:#x} runs past the end of the container")]
    OutOfBounds(usize),
    #[error("alignment {0} is not a power of two")]
    BadAlignment(usize),
}

/// Parsed container view over an in-memory blob.
pub struct ContainerView<'a> {
    body: &'a [u8],
    alignment: usize,
}

/// Borrowed item inside a [`ContainerView`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ItemRef<'a> {
    pub item_type: ItemType,
    pub extra: u32,
    pub payload: &'a [u8],
}

impl ItemRef<'_> {
    #[must_use]
    pub fn to_item(&self) -> BootItem {
        BootItem {
            item_type: self.item_type,
            extra: self.extra,
            payload: self.payload.to_vec(),
        }
    }
}

/// Iterator over items; yields a `Result` per item and stops after the first error.
pub struct Items<'a> {
    view: &'a ContainerView<'a>,
    offset: usize,
    failed: bool,
}

impl<'a> ContainerView<'a> {
    /// Parse and validate a container padded to [`ITEM_ALIGNMENT`].
    ///
    /// # Errors
    /// See [`ParseError`].
    pub fn parse(blob: &'a [u8]) -> Result<Self, ParseError> {
        Self::parse_with_alignment(blob, ITEM_ALIGNMENT)
    }

    /// Parse and validate a container padded to `alignment`.
    ///
    /// # Errors
    /// See [`ParseError`]; `alignment` must be a power of two.
    pub fn parse_with_alignment(blob: &'a [u8], alignment: usize) -> Result<Self, ParseError> {
        if !alignment.is_power_of_two() {
            return Err(ParseError::BadAlignment(alignment));
        }

        let hdr = ItemHeader::from_bytes(blob).ok_or(ParseError::TooShort)?;
        if hdr.item_type != CONTAINER_TYPE || hdr.extra != CONTAINER_MAGIC || hdr.magic != ITEM_MAGIC
        {
            return Err(ParseError::BadContainer);
        }

        let end = ITEM_HEADER_SIZE
            .checked_add(hdr.length as usize)
            .ok_or(ParseError::OutOfBounds(0))?;
        let body = blob
            .get(ITEM_HEADER_SIZE..end)
            .ok_or(ParseError::OutOfBounds(0))?;

        Ok(Self { body, alignment })
    }

    #[must_use]
    pub fn items(&self) -> Items<'_> {
        Items {
            view: self,
            offset: 0,
            failed: false,
        }
    }

    /// First item of the given type, if any.
    #[must_use]
    pub fn find(&self, item_type: ItemType) -> Option<ItemRef<'_>> {
        self.items()
            .flatten()
            .find(|item| item.item_type == item_type)
    }

    fn item_at(&self, offset: usize) -> Result<(ItemRef<'a>, usize), ParseError> {
        // Offsets are relative to the container body; report them relative to the blob.
        let at = offset + ITEM_HEADER_SIZE;
        let hdr = self
            .body
            .get(offset..)
            .and_then(ItemHeader::from_bytes)
            .ok_or(ParseError::OutOfBounds(at))?;
        if hdr.magic != ITEM_MAGIC {
            return Err(ParseError::BadItemMagic(at));
        }
        let item_type = ItemType::from_code(hdr.item_type)
            .ok_or(ParseError::UnknownType(hdr.item_type))?;

        let start = offset + ITEM_HEADER_SIZE;
        let end = start
            .checked_add(hdr.length as usize)
            .ok_or(ParseError::OutOfBounds(at))?;
        let payload = self
            .body
            .get(start..end)
            .ok_or(ParseError::OutOfBounds(at))?;
        let next = align_up(end, self.alignment).min(self.body.len());

        Ok((
            ItemRef {
                item_type,
                extra: hdr.extra,
                payload,
            },
            next,
        ))
    }
}

impl<'a> Iterator for Items<'a> {
    type Item = Result<ItemRef<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.view.body.len() {
            return None;
        }
        match self.view.item_at(self.offset) {
            Ok((item, next)) => {
                self.offset = next;
                Some(Ok(item))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl core::iter::FusedIterator for Items<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BootContainer;
    use crate::abi::DriverKind;

    #[test]
    fn rejects_garbage() {
        assert_eq!(ContainerView::parse(&[0; 8]).err(), Some(ParseError::TooShort));
        assert_eq!(ContainerView::parse(&[0; 64]).err(), Some(ParseError::BadContainer));
    }

    #[test]
    fn rejects_unusable_alignment() {
        let mut c = BootContainer::new();
        c.append(ItemType::Cmdline, 0, b"hello\0").unwrap();
        let bytes = c.finalize().unwrap();

        for alignment in [0, 3, 12] {
            assert_eq!(
                ContainerView::parse_with_alignment(&bytes, alignment).err(),
                Some(ParseError::BadAlignment(alignment))
            );
        }
        assert!(ContainerView::parse_with_alignment(&bytes, 8).is_ok());
    }

    #[test]
    fn rejects_truncated_body() {
        let mut c = BootContainer::new();
        c.append(ItemType::Cmdline, 0, b"hello\0").unwrap();
        let bytes = c.finalize().unwrap();
        assert_eq!(
            ContainerView::parse(&bytes[..bytes.len() - 1]).err(),
            Some(ParseError::OutOfBounds(0))
        );
    }

    #[test]
    fn find_by_type() {
        let mut c = BootContainer::new();
        c.append(ItemType::Cmdline, 0, b"a\0").unwrap();
        c.append(ItemType::KernelDriver, DriverKind::ArmGicV2.code(), &[9; 5])
            .unwrap();
        let bytes = c.finalize().unwrap();

        let view = ContainerView::parse(&bytes).unwrap();
        let drv = view.find(ItemType::KernelDriver).unwrap();
        assert_eq!(drv.extra, DriverKind::ArmGicV2.code());
        assert_eq!(drv.payload, &[9; 5]);
        assert!(view.find(ItemType::MacAddress).is_none());
    }

    #[test]
    fn bad_item_magic_stops_iteration() {
        let mut c = BootContainer::new();
        c.append(ItemType::Cmdline, 0, b"a\0").unwrap();
        c.append(ItemType::Cmdline, 0, b"b\0").unwrap();
        let mut bytes = c.finalize().unwrap();
        // corrupt the magic of the first item
        bytes[32 + 24] ^= 0xFF;

        let view = ContainerView::parse(&bytes).unwrap();
        let mut items = view.items();
        assert_eq!(items.next(), Some(Err(ParseError::BadItemMagic(32))));
        assert_eq!(items.next(), None);
    }
}
