use crate::device::{BlockDevice, DeviceKind, PartitionInfo};
use crate::map::{PartitionEntry, PartitionMap, PartitionName};
use alloc::vec::Vec;
use log::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PartitionError {
    #[error("no usable block device for the partition map")]
    DeviceUnavailable,
    #[error("could not find physical partition `{0}`")]
    PartitionNotFound(&'static str),
    #[error("partition role `{0}` resolves to an empty or out-of-device block range")]
    InvalidRange(&'static str),
    #[error("partition role `{0}` spans physical partitions that are not adjacent")]
    SpanNotContiguous(&'static str),
    #[error("partition role name `{0}` does not fit the name field")]
    NameTooLong(&'static str),
}

/// Physical partition(s) backing a logical role.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RoleSource {
    Single(&'static str),
    /// First block of `first` through last block of `last`.
    ///
    /// Precondition: `last` immediately follows `first` on disk.
    Span {
        first: &'static str,
        last: &'static str,
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PartitionRole {
    pub name: &'static str,
    pub type_guid: Uuid,
    pub source: RoleSource,
}

impl PartitionRole {
    #[must_use]
    pub const fn single(name: &'static str, type_guid: Uuid, physical: &'static str) -> Self {
        Self {
            name,
            type_guid,
            source: RoleSource::Single(physical),
        }
    }

    #[must_use]
    pub const fn span(
        name: &'static str,
        type_guid: Uuid,
        first: &'static str,
        last: &'static str,
    ) -> Self {
        Self {
            name,
            type_guid,
            source: RoleSource::Span { first, last },
        }
    }
}

/// Board-fixed, ordered set of logical roles.
#[derive(Debug, Copy, Clone)]
pub struct PartitionLayout {
    pub roles: &'static [PartitionRole],
}

impl PartitionLayout {
    #[must_use]
    pub const fn new(roles: &'static [PartitionRole]) -> Self {
        Self { roles }
    }

    /// Physical partition names in lookup order.
    pub fn physical_names(&self) -> impl Iterator<Item = &'static str> {
        self.roles.iter().flat_map(|role| {
            let (first, second) = match role.source {
                RoleSource::Single(name) => (name, None),
                RoleSource::Span { first, last } => (first, Some(last)),
            };
            core::iter::once(first).chain(second)
        })
    }
}

pub struct PartitionResolver {
    layout: PartitionLayout,
    check_spans: bool,
}

impl PartitionResolver {
    #[must_use]
    pub const fn new(layout: PartitionLayout) -> Self {
        Self {
            layout,
            check_spans: false,
        }
    }

    /// Reject spanning roles whose physical partitions are not back to back.
    #[must_use]
    pub const fn with_span_check(mut self, enabled: bool) -> Self {
        self.check_spans = enabled;
        self
    }

    /// Resolve the layout against `device`.
    ///
    /// Every physical partition is looked up before any entry is built; a
    /// single missing name fails the whole map. `block_count` and
    /// `block_size` come from the last physical partition looked up.
    ///
    /// # Errors
    /// See [`PartitionError`].
    pub fn resolve<D: BlockDevice + ?Sized>(
        &self,
        device: Option<&D>,
    ) -> Result<PartitionMap, PartitionError> {
        let Some(device) = device.filter(|d| d.kind() != DeviceKind::Unknown) else {
            warn!("could not find block device for partition map");
            return Err(PartitionError::DeviceUnavailable);
        };

        let mut found: Vec<(&'static str, PartitionInfo)> = Vec::new();
        for name in self.layout.physical_names() {
            let Some(info) = device.find_partition_by_name(name) else {
                warn!("could not find {name} partition");
                return Err(PartitionError::PartitionNotFound(name));
            };
            debug!(
                "physical partition {name}: start={} size={} block_size={}",
                info.start, info.size, info.block_size
            );
            found.push((name, info));
        }

        let lookup = |name: &'static str| {
            found
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, info)| *info)
                .ok_or(PartitionError::PartitionNotFound(name))
        };

        let Some((_, tail)) = found.last().copied() else {
            return Err(PartitionError::DeviceUnavailable);
        };
        let block_count = tail
            .start
            .checked_add(tail.size)
            .ok_or(PartitionError::InvalidRange("map"))?;

        let mut entries = Vec::with_capacity(self.layout.roles.len());
        for role in self.layout.roles {
            let (first, last) = match role.source {
                RoleSource::Single(name) => {
                    let info = lookup(name)?;
                    (info, info)
                }
                RoleSource::Span { first, last } => {
                    let (first, last) = (lookup(first)?, lookup(last)?);
                    if self.check_spans && first.start.checked_add(first.size) != Some(last.start)
                    {
                        return Err(PartitionError::SpanNotContiguous(role.name));
                    }
                    (first, last)
                }
            };

            let first_block = first.start;
            let last_block = last
                .start
                .checked_add(last.size)
                .and_then(|end| end.checked_sub(1))
                .ok_or(PartitionError::InvalidRange(role.name))?;
            if first_block > last_block || last_block >= block_count {
                return Err(PartitionError::InvalidRange(role.name));
            }

            let mut name = PartitionName::new();
            name.push_str(role.name)
                .map_err(|_| PartitionError::NameTooLong(role.name))?;

            entries.push(PartitionEntry {
                type_guid: role.type_guid,
                instance_guid: Uuid::nil(),
                first_block,
                last_block,
                flags: 0,
                name,
            });
        }

        Ok(PartitionMap {
            block_count,
            block_size: tail.block_size,
            guid: Uuid::nil(),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guids;

    struct Disk(&'static [(&'static str, u64, u64)]);

    impl BlockDevice for Disk {
        fn kind(&self) -> DeviceKind {
            DeviceKind::Mmc
        }

        fn find_partition_by_name(&self, name: &str) -> Option<PartitionInfo> {
            self.0
                .iter()
                .find(|(n, ..)| *n == name)
                .map(|&(_, start, size)| PartitionInfo {
                    start,
                    size,
                    block_size: 512,
                })
        }
    }

    static ROLES: [PartitionRole; 2] = [
        PartitionRole::single("zircon-a", guids::SLOT_A, "boot"),
        PartitionRole::span("fvm", guids::FVM, "system", "data"),
    ];

    #[test]
    fn lookup_order_expands_spans() {
        let layout = PartitionLayout::new(&ROLES);
        let names: Vec<_> = layout.physical_names().collect();
        assert_eq!(names, ["boot", "system", "data"]);
    }

    #[test]
    fn zero_sized_partition_is_rejected() {
        let disk = Disk(&[("boot", 10, 0), ("system", 100, 50), ("data", 150, 200)]);
        let resolver = PartitionResolver::new(PartitionLayout::new(&ROLES));
        assert_eq!(
            resolver.resolve(Some(&disk)),
            Err(PartitionError::InvalidRange("zircon-a"))
        );
    }

    #[test]
    fn span_check_rejects_gap() {
        let disk = Disk(&[("boot", 10, 10), ("system", 100, 40), ("data", 150, 200)]);
        let layout = PartitionLayout::new(&ROLES);

        assert!(PartitionResolver::new(layout).resolve(Some(&disk)).is_ok());
        assert_eq!(
            PartitionResolver::new(layout)
                .with_span_check(true)
                .resolve(Some(&disk)),
            Err(PartitionError::SpanNotContiguous("fvm"))
        );
    }

    #[test]
    fn long_role_name_is_rejected() {
        static LONG: [PartitionRole; 1] = [PartitionRole::single(
            "a-partition-name-that-is-way-too-long",
            guids::SLOT_A,
            "boot",
        )];
        let disk = Disk(&[("boot", 10, 10)]);
        assert!(matches!(
            PartitionResolver::new(PartitionLayout::new(&LONG)).resolve(Some(&disk)),
            Err(PartitionError::NameTooLong(_))
        ));
    }
}
