//! # Partition Map Resolution
//!
//! Translates the physical partitions a board's bootloader knows about into
//! the logical partition map the kernel expects (bootloader, slot A, slot B,
//! recovery, system config, factory config, volume manager).
//!
//! A board describes the translation as a [`PartitionLayout`]: an ordered list
//! of logical [`PartitionRole`]s, each backed by one physical partition or by a
//! span of two. [`PartitionResolver`] looks every required physical partition
//! up on a [`BlockDevice`] and produces a [`PartitionMap`], all or nothing.
//!
//! ## Spanning roles
//!
//! A [`RoleSource::Span`] role takes its first block from one physical
//! partition and its last block from a later one. The resolver **assumes**
//! that the two partitions are adjacent on disk and that nothing else lives in
//! between; by default it does not verify this. Enable
//! [`PartitionResolver::with_span_check`] to reject layouts where the
//! assumption does not hold.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod device;
pub mod guids;
mod map;
mod resolver;

pub use device::{BlockDevice, DeviceKind, PartitionInfo};
pub use map::{PartitionEntry, PartitionMap, PartitionName};
pub use resolver::{PartitionError, PartitionLayout, PartitionResolver, PartitionRole, RoleSource};
