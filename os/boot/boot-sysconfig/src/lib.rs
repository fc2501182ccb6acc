//! # Boot Slot Selection from Persisted Configuration
//!
//! The sysconfig partition holds small key-value stores at fixed offsets. Two
//! of them decide which OS image boots:
//!
//! * **boot-oneshot**: a single-use override ("boot recovery next time"),
//!   erased as soon as it has been consumed.
//! * **boot-default**: the durable, administrator-set preference.
//!
//! Both stores carry the slot under the key `boot` with the value `a`, `b`
//! or `r`. [`BootSlotResolver`] reads the one-shot store first and falls back
//! to the default store only if the one-shot store does not parse. The chosen
//! slot's partition name is published through a [`BootTargetSink`].
//!
//! ```text
//!            ┌────────────┐ read error ┌────────┐
//!            │ TryOneshot ├───────────►│ Failed │◄──────────┐
//!            └─────┬──┬───┘            └────────┘           │
//!        parsed    │  │ corrupt             ▲ read error,   │
//!                  │  ▼                     │ corrupt       │ unset / invalid
//!                  │ ┌────────────┐         │               │
//!                  │ │ TryDefault ├─────────┘               │
//!                  │ └─────┬──────┘                         │
//!                  ▼       ▼ parsed                         │
//!            ┌───────────────────┐──────────────────────────┘
//!            │      Selected     │
//!            └─────────┬─────────┘
//!                      ▼ publish, erase one-shot if it was used
//!                ┌──────────┐
//!                │ Resolved │
//!                └──────────┘
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod crc32;
pub mod kvstore;
mod resolver;
mod storage;

pub use kvstore::{Corruption, KvError, KvRecord, encode_kvstore};
pub use resolver::{
    BOOT_KEY, BOOT_TARGET_KEY, BootConfigError, BootSlot, BootSlotResolver, BootTargetSink,
    Resolution, SlotPartitions,
};
pub use storage::{Storage, StorageError, SysconfigLayout};
