//! # Board Descriptors
//!
//! Everything a supported board contributes to the boot item container: CPU
//! topology, memory map, kernel driver configuration, command line, platform
//! identity and, where the board has one, a partition map and MAC address.
//!
//! Each board implements [`BoardDescriptor`] over compile-time constant data.
//! Boards are selected with cargo features (`board-kvim2`,
//! `board-imx8mq-evk`) and looked up at runtime with [`boards::by_name`].
//!
//! ## Boot flow
//!
//! ```text
//! BootEnv hints ──► patch_memory ──┐
//!                                  ▼
//! BoardDescriptor ──────────► assemble ──► CPU, MEM, KDRV.., CMDL, PLID
//!                                  │
//! BlockDevice ──► PartitionResolver ──► mPRT   (skipped on failure)
//! BootEnv["eth_mac"] ─────────────────► mMAC   (skipped on failure)
//! ```
//!
//! [`append_board_items`] runs the whole flow. Only the mandatory items can
//! fail it; see [`PrebootReport`] for the optional ones.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod board;
pub mod boards;
pub mod dcfg;
mod descriptor;
mod preboot;

pub use board::{BoardDescriptor, BootEnv, assemble};
pub use descriptor::{
    BoardName, CpuConfig, DriverConfig, MacAddress, MemRangeKind, MemoryRange, PlatformIdentity,
    encode_memory_ranges,
};
pub use preboot::{MacError, OptionalItem, PrebootReport, append_board_items};

use boot_items::ContainerError;

/// Command line identifying the bootloader to the kernel.
pub const BOOTLOADER_VERSION: &str = "zircon-bootloader=0.05";

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BoardError {
    #[error("{0} CPU clusters exceed the supported maximum")]
    TooManyClusters(usize),
    #[error("board name of {0} bytes does not fit the platform id")]
    BoardNameTooLong(usize),
    #[error(transparent)]
    Container(#[from] ContainerError),
}
