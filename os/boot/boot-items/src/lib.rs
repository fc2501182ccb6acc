//! # Boot Item Container
//!
//! This crate defines the typed, length-tagged record stream a bootloader hands
//! to the next-stage kernel, together with a builder that assembles it and a
//! parser that reads it back.
//!
//! ## Overview
//!
//! The kernel must initialize CPUs, memory and early drivers without carrying
//! board-specific code. The bootloader therefore describes the board as a flat
//! sequence of records. Each record is fully described by its **type**, an
//! **extra** word (the driver kind for kernel driver records) and a
//! **payload**; the consumer walks the stream by type and never depends on a
//! struct at a fixed offset.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────┐ offset 0
//! │ container header (32 bytes)  │ type = BOOT, extra = CONTAINER_MAGIC,
//! │                              │ length = bytes that follow
//! ├──────────────────────────────┤
//! │ item header (32 bytes)       │ type, length, extra, flags, magic, crc32
//! │ payload (length bytes)       │
//! │ zero padding to alignment    │
//! ├──────────────────────────────┤
//! │ item header ...              │
//! └──────────────────────────────┘
//! ```
//!
//! All header fields are little-endian `u32`. See [`abi`] for the constants.
//!
//! ## Usage
//!
//! ```rust
//! use boot_items::{BootContainer, ItemType};
//!
//! let mut container = BootContainer::new();
//! container.append(ItemType::Cmdline, 0, b"bootloader.version=1\0")?;
//! let bytes = container.finalize()?;
//! assert_eq!(bytes.len(), 32 + 32 + 24);
//! # Ok::<(), boot_items::ContainerError>(())
//! ```
//!
//! The container is write-once: there is no way to remove or modify an item
//! after it was appended, and [`BootContainer::finalize`] consumes the builder.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod abi;
mod container;

#[cfg(feature = "parse")]
pub mod parse;

pub use abi::{DriverKind, ITEM_ALIGNMENT, ITEM_HEADER_SIZE, ItemFlags, ItemHeader, ItemType};
pub use container::{BootContainer, BootItem, ContainerError};

#[cfg(feature = "parse")]
pub use parse::{ContainerView, ItemRef, ParseError};
