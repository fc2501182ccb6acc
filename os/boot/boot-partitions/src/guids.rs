//! Partition type GUIDs of the logical roles.

use uuid::{Uuid, uuid};

pub const BOOTLOADER: Uuid = uuid!("5ECE94FE-4C86-11E8-A15B-480FCF35F8E6");
pub const SLOT_A: Uuid = uuid!("DE30CC86-1F4A-4A31-93C4-66F147D33E05");
pub const SLOT_B: Uuid = uuid!("23CC04DF-C278-4CE7-8471-897D1A4BCDF7");
pub const SLOT_R: Uuid = uuid!("A0E5CF57-2DEF-46BE-A80C-A2067C37CD49");
pub const SYS_CONFIG: Uuid = uuid!("4E5E989E-4C86-11E8-A15B-480FCF35F8E6");
pub const FACTORY_CONFIG: Uuid = uuid!("5A3A90BE-4C86-11E8-A15B-480FCF35F8E6");
pub const FVM: Uuid = uuid!("41D0E340-57E3-954E-8C1E-17ECAC44CFF5");
