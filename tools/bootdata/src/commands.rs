use crate::error::ToolError;
use crate::files::{FileStorage, PartitionTable};
use boot_board::{OptionalItem, append_board_items, boards};
use boot_items::{BootContainer, ContainerView, DriverKind, ItemType};
use boot_partitions::BlockDevice;
use boot_sysconfig::{
    BOOT_KEY, BootSlotResolver, BootTargetSink, SlotPartitions, SysconfigLayout, encode_kvstore,
};
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Partition name the sysconfig image stands in for.
const SYSCONFIG_PARTITION: &str = "sys-config";

const PACK_USAGE: &str = "bootdata pack <board> <out> [partition-table] [key=value ...]";
const DUMP_USAGE: &str = "bootdata dump <container>";
const SYSCONFIG_USAGE: &str = "bootdata sysconfig <out> <default-slot> [oneshot-slot]";
const BOOTCONFIG_USAGE: &str = "bootdata bootconfig <sysconfig-image> <slot-a> <slot-b> <slot-r>";

pub fn pack(args: &[String]) -> Result<(), ToolError> {
    let [board, out, rest @ ..] = args else {
        return Err(ToolError::Usage(PACK_USAGE));
    };
    let board = boards::by_name(board).ok_or_else(|| ToolError::UnknownBoard(board.clone()))?;

    let mut table = None;
    let mut hints = Vec::new();
    for arg in rest {
        if let Some((key, value)) = arg.split_once('=') {
            hints.push((key, value));
        } else if table.is_none() {
            table = Some(PartitionTable::parse(&fs::read_to_string(arg)?)?);
        } else {
            return Err(ToolError::Usage(PACK_USAGE));
        }
    }

    let env = hints.as_slice();
    let device = table.as_ref().map(|t| t as &dyn BlockDevice);
    let mut container = BootContainer::new();
    let report = append_board_items(board, &env, device, &mut container)?;

    if let OptionalItem::Skipped(e) = report.partition_map {
        warn!("{}: no partition map ({e})", board.name());
    }
    if let OptionalItem::Skipped(e) = report.mac_address {
        warn!("{}: no MAC address ({e})", board.name());
    }

    let count = container.len();
    let bytes = container.finalize()?;
    fs::write(out, &bytes)?;
    info!("packed {count} items ({} bytes) for {} into {out}", bytes.len(), board.name());
    Ok(())
}

pub fn dump(args: &[String]) -> Result<(), ToolError> {
    let [path] = args else {
        return Err(ToolError::Usage(DUMP_USAGE));
    };
    let bytes = fs::read(path)?;
    let view = ContainerView::parse(&bytes)?;

    for (index, item) in view.items().enumerate() {
        let item = item?;
        let extra = match item.item_type {
            ItemType::KernelDriver => DriverKind::from_code(item.extra)
                .map_or_else(|| format!("{:#010x}", item.extra), |k| format!("{k:?}")),
            _ => format!("{:#x}", item.extra),
        };
        let ty = format!("{:?}", item.item_type);
        println!("{index:3}  {ty:<14} {extra:<16} {:5} bytes", item.payload.len());
        if item.item_type == ItemType::Cmdline {
            let text = item.payload.split(|&b| b == 0).next().unwrap_or_default();
            println!("     {}", String::from_utf8_lossy(text));
        }
    }
    Ok(())
}

pub fn sysconfig(args: &[String]) -> Result<(), ToolError> {
    let (out, default, oneshot) = match args {
        [out, default] => (out, default, None),
        [out, default, oneshot] => (out, default, Some(oneshot)),
        _ => return Err(ToolError::Usage(SYSCONFIG_USAGE)),
    };

    let layout = SysconfigLayout::default();
    let size = layout.kvstore_size;
    // the standard layout spans a few hundred KiB
    #[allow(clippy::cast_possible_truncation)]
    let index = |offset: u64| offset as usize;
    let end = index(layout.boot_default_offset.max(layout.boot_oneshot_offset)) + size;
    let mut image = vec![0u8; end];

    let mut place = |offset: u64, value: &str| -> Result<(), ToolError> {
        let region = encode_kvstore(&[(BOOT_KEY, value)], size)?;
        let offset = index(offset);
        image[offset..offset + size].copy_from_slice(&region);
        Ok(())
    };
    place(layout.boot_default_offset, default)?;
    if let Some(oneshot) = oneshot {
        place(layout.boot_oneshot_offset, oneshot)?;
    }

    fs::write(out, &image)?;
    info!("wrote sysconfig image {out} ({} bytes)", image.len());
    Ok(())
}

/// Prints published values as `key=value`.
struct StdoutSink;

impl BootTargetSink for StdoutSink {
    fn set(&mut self, key: &str, value: &str) {
        println!("{key}={value}");
    }
}

pub fn bootconfig(args: &[String]) -> Result<(), ToolError> {
    let [image, a, b, r] = args else {
        return Err(ToolError::Usage(BOOTCONFIG_USAGE));
    };

    let mut storage = FileStorage::open(SYSCONFIG_PARTITION, Path::new(image))?;
    let slots = SlotPartitions { a, b, r };
    let resolution =
        BootSlotResolver::new(SYSCONFIG_PARTITION, slots).resolve(&mut storage, &mut StdoutSink)?;

    if let Some(e) = resolution.erase_error {
        warn!("one-shot override was used but not erased: {e}");
    }
    info!(
        "selected slot {:?}{}",
        resolution.slot,
        if resolution.came_from_oneshot {
            " (one-shot)"
        } else {
            ""
        }
    );
    Ok(())
}
