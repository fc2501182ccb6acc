use boot_board::boards::{Imx8mqEvk, Kvim2};
use boot_board::{
    BOOTLOADER_VERSION, BoardDescriptor, BootEnv, MacError, OptionalItem, append_board_items,
    assemble,
};
use boot_items::abi::{ITEM_HEADER_SIZE, MEM_RANGE_SIZE, PARTITION_ENTRY_SIZE};
use boot_items::{BootContainer, ContainerView, DriverKind, ItemType};
use boot_partitions::{BlockDevice, DeviceKind, PartitionError, PartitionInfo};

struct Emmc(Vec<(&'static str, u64, u64)>);

impl Emmc {
    fn kvim2() -> Self {
        Self(vec![
            ("bootloader", 0, 8),
            ("boot", 8, 32),
            ("misc", 40, 32),
            ("recovery", 72, 32),
            ("tee", 104, 4),
            ("crypt", 108, 4),
            ("system", 112, 500),
            ("data", 612, 1000),
        ])
    }
}

impl BlockDevice for Emmc {
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

fn item_types(bytes: &[u8]) -> Vec<ItemType> {
    ContainerView::parse(bytes)
        .unwrap()
        .items()
        .map(|item| item.unwrap().item_type)
        .collect()
}

#[test]
fn board_items_in_order() {
    let mut container = BootContainer::new();
    let appended = assemble(&Imx8mqEvk, &(), &mut container).unwrap();
    assert_eq!(appended, 2 + 4 + 2);

    let bytes = container.finalize().unwrap();
    assert_eq!(
        item_types(&bytes),
        [
            ItemType::CpuConfig,
            ItemType::MemConfig,
            ItemType::KernelDriver,
            ItemType::KernelDriver,
            ItemType::KernelDriver,
            ItemType::KernelDriver,
            ItemType::Cmdline,
            ItemType::PlatformId,
        ]
    );

    let view = ContainerView::parse(&bytes).unwrap();
    let kinds: Vec<_> = view
        .items()
        .map(Result::unwrap)
        .filter(|item| item.item_type == ItemType::KernelDriver)
        .map(|item| DriverKind::from_code(item.extra).unwrap())
        .collect();
    assert_eq!(
        kinds,
        [
            DriverKind::NxpImxUart,
            DriverKind::ArmGicV3,
            DriverKind::ArmPsci,
            DriverKind::ArmGenericTimer
        ]
    );

    let cmdline = view.find(ItemType::Cmdline).unwrap();
    assert_eq!(cmdline.payload.last(), Some(&0));
    assert_eq!(&cmdline.payload[..BOOTLOADER_VERSION.len()], BOOTLOADER_VERSION.as_bytes());
}

#[test]
fn assembly_round_trips() {
    let env: &[(&str, &str)] = &[("ddr_size", "3")];
    let mut container = BootContainer::new();
    assemble(&Kvim2, &env, &mut container).unwrap();
    let expected = container.items().to_vec();
    let total = container.serialized_len();

    let bytes = container.finalize().unwrap();
    assert_eq!(bytes.len(), total);

    let decoded: Vec<_> = ContainerView::parse(&bytes)
        .unwrap()
        .items()
        .map(|item| item.unwrap().to_item())
        .collect();
    assert_eq!(decoded, expected);
}

#[test]
fn ddr_size_patches_first_ram_range() {
    let mem_length = |env: &dyn BootEnv| {
        let mut container = BootContainer::new();
        assemble(&Kvim2, env, &mut container).unwrap();
        let mem = container
            .items()
            .iter()
            .find(|item| item.item_type == ItemType::MemConfig)
            .unwrap()
            .clone();
        assert_eq!(mem.payload.len(), 7 * MEM_RANGE_SIZE);
        u64::from_le_bytes(mem.payload[8..16].try_into().unwrap())
    };

    assert_eq!(mem_length(&()), 0x8000_0000);
    let three: &[(&str, &str)] = &[("ddr_size", "3")];
    assert_eq!(mem_length(&three), 0xc000_0000);
    let four: &[(&str, &str)] = &[("ddr_size", "4")];
    assert_eq!(mem_length(&four), 0x8000_0000);
}

#[test]
fn kvim2_full_preboot() {
    let env: &[(&str, &str)] = &[("eth_mac", "c8:63:14:70:0a:1B")];
    let device = Emmc::kvim2();
    let mut container = BootContainer::new();

    let report = append_board_items(&Kvim2, &env, Some(&device), &mut container).unwrap();

    assert_eq!(report.board_items, 2 + 6 + 2);
    assert_eq!(report.partition_map, OptionalItem::Appended);
    assert_eq!(report.mac_address, OptionalItem::Appended);

    let bytes = container.finalize().unwrap();
    let types = item_types(&bytes);
    assert_eq!(
        types[types.len() - 3..],
        [ItemType::PlatformId, ItemType::PartitionMap, ItemType::MacAddress]
    );

    let view = ContainerView::parse(&bytes).unwrap();
    let cmdline = view.find(ItemType::Cmdline).unwrap();
    assert_eq!(&cmdline.payload[..23], b"zircon-bootloader=0.05\0");

    let hdcp = view
        .items()
        .map(Result::unwrap)
        .filter(|item| {
            item.item_type == ItemType::KernelDriver
                && DriverKind::from_code(item.extra) == Some(DriverKind::AmlogicHdcp)
        })
        .count();
    assert_eq!(hdcp, 2);

    let mac = view.find(ItemType::MacAddress).unwrap();
    assert_eq!(mac.payload, [0xc8, 0x63, 0x14, 0x70, 0x0a, 0x1b]);

    let map = view.find(ItemType::PartitionMap).unwrap();
    assert_eq!(map.payload.len(), 40 + 7 * PARTITION_ENTRY_SIZE);
    // block_count = data.start + data.size
    assert_eq!(&map.payload[0..8], &1612u64.to_le_bytes());
    let fvm = &map.payload[40 + 6 * PARTITION_ENTRY_SIZE..];
    assert_eq!(&fvm[32..40], &112u64.to_le_bytes());
    assert_eq!(&fvm[40..48], &1611u64.to_le_bytes());
    assert_eq!(&fvm[56..59], b"fvm");

    let names: Vec<_> = (0..7)
        .map(|i| {
            let entry = &map.payload[40 + i * PARTITION_ENTRY_SIZE..][..PARTITION_ENTRY_SIZE];
            let name = &entry[56..88];
            let end = name.iter().position(|&b| b == 0).unwrap();
            assert!(name[end..].iter().all(|&b| b == 0));
            core::str::from_utf8(&name[..end]).unwrap().to_owned()
        })
        .collect();
    assert_eq!(
        names,
        ["bootloader", "zircon-a", "zircon-b", "zircon-r", "sys-config", "factory", "fvm"]
    );
}

#[test]
fn mac_with_trailing_text_is_appended() {
    let env: &[(&str, &str)] = &[("eth_mac", "c8:63:14:70:0a:1b\n")];
    let mut container = BootContainer::new();
    let report = append_board_items(&Kvim2, &env, None, &mut container).unwrap();
    assert_eq!(report.mac_address, OptionalItem::Appended);
}

#[test]
fn missing_device_degrades_without_partition_map() {
    let mut container = BootContainer::new();
    let report = append_board_items(&Kvim2, &(), None, &mut container).unwrap();

    assert_eq!(
        report.partition_map,
        OptionalItem::Skipped(PartitionError::DeviceUnavailable)
    );
    assert_eq!(report.mac_address, OptionalItem::Skipped(MacError::Unset));
    assert_eq!(container.len(), report.board_items);
}

#[test]
fn missing_partition_skips_only_the_map() {
    let mut device = Emmc::kvim2();
    device.0.retain(|(name, ..)| *name != "crypt");
    let env: &[(&str, &str)] = &[("eth_mac", "c8:63:14:70:0a")];
    let mut container = BootContainer::new();

    let report = append_board_items(&Kvim2, &env, Some(&device), &mut container).unwrap();

    assert_eq!(
        report.partition_map,
        OptionalItem::Skipped(PartitionError::PartitionNotFound("crypt"))
    );
    assert_eq!(report.mac_address, OptionalItem::Skipped(MacError::Malformed));
    assert!(container.items().iter().all(|item| item.item_type != ItemType::PartitionMap));
}

#[test]
fn board_without_layout_has_no_optional_items() {
    let device = Emmc::kvim2();
    let mut container = BootContainer::new();
    let report = append_board_items(&Imx8mqEvk, &(), Some(&device), &mut container).unwrap();

    assert_eq!(report.partition_map, OptionalItem::NotApplicable);
    assert_eq!(report.mac_address, OptionalItem::NotApplicable);
    assert!(!report.partition_map.is_appended());
}

#[test]
fn cpu_item_size_follows_cluster_count() {
    let cpu_len = |board: &dyn BoardDescriptor| {
        let mut container = BootContainer::new();
        assemble(board, &(), &mut container).unwrap();
        container.items()[0].payload.len()
    };
    assert_eq!(cpu_len(&Kvim2) - cpu_len(&Imx8mqEvk), 16);
    assert!(cpu_len(&Imx8mqEvk) + ITEM_HEADER_SIZE <= 64);
}
