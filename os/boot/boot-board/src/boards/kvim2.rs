//! Khadas VIM2 (Amlogic S912).

use crate::board::{BoardDescriptor, BootEnv};
use crate::dcfg::{
    DriverBlob, GenericTimerDriver, GicV2Driver, HdcpDriver, PsciDriver, SimpleDriver,
};
use crate::descriptor::{CpuConfig, DriverConfig, MemRangeKind, MemoryRange, PlatformIdentity};
use crate::{BOOTLOADER_VERSION, BoardError};
use alloc::vec::Vec;
use boot_items::DriverKind;
use boot_partitions::{PartitionLayout, PartitionRole, guids};
use log::info;

const VID_KHADAS: u32 = 4;
const PID_VIM2: u32 = 2;

/// Environment key carrying the detected DRAM size in GiB.
pub const DDR_SIZE_KEY: &str = "ddr_size";

const RAM_3GIB: u64 = 0xc000_0000;

const MEMORY: [MemoryRange; 7] = [
    MemoryRange::ram(0, 0x8000_0000),
    MemoryRange::peripheral(0xc000_0000, 0x2000_0000),
    MemoryRange::reserved(0, 0x0100_0000),
    MemoryRange::reserved(0x1000_0000, 0x0020_0000),
    MemoryRange::reserved(0x0510_0000, 0x0200_0000),
    MemoryRange::reserved(0x0730_0000, 0x0010_0000),
    MemoryRange::reserved(0x7500_0000, 0x0900_0000),
];

const UART: SimpleDriver = SimpleDriver {
    mmio_phys: 0xc810_04c0,
    irq: 225,
};

const GIC: GicV2Driver = GicV2Driver {
    mmio_phys: 0xc430_0000,
    msi_frame_phys: 0,
    gicd_offset: 0x1000,
    gicc_offset: 0x2000,
    gich_offset: 0x4000,
    gicv_offset: 0x6000,
    ipi_base: 5,
    optional: false,
    use_msi: false,
};

const PSCI: PsciDriver = PsciDriver {
    use_hvc: false,
    shutdown_args: [0; 3],
    reboot_args: [1, 0, 0],
    reboot_bootloader_args: [4, 0, 0],
    reboot_recovery_args: [2, 0, 0],
};

const TIMER: GenericTimerDriver = GenericTimerDriver {
    irq_phys: 30,
    irq_virt: 0,
    irq_sphys: 0,
    freq_override: 0,
};

const HDCP: HdcpDriver = HdcpDriver {
    preset_phys: 0xc110_4000,
    hiu_phys: 0xc883_c000,
    hdmitx_phys: 0xc883_a000,
};

/// The volume manager spans `system` through `data`; the two are adjacent on
/// the `eMMC` layout this board ships with.
static ROLES: [PartitionRole; 7] = [
    PartitionRole::single("bootloader", guids::BOOTLOADER, "bootloader"),
    PartitionRole::single("zircon-a", guids::SLOT_A, "boot"),
    PartitionRole::single("zircon-b", guids::SLOT_B, "misc"),
    PartitionRole::single("zircon-r", guids::SLOT_R, "recovery"),
    PartitionRole::single("sys-config", guids::SYS_CONFIG, "tee"),
    PartitionRole::single("factory", guids::FACTORY_CONFIG, "crypt"),
    PartitionRole::span("fvm", guids::FVM, "system", "data"),
];

#[derive(Debug, Copy, Clone, Default)]
pub struct Kvim2;

impl BoardDescriptor for Kvim2 {
    fn name(&self) -> &'static str {
        "kvim2"
    }

    fn cpu_config(&self) -> Result<CpuConfig, BoardError> {
        CpuConfig::new(&[4, 4])
    }

    fn memory_ranges(&self) -> Vec<MemoryRange> {
        MEMORY.to_vec()
    }

    /// Boards fitted with 3 GiB report `ddr_size=3`; the default map has 2 GiB.
    fn patch_memory(&self, ranges: &mut [MemoryRange], env: &dyn BootEnv) {
        if env.get(DDR_SIZE_KEY) != Some("3") {
            return;
        }
        if let Some(ram) = ranges.iter_mut().find(|r| r.kind == MemRangeKind::Ram) {
            info!("ddr_size=3, extending RAM at {:#x} to 3 GiB", ram.paddr);
            ram.length = RAM_3GIB;
        }
    }

    /// HDCP is listed twice; the kernel coalesces the repeat.
    fn drivers(&self) -> Vec<DriverConfig> {
        alloc::vec![
            UART.to_config(DriverKind::AmlogicUart),
            GIC.to_config(DriverKind::ArmGicV2),
            PSCI.to_config(DriverKind::ArmPsci),
            TIMER.to_config(DriverKind::ArmGenericTimer),
            HDCP.to_config(DriverKind::AmlogicHdcp),
            HDCP.to_config(DriverKind::AmlogicHdcp),
        ]
    }

    fn cmdline(&self) -> &'static str {
        BOOTLOADER_VERSION
    }

    fn platform_id(&self) -> Result<PlatformIdentity, BoardError> {
        PlatformIdentity::new(VID_KHADAS, PID_VIM2, "vim2")
    }

    fn partition_layout(&self) -> Option<PartitionLayout> {
        Some(PartitionLayout::new(&ROLES))
    }

    fn mac_env_key(&self) -> Option<&'static str> {
        Some("eth_mac")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddr_patch_only_for_three_gib() {
        let mut ranges = Kvim2.memory_ranges();
        Kvim2.patch_memory(&mut ranges, &());
        assert_eq!(ranges[0].length, 0x8000_0000);

        let env: &[(&str, &str)] = &[(DDR_SIZE_KEY, "2")];
        Kvim2.patch_memory(&mut ranges, &env);
        assert_eq!(ranges[0].length, 0x8000_0000);

        let env: &[(&str, &str)] = &[(DDR_SIZE_KEY, "3")];
        Kvim2.patch_memory(&mut ranges, &env);
        assert_eq!(ranges[0].length, RAM_3GIB);
        assert_eq!(ranges[1..], MEMORY[1..]);
    }

    #[test]
    fn layout_reads_every_physical_partition_once() {
        let layout = Kvim2.partition_layout().unwrap();
        let names: Vec<_> = layout.physical_names().collect();
        assert_eq!(
            names,
            [
                "bootloader",
                "boot",
                "misc",
                "recovery",
                "tee",
                "crypt",
                "system",
                "data"
            ]
        );
    }
}
