//! NXP i.MX8MQ evaluation kit.

use crate::board::BoardDescriptor;
use crate::dcfg::{DriverBlob, GenericTimerDriver, GicV3Driver, PsciDriver, SimpleDriver};
use crate::descriptor::{CpuConfig, DriverConfig, MemoryRange, PlatformIdentity};
use crate::{BOOTLOADER_VERSION, BoardError};
use alloc::vec::Vec;
use boot_items::DriverKind;

const VID_NXP: u32 = 9;
const PID_IMX8MEVK: u32 = 1;

const MEMORY: [MemoryRange; 2] = [
    MemoryRange::ram(0x4000_0000, 0xc000_0000),
    MemoryRange::peripheral(0, 0x4000_0000),
];

const UART: SimpleDriver = SimpleDriver {
    mmio_phys: 0x3086_0000,
    irq: 58,
};

const GIC: GicV3Driver = GicV3Driver {
    mmio_phys: 0x3880_0000,
    gicd_offset: 0,
    gicr_offset: 0x8_0000,
    gicr_stride: 0x2_0000,
    mx8_gpr_phys: 0x3034_0000,
    ipi_base: 9,
    optional: false,
};

const PSCI: PsciDriver = PsciDriver {
    use_hvc: false,
    shutdown_args: [0; 3],
    reboot_args: [0; 3],
    reboot_bootloader_args: [0; 3],
    reboot_recovery_args: [0; 3],
};

const TIMER: GenericTimerDriver = GenericTimerDriver {
    irq_phys: 30,
    irq_virt: 27,
    irq_sphys: 0,
    freq_override: 8_333_333,
};

#[derive(Debug, Copy, Clone, Default)]
pub struct Imx8mqEvk;

impl BoardDescriptor for Imx8mqEvk {
    fn name(&self) -> &'static str {
        "imx8mq-evk"
    }

    fn cpu_config(&self) -> Result<CpuConfig, BoardError> {
        CpuConfig::new(&[4])
    }

    fn memory_ranges(&self) -> Vec<MemoryRange> {
        MEMORY.to_vec()
    }

    fn drivers(&self) -> Vec<DriverConfig> {
        alloc::vec![
            UART.to_config(DriverKind::NxpImxUart),
            GIC.to_config(DriverKind::ArmGicV3),
            PSCI.to_config(DriverKind::ArmPsci),
            TIMER.to_config(DriverKind::ArmGenericTimer),
        ]
    }

    fn cmdline(&self) -> &'static str {
        BOOTLOADER_VERSION
    }

    fn platform_id(&self) -> Result<PlatformIdentity, BoardError> {
        PlatformIdentity::new(VID_NXP, PID_IMX8MEVK, "imx8mevk")
    }
}
