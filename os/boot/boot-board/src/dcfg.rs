//! Kernel driver configuration blobs.
//!
//! The loader treats these as opaque; their layout is shared with the
//! kernel's early drivers only. Every blob is a run of little-endian fields
//! with natural alignment, padded to a multiple of eight bytes.

use crate::descriptor::DriverConfig;
use alloc::vec::Vec;
use boot_items::DriverKind;

/// A driver configuration record with a fixed encoded size.
pub trait DriverBlob {
    const SIZE: usize;

    fn encode(&self, out: &mut Vec<u8>);

    /// Encode into a [`DriverConfig`] for `kind`.
    #[must_use]
    fn to_config(&self, kind: DriverKind) -> DriverConfig {
        let mut blob = Vec::with_capacity(Self::SIZE);
        self.encode(&mut blob);
        debug_assert_eq!(blob.len(), Self::SIZE);
        DriverConfig { kind, blob }
    }
}

fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn pad(out: &mut Vec<u8>, bytes: usize) {
    out.resize(out.len() + bytes, 0);
}

/// MMIO base plus interrupt; used by the UARTs.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SimpleDriver {
    pub mmio_phys: u64,
    pub irq: u32,
}

impl DriverBlob for SimpleDriver {
    const SIZE: usize = 16;

    fn encode(&self, out: &mut Vec<u8>) {
        put_u64(out, self.mmio_phys);
        put_u32(out, self.irq);
        pad(out, 4);
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct GicV2Driver {
    pub mmio_phys: u64,
    pub msi_frame_phys: u64,
    pub gicd_offset: u64,
    pub gicc_offset: u64,
    pub gich_offset: u64,
    pub gicv_offset: u64,
    pub ipi_base: u32,
    pub optional: bool,
    pub use_msi: bool,
}

impl DriverBlob for GicV2Driver {
    const SIZE: usize = 56;

    fn encode(&self, out: &mut Vec<u8>) {
        put_u64(out, self.mmio_phys);
        put_u64(out, self.msi_frame_phys);
        put_u64(out, self.gicd_offset);
        put_u64(out, self.gicc_offset);
        put_u64(out, self.gich_offset);
        put_u64(out, self.gicv_offset);
        put_u32(out, self.ipi_base);
        out.push(u8::from(self.optional));
        out.push(u8::from(self.use_msi));
        pad(out, 2);
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct GicV3Driver {
    pub mmio_phys: u64,
    pub gicd_offset: u64,
    pub gicr_offset: u64,
    pub gicr_stride: u64,
    /// i.MX8 general purpose register block, for erratum e11171.
    pub mx8_gpr_phys: u64,
    pub ipi_base: u32,
    pub optional: bool,
}

impl DriverBlob for GicV3Driver {
    const SIZE: usize = 48;

    fn encode(&self, out: &mut Vec<u8>) {
        put_u64(out, self.mmio_phys);
        put_u64(out, self.gicd_offset);
        put_u64(out, self.gicr_offset);
        put_u64(out, self.gicr_stride);
        put_u64(out, self.mx8_gpr_phys);
        put_u32(out, self.ipi_base);
        out.push(u8::from(self.optional));
        pad(out, 3);
    }
}

/// Power state coordination. Each argument triple is passed to the
/// corresponding PSCI call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PsciDriver {
    pub use_hvc: bool,
    pub shutdown_args: [u64; 3],
    pub reboot_args: [u64; 3],
    pub reboot_bootloader_args: [u64; 3],
    pub reboot_recovery_args: [u64; 3],
}

impl DriverBlob for PsciDriver {
    const SIZE: usize = 104;

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(u8::from(self.use_hvc));
        pad(out, 7);
        for args in [
            self.shutdown_args,
            self.reboot_args,
            self.reboot_bootloader_args,
            self.reboot_recovery_args,
        ] {
            for arg in args {
                put_u64(out, arg);
            }
        }
    }
}

/// Zero fields mean "not wired" (or, for the frequency, "read CNTFRQ").
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct GenericTimerDriver {
    pub irq_phys: u32,
    pub irq_virt: u32,
    pub irq_sphys: u32,
    pub freq_override: u32,
}

impl DriverBlob for GenericTimerDriver {
    const SIZE: usize = 16;

    fn encode(&self, out: &mut Vec<u8>) {
        put_u32(out, self.irq_phys);
        put_u32(out, self.irq_virt);
        put_u32(out, self.irq_sphys);
        put_u32(out, self.freq_override);
    }
}

#[allow(clippy::struct_field_names)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct HdcpDriver {
    pub preset_phys: u64,
    pub hiu_phys: u64,
    pub hdmitx_phys: u64,
}

impl DriverBlob for HdcpDriver {
    const SIZE: usize = 24;

    fn encode(&self, out: &mut Vec<u8>) {
        put_u64(out, self.preset_phys);
        put_u64(out, self.hiu_phys);
        put_u64(out, self.hdmitx_phys);
    }
}

const _: () = {
    assert!(SimpleDriver::SIZE % 8 == 0);
    assert!(GicV2Driver::SIZE % 8 == 0);
    assert!(GicV3Driver::SIZE % 8 == 0);
    assert!(PsciDriver::SIZE % 8 == 0);
    assert!(GenericTimerDriver::SIZE % 8 == 0);
    assert!(HdcpDriver::SIZE % 8 == 0);
};
