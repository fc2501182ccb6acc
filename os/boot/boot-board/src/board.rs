use crate::BoardError;
use crate::descriptor::{CpuConfig, DriverConfig, MemoryRange, PlatformIdentity, encode_memory_ranges};
use alloc::vec::Vec;
use boot_items::{BootContainer, ItemType};
use boot_partitions::PartitionLayout;
use log::debug;

/// Runtime hints from the bootloader environment, e.g. `ddr_size`.
pub trait BootEnv {
    fn get(&self, key: &str) -> Option<&str>;
}

/// No hints available; boards fall back to their compiled-in defaults.
impl BootEnv for () {
    fn get(&self, _key: &str) -> Option<&str> {
        None
    }
}

/// Key/value pairs; the first matching key wins.
impl BootEnv for &[(&str, &str)] {
    fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

/// Static description of one supported board.
pub trait BoardDescriptor {
    /// Short name used to select the board, e.g. `"kvim2"`.
    fn name(&self) -> &'static str;

    /// # Errors
    /// Fails if the board declares more clusters than the ABI allows.
    fn cpu_config(&self) -> Result<CpuConfig, BoardError>;

    /// Compiled-in memory map, before any patching.
    fn memory_ranges(&self) -> Vec<MemoryRange>;

    /// Adjust `ranges` from runtime hints. The default keeps them unchanged.
    fn patch_memory(&self, ranges: &mut [MemoryRange], env: &dyn BootEnv) {
        let _ = (ranges, env);
    }

    /// Kernel drivers, in the order they are appended.
    fn drivers(&self) -> Vec<DriverConfig>;

    /// Kernel command line, without the NUL terminator.
    fn cmdline(&self) -> &'static str;

    /// # Errors
    /// Fails if the board name does not fit the wire field.
    fn platform_id(&self) -> Result<PlatformIdentity, BoardError>;

    /// Logical partition layout, if the board publishes a partition map.
    #[must_use]
    fn partition_layout(&self) -> Option<PartitionLayout> {
        None
    }

    /// Environment key holding the Ethernet MAC address, if any.
    #[must_use]
    fn mac_env_key(&self) -> Option<&'static str> {
        None
    }
}

/// Append the board's fixed items to `container`.
///
/// Order: CPU config, memory config, one item per driver, command line,
/// platform id. The memory map is patched from `env` before anything is
/// appended. Returns the number of items appended.
///
/// # Errors
/// Descriptor validation failures and [`boot_items::ContainerError`]s.
pub fn assemble(
    board: &dyn BoardDescriptor,
    env: &dyn BootEnv,
    container: &mut BootContainer,
) -> Result<usize, BoardError> {
    let cpu = board.cpu_config()?;
    let mut memory = board.memory_ranges();
    board.patch_memory(&mut memory, env);
    let drivers = board.drivers();
    let platform = board.platform_id()?;

    let before = container.len();
    debug!(
        "assembling {}: {} cpus in {} clusters, {} memory ranges, {} drivers",
        board.name(),
        cpu.cpu_count(),
        cpu.cluster_count(),
        memory.len(),
        drivers.len()
    );

    container.append(ItemType::CpuConfig, 0, &cpu.to_bytes())?;
    container.append(ItemType::MemConfig, 0, &encode_memory_ranges(&memory))?;
    for driver in &drivers {
        container.append(ItemType::KernelDriver, driver.kind.code(), &driver.blob)?;
    }

    let mut cmdline = Vec::with_capacity(board.cmdline().len() + 1);
    cmdline.extend_from_slice(board.cmdline().as_bytes());
    cmdline.push(0);
    container.append(ItemType::Cmdline, 0, &cmdline)?;

    container.append(ItemType::PlatformId, 0, &platform.to_bytes())?;

    Ok(container.len() - before)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_env_lookup() {
        let env: &[(&str, &str)] = &[("ddr_size", "3"), ("eth_mac", "00:11:22:33:44:55")];
        assert_eq!(BootEnv::get(&env, "ddr_size"), Some("3"));
        assert_eq!(BootEnv::get(&env, "missing"), None);
        assert_eq!(().get("ddr_size"), None);
    }
}
