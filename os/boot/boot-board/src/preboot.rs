use crate::BoardError;
use crate::board::{BoardDescriptor, BootEnv, assemble};
use crate::descriptor::MacAddress;
use boot_items::{BootContainer, ItemType};
use boot_partitions::{BlockDevice, PartitionError, PartitionResolver};
use log::{info, warn};

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MacError {
    #[error("MAC address not set")]
    Unset,
    #[error("MAC address is not of the form xx:xx:xx:xx:xx:xx")]
    Malformed,
}

/// What happened to an item the boot can do without.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OptionalItem<E> {
    Appended,
    /// The board does not provide this item.
    NotApplicable,
    Skipped(E),
}

impl<E> OptionalItem<E> {
    #[must_use]
    pub const fn is_appended(&self) -> bool {
        matches!(self, Self::Appended)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PrebootReport {
    /// Items appended by [`assemble`].
    pub board_items: usize,
    pub partition_map: OptionalItem<PartitionError>,
    pub mac_address: OptionalItem<MacError>,
}

/// Populate `container` with everything the board contributes before handoff.
///
/// Runs [`assemble`], then the partition map (if the board has a layout),
/// then the MAC address (if the board names an env key). Failures of the two
/// optional steps are logged and recorded in the report; the boot continues
/// without the item.
///
/// # Errors
/// Only failures of the mandatory board items.
pub fn append_board_items(
    board: &dyn BoardDescriptor,
    env: &dyn BootEnv,
    device: Option<&dyn BlockDevice>,
    container: &mut BootContainer,
) -> Result<PrebootReport, BoardError> {
    let board_items = assemble(board, env, container)?;

    let partition_map = match board.partition_layout() {
        None => OptionalItem::NotApplicable,
        Some(layout) => match PartitionResolver::new(layout).resolve(device) {
            Ok(map) => {
                map.append_to(container)?;
                info!(
                    "partition map: {} entries, {} blocks of {} bytes",
                    map.entries.len(),
                    map.block_count,
                    map.block_size
                );
                OptionalItem::Appended
            }
            Err(e) => {
                warn!("skipping partition map: {e}");
                OptionalItem::Skipped(e)
            }
        },
    };

    let mac_address = match board.mac_env_key() {
        None => OptionalItem::NotApplicable,
        Some(key) => match mac_from_env(env, key) {
            Ok(mac) => {
                container.append(ItemType::MacAddress, 0, &mac.0)?;
                OptionalItem::Appended
            }
            Err(e) => {
                warn!("MAC address parsing failed for {key}={:?}: {e}", env.get(key));
                OptionalItem::Skipped(e)
            }
        },
    };

    Ok(PrebootReport {
        board_items,
        partition_map,
        mac_address,
    })
}

fn mac_from_env(env: &dyn BootEnv, key: &str) -> Result<MacAddress, MacError> {
    let value = env.get(key).ok_or(MacError::Unset)?;
    MacAddress::parse(value).ok_or(MacError::Malformed)
}
