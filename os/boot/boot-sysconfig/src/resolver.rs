use crate::kvstore::{KvError, KvRecord};
use crate::storage::{Storage, StorageError, SysconfigLayout};
use alloc::string::{String, ToString};
use alloc::vec;
use log::{debug, error, info, warn};

/// Key holding the slot inside a boot store.
pub const BOOT_KEY: &str = "boot";

/// Key under which the selected partition name is published.
pub const BOOT_TARGET_KEY: &str = "boot_part";

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BootConfigError {
    #[error("failed to read {partition} at {offset:#x}")]
    StorageReadFailed {
        partition: String,
        offset: u64,
        #[source]
        source: StorageError,
    },
    #[error("failed to write {partition} at {offset:#x}")]
    StorageWriteFailed {
        partition: String,
        offset: u64,
        #[source]
        source: StorageError,
    },
    #[error("boot partition not set")]
    BootPartitionUnset,
    #[error("neither the one-shot nor the default boot store could be parsed")]
    BootPartitionUnreadable(#[source] KvError),
    #[error("invalid boot partition {0}")]
    InvalidBootPartitionValue(String),
}

/// Bootable OS image.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BootSlot {
    A,
    B,
    Recovery,
}

impl BootSlot {
    /// Slot for a stored `boot` value.
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "r" => Some(Self::Recovery),
            _ => None,
        }
    }

    /// The stored `boot` value of this slot.
    #[must_use]
    pub const fn as_value(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::Recovery => "r",
        }
    }
}

/// Partition names of the three bootable images.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SlotPartitions<'a> {
    pub a: &'a str,
    pub b: &'a str,
    pub r: &'a str,
}

impl<'a> SlotPartitions<'a> {
    #[must_use]
    pub const fn partition(&self, slot: BootSlot) -> &'a str {
        match slot {
            BootSlot::A => self.a,
            BootSlot::B => self.b,
            BootSlot::Recovery => self.r,
        }
    }
}

/// Receives the selected boot partition, e.g. an environment variable store.
pub trait BootTargetSink {
    fn set(&mut self, key: &str, value: &str);
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Resolution {
    pub slot: BootSlot,
    pub came_from_oneshot: bool,
    /// Set when the consumed one-shot store could not be erased.
    pub erase_error: Option<BootConfigError>,
}

/// Steps of a single resolution attempt.
#[derive(Debug)]
enum State {
    TryOneshot,
    TryDefault,
    Selected { slot: BootSlot, oneshot: bool },
    Resolved(Resolution),
    Failed(BootConfigError),
}

/// Selects the boot slot from the sysconfig partition.
pub struct BootSlotResolver<'a> {
    sysconfig: &'a str,
    slots: SlotPartitions<'a>,
    layout: SysconfigLayout,
}

impl<'a> BootSlotResolver<'a> {
    /// Resolver reading the stores of partition `sysconfig`.
    #[must_use]
    pub const fn new(sysconfig: &'a str, slots: SlotPartitions<'a>) -> Self {
        Self {
            sysconfig,
            slots,
            layout: SysconfigLayout::STANDARD,
        }
    }

    #[must_use]
    pub const fn with_layout(mut self, layout: SysconfigLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Run the one-shot-then-default resolution once.
    ///
    /// On success the selected partition name has been published to `sink`
    /// under [`BOOT_TARGET_KEY`]. A one-shot store that was used is zeroed
    /// afterwards; failing to do so is reported in
    /// [`Resolution::erase_error`] and does not change the selected slot.
    ///
    /// # Errors
    /// See [`BootConfigError`]. A corrupt one-shot store is not an error.
    pub fn resolve<S, T>(&self, storage: &mut S, sink: &mut T) -> Result<Resolution, BootConfigError>
    where
        S: Storage + ?Sized,
        T: BootTargetSink + ?Sized,
    {
        let mut buffer = vec![0u8; self.layout.kvstore_size];
        let mut state = State::TryOneshot;

        loop {
            debug!("boot config state: {state:?}");
            state = match state {
                State::TryOneshot => {
                    let offset = self.layout.boot_oneshot_offset;
                    if let Err(e) = self.read(storage, offset, &mut buffer) {
                        State::Failed(e)
                    } else {
                        match KvRecord::parse(&buffer) {
                            Ok(kv) => Self::select(&kv, true),
                            Err(e) => {
                                debug!("boot-oneshot store not usable ({e}), using boot-default");
                                State::TryDefault
                            }
                        }
                    }
                }
                State::TryDefault => {
                    let offset = self.layout.boot_default_offset;
                    if let Err(e) = self.read(storage, offset, &mut buffer) {
                        State::Failed(e)
                    } else {
                        match KvRecord::parse(&buffer) {
                            Ok(kv) => Self::select(&kv, false),
                            Err(e) => {
                                warn!("kvstore load failed for {}: {e}", self.sysconfig);
                                State::Failed(BootConfigError::BootPartitionUnreadable(e))
                            }
                        }
                    }
                }
                State::Selected { slot, oneshot } => {
                    let partition = self.slots.partition(slot);
                    info!("setting boot partition to {partition}");
                    sink.set(BOOT_TARGET_KEY, partition);

                    let erase_error = if oneshot {
                        self.erase_oneshot(storage, &mut buffer).err()
                    } else {
                        None
                    };

                    State::Resolved(Resolution {
                        slot,
                        came_from_oneshot: oneshot,
                        erase_error,
                    })
                }
                State::Resolved(resolution) => return Ok(resolution),
                State::Failed(e) => return Err(e),
            };
        }
    }

    fn select(kv: &KvRecord<'_>, oneshot: bool) -> State {
        let Some(value) = kv.get(BOOT_KEY) else {
            warn!("boot partition not set");
            return State::Failed(BootConfigError::BootPartitionUnset);
        };
        let Some(slot) = BootSlot::from_value(value) else {
            warn!("invalid boot partition {value}");
            return State::Failed(BootConfigError::InvalidBootPartitionValue(value.to_string()));
        };
        State::Selected { slot, oneshot }
    }

    fn read<S: Storage + ?Sized>(
        &self,
        storage: &mut S,
        offset: u64,
        buffer: &mut [u8],
    ) -> Result<(), BootConfigError> {
        storage.read(self.sysconfig, offset, buffer).map_err(|source| {
            warn!("storage read failed for {}: {source}", self.sysconfig);
            BootConfigError::StorageReadFailed {
                partition: self.sysconfig.to_string(),
                offset,
                source,
            }
        })
    }

    fn erase_oneshot<S: Storage + ?Sized>(
        &self,
        storage: &mut S,
        buffer: &mut [u8],
    ) -> Result<(), BootConfigError> {
        info!("erasing boot-oneshot section");
        buffer.fill(0);
        let offset = self.layout.boot_oneshot_offset;
        storage.write(self.sysconfig, offset, buffer).map_err(|source| {
            error!("failed to erase boot-oneshot section of {}: {source}", self.sysconfig);
            BootConfigError::StorageWriteFailed {
                partition: self.sysconfig.to_string(),
                offset,
                source,
            }
        })
    }
}
