use boot_board::BoardError;
use boot_items::{ContainerError, ParseError};
use boot_sysconfig::{BootConfigError, KvError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown board `{0}`")]
    UnknownBoard(String),
    #[error("partition table line {line}: {reason}")]
    PartitionTable { line: usize, reason: &'static str },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error("malformed container: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    BootConfig(#[from] BootConfigError),
    #[error(transparent)]
    KvStore(#[from] KvError),
}
