//! Supported boards, one module per board, each behind its cargo feature.

use crate::board::BoardDescriptor;

#[cfg(feature = "board-imx8mq-evk")]
mod imx8mq_evk;
#[cfg(feature = "board-kvim2")]
mod kvim2;

#[cfg(feature = "board-imx8mq-evk")]
pub use imx8mq_evk::Imx8mqEvk;
#[cfg(feature = "board-kvim2")]
pub use kvim2::Kvim2;

/// Every board compiled into this build.
pub const ALL: &[&dyn BoardDescriptor] = &[
    #[cfg(feature = "board-kvim2")]
    &Kvim2,
    #[cfg(feature = "board-imx8mq-evk")]
    &Imx8mqEvk,
];

/// Look up a compiled-in board by [`BoardDescriptor::name`].
#[must_use]
pub fn by_name(name: &str) -> Option<&'static dyn BoardDescriptor> {
    ALL.iter().copied().find(|board| board.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, board) in ALL.iter().enumerate() {
            assert!(ALL[i + 1..].iter().all(|b| b.name() != board.name()));
        }
    }

    #[cfg(all(feature = "board-kvim2", feature = "board-imx8mq-evk"))]
    #[test]
    fn lookup() {
        assert!(by_name("kvim2").is_some_and(|b| b.name() == "kvim2"));
        assert!(by_name("imx8mq-evk").is_some_and(|b| b.name() == "imx8mq-evk"));
        assert!(by_name("rpi4").is_none());
    }
}
