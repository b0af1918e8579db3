//! Refusal codes.
//!
//! Every variant here is a synchronous rejection issued *before* any register is touched;
//! no operation in this crate leaves partial state behind on error. Timeouts and absent
//! monitors are ordinary return values ([`crate::vsync::VsyncWait`], `bool` presence), not
//! errors: a non-responding channel degrades to "not connected" rather than failing.

use thiserror::Error;

use crate::channel::Channel;
use crate::generation::ChipGeneration;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    #[error("channel {channel:?} does not exist on {generation:?}")]
    ChannelUnavailable {
        channel: Channel,
        generation: ChipGeneration,
    },

    #[error("{width}x{height}@{bpp}bpp exceeds the limits of {generation:?}")]
    UnsupportedMode {
        width: u32,
        height: u32,
        bpp: u32,
        generation: ChipGeneration,
    },

    #[error("LVDS output is not present on {generation:?}")]
    LvdsUnavailable { generation: ChipGeneration },
}
