//! Channel identity and the software mirror of per-channel state.

use crate::regs::CHANNEL_STRIDE;

/// One independent timing generator + plane + output tap.
///
/// Identity is immutable; the channel's *state* lives in [`ChannelState`]. Whether a given
/// channel physically exists depends on the chip generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Ch0,
    Ch1,
    Ch2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Ch0, Channel::Ch1, Channel::Ch2];

    pub const fn index(self) -> usize {
        match self {
            Channel::Ch0 => 0,
            Channel::Ch1 => 1,
            Channel::Ch2 => 2,
        }
    }

    pub const fn from_index(index: usize) -> Option<Channel> {
        match index {
            0 => Some(Channel::Ch0),
            1 => Some(Channel::Ch1),
            2 => Some(Channel::Ch2),
            _ => None,
        }
    }

    /// Byte offset of this channel's register block relative to channel 0.
    pub const fn stride(self) -> u32 {
        self.index() as u32 * CHANNEL_STRIDE
    }
}

/// Display power management state, independent from the pure timing enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dpms {
    #[default]
    On,
    Standby,
    Suspend,
    Off,
}

/// Output pixel format: one 24-bit pixel per clock, or two pixels (48 bits) per clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    SinglePixel24,
    DoublePixel48,
}

/// Software mirror of a channel's last-programmed state.
///
/// Some control fields are expensive to re-read and the write-only sequencing state (rail
/// progress, data path source) is not fully recoverable from hardware, so the controller
/// keeps this mirror as the authoritative record of what it programmed. Read-back decisions
/// (vsync polling, monitor detection, rail idempotence) still go to the registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    pub timing_enabled: bool,
    pub plane_enabled: bool,
    pub output_format: PixelFormat,
    pub data_path_source: Channel,
    pub dpms: Dpms,
    pub power_rails_on: bool,
    /// Scan line where vertical sync starts, per the last programmed mode (0 = no mode).
    pub vsync_start_line: u32,
    /// Last programmed framebuffer base address.
    pub base_address: u32,
}

impl ChannelState {
    pub(crate) const fn initial(channel: Channel) -> Self {
        Self {
            timing_enabled: false,
            plane_enabled: false,
            output_format: PixelFormat::SinglePixel24,
            data_path_source: channel,
            dpms: Dpms::Off,
            power_rails_on: false,
            vsync_start_line: 0,
            base_address: 0,
        }
    }
}
