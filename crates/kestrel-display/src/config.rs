//! Immutable bring-up configuration.

use crate::topology::ConnectorMask;

/// Board/deployment switches, constructed once at initialization and passed by reference.
///
/// There is deliberately no runtime mutation here: anything that changes after bring-up is
/// channel state, not configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayConfig {
    /// Number of LVDS panel lanes wired on this board: 0 (none), 1 (single), 2 (dual).
    pub lvds_channels: u8,
    /// Connectors forced attached regardless of probe results. When non-empty, *every*
    /// probe is overridden: forced connectors report connected, all others disconnected.
    pub forced_connectors: ConnectorMask,
    /// Whether the board enables plane scaling (consumed by external mode policy; carried
    /// here so detection can log the full bring-up picture).
    pub scaling_enabled: bool,
    /// Prefer the hardware-assisted I2C engine over bit-banged DDC for EDID probes.
    pub hardware_i2c: bool,
}
