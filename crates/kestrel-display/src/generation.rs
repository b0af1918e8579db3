//! Chip generation tags and per-generation capability tables.
//!
//! All generation-dependent behavior (channel counts, connector sets, mode ceilings) is
//! table lookup keyed by the [`ChipGeneration`] tag created once at device bring-up, rather
//! than ad-hoc branching at every call site.

use crate::channel::Channel;
use crate::topology::ConnectorMask;

/// The three hardware generations of the Kestrel display controller family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipGeneration {
    /// Two channels, DVI + VGA connectors, no shared-encoder routing.
    Gen1,
    /// Two channels, DVI + VGA + one HDMI encoder sharing the DVI/VGA channels, LVDS panel
    /// interface on the DVI path.
    Gen2,
    /// Three channels, HDMI0-2 + DP0-1 contending for channels.
    Gen3,
}

/// Static capabilities of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationCaps {
    pub channels: u8,
    pub connectors: ConnectorMask,
    pub max_width: u32,
    pub max_height: u32,
    /// Ceiling on one mode's framebuffer footprint (pitch × height), in bytes.
    pub max_mode_bytes: u32,
    pub has_lvds: bool,
}

const GEN1_CAPS: GenerationCaps = GenerationCaps {
    channels: 2,
    connectors: ConnectorMask::DVI.union(ConnectorMask::VGA),
    max_width: 1920,
    max_height: 1440,
    max_mode_bytes: 8 << 20,
    has_lvds: false,
};

const GEN2_CAPS: GenerationCaps = GenerationCaps {
    channels: 2,
    connectors: ConnectorMask::DVI
        .union(ConnectorMask::VGA)
        .union(ConnectorMask::HDMI),
    max_width: 3840,
    max_height: 2160,
    max_mode_bytes: 80 << 20,
    has_lvds: true,
};

const GEN3_CAPS: GenerationCaps = GenerationCaps {
    channels: 3,
    connectors: ConnectorMask::HDMI0
        .union(ConnectorMask::HDMI1)
        .union(ConnectorMask::HDMI2)
        .union(ConnectorMask::DP0)
        .union(ConnectorMask::DP1),
    max_width: 7680,
    max_height: 4320,
    max_mode_bytes: 128 << 20,
    has_lvds: false,
};

impl ChipGeneration {
    pub const fn caps(self) -> &'static GenerationCaps {
        match self {
            ChipGeneration::Gen1 => &GEN1_CAPS,
            ChipGeneration::Gen2 => &GEN2_CAPS,
            ChipGeneration::Gen3 => &GEN3_CAPS,
        }
    }

    pub const fn channel_count(self) -> u8 {
        self.caps().channels
    }

    /// Whether `channel` physically exists on this generation.
    pub const fn has_channel(self, channel: Channel) -> bool {
        (channel.index() as u8) < self.caps().channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_counts() {
        assert_eq!(ChipGeneration::Gen1.channel_count(), 2);
        assert_eq!(ChipGeneration::Gen2.channel_count(), 2);
        assert_eq!(ChipGeneration::Gen3.channel_count(), 3);
        assert!(!ChipGeneration::Gen1.has_channel(Channel::Ch2));
        assert!(ChipGeneration::Gen3.has_channel(Channel::Ch2));
    }

    #[test]
    fn connector_sets_are_generation_scoped() {
        assert!(ChipGeneration::Gen2.caps().connectors.contains(ConnectorMask::HDMI));
        assert!(!ChipGeneration::Gen1.caps().connectors.contains(ConnectorMask::HDMI));
        assert!(!ChipGeneration::Gen3.caps().connectors.contains(ConnectorMask::DVI));
    }
}
