//! Logical connectors and the attached-connector topology mask.

use bitflags::bitflags;

bitflags! {
    /// Bitset of connectors currently considered attached (or forced attached).
    ///
    /// Recomputed on every detection cycle and consumed by the routing resolver for the
    /// connectors whose channel assignment is topology-dependent. Bit positions match the
    /// `hpd_status` register and the force-connect configuration encoding: bit 0 DVI,
    /// bit 1 VGA, bit 2 HDMI, bits 3-5 HDMI0-2, bits 6-7 DP0-1.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConnectorMask: u8 {
        const DVI = 1 << 0;
        const VGA = 1 << 1;
        const HDMI = 1 << 2;
        const HDMI0 = 1 << 3;
        const HDMI1 = 1 << 4;
        const HDMI2 = 1 << 5;
        const DP0 = 1 << 6;
        const DP1 = 1 << 7;
    }
}

/// A logical output connector.
///
/// `Dvi`/`Vga` exist on the first two generations, `Hdmi` only on the second, and the
/// HDMI0-2/DP0-1 set only on the third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connector {
    Dvi,
    Vga,
    Hdmi,
    Hdmi0,
    Hdmi1,
    Hdmi2,
    Dp0,
    Dp1,
}

impl Connector {
    pub const fn mask(self) -> ConnectorMask {
        match self {
            Connector::Dvi => ConnectorMask::DVI,
            Connector::Vga => ConnectorMask::VGA,
            Connector::Hdmi => ConnectorMask::HDMI,
            Connector::Hdmi0 => ConnectorMask::HDMI0,
            Connector::Hdmi1 => ConnectorMask::HDMI1,
            Connector::Hdmi2 => ConnectorMask::HDMI2,
            Connector::Dp0 => ConnectorMask::DP0,
            Connector::Dp1 => ConnectorMask::DP1,
        }
    }
}

/// Result of a connector presence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorStatus {
    Connected,
    Disconnected,
    /// The connector does not exist on this generation.
    Unknown,
}
