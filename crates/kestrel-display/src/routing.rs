//! Connector-to-channel routing.
//!
//! Pure topology arithmetic: given a generation, the attached-connector mask, and the
//! connector being brought up, decide which display channel drives it. No register access
//! happens here; callers program the chosen channel afterwards.

use crate::channel::Channel;
use crate::generation::ChipGeneration;
use crate::topology::{Connector, ConnectorMask};

/// Resolve which channel should drive `connector` under `topology`.
///
/// Routing is deterministic and favors keeping earlier-enumerated connectors on
/// lower-numbered channels:
///
/// Third generation (3 channels):
/// - DP0 always takes channel 0.
/// - DP1 takes channel 1 when DP0 is attached, otherwise channel 0.
/// - HDMI0 takes channel 2 when both DPs are attached, channel 1 when only DP0 is,
///   otherwise channel 0.
/// - HDMI1 takes channel 1 when HDMI2 is attached (HDMI2 owns channel 2), otherwise
///   channel 2.
/// - HDMI2 always takes channel 2.
///
/// First and second generation (2 channels):
/// - DVI is wired to channel 0, VGA to channel 1.
/// - The shared HDMI encoder rides channel 1 only when the topology is exactly
///   DVI plus HDMI; in every other combination it rides channel 0.
pub fn resolve_channel(
    generation: ChipGeneration,
    topology: ConnectorMask,
    connector: Connector,
) -> Channel {
    let channel = match generation {
        ChipGeneration::Gen3 => resolve_gen3(topology, connector),
        ChipGeneration::Gen1 | ChipGeneration::Gen2 => resolve_two_channel(topology, connector),
    };
    debug_assert!(
        generation.has_channel(channel),
        "routed {connector:?} to nonexistent {channel:?}"
    );
    channel
}

fn resolve_gen3(topology: ConnectorMask, connector: Connector) -> Channel {
    let dp0 = topology.contains(ConnectorMask::DP0);
    let dp1 = topology.contains(ConnectorMask::DP1);
    match connector {
        Connector::Dp0 => Channel::Ch0,
        Connector::Dp1 => {
            if dp0 {
                Channel::Ch1
            } else {
                Channel::Ch0
            }
        }
        Connector::Hdmi0 => match (dp0, dp1) {
            (true, true) => Channel::Ch2,
            (true, false) => Channel::Ch1,
            _ => Channel::Ch0,
        },
        Connector::Hdmi1 => {
            if topology.contains(ConnectorMask::HDMI2) {
                Channel::Ch1
            } else {
                Channel::Ch2
            }
        }
        Connector::Hdmi2 => Channel::Ch2,
        // Legacy connectors never appear on Gen3 hardware; route them like Gen2 anyway so
        // the function stays total.
        Connector::Dvi | Connector::Vga | Connector::Hdmi => {
            resolve_two_channel(topology, connector)
        }
    }
}

fn resolve_two_channel(topology: ConnectorMask, connector: Connector) -> Channel {
    match connector {
        Connector::Dvi => Channel::Ch0,
        Connector::Vga => Channel::Ch1,
        Connector::Hdmi => {
            // Channel 1 is free for HDMI only in the exact DVI+HDMI pairing; any VGA
            // presence claims channel 1 for the DAC.
            if topology == ConnectorMask::DVI | ConnectorMask::HDMI {
                Channel::Ch1
            } else {
                Channel::Ch0
            }
        }
        _ => Channel::Ch0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen3_dp_ordering() {
        let g = ChipGeneration::Gen3;
        assert_eq!(
            resolve_channel(g, ConnectorMask::DP0, Connector::Dp0),
            Channel::Ch0
        );
        assert_eq!(
            resolve_channel(g, ConnectorMask::DP0 | ConnectorMask::DP1, Connector::Dp1),
            Channel::Ch1
        );
        assert_eq!(
            resolve_channel(g, ConnectorMask::DP1, Connector::Dp1),
            Channel::Ch0
        );
    }

    #[test]
    fn gen3_hdmi0_shifts_past_attached_dps() {
        let g = ChipGeneration::Gen3;
        assert_eq!(
            resolve_channel(g, ConnectorMask::HDMI0, Connector::Hdmi0),
            Channel::Ch0
        );
        assert_eq!(
            resolve_channel(
                g,
                ConnectorMask::HDMI0 | ConnectorMask::DP0,
                Connector::Hdmi0
            ),
            Channel::Ch1
        );
        assert_eq!(
            resolve_channel(
                g,
                ConnectorMask::HDMI0 | ConnectorMask::DP0 | ConnectorMask::DP1,
                Connector::Hdmi0
            ),
            Channel::Ch2
        );
    }

    #[test]
    fn gen3_hdmi1_yields_channel_2_to_hdmi2() {
        let g = ChipGeneration::Gen3;
        assert_eq!(
            resolve_channel(g, ConnectorMask::HDMI1, Connector::Hdmi1),
            Channel::Ch2
        );
        assert_eq!(
            resolve_channel(
                g,
                ConnectorMask::HDMI1 | ConnectorMask::HDMI2,
                Connector::Hdmi1
            ),
            Channel::Ch1
        );
        assert_eq!(
            resolve_channel(g, ConnectorMask::HDMI2, Connector::Hdmi2),
            Channel::Ch2
        );
    }

    #[test]
    fn two_channel_hdmi_needs_exact_dvi_pairing() {
        let g = ChipGeneration::Gen2;
        assert_eq!(
            resolve_channel(
                g,
                ConnectorMask::DVI | ConnectorMask::HDMI,
                Connector::Hdmi
            ),
            Channel::Ch1
        );
        assert_eq!(
            resolve_channel(g, ConnectorMask::HDMI, Connector::Hdmi),
            Channel::Ch0
        );
        assert_eq!(
            resolve_channel(
                g,
                ConnectorMask::DVI | ConnectorMask::VGA | ConnectorMask::HDMI,
                Connector::Hdmi
            ),
            Channel::Ch0
        );
    }
}
