//! Monitor presence detection.
//!
//! Analog (CRT) presence is sensed by the DAC's RGB comparators; digital presence is a DDC
//! handshake with the monitor's identification EEPROM, with the hot-plug level bit as a
//! fallback for links that keep DDC powered down. Detection also maintains the connector
//! topology mask and enforces the generation-specific mutual-exclusion rules between
//! connectors that share a physical channel.

use kestrel_edid::DdcTransport;
use kestrel_regs::RegisterBus;
use kestrel_time::TickSource;
use tracing::debug;

use crate::channel::Channel;
use crate::controller::DisplayController;
use crate::regs::{crt_detect, dp_ctrl, hdmi_ctrl, hpd_status};
use crate::topology::{Connector, ConnectorMask, ConnectorStatus};

/// Comparator threshold used for any color whose caller-supplied threshold is zero.
pub const DEFAULT_DETECT_THRESHOLD: u8 = 0x64;

/// Settling delay between enabling detection and sampling the presence bit; sampling
/// earlier gives unstable results.
const DETECT_SETTLE_DIVISOR: u32 = 3;
const DETECT_SETTLE_TICKS: u32 = 0x7_FFFF;

/// RGB comparator thresholds for analog detection. Zero components fall back to
/// [`DEFAULT_DETECT_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbThresholds {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl<B: RegisterBus, T: TickSource> DisplayController<B, T> {
    /// Detect whether a CRT monitor is attached to `channel`'s DAC.
    ///
    /// The detection enable bit is cleared again on every exit path: leaving it set
    /// degrades the CRT picture.
    pub fn detect_analog(&mut self, channel: Channel, thresholds: RgbThresholds) -> bool {
        if !self.generation().has_channel(channel) {
            return false;
        }
        let offset = crt_detect::OFFSET + channel.stride();

        let pick = |v: u8| -> u32 {
            if v != 0 {
                u32::from(v)
            } else {
                u32::from(DEFAULT_DETECT_THRESHOLD)
            }
        };
        let value = crt_detect::DATA_RED.value(pick(thresholds.red))
            | crt_detect::DATA_GREEN.value(pick(thresholds.green))
            | crt_detect::DATA_BLUE.value(pick(thresholds.blue))
            | crt_detect::ENABLE.value(1);
        self.bus.write32(offset, value);

        self.ticks
            .wait_ticks(DETECT_SETTLE_DIVISOR, DETECT_SETTLE_TICKS);

        let present = crt_detect::PRESENT.is(self.bus.read32(offset), crt_detect::CRT_PRESENT);

        let word = self.bus.read32(offset);
        self.bus.write32(offset, crt_detect::ENABLE.clear(word));

        debug!(?channel, present, "analog detect");
        present
    }

    /// Probe one connector and update the topology mask.
    ///
    /// Precedence, in order:
    /// 1. Shared-channel exclusion: on Gen3 an attached HDMIn forces DPn disconnected (its
    ///    output is disabled and its transmitter state cleared); on Gen2, DVI and VGA both
    ///    attached force HDMI disconnected.
    /// 2. Forced connectors: when the force mask is non-empty, forced connectors report
    ///    connected and everything else disconnected; no probe is issued.
    /// 3. The actual probe: DDC handshake where a transport is supplied, hot-plug level
    ///    bit otherwise (DisplayPort always uses the hot-plug bit).
    pub fn detect_connector(
        &mut self,
        connector: Connector,
        mut ddc: Option<&mut dyn DdcTransport>,
    ) -> ConnectorStatus {
        let caps = self.generation().caps();
        if !caps.connectors.contains(connector.mask()) {
            return ConnectorStatus::Unknown;
        }

        if let Some(status) = self.shared_channel_exclusion(connector) {
            return status;
        }

        let forced = self.config().forced_connectors;
        if !forced.is_empty() {
            return if forced.contains(connector.mask()) {
                self.mark(connector, true)
            } else {
                self.mark(connector, false)
            };
        }

        let plugged = match connector {
            Connector::Dp0 | Connector::Dp1 => self.hpd_level(connector),
            Connector::Hdmi | Connector::Hdmi0 | Connector::Hdmi1 | Connector::Hdmi2 => {
                // DDC first; fall back to the hot-plug level for monitors that only pull
                // the HPD line high.
                match ddc.as_mut() {
                    Some(t) => kestrel_edid::probe_ddc(t) || self.hpd_level(connector),
                    None => self.hpd_level(connector),
                }
            }
            Connector::Dvi | Connector::Vga => match ddc.as_mut() {
                Some(t) => kestrel_edid::probe_ddc(t),
                None => self.hpd_level(connector),
            },
        };

        if !plugged {
            if let Connector::Dp0 | Connector::Dp1 = connector {
                // A vacated DP link must not keep stale training state around.
                self.clear_dp_channel(dp_index(connector));
            }
        }
        debug!(?connector, plugged, "connector detect");
        self.mark(connector, plugged)
    }

    /// Apply the shared-channel mutual-exclusion rules. Returns the forced status when the
    /// rule fires.
    fn shared_channel_exclusion(&mut self, connector: Connector) -> Option<ConnectorStatus> {
        match connector {
            Connector::Dp0 if self.topology.contains(ConnectorMask::HDMI0) => {
                self.disable_dp_output(0);
                self.clear_dp_channel(0);
                debug!("DP0 disconnected: HDMI0 owns the shared channel");
                Some(self.mark(connector, false))
            }
            Connector::Dp1 if self.topology.contains(ConnectorMask::HDMI1) => {
                self.disable_dp_output(1);
                self.clear_dp_channel(1);
                debug!("DP1 disconnected: HDMI1 owns the shared channel");
                Some(self.mark(connector, false))
            }
            Connector::Hdmi
                if self
                    .topology
                    .contains(ConnectorMask::DVI | ConnectorMask::VGA) =>
            {
                self.disable_hdmi_output();
                debug!("HDMI disconnected: DVI+VGA occupy both channels");
                Some(self.mark(connector, false))
            }
            _ => None,
        }
    }

    fn mark(&mut self, connector: Connector, plugged: bool) -> ConnectorStatus {
        // The first generation reports probe results without folding them into the
        // topology mask; nothing in its routing depends on the mask.
        let track = self.generation() != crate::ChipGeneration::Gen1
            || !self.config().forced_connectors.is_empty();
        if track {
            self.topology.set(connector.mask(), plugged);
        }
        if plugged {
            ConnectorStatus::Connected
        } else {
            ConnectorStatus::Disconnected
        }
    }

    fn hpd_level(&mut self, connector: Connector) -> bool {
        let field = match connector {
            Connector::Dvi => hpd_status::DVI,
            Connector::Vga => hpd_status::VGA,
            Connector::Hdmi => hpd_status::HDMI,
            Connector::Hdmi0 => hpd_status::HDMI0,
            Connector::Hdmi1 => hpd_status::HDMI1,
            Connector::Hdmi2 => hpd_status::HDMI2,
            Connector::Dp0 => hpd_status::DP0,
            Connector::Dp1 => hpd_status::DP1,
        };
        field.is(self.bus.read32(hpd_status::OFFSET), hpd_status::PLUGGED)
    }

    /// Drop the DP transmitter's output enable without touching its other state.
    pub fn disable_dp_output(&mut self, index: u8) {
        self.bus.rmw(dp_ctrl::output(index), dp_ctrl::DISABLE);
    }

    /// Wipe the DP transmitter's channel state entirely (link training included).
    pub fn clear_dp_channel(&mut self, index: u8) {
        self.bus.write32(dp_ctrl::offset(index), 0);
    }

    /// Drop the shared HDMI encoder's output enable.
    pub fn disable_hdmi_output(&mut self) {
        self.bus.rmw(hdmi_ctrl::OUTPUT, hdmi_ctrl::DISABLE);
    }
}

fn dp_index(connector: Connector) -> u8 {
    match connector {
        Connector::Dp1 => 1,
        _ => 0,
    }
}
