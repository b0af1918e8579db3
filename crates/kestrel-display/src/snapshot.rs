//! Channel state snapshot and restore.
//!
//! Suspend captures each channel's programmable registers into a small tagged byte format;
//! resume replays them. Entries are replayed in the order they were captured, and capture
//! deliberately saves the control word last so that on restore the timing registers are
//! back in place before any enable bit is re-raised.

use kestrel_regs::RegisterBus;
use kestrel_time::TickSource;
use thiserror::Error;
use tracing::debug;

use crate::channel::Channel;
use crate::controller::DisplayController;
use crate::regs::{
    color_key, current_line, display_ctrl, fb_address, fb_width, horizontal_sync,
    horizontal_total, pan_ctrl, vertical_sync, vertical_total,
};

const MAGIC: [u8; 4] = *b"KSNP";
const VERSION: u8 = 1;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot magic mismatch")]
    BadMagic,
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u8),
    #[error("snapshot names unknown channel {0}")]
    UnknownChannel(u8),
    #[error("snapshot names unknown register tag {0}")]
    UnknownRegister(u8),
    #[error("snapshot truncated")]
    Truncated,
}

/// The per-channel registers a snapshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapReg {
    DisplayCtrl,
    PanCtrl,
    ColorKey,
    FbAddress,
    FbWidth,
    HorizontalTotal,
    HorizontalSync,
    VerticalTotal,
    VerticalSync,
    /// Diagnostic only: captured so a snapshot records where the beam was, replayed as a
    /// harmless write to a read-only register.
    CurrentLine,
}

impl SnapReg {
    /// Capture order: control word last, see the module docs.
    pub const CAPTURE_ORDER: [SnapReg; 10] = [
        SnapReg::PanCtrl,
        SnapReg::ColorKey,
        SnapReg::FbAddress,
        SnapReg::FbWidth,
        SnapReg::HorizontalTotal,
        SnapReg::HorizontalSync,
        SnapReg::VerticalTotal,
        SnapReg::VerticalSync,
        SnapReg::CurrentLine,
        SnapReg::DisplayCtrl,
    ];

    fn tag(self) -> u8 {
        match self {
            SnapReg::DisplayCtrl => 0,
            SnapReg::PanCtrl => 1,
            SnapReg::ColorKey => 2,
            SnapReg::FbAddress => 3,
            SnapReg::FbWidth => 4,
            SnapReg::HorizontalTotal => 5,
            SnapReg::HorizontalSync => 6,
            SnapReg::VerticalTotal => 7,
            SnapReg::VerticalSync => 8,
            SnapReg::CurrentLine => 9,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, SnapshotError> {
        Ok(match tag {
            0 => SnapReg::DisplayCtrl,
            1 => SnapReg::PanCtrl,
            2 => SnapReg::ColorKey,
            3 => SnapReg::FbAddress,
            4 => SnapReg::FbWidth,
            5 => SnapReg::HorizontalTotal,
            6 => SnapReg::HorizontalSync,
            7 => SnapReg::VerticalTotal,
            8 => SnapReg::VerticalSync,
            9 => SnapReg::CurrentLine,
            other => return Err(SnapshotError::UnknownRegister(other)),
        })
    }

    /// Channel-0 offset of the register; rebase with the channel stride.
    fn offset(self) -> u32 {
        match self {
            SnapReg::DisplayCtrl => display_ctrl::OFFSET,
            SnapReg::PanCtrl => pan_ctrl::OFFSET,
            SnapReg::ColorKey => color_key::OFFSET,
            SnapReg::FbAddress => fb_address::OFFSET,
            SnapReg::FbWidth => fb_width::OFFSET,
            SnapReg::HorizontalTotal => horizontal_total::OFFSET,
            SnapReg::HorizontalSync => horizontal_sync::OFFSET,
            SnapReg::VerticalTotal => vertical_total::OFFSET,
            SnapReg::VerticalSync => vertical_sync::OFFSET,
            SnapReg::CurrentLine => current_line::OFFSET,
        }
    }
}

/// One channel's captured register values, in replay order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub channel: Channel,
    pub entries: Vec<(SnapReg, u32)>,
}

impl ChannelSnapshot {
    /// Serialize: magic, version, channel, entry count, then tagged little-endian words.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(7 + self.entries.len() * 5);
        out.extend_from_slice(&MAGIC);
        out.push(VERSION);
        out.push(self.channel.index() as u8);
        out.push(self.entries.len() as u8);
        for (reg, value) in &self.entries {
            out.push(reg.tag());
            out.extend_from_slice(&value.to_le_bytes());
        }
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < 7 {
            return Err(SnapshotError::Truncated);
        }
        if bytes[..4] != MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        if bytes[4] != VERSION {
            return Err(SnapshotError::UnsupportedVersion(bytes[4]));
        }
        let channel = Channel::from_index(usize::from(bytes[5]))
            .ok_or(SnapshotError::UnknownChannel(bytes[5]))?;
        let count = usize::from(bytes[6]);

        let mut entries = Vec::with_capacity(count);
        let mut rest = &bytes[7..];
        for _ in 0..count {
            if rest.len() < 5 {
                return Err(SnapshotError::Truncated);
            }
            let reg = SnapReg::from_tag(rest[0])?;
            let value = u32::from_le_bytes([rest[1], rest[2], rest[3], rest[4]]);
            entries.push((reg, value));
            rest = &rest[5..];
        }
        Ok(Self { channel, entries })
    }
}

impl<B: RegisterBus, T: TickSource> DisplayController<B, T> {
    /// Capture `channel`'s programmable registers.
    pub fn snapshot_channel(&mut self, channel: Channel) -> Result<ChannelSnapshot, crate::DisplayError> {
        self.check_channel(channel)?;
        let stride = channel.stride();
        let entries = SnapReg::CAPTURE_ORDER
            .into_iter()
            .map(|reg| (reg, self.bus.read32(reg.offset() + stride)))
            .collect();
        Ok(ChannelSnapshot { channel, entries })
    }

    /// Replay a snapshot onto its channel, in capture order.
    pub fn restore_channel(&mut self, snapshot: &ChannelSnapshot) -> Result<(), crate::DisplayError> {
        self.check_channel(snapshot.channel)?;
        let stride = snapshot.channel.stride();
        for (reg, value) in &snapshot.entries {
            self.bus.write32(reg.offset() + stride, *value);
        }
        debug!(channel = ?snapshot.channel, entries = snapshot.entries.len(), "channel restored");
        Ok(())
    }

    /// Capture every channel this generation has and mask all interrupts.
    pub fn suspend(&mut self) -> Result<Vec<ChannelSnapshot>, crate::DisplayError> {
        let mut snaps = Vec::new();
        for channel in Channel::ALL {
            if self.generation().has_channel(channel) {
                snaps.push(self.snapshot_channel(channel)?);
            }
        }
        self.disable_all_interrupts();
        Ok(snaps)
    }

    /// Replay a set of suspend snapshots.
    pub fn resume(&mut self, snaps: &[ChannelSnapshot]) -> Result<(), crate::DisplayError> {
        for snap in snaps {
            self.restore_channel(snap)?;
        }
        Ok(())
    }
}
