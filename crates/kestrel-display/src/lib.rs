//! Hardware abstraction for the Kestrel family of display controllers.
//!
//! The family spans three chip generations that share one register programming model:
//! per-channel register blocks at a fixed stride, a central per-channel control word, and a
//! small set of global registers (clock gates, interrupt plumbing, hot-plug status, the
//! LVDS transmitter pair). This crate owns the sequencing rules that make that model safe
//! to drive: panel power rails toggle one at a time in a fixed order, timing comes up
//! before the plane, LVDS PLLs power up only after a settling wait, and the analog detect
//! comparator never stays enabled past a probe.
//!
//! [`DisplayController`] is the handle; it is generic over a [`kestrel_regs::RegisterBus`]
//! (real MMIO or a scripted test bus) and a [`kestrel_time::TickSource`] (real sleeps or a
//! fake counter), so every sequencing path is testable off-hardware. Callers serialize
//! access per device; the page-flip front-buffer index is the only internally locked state.
//!
//! Routing ([`resolve_channel`]) is pure arithmetic over the detected connector topology
//! and never touches registers; detection maintains that topology and enforces the
//! shared-channel exclusion rules between connectors.

mod channel;
mod config;
mod controller;
mod detect;
mod error;
mod format;
mod gamma;
mod generation;
mod mode;
pub mod regs;
mod routing;
mod snapshot;
mod topology;
pub mod vblank;
mod vsync;

pub use channel::{Channel, ChannelState, Dpms, PixelFormat};
pub use config::DisplayConfig;
pub use controller::{DisplayController, VIEW_RAIL_VSYNC_DELAY};
pub use detect::{RgbThresholds, DEFAULT_DETECT_THRESHOLD};
pub use error::DisplayError;
pub use format::LVDS_PLL_SETTLE_VSYNCS;
pub use generation::{ChipGeneration, GenerationCaps};
pub use mode::ModeParameters;
pub use routing::resolve_channel;
pub use snapshot::{ChannelSnapshot, SnapReg, SnapshotError};
pub use topology::{Connector, ConnectorMask, ConnectorStatus};
pub use vsync::{VsyncWait, DEAD_LOOP_LIMIT};
