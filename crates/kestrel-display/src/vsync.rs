//! Bounded vertical-sync synchronization.
//!
//! The signal being awaited is a live hardware bit, not a software event, so these waits
//! busy-poll with short tick sleeps rather than blocking on a condition variable. Every
//! polling loop carries a dead-loop guard: on silicon that never toggles the bit the wait
//! returns after a bounded number of iterations instead of hanging. The return value
//! distinguishes a genuine edge ([`VsyncWait::Synced`]) from an exhausted retry budget
//! ([`VsyncWait::TimedOut`]); the sequencing paths in this crate deliberately treat both as
//! completion, accepting best-effort pacing on marginal hardware.

use kestrel_regs::RegisterBus;
use kestrel_time::TickSource;
use tracing::trace;

use crate::channel::Channel;
use crate::controller::DisplayController;
use crate::regs::{clock_enable, current_line, display_ctrl};

/// Maximum extra iterations a single poll phase tolerates before giving up.
pub const DEAD_LOOP_LIMIT: u32 = 10;

/// Sleep inserted between vsync-bit samples to reduce bus traffic.
const POLL_DIVISOR: u32 = 3;
const POLL_TICKS: u32 = 0xFFFF;

/// Iteration budget for the scan-line wait, which polls without sleeping.
const LINE_POLL_LIMIT: u32 = 100_000;

/// Outcome of a vertical-sync wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VsyncWait {
    /// The requested number of sync pulses was observed.
    Synced,
    /// The retry budget ran out before every pulse was seen. The wait still consumed its
    /// bounded time; callers pacing register sequences may proceed regardless.
    TimedOut,
    /// The channel's pixel clock or timing generator is off (or the channel does not exist
    /// on this generation): there can be no vsync pulses, the wait is a no-op.
    ClockOff,
}

impl<B: RegisterBus, T: TickSource> DisplayController<B, T> {
    /// Block until `count` full vertical-sync pulses have been observed on `channel`.
    ///
    /// A pulse that is already in progress on entry is skipped, so the first counted pulse
    /// is always a fresh one. `count == 0` returns at once without touching the bus.
    pub fn wait_vsync(&mut self, channel: Channel, count: u32) -> VsyncWait {
        if count == 0 {
            return VsyncWait::Synced;
        }
        if !self.generation().has_channel(channel) {
            return VsyncWait::ClockOff;
        }

        let gate = match channel {
            Channel::Ch0 => clock_enable::DC0,
            Channel::Ch1 => clock_enable::DC1,
            Channel::Ch2 => clock_enable::DC2,
        };
        if gate.is(self.bus.read32(clock_enable::OFFSET), clock_enable::OFF) {
            trace!(?channel, "vsync wait skipped: pixel clock gated");
            return VsyncWait::ClockOff;
        }

        let ctrl = self.ctrl_offset(channel);
        if display_ctrl::TIMING.is(self.bus.read32(ctrl), display_ctrl::DISABLE) {
            trace!(?channel, "vsync wait skipped: timing disabled");
            return VsyncWait::ClockOff;
        }

        let mut timed_out = false;
        for _ in 0..count {
            // Phase 1: if a pulse is active right now, let it drain; counting it would
            // credit a partially-elapsed pulse.
            let mut loops = 0;
            loop {
                let status = display_ctrl::VSYNC.get(self.bus.read32(ctrl));
                self.ticks.wait_ticks(POLL_DIVISOR, POLL_TICKS);
                if status != display_ctrl::VSYNC_ACTIVE {
                    break;
                }
                loops += 1;
                if loops > DEAD_LOOP_LIMIT {
                    timed_out = true;
                    break;
                }
            }

            // Phase 2: wait for the next pulse to begin.
            let mut loops = 0;
            loop {
                let status = display_ctrl::VSYNC.get(self.bus.read32(ctrl));
                self.ticks.wait_ticks(POLL_DIVISOR, POLL_TICKS);
                if status == display_ctrl::VSYNC_ACTIVE {
                    break;
                }
                loops += 1;
                if loops > DEAD_LOOP_LIMIT {
                    timed_out = true;
                    break;
                }
            }
        }

        if timed_out {
            VsyncWait::TimedOut
        } else {
            VsyncWait::Synced
        }
    }

    /// Block until `channel`'s scan line counter reaches the vertical-sync start line of the
    /// last programmed mode.
    ///
    /// Unlike [`Self::wait_vsync`] this does not wait for an edge: it returns as soon as the
    /// beam is inside the blanking region, which is the cheap way to pace a page flip
    /// without tearing. No-op when no mode has been programmed.
    pub fn wait_vsync_line(&mut self, channel: Channel) -> VsyncWait {
        if !self.generation().has_channel(channel) {
            return VsyncWait::ClockOff;
        }
        let sync_start = self.state[channel.index()].vsync_start_line;
        if sync_start == 0 {
            return VsyncWait::ClockOff;
        }

        let offset = current_line::OFFSET + channel.stride();
        let mut loops = 0;
        loop {
            let line = current_line::LINE.get(self.bus.read32(offset));
            if line >= sync_start {
                return VsyncWait::Synced;
            }
            loops += 1;
            if loops > LINE_POLL_LIMIT {
                return VsyncWait::TimedOut;
            }
        }
    }
}
