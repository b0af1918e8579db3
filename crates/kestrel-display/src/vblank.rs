//! Vertical-blank interrupt plumbing and tear-free page flipping.

use std::sync::Mutex;

use kestrel_regs::RegisterBus;
use kestrel_time::TickSource;
use tracing::trace;

use crate::channel::Channel;
use crate::controller::DisplayController;
use crate::error::DisplayError;
use crate::regs::{fb_address, int_mask, raw_int};
use crate::vsync::VsyncWait;

/// Which of a channel's two scan-out buffers is currently front.
///
/// The only internally locked state in the crate: flip bookkeeping may be advanced from an
/// interrupt bottom half while the owning thread holds the controller, so a plain mirror
/// field would race.
#[derive(Debug, Default)]
pub struct FlipIndex {
    front: Mutex<u8>,
}

impl FlipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn front(&self) -> u8 {
        *self.front.lock().unwrap()
    }

    fn flip(&self) -> u8 {
        let mut front = self.front.lock().unwrap();
        *front ^= 1;
        *front
    }
}

impl<B: RegisterBus, T: TickSource> DisplayController<B, T> {
    fn vsync_mask_field(channel: Channel) -> kestrel_regs::RegField {
        match channel {
            Channel::Ch0 => int_mask::CH0_VSYNC,
            Channel::Ch1 => int_mask::CH1_VSYNC,
            Channel::Ch2 => int_mask::CH2_VSYNC,
        }
    }

    fn vsync_status_field(channel: Channel) -> kestrel_regs::RegField {
        match channel {
            Channel::Ch0 => raw_int::CH0_VSYNC,
            Channel::Ch1 => raw_int::CH1_VSYNC,
            Channel::Ch2 => raw_int::CH2_VSYNC,
        }
    }

    /// Enable or disable vsync interrupt delivery for `channel`. Other channels' mask bits
    /// are left untouched.
    pub fn set_vsync_interrupt(&mut self, channel: Channel, on: bool) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        let value = if on {
            int_mask::ENABLE
        } else {
            int_mask::DISABLE
        };
        self.bus.rmw(Self::vsync_mask_field(channel), value);
        trace!(?channel, on, "vsync interrupt");
        Ok(())
    }

    /// Whether `channel`'s vsync interrupt is latched in the raw status register.
    pub fn vsync_interrupt_pending(&mut self, channel: Channel) -> bool {
        if !self.generation().has_channel(channel) {
            return false;
        }
        Self::vsync_status_field(channel).is(self.bus.read32(raw_int::OFFSET), raw_int::ACTIVE)
    }

    /// Acknowledge `channel`'s latched vsync interrupt. The status register is
    /// write-one-to-clear, so only the targeted bit is written back.
    pub fn clear_vsync_interrupt(&mut self, channel: Channel) {
        if !self.generation().has_channel(channel) {
            return;
        }
        let field = Self::vsync_status_field(channel);
        self.bus.write32(raw_int::OFFSET, field.value(raw_int::CLEAR));
    }

    /// Mask every interrupt source on the device. Used on teardown and before suspend.
    pub fn disable_all_interrupts(&mut self) {
        self.bus.write32(int_mask::OFFSET, 0);
    }

    /// Flip `channel` to its other scan-out buffer.
    ///
    /// `bases` holds the framebuffer base address of buffer 0 and buffer 1. The flip waits
    /// for the blanking region first so the address swap never lands mid-frame; a wait that
    /// times out (or a channel with no mode programmed) still flips, trading a possible
    /// one-frame tear for forward progress.
    pub fn page_flip(
        &mut self,
        channel: Channel,
        bases: [u32; 2],
    ) -> Result<VsyncWait, DisplayError> {
        self.check_channel(channel)?;
        let wait = self.wait_vsync_line(channel);

        let front = self.flip[channel.index()].flip();
        let base = bases[usize::from(front)];
        self.bus.write32(fb_address::OFFSET + channel.stride(), base);
        self.state[channel.index()].base_address = base;
        trace!(?channel, front, base, "page flip");
        Ok(wait)
    }

    /// The scan-out buffer index `channel` is currently presenting.
    pub fn front_buffer(&self, channel: Channel) -> u8 {
        self.flip[channel.index()].front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_index_alternates() {
        let idx = FlipIndex::new();
        assert_eq!(idx.front(), 0);
        assert_eq!(idx.flip(), 1);
        assert_eq!(idx.flip(), 0);
        assert_eq!(idx.front(), 0);
    }
}
