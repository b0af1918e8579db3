//! Gamma correction lookup table.

use kestrel_regs::RegisterBus;
use kestrel_time::TickSource;

use crate::channel::Channel;
use crate::controller::DisplayController;
use crate::error::DisplayError;
use crate::regs::{display_ctrl, palette_ram};

impl<B: RegisterBus, T: TickSource> DisplayController<B, T> {
    /// Route `channel`'s pixels through the gamma lookup table (or bypass it).
    pub fn set_gamma(&mut self, channel: Channel, on: bool) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        let value = if on {
            display_ctrl::ENABLE
        } else {
            display_ctrl::DISABLE
        };
        self.bus.rmw(display_ctrl::GAMMA.at(channel.stride()), value);
        Ok(())
    }

    /// Load a 256-entry gamma curve into `channel`'s palette RAM.
    ///
    /// Entries are packed `00RRGGBB`, one 32-bit word per index.
    pub fn load_gamma_lut(
        &mut self,
        channel: Channel,
        red: &[u8; palette_ram::ENTRIES],
        green: &[u8; palette_ram::ENTRIES],
        blue: &[u8; palette_ram::ENTRIES],
    ) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        let base = palette_ram::OFFSET + channel.stride();
        for i in 0..palette_ram::ENTRIES {
            let word = (u32::from(red[i]) << 16) | (u32::from(green[i]) << 8) | u32::from(blue[i]);
            self.bus.write32(base + (i as u32) * 4, word);
        }
        Ok(())
    }
}
