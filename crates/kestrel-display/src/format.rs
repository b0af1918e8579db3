//! Output format routing: pixel width, data-path wiring, and the LVDS transmitter bring-up.

use kestrel_regs::RegisterBus;
use kestrel_time::TickSource;
use tracing::{debug, trace};

use crate::channel::{Channel, PixelFormat};
use crate::controller::DisplayController;
use crate::error::DisplayError;
use crate::regs::{crt_detect, display_ctrl, lvds_ctrl1, lvds_ctrl2};

/// Vsyncs to wait between programming the LVDS PLL registers and powering the PLLs up.
pub const LVDS_PLL_SETTLE_VSYNCS: u32 = 3;

fn format_code(data_path: Channel, format: PixelFormat) -> u32 {
    match (data_path, format) {
        (Channel::Ch1, PixelFormat::SinglePixel24) => display_ctrl::FORMAT_CH1_24BIT,
        (_, PixelFormat::SinglePixel24) => display_ctrl::FORMAT_CH0_24BIT,
        (Channel::Ch1, PixelFormat::DoublePixel48) => display_ctrl::FORMAT_CH1_48BIT,
        (_, PixelFormat::DoublePixel48) => display_ctrl::FORMAT_CH0_48BIT,
    }
}

impl<B: RegisterBus, T: TickSource> DisplayController<B, T> {
    /// Configure `interface`'s output pixel format and data-path source.
    ///
    /// The double-pixel-clock bit always tracks the format: enabled for the 48-bit path,
    /// disabled for 24-bit. When the data path is a different channel than the interface,
    /// the source channel's parallel format field is programmed identically so both halves
    /// of the path agree on pixel width.
    pub fn set_format(
        &mut self,
        interface: Channel,
        data_path: Channel,
        format: PixelFormat,
    ) -> Result<(), DisplayError> {
        self.check_channel(interface)?;
        self.check_channel(data_path)?;

        let code = format_code(data_path, format);
        let double = match format {
            PixelFormat::DoublePixel48 => display_ctrl::ENABLE,
            PixelFormat::SinglePixel24 => display_ctrl::DISABLE,
        };

        let offset = self.ctrl_offset(interface);
        let mut word = self.bus.read32(offset);
        word = display_ctrl::OUTPUT_FORMAT.set(word, code);
        word = display_ctrl::DOUBLE_PIXEL_CLOCK.set(word, double);
        self.bus.write32(offset, word);

        if data_path != interface {
            self.bus
                .rmw(display_ctrl::OUTPUT_FORMAT.at(data_path.stride()), code);
        }

        let state = &mut self.state[interface.index()];
        state.output_format = format;
        state.data_path_source = data_path;
        trace!(?interface, ?data_path, ?format, "output format");
        Ok(())
    }

    /// Force the double-pixel-clock bit on. Patch helper for marginal 48-bit panels.
    pub fn enable_double_pixel(&mut self, channel: Channel) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        self.bus.rmw(
            display_ctrl::DOUBLE_PIXEL_CLOCK.at(channel.stride()),
            display_ctrl::ENABLE,
        );
        Ok(())
    }

    /// Force the double-pixel-clock bit off. Works around random fuzzy-font artifacts seen
    /// on some single-lane panels.
    pub fn disable_double_pixel(&mut self, channel: Channel) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        self.bus.rmw(
            display_ctrl::DOUBLE_PIXEL_CLOCK.at(channel.stride()),
            display_ctrl::DISABLE,
        );
        Ok(())
    }

    fn check_lvds(&self) -> Result<(), DisplayError> {
        if self.generation().caps().has_lvds {
            Ok(())
        } else {
            Err(DisplayError::LvdsUnavailable {
                generation: self.generation(),
            })
        }
    }

    /// Program the LVDS clock selects and the analog shaping profile, leaving both PLLs
    /// powered down. PLL power-up is a separate step gated on a settling wait.
    fn setup_lvds(&mut self) {
        let ctrl1 = lvds_ctrl1::CLKSEL_PLL2.set(0, lvds_ctrl1::CLKSEL_RISING_EDGE)
            | lvds_ctrl1::CLKSEL_PLL1.set(0, lvds_ctrl1::CLKSEL_RISING_EDGE)
            | lvds_ctrl1::DCLK2.set(0, lvds_ctrl1::DCLK_DEFAULT)
            | lvds_ctrl1::DCLK1.set(0, lvds_ctrl1::DCLK_DEFAULT);
        self.bus.write32(lvds_ctrl1::OFFSET, ctrl1);

        let ctrl2 = lvds_ctrl2::SHAPING.set(0, lvds_ctrl2::SHAPING_DEFAULT)
            | lvds_ctrl2::PD_PLL2.set(0, lvds_ctrl2::PLL_DOWN)
            | lvds_ctrl2::PD_PLL1.set(0, lvds_ctrl2::PLL_DOWN)
            | lvds_ctrl2::MODESEL2.set(0, lvds_ctrl2::MODESEL_DC1)
            | lvds_ctrl2::MODESEL1.set(0, lvds_ctrl2::MODESEL_DC0);
        self.bus.write32(lvds_ctrl2::OFFSET, ctrl2);
    }

    /// Power one LVDS PLL block (1 or 2) up or down.
    pub fn enable_lvds_pll(&mut self, block: u8, on: bool) -> Result<(), DisplayError> {
        self.check_lvds()?;
        let pd = if block == 1 {
            lvds_ctrl2::PD_PLL1
        } else {
            lvds_ctrl2::PD_PLL2
        };
        let mut word = self.bus.read32(lvds_ctrl2::OFFSET);
        word = pd.clear(word);
        if !on {
            word |= pd.value(lvds_ctrl2::PLL_DOWN);
        }
        self.bus.write32(lvds_ctrl2::OFFSET, word);
        trace!(block, on, "lvds pll");
        Ok(())
    }

    /// Bring up dual-channel 48-bit LVDS fed from `data_path`.
    ///
    /// Sequence: program the data-path channel for the 48-bit double-pixel path with
    /// active-low clock phase, mirror the format field on the partner channel (48-bit
    /// output straddles both), clear the LVDS clock polarity override, program the
    /// transmitter registers, wait [`LVDS_PLL_SETTLE_VSYNCS`] vsyncs for the PLLs to
    /// settle, and only then power both PLL blocks up. Enabling the PLLs before the
    /// settling wait produces an unstable picture.
    pub fn set_lvds_48bit(&mut self, data_path: Channel) -> Result<(), DisplayError> {
        self.check_lvds()?;
        self.check_channel(data_path)?;

        let offset = self.ctrl_offset(data_path);
        let mut word = self.bus.read32(offset);
        word = display_ctrl::OUTPUT_FORMAT.clear(word);
        word = display_ctrl::PIXEL_CLOCK_SELECT.clear(word);
        word = display_ctrl::DOUBLE_PIXEL_CLOCK.clear(word);
        word = display_ctrl::OUTPUT_FORMAT
            .set(word, format_code(data_path, PixelFormat::DoublePixel48));
        word = display_ctrl::PIXEL_CLOCK_SELECT.set(word, display_ctrl::PIXEL_CLOCK_HALF);
        word = display_ctrl::DOUBLE_PIXEL_CLOCK.set(word, display_ctrl::ENABLE);
        // DP and dual-channel LVDS want the low phase; everything else runs active-high.
        word = display_ctrl::CLOCK_PHASE.set(word, display_ctrl::PHASE_ACTIVE_LOW);
        self.bus.write32(offset, word);

        self.mirror_partner_format(data_path, PixelFormat::DoublePixel48);
        self.clear_lvds_clock_polarity(data_path);
        self.setup_lvds();

        // Wait for the LVDS PLLs to settle before enabling them.
        self.wait_vsync(data_path, LVDS_PLL_SETTLE_VSYNCS);
        self.enable_lvds_pll(1, true)?;
        self.enable_lvds_pll(2, true)?;

        let state = &mut self.state[data_path.index()];
        state.output_format = PixelFormat::DoublePixel48;
        state.data_path_source = data_path;
        debug!(?data_path, "48-bit LVDS up");
        Ok(())
    }

    /// Bring up single-channel 24-bit LVDS fed from `data_path`.
    pub fn set_lvds_single(&mut self, data_path: Channel) -> Result<(), DisplayError> {
        self.check_lvds()?;
        self.check_channel(data_path)?;

        let offset = self.ctrl_offset(data_path);
        let mut word = self.bus.read32(offset);
        word = display_ctrl::OUTPUT_FORMAT.clear(word);
        word = display_ctrl::PIXEL_CLOCK_SELECT.clear(word);
        word = display_ctrl::DOUBLE_PIXEL_CLOCK.clear(word);
        word = display_ctrl::OUTPUT_FORMAT
            .set(word, format_code(data_path, PixelFormat::SinglePixel24));
        word = display_ctrl::CLOCK_PHASE.set(word, display_ctrl::PHASE_ACTIVE_HIGH);
        self.bus.write32(offset, word);

        self.mirror_partner_format(data_path, PixelFormat::SinglePixel24);
        self.clear_lvds_clock_polarity(data_path);
        self.setup_lvds();

        self.wait_vsync(data_path, LVDS_PLL_SETTLE_VSYNCS);
        self.enable_lvds_pll(1, true)?;
        self.enable_lvds_pll(2, true)?;

        let state = &mut self.state[data_path.index()];
        state.output_format = PixelFormat::SinglePixel24;
        state.data_path_source = data_path;
        debug!(?data_path, "single-channel LVDS up");
        Ok(())
    }

    /// The partner channel's format field must carry the same data-path code, since LVDS
    /// output is wired through both channel blocks.
    fn mirror_partner_format(&mut self, data_path: Channel, format: PixelFormat) {
        let partner = match data_path {
            Channel::Ch0 => Channel::Ch1,
            _ => Channel::Ch0,
        };
        self.bus.rmw(
            display_ctrl::OUTPUT_FORMAT.at(partner.stride()),
            format_code(data_path, format),
        );
    }

    fn clear_lvds_clock_polarity(&mut self, data_path: Channel) {
        let offset = crt_detect::OFFSET + data_path.stride();
        let word = self.bus.read32(offset);
        self.bus.write32(offset, crt_detect::LVDS_CLK.clear(word));
    }
}
