//! Kestrel display controller register map.
//!
//! Channel-relative registers live in a per-channel block: channel N's copy of a register is
//! at the channel-0 offset plus `N * CHANNEL_STRIDE`. Field tables are defined once against
//! the channel-0 block and rebased with [`RegField::at`]. Global registers (clock gates,
//! interrupt plumbing, hot-plug status, LVDS transmitter) are shared by all channels; the
//! LVDS control pair sits inside the channel-0 block but drives both transmitter lanes.

use kestrel_regs::RegField;

/// Byte distance between consecutive channel register blocks.
pub const CHANNEL_STRIDE: u32 = 0x8000;

/// Base of the channel-0 register block.
pub const CHANNEL_BASE: u32 = 0x8_0000;

// -----------------------------------------------------------------------------
// Global registers
// -----------------------------------------------------------------------------

/// Per-channel pixel clock gates. No gate, no timing, no vsync pulses.
pub mod clock_enable {
    use super::*;

    pub const OFFSET: u32 = 0x0040;

    pub const DC0: RegField = RegField::bit(OFFSET, 0);
    pub const DC1: RegField = RegField::bit(OFFSET, 1);
    pub const DC2: RegField = RegField::bit(OFFSET, 2);

    pub const ON: u32 = 1;
    pub const OFF: u32 = 0;
}

/// Latched interrupt status; writing a set bit back clears it.
pub mod raw_int {
    use super::*;

    pub const OFFSET: u32 = 0x0044;

    pub const CH0_VSYNC: RegField = RegField::bit(OFFSET, 0);
    pub const CH1_VSYNC: RegField = RegField::bit(OFFSET, 1);
    pub const CH2_VSYNC: RegField = RegField::bit(OFFSET, 2);

    pub const ACTIVE: u32 = 1;
    pub const CLEAR: u32 = 1;
}

/// Interrupt delivery mask, one vsync enable per channel.
pub mod int_mask {
    use super::*;

    pub const OFFSET: u32 = 0x0048;

    pub const CH0_VSYNC: RegField = RegField::bit(OFFSET, 0);
    pub const CH1_VSYNC: RegField = RegField::bit(OFFSET, 1);
    pub const CH2_VSYNC: RegField = RegField::bit(OFFSET, 2);

    pub const ENABLE: u32 = 1;
    pub const DISABLE: u32 = 0;
}

/// Hot-plug level status, one bit per physical connector (read-only).
///
/// Bit positions match the connector topology mask layout, see `ConnectorMask`.
pub mod hpd_status {
    use super::*;

    pub const OFFSET: u32 = 0x004C;

    pub const DVI: RegField = RegField::bit(OFFSET, 0);
    pub const VGA: RegField = RegField::bit(OFFSET, 1);
    pub const HDMI: RegField = RegField::bit(OFFSET, 2);
    pub const HDMI0: RegField = RegField::bit(OFFSET, 3);
    pub const HDMI1: RegField = RegField::bit(OFFSET, 4);
    pub const HDMI2: RegField = RegField::bit(OFFSET, 5);
    pub const DP0: RegField = RegField::bit(OFFSET, 6);
    pub const DP1: RegField = RegField::bit(OFFSET, 7);

    pub const PLUGGED: u32 = 1;
}

/// HDMI transmitter control (generations with a single shared HDMI encoder).
pub mod hdmi_ctrl {
    use super::*;

    pub const OFFSET: u32 = 0x0050;

    pub const OUTPUT: RegField = RegField::bit(OFFSET, 0);

    pub const ENABLE: u32 = 1;
    pub const DISABLE: u32 = 0;
}

/// DisplayPort transmitter control, one register per DP connector (third generation).
///
/// Besides the output enable, the register carries link-training state that must be wiped
/// when the connector is torn down; "clearing the channel" writes the whole word to zero.
pub mod dp_ctrl {
    use super::*;

    pub const OFFSET0: u32 = 0x0054;
    pub const OFFSET1: u32 = 0x0058;

    pub const fn offset(index: u8) -> u32 {
        match index {
            0 => OFFSET0,
            _ => OFFSET1,
        }
    }

    pub const fn output(index: u8) -> RegField {
        RegField::bit(offset(index), 0)
    }

    pub const ENABLE: u32 = 1;
    pub const DISABLE: u32 = 0;
}

// -----------------------------------------------------------------------------
// Channel block registers (channel-0 offsets; rebase with `RegField::at`)
// -----------------------------------------------------------------------------

/// The central per-channel control word: timing/plane enables, DPMS, panel power rails,
/// output format and pixel clock shaping, plus the live vsync status bit.
pub mod display_ctrl {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE;

    /// DPMS state, encoded as HSYNC/VSYNC polarity pairs.
    pub const DPMS: RegField = RegField::new(OFFSET, 31, 30);
    pub const DPMS_ON: u32 = 0b00; // VP HP
    pub const DPMS_STANDBY: u32 = 0b01; // VP HN
    pub const DPMS_SUSPEND: u32 = 0b10; // VN HP
    pub const DPMS_OFF: u32 = 0b11; // VN HN

    // Panel power rails, bits 27:24. The nibble as a whole is the sequencing state; the
    // individual rails are toggled one at a time, never together.
    pub const FPEN: RegField = RegField::bit(OFFSET, 27);
    pub const VBIASEN: RegField = RegField::bit(OFFSET, 26);
    pub const DATA: RegField = RegField::bit(OFFSET, 25);
    pub const FPVDDEN: RegField = RegField::bit(OFFSET, 24);
    pub const RAIL_NIBBLE_MASK: u32 = 0x0F00_0000;

    pub const HIGH: u32 = 1;
    pub const LOW: u32 = 0;

    /// Output interface format: which channel's data path feeds the interface, and whether
    /// pixels are carried one per clock (24-bit) or two per clock (48-bit).
    pub const OUTPUT_FORMAT: RegField = RegField::new(OFFSET, 17, 16);
    pub const FORMAT_CH0_24BIT: u32 = 0b00;
    pub const FORMAT_CH1_24BIT: u32 = 0b01;
    pub const FORMAT_CH0_48BIT: u32 = 0b10;
    pub const FORMAT_CH1_48BIT: u32 = 0b11;

    /// Pixel clock divider select (1 = half rate, used with the double-pixel path).
    pub const PIXEL_CLOCK_SELECT: RegField = RegField::bit(OFFSET, 15);
    pub const PIXEL_CLOCK_FULL: u32 = 0;
    pub const PIXEL_CLOCK_HALF: u32 = 1;

    /// Output clock phase (1 = active low; dual-channel 48-bit LVDS requires low).
    pub const CLOCK_PHASE: RegField = RegField::bit(OFFSET, 14);
    pub const PHASE_ACTIVE_HIGH: u32 = 0;
    pub const PHASE_ACTIVE_LOW: u32 = 1;

    /// Live vertical sync status (read-only).
    pub const VSYNC: RegField = RegField::bit(OFFSET, 12);
    pub const VSYNC_ACTIVE: u32 = 1;
    pub const VSYNC_INACTIVE: u32 = 0;

    pub const DOUBLE_PIXEL_CLOCK: RegField = RegField::bit(OFFSET, 11);

    pub const TIMING: RegField = RegField::bit(OFFSET, 8);

    /// Pad direction for the shared data bus (0 = input).
    pub const DIRECTION: RegField = RegField::bit(OFFSET, 7);
    pub const DIRECTION_INPUT: u32 = 0;

    /// Data path width select (1 = extended path).
    pub const DATA_PATH: RegField = RegField::bit(OFFSET, 6);
    pub const DATA_PATH_EXTENDED: u32 = 1;

    pub const GAMMA: RegField = RegField::bit(OFFSET, 5);

    pub const PLANE: RegField = RegField::bit(OFFSET, 2);

    pub const ENABLE: u32 = 1;
    pub const DISABLE: u32 = 0;

    /// Plane pixel depth.
    pub const FORMAT: RegField = RegField::new(OFFSET, 1, 0);
    pub const FORMAT_8BPP: u32 = 0b00;
    pub const FORMAT_16BPP: u32 = 0b01;
    pub const FORMAT_32BPP: u32 = 0b10;
}

pub mod pan_ctrl {
    pub const OFFSET: u32 = super::CHANNEL_BASE + 0x04;
}

pub mod color_key {
    pub const OFFSET: u32 = super::CHANNEL_BASE + 0x08;
}

pub mod fb_address {
    pub const OFFSET: u32 = super::CHANNEL_BASE + 0x0C;
}

pub mod fb_width {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE + 0x10;

    pub const WIDTH: RegField = RegField::new(OFFSET, 31, 16);
    pub const PAN_OFFSET: RegField = RegField::new(OFFSET, 15, 0);
}

pub mod horizontal_total {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE + 0x14;

    pub const TOTAL: RegField = RegField::new(OFFSET, 29, 16);
    pub const DISPLAY_END: RegField = RegField::new(OFFSET, 13, 0);
}

pub mod horizontal_sync {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE + 0x18;

    pub const WIDTH: RegField = RegField::new(OFFSET, 23, 16);
    pub const START: RegField = RegField::new(OFFSET, 12, 0);
}

pub mod vertical_total {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE + 0x1C;

    pub const TOTAL: RegField = RegField::new(OFFSET, 28, 16);
    pub const DISPLAY_END: RegField = RegField::new(OFFSET, 12, 0);
}

pub mod vertical_sync {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE + 0x20;

    pub const HEIGHT: RegField = RegField::new(OFFSET, 21, 16);
    pub const START: RegField = RegField::new(OFFSET, 12, 0);
}

/// Analog monitor detection: RGB comparator thresholds, detect enable, presence status.
pub mod crt_detect {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE + 0x24;

    /// LVDS output clock polarity override (shared with the LVDS transmitter path).
    pub const LVDS_CLK: RegField = RegField::bit(OFFSET, 26);
    /// Comparator result (read-only).
    pub const PRESENT: RegField = RegField::bit(OFFSET, 25);
    pub const CRT_PRESENT: u32 = 1;
    pub const ENABLE: RegField = RegField::bit(OFFSET, 24);
    pub const DATA_RED: RegField = RegField::new(OFFSET, 23, 16);
    pub const DATA_GREEN: RegField = RegField::new(OFFSET, 15, 8);
    pub const DATA_BLUE: RegField = RegField::new(OFFSET, 7, 0);
}

pub mod current_line {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE + 0x28;

    pub const LINE: RegField = RegField::new(OFFSET, 12, 0);
}

/// LVDS transmitter clock selects and output clock dividers.
///
/// Global: lives in the channel-0 block but configures both transmitter lanes.
pub mod lvds_ctrl1 {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE + 0x30;

    pub const CLKSEL_PLL2: RegField = RegField::bit(OFFSET, 31);
    pub const CLKSEL_PLL1: RegField = RegField::bit(OFFSET, 30);
    pub const CLKSEL_RISING_EDGE: u32 = 0;
    pub const DCLK2: RegField = RegField::new(OFFSET, 29, 23);
    pub const DCLK1: RegField = RegField::new(OFFSET, 22, 16);
    pub const DCLK_DEFAULT: u32 = 0x63;
}

/// LVDS transmitter PLL power and analog shaping.
///
/// Bits 31:4 are drive strength / compensation / VCO range settings that are programmed as
/// one fixed profile; only the PLL power-down bits and mode selects are toggled at runtime.
pub mod lvds_ctrl2 {
    use super::*;

    pub const OFFSET: u32 = CHANNEL_BASE + 0x34;

    /// Fixed analog shaping profile for bits 31:4 (drive strength, pre-compensation, VCO
    /// range, shorts). Programmed whole; never modified field-by-field at runtime.
    pub const SHAPING: RegField = RegField::new(OFFSET, 31, 4);
    pub const SHAPING_DEFAULT: u32 = 0x750_FED0;

    /// PLL power-down controls (1 = powered down).
    pub const PD_PLL2: RegField = RegField::bit(OFFSET, 3);
    pub const PD_PLL1: RegField = RegField::bit(OFFSET, 2);
    pub const PLL_DOWN: u32 = 1;
    pub const PLL_RUN: u32 = 0;

    /// Lane-to-channel mode selects.
    pub const MODESEL2: RegField = RegField::bit(OFFSET, 1);
    pub const MODESEL1: RegField = RegField::bit(OFFSET, 0);
    pub const MODESEL_DC0: u32 = 0;
    pub const MODESEL_DC1: u32 = 1;
}

/// Per-channel palette RAM: 256 packed `00RRGGBB` entries.
pub mod palette_ram {
    pub const OFFSET: u32 = super::CHANNEL_BASE + 0x400;
    pub const ENTRIES: usize = 256;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rail_bits_compose_the_documented_nibble() {
        let word = display_ctrl::FPEN.set(0, display_ctrl::HIGH)
            | display_ctrl::VBIASEN.set(0, display_ctrl::HIGH)
            | display_ctrl::DATA.set(0, display_ctrl::HIGH)
            | display_ctrl::FPVDDEN.set(0, display_ctrl::HIGH);
        assert_eq!(word, display_ctrl::RAIL_NIBBLE_MASK);
    }

    #[test]
    fn lvds_ctrl2_setup_profile_matches_the_reference_word() {
        // Shaping profile + both PLLs down + lane 2 on channel 1 must produce the canonical
        // bring-up word the hardware team validated.
        let word = lvds_ctrl2::SHAPING.set(0, lvds_ctrl2::SHAPING_DEFAULT)
            | lvds_ctrl2::PD_PLL1.set(0, lvds_ctrl2::PLL_DOWN)
            | lvds_ctrl2::PD_PLL2.set(0, lvds_ctrl2::PLL_DOWN)
            | lvds_ctrl2::MODESEL2.set(0, lvds_ctrl2::MODESEL_DC1)
            | lvds_ctrl2::MODESEL1.set(0, lvds_ctrl2::MODESEL_DC0);
        assert_eq!(word, 0x750F_ED0E);
    }

    #[test]
    fn timing_fields_hold_the_largest_generation_ceilings() {
        // 7680x4320 with reduced blanking, 32bpp pitch.
        assert_eq!(horizontal_total::TOTAL.get(horizontal_total::TOTAL.value(7839)), 7839);
        assert_eq!(
            horizontal_total::DISPLAY_END.get(horizontal_total::DISPLAY_END.value(7679)),
            7679
        );
        assert_eq!(vertical_total::TOTAL.get(vertical_total::TOTAL.value(4349)), 4349);
        assert_eq!(vertical_sync::START.get(vertical_sync::START.value(4323)), 4323);
        assert_eq!(current_line::LINE.get(current_line::LINE.value(4349)), 4349);
        assert_eq!(fb_width::WIDTH.get(fb_width::WIDTH.value(7680 * 4)), 7680 * 4);
    }

    #[test]
    fn channel_blocks_do_not_overlap_global_registers() {
        assert!(clock_enable::OFFSET < CHANNEL_BASE);
        assert!(int_mask::OFFSET < CHANNEL_BASE);
        assert!(dp_ctrl::offset(1) < CHANNEL_BASE);
    }
}
