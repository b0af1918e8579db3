//! Mode validation and timing programming.
//!
//! A mode is validated in full before the first register write: either every parameter fits
//! the generation's limits and the whole timing set is programmed, or nothing is touched.

use kestrel_regs::RegisterBus;
use kestrel_time::TickSource;
use tracing::debug;

use crate::channel::Channel;
use crate::controller::DisplayController;
use crate::error::DisplayError;
use crate::regs::{
    display_ctrl, fb_address, fb_width, horizontal_sync, horizontal_total, vertical_sync,
    vertical_total,
};

// Reduced-blanking intervals used for every programmed mode. Panels and digital sinks in
// this family all accept them, and they keep the pixel clock low at high resolutions.
const H_FRONT_PORCH: u32 = 48;
const H_SYNC_WIDTH: u32 = 32;
const H_BLANK: u32 = 160;
const V_FRONT_PORCH: u32 = 3;
const V_SYNC_HEIGHT: u32 = 6;
const V_BLANK: u32 = 30;

/// Scan-out buffer rows must start on a 16-byte boundary.
const PITCH_ALIGN: u32 = 16;

/// One display mode plus its scan-out buffer placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeParameters {
    pub width: u32,
    pub height: u32,
    pub bpp: u32,
    pub refresh_hz: u32,
    /// Bytes per scan-out row. Zero means "derive from width and bpp".
    pub pitch: u32,
    /// Framebuffer base address of the mode's front buffer.
    pub base_address: u32,
    /// Whether the mode came from a monitor block that passed its checksum. Informational;
    /// validation does not reject unverified modes.
    pub valid_edid: bool,
}

impl ModeParameters {
    /// Row pitch in bytes, deriving and aligning when the caller left it zero.
    pub fn effective_pitch(&self) -> u32 {
        if self.pitch != 0 {
            self.pitch
        } else {
            let raw = self.width * (self.bpp / 8);
            (raw + PITCH_ALIGN - 1) & !(PITCH_ALIGN - 1)
        }
    }
}

fn bpp_code(bpp: u32) -> Option<u32> {
    match bpp {
        8 => Some(display_ctrl::FORMAT_8BPP),
        16 => Some(display_ctrl::FORMAT_16BPP),
        32 => Some(display_ctrl::FORMAT_32BPP),
        _ => None,
    }
}

impl<B: RegisterBus, T: TickSource> DisplayController<B, T> {
    /// Check `mode` against this generation's limits without touching hardware.
    pub fn validate_mode(&self, mode: &ModeParameters) -> Result<(), DisplayError> {
        let caps = self.generation().caps();
        let reject = || DisplayError::UnsupportedMode {
            width: mode.width,
            height: mode.height,
            bpp: mode.bpp,
            generation: self.generation(),
        };

        if mode.width == 0 || mode.height == 0 {
            return Err(reject());
        }
        if mode.width > caps.max_width || mode.height > caps.max_height {
            return Err(reject());
        }
        if bpp_code(mode.bpp).is_none() {
            return Err(reject());
        }
        let pitch = mode.effective_pitch();
        if pitch < mode.width * (mode.bpp / 8) {
            return Err(reject());
        }
        let bytes = u64::from(pitch) * u64::from(mode.height);
        if bytes > u64::from(caps.max_mode_bytes) {
            return Err(reject());
        }
        Ok(())
    }

    /// Program `mode` on `channel`: timing totals, sync pulses, scan-out pitch, base
    /// address, and plane depth.
    pub fn set_mode(&mut self, channel: Channel, mode: &ModeParameters) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        self.validate_mode(mode)?;

        let stride = channel.stride();
        let pitch = mode.effective_pitch();

        let h_total = horizontal_total::TOTAL.value(mode.width + H_BLANK - 1)
            | horizontal_total::DISPLAY_END.value(mode.width - 1);
        self.bus.write32(horizontal_total::OFFSET + stride, h_total);

        let h_sync = horizontal_sync::WIDTH.value(H_SYNC_WIDTH)
            | horizontal_sync::START.value(mode.width + H_FRONT_PORCH);
        self.bus.write32(horizontal_sync::OFFSET + stride, h_sync);

        let v_total = vertical_total::TOTAL.value(mode.height + V_BLANK - 1)
            | vertical_total::DISPLAY_END.value(mode.height - 1);
        self.bus.write32(vertical_total::OFFSET + stride, v_total);

        let vsync_start = mode.height + V_FRONT_PORCH;
        let v_sync = vertical_sync::HEIGHT.value(V_SYNC_HEIGHT)
            | vertical_sync::START.value(vsync_start);
        self.bus.write32(vertical_sync::OFFSET + stride, v_sync);

        let width_word =
            fb_width::WIDTH.value(pitch) | fb_width::PAN_OFFSET.value(pitch);
        self.bus.write32(fb_width::OFFSET + stride, width_word);

        self.bus
            .write32(fb_address::OFFSET + stride, mode.base_address);

        // bpp_code cannot fail here, validate_mode vetted it.
        let code = bpp_code(mode.bpp).unwrap_or(display_ctrl::FORMAT_32BPP);
        self.bus.rmw(display_ctrl::FORMAT.at(stride), code);

        let state = &mut self.state[channel.index()];
        state.vsync_start_line = vsync_start;
        state.base_address = mode.base_address;
        debug!(
            ?channel,
            width = mode.width,
            height = mode.height,
            bpp = mode.bpp,
            pitch,
            "mode programmed"
        );
        Ok(())
    }

    /// Repoint `channel`'s scan-out base and pitch without reprogramming the timing.
    pub fn set_base_address(
        &mut self,
        channel: Channel,
        pitch: u32,
        base: u32,
    ) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        let stride = channel.stride();
        let width_word = fb_width::WIDTH.value(pitch) | fb_width::PAN_OFFSET.value(pitch);
        self.bus.write32(fb_width::OFFSET + stride, width_word);
        self.bus.write32(fb_address::OFFSET + stride, base);
        self.state[channel.index()].base_address = base;
        Ok(())
    }
}
