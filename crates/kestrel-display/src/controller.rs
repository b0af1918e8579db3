//! The display controller handle and the per-channel power/timing state machine.

use kestrel_regs::RegisterBus;
use kestrel_time::TickSource;
use tracing::{debug, trace};

use crate::channel::{Channel, ChannelState, Dpms};
use crate::config::DisplayConfig;
use crate::error::DisplayError;
use crate::generation::ChipGeneration;
use crate::regs::display_ctrl;
use crate::topology::ConnectorMask;
use crate::vblank::FlipIndex;
use crate::PixelFormat;

/// Number of vsyncs each rail-sequencing step waits when driven through the view helpers.
pub const VIEW_RAIL_VSYNC_DELAY: u32 = 4;

/// Handle to one Kestrel display controller.
///
/// All operations run synchronously on the caller's thread and assume the caller serializes
/// access per device (an external lock); the only internally synchronized state is the
/// page-flip index (see [`crate::vblank`]). The controller owns a software mirror of each
/// channel's last-programmed state; hardware registers remain the source of truth for
/// read-back decisions (vsync polling, presence bits, rail idempotence).
#[derive(Debug)]
pub struct DisplayController<B, T> {
    pub(crate) bus: B,
    pub(crate) ticks: T,
    generation: ChipGeneration,
    config: DisplayConfig,
    pub(crate) topology: ConnectorMask,
    pub(crate) state: [ChannelState; 3],
    pub(crate) flip: [FlipIndex; 3],
}

impl<B: RegisterBus, T: TickSource> DisplayController<B, T> {
    pub fn new(bus: B, ticks: T, generation: ChipGeneration, config: DisplayConfig) -> Self {
        Self {
            bus,
            ticks,
            generation,
            config,
            topology: config.forced_connectors,
            state: [
                ChannelState::initial(Channel::Ch0),
                ChannelState::initial(Channel::Ch1),
                ChannelState::initial(Channel::Ch2),
            ],
            flip: [FlipIndex::new(), FlipIndex::new(), FlipIndex::new()],
        }
    }

    pub fn generation(&self) -> ChipGeneration {
        self.generation
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// The attached-connector mask as of the last detection cycle.
    pub fn topology(&self) -> ConnectorMask {
        self.topology
    }

    /// Software mirror of `channel`'s last-programmed state.
    pub fn channel_state(&self, channel: Channel) -> &ChannelState {
        &self.state[channel.index()]
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub(crate) fn check_channel(&self, channel: Channel) -> Result<(), DisplayError> {
        if self.generation.has_channel(channel) {
            Ok(())
        } else {
            Err(DisplayError::ChannelUnavailable {
                channel,
                generation: self.generation,
            })
        }
    }

    pub(crate) fn ctrl_offset(&self, channel: Channel) -> u32 {
        display_ctrl::OFFSET + channel.stride()
    }

    /// Enable or disable `channel`'s timing generator and plane.
    ///
    /// Enabling must raise the timing bit before the plane bit: changing both in one write
    /// does not guarantee the plane takes effect. Disabling drops the plane first; once the
    /// clock is off the plane state is irrelevant, but the mirror stays exact.
    pub fn set_channel_enable(&mut self, channel: Channel, on: bool) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        let offset = self.ctrl_offset(channel);
        let mut word = self.bus.read32(offset);

        if on {
            word = display_ctrl::TIMING.set(word, display_ctrl::ENABLE);
            word = display_ctrl::DIRECTION.set(word, display_ctrl::DIRECTION_INPUT);
            self.bus.write32(offset, word);

            word = display_ctrl::PLANE.set(word, display_ctrl::ENABLE);
            word = display_ctrl::DATA_PATH.set(word, display_ctrl::DATA_PATH_EXTENDED);
            self.bus.write32(offset, word);
        } else {
            word = display_ctrl::PLANE.set(word, display_ctrl::DISABLE);
            self.bus.write32(offset, word);

            word = display_ctrl::TIMING.set(word, display_ctrl::DISABLE);
            self.bus.write32(offset, word);
        }

        let state = &mut self.state[channel.index()];
        state.timing_enabled = on;
        state.plane_enabled = on;
        trace!(?channel, on, "channel enable");
        Ok(())
    }

    /// Run the 4-step panel power-rail sequence for `channel`.
    ///
    /// Power-up raises FPVDDEN, DATA, VBIASEN, FPEN in that order; power-down drops them in
    /// exact reverse. Each step but the last is followed by a `vsync_delay`-vsync settling
    /// wait. If the rail nibble already matches the requested target the whole sequence is
    /// skipped: re-running it costs several vsyncs for no effect.
    pub fn set_panel_power(
        &mut self,
        channel: Channel,
        on: bool,
        vsync_delay: u32,
    ) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        let offset = self.ctrl_offset(channel);
        let mut word = self.bus.read32(offset);

        let nibble = word & display_ctrl::RAIL_NIBBLE_MASK;
        if on && nibble == display_ctrl::RAIL_NIBBLE_MASK {
            trace!(?channel, "panel rails already up");
            self.state[channel.index()].power_rails_on = true;
            return Ok(());
        }
        if !on && nibble == 0 {
            trace!(?channel, "panel rails already down");
            self.state[channel.index()].power_rails_on = false;
            return Ok(());
        }

        let up = [
            display_ctrl::FPVDDEN,
            display_ctrl::DATA,
            display_ctrl::VBIASEN,
            display_ctrl::FPEN,
        ];
        // Teardown walks the same rails in reverse with opposite polarity; any other order
        // risks transients that can damage panel electronics.
        let steps: [kestrel_regs::RegField; 4] = if on {
            up
        } else {
            [up[3], up[2], up[1], up[0]]
        };
        let level = if on {
            display_ctrl::HIGH
        } else {
            display_ctrl::LOW
        };

        for (i, rail) in steps.into_iter().enumerate() {
            word = rail.set(word, level);
            self.bus.write32(offset, word);
            if i + 1 < steps.len() {
                self.wait_vsync(channel, vsync_delay);
            }
        }

        self.state[channel.index()].power_rails_on = on;
        debug!(?channel, on, vsync_delay, "panel power sequence complete");
        Ok(())
    }

    /// Set `channel`'s DPMS state while the channel itself stays active.
    pub fn set_dpms(&mut self, channel: Channel, state: Dpms) -> Result<(), DisplayError> {
        self.check_channel(channel)?;
        let code = match state {
            Dpms::On => display_ctrl::DPMS_ON,
            Dpms::Standby => display_ctrl::DPMS_STANDBY,
            Dpms::Suspend => display_ctrl::DPMS_SUSPEND,
            Dpms::Off => display_ctrl::DPMS_OFF,
        };
        self.bus
            .rmw(display_ctrl::DPMS.at(channel.stride()), code);
        self.state[channel.index()].dpms = state;
        trace!(?channel, ?state, "dpms");
        Ok(())
    }

    /// Bring one output view up or down: timing/plane, panel rails, then data path/format.
    pub fn set_view(
        &mut self,
        output: Channel,
        on: bool,
        data_path: Channel,
        format: PixelFormat,
    ) -> Result<(), DisplayError> {
        self.set_channel_enable(output, on)?;
        self.set_panel_power(output, on, VIEW_RAIL_VSYNC_DELAY)?;
        self.set_format(output, data_path, format)?;
        Ok(())
    }

    /// Turn on a single view: `output` scanning out of its own data path at 24 bpp.
    pub fn single_view_on(&mut self, output: Channel) -> Result<(), DisplayError> {
        self.set_view(output, true, output, PixelFormat::SinglePixel24)
    }

    pub fn single_view_off(&mut self, output: Channel) -> Result<(), DisplayError> {
        self.set_view(output, false, output, PixelFormat::SinglePixel24)
    }

    /// Clone view: both outputs on, both scanning out of `data_path`.
    pub fn clone_view_on(&mut self, data_path: Channel) -> Result<(), DisplayError> {
        self.set_view(Channel::Ch0, true, data_path, PixelFormat::SinglePixel24)?;
        self.set_view(Channel::Ch1, true, data_path, PixelFormat::SinglePixel24)
    }

    /// Dual view: both outputs on, each on its own data path.
    pub fn dual_view_on(&mut self) -> Result<(), DisplayError> {
        self.single_view_on(Channel::Ch0)?;
        self.single_view_on(Channel::Ch1)
    }

    pub fn all_views_off(&mut self) -> Result<(), DisplayError> {
        self.single_view_off(Channel::Ch0)?;
        self.single_view_off(Channel::Ch1)
    }
}
