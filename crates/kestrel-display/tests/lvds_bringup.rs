//! LVDS transmitter bring-up ordering: PLLs stay down until the settling wait has elapsed.

use kestrel_display::{
    regs, Channel, ChipGeneration, DisplayConfig, DisplayController, DisplayError, PixelFormat,
};
use kestrel_regs::MemBus;
use kestrel_time::FakeTickSource;
use pretty_assertions::assert_eq;

const CTRL0: u32 = regs::display_ctrl::OFFSET;
const CTRL1: u32 = regs::display_ctrl::OFFSET + 0x8000;
const LVDS2: u32 = regs::lvds_ctrl2::OFFSET;

fn gen2(ticks: &FakeTickSource) -> DisplayController<MemBus, &FakeTickSource> {
    let config = DisplayConfig {
        lvds_channels: 2,
        ..DisplayConfig::default()
    };
    DisplayController::new(MemBus::new(), ticks, ChipGeneration::Gen2, config)
}

#[test]
fn dual_channel_bringup_programs_plls_down_then_up() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    ctrl.set_lvds_48bit(Channel::Ch0).unwrap();

    let writes = ctrl.bus().writes_to(LVDS2);
    // Transmitter setup lands the canonical word with both PLLs powered down, then each
    // PLL is released individually.
    assert_eq!(writes, vec![0x750F_ED0E, 0x750F_ED0A, 0x750F_ED02]);
}

#[test]
fn pll_enable_happens_after_the_settling_wait() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    // Pixel clock gated: the settling wait degrades to ClockOff, but ordering still holds.
    ctrl.set_lvds_48bit(Channel::Ch0).unwrap();

    let bus = ctrl.bus();
    let setup = bus.find_write(LVDS2, |w| w == 0x750F_ED0E).unwrap();
    let pll1_up = bus.find_write(LVDS2, |w| w == 0x750F_ED0A).unwrap();
    let pll2_up = bus.find_write(LVDS2, |w| w == 0x750F_ED02).unwrap();
    assert!(setup < pll1_up && pll1_up < pll2_up);
}

#[test]
fn dual_channel_sets_half_clock_double_pixel_and_low_phase() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    ctrl.set_lvds_48bit(Channel::Ch0).unwrap();

    let word = ctrl.bus().writes_to(CTRL0)[0];
    assert!(regs::display_ctrl::OUTPUT_FORMAT.is(word, regs::display_ctrl::FORMAT_CH0_48BIT));
    assert!(regs::display_ctrl::PIXEL_CLOCK_SELECT.is(word, regs::display_ctrl::PIXEL_CLOCK_HALF));
    assert!(regs::display_ctrl::DOUBLE_PIXEL_CLOCK.is(word, regs::display_ctrl::ENABLE));
    assert!(regs::display_ctrl::CLOCK_PHASE.is(word, regs::display_ctrl::PHASE_ACTIVE_LOW));
    assert_eq!(
        ctrl.channel_state(Channel::Ch0).output_format,
        PixelFormat::DoublePixel48
    );
}

#[test]
fn partner_channel_mirrors_the_data_path_format() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    ctrl.bus_mut().preload(CTRL1, 0x0000_0144);
    ctrl.set_lvds_48bit(Channel::Ch0).unwrap();

    let word = ctrl.bus().value(CTRL1);
    // Format field carries the channel-0 48-bit code; the partner's other bits survive.
    assert!(regs::display_ctrl::OUTPUT_FORMAT.is(word, regs::display_ctrl::FORMAT_CH0_48BIT));
    assert_eq!(word & !regs::display_ctrl::OUTPUT_FORMAT.mask(), 0x0000_0144);
}

#[test]
fn single_channel_bringup_keeps_full_rate_and_high_phase() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    ctrl.set_lvds_single(Channel::Ch1).unwrap();

    let word = ctrl.bus().writes_to(CTRL1)[0];
    assert!(regs::display_ctrl::OUTPUT_FORMAT.is(word, regs::display_ctrl::FORMAT_CH1_24BIT));
    assert!(regs::display_ctrl::PIXEL_CLOCK_SELECT.is(word, regs::display_ctrl::PIXEL_CLOCK_FULL));
    assert!(regs::display_ctrl::DOUBLE_PIXEL_CLOCK.is(word, regs::display_ctrl::DISABLE));
    assert!(regs::display_ctrl::CLOCK_PHASE.is(word, regs::display_ctrl::PHASE_ACTIVE_HIGH));
}

#[test]
fn generations_without_lvds_refuse_before_touching_registers() {
    let ticks = FakeTickSource::new();
    let mut ctrl = DisplayController::new(
        MemBus::new(),
        &ticks,
        ChipGeneration::Gen3,
        DisplayConfig::default(),
    );
    assert_eq!(
        ctrl.set_lvds_48bit(Channel::Ch0),
        Err(DisplayError::LvdsUnavailable {
            generation: ChipGeneration::Gen3,
        })
    );
    assert!(ctrl.bus().trace().is_empty());
}

#[test]
fn format_routing_mirrors_cross_channel_sources() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    ctrl.set_format(Channel::Ch1, Channel::Ch0, PixelFormat::SinglePixel24)
        .unwrap();

    // Interface channel takes the source code, and the source channel's field agrees.
    let ch1 = ctrl.bus().value(CTRL1);
    assert!(regs::display_ctrl::OUTPUT_FORMAT.is(ch1, regs::display_ctrl::FORMAT_CH0_24BIT));
    let ch0 = ctrl.bus().value(CTRL0);
    assert!(regs::display_ctrl::OUTPUT_FORMAT.is(ch0, regs::display_ctrl::FORMAT_CH0_24BIT));
    assert_eq!(ctrl.channel_state(Channel::Ch1).data_path_source, Channel::Ch0);
}
