//! Mode programming, validation-before-write, and tear-free page flipping.

use kestrel_display::{
    regs, Channel, ChipGeneration, DisplayConfig, DisplayController, ModeParameters, VsyncWait,
};
use kestrel_regs::MemBus;
use kestrel_time::FakeTickSource;
use pretty_assertions::assert_eq;

fn controller(
    ticks: &FakeTickSource,
    generation: ChipGeneration,
) -> DisplayController<MemBus, &FakeTickSource> {
    DisplayController::new(MemBus::new(), ticks, generation, DisplayConfig::default())
}

fn mode_1080p() -> ModeParameters {
    ModeParameters {
        width: 1920,
        height: 1080,
        bpp: 32,
        refresh_hz: 60,
        pitch: 0,
        base_address: 0x0010_0000,
        valid_edid: true,
    }
}

#[test]
fn set_mode_programs_timing_and_scanout() {
    let ticks = FakeTickSource::new();
    let mut ctrl = controller(&ticks, ChipGeneration::Gen2);
    ctrl.set_mode(Channel::Ch0, &mode_1080p()).unwrap();

    let bus = ctrl.bus();
    let h_total = bus.value(regs::horizontal_total::OFFSET);
    assert_eq!(regs::horizontal_total::DISPLAY_END.get(h_total), 1919);
    assert_eq!(regs::horizontal_total::TOTAL.get(h_total), 1920 + 160 - 1);

    let h_sync = bus.value(regs::horizontal_sync::OFFSET);
    assert_eq!(regs::horizontal_sync::START.get(h_sync), 1920 + 48);
    assert_eq!(regs::horizontal_sync::WIDTH.get(h_sync), 32);

    let v_total = bus.value(regs::vertical_total::OFFSET);
    assert_eq!(regs::vertical_total::DISPLAY_END.get(v_total), 1079);
    assert_eq!(regs::vertical_total::TOTAL.get(v_total), 1080 + 30 - 1);

    let v_sync = bus.value(regs::vertical_sync::OFFSET);
    assert_eq!(regs::vertical_sync::START.get(v_sync), 1083);
    assert_eq!(regs::vertical_sync::HEIGHT.get(v_sync), 6);

    let width = bus.value(regs::fb_width::OFFSET);
    assert_eq!(regs::fb_width::WIDTH.get(width), 1920 * 4);
    assert_eq!(bus.value(regs::fb_address::OFFSET), 0x0010_0000);

    let fmt = regs::display_ctrl::FORMAT.get(bus.value(regs::display_ctrl::OFFSET));
    assert_eq!(fmt, regs::display_ctrl::FORMAT_32BPP);

    assert_eq!(ctrl.channel_state(Channel::Ch0).vsync_start_line, 1083);
    assert_eq!(ctrl.channel_state(Channel::Ch0).base_address, 0x0010_0000);
}

#[test]
fn rejected_modes_leave_the_bus_untouched() {
    let ticks = FakeTickSource::new();
    let mut ctrl = controller(&ticks, ChipGeneration::Gen1);

    let cases = [
        ModeParameters { width: 0, ..mode_1080p() },
        ModeParameters { bpp: 24, ..mode_1080p() },
        ModeParameters { width: 2560, height: 1600, ..mode_1080p() },
        // Fits the resolution ceiling but blows the framebuffer byte budget.
        ModeParameters { width: 1920, height: 1440, pitch: 65_536, ..mode_1080p() },
        // Explicit pitch shorter than one row.
        ModeParameters { pitch: 1024, ..mode_1080p() },
    ];
    for mode in cases {
        assert!(ctrl.set_mode(Channel::Ch0, &mode).is_err(), "{mode:?}");
    }
    assert!(ctrl.bus().trace().is_empty());
}

#[test]
fn mode_just_inside_the_limits_is_accepted() {
    let ticks = FakeTickSource::new();
    let ctrl = controller(&ticks, ChipGeneration::Gen1);
    let mode = ModeParameters {
        width: 1920,
        height: 1080,
        bpp: 32,
        refresh_hz: 60,
        pitch: 0,
        base_address: 0,
        valid_edid: false,
    };
    assert!(ctrl.validate_mode(&mode).is_ok());
}

#[test]
fn page_flip_waits_for_blanking_then_swaps_buffers() {
    let ticks = FakeTickSource::new();
    let mut ctrl = controller(&ticks, ChipGeneration::Gen2);
    ctrl.set_mode(Channel::Ch0, &mode_1080p()).unwrap();
    ctrl.bus_mut().clear_trace();
    // Beam mid-frame on the first sample, inside blanking on the second.
    ctrl.bus_mut()
        .script_reads(regs::current_line::OFFSET, [500, 1084]);

    let bases = [0x0010_0000, 0x0090_0000];
    assert_eq!(ctrl.page_flip(Channel::Ch0, bases), Ok(VsyncWait::Synced));
    assert_eq!(ctrl.front_buffer(Channel::Ch0), 1);
    assert_eq!(ctrl.bus().writes_to(regs::fb_address::OFFSET), vec![0x0090_0000]);

    // The line poll happened before the address write.
    let first_write = ctrl
        .bus()
        .find_write(regs::fb_address::OFFSET, |_| true)
        .unwrap();
    assert!(ctrl.bus().reads_of(regs::current_line::OFFSET) >= 1);
    assert!(first_write >= 2);

    ctrl.bus_mut()
        .script_reads(regs::current_line::OFFSET, [1084]);
    assert_eq!(ctrl.page_flip(Channel::Ch0, bases), Ok(VsyncWait::Synced));
    assert_eq!(ctrl.front_buffer(Channel::Ch0), 0);
    assert_eq!(ctrl.channel_state(Channel::Ch0).base_address, 0x0010_0000);
}

#[test]
fn base_address_update_reprograms_pitch_and_base_only() {
    let ticks = FakeTickSource::new();
    let mut ctrl = controller(&ticks, ChipGeneration::Gen2);
    ctrl.set_mode(Channel::Ch0, &mode_1080p()).unwrap();
    ctrl.bus_mut().clear_trace();

    ctrl.set_base_address(Channel::Ch0, 8192, 0x0080_0000).unwrap();
    assert_eq!(
        regs::fb_width::WIDTH.get(ctrl.bus().value(regs::fb_width::OFFSET)),
        8192
    );
    assert_eq!(ctrl.bus().value(regs::fb_address::OFFSET), 0x0080_0000);
    assert_eq!(ctrl.channel_state(Channel::Ch0).base_address, 0x0080_0000);
    // Timing registers stay as the mode left them.
    assert!(ctrl.bus().writes_to(regs::horizontal_total::OFFSET).is_empty());
}

#[test]
fn vsync_interrupt_mask_is_per_channel() {
    let ticks = FakeTickSource::new();
    let mut ctrl = controller(&ticks, ChipGeneration::Gen3);
    ctrl.set_vsync_interrupt(Channel::Ch0, true).unwrap();
    ctrl.set_vsync_interrupt(Channel::Ch2, true).unwrap();
    assert_eq!(ctrl.bus().value(regs::int_mask::OFFSET), 0b101);

    ctrl.set_vsync_interrupt(Channel::Ch0, false).unwrap();
    assert_eq!(ctrl.bus().value(regs::int_mask::OFFSET), 0b100);

    ctrl.disable_all_interrupts();
    assert_eq!(ctrl.bus().value(regs::int_mask::OFFSET), 0);
}

#[test]
fn vsync_interrupt_ack_writes_only_the_latched_bit() {
    let ticks = FakeTickSource::new();
    let mut ctrl = controller(&ticks, ChipGeneration::Gen3);
    ctrl.bus_mut().preload(regs::raw_int::OFFSET, 0b111);

    assert!(ctrl.vsync_interrupt_pending(Channel::Ch1));
    ctrl.clear_vsync_interrupt(Channel::Ch1);
    assert_eq!(ctrl.bus().writes_to(regs::raw_int::OFFSET), vec![0b010]);
}

#[test]
fn gamma_lut_fills_all_palette_entries() {
    let ticks = FakeTickSource::new();
    let mut ctrl = controller(&ticks, ChipGeneration::Gen2);

    let ramp = core::array::from_fn::<u8, 256, _>(|i| i as u8);
    ctrl.load_gamma_lut(Channel::Ch1, &ramp, &ramp, &ramp).unwrap();
    ctrl.set_gamma(Channel::Ch1, true).unwrap();

    let base = regs::palette_ram::OFFSET + Channel::Ch1.stride();
    assert_eq!(ctrl.bus().value(base), 0);
    assert_eq!(ctrl.bus().value(base + 4), 0x0001_0101);
    assert_eq!(ctrl.bus().value(base + 255 * 4), 0x00FF_FFFF);

    let word = ctrl.bus().value(regs::display_ctrl::OFFSET + Channel::Ch1.stride());
    assert!(regs::display_ctrl::GAMMA.is(word, regs::display_ctrl::ENABLE));
}
