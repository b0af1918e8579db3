//! Suspend/resume: capture, serialization, and replay ordering.

use kestrel_display::{
    regs, Channel, ChannelSnapshot, ChipGeneration, DisplayConfig, DisplayController,
};
use kestrel_regs::MemBus;
use kestrel_time::FakeTickSource;
use pretty_assertions::assert_eq;

fn gen2(ticks: &FakeTickSource) -> DisplayController<MemBus, &FakeTickSource> {
    DisplayController::new(
        MemBus::new(),
        ticks,
        ChipGeneration::Gen2,
        DisplayConfig::default(),
    )
}

fn populate(ctrl: &mut DisplayController<MemBus, &FakeTickSource>, channel: Channel) {
    let stride = channel.stride();
    let bus = ctrl.bus_mut();
    bus.preload(regs::display_ctrl::OFFSET + stride, 0x0F00_0146);
    bus.preload(regs::fb_address::OFFSET + stride, 0x0020_0000);
    bus.preload(regs::fb_width::OFFSET + stride, 0x1E00_1E00);
    bus.preload(regs::horizontal_total::OFFSET + stride, 0x081F_077F);
    bus.preload(regs::vertical_sync::OFFSET + stride, 0x0006_043B);
}

#[test]
fn snapshot_survives_the_wire_format() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    populate(&mut ctrl, Channel::Ch0);

    let snap = ctrl.snapshot_channel(Channel::Ch0).unwrap();
    let decoded = ChannelSnapshot::decode(&snap.encode()).unwrap();
    assert_eq!(decoded, snap);
}

#[test]
fn restore_replays_the_captured_values_onto_a_fresh_device() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    populate(&mut ctrl, Channel::Ch1);
    let snap = ctrl.snapshot_channel(Channel::Ch1).unwrap();

    let mut fresh = gen2(&ticks);
    fresh.restore_channel(&snap).unwrap();

    let stride = Channel::Ch1.stride();
    for offset in [
        regs::display_ctrl::OFFSET,
        regs::fb_address::OFFSET,
        regs::fb_width::OFFSET,
        regs::horizontal_total::OFFSET,
        regs::vertical_sync::OFFSET,
    ] {
        assert_eq!(
            fresh.bus().value(offset + stride),
            ctrl.bus().value(offset + stride),
            "offset {offset:#x}",
        );
    }
}

#[test]
fn restore_writes_the_control_word_last() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    populate(&mut ctrl, Channel::Ch0);
    let snap = ctrl.snapshot_channel(Channel::Ch0).unwrap();

    let mut fresh = gen2(&ticks);
    fresh.restore_channel(&snap).unwrap();

    let ctrl_write = fresh
        .bus()
        .find_write(regs::display_ctrl::OFFSET, |_| true)
        .unwrap();
    for offset in [
        regs::horizontal_total::OFFSET,
        regs::horizontal_sync::OFFSET,
        regs::vertical_total::OFFSET,
        regs::vertical_sync::OFFSET,
    ] {
        let timing_write = fresh.bus().find_write(offset, |_| true).unwrap();
        assert!(timing_write < ctrl_write, "offset {offset:#x}");
    }
}

#[test]
fn suspend_covers_every_channel_and_masks_interrupts() {
    let ticks = FakeTickSource::new();
    let mut ctrl = gen2(&ticks);
    ctrl.bus_mut().preload(regs::int_mask::OFFSET, 0b11);
    populate(&mut ctrl, Channel::Ch0);
    populate(&mut ctrl, Channel::Ch1);

    let snaps = ctrl.suspend().unwrap();
    assert_eq!(snaps.len(), 2);
    assert_eq!(snaps[0].channel, Channel::Ch0);
    assert_eq!(snaps[1].channel, Channel::Ch1);
    assert_eq!(ctrl.bus().value(regs::int_mask::OFFSET), 0);

    let mut fresh = gen2(&ticks);
    fresh.resume(&snaps).unwrap();
    assert_eq!(
        fresh.bus().value(regs::fb_address::OFFSET + Channel::Ch1.stride()),
        0x0020_0000
    );
}

#[test]
fn third_channel_is_captured_only_where_it_exists() {
    let ticks = FakeTickSource::new();
    let mut ctrl = DisplayController::new(
        MemBus::new(),
        &ticks,
        ChipGeneration::Gen3,
        DisplayConfig::default(),
    );
    let snaps = ctrl.suspend().unwrap();
    assert_eq!(snaps.len(), 3);
    assert!(ctrl.snapshot_channel(Channel::Ch2).is_ok());

    let mut two = gen2(&ticks);
    assert!(two.snapshot_channel(Channel::Ch2).is_err());
}
