//! Tick-based settling delays for display sequencing.
//!
//! The controller exposes a free-running reference counter; firmware sequences express their
//! settling delays as "N ticks of the reference clock divided by 2^divisor" rather than in
//! wall-clock units. Production code uses [`StdTickSource`] (real sleeps derived from the
//! reference frequency), while unit tests drive sequencing deterministically through
//! [`FakeTickSource`], which only accounts elapsed virtual ticks. Polling loops built on top
//! of this (vsync waits, monitor detection settling) therefore run instantly and
//! reproducibly under test, including their timeout paths.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Reference counter frequency of the display controller, in Hz.
pub const REFERENCE_CLOCK_HZ: u64 = 100_000_000;

/// A source of bounded, busy-wait-style delays.
///
/// `wait_ticks(divisor, ticks)` blocks for `ticks` periods of the reference clock divided by
/// `2^divisor`. Implementations take `&self`; delay sources are shared freely across the
/// sequencing paths that need pacing.
pub trait TickSource {
    fn wait_ticks(&self, divisor: u32, ticks: u32);
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn wait_ticks(&self, divisor: u32, ticks: u32) {
        (**self).wait_ticks(divisor, ticks)
    }
}

/// Real delays via `std::thread::sleep`.
///
/// Sub-microsecond waits are rounded up to one microsecond; the sequences using this crate
/// only require minimum delays, never exact ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdTickSource;

impl TickSource for StdTickSource {
    fn wait_ticks(&self, divisor: u32, ticks: u32) {
        let hz = REFERENCE_CLOCK_HZ >> divisor.min(63);
        if hz == 0 || ticks == 0 {
            return;
        }
        let ns = (u64::from(ticks) * 1_000_000_000).div_ceil(hz);
        std::thread::sleep(Duration::from_nanos(ns.max(1_000)));
    }
}

/// Deterministic tick source for tests: accounts virtual time instead of sleeping.
#[derive(Debug, Default)]
pub struct FakeTickSource {
    calls: AtomicU64,
    elapsed_reference_ticks: AtomicU64,
}

impl FakeTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `wait_ticks` invocations so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Total virtual time waited, in undivided reference-clock ticks.
    pub fn elapsed_reference_ticks(&self) -> u64 {
        self.elapsed_reference_ticks.load(Ordering::Relaxed)
    }
}

impl TickSource for FakeTickSource {
    fn wait_ticks(&self, divisor: u32, ticks: u32) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let reference = u64::from(ticks) << divisor.min(63);
        self.elapsed_reference_ticks
            .fetch_add(reference, Ordering::Relaxed);
    }
}
