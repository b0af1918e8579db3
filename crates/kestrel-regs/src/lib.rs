//! Typed access to named bit-fields inside 32-bit display controller registers.
//!
//! Every control word in the Kestrel register file is a packed collection of named fields
//! (enable bits, format codes, thresholds). This crate provides:
//! - [`RegField`]: a const-constructible descriptor (register offset + bit range) with pure
//!   read-modify-write helpers, replacing free-form mask/shift arithmetic at call sites.
//! - [`RegisterBus`]: the raw 32-bit MMIO read/write contract. These are the *only* points of
//!   contact with hardware; they are not atomic, and two concurrent field updates to the same
//!   register race unless the caller serializes them.
//! - [`MemBus`]: an in-memory bus that records every access, so sequencing-sensitive code
//!   (rail bring-up, vsync polling, PLL enables) can be verified against a register trace in
//!   unit tests without real silicon.
//!
//! Channel-relative addressing: channel N's copy of a register lives at the channel-0 offset
//! plus N times a fixed per-channel stride. [`RegField::at`] rebases a descriptor without
//! duplicating field tables per channel.

use std::collections::HashMap;

/// A named bit-field inside a 32-bit register.
///
/// Constructed from an inclusive bit range; the mask and shift are derived together so they
/// cannot disagree. Construction is `const` and panics at compile time on an invalid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegField {
    offset: u32,
    mask: u32,
    shift: u32,
}

impl RegField {
    /// Describe bits `lo..=hi` of the register at `offset`.
    pub const fn new(offset: u32, hi: u32, lo: u32) -> Self {
        assert!(hi < 32 && lo <= hi, "invalid bit range");
        let width = hi - lo + 1;
        let mask = if width == 32 { u32::MAX } else { ((1u32 << width) - 1) << lo };
        Self {
            offset,
            mask,
            shift: lo,
        }
    }

    /// Describe the single bit `bit` of the register at `offset`.
    pub const fn bit(offset: u32, bit: u32) -> Self {
        Self::new(offset, bit, bit)
    }

    /// The same field in a register block rebased by `delta` bytes (per-channel stride).
    pub const fn at(self, delta: u32) -> Self {
        Self {
            offset: self.offset + delta,
            mask: self.mask,
            shift: self.shift,
        }
    }

    pub const fn offset(self) -> u32 {
        self.offset
    }

    pub const fn mask(self) -> u32 {
        self.mask
    }

    /// Extract this field's value from `word`.
    pub const fn get(self, word: u32) -> u32 {
        (word & self.mask) >> self.shift
    }

    /// `value` shifted into field position. Bits that do not fit the field are dropped.
    pub const fn value(self, value: u32) -> u32 {
        (value << self.shift) & self.mask
    }

    /// `word` with only this field replaced by `value`.
    pub const fn set(self, word: u32, value: u32) -> u32 {
        (word & !self.mask) | self.value(value)
    }

    /// `word` with this field forced to zero.
    pub const fn clear(self, word: u32) -> u32 {
        word & !self.mask
    }

    /// Whether this field of `word` currently holds `value`.
    pub const fn is(self, word: u32, value: u32) -> bool {
        self.get(word) == value
    }
}

/// Raw 32-bit register I/O.
///
/// Reads may have hardware side effects and writes are not atomic; callers serialize all
/// operations against a given channel (see the crate docs of `kestrel-display`).
pub trait RegisterBus {
    fn read32(&mut self, offset: u32) -> u32;
    fn write32(&mut self, offset: u32, value: u32);

    /// Read-modify-write one field of the register backing `field`.
    fn rmw(&mut self, field: RegField, value: u32) {
        let word = self.read32(field.offset());
        self.write32(field.offset(), field.set(word, value));
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read32(&mut self, offset: u32) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        (**self).write32(offset, value)
    }
}

/// One recorded bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Read { offset: u32 },
    Write { offset: u32, value: u32 },
}

/// In-memory register file with a full access trace.
///
/// Reads return the last written (or preloaded) value, except where a read script is
/// installed: scripted offsets pop one canned value per read, which lets tests simulate
/// status bits that change underneath a polling loop (vsync edges, presence bits).
#[derive(Debug, Default)]
pub struct MemBus {
    regs: HashMap<u32, u32>,
    scripts: HashMap<u32, Vec<u32>>,
    trace: Vec<BusOp>,
}

impl MemBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register's backing value without recording a trace entry.
    pub fn preload(&mut self, offset: u32, value: u32) {
        self.regs.insert(offset, value);
    }

    /// Queue canned read values for `offset`, served front-to-back. Once exhausted, reads
    /// fall back to the backing value.
    pub fn script_reads(&mut self, offset: u32, values: impl IntoIterator<Item = u32>) {
        let script = self.scripts.entry(offset).or_default();
        script.extend(values);
    }

    /// Current backing value (last write / preload / last scripted read), 0 if untouched.
    pub fn value(&self, offset: u32) -> u32 {
        self.regs.get(&offset).copied().unwrap_or(0)
    }

    pub fn trace(&self) -> &[BusOp] {
        &self.trace
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// All values written to `offset`, in order.
    pub fn writes_to(&self, offset: u32) -> Vec<u32> {
        self.trace
            .iter()
            .filter_map(|op| match op {
                BusOp::Write { offset: o, value } if *o == offset => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Number of reads issued against `offset`.
    pub fn reads_of(&self, offset: u32) -> usize {
        self.trace
            .iter()
            .filter(|op| matches!(op, BusOp::Read { offset: o } if *o == offset))
            .count()
    }

    /// Trace index of the first write to `offset` whose value satisfies `pred`.
    pub fn find_write(&self, offset: u32, pred: impl Fn(u32) -> bool) -> Option<usize> {
        self.trace.iter().position(|op| {
            matches!(op, BusOp::Write { offset: o, value } if *o == offset && pred(*value))
        })
    }
}

impl RegisterBus for MemBus {
    fn read32(&mut self, offset: u32) -> u32 {
        self.trace.push(BusOp::Read { offset });
        if let Some(script) = self.scripts.get_mut(&offset) {
            if !script.is_empty() {
                let value = script.remove(0);
                // Keep the backing value in step so a follow-up unscripted read is coherent.
                self.regs.insert(offset, value);
                return value;
            }
        }
        self.value(offset)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        self.trace.push(BusOp::Write { offset, value });
        self.regs.insert(offset, value);
    }
}
