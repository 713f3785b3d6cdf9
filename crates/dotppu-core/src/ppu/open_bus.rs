#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

/// PPU-local data bus latch.
///
/// Every byte that crosses the register window, in either direction, lands
/// here. Reads of write-only registers and the undriven bits of `$2002` and
/// palette reads are filled from it. There is no decay model: the latch keeps
/// its value until the next access.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct OpenBus {
    value: u8,
}

impl OpenBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.value = 0;
    }

    /// Latches a byte that was just driven onto the bus.
    #[inline]
    pub(crate) fn set(&mut self, value: u8) {
        self.value = value;
    }

    /// Combines `value` (in the `driven` bits) with the latch (everywhere
    /// else) and latches the result.
    #[inline]
    pub(crate) fn apply(&mut self, driven: u8, value: u8) -> u8 {
        let merged = (value & driven) | (self.value & !driven);
        self.value = merged;
        merged
    }

    #[inline]
    pub(crate) fn sample(&self) -> u8 {
        self.value
    }
}
