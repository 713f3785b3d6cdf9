#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use super::VramAddr;

/// Internal VRAM register block matching the NESDev `v/t/x/w` terminology.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct VramRegisters {
    /// Current VRAM address (`v`).
    pub(crate) v: VramAddr,
    /// Temporary VRAM address (`t`).
    pub(crate) t: VramAddr,
    /// Fine X scroll component (`x`, 0..7).
    pub(crate) x: u8,
    /// Write toggle (`w`): false => first write, true => second write.
    pub(crate) w: bool,
}

impl VramRegisters {
    /// Writes to `$2005` (PPUSCROLL), updating coarse X/Y and fine X/Y.
    pub(crate) fn write_scroll(&mut self, value: u8) {
        if !self.w {
            self.t.set_coarse_x(value >> 3);
            self.x = value & 0b111;
        } else {
            self.t.set_coarse_y(value >> 3);
            self.t.set_fine_y(value & 0b111);
        }
        self.w = !self.w;
    }

    /// Writes to `$2006` (PPUADDR). The first write sets the high six bits of
    /// `t` (bit 14 is cleared); the second sets the low byte and copies `t` into
    /// `v`. Returns `true` when `v` was committed.
    pub(crate) fn write_addr(&mut self, value: u8) -> bool {
        let second_write = self.w;
        if !second_write {
            let hi = u16::from(value & 0b0011_1111) << 8;
            let lo = self.t.raw() & 0x00FF;
            self.t.set_raw(hi | lo);
        } else {
            let hi = self.t.raw() & 0x7F00;
            self.t.set_raw(hi | u16::from(value));
            self.v = self.t;
        }
        self.w = !self.w;
        second_write
    }

    /// Resets the write toggle so the next `$2005/$2006` write is treated
    /// as the first half of the pair.
    pub(crate) fn reset_latch(&mut self) {
        self.w = false;
    }
}
