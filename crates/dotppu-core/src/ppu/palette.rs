//! Palette RAM (`$3F00-$3F1F`).
//!
//! Thirty-two bytes of 6-bit color indices. Entries `$10/$14/$18/$1C` are not
//! backed by their own cells: they alias the background entries `$00/$04/$08/$0C`.

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::{mem_block::PaletteRam, memory::ppu as ppu_mem};

/// Mask for the 6 bits a palette cell actually stores.
pub(crate) const PALETTE_VALUE_MASK: u8 = 0x3F;

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct Palette {
    ram: PaletteRam,
}

impl Palette {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.ram.fill(0);
    }

    /// Maps a palette address (any `$3Fxx` mirror, or a raw 5-bit index) to
    /// its backing cell.
    #[inline]
    pub(crate) fn mirror_index(addr: u16) -> usize {
        let index = (addr & ppu_mem::PALETTE_INDEX_MASK) as usize;
        if index & 0x13 == 0x10 {
            index & 0x0F
        } else {
            index
        }
    }

    #[inline]
    pub(crate) fn read(&self, addr: u16) -> u8 {
        self.ram[Self::mirror_index(addr)]
    }

    #[inline]
    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        self.ram[Self::mirror_index(addr)] = value & PALETTE_VALUE_MASK;
    }
}
