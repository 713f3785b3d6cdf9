use bitflags::bitflags;
#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::memory::ppu as ppu_mem;

// Layout (bits 0-14):
//  14 13 12 11 10 9 8 7 6 5 4 3 2 1 0
//  [fine_y][nt][coarse_y   ][coarse_x   ]
//  yyy     NN   YYYYY         XXXXX
bitflags! {
    /// Bit masks for the 15-bit VRAM address (`v`/`t` registers).
    pub(crate) struct VramAddrMask: u16 {
        const COARSE_X = 0x001F;
        const COARSE_Y = 0x03E0;
        const NAMETABLE_X = 0x0400;
        const NAMETABLE_Y = 0x0800;
        const NAMETABLE = Self::NAMETABLE_X.bits() | Self::NAMETABLE_Y.bits();
        const FINE_Y = 0x7000;
        /// Bits copied from `t` at the horizontal reset.
        const HORIZONTAL = Self::COARSE_X.bits() | Self::NAMETABLE_X.bits();
        const ALL = 0x7FFF;
    }
}

const COARSE_Y_SHIFT: u16 = 5;
const NAMETABLE_SHIFT: u16 = 10;
const FINE_Y_SHIFT: u16 = 12;

/// 15-bit VRAM address used by the PPU internal `v`/`t` registers.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct VramAddr(pub(crate) u16);

impl VramAddr {
    /// Returns the coarse X scroll component (0..31).
    #[inline]
    pub fn coarse_x(self) -> u8 {
        (self.0 & VramAddrMask::COARSE_X.bits()) as u8
    }

    #[inline]
    pub fn set_coarse_x(&mut self, cx: u8) {
        self.0 = (self.0 & !VramAddrMask::COARSE_X.bits()) | u16::from(cx & 0b1_1111);
    }

    /// Returns the coarse Y scroll component (0..31).
    #[inline]
    pub fn coarse_y(self) -> u8 {
        ((self.0 & VramAddrMask::COARSE_Y.bits()) >> COARSE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_coarse_y(&mut self, cy: u8) {
        self.0 = (self.0 & !VramAddrMask::COARSE_Y.bits())
            | (u16::from(cy & 0b1_1111) << COARSE_Y_SHIFT);
    }

    /// Returns the selected nametable (0..3).
    #[inline]
    pub fn nametable(self) -> u8 {
        ((self.0 & VramAddrMask::NAMETABLE.bits()) >> NAMETABLE_SHIFT) as u8
    }

    #[inline]
    pub fn set_nametable(&mut self, nt: u8) {
        self.0 =
            (self.0 & !VramAddrMask::NAMETABLE.bits()) | (u16::from(nt & 0b11) << NAMETABLE_SHIFT);
    }

    /// Returns the fine Y scroll component (0..7).
    #[inline]
    pub fn fine_y(self) -> u8 {
        ((self.0 & VramAddrMask::FINE_Y.bits()) >> FINE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_fine_y(&mut self, fy: u8) {
        self.0 = (self.0 & !VramAddrMask::FINE_Y.bits()) | (u16::from(fy & 0b111) << FINE_Y_SHIFT);
    }

    /// Returns the raw 15-bit value.
    #[inline]
    pub fn raw(self) -> u16 {
        self.0
    }

    /// Replaces the raw address, masking to 15 bits.
    #[inline]
    pub fn set_raw(&mut self, v: u16) {
        self.0 = v & VramAddrMask::ALL.bits();
    }

    /// The 14-bit address this register puts on the PPU bus.
    #[inline]
    pub fn bus_addr(self) -> u16 {
        self.0 & ppu_mem::VRAM_MIRROR_MASK
    }

    /// Nametable byte for the tile under this address: `0x2000 | (v & 0x0FFF)`.
    #[inline]
    pub fn tile_addr(self) -> u16 {
        ppu_mem::NAMETABLE_BASE | (self.0 & ppu_mem::NAMETABLE_OFFSET_MASK)
    }

    /// Attribute byte covering the tile under this address.
    #[inline]
    pub fn attribute_addr(self) -> u16 {
        ppu_mem::ATTRIBUTE_BASE
            | (self.0 & VramAddrMask::NAMETABLE.bits())
            | ((self.0 >> 4) & 0x38)
            | ((self.0 >> 2) & 0x07)
    }

    /// Shift selecting the 2-bit quadrant of the attribute byte.
    #[inline]
    pub fn attribute_shift(self) -> u8 {
        (((self.0 >> 4) & 0x04) | (self.0 & 0x02)) as u8
    }

    /// Increments the raw internal 15-bit address (`$2007` auto-increment).
    #[inline]
    pub fn increment(&mut self, step: u16) {
        self.0 = (self.0 + step) & VramAddrMask::ALL.bits();
    }

    /// Coarse X increment; wrapping past column 31 flips the horizontal nametable.
    #[inline]
    pub fn clock_x(&mut self) {
        if self.coarse_x() == 31 {
            self.0 &= !VramAddrMask::COARSE_X.bits();
            self.0 ^= VramAddrMask::NAMETABLE_X.bits();
        } else {
            self.0 += 1;
        }
    }

    /// Fine/coarse Y increment at the end of a rendered line.
    ///
    /// Row 29 is the last tile row of a nametable, so wrapping there flips the
    /// vertical nametable. Rows 30 and 31 address attribute bytes; wrapping from
    /// 31 returns to row 0 of the same nametable.
    #[inline]
    pub fn clock_y(&mut self) {
        let fine_y = self.fine_y();
        if fine_y < 7 {
            self.set_fine_y(fine_y + 1);
            return;
        }
        self.set_fine_y(0);
        match self.coarse_y() {
            29 => {
                self.set_coarse_y(0);
                self.0 ^= VramAddrMask::NAMETABLE_Y.bits();
            }
            31 => self.set_coarse_y(0),
            cy => self.set_coarse_y(cy + 1),
        }
    }

    /// Copies the horizontal position (coarse X + nametable X) from `t`.
    #[inline]
    pub fn reset_x(&mut self, t: VramAddr) {
        let mask = VramAddrMask::HORIZONTAL.bits();
        self.0 = (self.0 & !mask) | (t.0 & mask);
    }

    /// Copies all of `t`.
    #[inline]
    pub fn reset_y(&mut self, t: VramAddr) {
        self.0 = t.0;
    }
}

impl core::fmt::Debug for VramAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VramAddr")
            .field("raw", &format_args!("{:#06X}", self.0))
            .field("fine_y", &self.fine_y())
            .field("nametable", &self.nametable())
            .field("coarse_y", &self.coarse_y())
            .field("coarse_x", &self.coarse_x())
            .finish()
    }
}

impl core::fmt::Display for VramAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "raw={:#06X} fy={} nt={} cy={} cx={}",
            self.0,
            self.fine_y(),
            self.nametable(),
            self.coarse_y(),
            self.coarse_x(),
        )
    }
}

impl From<u16> for VramAddr {
    #[inline]
    fn from(v: u16) -> Self {
        VramAddr(v & VramAddrMask::ALL.bits())
    }
}

impl From<VramAddr> for u16 {
    #[inline]
    fn from(v: VramAddr) -> Self {
        v.raw()
    }
}
