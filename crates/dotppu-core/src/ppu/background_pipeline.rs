#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use super::{address_bus::AddressBus, registers::VramAddr};
use crate::{board::Board, mem_block::BackgroundLine};

/// Bytes fetched for the tile currently moving through the 8-dot cell.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct FetchLatch {
    pub(crate) nametable: u8,
    /// Attribute quadrant already shifted down to bits 0-1.
    pub(crate) attribute: u8,
    pub(crate) pattern_low: u8,
    pub(crate) pattern_high: u8,
    /// Pattern address of the low plane, held between the two plane fetches.
    pub(crate) pattern_addr: u16,
}

/// Background half of the renderer.
///
/// Instead of four shift registers, each tile row is decoded straight into a
/// line buffer once its high plane lands. Pixel `x` of the line sits at
/// `line[x + fine_x]`:
///
/// - indices `0..16` hold the two tiles prefetched at dots 320..336 of the
///   previous line,
/// - indices `16..272` hold the tiles fetched at dots 0..256.
///
/// Entries are `attribute << 2 | color`; color 0 is transparent.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct BackgroundPipeline {
    pub(crate) latch: FetchLatch,
    line: BackgroundLine,
}

impl BackgroundPipeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.latch = FetchLatch::default();
        self.line.fill(0);
    }

    /// Background entry for screen column `x`.
    #[inline]
    pub(crate) fn pixel(&self, x: u16, fine_x: u8) -> u8 {
        self.line[usize::from(x) + usize::from(fine_x & 0b111)]
    }

    /// One dot of the nametable/attribute/pattern fetch cell. Called for
    /// `h` in `[0, 256)` and `[320, 336)`.
    pub(crate) fn fetch(
        &mut self,
        h: u16,
        v: &mut VramAddr,
        pattern_base: u16,
        bus: &mut AddressBus,
        board: &mut dyn Board,
    ) {
        match h & 7 {
            0 => bus.drive(board, v.tile_addr()),
            1 => self.latch.nametable = bus.read_nametable(board, v.tile_addr()),
            2 => bus.drive(board, v.attribute_addr()),
            3 => {
                let byte = bus.read_nametable(board, v.attribute_addr());
                self.latch.attribute = (byte >> v.attribute_shift()) & 0b11;
                // Row latched before the increment; at 251 fine Y moves on.
                self.latch.pattern_addr =
                    pattern_base | (u16::from(self.latch.nametable) << 4) | u16::from(v.fine_y());
                if h == 251 {
                    v.clock_y();
                } else {
                    v.clock_x();
                }
            }
            4 => bus.drive(board, self.latch.pattern_addr),
            5 => self.latch.pattern_low = bus.read_chr(board, self.latch.pattern_addr),
            6 => bus.drive(board, self.latch.pattern_addr + 8),
            _ => {
                self.latch.pattern_high = bus.read_chr(board, self.latch.pattern_addr + 8);
                self.store_tile(Self::slot_for(h));
            }
        }
    }

    /// The two unused nametable fetches at dots 336..340.
    pub(crate) fn dummy_fetch(
        &mut self,
        h: u16,
        v: VramAddr,
        bus: &mut AddressBus,
        board: &mut dyn Board,
    ) {
        if h & 1 == 0 {
            bus.drive(board, v.tile_addr());
        } else {
            self.latch.nametable = bus.read_nametable(board, v.tile_addr());
        }
    }

    fn slot_for(h: u16) -> usize {
        let cell = usize::from(h & !7);
        if h >= 320 { cell - 320 } else { cell + 16 }
    }

    fn store_tile(&mut self, start: usize) {
        let FetchLatch {
            attribute,
            pattern_low,
            pattern_high,
            ..
        } = self.latch;
        let palette = attribute << 2;
        for (i, px) in self.line[start..start + 8].iter_mut().enumerate() {
            let shift = 7 - i;
            let color = (((pattern_high >> shift) & 1) << 1) | ((pattern_low >> shift) & 1);
            *px = palette | color;
        }
    }
}
