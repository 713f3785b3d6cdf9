#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use super::{
    address_bus::AddressBus,
    registers::VramAddr,
    sprite::{SecondarySprite, SpriteAttributes},
};
use crate::{
    board::Board,
    mem_block::SpriteLine,
    memory::ppu::{SCREEN_WIDTH, SECONDARY_OAM_SLOTS},
};

/// Set on pixels that belong to OAM entry 0.
pub(crate) const SPRITE_ZERO_BIT: u16 = 1 << 14;
/// Set on pixels whose sprite is drawn in front of the background.
pub(crate) const FRONT_BIT: u16 = 1 << 15;
/// Palette address (`0x10 | palette << 2 | color`) in the low bits.
pub(crate) const PALETTE_ADDR_MASK: u16 = 0x1F;

/// What an unused slot fetches: tile `0xFF`, row 0.
const UNUSED_SLOT: SecondarySprite = SecondarySprite {
    attribute: 0,
    ..SecondarySprite::EMPTY
};

/// Sprite half of the renderer: pattern fetches for the eight selected slots
/// during dots 256..320, decoded into a line buffer read on the next line.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct SpritePipeline {
    line: SpriteLine,
    pattern_addr: u16,
    pattern_low: u8,
}

/// Inputs of one sprite fetch dot.
pub(crate) struct SpriteFetch<'a> {
    pub(crate) h: u16,
    /// Line being evaluated; sprite rows are relative to it.
    pub(crate) line: u16,
    /// Fetched pixels are discarded on the pre-render line.
    pub(crate) store: bool,
    pub(crate) slots: &'a [SecondarySprite; SECONDARY_OAM_SLOTS],
    pub(crate) count: u8,
    pub(crate) height: u16,
    pub(crate) table_8x8: u16,
    pub(crate) v: VramAddr,
}

impl SpritePipeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.line.fill(0);
        self.pattern_addr = 0;
        self.pattern_low = 0;
    }

    /// Sprite entry for screen column `x`.
    #[inline]
    pub(crate) fn pixel(&self, x: u16) -> u16 {
        self.line[usize::from(x)]
    }

    pub(crate) fn fetch(&mut self, fetch: SpriteFetch<'_>, bus: &mut AddressBus, board: &mut dyn Board) {
        let SpriteFetch { h, line, store, slots, count, height, table_8x8, v } = fetch;
        if h == 256 {
            self.line.fill(0);
        }
        let index = usize::from((h - 256) >> 3);
        let active = index < usize::from(count);
        let sprite = if active { slots[index] } else { UNUSED_SLOT };

        match h & 7 {
            // Garbage nametable fetches.
            0 | 2 => bus.drive(board, v.tile_addr()),
            1 | 3 => {
                bus.read_nametable(board, v.tile_addr());
            }
            4 => {
                let row = if active {
                    line.wrapping_sub(u16::from(sprite.y))
                } else {
                    0
                };
                self.pattern_addr = sprite.pattern_addr(row, height, table_8x8);
                bus.drive(board, self.pattern_addr);
            }
            5 => self.pattern_low = bus.read_chr(board, self.pattern_addr),
            6 => bus.drive(board, self.pattern_addr + 8),
            _ => {
                let high = bus.read_chr(board, self.pattern_addr + 8);
                if active && store {
                    self.store_sprite(&sprite, self.pattern_low, high);
                }
            }
        }
    }

    fn store_sprite(&mut self, sprite: &SecondarySprite, mut low: u8, mut high: u8) {
        let attributes = sprite.attributes();
        if attributes.contains(SpriteAttributes::FLIP_HORIZONTAL) {
            low = low.reverse_bits();
            high = high.reverse_bits();
        }
        let mut flags = 0x10 | (u16::from(attributes.palette()) << 2);
        if sprite.is_sprite_zero {
            flags |= SPRITE_ZERO_BIT;
        }
        if !attributes.contains(SpriteAttributes::PRIORITY_BEHIND_BACKGROUND) {
            flags |= FRONT_BIT;
        }

        for i in 0..8usize {
            let x = usize::from(sprite.x) + i;
            if x >= SCREEN_WIDTH {
                break;
            }
            let shift = 7 - i;
            let color = (((high >> shift) & 1) << 1) | ((low >> shift) & 1);
            // Lower slots won; an opaque pixel already here stays.
            if color == 0 || self.line[x] & 0b11 != 0 {
                continue;
            }
            self.line[x] = flags | u16::from(color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CiramBoard, Mirroring};

    fn slot(y: u8, tile: u8, attribute: u8, x: u8, is_sprite_zero: bool) -> SecondarySprite {
        SecondarySprite {
            y,
            tile,
            attribute,
            x,
            is_sprite_zero,
        }
    }

    fn run(
        slots: &[SecondarySprite; SECONDARY_OAM_SLOTS],
        count: u8,
        line: u16,
        store: bool,
        board: &mut CiramBoard,
    ) -> SpritePipeline {
        let mut sprites = SpritePipeline::new();
        let mut bus = AddressBus::default();
        for h in 256..320 {
            let fetch = SpriteFetch {
                h,
                line,
                store,
                slots,
                count,
                height: 8,
                table_8x8: 0x0000,
                v: VramAddr::default(),
            };
            sprites.fetch(fetch, &mut bus, board);
        }
        sprites
    }

    fn board() -> CiramBoard {
        let mut board = CiramBoard::new(Mirroring::Vertical);
        // Tile 2, row 1: leftmost pixel color 1, rightmost color 2.
        board.chr_mut()[0x0021] = 0b1000_0000;
        board.chr_mut()[0x0029] = 0b0000_0001;
        // Tile 3, row 1: solid color 3.
        board.chr_mut()[0x0031] = 0xFF;
        board.chr_mut()[0x0039] = 0xFF;
        board
    }

    #[test]
    fn decodes_row_with_priority_and_zero_flags() {
        let mut board = board();
        let mut slots = [SecondarySprite::EMPTY; SECONDARY_OAM_SLOTS];
        slots[0] = slot(9, 2, 0b0000_0001, 100, true);
        let sprites = run(&slots, 1, 10, true, &mut board);
        assert_eq!(sprites.pixel(100), FRONT_BIT | SPRITE_ZERO_BIT | 0x15);
        assert_eq!(sprites.pixel(101), 0);
        assert_eq!(sprites.pixel(107), FRONT_BIT | SPRITE_ZERO_BIT | 0x16);
    }

    #[test]
    fn horizontal_flip_and_background_priority() {
        let mut board = board();
        let mut slots = [SecondarySprite::EMPTY; SECONDARY_OAM_SLOTS];
        slots[0] = slot(9, 2, 0b0110_0000, 0, false);
        let sprites = run(&slots, 1, 10, true, &mut board);
        assert_eq!(sprites.pixel(0), 0x12);
        assert_eq!(sprites.pixel(7), 0x11);
    }

    #[test]
    fn lower_slot_wins_overlap() {
        let mut board = board();
        let mut slots = [SecondarySprite::EMPTY; SECONDARY_OAM_SLOTS];
        slots[0] = slot(9, 2, 0, 10, false);
        slots[1] = slot(9, 3, 0b0000_0011, 10, false);
        let sprites = run(&slots, 2, 10, true, &mut board);
        assert_eq!(sprites.pixel(10) & PALETTE_ADDR_MASK, 0x11);
        // Transparent in slot 0, so slot 1 shows through.
        assert_eq!(sprites.pixel(11) & PALETTE_ADDR_MASK, 0x1F);
    }

    #[test]
    fn clips_at_the_right_edge() {
        let mut board = board();
        let mut slots = [SecondarySprite::EMPTY; SECONDARY_OAM_SLOTS];
        slots[0] = slot(9, 3, 0, 252, false);
        let sprites = run(&slots, 1, 10, true, &mut board);
        assert!((252..256).all(|x| sprites.pixel(x) & 0b11 == 3));
    }

    #[test]
    fn empty_slots_fetch_tile_ff_and_pre_render_stores_nothing() {
        let mut board = board();
        board.record_address_lines(true);
        let mut slots = [SecondarySprite::EMPTY; SECONDARY_OAM_SLOTS];
        slots[0] = slot(9, 3, 0, 0, false);
        let sprites = run(&slots, 1, 10, false, &mut board);
        assert!((0..8).all(|x| sprites.pixel(x) == 0));
        assert!(board.address_lines().contains(&0x0FF0));
    }
}
