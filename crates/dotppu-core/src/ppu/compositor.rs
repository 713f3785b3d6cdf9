//! Background/sprite priority resolution for one visible dot.

use super::{
    registers::Mask,
    sprite_pipeline::{FRONT_BIT, PALETTE_ADDR_MASK, SPRITE_ZERO_BIT},
};

/// Result of mixing one dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Composite {
    /// Palette RAM address (`0x00..0x1F`) to display.
    pub(crate) palette_addr: u8,
    pub(crate) sprite_zero_hit: bool,
}

/// Mixes the background entry `bg` (`attribute << 2 | color`) and the sprite
/// entry `sprite` at screen column `x`.
pub(crate) fn compose(bg: u8, sprite: u16, mask: Mask, x: u16) -> Composite {
    let bg = if mask.background_visible_at(x) { bg } else { 0 };
    let sprite = if mask.sprites_visible_at(x) { sprite } else { 0 };

    let bg_opaque = bg & 0b11 != 0;
    let sprite_opaque = sprite & 0b11 != 0;
    let sprite_addr = (sprite & PALETTE_ADDR_MASK) as u8;

    let palette_addr = match (bg_opaque, sprite_opaque) {
        (false, false) => 0,
        (false, true) => sprite_addr,
        (true, false) => bg,
        (true, true) if sprite & FRONT_BIT == 0 => bg,
        (true, true) => sprite_addr,
    };

    Composite {
        palette_addr,
        sprite_zero_hit: bg_opaque && sprite_opaque && sprite & SPRITE_ZERO_BIT != 0 && x < 255,
    }
}
