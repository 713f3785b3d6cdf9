use bitflags::bitflags;
#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// Attribute bits stored in sprite byte 2.
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    /// - `V`: Vertical flip
    /// - `H`: Horizontal flip
    /// - `P`: Priority (behind background when set)
    /// - `p`: Sprite palette select (0..=3)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct SpriteAttributes: u8 {
        const PALETTE = 0b0000_0011;
        /// When set, sprite is drawn behind the background.
        const PRIORITY_BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl SpriteAttributes {
    #[inline]
    pub(crate) fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }
}

/// One secondary-OAM slot for the next scanline.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SecondarySprite {
    pub(crate) y: u8,
    pub(crate) tile: u8,
    pub(crate) attribute: u8,
    pub(crate) x: u8,
    /// Copied from OAM entry 0.
    pub(crate) is_sprite_zero: bool,
}

impl SecondarySprite {
    /// Cleared slot: `y = 0xFF` never matches a rendered line.
    pub(crate) const EMPTY: Self = Self {
        y: 0xFF,
        tile: 0xFF,
        attribute: 0xFF,
        x: 0xFF,
        is_sprite_zero: false,
    };

    #[inline]
    pub(crate) fn attributes(&self) -> SpriteAttributes {
        SpriteAttributes::from_bits_retain(self.attribute)
    }

    /// Address of the low pattern plane for `row` (0-based, already known to
    /// be inside the sprite).
    pub(crate) fn pattern_addr(&self, row: u16, height: u16, table_8x8: u16) -> u16 {
        let mut row = row & (height - 1);
        if self.attributes().contains(SpriteAttributes::FLIP_VERTICAL) {
            row = height - 1 - row;
        }
        if height == 16 {
            let bank = u16::from(self.tile & 1) * 0x1000;
            let mut tile = u16::from(self.tile & 0xFE);
            if row >= 8 {
                tile += 1;
            }
            bank | (tile << 4) | (row & 7)
        } else {
            table_8x8 | (u16::from(self.tile) << 4) | row
        }
    }
}

impl Default for SecondarySprite {
    fn default() -> Self {
        Self::EMPTY
    }
}
