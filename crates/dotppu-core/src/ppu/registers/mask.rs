use bitflags::bitflags;

bitflags! {
    /// PPU mask register (`$2001`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// B G R S B s b g
    /// ```
    /// - `g`: grayscale
    /// - `b`: show background in leftmost 8 pixels
    /// - `s`: show sprites in leftmost 8 pixels
    /// - `B`: background enable
    /// - `S`: sprite enable
    /// - `R/G/B`: color emphasis bits
    #[cfg_attr(
        feature = "savestate-serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Mask: u8 {
        const GRAYSCALE = 0b0000_0001;
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        const SHOW_BACKGROUND = 0b0000_1000;
        const SHOW_SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::empty()
    }
}

impl Mask {
    /// Returns `true` when either background or sprite rendering is enabled.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }

    pub(crate) fn background_enabled(self) -> bool {
        self.contains(Mask::SHOW_BACKGROUND)
    }

    pub(crate) fn sprites_enabled(self) -> bool {
        self.contains(Mask::SHOW_SPRITES)
    }

    /// Whether a background pixel at screen column `x` survives left clipping.
    pub(crate) fn background_visible_at(self, x: u16) -> bool {
        self.background_enabled() && (x >= 8 || self.contains(Mask::SHOW_BACKGROUND_LEFT))
    }

    /// Whether a sprite pixel at screen column `x` survives left clipping.
    pub(crate) fn sprites_visible_at(self, x: u16) -> bool {
        self.sprites_enabled() && (x >= 8 || self.contains(Mask::SHOW_SPRITES_LEFT))
    }

    /// Mask applied to output color indices (`0x30` in grayscale mode).
    pub(crate) fn color_mask(self) -> u8 {
        if self.contains(Mask::GRAYSCALE) {
            0x30
        } else {
            0x3F
        }
    }

    /// Emphasis bits packed as `BGR` in bits 0-2.
    pub(crate) fn emphasis(self) -> u8 {
        self.bits() >> 5
    }
}
