use bitflags::bitflags;

bitflags! {
    /// PPU status register (`$2002`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V S O . . . . .
    /// ```
    /// - `V`: Vertical blank flag (`nmi_occurred`)
    /// - `S`: Sprite zero hit
    /// - `O`: Sprite overflow flag
    ///
    /// The low five bits are not driven and read back as open bus.
    #[cfg_attr(
        feature = "savestate-serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        const VERTICAL_BLANK = 0b1000_0000;
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::empty()
    }
}

impl Status {
    /// Bits actually driven by `$2002` reads.
    pub(crate) const DRIVEN: u8 = 0b1110_0000;
}
