//! Shared definitions for the PPU side of the memory map.
//!
//! Centralizing address-related constants keeps the hardware layout in one
//! location and keeps magic numbers out of the pipelines.

/// PPU register layout, VRAM regions and buffer geometry.
pub mod ppu {
    /// First CPU-visible PPU register address.
    pub const REGISTER_BASE: u16 = 0x2000;
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;
    /// CPU address of the OAM DMA trigger (`$4014`).
    pub const OAM_DMA: u16 = 0x4014;

    /// Mask applied to every PPU bus address (14-bit bus).
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Base address of nametable 0.
    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// Nametable window offset mask (4 KiB of nametables below `$3000`).
    pub const NAMETABLE_OFFSET_MASK: u16 = 0x0FFF;
    /// Mask folding any address into `$2000-$2FFF`.
    pub const NAMETABLE_SPACE_MASK: u16 = 0x2FFF;
    /// Size of a single nametable in bytes.
    pub const NAMETABLE_SIZE: u16 = 0x0400;
    /// Attribute table base inside a nametable.
    pub const ATTRIBUTE_BASE: u16 = 0x23C0;

    /// Palette RAM base address (`$3F00`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Palette RAM byte count (32 bytes mirrored every 32 bytes).
    pub const PALETTE_RAM_SIZE: usize = 0x20;
    /// Mask selecting the palette entry from a bus address.
    pub const PALETTE_INDEX_MASK: u16 = 0x001F;

    /// Pattern table base address for table 0.
    pub const PATTERN_TABLE_0: u16 = 0x0000;
    /// Pattern table base address for table 1.
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    /// End of CHR space (exclusive).
    pub const CHR_END: u16 = 0x2000;

    /// Size of the internal Character Internal RAM (CIRAM) used for nametables.
    pub const CIRAM_SIZE: usize = 0x0800;
    /// Total size of both pattern tables (`$0000-$1FFF`).
    pub const CHR_SIZE: usize = 0x2000;

    /// Primary Object Attribute Memory (OAM) byte count.
    pub const OAM_RAM_SIZE: usize = 0x100;
    /// Sprites held in secondary OAM per scanline.
    pub const SECONDARY_OAM_SLOTS: usize = 8;

    /// Visible frame width in pixels.
    pub const SCREEN_WIDTH: usize = 256;
    /// Visible frame height in pixels.
    pub const SCREEN_HEIGHT: usize = 240;
    /// Background line buffer: 256 visible pixels plus two prefetched tiles.
    pub const BACKGROUND_LINE_WIDTH: usize = SCREEN_WIDTH + 16;

    /// Dots per regular scanline.
    pub const DOTS_PER_SCANLINE: u16 = 341;

    /// CPU-visible PPU register identifiers.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control = 0x2000,
        /// `$2001` - PPUMASK
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS
        Status = 0x2002,
        /// `$2003` - OAMADDR
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA
        OamData = 0x2004,
        /// `$2005` - PPUSCROLL
        Scroll = 0x2005,
        /// `$2006` - PPUADDR
        Addr = 0x2006,
        /// `$2007` - PPUDATA
        Data = 0x2007,
    }

    impl Register {
        /// Raw address backing the register.
        pub const fn addr(self) -> u16 {
            self as u16
        }

        /// Resolves the canonical register for a CPU address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}
