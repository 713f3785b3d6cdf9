#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::memory::ppu::OAM_RAM_SIZE;

/// Progress of a `$4014` transfer.
///
/// The PPU only tracks which byte comes next. When the host CPU actually
/// performs each read, and how many cycles it gives up, is the CPU's business.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct OamDma {
    page: u8,
    offset: u16,
}

impl OamDma {
    pub(crate) fn new(page: u8) -> Self {
        Self { page, offset: 0 }
    }

    pub(crate) fn page(self) -> u8 {
        self.page
    }

    /// Host address of the next byte.
    pub(crate) fn source(self) -> u16 {
        (u16::from(self.page) << 8) | self.offset
    }

    /// Marks one byte as transferred; returns `false` once all 256 are done.
    pub(crate) fn advance(&mut self) -> bool {
        self.offset += 1;
        usize::from(self.offset) < OAM_RAM_SIZE
    }
}
