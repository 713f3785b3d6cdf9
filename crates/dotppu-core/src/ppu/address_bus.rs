#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::{board::Board, memory::ppu as ppu_mem};

/// Tracks the value currently driven on the 14-bit PPU address bus.
///
/// Boards only hear about transitions: driving the same address twice in a
/// row produces a single `update_address_lines` call. Every fetch helper drives
/// the bus before touching storage, so a bank switch triggered by the
/// notification is visible to the access that follows it.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct AddressBus {
    value: u16,
}

impl AddressBus {
    pub(crate) fn reset(&mut self) {
        self.value = 0;
    }

    #[inline]
    pub(crate) fn value(self) -> u16 {
        self.value
    }

    /// Puts `addr` on the bus, notifying the board when the value changes.
    #[inline]
    pub(crate) fn drive(&mut self, board: &mut dyn Board, addr: u16) {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        if addr != self.value {
            self.value = addr;
            board.update_address_lines(addr);
        }
    }

    /// Nametable read through the current bus value.
    #[inline]
    pub(crate) fn read_nametable(&mut self, board: &mut dyn Board, addr: u16) -> u8 {
        self.drive(board, addr);
        board.read_nametable(addr & ppu_mem::NAMETABLE_SPACE_MASK)
    }

    /// Pattern-table read through the current bus value.
    #[inline]
    pub(crate) fn read_chr(&mut self, board: &mut dyn Board, addr: u16) -> u8 {
        self.drive(board, addr);
        board.read_chr(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CiramBoard, Mirroring};

    #[test]
    fn only_transitions_reach_the_board() {
        let mut board = CiramBoard::new(Mirroring::Vertical);
        board.record_address_lines(true);
        let mut bus = AddressBus::default();
        bus.drive(&mut board, 0x1000);
        bus.drive(&mut board, 0x1000);
        bus.drive(&mut board, 0x5008);
        assert_eq!(board.address_lines(), &[0x1000, 0x1008]);
        assert_eq!(bus.value(), 0x1008);
    }

    #[test]
    fn nametable_reads_fold_into_nametable_space() {
        let mut board = CiramBoard::new(Mirroring::Horizontal);
        board.poke_nametable(0x2042, 0x99);
        let mut bus = AddressBus::default();
        assert_eq!(bus.read_nametable(&mut board, 0x3042), 0x99);
        assert_eq!(bus.value(), 0x3042);
    }
}
