//! Reference board: 8 KiB CHR RAM plus the console's 2 KiB CIRAM.
//!
//! This is the smallest thing that satisfies [`Board`]: no banking, fixed
//! mirroring. It also keeps a log of what the PPU told it, which makes it handy
//! for tests that need to observe address-line traffic.

use crate::{
    board::Board,
    memory::ppu::{self as ppu_mem, CHR_SIZE, CIRAM_SIZE},
};

/// Nametable layout for the CIRAM window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirroring {
    /// `$2000`/`$2400` share a page, `$2800`/`$2C00` share the other.
    Horizontal,
    /// `$2000`/`$2800` share a page, `$2400`/`$2C00` share the other.
    Vertical,
    /// Every nametable maps to the first CIRAM page.
    SingleScreenLower,
    /// Every nametable maps to the second CIRAM page.
    SingleScreenUpper,
}

impl Mirroring {
    /// Maps a `$2000-$2FFF` address to a CIRAM offset.
    pub fn ciram_offset(self, addr: u16) -> usize {
        let offset = addr & ppu_mem::NAMETABLE_OFFSET_MASK;
        let table = offset / ppu_mem::NAMETABLE_SIZE;
        let within = (offset % ppu_mem::NAMETABLE_SIZE) as usize;
        let page = match self {
            Mirroring::Horizontal => (table >> 1) & 1,
            Mirroring::Vertical => table & 1,
            Mirroring::SingleScreenLower => 0,
            Mirroring::SingleScreenUpper => 1,
        } as usize;
        page * ppu_mem::NAMETABLE_SIZE as usize + within
    }
}

#[derive(Debug, Clone)]
pub struct CiramBoard {
    chr: Box<[u8]>,
    ciram: Box<[u8]>,
    mirroring: Mirroring,
    address_lines: Vec<u16>,
    record_address_lines: bool,
    scanline_ticks: u64,
}

impl CiramBoard {
    pub fn new(mirroring: Mirroring) -> Self {
        Self {
            chr: vec![0; CHR_SIZE].into_boxed_slice(),
            ciram: vec![0; CIRAM_SIZE].into_boxed_slice(),
            mirroring,
            address_lines: Vec::new(),
            record_address_lines: false,
            scanline_ticks: 0,
        }
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    /// Direct CHR access for loading tile data without going through the PPU.
    pub fn chr_mut(&mut self) -> &mut [u8] {
        &mut self.chr
    }

    pub fn chr(&self) -> &[u8] {
        &self.chr
    }

    /// Direct nametable access (`addr` in `$2000-$2FFF`, mirrored).
    pub fn poke_nametable(&mut self, addr: u16, value: u8) {
        let idx = self.mirroring.ciram_offset(addr);
        self.ciram[idx] = value;
    }

    pub fn peek_nametable(&self, addr: u16) -> u8 {
        self.ciram[self.mirroring.ciram_offset(addr)]
    }

    /// Starts (or stops) keeping every address-line update.
    pub fn record_address_lines(&mut self, enabled: bool) {
        self.record_address_lines = enabled;
        if !enabled {
            self.address_lines.clear();
        }
    }

    /// Address-line updates seen since recording was enabled.
    pub fn address_lines(&self) -> &[u16] {
        &self.address_lines
    }

    pub fn take_address_lines(&mut self) -> Vec<u16> {
        core::mem::take(&mut self.address_lines)
    }

    pub fn scanline_ticks(&self) -> u64 {
        self.scanline_ticks
    }
}

impl Board for CiramBoard {
    fn update_address_lines(&mut self, addr: u16) {
        debug_assert!(addr <= ppu_mem::VRAM_MIRROR_MASK);
        if self.record_address_lines {
            self.address_lines.push(addr);
        }
    }

    fn scanline_tick(&mut self) {
        self.scanline_ticks += 1;
    }

    fn read_nametable(&mut self, addr: u16) -> u8 {
        self.peek_nametable(addr)
    }

    fn write_nametable(&mut self, addr: u16, data: u8) {
        self.poke_nametable(addr, data);
    }

    fn read_chr(&mut self, addr: u16) -> u8 {
        self.chr[(addr as usize) & (CHR_SIZE - 1)]
    }

    fn write_chr(&mut self, addr: u16, data: u8) {
        self.chr[(addr as usize) & (CHR_SIZE - 1)] = data;
    }
}
