#![allow(dead_code)]

use anyhow::{Result, bail};
use ctor::ctor;
use dotppu_core::{
    CiramBoard, CpuSignals, FrameBuffer, FrameSink, Interrupt, Mirroring, Ppu, PpuBus, PpuConfig,
    Region, ResetKind, Stall,
};

#[ctor]
fn init_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Generous upper bound for one frame (PAL/Dendy lines plus slack).
pub const MAX_FRAME_DOTS: u64 = 320 * 341;

/// CPU stand-in that logs every line transition and stall request.
#[derive(Debug, Default)]
pub struct RecordingCpu {
    pub levels: Vec<bool>,
    pub stalls: Vec<Stall>,
}

impl CpuSignals for RecordingCpu {
    fn interrupt(&mut self, kind: Interrupt, level: bool) {
        assert_eq!(kind, Interrupt::Ppu);
        self.levels.push(level);
    }

    fn request_stall(&mut self, kind: Stall) {
        self.stalls.push(kind);
    }
}

/// Keeps a copy of the most recent frame.
#[derive(Debug, Default)]
pub struct FrameLog {
    pub frames: u64,
    pub last: Vec<u16>,
}

impl FrameSink for FrameLog {
    fn frame_ready(&mut self, frame: &FrameBuffer) {
        self.frames += 1;
        self.last.clear();
        self.last.extend_from_slice(frame.pixels());
    }
}

impl FrameLog {
    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        self.last[y * FrameBuffer::WIDTH + x]
    }
}

/// A PPU wired to a CIRAM board, a recording CPU and a frame log.
pub struct Rig {
    pub ppu: Ppu,
    pub board: CiramBoard,
    pub cpu: RecordingCpu,
    pub video: FrameLog,
    /// `(scanline, dot)` at which each rising NMI edge was observed.
    pub nmi_rises: Vec<(u16, u16)>,
}

impl Rig {
    pub fn new(region: Region) -> Self {
        Self {
            ppu: Ppu::new(PpuConfig::new(region)),
            board: CiramBoard::new(Mirroring::Vertical),
            cpu: RecordingCpu::default(),
            video: FrameLog::default(),
            nmi_rises: Vec::new(),
        }
    }

    pub fn ntsc() -> Self {
        Self::new(Region::Ntsc)
    }

    pub fn step(&mut self) {
        let seen = self.cpu.levels.len();
        let mut bus = PpuBus::new(&mut self.board, &mut self.cpu, &mut self.video);
        self.ppu.step(&mut bus);
        if self.cpu.levels[seen..].contains(&true) {
            self.nmi_rises.push((self.ppu.scanline(), self.ppu.dot()));
        }
    }

    /// Steps until the dot clock reads `(scanline, dot)`.
    pub fn run_to(&mut self, scanline: u16, dot: u16) -> Result<()> {
        for _ in 0..MAX_FRAME_DOTS {
            if (self.ppu.scanline(), self.ppu.dot()) == (scanline, dot) {
                return Ok(());
            }
            self.step();
        }
        bail!("never reached scanline {scanline} dot {dot}");
    }

    /// Steps until the next frame completes; returns the dots it took.
    pub fn run_frame(&mut self) -> Result<u64> {
        let target = self.ppu.frame_count() + 1;
        let mut dots = 0;
        while self.ppu.frame_count() < target {
            if dots >= MAX_FRAME_DOTS {
                bail!("frame {target} did not complete within {MAX_FRAME_DOTS} dots");
            }
            self.step();
            dots += 1;
        }
        Ok(dots)
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        let mut bus = PpuBus::new(&mut self.board, &mut self.cpu, &mut self.video);
        self.ppu.cpu_read(addr, &mut bus)
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let mut bus = PpuBus::new(&mut self.board, &mut self.cpu, &mut self.video);
        self.ppu.cpu_write(addr, value, &mut bus);
    }

    pub fn reset(&mut self, kind: ResetKind) {
        let mut bus = PpuBus::new(&mut self.board, &mut self.cpu, &mut self.video);
        self.ppu.reset(kind, &mut bus);
    }

    pub fn set_addr(&mut self, addr: u16) {
        self.write(0x2006, (addr >> 8) as u8);
        self.write(0x2006, addr as u8);
    }

    /// Writes `bytes` through `$2007` starting at `addr`.
    pub fn write_vram(&mut self, addr: u16, bytes: &[u8]) {
        self.set_addr(addr);
        for &byte in bytes {
            self.write(0x2007, byte);
        }
    }

    /// Points `t` at the top-left of nametable 0 with no fine scroll.
    pub fn reset_scroll(&mut self, ctrl: u8) {
        self.write(0x2000, ctrl & 0xFC);
        self.write(0x2005, 0);
        self.write(0x2005, 0);
    }

    /// Stores a solid 8x8 tile of `color` (1..=3) at `tile` in pattern table `table`.
    pub fn solid_tile(&mut self, table: u16, tile: u8, color: u8) {
        let base = usize::from(table) + usize::from(tile) * 16;
        let chr = self.board.chr_mut();
        let low = if color & 1 != 0 { 0xFF } else { 0x00 };
        let high = if color & 2 != 0 { 0xFF } else { 0x00 };
        chr[base..base + 8].fill(low);
        chr[base + 8..base + 16].fill(high);
    }

    /// Fills all of nametable 0 (tiles, not attributes) with `tile`.
    pub fn fill_nametable(&mut self, tile: u8) {
        for offset in 0..960 {
            self.board.poke_nametable(0x2000 + offset, tile);
        }
    }

    /// Writes OAM entry `index` through `$2003/$2004`.
    pub fn set_sprite(&mut self, index: u8, y: u8, tile: u8, attribute: u8, x: u8) {
        self.write(0x2003, index * 4);
        for byte in [y, tile, attribute, x] {
            self.write(0x2004, byte);
        }
    }

    /// Moves every sprite off screen.
    pub fn hide_sprites(&mut self) {
        self.write(0x2003, 0);
        for _ in 0..256 {
            self.write(0x2004, 0xFF);
        }
    }

    pub fn status(&mut self) -> u8 {
        self.read(0x2002)
    }
}
