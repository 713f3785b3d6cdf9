//! Picture Processing Unit (PPU) core.
//!
//! The NES PPU exposes eight CPU-facing registers between `$2000` and `$2007`
//! and renders one pixel per dot. [`Ppu::step`] advances exactly one dot and
//! dispatches the background fetch, sprite evaluation, sprite fetch and
//! compositing work scheduled for that `(dot, scanline)` position:
//!
//! ```text
//! dot       0 ........ 255 256 .... 319 320 .. 335 336 .. 339 340
//! visible   bg fetch + pixel  sprite fetch  bg prefetch  dummy NT
//!           sprite eval (0..256)
//! ```
//!
//! The same fetches run on the pre-render line (without pixel output or
//! sprite evaluation) so that the first two tiles of line 0 are ready and the
//! board sees the same address-bus traffic as on a rendered line.

mod address_bus;
mod background_pipeline;
mod compositor;
mod dot_clock;
mod frame;
mod nmi_debug_state;
mod oam_dma;
mod open_bus;
mod palette;
mod registers;
mod sprite;
mod sprite0_hit_debug;
mod sprite_eval;
mod sprite_pipeline;

use core::fmt;

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use frame::FrameBuffer;
pub use nmi_debug_state::NmiDebugState;
pub use registers::VramAddr;
pub use sprite0_hit_debug::{Sprite0HitDebug, Sprite0HitPos};

use crate::{
    board::{Board, CpuSignals, Interrupt, PpuBus, Stall},
    config::{
        PpuConfig,
        region::{Region, Timing},
    },
    memory::ppu::{self as ppu_mem, Register as PpuRegister},
    reset_kind::ResetKind,
};
use address_bus::AddressBus;
use background_pipeline::BackgroundPipeline;
use compositor::{Composite, compose};
use dot_clock::{Advance, DotClock};
use oam_dma::OamDma;
use open_bus::OpenBus;
use palette::{PALETTE_VALUE_MASK, Palette};
use registers::{Mask, Registers, Status};
use sprite_eval::{EvalEvent, SpriteEvaluator};
use sprite_pipeline::{SpriteFetch, SpritePipeline};

const VISIBLE_LINES: u16 = ppu_mem::SCREEN_HEIGHT as u16;
const VISIBLE_DOTS: u16 = ppu_mem::SCREEN_WIDTH as u16;

/// Dot-stepped PPU.
///
/// A clone is a complete snapshot, including the half-fetched tile and the
/// evaluator position, so restoring one mid-scanline resumes exactly.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Clone)]
pub struct Ppu {
    region: Region,
    timing: Timing,
    /// Collection of CPU visible registers and their helper latches.
    registers: Registers,
    palette: Palette,
    open_bus: OpenBus,
    clock: DotClock,
    /// Level last reported to the CPU through [`CpuSignals::interrupt`].
    nmi_line: bool,
    /// Set by a `$2002` read one dot before VBlank would start.
    suppress_vblank: bool,
    address_bus: AddressBus,
    background: BackgroundPipeline,
    evaluator: SpriteEvaluator,
    sprites: SpritePipeline,
    oam_dma: Option<OamDma>,
    frame_count: u64,
    sprite0_hit: Option<Sprite0HitDebug>,
    #[cfg_attr(feature = "savestate-serde", serde(skip))]
    frame: FrameBuffer,
}

impl fmt::Debug for Ppu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ppu")
            .field("region", &self.region)
            .field("control", &self.registers.control)
            .field("mask", &self.registers.mask)
            .field("status", &self.registers.status)
            .field("v", &self.registers.vram.v)
            .field("t", &self.registers.vram.t)
            .field("scanline", &self.clock.v)
            .field("dot", &self.clock.h)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

impl Ppu {
    /// Creates a PPU in its power-on state.
    pub fn new(config: PpuConfig) -> Self {
        let timing = config.region.timing();
        debug!(region = %config.region, ?timing, "ppu created");
        Self {
            region: config.region,
            timing,
            registers: Registers::new(),
            palette: Palette::new(),
            open_bus: OpenBus::new(),
            clock: DotClock::default(),
            nmi_line: false,
            suppress_vblank: false,
            address_bus: AddressBus::default(),
            background: BackgroundPipeline::new(),
            evaluator: SpriteEvaluator::new(),
            sprites: SpritePipeline::new(),
            oam_dma: None,
            frame_count: 0,
            sprite0_hit: None,
            frame: FrameBuffer::new(),
        }
    }

    /// Power-on clears everything. A soft reset keeps OAM, palette RAM and
    /// `v`, and clears the rest of the register file and the dot clock.
    ///
    /// An asserted NMI line is released through `bus.cpu`.
    pub fn reset(&mut self, kind: ResetKind, bus: &mut PpuBus<'_>) {
        debug!(?kind, "ppu reset");
        match kind {
            ResetKind::PowerOn => {
                self.registers.reset();
                self.palette.reset();
                self.open_bus.reset();
                self.address_bus.reset();
                self.background.reset();
                self.evaluator.reset();
                self.sprites.reset();
                self.frame.clear();
                self.frame_count = 0;
            }
            ResetKind::Soft => self.registers.soft_reset(),
        }
        self.clock.reset();
        self.suppress_vblank = false;
        self.oam_dma = None;
        self.sprite0_hit = None;
        self.update_nmi(&mut *bus.cpu);
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Current scanline (`0..scanlines_per_frame`).
    pub fn scanline(&self) -> u16 {
        self.clock.v
    }

    /// Current dot within the scanline (`0..=340`).
    pub fn dot(&self) -> u16 {
        self.clock.h
    }

    pub fn odd_frame(&self) -> bool {
        self.clock.odd_frame
    }

    /// Completed frames since power-on.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Picture being drawn; complete whenever `frame_ready` has just fired.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Current VRAM address (`v`).
    pub fn vram_addr(&self) -> VramAddr {
        self.registers.vram.v
    }

    /// Temporary VRAM address (`t`).
    pub fn temp_vram_addr(&self) -> VramAddr {
        self.registers.vram.t
    }

    pub fn fine_x(&self) -> u8 {
        self.registers.vram.x
    }

    /// Last value placed on the PPU address bus.
    pub fn address_bus(&self) -> u16 {
        self.address_bus.value()
    }

    pub fn oam(&self) -> &[u8] {
        &self.registers.oam
    }

    /// Palette entry at `addr` (`$3F00-$3FFF`, mirrored).
    pub fn palette_entry(&self, addr: u16) -> u8 {
        self.palette.read(addr)
    }

    pub fn nmi_debug_state(&self) -> NmiDebugState {
        NmiDebugState {
            nmi_output: self.registers.control.nmi_enabled(),
            nmi_occurred: self.registers.status.contains(Status::VERTICAL_BLANK),
            nmi_line: self.nmi_line,
            scanline: self.clock.v,
            dot: self.clock.h,
            frame: self.frame_count,
        }
    }

    /// First sprite-0 hit of the current frame, if any.
    pub fn sprite0_hit_debug(&self) -> Option<Sprite0HitDebug> {
        self.sprite0_hit
    }

    /// Advances the PPU by a single dot.
    pub fn step(&mut self, bus: &mut PpuBus<'_>) {
        let DotClock { h, v, .. } = self.clock;
        debug_assert!(h < ppu_mem::DOTS_PER_SCANLINE, "dot {h} out of range");
        debug_assert!(v < self.timing.scanlines_per_frame, "scanline {v} out of range");

        let visible = v < VISIBLE_LINES;
        let pre_render = v == self.timing.pre_render_line;
        if visible || pre_render {
            if self.registers.mask.rendering_enabled() {
                self.render_dot(h, v, pre_render, &mut *bus.board);
            } else if visible && h < VISIBLE_DOTS {
                self.forced_blank_dot(h, v);
            }
            if pre_render && h == 328 {
                self.clock.skip_dot = self.timing.odd_frame_skip
                    && self.clock.odd_frame
                    && self.registers.mask.background_enabled();
            }
        }

        match self.clock.advance(&self.timing) {
            Advance::Dot => {}
            Advance::Scanline => {
                self.evaluator.end_line();
                bus.board.scanline_tick();
            }
            Advance::Frame => {
                self.evaluator.end_line();
                bus.board.scanline_tick();
                self.frame_count += 1;
                trace!(frame = self.frame_count, "frame complete");
                bus.video.frame_ready(&self.frame);
            }
        }

        if self.clock.h == 1 {
            if self.clock.v == self.timing.vblank_start_line {
                self.enter_vblank(&mut *bus.cpu);
            } else if self.clock.v == self.timing.pre_render_line {
                self.leave_vblank(&mut *bus.cpu);
            }
        }
    }

    /// Handles CPU reads from the mirrored PPU register space (`$2000-$3FFF`).
    pub fn cpu_read(&mut self, addr: u16, bus: &mut PpuBus<'_>) -> u8 {
        let value = match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Status => self.read_status(&mut *bus.cpu),
            PpuRegister::OamData => self.registers.read_oam_data(),
            PpuRegister::Data => self.read_data(&mut *bus.board),
            _ => self.open_bus.sample(),
        };
        self.open_bus.set(value);
        value
    }

    /// Handles CPU writes to the mirrored PPU register space (`$2000-$3FFF`)
    /// and to `$4014`.
    pub fn cpu_write(&mut self, addr: u16, value: u8, bus: &mut PpuBus<'_>) {
        if addr == ppu_mem::OAM_DMA {
            self.write_oam_dma(value, bus);
            return;
        }

        self.open_bus.set(value);
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Control => {
                self.registers.write_control(value);
                self.update_nmi(&mut *bus.cpu);
            }
            PpuRegister::Mask => self.registers.mask = Mask::from_bits_retain(value),
            PpuRegister::Status => {} // read-only
            PpuRegister::OamAddr => self.registers.oam_addr = value,
            PpuRegister::OamData => self.registers.write_oam_data(value),
            PpuRegister::Scroll => self.registers.vram.write_scroll(value),
            PpuRegister::Addr => {
                if self.registers.vram.write_addr(value) {
                    let v = self.registers.vram.v.bus_addr();
                    self.address_bus.drive(&mut *bus.board, v);
                }
            }
            PpuRegister::Data => self.write_data(value, &mut *bus.board),
        }
    }

    /// Starts a 256-byte transfer from CPU page `page` and asks the CPU to
    /// stall for it.
    pub fn write_oam_dma(&mut self, page: u8, bus: &mut PpuBus<'_>) {
        trace!(page, "oam dma start");
        self.oam_dma = Some(OamDma::new(page));
        bus.cpu.request_stall(Stall::OamDma);
    }

    /// CPU address of the next DMA byte, while a transfer is pending.
    pub fn oam_dma_source(&self) -> Option<u16> {
        self.oam_dma.map(OamDma::source)
    }

    /// Feeds the next DMA byte through the `$2004` path. Returns `true` while
    /// more bytes remain.
    pub fn oam_dma_write(&mut self, value: u8) -> bool {
        let Some(dma) = self.oam_dma.as_mut() else {
            return false;
        };
        let more = dma.advance();
        if !more {
            trace!(page = dma.page(), "oam dma done");
            self.oam_dma = None;
        }
        self.registers.write_oam_data(value);
        more
    }

    /// Runs the pending transfer to completion, fetching bytes with `read`.
    pub fn run_oam_dma(&mut self, mut read: impl FnMut(u16) -> u8) {
        while let Some(addr) = self.oam_dma_source() {
            let value = read(addr);
            self.oam_dma_write(value);
        }
    }

    fn render_dot(&mut self, h: u16, v: u16, pre_render: bool, board: &mut dyn Board) {
        if !pre_render {
            if h < VISIBLE_DOTS {
                self.output_pixel(h, v);
            }
            let height = self.registers.control.sprite_height();
            if let EvalEvent::Overflow = self.evaluator.tick(h, v, height, &self.registers.oam) {
                if !self.registers.status.contains(Status::SPRITE_OVERFLOW) {
                    trace!(scanline = v, dot = h, "sprite overflow");
                }
                self.registers.status.insert(Status::SPRITE_OVERFLOW);
            }
        }

        match h {
            0..256 | 320..336 => {
                let base = self.registers.control.background_pattern_table();
                self.background.fetch(
                    h,
                    &mut self.registers.vram.v,
                    base,
                    &mut self.address_bus,
                    board,
                );
            }
            256..320 => {
                let control = self.registers.control;
                let fetch = SpriteFetch {
                    h,
                    line: v,
                    store: !pre_render,
                    slots: self.evaluator.slots(),
                    count: self.evaluator.count(),
                    height: control.sprite_height(),
                    table_8x8: control.sprite_pattern_table(),
                    v: self.registers.vram.v,
                };
                self.sprites.fetch(fetch, &mut self.address_bus, board);
                self.registers.oam_addr = 0;
            }
            336..340 => {
                self.background
                    .dummy_fetch(h, self.registers.vram.v, &mut self.address_bus, board);
            }
            _ => {}
        }

        let vram = &mut self.registers.vram;
        if h == 256 {
            vram.v.reset_x(vram.t);
        }
        if pre_render && h == 304 {
            vram.v.reset_y(vram.t);
        }
    }

    fn output_pixel(&mut self, x: u16, y: u16) {
        let bg = self.background.pixel(x, self.registers.vram.x);
        let sprite = self.sprites.pixel(x);
        let Composite {
            palette_addr,
            sprite_zero_hit,
        } = compose(bg, sprite, self.registers.mask, x);

        if sprite_zero_hit && !self.registers.status.contains(Status::SPRITE_ZERO_HIT) {
            self.registers.status.insert(Status::SPRITE_ZERO_HIT);
            if self.sprite0_hit.is_none() {
                let oam = &self.registers.oam;
                self.sprite0_hit = Some(Sprite0HitDebug {
                    pos: Sprite0HitPos {
                        scanline: y,
                        dot: x,
                    },
                    oam: [oam[0], oam[1], oam[2], oam[3]],
                });
            }
        }
        self.put_pixel(x, y, palette_addr);
    }

    /// Rendering disabled: the backdrop, unless `v` points into palette RAM,
    /// in which case that entry is shown.
    fn forced_blank_dot(&mut self, x: u16, y: u16) {
        let addr = self.registers.vram.v.bus_addr();
        let palette_addr = if addr & ppu_mem::PALETTE_BASE == ppu_mem::PALETTE_BASE {
            (addr & ppu_mem::PALETTE_INDEX_MASK) as u8
        } else {
            0
        };
        self.put_pixel(x, y, palette_addr);
    }

    fn put_pixel(&mut self, x: u16, y: u16, palette_addr: u8) {
        let mask = self.registers.mask;
        let color = self.palette.read(u16::from(palette_addr)) & mask.color_mask();
        let emphasis = u16::from(mask.emphasis()) << FrameBuffer::EMPHASIS_SHIFT;
        self.frame
            .set(usize::from(x), usize::from(y), u16::from(color) | emphasis);
    }

    fn enter_vblank(&mut self, cpu: &mut dyn CpuSignals) {
        if core::mem::take(&mut self.suppress_vblank) {
            trace!(frame = self.frame_count, "vblank flag suppressed by status read");
        } else {
            self.registers.status.insert(Status::VERTICAL_BLANK);
        }
        self.update_nmi(cpu);
    }

    fn leave_vblank(&mut self, cpu: &mut dyn CpuSignals) {
        self.registers.status.remove(
            Status::VERTICAL_BLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW,
        );
        self.suppress_vblank = false;
        self.sprite0_hit = None;
        self.update_nmi(cpu);
    }

    /// Reports a change of `nmi_output && nmi_occurred` to the CPU.
    fn update_nmi(&mut self, cpu: &mut dyn CpuSignals) {
        let level = self.registers.control.nmi_enabled()
            && self.registers.status.contains(Status::VERTICAL_BLANK);
        if level != self.nmi_line {
            self.nmi_line = level;
            trace!(level, scanline = self.clock.v, dot = self.clock.h, "nmi line");
            cpu.interrupt(Interrupt::Ppu, level);
        }
    }

    fn read_status(&mut self, cpu: &mut dyn CpuSignals) -> u8 {
        let value = self
            .open_bus
            .apply(Status::DRIVEN, self.registers.status.bits());
        if self.clock.v == self.timing.vblank_start_line && self.clock.h == 0 {
            self.suppress_vblank = true;
        }
        self.registers.status.remove(Status::VERTICAL_BLANK);
        self.registers.vram.reset_latch();
        self.update_nmi(cpu);
        value
    }

    fn read_data(&mut self, board: &mut dyn Board) -> u8 {
        let addr = self.registers.vram.v.bus_addr();
        let value = if addr >= ppu_mem::PALETTE_BASE {
            let value = self
                .open_bus
                .apply(PALETTE_VALUE_MASK, self.palette.read(addr));
            // The buffer still picks up the nametable byte hidden under the palette.
            self.registers.read_buffer = board.read_nametable(addr & ppu_mem::NAMETABLE_SPACE_MASK);
            value
        } else {
            let value = self.registers.read_buffer;
            self.registers.read_buffer = if addr < ppu_mem::CHR_END {
                board.read_chr(addr)
            } else {
                board.read_nametable(addr & ppu_mem::NAMETABLE_SPACE_MASK)
            };
            value
        };
        self.advance_vram_addr(board);
        value
    }

    fn write_data(&mut self, value: u8, board: &mut dyn Board) {
        let addr = self.registers.vram.v.bus_addr();
        if addr >= ppu_mem::PALETTE_BASE {
            self.palette.write(addr, value);
        } else if addr < ppu_mem::CHR_END {
            board.write_chr(addr, value);
        } else {
            board.write_nametable(addr & ppu_mem::NAMETABLE_SPACE_MASK, value);
        }
        self.advance_vram_addr(board);
    }

    fn advance_vram_addr(&mut self, board: &mut dyn Board) {
        let step = self.registers.control.vram_increment();
        self.registers.vram.v.increment(step);
        let v = self.registers.vram.v.bus_addr();
        self.address_bus.drive(board, v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CiramBoard, FrameSink, Mirroring};

    #[derive(Default)]
    struct RecordingCpu {
        levels: Vec<bool>,
        stalls: Vec<Stall>,
    }

    impl CpuSignals for RecordingCpu {
        fn interrupt(&mut self, _kind: Interrupt, level: bool) {
            self.levels.push(level);
        }

        fn request_stall(&mut self, kind: Stall) {
            self.stalls.push(kind);
        }
    }

    #[derive(Default)]
    struct FrameCounter(u32);

    impl FrameSink for FrameCounter {
        fn frame_ready(&mut self, _frame: &FrameBuffer) {
            self.0 += 1;
        }
    }

    struct Harness {
        ppu: Ppu,
        board: CiramBoard,
        cpu: RecordingCpu,
        video: FrameCounter,
    }

    impl Harness {
        fn new(region: Region) -> Self {
            Self {
                ppu: Ppu::new(PpuConfig::new(region)),
                board: CiramBoard::new(Mirroring::Vertical),
                cpu: RecordingCpu::default(),
                video: FrameCounter::default(),
            }
        }

        fn step(&mut self) {
            let mut bus = PpuBus::new(&mut self.board, &mut self.cpu, &mut self.video);
            self.ppu.step(&mut bus);
        }

        fn run_to(&mut self, scanline: u16, dot: u16) {
            while (self.ppu.scanline(), self.ppu.dot()) != (scanline, dot) {
                self.step();
            }
        }

        fn read(&mut self, addr: u16) -> u8 {
            let mut bus = PpuBus::new(&mut self.board, &mut self.cpu, &mut self.video);
            self.ppu.cpu_read(addr, &mut bus)
        }

        fn write(&mut self, addr: u16, value: u8) {
            let mut bus = PpuBus::new(&mut self.board, &mut self.cpu, &mut self.video);
            self.ppu.cpu_write(addr, value, &mut bus);
        }

        fn set_addr(&mut self, addr: u16) {
            self.write(0x2006, (addr >> 8) as u8);
            self.write(0x2006, addr as u8);
        }

        fn reset(&mut self, kind: ResetKind) {
            let mut bus = PpuBus::new(&mut self.board, &mut self.cpu, &mut self.video);
            self.ppu.reset(kind, &mut bus);
        }

        fn rising_edges(&self) -> usize {
            self.cpu.levels.iter().filter(|&&level| level).count()
        }
    }

    #[test]
    fn status_read_right_after_power_on_is_clear() {
        let mut h = Harness::new(Region::Ntsc);
        assert_eq!(h.read(0x2002) & 0xE0, 0);
        assert!(h.cpu.levels.is_empty());
    }

    #[test]
    fn vblank_starts_at_dot_one_of_line_241() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x2000, 0x80);
        h.run_to(241, 0);
        assert!(!h.ppu.nmi_debug_state().nmi_occurred);
        assert!(h.cpu.levels.is_empty());
        h.step();
        assert!(h.ppu.nmi_debug_state().nmi_occurred);
        assert_eq!(h.cpu.levels, vec![true]);
    }

    #[test]
    fn status_read_on_the_dot_before_vblank_suppresses_it() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x2000, 0x80);
        h.run_to(241, 0);
        assert_eq!(h.read(0x2002) & 0x80, 0);
        h.run_to(261, 0);
        assert_eq!(h.read(0x2002) & 0x80, 0);
        assert!(h.cpu.levels.is_empty());
    }

    #[test]
    fn status_read_after_vblank_set_clears_it() {
        let mut h = Harness::new(Region::Ntsc);
        h.run_to(241, 1);
        assert_eq!(h.read(0x2002) & 0x80, 0x80);
        assert_eq!(h.read(0x2002) & 0x80, 0);
    }

    #[test]
    fn enabling_nmi_inside_vblank_asserts_immediately() {
        let mut h = Harness::new(Region::Ntsc);
        h.run_to(250, 17);
        h.write(0x2000, 0x80);
        assert_eq!(h.cpu.levels, vec![true]);
        h.write(0x2000, 0x80);
        assert_eq!(h.cpu.levels, vec![true], "no new edge while the level holds");
        h.write(0x2000, 0x00);
        h.write(0x2000, 0x80);
        assert_eq!(h.cpu.levels, vec![true, false, true]);
    }

    #[test]
    fn pre_render_line_drops_the_nmi_line() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x2000, 0x80);
        h.run_to(261, 1);
        assert_eq!(h.cpu.levels, vec![true, false]);
        assert!(!h.ppu.nmi_debug_state().nmi_line);
    }

    #[test]
    fn write_only_registers_read_back_open_bus() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x2001, 0x5A);
        assert_eq!(h.read(0x2000), 0x5A);
        assert_eq!(h.read(0x2005), 0x5A);
        assert_eq!(h.read(0x2002), 0x1A, "undriven status bits come from the latch");
    }

    #[test]
    fn data_reads_are_buffered_outside_palette() {
        let mut h = Harness::new(Region::Ntsc);
        h.board.poke_nametable(0x2400, 0x11);
        h.board.poke_nametable(0x2401, 0x22);
        h.set_addr(0x2400);
        h.read(0x2007);
        assert_eq!(h.read(0x2007), 0x11);
        assert_eq!(h.read(0x2007), 0x22);
        assert_eq!(h.ppu.vram_addr().raw(), 0x2403);
    }

    #[test]
    fn palette_reads_are_immediate_and_refill_buffer_from_nametable() {
        let mut h = Harness::new(Region::Ntsc);
        h.board.poke_nametable(0x2F05, 0x77);
        h.set_addr(0x3F05);
        h.write(0x2007, 0xEC);
        h.set_addr(0x3F05);
        // Open-bus latch holds the low byte of the address write (0x05).
        assert_eq!(h.read(0x2007), 0x2C);
        h.set_addr(0x2000);
        assert_eq!(h.read(0x2007), 0x77);
    }

    #[test]
    fn data_access_increments_by_32_and_notifies_board() {
        let mut h = Harness::new(Region::Ntsc);
        h.board.record_address_lines(true);
        h.write(0x2000, 0x04);
        h.set_addr(0x2000);
        h.write(0x2007, 0x01);
        h.write(0x2007, 0x02);
        assert_eq!(h.board.peek_nametable(0x2020), 0x02);
        assert_eq!(h.board.address_lines(), &[0x2000, 0x2020, 0x2040]);
    }

    #[test]
    fn chr_space_goes_through_the_board() {
        let mut h = Harness::new(Region::Ntsc);
        h.set_addr(0x1234);
        h.write(0x2007, 0xAB);
        assert_eq!(h.board.chr()[0x1234], 0xAB);
    }

    #[test]
    fn oam_dma_masks_attribute_bytes_and_requests_stall() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x4014, 0x07);
        assert_eq!(h.cpu.stalls, vec![Stall::OamDma]);
        assert_eq!(h.ppu.oam_dma_source(), Some(0x0700));
        let mut sources = Vec::new();
        h.ppu.run_oam_dma(|addr| {
            sources.push(addr);
            0xFF
        });
        assert_eq!(sources.len(), 256);
        assert_eq!(sources.last(), Some(&0x07FF));
        assert_eq!(h.ppu.oam_dma_source(), None);
        assert_eq!(&h.ppu.oam()[..4], &[0xFF, 0xFF, 0xE3, 0xFF]);
        assert!(!h.ppu.oam_dma_write(0));
    }

    #[test]
    fn oam_data_reads_do_not_increment() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x2003, 0x10);
        h.write(0x2004, 0x42);
        h.write(0x2003, 0x10);
        assert_eq!(h.read(0x2004), 0x42);
        assert_eq!(h.read(0x2004), 0x42);
    }

    #[test]
    fn forced_blank_shows_backdrop_or_palette_under_v() {
        let mut h = Harness::new(Region::Ntsc);
        h.set_addr(0x3F00);
        h.write(0x2007, 0x0F);
        h.write(0x2007, 0x21);
        h.set_addr(0x2000);
        h.run_to(0, 10);
        assert_eq!(h.ppu.frame().pixel(5, 0), Some(0x0F));
        h.set_addr(0x3F01);
        h.run_to(1, 10);
        assert_eq!(h.ppu.frame().pixel(5, 1), Some(0x21));
    }

    #[test]
    fn grayscale_and_emphasis_reach_the_frame() {
        let mut h = Harness::new(Region::Ntsc);
        h.set_addr(0x3F00);
        h.write(0x2007, 0x2D);
        h.set_addr(0x2000);
        h.write(0x2001, 0b1010_0001);
        h.run_to(0, 10);
        assert_eq!(h.ppu.frame().pixel(3, 0), Some(0x20 | (0b101 << 6)));
    }

    #[test]
    fn soft_reset_keeps_memories() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x2004, 0x33);
        h.set_addr(0x3F01);
        h.write(0x2007, 0x19);
        h.write(0x2000, 0x80);
        h.run_to(100, 5);
        h.reset(ResetKind::Soft);
        assert_eq!((h.ppu.scanline(), h.ppu.dot()), (0, 0));
        assert_eq!(h.ppu.oam()[0], 0x33);
        assert_eq!(h.ppu.palette_entry(0x3F01), 0x19);
        assert_eq!(h.ppu.vram_addr().raw(), 0x3F02);
        assert!(!h.ppu.nmi_debug_state().nmi_output);

        h.reset(ResetKind::PowerOn);
        assert_eq!(h.ppu.oam()[0], 0);
        assert_eq!(h.ppu.palette_entry(0x3F01), 0);
        assert_eq!(h.ppu.frame_count(), 0);
    }

    #[test]
    fn oam_addr_is_cleared_during_sprite_fetch() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x2003, 0x40);
        h.write(0x2004, 0x99);
        h.write(0x2001, 0x18);
        h.run_to(10, 250);
        h.write(0x2003, 0x40);
        h.run_to(10, 300);
        h.write(0x2003, 0x40);
        h.run_to(10, 321);
        assert_eq!(h.read(0x2004), 0x00);
        h.write(0x2003, 0x40);
        assert_eq!(h.read(0x2004), 0x99);
    }

    #[test]
    fn rendering_enabled_mid_line_restarts_sprite_evaluation() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x2003, 0);
        for _ in 0..256 {
            h.write(0x2004, 18);
        }
        h.write(0x2001, 0x18);
        h.run_to(20, 300);
        assert_eq!(h.ppu.evaluator.count(), 8);

        h.run_to(21, 5);
        h.write(0x2001, 0x00);
        h.run_to(22, 10);
        h.write(0x2001, 0x18);
        h.run_to(22, 300);
        assert_eq!(h.ppu.evaluator.count(), 8);
        assert!(h.ppu.evaluator.slots().iter().all(|slot| slot.y == 18));

        h.write(0x2001, 0x00);
        h.run_to(23, 100);
        h.write(0x2001, 0x18);
        h.run_to(23, 300);
        assert_eq!(h.ppu.evaluator.count(), 0, "no scan began inside the clear window");
        h.run_to(24, 0);
    }

    #[test]
    fn snapshot_resumes_identically() {
        let mut h = Harness::new(Region::Ntsc);
        h.write(0x2001, 0x1E);
        h.run_to(120, 133);
        let snapshot = h.ppu.clone();
        h.run_to(200, 0);
        let ahead = h.ppu.vram_addr();
        h.ppu = snapshot;
        h.run_to(200, 0);
        assert_eq!(h.ppu.vram_addr(), ahead);
    }
}
