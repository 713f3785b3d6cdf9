//! Collaborator contracts consumed by the PPU.
//!
//! The PPU never owns pattern tables, nametables or CPU state. It reaches them
//! through three narrow traits, bundled per call into a [`PpuBus`] view so the
//! borrows stay explicit:
//!
//! - [`Board`]: cartridge-side storage and the address-line/scanline hooks that
//!   bank-switching logic listens to.
//! - [`CpuSignals`]: the NMI line and DMA stall requests toward the host CPU.
//! - [`FrameSink`]: the presentation layer receiving finished frames.
//!
//! All calls are synchronous and infallible. Out-of-range addresses are the
//! implementor's job to mirror.

mod ciram;

pub use ciram::{CiramBoard, Mirroring};

use crate::ppu::FrameBuffer;

/// Cartridge board as seen from the PPU bus.
pub trait Board {
    /// Called whenever the 14-bit PPU address bus changes value: rendering
    /// fetches, `$2006` commits and `$2007` increments.
    fn update_address_lines(&mut self, addr: u16);

    /// Called once at every scanline boundary.
    fn scanline_tick(&mut self) {}

    /// Reads the nametable byte mapped at `addr` (`$2000-$2FFF`).
    fn read_nametable(&mut self, addr: u16) -> u8;

    /// Writes the nametable byte mapped at `addr` (`$2000-$2FFF`).
    fn write_nametable(&mut self, addr: u16, data: u8);

    /// Reads pattern memory at `addr` (`$0000-$1FFF`).
    fn read_chr(&mut self, addr: u16) -> u8;

    /// Writes pattern memory at `addr`; CHR ROM boards ignore this.
    fn write_chr(&mut self, addr: u16, data: u8);
}

/// Interrupt sources the PPU drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interrupt {
    /// The PPU's NMI output.
    Ppu,
}

/// Reasons the PPU asks the CPU to give up bus cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stall {
    /// A `$4014` OAM DMA transfer.
    OamDma,
}

/// Host CPU lines driven by the PPU.
pub trait CpuSignals {
    /// Reports every transition of the NMI condition. `level == true` is the
    /// asserting edge; the CPU is expected to latch it edge-style.
    fn interrupt(&mut self, kind: Interrupt, level: bool);

    /// Requests the CPU to stall for a transfer. Cycle accounting is the CPU's.
    fn request_stall(&mut self, kind: Stall);
}

/// Receives each completed frame.
pub trait FrameSink {
    fn frame_ready(&mut self, frame: &FrameBuffer);
}

/// Temporary view that lets the PPU reach its collaborators for one call.
///
/// The host builds one of these per `step`/register access, so no
/// back-reference to the rest of the system is ever stored in the PPU.
pub struct PpuBus<'a> {
    pub board: &'a mut dyn Board,
    pub cpu: &'a mut dyn CpuSignals,
    pub video: &'a mut dyn FrameSink,
}

impl<'a> PpuBus<'a> {
    pub fn new(
        board: &'a mut dyn Board,
        cpu: &'a mut dyn CpuSignals,
        video: &'a mut dyn FrameSink,
    ) -> Self {
        Self { board, cpu, video }
    }
}

impl core::fmt::Debug for PpuBus<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PpuBus").finish_non_exhaustive()
    }
}
