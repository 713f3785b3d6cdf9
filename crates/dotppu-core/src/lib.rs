//! Dot-stepped emulation of the NES/Famicom picture processing unit (2C02 family).
//!
//! The [`Ppu`] advances one dot per [`Ppu::step`] call and talks to the rest of
//! the console only through the collaborator traits in [`board`]: the cartridge
//! [`Board`] for pattern/nametable storage and address-line notifications, the
//! host CPU through [`CpuSignals`] for NMI and DMA stalls, and a [`FrameSink`]
//! that receives each completed frame.
//!
//! ```
//! use dotppu_core::{
//!     CiramBoard, CpuSignals, FrameBuffer, FrameSink, Interrupt, Mirroring, Ppu, PpuBus,
//!     PpuConfig, Region, Stall,
//! };
//!
//! #[derive(Default)]
//! struct Cpu {
//!     nmi: bool,
//! }
//!
//! impl CpuSignals for Cpu {
//!     fn interrupt(&mut self, _kind: Interrupt, level: bool) {
//!         self.nmi = level;
//!     }
//!     fn request_stall(&mut self, _kind: Stall) {}
//! }
//!
//! struct Screen(u64);
//!
//! impl FrameSink for Screen {
//!     fn frame_ready(&mut self, _frame: &FrameBuffer) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let mut ppu = Ppu::new(PpuConfig::new(Region::Ntsc));
//! let mut board = CiramBoard::new(Mirroring::Vertical);
//! let mut cpu = Cpu::default();
//! let mut screen = Screen(0);
//!
//! let mut bus = PpuBus::new(&mut board, &mut cpu, &mut screen);
//! ppu.cpu_write(0x2000, 0x80, &mut bus);
//! while ppu.frame_count() == 0 {
//!     ppu.step(&mut bus);
//! }
//! assert_eq!(screen.0, 1);
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod mem_block;
pub mod memory;
pub mod ppu;
pub mod reset_kind;
pub mod timing;

pub use board::{Board, CiramBoard, CpuSignals, FrameSink, Interrupt, Mirroring, PpuBus, Stall};
pub use config::{PpuConfig, region::Region, region::Timing};
pub use error::Error;
pub use ppu::{FrameBuffer, NmiDebugState, Ppu, Sprite0HitDebug, Sprite0HitPos, VramAddr};
pub use reset_kind::ResetKind;
pub use timing::DotDivider;
