//! CPU-visible PPU register state and internal VRAM address latches.
//!
//! This module mirrors the `$2000-$2007` register set and the internal
//! `v/t/x/w` VRAM latches described on NESDev. The concrete bit layouts live
//! in submodules.

mod control;
mod mask;
mod status;
mod vram_addr;
mod vram_registers;

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

pub(crate) use control::Control;
pub(crate) use mask::Mask;
pub(crate) use status::Status;
pub use vram_addr::VramAddr;
pub(crate) use vram_registers::VramRegisters;

use crate::mem_block::OamRam;

/// Hardware clears bits 2-4 of every sprite attribute byte.
pub(crate) const OAM_ATTRIBUTE_MASK: u8 = 0xE3;

/// Aggregates the state of all CPU visible PPU registers.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Registers {
    /// Mirror of the control register (`$2000`).
    pub(crate) control: Control,
    /// Mirror of the mask register (`$2001`).
    pub(crate) mask: Mask,
    /// Status register (`$2002`).
    pub(crate) status: Status,
    /// Current OAM pointer driven by `$2003`/`$2004`.
    pub(crate) oam_addr: u8,
    /// Primary sprite memory accessible through `$2004`.
    pub(crate) oam: OamRam,
    /// Internal VRAM registers (`v`/`t`/`x`/`w`).
    pub(crate) vram: VramRegisters,
    /// Internal buffer implementing the delayed `$2007` read behavior.
    pub(crate) read_buffer: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub(crate) fn new() -> Self {
        Self {
            control: Control::default(),
            mask: Mask::default(),
            status: Status::default(),
            oam_addr: 0,
            oam: OamRam::new(),
            vram: VramRegisters::default(),
            read_buffer: 0,
        }
    }

    /// Restores all register values to their power-on defaults.
    pub(crate) fn reset(&mut self) {
        *self = Registers::new();
    }

    /// Reset-button behaviour: CTRL, MASK, the toggle, the read buffer and all
    /// status flags clear. OAM and `v` survive.
    pub(crate) fn soft_reset(&mut self) {
        self.control = Control::default();
        self.mask = Mask::default();
        self.status = Status::default();
        self.vram.t = VramAddr::default();
        self.vram.x = 0;
        self.vram.reset_latch();
        self.read_buffer = 0;
    }

    /// Updates control, also syncing the nametable bits into `t`.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.control = Control::from_bits_retain(value);
        self.vram.t.set_nametable(self.control.nametable_index());
    }

    /// `$2004` write: stores at the OAM cursor and advances it.
    pub(crate) fn write_oam_data(&mut self, value: u8) {
        let idx = self.oam_addr as usize;
        self.oam[idx] = if idx & 3 == 2 {
            value & OAM_ATTRIBUTE_MASK
        } else {
            value
        };
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// `$2004` read: the raw byte at the cursor, without advancing.
    pub(crate) fn read_oam_data(&self) -> u8 {
        self.oam[self.oam_addr as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn control_write_syncs_nametable_into_t() {
        let mut regs = Registers::new();
        regs.write_control(0b1000_0011);
        assert_eq!(regs.vram.t.nametable(), 3);
        assert!(regs.control.nmi_enabled());
    }

    #[test]
    fn oam_cursor_wraps() {
        let mut regs = Registers::new();
        regs.oam_addr = 0xFF;
        regs.write_oam_data(0x12);
        assert_eq!(regs.oam[0xFF], 0x12);
        assert_eq!(regs.oam_addr, 0);
    }

    #[test]
    fn soft_reset_keeps_oam_and_v() {
        let mut regs = Registers::new();
        regs.write_oam_data(0x77);
        regs.vram.v = VramAddr::from(0x2345);
        regs.write_control(0x80);
        regs.status = Status::VERTICAL_BLANK;
        regs.soft_reset();
        assert_eq!(regs.oam[0], 0x77);
        assert_eq!(regs.vram.v.raw(), 0x2345);
        assert_eq!(regs.control, Control::empty());
        assert_eq!(regs.status, Status::empty());
    }

    proptest! {
        #[test]
        fn only_attribute_bytes_are_masked(addr in any::<u8>(), value in any::<u8>()) {
            let mut regs = Registers::new();
            regs.oam_addr = addr;
            regs.write_oam_data(value);
            regs.oam_addr = addr;
            let expected = if addr & 3 == 2 { value & 0xE3 } else { value };
            prop_assert_eq!(regs.read_oam_data(), expected);
        }
    }
}
