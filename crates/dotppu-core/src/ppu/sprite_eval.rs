//! Secondary OAM selection for the next scanline.
//!
//! The evaluator walks primary OAM at one byte per two dots between dots 64
//! and 256. Once eight sprites have been copied it keeps comparing bytes
//! against the line, but the hardware increments the OAM address wrongly at
//! that point (both the sprite index and the byte index advance), so the
//! overflow flag is both missed and set spuriously. That walk is reproduced
//! exactly.

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use super::sprite::SecondarySprite;
use crate::{mem_block::OamRam, memory::ppu::SECONDARY_OAM_SLOTS};

/// Evaluator states, in the order they normally run.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub(crate) enum EvalState {
    /// Dots 0..64: secondary OAM is filled with `0xFF`.
    #[default]
    Clear = 0,
    /// Read a Y byte and test it against the line.
    ReadY = 1,
    CopyTile = 2,
    CopyAttribute = 3,
    CopyX = 4,
    /// Eight sprites found: buggy overflow search.
    Overflow = 5,
    /// Three reads following an overflow hit.
    OverflowTile = 6,
    OverflowAttribute = 7,
    OverflowX = 8,
    /// Scan finished for this line.
    Idle = 9,
}

/// Outcome of a single evaluator tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvalEvent {
    None,
    /// The overflow search matched a ninth in-range byte.
    Overflow,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SpriteEvaluator {
    pub(crate) state: EvalState,
    /// Primary OAM address being read. Reaching 256 ends the scan.
    addr: u16,
    /// Slots filled so far (0..=8).
    count: u8,
    slots: [SecondarySprite; SECONDARY_OAM_SLOTS],
    /// Whether a scan began on the current line.
    started: bool,
}

impl Default for SpriteEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteEvaluator {
    pub(crate) fn new() -> Self {
        Self {
            state: EvalState::Clear,
            addr: 0,
            count: 0,
            slots: [SecondarySprite::EMPTY; SECONDARY_OAM_SLOTS],
            started: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Sprites selected for the next line, in priority order.
    pub(crate) fn slots(&self) -> &[SecondarySprite; SECONDARY_OAM_SLOTS] {
        &self.slots
    }

    /// Sprites selected on the current line; zero when no scan began on it.
    pub(crate) fn count(&self) -> u8 {
        if self.started { self.count } else { 0 }
    }

    /// Called at every scanline boundary, whether or not rendering ran.
    pub(crate) fn end_line(&mut self) {
        self.started = false;
    }

    /// Runs the evaluator for dot `h` of `line`. Only meaningful for visible
    /// lines; the caller skips the pre-render line.
    pub(crate) fn tick(&mut self, h: u16, line: u16, height: u16, oam: &OamRam) -> EvalEvent {
        if !self.started {
            self.begin(h);
        }
        match h {
            0..64 => {
                self.clear(h);
                EvalEvent::None
            }
            64..256 if h & 1 == 1 => self.step(line, height, oam),
            _ => EvalEvent::None,
        }
    }

    /// First dot of the line seen with rendering on. Past the clear window
    /// there is nothing left to scan.
    fn begin(&mut self, h: u16) {
        self.started = true;
        self.addr = 0;
        self.count = 0;
        self.state = if h < 64 {
            EvalState::Clear
        } else {
            EvalState::Idle
        };
    }

    fn clear(&mut self, h: u16) {
        if h & 7 == 7 {
            self.slots[usize::from(h >> 3)] = SecondarySprite::EMPTY;
        }
        if h == 63 {
            self.state = EvalState::ReadY;
        }
    }

    fn in_range(line: u16, y: u8, height: u16) -> bool {
        line.wrapping_sub(u16::from(y)) < height
    }

    fn step(&mut self, line: u16, height: u16, oam: &OamRam) -> EvalEvent {
        debug_assert!(self.addr < 0x100, "OAM address {:#X} escaped primary OAM", self.addr);
        debug_assert!(self.state != EvalState::Clear, "scan left the clear window uncleared");
        let byte = oam[usize::from(self.addr)];
        let slot = usize::from(self.count);
        match self.state {
            EvalState::Clear => self.state = EvalState::Idle,
            EvalState::ReadY => {
                if Self::in_range(line, byte, height) {
                    debug_assert!(slot < SECONDARY_OAM_SLOTS);
                    self.slots[slot] = SecondarySprite {
                        y: byte,
                        is_sprite_zero: self.addr == 0,
                        ..SecondarySprite::EMPTY
                    };
                    self.advance(1, EvalState::CopyTile);
                } else {
                    self.advance(4, EvalState::ReadY);
                }
            }
            EvalState::CopyTile => {
                self.slots[slot].tile = byte;
                self.advance(1, EvalState::CopyAttribute);
            }
            EvalState::CopyAttribute => {
                self.slots[slot].attribute = byte;
                self.advance(1, EvalState::CopyX);
            }
            EvalState::CopyX => {
                self.slots[slot].x = byte;
                self.count += 1;
                let next = if usize::from(self.count) == SECONDARY_OAM_SLOTS {
                    EvalState::Overflow
                } else {
                    EvalState::ReadY
                };
                self.advance(1, next);
            }
            EvalState::Overflow => {
                if Self::in_range(line, byte, height) {
                    self.advance(1, EvalState::OverflowTile);
                    return EvalEvent::Overflow;
                }
                // Sprite index and byte index both step, without carry between them.
                let sprite = (self.addr & !3) + 4;
                let byte_index = (self.addr + 1) & 3;
                self.state = if sprite >= 0x100 {
                    EvalState::Idle
                } else {
                    EvalState::Overflow
                };
                self.addr = (sprite + byte_index) & 0xFF;
            }
            EvalState::OverflowTile => self.advance(1, EvalState::OverflowAttribute),
            EvalState::OverflowAttribute => self.advance(1, EvalState::OverflowX),
            EvalState::OverflowX => self.advance(1, EvalState::Idle),
            EvalState::Idle => {
                self.addr = (self.addr + 4) & 0xFC;
            }
        }
        EvalEvent::None
    }

    /// Moves the OAM address forward; running off the end of OAM finishes
    /// the scan.
    fn advance(&mut self, by: u16, next: EvalState) {
        self.addr += by;
        if self.addr >= 0x100 {
            self.addr &= 0xFF;
            self.state = EvalState::Idle;
        } else {
            self.state = next;
        }
    }
}
