//! CPU-to-PPU clock ratio helper.
//!
//! The PPU itself only knows dots. Hosts drive it in lockstep with the CPU, and
//! the ratio is region dependent: exactly 3 dots per CPU cycle on NTSC and
//! Dendy, 3.2 on PAL. [`DotDivider`] turns CPU cycles into whole dot counts with
//! an accumulator so that no dot is ever dropped or doubled.

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::config::region::Region;

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DotDivider {
    numerator: u8,
    denominator: u8,
    remainder: u8,
}

impl DotDivider {
    pub const fn new(region: Region) -> Self {
        let (numerator, denominator) = region.timing().dots_per_cpu_cycle;
        Self {
            numerator,
            denominator,
            remainder: 0,
        }
    }

    /// Number of PPU dots to run for the next CPU cycle.
    ///
    /// PAL yields the repeating cadence `3, 3, 3, 3, 4`.
    #[inline]
    pub fn dots_for_cpu_cycle(&mut self) -> u8 {
        let total = self.remainder + self.numerator;
        self.remainder = total % self.denominator;
        total / self.denominator
    }

    pub fn reset(&mut self) {
        self.remainder = 0;
    }
}
