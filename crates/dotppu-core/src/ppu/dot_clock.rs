#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::{config::region::Timing, memory::ppu::DOTS_PER_SCANLINE};

/// Outcome of advancing the dot counter by one dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Advance {
    /// Still on the same scanline.
    Dot,
    /// Crossed a scanline boundary.
    Scanline,
    /// Crossed the last scanline boundary and wrapped to line 0.
    Frame,
}

/// Horizontal dot / scanline counter.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct DotClock {
    /// Dot within the scanline (0..=340).
    pub(crate) h: u16,
    /// Scanline (0..scanlines_per_frame).
    pub(crate) v: u16,
    /// Frame parity.
    pub(crate) odd_frame: bool,
    /// Latched at dot 328 of the pre-render line: this line ends one dot early.
    pub(crate) skip_dot: bool,
}

impl DotClock {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advances one dot. A latched `skip_dot` ends the line at dot 339, so the
    /// dot dropped from the short line is 340, which fetches nothing.
    pub(crate) fn advance(&mut self, timing: &Timing) -> Advance {
        self.h += 1;
        let line_end = if self.skip_dot {
            DOTS_PER_SCANLINE - 1
        } else {
            DOTS_PER_SCANLINE
        };
        if self.h < line_end {
            return Advance::Dot;
        }

        self.h = 0;
        self.skip_dot = false;
        self.v += 1;
        if self.v < timing.scanlines_per_frame {
            return Advance::Scanline;
        }
        self.v = 0;
        self.odd_frame = !self.odd_frame;
        Advance::Frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::region::Region;

    #[test]
    fn wraps_line_and_frame() {
        let timing = Region::Pal.timing();
        let mut clock = DotClock {
            h: 340,
            v: 311,
            ..DotClock::default()
        };
        assert_eq!(clock.advance(&timing), Advance::Frame);
        assert_eq!((clock.h, clock.v), (0, 0));
        assert!(clock.odd_frame);
    }

    #[test]
    fn skipped_dot_shortens_one_line_only() {
        let timing = Region::Ntsc.timing();
        let mut clock = DotClock {
            h: 339,
            v: 261,
            skip_dot: true,
            ..DotClock::default()
        };
        assert_eq!(clock.advance(&timing), Advance::Frame);
        assert!(!clock.skip_dot);

        let dots = (0..).take_while(|_| clock.advance(&timing) == Advance::Dot).count() + 1;
        assert_eq!(dots, 341);
    }
}
