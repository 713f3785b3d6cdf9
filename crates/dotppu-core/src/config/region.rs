use core::{fmt, str::FromStr};

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Console timing profile.
///
/// The region decides how many scanlines a frame has, where VBlank begins and
/// whether the pre-render line drops a dot on odd frames. There is no
/// `Default`.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// North American / Japanese NTSC (2C02).
    Ntsc,
    /// European PAL (2C07).
    Pal,
    /// Dendy-style PAL Famiclones (NTSC-like CPU ratio, PAL frame length).
    Dendy,
}

/// Per-region frame timing constants.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timing {
    /// Total scanlines per frame, including the pre-render line.
    pub scanlines_per_frame: u16,
    /// Scanline whose dot 1 raises the VBlank flag.
    pub vblank_start_line: u16,
    /// The pre-render line; its dot 1 clears VBlank, sprite 0 hit and overflow.
    pub pre_render_line: u16,
    /// Whether odd frames shorten the pre-render line by one dot.
    pub odd_frame_skip: bool,
    /// PPU dots per CPU cycle as `numerator / denominator`.
    pub dots_per_cpu_cycle: (u8, u8),
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Ntsc, Region::Pal, Region::Dendy];

    pub const fn timing(self) -> Timing {
        match self {
            Region::Ntsc => Timing {
                scanlines_per_frame: 262,
                vblank_start_line: 241,
                pre_render_line: 261,
                odd_frame_skip: true,
                dots_per_cpu_cycle: (3, 1),
            },
            Region::Pal => Timing {
                scanlines_per_frame: 312,
                vblank_start_line: 241,
                pre_render_line: 311,
                odd_frame_skip: false,
                dots_per_cpu_cycle: (16, 5),
            },
            Region::Dendy => Timing {
                scanlines_per_frame: 312,
                vblank_start_line: 291,
                pre_render_line: 311,
                odd_frame_skip: false,
                dots_per_cpu_cycle: (3, 1),
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Region::Ntsc => "ntsc",
            Region::Pal => "pal",
            Region::Dendy => "dendy",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ntsc" => Ok(Region::Ntsc),
            "pal" => Ok(Region::Pal),
            "dendy" => Ok(Region::Dendy),
            _ => {
                debug!(region = s, "rejecting unknown region");
                Err(Error::UnknownRegion(s.to_string()))
            }
        }
    }
}

/// Raw ids: `0` = NTSC, `1` = PAL, `2` = Dendy.
impl TryFrom<u8> for Region {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Region::Ntsc),
            1 => Ok(Region::Pal),
            2 => Ok(Region::Dendy),
            _ => Err(Error::UnsupportedRegionId(value)),
        }
    }
}

impl From<Region> for u8 {
    fn from(region: Region) -> Self {
        match region {
            Region::Ntsc => 0,
            Region::Pal => 1,
            Region::Dendy => 2,
        }
    }
}
