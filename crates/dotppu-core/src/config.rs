//! Construction-time configuration for the PPU core.

pub mod region;

use core::str::FromStr;

use crate::error::Error;
use region::Region;

/// Settings consumed by [`Ppu::new`](crate::Ppu::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PpuConfig {
    /// Timing profile; fixes scanline counts, VBlank line and odd-frame behaviour.
    pub region: Region,
}

impl PpuConfig {
    pub const fn new(region: Region) -> Self {
        Self { region }
    }

    /// Builds a configuration from a textual region name.
    ///
    /// Unknown names are rejected instead of falling back to a default region.
    pub fn from_region_name(name: &str) -> Result<Self, Error> {
        Region::from_str(name).map(Self::new)
    }
}

impl From<Region> for PpuConfig {
    fn from(region: Region) -> Self {
        Self::new(region)
    }
}
