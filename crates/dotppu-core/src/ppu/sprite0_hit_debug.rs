#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

/// Captures the position of the first sprite-0 hit in the current frame (debug).
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sprite0HitPos {
    pub scanline: u16,
    pub dot: u16,
}

/// Debug info captured on the first sprite-0 hit of a frame.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sprite0HitDebug {
    pub pos: Sprite0HitPos,
    /// OAM entry 0 (`y`, `tile`, `attribute`, `x`) at the time of the hit.
    pub oam: [u8; 4],
}
