#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

/// Minimal PPU timing/debug snapshot.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NmiDebugState {
    pub nmi_output: bool,
    pub nmi_occurred: bool,
    /// Current level of the NMI line toward the CPU.
    pub nmi_line: bool,
    pub scanline: u16,
    pub dot: u16,
    pub frame: u64,
}
