#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetKind {
    PowerOn, // cold boot / power cycle
    Soft,    // reset button
}
