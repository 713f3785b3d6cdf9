use thiserror::Error;

/// Errors raised while configuring a [`Ppu`](crate::Ppu).
///
/// Stepping and register access never fail; only construction-time input can be
/// rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A textual region identifier did not name a supported timing profile.
    #[error("unknown region `{0}` (expected ntsc, pal or dendy)")]
    UnknownRegion(String),
    /// A numeric region identifier is outside the supported range.
    #[error("unsupported region id {0}")]
    UnsupportedRegionId(u8),
}
