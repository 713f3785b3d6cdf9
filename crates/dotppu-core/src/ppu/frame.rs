use crate::memory::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Finished picture for one frame.
///
/// Each pixel is a palette color index in bits 0-5 with the three `$2001`
/// emphasis bits in bits 6-8. Converting that to RGB is left to whoever owns
/// the display.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FrameBuffer {
    pixels: Box<[u16]>,
}

impl FrameBuffer {
    pub const WIDTH: usize = SCREEN_WIDTH;
    pub const HEIGHT: usize = SCREEN_HEIGHT;
    /// Bit position of the emphasis field.
    pub const EMPHASIS_SHIFT: u16 = 6;

    pub fn new() -> Self {
        Self {
            pixels: vec![0; Self::WIDTH * Self::HEIGHT].into_boxed_slice(),
        }
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Packed pixel at `(x, y)`, or `None` outside the visible area.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u16> {
        if x < Self::WIDTH && y < Self::HEIGHT {
            Some(self.pixels[y * Self::WIDTH + x])
        } else {
            None
        }
    }

    pub fn row(&self, y: usize) -> Option<&[u16]> {
        self.pixels.chunks_exact(Self::WIDTH).nth(y)
    }

    pub(crate) fn clear(&mut self) {
        self.pixels.fill(0);
    }

    #[inline]
    pub(crate) fn set(&mut self, x: usize, y: usize, value: u16) {
        debug_assert!(x < Self::WIDTH && y < Self::HEIGHT);
        self.pixels[y * Self::WIDTH + x] = value;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &Self::WIDTH)
            .field("height", &Self::HEIGHT)
            .finish_non_exhaustive()
    }
}
