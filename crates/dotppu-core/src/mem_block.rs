//! Fixed-size backing arrays for PPU memories and line buffers.
//!
//! Everything the PPU touches per dot lives in a [`MemBlock`], sized at compile
//! time so the hot path never allocates. With the `boxed-memblock` feature (or on
//! wasm) the storage moves to the heap, which keeps `Ppu` cheap to move around on
//! targets with small stacks.

use core::ops::{Deref, DerefMut};

#[cfg(any(feature = "boxed-memblock", target_arch = "wasm32"))]
mod storage {
    pub(super) type Storage<T, const N: usize> = Box<[T; N]>;

    pub(super) fn filled<T: Copy, const N: usize>(value: T) -> Storage<T, N> {
        Box::new([value; N])
    }
}

#[cfg(not(any(feature = "boxed-memblock", target_arch = "wasm32")))]
mod storage {
    pub(super) type Storage<T, const N: usize> = [T; N];

    pub(super) fn filled<T: Copy, const N: usize>(value: T) -> Storage<T, N> {
        [value; N]
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemBlock<T, const N: usize>(storage::Storage<T, N>);

/// Primary object attribute memory.
pub type OamRam = MemBlock<u8, { crate::memory::ppu::OAM_RAM_SIZE }>;
/// Internal palette memory (`$3F00-$3F1F`).
pub type PaletteRam = MemBlock<u8, { crate::memory::ppu::PALETTE_RAM_SIZE }>;
/// Background pixels for one scanline plus the two prefetched tiles.
pub type BackgroundLine = MemBlock<u8, { crate::memory::ppu::BACKGROUND_LINE_WIDTH }>;
/// Sprite pixels for one scanline.
pub type SpriteLine = MemBlock<u16, { crate::memory::ppu::SCREEN_WIDTH }>;

impl<T: Copy, const N: usize> MemBlock<T, N> {
    /// Creates a block with every element set to `value`.
    #[inline]
    pub fn filled(value: T) -> Self {
        Self(storage::filled(value))
    }
}

impl<T: Copy + Default, const N: usize> MemBlock<T, N> {
    pub fn new() -> Self {
        Self::filled(T::default())
    }
}

impl<T, const N: usize> MemBlock<T, N> {
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.0[..]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0[..]
    }
}

impl<T: Copy + Default, const N: usize> Default for MemBlock<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Deref for MemBlock<T, N> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for MemBlock<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

#[cfg(feature = "savestate-serde")]
impl<T, const N: usize> serde::Serialize for MemBlock<T, N>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(N))?;
        for item in self.as_slice() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

#[cfg(feature = "savestate-serde")]
impl<'de, T, const N: usize> serde::Deserialize<'de> for MemBlock<T, N>
where
    T: Copy + Default + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor<T, const N: usize>(core::marker::PhantomData<T>);

        impl<'de, T, const N: usize> serde::de::Visitor<'de> for Visitor<T, N>
        where
            T: Copy + Default + serde::Deserialize<'de>,
        {
            type Value = MemBlock<T, N>;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "a sequence of length {N}")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = MemBlock::<T, N>::new();
                for idx in 0..N {
                    let Some(value) = seq.next_element::<T>()? else {
                        return Err(serde::de::Error::invalid_length(idx, &self));
                    };
                    out[idx] = value;
                }
                Ok(out)
            }
        }

        deserializer.deserialize_seq(Visitor::<T, N>(core::marker::PhantomData))
    }
}
