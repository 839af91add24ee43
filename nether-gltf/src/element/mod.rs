//! Element codec
//!
//! Converts between little-endian byte windows and typed elements. The closed
//! set of element types is the product of six component encodings and seven
//! shapes:
//!
//! | Shape  | Rust type        |
//! |--------|------------------|
//! | Scalar | `C`              |
//! | Vec2   | `[C; 2]`         |
//! | Vec3   | `[C; 3]`         |
//! | Vec4   | `[C; 4]`         |
//! | Mat2   | `[[C; 2]; 2]`    |
//! | Mat3   | `[[C; 3]; 3]`    |
//! | Mat4   | `[[C; 4]; 4]`    |
//!
//! where `C` is one of `i8`, `u8`, `i16`, `u16`, `u32`, `f32`. Matrices are
//! indexed `[column][row]`, matching the column-major storage order.
//!
//! Windows must be at least [`Element::BYTE_SIZE`] bytes long. Shorter windows
//! panic on slice indexing; callers size them with [`crate::layout`] first.

#[cfg(test)]
mod tests;

use core::fmt;

use crate::layout::{AccessorType, ComponentType, column_byte_size, element_byte_size};

// ============================================================================
// Components
// ============================================================================

/// A single numeric component stored little-endian.
pub trait Component: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Encoding tag of this component type
    const TYPE: ComponentType;

    /// Read from the first `width` bytes of `bytes`
    fn read_le(bytes: &[u8]) -> Self;

    /// Write into the first `width` bytes of `bytes`
    fn write_le(self, bytes: &mut [u8]);

    /// Convert to f32, applying unorm/snorm rules when `normalized`
    fn to_f32(self, normalized: bool) -> f32;

    /// Convert to u32 (saturating for floats)
    fn to_u32(self) -> u32;
}

macro_rules! impl_component {
    ($ty:ty, $tag:ident, $width:literal, |$v:ident| $normalize:expr) => {
        impl Component for $ty {
            const TYPE: ComponentType = ComponentType::$tag;

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; $width];
                raw.copy_from_slice(&bytes[..$width]);
                <$ty>::from_le_bytes(raw)
            }

            #[inline]
            fn write_le(self, bytes: &mut [u8]) {
                bytes[..$width].copy_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn to_f32(self, normalized: bool) -> f32 {
                let $v = self;
                if normalized { $normalize } else { $v as f32 }
            }

            #[inline]
            fn to_u32(self) -> u32 {
                self as u32
            }
        }
    };
}

impl_component!(i8, I8, 1, |v| (v as f32 / 127.0).max(-1.0));
impl_component!(u8, U8, 1, |v| v as f32 / 255.0);
impl_component!(i16, I16, 2, |v| (v as f32 / 32767.0).max(-1.0));
impl_component!(u16, U16, 2, |v| v as f32 / 65535.0);
impl_component!(u32, U32, 4, |v| v as f32);
impl_component!(f32, F32, 4, |v| v);

// ============================================================================
// Elements
// ============================================================================

/// One fixed-shape accessor element.
pub trait Element: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Component type of this element
    type Component: Component;

    /// Shape tag of this element
    const SHAPE: AccessorType;

    /// Encoding tag of this element's components
    const COMPONENT: ComponentType = <Self::Component as Component>::TYPE;

    /// Padded byte size of one element
    const BYTE_SIZE: usize = element_byte_size(Self::COMPONENT, Self::SHAPE) as usize;

    /// Decode from a window of at least `BYTE_SIZE` bytes
    fn read(window: &[u8]) -> Self;

    /// Encode into a window of at least `BYTE_SIZE` bytes; padding is zeroed
    fn write(&self, window: &mut [u8]);

    /// Component at `index` in column-major order
    fn component(&self, index: usize) -> Self::Component;

    /// Build an element from its components in column-major order
    fn from_fn<F: FnMut(usize) -> Self::Component>(f: F) -> Self;
}

#[inline]
fn read_vector<C: Component, const N: usize>(window: &[u8]) -> [C; N] {
    let width = C::TYPE.byte_size() as usize;
    std::array::from_fn(|i| C::read_le(&window[i * width..]))
}

/// Write `N` components, then zero the rest of the `slot`-byte window.
#[inline]
fn write_vector<C: Component, const N: usize>(value: &[C; N], window: &mut [u8], slot: usize) {
    let width = C::TYPE.byte_size() as usize;
    for (i, component) in value.iter().enumerate() {
        component.write_le(&mut window[i * width..]);
    }
    window[N * width..slot].fill(0);
}

#[inline]
fn read_matrix<C: Component, const N: usize>(window: &[u8], column: usize) -> [[C; N]; N] {
    std::array::from_fn(|col| read_vector::<C, N>(&window[col * column..]))
}

#[inline]
fn write_matrix<C: Component, const N: usize>(value: &[[C; N]; N], window: &mut [u8], column: usize) {
    for (col, vector) in value.iter().enumerate() {
        write_vector(vector, &mut window[col * column..], column);
    }
}

macro_rules! impl_elements {
    (@vector $c:ty, $n:literal, $shape:ident) => {
        impl Element for [$c; $n] {
            type Component = $c;
            const SHAPE: AccessorType = AccessorType::$shape;

            #[inline]
            fn read(window: &[u8]) -> Self {
                read_vector(window)
            }

            #[inline]
            fn write(&self, window: &mut [u8]) {
                write_vector(self, window, Self::BYTE_SIZE)
            }

            #[inline]
            fn component(&self, index: usize) -> $c {
                self[index]
            }

            #[inline]
            fn from_fn<F: FnMut(usize) -> $c>(f: F) -> Self {
                std::array::from_fn(f)
            }
        }
    };
    (@matrix $c:ty, $n:literal, $shape:ident) => {
        impl Element for [[$c; $n]; $n] {
            type Component = $c;
            const SHAPE: AccessorType = AccessorType::$shape;

            #[inline]
            fn read(window: &[u8]) -> Self {
                read_matrix(window, column_byte_size(Self::COMPONENT, Self::SHAPE) as usize)
            }

            #[inline]
            fn write(&self, window: &mut [u8]) {
                write_matrix(self, window, column_byte_size(Self::COMPONENT, Self::SHAPE) as usize)
            }

            #[inline]
            fn component(&self, index: usize) -> $c {
                self[index / $n][index % $n]
            }

            #[inline]
            fn from_fn<F: FnMut(usize) -> $c>(mut f: F) -> Self {
                std::array::from_fn(|col| std::array::from_fn(|row| f(col * $n + row)))
            }
        }
    };
    ($($c:ty),* $(,)?) => {$(
        impl Element for $c {
            type Component = $c;
            const SHAPE: AccessorType = AccessorType::Scalar;

            #[inline]
            fn read(window: &[u8]) -> Self {
                <$c as Component>::read_le(window)
            }

            #[inline]
            fn write(&self, window: &mut [u8]) {
                self.write_le(window)
            }

            #[inline]
            fn component(&self, _index: usize) -> $c {
                *self
            }

            #[inline]
            fn from_fn<F: FnMut(usize) -> $c>(mut f: F) -> Self {
                f(0)
            }
        }

        impl_elements!(@vector $c, 2, Vec2);
        impl_elements!(@vector $c, 3, Vec3);
        impl_elements!(@vector $c, 4, Vec4);
        impl_elements!(@matrix $c, 2, Mat2);
        impl_elements!(@matrix $c, 3, Mat3);
        impl_elements!(@matrix $c, 4, Mat4);
    )*};
}

impl_elements!(i8, u8, i16, u16, u32, f32);

// ============================================================================
// Slice Helpers
// ============================================================================

/// Decode `out.len()` elements starting at `offset`, `stride` bytes apart.
///
/// The caller guarantees every window lies inside `source`.
pub(crate) fn read_strided<E: Element>(source: &[u8], offset: usize, stride: usize, out: &mut [E]) {
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = E::read(&source[offset + i * stride..]);
    }
}

/// Encode `values` tightly (stride = `E::BYTE_SIZE`) into `dest`.
pub(crate) fn write_packed<E: Element>(values: &[E], dest: &mut [u8]) {
    for (value, window) in values.iter().zip(dest.chunks_exact_mut(E::BYTE_SIZE)) {
        value.write(window);
    }
}
