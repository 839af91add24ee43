//! Typed accessor arrays
//!
//! [`AccessorData`] is a closed sum over every (component encoding, shape)
//! pair. Matching on it is exhaustive, so a new element type can only be
//! added by extending the table at the bottom of this file.

use std::any::Any;

use crate::element::{Component, Element};
use crate::error::GltfError;
use crate::layout::{AccessorType, ComponentType, element_byte_size};

macro_rules! accessor_data {
    ($($variant:ident => $ty:ty = ($ct:ident, $at:ident)),* $(,)?) => {
        /// A typed array of accessor elements.
        #[derive(Debug, Clone, PartialEq)]
        pub enum AccessorData {
            $($variant(Vec<$ty>),)*
        }

        impl AccessorData {
            /// Array of `count` default (zero) elements for the given layout.
            pub fn zeroed(component: ComponentType, shape: AccessorType, count: usize) -> Self {
                match (component, shape) {
                    $((ComponentType::$ct, AccessorType::$at) => {
                        AccessorData::$variant(vec![<$ty>::default(); count])
                    })*
                }
            }

            pub fn component_type(&self) -> ComponentType {
                match self {
                    $(AccessorData::$variant(_) => ComponentType::$ct,)*
                }
            }

            pub fn accessor_type(&self) -> AccessorType {
                match self {
                    $(AccessorData::$variant(_) => AccessorType::$at,)*
                }
            }

            /// Number of elements
            pub fn len(&self) -> usize {
                match self {
                    $(AccessorData::$variant(v) => v.len(),)*
                }
            }

            /// Grow with zero elements or truncate to `count`.
            pub fn resize(&mut self, count: usize) {
                match self {
                    $(AccessorData::$variant(v) => v.resize(count, <$ty>::default()),)*
                }
            }

            /// Reset every element to zero without changing the length.
            pub fn clear_to_zero(&mut self) {
                match self {
                    $(AccessorData::$variant(v) => v.fill(<$ty>::default()),)*
                }
            }

            /// Borrow the elements as `&[E]` when `E` matches this variant.
            pub fn as_slice<E: Element>(&self) -> Option<&[E]> {
                match self {
                    $(AccessorData::$variant(v) => {
                        (v as &dyn Any).downcast_ref::<Vec<E>>().map(Vec::as_slice)
                    })*
                }
            }

            /// Decode `self.len()` elements from `source`.
            ///
            /// The caller guarantees every window lies inside `source`.
            pub(crate) fn read_strided(&mut self, source: &[u8], offset: usize, stride: usize) {
                match self {
                    $(AccessorData::$variant(v) => {
                        crate::element::read_strided(source, offset, stride, v)
                    })*
                }
            }

            /// Encode all elements tightly into `dest`.
            pub(crate) fn write_packed(&self, dest: &mut [u8]) {
                match self {
                    $(AccessorData::$variant(v) => crate::element::write_packed(v, dest),)*
                }
            }

            /// Encode element `index` into `window`.
            pub(crate) fn write_element(&self, index: usize, window: &mut [u8]) {
                match self {
                    $(AccessorData::$variant(v) => v[index].write(window),)*
                }
            }

            /// Copy element `from` of `source` into slot `to` of `self`.
            ///
            /// Both arrays must share a layout.
            pub(crate) fn copy_element(
                &mut self,
                to: usize,
                source: &AccessorData,
                from: usize,
            ) -> Result<(), GltfError> {
                match (self, source) {
                    $((AccessorData::$variant(dst), AccessorData::$variant(src)) => {
                        dst[to] = src[from];
                        Ok(())
                    })*
                    (dst, src) => Err(GltfError::UnsupportedLayout(format!(
                        "cannot copy {:?}/{:?} into {:?}/{:?}",
                        src.component_type(),
                        src.accessor_type(),
                        dst.component_type(),
                        dst.accessor_type()
                    ))),
                }
            }

            /// Flatten to f32 components in column-major order.
            pub fn to_f32_components(&self, normalized: bool) -> Vec<f32> {
                match self {
                    $(AccessorData::$variant(v) => flatten(v, |c| c.to_f32(normalized)),)*
                }
            }

            /// Flatten to u32 components in column-major order.
            pub fn to_u32_components(&self) -> Vec<u32> {
                match self {
                    $(AccessorData::$variant(v) => flatten(v, |c| c.to_u32()),)*
                }
            }
        }

        $(
            impl From<Vec<$ty>> for AccessorData {
                fn from(values: Vec<$ty>) -> Self {
                    AccessorData::$variant(values)
                }
            }

            impl TryFrom<AccessorData> for Vec<$ty> {
                type Error = GltfError;

                fn try_from(data: AccessorData) -> Result<Self, Self::Error> {
                    match data {
                        AccessorData::$variant(v) => Ok(v),
                        other => Err(GltfError::UnsupportedLayout(format!(
                            "expected {:?}/{:?}, found {:?}/{:?}",
                            ComponentType::$ct,
                            AccessorType::$at,
                            other.component_type(),
                            other.accessor_type()
                        ))),
                    }
                }
            }
        )*
    };
}

fn flatten<E: Element, T>(values: &[E], mut convert: impl FnMut(E::Component) -> T) -> Vec<T> {
    let n = E::SHAPE.component_count() as usize;
    let mut out = Vec::with_capacity(values.len() * n);
    for value in values {
        out.extend((0..n).map(|i| convert(value.component(i))));
    }
    out
}

impl AccessorData {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Padded byte size of one element
    pub fn element_byte_size(&self) -> usize {
        element_byte_size(self.component_type(), self.accessor_type()) as usize
    }

    /// Reuse `recycled` when its layout matches, otherwise allocate.
    ///
    /// The result always has exactly `count` elements; reused storage keeps
    /// its old values, so callers must overwrite or zero them.
    pub(crate) fn recycle_or_zeroed(
        recycled: Option<AccessorData>,
        component: ComponentType,
        shape: AccessorType,
        count: usize,
    ) -> Self {
        match recycled {
            Some(mut data)
                if data.component_type() == component && data.accessor_type() == shape =>
            {
                data.resize(count);
                data
            }
            _ => AccessorData::zeroed(component, shape, count),
        }
    }
}

accessor_data! {
    I8 => i8 = (I8, Scalar),
    I8Vec2 => [i8; 2] = (I8, Vec2),
    I8Vec3 => [i8; 3] = (I8, Vec3),
    I8Vec4 => [i8; 4] = (I8, Vec4),
    I8Mat2 => [[i8; 2]; 2] = (I8, Mat2),
    I8Mat3 => [[i8; 3]; 3] = (I8, Mat3),
    I8Mat4 => [[i8; 4]; 4] = (I8, Mat4),

    U8 => u8 = (U8, Scalar),
    U8Vec2 => [u8; 2] = (U8, Vec2),
    U8Vec3 => [u8; 3] = (U8, Vec3),
    U8Vec4 => [u8; 4] = (U8, Vec4),
    U8Mat2 => [[u8; 2]; 2] = (U8, Mat2),
    U8Mat3 => [[u8; 3]; 3] = (U8, Mat3),
    U8Mat4 => [[u8; 4]; 4] = (U8, Mat4),

    I16 => i16 = (I16, Scalar),
    I16Vec2 => [i16; 2] = (I16, Vec2),
    I16Vec3 => [i16; 3] = (I16, Vec3),
    I16Vec4 => [i16; 4] = (I16, Vec4),
    I16Mat2 => [[i16; 2]; 2] = (I16, Mat2),
    I16Mat3 => [[i16; 3]; 3] = (I16, Mat3),
    I16Mat4 => [[i16; 4]; 4] = (I16, Mat4),

    U16 => u16 = (U16, Scalar),
    U16Vec2 => [u16; 2] = (U16, Vec2),
    U16Vec3 => [u16; 3] = (U16, Vec3),
    U16Vec4 => [u16; 4] = (U16, Vec4),
    U16Mat2 => [[u16; 2]; 2] = (U16, Mat2),
    U16Mat3 => [[u16; 3]; 3] = (U16, Mat3),
    U16Mat4 => [[u16; 4]; 4] = (U16, Mat4),

    U32 => u32 = (U32, Scalar),
    U32Vec2 => [u32; 2] = (U32, Vec2),
    U32Vec3 => [u32; 3] = (U32, Vec3),
    U32Vec4 => [u32; 4] = (U32, Vec4),
    U32Mat2 => [[u32; 2]; 2] = (U32, Mat2),
    U32Mat3 => [[u32; 3]; 3] = (U32, Mat3),
    U32Mat4 => [[u32; 4]; 4] = (U32, Mat4),

    F32 => f32 = (F32, Scalar),
    F32Vec2 => [f32; 2] = (F32, Vec2),
    F32Vec3 => [f32; 3] = (F32, Vec3),
    F32Vec4 => [f32; 4] = (F32, Vec4),
    F32Mat2 => [[f32; 2]; 2] = (F32, Mat2),
    F32Mat3 => [[f32; 3]; 3] = (F32, Mat3),
    F32Mat4 => [[f32; 4]; 4] = (F32, Mat4),
}
