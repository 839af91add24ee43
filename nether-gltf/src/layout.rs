//! Layout rules for accessor elements
//!
//! Every element occupies a fixed-size byte window derived from its component
//! encoding and shape:
//!
//! ```text
//! Scalar:  width                                  (never padded)
//! VecN:    ceil4(N * width)
//! MatN:    ceil4(N * width) * N                   (each column padded)
//! ```
//!
//! Matrices are column-major. A column's components sit at the start of the
//! column slot; the remaining bytes of the slot are padding.

use serde::{Deserialize, Serialize};

use crate::error::GltfError;

// ============================================================================
// Component Encoding
// ============================================================================

/// Numeric encoding of a single component.
///
/// Serialized as the glTF `componentType` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ComponentType {
    /// Signed 8-bit integer (5120)
    I8,
    /// Unsigned 8-bit integer (5121)
    U8,
    /// Signed 16-bit integer (5122)
    I16,
    /// Unsigned 16-bit integer (5123)
    U16,
    /// Unsigned 32-bit integer (5125)
    U32,
    /// IEEE 754 single-precision float (5126)
    F32,
}

impl ComponentType {
    /// All six encodings, in code order.
    pub const ALL: [ComponentType; 6] = [
        ComponentType::I8,
        ComponentType::U8,
        ComponentType::I16,
        ComponentType::U16,
        ComponentType::U32,
        ComponentType::F32,
    ];

    /// glTF `componentType` code
    pub const fn code(self) -> u32 {
        match self {
            ComponentType::I8 => 5120,
            ComponentType::U8 => 5121,
            ComponentType::I16 => 5122,
            ComponentType::U16 => 5123,
            ComponentType::U32 => 5125,
            ComponentType::F32 => 5126,
        }
    }

    /// Look up an encoding by its glTF code
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            5120 => Some(ComponentType::I8),
            5121 => Some(ComponentType::U8),
            5122 => Some(ComponentType::I16),
            5123 => Some(ComponentType::U16),
            5125 => Some(ComponentType::U32),
            5126 => Some(ComponentType::F32),
            _ => None,
        }
    }

    /// Width of one component in bytes
    pub const fn byte_size(self) -> u32 {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::U32 | ComponentType::F32 => 4,
        }
    }

    /// Whether this encoding may back an index array (indices, sparse indices)
    pub const fn is_index(self) -> bool {
        matches!(
            self,
            ComponentType::U8 | ComponentType::U16 | ComponentType::U32
        )
    }
}

impl TryFrom<u32> for ComponentType {
    type Error = GltfError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        ComponentType::from_code(code)
            .ok_or_else(|| GltfError::UnsupportedLayout(format!("component type {code}")))
    }
}

impl From<ComponentType> for u32 {
    fn from(ct: ComponentType) -> Self {
        ct.code()
    }
}

// ============================================================================
// Element Shape
// ============================================================================

/// Shape of one accessor element.
///
/// Serialized as the glTF `type` string (`"SCALAR"`, `"VEC3"`, `"MAT4"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    /// All seven shapes.
    pub const ALL: [AccessorType; 7] = [
        AccessorType::Scalar,
        AccessorType::Vec2,
        AccessorType::Vec3,
        AccessorType::Vec4,
        AccessorType::Mat2,
        AccessorType::Mat3,
        AccessorType::Mat4,
    ];

    /// Number of components in one element
    pub const fn component_count(self) -> u32 {
        match self {
            AccessorType::Scalar => 1,
            AccessorType::Vec2 => 2,
            AccessorType::Vec3 => 3,
            AccessorType::Vec4 | AccessorType::Mat2 => 4,
            AccessorType::Mat3 => 9,
            AccessorType::Mat4 => 16,
        }
    }

    /// Number of columns (1 for scalars and vectors)
    pub const fn column_count(self) -> u32 {
        match self {
            AccessorType::Mat2 => 2,
            AccessorType::Mat3 => 3,
            AccessorType::Mat4 => 4,
            _ => 1,
        }
    }

    /// Number of components per column
    pub const fn row_count(self) -> u32 {
        self.component_count() / self.column_count()
    }

    pub const fn is_matrix(self) -> bool {
        matches!(
            self,
            AccessorType::Mat2 | AccessorType::Mat3 | AccessorType::Mat4
        )
    }
}

// ============================================================================
// Size Rules
// ============================================================================

/// Round `value` up to the next multiple of `alignment` (a power of two or any non-zero value).
#[inline]
pub const fn align_to(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

/// Bytes of zero padding needed to move `offset` onto an `alignment` boundary.
#[inline]
pub const fn padding_for(offset: usize, alignment: usize) -> usize {
    align_to(offset, alignment) - offset
}

/// Byte size of one element, including vector and column padding.
pub const fn element_byte_size(component: ComponentType, shape: AccessorType) -> u32 {
    let width = component.byte_size();
    match shape {
        AccessorType::Scalar => width,
        _ => column_byte_size(component, shape) * shape.column_count(),
    }
}

/// Byte size of one padded column (for vectors, the whole element).
pub const fn column_byte_size(component: ComponentType, shape: AccessorType) -> u32 {
    let raw = shape.row_count() * component.byte_size();
    match shape {
        AccessorType::Scalar => raw,
        _ => (raw + 3) & !3,
    }
}

/// Unpadded byte size of one element (`width * component_count`).
pub const fn packed_byte_size(component: ComponentType, shape: AccessorType) -> u32 {
    component.byte_size() * shape.component_count()
}

/// Number of components in one element of `shape`.
pub const fn component_count(shape: AccessorType) -> u32 {
    shape.component_count()
}

/// Whether `shape` is a matrix.
pub const fn is_matrix(shape: AccessorType) -> bool {
    shape.is_matrix()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference formula written out independently of the implementation
    fn expected_size(component: ComponentType, shape: AccessorType) -> u32 {
        let width = component.byte_size();
        if shape == AccessorType::Scalar {
            return width;
        }
        let rows = shape.row_count() * width;
        let padded = rows.div_ceil(4) * 4;
        padded * shape.column_count()
    }

    #[test]
    fn test_element_size_matches_formula_for_all_pairs() {
        for component in ComponentType::ALL {
            for shape in AccessorType::ALL {
                assert_eq!(
                    element_byte_size(component, shape),
                    expected_size(component, shape),
                    "{component:?} {shape:?}"
                );
            }
        }
    }

    #[test]
    fn test_padded_special_cases() {
        use AccessorType::*;
        use ComponentType::*;

        assert_eq!(element_byte_size(U8, Vec2), 4);
        assert_eq!(element_byte_size(U8, Vec3), 4);
        assert_eq!(element_byte_size(I16, Vec3), 8);
        assert_eq!(element_byte_size(U8, Mat2), 8);
        assert_eq!(element_byte_size(U8, Mat3), 12);
        assert_eq!(element_byte_size(I16, Mat3), 24);
        assert_eq!(element_byte_size(U32, Mat3), 36);
        assert_eq!(element_byte_size(F32, Mat4), 64);
        assert_eq!(element_byte_size(I8, Mat4), 16);
    }

    #[test]
    fn test_scalars_are_not_padded() {
        assert_eq!(element_byte_size(ComponentType::U8, AccessorType::Scalar), 1);
        assert_eq!(element_byte_size(ComponentType::U16, AccessorType::Scalar), 2);
        assert_eq!(element_byte_size(ComponentType::F32, AccessorType::Scalar), 4);
    }

    #[test]
    fn test_packed_size_differs_only_when_padded() {
        assert_eq!(packed_byte_size(ComponentType::U8, AccessorType::Vec3), 3);
        assert_eq!(packed_byte_size(ComponentType::F32, AccessorType::Vec3), 12);
        assert_eq!(
            packed_byte_size(ComponentType::F32, AccessorType::Vec3),
            element_byte_size(ComponentType::F32, AccessorType::Vec3)
        );
    }

    #[test]
    fn test_shape_counts() {
        let counts: Vec<u32> = AccessorType::ALL.iter().map(|s| s.component_count()).collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 4, 9, 16]);
        let columns: Vec<u32> = AccessorType::ALL.iter().map(|s| s.column_count()).collect();
        assert_eq!(columns, vec![1, 1, 1, 1, 2, 3, 4]);
        assert!(is_matrix(AccessorType::Mat2));
        assert!(!is_matrix(AccessorType::Vec4));
        assert_eq!(component_count(AccessorType::Mat3), 9);
    }

    #[test]
    fn test_component_codes() {
        for component in ComponentType::ALL {
            assert_eq!(ComponentType::from_code(component.code()), Some(component));
        }
        assert_eq!(ComponentType::from_code(5124), None);
        assert!(matches!(
            ComponentType::try_from(5130),
            Err(GltfError::UnsupportedLayout(_))
        ));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&AccessorType::Vec3).unwrap(), "\"VEC3\"");
        assert_eq!(
            serde_json::from_str::<AccessorType>("\"SCALAR\"").unwrap(),
            AccessorType::Scalar
        );
        assert_eq!(serde_json::to_string(&ComponentType::F32).unwrap(), "5126");
        assert_eq!(
            serde_json::from_str::<ComponentType>("5123").unwrap(),
            ComponentType::U16
        );
        assert!(serde_json::from_str::<ComponentType>("5124").is_err());
    }

    #[test]
    fn test_alignment_helpers() {
        assert_eq!(align_to(0, 4), 0);
        assert_eq!(align_to(5, 4), 8);
        assert_eq!(align_to(5, 2), 6);
        assert_eq!(padding_for(6, 4), 2);
        assert_eq!(padding_for(8, 4), 0);
        assert_eq!(padding_for(7, 1), 0);
    }
}
