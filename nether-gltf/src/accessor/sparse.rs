//! Sparse overlays

use super::{ViewDescriptor, read_view};
use crate::data::AccessorData;
use crate::document::{Document, Sparse};
use crate::error::GltfError;
use crate::layout::{AccessorType, ComponentType};

/// Location and encoding of a sparse overlay inside raw byte slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparseDescriptor {
    pub count: usize,
    /// Must be U8, U16, or U32
    pub index_type: ComponentType,
    pub indices_offset: usize,
    pub values_offset: usize,
}

/// Overwrite elements of `data` with the overlay's values.
///
/// Indices are tightly packed scalars in `index_bytes`; values are tightly
/// packed elements of `data`'s own layout in `value_bytes`. Indices need not
/// be sorted; a repeated index keeps the last value written.
pub fn apply_sparse(
    data: &mut AccessorData,
    sparse: &SparseDescriptor,
    index_bytes: &[u8],
    value_bytes: &[u8],
) -> Result<(), GltfError> {
    if !sparse.index_type.is_index() {
        return Err(GltfError::UnsupportedLayout(format!(
            "sparse indices must be unsigned integers, found {:?}",
            sparse.index_type
        )));
    }

    let indices = read_view(
        &ViewDescriptor::new(sparse.index_type, AccessorType::Scalar, sparse.count)
            .with_offset(sparse.indices_offset),
        index_bytes,
        None,
    )?
    .to_u32_components();

    let values = read_view(
        &ViewDescriptor::new(data.component_type(), data.accessor_type(), sparse.count)
            .with_offset(sparse.values_offset),
        value_bytes,
        None,
    )?;

    let len = data.len();
    for (k, &index) in indices.iter().enumerate() {
        let index = index as usize;
        if index >= len {
            return Err(GltfError::index_overflow("sparse element", index, len));
        }
        data.copy_element(index, &values, k)?;
    }
    Ok(())
}

/// Apply a document sparse overlay, resolving its buffer views.
pub(super) fn apply_document_sparse(
    doc: &Document,
    sparse: &Sparse,
    data: &mut AccessorData,
) -> Result<(), GltfError> {
    let desc = SparseDescriptor {
        count: sparse.count,
        index_type: sparse.indices.component_type,
        indices_offset: sparse.indices.byte_offset,
        values_offset: sparse.values.byte_offset,
    };
    apply_sparse(
        data,
        &desc,
        doc.view_bytes(sparse.indices.buffer_view)?,
        doc.view_bytes(sparse.values.buffer_view)?,
    )
}
