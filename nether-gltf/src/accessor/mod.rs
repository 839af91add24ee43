//! Accessor resolution
//!
//! Turns typed-view descriptions into [`AccessorData`] and back. Reads are
//! pure over borrowed bytes; writes only ever append to a buffer.
//!
//! # Read order
//!
//! 1. No buffer view and no sparse overlay: no data (`Ok(None)`).
//! 2. Direct pass: element `i` is decoded from
//!    `byte_offset + i * stride` (stride defaults to the element size).
//!    Without a buffer view every element starts as zero, and the array is
//!    held to the document's `max_memory_allocation`.
//! 3. Sparse pass: `result[indices[k]] = values[k]`, in order, so a repeated
//!    index keeps its last value.

mod sparse;
mod write;


pub use sparse::{SparseDescriptor, apply_sparse};
pub use write::{BufferRegion, append_view, write_accessor, write_view};

use crate::data::AccessorData;
use crate::document::{Accessor, Document};
use crate::error::GltfError;
use crate::layout::{AccessorType, ComponentType, element_byte_size};

/// Typed view over a byte slice. Does not own any bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub component_type: ComponentType,
    pub accessor_type: AccessorType,
    pub count: usize,
    pub byte_offset: usize,
    /// Distance between element starts; 0 means tightly packed
    pub byte_stride: usize,
}

impl ViewDescriptor {
    /// Tightly packed view starting at offset 0
    pub fn new(component_type: ComponentType, accessor_type: AccessorType, count: usize) -> Self {
        Self {
            component_type,
            accessor_type,
            count,
            byte_offset: 0,
            byte_stride: 0,
        }
    }

    pub fn with_offset(mut self, byte_offset: usize) -> Self {
        self.byte_offset = byte_offset;
        self
    }

    pub fn with_stride(mut self, byte_stride: usize) -> Self {
        self.byte_stride = byte_stride;
        self
    }

    /// Padded byte size of one element
    pub fn element_byte_size(&self) -> usize {
        element_byte_size(self.component_type, self.accessor_type) as usize
    }

    /// Stride actually used to step between elements
    pub fn effective_stride(&self) -> usize {
        if self.byte_stride == 0 {
            self.element_byte_size()
        } else {
            self.byte_stride
        }
    }

    /// One past the last byte touched, or `None` on arithmetic overflow.
    pub fn byte_end(&self) -> Option<usize> {
        if self.count == 0 {
            return Some(self.byte_offset);
        }
        (self.count - 1)
            .checked_mul(self.effective_stride())?
            .checked_add(self.element_byte_size())?
            .checked_add(self.byte_offset)
    }
}

/// Decode the elements described by `desc` from `source`.
///
/// `recycled` is reused when its layout matches; the result is identical to
/// a fresh allocation either way.
pub fn read_view(
    desc: &ViewDescriptor,
    source: &[u8],
    recycled: Option<AccessorData>,
) -> Result<AccessorData, GltfError> {
    let end = desc.byte_end().ok_or(GltfError::ShortBuffer {
        needed: usize::MAX,
        available: source.len(),
    })?;
    if end > source.len() {
        return Err(GltfError::ShortBuffer {
            needed: end,
            available: source.len(),
        });
    }

    let mut data = AccessorData::recycle_or_zeroed(
        recycled,
        desc.component_type,
        desc.accessor_type,
        desc.count,
    );
    data.read_strided(source, desc.byte_offset, desc.effective_stride());
    Ok(data)
}

/// Resolve a document accessor, including its sparse overlay.
///
/// Returns `Ok(None)` when the accessor has neither a buffer view nor a
/// sparse overlay.
pub fn read_accessor(
    doc: &Document,
    accessor: &Accessor,
    recycled: Option<AccessorData>,
) -> Result<Option<AccessorData>, GltfError> {
    let mut data = match accessor.buffer_view {
        Some(view_index) => {
            let view = doc.buffer_view(view_index)?;
            let desc = ViewDescriptor {
                component_type: accessor.component_type,
                accessor_type: accessor.accessor_type,
                count: accessor.count,
                byte_offset: accessor.byte_offset,
                byte_stride: view.byte_stride.unwrap_or(0),
            };
            read_view(&desc, doc.view_bytes(view_index)?, recycled)?
        }
        None if accessor.sparse.is_some() => zero_filled(doc, accessor, recycled)?,
        None => return Ok(None),
    };

    if let Some(sparse) = &accessor.sparse {
        sparse::apply_document_sparse(doc, sparse, &mut data)?;
    }

    Ok(Some(data))
}

/// [`read_accessor`] by accessor index.
pub fn read_accessor_at(
    doc: &Document,
    index: usize,
    recycled: Option<AccessorData>,
) -> Result<Option<AccessorData>, GltfError> {
    read_accessor(doc, doc.accessor(index)?, recycled)
}

/// `accessor.count` zero elements for an accessor without backing bytes.
///
/// Nothing in the source bounds the size, so it is held to the memory quota
/// the document was decoded under.
pub(crate) fn zero_filled(
    doc: &Document,
    accessor: &Accessor,
    recycled: Option<AccessorData>,
) -> Result<AccessorData, GltfError> {
    let (component, shape) = (accessor.component_type, accessor.accessor_type);
    let limit = doc.decode_options.max_memory_allocation;
    let bytes = (accessor.count as u64)
        .checked_mul(element_byte_size(component, shape) as u64)
        .filter(|&bytes| bytes <= limit)
        .ok_or_else(|| {
            GltfError::QuotaExceeded(format!(
                "accessor of {} {:?}/{:?} elements exceeds limit of {limit} bytes",
                accessor.count, component, shape
            ))
        })?;
    tracing::debug!("Synthesizing {} zero bytes for accessor without a buffer view", bytes);

    let mut data = AccessorData::recycle_or_zeroed(recycled, component, shape, accessor.count);
    data.clear_to_zero();
    Ok(data)
}
