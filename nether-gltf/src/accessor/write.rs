//! Appending typed arrays to buffers

use crate::data::AccessorData;
use crate::document::{Accessor, Buffer, BufferTarget, BufferView, Document};
use crate::layout::{align_to, packed_byte_size};

/// Where [`append_view`] placed an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRegion {
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Set only for vertex attributes whose elements carry padding
    pub byte_stride: Option<usize>,
}

/// Append `data` to `dest` and describe the region written.
///
/// The region starts on a multiple of the component width (zero padding is
/// inserted before it) and holds `len * element_byte_size` bytes. Existing
/// bytes are never modified.
pub fn append_view(
    dest: &mut Vec<u8>,
    target: Option<BufferTarget>,
    data: &AccessorData,
) -> BufferRegion {
    let component = data.component_type();
    let shape = data.accessor_type();
    let element_size = data.element_byte_size();

    let byte_stride = match target {
        Some(BufferTarget::ArrayBuffer)
            if packed_byte_size(component, shape) as usize != element_size =>
        {
            Some(element_size)
        }
        _ => None,
    };

    let byte_offset = align_to(dest.len(), component.byte_size() as usize);
    let byte_length = data.len() * element_size;
    dest.resize(byte_offset + byte_length, 0);
    data.write_packed(&mut dest[byte_offset..]);

    BufferRegion {
        byte_offset,
        byte_length,
        byte_stride,
    }
}

/// Append `data` to the document's last buffer and add a buffer view for it.
///
/// A buffer is created when the document has none. Returns the view index.
pub fn write_view(doc: &mut Document, target: Option<BufferTarget>, data: &AccessorData) -> usize {
    if doc.buffers.is_empty() {
        doc.buffers.push(Buffer::default());
    }
    let buffer_index = doc.buffers.len() - 1;
    let buffer = &mut doc.buffers[buffer_index];
    let region = append_view(&mut buffer.data, target, data);
    buffer.byte_length = buffer.data.len();

    doc.buffer_views.push(BufferView {
        buffer: buffer_index,
        byte_offset: region.byte_offset,
        byte_length: region.byte_length,
        byte_stride: region.byte_stride,
        target,
        name: None,
        other: Default::default(),
    });
    doc.buffer_views.len() - 1
}

/// Append `data` as a new buffer view plus accessor. Returns the accessor index.
pub fn write_accessor(doc: &mut Document, target: Option<BufferTarget>, data: &AccessorData) -> usize {
    let view = write_view(doc, target, data);
    let mut accessor = Accessor::new(data.component_type(), data.accessor_type(), data.len());
    accessor.buffer_view = Some(view);
    doc.accessors.push(accessor);
    doc.accessors.len() - 1
}
