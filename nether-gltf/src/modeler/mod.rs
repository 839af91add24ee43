//! Typed vertex-attribute helpers
//!
//! Writers append a buffer view plus accessor to the document's last buffer
//! and return the new accessor index. Readers resolve an accessor and convert
//! it to the canonical Rust shape of that attribute, applying unorm/snorm
//! rules to normalized integers.

#[cfg(test)]
mod tests;

use crate::accessor::{self, write_view, zero_filled};
use crate::data::AccessorData;
use crate::document::{Accessor, BufferTarget, BufferView, Document, Image};
use crate::error::GltfError;
use crate::layout::{AccessorType, ComponentType, align_to};

pub use crate::accessor::write_accessor;

// ============================================================================
// Writers
// ============================================================================

fn write_attribute(doc: &mut Document, data: AccessorData) -> usize {
    write_accessor(doc, Some(BufferTarget::ArrayBuffer), &data)
}

/// Write triangle indices using the smallest encoding that holds them.
pub fn write_indices(doc: &mut Document, indices: &[u32]) -> usize {
    let max = indices.iter().copied().max().unwrap_or(0);
    let data = if max <= u8::MAX as u32 {
        AccessorData::from(indices.iter().map(|&i| i as u8).collect::<Vec<u8>>())
    } else if max <= u16::MAX as u32 {
        AccessorData::from(indices.iter().map(|&i| i as u16).collect::<Vec<u16>>())
    } else {
        AccessorData::from(indices.to_vec())
    };
    write_accessor(doc, Some(BufferTarget::ElementArrayBuffer), &data)
}

/// Write vertex positions and record their bounds.
pub fn write_positions(doc: &mut Document, positions: &[[f32; 3]]) -> usize {
    let index = write_attribute(doc, AccessorData::from(positions.to_vec()));
    if let Some((min, max)) = bounds(positions) {
        let accessor = &mut doc.accessors[index];
        accessor.min = Some(min);
        accessor.max = Some(max);
    }
    index
}

fn bounds<const N: usize>(values: &[[f32; N]]) -> Option<(Vec<f64>, Vec<f64>)> {
    let first = values.first()?;
    let mut min = first.map(f64::from);
    let mut max = min;
    for value in &values[1..] {
        for i in 0..N {
            let v = f64::from(value[i]);
            min[i] = min[i].min(v);
            max[i] = max[i].max(v);
        }
    }
    Some((min.to_vec(), max.to_vec()))
}

pub fn write_normals(doc: &mut Document, normals: &[[f32; 3]]) -> usize {
    write_attribute(doc, AccessorData::from(normals.to_vec()))
}

pub fn write_tangents(doc: &mut Document, tangents: &[[f32; 4]]) -> usize {
    write_attribute(doc, AccessorData::from(tangents.to_vec()))
}

pub fn write_texcoords(doc: &mut Document, texcoords: &[[f32; 2]]) -> usize {
    write_attribute(doc, AccessorData::from(texcoords.to_vec()))
}

pub fn write_colors(doc: &mut Document, colors: &[[f32; 4]]) -> usize {
    write_attribute(doc, AccessorData::from(colors.to_vec()))
}

/// Write RGBA8 colors as a normalized accessor.
pub fn write_colors_unorm8(doc: &mut Document, colors: &[[u8; 4]]) -> usize {
    let index = write_attribute(doc, AccessorData::from(colors.to_vec()));
    doc.accessors[index].normalized = true;
    index
}

pub fn write_joints(doc: &mut Document, joints: &[[u16; 4]]) -> usize {
    write_attribute(doc, AccessorData::from(joints.to_vec()))
}

pub fn write_weights(doc: &mut Document, weights: &[[f32; 4]]) -> usize {
    write_attribute(doc, AccessorData::from(weights.to_vec()))
}

/// Write several attributes into one strided buffer view.
///
/// Each attribute starts on a 4-byte boundary within the record. Returns one
/// accessor index per attribute, in order.
pub fn write_attributes_interleaved(
    doc: &mut Document,
    attributes: &[&AccessorData],
) -> Result<Vec<usize>, GltfError> {
    let Some(first) = attributes.first() else {
        return Ok(Vec::new());
    };
    let count = first.len();
    if let Some(other) = attributes.iter().find(|a| a.len() != count) {
        return Err(GltfError::AttributeCountMismatch {
            expected: count,
            found: other.len(),
        });
    }

    let mut offsets = Vec::with_capacity(attributes.len());
    let mut stride = 0;
    for attribute in attributes {
        offsets.push(stride);
        stride = align_to(stride + attribute.element_byte_size(), 4);
    }

    if doc.buffers.is_empty() {
        doc.buffers.push(Default::default());
    }
    let buffer_index = doc.buffers.len() - 1;
    let buffer = &mut doc.buffers[buffer_index];
    let base = align_to(buffer.data.len(), 4);
    let byte_length = count * stride;
    buffer.data.resize(base + byte_length, 0);

    for (attribute, &offset) in attributes.iter().zip(&offsets) {
        let size = attribute.element_byte_size();
        for i in 0..count {
            let start = base + i * stride + offset;
            attribute.write_element(i, &mut buffer.data[start..start + size]);
        }
    }
    buffer.byte_length = buffer.data.len();

    doc.buffer_views.push(BufferView {
        buffer: buffer_index,
        byte_offset: base,
        byte_length,
        byte_stride: Some(stride),
        target: Some(BufferTarget::ArrayBuffer),
        name: None,
        other: Default::default(),
    });
    let view = doc.buffer_views.len() - 1;

    let indices = attributes
        .iter()
        .zip(offsets)
        .map(|(attribute, offset)| {
            let mut accessor =
                Accessor::new(attribute.component_type(), attribute.accessor_type(), count);
            accessor.buffer_view = Some(view);
            accessor.byte_offset = offset;
            doc.accessors.push(accessor);
            doc.accessors.len() - 1
        })
        .collect();
    Ok(indices)
}

/// Store encoded image bytes in the last buffer and add an image for them.
pub fn write_image(doc: &mut Document, bytes: &[u8], mime_type: &str) -> usize {
    let view = write_view(doc, None, &AccessorData::from(bytes.to_vec()));
    doc.images.push(Image {
        mime_type: Some(mime_type.to_string()),
        buffer_view: Some(view),
        ..Default::default()
    });
    doc.images.len() - 1
}

// ============================================================================
// Readers
// ============================================================================

/// Resolve accessor `index`; an accessor without data reads as zeros.
fn resolve(doc: &Document, index: usize) -> Result<(AccessorData, bool), GltfError> {
    let accessor = doc.accessor(index)?;
    let data = match accessor::read_accessor(doc, accessor, None)? {
        Some(data) => data,
        None => zero_filled(doc, accessor, None)?,
    };
    Ok((data, accessor.normalized))
}

fn unsupported(what: &str, data: &AccessorData) -> GltfError {
    GltfError::UnsupportedLayout(format!(
        "{what} cannot be {:?}/{:?}",
        data.component_type(),
        data.accessor_type()
    ))
}

/// Group flattened components into `N`-wide arrays.
fn group<T: Copy, const N: usize>(components: Vec<T>) -> Vec<[T; N]> {
    components
        .chunks_exact(N)
        .map(|chunk| std::array::from_fn(|i| chunk[i]))
        .collect()
}

/// Float vectors of `shape`, converting integer encodings.
fn read_float_vectors<const N: usize>(
    doc: &Document,
    index: usize,
    what: &str,
    shape: AccessorType,
) -> Result<Vec<[f32; N]>, GltfError> {
    let (data, normalized) = resolve(doc, index)?;
    if data.accessor_type() != shape || data.component_type() == ComponentType::U32 {
        return Err(unsupported(what, &data));
    }
    Ok(group(data.to_f32_components(normalized)))
}

/// Read triangle indices as u32.
pub fn read_indices(doc: &Document, index: usize) -> Result<Vec<u32>, GltfError> {
    let (data, _) = resolve(doc, index)?;
    if data.accessor_type() != AccessorType::Scalar || !data.component_type().is_index() {
        return Err(unsupported("indices", &data));
    }
    Ok(data.to_u32_components())
}

pub fn read_positions(doc: &Document, index: usize) -> Result<Vec<[f32; 3]>, GltfError> {
    read_float_vectors(doc, index, "positions", AccessorType::Vec3)
}

pub fn read_normals(doc: &Document, index: usize) -> Result<Vec<[f32; 3]>, GltfError> {
    read_float_vectors(doc, index, "normals", AccessorType::Vec3)
}

pub fn read_tangents(doc: &Document, index: usize) -> Result<Vec<[f32; 4]>, GltfError> {
    read_float_vectors(doc, index, "tangents", AccessorType::Vec4)
}

pub fn read_texcoords(doc: &Document, index: usize) -> Result<Vec<[f32; 2]>, GltfError> {
    read_float_vectors(doc, index, "texcoords", AccessorType::Vec2)
}

/// Read RGBA colors; RGB accessors get alpha 1.0.
pub fn read_colors(doc: &Document, index: usize) -> Result<Vec<[f32; 4]>, GltfError> {
    let (data, normalized) = resolve(doc, index)?;
    if data.component_type() == ComponentType::U32 {
        return Err(unsupported("colors", &data));
    }
    match data.accessor_type() {
        AccessorType::Vec4 => Ok(group(data.to_f32_components(normalized))),
        AccessorType::Vec3 => Ok(group::<f32, 3>(data.to_f32_components(normalized))
            .into_iter()
            .map(|[r, g, b]| [r, g, b, 1.0])
            .collect()),
        _ => Err(unsupported("colors", &data)),
    }
}

/// Read joint indices (u8 or u16 encodings).
pub fn read_joints(doc: &Document, index: usize) -> Result<Vec<[u16; 4]>, GltfError> {
    let (data, _) = resolve(doc, index)?;
    if let Some(joints) = data.as_slice::<[u16; 4]>() {
        return Ok(joints.to_vec());
    }
    if data.as_slice::<[u8; 4]>().is_none() {
        return Err(unsupported("joints", &data));
    }
    Ok(group(
        data.to_u32_components()
            .into_iter()
            .map(|j| j as u16)
            .collect(),
    ))
}

pub fn read_weights(doc: &Document, index: usize) -> Result<Vec<[f32; 4]>, GltfError> {
    read_float_vectors(doc, index, "weights", AccessorType::Vec4)
}
