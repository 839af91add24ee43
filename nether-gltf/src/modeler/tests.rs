//! Tests for attribute helpers

use super::*;
use crate::container::{decode_slice, encode_to_vec};
use crate::config::EncodeOptions;
use crate::resource::{NoResources, PNG_MIME_TYPE, read_image};

// ============================================================================
// Indices
// ============================================================================

#[test]
fn test_indices_pick_smallest_encoding() {
    let mut doc = Document::new();
    let small = write_indices(&mut doc, &[0, 1, 2, 255]);
    let medium = write_indices(&mut doc, &[0, 256, 65535]);
    let large = write_indices(&mut doc, &[0, 65536]);

    assert_eq!(doc.accessors[small].component_type, ComponentType::U8);
    assert_eq!(doc.accessors[medium].component_type, ComponentType::U16);
    assert_eq!(doc.accessors[large].component_type, ComponentType::U32);

    for index in [small, medium, large] {
        let view = doc.accessors[index].buffer_view.unwrap();
        assert_eq!(doc.buffer_views[view].target, Some(BufferTarget::ElementArrayBuffer));
        assert_eq!(doc.buffer_views[view].byte_stride, None);
    }

    assert_eq!(read_indices(&doc, small).unwrap(), vec![0, 1, 2, 255]);
    assert_eq!(read_indices(&doc, medium).unwrap(), vec![0, 256, 65535]);
    assert_eq!(read_indices(&doc, large).unwrap(), vec![0, 65536]);
}

#[test]
fn test_u8_indices_are_contiguous() {
    let mut doc = Document::new();
    let index = write_indices(&mut doc, &[0, 1, 2]);
    let view = doc.accessors[index].buffer_view.unwrap();
    assert_eq!(doc.buffer_views[view].byte_length, 3);
    assert_eq!(doc.buffers[0].data, vec![0, 1, 2]);
}

#[test]
fn test_indices_reject_float_accessor() {
    let mut doc = Document::new();
    let index = write_normals(&mut doc, &[[0.0, 0.0, 1.0]]);
    assert!(matches!(
        read_indices(&doc, index),
        Err(GltfError::UnsupportedLayout(_))
    ));
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_positions_record_bounds() {
    let mut doc = Document::new();
    let positions = [[0.0, -1.0, 2.0], [3.0, 1.0, -2.0], [1.0, 0.5, 0.0]];
    let index = write_positions(&mut doc, &positions);

    let accessor = &doc.accessors[index];
    assert_eq!(accessor.min, Some(vec![0.0, -1.0, -2.0]));
    assert_eq!(accessor.max, Some(vec![3.0, 1.0, 2.0]));
    assert_eq!(read_positions(&doc, index).unwrap(), positions.to_vec());
}

#[test]
fn test_empty_positions_have_no_bounds() {
    let mut doc = Document::new();
    let index = write_positions(&mut doc, &[]);
    assert_eq!(doc.accessors[index].min, None);
    assert!(read_positions(&doc, index).unwrap().is_empty());
}

#[test]
fn test_float_attribute_roundtrip() {
    let mut doc = Document::new();
    let normals = [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]];
    let tangents = [[1.0, 0.0, 0.0, -1.0], [0.0, 0.0, 1.0, 1.0]];
    let uvs = [[0.25, 0.75], [1.0, 0.0]];
    let weights = [[0.5, 0.5, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0]];

    let n = write_normals(&mut doc, &normals);
    let t = write_tangents(&mut doc, &tangents);
    let uv = write_texcoords(&mut doc, &uvs);
    let w = write_weights(&mut doc, &weights);

    assert_eq!(read_normals(&doc, n).unwrap(), normals.to_vec());
    assert_eq!(read_tangents(&doc, t).unwrap(), tangents.to_vec());
    assert_eq!(read_texcoords(&doc, uv).unwrap(), uvs.to_vec());
    assert_eq!(read_weights(&doc, w).unwrap(), weights.to_vec());

    assert!(matches!(read_tangents(&doc, n), Err(GltfError::UnsupportedLayout(_))));
}

#[test]
fn test_unorm8_colors() {
    let mut doc = Document::new();
    let index = write_colors_unorm8(&mut doc, &[[255, 0, 51, 255]]);
    assert!(doc.accessors[index].normalized);

    let colors = read_colors(&doc, index).unwrap();
    assert_eq!(colors, vec![[1.0, 0.0, 0.2, 1.0]]);
}

#[test]
fn test_float_colors_and_rgb_alpha() {
    let mut doc = Document::new();
    let rgba = write_colors(&mut doc, &[[0.1, 0.2, 0.3, 0.4]]);
    assert_eq!(read_colors(&doc, rgba).unwrap(), vec![[0.1, 0.2, 0.3, 0.4]]);

    let rgb = write_normals(&mut doc, &[[0.1, 0.2, 0.3]]);
    assert_eq!(read_colors(&doc, rgb).unwrap(), vec![[0.1, 0.2, 0.3, 1.0]]);
}

#[test]
fn test_snorm16_normals() {
    let mut doc = Document::new();
    let data = AccessorData::from(vec![[i16::MIN, 0, i16::MAX]]);
    let index = write_accessor(&mut doc, Some(BufferTarget::ArrayBuffer), &data);
    doc.accessors[index].normalized = true;

    assert_eq!(read_normals(&doc, index).unwrap(), vec![[-1.0, 0.0, 1.0]]);
    // i16 Vec3 is padded to 8 bytes per element
    let view = doc.accessors[index].buffer_view.unwrap();
    assert_eq!(doc.buffer_views[view].byte_stride, Some(8));
}

#[test]
fn test_joints_u8_and_u16() {
    let mut doc = Document::new();
    let wide = write_joints(&mut doc, &[[1, 2, 300, 4]]);
    let narrow = write_accessor(
        &mut doc,
        Some(BufferTarget::ArrayBuffer),
        &AccessorData::from(vec![[5u8, 6, 7, 8]]),
    );

    assert_eq!(read_joints(&doc, wide).unwrap(), vec![[1, 2, 300, 4]]);
    assert_eq!(read_joints(&doc, narrow).unwrap(), vec![[5, 6, 7, 8]]);

    let floats = write_weights(&mut doc, &[[0.0; 4]]);
    assert!(matches!(read_joints(&doc, floats), Err(GltfError::UnsupportedLayout(_))));
}

#[test]
fn test_accessor_without_data_reads_zeros() {
    let mut doc = Document::new();
    doc.accessors.push(Accessor::new(ComponentType::F32, AccessorType::Vec3, 2));
    assert_eq!(read_positions(&doc, 0).unwrap(), vec![[0.0; 3]; 2]);
}

#[test]
fn test_accessor_without_data_held_to_memory_quota() {
    let mut doc = Document::new();
    doc.decode_options.max_memory_allocation = 1024;
    doc.accessors.push(Accessor::new(ComponentType::F32, AccessorType::Vec3, 50_000_000));
    assert!(matches!(read_positions(&doc, 0), Err(GltfError::QuotaExceeded(_))));
}

// ============================================================================
// Interleaving
// ============================================================================

#[test]
fn test_interleaved_layout() {
    let mut doc = Document::new();
    let positions = AccessorData::from(vec![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    let colors = AccessorData::from(vec![[10u8, 20, 30], [40, 50, 60]]);
    let uvs = AccessorData::from(vec![[0.5f32, 0.5], [1.0, 1.0]]);

    let indices = write_attributes_interleaved(&mut doc, &[&positions, &colors, &uvs]).unwrap();
    assert_eq!(indices, vec![0, 1, 2]);

    // 12 (position) + 4 (padded color) + 8 (uv)
    let view = &doc.buffer_views[0];
    assert_eq!(view.byte_stride, Some(24));
    assert_eq!(view.byte_length, 48);
    assert_eq!(doc.accessors[1].byte_offset, 12);
    assert_eq!(doc.accessors[2].byte_offset, 16);

    assert_eq!(accessor::read_accessor_at(&doc, 0, None).unwrap(), Some(positions));
    assert_eq!(accessor::read_accessor_at(&doc, 1, None).unwrap(), Some(colors));
    assert_eq!(accessor::read_accessor_at(&doc, 2, None).unwrap(), Some(uvs));
}

#[test]
fn test_interleaved_count_mismatch() {
    let mut doc = Document::new();
    let a = AccessorData::from(vec![[0.0f32; 3]; 3]);
    let b = AccessorData::from(vec![[0.0f32; 2]; 2]);
    assert!(matches!(
        write_attributes_interleaved(&mut doc, &[&a, &b]),
        Err(GltfError::AttributeCountMismatch {
            expected: 3,
            found: 2
        })
    ));
    assert!(doc.buffer_views.is_empty());
}

#[test]
fn test_interleaved_after_unaligned_data() {
    let mut doc = Document::new();
    write_indices(&mut doc, &[0, 1, 2]);
    let normals = AccessorData::from(vec![[0.0f32, 0.0, 1.0]]);
    let indices = write_attributes_interleaved(&mut doc, &[&normals]).unwrap();

    let view = doc.accessors[indices[0]].buffer_view.unwrap();
    assert_eq!(doc.buffer_views[view].byte_offset, 4);
    assert_eq!(read_normals(&doc, indices[0]).unwrap(), vec![[0.0, 0.0, 1.0]]);
}

// ============================================================================
// Images
// ============================================================================

#[test]
fn test_image_survives_glb() {
    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    let mut doc = Document::new();
    write_positions(&mut doc, &[[0.0; 3]]);
    let image = write_image(&mut doc, &png, PNG_MIME_TYPE);

    let glb = encode_to_vec(&doc, EncodeOptions::default()).unwrap();
    let decoded = decode_slice(&glb).unwrap();

    let (mime, bytes) = read_image(&decoded, image, &NoResources).unwrap();
    assert_eq!(mime.as_deref(), Some(PNG_MIME_TYPE));
    assert_eq!(bytes, png);
    assert_eq!(read_positions(&decoded, 0).unwrap(), vec![[0.0; 3]]);
}
