//! glTF document schema subset
//!
//! Only the objects the binary layer reads are typed: `asset`, `accessors`,
//! `bufferViews`, `buffers`, and `images`. Everything else (the scene graph,
//! materials, animations, `extensions`, `extras`) lands in the `other` maps
//! and is written back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::DecodeOptions;
use crate::error::GltfError;
use crate::layout::{AccessorType, ComponentType};
use crate::resource::{self, BUFFER_MIME_TYPE};

/// Value written to `asset.generator` by [`Document::new`]
pub const GENERATOR: &str = concat!("nether-gltf ", env!("CARGO_PKG_VERSION"));

fn is_zero(value: &usize) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ============================================================================
// Document
// ============================================================================

/// A glTF document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub asset: Asset,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<Accessor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<BufferView>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,

    /// Scene graph and every other top-level property
    #[serde(flatten)]
    pub other: Map<String, Value>,

    /// Quotas the document was decoded under. Also bounds arrays synthesized
    /// for accessors without a buffer view.
    #[serde(skip)]
    pub decode_options: DecodeOptions,
}

impl Document {
    /// Empty glTF 2.0 document
    pub fn new() -> Self {
        Self {
            asset: Asset {
                version: "2.0".to_string(),
                generator: Some(GENERATOR.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn accessor(&self, index: usize) -> Result<&Accessor, GltfError> {
        self.accessors
            .get(index)
            .ok_or_else(|| GltfError::index_overflow("accessor", index, self.accessors.len()))
    }

    pub fn buffer_view(&self, index: usize) -> Result<&BufferView, GltfError> {
        self.buffer_views
            .get(index)
            .ok_or_else(|| GltfError::index_overflow("bufferView", index, self.buffer_views.len()))
    }

    pub fn buffer(&self, index: usize) -> Result<&Buffer, GltfError> {
        self.buffers
            .get(index)
            .ok_or_else(|| GltfError::index_overflow("buffer", index, self.buffers.len()))
    }

    pub fn image(&self, index: usize) -> Result<&Image, GltfError> {
        self.images
            .get(index)
            .ok_or_else(|| GltfError::index_overflow("image", index, self.images.len()))
    }

    /// Bytes covered by a buffer view, bounds-checked against its buffer.
    pub fn view_bytes(&self, view_index: usize) -> Result<&[u8], GltfError> {
        let view = self.buffer_view(view_index)?;
        let buffer = self.buffer(view.buffer)?;
        let end = view
            .byte_offset
            .checked_add(view.byte_length)
            .ok_or(GltfError::ShortBuffer {
                needed: usize::MAX,
                available: buffer.data.len(),
            })?;
        buffer.data.get(view.byte_offset..end).ok_or(GltfError::ShortBuffer {
            needed: end,
            available: buffer.data.len(),
        })
    }

    /// Copy of the document with every buffer's bytes left behind.
    pub fn clone_without_data(&self) -> Document {
        Document {
            asset: self.asset.clone(),
            accessors: self.accessors.clone(),
            buffer_views: self.buffer_views.clone(),
            buffers: self.buffers.iter().map(Buffer::metadata).collect(),
            images: self.images.clone(),
            other: self.other.clone(),
            decode_options: self.decode_options,
        }
    }
}

/// `asset` metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

// ============================================================================
// Accessors
// ============================================================================

/// Typed view over a buffer view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub byte_offset: usize,

    pub component_type: ComponentType,

    #[serde(default, skip_serializing_if = "is_false")]
    pub normalized: bool,

    pub count: usize,

    #[serde(rename = "type")]
    pub accessor_type: AccessorType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse: Option<Sparse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Accessor {
    /// Accessor over `count` elements of a layout, with no backing view yet
    pub fn new(component_type: ComponentType, accessor_type: AccessorType, count: usize) -> Self {
        Self {
            buffer_view: None,
            byte_offset: 0,
            component_type,
            normalized: false,
            count,
            accessor_type,
            min: None,
            max: None,
            sparse: None,
            name: None,
            other: Map::new(),
        }
    }
}

/// Sparse overlay of an accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sparse {
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Location and encoding of sparse indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseIndices {
    pub buffer_view: usize,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub byte_offset: usize,

    pub component_type: ComponentType,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Location of sparse values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseValues {
    pub buffer_view: usize,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub byte_offset: usize,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

// ============================================================================
// Buffers
// ============================================================================

/// Intended GPU binding of a buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BufferTarget {
    /// Vertex attributes (34962)
    ArrayBuffer,
    /// Vertex indices (34963)
    ElementArrayBuffer,
}

impl TryFrom<u32> for BufferTarget {
    type Error = GltfError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            34962 => Ok(BufferTarget::ArrayBuffer),
            34963 => Ok(BufferTarget::ElementArrayBuffer),
            _ => Err(GltfError::UnsupportedLayout(format!("buffer target {code}"))),
        }
    }
}

impl From<BufferTarget> for u32 {
    fn from(target: BufferTarget) -> Self {
        match target {
            BufferTarget::ArrayBuffer => 34962,
            BufferTarget::ElementArrayBuffer => 34963,
        }
    }
}

/// A byte range of a buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub byte_offset: usize,

    pub byte_length: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BufferTarget>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A binary buffer and its resolved bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    pub byte_length: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,

    /// Resolved bytes (binary chunk, data URI, or external resource)
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Buffer {
    /// Buffer holding `data`, with no URI (binary chunk or embedded on encode)
    pub fn from_data(data: Vec<u8>) -> Self {
        Self {
            byte_length: data.len(),
            data,
            ..Default::default()
        }
    }

    /// Whether the URI is an embedded `data:` URI
    pub fn is_embedded(&self) -> bool {
        self.uri.as_deref().is_some_and(resource::is_data_uri)
    }

    /// Whether the URI points at an external resource
    pub fn is_external(&self) -> bool {
        self.uri.as_deref().is_some_and(|uri| !resource::is_data_uri(uri))
    }

    /// Embed `data` as a base64 data URI.
    pub fn embed(&mut self) {
        self.uri = Some(resource::encode_data_uri(BUFFER_MIME_TYPE, &self.data));
        self.byte_length = self.data.len();
    }

    /// Copy of everything except `data`
    pub fn metadata(&self) -> Buffer {
        Buffer {
            uri: self.uri.clone(),
            byte_length: self.byte_length,
            name: self.name.clone(),
            other: self.other.clone(),
            data: Vec::new(),
        }
    }
}

// ============================================================================
// Images
// ============================================================================

/// Image source: a URI or a buffer view plus MIME type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Image {
    /// Whether the URI is an embedded `data:` URI
    pub fn is_embedded(&self) -> bool {
        self.uri.as_deref().is_some_and(resource::is_data_uri)
    }
}
