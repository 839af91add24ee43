//! Error types for the glTF binary layer

use std::io;

/// Errors produced while decoding, resolving, or encoding glTF data.
#[derive(Debug, thiserror::Error)]
pub enum GltfError {
    /// A computed byte window runs past the end of the available bytes.
    #[error("Byte window ends at {needed} but only {available} bytes are available")]
    ShortBuffer { needed: usize, available: usize },

    /// An index refers to a collection entry that does not exist.
    #[error("{kind} index {index} out of range (collection has {len} entries)")]
    IndexOverflow {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    /// Magic mismatch, unsupported version, wrong chunk tag, or inconsistent lengths.
    #[error("Invalid GLB container: {0}")]
    InvalidContainerHeader(String),

    /// The JSON chunk header is missing, mistagged, or overruns the envelope.
    #[error("Invalid GLB JSON chunk: {0}")]
    InvalidJsonChunk(String),

    /// Declared buffers exceed the configured decode limits.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The resource callback failed to produce or accept bytes.
    #[error("Resource `{uri}` unavailable: {source}")]
    ResourceUnavailable {
        uri: String,
        #[source]
        source: io::Error,
    },

    /// The requested component encoding / element shape is not supported here.
    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    /// Interleaved attributes must share one element count.
    #[error("Attribute count mismatch: expected {expected}, found {found}")]
    AttributeCountMismatch { expected: usize, found: usize },

    /// A `data:` URI could not be decoded.
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// The document JSON could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The underlying stream failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl GltfError {
    pub(crate) fn index_overflow(kind: &'static str, index: usize, len: usize) -> Self {
        GltfError::IndexOverflow { kind, index, len }
    }
}
