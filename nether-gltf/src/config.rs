//! Decode and encode options

use serde::{Deserialize, Serialize};

/// Limits applied while decoding untrusted input.
///
/// Checked after the JSON is parsed and before any buffer bytes are read,
/// fetched, or allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Maximum number of buffers resolved through the resource reader
    pub max_external_buffer_count: usize,

    /// Maximum total of declared buffer byte lengths
    pub max_memory_allocation: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_external_buffer_count: 10,
            max_memory_allocation: u32::MAX as u64,
        }
    }
}

/// Output form chosen by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Write a GLB container (otherwise plain JSON)
    pub binary: bool,

    /// Indent the JSON text
    pub pretty: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            binary: true,
            pretty: false,
        }
    }
}
