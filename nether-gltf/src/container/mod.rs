//! GLB container framing
//!
//! ```text
//! Header (12 bytes):
//!   magic: u32 = 0x46546C67 ("glTF")
//!   version: u32 = 2
//!   length: u32 (total bytes, header included)
//!
//! Chunk (8 byte header + payload):
//!   length: u32 (payload bytes, multiple of 4)
//!   type: u32 (JSON = 0x4E4F534A, BIN = 0x004E4942)
//!   payload: [u8; length]
//! ```
//!
//! The JSON chunk comes first and is padded with spaces. An optional BIN
//! chunk follows, padded with zeros; it backs the document's first buffer.

mod decode;
mod encode;


pub use decode::{Decoder, decode_slice};
pub use encode::{Encoder, encode_to_vec};

/// "glTF" as a little-endian u32
pub const GLB_MAGIC: u32 = 0x4654_6C67;

/// The only container version understood
pub const GLB_VERSION: u32 = 2;

/// "JSON" chunk type
pub const CHUNK_JSON: u32 = 0x4E4F_534A;

/// "BIN\0" chunk type
pub const CHUNK_BIN: u32 = 0x004E_4942;

pub const HEADER_SIZE: usize = 12;
pub const CHUNK_HEADER_SIZE: usize = 8;

/// How a document was (or will be) stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Plain JSON glTF
    Text,
    /// GLB container
    Binary,
}

// ============================================================================
// Headers
// ============================================================================

/// File header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub magic: u32,
    pub version: u32,
    pub length: u32,
}

impl GlbHeader {
    pub fn new(length: u32) -> Self {
        Self {
            magic: GLB_MAGIC,
            version: GLB_VERSION,
            length,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.length.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            magic: read_u32(bytes, 0),
            version: read_u32(bytes, 4),
            length: read_u32(bytes, 8),
        }
    }
}

/// Chunk header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length: u32,
    pub chunk_type: u32,
}

impl ChunkHeader {
    pub fn to_bytes(&self) -> [u8; CHUNK_HEADER_SIZE] {
        let mut bytes = [0u8; CHUNK_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.length.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.chunk_type.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; CHUNK_HEADER_SIZE]) -> Self {
        Self {
            length: read_u32(bytes, 0),
            chunk_type: read_u32(bytes, 4),
        }
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Check whether data starts with the GLB magic
pub fn is_glb(data: &[u8]) -> bool {
    data.len() >= 4 && read_u32(data, 0) == GLB_MAGIC
}
