//! Nether-glTF: glTF 2.0 binary data layer
//!
//! This crate reads and writes the binary side of glTF 2.0 assets: typed
//! accessor arrays, the buffers and buffer views that hold them, and the GLB
//! container that packs JSON and binary data into one file. The scene graph
//! is kept as opaque JSON and round-trips untouched.
//!
//! # Layers
//!
//! - [`element`] / [`layout`]: fixed-size little-endian element windows for
//!   six component encodings and seven shapes, with vector and column padding
//! - [`data`]: [`AccessorData`], a closed enum over all 42 element types
//! - [`accessor`]: typed views (tight, interleaved, sparse) to arrays and back
//! - [`container`]: GLB framing with decode quotas
//! - [`modeler`]: per-attribute helpers (positions, normals, indices, ...)
//!
//! # Usage
//!
//! ```
//! use nether_gltf::{Document, EncodeOptions, decode_slice, encode_to_vec, modeler};
//!
//! let mut doc = Document::new();
//! let positions = modeler::write_positions(&mut doc, &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
//! let indices = modeler::write_indices(&mut doc, &[0, 1, 2]);
//!
//! let glb = encode_to_vec(&doc, EncodeOptions::default())?;
//! let decoded = decode_slice(&glb)?;
//!
//! assert_eq!(modeler::read_positions(&decoded, positions)?.len(), 3);
//! assert_eq!(modeler::read_indices(&decoded, indices)?, vec![0, 1, 2]);
//! # Ok::<(), nether_gltf::GltfError>(())
//! ```
//!
//! # Format Reference
//!
//! - glTF 2.0 specification, "Binary Data Storage" and "GLB File Format"
//! - <https://registry.khronos.org/glTF/specs/2.0/glTF-2.0.html>

pub mod accessor;
pub mod config;
pub mod container;
pub mod data;
pub mod document;
pub mod element;
mod error;
pub mod layout;
pub mod modeler;
pub mod resource;

pub use accessor::{ViewDescriptor, read_accessor, read_accessor_at, read_view, write_accessor};
pub use config::{DecodeOptions, EncodeOptions};
pub use container::{ContainerFormat, Decoder, Encoder, decode_slice, encode_to_vec, is_glb};
pub use data::AccessorData;
pub use document::{Accessor, Buffer, BufferTarget, BufferView, Document, Image};
pub use element::{Component, Element};
pub use error::GltfError;
pub use layout::{AccessorType, ComponentType, element_byte_size};
pub use resource::{FsResources, NoResources, ResourceReader, ResourceWriter};
