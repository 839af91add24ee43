//! Writing `.gltf` / `.glb` streams

use std::io::Write;

use super::{CHUNK_BIN, CHUNK_HEADER_SIZE, CHUNK_JSON, ChunkHeader, GlbHeader, HEADER_SIZE};
use crate::config::EncodeOptions;
use crate::document::Document;
use crate::error::GltfError;
use crate::layout::padding_for;
use crate::resource::{self, BUFFER_MIME_TYPE, NoResources, ResourceWriter};

static NO_RESOURCES: NoResources = NoResources;

/// Encodes a document as GLB or JSON text.
///
/// Buffer placement:
/// - GLB: the first buffer without a URI becomes the BIN chunk.
/// - Buffers with a `data:` URI, and any other buffer without a URI, are
///   embedded as base64.
/// - Buffers with an external URI are handed to the resource writer, unless
///   they hold no bytes; those keep their declared `byteLength`.
pub struct Encoder<'w, W> {
    writer: W,
    options: EncodeOptions,
    resources: &'w dyn ResourceWriter,
}

impl<'w, W: Write> Encoder<'w, W> {
    /// GLB encoder that refuses external resources
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            options: EncodeOptions::default(),
            resources: &NO_RESOURCES,
        }
    }

    pub fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_resources(mut self, resources: &'w dyn ResourceWriter) -> Self {
        self.resources = resources;
        self
    }

    /// Write `doc` and its buffers. Returns the number of bytes written to the main stream.
    pub fn encode(mut self, doc: &Document) -> Result<usize, GltfError> {
        let (json_doc, bin) = self.place_buffers(doc)?;

        let json = if self.options.pretty {
            serde_json::to_vec_pretty(&json_doc)?
        } else {
            serde_json::to_vec(&json_doc)?
        };

        let bytes = if self.options.binary {
            assemble_glb(&json, bin.unwrap_or_default())?
        } else {
            json
        };

        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(bytes.len())
    }

    /// JSON-side copy of `doc` with URIs and lengths finalized, plus the BIN chunk payload.
    fn place_buffers<'d>(
        &self,
        doc: &'d Document,
    ) -> Result<(Document, Option<&'d [u8]>), GltfError> {
        let mut json_doc = doc.clone_without_data();
        let mut bin = None;

        for (index, (buffer, out)) in doc.buffers.iter().zip(json_doc.buffers.iter_mut()).enumerate() {
            out.byte_length = buffer.data.len();

            match buffer.uri.as_deref() {
                None if index == 0 && self.options.binary => {
                    if !buffer.data.is_empty() {
                        bin = Some(buffer.data.as_slice());
                    }
                }
                Some(uri) if !resource::is_data_uri(uri) && buffer.data.is_empty() => {
                    tracing::debug!("Buffer {} has no bytes loaded, leaving {} untouched", index, uri);
                    out.byte_length = buffer.byte_length;
                }
                Some(uri) if !resource::is_data_uri(uri) => {
                    tracing::debug!("Writing buffer {} to {}", index, uri);
                    let mut sink = self.resources.create(uri, buffer.data.len()).map_err(|source| {
                        GltfError::ResourceUnavailable {
                            uri: uri.to_string(),
                            source,
                        }
                    })?;
                    sink.write_all(&buffer.data)
                        .and_then(|_| sink.flush())
                        .map_err(|source| GltfError::ResourceUnavailable {
                            uri: uri.to_string(),
                            source,
                        })?;
                }
                _ => {
                    tracing::debug!("Embedding buffer {} ({} bytes)", index, buffer.data.len());
                    out.uri = Some(resource::encode_data_uri(BUFFER_MIME_TYPE, &buffer.data));
                }
            }
        }

        Ok((json_doc, bin))
    }
}

/// Frame JSON text and an optional binary payload as a GLB container.
fn assemble_glb(json: &[u8], bin: &[u8]) -> Result<Vec<u8>, GltfError> {
    let json_padding = padding_for(json.len(), 4);
    let json_chunk_length = json.len() + json_padding;

    let bin_padding = padding_for(bin.len(), 4);
    let bin_chunk_length = bin.len() + bin_padding;
    let bin_section = if bin.is_empty() {
        0
    } else {
        CHUNK_HEADER_SIZE + bin_chunk_length
    };

    let total_length = HEADER_SIZE + CHUNK_HEADER_SIZE + json_chunk_length + bin_section;
    let header_length = u32::try_from(total_length).map_err(|_| {
        GltfError::InvalidContainerHeader(format!("{total_length} bytes exceed the GLB size limit"))
    })?;

    let mut glb = Vec::with_capacity(total_length);
    glb.extend_from_slice(&GlbHeader::new(header_length).to_bytes());

    glb.extend_from_slice(
        &ChunkHeader {
            length: json_chunk_length as u32,
            chunk_type: CHUNK_JSON,
        }
        .to_bytes(),
    );
    glb.extend_from_slice(json);
    glb.extend(std::iter::repeat_n(b' ', json_padding));

    if !bin.is_empty() {
        glb.extend_from_slice(
            &ChunkHeader {
                length: bin_chunk_length as u32,
                chunk_type: CHUNK_BIN,
            }
            .to_bytes(),
        );
        glb.extend_from_slice(bin);
        glb.extend(std::iter::repeat_n(0u8, bin_padding));
    }

    tracing::debug!(
        "GLB assembled: {} bytes (JSON {}, BIN {})",
        total_length,
        json_chunk_length,
        bin_chunk_length
    );
    Ok(glb)
}

/// Encode `doc` into memory. External buffers are refused.
pub fn encode_to_vec(doc: &Document, options: EncodeOptions) -> Result<Vec<u8>, GltfError> {
    let mut out = Vec::new();
    Encoder::new(&mut out).with_options(options).encode(doc)?;
    Ok(out)
}
