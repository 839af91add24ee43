//! Reading `.gltf` / `.glb` streams

use std::io::{self, Cursor, Read};

use super::{
    CHUNK_BIN, CHUNK_HEADER_SIZE, CHUNK_JSON, ChunkHeader, ContainerFormat, GLB_MAGIC,
    GLB_VERSION, GlbHeader, HEADER_SIZE,
};
use crate::config::DecodeOptions;
use crate::document::Document;
use crate::error::GltfError;
use crate::resource::{self, NoResources, ResourceReader};

static NO_RESOURCES: NoResources = NoResources;

/// Bytes a buffer source may hold past its declared length as 4-byte
/// alignment padding before the excess is worth a warning.
const PADDING_SLACK: usize = 3;

/// Decodes a glTF document from a text or binary stream.
///
/// ```no_run
/// use std::fs::File;
/// use nether_gltf::{Decoder, FsResources};
///
/// let resources = FsResources::new("assets");
/// let doc = Decoder::new(File::open("assets/scene.glb")?)
///     .with_resources(&resources)
///     .decode()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Decoder<'r, R> {
    reader: R,
    options: DecodeOptions,
    resources: &'r dyn ResourceReader,
}

impl<'r, R: Read> Decoder<'r, R> {
    /// Decoder with default quotas that refuses external resources
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            options: DecodeOptions::default(),
            resources: &NO_RESOURCES,
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_resources(mut self, resources: &'r dyn ResourceReader) -> Self {
        self.resources = resources;
        self
    }

    /// Decode the document and resolve every buffer's bytes.
    pub fn decode(self) -> Result<Document, GltfError> {
        self.decode_with_format().map(|(doc, _)| doc)
    }

    /// Like [`Decoder::decode`], also reporting which form the input had.
    pub fn decode_with_format(mut self) -> Result<(Document, ContainerFormat), GltfError> {
        let mut head = [0u8; HEADER_SIZE];
        let filled = read_up_to(&mut self.reader, &mut head)?;

        if filled == HEADER_SIZE {
            let header = GlbHeader::from_bytes(&head);
            if header.magic == GLB_MAGIC {
                let doc = self.decode_binary(header)?;
                return Ok((doc, ContainerFormat::Binary));
            }
        }

        tracing::debug!("No GLB magic, decoding as JSON text");
        let replay = Cursor::new(&head[..filled]).chain(&mut self.reader);
        let mut doc: Document = serde_json::from_reader(replay)?;
        check_quotas(&doc, &self.options)?;
        resolve_buffers(&mut doc, None, self.resources, &self.options)?;
        doc.decode_options = self.options;
        Ok((doc, ContainerFormat::Text))
    }

    fn decode_binary(&mut self, header: GlbHeader) -> Result<Document, GltfError> {
        if header.version != GLB_VERSION {
            return Err(GltfError::InvalidContainerHeader(format!(
                "unsupported version {}",
                header.version
            )));
        }
        let total = header.length as usize;
        let body = total.checked_sub(HEADER_SIZE).ok_or_else(|| {
            GltfError::InvalidContainerHeader(format!("declared length {total} is shorter than the header"))
        })?;

        // JSON chunk
        let json_header = self
            .read_chunk_header()
            .map_err(|e| GltfError::InvalidJsonChunk(format!("missing chunk header: {e}")))?;
        if json_header.chunk_type != CHUNK_JSON {
            return Err(GltfError::InvalidJsonChunk(format!(
                "expected JSON chunk, found type {:#010x}",
                json_header.chunk_type
            )));
        }
        let json_len = json_header.length as usize;
        let after_json = body
            .checked_sub(CHUNK_HEADER_SIZE)
            .and_then(|rest| rest.checked_sub(json_len))
            .ok_or_else(|| {
                GltfError::InvalidJsonChunk(format!(
                    "chunk of {json_len} bytes overruns container of {total} bytes"
                ))
            })?;

        let mut json = Vec::new();
        (&mut self.reader).take(json_len as u64).read_to_end(&mut json)?;
        if json.len() != json_len {
            return Err(GltfError::InvalidJsonChunk(format!(
                "stream ended after {} of {json_len} bytes",
                json.len()
            )));
        }
        tracing::debug!("GLB JSON chunk: {} bytes", json_len);

        let mut doc: Document = serde_json::from_slice(&json)?;
        check_quotas(&doc, &self.options)?;

        // Optional BIN chunk
        let bin = match after_json {
            0 => None,
            rest if rest < CHUNK_HEADER_SIZE => {
                return Err(GltfError::InvalidContainerHeader(format!(
                    "{rest} trailing bytes cannot hold a chunk header"
                )));
            }
            rest => Some(self.read_bin_chunk(rest, &doc)?),
        };

        let mut next = [0u8; 1];
        if read_up_to(&mut self.reader, &mut next)? > 0 {
            tracing::warn!("Ignoring bytes past the declared GLB length of {}", total);
        }

        resolve_buffers(&mut doc, bin, self.resources, &self.options)?;
        doc.decode_options = self.options;
        Ok(doc)
    }

    fn read_bin_chunk(&mut self, available: usize, doc: &Document) -> Result<Vec<u8>, GltfError> {
        let chunk = self.read_chunk_header().map_err(|e| {
            GltfError::InvalidContainerHeader(format!("missing binary chunk header: {e}"))
        })?;
        if chunk.chunk_type != CHUNK_BIN {
            return Err(GltfError::InvalidContainerHeader(format!(
                "expected BIN chunk, found type {:#010x}",
                chunk.chunk_type
            )));
        }

        let bin_len = chunk.length as usize;
        if bin_len > available - CHUNK_HEADER_SIZE {
            return Err(GltfError::InvalidContainerHeader(format!(
                "binary chunk of {bin_len} bytes overruns container"
            )));
        }
        if bin_len as u64 > self.options.max_memory_allocation {
            return Err(GltfError::QuotaExceeded(format!(
                "binary chunk of {bin_len} bytes exceeds limit of {} bytes",
                self.options.max_memory_allocation
            )));
        }
        if let Some(first) = doc
            .buffers
            .first()
            .filter(|b| b.uri.is_none() && b.byte_length > bin_len)
        {
            return Err(GltfError::InvalidContainerHeader(format!(
                "binary chunk of {bin_len} bytes is smaller than buffer 0 ({} bytes)",
                first.byte_length
            )));
        }

        let mut bin = Vec::new();
        (&mut self.reader).take(bin_len as u64).read_to_end(&mut bin)?;
        if bin.len() != bin_len {
            return Err(GltfError::InvalidContainerHeader(format!(
                "stream ended after {} of {bin_len} binary chunk bytes",
                bin.len()
            )));
        }
        tracing::debug!("GLB BIN chunk: {} bytes", bin_len);
        Ok(bin)
    }

    fn read_chunk_header(&mut self) -> io::Result<ChunkHeader> {
        let mut bytes = [0u8; CHUNK_HEADER_SIZE];
        self.reader.read_exact(&mut bytes)?;
        Ok(ChunkHeader::from_bytes(&bytes))
    }
}

/// Decode an in-memory `.gltf` / `.glb` with default options and no external resources.
pub fn decode_slice(bytes: &[u8]) -> Result<Document, GltfError> {
    Decoder::new(bytes).decode()
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ============================================================================
// Quotas
// ============================================================================

/// Reject documents whose declared buffers exceed the limits.
///
/// Runs before any buffer byte is read, fetched, or allocated.
pub(crate) fn check_quotas(doc: &Document, options: &DecodeOptions) -> Result<(), GltfError> {
    let declared = doc
        .buffers
        .iter()
        .fold(0u64, |sum, b| sum.saturating_add(b.byte_length as u64));
    if declared > options.max_memory_allocation {
        return Err(GltfError::QuotaExceeded(format!(
            "buffers declare {declared} bytes, limit is {} bytes",
            options.max_memory_allocation
        )));
    }

    let external = doc.buffers.iter().filter(|b| b.is_external()).count();
    if external > options.max_external_buffer_count {
        return Err(GltfError::QuotaExceeded(format!(
            "{external} external buffers, limit is {}",
            options.max_external_buffer_count
        )));
    }
    Ok(())
}

// ============================================================================
// Buffer Resolution
// ============================================================================

/// Fill every buffer's `data` from the binary chunk, a data URI, or the resource reader.
fn resolve_buffers(
    doc: &mut Document,
    mut bin: Option<Vec<u8>>,
    resources: &dyn ResourceReader,
    options: &DecodeOptions,
) -> Result<(), GltfError> {
    let mut fetched = 0;

    for (index, buffer) in doc.buffers.iter_mut().enumerate() {
        let declared = buffer.byte_length;

        let mut data = match buffer.uri.as_deref() {
            None if index == 0 && bin.is_some() => bin.take().unwrap_or_default(),
            None => {
                tracing::warn!("Buffer {} has no URI and no binary chunk backs it", index);
                Vec::new()
            }
            Some(uri) if resource::is_data_uri(uri) => {
                let bytes = resource::decode_buffer_uri(uri)?;
                if bytes.len() < declared {
                    return Err(GltfError::InvalidDataUri(format!(
                        "buffer {index} decodes to {} bytes but declares {declared}",
                        bytes.len()
                    )));
                }
                bytes
            }
            Some(uri) => {
                fetched += 1;
                if fetched > options.max_external_buffer_count {
                    return Err(GltfError::QuotaExceeded(format!(
                        "more than {} external buffers",
                        options.max_external_buffer_count
                    )));
                }
                tracing::debug!("Fetching buffer {} from {}", index, uri);
                fetch_exact(resources, uri, declared)?
            }
        };

        if data.len() > declared {
            if data.len() - declared > PADDING_SLACK {
                tracing::warn!(
                    "Buffer {} source holds {} bytes, {} declared",
                    index,
                    data.len(),
                    declared
                );
            }
            data.truncate(declared);
        }
        buffer.data = data;
    }
    Ok(())
}

/// Read exactly `len` bytes of `uri`.
fn fetch_exact(resources: &dyn ResourceReader, uri: &str, len: usize) -> Result<Vec<u8>, GltfError> {
    let unavailable = |source: io::Error| GltfError::ResourceUnavailable {
        uri: uri.to_string(),
        source,
    };

    let reader = resources.fetch(uri).map_err(unavailable)?;
    let mut data = Vec::new();
    reader
        .take(len as u64)
        .read_to_end(&mut data)
        .map_err(unavailable)?;
    if data.len() < len {
        return Err(unavailable(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("resource holds {} of {len} declared bytes", data.len()),
        )));
    }
    Ok(data)
}
