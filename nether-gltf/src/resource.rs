//! External and embedded resources
//!
//! Buffers and images reference their bytes either through a `data:` URI
//! (base64 payload inside the JSON) or through a relative URI the caller
//! resolves. The core never touches the filesystem itself: it goes through
//! [`ResourceReader`] / [`ResourceWriter`].

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Component as PathComponent, Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::document::Document;
use crate::error::GltfError;

/// MIME type used for embedded buffers
pub const BUFFER_MIME_TYPE: &str = "application/octet-stream";

/// Legacy MIME type some exporters still emit for embedded buffers
pub const LEGACY_BUFFER_MIME_TYPE: &str = "application/gltf-buffer";

pub const PNG_MIME_TYPE: &str = "image/png";
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

// ============================================================================
// Data URIs
// ============================================================================

/// Whether `uri` is an embedded `data:` URI
pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with(DATA_PREFIX)
}

/// Split a base64 `data:` URI into its MIME type and decoded bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), GltfError> {
    let rest = uri
        .strip_prefix(DATA_PREFIX)
        .ok_or_else(|| GltfError::InvalidDataUri("missing `data:` prefix".to_string()))?;
    let (mime, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| GltfError::InvalidDataUri("only base64 payloads are supported".to_string()))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| GltfError::InvalidDataUri(e.to_string()))?;
    Ok((mime.to_string(), bytes))
}

/// Build a base64 `data:` URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("{DATA_PREFIX}{mime}{BASE64_MARKER}{}", STANDARD.encode(bytes))
}

/// Decode an embedded buffer URI, checking its MIME type.
pub(crate) fn decode_buffer_uri(uri: &str) -> Result<Vec<u8>, GltfError> {
    let (mime, bytes) = decode_data_uri(uri)?;
    match mime.as_str() {
        BUFFER_MIME_TYPE | LEGACY_BUFFER_MIME_TYPE => Ok(bytes),
        other => Err(GltfError::InvalidDataUri(format!(
            "unexpected buffer MIME type `{other}`"
        ))),
    }
}

/// Guess an image MIME type from its leading bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    if bytes.starts_with(&PNG_SIGNATURE) {
        Some(PNG_MIME_TYPE)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(JPEG_MIME_TYPE)
    } else {
        None
    }
}

// ============================================================================
// Resource Boundary
// ============================================================================

/// Supplies the bytes of external resources during decode.
pub trait ResourceReader {
    /// Open `uri` for reading. Called at most once per external buffer.
    fn fetch(&self, uri: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// Accepts the bytes of external resources during encode.
pub trait ResourceWriter {
    /// Open `uri` for writing. `size_hint` is the number of bytes to follow.
    fn create(&self, uri: &str, size_hint: usize) -> io::Result<Box<dyn Write + '_>>;
}

/// Refuses every external resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

fn refused(uri: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("external resource `{uri}` not available"),
    )
}

impl ResourceReader for NoResources {
    fn fetch(&self, uri: &str) -> io::Result<Box<dyn Read + '_>> {
        Err(refused(uri))
    }
}

impl ResourceWriter for NoResources {
    fn create(&self, uri: &str, _size_hint: usize) -> io::Result<Box<dyn Write + '_>> {
        Err(refused(uri))
    }
}

/// Resolves relative URIs against a directory.
#[derive(Debug, Clone)]
pub struct FsResources {
    root: PathBuf,
}

impl FsResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resources next to `file` (its parent directory)
    pub fn beside(file: &Path) -> Self {
        let root = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a relative URI to a path under the root.
    pub fn resolve(&self, uri: &str) -> io::Result<PathBuf> {
        if uri.contains("://") || is_data_uri(uri) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{uri}` is not a relative file URI"),
            ));
        }
        let decoded = percent_decode(uri)?;
        let relative = Path::new(&decoded);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                PathComponent::RootDir | PathComponent::Prefix(_) | PathComponent::ParentDir
            )
        });
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("`{uri}` escapes the resource directory"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceReader for FsResources {
    fn fetch(&self, uri: &str) -> io::Result<Box<dyn Read + '_>> {
        let path = self.resolve(uri)?;
        tracing::debug!("Reading resource {}", path.display());
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

impl ResourceWriter for FsResources {
    fn create(&self, uri: &str, size_hint: usize) -> io::Result<Box<dyn Write + '_>> {
        let path = self.resolve(uri)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        tracing::debug!("Writing resource {} ({} bytes)", path.display(), size_hint);
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

/// Decode `%XX` escapes in a URI path.
fn percent_decode(uri: &str) -> io::Result<String> {
    let bytes = uri.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, format!("bad escape in `{uri}`"))
                })?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

// ============================================================================
// Images
// ============================================================================

/// Bytes of image `index` and its MIME type when known.
///
/// Images live in a data URI, a buffer view (already resolved by the
/// decoder), or an external file fetched through `resources`.
pub fn read_image(
    doc: &Document,
    index: usize,
    resources: &dyn ResourceReader,
) -> Result<(Option<String>, Vec<u8>), GltfError> {
    let image = doc.image(index)?;

    if let Some(view) = image.buffer_view {
        let bytes = doc.view_bytes(view)?.to_vec();
        let mime = image
            .mime_type
            .clone()
            .or_else(|| sniff_image_mime(&bytes).map(str::to_string));
        return Ok((mime, bytes));
    }

    let Some(uri) = image.uri.as_deref() else {
        return Err(GltfError::UnsupportedLayout(format!(
            "image {index} has neither a URI nor a buffer view"
        )));
    };

    if is_data_uri(uri) {
        let (mime, bytes) = decode_data_uri(uri)?;
        return Ok((Some(mime), bytes));
    }

    let mut bytes = Vec::new();
    resources
        .fetch(uri)
        .and_then(|mut reader| reader.read_to_end(&mut bytes))
        .map_err(|source| GltfError::ResourceUnavailable {
            uri: uri.to_string(),
            source,
        })?;
    let mime = image
        .mime_type
        .clone()
        .or_else(|| sniff_image_mime(&bytes).map(str::to_string));
    Ok((mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Buffer, BufferView, Image};

    #[test]
    fn test_data_uri_roundtrip() {
        let uri = encode_data_uri(BUFFER_MIME_TYPE, &[0, 1, 2, 254, 255]);
        assert!(uri.starts_with("data:application/octet-stream;base64,"));
        assert!(is_data_uri(&uri));

        let (mime, bytes) = decode_data_uri(&uri).unwrap();
        assert_eq!(mime, BUFFER_MIME_TYPE);
        assert_eq!(bytes, vec![0, 1, 2, 254, 255]);
    }

    #[test]
    fn test_legacy_buffer_mime_accepted() {
        let uri = encode_data_uri(LEGACY_BUFFER_MIME_TYPE, b"abc");
        assert_eq!(decode_buffer_uri(&uri).unwrap(), b"abc");

        let png = encode_data_uri(PNG_MIME_TYPE, b"abc");
        assert!(matches!(decode_buffer_uri(&png), Err(GltfError::InvalidDataUri(_))));
    }

    #[test]
    fn test_bad_data_uris() {
        assert!(decode_data_uri("mesh.bin").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("data:application/octet-stream;base64,@@@").is_err());
    }

    #[test]
    fn test_fs_resolve() {
        let fs = FsResources::new("/assets");
        assert_eq!(
            fs.resolve("my%20mesh.bin").unwrap(),
            PathBuf::from("/assets/my mesh.bin")
        );
        assert_eq!(
            fs.resolve("textures/a.png").unwrap(),
            PathBuf::from("/assets/textures/a.png")
        );
        assert!(fs.resolve("/etc/passwd").is_err());
        assert!(fs.resolve("../secret.bin").is_err());
        assert!(fs.resolve("https://example.com/a.bin").is_err());
        assert!(fs.resolve("bad%2").is_err());
    }

    #[test]
    fn test_fs_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let fs = FsResources::new(dir.path());

        {
            let mut writer = fs.create("sub/data.bin", 3).unwrap();
            writer.write_all(&[7, 8, 9]).unwrap();
        }

        let mut bytes = Vec::new();
        fs.fetch("sub/data.bin").unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, vec![7, 8, 9]);
    }

    #[test]
    fn test_no_resources_refuses() {
        assert!(NoResources.fetch("a.bin").is_err());
        assert!(NoResources.create("a.bin", 0).is_err());
    }

    #[test]
    fn test_read_image_sources() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2];

        let mut doc = Document::new();
        doc.buffers.push(Buffer::from_data(png.clone()));
        doc.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: 0,
            byte_length: png.len(),
            byte_stride: None,
            target: None,
            name: None,
            other: Default::default(),
        });
        doc.images.push(Image {
            buffer_view: Some(0),
            ..Default::default()
        });
        doc.images.push(Image {
            uri: Some(encode_data_uri(JPEG_MIME_TYPE, &[0xFF, 0xD8, 0xFF])),
            ..Default::default()
        });
        doc.images.push(Image {
            uri: Some("missing.png".to_string()),
            ..Default::default()
        });

        let (mime, bytes) = read_image(&doc, 0, &NoResources).unwrap();
        assert_eq!(mime.as_deref(), Some(PNG_MIME_TYPE));
        assert_eq!(bytes, png);

        let (mime, _) = read_image(&doc, 1, &NoResources).unwrap();
        assert_eq!(mime.as_deref(), Some(JPEG_MIME_TYPE));

        assert!(matches!(
            read_image(&doc, 2, &NoResources),
            Err(GltfError::ResourceUnavailable { .. })
        ));
        assert!(matches!(
            read_image(&doc, 3, &NoResources),
            Err(GltfError::IndexOverflow { .. })
        ));
    }
}
