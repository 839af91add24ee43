//! info / pack / unpack

use anyhow::{Context, Result, bail};
use nether_gltf::{ContainerFormat, Decoder, Document, Encoder, FsResources, read_accessor};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::config::ToolConfig;

/// Decode a `.gltf` / `.glb` file, resolving external buffers beside it.
pub fn load(path: &Path, config: &ToolConfig) -> Result<(Document, ContainerFormat)> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let resources = FsResources::beside(path);
    Decoder::new(BufReader::new(file))
        .with_options(config.decode)
        .with_resources(&resources)
        .decode_with_format()
        .with_context(|| format!("Failed to decode {}", path.display()))
}

// ============================================================================
// Info
// ============================================================================

/// What `info` found in a file
#[derive(Debug)]
pub struct Summary {
    pub format: ContainerFormat,
    pub generator: Option<String>,
    pub buffer_bytes: Vec<usize>,
    pub buffer_view_count: usize,
    pub accessor_count: usize,
    pub image_count: usize,
    /// Accessors that failed to resolve, with the reason
    pub failed_accessors: Vec<(usize, String)>,
}

/// Decode `path` and resolve every accessor.
pub fn inspect(path: &Path, config: &ToolConfig) -> Result<Summary> {
    let (doc, format) = load(path, config)?;

    let mut failed_accessors = Vec::new();
    for (index, accessor) in doc.accessors.iter().enumerate() {
        match read_accessor(&doc, accessor, None) {
            Ok(Some(data)) => tracing::info!(
                "  accessor {}: {:?} {:?} x{}{}",
                index,
                data.component_type(),
                data.accessor_type(),
                data.len(),
                if accessor.sparse.is_some() { " (sparse)" } else { "" }
            ),
            Ok(None) => tracing::info!("  accessor {}: no data", index),
            Err(e) => {
                tracing::warn!("  accessor {}: {}", index, e);
                failed_accessors.push((index, e.to_string()));
            }
        }
    }

    Ok(Summary {
        format,
        generator: doc.asset.generator.clone(),
        buffer_bytes: doc.buffers.iter().map(|b| b.data.len()).collect(),
        buffer_view_count: doc.buffer_views.len(),
        accessor_count: doc.accessors.len(),
        image_count: doc.images.len(),
        failed_accessors,
    })
}

/// Print a summary of `path`.
pub fn info(path: &Path, config: &ToolConfig) -> Result<()> {
    tracing::info!("{}", path.display());
    let summary = inspect(path, config)?;

    tracing::info!("  format: {:?}", summary.format);
    if let Some(generator) = &summary.generator {
        tracing::info!("  generator: {}", generator);
    }
    for (index, bytes) in summary.buffer_bytes.iter().enumerate() {
        tracing::info!("  buffer {}: {} bytes", index, bytes);
    }
    tracing::info!(
        "  {} buffer views, {} accessors, {} images",
        summary.buffer_view_count,
        summary.accessor_count,
        summary.image_count
    );

    if !summary.failed_accessors.is_empty() {
        bail!("{} accessor(s) failed to resolve", summary.failed_accessors.len());
    }
    Ok(())
}

// ============================================================================
// Pack / Unpack
// ============================================================================

fn default_output(input: &Path, extension: &str) -> Result<PathBuf> {
    let output = input.with_extension(extension);
    if output == input {
        bail!(
            "Output would overwrite {} (pass --output)",
            input.display()
        );
    }
    Ok(output)
}

fn write_document(doc: &Document, output: &Path, binary: bool, config: &ToolConfig) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let resources = FsResources::beside(output);
    let written = Encoder::new(BufWriter::new(file))
        .with_options(config.encode.options(binary))
        .with_resources(&resources)
        .encode(doc)
        .with_context(|| format!("Failed to encode {}", output.display()))?;
    tracing::info!("Wrote {} ({} bytes)", output.display(), written);
    Ok(())
}

/// Convert to GLB: buffer 0 becomes the binary chunk, the rest are embedded.
pub fn pack(input: &Path, output: Option<&Path>, config: &ToolConfig) -> Result<PathBuf> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output(input, "glb")?,
    };
    tracing::info!("Packing {:?} -> {:?}", input, output);

    let (mut doc, _) = load(input, config)?;
    for (index, buffer) in doc.buffers.iter_mut().enumerate() {
        if index == 0 {
            buffer.uri = None;
        } else {
            buffer.embed();
        }
    }

    write_document(&doc, &output, true, config)?;
    Ok(output)
}

/// Convert to JSON glTF with buffer 0 written beside it (or embedded).
pub fn unpack(input: &Path, output: Option<&Path>, embed: bool, config: &ToolConfig) -> Result<PathBuf> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output(input, "gltf")?,
    };
    tracing::info!("Unpacking {:?} -> {:?}", input, output);

    let (mut doc, _) = load(input, config)?;
    if let Some(buffer) = doc.buffers.first_mut() {
        if embed {
            buffer.embed();
        } else {
            let stem = output
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Output path has no file name")?;
            buffer.uri = Some(format!("{stem}.bin"));
        }
    }

    write_document(&doc, &output, false, config)?;
    Ok(output)
}
