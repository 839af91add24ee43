//! nether-gltf.toml configuration
//!
//! ```toml
//! [decode]
//! max_external_buffer_count = 4
//! max_memory_allocation = 268435456
//!
//! [encode]
//! pretty = true
//! ```

use anyhow::{Context, Result};
use nether_gltf::{DecodeOptions, EncodeOptions};
use serde::Deserialize;
use std::path::Path;

/// Tool configuration, every section optional
#[derive(Debug, Default, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub decode: DecodeOptions,
    #[serde(default)]
    pub encode: EncodeSection,
}

/// Encode settings; the container form is picked per command
#[derive(Debug, Default, Deserialize)]
pub struct EncodeSection {
    /// Indent JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl EncodeSection {
    pub fn options(&self, binary: bool) -> EncodeOptions {
        EncodeOptions {
            binary,
            pretty: self.pretty,
        }
    }
}

impl ToolConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse nether-gltf config")
    }

    /// Load `path` when given, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, max_external_buffers: Option<usize>, max_memory: Option<u64>) -> Self {
        if let Some(count) = max_external_buffers {
            self.decode.max_external_buffer_count = count;
        }
        if let Some(bytes) = max_memory {
            self.decode.max_memory_allocation = bytes;
        }
        self
    }
}
