//! Plugin self-description answered through the hidden metadata subcommand.
//!
//! The parent CLI runs `hitch-<name> hitch-cli-plugin-metadata` to discover a
//! plugin before dispatching to it. The answer must be a single JSON document
//! on stdout, produced without any daemon connection, with stable formatting
//! so callers can compare it byte for byte.

use std::io::Write;

use hitch_config::METADATA_SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::PluginError;

/// Indentation applied to every nesting level of the metadata document.
const METADATA_INDENT: &[u8] = b"     ";

/// Description of a plugin, fixed when the plugin registers itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    short_description: String,
    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    experimental: bool,
}

const fn is_false(value: &bool) -> bool {
    !*value
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

impl Metadata {
    /// Creates metadata stamped with the current schema version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema_version: Some(METADATA_SCHEMA_VERSION.to_owned()),
            vendor: None,
            version: None,
            short_description: String::new(),
            url: None,
            experimental: false,
        }
    }

    /// Sets the vendor name.
    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Sets the plugin version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the one-line description shown in the parent's help output.
    #[must_use]
    pub fn with_short_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = description.into();
        self
    }

    /// Sets the plugin's home page.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Marks the plugin as experimental.
    #[must_use]
    pub const fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }

    /// Schema version of the metadata document.
    #[must_use]
    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }

    /// Vendor name, if supplied.
    #[must_use]
    pub fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref()
    }

    /// Plugin version, if supplied.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Short description; empty when the plugin did not supply one.
    #[must_use]
    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    /// Home page, if supplied.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Whether the plugin is experimental.
    #[must_use]
    pub const fn is_experimental(&self) -> bool {
        self.experimental
    }
}

/// Writes `metadata` as one indented JSON document followed by a newline.
///
/// An empty short description is replaced by `fallback`, normally the
/// plugin command's own `about` text, at write time; `metadata` itself is
/// left untouched.
///
/// # Errors
///
/// Returns [`PluginError::SerialiseMetadata`] or [`PluginError::EmitMetadata`]
/// when the document cannot be produced or written.
pub fn write_metadata<W>(
    metadata: &Metadata,
    fallback: Option<&str>,
    writer: &mut W,
) -> Result<(), PluginError>
where
    W: Write + ?Sized,
{
    let described;
    let document = match fallback {
        Some(text) if metadata.short_description.is_empty() => {
            described = metadata.clone().with_short_description(text);
            &described
        }
        _ => metadata,
    };

    let formatter = PrettyFormatter::with_indent(METADATA_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
    document
        .serialize(&mut serializer)
        .map_err(PluginError::SerialiseMetadata)?;
    writer.write_all(b"\n").map_err(PluginError::EmitMetadata)?;
    writer.flush().map_err(PluginError::EmitMetadata)
}
