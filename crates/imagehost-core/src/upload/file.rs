//! The locally selected file awaiting upload.

use std::path::Path;

/// Fallback when neither the picker nor the extension gives a type.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file picked by the user, with the metadata the handshake needs.
///
/// `B` is whatever the transport streams as the request body: a byte
/// buffer natively, a browser `File` under WASM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile<B> {
    name: String,
    content_type: String,
    size: u64,
    body: B,
}

impl<B> SelectedFile<B> {
    /// Create a selection. A blank content type is derived from the
    /// filename extension.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, size: u64, body: B) -> Self {
        let name = name.into();
        let content_type = content_type.into();
        let content_type = if content_type.trim().is_empty() {
            guess_content_type(&name).to_string()
        } else {
            content_type
        };
        Self {
            name,
            content_type,
            size,
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    /// A selection without a filename cannot be registered.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

impl SelectedFile<Vec<u8>> {
    pub fn from_bytes(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self::new(name, content_type, size, bytes)
    }
}

/// Image MIME type for a filename, by extension.
pub fn guess_content_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => FALLBACK_CONTENT_TYPE,
    }
}
