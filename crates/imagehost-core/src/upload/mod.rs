//! Image upload: file selection, handshake and progress.
//!
//! # Architecture
//!
//! Uploads never pass through the API server. The server hands out a
//! pre-signed, single-use URL, the client writes the bytes straight to the
//! object store, then tells the server the object exists:
//!
//! ```text
//! client --POST /images/upload-url-->   api      (ticket)
//! client --PUT  <uploadUrl>---------->  storage  (bytes)
//! client --POST /images/save-metadata-> api      (image)
//! ```

mod coordinator;
mod file;
mod progress;

pub use coordinator::UploadCoordinator;
pub use file::{guess_content_type, SelectedFile, FALLBACK_CONTENT_TYPE};
pub use progress::{transfer_percent, UploadProgress, COMMITTED, SLOT_ISSUED, TRANSFER_COMPLETE};
