//! Imagehost WASM - WebAssembly bindings for the Imagehost client
//!
//! This crate exposes the imagehost-core workflows to JavaScript/TypeScript
//! applications, backed by the browser's `fetch`, `XMLHttpRequest` and
//! `localStorage`.
//!
//! # Module Structure
//!
//! - `client` - `ImageHostClient`: session, upload, listing, download, delete
//! - `dialog` - `TransformDialog`: transform draft editing and submission
//! - `transport` - `ImageApi` implementation over browser networking
//! - `storage` - `localStorage` token persistence
//! - `types` - error and value conversion at the JS boundary
//!
//! # Usage
//!
//! ```typescript
//! import init, { ImageHostClient } from '@imagehost/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const client = new ImageHostClient({ baseUrl: 'https://api.example.com' });
//! await client.login('alice', 'secret');
//! await client.refresh();
//! ```

use wasm_bindgen::prelude::*;

mod client;
mod console;
mod dialog;
mod storage;
mod transport;
mod types;

pub use client::ImageHostClient;
pub use dialog::TransformDialog;
pub use storage::LocalStorageTokenStore;
pub use transport::BrowserTransport;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console::info(&format!("imagehost-wasm {} ready", version()));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
