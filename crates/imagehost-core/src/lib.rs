//! Imagehost Core - client library for the image hosting service
//!
//! This crate holds the client-side workflows for uploading, transforming,
//! listing, downloading and deleting images. It does no HTTP itself: every
//! workflow is written against the [`ImageApi`] trait, which the WASM crate
//! implements on top of the browser's `fetch` and `XMLHttpRequest`.
//!
//! The two workflows with real logic are:
//!
//! - [`UploadCoordinator`]: the three-step pre-signed upload handshake
//! - [`TransformRequestBuilder`]: draft normalization and submission

pub mod api;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod library;
pub mod model;
pub mod session;
pub mod transform;
pub mod upload;

pub use api::ImageApi;
pub use client::{ImageHost, TRANSFORM_SUCCESS, UPLOAD_SUCCESS};
pub use config::{ClientConfig, ConfigError};
pub use endpoints::{Endpoint, Method};
pub use error::{ApiError, ClientError, ErrorKind};
pub use library::{ImageLibrary, Refresh};
pub use model::{
    AuthToken, Credentials, DownloadLink, ImageId, ImageResource, ImageTarget, MetadataCommit,
    TransformedImageResource, UploadSlotRequest, UploadTicket,
};
pub use session::{MemoryTokenStore, Session, TokenStore, MIN_PASSWORD_LEN};
pub use transform::{
    NormalizedSpec, OutputFormat, Rotation, TransformDraft, TransformRequest,
    TransformRequestBuilder, TransformState,
};
pub use upload::{SelectedFile, UploadCoordinator, UploadProgress};
