//! Transport seam between the workflows and the Image Service.
//!
//! Workflows are written against [`ImageApi`] and never touch HTTP directly.
//! The browser transport lives in the WASM crate; tests use an in-memory
//! scripted implementation.

#[cfg(test)]
pub(crate) mod mock;

use crate::error::ApiError;
use crate::model::{
    AuthToken, Credentials, DownloadLink, ImageId, ImageResource, ImageTarget, MetadataCommit,
    TransformedImageResource, UploadSlotRequest, UploadTicket,
};
use crate::transform::TransformRequest;
use crate::upload::UploadProgress;

/// The REST surface the client consumes.
///
/// Every call except `login`, `register` and `upload_object` carries the
/// bearer token. Implementations report failures as [`ApiError`], keeping
/// the response body so the backend's message reaches the user.
#[allow(async_fn_in_trait)]
pub trait ImageApi {
    /// Body streamed by [`ImageApi::upload_object`].
    type Body;

    /// `POST /login`. The response body is the raw token.
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError>;

    /// `POST /register`. The response body is the raw token.
    async fn register(&self, credentials: &Credentials) -> Result<AuthToken, ApiError>;

    /// `POST /images/upload-url`.
    async fn request_upload_slot(
        &self,
        token: &AuthToken,
        request: &UploadSlotRequest,
    ) -> Result<UploadTicket, ApiError>;

    /// `PUT <upload_url>` straight to object storage.
    ///
    /// Implementations that can observe the transfer should call
    /// [`UploadProgress::record_transfer`]; those that cannot may ignore
    /// `progress` entirely.
    async fn upload_object(
        &self,
        upload_url: &str,
        content_type: &str,
        body: &Self::Body,
        progress: &UploadProgress,
    ) -> Result<(), ApiError>;

    /// `POST /images/save-metadata`.
    async fn save_metadata(
        &self,
        token: &AuthToken,
        commit: &MetadataCommit,
    ) -> Result<ImageResource, ApiError>;

    /// `GET /images`.
    async fn list_images(&self, token: &AuthToken) -> Result<Vec<ImageResource>, ApiError>;

    /// `GET /images/transformed-images`.
    async fn list_transformed_images(
        &self,
        token: &AuthToken,
    ) -> Result<Vec<TransformedImageResource>, ApiError>;

    /// `POST /images/{id}/transform`.
    async fn transform(
        &self,
        token: &AuthToken,
        image_id: &ImageId,
        request: &TransformRequest,
    ) -> Result<(), ApiError>;

    /// `GET .../{id}/download-url` for either image kind.
    async fn download_url(
        &self,
        token: &AuthToken,
        target: &ImageTarget,
    ) -> Result<DownloadLink, ApiError>;

    /// `DELETE .../{id}` for either image kind.
    async fn delete(&self, token: &AuthToken, target: &ImageTarget) -> Result<(), ApiError>;
}
