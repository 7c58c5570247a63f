//! Scripted in-memory [`ImageApi`] for workflow tests.
//!
//! Keeps a tiny server-side model (committed images, transformed images) so
//! refresh-after-write flows can be checked end to end, and records every
//! call for ordering and call-count assertions.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use super::ImageApi;
use crate::error::ApiError;
use crate::model::{
    AuthToken, Credentials, DownloadLink, ImageId, ImageResource, ImageTarget, MetadataCommit,
    TransformedImageResource, UploadSlotRequest, UploadTicket,
};
use crate::transform::TransformRequest;
use crate::upload::UploadProgress;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Login(String),
    Register(String),
    UploadSlot(UploadSlotRequest),
    UploadObject {
        url: String,
        content_type: String,
        len: usize,
    },
    SaveMetadata(MetadataCommit),
    ListImages,
    ListTransformedImages,
    Transform(ImageId, serde_json::Value),
    DownloadUrl(ImageTarget),
    Delete(ImageTarget),
}

#[derive(Default)]
pub(crate) struct MockApi {
    calls: RefCell<Vec<Call>>,
    bearer: RefCell<Vec<String>>,
    next_id: Cell<u32>,
    tickets: RefCell<VecDeque<UploadTicket>>,
    transfer_steps: RefCell<Vec<(u64, u64)>>,
    slot_failures: RefCell<VecDeque<ApiError>>,
    object_failures: RefCell<VecDeque<ApiError>>,
    metadata_failures: RefCell<VecDeque<ApiError>>,
    auth_failure: RefCell<Option<ApiError>>,
    list_failure: RefCell<Option<ApiError>>,
    transform_failure: RefCell<Option<ApiError>>,
    download_failure: RefCell<Option<ApiError>>,
    delete_failure: RefCell<Option<ApiError>>,
    images: RefCell<Vec<ImageResource>>,
    transformed: RefCell<Vec<TransformedImageResource>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_ticket(&self, upload_url: &str, filename: &str) {
        self.tickets.borrow_mut().push_back(UploadTicket {
            upload_url: upload_url.to_string(),
            filename: filename.to_string(),
        });
    }

    /// Transfer events reported during every direct upload.
    pub(crate) fn set_transfer_steps(&self, steps: Vec<(u64, u64)>) {
        *self.transfer_steps.borrow_mut() = steps;
    }

    pub(crate) fn fail_next_slot(&self, error: ApiError) {
        self.slot_failures.borrow_mut().push_back(error);
    }

    pub(crate) fn fail_next_object(&self, error: ApiError) {
        self.object_failures.borrow_mut().push_back(error);
    }

    pub(crate) fn fail_next_metadata(&self, error: ApiError) {
        self.metadata_failures.borrow_mut().push_back(error);
    }

    pub(crate) fn fail_auth(&self, error: ApiError) {
        *self.auth_failure.borrow_mut() = Some(error);
    }

    pub(crate) fn fail_lists(&self, error: Option<ApiError>) {
        *self.list_failure.borrow_mut() = error;
    }

    pub(crate) fn fail_transform(&self, error: ApiError) {
        *self.transform_failure.borrow_mut() = Some(error);
    }

    pub(crate) fn fail_download(&self, error: ApiError) {
        *self.download_failure.borrow_mut() = Some(error);
    }

    pub(crate) fn fail_delete(&self, error: ApiError) {
        *self.delete_failure.borrow_mut() = Some(error);
    }

    pub(crate) fn seed_image(&self, id: &str, name: &str) {
        self.images.borrow_mut().push(ImageResource {
            id: ImageId::new(id),
            name: Some(name.to_string()),
            url: format!("https://bucket/{name}"),
            content_type: Some("image/png".to_string()),
            file_size: Some(1024),
            created_at: None,
        });
    }

    pub(crate) fn seed_transformed(&self, id: &str, original: &str) {
        self.transformed.borrow_mut().push(TransformedImageResource {
            id: ImageId::new(id),
            original_image_id: ImageId::new(original),
            url: format!("https://bucket/t/{id}"),
            content_type: Some("image/webp".to_string()),
            file_size: Some(512),
            transformations: None,
            created_at: None,
        });
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    /// `Authorization` header values seen, in call order.
    pub(crate) fn bearer_tokens(&self) -> Vec<String> {
        self.bearer.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn authorize(&self, token: &AuthToken) {
        self.bearer.borrow_mut().push(token.bearer());
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn check(slot: &RefCell<Option<ApiError>>) -> Result<(), ApiError> {
        match slot.borrow().as_ref() {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn check_once(queue: &RefCell<VecDeque<ApiError>>) -> Result<(), ApiError> {
        match queue.borrow_mut().pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ImageApi for MockApi {
    type Body = Vec<u8>;

    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        self.record(Call::Login(credentials.username.clone()));
        Self::check(&self.auth_failure)?;
        Ok(AuthToken::new(format!("token-{}", credentials.username)))
    }

    async fn register(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        self.record(Call::Register(credentials.username.clone()));
        Self::check(&self.auth_failure)?;
        Ok(AuthToken::new(format!("token-{}", credentials.username)))
    }

    async fn request_upload_slot(
        &self,
        token: &AuthToken,
        request: &UploadSlotRequest,
    ) -> Result<UploadTicket, ApiError> {
        self.record(Call::UploadSlot(request.clone()));
        self.authorize(token);
        Self::check_once(&self.slot_failures)?;
        let ticket = self.tickets.borrow_mut().pop_front();
        Ok(ticket.unwrap_or_else(|| {
            let n = self.next_id();
            UploadTicket {
                upload_url: format!("https://store/{n}"),
                filename: format!("{n}-{}", request.filename),
            }
        }))
    }

    async fn upload_object(
        &self,
        upload_url: &str,
        content_type: &str,
        body: &Vec<u8>,
        progress: &UploadProgress,
    ) -> Result<(), ApiError> {
        self.record(Call::UploadObject {
            url: upload_url.to_string(),
            content_type: content_type.to_string(),
            len: body.len(),
        });
        for (sent, total) in self.transfer_steps.borrow().iter() {
            progress.record_transfer(*sent, *total);
        }
        Self::check_once(&self.object_failures)
    }

    async fn save_metadata(
        &self,
        token: &AuthToken,
        commit: &MetadataCommit,
    ) -> Result<ImageResource, ApiError> {
        self.record(Call::SaveMetadata(commit.clone()));
        self.authorize(token);
        Self::check_once(&self.metadata_failures)?;
        let image = ImageResource {
            id: ImageId::new(format!("img{}", self.images.borrow().len() + 1)),
            name: Some(commit.original_name.clone()),
            url: format!("https://bucket/{}", commit.filename),
            content_type: Some(commit.content_type.clone()),
            file_size: Some(commit.file_size),
            created_at: None,
        };
        self.images.borrow_mut().push(image.clone());
        Ok(image)
    }

    async fn list_images(&self, token: &AuthToken) -> Result<Vec<ImageResource>, ApiError> {
        self.record(Call::ListImages);
        self.authorize(token);
        Self::check(&self.list_failure)?;
        Ok(self.images.borrow().clone())
    }

    async fn list_transformed_images(
        &self,
        token: &AuthToken,
    ) -> Result<Vec<TransformedImageResource>, ApiError> {
        self.record(Call::ListTransformedImages);
        self.authorize(token);
        Self::check(&self.list_failure)?;
        Ok(self.transformed.borrow().clone())
    }

    async fn transform(
        &self,
        token: &AuthToken,
        image_id: &ImageId,
        request: &TransformRequest,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_value(request)?;
        self.record(Call::Transform(image_id.clone(), body));
        self.authorize(token);
        Self::check(&self.transform_failure)?;
        let n = self.next_id();
        self.seed_transformed(&format!("t{n}"), image_id.as_str());
        Ok(())
    }

    async fn download_url(
        &self,
        token: &AuthToken,
        target: &ImageTarget,
    ) -> Result<DownloadLink, ApiError> {
        self.record(Call::DownloadUrl(target.clone()));
        self.authorize(token);
        Self::check(&self.download_failure)?;
        Ok(DownloadLink {
            download_url: format!("https://bucket/signed/{}", target.id()),
            expires_in: Some(3600),
        })
    }

    async fn delete(&self, token: &AuthToken, target: &ImageTarget) -> Result<(), ApiError> {
        self.record(Call::Delete(target.clone()));
        self.authorize(token);
        Self::check(&self.delete_failure)?;
        match target {
            ImageTarget::Original(id) => self.images.borrow_mut().retain(|i| &i.id != id),
            ImageTarget::Transformed(id) => self.transformed.borrow_mut().retain(|i| &i.id != id),
        }
        Ok(())
    }
}
