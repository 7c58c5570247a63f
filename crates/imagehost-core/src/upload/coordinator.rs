//! The three-step upload handshake.

use std::cell::Cell;

use tracing::{debug, warn};

use super::file::SelectedFile;
use super::progress::{UploadProgress, COMMITTED, SLOT_ISSUED, TRANSFER_COMPLETE};
use crate::api::ImageApi;
use crate::error::ClientError;
use crate::model::{AuthToken, ImageResource, MetadataCommit, UploadSlotRequest, UploadTicket};

/// Drives one file from local selection to a committed image.
///
/// Steps run strictly in sequence, each consuming the previous step's
/// output:
///
/// 1. request an upload slot (`UploadTicket`)
/// 2. upload the bytes directly to the ticket's URL
/// 3. commit the metadata, producing the `ImageResource`
///
/// A failure at any step ends the attempt and is reported as that step's
/// error kind. Nothing is retried; a retry is a new call and always starts
/// with a fresh slot.
#[derive(Debug, Default)]
pub struct UploadCoordinator {
    in_flight: Cell<bool>,
}

impl UploadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an upload is currently running on this coordinator.
    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    /// Upload `file` and register it as a new image.
    ///
    /// Fails with [`ClientError::NoFileSelected`] before any request when no
    /// (named) file is given, and with [`ClientError::OperationInProgress`]
    /// when another upload is still running.
    ///
    /// If step 2 succeeds but step 3 fails, the stored object is left
    /// orphaned; this is logged and surfaced as
    /// [`ClientError::MetadataCommitFailed`].
    #[tracing::instrument(
        skip_all,
        fields(file = file.map(SelectedFile::name), size = file.map(SelectedFile::size))
    )]
    pub async fn upload<A: ImageApi>(
        &self,
        api: &A,
        file: Option<&SelectedFile<A::Body>>,
        token: &AuthToken,
        progress: &UploadProgress,
    ) -> Result<ImageResource, ClientError> {
        let file = file
            .filter(|f| f.is_valid())
            .ok_or(ClientError::NoFileSelected)?;
        let _guard = InFlight::acquire(&self.in_flight)?;

        let slot = UploadSlotRequest {
            filename: file.name().to_string(),
            content_type: file.content_type().to_string(),
        };
        let ticket = api
            .request_upload_slot(token, &slot)
            .await
            .map_err(ClientError::SlotRequestFailed)?;
        progress.advance(SLOT_ISSUED);
        debug!(key = %ticket.filename, "upload slot issued");

        // The ticket is consumed here; only the object key outlives step 2.
        let UploadTicket {
            upload_url,
            filename,
        } = ticket;
        api.upload_object(&upload_url, file.content_type(), file.body(), progress)
            .await
            .map_err(ClientError::DirectUploadFailed)?;
        progress.advance(TRANSFER_COMPLETE);
        debug!(key = %filename, "direct upload finished");

        let commit = MetadataCommit {
            filename,
            original_name: file.name().to_string(),
            content_type: file.content_type().to_string(),
            file_size: file.size(),
        };
        let image = api.save_metadata(token, &commit).await.map_err(|e| {
            warn!(key = %commit.filename, error = %e, "metadata commit failed, stored object is orphaned");
            ClientError::MetadataCommitFailed(e)
        })?;
        progress.advance(COMMITTED);
        debug!(id = %image.id, "image committed");

        Ok(image)
    }
}

/// Marks the coordinator busy until dropped.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Result<Self, ClientError> {
        if flag.replace(true) {
            return Err(ClientError::OperationInProgress("upload"));
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
