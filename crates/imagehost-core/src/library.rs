//! Client-side cache of the user's images.
//!
//! The server owns all image state; the library is a read-only snapshot that
//! is re-fetched after every write (upload, transform, delete). Fetch
//! failures are non-fatal: the affected list degrades to empty and the
//! caller gets a [`ClientError::ListFetchFailed`] to show or ignore.

use std::cell::RefCell;

use tracing::{debug, warn};

use crate::api::ImageApi;
use crate::error::ClientError;
use crate::model::{AuthToken, DownloadLink, ImageId, ImageResource, ImageTarget, TransformedImageResource};

/// Which lists a completed action invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Refresh {
    pub images: bool,
    pub transformed_images: bool,
}

impl Refresh {
    pub const NONE: Refresh = Refresh {
        images: false,
        transformed_images: false,
    };
    pub const IMAGES: Refresh = Refresh {
        images: true,
        transformed_images: false,
    };
    pub const ALL: Refresh = Refresh {
        images: true,
        transformed_images: true,
    };
}

#[derive(Debug, Default)]
pub struct ImageLibrary {
    images: RefCell<Vec<ImageResource>>,
    transformed: RefCell<Vec<TransformedImageResource>>,
}

impl ImageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> Vec<ImageResource> {
        self.images.borrow().clone()
    }

    pub fn transformed_images(&self) -> Vec<TransformedImageResource> {
        self.transformed.borrow().clone()
    }

    /// Transformed images derived from `original`.
    pub fn transformed_for(&self, original: &ImageId) -> Vec<TransformedImageResource> {
        self.transformed
            .borrow()
            .iter()
            .filter(|t| &t.original_image_id == original)
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.images.borrow().iter().any(|i| &i.id == id)
    }

    pub fn clear(&self) {
        self.images.borrow_mut().clear();
        self.transformed.borrow_mut().clear();
    }

    /// Re-fetch originals. Returns the new count.
    pub async fn refresh_images<A: ImageApi>(
        &self,
        api: &A,
        token: &AuthToken,
    ) -> Result<usize, ClientError> {
        match api.list_images(token).await {
            Ok(images) => {
                debug!(count = images.len(), "image list refreshed");
                let count = images.len();
                *self.images.borrow_mut() = images;
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "image list unavailable, showing empty list");
                self.images.borrow_mut().clear();
                Err(ClientError::ListFetchFailed(e))
            }
        }
    }

    /// Re-fetch transformed images. Returns the new count.
    pub async fn refresh_transformed<A: ImageApi>(
        &self,
        api: &A,
        token: &AuthToken,
    ) -> Result<usize, ClientError> {
        match api.list_transformed_images(token).await {
            Ok(transformed) => {
                debug!(count = transformed.len(), "transformed image list refreshed");
                let count = transformed.len();
                *self.transformed.borrow_mut() = transformed;
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "transformed image list unavailable, showing empty list");
                self.transformed.borrow_mut().clear();
                Err(ClientError::ListFetchFailed(e))
            }
        }
    }

    /// Re-fetch every list named in `scope`. All requested lists are
    /// attempted; the first failure is returned.
    pub async fn refresh<A: ImageApi>(
        &self,
        api: &A,
        token: &AuthToken,
        scope: Refresh,
    ) -> Result<(), ClientError> {
        let mut first_error = None;
        if scope.images {
            if let Err(e) = self.refresh_images(api, token).await {
                first_error.get_or_insert(e);
            }
        }
        if scope.transformed_images {
            if let Err(e) = self.refresh_transformed(api, token).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Short-lived signed URL for downloading `target`.
    pub async fn download_url<A: ImageApi>(
        &self,
        api: &A,
        token: &AuthToken,
        target: &ImageTarget,
    ) -> Result<DownloadLink, ClientError> {
        api.download_url(token, target)
            .await
            .map_err(ClientError::DownloadUrlFailed)
    }

    /// Delete `target` on the server and drop it from the cache.
    pub async fn delete<A: ImageApi>(
        &self,
        api: &A,
        token: &AuthToken,
        target: &ImageTarget,
    ) -> Result<(), ClientError> {
        api.delete(token, target)
            .await
            .map_err(ClientError::DeleteFailed)?;
        match target {
            ImageTarget::Original(id) => self.images.borrow_mut().retain(|i| &i.id != id),
            ImageTarget::Transformed(id) => self.transformed.borrow_mut().retain(|t| &t.id != id),
        }
        debug!(target = %target.id(), "image deleted");
        Ok(())
    }
}
