//! High-level client tying session, uploads, transforms and the library
//! together the way a dashboard uses them.
//!
//! Every method is one user action. Each action either succeeds, possibly
//! followed by a list refresh, or returns a [`ClientError`] whose
//! [`user_message`](ClientError::user_message) is ready for display.

use std::cell::RefCell;

use tracing::warn;

use crate::api::ImageApi;
use crate::config::{ClientConfig, ConfigError};
use crate::error::ClientError;
use crate::library::{ImageLibrary, Refresh};
use crate::model::{Credentials, DownloadLink, ImageId, ImageResource, ImageTarget};
use crate::session::{Session, TokenStore};
use crate::transform::TransformRequestBuilder;
use crate::upload::{SelectedFile, UploadCoordinator, UploadProgress};

pub const UPLOAD_SUCCESS: &str = "Upload successful!";
pub const TRANSFORM_SUCCESS: &str = "Transformation applied successfully!";

pub struct ImageHost<A: ImageApi, S> {
    api: A,
    config: ClientConfig,
    session: Session<S>,
    library: ImageLibrary,
    uploads: UploadCoordinator,
    progress: UploadProgress,
    selection: RefCell<Option<SelectedFile<A::Body>>>,
}

impl<A: ImageApi, S: TokenStore> ImageHost<A, S> {
    /// Build a client and restore any persisted session from `store`.
    pub fn new(api: A, store: S, config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            api,
            config,
            session: Session::restore(store),
            library: ImageLibrary::new(),
            uploads: UploadCoordinator::new(),
            progress: UploadProgress::new(),
            selection: RefCell::new(None),
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    /// Shared progress handle of the upload panel.
    pub fn progress(&self) -> &UploadProgress {
        &self.progress
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads.is_busy()
    }

    /// Return the progress bar to 0 once the grace delay has passed.
    /// Ignored while a new upload is already running.
    pub fn settle_progress(&self) {
        if !self.uploads.is_busy() {
            self.progress.reset();
        }
    }

    pub fn select_file(&self, file: Option<SelectedFile<A::Body>>) {
        *self.selection.borrow_mut() = file;
    }

    pub fn selected_file_name(&self) -> Option<String> {
        self.selection
            .borrow()
            .as_ref()
            .map(|f| f.name().to_string())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<(), ClientError> {
        self.session.login(&self.api, credentials).await?;
        self.refresh_quietly(Refresh::ALL).await;
        Ok(())
    }

    pub async fn register(
        &self,
        credentials: &Credentials,
        confirmation: &str,
    ) -> Result<(), ClientError> {
        self.session
            .register(&self.api, credentials, confirmation)
            .await?;
        self.refresh_quietly(Refresh::ALL).await;
        Ok(())
    }

    pub fn logout(&self) {
        self.session.logout();
        self.library.clear();
        self.select_file(None);
    }

    /// Upload the selected file.
    ///
    /// On success the selection is cleared and the image list re-fetched.
    /// On failure the selection is kept so the user can retry, which starts
    /// a fresh handshake.
    pub async fn upload(&self) -> Result<ImageResource, ClientError> {
        if self.uploads.is_busy() {
            return Err(ClientError::OperationInProgress("upload"));
        }
        let token = self.session.token()?;
        let file = self.selection.borrow_mut().take();
        self.progress.reset();

        match self
            .uploads
            .upload(&self.api, file.as_ref(), &token, &self.progress)
            .await
        {
            Ok(image) => {
                self.refresh_quietly(Refresh::IMAGES).await;
                Ok(image)
            }
            Err(e) => {
                let mut selection = self.selection.borrow_mut();
                if selection.is_none() {
                    *selection = file;
                }
                Err(e)
            }
        }
    }

    /// Open a transform dialog for `image_id`.
    pub fn open_transform(&self, image_id: ImageId) -> TransformRequestBuilder {
        TransformRequestBuilder::new(image_id)
    }

    /// Submit the dialog's draft, then refresh both lists.
    pub async fn apply_transform(
        &self,
        dialog: &TransformRequestBuilder,
    ) -> Result<(), ClientError> {
        let token = self.session.token()?;
        let refresh = dialog.apply(&self.api, &token).await?;
        self.refresh_quietly(refresh).await;
        Ok(())
    }

    /// Re-fetch both lists. A failure leaves the failed list empty.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let token = self.session.token()?;
        self.library.refresh(&self.api, &token, Refresh::ALL).await
    }

    pub async fn download_url(&self, target: &ImageTarget) -> Result<DownloadLink, ClientError> {
        let token = self.session.token()?;
        self.library.download_url(&self.api, &token, target).await
    }

    /// Delete an image. Removing an original may remove its derivatives on
    /// the server, so both lists are re-fetched in that case.
    pub async fn delete(&self, target: &ImageTarget) -> Result<(), ClientError> {
        let token = self.session.token()?;
        self.library.delete(&self.api, &token, target).await?;
        let scope = match target {
            ImageTarget::Original(_) => Refresh::ALL,
            ImageTarget::Transformed(_) => Refresh {
                images: false,
                transformed_images: true,
            },
        };
        self.refresh_quietly(scope).await;
        Ok(())
    }

    /// Refresh after a write. List failures are non-fatal and only logged;
    /// the write itself already succeeded.
    async fn refresh_quietly(&self, scope: Refresh) {
        let Ok(token) = self.session.token() else {
            return;
        };
        if let Err(e) = self.library.refresh(&self.api, &token, scope).await {
            warn!(error = %e, "refresh after write failed");
        }
    }
}
