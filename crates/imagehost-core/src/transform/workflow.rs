//! The "apply transformation" workflow for one open transform dialog.
//!
//! ```text
//! Idle -> Editing -> Submitting -> Applied
//!                              \-> Rejected
//! ```
//!
//! `Applied` and `Rejected` are terminal for a submission; the next edit,
//! reset or retarget starts over. A submission is all-or-nothing: there is
//! no partially applied state on the client.

use std::cell::{Cell, RefCell};

use serde::Serialize;
use tracing::{debug, info_span, Instrument};

use super::draft::TransformDraft;
use super::normalize::{build, NormalizedSpec, TransformRequest};
use crate::api::ImageApi;
use crate::error::ClientError;
use crate::library::Refresh;
use crate::model::{AuthToken, ImageId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransformState {
    Idle,
    Editing,
    Submitting,
    Applied,
    Rejected,
}

/// Normalize `draft` and submit it for `image_id`.
///
/// An empty normalized spec is rejected locally with
/// [`ClientError::EmptyTransformation`] and no request is made. On success
/// both image lists must be refreshed, since a transformation may change
/// either.
pub async fn apply<A: ImageApi>(
    api: &A,
    image_id: &ImageId,
    draft: &TransformDraft,
    token: &AuthToken,
) -> Result<Refresh, ClientError> {
    let transformations = build(draft);
    if transformations.is_empty() {
        return Err(ClientError::EmptyTransformation);
    }

    let span = info_span!("transform", image_id = %image_id);
    async {
        debug!(?transformations, "submitting transformation");
        api.transform(token, image_id, &TransformRequest { transformations })
            .await
            .map_err(ClientError::TransformRejected)?;
        debug!("transformation accepted");
        Ok(Refresh::ALL)
    }
    .instrument(span)
    .await
}

/// Draft state and submission status of one transform dialog.
#[derive(Debug)]
pub struct TransformRequestBuilder {
    target: RefCell<ImageId>,
    draft: RefCell<TransformDraft>,
    state: Cell<TransformState>,
}

impl TransformRequestBuilder {
    pub fn new(target: ImageId) -> Self {
        Self {
            target: RefCell::new(target),
            draft: RefCell::new(TransformDraft::default()),
            state: Cell::new(TransformState::Idle),
        }
    }

    pub fn target(&self) -> ImageId {
        self.target.borrow().clone()
    }

    pub fn state(&self) -> TransformState {
        self.state.get()
    }

    /// Snapshot of the current draft.
    pub fn draft(&self) -> TransformDraft {
        self.draft.borrow().clone()
    }

    /// What would be sent if the draft were applied now.
    pub fn normalized(&self) -> NormalizedSpec {
        build(&self.draft.borrow())
    }

    /// Replace the draft with an edited copy.
    pub fn edit(
        &self,
        f: impl FnOnce(TransformDraft) -> TransformDraft,
    ) -> Result<(), ClientError> {
        self.ensure_not_submitting()?;
        let edited = f(self.draft());
        *self.draft.borrow_mut() = edited;
        self.state.set(TransformState::Editing);
        Ok(())
    }

    /// Discard all draft state. No network effect.
    pub fn reset(&self) -> Result<(), ClientError> {
        self.ensure_not_submitting()?;
        *self.draft.borrow_mut() = TransformDraft::default();
        self.state.set(TransformState::Idle);
        Ok(())
    }

    /// Point the dialog at another image with a fresh draft.
    pub fn retarget(&self, target: ImageId) -> Result<(), ClientError> {
        self.reset()?;
        *self.target.borrow_mut() = target;
        Ok(())
    }

    /// Submit the current draft for the current target.
    pub async fn apply<A: ImageApi>(
        &self,
        api: &A,
        token: &AuthToken,
    ) -> Result<Refresh, ClientError> {
        self.ensure_not_submitting()?;
        let draft = self.draft();
        let target = self.target();
        if build(&draft).is_empty() {
            return Err(ClientError::EmptyTransformation);
        }

        let guard = Submission::begin(&self.state);
        let result = apply(api, &target, &draft, token).await;
        guard.finish(if result.is_ok() {
            TransformState::Applied
        } else {
            TransformState::Rejected
        });
        result
    }

    fn ensure_not_submitting(&self) -> Result<(), ClientError> {
        if self.state.get() == TransformState::Submitting {
            return Err(ClientError::OperationInProgress("transformation"));
        }
        Ok(())
    }
}

/// Puts the dialog back to `Idle` if a submission is abandoned mid-flight.
struct Submission<'a> {
    state: &'a Cell<TransformState>,
    finished: bool,
}

impl<'a> Submission<'a> {
    fn begin(state: &'a Cell<TransformState>) -> Self {
        state.set(TransformState::Submitting);
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, outcome: TransformState) {
        self.state.set(outcome);
        self.finished = true;
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.set(TransformState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Call, MockApi};
    use crate::error::{ApiError, ErrorKind};
    use crate::transform::draft::{Filter, OutputFormat, Rotation};
    use pollster::block_on;
    use serde_json::json;

    fn token() -> AuthToken {
        AuthToken::new("tok")
    }

    #[test]
    fn test_apply_sends_exact_normalized_spec() {
        let api = MockApi::new();
        let draft = TransformDraft::new()
            .with_rotate(Rotation::Deg90)
            .with_format(Some(OutputFormat::Webp))
            .with_filter(Filter::Grayscale, true)
            .with_filter(Filter::Sepia, false);

        let refresh = block_on(apply(&api, &ImageId::new("img1"), &draft, &token())).unwrap();

        assert_eq!(refresh, Refresh::ALL);
        assert_eq!(
            api.calls(),
            vec![Call::Transform(
                ImageId::new("img1"),
                json!({
                    "transformations": {
                        "rotate": 90,
                        "format": "webp",
                        "filters": {"grayscale": true}
                    }
                })
            )]
        );
    }

    #[test]
    fn test_empty_draft_makes_no_request() {
        let api = MockApi::new();
        let draft = TransformDraft::new().with_rotate(Rotation::None);

        let err = block_on(apply(&api, &ImageId::new("img1"), &draft, &token())).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyTransformation);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_backend_rejection_keeps_message() {
        let api = MockApi::new();
        api.fail_transform(ApiError::Status {
            status: 400,
            body: "Unsupported format".into(),
        });
        let draft = TransformDraft::new().with_format(Some(OutputFormat::Png));

        let err = block_on(apply(&api, &ImageId::new("img1"), &draft, &token())).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransformRejected);
        assert_eq!(err.user_message(), "Transformation failed: Unsupported format");
    }

    #[test]
    fn test_builder_state_transitions_on_success() {
        let api = MockApi::new();
        let builder = TransformRequestBuilder::new(ImageId::new("img1"));
        assert_eq!(builder.state(), TransformState::Idle);

        builder
            .edit(|d| d.with_rotate(Rotation::Deg180))
            .unwrap();
        assert_eq!(builder.state(), TransformState::Editing);

        block_on(builder.apply(&api, &token())).unwrap();
        assert_eq!(builder.state(), TransformState::Applied);

        builder.reset().unwrap();
        assert_eq!(builder.state(), TransformState::Idle);
        assert!(builder.draft().is_pristine());
    }

    #[test]
    fn test_builder_state_transitions_on_rejection() {
        let api = MockApi::new();
        api.fail_transform(ApiError::Network("Network Error".into()));
        let builder = TransformRequestBuilder::new(ImageId::new("img1"));
        builder.edit(|d| d.with_resize_width("640")).unwrap();

        let err = block_on(builder.apply(&api, &token())).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransformRejected);
        assert_eq!(builder.state(), TransformState::Rejected);
        // The draft survives a rejection so the user can adjust and retry.
        assert_eq!(builder.draft().resize().width, "640");
    }

    #[test]
    fn test_builder_rejects_empty_without_state_change() {
        let api = MockApi::new();
        let builder = TransformRequestBuilder::new(ImageId::new("img1"));
        builder.edit(|d| d.with_crop_width("10")).unwrap();

        let err = block_on(builder.apply(&api, &token())).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyTransformation);
        assert_eq!(builder.state(), TransformState::Editing);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_retarget_resets_draft() {
        let builder = TransformRequestBuilder::new(ImageId::new("img1"));
        builder.edit(|d| d.with_rotate(Rotation::Deg90)).unwrap();

        builder.retarget(ImageId::new("img2")).unwrap();

        assert_eq!(builder.target(), ImageId::new("img2"));
        assert!(builder.draft().is_pristine());
        assert_eq!(builder.state(), TransformState::Idle);
    }

    #[test]
    fn test_edit_refused_while_submitting() {
        let builder = TransformRequestBuilder::new(ImageId::new("img1"));
        let guard = Submission::begin(&builder.state);

        let err = builder.edit(|d| d.with_crop_x("5")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationInProgress);
        assert!(builder.reset().is_err());

        drop(guard);
        assert_eq!(builder.state(), TransformState::Idle);
    }

    #[test]
    fn test_normalized_preview() {
        let builder = TransformRequestBuilder::new(ImageId::new("img1"));
        builder
            .edit(|d| d.with_crop_width("100").with_crop_height("80"))
            .unwrap();
        let spec = builder.normalized();
        assert!(spec.crop.is_some());
        assert!(spec.resize.is_none());
    }
}
