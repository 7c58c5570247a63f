//! Transformation requests: draft, normalization and submission.
//!
//! The pixel work happens on the backend. This module only decides *what*
//! to ask for:
//!
//! 1. The user edits a [`TransformDraft`] (raw form values, possibly empty)
//! 2. [`build`] normalizes it into a minimal [`NormalizedSpec`]
//! 3. [`apply`] sends it for exactly one image, or rejects an empty spec locally
//!
//! [`TransformRequestBuilder`] wraps these steps with the per-dialog state
//! machine.

mod draft;
mod normalize;
mod workflow;

pub use draft::{CropDraft, Filter, FilterFlags, OutputFormat, ResizeDraft, Rotation, TransformDraft};
pub use normalize::{
    build, NormalizedCrop, NormalizedFilters, NormalizedResize, NormalizedSpec, TransformRequest,
};
pub use workflow::{apply, TransformRequestBuilder, TransformState};
