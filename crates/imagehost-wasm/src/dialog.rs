//! Transform dialog bindings.
//!
//! One `TransformDialog` backs one open dialog: it holds the sparse draft
//! the form edits, previews the normalized request, and submits it.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const dialog = client.openTransform(image.id);
//! dialog.setRotate(90);
//! dialog.setFormat('webp');
//! dialog.setGrayscale(true);
//! console.log(dialog.normalized()); // { rotate: 90, format: 'webp', filters: { grayscale: true } }
//! await dialog.apply();
//! ```

use std::rc::Rc;

use imagehost_core::transform::Filter;
use imagehost_core::{
    ImageId, OutputFormat, Rotation, TransformDraft, TransformRequestBuilder, TRANSFORM_SUCCESS,
};
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::client::Host;
use crate::console;
use crate::types::{reject, to_js};

#[wasm_bindgen]
pub struct TransformDialog {
    host: Rc<Host>,
    builder: Rc<TransformRequestBuilder>,
}

impl TransformDialog {
    pub(crate) fn new(host: Rc<Host>, image_id: ImageId) -> Self {
        let builder = Rc::new(host.open_transform(image_id));
        Self { host, builder }
    }

    fn edit(
        &self,
        f: impl FnOnce(TransformDraft) -> TransformDraft,
    ) -> Result<(), JsValue> {
        self.builder.edit(f).map_err(|e| reject(&e))
    }
}

#[wasm_bindgen]
impl TransformDialog {
    #[wasm_bindgen(getter, js_name = imageId)]
    pub fn image_id(&self) -> String {
        self.builder.target().to_string()
    }

    /// `"Idle"`, `"Editing"`, `"Submitting"`, `"Applied"` or `"Rejected"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        format!("{:?}", self.builder.state())
    }

    #[wasm_bindgen(getter, js_name = resizeWidth)]
    pub fn resize_width(&self) -> String {
        self.builder.draft().resize().width.clone()
    }

    #[wasm_bindgen(js_name = setResizeWidth)]
    pub fn set_resize_width(&self, value: String) -> Result<(), JsValue> {
        self.edit(|d| d.with_resize_width(value))
    }

    #[wasm_bindgen(getter, js_name = resizeHeight)]
    pub fn resize_height(&self) -> String {
        self.builder.draft().resize().height.clone()
    }

    #[wasm_bindgen(js_name = setResizeHeight)]
    pub fn set_resize_height(&self, value: String) -> Result<(), JsValue> {
        self.edit(|d| d.with_resize_height(value))
    }

    /// Display-only: the backend always keeps the aspect ratio.
    #[wasm_bindgen(getter, js_name = maintainAspectRatio)]
    pub fn maintain_aspect_ratio(&self) -> bool {
        self.builder.draft().resize().maintain_aspect_ratio
    }

    #[wasm_bindgen(js_name = setMaintainAspectRatio)]
    pub fn set_maintain_aspect_ratio(&self, keep: bool) -> Result<(), JsValue> {
        self.edit(|d| d.with_maintain_aspect_ratio(keep))
    }

    /// Set one crop field: `"width"`, `"height"`, `"x"` or `"y"`.
    #[wasm_bindgen(js_name = setCrop)]
    pub fn set_crop(&self, field: &str, value: String) -> Result<(), JsValue> {
        match field {
            "width" => self.edit(|d| d.with_crop_width(value)),
            "height" => self.edit(|d| d.with_crop_height(value)),
            "x" => self.edit(|d| d.with_crop_x(value)),
            "y" => self.edit(|d| d.with_crop_y(value)),
            other => Err(JsValue::from_str(&format!("Unknown crop field: {other}"))),
        }
    }

    #[wasm_bindgen(getter, js_name = cropWidth)]
    pub fn crop_width(&self) -> String {
        self.builder.draft().crop().width.clone()
    }

    #[wasm_bindgen(getter, js_name = cropHeight)]
    pub fn crop_height(&self) -> String {
        self.builder.draft().crop().height.clone()
    }

    #[wasm_bindgen(getter, js_name = cropX)]
    pub fn crop_x(&self) -> String {
        self.builder.draft().crop().x.clone()
    }

    #[wasm_bindgen(getter, js_name = cropY)]
    pub fn crop_y(&self) -> String {
        self.builder.draft().crop().y.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn rotate(&self) -> u16 {
        self.builder.draft().rotate().degrees()
    }

    /// Accepts 0, 90, 180 or 270.
    #[wasm_bindgen(js_name = setRotate)]
    pub fn set_rotate(&self, degrees: i32) -> Result<(), JsValue> {
        let rotation = Rotation::from_degrees(degrees)
            .ok_or_else(|| JsValue::from_str(&format!("Unsupported rotation: {degrees}")))?;
        self.edit(|d| d.with_rotate(rotation))
    }

    #[wasm_bindgen(getter)]
    pub fn format(&self) -> Option<String> {
        self.builder.draft().format().map(|f| f.to_string())
    }

    /// `"jpeg"`, `"png"`, `"webp"`, or an empty string to keep the format.
    #[wasm_bindgen(js_name = setFormat)]
    pub fn set_format(&self, format: Option<String>) -> Result<(), JsValue> {
        let format = match format.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(
                name.parse::<OutputFormat>()
                    .map_err(|e| JsValue::from_str(&e))?,
            ),
        };
        self.edit(|d| d.with_format(format))
    }

    #[wasm_bindgen(getter)]
    pub fn grayscale(&self) -> bool {
        self.builder.draft().filters().grayscale
    }

    #[wasm_bindgen(js_name = setGrayscale)]
    pub fn set_grayscale(&self, enabled: bool) -> Result<(), JsValue> {
        self.edit(|d| d.with_filter(Filter::Grayscale, enabled))
    }

    #[wasm_bindgen(getter)]
    pub fn sepia(&self) -> bool {
        self.builder.draft().filters().sepia
    }

    #[wasm_bindgen(js_name = setSepia)]
    pub fn set_sepia(&self, enabled: bool) -> Result<(), JsValue> {
        self.edit(|d| d.with_filter(Filter::Sepia, enabled))
    }

    /// The request body that `apply` would send right now.
    pub fn normalized(&self) -> Result<JsValue, JsValue> {
        to_js(&self.builder.normalized())
    }

    /// Whether `apply` would be rejected locally as empty.
    #[wasm_bindgen(getter, js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.builder.normalized().is_empty()
    }

    /// Discard the draft. No network effect.
    pub fn reset(&self) -> Result<(), JsValue> {
        self.builder.reset().map_err(|e| reject(&e))
    }

    /// Submit the draft. Resolves once the backend accepted it and both
    /// image lists were re-fetched.
    pub fn apply(&self) -> Promise {
        let host = Rc::clone(&self.host);
        let builder = Rc::clone(&self.builder);
        future_to_promise(async move {
            match host.apply_transform(&builder).await {
                Ok(()) => {
                    console::info(TRANSFORM_SUCCESS);
                    Ok(JsValue::from_str(TRANSFORM_SUCCESS))
                }
                Err(e) => Err(reject(&e)),
            }
        })
    }
}
