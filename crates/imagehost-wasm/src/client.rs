//! The browser-facing client class.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! import init, { ImageHostClient } from '@imagehost/wasm';
//!
//! await init();
//! const client = new ImageHostClient({ baseUrl: 'https://api.example.com' });
//! if (!client.isAuthenticated) {
//!   await client.login('alice', 'secret');
//! }
//!
//! client.selectFile(input.files[0]);
//! const image = await client.upload((percent) => bar.value = percent);
//! console.log(client.images());
//! ```
//!
//! Every promise rejects with `{ kind, message, status?, fatal }`, where
//! `message` is ready to show to the user.

use std::rc::Rc;

use imagehost_core::{
    ClientConfig, Credentials, ImageHost, ImageId, ImageTarget, SelectedFile, UPLOAD_SUCCESS,
};
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::File;

use crate::console;
use crate::dialog::TransformDialog;
use crate::storage::LocalStorageTokenStore;
use crate::transport::BrowserTransport;
use crate::types::{config_error, reject, to_js};

pub(crate) type Host = ImageHost<BrowserTransport, LocalStorageTokenStore>;

#[wasm_bindgen]
pub struct ImageHostClient {
    inner: Rc<Host>,
}

#[wasm_bindgen]
impl ImageHostClient {
    /// Create a client from a plain config object. Omitted fields take
    /// their defaults; `undefined` is an all-default config.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ImageHostClient, JsValue> {
        let config: ClientConfig = if config.is_undefined() || config.is_null() {
            ClientConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let transport = BrowserTransport::new(&config).map_err(config_error)?;
        let store = LocalStorageTokenStore::new(config.token_storage_key.clone());
        let host = ImageHost::new(transport, store, config).map_err(config_error)?;
        Ok(Self {
            inner: Rc::new(host),
        })
    }

    #[wasm_bindgen(getter, js_name = isAuthenticated)]
    pub fn is_authenticated(&self) -> bool {
        self.inner.session().is_authenticated()
    }

    pub fn login(&self, username: String, password: String) -> Promise {
        let host = Rc::clone(&self.inner);
        future_to_promise(async move {
            let credentials = Credentials::new(username, password);
            host.login(&credentials)
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| reject(&e))
        })
    }

    /// Create an account. `confirm_password` must repeat `password`; a
    /// mismatch or a short password rejects without contacting the server.
    pub fn register(
        &self,
        username: String,
        password: String,
        confirm_password: String,
    ) -> Promise {
        let host = Rc::clone(&self.inner);
        future_to_promise(async move {
            let credentials = Credentials::new(username, password);
            host.register(&credentials, &confirm_password)
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| reject(&e))
        })
    }

    pub fn logout(&self) {
        self.inner.logout();
    }

    /// Replace the pending selection. Pass `null` to clear it.
    #[wasm_bindgen(js_name = selectFile)]
    pub fn select_file(&self, file: Option<File>) {
        let selection = file.map(|file| {
            let size = file.size().max(0.0) as u64;
            SelectedFile::new(file.name(), file.type_(), size, file)
        });
        self.inner.select_file(selection);
    }

    #[wasm_bindgen(getter, js_name = selectedFileName)]
    pub fn selected_file_name(&self) -> Option<String> {
        self.inner.selected_file_name()
    }

    #[wasm_bindgen(getter, js_name = isUploading)]
    pub fn is_uploading(&self) -> bool {
        self.inner.is_uploading()
    }

    /// Upload progress, 0 to 100.
    #[wasm_bindgen(getter)]
    pub fn progress(&self) -> u8 {
        self.inner.progress().percent()
    }

    /// Upload the selected file. `onProgress` receives each new percentage.
    ///
    /// Resolves with the committed image. Whatever the outcome, the
    /// progress bar returns to 0 after the configured delay.
    pub fn upload(&self, on_progress: Option<Function>) -> Promise {
        let host = Rc::clone(&self.inner);
        if !host.is_uploading() {
            match on_progress {
                Some(callback) => host.progress().set_listener(move |percent| {
                    let _ = callback.call1(&JsValue::NULL, &JsValue::from(percent));
                }),
                None => host.progress().clear_listener(),
            }
        }
        future_to_promise(async move {
            let result = host.upload().await;
            schedule_progress_reset(&host);
            match result {
                Ok(image) => {
                    console::info(UPLOAD_SUCCESS);
                    to_js(&image)
                }
                Err(e) => Err(reject(&e)),
            }
        })
    }

    /// Re-fetch both lists. Rejects with a non-fatal error if either
    /// could not be loaded; that list is then empty.
    pub fn refresh(&self) -> Promise {
        let host = Rc::clone(&self.inner);
        future_to_promise(async move {
            host.refresh()
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| reject(&e))
        })
    }

    /// Cached original images from the last refresh.
    pub fn images(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.library().images())
    }

    /// Cached transformed images from the last refresh.
    #[wasm_bindgen(js_name = transformedImages)]
    pub fn transformed_images(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.library().transformed_images())
    }

    /// Cached transformed images derived from one original.
    #[wasm_bindgen(js_name = transformedFor)]
    pub fn transformed_for(&self, image_id: String) -> Result<JsValue, JsValue> {
        to_js(&self.inner.library().transformed_for(&ImageId::new(image_id)))
    }

    #[wasm_bindgen(js_name = openTransform)]
    pub fn open_transform(&self, image_id: String) -> TransformDialog {
        TransformDialog::new(Rc::clone(&self.inner), ImageId::new(image_id))
    }

    /// Signed download URL for an original (`transformed = false`) or a
    /// transformed image.
    #[wasm_bindgen(js_name = downloadUrl)]
    pub fn download_url(&self, image_id: String, transformed: bool) -> Promise {
        let host = Rc::clone(&self.inner);
        let target = target(image_id, transformed);
        future_to_promise(async move {
            match host.download_url(&target).await {
                Ok(link) => Ok(JsValue::from_str(&link.download_url)),
                Err(e) => Err(reject(&e)),
            }
        })
    }

    pub fn delete(&self, image_id: String, transformed: bool) -> Promise {
        let host = Rc::clone(&self.inner);
        let target = target(image_id, transformed);
        future_to_promise(async move {
            host.delete(&target)
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| reject(&e))
        })
    }
}

fn target(image_id: String, transformed: bool) -> ImageTarget {
    let id = ImageId::new(image_id);
    if transformed {
        ImageTarget::Transformed(id)
    } else {
        ImageTarget::Original(id)
    }
}

/// Return the progress bar to 0 after the configured delay.
fn schedule_progress_reset(host: &Rc<Host>) {
    let delay = i32::try_from(host.config().progress_reset_delay_ms).unwrap_or(i32::MAX);
    let Some(window) = web_sys::window() else {
        host.settle_progress();
        return;
    };
    let delayed = Rc::clone(host);
    let callback = Closure::once_into_js(move || delayed.settle_progress());
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        .is_err()
    {
        host.settle_progress();
    }
}
