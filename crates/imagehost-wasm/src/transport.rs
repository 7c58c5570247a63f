//! Browser transport for the Image Service.
//!
//! JSON calls go through `fetch`. The direct object-store upload uses
//! `XMLHttpRequest` instead, because `fetch` cannot report upload progress.

use imagehost_core::endpoints::Endpoint;
use imagehost_core::{
    ApiError, AuthToken, ClientConfig, ConfigError, Credentials, DownloadLink, ImageApi, ImageId,
    ImageResource, ImageTarget, MetadataCommit, TransformRequest, TransformedImageResource,
    UploadProgress, UploadSlotRequest, UploadTicket,
};
use js_sys::{Function, Promise};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, File, ProgressEvent, Request, RequestInit, RequestMode, Response, XmlHttpRequest};

/// [`ImageApi`] over the browser's networking primitives.
pub struct BrowserTransport {
    base: Option<Url>,
}

impl BrowserTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base: config.parsed_base_url()?,
        })
    }

    /// Issue one API request and return the response text.
    async fn send(
        &self,
        endpoint: &Endpoint,
        token: Option<&AuthToken>,
        body: Option<String>,
    ) -> Result<String, ApiError> {
        let url = endpoint
            .url(self.base.as_ref())
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let init = RequestInit::new();
        init.set_method(endpoint.method().as_str());
        init.set_mode(RequestMode::Cors);
        if let Some(body) = &body {
            init.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&url, &init).map_err(js_error)?;
        let headers = request.headers();
        if body.is_some() {
            headers
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
        }
        if let Some(token) = token {
            headers
                .set("Authorization", &token.bearer())
                .map_err(js_error)?;
        }

        let window =
            web_sys::window().ok_or_else(|| ApiError::Network("No window available".into()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;
        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .unwrap_or_default();

        if response.ok() {
            Ok(text)
        } else {
            Err(ApiError::Status {
                status: response.status(),
                body: error_body(&text),
            })
        }
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        token: Option<&AuthToken>,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let body = body.map(serde_json::to_string).transpose()?;
        let text = self.send(endpoint, token, body).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        token: &AuthToken,
    ) -> Result<T, ApiError> {
        self.send_json::<(), T>(endpoint, Some(token), None).await
    }
}

impl ImageApi for BrowserTransport {
    type Body = File;

    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        let body = serde_json::to_string(credentials)?;
        let text = self.send(&Endpoint::Login, None, Some(body)).await?;
        AuthToken::from_response(&text)
    }

    async fn register(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        let body = serde_json::to_string(credentials)?;
        let text = self.send(&Endpoint::Register, None, Some(body)).await?;
        AuthToken::from_response(&text)
    }

    async fn request_upload_slot(
        &self,
        token: &AuthToken,
        request: &UploadSlotRequest,
    ) -> Result<UploadTicket, ApiError> {
        self.send_json(&Endpoint::UploadSlot, Some(token), Some(request))
            .await
    }

    async fn upload_object(
        &self,
        upload_url: &str,
        content_type: &str,
        body: &File,
        progress: &UploadProgress,
    ) -> Result<(), ApiError> {
        let xhr = XmlHttpRequest::new().map_err(js_error)?;
        xhr.open_with_async("PUT", upload_url, true)
            .map_err(js_error)?;
        xhr.set_request_header("Content-Type", content_type)
            .map_err(js_error)?;

        let tracker = progress.clone();
        let on_progress = Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
            if event.length_computable() {
                tracker.record_transfer(event.loaded() as u64, event.total() as u64);
            }
        });
        let upload = xhr.upload().map_err(js_error)?;
        upload.set_onprogress(Some(on_progress.as_ref().unchecked_ref()));

        let done = Promise::new(&mut |resolve: Function, reject: Function| {
            let on_load = Closure::once_into_js(move || {
                let _ = resolve.call0(&JsValue::NULL);
            });
            let on_abort = reject.clone();
            let on_error = Closure::once_into_js(move || {
                let _ = reject.call0(&JsValue::NULL);
            });
            let on_abort = Closure::once_into_js(move || {
                let _ = on_abort.call0(&JsValue::NULL);
            });
            xhr.set_onload(Some(on_load.unchecked_ref()));
            xhr.set_onerror(Some(on_error.unchecked_ref()));
            xhr.set_onabort(Some(on_abort.unchecked_ref()));
        });

        let blob: &Blob = body;
        xhr.send_with_opt_blob(Some(blob)).map_err(js_error)?;
        let outcome = JsFuture::from(done).await;

        upload.set_onprogress(None);
        drop(on_progress);

        if outcome.is_err() {
            return Err(ApiError::Network("Network Error".to_string()));
        }
        let status = xhr.status().map_err(js_error)?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            let text = xhr.response_text().ok().flatten().unwrap_or_default();
            Err(ApiError::Status {
                status,
                body: error_body(&text),
            })
        }
    }

    async fn save_metadata(
        &self,
        token: &AuthToken,
        commit: &MetadataCommit,
    ) -> Result<ImageResource, ApiError> {
        self.send_json(&Endpoint::SaveMetadata, Some(token), Some(commit))
            .await
    }

    async fn list_images(&self, token: &AuthToken) -> Result<Vec<ImageResource>, ApiError> {
        self.get(&Endpoint::ListImages, token).await
    }

    async fn list_transformed_images(
        &self,
        token: &AuthToken,
    ) -> Result<Vec<TransformedImageResource>, ApiError> {
        self.get(&Endpoint::ListTransformedImages, token).await
    }

    async fn transform(
        &self,
        token: &AuthToken,
        image_id: &ImageId,
        request: &TransformRequest,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_string(request)?;
        self.send(&Endpoint::Transform(image_id.clone()), Some(token), Some(body))
            .await
            .map(|_| ())
    }

    async fn download_url(
        &self,
        token: &AuthToken,
        target: &ImageTarget,
    ) -> Result<DownloadLink, ApiError> {
        self.get(&target.download_endpoint(), token).await
    }

    async fn delete(&self, token: &AuthToken, target: &ImageTarget) -> Result<(), ApiError> {
        self.send(&target.delete_endpoint(), Some(token), None)
            .await
            .map(|_| ())
    }
}

/// Backend message out of an error response. JSON bodies of the form
/// `{"message": ...}` or `{"error": ...}` are unwrapped; anything else is
/// kept verbatim.
pub(crate) fn error_body(text: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Envelope {
        message: Option<String>,
        error: Option<String>,
    }

    match serde_json::from_str::<Envelope>(text) {
        Ok(Envelope {
            message: Some(m), ..
        }) => m,
        Ok(Envelope { error: Some(e), .. }) => e,
        _ => text.to_string(),
    }
}

fn js_error(value: JsValue) -> ApiError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "Network Error".to_string());
    ApiError::Network(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_unwraps_message() {
        assert_eq!(error_body(r#"{"message":"File too large"}"#), "File too large");
        assert_eq!(error_body(r#"{"error":"Unauthorized"}"#), "Unauthorized");
    }

    #[test]
    fn test_error_body_keeps_plain_text() {
        assert_eq!(error_body("Invalid credentials"), "Invalid credentials");
        assert_eq!(error_body(""), "");
        assert_eq!(error_body(r#"{"code":7}"#), r#"{"code":7}"#);
    }

    #[test]
    fn test_transport_rejects_bad_base_url() {
        let config = ClientConfig::new().with_base_url("not a url");
        assert!(BrowserTransport::new(&config).is_err());
    }

    #[test]
    fn test_transport_accepts_relative_config() {
        let transport = BrowserTransport::new(&ClientConfig::default()).unwrap();
        assert!(transport.base.is_none());
    }
}
