//! Wire types exchanged with the Image Service API.
//!
//! All types use camelCase field names on the wire. Resource types are
//! read-only snapshots: the server is the sole source of truth.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::endpoints::Endpoint;
use crate::error::ApiError;

/// Opaque identifier of an image or transformed image.
///
/// The backend emits numeric ids, but the client never does arithmetic on
/// them, so both JSON numbers and strings are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ImageId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ImageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ImageId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ImageId, E> {
                Ok(ImageId::new(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ImageId, E> {
                Ok(ImageId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ImageId, E> {
                Ok(ImageId::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ImageId, E> {
                Ok(ImageId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Login / registration body.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields must contain something other than whitespace.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token issued by `/login` or `/register`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Parse a `/login` or `/register` response body. Accepts the raw token
    /// text, a JSON string, or a JSON object with a `token` field.
    pub fn from_response(body: &str) -> Result<Self, ApiError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum TokenBody {
            Text(String),
            Object { token: String },
        }

        let body = body.trim();
        let token = match serde_json::from_str::<TokenBody>(body) {
            Ok(TokenBody::Text(token)) | Ok(TokenBody::Object { token }) => token,
            Err(_) if body.starts_with('{') => {
                return Err(ApiError::Decode("response has no token".to_string()))
            }
            Err(_) => body.to_string(),
        };
        if token.trim().is_empty() {
            return Err(ApiError::Decode("empty token".to_string()));
        }
        Ok(Self(token))
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Body of `POST /images/upload-url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSlotRequest {
    pub filename: String,
    pub content_type: String,
}

/// Single-use, server-issued target for a direct-to-storage write.
///
/// Not `Clone`. The upload step consumes the ticket, so it is used once.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub upload_url: String,
    /// Server-assigned object key, echoed back in the metadata commit.
    pub filename: String,
}

/// Body of `POST /images/save-metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataCommit {
    pub filename: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: u64,
}

/// A committed original image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResource {
    pub id: ImageId,
    /// Original filename as uploaded.
    #[serde(alias = "originalName", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ImageResource {
    /// Name for display, falling back to a generic label.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Image")
    }

    /// Human-readable size, e.g. `"2.0 KB"`, or `"Unknown"`.
    pub fn display_size(&self) -> String {
        format_size(self.file_size)
    }
}

/// Output of a transformation job. Always references one original image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedImageResource {
    pub id: ImageId,
    pub original_image_id: ImageId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    /// JSON text of the transformations that produced this image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl TransformedImageResource {
    pub fn display_size(&self) -> String {
        format_size(self.file_size)
    }
}

/// Response of the `download-url` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub download_url: String,
    /// Lifetime of the link in seconds, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u32>,
}

/// Either kind of stored image, for download and delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    Original(ImageId),
    Transformed(ImageId),
}

impl ImageTarget {
    pub fn id(&self) -> &ImageId {
        match self {
            ImageTarget::Original(id) | ImageTarget::Transformed(id) => id,
        }
    }

    pub fn download_endpoint(&self) -> Endpoint {
        match self {
            ImageTarget::Original(id) => Endpoint::ImageDownloadUrl(id.clone()),
            ImageTarget::Transformed(id) => Endpoint::TransformedDownloadUrl(id.clone()),
        }
    }

    pub fn delete_endpoint(&self) -> Endpoint {
        match self {
            ImageTarget::Original(id) => Endpoint::DeleteImage(id.clone()),
            ImageTarget::Transformed(id) => Endpoint::DeleteTransformedImage(id.clone()),
        }
    }
}

fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) if b > 0 => format!("{:.1} KB", b as f64 / 1024.0),
        _ => "Unknown".to_string(),
    }
}
