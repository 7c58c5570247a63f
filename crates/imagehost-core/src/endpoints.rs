//! Route table of the Image Service API.
//!
//! Transports never hard-code paths; they ask an [`Endpoint`] for its method
//! and resolve it against the configured base URL.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::config::ConfigError;
use crate::model::ImageId;

/// Characters left unescaped in an id path segment (RFC 3986 unreserved).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// One backend route. The direct object-store upload is not listed here:
/// its URL comes from the upload ticket, not from the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    UploadSlot,
    SaveMetadata,
    ListImages,
    ListTransformedImages,
    Transform(ImageId),
    ImageDownloadUrl(ImageId),
    TransformedDownloadUrl(ImageId),
    DeleteImage(ImageId),
    DeleteTransformedImage(ImageId),
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Login
            | Endpoint::Register
            | Endpoint::UploadSlot
            | Endpoint::SaveMetadata
            | Endpoint::Transform(_) => Method::Post,
            Endpoint::ListImages
            | Endpoint::ListTransformedImages
            | Endpoint::ImageDownloadUrl(_)
            | Endpoint::TransformedDownloadUrl(_) => Method::Get,
            Endpoint::DeleteImage(_) | Endpoint::DeleteTransformedImage(_) => Method::Delete,
        }
    }

    /// Login and registration are the only unauthenticated routes.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Endpoint::Login | Endpoint::Register)
    }

    /// Absolute path, ids percent-encoded as a single segment.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Login => "/login".to_string(),
            Endpoint::Register => "/register".to_string(),
            Endpoint::UploadSlot => "/images/upload-url".to_string(),
            Endpoint::SaveMetadata => "/images/save-metadata".to_string(),
            Endpoint::ListImages => "/images".to_string(),
            Endpoint::ListTransformedImages => "/images/transformed-images".to_string(),
            Endpoint::Transform(id) => format!("/images/{}/transform", segment(id)),
            Endpoint::ImageDownloadUrl(id) => format!("/images/{}/download-url", segment(id)),
            Endpoint::TransformedDownloadUrl(id) => {
                format!("/images/transformed-images/{}/download-url", segment(id))
            }
            Endpoint::DeleteImage(id) => format!("/images/{}", segment(id)),
            Endpoint::DeleteTransformedImage(id) => {
                format!("/images/transformed-images/{}", segment(id))
            }
        }
    }

    /// Full request URL. With no base, the path is returned as-is so the
    /// browser resolves it against the page origin.
    pub fn url(&self, base: Option<&Url>) -> Result<String, ConfigError> {
        let path = self.path();
        match base {
            None => Ok(path),
            Some(base) => base
                .join(path.trim_start_matches('/'))
                .map(String::from)
                .map_err(|e| ConfigError::InvalidBaseUrl {
                    url: base.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

fn segment(id: &ImageId) -> String {
    utf8_percent_encode(id.as_str(), PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_paths() {
        assert_eq!(Endpoint::Login.path(), "/login");
        assert_eq!(Endpoint::Register.path(), "/register");
        assert_eq!(Endpoint::UploadSlot.path(), "/images/upload-url");
        assert_eq!(Endpoint::SaveMetadata.path(), "/images/save-metadata");
        assert_eq!(Endpoint::ListImages.path(), "/images");
        assert_eq!(
            Endpoint::ListTransformedImages.path(),
            "/images/transformed-images"
        );
    }

    #[test]
    fn test_id_paths() {
        let id = ImageId::new("img1");
        assert_eq!(Endpoint::Transform(id.clone()).path(), "/images/img1/transform");
        assert_eq!(
            Endpoint::ImageDownloadUrl(id.clone()).path(),
            "/images/img1/download-url"
        );
        assert_eq!(
            Endpoint::TransformedDownloadUrl(id.clone()).path(),
            "/images/transformed-images/img1/download-url"
        );
        assert_eq!(Endpoint::DeleteImage(id.clone()).path(), "/images/img1");
        assert_eq!(
            Endpoint::DeleteTransformedImage(id).path(),
            "/images/transformed-images/img1"
        );
    }

    #[test]
    fn test_id_is_escaped_as_one_segment() {
        let id = ImageId::new("a/b c");
        assert_eq!(Endpoint::DeleteImage(id).path(), "/images/a%2Fb%20c");
    }

    #[test]
    fn test_methods() {
        let id = ImageId::new("1");
        assert_eq!(Endpoint::Login.method(), Method::Post);
        assert_eq!(Endpoint::ListImages.method(), Method::Get);
        assert_eq!(Endpoint::Transform(id.clone()).method(), Method::Post);
        assert_eq!(Endpoint::ImageDownloadUrl(id.clone()).method(), Method::Get);
        assert_eq!(Endpoint::DeleteTransformedImage(id).method(), Method::Delete);
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_auth_requirements() {
        assert!(!Endpoint::Login.requires_auth());
        assert!(!Endpoint::Register.requires_auth());
        assert!(Endpoint::UploadSlot.requires_auth());
        assert!(Endpoint::ListImages.requires_auth());
    }

    #[test]
    fn test_url_resolution() {
        assert_eq!(Endpoint::ListImages.url(None).unwrap(), "/images");

        let base = Url::parse("https://api.example.com/v1/").unwrap();
        assert_eq!(
            Endpoint::UploadSlot.url(Some(&base)).unwrap(),
            "https://api.example.com/v1/images/upload-url"
        );
    }
}
