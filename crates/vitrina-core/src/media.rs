//! Media externalization port and media URL classification.
//!
//! A [`MediaExternalizer`] turns an uploaded attachment into a durable,
//! publicly fetchable URL. It is optional: without one the wizard accepts
//! literal links and platform-hosted URLs only.

use std::future::Future;
use std::pin::Pin;

use vitrina_types::error::{MediaError, ValidationError};
use vitrina_types::event::MediaSource;
use vitrina_types::product::MediaKind;

/// File extensions treated as video when classifying a literal URL.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "m4v", "avi", "mkv", "3gp"];

/// Uploads media to a public host.
pub trait MediaExternalizer: Send + Sync {
    /// Short host name for logs.
    fn name(&self) -> &str;

    /// Upload `source` and return its public URL.
    fn externalize(
        &self,
        source: &MediaSource,
    ) -> impl Future<Output = Result<String, MediaError>> + Send;
}

/// Object-safe version of [`MediaExternalizer`] with a boxed future.
pub trait MediaExternalizerDyn: Send + Sync {
    fn name(&self) -> &str;

    fn externalize_boxed<'a>(
        &'a self,
        source: &'a MediaSource,
    ) -> Pin<Box<dyn Future<Output = Result<String, MediaError>> + Send + 'a>>;
}

impl<T: MediaExternalizer> MediaExternalizerDyn for T {
    fn name(&self) -> &str {
        MediaExternalizer::name(self)
    }

    fn externalize_boxed<'a>(
        &'a self,
        source: &'a MediaSource,
    ) -> Pin<Box<dyn Future<Output = Result<String, MediaError>> + Send + 'a>> {
        Box::pin(self.externalize(source))
    }
}

/// Type-erased media host, selected at startup from configuration.
pub struct BoxMediaExternalizer {
    inner: Box<dyn MediaExternalizerDyn>,
}

impl BoxMediaExternalizer {
    pub fn new<T: MediaExternalizer + 'static>(externalizer: T) -> Self {
        Self {
            inner: Box::new(externalizer),
        }
    }
}

impl MediaExternalizer for BoxMediaExternalizer {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn externalize(&self, source: &MediaSource) -> Result<String, MediaError> {
        self.inner.externalize_boxed(source).await
    }
}

/// Validate a literal media link and classify it by extension.
///
/// Only `http(s)` URLs without whitespace are accepted. Anything whose path
/// ends in a known video extension is a video, everything else an image.
pub fn classify_media_url(text: &str) -> Result<(MediaKind, String), ValidationError> {
    let url = text.trim();
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    let valid = match rest {
        Some(rest) => !rest.is_empty() && !url.chars().any(char::is_whitespace),
        None => false,
    };
    if !valid {
        return Err(ValidationError::InvalidMediaUrl(url.to_string()));
    }

    let path = lower
        .split(['?', '#'])
        .next()
        .unwrap_or(&lower);
    let kind = match path.rsplit_once('.') {
        Some((_, ext)) if VIDEO_EXTENSIONS.contains(&ext) => MediaKind::Video,
        _ => MediaKind::Image,
    };
    Ok((kind, url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_image_and_video() {
        assert_eq!(
            classify_media_url("http://x/a.jpg").unwrap(),
            (MediaKind::Image, "http://x/a.jpg".to_string())
        );
        assert_eq!(
            classify_media_url(" https://cdn.example/clip.MP4?sig=1 ").unwrap(),
            (MediaKind::Video, "https://cdn.example/clip.MP4?sig=1".to_string())
        );
        // No extension: image.
        assert_eq!(
            classify_media_url("https://i.ibb.co/abc").unwrap().0,
            MediaKind::Image
        );
    }

    #[test]
    fn test_classify_rejects_non_links() {
        assert!(classify_media_url("foto.jpg").is_err());
        assert!(classify_media_url("ftp://x/a.jpg").is_err());
        assert!(classify_media_url("http://").is_err());
        assert!(classify_media_url("http://x/a b.jpg").is_err());
    }

    struct FixedHost;

    impl MediaExternalizer for FixedHost {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn externalize(&self, source: &MediaSource) -> Result<String, MediaError> {
            match source {
                MediaSource::Bytes { file_name, .. } => Ok(format!("https://img.test/{file_name}")),
                MediaSource::PlatformUrl(_) => Err(MediaError::Rejected("no urls".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_boxed_externalizer_delegates() {
        let host = BoxMediaExternalizer::new(FixedHost);
        assert_eq!(MediaExternalizer::name(&host), "fixed");
        let url = host
            .externalize(&MediaSource::Bytes {
                data: vec![1, 2, 3],
                file_name: "a.jpg".into(),
            })
            .await
            .unwrap();
        assert_eq!(url, "https://img.test/a.jpg");
        assert!(
            host.externalize(&MediaSource::PlatformUrl("x".into()))
                .await
                .is_err()
        );
    }
}
