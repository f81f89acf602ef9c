use std::sync::Arc;
use thiserror::Error;

/// Failure reported by an [`ImageFetcher`](crate::image::ImageFetcher) worker.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("http request failed: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("fetch was cancelled")]
    Cancelled,

    #[error("image fetch worker panicked")]
    Panicked,
}

/// Outcome of an [`ImageCache::image`](crate::image::ImageCache::image) lookup that cannot
/// produce pixels.
#[derive(Error, Debug, Clone)]
pub enum ImageError {
    /// The image has no source, or the source is not a valid absolute URL.
    #[error("image has no usable url")]
    NoUrl,

    /// A previous fetch for this URL failed. Cleared by `evict` or `clear`.
    #[error("image fetch failed: {0}")]
    FetchFailed(Arc<FetchError>),
}

/// A formatted markdown fragment did not parse back into inline content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReinterpretError {
    #[error("source did not reparse as inline content (got {kind})")]
    NotInline { kind: &'static str },
}
