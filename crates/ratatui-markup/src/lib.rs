//! Markdown rendering for ratatui.
//!
//! Source text is parsed into a [`markup::Markup`] tree, mapped to a [`block::RenderedBlock`]
//! tree by the dispatcher, laid out for a width by [`layout`], and drawn by
//! [`inline_code::draw_line`], which also paints the fill behind inline code.
//!
//! ## Two layers
//!
//! - [`view::MarkdownView`]: a scrollable widget that owns its document, styles and images.
//! - [`view::MarkdownDocument`] with [`context::RenderContext`]: parse once, render and lay out
//!   into your own buffers.
//!
//! Block appearance is pluggable through [`styles::MarkdownStyles`]. Remote images load in the
//! background through [`image::ImageCache`]; call [`image::ImageCache::poll`] (or
//! [`view::MarkdownView::poll_images`]) from the UI loop to pick up finished loads.
pub mod block;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod image;
pub mod inline;
pub mod inline_code;
pub mod layout;
pub mod list;
pub mod list_level;
pub mod markup;
pub mod styled;
pub mod styles;
pub mod table;
pub mod view;

pub use context::ImageMode;
pub use context::RenderContext;
pub use context::RenderOptions;
pub use error::FetchError;
pub use error::ImageError;
pub use crate::image::ImageCache;
pub use markup::Markup;
pub use markup::MarkupKind;
pub use ratatui_markup_core::text;
pub use ratatui_markup_core::theme;
pub use styles::MarkdownStyles;
pub use view::MarkdownDocument;
pub use view::MarkdownView;
