//! `ratatui-markup-core` holds the small, dependency-light pieces shared by the `ratatui-markup`
//! crates.
//!
//! - [`theme::Theme`]: the default styles markdown blocks are drawn with.
//! - [`text::CodeHighlighter`]: hook for syntax highlighting code blocks. Backends live in
//!   `ratatui-markup-syntax`.
//! - [`render`]: width-aware span drawing into a [`ratatui::buffer::Buffer`].
//!
//! Most users should depend on `ratatui-markup` directly; it re-exports this crate as `core`.
pub mod theme;

pub mod text;

pub mod render;
