//! Code block highlighters for `ratatui-markup`.
//!
//! Enable the `syntect` feature for [`syntect::SyntectHighlighter`]. Without it,
//! [`default_highlighter`] returns `None` and code blocks render in the theme's code style.
use ratatui_markup_core::text::CodeHighlighter;
use std::sync::Arc;

#[cfg(feature = "syntect")]
pub mod syntect;

pub type SharedHighlighter = Arc<dyn CodeHighlighter + Send + Sync>;

/// The best highlighter compiled into this build.
pub fn default_highlighter() -> Option<SharedHighlighter> {
    #[cfg(feature = "syntect")]
    {
        Some(Arc::new(syntect::SyntectHighlighter::new()))
    }
    #[cfg(not(feature = "syntect"))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_highlighter_matches_features() {
        assert_eq!(default_highlighter().is_some(), cfg!(feature = "syntect"));
    }
}
