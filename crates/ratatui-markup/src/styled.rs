//! Attributed text produced by the inline renderer.
use crate::image::ScaledImage;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui_markup_core::render::display_width;
use std::sync::Arc;
use url::Url;

/// Tags attached to runs that a later pass acts on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunAttributes {
    /// Marks inline code so the background pass can draw its fill.
    pub inline_code: bool,
    pub link: Option<Url>,
}

#[derive(Clone, Debug)]
pub enum RunContent {
    Text(String),
    Image(Arc<ScaledImage>),
}

impl PartialEq for RunContent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RunContent::Text(a), RunContent::Text(b)) => a == b,
            (RunContent::Image(a), RunContent::Image(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub content: RunContent,
    pub style: Style,
    pub attributes: RunAttributes,
}

impl Run {
    pub fn text(text: impl Into<String>, style: Style) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            style,
            attributes: RunAttributes::default(),
        }
    }

    pub fn image(image: Arc<ScaledImage>) -> Self {
        Self {
            content: RunContent::Image(image),
            style: Style::default(),
            attributes: RunAttributes::default(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            RunContent::Text(text) => Some(text),
            RunContent::Image(_) => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.content, RunContent::Image(_))
    }
}

/// A flow of styled runs; the unit every inline rendering produces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyledText {
    runs: Vec<Run>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        let mut out = Self::new();
        out.push(Run::text(text, style));
        out
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::styled(text, Style::default())
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn into_runs(self) -> Vec<Run> {
        self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs
            .iter()
            .all(|r| matches!(&r.content, RunContent::Text(t) if t.is_empty()))
    }

    /// Appends a run, merging it into the previous one when style and attributes match.
    pub fn push(&mut self, run: Run) {
        if let RunContent::Text(text) = &run.content {
            if text.is_empty() {
                return;
            }
            if let Some(last) = self.runs.last_mut() {
                if last.style == run.style && last.attributes == run.attributes {
                    if let RunContent::Text(prev) = &mut last.content {
                        prev.push_str(text);
                        return;
                    }
                }
            }
        }
        self.runs.push(run);
    }

    pub fn append(&mut self, other: StyledText) {
        for run in other.runs {
            self.push(run);
        }
    }

    pub fn concat(parts: impl IntoIterator<Item = StyledText>) -> Self {
        let mut out = Self::new();
        for part in parts {
            out.append(part);
        }
        out
    }

    /// Applies `style` on top of every run.
    pub fn patch_style(mut self, style: Style) -> Self {
        for run in &mut self.runs {
            run.style = run.style.patch(style);
        }
        self.remerge()
    }

    /// Applies `base` beneath every run so run styles win.
    pub fn with_base_style(mut self, base: Style) -> Self {
        for run in &mut self.runs {
            run.style = base.patch(run.style);
        }
        self.remerge()
    }

    pub fn with_link(mut self, url: &Url) -> Self {
        for run in &mut self.runs {
            run.attributes.link = Some(url.clone());
        }
        self.remerge()
    }

    pub fn with_inline_code(mut self) -> Self {
        for run in &mut self.runs {
            run.attributes.inline_code = true;
        }
        self
    }

    fn remerge(self) -> Self {
        let mut out = Self::new();
        for run in self.runs {
            out.push(run);
        }
        out
    }

    pub fn bold(self) -> Self {
        self.patch_style(Style::default().add_modifier(Modifier::BOLD))
    }

    pub fn italic(self) -> Self {
        self.patch_style(Style::default().add_modifier(Modifier::ITALIC))
    }

    pub fn strikethrough(self) -> Self {
        self.patch_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
    }

    /// Text content of all runs. Images contribute nothing.
    pub fn plain(&self) -> String {
        self.runs.iter().filter_map(Run::as_text).collect()
    }

    /// Display width in cells of the text runs.
    pub fn width(&self) -> usize {
        self.runs
            .iter()
            .filter_map(Run::as_text)
            .map(display_width)
            .sum()
    }

    pub fn has_images(&self) -> bool {
        self.runs.iter().any(Run::is_image)
    }

    /// Single-line rendition. Images become an empty cell.
    pub fn to_line(&self) -> Line<'static> {
        let spans: Vec<Span<'static>> = self
            .runs
            .iter()
            .map(|run| match &run.content {
                RunContent::Text(text) => Span::styled(text.clone(), run.style),
                RunContent::Image(_) => Span::styled(" ", run.style),
            })
            .collect();
        Line::from(spans)
    }
}

impl From<&str> for StyledText {
    fn from(value: &str) -> Self {
        Self::raw(value)
    }
}

impl From<String> for StyledText {
    fn from(value: String) -> Self {
        Self::raw(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Stylize;

    #[test]
    fn push_merges_matching_runs() {
        let mut text = StyledText::raw("a");
        text.push(Run::text("b", Style::default()));
        text.push(Run::text("c", Style::default().add_modifier(Modifier::BOLD)));
        text.push(Run::text("", Style::default()));
        assert_eq!(text.runs().len(), 2);
        assert_eq!(text.plain(), "abc");
        assert_eq!(text.width(), 3);
    }

    #[test]
    fn join_is_associative() {
        let a = StyledText::raw("a");
        let b = StyledText::raw("b").bold();
        let c = StyledText::raw("c");
        let left = StyledText::concat([StyledText::concat([a.clone(), b.clone()]), c.clone()]);
        let right = StyledText::concat([a, StyledText::concat([b, c])]);
        assert_eq!(left, right);
    }

    #[test]
    fn base_style_does_not_override_runs() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let text = StyledText::styled("x", bold).with_base_style(Style::default().italic());
        assert_eq!(text.runs()[0].style, bold.italic());
    }

    #[test]
    fn link_tag_keeps_text() {
        let url = Url::parse("https://example.com").unwrap();
        let text = StyledText::raw("go").with_link(&url);
        assert_eq!(text.runs()[0].attributes.link.as_ref(), Some(&url));
        assert_eq!(text.to_line().to_string(), "go");
    }
}
