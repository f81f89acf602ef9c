use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Span;

/// Syntax highlighting hook used by code block styles.
///
/// Implementations return one `Vec<Span>` per input line, in order.
pub trait CodeHighlighter {
    fn highlight_lines(&self, language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>>;

    fn highlight_text(&self, language: Option<&str>, text: &str) -> Vec<Vec<Span<'static>>> {
        let mut lines: Vec<&str> = text.split('\n').collect();
        if lines.is_empty() {
            lines.push("");
        }
        self.highlight_lines(language, &lines)
    }

    fn background_color(&self) -> Option<Color> {
        None
    }
}

pub struct NoHighlight;

impl CodeHighlighter for NoHighlight {
    fn highlight_lines(&self, _language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>> {
        lines
            .iter()
            .map(|l| vec![Span::styled((*l).to_string(), Style::default())])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_highlight_keeps_one_span_per_line() {
        let out = NoHighlight.highlight_text(Some("rs"), "fn a() {}\n\nlet b = 1;");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0][0].content, "fn a() {}");
        assert_eq!(out[1][0].content, "");
    }
}
