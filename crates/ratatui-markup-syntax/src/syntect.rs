use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui_markup_core::text::CodeHighlighter;
use syntect::easy::HighlightLines;
use syntect::highlighting::FontStyle;
use syntect::highlighting::Style as SynStyle;
use syntect::highlighting::Theme;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxReference;
use syntect::parsing::SyntaxSet;

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Highlights fenced code with syntect's bundled syntaxes and themes.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME)
    }

    /// Uses the bundled theme called `name`, or the default theme when there is none.
    pub fn with_theme(name: &str) -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .remove(name)
            .or_else(|| {
                log::warn!(target: "ratatui_markup::syntax", "unknown theme {name:?}");
                theme_set.themes.remove(DEFAULT_THEME)
            })
            .unwrap_or_default();
        Self { syntax_set, theme }
    }

    pub fn theme_names() -> Vec<String> {
        ThemeSet::load_defaults().themes.into_keys().collect()
    }

    fn syntax_for(&self, language: Option<&str>) -> &SyntaxReference {
        if let Some(lang) = language {
            if let Some(syntax) = self.syntax_set.find_syntax_by_token(lang) {
                return syntax;
            }
            if let Some(syntax) = self.syntax_set.find_syntax_by_extension(lang) {
                return syntax;
            }
        }
        self.syntax_set.find_syntax_plain_text()
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight_lines(&self, language: Option<&str>, lines: &[&str]) -> Vec<Vec<Span<'static>>> {
        let syntax = self.syntax_for(language);
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut out: Vec<Vec<Span<'static>>> = Vec::with_capacity(lines.len());
        let mut line_buf = String::new();
        for line in lines {
            // The newline-aware syntaxes need the terminator to keep state across lines.
            line_buf.clear();
            line_buf.push_str(line);
            line_buf.push('\n');
            let regions = match highlighter.highlight_line(&line_buf, &self.syntax_set) {
                Ok(regions) => regions,
                Err(err) => {
                    log::debug!(target: "ratatui_markup::syntax", "highlight failed: {err}");
                    Vec::new()
                }
            };
            let mut spans: Vec<Span<'static>> = regions
                .into_iter()
                .filter_map(|(style, s)| {
                    let s = s.trim_end_matches('\n');
                    (!s.is_empty()).then(|| Span::styled(s.to_string(), to_ratatui_style(style)))
                })
                .collect();
            if spans.is_empty() {
                spans.push(Span::raw((*line).to_string()));
            }
            out.push(spans);
        }
        out
    }

    fn background_color(&self) -> Option<Color> {
        self.theme
            .settings
            .background
            .map(|c| Color::Rgb(c.r, c.g, c.b))
    }
}

fn to_ratatui_style(s: SynStyle) -> Style {
    let mut out = Style::default().fg(Color::Rgb(s.foreground.r, s.foreground.g, s.foreground.b));

    if s.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if s.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if s.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn keeps_one_entry_per_line_without_newlines() {
        let h = SyntectHighlighter::new();
        let out = h.highlight_lines(Some("rust"), &["fn main() {", "", "}"]);
        assert_eq!(out.len(), 3);
        assert_eq!(text(&out[0]), "fn main() {");
        assert_eq!(text(&out[1]), "");
        assert_eq!(text(&out[2]), "}");
    }

    #[test]
    fn colors_known_languages() {
        let h = SyntectHighlighter::new();
        let out = h.highlight_lines(Some("rs"), &["let x = 1;"]);
        assert!(out[0].len() > 1);
        assert!(out[0].iter().all(|s| s.style.fg.is_some()));
    }

    #[test]
    fn unknown_theme_falls_back() {
        let h = SyntectHighlighter::with_theme("no-such-theme");
        assert!(h.background_color().is_some());
        assert!(SyntectHighlighter::theme_names().contains(&DEFAULT_THEME.to_string()));
    }
}
