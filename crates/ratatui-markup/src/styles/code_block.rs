use super::CodeBlockConfiguration;
use super::CodeBlockStyle;
use crate::block::CodeBlock;
use crate::block::RenderedBlock;
use crate::context::FontType;
use crate::context::RenderContext;
use ratatui::style::Style;
use ratatui::text::Span;

/// Indented code, highlighted through `RenderOptions::highlighter` when one is set.
#[derive(Clone, Copy, Debug)]
pub struct DefaultCodeBlockStyle {
    pub indent: u16,
}

impl Default for DefaultCodeBlockStyle {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl CodeBlockStyle for DefaultCodeBlockStyle {
    fn make_body(
        &self,
        configuration: &CodeBlockConfiguration<'_>,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock {
        let style = ctx.font(FontType::Code);
        let lines = code_lines(configuration.code);
        let highlighted = match ctx.options.highlighter.as_ref() {
            Some(h) if lines.len() <= ctx.options.max_highlight_lines => {
                let out = h.highlight_lines(configuration.language, &lines);
                if out.len() == lines.len() {
                    Some(out)
                } else {
                    log::debug!(
                        target: "ratatui_markup::code",
                        "highlighter returned {} lines for {}",
                        out.len(),
                        lines.len()
                    );
                    None
                }
            }
            _ => None,
        };
        let lines = match highlighted {
            Some(lines) => lines
                .into_iter()
                .map(|spans| {
                    spans
                        .into_iter()
                        .map(|s| Span::styled(s.content, style.patch(s.style)))
                        .collect()
                })
                .collect(),
            None => plain_lines(&lines, style),
        };
        RenderedBlock::Code(CodeBlock {
            language: configuration.language.map(str::to_string),
            lines,
            indent: self.indent,
            style,
        })
    }
}

/// Unhighlighted, unindented code.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainCodeBlockStyle;

impl CodeBlockStyle for PlainCodeBlockStyle {
    fn make_body(
        &self,
        configuration: &CodeBlockConfiguration<'_>,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock {
        let style = ctx.font(FontType::Code);
        RenderedBlock::Code(CodeBlock {
            language: configuration.language.map(str::to_string),
            lines: plain_lines(&code_lines(configuration.code), style),
            indent: 0,
            style,
        })
    }
}

fn code_lines(code: &str) -> Vec<&str> {
    let code = code.strip_suffix('\n').unwrap_or(code);
    code.split('\n').collect()
}

fn plain_lines(lines: &[&str], style: Style) -> Vec<Vec<Span<'static>>> {
    lines
        .iter()
        .map(|l| vec![Span::styled((*l).to_string(), style)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderOptions;
    use crate::styles::MarkdownStyles;
    use ratatui::style::Color;
    use ratatui_markup_core::text::CodeHighlighter;
    use ratatui_markup_core::theme::Theme;
    use std::sync::Arc;

    struct Upper;

    impl CodeHighlighter for Upper {
        fn highlight_lines(
            &self,
            _language: Option<&str>,
            lines: &[&str],
        ) -> Vec<Vec<Span<'static>>> {
            lines
                .iter()
                .map(|l| vec![Span::styled(l.to_uppercase(), Style::default().fg(Color::Red))])
                .collect()
        }
    }

    fn render(options: &RenderOptions, code: &str) -> CodeBlock {
        let theme = Theme::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, options, &styles);
        let body = DefaultCodeBlockStyle::default().make_body(
            &CodeBlockConfiguration {
                language: Some("rust"),
                code,
            },
            &ctx,
        );
        let RenderedBlock::Code(code) = body else {
            panic!("expected code block");
        };
        code
    }

    #[test]
    fn drops_trailing_newline_only() {
        let code = render(&RenderOptions::default(), "a\n\nb\n");
        assert_eq!(code.lines.len(), 3);
        assert_eq!(code.language.as_deref(), Some("rust"));
    }

    #[test]
    fn uses_highlighter_within_limit() {
        let options = RenderOptions {
            highlighter: Some(Arc::new(Upper)),
            ..RenderOptions::default()
        };
        let code = render(&options, "let x;\n");
        assert_eq!(code.lines[0][0].content, "LET X;");
        assert_eq!(code.lines[0][0].style.fg, Some(Color::Red));

        let options = RenderOptions {
            max_highlight_lines: 1,
            ..options
        };
        let code = render(&options, "a\nb\n");
        assert_eq!(code.lines[0][0].content, "a");
    }
}
