//! Flattens inline markup into a single [`StyledText`].
use crate::context::ImageMode;
use crate::context::RenderContext;
use crate::context::StaticImage;
use crate::error::ImageError;
use crate::error::ReinterpretError;
use crate::markup::FormatOptions;
use crate::markup::Markup;
use crate::markup::MarkupKind;
use crate::styled::Run;
use crate::styled::StyledText;
use ratatui::style::Style;
use url::Url;

pub struct InlineRenderer<'c, 'a> {
    ctx: &'c RenderContext<'a>,
    /// Set while rendering reparsed source; unknown kinds then become literal text.
    reinterpreting: bool,
}

impl<'c, 'a> InlineRenderer<'c, 'a> {
    pub fn new(ctx: &'c RenderContext<'a>) -> Self {
        Self {
            ctx,
            reinterpreting: false,
        }
    }

    /// Renders `nodes` in order and joins the results.
    pub fn render(&self, nodes: &[Markup]) -> StyledText {
        StyledText::concat(nodes.iter().filter_map(|n| self.render_node(n)))
    }

    /// Renders one node; `None` when it produces nothing.
    pub fn render_node(&self, node: &Markup) -> Option<StyledText> {
        let text = match &node.kind {
            MarkupKind::Text(text) => StyledText::raw(text.clone()),
            MarkupKind::SoftBreak => StyledText::raw(" "),
            MarkupKind::LineBreak => StyledText::raw("\n"),
            MarkupKind::InlineCode(code) => {
                StyledText::styled(code.clone(), self.ctx.inline_code_style().foreground)
                    .with_inline_code()
            }
            MarkupKind::Strong => self.render(&node.children).bold(),
            MarkupKind::Emphasis => self.render(&node.children).italic(),
            MarkupKind::Strikethrough => self.render(&node.children).strikethrough(),
            MarkupKind::Image { source, .. } => self.image(node, source.as_deref()),
            MarkupKind::Link {
                destination,
                autolink,
                ..
            } => self.link(node, destination.as_deref(), *autolink),
            _ => return self.fallback(node),
        };
        Some(text)
    }

    fn format_options(&self) -> FormatOptions {
        FormatOptions {
            condense_autolinks: self.ctx.options.condense_autolinks,
        }
    }

    fn link(&self, node: &Markup, destination: Option<&str>, autolink: bool) -> StyledText {
        let base = self.ctx.options.base_url.as_deref();
        let target = destination.and_then(|d| {
            if autolink {
                resolve_autolink(base, d)
            } else {
                resolve_url(base, d)
            }
        });
        let Some(url) = target else {
            return StyledText::raw(node.plain_text());
        };

        let content = if self.reinterpreting {
            if autolink && self.ctx.options.condense_autolinks {
                StyledText::raw(condensed(&url))
            } else {
                self.render(&node.children)
            }
        } else {
            let source = node.format(&self.format_options());
            reinterpret(&source, self.ctx).unwrap_or_else(|err| {
                log::debug!(target: "ratatui_markup::inline", "link kept as text: {err}");
                StyledText::raw(source)
            })
        };
        content.patch_style(self.ctx.theme.link).with_link(&url)
    }

    fn image(&self, node: &Markup, source: Option<&str>) -> StyledText {
        let alt = node.plain_text();
        match self.ctx.image_mode() {
            ImageMode::ReplaceWithText => StyledText::raw(alt),
            ImageMode::ReplaceWithImage(StaticImage::Glyph { text, style }) => {
                StyledText::styled(text.clone(), *style)
            }
            ImageMode::ReplaceWithImage(StaticImage::Pixels(image)) => {
                let mut out = StyledText::new();
                out.push(Run::image(image.clone()));
                out
            }
            ImageMode::Render => {
                let Some(cache) = self.ctx.images() else {
                    return StyledText::raw(alt);
                };
                let base = self.ctx.options.base_url.as_deref();
                let url = source.and_then(|s| resolve_url(base, s));
                let placeholders = &self.ctx.options.placeholders;
                let muted = self.ctx.theme.text_muted;
                match cache.image(url.as_ref().map(Url::as_str), self.ctx.image_scale_factor()) {
                    Ok(Some(image)) => {
                        let mut out = StyledText::new();
                        out.push(Run::image(image));
                        out
                    }
                    Ok(None) => self.placeholder(&placeholders.loading, muted, &alt),
                    Err(ImageError::NoUrl) => self.placeholder(&placeholders.missing, muted, &alt),
                    Err(ImageError::FetchFailed(_)) => {
                        self.placeholder(&placeholders.failed, self.ctx.theme.danger, &alt)
                    }
                }
            }
        }
    }

    fn placeholder(&self, glyph: &str, glyph_style: Style, alt: &str) -> StyledText {
        let mut out = StyledText::styled(glyph, glyph_style);
        if !alt.is_empty() {
            out.push(Run::text(format!(" {alt}"), self.ctx.theme.text_muted));
        }
        out
    }

    fn fallback(&self, node: &Markup) -> Option<StyledText> {
        let source = node.format(&self.format_options());
        if source.trim().is_empty() {
            return None;
        }
        if self.reinterpreting {
            return Some(StyledText::raw(source));
        }
        let text = reinterpret(&source, self.ctx).unwrap_or_else(|err| {
            log::debug!(target: "ratatui_markup::inline", "{} rendered verbatim: {err}", node.kind.name());
            StyledText::raw(source)
        });
        Some(text)
    }
}

/// Parses `source` again and renders it as inline text.
///
/// Fails when the source does not come back as a single paragraph.
pub fn reinterpret(source: &str, ctx: &RenderContext<'_>) -> Result<StyledText, ReinterpretError> {
    let doc = Markup::parse(source);
    match doc.children.as_slice() {
        [] => Ok(StyledText::new()),
        [para] if para.kind == MarkupKind::Paragraph => Ok(InlineRenderer {
            ctx,
            reinterpreting: true,
        }
        .render(&para.children)),
        [first, ..] => Err(ReinterpretError::NotInline {
            kind: first.kind.name(),
        }),
    }
}

/// Absolute URL for a link or image destination, joined onto `base` when relative.
pub fn resolve_url(base: Option<&str>, dest: &str) -> Option<Url> {
    let dest = dest.trim();
    if dest.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(dest) {
        return Some(url);
    }
    let base = Url::parse(base?.trim()).ok()?;
    base.join(dest).ok()
}

/// Like [`resolve_url`], but a bare `user@host` becomes a `mailto:` URL and is never joined onto
/// `base`.
pub fn resolve_autolink(base: Option<&str>, dest: &str) -> Option<Url> {
    let dest = dest.trim();
    if dest.contains('@') && !dest.contains(':') {
        return Url::parse(&format!("mailto:{dest}")).ok();
    }
    resolve_url(base, dest)
}

fn condensed(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    let path = url.path();
    let path = if host.is_empty() {
        path
    } else {
        path.trim_end_matches('/')
    };
    format!("{host}{path}")
}
