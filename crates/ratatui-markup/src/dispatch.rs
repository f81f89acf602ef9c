//! Maps markup nodes to rendered blocks.
use crate::block::RenderedBlock;
use crate::context::FontType;
use crate::context::RenderContext;
use crate::inline::InlineRenderer;
use crate::inline::reinterpret;
use crate::list;
use crate::markup::FormatOptions;
use crate::markup::Markup;
use crate::markup::MarkupKind;
use crate::styled::StyledText;
use crate::styles::BlockQuoteConfiguration;
use crate::styles::CodeBlockConfiguration;
use crate::styles::HeadingConfiguration;
use crate::table::TableConfiguration;

/// Renders a whole document, separating top-level blocks by `block_spacing`.
pub fn render_document(document: &Markup, ctx: &RenderContext<'_>) -> RenderedBlock {
    render_children(&document.children, ctx, ctx.options.block_spacing)
}

/// Renders `children` in order. Consecutive inline children share one text block.
pub fn render_children(children: &[Markup], ctx: &RenderContext<'_>, spacing: u16) -> RenderedBlock {
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < children.len() {
        if children[i].is_inline() {
            let start = i;
            while i < children.len() && children[i].is_inline() {
                i += 1;
            }
            blocks.push(inline_block(&children[start..i], ctx));
            continue;
        }
        if let Some(block) = render_block(&children[i], ctx) {
            blocks.push(block);
        }
        i += 1;
    }
    if blocks.len() == 1 {
        if let Some(block) = blocks.pop() {
            return block;
        }
    }
    RenderedBlock::stack(blocks, spacing)
}

/// Inline nodes as one text block in the body font.
pub fn inline_block(nodes: &[Markup], ctx: &RenderContext<'_>) -> RenderedBlock {
    let text = InlineRenderer::new(ctx).render(nodes);
    RenderedBlock::Text(text.with_base_style(ctx.font(FontType::Body)))
}

/// Renders one node. `None` means the node produced nothing.
pub fn render_block(markup: &Markup, ctx: &RenderContext<'_>) -> Option<RenderedBlock> {
    let block = match &markup.kind {
        MarkupKind::Document | MarkupKind::ListItem { .. } => {
            render_children(&markup.children, ctx, ctx.options.block_spacing)
        }
        MarkupKind::Heading { level } => ctx.styles.heading.make_body(
            &HeadingConfiguration {
                level: *level,
                markup,
            },
            ctx,
        ),
        MarkupKind::Paragraph => inline_block(&markup.children, ctx),
        MarkupKind::CodeBlock { language, code } => ctx.styles.code_block.make_body(
            &CodeBlockConfiguration {
                language: language.as_deref(),
                code,
            },
            ctx,
        ),
        MarkupKind::BlockQuote => {
            let content = render_children(&markup.children, ctx, ctx.options.block_spacing);
            ctx.styles
                .block_quote
                .make_body(BlockQuoteConfiguration { content }, ctx)
        }
        MarkupKind::OrderedList { .. } | MarkupKind::UnorderedList => list::render_list(markup, ctx),
        MarkupKind::Table { .. } => {
            let configuration = TableConfiguration::new(markup)?;
            ctx.styles.table.make_body(&configuration, ctx)
        }
        MarkupKind::ThematicBreak => ctx.styles.thematic_break.make_body(ctx),
        _ if markup.is_inline() => {
            let text = InlineRenderer::new(ctx).render_node(markup)?;
            RenderedBlock::Text(text.with_base_style(ctx.font(FontType::Body)))
        }
        _ => return fallback(markup, ctx),
    };
    Some(block)
}

/// Blocks without a dedicated style: reparse their source as inline text, else show it verbatim.
fn fallback(markup: &Markup, ctx: &RenderContext<'_>) -> Option<RenderedBlock> {
    let options = FormatOptions {
        condense_autolinks: ctx.options.condense_autolinks,
    };
    let source = markup.format(&options);
    if source.trim().is_empty() {
        return None;
    }
    let text = reinterpret(&source, ctx).unwrap_or_else(|err| {
        log::debug!(target: "ratatui_markup::inline", "{} rendered verbatim: {err}", markup.kind.name());
        StyledText::raw(source)
    });
    Some(RenderedBlock::Text(
        text.with_base_style(ctx.font(FontType::Body)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderOptions;
    use crate::markup::Checkbox;
    use crate::markup::ColumnAlignment;
    use crate::styles::MarkdownStyles;
    use ratatui_markup_core::theme::Theme;

    fn every_kind() -> Vec<MarkupKind> {
        vec![
            MarkupKind::Document,
            MarkupKind::Heading { level: 2 },
            MarkupKind::Paragraph,
            MarkupKind::Text("t".into()),
            MarkupKind::Strong,
            MarkupKind::Emphasis,
            MarkupKind::Strikethrough,
            MarkupKind::InlineCode("c".into()),
            MarkupKind::SoftBreak,
            MarkupKind::LineBreak,
            MarkupKind::CodeBlock {
                language: None,
                code: "x".into(),
            },
            MarkupKind::BlockQuote,
            MarkupKind::Image {
                source: None,
                title: None,
            },
            MarkupKind::Link {
                destination: Some("https://a.example".into()),
                title: None,
                autolink: false,
            },
            MarkupKind::OrderedList { start: 1 },
            MarkupKind::UnorderedList,
            MarkupKind::ListItem {
                checkbox: Some(Checkbox::Checked),
            },
            MarkupKind::Table {
                alignments: vec![Some(ColumnAlignment::Right)],
            },
            MarkupKind::TableHead,
            MarkupKind::TableRow,
            MarkupKind::TableCell,
            MarkupKind::ThematicBreak,
            MarkupKind::HtmlBlock("<div>\n".into()),
            MarkupKind::InlineHtml("<b>".into()),
            MarkupKind::FootnoteReference("1".into()),
            MarkupKind::FootnoteDefinition("1".into()),
            MarkupKind::InlineMath("x".into()),
            MarkupKind::DisplayMath("y".into()),
        ]
    }

    #[test]
    fn every_kind_renders_or_yields_nothing() {
        let theme = Theme::default();
        let options = RenderOptions::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, &options, &styles);
        for kind in every_kind() {
            let bare = Markup::leaf(kind.clone());
            let _ = render_block(&bare, &ctx);
            let with_child = Markup::new(kind, vec![Markup::text("child")]);
            let _ = render_block(&with_child, &ctx);
        }
    }

    #[test]
    fn empty_fallback_source_yields_nothing() {
        let theme = Theme::default();
        let options = RenderOptions::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, &options, &styles);
        let empty_html = Markup::leaf(MarkupKind::HtmlBlock("  \n".into()));
        assert!(render_block(&empty_html, &ctx).is_none());
        let html = Markup::leaf(MarkupKind::HtmlBlock("<div>hi</div>\n".into()));
        assert_eq!(
            render_block(&html, &ctx).map(|b| b.plain()),
            Some("<div>hi</div>".to_string())
        );
    }

    #[test]
    fn rendering_is_idempotent() {
        let theme = Theme::default();
        let options = RenderOptions::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, &options, &styles);
        let doc = Markup::parse(
            "# T\n\npara *x* [l](https://a.example)\n\n1. a\n2. b\n\n| a |\n|---|\n| 1 |\n\n> q\n\n---\n",
        );
        assert_eq!(render_document(&doc, &ctx), render_document(&doc, &ctx));
    }

    #[test]
    fn inline_children_are_grouped() {
        let theme = Theme::default();
        let options = RenderOptions::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, &options, &styles);
        let children = vec![
            Markup::text("a"),
            Markup::new(MarkupKind::Strong, vec![Markup::text("b")]),
            Markup::leaf(MarkupKind::ThematicBreak),
            Markup::text("c"),
        ];
        let RenderedBlock::Stack(stack) = render_children(&children, &ctx, 0) else {
            panic!("expected stack");
        };
        assert_eq!(stack.children.len(), 3);
        assert_eq!(stack.children[0].plain(), "ab");
    }

    #[test]
    fn footnote_definitions_render_as_source() {
        let theme = Theme::default();
        let options = RenderOptions::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, &options, &styles);
        let doc = Markup::parse("x[^1]\n\n[^1]: note\n");
        let out = render_document(&doc, &ctx).plain();
        assert!(out.contains("note"), "{out}");
    }
}
