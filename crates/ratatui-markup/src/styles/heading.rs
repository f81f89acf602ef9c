use super::HeadingConfiguration;
use super::HeadingStyle;
use crate::block::RenderedBlock;
use crate::block::Rule;
use crate::context::FontType;
use crate::context::RenderContext;

/// Heading text in the heading font for its level.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHeadingStyle;

impl HeadingStyle for DefaultHeadingStyle {
    fn make_body(
        &self,
        configuration: &HeadingConfiguration<'_>,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock {
        let font = ctx.font(FontType::Heading(configuration.level));
        RenderedBlock::Text(configuration.content(ctx).with_base_style(font))
    }
}

/// Underlines headings up to `up_to` with a full-width divider.
#[derive(Clone, Copy, Debug)]
pub struct DividerHeadingStyle {
    pub up_to: u8,
}

impl DividerHeadingStyle {
    pub fn new(up_to: u8) -> Self {
        Self { up_to }
    }
}

impl Default for DividerHeadingStyle {
    fn default() -> Self {
        Self::new(2)
    }
}

impl HeadingStyle for DividerHeadingStyle {
    fn make_body(
        &self,
        configuration: &HeadingConfiguration<'_>,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock {
        let text = DefaultHeadingStyle.make_body(configuration, ctx);
        if configuration.level > self.up_to {
            return text;
        }
        RenderedBlock::stack(
            vec![
                text,
                RenderedBlock::Rule(Rule {
                    glyph: '─',
                    style: ctx.theme.rule,
                    max_width: None,
                }),
            ],
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderOptions;
    use crate::markup::Markup;
    use crate::styles::MarkdownStyles;
    use ratatui_markup_core::theme::Theme;

    #[test]
    fn divider_applies_only_up_to_level() {
        let theme = Theme::default();
        let options = RenderOptions::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, &options, &styles);
        let doc = Markup::parse("# One\n\n### Three");
        let style = DividerHeadingStyle::new(2);

        let one = style.make_body(
            &HeadingConfiguration {
                level: 1,
                markup: &doc.children[0],
            },
            &ctx,
        );
        assert!(matches!(one, RenderedBlock::Stack(ref s) if s.children.len() == 2));

        let three = style.make_body(
            &HeadingConfiguration {
                level: 3,
                markup: &doc.children[1],
            },
            &ctx,
        );
        let RenderedBlock::Text(text) = three else {
            panic!("expected text");
        };
        assert_eq!(text.plain(), "Three");
        assert_eq!(text.runs()[0].style, theme.heading(3));
    }
}
