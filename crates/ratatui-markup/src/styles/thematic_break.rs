use super::ThematicBreakStyle;
use crate::block::RenderedBlock;
use crate::block::Rule;
use crate::context::RenderContext;

/// Thin full-width rule.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultThematicBreakStyle;

impl ThematicBreakStyle for DefaultThematicBreakStyle {
    fn make_body(&self, ctx: &RenderContext<'_>) -> RenderedBlock {
        RenderedBlock::Rule(Rule {
            glyph: '─',
            style: ctx.theme.rule,
            max_width: None,
        })
    }
}

/// Heavy bar in the muted text color.
#[derive(Clone, Copy, Debug, Default)]
pub struct BarThematicBreakStyle;

impl ThematicBreakStyle for BarThematicBreakStyle {
    fn make_body(&self, ctx: &RenderContext<'_>) -> RenderedBlock {
        RenderedBlock::Rule(Rule {
            glyph: '━',
            style: ctx.theme.text_muted,
            max_width: None,
        })
    }
}
