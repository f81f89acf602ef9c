use super::BlockQuoteConfiguration;
use super::BlockQuoteStyle;
use crate::block::Prefixed;
use crate::block::RenderedBlock;
use crate::context::RenderContext;
use crate::styled::StyledText;

/// Muted content behind a left bar.
#[derive(Clone, Debug)]
pub struct DefaultBlockQuoteStyle {
    pub prefix: String,
}

impl Default for DefaultBlockQuoteStyle {
    fn default() -> Self {
        Self {
            prefix: "│ ".to_string(),
        }
    }
}

impl BlockQuoteStyle for DefaultBlockQuoteStyle {
    fn make_body(
        &self,
        configuration: BlockQuoteConfiguration,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock {
        let bar = StyledText::styled(self.prefix.clone(), ctx.theme.quote);
        RenderedBlock::Prefixed(Prefixed {
            first: bar.clone(),
            rest: bar,
            body_style: ctx.theme.quote,
            body: Box::new(configuration.content),
        })
    }
}
