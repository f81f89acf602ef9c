//! Pluggable block styles.
//!
//! Each block kind has a strategy trait whose `make_body` turns a configuration (the node's
//! data plus ambient context) into a [`RenderedBlock`]. [`MarkdownStyles`] holds one shared
//! implementation per kind.
use crate::block::RenderedBlock;
use crate::context::RenderContext;
use crate::inline::InlineRenderer;
use crate::list::ListIndicatorConfiguration;
use crate::markup::Markup;
use crate::styled::StyledText;
use crate::table::TableConfiguration;
use std::sync::Arc;

mod block_quote;
mod code_block;
mod heading;
mod list_indicator;
mod table;
mod thematic_break;

pub use block_quote::DefaultBlockQuoteStyle;
pub use code_block::DefaultCodeBlockStyle;
pub use code_block::PlainCodeBlockStyle;
pub use heading::DefaultHeadingStyle;
pub use heading::DividerHeadingStyle;
pub use list_indicator::BulletIndicatorStyle;
pub use list_indicator::DecimalIndicatorStyle;
pub use table::BoxTableStyle;
pub use table::GlowTableStyle;
pub use thematic_break::BarThematicBreakStyle;
pub use thematic_break::DefaultThematicBreakStyle;

pub struct HeadingConfiguration<'a> {
    pub level: u8,
    pub markup: &'a Markup,
}

impl HeadingConfiguration<'_> {
    pub fn content(&self, ctx: &RenderContext<'_>) -> StyledText {
        InlineRenderer::new(ctx).render(&self.markup.children)
    }
}

pub struct CodeBlockConfiguration<'a> {
    pub language: Option<&'a str>,
    pub code: &'a str,
}

pub struct BlockQuoteConfiguration {
    /// The quote's children, already rendered.
    pub content: RenderedBlock,
}

pub trait HeadingStyle: Send + Sync {
    fn make_body(
        &self,
        configuration: &HeadingConfiguration<'_>,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock;
}

pub trait CodeBlockStyle: Send + Sync {
    fn make_body(
        &self,
        configuration: &CodeBlockConfiguration<'_>,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock;
}

pub trait BlockQuoteStyle: Send + Sync {
    fn make_body(
        &self,
        configuration: BlockQuoteConfiguration,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock;
}

pub trait TableStyle: Send + Sync {
    fn make_body(
        &self,
        configuration: &TableConfiguration<'_>,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock;
}

pub trait ThematicBreakStyle: Send + Sync {
    fn make_body(&self, ctx: &RenderContext<'_>) -> RenderedBlock;
}

pub trait OrderedListIndicatorStyle: Send + Sync {
    fn make_body(
        &self,
        configuration: &ListIndicatorConfiguration,
        ctx: &RenderContext<'_>,
    ) -> StyledText;
}

pub trait UnorderedListIndicatorStyle: Send + Sync {
    fn make_body(
        &self,
        configuration: &ListIndicatorConfiguration,
        ctx: &RenderContext<'_>,
    ) -> StyledText;
}

#[derive(Clone)]
pub struct MarkdownStyles {
    pub heading: Arc<dyn HeadingStyle>,
    pub code_block: Arc<dyn CodeBlockStyle>,
    pub block_quote: Arc<dyn BlockQuoteStyle>,
    pub table: Arc<dyn TableStyle>,
    pub thematic_break: Arc<dyn ThematicBreakStyle>,
    pub ordered_list_indicator: Arc<dyn OrderedListIndicatorStyle>,
    pub unordered_list_indicator: Arc<dyn UnorderedListIndicatorStyle>,
}

impl Default for MarkdownStyles {
    fn default() -> Self {
        Self {
            heading: Arc::new(DefaultHeadingStyle),
            code_block: Arc::new(DefaultCodeBlockStyle::default()),
            block_quote: Arc::new(DefaultBlockQuoteStyle::default()),
            table: Arc::new(GlowTableStyle),
            thematic_break: Arc::new(DefaultThematicBreakStyle),
            ordered_list_indicator: Arc::new(DecimalIndicatorStyle),
            unordered_list_indicator: Arc::new(BulletIndicatorStyle::default()),
        }
    }
}

impl MarkdownStyles {
    pub fn with_heading(mut self, style: impl HeadingStyle + 'static) -> Self {
        self.heading = Arc::new(style);
        self
    }

    pub fn with_code_block(mut self, style: impl CodeBlockStyle + 'static) -> Self {
        self.code_block = Arc::new(style);
        self
    }

    pub fn with_block_quote(mut self, style: impl BlockQuoteStyle + 'static) -> Self {
        self.block_quote = Arc::new(style);
        self
    }

    pub fn with_table(mut self, style: impl TableStyle + 'static) -> Self {
        self.table = Arc::new(style);
        self
    }

    pub fn with_thematic_break(mut self, style: impl ThematicBreakStyle + 'static) -> Self {
        self.thematic_break = Arc::new(style);
        self
    }

    pub fn with_ordered_list_indicator(
        mut self,
        style: impl OrderedListIndicatorStyle + 'static,
    ) -> Self {
        self.ordered_list_indicator = Arc::new(style);
        self
    }

    pub fn with_unordered_list_indicator(
        mut self,
        style: impl UnorderedListIndicatorStyle + 'static,
    ) -> Self {
        self.unordered_list_indicator = Arc::new(style);
        self
    }
}
