use super::OrderedListIndicatorStyle;
use super::UnorderedListIndicatorStyle;
use crate::context::RenderContext;
use crate::list::ListIndicatorConfiguration;
use crate::list_level::ListLevel;
use crate::styled::StyledText;

/// `1.`, `2.`, ... counted from the list's start index.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecimalIndicatorStyle;

impl OrderedListIndicatorStyle for DecimalIndicatorStyle {
    fn make_body(
        &self,
        configuration: &ListIndicatorConfiguration,
        ctx: &RenderContext<'_>,
    ) -> StyledText {
        StyledText::styled(
            format!("{}.", configuration.display_index()),
            ctx.theme.text_muted,
        )
    }
}

/// One bullet glyph per nesting level.
#[derive(Clone, Copy, Debug)]
pub struct BulletIndicatorStyle {
    pub root: char,
    pub indented: char,
    pub further: char,
}

impl Default for BulletIndicatorStyle {
    fn default() -> Self {
        Self {
            root: '•',
            indented: '◦',
            further: '▪',
        }
    }
}

impl UnorderedListIndicatorStyle for BulletIndicatorStyle {
    fn make_body(
        &self,
        configuration: &ListIndicatorConfiguration,
        ctx: &RenderContext<'_>,
    ) -> StyledText {
        let glyph = match configuration.level {
            ListLevel::Root => self.root,
            ListLevel::Indented => self.indented,
            ListLevel::FurtherIndented(_) => self.further,
        };
        StyledText::styled(glyph.to_string(), ctx.theme.text_muted)
    }
}
