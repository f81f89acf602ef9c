use crate::block::ListBlock;
use crate::block::ListRow;
use crate::block::RenderedBlock;
use crate::context::RenderContext;
use crate::dispatch;
use crate::list_level::ListLevel;
use crate::markup::Checkbox;
use crate::markup::Markup;
use crate::markup::MarkupKind;
use crate::styled::Run;
use crate::styled::StyledText;

/// Everything an indicator style needs to draw one item's marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListIndicatorConfiguration {
    /// Zero-based position of the item in its list.
    pub index: usize,
    pub start_index: u64,
    pub level: ListLevel,
    pub checked: Option<Checkbox>,
}

impl ListIndicatorConfiguration {
    pub fn display_index(&self) -> u64 {
        self.start_index.saturating_add(self.index as u64)
    }
}

/// Renders an ordered or unordered list node at the context's list level.
pub fn render_list(list: &Markup, ctx: &RenderContext<'_>) -> RenderedBlock {
    let (ordered, start_index) = match list.kind {
        MarkupKind::OrderedList { start } => (true, start),
        _ => (false, 0),
    };
    let level = ctx.list_level();
    let nested = ctx.with_list_level(level.next());
    let loose = list.children.iter().any(|item| {
        item.children
            .iter()
            .any(|c| c.kind == MarkupKind::Paragraph)
    });
    let spacing = if loose {
        ctx.options.block_spacing
    } else {
        0
    };

    let rows = list
        .children
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let checked = match item.kind {
                MarkupKind::ListItem { checkbox } => checkbox,
                _ => None,
            };
            let configuration = ListIndicatorConfiguration {
                index,
                start_index,
                level,
                checked,
            };
            ListRow {
                indicator: indicator(&configuration, ordered, ctx),
                content: item_content(item, &nested, spacing),
            }
        })
        .collect();

    let padding = if level.is_root() {
        ctx.options.root_list_padding
    } else {
        0
    };
    RenderedBlock::List(ListBlock {
        rows,
        item_spacing: spacing,
        gap: 1,
    })
    .padded(padding, padding)
}

fn indicator(
    configuration: &ListIndicatorConfiguration,
    ordered: bool,
    ctx: &RenderContext<'_>,
) -> StyledText {
    let mut text = if ordered {
        ctx.styles
            .ordered_list_indicator
            .make_body(configuration, ctx)
    } else {
        ctx.styles
            .unordered_list_indicator
            .make_body(configuration, ctx)
    };
    match configuration.checked {
        Some(Checkbox::Checked) => text.push(Run::text(" ☑", ctx.theme.accent)),
        Some(Checkbox::Unchecked) => text.push(Run::text(" ☐", ctx.theme.text_muted)),
        None => {}
    }
    text
}

fn item_content(item: &Markup, ctx: &RenderContext<'_>, spacing: u16) -> RenderedBlock {
    if item.is_inline_container() {
        return dispatch::inline_block(&item.children, ctx);
    }
    dispatch::render_children(&item.children, ctx, spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderOptions;
    use crate::styles::MarkdownStyles;
    use crate::styles::UnorderedListIndicatorStyle;
    use ratatui_markup_core::theme::Theme;

    fn render(src: &str, options: &RenderOptions) -> ListBlock {
        let theme = Theme::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, options, &styles);
        let doc = Markup::parse(src);
        match render_list(&doc.children[0], &ctx) {
            RenderedBlock::Padded(p) => match *p.body {
                RenderedBlock::List(list) => list,
                _ => panic!("expected list"),
            },
            RenderedBlock::List(list) => list,
            _ => panic!("expected list"),
        }
    }

    fn indicators(list: &ListBlock) -> Vec<String> {
        list.rows.iter().map(|r| r.indicator.plain()).collect()
    }

    #[test]
    fn ordered_items_count_from_start_index() {
        let list = render("4. a\n1. b\n9. c\n", &RenderOptions::default());
        assert_eq!(indicators(&list), vec!["4.", "5.", "6."]);
        assert_eq!(list.rows[2].content.plain(), "c");
    }

    #[test]
    fn nested_lists_use_the_next_level() {
        let list = render("- a\n  - b\n    - c\n", &RenderOptions::default());
        assert_eq!(indicators(&list), vec!["•"]);
        let RenderedBlock::Stack(stack) = &list.rows[0].content else {
            panic!("expected stack");
        };
        let RenderedBlock::List(inner) = &stack.children[1] else {
            panic!("expected nested list");
        };
        assert_eq!(indicators(inner), vec!["◦"]);
        let RenderedBlock::Stack(inner_stack) = &inner.rows[0].content else {
            panic!("expected stack");
        };
        let RenderedBlock::List(innermost) = &inner_stack.children[1] else {
            panic!("expected nested list");
        };
        assert_eq!(indicators(innermost), vec!["▪"]);
    }

    #[test]
    fn task_items_show_checkboxes() {
        let list = render("- [x] done\n- [ ] todo\n", &RenderOptions::default());
        assert_eq!(indicators(&list), vec!["• ☑", "• ☐"]);
    }

    #[test]
    fn only_root_lists_are_padded() {
        let options = RenderOptions::default();
        let theme = Theme::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, &options, &styles);
        let doc = Markup::parse("- a\n");
        assert!(matches!(
            render_list(&doc.children[0], &ctx),
            RenderedBlock::Padded(_)
        ));
        let nested = ctx.with_list_level(ListLevel::Indented);
        assert!(matches!(
            render_list(&doc.children[0], &nested),
            RenderedBlock::List(_)
        ));
    }

    struct EchoIndex;

    impl UnorderedListIndicatorStyle for EchoIndex {
        fn make_body(
            &self,
            configuration: &ListIndicatorConfiguration,
            _ctx: &RenderContext<'_>,
        ) -> StyledText {
            assert_eq!(configuration.display_index(), configuration.index as u64);
            StyledText::raw(format!(
                "{}/{}",
                configuration.start_index,
                configuration.display_index()
            ))
        }
    }

    #[test]
    fn unordered_items_count_from_zero() {
        let theme = Theme::default();
        let options = RenderOptions::default();
        let styles = MarkdownStyles::default().with_unordered_list_indicator(EchoIndex);
        let ctx = RenderContext::new(&theme, &options, &styles);
        let doc = Markup::parse("- a\n- b\n");
        let RenderedBlock::Padded(p) = render_list(&doc.children[0], &ctx) else {
            panic!("expected padded list");
        };
        let RenderedBlock::List(list) = *p.body else {
            panic!("expected list");
        };
        assert_eq!(indicators(&list), vec!["0/0", "0/1"]);
    }

    #[test]
    fn display_index_saturates() {
        let c = ListIndicatorConfiguration {
            index: 3,
            start_index: u64::MAX,
            level: ListLevel::Root,
            checked: None,
        };
        assert_eq!(c.display_index(), u64::MAX);
    }
}
