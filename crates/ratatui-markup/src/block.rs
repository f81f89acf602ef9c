//! Rendered block tree: the output of the dispatcher and input to layout.
use crate::styled::StyledText;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::text::Span;

#[derive(Clone, Debug, PartialEq)]
pub enum RenderedBlock {
    Text(StyledText),
    Stack(Stack),
    List(ListBlock),
    Table(TableBlock),
    Code(CodeBlock),
    Rule(Rule),
    /// Body drawn behind a per-line prefix (block quotes, footnotes).
    Prefixed(Prefixed),
    Padded(Padded),
}

impl RenderedBlock {
    pub fn stack(children: Vec<RenderedBlock>, spacing: u16) -> Self {
        RenderedBlock::Stack(Stack { children, spacing })
    }

    /// Adds blank lines above and below. Zero padding returns `self` unchanged.
    pub fn padded(self, top: u16, bottom: u16) -> Self {
        if top == 0 && bottom == 0 {
            return self;
        }
        RenderedBlock::Padded(Padded {
            top,
            bottom,
            body: Box::new(self),
        })
    }

    /// Plain text of the whole tree, one block per line group. Used by tests and copy support.
    pub fn plain(&self) -> String {
        match self {
            RenderedBlock::Text(text) => text.plain(),
            RenderedBlock::Stack(stack) => stack
                .children
                .iter()
                .map(RenderedBlock::plain)
                .collect::<Vec<_>>()
                .join("\n"),
            RenderedBlock::List(list) => list
                .rows
                .iter()
                .map(|row| format!("{} {}", row.indicator.plain(), row.content.plain()))
                .collect::<Vec<_>>()
                .join("\n"),
            RenderedBlock::Table(table) => table
                .head
                .iter()
                .chain(table.body.iter())
                .map(|row| {
                    row.iter()
                        .map(|c| c.content.plain())
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            RenderedBlock::Code(code) => code
                .lines
                .iter()
                .map(|l| l.iter().map(|s| s.content.as_ref()).collect::<String>())
                .collect::<Vec<_>>()
                .join("\n"),
            RenderedBlock::Rule(rule) => rule.glyph.to_string(),
            RenderedBlock::Prefixed(p) => p.body.plain(),
            RenderedBlock::Padded(p) => p.body.plain(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stack {
    pub children: Vec<RenderedBlock>,
    pub spacing: u16,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListRow {
    pub indicator: StyledText,
    pub content: RenderedBlock,
}

/// Two-column grid: a right-aligned indicator column and the item content.
#[derive(Clone, Debug, PartialEq)]
pub struct ListBlock {
    pub rows: Vec<ListRow>,
    /// Blank lines between items.
    pub item_spacing: u16,
    /// Cells between the indicator column and the content.
    pub gap: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableBorders {
    /// Column separators and a rule under the head only.
    #[default]
    Glow,
    /// Full box-drawing frame.
    Boxed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableCellBlock {
    pub content: StyledText,
    pub alignment: Alignment,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableBlock {
    pub head: Vec<Vec<TableCellBlock>>,
    pub body: Vec<Vec<TableCellBlock>>,
    pub borders: TableBorders,
    pub border_style: Style,
}

/// Pre-highlighted code lines. Layout clips them instead of wrapping.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub lines: Vec<Vec<Span<'static>>>,
    pub indent: u16,
    pub style: Style,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub glyph: char,
    pub style: Style,
    /// Caps the rule length; `None` spans the full width.
    pub max_width: Option<u16>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Prefixed {
    pub first: StyledText,
    pub rest: StyledText,
    /// Patched beneath the body's own styles.
    pub body_style: Style,
    pub body: Box<RenderedBlock>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Padded {
    pub top: u16,
    pub bottom: u16,
    pub body: Box<RenderedBlock>,
}
