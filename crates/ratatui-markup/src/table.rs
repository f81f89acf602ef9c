use crate::context::RenderContext;
use crate::inline::InlineRenderer;
use crate::markup::ColumnAlignment;
use crate::markup::Markup;
use crate::markup::MarkupKind;
use crate::styled::StyledText;
use ratatui::layout::Alignment;

#[derive(Clone, Debug)]
pub struct TableCell<'a> {
    pub markup: &'a Markup,
    pub column_alignment: ColumnAlignment,
}

impl TableCell<'_> {
    pub fn content(&self, ctx: &RenderContext<'_>) -> StyledText {
        InlineRenderer::new(ctx).render(&self.markup.children)
    }

    pub fn alignment(&self) -> Alignment {
        match self.column_alignment {
            ColumnAlignment::Left => Alignment::Left,
            ColumnAlignment::Center => Alignment::Center,
            ColumnAlignment::Right => Alignment::Right,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TableRow<'a> {
    pub cells: Vec<TableCell<'a>>,
}

/// Read-only view over a table node, with every cell's alignment resolved.
#[derive(Clone, Debug)]
pub struct TableConfiguration<'a> {
    pub head: Vec<TableCell<'a>>,
    pub body: Vec<TableRow<'a>>,
}

impl<'a> TableConfiguration<'a> {
    /// Returns `None` when `table` is not a table node.
    pub fn new(table: &'a Markup) -> Option<Self> {
        let MarkupKind::Table { alignments } = &table.kind else {
            return None;
        };
        let mut head = Vec::new();
        let mut body = Vec::new();
        for child in &table.children {
            match child.kind {
                MarkupKind::TableHead => head = build_cells(child, alignments),
                MarkupKind::TableRow => body.push(TableRow {
                    cells: build_cells(child, alignments),
                }),
                _ => {}
            }
        }
        Some(Self { head, body })
    }

    /// Number of header cells.
    pub fn count(&self) -> usize {
        self.head.len()
    }

    /// Widest row, counting the head.
    pub fn column_count(&self) -> usize {
        self.body
            .iter()
            .map(|r| r.cells.len())
            .fold(self.head.len(), usize::max)
    }
}

fn build_cells<'a>(row: &'a Markup, alignments: &[Option<ColumnAlignment>]) -> Vec<TableCell<'a>> {
    row.children
        .iter()
        .filter(|c| c.kind == MarkupKind::TableCell)
        .enumerate()
        .map(|(column, markup)| TableCell {
            markup,
            column_alignment: resolve_alignment(alignments, column),
        })
        .collect()
}

/// Declared alignment for `column`, or `Center` when none was declared.
fn resolve_alignment(alignments: &[Option<ColumnAlignment>], column: usize) -> ColumnAlignment {
    alignments
        .get(column)
        .copied()
        .flatten()
        .unwrap_or(ColumnAlignment::Center)
}
