use super::TableStyle;
use crate::block::RenderedBlock;
use crate::block::TableBlock;
use crate::block::TableBorders;
use crate::block::TableCellBlock;
use crate::context::RenderContext;
use crate::table::TableCell;
use crate::table::TableConfiguration;

/// Column separators with a rule under the head.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlowTableStyle;

impl TableStyle for GlowTableStyle {
    fn make_body(
        &self,
        configuration: &TableConfiguration<'_>,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock {
        table_block(configuration, ctx, TableBorders::Glow)
    }
}

/// Fully framed table drawn with box-drawing characters.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxTableStyle;

impl TableStyle for BoxTableStyle {
    fn make_body(
        &self,
        configuration: &TableConfiguration<'_>,
        ctx: &RenderContext<'_>,
    ) -> RenderedBlock {
        table_block(configuration, ctx, TableBorders::Boxed)
    }
}

fn table_block(
    configuration: &TableConfiguration<'_>,
    ctx: &RenderContext<'_>,
    borders: TableBorders,
) -> RenderedBlock {
    let cells = |row: &[TableCell<'_>], header: bool| -> Vec<TableCellBlock> {
        row.iter()
            .map(|cell| {
                let content = cell.content(ctx);
                TableCellBlock {
                    content: if header { content.bold() } else { content },
                    alignment: cell.alignment(),
                }
            })
            .collect()
    };
    let head = if configuration.head.is_empty() {
        Vec::new()
    } else {
        vec![cells(configuration.head.as_slice(), true)]
    };
    let body = configuration
        .body
        .iter()
        .map(|row| cells(row.cells.as_slice(), false))
        .collect();
    RenderedBlock::Table(TableBlock {
        head,
        body,
        borders,
        border_style: ctx.theme.text_muted,
    })
}
