//! Turns a [`RenderedBlock`] tree into terminal lines of positioned runs.
use crate::block::CodeBlock;
use crate::block::ListBlock;
use crate::block::RenderedBlock;
use crate::block::TableBlock;
use crate::block::TableBorders;
use crate::block::TableCellBlock;
use crate::context::RenderContext;
use crate::image::ScaledImage;
use crate::styled::RunAttributes;
use crate::styled::RunContent;
use crate::styled::StyledText;
use ratatui::layout::Alignment;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui_markup_core::render::display_width;
use std::sync::Arc;
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Debug, PartialEq)]
pub enum PositionedContent {
    Text(Span<'static>),
    /// One cell per entry: top and bottom pixel of a half-block.
    Pixels(Vec<[Color; 2]>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PositionedRun {
    /// Column offset from the start of the line.
    pub x: u16,
    pub width: u16,
    pub content: PositionedContent,
    pub attributes: RunAttributes,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaidOutLine {
    pub runs: Vec<PositionedRun>,
}

impl LaidOutLine {
    pub fn width(&self) -> u16 {
        self.runs
            .last()
            .map_or(0, |r| r.x.saturating_add(r.width))
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| match &r.content {
            PositionedContent::Text(span) => span.content.trim().is_empty(),
            PositionedContent::Pixels(_) => false,
        })
    }

    /// Text of the line with gaps filled by spaces; pixel cells read as `▀`.
    pub fn plain(&self) -> String {
        let mut out = String::new();
        let mut col = 0u16;
        for run in &self.runs {
            while col < run.x {
                out.push(' ');
                col += 1;
            }
            match &run.content {
                PositionedContent::Text(span) => out.push_str(&span.content),
                PositionedContent::Pixels(pixels) => {
                    out.extend(std::iter::repeat_n('▀', pixels.len()));
                }
            }
            col = run.x.saturating_add(run.width);
        }
        out
    }

    /// The line as plain ratatui spans, without the inline code background.
    pub fn to_line(&self) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut col = 0u16;
        for run in &self.runs {
            if run.x > col {
                spans.push(Span::raw(" ".repeat(usize::from(run.x - col))));
            }
            match &run.content {
                PositionedContent::Text(span) => spans.push(span.clone()),
                PositionedContent::Pixels(pixels) => {
                    for [top, bottom] in pixels {
                        spans.push(Span::styled("▀", Style::default().fg(*top).bg(*bottom)));
                    }
                }
            }
            col = run.x.saturating_add(run.width);
        }
        Line::from(spans)
    }

    fn push_text(&mut self, text: &str, style: Style, attributes: &RunAttributes) {
        if text.is_empty() {
            return;
        }
        let w = display_width(text) as u16;
        if let Some(last) = self.runs.last_mut() {
            if last.attributes == *attributes {
                if let PositionedContent::Text(span) = &mut last.content {
                    if span.style == style {
                        span.content.to_mut().push_str(text);
                        last.width = last.width.saturating_add(w);
                        return;
                    }
                }
            }
        }
        let x = self.width();
        self.runs.push(PositionedRun {
            x,
            width: w,
            content: PositionedContent::Text(Span::styled(text.to_string(), style)),
            attributes: attributes.clone(),
        });
    }

    fn push_spaces(&mut self, n: u16, style: Style) {
        if n > 0 {
            self.push_text(&" ".repeat(usize::from(n)), style, &RunAttributes::default());
        }
    }

    fn push_styled(&mut self, text: &StyledText) {
        for run in text.runs() {
            if let RunContent::Text(s) = &run.content {
                self.push_text(s, run.style, &run.attributes);
            }
        }
    }

    fn append(&mut self, other: LaidOutLine) {
        let dx = self.width();
        for mut run in other.runs {
            run.x = run.x.saturating_add(dx);
            self.runs.push(run);
        }
    }

    fn with_base_style(mut self, base: Style) -> Self {
        for run in &mut self.runs {
            if let PositionedContent::Text(span) = &mut run.content {
                span.style = base.patch(span.style);
            }
        }
        self
    }

    fn trim_end(&mut self) {
        while let Some(last) = self.runs.last_mut() {
            if last.attributes.inline_code {
                return;
            }
            let PositionedContent::Text(span) = &mut last.content else {
                return;
            };
            let trimmed = span.content.trim_end();
            if trimmed.is_empty() {
                self.runs.pop();
                continue;
            }
            if trimmed.len() != span.content.len() {
                let trimmed = trimmed.to_string();
                last.width = display_width(&trimmed) as u16;
                span.content = trimmed.into();
            }
            return;
        }
    }
}

/// Lays `block` out for `width` columns.
pub fn layout_block(block: &RenderedBlock, width: u16, ctx: &RenderContext<'_>) -> Vec<LaidOutLine> {
    layout(block, width, ctx.options.image_scale.scaled_to_fit)
}

fn layout(block: &RenderedBlock, width: u16, fit: bool) -> Vec<LaidOutLine> {
    if width == 0 {
        return Vec::new();
    }
    match block {
        RenderedBlock::Text(text) => wrap_text(text, width, fit),
        RenderedBlock::Stack(stack) => {
            let mut out = Vec::new();
            let mut first = true;
            for child in &stack.children {
                let lines = layout(child, width, fit);
                if lines.is_empty() {
                    continue;
                }
                if !first {
                    push_blanks(&mut out, stack.spacing);
                }
                first = false;
                out.extend(lines);
            }
            out
        }
        RenderedBlock::List(list) => layout_list(list, width, fit),
        RenderedBlock::Table(table) => layout_table(table, width, fit),
        RenderedBlock::Code(code) => layout_code(code, width),
        RenderedBlock::Rule(rule) => {
            let n = rule.max_width.map_or(width, |m| m.min(width));
            let mut line = LaidOutLine::default();
            let glyphs: String = std::iter::repeat_n(rule.glyph, usize::from(n)).collect();
            line.push_text(&glyphs, rule.style, &RunAttributes::default());
            vec![line]
        }
        RenderedBlock::Prefixed(p) => {
            let prefix_w = p.first.width().max(p.rest.width()) as u16;
            let body = layout(&p.body, width.saturating_sub(prefix_w).max(1), fit);
            body.into_iter()
                .enumerate()
                .map(|(i, line)| {
                    let prefix = if i == 0 { &p.first } else { &p.rest };
                    let mut out = LaidOutLine::default();
                    out.push_styled(prefix);
                    out.push_spaces(prefix_w.saturating_sub(out.width()), Style::default());
                    out.append(line.with_base_style(p.body_style));
                    out
                })
                .collect()
        }
        RenderedBlock::Padded(p) => {
            let mut out = Vec::new();
            push_blanks(&mut out, p.top);
            out.extend(layout(&p.body, width, fit));
            push_blanks(&mut out, p.bottom);
            out
        }
    }
}

fn push_blanks(out: &mut Vec<LaidOutLine>, n: u16) {
    for _ in 0..n {
        out.push(LaidOutLine::default());
    }
}

fn layout_list(list: &ListBlock, width: u16, fit: bool) -> Vec<LaidOutLine> {
    let indicator_w = list
        .rows
        .iter()
        .map(|r| r.indicator.width())
        .max()
        .unwrap_or(0) as u16;
    let lead = indicator_w.saturating_add(list.gap);
    let content_w = width.saturating_sub(lead).max(1);

    let mut out = Vec::new();
    for (i, row) in list.rows.iter().enumerate() {
        if i > 0 {
            push_blanks(&mut out, list.item_spacing);
        }
        let mut lines = layout(&row.content, content_w, fit);
        if lines.is_empty() {
            lines.push(LaidOutLine::default());
        }
        for (li, line) in lines.into_iter().enumerate() {
            let mut composed = LaidOutLine::default();
            if li == 0 {
                let w = row.indicator.width() as u16;
                composed.push_spaces(indicator_w.saturating_sub(w), Style::default());
                composed.push_styled(&row.indicator);
                composed.push_spaces(list.gap, Style::default());
            } else if line.runs.is_empty() {
                out.push(line);
                continue;
            } else {
                composed.push_spaces(lead, Style::default());
            }
            composed.append(line);
            out.push(composed);
        }
    }
    out
}

fn layout_code(code: &CodeBlock, width: u16) -> Vec<LaidOutLine> {
    let indent = code.indent.min(width.saturating_sub(1));
    code.lines
        .iter()
        .map(|spans| {
            let mut line = LaidOutLine::default();
            if spans.iter().all(|s| s.content.is_empty()) {
                return line;
            }
            line.push_spaces(indent, Style::default());
            let mut room = usize::from(width - indent);
            for span in spans {
                if room == 0 {
                    break;
                }
                let expanded = span.content.replace('\t', "    ");
                let (head, _) = split_to_width(&expanded, room);
                room = room.saturating_sub(display_width(&head));
                line.push_text(&head, span.style, &RunAttributes::default());
            }
            line
        })
        .collect()
}

#[derive(Clone, Copy, Debug)]
enum BorderLine {
    Top,
    HeaderSep,
    Bottom,
}

fn layout_table(table: &TableBlock, width: u16, fit: bool) -> Vec<LaidOutLine> {
    let cols = table
        .head
        .iter()
        .chain(table.body.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    if cols == 0 {
        return Vec::new();
    }

    // Each cell gets one space of padding on both sides.
    let (width, chrome_w, min_col_w) = match table.borders {
        TableBorders::Glow => (
            width.saturating_sub(2),
            (3 * cols as u16).saturating_sub(1),
            1u16,
        ),
        TableBorders::Boxed => (width, 3 * cols as u16 + 1, 3u16),
    };
    if chrome_w >= width {
        return Vec::new();
    }

    let mut col_w: Vec<u16> = vec![min_col_w; cols];
    for row in table.head.iter().chain(table.body.iter()) {
        for (ci, cell) in row.iter().enumerate() {
            col_w[ci] = col_w[ci].max(cell_width(cell));
        }
    }

    let available = width.saturating_sub(chrome_w);
    let min_total = min_col_w.saturating_mul(cols as u16);
    if min_total > available {
        let per = (available / cols as u16).max(1);
        col_w.fill(per);
    } else {
        let mut total = col_w.iter().copied().sum::<u16>();
        while total > available {
            if let Some((idx, _)) = col_w
                .iter()
                .enumerate()
                .filter(|(_, w)| **w > min_col_w)
                .max_by_key(|(_, w)| **w)
            {
                col_w[idx] -= 1;
                total -= 1;
            } else {
                break;
            }
        }
    }

    let border = |s: String| {
        let mut line = LaidOutLine::default();
        line.push_text(&s, table.border_style, &RunAttributes::default());
        line
    };

    let mut out = Vec::new();
    if table.borders == TableBorders::Boxed {
        out.push(border(table_border_line(&col_w, BorderLine::Top)));
    }
    for row in &table.head {
        out.extend(layout_table_row(row, &col_w, table, fit));
    }
    if !table.head.is_empty() {
        let sep = match table.borders {
            TableBorders::Glow => table_separator_line_glow(&col_w),
            TableBorders::Boxed => table_border_line(&col_w, BorderLine::HeaderSep),
        };
        out.push(border(sep));
    }
    for row in &table.body {
        out.extend(layout_table_row(row, &col_w, table, fit));
    }
    if table.borders == TableBorders::Boxed {
        out.push(border(table_border_line(&col_w, BorderLine::Bottom)));
    }
    out
}

fn cell_width(cell: &TableCellBlock) -> u16 {
    cell.content
        .plain()
        .split('\n')
        .map(display_width)
        .max()
        .unwrap_or(0)
        .max(1) as u16
}

fn layout_table_row(
    row: &[TableCellBlock],
    col_w: &[u16],
    table: &TableBlock,
    fit: bool,
) -> Vec<LaidOutLine> {
    let cells: Vec<Vec<LaidOutLine>> = col_w
        .iter()
        .enumerate()
        .map(|(ci, w)| {
            row.get(ci)
                .map(|cell| wrap_text(&cell.content, *w, fit))
                .unwrap_or_default()
        })
        .collect();
    let row_h = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let boxed = table.borders == TableBorders::Boxed;

    let mut out = Vec::with_capacity(row_h);
    for li in 0..row_h {
        let mut line = LaidOutLine::default();
        if boxed {
            line.push_text("│", table.border_style, &RunAttributes::default());
        }
        for (ci, w) in col_w.iter().copied().enumerate() {
            if ci > 0 && !boxed {
                line.push_text("│", table.border_style, &RunAttributes::default());
            }
            let cell_line = cells[ci].get(li).cloned().unwrap_or_default();
            let align = row.get(ci).map_or(Alignment::Left, |c| c.alignment);
            let pad = w.saturating_sub(cell_line.width());
            let (left, right) = match align {
                Alignment::Left => (0, pad),
                Alignment::Right => (pad, 0),
                Alignment::Center => (pad / 2, pad - pad / 2),
            };
            line.push_spaces(1 + left, Style::default());
            line.append(cell_line);
            line.push_spaces(right + 1, Style::default());
            if boxed {
                line.push_text("│", table.border_style, &RunAttributes::default());
            }
        }
        out.push(line);
    }
    out
}

fn table_separator_line_glow(col_w: &[u16]) -> String {
    let mut s = String::new();
    for (i, w) in col_w.iter().copied().enumerate() {
        if i > 0 {
            s.push('┼');
        }
        s.push_str(&"─".repeat(usize::from(w) + 2));
    }
    s
}

fn table_border_line(col_w: &[u16], kind: BorderLine) -> String {
    let (left, mid, right) = match kind {
        BorderLine::Top => ('┌', '┬', '┐'),
        BorderLine::HeaderSep => ('├', '┼', '┤'),
        BorderLine::Bottom => ('└', '┴', '┘'),
    };
    let mut s = String::new();
    for (i, w) in col_w.iter().copied().enumerate() {
        s.push(if i == 0 { left } else { mid });
        s.push_str(&"─".repeat(usize::from(w) + 2));
    }
    s.push(right);
    s
}

enum Token {
    Piece {
        text: String,
        style: Style,
        attributes: RunAttributes,
    },
    Break,
    Image(Arc<ScaledImage>),
}

fn tokenize(text: &StyledText) -> Vec<Token> {
    let mut out = Vec::new();
    for run in text.runs() {
        match &run.content {
            RunContent::Text(s) => {
                for (i, part) in s.split('\n').enumerate() {
                    if i > 0 {
                        out.push(Token::Break);
                    }
                    for piece in split_ws(part) {
                        out.push(Token::Piece {
                            text: piece.to_string(),
                            style: run.style,
                            attributes: run.attributes.clone(),
                        });
                    }
                }
            }
            RunContent::Image(image) => out.push(Token::Image(Arc::clone(image))),
        }
    }
    out
}

/// Greedy word wrap of `text` to `width` columns. `\n` forces a break; images get their own lines.
pub fn wrap_text(text: &StyledText, width: u16, fit_images: bool) -> Vec<LaidOutLine> {
    if width == 0 {
        return Vec::new();
    }
    let max = usize::from(width);
    let mut out: Vec<LaidOutLine> = Vec::new();
    let mut cur = LaidOutLine::default();
    let mut cur_cols = 0usize;

    let finish = |out: &mut Vec<LaidOutLine>, cur: &mut LaidOutLine| {
        cur.trim_end();
        out.push(std::mem::take(cur));
    };

    for tok in tokenize(text) {
        match tok {
            Token::Break => {
                finish(&mut out, &mut cur);
                cur_cols = 0;
            }
            Token::Image(image) => {
                if !cur.runs.is_empty() {
                    finish(&mut out, &mut cur);
                }
                cur_cols = 0;
                for pixels in image_rows(&image, width, fit_images) {
                    let w = pixels.len() as u16;
                    out.push(LaidOutLine {
                        runs: vec![PositionedRun {
                            x: 0,
                            width: w,
                            content: PositionedContent::Pixels(pixels),
                            attributes: RunAttributes::default(),
                        }],
                    });
                }
            }
            Token::Piece {
                text,
                style,
                attributes,
            } => {
                let is_ws = is_all_ws(&text);
                if cur_cols == 0 && is_ws {
                    continue;
                }
                let cols = display_width(&text);
                if cur_cols + cols <= max {
                    cur.push_text(&text, style, &attributes);
                    cur_cols += cols;
                    continue;
                }
                if is_ws {
                    finish(&mut out, &mut cur);
                    cur_cols = 0;
                    continue;
                }
                if cur_cols > 0 {
                    finish(&mut out, &mut cur);
                    cur_cols = 0;
                }

                let mut remaining = text;
                loop {
                    let cols = display_width(&remaining);
                    if cur_cols + cols <= max {
                        cur.push_text(&remaining, style, &attributes);
                        cur_cols += cols;
                        break;
                    }
                    let room = max.saturating_sub(cur_cols).max(1);
                    let (mut head, mut tail) = split_to_width_prefer_url_breaks(&remaining, room);
                    if head.is_empty() {
                        let mut chars = remaining.chars();
                        head = chars.next().map(String::from).unwrap_or_default();
                        tail = chars.as_str().to_string();
                    }
                    cur.push_text(&head, style, &attributes);
                    finish(&mut out, &mut cur);
                    cur_cols = 0;
                    remaining = tail;
                    if remaining.is_empty() {
                        break;
                    }
                }
            }
        }
    }
    if !cur.runs.is_empty() {
        finish(&mut out, &mut cur);
    }
    out
}

/// Half-block rows for `image`, two pixel rows per terminal line.
fn image_rows(image: &ScaledImage, max_cols: u16, fit: bool) -> Vec<Vec<[Color; 2]>> {
    let (w, h) = (image.width(), image.height());
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let max_cols = u32::from(max_cols);
    let (tw, th) = if fit && w > max_cols {
        let th = ((u64::from(h) * u64::from(max_cols)) / u64::from(w)).max(1) as u32;
        (max_cols, th)
    } else {
        (w.min(max_cols), h)
    };
    if tw == 0 {
        return Vec::new();
    }
    let sample_x = |x: u32| {
        if fit && w > max_cols {
            rescale(x, w, tw)
        } else {
            x
        }
    };
    let sample = |x: u32, y: u32| -> Color {
        if y >= th {
            return Color::Reset;
        }
        let sy = rescale(y, h, th);
        let p = image.pixels().get_pixel(sample_x(x), sy).0;
        if p[3] < 128 {
            Color::Reset
        } else {
            Color::Rgb(p[0], p[1], p[2])
        }
    };
    (0..th.div_ceil(2))
        .map(|row| {
            (0..tw)
                .map(|x| [sample(x, row * 2), sample(x, row * 2 + 1)])
                .collect()
        })
        .collect()
}

/// Maps index `i` of a `to`-long axis onto a `from`-long one.
fn rescale(i: u32, from: u32, to: u32) -> u32 {
    (u64::from(i) * u64::from(from) / u64::from(to)) as u32
}

fn split_ws(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut last_was_ws: Option<bool> = None;
    for (idx, ch) in s.char_indices() {
        let is_ws = ch.is_whitespace();
        if let Some(prev) = last_was_ws {
            if prev != is_ws {
                out.push(&s[start..idx]);
                start = idx;
            }
        }
        last_was_ws = Some(is_ws);
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

fn split_to_width_prefer_url_breaks(s: &str, max_cols: usize) -> (String, String) {
    if looks_like_url(s) {
        if let Some(idx) = last_url_breakpoint_before(s, max_cols) {
            let (a, b) = s.split_at(idx);
            return (a.to_string(), b.to_string());
        }
    }
    split_to_width(s, max_cols)
}

fn looks_like_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

fn last_url_breakpoint_before(s: &str, max_cols: usize) -> Option<usize> {
    let mut cols = 0usize;
    let mut best: Option<usize> = None;
    for (byte_idx, ch) in s.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if cols + w > max_cols {
            break;
        }
        cols += w;
        if matches!(ch, '.' | '-' | '_' | '~' | '?' | '&' | '#' | '=' | '/') {
            best = Some(byte_idx + ch.len_utf8());
        }
    }
    best
}

fn split_to_width(s: &str, max_cols: usize) -> (String, String) {
    let mut cols = 0usize;
    let mut idx = 0usize;
    for (byte_idx, ch) in s.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if cols + w > max_cols {
            break;
        }
        cols += w;
        idx = byte_idx + ch.len_utf8();
    }
    let (a, b) = s.split_at(idx);
    (a.to_string(), b.to_string())
}

fn is_all_ws(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}
