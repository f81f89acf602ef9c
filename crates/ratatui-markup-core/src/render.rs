use ratatui::buffer::Buffer;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Display width of `s` in terminal cells. Tabs count as four cells.
pub fn display_width(s: &str) -> usize {
    if s.contains('\t') {
        s.split('\t')
            .map(UnicodeWidthStr::width)
            .sum::<usize>()
            .saturating_add(4 * s.matches('\t').count())
    } else {
        UnicodeWidthStr::width(s)
    }
}

/// Draws `input` starting at `(x, y)` and stops before exceeding `max_cols`.
///
/// Returns the number of columns written. Wide characters that do not fit are dropped.
pub fn render_str_clipped(
    x: u16,
    y: u16,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) -> u16 {
    let max_cols = max_cols as usize;
    let mut out_cols = 0usize;
    let mut tmp = [0u8; 4];

    for ch in input.chars() {
        if ch == '\t' {
            for _ in 0..4 {
                if out_cols + 1 > max_cols {
                    return out_cols as u16;
                }
                if let Some(cell) = buf.cell_mut((x + out_cols as u16, y)) {
                    cell.set_style(style);
                    cell.set_symbol(" ");
                }
                out_cols += 1;
            }
            continue;
        }

        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            continue;
        }
        if out_cols + w > max_cols {
            break;
        }

        let s = ch.encode_utf8(&mut tmp);
        if let Some(cell) = buf.cell_mut((x + out_cols as u16, y)) {
            cell.set_style(style);
            cell.set_symbol(s);
        }
        out_cols += 1;

        if w == 2 {
            if let Some(cell) = buf.cell_mut((x + out_cols as u16, y)) {
                cell.set_style(style);
                cell.set_symbol("");
            }
            out_cols += 1;
        }
    }

    out_cols as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn clips_at_max_cols() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 1));
        let written = render_str_clipped(0, 0, 3, &mut buf, "abcdef", Style::default());
        assert_eq!(written, 3);
        assert_eq!(row(&buf, 0), "abc     ");
    }

    #[test]
    fn does_not_split_wide_chars() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        let written = render_str_clipped(0, 0, 3, &mut buf, "a表b", Style::default());
        assert_eq!(written, 3);
        assert_eq!(display_width("a表b"), 4);
    }
}
