//! Draw-time pass that paints the fill behind inline code runs.
//!
//! Layout hands this module one line of positioned runs. Maximal stretches of runs tagged as
//! inline code are merged into a single box, the box is filled, and then every run is drawn
//! on top. Runs are never modified.
use crate::layout::PositionedContent;
use crate::layout::PositionedRun;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui_markup_core::render::render_str_clipped;
use ratatui_markup_core::theme::Theme;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundShape {
    Rectangle,
    /// Rectangle with half-block caps drawn into blank neighbouring cells.
    #[default]
    Rounded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InlineCodeStyle {
    pub foreground: Style,
    pub background: Color,
    pub shape: BackgroundShape,
}

impl InlineCodeStyle {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            foreground: theme.code_inline,
            background: theme.code_fill,
            shape: BackgroundShape::Rounded,
        }
    }

    /// Foreground `color` over the same color at 20% opacity.
    pub fn with_foreground(color: Color) -> Self {
        Self {
            foreground: Style::default().fg(color),
            background: with_opacity(color, 0.2),
            shape: BackgroundShape::Rounded,
        }
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn shape(mut self, shape: BackgroundShape) -> Self {
        self.shape = shape;
        self
    }
}

impl Default for InlineCodeStyle {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

/// Blends `color` at `alpha` over a black terminal background.
pub fn with_opacity(color: Color, alpha: f32) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    let Some((r, g, b)) = rgb(color) else {
        return Color::DarkGray;
    };
    let mix = |c: u8| (f32::from(c) * alpha).round() as u8;
    Color::Rgb(mix(r), mix(g), mix(b))
}

fn rgb(color: Color) -> Option<(u8, u8, u8)> {
    let rgb = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::Red => (205, 49, 49),
        Color::Green => (13, 188, 121),
        Color::Yellow => (229, 229, 16),
        Color::Blue => (36, 114, 200),
        Color::Magenta => (188, 63, 188),
        Color::Cyan => (17, 168, 205),
        Color::Gray => (229, 229, 229),
        Color::DarkGray => (102, 102, 102),
        Color::LightRed => (241, 76, 76),
        Color::LightGreen => (35, 209, 139),
        Color::LightYellow => (245, 245, 67),
        Color::LightBlue => (59, 142, 234),
        Color::LightMagenta => (214, 112, 214),
        Color::LightCyan => (41, 184, 219),
        Color::White => (255, 255, 255),
        Color::Reset | Color::Indexed(_) => return None,
    };
    Some(rgb)
}

/// Union of `rects` as one box: min x, min y, summed widths, max height.
pub fn joined_rect(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    let mut out: Option<Rect> = None;
    for r in rects {
        out = Some(match out {
            None => r,
            Some(acc) => Rect {
                x: acc.x.min(r.x),
                y: acc.y.min(r.y),
                width: acc.width.saturating_add(r.width),
                height: acc.height.max(r.height),
            },
        });
    }
    out
}

/// Boxes behind each maximal contiguous group of inline code runs on a line at `area`.
pub fn code_boxes(area: Rect, runs: &[PositionedRun]) -> Vec<Rect> {
    let mut boxes = Vec::new();
    let mut group: Vec<Rect> = Vec::new();
    for run in runs {
        if run.attributes.inline_code {
            group.push(Rect::new(area.x.saturating_add(run.x), area.y, run.width, 1));
            continue;
        }
        if let Some(r) = joined_rect(group.drain(..)) {
            boxes.push(r);
        }
    }
    if let Some(r) = joined_rect(group.drain(..)) {
        boxes.push(r);
    }
    boxes
}

/// Draws one laid-out line: inline code backgrounds first, then the runs.
pub fn draw_line(area: Rect, runs: &[PositionedRun], style: &InlineCodeStyle, buf: &mut Buffer) {
    let area = area.intersection(buf.area);
    if area.is_empty() {
        return;
    }
    let boxes: Vec<Rect> = code_boxes(area, runs)
        .into_iter()
        .map(|r| r.intersection(area))
        .filter(|r| !r.is_empty())
        .collect();
    for b in &boxes {
        buf.set_style(*b, Style::default().bg(style.background));
    }

    for run in runs {
        if run.x >= area.width {
            continue;
        }
        let x = area.x + run.x;
        let max_cols = run.width.min(area.width - run.x);
        match &run.content {
            PositionedContent::Text(span) => {
                render_str_clipped(x, area.y, max_cols, buf, &span.content, span.style);
            }
            PositionedContent::Pixels(pixels) => {
                for (i, [top, bottom]) in pixels.iter().take(max_cols as usize).enumerate() {
                    if let Some(cell) = buf.cell_mut((x + i as u16, area.y)) {
                        cell.set_symbol("▀");
                        cell.set_fg(*top);
                        cell.set_bg(*bottom);
                    }
                }
            }
        }
    }

    if style.shape == BackgroundShape::Rounded {
        for b in &boxes {
            if b.x > area.x {
                draw_cap(buf, b.x - 1, area.y, "▐", style.background, &boxes);
            }
            if b.right() < area.right() {
                draw_cap(buf, b.right(), area.y, "▌", style.background, &boxes);
            }
        }
    }
}

fn draw_cap(buf: &mut Buffer, x: u16, y: u16, symbol: &str, color: Color, boxes: &[Rect]) {
    if boxes.iter().any(|b| x >= b.x && x < b.right()) {
        return;
    }
    if let Some(cell) = buf.cell_mut((x, y)) {
        if cell.symbol() == " " {
            cell.set_symbol(symbol);
            cell.set_fg(color);
        }
    }
}
