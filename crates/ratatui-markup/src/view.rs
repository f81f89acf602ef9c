//! Parse-once documents and a scrollable widget on top of them.
use crate::block::RenderedBlock;
use crate::context::RenderContext;
use crate::context::RenderOptions;
use crate::dispatch;
use crate::image::ImageCache;
use crate::inline_code;
use crate::layout::LaidOutLine;
use crate::layout::layout_block;
use crate::markup::Markup;
use crate::styles::MarkdownStyles;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Text;
use ratatui::widgets::Widget;
use ratatui_markup_core::text::CodeHighlighter;
use ratatui_markup_core::theme::Theme;
use std::sync::Arc;

/// Markdown parsed into a markup tree. Rendering is repeatable and never reparses.
#[derive(Clone, Debug)]
pub struct MarkdownDocument {
    source: String,
    root: Markup,
}

impl MarkdownDocument {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let root = Markup::parse(&source);
        Self { source, root }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn markup(&self) -> &Markup {
        &self.root
    }

    pub fn render(&self, ctx: &RenderContext<'_>) -> RenderedBlock {
        dispatch::render_document(&self.root, ctx)
    }

    /// Renders and lays out for `width` columns, without leading or trailing blank lines.
    pub fn lines(&self, width: u16, ctx: &RenderContext<'_>) -> Vec<LaidOutLine> {
        let mut lines = layout_block(&self.render(ctx), width, ctx);
        while lines.last().is_some_and(|l| l.runs.is_empty()) {
            lines.pop();
        }
        let leading = lines.iter().take_while(|l| l.runs.is_empty()).count();
        lines.drain(..leading);
        lines
    }
}

/// Scrollable markdown viewer.
///
/// Layout is cached per width and redone when images finish loading.
pub struct MarkdownView {
    document: MarkdownDocument,
    theme: Theme,
    options: RenderOptions,
    styles: MarkdownStyles,
    images: ImageCache,
    lines: Vec<LaidOutLine>,
    cached_width: Option<u16>,
    scroll_y: usize,
    viewport_height: u16,
}

impl Default for MarkdownView {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownView {
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            document: MarkdownDocument::parse(""),
            theme: Theme::default(),
            options,
            styles: MarkdownStyles::default(),
            images: ImageCache::new(),
            lines: Vec::new(),
            cached_width: None,
            scroll_y: 0,
            viewport_height: 0,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_styles(mut self, styles: MarkdownStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Replaces the image cache, e.g. with one using a custom fetcher or a redraw waker.
    pub fn with_image_cache(mut self, images: ImageCache) -> Self {
        self.images = images;
        self
    }

    pub fn set_markdown(&mut self, input: &str) {
        self.document = MarkdownDocument::parse(input);
        self.invalidate();
    }

    pub fn set_highlighter(&mut self, highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>) {
        self.options.highlighter = highlighter;
        self.invalidate();
    }

    pub fn document(&self) -> &MarkdownDocument {
        &self.document
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    /// Applies finished image loads. Returns `true` when the view needs a redraw.
    pub fn poll_images(&mut self) -> bool {
        let changed = self.images.poll();
        if changed {
            self.invalidate();
        }
        changed
    }

    pub fn scroll_y_by(&mut self, delta: i32) {
        let next = if delta < 0 {
            self.scroll_y.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            self.scroll_y.saturating_add(delta as usize)
        };
        self.scroll_y = next.min(self.max_scroll());
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_y = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_y = self.max_scroll();
    }

    pub fn scroll_y(&self) -> usize {
        self.scroll_y
    }

    /// Number of laid-out lines at the last rendered width.
    pub fn content_height(&self) -> usize {
        self.lines.len()
    }

    pub fn lines_for_width(&mut self, width: u16) -> Vec<Line<'static>> {
        self.ensure_layout(width);
        self.lines.iter().map(LaidOutLine::to_line).collect()
    }

    pub fn as_text(&mut self) -> Text<'static> {
        let width = self.cached_width.unwrap_or(80);
        Text::from(self.lines_for_width(width))
    }

    pub fn render_ref(&mut self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.viewport_height = area.height;
        self.ensure_layout(area.width);
        self.scroll_y = self.scroll_y.min(self.max_scroll());

        let ctx = RenderContext::new(&self.theme, &self.options, &self.styles);
        let code_style = *ctx.inline_code_style();
        for row in 0..area.height {
            let y = area.y + row;
            let line_area = Rect::new(area.x, y, area.width, 1);
            buf.set_style(line_area, self.theme.text_primary);
            if let Some(line) = self.lines.get(self.scroll_y + usize::from(row)) {
                inline_code::draw_line(line_area, &line.runs, &code_style, buf);
            }
        }
    }

    fn max_scroll(&self) -> usize {
        self.lines
            .len()
            .saturating_sub(usize::from(self.viewport_height))
    }

    fn invalidate(&mut self) {
        self.cached_width = None;
    }

    fn ensure_layout(&mut self, width: u16) {
        if self.cached_width == Some(width) {
            return;
        }
        let ctx = RenderContext::new(&self.theme, &self.options, &self.styles).with_images(&self.images);
        self.lines = self.document.lines(width, &ctx);
        self.cached_width = Some(width);
        log::trace!(
            target: "ratatui_markup::view",
            "laid out {} lines at width {width}",
            self.lines.len()
        );
    }
}

impl Widget for &mut MarkdownView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_ref(area, buf);
    }
}
