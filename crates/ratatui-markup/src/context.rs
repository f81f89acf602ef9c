use crate::image::ImageCache;
use crate::image::ScaledImage;
use crate::inline_code::InlineCodeStyle;
use crate::list_level::ListLevel;
use crate::styles::MarkdownStyles;
use ratatui::style::Style;
use ratatui_markup_core::text::CodeHighlighter;
use ratatui_markup_core::theme::Theme;
use std::sync::Arc;

/// Replacement drawn instead of a markdown image.
#[derive(Clone, Debug)]
pub enum StaticImage {
    Glyph { text: String, style: Style },
    Pixels(Arc<ScaledImage>),
}

/// How markdown images are resolved.
#[derive(Clone, Debug, Default)]
pub enum ImageMode {
    /// Load the image through the [`ImageCache`].
    #[default]
    Render,
    /// Show the image's alt text.
    ReplaceWithText,
    /// Show the same fixed image for every markdown image.
    ReplaceWithImage(StaticImage),
}

impl ImageMode {
    /// `ReplaceWithImage` using a glyph from a small table of named symbols.
    pub fn replace_with_symbol(name: &str) -> Self {
        let text = match name {
            "photo" | "image" => "▣",
            "warning" | "exclamationmark.triangle" => "⚠",
            "questionmark" | "unknown" => "?",
            "circle" => "○",
            "square" => "□",
            "star" => "★",
            "link" => "⛓",
            _ => "▨",
        };
        ImageMode::ReplaceWithImage(StaticImage::Glyph {
            text: text.to_string(),
            style: Style::default(),
        })
    }
}

/// Glyphs shown in place of images that cannot be drawn yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePlaceholders {
    pub loading: String,
    pub failed: String,
    pub missing: String,
}

impl Default for ImagePlaceholders {
    fn default() -> Self {
        Self {
            loading: "◌".to_string(),
            failed: "⚠".to_string(),
            missing: "▨".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageScale {
    /// Divide image pixels by `RenderOptions::display_scale`.
    pub display: bool,
    /// Shrink images wider than the available width.
    pub scaled_to_fit: bool,
}

impl Default for ImageScale {
    fn default() -> Self {
        Self {
            display: true,
            scaled_to_fit: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontType {
    Heading(u8),
    Body,
    Code,
}

/// Per-font style overrides. Unset entries fall back to the theme.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkdownFonts {
    pub headings: [Option<Style>; 6],
    pub body: Option<Style>,
    pub code: Option<Style>,
}

impl MarkdownFonts {
    pub fn with(mut self, font: FontType, style: Style) -> Self {
        match font {
            FontType::Heading(level) => {
                self.headings[usize::from(level.clamp(1, 6)) - 1] = Some(style);
            }
            FontType::Body => self.body = Some(style),
            FontType::Code => self.code = Some(style),
        }
        self
    }

    pub fn style(&self, font: FontType, theme: &Theme) -> Style {
        match font {
            FontType::Heading(level) => self.headings[usize::from(level.clamp(1, 6)) - 1]
                .unwrap_or_else(|| theme.heading(level)),
            FontType::Body => self.body.unwrap_or(theme.text_primary),
            FontType::Code => self.code.unwrap_or(theme.code_block),
        }
    }
}

#[derive(Clone)]
pub struct RenderOptions {
    pub image_mode: ImageMode,
    pub image_scale: ImageScale,
    /// Source pixels per drawn pixel when `image_scale.display` is set.
    pub display_scale: f32,
    pub condense_autolinks: bool,
    /// Relative link and image destinations are joined onto this URL.
    pub base_url: Option<String>,
    /// Blank lines between sibling blocks.
    pub block_spacing: u16,
    /// Blank lines above and below a root list.
    pub root_list_padding: u16,
    pub placeholders: ImagePlaceholders,
    pub fonts: MarkdownFonts,
    /// Overrides the theme-derived inline code style.
    pub inline_code: Option<InlineCodeStyle>,
    pub highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>,
    /// Code blocks longer than this are drawn without highlighting.
    pub max_highlight_lines: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_mode: ImageMode::Render,
            image_scale: ImageScale::default(),
            display_scale: 2.0,
            condense_autolinks: false,
            base_url: None,
            block_spacing: 1,
            root_list_padding: 1,
            placeholders: ImagePlaceholders::default(),
            fonts: MarkdownFonts::default(),
            inline_code: None,
            highlighter: None,
            max_highlight_lines: 500,
        }
    }
}

/// Ambient state for one render pass.
///
/// Cheap to clone; `with_*` returns a copy for a subtree and leaves `self` untouched.
#[derive(Clone)]
pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    pub options: &'a RenderOptions,
    pub styles: &'a MarkdownStyles,
    images: Option<&'a ImageCache>,
    list_level: ListLevel,
    image_mode: ImageMode,
    inline_code: InlineCodeStyle,
}

impl<'a> RenderContext<'a> {
    pub fn new(theme: &'a Theme, options: &'a RenderOptions, styles: &'a MarkdownStyles) -> Self {
        Self {
            theme,
            options,
            styles,
            images: None,
            list_level: ListLevel::Root,
            image_mode: options.image_mode.clone(),
            inline_code: options
                .inline_code
                .unwrap_or_else(|| InlineCodeStyle::from_theme(theme)),
        }
    }

    pub fn with_images(mut self, images: &'a ImageCache) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_list_level(&self, level: ListLevel) -> Self {
        let mut ctx = self.clone();
        ctx.list_level = level;
        ctx
    }

    pub fn with_image_mode(&self, mode: ImageMode) -> Self {
        let mut ctx = self.clone();
        ctx.image_mode = mode;
        ctx
    }

    pub fn with_inline_code_style(&self, style: InlineCodeStyle) -> Self {
        let mut ctx = self.clone();
        ctx.inline_code = style;
        ctx
    }

    pub fn images(&self) -> Option<&'a ImageCache> {
        self.images
    }

    pub fn list_level(&self) -> ListLevel {
        self.list_level
    }

    pub fn image_mode(&self) -> &ImageMode {
        &self.image_mode
    }

    pub fn inline_code_style(&self) -> &InlineCodeStyle {
        &self.inline_code
    }

    pub fn font(&self, font: FontType) -> Style {
        self.options.fonts.style(font, self.theme)
    }

    /// Scale factor passed to the image cache.
    pub fn image_scale_factor(&self) -> f32 {
        if self.options.image_scale.display {
            self.options.display_scale
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn with_list_level_leaves_parent_untouched() {
        let theme = Theme::default();
        let options = RenderOptions::default();
        let styles = MarkdownStyles::default();
        let ctx = RenderContext::new(&theme, &options, &styles);
        let nested = ctx.with_list_level(ctx.list_level().next());
        assert_eq!(ctx.list_level(), ListLevel::Root);
        assert_eq!(nested.list_level(), ListLevel::Indented);
    }

    #[test]
    fn fonts_fall_back_to_theme() {
        let theme = Theme::default();
        let red = Style::default().fg(Color::Red);
        let fonts = MarkdownFonts::default().with(FontType::Heading(2), red);
        assert_eq!(fonts.style(FontType::Heading(2), &theme), red);
        assert_eq!(fonts.style(FontType::Heading(1), &theme), theme.heading(1));
        assert_eq!(fonts.style(FontType::Code, &theme), theme.code_block);
    }

    #[test]
    fn named_symbols_map_to_glyphs() {
        let ImageMode::ReplaceWithImage(StaticImage::Glyph { text, .. }) =
            ImageMode::replace_with_symbol("photo")
        else {
            panic!("expected glyph");
        };
        assert_eq!(text, "▣");
    }

    #[test]
    fn display_scale_only_applies_when_enabled() {
        let theme = Theme::default();
        let mut options = RenderOptions::default();
        let styles = MarkdownStyles::default();
        assert_eq!(
            RenderContext::new(&theme, &options, &styles).image_scale_factor(),
            2.0
        );
        options.image_scale.display = false;
        assert_eq!(
            RenderContext::new(&theme, &options, &styles).image_scale_factor(),
            1.0
        );
    }
}
