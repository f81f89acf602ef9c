use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;

#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub danger: Style,
    pub link: Style,
    pub code_inline: Style,
    /// Fill behind inline code spans when no explicit background is configured.
    pub code_fill: Color,
    pub code_block: Style,
    pub quote: Style,
    pub rule: Style,
    /// Base heading styles, indexed by `level - 1`.
    pub headings: [Style; 6],
}

impl Theme {
    /// Style for a heading `level` (1-6). Out of range levels clamp.
    pub fn heading(&self, level: u8) -> Style {
        let idx = usize::from(level.clamp(1, 6)) - 1;
        self.headings[idx]
    }
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        let bold = Style::default().add_modifier(Modifier::BOLD);
        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            danger: Style::default().red(),
            link: Style::default().cyan().underlined(),
            code_inline: Style::default(),
            code_fill: Color::Rgb(58, 58, 64),
            code_block: Style::default().cyan(),
            quote: Style::default().dark_gray(),
            rule: Style::default().dark_gray(),
            headings: [
                bold.cyan().underlined(),
                bold.cyan(),
                bold,
                bold,
                bold.dark_gray(),
                Style::default().dark_gray().italic(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_clamp_to_known_range() {
        let theme = Theme::default();
        assert_eq!(theme.heading(0), theme.heading(1));
        assert_eq!(theme.heading(9), theme.heading(6));
        assert_ne!(theme.heading(1), theme.heading(3));
    }
}
