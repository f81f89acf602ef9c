use image::DynamicImage;
use image::ImageFormat;
use image::Rgba;
use image::RgbaImage;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui_markup::FetchError;
use ratatui_markup::ImageCache;
use ratatui_markup::MarkdownDocument;
use ratatui_markup::MarkdownStyles;
use ratatui_markup::MarkdownView;
use ratatui_markup::RenderContext;
use ratatui_markup::RenderOptions;
use ratatui_markup::theme::Theme;
use ratatui_markup::styles::BoxTableStyle;
use ratatui_markup::styles::DividerHeadingStyle;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use url::Url;

fn lines(md: &str, width: u16, options: &RenderOptions, styles: &MarkdownStyles) -> Vec<String> {
    let theme = Theme::default();
    let ctx = RenderContext::new(&theme, options, styles);
    MarkdownDocument::parse(md)
        .lines(width, &ctx)
        .iter()
        .map(|l| l.plain().trim_end().to_string())
        .collect()
}

fn default_lines(md: &str, width: u16) -> Vec<String> {
    lines(md, width, &RenderOptions::default(), &MarkdownStyles::default())
}

fn buffer_rows(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn wait_for_images(view: &mut MarkdownView) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !view.poll_images() {
        assert!(Instant::now() < deadline, "image fetch did not finish");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn renders_a_mixed_document() {
    let md = "# Title\n\nSome *text* with `code`.\n\n- one\n- two\n\n> quoted\n\n---\n";
    assert_eq!(
        default_lines(md, 30),
        vec![
            "Title",
            "",
            "Some text with code.",
            "",
            "",
            "• one",
            "• two",
            "",
            "",
            "│ quoted",
            "",
            "──────────────────────────────",
        ]
    );
}

#[test]
fn ordered_lists_keep_their_start_and_nest() {
    let md = "3. a\n4. b\n   - inner\n";
    assert_eq!(default_lines(md, 20), vec!["3. a", "4. b", "   ◦ inner"]);
}

#[test]
fn nested_bullets_change_per_level() {
    let md = "- a\n  - b\n    - c\n      - d\n";
    assert_eq!(
        default_lines(md, 20),
        vec!["• a", "  ◦ b", "    ▪ c", "      ▪ d"]
    );
}

#[test]
fn task_lists_show_checkboxes() {
    assert_eq!(
        default_lines("- [x] done\n- [ ] todo\n", 20),
        vec!["• ☑ done", "• ☐ todo"]
    );
}

#[test]
fn tables_use_column_alignment() {
    let md = "| a | b | c |\n|:--|:-:|--:|\n| 1 | 2 | 3 |\n";
    assert_eq!(
        default_lines(md, 40),
        vec![" a │ b │ c", "───┼───┼───", " 1 │ 2 │ 3"]
    );
}

#[test]
fn box_tables_are_framed() {
    let styles = MarkdownStyles::default().with_table(BoxTableStyle);
    let md = "| a | b |\n|---|---|\n| 1 | 2 |\n";
    assert_eq!(
        lines(md, 40, &RenderOptions::default(), &styles),
        vec![
            "┌─────┬─────┐",
            "│  a  │  b  │",
            "├─────┼─────┤",
            "│  1  │  2  │",
            "└─────┴─────┘",
        ]
    );
}

#[test]
fn divider_headings_draw_a_rule() {
    let styles = MarkdownStyles::default().with_heading(DividerHeadingStyle::default());
    assert_eq!(
        lines("## Two\n\n### Three\n", 5, &RenderOptions::default(), &styles),
        vec!["Two", "─────", "", "Three"]
    );
}

#[test]
fn code_blocks_are_indented_and_clipped() {
    let md = "```\nshort\nthis line is far too long\n```\n";
    assert_eq!(default_lines(md, 12), vec!["    short", "    this lin"]);
}

#[test]
fn unsupported_blocks_fall_back_to_text() {
    let md = "<div>raw html</div>\n";
    assert_eq!(default_lines(md, 40), vec!["<div>raw html</div>"]);
}

#[test]
fn long_paragraphs_wrap() {
    let md = "alpha beta gamma delta epsilon\n";
    assert_eq!(
        default_lines(md, 11),
        vec!["alpha beta", "gamma delta", "epsilon"]
    );
}

#[test]
fn images_load_in_the_background() {
    let bytes = png(4, 4, [200, 10, 10, 255]);
    let fetcher = move |_: &Url| -> Result<Vec<u8>, FetchError> { Ok(bytes.clone()) };
    let mut view = MarkdownView::new().with_image_cache(ImageCache::with_fetcher(Arc::new(fetcher)));
    view.set_markdown("![logo](https://img.example/logo.png)\n");

    let area = Rect::new(0, 0, 10, 2);
    let mut buf = Buffer::empty(area);
    view.render_ref(area, &mut buf);
    assert_eq!(buffer_rows(&buf)[0], "◌ logo");

    wait_for_images(&mut view);
    let mut buf = Buffer::empty(area);
    view.render_ref(area, &mut buf);
    // 4x4 pixels at display scale 2 is 2x2: one row of half blocks.
    assert_eq!(buffer_rows(&buf), vec!["▀▀", ""]);
    assert!(matches!(buf[(0, 0)].fg, Color::Rgb(r, _, _) if r > 190));
    assert!(matches!(buf[(0, 0)].bg, Color::Rgb(r, _, _) if r > 190));
}

#[test]
fn failed_images_show_the_failure_placeholder() {
    let fetcher =
        |_: &Url| -> Result<Vec<u8>, FetchError> { Err(FetchError::Http("404".to_string())) };
    let mut view = MarkdownView::new().with_image_cache(ImageCache::with_fetcher(Arc::new(fetcher)));
    view.set_markdown("![logo](https://img.example/logo.png)\n");

    let area = Rect::new(0, 0, 10, 1);
    let mut buf = Buffer::empty(area);
    view.render_ref(area, &mut buf);
    wait_for_images(&mut view);
    let mut buf = Buffer::empty(area);
    view.render_ref(area, &mut buf);
    assert_eq!(buffer_rows(&buf)[0], "⚠ logo");
    assert_eq!(buf[(0, 0)].fg, Color::Red);
}

#[test]
fn relative_images_without_a_base_are_missing() {
    let fetcher = |_: &Url| -> Result<Vec<u8>, FetchError> { Ok(Vec::new()) };
    let mut view = MarkdownView::new().with_image_cache(ImageCache::with_fetcher(Arc::new(fetcher)));
    view.set_markdown("![logo](logo.png)\n");
    let area = Rect::new(0, 0, 10, 1);
    let mut buf = Buffer::empty(area);
    view.render_ref(area, &mut buf);
    assert_eq!(buffer_rows(&buf)[0], "▨ logo");
    assert_eq!(view.images().in_flight(), 0);
}
