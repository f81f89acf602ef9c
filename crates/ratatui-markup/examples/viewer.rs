//! Interactive viewer: `cargo run --example viewer -- README.md`
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui_markup::ImageCache;
use ratatui_markup::MarkdownStyles;
use ratatui_markup::MarkdownView;
use ratatui_markup::RenderOptions;
use ratatui_markup::styles::DividerHeadingStyle;
use std::io;
use std::path::Path;
use std::time::Duration;

const SAMPLE_MARKDOWN: &str = r#"
# ratatui-markup

Markdown with **strong**, *emphasis*, ~~strikethrough~~ and `inline code`.
Links like [ratatui](https://ratatui.rs) keep their destination.

## Lists

1. ordered
2. items
   - nested
     - deeper

- [x] task list item
- [ ] task list item

## Table

| Name | Value | Notes |
|:-----|------:|:-----:|
| foo  | 123   | left / right / center |
| bar  | 456   | wraps when the terminal is narrow |

> Block quotes get a bar on every line,
> including wrapped ones.

```rust
fn main() {
    println!("hello");
}
```

---

Press `q` to quit, `j`/`k` to scroll.
"#;

fn main() -> io::Result<()> {
    let path = std::env::args().nth(1);
    let (markdown, base_url) = match &path {
        Some(path) => (std::fs::read_to_string(path)?, base_url_for(Path::new(path))),
        None => (SAMPLE_MARKDOWN.trim().to_string(), None),
    };

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let options = RenderOptions {
        base_url,
        highlighter: ratatui_markup_syntax::default_highlighter(),
        ..RenderOptions::default()
    };
    let mut view = MarkdownView::with_options(options)
        .with_styles(MarkdownStyles::default().with_heading(DividerHeadingStyle::default()))
        .with_image_cache(ImageCache::new());
    view.set_markdown(&markdown);

    let res = run(&mut terminal, &mut view);

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn base_url_for(path: &Path) -> Option<String> {
    let dir = std::fs::canonicalize(path).ok()?.parent()?.to_path_buf();
    url::Url::from_directory_path(dir).ok().map(String::from)
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    view: &mut MarkdownView,
) -> io::Result<()> {
    loop {
        view.poll_images();
        terminal.draw(|f| f.render_widget(&mut *view, f.area()))?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = crossterm::event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Char('j') | KeyCode::Down => view.scroll_y_by(1),
            KeyCode::Char('k') | KeyCode::Up => view.scroll_y_by(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => view.scroll_y_by(20),
            KeyCode::PageUp => view.scroll_y_by(-20),
            KeyCode::Char('g') | KeyCode::Home => view.scroll_to_top(),
            KeyCode::Char('G') | KeyCode::End => view.scroll_to_bottom(),
            _ => {}
        }
    }
}
