//! Read-only markdown tree built on top of `pulldown-cmark`.
//!
//! `pulldown-cmark` produces a flat event stream. The renderers in this crate walk a tree, so
//! [`Markup::parse`] folds the events into nested [`Markup`] nodes, keeping the source range of
//! every node.
use pulldown_cmark::Alignment;
use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::CowStr;
use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::LinkType;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use std::ops::Range;

mod format;

pub use format::FormatOptions;

/// Task list state of a list item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Checkbox {
    Checked,
    Unchecked,
}

/// Column alignment as written in a table's delimiter row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnAlignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupKind {
    Document,
    Heading {
        level: u8,
    },
    Paragraph,
    Text(String),
    Strong,
    Emphasis,
    Strikethrough,
    InlineCode(String),
    SoftBreak,
    LineBreak,
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    BlockQuote,
    Image {
        source: Option<String>,
        title: Option<String>,
    },
    Link {
        destination: Option<String>,
        title: Option<String>,
        autolink: bool,
    },
    OrderedList {
        start: u64,
    },
    UnorderedList,
    ListItem {
        checkbox: Option<Checkbox>,
    },
    Table {
        /// One entry per declared column; `None` when the delimiter row has no colon.
        alignments: Vec<Option<ColumnAlignment>>,
    },
    TableHead,
    TableRow,
    TableCell,
    ThematicBreak,
    HtmlBlock(String),
    InlineHtml(String),
    FootnoteReference(String),
    FootnoteDefinition(String),
    InlineMath(String),
    DisplayMath(String),
}

impl MarkupKind {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            MarkupKind::Document => "document",
            MarkupKind::Heading { .. } => "heading",
            MarkupKind::Paragraph => "paragraph",
            MarkupKind::Text(_) => "text",
            MarkupKind::Strong => "strong",
            MarkupKind::Emphasis => "emphasis",
            MarkupKind::Strikethrough => "strikethrough",
            MarkupKind::InlineCode(_) => "inline-code",
            MarkupKind::SoftBreak => "soft-break",
            MarkupKind::LineBreak => "line-break",
            MarkupKind::CodeBlock { .. } => "code-block",
            MarkupKind::BlockQuote => "block-quote",
            MarkupKind::Image { .. } => "image",
            MarkupKind::Link { .. } => "link",
            MarkupKind::OrderedList { .. } => "ordered-list",
            MarkupKind::UnorderedList => "unordered-list",
            MarkupKind::ListItem { .. } => "list-item",
            MarkupKind::Table { .. } => "table",
            MarkupKind::TableHead => "table-head",
            MarkupKind::TableRow => "table-row",
            MarkupKind::TableCell => "table-cell",
            MarkupKind::ThematicBreak => "thematic-break",
            MarkupKind::HtmlBlock(_) => "html-block",
            MarkupKind::InlineHtml(_) => "inline-html",
            MarkupKind::FootnoteReference(_) => "footnote-reference",
            MarkupKind::FootnoteDefinition(_) => "footnote-definition",
            MarkupKind::InlineMath(_) => "inline-math",
            MarkupKind::DisplayMath(_) => "display-math",
        }
    }

    /// Whether this kind flows within a line of text.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            MarkupKind::Text(_)
                | MarkupKind::Strong
                | MarkupKind::Emphasis
                | MarkupKind::Strikethrough
                | MarkupKind::InlineCode(_)
                | MarkupKind::SoftBreak
                | MarkupKind::LineBreak
                | MarkupKind::Image { .. }
                | MarkupKind::Link { .. }
                | MarkupKind::InlineHtml(_)
                | MarkupKind::FootnoteReference(_)
                | MarkupKind::InlineMath(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markup {
    pub kind: MarkupKind,
    pub children: Vec<Markup>,
    /// Byte range of this node in the parsed source.
    pub range: Range<usize>,
}

impl Markup {
    pub fn new(kind: MarkupKind, children: Vec<Markup>) -> Self {
        Self {
            kind,
            children,
            range: 0..0,
        }
    }

    pub fn leaf(kind: MarkupKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::leaf(MarkupKind::Text(text.into()))
    }

    /// Parses `source` as GFM (tables, strikethrough, task lists, footnotes, math).
    pub fn parse(source: &str) -> Markup {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_MATH);
        let parser = Parser::new_ext(source, options).into_offset_iter();

        let mut b = TreeBuilder::new(source.len());
        for (event, range) in parser {
            b.push_event(event, range);
        }
        b.finish()
    }

    pub fn children(&self) -> &[Markup] {
        &self.children
    }

    pub fn is_inline(&self) -> bool {
        self.kind.is_inline()
    }

    /// True when every child is inline content (and there is at least one).
    pub fn is_inline_container(&self) -> bool {
        !self.children.is_empty() && self.children.iter().all(Markup::is_inline)
    }

    /// Literal text of the subtree, without any markdown syntax.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_plain_text(&mut out);
        out
    }

    fn collect_plain_text(&self, out: &mut String) {
        match &self.kind {
            MarkupKind::Text(text)
            | MarkupKind::InlineCode(text)
            | MarkupKind::InlineHtml(text)
            | MarkupKind::InlineMath(text)
            | MarkupKind::DisplayMath(text)
            | MarkupKind::HtmlBlock(text) => out.push_str(text),
            MarkupKind::SoftBreak => out.push(' '),
            MarkupKind::LineBreak => out.push('\n'),
            MarkupKind::CodeBlock { code, .. } => out.push_str(code),
            MarkupKind::FootnoteReference(label) => {
                out.push_str("[^");
                out.push_str(label);
                out.push(']');
            }
            _ => {
                for child in &self.children {
                    child.collect_plain_text(out);
                }
            }
        }
    }

    /// Regenerates markdown source for this subtree.
    pub fn format(&self, options: &FormatOptions) -> String {
        format::format_markup(self, options)
    }
}

struct Frame {
    /// `None` for tags we do not model; their children are spliced into the parent.
    node: Option<Markup>,
    children: Vec<Markup>,
    range: Range<usize>,
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new(len: usize) -> Self {
        Self {
            stack: vec![Frame {
                node: Some(Markup {
                    kind: MarkupKind::Document,
                    children: Vec::new(),
                    range: 0..len,
                }),
                children: Vec::new(),
                range: 0..len,
            }],
        }
    }

    fn top(&mut self) -> &mut Frame {
        // The document frame is never popped.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_child(&mut self, child: Markup) {
        let frame = self.top();
        if let MarkupKind::Text(text) = &child.kind {
            if let Some(Markup {
                kind: MarkupKind::Text(prev),
                range,
                ..
            }) = frame.children.last_mut()
            {
                prev.push_str(text);
                range.end = child.range.end;
                return;
            }
        }
        frame.children.push(child);
    }

    fn open(&mut self, kind: Option<MarkupKind>, range: Range<usize>) {
        self.stack.push(Frame {
            node: kind.map(|kind| Markup {
                kind,
                children: Vec::new(),
                range: range.clone(),
            }),
            children: Vec::new(),
            range,
        });
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame.node {
            Some(mut node) => {
                node.children = frame.children;
                node.range = frame.range;
                self.push_child(node);
            }
            None => {
                for child in frame.children {
                    self.push_child(child);
                }
            }
        }
    }

    fn in_code_block(&mut self) -> Option<&mut String> {
        match self.top().node.as_mut() {
            Some(Markup {
                kind: MarkupKind::CodeBlock { code, .. },
                ..
            }) => Some(code),
            _ => None,
        }
    }

    fn in_html_block(&mut self) -> Option<&mut String> {
        match self.top().node.as_mut() {
            Some(Markup {
                kind: MarkupKind::HtmlBlock(html),
                ..
            }) => Some(html),
            _ => None,
        }
    }

    fn push_event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => {
                let kind = tag_kind(tag);
                self.open(kind, range);
            }
            Event::End(_) => self.close(),
            Event::Text(text) => {
                if let Some(code) = self.in_code_block() {
                    code.push_str(&text);
                    return;
                }
                self.push_child(Markup {
                    kind: MarkupKind::Text(text.into_string()),
                    children: Vec::new(),
                    range,
                });
            }
            Event::Code(code) => self.push_child(Markup {
                kind: MarkupKind::InlineCode(code.into_string()),
                children: Vec::new(),
                range,
            }),
            Event::InlineMath(math) => self.push_child(Markup {
                kind: MarkupKind::InlineMath(math.into_string()),
                children: Vec::new(),
                range,
            }),
            Event::DisplayMath(math) => self.push_child(Markup {
                kind: MarkupKind::DisplayMath(math.into_string()),
                children: Vec::new(),
                range,
            }),
            Event::Html(html) => {
                if let Some(block) = self.in_html_block() {
                    block.push_str(&html);
                    return;
                }
                self.push_child(Markup {
                    kind: MarkupKind::HtmlBlock(html.into_string()),
                    children: Vec::new(),
                    range,
                });
            }
            Event::InlineHtml(html) => self.push_child(Markup {
                kind: MarkupKind::InlineHtml(html.into_string()),
                children: Vec::new(),
                range,
            }),
            Event::FootnoteReference(label) => self.push_child(Markup {
                kind: MarkupKind::FootnoteReference(label.into_string()),
                children: Vec::new(),
                range,
            }),
            Event::SoftBreak => self.push_child(Markup {
                kind: MarkupKind::SoftBreak,
                children: Vec::new(),
                range,
            }),
            Event::HardBreak => self.push_child(Markup {
                kind: MarkupKind::LineBreak,
                children: Vec::new(),
                range,
            }),
            Event::Rule => self.push_child(Markup {
                kind: MarkupKind::ThematicBreak,
                children: Vec::new(),
                range,
            }),
            Event::TaskListMarker(checked) => {
                let checkbox = if checked {
                    Checkbox::Checked
                } else {
                    Checkbox::Unchecked
                };
                for frame in self.stack.iter_mut().rev() {
                    if let Some(Markup {
                        kind: MarkupKind::ListItem { checkbox: slot },
                        ..
                    }) = frame.node.as_mut()
                    {
                        *slot = Some(checkbox);
                        break;
                    }
                }
            }
        }
    }

    fn finish(mut self) -> Markup {
        while self.stack.len() > 1 {
            self.close();
        }
        let frame = self.stack.remove(0);
        let mut root = frame.node.unwrap_or_else(|| Markup::leaf(MarkupKind::Document));
        root.children = frame.children;
        root
    }
}

fn tag_kind(tag: Tag<'_>) -> Option<MarkupKind> {
    let kind = match tag {
        Tag::Paragraph => MarkupKind::Paragraph,
        Tag::Heading { level, .. } => MarkupKind::Heading {
            level: heading_level(level),
        },
        Tag::BlockQuote(_) => MarkupKind::BlockQuote,
        Tag::CodeBlock(kind) => MarkupKind::CodeBlock {
            language: match kind {
                CodeBlockKind::Fenced(lang) => normalize_fenced_lang(&lang),
                CodeBlockKind::Indented => None,
            },
            code: String::new(),
        },
        Tag::HtmlBlock => MarkupKind::HtmlBlock(String::new()),
        Tag::List(Some(start)) => MarkupKind::OrderedList { start },
        Tag::List(None) => MarkupKind::UnorderedList,
        Tag::Item => MarkupKind::ListItem { checkbox: None },
        Tag::FootnoteDefinition(label) => MarkupKind::FootnoteDefinition(label.into_string()),
        Tag::Table(aligns) => MarkupKind::Table {
            alignments: aligns.into_iter().map(column_alignment).collect(),
        },
        Tag::TableHead => MarkupKind::TableHead,
        Tag::TableRow => MarkupKind::TableRow,
        Tag::TableCell => MarkupKind::TableCell,
        Tag::Emphasis => MarkupKind::Emphasis,
        Tag::Strong => MarkupKind::Strong,
        Tag::Strikethrough => MarkupKind::Strikethrough,
        Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        } => MarkupKind::Link {
            destination: non_empty(dest_url),
            title: non_empty(title),
            autolink: matches!(link_type, LinkType::Autolink | LinkType::Email),
        },
        Tag::Image { dest_url, title, .. } => MarkupKind::Image {
            source: non_empty(dest_url),
            title: non_empty(title),
        },
        _ => return None,
    };
    Some(kind)
}

fn non_empty(s: CowStr<'_>) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn column_alignment(align: Alignment) -> Option<ColumnAlignment> {
    match align {
        Alignment::None => None,
        Alignment::Left => Some(ColumnAlignment::Left),
        Alignment::Center => Some(ColumnAlignment::Center),
        Alignment::Right => Some(ColumnAlignment::Right),
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn normalize_fenced_lang(lang: &CowStr<'_>) -> Option<String> {
    let raw = lang.trim();
    let first = raw.split_whitespace().next().unwrap_or("");
    let first = first.split(',').next().unwrap_or("").trim();
    let first = first.strip_prefix("language-").unwrap_or(first);
    let first = first.strip_prefix('{').unwrap_or(first);
    let first = first.strip_suffix('}').unwrap_or(first);
    let first = first.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(node: &Markup) -> Vec<&'static str> {
        node.children.iter().map(|c| c.kind.name()).collect()
    }

    #[test]
    fn builds_nested_inline_tree() {
        let doc = Markup::parse("Hello **bold *both***.");
        assert_eq!(kinds(&doc), vec!["paragraph"]);
        let para = &doc.children[0];
        assert_eq!(kinds(para), vec!["text", "strong", "text"]);
        assert_eq!(kinds(&para.children[1]), vec!["text", "emphasis"]);
        assert_eq!(para.plain_text(), "Hello bold both.");
    }

    #[test]
    fn merges_adjacent_text_events() {
        let doc = Markup::parse("a [b c");
        let para = &doc.children[0];
        assert_eq!(para.children.len(), 1);
        assert_eq!(para.children[0].kind, MarkupKind::Text("a [b c".into()));
    }

    #[test]
    fn parses_code_block_language_and_source() {
        let doc = Markup::parse("```rust,ignore\nfn main() {}\n```\n");
        assert_eq!(
            doc.children[0].kind,
            MarkupKind::CodeBlock {
                language: Some("rust".into()),
                code: "fn main() {}\n".into(),
            }
        );
    }

    #[test]
    fn ordered_list_keeps_start_index() {
        let doc = Markup::parse("4. a\n7. b\n1. c\n");
        assert_eq!(doc.children[0].kind, MarkupKind::OrderedList { start: 4 });
        assert_eq!(doc.children[0].children.len(), 3);
    }

    #[test]
    fn task_markers_land_on_list_items() {
        let doc = Markup::parse("- [x] done\n- [ ] todo\n- plain\n");
        let list = &doc.children[0];
        let boxes: Vec<_> = list
            .children
            .iter()
            .map(|item| match item.kind {
                MarkupKind::ListItem { checkbox } => checkbox,
                _ => None,
            })
            .collect();
        assert_eq!(
            boxes,
            vec![Some(Checkbox::Checked), Some(Checkbox::Unchecked), None]
        );
    }

    #[test]
    fn table_keeps_declared_alignments() {
        let doc = Markup::parse("| a | b | c |\n|:--|:-:|--:|\n| 1 | 2 |\n");
        let table = &doc.children[0];
        assert_eq!(
            table.kind,
            MarkupKind::Table {
                alignments: vec![
                    Some(ColumnAlignment::Left),
                    Some(ColumnAlignment::Center),
                    Some(ColumnAlignment::Right),
                ],
            }
        );
        assert_eq!(kinds(table), vec!["table-head", "table-row"]);
    }

    #[test]
    fn autolinks_are_flagged() {
        let doc = Markup::parse("<https://example.com> and [x](https://example.com)");
        let para = &doc.children[0];
        let flags: Vec<bool> = para
            .children
            .iter()
            .filter_map(|c| match c.kind {
                MarkupKind::Link { autolink, .. } => Some(autolink),
                _ => None,
            })
            .collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn source_ranges_cover_nodes() {
        let src = "# Title\n\nbody";
        let doc = Markup::parse(src);
        assert_eq!(src[doc.children[0].range.clone()].trim_end(), "# Title");
        assert_eq!(&src[doc.children[1].range.clone()], "body");
    }
}
