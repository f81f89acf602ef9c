use super::Checkbox;
use super::ColumnAlignment;
use super::Markup;
use super::MarkupKind;

/// Controls how [`Markup::format`] regenerates source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Write autolinks back as `<url>` instead of `[url](url)`.
    pub condense_autolinks: bool,
}

pub(super) fn format_markup(markup: &Markup, options: &FormatOptions) -> String {
    let mut f = Formatter { options };
    if markup.is_inline() {
        f.inline(markup)
    } else {
        f.block(markup).trim_end_matches('\n').to_string()
    }
}

struct Formatter<'a> {
    options: &'a FormatOptions,
}

impl Formatter<'_> {
    fn inlines(&mut self, nodes: &[Markup]) -> String {
        nodes.iter().map(|n| self.inline(n)).collect()
    }

    fn inline(&mut self, node: &Markup) -> String {
        match &node.kind {
            MarkupKind::Text(text) => escape_text(text),
            MarkupKind::Strong => format!("**{}**", self.inlines(&node.children)),
            MarkupKind::Emphasis => format!("*{}*", self.inlines(&node.children)),
            MarkupKind::Strikethrough => format!("~~{}~~", self.inlines(&node.children)),
            MarkupKind::InlineCode(code) => code_span(code),
            MarkupKind::SoftBreak => "\n".to_string(),
            MarkupKind::LineBreak => "\\\n".to_string(),
            MarkupKind::Link {
                destination,
                title,
                autolink,
            } => {
                let dest = destination.as_deref().unwrap_or("");
                if *autolink && self.options.condense_autolinks && !dest.is_empty() {
                    return format!("<{dest}>");
                }
                format!(
                    "[{}]({}{})",
                    self.inlines(&node.children),
                    destination_source(dest),
                    title_source(title.as_deref())
                )
            }
            MarkupKind::Image { source, title } => format!(
                "![{}]({}{})",
                self.inlines(&node.children),
                destination_source(source.as_deref().unwrap_or("")),
                title_source(title.as_deref())
            ),
            MarkupKind::InlineHtml(html) => html.clone(),
            MarkupKind::FootnoteReference(label) => format!("[^{label}]"),
            MarkupKind::InlineMath(math) => format!("${math}$"),
            MarkupKind::DisplayMath(math) => format!("$${math}$$"),
            _ => self.block(node).trim_end_matches('\n').to_string(),
        }
    }

    fn blocks(&mut self, nodes: &[Markup]) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut inline_run: Vec<&Markup> = Vec::new();
        for node in nodes {
            if node.is_inline() {
                inline_run.push(node);
                continue;
            }
            if !inline_run.is_empty() {
                parts.push(inline_run.drain(..).map(|n| self.inline(n)).collect());
            }
            parts.push(self.block(node).trim_end_matches('\n').to_string());
        }
        if !inline_run.is_empty() {
            parts.push(inline_run.drain(..).map(|n| self.inline(n)).collect());
        }
        parts.join("\n\n")
    }

    fn block(&mut self, node: &Markup) -> String {
        match &node.kind {
            MarkupKind::Document => self.blocks(&node.children),
            MarkupKind::Paragraph | MarkupKind::TableCell => self.inlines(&node.children),
            MarkupKind::Heading { level } => {
                let hashes = "#".repeat(usize::from((*level).clamp(1, 6)));
                format!("{hashes} {}", self.inlines(&node.children))
            }
            MarkupKind::CodeBlock { language, code } => {
                let fence = "`".repeat(longest_run(code, '`').max(2) + 1);
                let mut out = format!("{fence}{}\n", language.as_deref().unwrap_or(""));
                out.push_str(code);
                if !code.is_empty() && !code.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&fence);
                out
            }
            MarkupKind::BlockQuote => prefix_lines(&self.blocks(&node.children), "> ", "> "),
            MarkupKind::OrderedList { start } => {
                let mut items = Vec::with_capacity(node.children.len());
                for (i, item) in node.children.iter().enumerate() {
                    let marker = format!("{}. ", start.saturating_add(i as u64));
                    items.push(self.list_item(item, &marker));
                }
                items.join("\n")
            }
            MarkupKind::UnorderedList => node
                .children
                .iter()
                .map(|item| self.list_item(item, "- "))
                .collect::<Vec<_>>()
                .join("\n"),
            MarkupKind::ListItem { .. } => self.list_item(node, "- "),
            MarkupKind::Table { alignments } => self.table(node, alignments),
            MarkupKind::TableHead | MarkupKind::TableRow => self.table_row(node),
            MarkupKind::ThematicBreak => "---".to_string(),
            MarkupKind::HtmlBlock(html) => html.trim_end_matches('\n').to_string(),
            MarkupKind::FootnoteDefinition(label) => {
                let body = self.blocks(&node.children);
                prefix_lines(&body, &format!("[^{label}]: "), "    ")
            }
            MarkupKind::DisplayMath(math) => format!("$${math}$$"),
            _ => self.inline(node),
        }
    }

    fn list_item(&mut self, item: &Markup, marker: &str) -> String {
        let mut body = self.blocks(&item.children);
        if let MarkupKind::ListItem {
            checkbox: Some(checkbox),
        } = item.kind
        {
            let mark = match checkbox {
                Checkbox::Checked => "[x] ",
                Checkbox::Unchecked => "[ ] ",
            };
            body.insert_str(0, mark);
        }
        let indent = " ".repeat(marker.len());
        prefix_lines(&body, marker, &indent)
    }

    fn table(&mut self, node: &Markup, alignments: &[Option<ColumnAlignment>]) -> String {
        let mut lines: Vec<String> = Vec::new();
        for (i, row) in node.children.iter().enumerate() {
            lines.push(self.table_row(row));
            if i == 0 {
                let cols = alignments.len().max(row.children.len()).max(1);
                let delims: Vec<&str> = (0..cols)
                    .map(|c| match alignments.get(c).copied().flatten() {
                        Some(ColumnAlignment::Left) => ":--",
                        Some(ColumnAlignment::Center) => ":-:",
                        Some(ColumnAlignment::Right) => "--:",
                        None => "---",
                    })
                    .collect();
                lines.push(format!("| {} |", delims.join(" | ")));
            }
        }
        lines.join("\n")
    }

    fn table_row(&mut self, row: &Markup) -> String {
        let cells: Vec<String> = row
            .children
            .iter()
            .map(|cell| self.inlines(&cell.children))
            .collect();
        format!("| {} |", cells.join(" | "))
    }
}

fn prefix_lines(body: &str, first: &str, rest: &str) -> String {
    let mut out = String::new();
    for (i, line) in body.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let prefix = if i == 0 { first } else { rest };
        if line.is_empty() && i > 0 {
            out.push_str(prefix.trim_end());
        } else {
            out.push_str(prefix);
            out.push_str(line);
        }
    }
    out
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '~' | '&' | '|' | '$'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn code_span(code: &str) -> String {
    let ticks = "`".repeat(longest_run(code, '`') + 1);
    if code.starts_with('`') || code.ends_with('`') || code.is_empty() {
        format!("{ticks} {code} {ticks}")
    } else {
        format!("{ticks}{code}{ticks}")
    }
}

fn destination_source(dest: &str) -> String {
    if dest.chars().any(|c| c.is_whitespace() || c == '(' || c == ')') {
        format!("<{}>", dest.replace('>', "%3E"))
    } else {
        dest.to_string()
    }
}

fn title_source(title: Option<&str>) -> String {
    match title {
        Some(title) => format!(" \"{}\"", title.replace('"', "\\\"")),
        None => String::new(),
    }
}

fn longest_run(s: &str, needle: char) -> usize {
    let mut best = 0;
    let mut cur = 0;
    for ch in s.chars() {
        if ch == needle {
            cur += 1;
            best = best.max(cur);
        } else {
            cur = 0;
        }
    }
    best
}
