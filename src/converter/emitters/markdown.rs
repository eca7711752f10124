//! Markdown emitter
//!
//! CommonMark output with two widely supported extensions: pipe tables and
//! `Term` / `: definition` lists. Constructs with no Markdown form (spans,
//! underline, sub/superscript, keyboard keys, foldable sections) fall back
//! to inline HTML or lose their structure with a warning.

use super::{
    Emitter, ImageRef, VariableUse, code_language, code_text, collapsible_parts, cross_reference, image_ref,
    is_block_snippet, resolve_href, resolve_snippet, resolve_variable, strip_admonition_label, with_edges,
};
use crate::config::{Alignment, ConversionOptions, TargetFormat};
use crate::converter::context::{ConversionContext, Substitutions};
use crate::converter::guard::TRUNCATION_NOTICE;
use crate::converter::list_processing::{FlatLine, ItemBlock, ListBlock, ListKind, convert_list};
use crate::converter::postprocessing::normalize_markdown;
use crate::converter::resolver::{ImagePlacement, is_external};
use crate::converter::rules::{AdmonitionKind, GenericTag, Rule};
use crate::converter::table::{CellFormat, ColumnLayout, Table, convert_table};
use crate::converter::text_util::{escape_html, escape_markdown, indent_lines, markdown_fence, single_line, wrap_inline};
use crate::converter::walker::Walker;
use crate::converter::{ConversionResult, run};
use crate::error::ConvertResult;
use crate::tree::{Document, NodeId};

/// Bullet characters by nesting level, cycling
const BULLETS: [char; 3] = ['-', '*', '+'];

pub(crate) struct MarkdownEmitter;

pub(crate) static EMITTER: MarkdownEmitter = MarkdownEmitter;

/// Convert a document to Markdown.
///
/// # Errors
///
/// Returns [`crate::ConvertError::InvalidOptions`] for rejected options and
/// [`crate::ConvertError::Internal`] when the conversion panics.
pub fn convert(document: &Document, options: &ConversionOptions) -> ConvertResult<ConversionResult> {
    convert_with(document, options, &Substitutions::default())
}

/// Convert a document to Markdown with substitutions.
///
/// # Errors
///
/// See [`convert`].
pub fn convert_with(
    document: &Document,
    options: &ConversionOptions,
    substitutions: &Substitutions,
) -> ConvertResult<ConversionResult> {
    run(document, &EMITTER, options, substitutions, "document")
}

impl Emitter for MarkdownEmitter {
    fn format(&self) -> TargetFormat {
        TargetFormat::Markdown
    }

    fn text(&self, text: &str) -> String {
        escape_markdown(text).into_owned()
    }

    fn emit(&self, walker: &Walker<'_>, rule: Rule, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        let doc = walker.doc;
        match rule {
            Rule::Skip => String::new(),
            Rule::Admonition(kind) => self.admonition(walker, kind, id, ctx),
            Rule::Collapsible => self.collapsible(walker, id, ctx),
            Rule::Snippet => {
                let block = is_block_snippet(doc, id);
                let content = match resolve_snippet(doc, id, ctx) {
                    Some(text) => text.to_string(),
                    None => walker.walk_children(id, ctx),
                };
                let body = content.trim();
                if block && !body.is_empty() {
                    format!("\n\n{body}\n\n")
                } else {
                    body.to_string()
                }
            }
            Rule::Variable => match resolve_variable(doc, id, TargetFormat::Markdown, ctx) {
                VariableUse::Value(value) => self.text(&value),
                VariableUse::Attribute(_) | VariableUse::Unresolved => walker.walk_children(id, ctx),
            },
            Rule::CrossReference => {
                let (href, text) = cross_reference(walker, id, ctx);
                match href {
                    Some(href) => self.link(&href, &text, ctx),
                    None => text,
                }
            }
            Rule::CodeBlock => {
                let code = code_text(doc, id);
                if code.trim().is_empty() {
                    return String::new();
                }
                let fence = markdown_fence(&code);
                let language = code_language(doc, id).unwrap_or_default();
                format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
            }
            Rule::Figure => self.figure(walker, id, ctx),
            Rule::Keyboard => {
                let keys = doc.text_content(id);
                if keys.is_empty() {
                    String::new()
                } else {
                    format!("<kbd>{}</kbd>", escape_html(&keys))
                }
            }
            Rule::Generic(tag) => self.generic(walker, tag, id, ctx),
        }
    }

    fn heading(&self, level: u8, text: &str, anchor: Option<&str>) -> String {
        let marks = "#".repeat(usize::from(level.clamp(1, 6)));
        match anchor {
            Some(anchor) => format!("\n\n<a id=\"{}\"></a>\n\n{marks} {text}\n\n", escape_html(anchor)),
            None => format!("\n\n{marks} {text}\n\n"),
        }
    }

    fn paragraph(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            String::new()
        } else {
            format!("\n\n{text}\n\n")
        }
    }

    fn strong(&self, text: &str) -> String {
        wrap_inline(text, "**", "**")
    }

    fn emphasis(&self, text: &str) -> String {
        wrap_inline(text, "*", "*")
    }

    fn code_span(&self, text: &str) -> String {
        let text = single_line(text);
        if text.is_empty() {
            return String::new();
        }
        let longest = longest_backtick_run(&text);
        let ticks = "`".repeat(longest + 1);
        if text.starts_with('`') || text.ends_with('`') {
            format!("{ticks} {text} {ticks}")
        } else {
            format!("{ticks}{text}{ticks}")
        }
    }

    fn link(&self, href: &str, text: &str, ctx: &mut ConversionContext<'_>) -> String {
        let Some(target) = resolve_href(href, TargetFormat::Markdown, ctx) else {
            return text.to_string();
        };
        let target = link_destination(&target);
        let label = single_line(text);
        if label.is_empty() {
            if is_external(&target) {
                return format!("<{target}>");
            }
            return format!("[{}]({target})", escape_markdown(&target));
        }
        format!("[{label}]({target})")
    }

    fn image(&self, image: &ImageRef) -> String {
        let src = link_destination(&image.src);
        let alt = escape_markdown(&image.alt).replace('\n', " ");
        let rendered = match image.title.as_deref().filter(|t| !t.is_empty() && *t != image.alt) {
            Some(title) => format!("![{alt}]({src} \"{}\")", title.replace('"', "\\\"")),
            None => format!("![{alt}]({src})"),
        };
        match image.placement {
            ImagePlacement::Inline => rendered,
            ImagePlacement::Block => format!("\n\n{rendered}\n\n"),
        }
    }

    fn line_break(&self) -> String {
        "\\\n".to_string()
    }

    fn truncated(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            format!("\n\n<!-- {TRUNCATION_NOTICE} -->\n\n")
        } else {
            format!("\n\n{text}\n\n<!-- {TRUNCATION_NOTICE} -->\n\n")
        }
    }

    fn render_list(&self, list: &ListBlock) -> String {
        let mut out = String::new();
        let mut number = list.start.unwrap_or(1);

        for item in &list.items {
            let (marker, indent) = match list.kind {
                ListKind::Unordered => (BULLETS[list.level as usize % BULLETS.len()].to_string(), 2),
                ListKind::Ordered => {
                    let marker = format!("{number}.");
                    number += 1;
                    let indent = marker.len() + 1;
                    (marker, indent)
                }
                ListKind::Definition => (String::new(), 2),
            };
            let pad = " ".repeat(indent);

            let mut blocks = item.blocks.as_slice();
            let head = match list.kind {
                ListKind::Definition => {
                    let term = item.term.as_deref().unwrap_or_default();
                    match (term.is_empty(), item.text.is_empty()) {
                        (false, false) => format!("**{term}**\n: {}", item.text),
                        (false, true) => format!("**{term}**"),
                        (true, _) => format!(": {}", item.text),
                    }
                }
                // a bare marker line would end the item, so the first block
                // moves up onto it
                _ => match blocks.split_first() {
                    Some((ItemBlock::Content(first), rest)) if item.text.is_empty() => {
                        blocks = rest;
                        let first = first.trim();
                        match first.split_once('\n') {
                            Some((line, more)) => format!("{marker} {line}\n{}", indent_lines(more, &pad)),
                            None => format!("{marker} {first}"),
                        }
                    }
                    _ => format!("{marker} {}", item.text),
                },
            };
            out.push_str(head.trim_end());
            out.push('\n');

            for block in blocks {
                match block {
                    ItemBlock::Content(content) => {
                        out.push('\n');
                        out.push_str(&indent_lines(content, &pad));
                        out.push_str("\n\n");
                    }
                    ItemBlock::List(nested) => {
                        out.push_str(&indent_lines(nested, &pad));
                        out.push('\n');
                    }
                    ItemBlock::Flattened(lines) => {
                        out.push_str(&indent_lines(&flat_lines(lines), &pad));
                        out.push('\n');
                    }
                }
            }
        }
        format!("\n\n{}\n\n", out.trim_end())
    }

    fn render_flattened(&self, lines: &[FlatLine]) -> String {
        format!("\n\n{}\n\n", flat_lines(lines))
    }

    fn render_table(&self, table: &Table, layout: &ColumnLayout, ctx: &mut ConversionContext<'_>) -> String {
        if table.nested {
            ctx.warn("nested table flattened to text; Markdown tables cannot nest");
            return flatten_nested_table(table);
        }
        if table.has_spans() {
            ctx.warn("table cell spans have no Markdown form; spanned slots were left empty");
        }

        let columns = table.column_count.max(1);
        let grid = table_grid(table, columns);
        let mut out = String::new();

        if let Some(caption) = &table.caption {
            out.push_str(&format!("*{caption}*\n\n"));
        }
        let mut rows = grid.iter();
        if let Some(header) = rows.next() {
            out.push_str(&pipe_row(header));
            out.push('\n');
        }
        let rule: Vec<String> = (0..columns)
            .map(|col| alignment_rule(column_alignment(table, layout, col)))
            .collect();
        out.push_str(&pipe_row(&rule));
        for row in rows {
            out.push('\n');
            out.push_str(&pipe_row(row));
        }
        format!("\n\n{out}\n\n")
    }

    fn document_title(&self, title: &str, _from_heading: bool) -> Option<String> {
        Some(format!("# {}", single_line(title)))
    }

    fn normalize(&self, text: &str) -> String {
        normalize_markdown(text)
    }
}

// ============================================================================
// Element handlers
// ============================================================================

impl MarkdownEmitter {
    fn generic(&self, walker: &Walker<'_>, tag: GenericTag, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        let doc = walker.doc;
        match tag {
            GenericTag::Heading(level) => {
                let text = single_line(&walker.walk_children(id, ctx));
                if text.is_empty() {
                    return String::new();
                }
                ctx.last_heading_level = level;
                self.heading(level, &text, doc.attr(id, "id"))
            }
            GenericTag::Paragraph => {
                let content = walker.walk_children(id, ctx);
                self.paragraph(&content)
            }
            GenericTag::Strong => {
                let content = walker.walk_children(id, ctx);
                self.strong(&content)
            }
            GenericTag::Emphasis => {
                let content = walker.walk_children(id, ctx);
                self.emphasis(&content)
            }
            GenericTag::Underline => {
                let content = walker.walk_children(id, ctx);
                wrap_inline(&content, "<u>", "</u>")
            }
            GenericTag::Strikethrough => {
                let content = walker.walk_children(id, ctx);
                wrap_inline(&content, "~~", "~~")
            }
            GenericTag::Subscript => {
                let content = walker.walk_children(id, ctx);
                wrap_inline(&content, "<sub>", "</sub>")
            }
            GenericTag::Superscript => {
                let content = walker.walk_children(id, ctx);
                wrap_inline(&content, "<sup>", "</sup>")
            }
            GenericTag::InlineCode => self.code_span(&doc.text_content(id)),
            GenericTag::Anchor => {
                let content = walker.walk_children(id, ctx);
                match doc.attr(id, "href") {
                    Some(href) => with_edges(&content, |core| self.link(href, core, ctx)),
                    None => match doc.attr(id, "id").or_else(|| doc.attr(id, "name")) {
                        Some(anchor) => format!("<a id=\"{}\"></a>{content}", escape_html(anchor)),
                        None => content,
                    },
                }
            }
            GenericTag::Image => image_ref(doc, id, ctx)
                .map(|image| self.image(&image))
                .unwrap_or_default(),
            GenericTag::LineBreak => self.line_break(),
            GenericTag::HorizontalRule => "\n\n---\n\n".to_string(),
            GenericTag::Blockquote => {
                let body = walker.walk_children(id, ctx);
                let body = body.trim();
                if body.is_empty() {
                    String::new()
                } else {
                    format!("\n\n{}\n\n", quote_lines(body))
                }
            }
            GenericTag::List(_) => convert_list(walker, id, ctx),
            GenericTag::Table => convert_table(walker, id, ctx),
            GenericTag::ListItem | GenericTag::Block => {
                let body = walker.walk_children(id, ctx);
                let body = body.trim();
                if body.is_empty() {
                    String::new()
                } else {
                    format!("\n\n{body}\n\n")
                }
            }
            GenericTag::Inline => walker.walk_children(id, ctx),
        }
    }

    fn admonition(
        &self,
        walker: &Walker<'_>,
        kind: AdmonitionKind,
        id: NodeId,
        ctx: &mut ConversionContext<'_>,
    ) -> String {
        let rendered = walker.walk_children(id, ctx);
        let content = strip_admonition_label(rendered.trim()).trim();
        if content.is_empty() {
            return String::new();
        }
        let body = if starts_block_syntax(content) {
            format!("**{}:**\n\n{content}", kind.title())
        } else {
            format!("**{}:** {content}", kind.title())
        };
        format!("\n\n{}\n\n", quote_lines(&body))
    }

    fn collapsible(&self, walker: &Walker<'_>, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        if ctx.options.use_collapsible_blocks {
            let (title, body) = collapsible_parts(walker, id, ctx);
            return format!("\n\n<details>\n<summary>{title}</summary>\n\n{body}\n\n</details>\n\n");
        }

        let previous = ctx.last_heading_level;
        let level = (previous + 1).min(6);
        ctx.last_heading_level = level;
        let (title, body) = collapsible_parts(walker, id, ctx);
        ctx.last_heading_level = previous;

        let heading = self.heading(level, &title, walker.doc.attr(id, "id"));
        if body.is_empty() {
            heading
        } else {
            format!("{heading}{body}\n\n")
        }
    }

    fn figure(&self, walker: &Walker<'_>, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        let doc = walker.doc;
        let Some(img) = doc.find_descendant(id, "img") else {
            return walker.walk_children(id, ctx);
        };
        let Some(mut image) = image_ref(doc, img, ctx) else {
            return String::new();
        };
        image.placement = ImagePlacement::Block;

        let caption = doc
            .find_descendant(id, "figcaption")
            .map(|c| single_line(&walker.walk_children(c, ctx)))
            .unwrap_or_default();
        let rendered = self.image(&image);
        if caption.is_empty() {
            rendered
        } else {
            format!("\n\n{}\n\n*{caption}*\n\n", rendered.trim())
        }
    }
}

// ============================================================================
// Syntax helpers
// ============================================================================

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Link destination safe inside `( )`
fn link_destination(target: &str) -> String {
    target.replace(' ', "%20").replace('(', "%28").replace(')', "%29")
}

/// Prefix every line with `> `; blank lines become a bare `>`
/// Whether rendered content opens with a block that cannot follow a label
/// on the same line
fn starts_block_syntax(content: &str) -> bool {
    let ordered = content
        .find(|c: char| !c.is_ascii_digit())
        .is_some_and(|end| end > 0 && content[end..].starts_with(". "));
    ordered
        || ["- ", "* ", "+ ", "```", "~~~", "|", "#", ">", "![", "<details"]
            .iter()
            .any(|prefix| content.starts_with(prefix))
}

fn quote_lines(text: &str) -> String {
    text.lines()
        .map(|line| if line.trim().is_empty() { ">".to_string() } else { format!("> {line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

fn flat_lines(lines: &[FlatLine]) -> String {
    lines
        .iter()
        .map(|line| match line {
            FlatLine::Bullet(text) => format!("- {text}"),
            FlatLine::Raw(text) => text.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Layout alignment, else the alignment of the first row's cell in the column
fn column_alignment(table: &Table, layout: &ColumnLayout, column: usize) -> Option<Alignment> {
    layout.alignments.get(column).copied().flatten().or_else(|| {
        table
            .rows
            .first()?
            .cells
            .iter()
            .find(|cell| cell.column == column)
            .and_then(|cell| cell.alignment)
    })
}

fn alignment_rule(alignment: Option<Alignment>) -> String {
    match alignment {
        Some(Alignment::Left) => ":---",
        Some(Alignment::Center) => ":---:",
        Some(Alignment::Right) => "---:",
        None => "---",
    }
    .to_string()
}

/// Cell text for a pipe table: one line, pipes escaped
fn cell_text(content: &str, format: Option<CellFormat>) -> String {
    let content = content
        .split("\n\n")
        .map(single_line)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("<br><br>");
    let content = content.replace('|', "\\|");
    if content.is_empty() {
        return content;
    }
    match format {
        Some(CellFormat::Strong) => format!("**{content}**"),
        Some(CellFormat::Emphasis) => format!("*{content}*"),
        Some(CellFormat::Monospace) => EMITTER.code_span(&content),
        None => content,
    }
}

/// Rows x columns of cell text; slots covered by a span stay empty
fn table_grid(table: &Table, columns: usize) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .map(|row| {
            let mut slots = vec![String::new(); columns];
            for cell in &row.cells {
                if let Some(slot) = slots.get_mut(cell.column) {
                    *slot = cell_text(&cell.content, cell.format);
                }
            }
            slots
        })
        .collect()
}

fn pipe_row(cells: &[String]) -> String {
    let mut out = String::from("|");
    for cell in cells {
        if cell.is_empty() {
            out.push_str("  |");
        } else {
            out.push_str(&format!(" {cell} |"));
        }
    }
    out
}

/// A nested table as plain lines, one row per line
fn flatten_nested_table(table: &Table) -> String {
    table
        .rows
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| single_line(&cell.content))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
