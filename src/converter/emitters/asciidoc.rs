//! AsciiDoc emitter
//!
//! Produces Asciidoctor-compatible markup: `=` section titles, `.`/`*`
//! repeated list markers with `+` continuations, `|===` tables with cell
//! specifiers, `[NOTE]` callouts and `----` listing blocks.

use super::{
    Emitter, ImageRef, VariableUse, code_language, code_text, collapsible_parts, cross_reference, image_ref,
    is_block_snippet, neighbour_chars, resolve_href, resolve_snippet, resolve_variable, strip_admonition_label,
    touches_word, with_edges,
};
use crate::config::{Alignment, ConversionOptions, TargetFormat};
use crate::converter::context::{ConversionContext, Substitutions};
use crate::converter::guard::TRUNCATION_NOTICE;
use crate::converter::list_processing::{FlatLine, ItemBlock, ListBlock, ListKind, ListStyle, convert_list};
use crate::converter::postprocessing::normalize_asciidoc;
use crate::converter::resolver::{ImagePlacement, is_external, split_fragment};
use crate::converter::rules::{AdmonitionKind, GenericTag, Rule};
use crate::converter::table::{CellFormat, ColumnLayout, Table, TableCell, convert_table};
use crate::converter::text_util::{
    block_delimiter, escape_asciidoc, guard_asciidoc_line, opens_asciidoc_block, single_line, wrap_inline,
};
use crate::converter::walker::Walker;
use crate::converter::{ConversionResult, run};
use crate::error::ConvertResult;
use crate::tree::{Document, NodeId};

/// Deepest list marker (`.....`, `*****`)
const MAX_MARKER_DEPTH: u32 = 5;

pub(crate) struct AsciiDocEmitter;

pub(crate) static EMITTER: AsciiDocEmitter = AsciiDocEmitter;

/// Convert a document to AsciiDoc.
///
/// # Errors
///
/// Returns [`crate::ConvertError::InvalidOptions`] for rejected options and
/// [`crate::ConvertError::Internal`] when the conversion panics.
pub fn convert(document: &Document, options: &ConversionOptions) -> ConvertResult<ConversionResult> {
    convert_with(document, options, &Substitutions::default())
}

/// Convert a document to AsciiDoc with variable, snippet and
/// cross-reference substitutions.
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

impl Emitter for AsciiDocEmitter {
    fn format(&self) -> TargetFormat {
        TargetFormat::AsciiDoc
    }

    fn text(&self, text: &str) -> String {
        escape_asciidoc(text).into_owned()
    }

    fn positioned_text(&self, text: &str, opens_line: &dyn Fn() -> bool) -> String {
        let escaped = escape_asciidoc(text);
        if opens_asciidoc_block(&escaped) && opens_line() {
            guard_asciidoc_line(&escaped)
        } else {
            escaped.into_owned()
        }
    }

    fn emit(&self, walker: &Walker<'_>, rule: Rule, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        let doc = walker.doc;
        match rule {
            Rule::Skip => String::new(),
            Rule::Admonition(kind) => self.admonition(walker, kind, id, ctx),
            Rule::Collapsible => self.collapsible(walker, id, ctx),
            Rule::Snippet => self.snippet(walker, id, ctx),
            Rule::Variable => match resolve_variable(doc, id, TargetFormat::AsciiDoc, ctx) {
                VariableUse::Attribute(name) => format!("{{{name}}}"),
                VariableUse::Value(value) => value,
                VariableUse::Unresolved => walker.walk_children(id, ctx),
            },
            Rule::CrossReference => {
                let (href, text) = cross_reference(walker, id, ctx);
                match href {
                    Some(href) => self.link(&href, &text, ctx),
                    None => text,
                }
            }
            Rule::CodeBlock => self.code_block(doc, id),
            Rule::Figure => self.figure(walker, id, ctx),
            Rule::Keyboard => {
                let keys = doc.text_content(id);
                if keys.is_empty() {
                    String::new()
                } else {
                    format!("kbd:[{}]", escape_brackets(&keys))
                }
            }
            Rule::Generic(tag) => self.generic(walker, tag, id, ctx),
        }
    }

    fn heading(&self, level: u8, text: &str, anchor: Option<&str>) -> String {
        let marks = "=".repeat((usize::from(level) + 1).min(6));
        match anchor {
            Some(anchor) => format!("\n\n[[{anchor}]]\n{marks} {text}\n\n"),
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
        wrap_inline(text, "*", "*")
    }

    fn emphasis(&self, text: &str) -> String {
        wrap_inline(text, "_", "_")
    }

    fn code_span(&self, text: &str) -> String {
        code_literal(text, false)
    }

    fn link(&self, href: &str, text: &str, ctx: &mut ConversionContext<'_>) -> String {
        let Some(target) = resolve_href(href, TargetFormat::AsciiDoc, ctx) else {
            return text.to_string();
        };
        let label = escape_brackets(&single_line(text));

        if let Some(fragment) = target.strip_prefix('#') {
            if fragment.is_empty() {
                return text.to_string();
            }
            return if label.is_empty() {
                format!("<<{fragment}>>")
            } else {
                format!("<<{fragment},{label}>>")
            };
        }
        if target.to_ascii_lowercase().starts_with("mailto:") {
            return format!("{target}[{label}]");
        }

        let target = target.replace(' ', "%20");
        if is_external(&target) {
            if target.starts_with("//") {
                return format!("link:{target}[{label}]");
            }
            if label.is_empty() || label == target {
                return target;
            }
            return format!("{target}[{label}]");
        }

        let (path, _) = split_fragment(&target);
        if path.to_ascii_lowercase().ends_with(".adoc") {
            format!("xref:{target}[{label}]")
        } else {
            format!("link:{target}[{label}]")
        }
    }

    fn image(&self, image: &ImageRef) -> String {
        let src = image.src.replace(' ', "%20");
        let attributes = image_attributes(image);
        match image.placement {
            ImagePlacement::Inline => format!("image:{src}[{attributes}]"),
            ImagePlacement::Block => format!("\n\nimage::{src}[{attributes}]\n\n"),
        }
    }

    fn line_break(&self) -> String {
        " +\n".to_string()
    }

    fn truncated(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            format!("\n\n// [{TRUNCATION_NOTICE}]\n\n")
        } else {
            format!("\n\n{text}\n\n// [{TRUNCATION_NOTICE}]\n\n")
        }
    }

    fn render_list(&self, list: &ListBlock) -> String {
        let depth = (list.level + 1).min(MAX_MARKER_DEPTH) as usize;
        let mut out = String::new();
        if let Some(attributes) = list_attributes(list) {
            out.push_str(&format!("[{attributes}]\n"));
        }

        for item in &list.items {
            let text = if item.text.is_empty() { "{empty}" } else { item.text.as_str() };
            match list.kind {
                ListKind::Ordered => out.push_str(&format!("{} {text}\n", ".".repeat(depth))),
                ListKind::Unordered => out.push_str(&format!("{} {text}\n", "*".repeat(depth))),
                ListKind::Definition => {
                    let term = item.term.as_deref().filter(|t| !t.is_empty()).unwrap_or("{empty}");
                    let marker = definition_marker(list.level);
                    if item.text.is_empty() {
                        out.push_str(&format!("{term}{marker}\n"));
                    } else {
                        out.push_str(&format!("{term}{marker} {}\n", item.text));
                    }
                }
            }

            for block in &item.blocks {
                match block {
                    ItemBlock::Content(content) => {
                        out.push_str("+\n");
                        out.push_str(&attach_content(content));
                        out.push('\n');
                    }
                    ItemBlock::List(nested) => {
                        out.push_str(nested);
                        out.push('\n');
                    }
                    ItemBlock::Flattened(lines) => {
                        out.push_str("+\n--\n");
                        out.push_str(&flat_lines(lines));
                        out.push_str("\n--\n");
                    }
                }
            }
        }
        format!("\n\n{}\n\n", out.trim_end())
    }

    fn render_flattened(&self, lines: &[FlatLine]) -> String {
        format!("\n\n{}\n\n", flat_lines(lines))
    }

    fn render_table(&self, table: &Table, layout: &ColumnLayout, _ctx: &mut ConversionContext<'_>) -> String {
        let separator = if table.nested { '!' } else { '|' };
        let fence = format!("{separator}===");
        let mut out = String::new();

        if let Some(caption) = &table.caption {
            out.push_str(&format!(".{caption}\n"));
        }
        let mut attributes = vec![format!("cols=\"{}\"", cols_spec(layout))];
        if table.has_header() {
            attributes.push("options=\"header\"".to_string());
        }
        out.push_str(&format!("[{}]\n{fence}\n", attributes.join(", ")));

        // padding ragged rows is only safe when spans cannot account for them
        let pad = !table.has_spans();
        for (index, row) in table.rows.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            for cell in &row.cells {
                out.push_str(&render_cell(cell, row.is_header, separator));
                out.push('\n');
            }
            if pad {
                for _ in row.cells.len()..table.column_count {
                    out.push(separator);
                    out.push('\n');
                }
            }
        }
        out.push_str(&fence);
        format!("\n\n{out}\n\n")
    }

    fn document_title(&self, title: &str, _from_heading: bool) -> Option<String> {
        Some(format!("= {}", single_line(title)))
    }

    fn normalize(&self, text: &str) -> String {
        normalize_asciidoc(text)
    }
}

// ============================================================================
// Element handlers
// ============================================================================

impl AsciiDocEmitter {
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
            GenericTag::Strong => self.constrained(walker, id, ctx, "*", "*"),
            GenericTag::Emphasis => self.constrained(walker, id, ctx, "_", "_"),
            GenericTag::Underline => self.constrained(walker, id, ctx, "[.underline]#", "#"),
            GenericTag::Strikethrough => self.constrained(walker, id, ctx, "[.line-through]#", "#"),
            GenericTag::Subscript => {
                let content = walker.walk_children(id, ctx);
                wrap_inline(&content, "~", "~")
            }
            GenericTag::Superscript => {
                let content = walker.walk_children(id, ctx);
                wrap_inline(&content, "^", "^")
            }
            GenericTag::InlineCode => {
                let text = doc.text_content(id);
                let (before, after) = neighbour_chars(doc, id);
                code_literal(&text, touches_word(before, after))
            }
            GenericTag::Anchor => {
                let content = walker.walk_children(id, ctx);
                match doc.attr(id, "href") {
                    Some(href) => with_edges(&content, |core| self.link(href, core, ctx)),
                    None => match doc.attr(id, "id").or_else(|| doc.attr(id, "name")) {
                        Some(anchor) => format!("[[{anchor}]]{content}"),
                        None => content,
                    },
                }
            }
            GenericTag::Image => image_ref(doc, id, ctx)
                .map(|image| self.image(&image))
                .unwrap_or_default(),
            GenericTag::LineBreak => self.line_break(),
            GenericTag::HorizontalRule => "\n\n'''\n\n".to_string(),
            GenericTag::Blockquote => {
                let body = walker.walk_children(id, ctx);
                let body = body.trim();
                if body.is_empty() {
                    return String::new();
                }
                let delimiter = block_delimiter(body, '_', 4);
                format!("\n\n{delimiter}\n{body}\n{delimiter}\n\n")
            }
            GenericTag::List(_) => convert_list(walker, id, ctx),
            GenericTag::Table => convert_table(walker, id, ctx),
            GenericTag::ListItem | GenericTag::Block => {
                let body = walker.walk_children(id, ctx);
                let body = body.trim();
                if body.is_empty() {
                    return String::new();
                }
                match doc.attr(id, "id") {
                    Some(anchor) => format!("\n\n[[{anchor}]]\n{body}\n\n"),
                    None => format!("\n\n{body}\n\n"),
                }
            }
            GenericTag::Inline => {
                let content = walker.walk_children(id, ctx);
                match doc.attr(id, "id") {
                    Some(anchor) if !content.trim_start().starts_with('\n') => format!("[[{anchor}]]{content}"),
                    _ => content,
                }
            }
        }
    }

    /// Constrained marks (`*x*`) normally; unconstrained (`**x**`) when the
    /// element touches a word character
    fn constrained(
        &self,
        walker: &Walker<'_>,
        id: NodeId,
        ctx: &mut ConversionContext<'_>,
        open: &str,
        close: &str,
    ) -> String {
        let content = walker.walk_children(id, ctx);
        let (before, after) = neighbour_chars(walker.doc, id);
        if touches_word(before, after) {
            let open = match open.strip_suffix(close) {
                Some(role) => format!("{role}{close}{close}"),
                None => open.repeat(2),
            };
            wrap_inline(&content, &open, &close.repeat(2))
        } else {
            wrap_inline(&content, open, close)
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

        let label = kind.label();
        if !content.contains('\n') && !starts_block_syntax(content) {
            return format!("\n\n{label}: {content}\n\n");
        }
        let delimiter = block_delimiter(content, '=', 4);
        format!("\n\n[{label}]\n{delimiter}\n{content}\n{delimiter}\n\n")
    }

    fn collapsible(&self, walker: &Walker<'_>, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        if ctx.options.use_collapsible_blocks {
            let (title, body) = collapsible_parts(walker, id, ctx);
            if body.is_empty() {
                return self.paragraph(&title);
            }
            let delimiter = block_delimiter(&body, '=', 4);
            return format!("\n\n.{title}\n[%collapsible]\n{delimiter}\n{body}\n{delimiter}\n\n");
        }

        // headings inside the body nest under the section heading
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

    fn snippet(&self, walker: &Walker<'_>, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        let block = is_block_snippet(walker.doc, id);
        let content = match resolve_snippet(walker.doc, id, ctx) {
            Some(text) => text.to_string(),
            None => walker.walk_children(id, ctx),
        };
        let body = content.trim();
        if body.is_empty() {
            String::new()
        } else if block {
            format!("\n\n{body}\n\n")
        } else {
            body.to_string()
        }
    }

    fn code_block(&self, doc: &Document, id: NodeId) -> String {
        let code = code_text(doc, id);
        if code.trim().is_empty() {
            return String::new();
        }
        let delimiter = block_delimiter(&code, '-', 4);
        match code_language(doc, id) {
            Some(language) => format!("\n\n[source,{language}]\n{delimiter}\n{code}\n{delimiter}\n\n"),
            None => format!("\n\n{delimiter}\n{code}\n{delimiter}\n\n"),
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
            format!("\n\n.{caption}\n{}\n\n", rendered.trim())
        }
    }
}

// ============================================================================
// Syntax helpers
// ============================================================================

fn escape_brackets(text: &str) -> String {
    text.replace(']', "\\]")
}

/// Monospace literal; passthrough form when the text holds markup characters
fn code_literal(text: &str, unconstrained: bool) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    let marks = if unconstrained { "``" } else { "`" };
    if text.contains(['*', '_', '`', '#', '^', '~', '{', '[', '<', '+']) && !text.contains("+`") {
        format!("{marks}+{text}+{marks}")
    } else {
        format!("{marks}{text}{marks}")
    }
}

/// Content AsciiDoc would read as a block if placed after `NOTE: `
fn starts_block_syntax(content: &str) -> bool {
    ["* ", ". ", "- ", "[", "|===", "image::", "----", "....", "= ", "//"]
        .iter()
        .any(|prefix| content.starts_with(prefix))
}

fn image_attributes(image: &ImageRef) -> String {
    let mut parts = vec![quote_attribute(&image.alt)];
    match (image.width, image.height) {
        (Some(width), Some(height)) => {
            parts.push(width.to_string());
            parts.push(height.to_string());
        }
        (Some(width), None) => parts.push(width.to_string()),
        (None, Some(height)) => {
            parts.push(String::new());
            parts.push(height.to_string());
        }
        (None, None) => {}
    }
    if let Some(title) = &image.title
        && title != &image.alt
        && !title.is_empty()
    {
        parts.push(format!("title={}", quote_attribute(title)));
    }
    while parts.len() > 1 && parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    if parts.len() == 1 && parts[0].is_empty() {
        return String::new();
    }
    parts.join(",")
}

/// Quote an attribute value that would otherwise split the attribute list
fn quote_attribute(value: &str) -> String {
    if value.contains([',', '"', ']', '=']) {
        format!("\"{}\"", value.replace('"', "\\\"").replace(']', "\\]"))
    } else {
        value.to_string()
    }
}

/// Block attribute line for a list: lettered style and start number
fn list_attributes(list: &ListBlock) -> Option<String> {
    let mut attributes: Vec<String> = Vec::new();
    match list.kind {
        ListKind::Ordered => {
            if let Some(style) = list.style.and_then(ordered_style_name) {
                attributes.push(style.to_string());
            }
            if let Some(start) = list.start {
                attributes.push(format!("start={start}"));
            }
        }
        ListKind::Unordered => {
            let style = match list.style {
                Some(ListStyle::Square) => Some("square"),
                Some(ListStyle::Circle) => Some("circle"),
                Some(ListStyle::None) => Some("none"),
                _ => None,
            };
            attributes.extend(style.map(str::to_string));
        }
        ListKind::Definition => {}
    }
    (!attributes.is_empty()).then(|| attributes.join(","))
}

fn ordered_style_name(style: ListStyle) -> Option<&'static str> {
    match style {
        ListStyle::LowerAlpha => Some("loweralpha"),
        ListStyle::UpperAlpha => Some("upperalpha"),
        ListStyle::LowerRoman => Some("lowerroman"),
        ListStyle::UpperRoman => Some("upperroman"),
        _ => None,
    }
}

fn definition_marker(level: u32) -> &'static str {
    match level {
        0 => "::",
        1 => ":::",
        2 => "::::",
        _ => ";;",
    }
}

/// Attach multi-paragraph content to a list item.
///
/// Content is wrapped in an open block; content that already holds one gets
/// a `+` in place of each top-level blank line instead, since open blocks
/// cannot nest.
fn attach_content(content: &str) -> String {
    if !content.contains("\n\n") {
        return content.to_string();
    }
    if !content.lines().any(|line| line.trim_end() == "--") {
        return format!("--\n{content}\n--");
    }

    let mut open: Vec<&str> = Vec::new();
    let mut out: Vec<&str> = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim_end();
        if open.is_empty() && trimmed.is_empty() {
            if out.last() != Some(&"+") {
                out.push("+");
            }
            continue;
        }
        if is_block_delimiter(trimmed) {
            match open.last() {
                Some(&top) if top == trimmed => {
                    open.pop();
                }
                // listing content cannot open nested blocks
                Some(top) if top.starts_with(['-', '.', '+', '/']) && top.len() >= 4 => {}
                _ => open.push(trimmed),
            }
        }
        out.push(line);
    }
    out.join("\n")
}

fn is_block_delimiter(line: &str) -> bool {
    if line == "--" || line == "|===" || line == "!===" {
        return true;
    }
    let Some(first) = line.chars().next() else {
        return false;
    };
    matches!(first, '-' | '.' | '=' | '*' | '_' | '+' | '/') && line.len() >= 4 && line.chars().all(|c| c == first)
}

fn flat_lines(lines: &[FlatLine]) -> String {
    lines
        .iter()
        .map(|line| match line {
            FlatLine::Bullet(text) => format!("* {text}"),
            FlatLine::Raw(text) => text.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn cols_spec(layout: &ColumnLayout) -> String {
    layout
        .widths
        .iter()
        .zip(&layout.alignments)
        .map(|(width, alignment)| format!("{}{width}", alignment_mark(*alignment)))
        .collect::<Vec<_>>()
        .join(",")
}

fn alignment_mark(alignment: Option<Alignment>) -> &'static str {
    match alignment {
        Some(Alignment::Center) => "^",
        Some(Alignment::Right) => ">",
        Some(Alignment::Left) | None => "",
    }
}

/// One cell with its specifier prefix: span, alignment, style
fn render_cell(cell: &TableCell, in_header_row: bool, separator: char) -> String {
    let mut spec = String::new();
    match (cell.colspan, cell.rowspan) {
        (Some(cols), Some(rows)) => spec.push_str(&format!("{cols}.{rows}+")),
        (Some(cols), None) => spec.push_str(&format!("{cols}+")),
        (None, Some(rows)) => spec.push_str(&format!(".{rows}+")),
        (None, None) => {}
    }
    spec.push_str(alignment_mark(cell.alignment));

    let style = if cell.is_block {
        Some('a')
    } else if cell.is_header && !in_header_row {
        Some('h')
    } else {
        cell.format.map(|format| match format {
            CellFormat::Strong => 's',
            CellFormat::Emphasis => 'e',
            CellFormat::Monospace => 'm',
        })
    };
    spec.extend(style);

    let content = cell.content.replace(separator, &format!("\\{separator}"));
    if content.is_empty() {
        format!("{spec}{separator}")
    } else if cell.is_block {
        format!("{spec}{separator}\n{content}")
    } else {
        format!("{spec}{separator} {content}")
    }
}
