//! Sanitized HTML emitter
//!
//! Output is a fragment built only from the elements and attributes this
//! module writes itself; nothing is copied through from the source. Callouts,
//! code blocks and tables carry inline `style` attributes so the fragment
//! renders the same without a stylesheet.

use super::{
    Emitter, ImageRef, VariableUse, code_language, code_text, collapsible_parts, cross_reference, image_ref,
    is_block_snippet, resolve_href, resolve_snippet, resolve_variable, strip_admonition_label, with_edges,
};
use crate::config::{Alignment, ConversionOptions, TargetFormat};
use crate::converter::context::{ConversionContext, Substitutions};
use crate::converter::guard::TRUNCATION_NOTICE;
use crate::converter::list_processing::{FlatLine, ItemBlock, ListBlock, ListKind, ListStyle, convert_list};
use crate::converter::postprocessing::normalize_html;
use crate::converter::resolver::ImagePlacement;
use crate::converter::rules::{AdmonitionKind, GenericTag, Rule};
use crate::converter::table::{CellFormat, ColumnLayout, Table, TableCell, convert_table};
use crate::converter::text_util::{escape_html, escape_html_attr, single_line, wrap_inline};
use crate::converter::walker::Walker;
use crate::converter::{ConversionResult, run};
use crate::error::ConvertResult;
use crate::tree::{Document, NodeId};

// ============================================================================
// Inline styles
// ============================================================================

const CODE_BLOCK_STYLE: &str =
    "background-color: #f6f8fa; padding: 12px; border-radius: 4px; overflow-x: auto; font-family: monospace";
const CODE_SPAN_STYLE: &str = "background-color: #f6f8fa; padding: 1px 4px; border-radius: 3px; font-family: monospace";
const BLOCKQUOTE_STYLE: &str = "margin: 0 0 1em 0; padding-left: 12px; border-left: 4px solid #d0d7de; color: #57606a";
const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%";
const CELL_STYLE: &str = "border: 1px solid #d0d7de; padding: 6px 12px; vertical-align: top";
const DETAILS_STYLE: &str = "margin: 1em 0; padding: 8px 12px; border: 1px solid #d0d7de; border-radius: 4px";
const BLOCK_IMAGE_STYLE: &str = "display: block; max-width: 100%";

/// Accent color of a callout box
fn admonition_color(kind: AdmonitionKind) -> &'static str {
    match kind {
        AdmonitionKind::Note => "#0969da",
        AdmonitionKind::Tip => "#1a7f37",
        AdmonitionKind::Important => "#8250df",
        AdmonitionKind::Warning => "#9a6700",
        AdmonitionKind::Caution => "#cf222e",
    }
}

pub(crate) struct HtmlEmitter;

pub(crate) static EMITTER: HtmlEmitter = HtmlEmitter;

/// Convert a document to a sanitized HTML fragment.
///
/// # Errors
///
/// Returns [`crate::ConvertError::InvalidOptions`] for rejected options and
/// [`crate::ConvertError::Internal`] when the conversion panics.
pub fn convert(document: &Document, options: &ConversionOptions) -> ConvertResult<ConversionResult> {
    convert_with(document, options, &Substitutions::default())
}

/// Convert a document to a sanitized HTML fragment with substitutions.
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

impl Emitter for HtmlEmitter {
    fn format(&self) -> TargetFormat {
        TargetFormat::Html
    }

    fn text(&self, text: &str) -> String {
        escape_html(text).into_owned()
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
            Rule::Variable => match resolve_variable(doc, id, TargetFormat::Html, ctx) {
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
                let code = escape_html(&code);
                match code_language(doc, id) {
                    Some(language) => format!(
                        "\n\n<pre style=\"{CODE_BLOCK_STYLE}\"><code class=\"language-{}\">{code}</code></pre>\n\n",
                        escape_html_attr(&language)
                    ),
                    None => format!("\n\n<pre style=\"{CODE_BLOCK_STYLE}\"><code>{code}</code></pre>\n\n"),
                }
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
        let level = level.clamp(1, 6);
        match anchor {
            Some(anchor) => format!(
                "\n\n<h{level} id=\"{}\">{text}</h{level}>\n\n",
                escape_html_attr(anchor)
            ),
            None => format!("\n\n<h{level}>{text}</h{level}>\n\n"),
        }
    }

    fn paragraph(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            String::new()
        } else if starts_with_block(text) {
            format!("\n\n{text}\n\n")
        } else {
            format!("\n\n<p>{text}</p>\n\n")
        }
    }

    fn strong(&self, text: &str) -> String {
        wrap_inline(text, "<strong>", "</strong>")
    }

    fn emphasis(&self, text: &str) -> String {
        wrap_inline(text, "<em>", "</em>")
    }

    fn code_span(&self, text: &str) -> String {
        let text = single_line(text);
        if text.is_empty() {
            String::new()
        } else {
            format!("<code style=\"{CODE_SPAN_STYLE}\">{}</code>", escape_html(&text))
        }
    }

    fn link(&self, href: &str, text: &str, ctx: &mut ConversionContext<'_>) -> String {
        let Some(target) = resolve_href(href, TargetFormat::Html, ctx) else {
            return text.to_string();
        };
        let label = if text.trim().is_empty() {
            escape_html(&target).into_owned()
        } else {
            text.trim().to_string()
        };
        format!("<a href=\"{}\">{label}</a>", escape_html_attr(&target))
    }

    fn image(&self, image: &ImageRef) -> String {
        let mut tag = format!(
            "<img src=\"{}\" alt=\"{}\"",
            escape_html_attr(&image.src),
            escape_html_attr(&image.alt)
        );
        if let Some(width) = image.width {
            tag.push_str(&format!(" width=\"{width}\""));
        }
        if let Some(height) = image.height {
            tag.push_str(&format!(" height=\"{height}\""));
        }
        if let Some(title) = image.title.as_deref().filter(|t| !t.is_empty()) {
            tag.push_str(&format!(" title=\"{}\"", escape_html_attr(title)));
        }
        match image.placement {
            ImagePlacement::Inline => format!("{tag}>"),
            ImagePlacement::Block => format!("\n\n{tag} style=\"{BLOCK_IMAGE_STYLE}\">\n\n"),
        }
    }

    fn line_break(&self) -> String {
        "<br>\n".to_string()
    }

    fn truncated(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            format!("\n\n<!-- {TRUNCATION_NOTICE} -->\n\n")
        } else {
            format!("\n\n<p>{text}</p>\n<!-- {TRUNCATION_NOTICE} -->\n\n")
        }
    }

    fn render_list(&self, list: &ListBlock) -> String {
        let (open, close) = list_tags(list);
        let mut out = format!("{open}\n");

        for item in &list.items {
            let blocks = item
                .blocks
                .iter()
                .map(|block| match block {
                    ItemBlock::Content(content) | ItemBlock::List(content) => content.clone(),
                    ItemBlock::Flattened(lines) => flat_list(lines),
                })
                .collect::<Vec<_>>();

            if list.kind == ListKind::Definition {
                if let Some(term) = item.term.as_deref().filter(|t| !t.is_empty()) {
                    out.push_str(&format!("<dt>{term}</dt>\n"));
                }
                out.push_str(&list_entry("dd", &item.text, &blocks));
            } else {
                out.push_str(&list_entry("li", &item.text, &blocks));
            }
        }
        out.push_str(close);
        format!("\n\n{out}\n\n")
    }

    fn render_flattened(&self, lines: &[FlatLine]) -> String {
        format!("\n\n{}\n\n", flat_list(lines))
    }

    fn render_table(&self, table: &Table, layout: &ColumnLayout, _ctx: &mut ConversionContext<'_>) -> String {
        let mut out = format!("<table style=\"{TABLE_STYLE}\">\n");
        if let Some(caption) = &table.caption {
            out.push_str(&format!("<caption>{caption}</caption>\n"));
        }

        out.push_str("<colgroup>");
        for column in 0..layout.widths.len() {
            out.push_str(&format!("<col style=\"width: {}%\">", layout.percent(column)));
        }
        out.push_str("</colgroup>\n");

        let (head, body) = table.rows.split_at(usize::from(table.has_header()));
        for (section, rows) in [("thead", head), ("tbody", body)] {
            if rows.is_empty() {
                continue;
            }
            out.push_str(&format!("<{section}>\n"));
            for row in rows {
                out.push_str("<tr>");
                for cell in &row.cells {
                    out.push_str(&render_cell(cell, row.is_header, layout));
                }
                out.push_str("</tr>\n");
            }
            out.push_str(&format!("</{section}>\n"));
        }
        out.push_str("</table>");
        format!("\n\n{out}\n\n")
    }

    fn document_title(&self, title: &str, from_heading: bool) -> Option<String> {
        // a heading title is already part of the body
        (!from_heading).then(|| format!("<h1>{}</h1>", escape_html(&single_line(title))))
    }

    fn normalize(&self, text: &str) -> String {
        normalize_html(text)
    }
}

// ============================================================================
// Element handlers
// ============================================================================

impl HtmlEmitter {
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
            GenericTag::Underline => self.wrapped(walker, id, ctx, "u"),
            GenericTag::Strikethrough => self.wrapped(walker, id, ctx, "s"),
            GenericTag::Subscript => self.wrapped(walker, id, ctx, "sub"),
            GenericTag::Superscript => self.wrapped(walker, id, ctx, "sup"),
            GenericTag::InlineCode => self.code_span(&doc.text_content(id)),
            GenericTag::Anchor => {
                let content = walker.walk_children(id, ctx);
                match doc.attr(id, "href") {
                    Some(href) => with_edges(&content, |core| self.link(href, core, ctx)),
                    None => match doc.attr(id, "id").or_else(|| doc.attr(id, "name")) {
                        Some(anchor) => format!("<a id=\"{}\"></a>{content}", escape_html_attr(anchor)),
                        None => content,
                    },
                }
            }
            GenericTag::Image => image_ref(doc, id, ctx)
                .map(|image| self.image(&image))
                .unwrap_or_default(),
            GenericTag::LineBreak => self.line_break(),
            GenericTag::HorizontalRule => "\n\n<hr>\n\n".to_string(),
            GenericTag::Blockquote => {
                let body = walker.walk_children(id, ctx);
                let body = body.trim();
                if body.is_empty() {
                    return String::new();
                }
                format!("\n\n<blockquote style=\"{BLOCKQUOTE_STYLE}\">\n{}\n</blockquote>\n\n", as_blocks(body))
            }
            GenericTag::List(_) => convert_list(walker, id, ctx),
            GenericTag::Table => convert_table(walker, id, ctx),
            GenericTag::ListItem | GenericTag::Block => {
                let rendered = walker.walk_children(id, ctx);
                let body = rendered.trim();
                if body.is_empty() {
                    return String::new();
                }
                match doc.attr(id, "id") {
                    Some(anchor) => format!(
                        "\n\n<div id=\"{}\">\n{}\n</div>\n\n",
                        escape_html_attr(anchor),
                        as_blocks(body)
                    ),
                    None if is_inline(&rendered) => self.paragraph(body),
                    None => format!("\n\n{body}\n\n"),
                }
            }
            GenericTag::Inline => {
                let content = walker.walk_children(id, ctx);
                match doc.attr(id, "id") {
                    Some(anchor) if is_inline(&content) => {
                        format!("<span id=\"{}\">{content}</span>", escape_html_attr(anchor))
                    }
                    _ => content,
                }
            }
        }
    }

    fn wrapped(&self, walker: &Walker<'_>, id: NodeId, ctx: &mut ConversionContext<'_>, tag: &str) -> String {
        let content = walker.walk_children(id, ctx);
        wrap_inline(&content, &format!("<{tag}>"), &format!("</{tag}>"))
    }

    fn admonition(
        &self,
        walker: &Walker<'_>,
        kind: AdmonitionKind,
        id: NodeId,
        ctx: &mut ConversionContext<'_>,
    ) -> String {
        let rendered = walker.walk_children(id, ctx);
        let content = rendered.trim();
        let content = match content.strip_prefix("<p>") {
            Some(rest) => format!("<p>{}", strip_admonition_label(rest).trim_start()),
            None => strip_admonition_label(content).trim().to_string(),
        };
        if content.is_empty() || content == "<p></p>" {
            return String::new();
        }

        let color = admonition_color(kind);
        format!(
            "\n\n<div class=\"admonition {}\" style=\"margin: 1em 0; padding: 8px 12px; border-left: 4px solid {color}; background-color: #f6f8fa\">\n<p style=\"margin: 0 0 4px 0; font-weight: bold; color: {color}\">{}</p>\n{}\n</div>\n\n",
            kind.title().to_ascii_lowercase(),
            kind.title(),
            as_blocks(&content)
        )
    }

    fn collapsible(&self, walker: &Walker<'_>, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
        if ctx.options.use_collapsible_blocks {
            let (title, body) = collapsible_parts(walker, id, ctx);
            let body = if body.is_empty() { String::new() } else { format!("\n{}", as_blocks(&body)) };
            return format!("\n\n<details style=\"{DETAILS_STYLE}\">\n<summary>{title}</summary>{body}\n</details>\n\n");
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
            format!("{heading}{}\n\n", as_blocks(&body))
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
        image.placement = ImagePlacement::Inline;

        let caption = doc
            .find_descendant(id, "figcaption")
            .map(|c| single_line(&walker.walk_children(c, ctx)))
            .unwrap_or_default();
        let rendered = self.image(&image);
        if caption.is_empty() {
            format!("\n\n<figure>\n{rendered}\n</figure>\n\n")
        } else {
            format!("\n\n<figure>\n{rendered}\n<figcaption>{caption}</figcaption>\n</figure>\n\n")
        }
    }
}

// ============================================================================
// Markup helpers
// ============================================================================

/// Rendered output that does not open with a block
fn is_inline(rendered: &str) -> bool {
    !rendered.trim_start_matches([' ', '\t']).starts_with('\n')
}

const BLOCK_OPENERS: &[&str] = &[
    "<p", "<div", "<ul", "<ol", "<dl", "<table", "<pre", "<blockquote", "<h1", "<h2", "<h3", "<h4", "<h5", "<h6",
    "<figure", "<details", "<hr", "<img",
];

fn starts_with_block(text: &str) -> bool {
    BLOCK_OPENERS.iter().any(|opener| {
        text.strip_prefix(opener)
            .is_some_and(|rest| rest.starts_with(['>', ' ']))
    })
}

/// Content as block markup: bare inline text gets a paragraph
fn as_blocks(content: &str) -> String {
    let content = content.trim();
    if content.is_empty() || starts_with_block(content) {
        content.to_string()
    } else {
        match content.split_once("\n\n") {
            Some((head, rest)) if !starts_with_block(head) => format!("<p>{}</p>\n{}", head.trim(), as_blocks(rest)),
            _ => format!("<p>{content}</p>"),
        }
    }
}

fn list_tags(list: &ListBlock) -> (String, &'static str) {
    match list.kind {
        ListKind::Definition => ("<dl>".to_string(), "</dl>"),
        ListKind::Unordered => {
            let style = match list.style {
                Some(ListStyle::Circle) => " style=\"list-style-type: circle\"",
                Some(ListStyle::Square) => " style=\"list-style-type: square\"",
                Some(ListStyle::None) => " style=\"list-style-type: none\"",
                _ => "",
            };
            (format!("<ul{style}>"), "</ul>")
        }
        ListKind::Ordered => {
            let mut open = String::from("<ol");
            let kind = match list.style {
                Some(ListStyle::LowerAlpha) => Some("a"),
                Some(ListStyle::UpperAlpha) => Some("A"),
                Some(ListStyle::LowerRoman) => Some("i"),
                Some(ListStyle::UpperRoman) => Some("I"),
                _ => None,
            };
            if let Some(kind) = kind {
                open.push_str(&format!(" type=\"{kind}\""));
            }
            if let Some(start) = list.start {
                open.push_str(&format!(" start=\"{start}\""));
            }
            open.push('>');
            (open, "</ol>")
        }
    }
}

fn list_entry(tag: &str, text: &str, blocks: &[String]) -> String {
    if blocks.is_empty() {
        return format!("<{tag}>{text}</{tag}>\n");
    }
    let mut out = format!("<{tag}>{text}");
    for block in blocks {
        out.push('\n');
        out.push_str(&as_blocks(block));
    }
    out.push_str(&format!("\n</{tag}>\n"));
    out
}

fn flat_list(lines: &[FlatLine]) -> String {
    let mut out = String::from("<ul>\n");
    for line in lines {
        match line {
            FlatLine::Bullet(text) => out.push_str(&format!("<li>{text}</li>\n")),
            FlatLine::Raw(text) => out.push_str(&format!("<li>{}</li>\n", text.trim())),
        }
    }
    out.push_str("</ul>");
    out
}

fn render_cell(cell: &TableCell, in_header_row: bool, layout: &ColumnLayout) -> String {
    let tag = if cell.is_header || in_header_row { "th" } else { "td" };
    let mut attributes = String::new();
    if let Some(colspan) = cell.colspan {
        attributes.push_str(&format!(" colspan=\"{colspan}\""));
    }
    if let Some(rowspan) = cell.rowspan {
        attributes.push_str(&format!(" rowspan=\"{rowspan}\""));
    }

    let alignment = cell
        .alignment
        .or_else(|| layout.alignments.get(cell.column).copied().flatten());
    let mut style = String::from(CELL_STYLE);
    match alignment {
        Some(Alignment::Center) => style.push_str("; text-align: center"),
        Some(Alignment::Right) => style.push_str("; text-align: right"),
        Some(Alignment::Left) => style.push_str("; text-align: left"),
        None => {}
    }

    let content = match cell.format {
        _ if cell.content.is_empty() => String::new(),
        Some(CellFormat::Strong) => format!("<strong>{}</strong>", cell.content),
        Some(CellFormat::Emphasis) => format!("<em>{}</em>", cell.content),
        Some(CellFormat::Monospace) => format!("<code style=\"{CODE_SPAN_STYLE}\">{}</code>", cell.content),
        None if cell.is_block => format!("\n{}\n", as_blocks(&cell.content)),
        None => cell.content.clone(),
    };
    format!("<{tag}{attributes} style=\"{style}\">{content}</{tag}>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn to_html(node: Node) -> String {
        let doc = Document::from_node(node);
        convert(&doc, &ConversionOptions::default())
            .expect("Test operation should succeed")
            .content
    }

    #[test]
    fn test_text_is_escaped() {
        let out = to_html(Node::element("p", vec![Node::text("1 < 2 & 3")]));
        assert_eq!(out, "<p>1 &lt; 2 &amp; 3</p>\n");
    }

    #[test]
    fn test_source_attributes_are_not_copied() {
        let out = to_html(
            Node::element("p", vec![Node::text("hi")])
                .with_attr("onclick", "steal()")
                .with_attr("class", "fancy"),
        );
        assert_eq!(out, "<p>hi</p>\n");
    }

    #[test]
    fn test_script_links_dropped() {
        let out = to_html(Node::element(
            "p",
            vec![Node::element("a", vec![Node::text("click")]).with_attr("href", "javascript:alert(1)")],
        ));
        assert_eq!(out, "<p>click</p>\n");
    }

    #[test]
    fn test_link_rewritten_and_escaped() {
        let out = to_html(Node::element(
            "p",
            vec![Node::element("a", vec![Node::text("Next")]).with_attr("href", "next.htm?a=1&b=2")],
        ));
        assert_eq!(out, "<p><a href=\"next.html?a=1&amp;b=2\">Next</a></p>\n");
    }

    #[test]
    fn test_heading_keeps_id_and_title_is_not_duplicated() {
        let doc = Document::from_node(Node::element(
            "body",
            vec![Node::element("h1", vec![Node::text("Guide")]).with_attr("id", "top")],
        ));
        let result = convert(&doc, &ConversionOptions::default()).expect("Test operation should succeed");
        assert_eq!(result.content, "<h1 id=\"top\">Guide</h1>\n");
        assert_eq!(result.metadata.title.as_deref(), Some("Guide"));
    }

    #[test]
    fn test_table_spans_and_widths() {
        let out = to_html(Node::element(
            "table",
            vec![
                Node::element(
                    "tr",
                    vec![Node::element("th", vec![Node::text("Both")]).with_attr("colspan", "2")],
                ),
                Node::element(
                    "tr",
                    vec![
                        Node::element("td", vec![Node::text("a")]),
                        Node::element("td", vec![Node::text("b")]),
                    ],
                ),
            ],
        ));
        assert!(out.contains("<colgroup><col style=\"width: 50%\"><col style=\"width: 50%\"></colgroup>"));
        assert!(out.contains("<thead>\n<tr><th colspan=\"2\""));
        assert!(out.contains(">a</td>"));
    }

    #[test]
    fn test_admonition_box() {
        let out = to_html(
            Node::element(
                "p",
                vec![Node::element("b", vec![Node::text("Note:")]), Node::text(" Save often.")],
            )
            .with_attr("class", "note"),
        );
        assert!(out.starts_with("<div class=\"admonition note\""));
        assert!(out.contains("<p>Save often.</p>"));
        assert!(!out.contains("Note:"));
    }

    #[test]
    fn test_code_block_escaped() {
        let out = to_html(Node::element("pre", vec![Node::text("if a < b {\n}")]));
        assert_eq!(
            out,
            format!("<pre style=\"{CODE_BLOCK_STYLE}\"><code>if a &lt; b {{\n}}</code></pre>\n")
        );
    }

    #[test]
    fn test_as_blocks_wraps_inline_runs() {
        assert_eq!(as_blocks("one\n\n<ul>\n<li>x</li>\n</ul>"), "<p>one</p>\n<ul>\n<li>x</li>\n</ul>");
        assert_eq!(as_blocks("<p>done</p>"), "<p>done</p>");
    }
}
