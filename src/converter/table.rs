//! Table extraction and column layout
//!
//! A `<table>` is read once into a [`Table`] of [`TableRow`]s and
//! [`TableCell`]s, placed on an occupancy grid so colspan and rowspan give a
//! consistent column count, and then rendered by the emitter from the
//! extracted grid plus a [`ColumnLayout`]. Nothing is mutated after
//! extraction.

use super::context::ConversionContext;
use super::text_util::single_line;
use super::walker::Walker;
use crate::config::{Alignment, TableLayout};
use crate::tree::{Document, NodeId, style_property};

// ============================================================================
// Grid Limits
// ============================================================================

/// Maximum grid columns; larger colspans are clamped
const MAX_GRID_COLS: usize = 100;

/// Maximum rowspan honoured for a single cell
const MAX_ROWSPAN: u32 = 1000;

// ============================================================================
// Data Structures
// ============================================================================

/// Inline format applied to a whole cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellFormat {
    Strong,
    Emphasis,
    Monospace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableCell {
    pub(crate) content: String,
    pub(crate) is_header: bool,
    pub(crate) colspan: Option<u32>,
    pub(crate) rowspan: Option<u32>,
    pub(crate) alignment: Option<Alignment>,
    pub(crate) format: Option<CellFormat>,
    /// Content holds block structure (lists, paragraphs, code, tables)
    pub(crate) is_block: bool,
    /// First grid column covered by this cell
    pub(crate) column: usize,
}

impl TableCell {
    #[inline]
    pub(crate) fn span_cols(&self) -> usize {
        self.colspan.unwrap_or(1) as usize
    }

    #[inline]
    pub(crate) fn has_span(&self) -> bool {
        self.colspan.is_some() || self.rowspan.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableRow {
    pub(crate) cells: Vec<TableCell>,
    pub(crate) is_header: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Table {
    pub(crate) rows: Vec<TableRow>,
    pub(crate) column_count: usize,
    pub(crate) caption: Option<String>,
    /// Table sits inside another table's cell
    pub(crate) nested: bool,
}

impl Table {
    /// Whether the first row is a header row
    pub(crate) fn has_header(&self) -> bool {
        self.rows.first().is_some_and(|row| row.is_header)
    }

    pub(crate) fn has_spans(&self) -> bool {
        self.rows
            .iter()
            .any(|row| row.cells.iter().any(TableCell::has_span))
    }
}

/// Relative column widths and default alignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnLayout {
    pub(crate) widths: Vec<u32>,
    pub(crate) alignments: Vec<Option<Alignment>>,
}

impl ColumnLayout {
    /// Width of one column as a percentage of the total
    pub(crate) fn percent(&self, column: usize) -> u32 {
        let total: u64 = self.widths.iter().map(|&w| u64::from(w)).sum();
        match (self.widths.get(column), total) {
            // at most 100, so the narrowing is lossless
            (Some(&w), t) if t > 0 => ((u64::from(w) * 100 + t / 2) / t) as u32,
            _ => 0,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Convert a `<table>` element.
///
/// # Returns
///
/// Rendered table text; an empty string for a table with no rows
pub(crate) fn convert_table(walker: &Walker<'_>, id: NodeId, ctx: &mut ConversionContext<'_>) -> String {
    ctx.table_depth += 1;
    let table = extract_table(walker, id, ctx);
    ctx.table_depth -= 1;

    let Some(table) = table else {
        tracing::debug!("Skipping table without rows");
        return String::new();
    };

    let layout = column_layout(&table, ctx);
    walker.emitter.render_table(&table, &layout, ctx)
}

// ============================================================================
// Extraction
// ============================================================================

fn extract_table(walker: &Walker<'_>, id: NodeId, ctx: &mut ConversionContext<'_>) -> Option<Table> {
    let doc = walker.doc;
    let mut head: Vec<TableRow> = Vec::new();
    let mut body: Vec<TableRow> = Vec::new();
    let mut foot: Vec<TableRow> = Vec::new();
    let mut caption = None;

    for child in doc.element_children(id) {
        match doc.tag(child) {
            Some("caption") => {
                let text = single_line(&walker.walk_children(child, ctx));
                if !text.is_empty() {
                    caption = Some(text);
                }
            }
            Some("thead") => {
                for tr in doc.element_children(child).filter(|&r| doc.is_tag(r, "tr")) {
                    push_row(walker, tr, true, ctx, &mut head);
                }
            }
            Some(section @ ("tbody" | "tfoot")) => {
                let target = if section == "tfoot" { &mut foot } else { &mut body };
                for tr in doc.element_children(child).filter(|&r| doc.is_tag(r, "tr")) {
                    push_row(walker, tr, false, ctx, target);
                }
            }
            Some("tr") => push_row(walker, child, false, ctx, &mut body),
            _ => {}
        }
    }

    // header rows lead and footer rows close whatever their source position
    let mut rows = head;
    rows.append(&mut body);
    rows.append(&mut foot);

    if rows.is_empty() {
        return None;
    }

    let column_count = place_on_grid(&mut rows);
    Some(Table {
        rows,
        column_count,
        caption,
        nested: ctx.table_depth > 1,
    })
}

fn push_row(
    walker: &Walker<'_>,
    tr: NodeId,
    in_thead: bool,
    ctx: &mut ConversionContext<'_>,
    rows: &mut Vec<TableRow>,
) {
    let doc = walker.doc;
    let cells: Vec<TableCell> = doc
        .element_children(tr)
        .filter(|&c| doc.is_tag(c, "td") || doc.is_tag(c, "th"))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|cell| extract_cell(walker, cell, in_thead, ctx))
        .collect();

    if cells.is_empty() {
        return;
    }
    let is_header = in_thead || cells.iter().all(|c| c.is_header);
    rows.push(TableRow { cells, is_header });
}

fn extract_cell(walker: &Walker<'_>, cell: NodeId, in_thead: bool, ctx: &mut ConversionContext<'_>) -> TableCell {
    let doc = walker.doc;
    let (content_node, format) = match sole_format_child(doc, cell) {
        Some((child, format)) => (child, Some(format)),
        None => (cell, None),
    };

    let rendered = walker.walk_children(content_node, ctx);
    let content = rendered.trim().to_string();
    let is_block = content.contains("\n\n") || has_block_descendant(doc, cell);

    TableCell {
        content,
        is_header: in_thead || doc.is_tag(cell, "th"),
        colspan: span_attr(doc, cell, "colspan", MAX_GRID_COLS as u32),
        rowspan: span_attr(doc, cell, "rowspan", MAX_ROWSPAN),
        alignment: cell_alignment(doc, cell),
        format,
        is_block,
        column: 0,
    }
}

/// A cell whose only content is one `<b>`, `<i>` or `<code>` element
fn sole_format_child(doc: &Document, cell: NodeId) -> Option<(NodeId, CellFormat)> {
    let mut only = None;
    for &child in doc.children(cell) {
        if let Some(text) = doc.text(child) {
            if !text.trim().is_empty() {
                return None;
            }
            continue;
        }
        if only.is_some() {
            return None;
        }
        only = Some(child);
    }
    let child = only?;
    let format = match doc.tag(child)? {
        "b" | "strong" => CellFormat::Strong,
        "i" | "em" => CellFormat::Emphasis,
        "code" | "tt" => CellFormat::Monospace,
        _ => return None,
    };
    // formatting that wraps block content stays with the content
    if has_block_descendant(doc, child) {
        return None;
    }
    Some((child, format))
}

fn has_block_descendant(doc: &Document, id: NodeId) -> bool {
    doc.descendants(id).skip(1).any(|d| {
        matches!(
            doc.tag(d),
            Some("ul" | "ol" | "dl" | "pre" | "table" | "blockquote" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
        )
    })
}

/// Span attribute, reported only when greater than one
fn span_attr(doc: &Document, cell: NodeId, name: &str, max: u32) -> Option<u32> {
    doc.attr(cell, name)
        .and_then(|v| v.parse::<u32>().ok())
        .map(|n| n.min(max))
        .filter(|&n| n > 1)
}

fn cell_alignment(doc: &Document, cell: NodeId) -> Option<Alignment> {
    let value = doc
        .attr(cell, "align")
        .or_else(|| doc.attr(cell, "style").and_then(|s| style_property(s, "text-align")))?;
    match value.to_ascii_lowercase().as_str() {
        "left" | "start" => Some(Alignment::Left),
        "center" | "middle" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        _ => None,
    }
}

/// Assign grid columns to every cell and return the column count.
fn place_on_grid(rows: &mut [TableRow]) -> usize {
    // remaining rows each grid column stays occupied from above
    let mut pending: Vec<u32> = Vec::new();
    let mut column_count = 0;

    for row in rows.iter_mut() {
        let mut col = 0;
        for cell in &mut row.cells {
            while col < pending.len() && pending[col] > 0 {
                col += 1;
            }
            let end = (col + cell.span_cols()).min(MAX_GRID_COLS).max(col + 1);
            if pending.len() < end {
                pending.resize(end, 0);
            }
            cell.column = col;
            let rows_covered = cell.rowspan.unwrap_or(1);
            for slot in &mut pending[col..end] {
                *slot = rows_covered;
            }
            col = end;
        }
        column_count = column_count.max(pending.len());
        for slot in &mut pending {
            *slot = slot.saturating_sub(1);
        }
    }
    column_count
}

// ============================================================================
// Column Layout
// ============================================================================

fn column_layout(table: &Table, ctx: &mut ConversionContext<'_>) -> ColumnLayout {
    match &ctx.options.table_layout {
        TableLayout::Explicit(specs) if specs.len() == table.column_count => ColumnLayout {
            widths: specs.iter().map(|s| s.width.max(1)).collect(),
            alignments: specs.iter().map(|s| s.alignment).collect(),
        },
        TableLayout::Explicit(specs) => {
            let message = format!(
                "explicit table layout has {} columns but the table has {}; using automatic widths",
                specs.len(),
                table.column_count
            );
            ctx.warn(message);
            auto_layout(table)
        }
        TableLayout::Auto => auto_layout(table),
    }
}

/// Relative widths from the longest rendered content per column.
///
/// The widest column scores 10 and the others scale against it, never below
/// 1. Cells spanning several columns are not measured.
pub(crate) fn auto_layout(table: &Table) -> ColumnLayout {
    let mut lengths = vec![0usize; table.column_count];
    for row in &table.rows {
        for cell in &row.cells {
            if cell.span_cols() > 1 {
                continue;
            }
            let len = single_line(&cell.content).chars().count();
            if let Some(slot) = lengths.get_mut(cell.column) {
                *slot = (*slot).max(len);
            }
        }
    }

    let max = lengths.iter().copied().max().unwrap_or(0);
    let widths = lengths
        .iter()
        .map(|&len| {
            if max == 0 {
                1
            } else {
                (((len * 10 + max / 2) / max) as u32).max(1)
            }
        })
        .collect();

    ColumnLayout {
        widths,
        alignments: vec![None; table.column_count],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(content: &str, colspan: Option<u32>, rowspan: Option<u32>) -> TableCell {
        TableCell {
            content: content.to_string(),
            is_header: false,
            colspan,
            rowspan,
            alignment: None,
            format: None,
            is_block: false,
            column: 0,
        }
    }

    fn row(cells: Vec<TableCell>) -> TableRow {
        TableRow {
            cells,
            is_header: false,
        }
    }

    #[test]
    fn test_grid_with_colspan() {
        let mut rows = vec![
            row(vec![cell("wide", Some(2), None), cell("c", None, None)]),
            row(vec![cell("a", None, None), cell("b", None, None), cell("c", None, None)]),
        ];
        assert_eq!(place_on_grid(&mut rows), 3);
        assert_eq!(rows[0].cells[1].column, 2);
    }

    #[test]
    fn test_grid_with_rowspan() {
        let mut rows = vec![
            row(vec![cell("tall", None, Some(2)), cell("b", None, None)]),
            row(vec![cell("d", None, None)]),
        ];
        assert_eq!(place_on_grid(&mut rows), 2);
        // second row's only cell is pushed past the rowspan
        assert_eq!(rows[1].cells[0].column, 1);
    }

    #[test]
    fn test_auto_layout_relative_widths() {
        let mut rows = vec![row(vec![cell("x", None, None), cell("0123456789", None, None)])];
        let column_count = place_on_grid(&mut rows);
        let table = Table {
            rows,
            column_count,
            caption: None,
            nested: false,
        };
        let layout = auto_layout(&table);
        assert_eq!(layout.widths, vec![1, 10]);
        assert_eq!(layout.percent(1), 91);
    }

    #[test]
    fn test_auto_layout_empty_content() {
        let mut rows = vec![row(vec![cell("", None, None), cell("", None, None)])];
        let column_count = place_on_grid(&mut rows);
        let table = Table {
            rows,
            column_count,
            caption: None,
            nested: false,
        };
        assert_eq!(auto_layout(&table).widths, vec![1, 1]);
    }

    #[test]
    fn test_percent_survives_huge_widths() {
        let layout = ColumnLayout {
            widths: vec![u32::MAX, u32::MAX],
            alignments: vec![None, None],
        };
        assert_eq!(layout.percent(0), 50);
        assert_eq!(layout.percent(2), 0);
    }
}
