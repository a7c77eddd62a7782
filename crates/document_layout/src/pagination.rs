//! Pagination
//!
//! Flows the blocks of a [`Document`] down fixed-size pages and produces
//! absolutely positioned [`Element`]s. Positions are in millimetres with the
//! origin at the bottom-left corner of the page, matching PDF user space.
//!
//! Tables break between rows. A table that continues on a new page repeats
//! its header row, and every page segment gets its own grid and outline.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::{Block, Document, Paragraph, Row, Rule, Table};
use crate::styles::{pt, Align, Color, TextStyle};

/// Page size and margins in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageSpec {
    /// US letter with 40pt side and top margins and a 60pt bottom margin
    pub const LETTER: PageSpec = PageSpec {
        width: 215.9,
        height: 279.4,
        margin_left: 40.0 * crate::styles::MM_PER_PT,
        margin_right: 40.0 * crate::styles::MM_PER_PT,
        margin_top: 40.0 * crate::styles::MM_PER_PT,
        margin_bottom: 60.0 * crate::styles::MM_PER_PT,
    };

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::LETTER
    }
}

/// Something drawn at a fixed position on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    /// `y` is the baseline
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
    /// Filled rectangle anchored at its lower-left corner
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        rule: Rule,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    /// Text runs in drawing order, one per line of output
    pub fn text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A document broken into pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedDocument {
    pub title: String,
    pub spec: PageSpec,
    pub pages: Vec<Page>,
    /// Drawn on every page
    pub watermark: Option<String>,
}

impl PagedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn text(&self) -> String {
        self.pages.iter().map(Page::text).collect::<Vec<_>>().join("\n")
    }
}

/// Greedy word wrap of `text` into lines no wider than `max_width`
///
/// Explicit newlines are kept. A word wider than the line is broken between
/// characters.
pub fn wrap_text(text: &str, style: &TextStyle, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if style.text_width(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if style.text_width(word) <= max_width {
                current = word.to_string();
            } else {
                for ch in word.chars() {
                    current.push(ch);
                    if style.text_width(&current) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(ch);
                    }
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Lines of one cell after wrapping, with the style used for them
struct CellLines<'a> {
    lines: Vec<String>,
    style: &'a TextStyle,
}

impl CellLines<'_> {
    fn height(&self) -> f32 {
        self.lines.len() as f32 * self.style.line_height()
    }
}

struct MeasuredRow<'a> {
    row: &'a Row,
    cells: Vec<CellLines<'a>>,
    height: f32,
    padding: f32,
}

/// Breaks `document` into pages of size `spec`
pub fn paginate(document: &Document, spec: &PageSpec) -> PagedDocument {
    let mut paginator = Paginator::new(*spec);
    for section in &document.sections {
        for block in &section.blocks {
            match block {
                Block::Paragraph(paragraph) => paginator.paragraph(paragraph),
                Block::Spacer(mm) => paginator.spacer(*mm),
                Block::Table(table) => paginator.table(table),
            }
        }
    }

    let pages = paginator.finish();
    debug!(title = %document.title, pages = pages.len(), "Paginated document");
    PagedDocument {
        title: document.title.clone(),
        spec: *spec,
        pages,
        watermark: document.watermark.clone(),
    }
}

struct Paginator {
    spec: PageSpec,
    pages: Vec<Page>,
    current: Page,
    /// Distance from the top edge of the page
    cursor: f32,
}

impl Paginator {
    fn new(spec: PageSpec) -> Self {
        Self {
            spec,
            pages: Vec::new(),
            current: Page::default(),
            cursor: spec.margin_top,
        }
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }

    fn bottom_limit(&self) -> f32 {
        self.spec.height - self.spec.margin_bottom
    }

    fn remaining(&self) -> f32 {
        self.bottom_limit() - self.cursor
    }

    fn at_page_top(&self) -> bool {
        (self.cursor - self.spec.margin_top).abs() < f32::EPSILON
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.cursor = self.spec.margin_top;
    }

    /// Moves to a new page unless `height` fits; content taller than a whole
    /// page stays where it is
    fn ensure_room(&mut self, height: f32) {
        if height > self.remaining() && !self.at_page_top() {
            self.new_page();
        }
    }

    /// Converts a distance from the top edge to PDF user space
    fn flip(&self, y_from_top: f32) -> f32 {
        self.spec.height - y_from_top
    }

    fn spacer(&mut self, mm: f32) {
        self.cursor = (self.cursor + mm).min(self.bottom_limit());
    }

    fn text_at(&mut self, left: f32, width: f32, line_top: f32, text: &str, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let text_width = style.text_width(text);
        let x = match style.align {
            Align::Left => left,
            Align::Center => left + (width - text_width) / 2.0,
            Align::Right => left + width - text_width,
        };
        let baseline = line_top + pt(style.size_pt);
        let y = self.flip(baseline);
        self.current.elements.push(Element::Text {
            x,
            y,
            text: text.to_string(),
            style: *style,
        });
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        let width = self.spec.content_width();
        let line_height = paragraph.style.line_height();
        for line in wrap_text(&paragraph.text, &paragraph.style, width) {
            self.ensure_room(line_height);
            self.text_at(self.spec.margin_left, width, self.cursor, &line, &paragraph.style);
            self.cursor += line_height;
        }
        self.spacer(paragraph.space_after);
    }

    fn measure<'a>(&self, table: &'a Table, row: &'a Row, padding: f32) -> MeasuredRow<'a> {
        let inner = |col: usize| {
            table
                .columns
                .get(col)
                .map(|w| (w - 2.0 * table.style.padding.0).max(0.0))
                .unwrap_or(0.0)
        };
        let cells: Vec<CellLines<'a>> = row
            .cells
            .iter()
            .enumerate()
            .map(|(col, cell)| CellLines {
                lines: cell
                    .lines
                    .iter()
                    .flat_map(|line| wrap_text(line, &cell.style, inner(col)))
                    .collect(),
                style: &cell.style,
            })
            .collect();
        let content = cells.iter().map(CellLines::height).fold(0.0, f32::max);
        MeasuredRow {
            row,
            cells,
            height: content + 2.0 * padding,
            padding,
        }
    }

    fn table(&mut self, table: &Table) {
        let width = table.width();
        let content_width = self.spec.content_width();
        let left = match table.align {
            Align::Left => self.spec.margin_left,
            Align::Center => self.spec.margin_left + (content_width - width) / 2.0,
            Align::Right => self.spec.margin_left + content_width - width,
        };

        let header = table
            .header
            .as_ref()
            .map(|row| self.measure(table, row, table.style.header_padding));
        let body: Vec<MeasuredRow<'_>> = table
            .rows
            .iter()
            .map(|row| self.measure(table, row, table.style.padding.1))
            .collect();

        let header_height = header.as_ref().map(|h| h.height).unwrap_or(0.0);
        let first = body.first().map(|r| r.height).unwrap_or(0.0);
        self.ensure_room(header_height + first);

        let mut segment_top = self.cursor;
        let mut boundaries = Vec::new();
        if let Some(header) = &header {
            self.draw_row(table, left, header, table.style.header_fill);
            boundaries.push(self.cursor);
        }

        for (index, row) in body.iter().enumerate() {
            if row.height > self.remaining() && self.cursor > segment_top {
                self.draw_grid(table, left, segment_top, &boundaries);
                self.new_page();
                segment_top = self.cursor;
                boundaries.clear();
                if let Some(header) = &header {
                    self.draw_row(table, left, header, table.style.header_fill);
                    boundaries.push(self.cursor);
                }
            }
            let zebra = table
                .style
                .zebra
                .map(|(even, odd)| if index % 2 == 0 { even } else { odd });
            self.draw_row(table, left, row, zebra);
            boundaries.push(self.cursor);
        }
        self.draw_grid(table, left, segment_top, &boundaries);
    }

    fn draw_row(&mut self, table: &Table, left: f32, measured: &MeasuredRow<'_>, background: Option<Color>) {
        let row = measured.row;
        let top = self.cursor;
        let bottom = top + measured.height;

        let column_left = |col: usize| left + table.columns.iter().take(col).sum::<f32>();
        let decorated_left = column_left(row.decorate_from.min(table.columns.len()));
        let right = left + table.width();

        if let Some(color) = background {
            self.fill(left, top, right - left, measured.height, color);
        }
        if let Some(color) = row.fill {
            self.fill(decorated_left, top, right - decorated_left, measured.height, color);
        }

        for (col, (cell, lines)) in row.cells.iter().zip(&measured.cells).enumerate() {
            let Some(column_width) = table.columns.get(col).copied() else {
                break;
            };
            let x = column_left(col);
            if let Some(color) = cell.fill {
                self.fill(x, top, column_width, measured.height, color);
            }
            let available = measured.height - 2.0 * measured.padding;
            let mut line_top = top + measured.padding + (available - lines.height()) / 2.0;
            let inner_left = x + table.style.padding.0;
            let inner_width = column_width - 2.0 * table.style.padding.0;
            for line in &lines.lines {
                self.text_at(inner_left, inner_width, line_top, line, lines.style);
                line_top += lines.style.line_height();
            }
        }

        if let Some(rule) = row.rule_above {
            self.line((decorated_left, top), (right, top), rule);
        }
        if let Some(rule) = row.rule_below {
            self.line((decorated_left, bottom), (right, bottom), rule);
        }

        self.cursor = bottom;
    }

    /// Grid and outline of one page segment; `boundaries` are the row
    /// bottoms measured from the top edge
    fn draw_grid(&mut self, table: &Table, left: f32, top: f32, boundaries: &[f32]) {
        let Some(&bottom) = boundaries.last() else {
            return;
        };
        let right = left + table.width();

        if let Some(rule) = table.style.inner_grid {
            let mut x = left;
            for width in table.columns.iter().take(table.columns.len().saturating_sub(1)) {
                x += width;
                self.line((x, top), (x, bottom), rule);
            }
            for &y in &boundaries[..boundaries.len() - 1] {
                self.line((left, y), (right, y), rule);
            }
        }
        if let (Some(rule), Some(_), Some(&below_header)) =
            (table.style.header_rule, table.header.as_ref(), boundaries.first())
        {
            self.line((left, below_header), (right, below_header), rule);
        }
        if let Some(rule) = table.style.outline {
            self.line((left, top), (right, top), rule);
            self.line((right, top), (right, bottom), rule);
            self.line((right, bottom), (left, bottom), rule);
            self.line((left, bottom), (left, top), rule);
        }
    }

    /// `top` is measured from the top edge
    fn fill(&mut self, x: f32, top: f32, width: f32, height: f32, color: Color) {
        let y = self.flip(top + height);
        self.current.elements.push(Element::Fill {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), rule: Rule) {
        let from = (from.0, self.flip(from.1));
        let to = (to.0, self.flip(to.1));
        self.current.elements.push(Element::Line { from, to, rule });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Cell, Section, SectionKind, TableStyle};
    use crate::styles::text;

    fn document_with_rows(rows: usize) -> Document {
        let header = Row::new(vec![
            Cell::new("Description", text::TABLE_HEADER),
            Cell::new("Amount", text::TABLE_HEADER),
        ]);
        let mut table = Table::new(vec![100.0, 40.0])
            .with_header(header)
            .with_style(TableStyle {
                padding: (2.0, 2.0),
                ..TableStyle::default()
            });
        for i in 0..rows {
            table.push(Row::new(vec![
                Cell::new(format!("Row {}", i), text::BODY),
                Cell::new("$1.00", text::BODY),
            ]));
        }
        let mut document = Document::new("Test");
        document.push(Section::new(SectionKind::LineItems).table(table));
        document
    }

    #[test]
    fn test_wrap_respects_width() {
        let style = text::BODY;
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", &style, 30.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(style.text_width(line) <= 30.0, "{} too wide", line);
        }
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_wrap_breaks_long_words_and_keeps_newlines() {
        let style = text::BODY;
        let lines = wrap_text(&"x".repeat(200), &style, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat().len(), 200);

        assert_eq!(wrap_text("a\nb", &style, 100.0), vec!["a", "b"]);
    }

    #[test]
    fn test_short_table_fits_one_page() {
        let paged = paginate(&document_with_rows(3), &PageSpec::LETTER);
        assert_eq!(paged.page_count(), 1);
        assert!(paged.text().contains("Row 2"));
    }

    #[test]
    fn test_long_table_repeats_header() {
        let paged = paginate(&document_with_rows(120), &PageSpec::LETTER);
        assert!(paged.page_count() > 1);
        for page in &paged.pages {
            assert!(page.text().starts_with("Description"));
        }
        let all = paged.text();
        assert!(all.contains("Row 0"));
        assert!(all.contains("Row 119"));
    }

    #[test]
    fn test_elements_stay_within_margins() {
        let spec = PageSpec::LETTER;
        let paged = paginate(&document_with_rows(120), &spec);
        for page in &paged.pages {
            for element in &page.elements {
                if let Element::Text { y, .. } = element {
                    assert!(*y >= spec.margin_bottom - 1e-3);
                    assert!(*y <= spec.height - spec.margin_top);
                }
            }
        }
    }

    #[test]
    fn test_right_aligned_text_ends_at_margin() {
        let mut document = Document::new("Test");
        document.push(Section::new(SectionKind::Header).paragraph(Paragraph::new("INVOICE", text::TITLE)));
        let spec = PageSpec::LETTER;
        let paged = paginate(&document, &spec);
        let Element::Text { x, text, style, .. } = &paged.pages[0].elements[0] else {
            panic!("expected text");
        };
        let end = x + style.text_width(text);
        assert!((end - (spec.width - spec.margin_right)).abs() < 1e-3);
    }
}
