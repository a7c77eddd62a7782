//! Declarative document model
//!
//! A [`Document`] is an ordered list of sections, each a list of blocks.
//! Blocks carry their own styling and know nothing about pages; the
//! paginator decides where they land.

use serde::{Deserialize, Serialize};

use crate::styles::{Align, Color, TextStyle};

/// Which part of the invoice a section holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Header,
    Details,
    Parties,
    LineItems,
    Summary,
    PaymentTerms,
    Notes,
    Footer,
}

/// A run of text, possibly spanning several lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
    /// Extra space after the paragraph, in millimetres
    pub space_after: f32,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            space_after: 0.0,
        }
    }

    pub fn space_after(mut self, mm: f32) -> Self {
        self.space_after = mm;
        self
    }
}

/// One table cell; `lines` are explicit breaks, each of which may wrap further
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub lines: Vec<String>,
    pub style: TextStyle,
    pub fill: Option<Color>,
}

impl Cell {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            lines: vec![text.into()],
            style,
            fill: None,
        }
    }

    pub fn lines(lines: Vec<String>, style: TextStyle) -> Self {
        Self {
            lines,
            style,
            fill: None,
        }
    }

    pub fn empty(style: TextStyle) -> Self {
        Self {
            lines: Vec::new(),
            style,
            fill: None,
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// A horizontal rule drawn across a row edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub color: Color,
    pub thickness_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub fill: Option<Color>,
    pub rule_above: Option<Rule>,
    pub rule_below: Option<Rule>,
    /// First column the rules and row fill start at
    pub decorate_from: usize,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            fill: None,
            rule_above: None,
            rule_below: None,
            decorate_from: 0,
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_rules(mut self, rule: Rule, from_column: usize) -> Self {
        self.rule_above = Some(rule);
        self.rule_below = Some(rule);
        self.decorate_from = from_column;
        self
    }
}

/// Borders, padding and alternating fills of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    /// Cell padding in millimetres, (horizontal, vertical)
    pub padding: (f32, f32),
    /// Vertical padding of the header row
    pub header_padding: f32,
    pub header_fill: Option<Color>,
    /// Drawn under the header row, over the grid
    pub header_rule: Option<Rule>,
    pub inner_grid: Option<Rule>,
    pub outline: Option<Rule>,
    /// Alternating body row fills
    pub zebra: Option<(Color, Color)>,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            padding: (0.0, 0.0),
            header_padding: 0.0,
            header_fill: None,
            header_rule: None,
            inner_grid: None,
            outline: None,
            zebra: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column widths in millimetres
    pub columns: Vec<f32>,
    /// Repeated at the top of every page the table spans
    pub header: Option<Row>,
    pub rows: Vec<Row>,
    pub style: TableStyle,
    pub align: Align,
}

impl Table {
    pub fn new(columns: Vec<f32>) -> Self {
        Self {
            columns,
            header: None,
            rows: Vec::new(),
            style: TableStyle::default(),
            align: Align::Center,
        }
    }

    pub fn with_header(mut self, header: Row) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn width(&self) -> f32 {
        self.columns.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Paragraph),
    /// Vertical gap in millimetres
    Spacer(f32),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            blocks: Vec::new(),
        }
    }

    pub fn paragraph(mut self, paragraph: Paragraph) -> Self {
        self.blocks.push(Block::Paragraph(paragraph));
        self
    }

    pub fn spacer(mut self, mm: f32) -> Self {
        self.blocks.push(Block::Spacer(mm));
        self
    }

    pub fn table(mut self, table: Table) -> Self {
        self.blocks.push(Block::Table(table));
        self
    }
}

/// A laid-out document, ready for pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub sections: Vec<Section>,
    /// Drawn diagonally across every page
    pub watermark: Option<String>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
            watermark: None,
        }
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.section(kind).is_some()
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    /// Every piece of text in reading order, one line per paragraph or cell
    /// line; the watermark is excluded
    pub fn plain_text(&self) -> String {
        let mut out = Vec::new();
        for section in &self.sections {
            for block in &section.blocks {
                match block {
                    Block::Paragraph(p) => out.extend(p.text.lines().map(str::to_string)),
                    Block::Spacer(_) => {}
                    Block::Table(table) => {
                        for row in table.header.iter().chain(table.rows.iter()) {
                            let line: Vec<String> = row
                                .cells
                                .iter()
                                .map(Cell::text)
                                .filter(|t| !t.is_empty())
                                .collect();
                            if !line.is_empty() {
                                out.push(line.join(" | "));
                            }
                        }
                    }
                }
            }
        }
        out.join("\n")
    }
}
