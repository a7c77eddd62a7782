//! Colours, fonts and measurements shared by the layout and the PDF backend

use serde::{Deserialize, Serialize};

/// Millimetres per typographic point
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Millimetres per inch
pub const MM_PER_INCH: f32 = 25.4;

pub fn pt(value: f32) -> f32 {
    value * MM_PER_PT
}

pub fn inch(value: f32) -> f32 {
    value * MM_PER_INCH
}

/// An sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to 0.0-1.0
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

pub mod palette {
    use super::Color;

    /// Headings and body text
    pub const INK: Color = Color::rgb(0x2c, 0x3e, 0x50);
    /// Secondary text
    pub const MUTED: Color = Color::rgb(0x7f, 0x8c, 0x8d);
    /// Table header fill and total rules
    pub const ACCENT: Color = Color::rgb(0x34, 0x98, 0xdb);
    /// Unit column and total row fill
    pub const SHADE: Color = Color::rgb(0xec, 0xf0, 0xf1);
    /// Alternate row fill
    pub const ZEBRA: Color = Color::rgb(0xf8, 0xf9, 0xfa);
    /// Inner grid
    pub const GRID: Color = Color::rgb(0xbd, 0xc3, 0xc7);
    /// Table outline
    pub const FRAME: Color = Color::rgb(0x34, 0x49, 0x5e);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const DANGER: Color = Color::rgb(0xe7, 0x4c, 0x3c);
    /// Red at roughly 10% over white
    pub const WATERMARK: Color = Color::rgb(0xff, 0xe5, 0xe5);
}

/// Built-in Helvetica faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// How a run of text is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size_pt: f32,
    pub weight: FontWeight,
    pub color: Color,
    pub align: Align,
}

impl TextStyle {
    pub const fn new(size_pt: f32) -> Self {
        Self {
            size_pt,
            weight: FontWeight::Regular,
            color: palette::INK,
            align: Align::Left,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub const fn italic(mut self) -> Self {
        self.weight = FontWeight::Italic;
        self
    }

    pub const fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub const fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Baseline-to-baseline distance in millimetres
    pub fn line_height(&self) -> f32 {
        pt(self.size_pt * 1.2)
    }

    /// Estimated width of `text` in millimetres
    ///
    /// Uses the average Helvetica advance instead of per-glyph metrics.
    pub fn text_width(&self, text: &str) -> f32 {
        let em = match self.weight {
            FontWeight::Bold => 0.56,
            FontWeight::Regular | FontWeight::Italic => 0.52,
        };
        text.chars().count() as f32 * pt(self.size_pt) * em
    }
}

/// Styles of the invoice template
pub mod text {
    use super::{palette, Align, TextStyle};

    pub const TITLE: TextStyle = TextStyle::new(28.0).bold().align(Align::Right);
    pub const SUBTITLE: TextStyle = TextStyle::new(14.0).color(palette::MUTED).align(Align::Right);
    pub const SECTION: TextStyle = TextStyle::new(14.0).bold();
    pub const BODY: TextStyle = TextStyle::new(10.0);
    pub const BODY_BOLD: TextStyle = TextStyle::new(10.0).bold();
    pub const LABEL: TextStyle = TextStyle::new(10.0).bold();
    pub const ALERT: TextStyle = TextStyle::new(10.0).bold().color(palette::DANGER);
    pub const TABLE_HEADER: TextStyle = TextStyle::new(11.0).bold().color(palette::WHITE);
    pub const TOTAL: TextStyle = TextStyle::new(12.0).bold().align(Align::Right);
    pub const FOOTER: TextStyle = TextStyle::new(8.0).italic().color(palette::MUTED).align(Align::Center);
    pub const WATERMARK: TextStyle = TextStyle::new(50.0).bold().color(palette::WATERMARK).align(Align::Center);
}
