//! Invoice template
//!
//! Turns an invoice and its issuing company into a [`Document`] with a
//! fixed sequence of sections:
//!
//! ```text
//! Header       INVOICE / Invoice #INV-0001
//! Details      Invoice Date, Due Date, overdue badge
//! Parties      From: company      Bill To: client
//! LineItems    Description | Qty | Unit | Rate | Amount
//! Summary      Subtotal, Discount, Tax, Total
//! PaymentTerms explicit or derived from the term length
//! Notes        only when the invoice has notes
//! Footer       thanks and the company's contact line
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use domain_invoicing::{Company, Invoice};

use crate::layout::{Cell, Document, Paragraph, Row, Rule, Section, SectionKind, Table, TableStyle};
use crate::styles::{inch, palette, pt, text, Align, TextStyle};

/// Text of the diagonal watermark on overdue invoices
pub const WATERMARK_TEXT: &str = "OVERDUE";

const UNIT_ABBREVIATIONS: [(&str, &str); 15] = [
    ("hour", "hr"),
    ("hours", "hrs"),
    ("day", "day"),
    ("days", "days"),
    ("piece", "pc"),
    ("pieces", "pcs"),
    ("each", "each"),
    ("item", "item"),
    ("unit", "unit"),
    ("box", "box"),
    ("kg", "kg"),
    ("lb", "lb"),
    ("meter", "m"),
    ("foot", "ft"),
    ("inch", "in"),
];

/// Per-render settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Draw the watermark when the invoice is overdue
    pub watermark: bool,
    /// Date the document is generated; also the "today" of the overdue check
    pub generated_on: NaiveDate,
}

impl RenderOptions {
    pub fn new(generated_on: NaiveDate) -> Self {
        Self {
            watermark: false,
            generated_on,
        }
    }

    pub fn with_watermark(mut self, watermark: bool) -> Self {
        self.watermark = watermark;
        self
    }
}

/// Display form of a unit of measure
///
/// Known units are abbreviated regardless of case, blank units read `each`
/// and anything else is shown as given.
pub fn abbreviate_unit(unit: &str) -> String {
    let unit = unit.trim();
    if unit.is_empty() {
        return "each".to_string();
    }
    let lower = unit.to_lowercase();
    UNIT_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, short)| short.to_string())
        .unwrap_or_else(|| unit.to_string())
}

/// Whole quantities print without decimals, others with two
pub fn format_quantity(quantity: Decimal) -> String {
    if quantity.fract().is_zero() {
        quantity.trunc().normalize().to_string()
    } else {
        format!("{:.2}", quantity.round_dp(2))
    }
}

/// `March 01, 2024`
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Lays out `invoice` as issued by `company`
pub fn layout_invoice(invoice: &Invoice, company: &Company, options: &RenderOptions) -> Document {
    let today = options.generated_on;
    let overdue = invoice.is_overdue_on(today);

    let mut document = Document::new(format!("Invoice {}", invoice.invoice_number()));
    document.push(header(invoice));
    document.push(details(invoice, today));
    document.push(parties(invoice, company));
    document.push(line_items(invoice));
    document.push(summary(invoice));
    document.push(payment_terms(invoice));
    if let Some(notes) = invoice.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        document.push(notes_section(notes));
    }
    document.push(footer(company));

    if options.watermark && overdue {
        document.watermark = Some(WATERMARK_TEXT.to_string());
    }

    debug!(
        invoice_number = %invoice.invoice_number(),
        sections = document.sections.len(),
        overdue,
        watermark = document.watermark.is_some(),
        "Laid out invoice"
    );
    document
}

fn header(invoice: &Invoice) -> Section {
    Section::new(SectionKind::Header)
        .paragraph(Paragraph::new("INVOICE", text::TITLE).space_after(pt(20.0)))
        .paragraph(
            Paragraph::new(format!("Invoice #{}", invoice.invoice_number()), text::SUBTITLE)
                .space_after(pt(30.0)),
        )
        .spacer(pt(20.0))
}

fn details(invoice: &Invoice, today: NaiveDate) -> Section {
    let value = text::BODY;
    let mut table = Table::new(vec![inch(1.5), inch(2.0)])
        .with_align(Align::Right)
        .with_style(TableStyle {
            padding: (0.0, pt(3.0)),
            ..TableStyle::default()
        });
    table.push(Row::new(vec![
        Cell::new("Invoice Date:", text::LABEL),
        Cell::new(format_long_date(invoice.issue_date), value),
    ]));
    table.push(Row::new(vec![
        Cell::new("Due Date:", text::LABEL),
        Cell::new(format_long_date(invoice.due_date), value),
    ]));
    if invoice.is_overdue_on(today) {
        table.push(Row::new(vec![
            Cell::new("Status:", text::LABEL),
            Cell::new(format!("OVERDUE ({} days)", invoice.days_overdue(today)), text::ALERT),
        ]));
    }

    Section::new(SectionKind::Details).table(table).spacer(pt(30.0))
}

fn parties(invoice: &Invoice, company: &Company) -> Section {
    let mut from = address_lines(&company.address);
    if !company.email.trim().is_empty() {
        from.push(format!("Email: {}", company.email));
    }
    if let Some(phone) = company.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        from.push(format!("Phone: {}", phone));
    }

    let client = &invoice.client;
    let mut bill_to = Vec::new();
    if let Some(name) = client.company.as_deref() {
        bill_to.push(name.to_string());
    }
    bill_to.extend(address_lines(&client.address));
    bill_to.push(format!("Email: {}", client.email));
    if let Some(phone) = client.phone.as_deref() {
        bill_to.push(format!("Phone: {}", phone));
    }

    let mut table = Table::new(vec![inch(2.8), inch(0.4), inch(2.8)]);
    table.push(Row::new(vec![
        Cell::new("From:", text::SECTION),
        Cell::empty(text::BODY),
        Cell::new("Bill To:", text::SECTION),
    ]));
    table.push(Row::new(vec![
        Cell::new(company.name.clone(), text::BODY_BOLD),
        Cell::empty(text::BODY),
        Cell::new(client.name.clone(), text::BODY_BOLD),
    ]));
    table.push(Row::new(vec![
        Cell::lines(from, text::BODY),
        Cell::empty(text::BODY),
        Cell::lines(bill_to, text::BODY),
    ]));

    Section::new(SectionKind::Parties).table(table).spacer(pt(30.0))
}

fn line_items(invoice: &Invoice) -> Section {
    const ALIGNS: [Align; 5] = [Align::Left, Align::Center, Align::Center, Align::Right, Align::Right];

    let header = Row::new(
        ["Description", "Qty", "Unit", "Rate", "Amount"]
            .iter()
            .zip(ALIGNS)
            .map(|(label, align)| Cell::new(*label, text::TABLE_HEADER.align(align)))
            .collect(),
    );

    let mut table = Table::new(vec![inch(2.8), inch(0.7), inch(0.9), inch(1.0), inch(1.2)])
        .with_header(header)
        .with_style(TableStyle {
            padding: (pt(10.0), pt(12.0)),
            header_padding: pt(14.0),
            header_fill: Some(palette::ACCENT),
            header_rule: Some(Rule { color: palette::ACCENT, thickness_pt: 2.0 }),
            inner_grid: Some(Rule { color: palette::GRID, thickness_pt: 0.5 }),
            outline: Some(Rule { color: palette::FRAME, thickness_pt: 1.0 }),
            zebra: Some((palette::WHITE, palette::ZEBRA)),
        });

    for item in &invoice.items {
        let body = |align: Align| text::BODY.align(align);
        table.push(Row::new(vec![
            Cell::new(item.description.clone(), body(ALIGNS[0])),
            Cell::new(format_quantity(item.quantity), body(ALIGNS[1])),
            Cell::new(abbreviate_unit(&item.unit), text::BODY_BOLD.align(ALIGNS[2])).with_fill(palette::SHADE),
            Cell::new(invoice.format_amount(item.rate), body(ALIGNS[3])),
            Cell::new(invoice.format_amount(item.total()), body(ALIGNS[4])),
        ]));
    }

    Section::new(SectionKind::LineItems)
        .paragraph(Paragraph::new("Items & Services", text::SECTION).space_after(pt(10.0)))
        .table(table)
        .spacer(pt(20.0))
}

fn summary(invoice: &Invoice) -> Section {
    let totals = invoice.totals();
    let label = text::BODY.align(Align::Right);

    let line = |caption: String, amount: String, style: TextStyle| {
        Row::new(vec![
            Cell::empty(style),
            Cell::empty(style),
            Cell::new(caption, style),
            Cell::new(amount, style),
        ])
    };

    let mut table = Table::new(vec![inch(3.0), inch(0.6), inch(1.8), inch(1.2)]).with_style(TableStyle {
        padding: (pt(8.0), pt(8.0)),
        ..TableStyle::default()
    });
    table.push(line("Subtotal:".to_string(), invoice.format_amount(totals.subtotal), label));
    if !invoice.discount_percentage.is_zero() {
        table.push(line(
            format!("Discount ({}):", invoice.discount_percentage),
            invoice.format_amount(-totals.discount_amount),
            label,
        ));
    }
    if !invoice.tax_rate.is_zero() {
        table.push(line(
            format!("Tax ({}):", invoice.tax_rate),
            invoice.format_amount(totals.tax_amount),
            label,
        ));
    }
    table.push(
        line("Total:".to_string(), invoice.format_amount(totals.total), text::TOTAL)
            .with_fill(palette::SHADE)
            .with_rules(Rule { color: palette::ACCENT, thickness_pt: 2.0 }, 2),
    );

    Section::new(SectionKind::Summary).table(table).spacer(pt(20.0))
}

fn payment_terms(invoice: &Invoice) -> Section {
    Section::new(SectionKind::PaymentTerms)
        .paragraph(Paragraph::new("Payment Terms:", text::SECTION).space_after(pt(10.0)))
        .paragraph(Paragraph::new(invoice.payment_terms_text(), text::BODY))
        .spacer(pt(15.0))
}

fn notes_section(notes: &str) -> Section {
    Section::new(SectionKind::Notes)
        .paragraph(Paragraph::new("Notes:", text::SECTION).space_after(pt(10.0)))
        .paragraph(Paragraph::new(notes.trim(), text::BODY))
        .spacer(pt(20.0))
}

fn footer(company: &Company) -> Section {
    let mut contact = Vec::new();
    if !company.email.trim().is_empty() {
        contact.push(format!("Email: {}", company.email));
    }
    if let Some(phone) = company.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        contact.push(format!("Phone: {}", phone));
    }

    let mut section = Section::new(SectionKind::Footer)
        .spacer(pt(50.0))
        .paragraph(Paragraph::new("Thank you for your business!", text::FOOTER))
        .paragraph(Paragraph::new("Questions about this invoice? Contact us at:", text::FOOTER));
    if !contact.is_empty() {
        section = section.paragraph(Paragraph::new(contact.join(" | "), text::FOOTER));
    }
    section
}

fn address_lines(address: &str) -> Vec<String> {
    address
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
