//! Pre-built Test Fixtures
//!
//! Provides ready-to-use tenants, clients and invoices. The values are fixed
//! so tests can assert on exact amounts and dates.

use chrono::NaiveDate;
use core_kernel::{Country, FixedClock, Percentage, TenantId};
use domain_invoicing::{
    Client, Company, Invoice, InvoiceDraft, InvoiceNumber, LineItem, LineItemInput, NewClient,
};
use rust_decimal_macros::dec;

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// Issue date of the fixture invoices (Jan 1, 2024)
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// Due date of the fixture invoices (Jan 31, 2024)
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    /// Mid-term, before the due date
    pub fn before_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    /// 30 days after the due date
    pub fn month_after_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    /// A clock stopped on `date`
    pub fn clock_on(date: NaiveDate) -> FixedClock {
        FixedClock::on(date)
    }
}

/// Fixture for tenants
pub struct CompanyFixtures;

impl CompanyFixtures {
    /// US tenant with full contact details and INV numbering
    pub fn initech() -> Company {
        Company::new("Initech", "initech", Country::US)
            .with_address("4120 Freidrich Ln\nAustin, TX 78744")
            .with_email("billing@initech.test")
            .with_phone("555-0100")
            .with_website("https://initech.test")
    }

    /// UK tenant, billing in pounds
    pub fn globex() -> Company {
        Company::new("Globex", "globex", Country::GB)
            .with_address("1 Cypress Creek")
            .with_email("accounts@globex.test")
    }

    pub fn initech_id() -> TenantId {
        TenantId::from_slug("initech")
    }
}

/// Fixture for clients
pub struct ClientFixtures;

impl ClientFixtures {
    pub fn acme_input() -> NewClient {
        NewClient::new("Acme", "ap@acme.test", "1 Main St\nSpringfield")
            .with_company("Acme Corporation")
            .with_phone("555-0199")
    }

    pub fn acme() -> Client {
        Client::new(Self::acme_input()).unwrap()
    }

    pub fn umbrella_input() -> NewClient {
        NewClient::new("Umbrella", "finance@umbrella.test", "545 S Birdneck Rd")
    }
}

/// Fixture for invoices
pub struct InvoiceFixtures;

impl InvoiceFixtures {
    /// 10 hours at 50 and 3 pieces at 20
    pub fn acme_items() -> Vec<LineItem> {
        vec![
            LineItem::new("Design work", dec!(10), dec!(50)).with_unit("hours"),
            LineItem::new("Widgets", dec!(3), dec!(20)).with_unit("pieces"),
        ]
    }

    /// The Acme invoice: subtotal 560.00, tax 5%, total 588.00
    pub fn acme_invoice() -> Invoice {
        Invoice::new(
            InvoiceNumber::new("INV-0001"),
            ClientFixtures::acme(),
            DateFixtures::issue_date(),
            DateFixtures::due_date(),
            "USD",
        )
        .with_items(Self::acme_items())
        .with_tax_rate(Percentage::new(dec!(5)).unwrap())
    }

    /// Draft equivalent of [`InvoiceFixtures::acme_invoice`]
    pub fn acme_draft() -> InvoiceDraft {
        let mut draft = InvoiceDraft::new(
            ClientFixtures::acme_input(),
            vec![
                LineItemInput::new("Design work", dec!(10), dec!(50)).with_unit("hours"),
                LineItemInput::new("Widgets", dec!(3), dec!(20)).with_unit("pieces"),
            ],
        );
        draft.issue_date = Some(DateFixtures::issue_date());
        draft.due_date = Some(DateFixtures::due_date());
        draft.tax_rate = Some(dec!(5).into());
        draft
    }
}
