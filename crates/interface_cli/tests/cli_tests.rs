//! Tests for the invoicer subcommands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use domain_invoicing::{ExchangeFormat, InMemoryCounterStore, InvoicingService};
use infra_db::JsonDirectoryStore;
use interface_cli::{execute, AppConfig, CliError, Command, CompanySettings};
use test_utils::{CompanyFixtures, DateFixtures, InvoiceFixtures};

fn config_in(dir: &Path) -> AppConfig {
    AppConfig {
        log_level: "debug".to_string(),
        output_dir: dir.join("out"),
        data_dir: dir.join("data"),
        database_url: None,
        company: CompanySettings {
            name: "Initech".to_string(),
            slug: "initech".to_string(),
            country: "US".to_string(),
            address: "4120 Freidrich Ln".to_string(),
            email: "billing@initech.test".to_string(),
            phone: None,
            website: None,
            currency: None,
            invoice_prefix: None,
            default_tax_rate: None,
            default_payment_terms: None,
            timezone: None,
        },
    }
}

async fn service_on(date: chrono::NaiveDate) -> InvoicingService<InMemoryCounterStore> {
    InvoicingService::new(
        CompanyFixtures::initech(),
        Arc::new(InMemoryCounterStore::new()),
        Arc::new(DateFixtures::clock_on(date)),
    )
    .await
    .unwrap()
}

fn write_draft(dir: &Path) -> PathBuf {
    let path = dir.join("draft.json");
    std::fs::write(&path, serde_json::to_string(&InvoiceFixtures::acme_draft()).unwrap()).unwrap();
    path
}

fn add_acme() -> Command {
    Command::AddClient {
        name: "Acme".to_string(),
        email: "ap@acme.test".to_string(),
        address: "1 Main St".to_string(),
        phone: None,
        company: Some("Acme Corporation".to_string()),
        notes: None,
    }
}

// ============================================================================
// Invoice Command Tests
// ============================================================================

mod invoices {
    use super::*;

    #[tokio::test]
    async fn test_create_invoice_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::before_due()).await;
        let input = write_draft(dir.path());

        let output = execute(
            Command::CreateInvoice {
                input,
                watermark: false,
                status: None,
                client: None,
            },
            &config,
            &service,
        )
        .await
        .unwrap();

        assert!(output.contains("INV-0001"));
        assert!(output.contains("$588.00"));
        let pdf = config.output_dir.join("invoice_INV-0001_20240115.pdf");
        let bytes = std::fs::read(pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_next_number_does_not_allocate() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::before_due()).await;

        assert_eq!(execute(Command::NextNumber, &config, &service).await.unwrap(), "INV-0001");
        assert_eq!(execute(Command::NextNumber, &config, &service).await.unwrap(), "INV-0001");

        let input = write_draft(dir.path());
        let create = Command::CreateInvoice {
            input,
            watermark: true,
            status: Some("sent".to_string()),
            client: None,
        };
        execute(create, &config, &service).await.unwrap();
        assert_eq!(execute(Command::NextNumber, &config, &service).await.unwrap(), "INV-0002");
    }

    #[tokio::test]
    async fn test_unknown_status_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::before_due()).await;
        let input = write_draft(dir.path());

        let err = execute(
            Command::CreateInvoice {
                input,
                watermark: false,
                status: Some("archived".to_string()),
                client: None,
            },
            &config,
            &service,
        )
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(execute(Command::NextNumber, &config, &service).await.unwrap(), "INV-0001");
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::before_due()).await;

        let err = execute(
            Command::CreateInvoice {
                input: dir.path().join("absent.json"),
                watermark: false,
                status: None,
                client: None,
            },
            &config,
            &service,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Input { .. }));
    }

    #[tokio::test]
    async fn test_bill_saved_client() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::before_due()).await;
        execute(add_acme(), &config, &service).await.unwrap();
        let input = write_draft(dir.path());

        let output = execute(
            Command::CreateInvoice {
                input: input.clone(),
                watermark: false,
                status: None,
                client: Some("CL-001".to_string()),
            },
            &config,
            &service,
        )
        .await
        .unwrap();
        assert!(output.contains("for Acme"));

        let err = execute(
            Command::CreateInvoice {
                input,
                watermark: false,
                status: None,
                client: Some("CL-404".to_string()),
            },
            &config,
            &service,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::UnknownClient(_)));
    }

    #[tokio::test]
    async fn test_saved_client_fills_draft_without_client() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::before_due()).await;
        execute(add_acme(), &config, &service).await.unwrap();

        let input = dir.path().join("items-only.json");
        std::fs::write(
            &input,
            r#"{"items": [{"description": "Design work", "quantity": 10, "rate": 50, "unit": "hours"}]}"#,
        )
        .unwrap();

        let output = execute(
            Command::CreateInvoice {
                input: input.clone(),
                watermark: false,
                status: None,
                client: Some("CL-001".to_string()),
            },
            &config,
            &service,
        )
        .await
        .unwrap();
        assert!(output.contains("INV-0001 for Acme"));

        let err = execute(
            Command::CreateInvoice {
                input,
                watermark: false,
                status: None,
                client: None,
            },
            &config,
            &service,
        )
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(execute(Command::NextNumber, &config, &service).await.unwrap(), "INV-0002");
    }

    #[tokio::test]
    async fn test_unreachable_status_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::before_due()).await;
        let input = write_draft(dir.path());

        let err = execute(
            Command::CreateInvoice {
                input,
                watermark: false,
                status: Some("paid".to_string()),
                client: None,
            },
            &config,
            &service,
        )
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(execute(Command::NextNumber, &config, &service).await.unwrap(), "INV-0001");
        assert!(!config.output_dir.exists());
    }
}

// ============================================================================
// Client Command Tests
// ============================================================================

mod clients {
    use super::*;

    #[tokio::test]
    async fn test_add_and_list_clients() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::issue_date()).await;

        let added = execute(add_acme(), &config, &service).await.unwrap();
        assert!(added.contains("CL-001"));

        let listed = execute(
            Command::ListClients {
                all: false,
                search: Some("corporation".to_string()),
            },
            &config,
            &service,
        )
        .await
        .unwrap();
        assert!(listed.contains("Acme <ap@acme.test>"));
        assert!(listed.ends_with("1 clients (1 active, 0 inactive)"));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::issue_date()).await;

        execute(add_acme(), &config, &service).await.unwrap();
        let err = execute(add_acme(), &config, &service).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let store = JsonDirectoryStore::new(&config.data_dir);
        assert_eq!(store.load(CompanyFixtures::initech_id()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_export_then_import_into_other_tenant() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::issue_date()).await;
        execute(add_acme(), &config, &service).await.unwrap();

        let export_path = dir.path().join("clients.csv");
        execute(
            Command::ExportClients {
                format: "csv".to_string(),
                output: Some(export_path.clone()),
            },
            &config,
            &service,
        )
        .await
        .unwrap();

        let globex = InvoicingService::new(
            CompanyFixtures::globex(),
            Arc::new(InMemoryCounterStore::new()),
            Arc::new(DateFixtures::clock_on(DateFixtures::issue_date())),
        )
        .await
        .unwrap();
        let output = execute(
            Command::ImportClients {
                file: export_path,
                format: ExchangeFormat::Csv.to_string(),
            },
            &config,
            &globex,
        )
        .await
        .unwrap();
        assert_eq!(output, "Imported 1 clients");

        let store = JsonDirectoryStore::new(&config.data_dir);
        let imported = store.load(CompanyFixtures::globex().id).unwrap();
        assert!(imported.find_by_email("ap@acme.test").is_some());
    }

    #[tokio::test]
    async fn test_unsupported_export_format() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let service = service_on(DateFixtures::issue_date()).await;

        let err = execute(
            Command::ExportClients {
                format: "xml".to_string(),
                output: None,
            },
            &config,
            &service,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Invoicing(domain_invoicing::InvoicingError::UnsupportedFormat(_))
        ));
    }
}
