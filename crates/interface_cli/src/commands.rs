//! Subcommands of the `invoicer` binary

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing::info;

use document_layout::{PdfInvoiceGenerator, RenderOptions};
use domain_invoicing::{
    Client, ClientDirectory, CounterStore, ExchangeFormat, InvoiceDraft, InvoiceStatus,
    InvoicingService, NewClient,
};
use infra_db::{write_atomic, JsonDirectoryStore};

use crate::config::AppConfig;
use crate::error::CliError;

/// Issue invoices and manage clients for one company
#[derive(Debug, Parser)]
#[command(name = "invoicer", version, about)]
pub struct Cli {
    /// Configuration file; defaults to ./invoicer.toml when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Create an invoice from a JSON draft and write its PDF
    CreateInvoice {
        /// JSON file holding the draft
        #[arg(long)]
        input: PathBuf,
        /// Mark the PDF OVERDUE when the invoice is past due
        #[arg(long)]
        watermark: bool,
        /// Status to move the new invoice to, e.g. `sent`
        #[arg(long)]
        status: Option<String>,
        /// Bill a saved client by number; the draft may then leave out `client`
        #[arg(long)]
        client: Option<String>,
    },
    /// Add a client to the directory
    AddClient {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List clients
    ListClients {
        /// Include deactivated clients
        #[arg(long)]
        all: bool,
        /// Only clients whose name, email or company matches
        #[arg(long)]
        search: Option<String>,
    },
    /// Export the directory as `json` or `csv`
    ExportClients {
        #[arg(long, default_value = "json")]
        format: String,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import clients exported by `export-clients`
    ImportClients {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Show the next invoice number without using it
    NextNumber,
}

fn read_input(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Input {
        path: path.display().to_string(),
        source,
    })
}

fn as_new_client(client: &Client) -> NewClient {
    NewClient {
        name: client.name.clone(),
        email: client.email.clone(),
        address: client.address.clone(),
        phone: client.phone.clone(),
        company: client.company.clone(),
        notes: client.notes.clone(),
    }
}

fn client_line(client: &Client) -> String {
    let mut line = format!(
        "{}  {} <{}>",
        client.client_number.as_deref().unwrap_or("-"),
        client.name,
        client.email
    );
    if let Some(company) = &client.company {
        line.push_str(&format!("  {}", company));
    }
    if !client.is_active {
        line.push_str("  (inactive)");
    }
    line
}

/// Runs `command` for the service's company and returns what to print
pub async fn execute<S: CounterStore>(
    command: Command,
    config: &AppConfig,
    service: &InvoicingService<S>,
) -> Result<String, CliError> {
    let directories = JsonDirectoryStore::new(&config.data_dir);
    let tenant = service.company().id;

    match command {
        Command::CreateInvoice {
            input,
            watermark,
            status,
            client,
        } => {
            let mut draft = InvoiceDraft::from_json(&read_input(&input)?)?;
            if let Some(status) = status {
                draft.status = Some(InvoiceStatus::from_str(&status)?);
            }
            if let Some(number) = client {
                let directory = directories.load(tenant)?;
                let saved = directory
                    .get_by_number(&number)
                    .ok_or_else(|| CliError::UnknownClient(number.clone()))?;
                draft.client = Some(as_new_client(saved));
            }

            let invoice = service.create_invoice(&draft).await?;
            let options = RenderOptions::new(service.today()).with_watermark(watermark);
            let path = PdfInvoiceGenerator::new(&config.output_dir).generate(
                &invoice,
                service.company(),
                &options,
            )?;
            Ok(format!(
                "Created invoice {} for {} ({}) at {}",
                invoice.invoice_number(),
                invoice.client.name,
                invoice.format_amount(invoice.total()),
                path.display()
            ))
        }

        Command::AddClient {
            name,
            email,
            address,
            phone,
            company,
            notes,
        } => {
            let mut input = NewClient::new(name, email, address);
            input.phone = phone;
            input.company = company;
            input.notes = notes;

            let mut directory = directories.load(tenant)?;
            let client = service.add_client(&mut directory, input).await?;
            directories.save(&directory)?;
            Ok(format!("Added client {}", client_line(&client)))
        }

        Command::ListClients { all, search } => {
            let directory = directories.load(tenant)?;
            let clients = match search.as_deref() {
                Some(query) => directory.search(query, !all),
                None => directory.list(!all),
            };
            let summary = directory.summary();
            let mut lines: Vec<String> = clients.into_iter().map(client_line).collect();
            lines.push(format!(
                "{} clients ({} active, {} inactive)",
                summary.total_clients, summary.active_clients, summary.inactive_clients
            ));
            Ok(lines.join("\n"))
        }

        Command::ExportClients { format, output } => {
            let format = ExchangeFormat::from_str(&format)?;
            let directory = directories.load(tenant)?;
            let data = directory.export(format)?;
            match output {
                Some(path) => {
                    write_atomic(&path, data.as_bytes())?;
                    info!(tenant = %tenant, format = %format, path = %path.display(), "Exported clients");
                    Ok(format!("Exported {} clients to {}", directory.len(), path.display()))
                }
                None => Ok(data),
            }
        }

        Command::ImportClients { file, format } => {
            let format = ExchangeFormat::from_str(&format)?;
            let data = read_input(&file)?;
            let mut directory: ClientDirectory = directories.load(tenant)?;
            let count = service.import_clients(&mut directory, &data, format).await?;
            directories.save(&directory)?;
            Ok(format!("Imported {} clients", count))
        }

        Command::NextNumber => Ok(service.peek_next_number().await?.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_invoice() {
        let cli = Cli::try_parse_from([
            "invoicer",
            "create-invoice",
            "--input",
            "draft.json",
            "--watermark",
            "--status",
            "sent",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::CreateInvoice {
                input: PathBuf::from("draft.json"),
                watermark: true,
                status: Some("sent".to_string()),
                client: None,
            }
        );
    }

    #[test]
    fn test_parse_defaults_and_global_config() {
        let cli = Cli::try_parse_from(["invoicer", "export-clients", "--config", "alt.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert_eq!(
            cli.command,
            Command::ExportClients {
                format: "json".to_string(),
                output: None,
            }
        );
    }

    #[test]
    fn test_add_client_requires_email() {
        assert!(Cli::try_parse_from(["invoicer", "add-client", "--name", "Acme", "--address", "x"]).is_err());
    }
}
