use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::application::{CorresponsalService, DayHistory};
use crate::domain::{Cents, PlatformId, TxKind, format_money, parse_money};
use crate::io::{Exporter, LegacyImportOutcome, import_legacy_inventory};

/// Corresponsal - cash and platform-balance ledger
#[derive(Parser)]
#[command(name = "corresponsal")]
#[command(about = "A local-first balance ledger for a corresponsal bancario counter")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "corresponsal.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record a transaction
    Add {
        /// Transaction kind: retiro, envio, pago, recarga, recarga_tullave,
        /// compra_tullave, base_ingreso, base_retiro
        kind: String,

        /// Amount (e.g., "50000" or "50.000,50")
        amount: String,

        /// Description of the operation
        note: String,

        /// Target platform id (required for all kinds except base_*)
        #[arg(short, long)]
        platform: Option<PlatformId>,
    },

    /// Replace a recorded transaction, reversing its old balance effect
    Edit {
        /// Transaction id to edit
        id: i64,

        /// New transaction kind
        kind: String,

        /// New amount
        amount: String,

        /// New description
        note: String,

        /// New target platform id
        #[arg(short, long)]
        platform: Option<PlatformId>,
    },

    /// Delete a transaction, reversing its balance effect
    Delete {
        /// Transaction id to delete
        id: i64,
    },

    /// Show the cash base, every platform balance and the totals
    Balance,

    /// Show the day history grouped into the three panels
    History {
        /// Day to show (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Platform account management
    #[command(subcommand)]
    Platform(PlatformCommands),

    /// Overwrite the cash base (manual reconciliation, not a transaction)
    Base {
        /// Counted cash amount
        amount: String,
    },

    /// Overwrite several platform balances at once (id=amount pairs)
    Sync {
        /// Entries like "1=50000 2=0"
        entries: Vec<String>,
    },

    /// Start a new accounting day: clear history, zero all balances
    NewDay,

    /// Export data to CSV
    Export {
        /// What to export: transactions, balances
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Sales inventory tracker
    #[command(subcommand)]
    Sales(SalesCommands),
}

#[derive(Subcommand)]
pub enum PlatformCommands {
    /// Add a platform account
    Add {
        /// Platform display name
        name: String,

        /// Initial balance
        #[arg(short, long, default_value = "0")]
        balance: String,
    },

    /// Remove a platform account (history referencing it is kept)
    Remove {
        /// Platform id
        id: PlatformId,
    },

    /// List platform accounts
    List,

    /// Overwrite one platform balance (manual reconciliation)
    Set {
        /// Platform id
        id: PlatformId,

        /// Counted balance
        balance: String,
    },
}

#[derive(Subcommand)]
pub enum SalesCommands {
    /// Record a sale from free text, e.g. "vendí 2 gorras"
    Add {
        /// Sale command text
        text: Vec<String>,
    },

    /// Show products ranked by units sold
    List,

    /// Clear all sales counts
    Reset,

    /// One-time import of the old tracker's product->count JSON map
    ImportLegacy {
        /// Path to the legacy JSON file (consumed on success)
        input: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                CorresponsalService::init(&self.database).await?;
                println!("Initialized database: {}", self.database);
            }

            Commands::Add {
                kind,
                amount,
                note,
                platform,
            } => {
                let mut service = CorresponsalService::connect(&self.database).await?;
                let kind = parse_kind(&kind)?;
                let amount = parse_amount(&amount)?;

                let tx = service.add_transaction(kind, platform, amount, note).await?;
                println!(
                    "Recorded {} {} (id {})",
                    tx.kind,
                    format_money(tx.amount),
                    tx.id
                );
                print_balance_summary(&service);
            }

            Commands::Edit {
                id,
                kind,
                amount,
                note,
                platform,
            } => {
                let mut service = CorresponsalService::connect(&self.database).await?;
                let kind = parse_kind(&kind)?;
                let amount = parse_amount(&amount)?;

                let tx = service
                    .edit_transaction(id, kind, platform, amount, note)
                    .await?;
                println!("Updated transaction {}: {} {}", tx.id, tx.kind, format_money(tx.amount));
                print_balance_summary(&service);
            }

            Commands::Delete { id } => {
                let mut service = CorresponsalService::connect(&self.database).await?;
                service.delete_transaction(id).await?;
                println!("Deleted transaction {} (balances reversed)", id);
                print_balance_summary(&service);
            }

            Commands::Balance => {
                let service = CorresponsalService::connect(&self.database).await?;
                run_balance_command(&service);
            }

            Commands::History { date } => {
                let service = CorresponsalService::connect(&self.database).await?;
                let history = match date {
                    Some(date) => service.day_history(parse_date(&date)?),
                    None => service.today_history(),
                };
                print_history(&history);
            }

            Commands::Platform(platform_cmd) => {
                let mut service = CorresponsalService::connect(&self.database).await?;
                run_platform_command(&mut service, platform_cmd).await?;
            }

            Commands::Base { amount } => {
                let mut service = CorresponsalService::connect(&self.database).await?;
                let amount = parse_amount(&amount)?;
                service.set_cash_base(amount).await?;
                println!("Cash base set to {}", format_money(amount));
            }

            Commands::Sync { entries } => {
                let mut service = CorresponsalService::connect(&self.database).await?;
                let pairs = entries
                    .iter()
                    .map(|e| parse_sync_entry(e))
                    .collect::<Result<Vec<_>>>()?;
                service.sync_balances(&pairs).await?;
                println!("Synced {} platform balance(s)", pairs.len());
                run_balance_command(&service);
            }

            Commands::NewDay => {
                let mut service = CorresponsalService::connect(&self.database).await?;
                service.reset_day().await?;
                println!("Day reset: history cleared, all balances zeroed.");
                println!("Enter the opening balances with 'sync' or 'platform set'.");
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = CorresponsalService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref())?;
            }

            Commands::Sales(sales_cmd) => {
                let mut service = CorresponsalService::connect(&self.database).await?;
                run_sales_command(&mut service, sales_cmd).await?;
            }
        }

        Ok(())
    }
}

fn parse_kind(input: &str) -> Result<TxKind> {
    TxKind::from_str(input).with_context(|| {
        format!(
            "Invalid transaction kind '{}'. Valid kinds: {}",
            input,
            TxKind::ALL.map(|k| k.as_str()).join(", ")
        )
    })
}

fn parse_amount(input: &str) -> Result<Cents> {
    parse_money(input).with_context(|| format!("Invalid amount: '{}'", input))
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", input))
}

fn parse_sync_entry(entry: &str) -> Result<(PlatformId, Cents)> {
    let (id, amount) = entry
        .split_once('=')
        .with_context(|| format!("Invalid sync entry '{}' (expected id=amount)", entry))?;
    let id: PlatformId = id
        .trim()
        .parse()
        .with_context(|| format!("Invalid platform id in '{}'", entry))?;
    Ok((id, parse_amount(amount.trim())?))
}

fn print_balance_summary(service: &CorresponsalService) {
    let sheet = service.balance_sheet();
    println!(
        "Base: {}  |  Plataformas: {}  |  Total: {}",
        format_money(sheet.cash_base),
        format_money(sheet.platforms_total),
        format_money(sheet.grand_total)
    );
}

fn run_balance_command(service: &CorresponsalService) {
    let sheet = service.balance_sheet();

    println!("{:<6} {:<20} {:>18}", "ID", "ACCOUNT", "BALANCE");
    println!("{}", "-".repeat(46));
    println!(
        "{:<6} {:<20} {:>18}",
        "-",
        "Base (efectivo)",
        format_money(sheet.cash_base)
    );
    for line in &sheet.platforms {
        println!(
            "{:<6} {:<20} {:>18}",
            line.platform_id,
            line.platform_name,
            format_money(line.balance)
        );
    }
    println!("{}", "-".repeat(46));
    println!(
        "{:<6} {:<20} {:>18}",
        "",
        "Plataformas",
        format_money(sheet.platforms_total)
    );
    println!(
        "{:<6} {:<20} {:>18}",
        "",
        "TOTAL",
        format_money(sheet.grand_total)
    );
}

fn print_history(history: &DayHistory) {
    println!("History for {}", history.day);
    if history.is_empty() {
        println!("No transactions recorded.");
        return;
    }

    for panel in history.panels() {
        println!();
        println!(
            "== {} (net {}) ==",
            panel.bucket.label(),
            format_money(panel.net_flow)
        );
        if panel.entries.is_empty() {
            println!("  (none)");
            continue;
        }
        for entry in &panel.entries {
            let tx = &entry.transaction;
            let note = if tx.note.is_empty() {
                String::new()
            } else {
                format!(" - {}", tx.note)
            };
            println!(
                "  [{}] {} {}{} {:>15}",
                tx.id,
                tx.timestamp.format("%H:%M:%S"),
                entry.display_name,
                note,
                format_money(tx.amount)
            );
        }
    }
}

async fn run_platform_command(
    service: &mut CorresponsalService,
    cmd: PlatformCommands,
) -> Result<()> {
    match cmd {
        PlatformCommands::Add { name, balance } => {
            let balance = parse_amount(&balance)?;
            let platform = service.add_platform(name, balance).await?;
            println!(
                "Added platform {} (id {}) with balance {}",
                platform.name,
                platform.id,
                format_money(platform.balance)
            );
        }

        PlatformCommands::Remove { id } => {
            let removed = service.remove_platform(id).await?;
            println!("Removed platform {} (id {})", removed.name, removed.id);
            println!("Past transactions keep referencing it; their platform leg");
            println!("is skipped if they are ever reversed.");
        }

        PlatformCommands::List => {
            let sheet = service.balance_sheet();
            if sheet.platforms.is_empty() {
                println!("No platforms configured.");
            } else {
                println!("{:<6} {:<20} {:>18}", "ID", "NAME", "BALANCE");
                println!("{}", "-".repeat(46));
                for line in &sheet.platforms {
                    println!(
                        "{:<6} {:<20} {:>18}",
                        line.platform_id,
                        line.platform_name,
                        format_money(line.balance)
                    );
                }
            }
        }

        PlatformCommands::Set { id, balance } => {
            let balance = parse_amount(&balance)?;
            service.set_platform_balance(id, balance).await?;
            println!("Platform {} balance set to {}", id, format_money(balance));
        }
    }
    Ok(())
}

fn run_export_command(
    service: &CorresponsalService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        ),
        None => Box::new(stdout()),
    };

    match export_type {
        "transactions" => {
            let count = exporter.export_transactions_csv(writer)?;
            if output.is_some() {
                eprintln!("Exported {} transaction(s)", count);
            }
        }
        "balances" => {
            exporter.export_balances_csv(writer)?;
        }
        other => anyhow::bail!(
            "Unknown export type '{}'. Valid types: transactions, balances",
            other
        ),
    }
    Ok(())
}

async fn run_sales_command(service: &mut CorresponsalService, cmd: SalesCommands) -> Result<()> {
    match cmd {
        SalesCommands::Add { text } => {
            let text = text.join(" ");
            let sale = service.record_sale_text(&text).await?;
            println!("Registrado: {} {}", sale.quantity, sale.product);
        }

        SalesCommands::List => {
            let ranked = service.sales_ranked();
            if ranked.is_empty() {
                println!("No hay ventas registradas.");
            } else {
                println!("{:<6} {:<24} {:>8}", "RANK", "PRODUCT", "SOLD");
                println!("{}", "-".repeat(40));
                for (i, (product, count)) in ranked.iter().enumerate() {
                    println!("#{:<5} {:<24} {:>8}", i + 1, product, count);
                }
            }
        }

        SalesCommands::Reset => {
            service.reset_sales().await?;
            println!("Inventario borrado.");
        }

        SalesCommands::ImportLegacy { input } => {
            let outcome =
                import_legacy_inventory(service, std::path::Path::new(&input)).await?;
            match outcome {
                LegacyImportOutcome::Imported { products, units } => {
                    println!(
                        "Imported {} product(s), {} unit(s). Source consumed.",
                        products, units
                    );
                }
                LegacyImportOutcome::SourceMissing => {
                    println!("Nothing to import: source absent or already consumed.");
                }
            }
        }
    }
    Ok(())
}
