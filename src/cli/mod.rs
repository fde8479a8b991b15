use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::application::LedgerService;
use crate::domain::{TIMESTAMP_FORMAT, TradeSide, format_cents, parse_cents};

/// Bancario - Personal Banking Ledger
#[derive(Parser)]
#[command(name = "bancario")]
#[command(about = "A local-first personal banking ledger with simulated investments")]
#[command(version)]
pub struct Cli {
    /// Account store file path
    #[arg(short, long, default_value = "bancario.json")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a new account
    Register {
        /// Account holder's display name
        name: String,

        /// Identity number (formatting characters are accepted)
        identity: String,

        /// Account credential
        credential: String,
    },

    /// Show the account overview (settles due dividends first)
    Account {
        identity: String,
        credential: String,
    },

    /// Deposit money into the account
    Deposit {
        identity: String,
        credential: String,

        /// Amount to deposit (e.g., "50.00" or "50")
        amount: String,
    },

    /// Withdraw money from the account
    Withdraw {
        identity: String,
        credential: String,

        /// Amount to withdraw (e.g., "50.00" or "50")
        amount: String,
    },

    /// Send money to another account by identity number
    Send {
        identity: String,
        credential: String,

        /// Recipient's identity number
        recipient: String,

        /// Amount to send (e.g., "50.00" or "50")
        amount: String,
    },

    /// Show current market quotes and the dividend calendar
    Market,

    /// Buy shares at the current quoted price
    Buy {
        identity: String,
        credential: String,

        /// Ticker symbol (e.g., PETR4)
        ticker: String,

        /// Number of shares
        quantity: u32,
    },

    /// Sell shares at the current quoted price
    Sell {
        identity: String,
        credential: String,

        /// Ticker symbol (e.g., PETR4)
        ticker: String,

        /// Number of shares
        quantity: u32,
    },

    /// Settle any dividends due today or earlier
    Dividends {
        identity: String,
        credential: String,
    },

    /// Show recent statement entries
    Statement {
        identity: String,
        credential: String,

        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Export account data to CSV
    Export {
        identity: String,
        credential: String,

        /// What to export: statement, holdings
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let service = LedgerService::open(&self.database);

        match self.command {
            Commands::Register {
                name,
                identity,
                credential,
            } => {
                let account = service.register(name, &identity, credential).await?;
                println!(
                    "Account created for {} ({})",
                    account.name, account.identity_number
                );
            }

            Commands::Account {
                identity,
                credential,
            } => {
                run_account_command(&service, &identity, &credential).await?;
            }

            Commands::Deposit {
                identity,
                credential,
                amount,
            } => {
                let account = service.authenticate(&identity, &credential).await?;
                let amount_cents = parse_amount(&amount)?;
                let updated = service
                    .deposit(&account.identity_number, amount_cents)
                    .await?;
                println!(
                    "Deposited {}. Balance: {}",
                    format_cents(amount_cents),
                    format_cents(updated.balance_cents)
                );
            }

            Commands::Withdraw {
                identity,
                credential,
                amount,
            } => {
                let account = service.authenticate(&identity, &credential).await?;
                let amount_cents = parse_amount(&amount)?;
                let updated = service
                    .withdraw(&account.identity_number, amount_cents)
                    .await?;
                println!(
                    "Withdrew {}. Balance: {}",
                    format_cents(amount_cents),
                    format_cents(updated.balance_cents)
                );
            }

            Commands::Send {
                identity,
                credential,
                recipient,
                amount,
            } => {
                let account = service.authenticate(&identity, &credential).await?;
                let amount_cents = parse_amount(&amount)?;
                let receipt = service
                    .transfer(&account.identity_number, &recipient, amount_cents)
                    .await?;
                println!(
                    "Sent {} to {}. Balance: {}",
                    format_cents(receipt.amount_cents),
                    receipt.recipient_name,
                    format_cents(receipt.sender.balance_cents)
                );
            }

            Commands::Market => {
                run_market_command(&service);
            }

            Commands::Buy {
                identity,
                credential,
                ticker,
                quantity,
            } => {
                let account = service.authenticate(&identity, &credential).await?;
                let quote = service.quote(&ticker)?;
                let updated = service
                    .invest(
                        &account.identity_number,
                        &ticker,
                        quantity,
                        quote.price_cents,
                        TradeSide::Buy,
                    )
                    .await?;
                println!(
                    "Bought {}x {} at {}. Balance: {}",
                    quantity,
                    ticker,
                    format_cents(quote.price_cents),
                    format_cents(updated.balance_cents)
                );
            }

            Commands::Sell {
                identity,
                credential,
                ticker,
                quantity,
            } => {
                let account = service.authenticate(&identity, &credential).await?;
                let quote = service.quote(&ticker)?;
                let updated = service
                    .invest(
                        &account.identity_number,
                        &ticker,
                        quantity,
                        quote.price_cents,
                        TradeSide::Sell,
                    )
                    .await?;
                println!(
                    "Sold {}x {} at {}. Balance: {}",
                    quantity,
                    ticker,
                    format_cents(quote.price_cents),
                    format_cents(updated.balance_cents)
                );
            }

            Commands::Dividends {
                identity,
                credential,
            } => {
                let account = service.authenticate(&identity, &credential).await?;
                let settlement = service
                    .settle_dividends(&account.identity_number, Local::now().date_naive())
                    .await?;

                if settlement.payments.is_empty() {
                    println!("No dividends due.");
                } else {
                    for payment in &settlement.payments {
                        println!(
                            "{}: {}",
                            payment.ticker,
                            format_cents(payment.amount_cents)
                        );
                    }
                    println!(
                        "Received {}. Balance: {}",
                        format_cents(settlement.total_cents),
                        format_cents(settlement.account.balance_cents)
                    );
                }
            }

            Commands::Statement {
                identity,
                credential,
                limit,
            } => {
                let entries = service.statement(&identity, &credential, limit).await?;
                if entries.is_empty() {
                    println!("No transactions yet.");
                } else {
                    println!(
                        "{:<18} {:<18} {:>12}  {}",
                        "DATE", "KIND", "AMOUNT", "DETAIL"
                    );
                    println!("{}", "-".repeat(60));
                    for entry in entries {
                        println!(
                            "{:<18} {:<18} {:>12}  {}",
                            entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                            entry.kind.as_str(),
                            format_cents(entry.amount_cents),
                            entry.detail
                        );
                    }
                }
            }

            Commands::Export {
                identity,
                credential,
                export_type,
                output,
            } => {
                run_export_command(&service, &identity, &credential, &export_type, output).await?;
            }
        }

        Ok(())
    }
}

async fn run_account_command(
    service: &LedgerService,
    identity: &str,
    credential: &str,
) -> Result<()> {
    let account = service.authenticate(identity, credential).await?;
    let today = Local::now().date_naive();

    // Dividends due since the last visit are settled before rendering
    let settlement = service
        .settle_dividends(&account.identity_number, today)
        .await?;
    if settlement.total_cents > 0 {
        println!(
            "Dividends received: {}",
            format_cents(settlement.total_cents)
        );
    }
    let account = settlement.account;

    println!("Account: {}", account.name);
    println!("  Identity: {}", account.identity_number);
    println!("  Balance:  {}", format_cents(account.balance_cents));

    if !account.holdings.is_empty() {
        println!();
        println!("  {:<8} {:>8} {:>12}", "TICKER", "QTY", "AVG COST");
        for (ticker, position) in &account.holdings {
            println!(
                "  {:<8} {:>8} {:>12}",
                ticker,
                position.quantity,
                format_cents(position.average_cost_cents)
            );
        }

        let schedule = service.dividend_schedule(today);
        let upcoming: Vec<_> = schedule
            .iter()
            .filter(|(ticker, _)| account.position(ticker).is_some())
            .collect();
        if !upcoming.is_empty() {
            println!();
            println!("  Upcoming dividends:");
            for (ticker, entry) in upcoming {
                let held = account.position(ticker).map_or(0, |p| p.quantity);
                println!(
                    "  {:<8} {} ({}): {}",
                    ticker,
                    entry.payment_date.format("%d/%m/%Y"),
                    entry.status,
                    format_cents(entry.per_share_cents * held as i64)
                );
            }
        }
    }

    Ok(())
}

fn run_market_command(service: &LedgerService) {
    println!("{:<8} {:<16} {:>10} {:>8}", "TICKER", "NAME", "PRICE", "VAR%");
    println!("{}", "-".repeat(46));
    for quote in service.quotes().values() {
        println!(
            "{:<8} {:<16} {:>10} {:>7.2}%",
            quote.ticker,
            quote.name,
            format_cents(quote.price_cents),
            quote.change_pct
        );
    }

    let schedule = service.dividend_schedule(Local::now().date_naive());
    if !schedule.is_empty() {
        println!();
        println!("{:<8} {:>10} {:<12} {}", "TICKER", "PER SHARE", "PAYMENT", "STATUS");
        println!("{}", "-".repeat(46));
        for (ticker, entry) in &schedule {
            println!(
                "{:<8} {:>10} {:<12} {}",
                ticker,
                format_cents(entry.per_share_cents),
                entry.payment_date.format("%d/%m/%Y").to_string(),
                entry.status
            );
        }
    }
}

async fn run_export_command(
    service: &LedgerService,
    identity: &str,
    credential: &str,
    export_type: &str,
    output: Option<String>,
) -> Result<()> {
    use std::fs::File;
    use std::io::{Write, stdout};

    use crate::io::Exporter;

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match export_type {
        "statement" => {
            exporter
                .export_statement_csv(identity, credential, writer)
                .await?
        }
        "holdings" => {
            exporter
                .export_holdings_csv(identity, credential, writer)
                .await?
        }
        other => {
            anyhow::bail!("Unknown export type '{other}'. Valid types: statement, holdings")
        }
    };

    if let Some(path) = output {
        println!("Exported {count} record(s) to {path}");
    }

    Ok(())
}

fn parse_amount(raw: &str) -> Result<i64> {
    parse_cents(raw).context("Invalid amount format. Use '50.00' or '50'")
}
