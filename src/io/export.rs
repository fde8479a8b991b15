use std::io::Write;

use anyhow::Result;

use crate::application::LedgerService;
use crate::domain::{TIMESTAMP_FORMAT, format_cents};

/// Exporter for turning an account's data into CSV.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export the statement to CSV, newest entry first.
    pub async fn export_statement_csv<W: Write>(
        &self,
        identity: &str,
        credential: &str,
        writer: W,
    ) -> Result<usize> {
        let account = self.service.authenticate(identity, credential).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["timestamp", "kind", "amount", "detail"])?;

        let mut count = 0;
        for transaction in &account.transaction_log {
            csv_writer.write_record([
                transaction.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                transaction.kind.as_str().to_string(),
                format_cents(transaction.amount_cents),
                transaction.detail.clone(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export current holdings to CSV.
    pub async fn export_holdings_csv<W: Write>(
        &self,
        identity: &str,
        credential: &str,
        writer: W,
    ) -> Result<usize> {
        let account = self.service.authenticate(identity, credential).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["ticker", "quantity", "average_cost"])?;

        let mut count = 0;
        for (ticker, position) in &account.holdings {
            csv_writer.write_record([
                ticker.clone(),
                position.quantity.to_string(),
                format_cents(position.average_cost_cents),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}
