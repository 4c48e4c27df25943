use std::io::Write;

use anyhow::Result;

use crate::application::CorresponsalService;
use crate::domain::format_money;

/// Exporter for dumping the transaction log out of the ledger.
pub struct Exporter<'a> {
    service: &'a CorresponsalService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a CorresponsalService) -> Self {
        Self { service }
    }

    /// Write the full transaction log as CSV, append order.
    pub fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let ledger = self.service.ledger();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "kind",
            "platform_id",
            "platform_name",
            "amount",
            "note",
            "timestamp",
        ])?;

        let mut count = 0;
        for transaction in ledger.transactions() {
            let platform_name = transaction
                .platform_id
                .and_then(|id| ledger.find_platform(id))
                .map(|p| p.name.clone())
                .unwrap_or_default();

            csv_writer.write_record([
                transaction.id.to_string(),
                transaction.kind.to_string(),
                transaction
                    .platform_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                platform_name,
                format_money(transaction.amount),
                transaction.note.clone(),
                transaction.timestamp.to_rfc3339(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Write the current balances as CSV, cash base first.
    pub fn export_balances_csv<W: Write>(&self, writer: W) -> Result<()> {
        let sheet = self.service.balance_sheet();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["account", "balance"])?;
        csv_writer.write_record([
            "Base (efectivo)".to_string(),
            format_money(sheet.cash_base),
        ])?;
        for line in &sheet.platforms {
            csv_writer
                .write_record([line.platform_name.clone(), format_money(line.balance)])?;
        }
        csv_writer.write_record(["TOTAL".to_string(), format_money(sheet.grand_total)])?;

        csv_writer.flush()?;
        Ok(())
    }
}
