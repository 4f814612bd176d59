use std::io::{Read, Write};

use serde::Deserialize;

use super::account::{Account, AccountId};
use super::error::{Error, LedgerError};
use super::record::TransactionRecord;
use super::request::{TransferRequest, TransferRow};
use super::retry::RetryPolicy;
use super::store::{AccountStore, LedgerStore};
use super::transfer_engine::TransferEngine;
use super::view::{AccountView, TransactionReceipt};

#[derive(Debug, Deserialize)]
struct AccountRow {
    account: String,
}

/// Counts from one `process_requests` run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub applied: u64,
    pub rejected: u64,
}

/// Drives a `TransferEngine` from CSV input.
///
/// Rejected requests are logged and skipped; malformed CSV stops the run.
#[derive(Debug)]
pub struct BatchProcessor<A, L> {
    engine: TransferEngine<A, L>,
    retry: RetryPolicy,
    /// Accounts registered through `load_accounts`, in load order
    accounts: Vec<AccountId>,
    /// Records produced by `process_requests`, in input order
    records: Vec<TransactionRecord>,
}

impl<A: AccountStore, L: LedgerStore> BatchProcessor<A, L> {
    pub fn new(engine: TransferEngine<A, L>, retry: RetryPolicy) -> Self {
        Self {
            engine,
            retry,
            accounts: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn engine(&self) -> &TransferEngine<A, L> {
        &self.engine
    }

    /// Records applied so far
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Register every account listed in a CSV with an `account` column.
    /// Note that the CSV reader is buffered automatically, so you should not wrap rdr in a buffered reader like `io::BufReader`.
    pub fn load_accounts<R: Read>(&mut self, reader: R) -> Result<usize, Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut ids = Vec::new();
        for result in csv_reader.deserialize() {
            let row: AccountRow = result?;
            let id = row
                .account
                .parse::<AccountId>()
                .map_err(|e| LedgerError::InvalidRequest {
                    reason: format!("malformed account id {:?}: {e}", row.account),
                })?;
            ids.push(id);
        }

        let created = self.engine.register_accounts(ids)?;
        self.accounts.extend(created.iter().map(Account::id));

        log::info!("Registered {} accounts", created.len());
        Ok(created.len())
    }

    /// Apply every request in a CSV of `TransferRow`s.
    pub fn process_requests<R: Read>(&mut self, reader: R) -> Result<BatchSummary, Error> {
        log::info!("Starting request processing");

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut summary = BatchSummary::default();

        for result in csv_reader.deserialize() {
            // Step 1: Parse CSV into a raw TransferRow
            let row: TransferRow = result?;

            let row_num = summary.applied + summary.rejected + 1;
            log::trace!("[row {row_num}] Parsing: {row}");

            // Step 2: Validate and apply, retrying conflicts per policy
            let outcome = TransferRequest::try_from(row)
                .and_then(|request| self.retry.apply(&self.engine, &request));

            match outcome {
                Ok(record) => {
                    self.records.push(record);
                    summary.applied += 1;
                }
                Err(e) => {
                    log::warn!("[row {row_num}] - Rejected ({}): {e}", e.kind());
                    summary.rejected += 1;
                }
            }
        }

        log::info!(
            "Processing complete: {} applied, {} rejected",
            summary.applied,
            summary.rejected
        );
        Ok(summary)
    }

    /// Write every applied record in full.
    pub fn export_records<W: Write>(&self, writer: W) -> Result<(), Error> {
        log::info!("Exporting {} records", self.records.len());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the reduced `{id, balance, created_at}` view of every applied record.
    pub fn export_receipts<W: Write>(&self, writer: W) -> Result<(), Error> {
        log::info!("Exporting {} receipts", self.records.len());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv_writer.serialize(TransactionReceipt::from(record))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the current balance of every loaded account.
    pub fn export_accounts<W: Write>(&self, writer: W) -> Result<(), Error> {
        log::info!("Exporting {} accounts", self.accounts.len());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for id in &self.accounts {
            let account = self.engine.get_account(id)?;
            csv_writer.serialize(AccountView::from(&account))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
