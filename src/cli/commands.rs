pub(crate) use clap::Parser;
use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "wallet-ledger",
    author,
    version,
    about = "Apply deposits and withdrawals to wallet accounts",
    long_about = None,
    after_help = "OUTPUT:\n    Results are printed to stdout in CSV format.\n    Use shell redirection to save to a file:\n\n    wallet-ledger --accounts accounts.csv requests.csv > records.csv"
)]
pub struct Args {
    /// Path to the transfer requests CSV file
    #[arg(
        index = 1,
        value_name = "FILE",
        help = "Input CSV file with columns: account, amount, kind, currency, [user, from_system, from_identifier, to_system, to_identifier, description]"
    )]
    pub requests_file: PathBuf,

    /// Path to the CSV file listing the accounts to open
    #[arg(long, value_name = "FILE", help = "CSV file with an `account` column of account ids")]
    pub accounts: PathBuf,

    /// Total attempts per request, counting the first, when the balance changes underneath it
    #[arg(long, default_value_t = 3)]
    pub max_attempts: u32,

    /// Backoff between conflicting attempts, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub backoff_ms: u64,

    /// What to print once all requests are processed
    #[arg(long, value_enum, default_value_t = Output::Records)]
    pub output: Output,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Every applied transaction record in full
    Records,
    /// The reduced id, balance, created_at view per record
    Receipts,
    /// Final balance of every account
    Accounts,
}
