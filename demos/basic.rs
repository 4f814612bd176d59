//! Basic example of using the `TransferEngine`.
//!
//! Run with: `cargo run --example basic`

use rust_decimal_macros::dec;
use wallet_ledger::{
    InMemoryAccountStore, InMemoryLedgerStore, RetryPolicy, TransactionReceipt, TransferEngine,
    TransferRequest,
};

fn main() {
    // Initialize logger (optional, but shows what's happening)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let engine = TransferEngine::new(InMemoryAccountStore::new(), InMemoryLedgerStore::new());
    let account = engine.open_accounts(1).expect("Failed to open account")[0].id();
    let retry = RetryPolicy::default();

    let deposit = TransferRequest::deposit(account, dec!(100.00))
        .with_source("Bank", "bank_account_123")
        .with_destination("Wallet", &account.to_string())
        .with_currency("USD")
        .with_description("Top up");
    let record = retry.apply(&engine, &deposit).expect("Deposit failed");
    println!("{record}");

    let withdrawal = TransferRequest::withdraw(account, dec!(30.555))
        .with_source("Wallet", &account.to_string())
        .with_destination("Card", "card_789")
        .with_currency("USD")
        .with_description("Groceries");
    let record = retry.apply(&engine, &withdrawal).expect("Withdrawal failed");
    println!("{record}");

    let receipt = TransactionReceipt::from(&record);
    println!(
        "\n=== Receipt ===\nid={} balance={} created_at={}",
        receipt.id, receipt.balance, receipt.created_at
    );

    match engine.apply(&TransferRequest::withdraw(account, dec!(1000))) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("\nRejected ({}): {e}", e.kind()),
    }
}
