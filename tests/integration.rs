//! Integration tests for the `TransferEngine`.
//!
//! These tests exercise the public API end to end: concurrent callers racing on
//! one account, CSV input → processing → CSV output, and the outbound views.
use std::io::Cursor;
use std::sync::{Arc, Barrier};
use std::thread;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use wallet_ledger::{
    Account, AccountId, AccountStore, AccountView, BatchProcessor, Error, ErrorKind,
    InMemoryAccountStore, InMemoryLedgerStore, LedgerError, RetryPolicy, StoreError,
    TransactionKind, TransactionReceipt, TransactionRecord, TransferEngine, TransferRequest,
};

type MemoryEngine = TransferEngine<Arc<InMemoryAccountStore>, Arc<InMemoryLedgerStore>>;

fn shared_engine() -> (MemoryEngine, Arc<InMemoryAccountStore>, Arc<InMemoryLedgerStore>) {
    let accounts = Arc::new(InMemoryAccountStore::new());
    let ledger = Arc::new(InMemoryLedgerStore::new());
    let engine = TransferEngine::new(Arc::clone(&accounts), Arc::clone(&ledger));
    (engine, accounts, ledger)
}

/// Holds every reader at a barrier so all of them observe the same balance
/// before any of them writes.
struct LockstepAccountStore {
    inner: InMemoryAccountStore,
    barrier: Barrier,
}

impl AccountStore for LockstepAccountStore {
    fn get(&self, id: &AccountId) -> Result<Account, StoreError> {
        let account = self.inner.get(id)?;
        self.barrier.wait();
        Ok(account)
    }

    fn create_batch(&self, accounts: Vec<Account>) -> Result<Vec<Account>, StoreError> {
        self.inner.create_batch(accounts)
    }

    fn compare_and_set_balance(
        &self,
        id: &AccountId,
        expected: Decimal,
        new_balance: Decimal,
    ) -> Result<u64, StoreError> {
        self.inner.compare_and_set_balance(id, expected, new_balance)
    }
}

#[test]
fn test_racing_mutations_apply_exactly_one() {
    let account = AccountId::new();
    let inner = InMemoryAccountStore::new();
    inner.create_batch(vec![Account::new(account)]).unwrap();
    inner
        .compare_and_set_balance(&account, Decimal::ZERO, dec!(100.00))
        .unwrap();

    let engine = TransferEngine::new(
        LockstepAccountStore {
            inner,
            barrier: Barrier::new(2),
        },
        InMemoryLedgerStore::new(),
    );

    let deposit = TransferRequest::deposit(account, dec!(50.00));
    let withdrawal = TransferRequest::withdraw(account, dec!(30.00));

    let (first, second) = thread::scope(|s| {
        let a = s.spawn(|| engine.apply(&deposit));
        let b = s.spawn(|| engine.apply(&withdrawal));
        (a.join().unwrap(), b.join().unwrap())
    });

    let outcomes = [&first, &second];
    let succeeded: Vec<&TransactionRecord> =
        outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
    let conflicts = outcomes
        .iter()
        .filter(|o| matches!(o, Err(LedgerError::BalanceConflict { .. })))
        .count();

    assert_eq!(succeeded.len(), 1);
    assert_eq!(conflicts, 1);

    // The stored balance reflects exactly the winning mutation
    let winner = succeeded[0];
    let expected = match winner.kind() {
        TransactionKind::Deposit => dec!(150),
        TransactionKind::Withdraw => dec!(70),
    };
    assert_eq!(winner.balance_before(), dec!(100));
    assert_eq!(winner.balance_after(), expected);
    assert_eq!(engine.accounts().inner.get(&account).unwrap().balance(), expected);
    assert_eq!(engine.ledger().len(), 1);
}

#[test]
fn test_contended_deposits_with_retry_never_lose_updates() {
    const THREADS: usize = 8;
    const DEPOSITS_PER_THREAD: usize = 50;

    let (engine, accounts, ledger) = shared_engine();
    let account = engine.open_accounts(1).unwrap()[0].id();
    let retry = RetryPolicy::new(u32::MAX, std::time::Duration::ZERO);

    let engine = &engine;
    let records: Vec<TransactionRecord> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(move || {
                    (0..DEPOSITS_PER_THREAD)
                        .map(|_| {
                            retry
                                .apply(engine, &TransferRequest::deposit(account, dec!(0.01)))
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let applied = THREADS * DEPOSITS_PER_THREAD;
    assert_eq!(records.len(), applied);
    assert_eq!(ledger.len(), applied);
    assert_eq!(accounts.get(&account).unwrap().balance(), dec!(4.00));

    // Every record starts from the balance the previous one left behind
    let mut chain = records.clone();
    chain.sort_by_key(TransactionRecord::balance_before);
    let mut balance = Decimal::ZERO;
    for record in &chain {
        assert_eq!(record.balance_before(), balance);
        assert_eq!(record.balance_after(), record.balance_before() + record.amount());
        balance = record.balance_after();
    }
    assert_eq!(balance, dec!(4));
}

#[test]
fn test_applied_records_are_retrievable_unchanged() {
    let (engine, _, _) = shared_engine();
    let account = engine.open_accounts(1).unwrap()[0].id();

    let requests = [
        TransferRequest::deposit(account, dec!(100.00)).with_currency("USD"),
        TransferRequest::withdraw(account, dec!(0.01)).with_currency("USD"),
        TransferRequest::deposit(account, dec!(12.345)).with_currency("USD"),
    ];

    for request in &requests {
        let record = engine.apply(request).unwrap();
        assert_eq!(engine.get_record(&record.id()).unwrap(), record);
    }
    assert_eq!(engine.get_account(&account).unwrap().balance(), dec!(112.335));
}

#[test]
fn test_stores_are_shared_through_arc() {
    let (engine, accounts, ledger) = shared_engine();
    let account = engine.open_accounts(1).unwrap()[0].id();

    engine
        .apply(&TransferRequest::deposit(account, dec!(7)))
        .unwrap();

    assert_eq!(accounts.get(&account).unwrap().balance(), dec!(7));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_error_kinds_for_outer_layers() {
    let (engine, _, _) = shared_engine();
    let account = engine.open_accounts(1).unwrap()[0].id();

    let kind = |request: TransferRequest| engine.apply(&request).unwrap_err().kind();

    assert_eq!(
        kind(TransferRequest::deposit(account, Decimal::ZERO)),
        ErrorKind::InvalidRequest
    );
    assert_eq!(
        kind(TransferRequest::deposit(AccountId::new(), dec!(1))),
        ErrorKind::NotFound
    );
    assert_eq!(
        kind(TransferRequest::withdraw(account, dec!(1))),
        ErrorKind::InsufficientFunds
    );
}

// ============================================================================
// CSV front end
// ============================================================================

fn processor_with(ids: &[AccountId]) -> BatchProcessor<InMemoryAccountStore, InMemoryLedgerStore> {
    let engine = TransferEngine::new(InMemoryAccountStore::new(), InMemoryLedgerStore::new());
    let mut batch = BatchProcessor::new(engine, RetryPolicy::default());

    let mut input = String::from("account\n");
    for id in ids {
        input.push_str(&format!("{id}\n"));
    }
    batch.load_accounts(Cursor::new(input)).unwrap();
    batch
}

fn export<F>(write: F) -> String
where
    F: FnOnce(&mut Vec<u8>) -> Result<(), Error>,
{
    let mut output = Vec::new();
    write(&mut output).unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn test_full_records_export() {
    let id = AccountId::new();
    let mut batch = processor_with(&[id]);

    let input = format!(
        "account,amount,kind,user,from_system,from_identifier,to_system,to_identifier,currency,description
{id},50.0,deposit,user_1,Bank,bank_account_123,Wallet,wallet_id_456,USD,Test deposit
{id},20.5,withdraw,,Wallet,wallet_id_456,Bank,bank_account_123,USD,Test withdrawal"
    );
    batch.process_requests(Cursor::new(input)).unwrap();

    let output = export(|w| batch.export_records(w));
    let mut rdr = csv::Reader::from_reader(output.as_bytes());
    let records: Vec<TransactionRecord> = rdr.deserialize().map(|r| r.unwrap()).collect();

    assert_eq!(records, batch.records());
    assert_eq!(records[0].user_id(), Some("user_1"));
    assert_eq!(records[0].from_identifier(), "bank_account_123");
    assert_eq!(records[0].balance_after(), dec!(50));
    assert_eq!(records[1].user_id(), None);
    assert_eq!(records[1].kind(), TransactionKind::Withdraw);
    assert_eq!(records[1].balance_before(), dec!(50));
    assert_eq!(records[1].balance_after(), dec!(29.5));
}

#[test]
fn test_receipts_export() {
    let id = AccountId::new();
    let mut batch = processor_with(&[id]);

    let input = format!(
        "account,amount,kind,currency
{id},100.009,deposit,USD"
    );
    batch.process_requests(Cursor::new(input)).unwrap();

    let output = export(|w| batch.export_receipts(w));
    let mut rdr = csv::Reader::from_reader(output.as_bytes());
    let receipts: Vec<TransactionReceipt> = rdr.deserialize().map(|r| r.unwrap()).collect();

    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].id, batch.records()[0].id());
    assert_eq!(receipts[0].balance, dec!(100.00));
}

#[test]
fn test_accounts_export() {
    let (a, b) = (AccountId::new(), AccountId::new());
    let mut batch = processor_with(&[a, b]);

    let input = format!(
        "account,amount,kind,currency
{a},100.0,deposit,USD
{b},200.0,deposit,USD
{a},30.0,withdraw,USD
{b},250.0,withdraw,USD"
    );
    let summary = batch.process_requests(Cursor::new(input)).unwrap();
    assert_eq!(summary.applied, 3);
    assert_eq!(summary.rejected, 1);

    let output = export(|w| batch.export_accounts(w));
    let mut rdr = csv::Reader::from_reader(output.as_bytes());
    let views: Vec<AccountView> = rdr.deserialize().map(|r| r.unwrap()).collect();

    assert_eq!(views.len(), 2);
    let view_a = views.iter().find(|v| v.account_id == a).unwrap();
    let view_b = views.iter().find(|v| v.account_id == b).unwrap();
    assert_eq!(view_a.balance, dec!(70));
    assert_eq!(view_b.balance, dec!(200));
}

#[test]
fn test_whitespace_handling() {
    let id = AccountId::new();
    let mut batch = processor_with(&[id]);

    let input = format!(
        "account , amount , kind , currency
 {id} ,  10.5 , deposit , USD "
    );
    let summary = batch.process_requests(Cursor::new(input)).unwrap();

    assert_eq!(summary.applied, 1);
    assert_eq!(batch.records()[0].currency(), "USD");
}

#[test]
fn test_unknown_account_row_is_rejected() {
    let id = AccountId::new();
    let mut batch = processor_with(&[id]);

    let input = format!(
        "account,amount,kind,currency
{},10,deposit,USD
some_wallet_id,10,deposit,USD
{id},10,deposit,USD",
        AccountId::new()
    );
    let summary = batch.process_requests(Cursor::new(input)).unwrap();

    assert_eq!(summary.applied, 1);
    assert_eq!(summary.rejected, 2);
}

#[test]
fn test_malformed_amount_is_a_hard_error() {
    let id = AccountId::new();
    let mut batch = processor_with(&[id]);

    let input = format!(
        "account,amount,kind,currency
{id},ten,deposit,USD"
    );
    assert!(matches!(
        batch.process_requests(Cursor::new(input)),
        Err(Error::Csv(_))
    ));
}
