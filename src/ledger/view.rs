use chrono::{DateTime, Utc};
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use super::account::{Account, AccountId};
use super::record::{TransactionId, TransactionRecord};
use super::Decimal;

/// Places kept on the balance shown in a receipt.
const RECEIPT_SCALE: u32 = 2;

/// Reduced view of a transaction returned right after it was applied.
///
/// The balance is the post-transaction balance floored to cents, so a receipt
/// never shows more money than the account holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub id: TransactionId,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<&TransactionRecord> for TransactionReceipt {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            id: record.id(),
            balance: record
                .balance_after()
                .round_dp_with_strategy(RECEIPT_SCALE, RoundingStrategy::ToNegativeInfinity),
            created_at: record.created_at(),
        }
    }
}

/// Current balance of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    #[serde(rename = "account")]
    pub account_id: AccountId,
    pub balance: Decimal,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id(),
            balance: account.balance(),
        }
    }
}
