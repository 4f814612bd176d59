use super::account::AccountId;
use super::request::TransferRequest;
use super::Decimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

uuid_id!(
    /// Identifier assigned to a transaction record by the engine.
    TransactionId
);

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl TransactionKind {
    /// Apply this kind of mutation to `balance` with exact decimal arithmetic.
    ///
    /// Returns `None` on overflow, or when the result would have to be rounded
    /// to fit: `checked_add`/`checked_sub` drop fractional digits silently once
    /// the mantissa is full, so an exact result must keep the wider scale.
    pub fn apply_to(self, balance: Decimal, amount: Decimal) -> Option<Decimal> {
        let result = match self {
            TransactionKind::Deposit => balance.checked_add(amount),
            TransactionKind::Withdraw => balance.checked_sub(amount),
        }?;
        (result.scale() >= balance.scale().max(amount.scale())).then_some(result)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "deposit"),
            TransactionKind::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Immutable record of one applied balance mutation.
///
/// Carries the balance snapshots taken around the compare-and-set write:
/// `balance_after = balance_before + amount` for deposits and
/// `balance_after = balance_before - amount` for withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    id: TransactionId,
    #[serde(rename = "account")]
    account_id: AccountId,
    #[serde(rename = "user")]
    user_id: Option<String>,
    kind: TransactionKind,
    amount: Decimal,
    balance_before: Decimal,
    balance_after: Decimal,
    from_system: String,
    from_identifier: String,
    to_system: String,
    to_identifier: String,
    currency: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Build the record for a request whose balance write has already committed.
    pub(super) fn committed(
        request: &TransferRequest,
        balance_before: Decimal,
        balance_after: Decimal,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            account_id: request.account_id,
            user_id: request.user_id.clone(),
            kind: request.kind,
            amount: request.amount,
            balance_before,
            balance_after,
            from_system: request.from_system.clone(),
            from_identifier: request.from_identifier.clone(),
            to_system: request.to_system.clone(),
            to_identifier: request.to_identifier.clone(),
            currency: request.currency.clone(),
            description: request.description.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn balance_before(&self) -> Decimal {
        self.balance_before
    }

    pub fn balance_after(&self) -> Decimal {
        self.balance_after
    }

    pub fn from_system(&self) -> &str {
        &self.from_system
    }

    pub fn from_identifier(&self) -> &str {
        &self.from_identifier
    }

    pub fn to_system(&self) -> &str {
        &self.to_system
    }

    pub fn to_identifier(&self) -> &str {
        &self.to_identifier
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl std::fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] tx={} account={} amount={} {} -> {}",
            self.kind,
            self.id,
            self.account_id,
            self.amount,
            self.balance_before,
            self.balance_after
        )
    }
}
