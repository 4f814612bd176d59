use super::account::AccountId;
use super::error::LedgerError;
use super::record::TransactionKind;
use super::Decimal;
use serde::Deserialize;

/// Raw transfer request as decoded from the wire.
/// This is the unvalidated form that needs conversion to a `TransferRequest`.
#[derive(Debug, Deserialize, Clone)]
pub struct TransferRow {
    pub account: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub from_system: String,
    #[serde(default)]
    pub from_identifier: String,
    #[serde(default)]
    pub to_system: String,
    #[serde(default)]
    pub to_identifier: String,
    pub currency: String,
    #[serde(default)]
    pub description: String,
}

impl std::fmt::Display for TransferRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (account: {}, amount: {} {})",
            self.kind, self.account, self.amount, self.currency
        )
    }
}

/// A typed balance mutation request, ready for `TransferEngine::apply`.
///
/// Counterparty, currency and description fields are descriptive only and are
/// copied onto the resulting record untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub user_id: Option<String>,
    pub from_system: String,
    pub from_identifier: String,
    pub to_system: String,
    pub to_identifier: String,
    pub currency: String,
    pub description: String,
}

impl TransferRequest {
    pub fn new(account_id: AccountId, kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            account_id,
            kind,
            amount,
            user_id: None,
            from_system: String::new(),
            from_identifier: String::new(),
            to_system: String::new(),
            to_identifier: String::new(),
            currency: String::new(),
            description: String::new(),
        }
    }

    pub fn deposit(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::Deposit, amount)
    }

    pub fn withdraw(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::Withdraw, amount)
    }

    #[must_use]
    pub fn with_source(mut self, system: impl Into<String>, identifier: impl Into<String>) -> Self {
        self.from_system = system.into();
        self.from_identifier = identifier.into();
        self
    }

    #[must_use]
    pub fn with_destination(mut self, system: impl Into<String>, identifier: impl Into<String>) -> Self {
        self.to_system = system.into();
        self.to_identifier = identifier.into();
        self
    }

    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

impl TryFrom<TransferRow> for TransferRequest {
    type Error = LedgerError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        let account_id = row
            .account
            .parse::<AccountId>()
            .map_err(|e| LedgerError::InvalidRequest {
                reason: format!("malformed account id {:?}: {e}", row.account),
            })?;

        if row.currency.trim().is_empty() {
            return Err(LedgerError::InvalidRequest {
                reason: "currency is required".to_string(),
            });
        }

        Ok(TransferRequest {
            account_id,
            kind: row.kind,
            amount: row.amount,
            user_id: row.user.filter(|u| !u.is_empty()),
            from_system: row.from_system,
            from_identifier: row.from_identifier,
            to_system: row.to_system,
            to_identifier: row.to_identifier,
            currency: row.currency,
            description: row.description,
        })
    }
}
