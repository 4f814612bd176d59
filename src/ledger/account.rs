use super::Decimal;

uuid_id!(
    /// Opaque, immutable identifier of an account.
    AccountId
);

/// An account holding a single exact-decimal balance.
///
/// Accounts start at zero and only change through the transfer engine's
/// compare-and-set path, so a committed balance is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    balance: Decimal,
}

impl Account {
    /// A fresh account with a zero balance.
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            balance: Decimal::ZERO,
        }
    }

    /// Rebuild an account from a stored row.
    pub fn restore(id: AccountId, balance: Decimal) -> Self {
        Self { id, balance }
    }

    /// Returns the account ID
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Returns the current balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub(super) fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}
