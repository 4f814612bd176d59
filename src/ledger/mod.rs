//! Ledger module.
//!
//! This module contains the balance-mutation core and its front ends:
//! - `TransferEngine` - Applies deposits and withdrawals with a compare-and-set write
//! - `AccountStore` / `LedgerStore` - Storage contracts and in-memory implementations
//! - `TransactionRecord` - Immutable record of one balance mutation
//! - `RetryPolicy` - Caller-side handling of balance conflicts
//! - `BatchProcessor` - CSV driven processing used by the CLI

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Allocate a fresh time-ordered identifier.
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

mod account;
mod batch;
mod error;
mod record;
mod request;
mod retry;
mod store;
mod transfer_engine;
mod view;

pub(crate) use rust_decimal::Decimal;

pub use account::{Account, AccountId};
pub use batch::{BatchProcessor, BatchSummary};
pub use error::{Error, ErrorKind, LedgerError, StoreError};
pub use record::{TransactionId, TransactionKind, TransactionRecord};
pub use request::{TransferRequest, TransferRow};
pub use retry::RetryPolicy;
pub use store::{AccountStore, InMemoryAccountStore, InMemoryLedgerStore, LedgerStore};
pub use transfer_engine::{TransferEngine, MAX_OPEN_BATCH};
pub use view::{AccountView, TransactionReceipt};
