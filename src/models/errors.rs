use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{SessionId, TransactionId};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transaction [{id}] was not found in the ledger")]
    TransactionNotFound {
        id: TransactionId
    },
    #[error("Appending [{amount}] to balance [{balance}] overflows the ledger")]
    BalanceOverflow {
        balance: Decimal,
        amount: Decimal
    },
    #[error("Ledger actor for session [{session_id}] is no longer running")]
    ActorUnavailable {
        session_id: SessionId
    }
}

impl LedgerError {
    pub fn transaction_not_found(id: &TransactionId) -> Self {
        Self::TransactionNotFound { id: id.clone() }
    }

    pub fn balance_overflow(balance: Decimal, amount: Decimal) -> Self {
        Self::BalanceOverflow { balance, amount }
    }

    pub fn actor_unavailable(session_id: SessionId) -> Self {
        Self::ActorUnavailable { session_id }
    }
}
