mod amount;
mod errors;

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::Serialize;

pub use amount::{format_currency, parse_amount, plain_amount, signed_amount};

pub type SessionId = u32;

/// Opaque identifier of a single ledger record, e.g. `TRX_4K2P9QZ1A`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.pad(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Deposit,
    Withdrawal,
    Fee,
    Shopping,
    Food,
    Gas,
    Entertainment,
    Payment
}

impl Category {
    /// Debit categories a generated purchase may fall into.
    pub const PURCHASES: [Category; 5] = [
        Category::Shopping,
        Category::Food,
        Category::Gas,
        Category::Entertainment,
        Category::Payment
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Deposit => "deposit",
            Category::Withdrawal => "withdrawal",
            Category::Fee => "fee",
            Category::Shopping => "shopping",
            Category::Food => "food",
            Category::Gas => "gas",
            Category::Entertainment => "entertainment",
            Category::Payment => "payment"
        }
    }
}

impl Display for Category {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.pad(self.as_str())
    }
}

/// Settlement state, rendered as the single status letter of the ledger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    #[serde(rename = "C")]
    Cleared,
    #[serde(rename = "P")]
    Pending
}

impl Status {
    pub fn code(&self) -> &'static str {
        match self {
            Status::Cleared => "C",
            Status::Pending => "P"
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Cleared => "Completed",
            Status::Pending => "Pending"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest
}
