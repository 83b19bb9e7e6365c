use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::types::{format_currency, plain_amount, Category, Status, TransactionId};

pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// A single ledger line as shown in the account activity table.
///
/// Records are immutable once created. The `running_balance` is the account balance right
/// after this record was applied, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub description: String,
    pub details: String,
    pub category: Category,
    pub status: Status,
    pub amount: Decimal,
    #[serde(rename = "balance")]
    pub running_balance: Decimal,
    pub id: TransactionId
}

impl TransactionRecord {
    /// `MM/DD/YYYY`
    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// (year, month) pair used to group rows into monthly statements.
    pub fn statement_month(&self) -> (i32, u32) {
        (self.date.year(), self.date.month())
    }

    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();

        self.description.to_lowercase().contains(&needle)
            || self.details.to_lowercase().contains(&needle)
            || self.formatted_date().contains(&needle)
            || plain_amount(self.amount).contains(&needle)
    }

    /// Multi-line detail text for a single record.
    pub fn describe(&self) -> String {
        format!(
            "Transaction Details:\n\nDate: {}\nDescription: {}\nDetails: {}\nAmount: {}\nBalance: {}\nStatus: {}\nID: {}",
            self.formatted_date(),
            self.description,
            self.details,
            format_currency(self.amount),
            format_currency(self.running_balance),
            self.status.label(),
            self.id
        )
    }
}

fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format(DATE_FORMAT))
}
