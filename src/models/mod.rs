mod errors;
mod generator;
mod ledger;
mod page;
mod transaction;

use rust_decimal::Decimal;

pub use errors::LedgerError;
pub use ledger::LedgerStore;
pub use page::{Page, PageRow};
pub use transaction::TransactionRecord;

pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Opening figure of the demo account, in cents.
pub const DEFAULT_CLOSING_BALANCE_CENTS: i64 = 256_891_437;

/// Settings for a single ledger session.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub page_size: usize,
    /// Balance carried by the newest generated record.
    pub closing_balance: Decimal,
    /// Fixed seed for reproducible histories; entropy is used when absent.
    pub seed: Option<u64>
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            closing_balance: Decimal::new(DEFAULT_CLOSING_BALANCE_CENTS, 2),
            seed: None
        }
    }
}

impl LedgerConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[cfg(test)]
    pub fn with_closing_balance(mut self, closing_balance: Decimal) -> Self {
        self.closing_balance = closing_balance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
