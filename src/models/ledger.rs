use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::errors::LedgerError;
use crate::models::generator::{generate_history, IdIssuer};
use crate::models::{LedgerConfig, Page, TransactionRecord};
use crate::types::{Category, SortOrder, Status, TransactionId};

/// In-memory ledger for one account session.
///
/// `all` is the canonical history, newest first. `view` is derived from it by the active
/// filter and sort order and is what gets paginated. Live records are prepended to both.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    all: Vec<TransactionRecord>,
    view: Vec<TransactionRecord>,
    query: String,
    order: SortOrder,
    page_cursor: usize,
    page_size: usize,
    /// Balance after the newest record; the only balance source once `all` is empty.
    closing_balance: Decimal,
    ids: IdIssuer,
    rng: StdRng
}

impl LedgerStore {
    /// Creates an empty ledger. Call one of the `generate` methods to populate it.
    pub fn new(config: &LedgerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng()
        };

        Self {
            all: Vec::new(),
            view: Vec::new(),
            query: String::new(),
            order: SortOrder::Newest,
            page_cursor: 0,
            page_size: config.page_size.max(1),
            closing_balance: config.closing_balance,
            ids: IdIssuer::default(),
            rng
        }
    }

    /// Creates a ledger over existing records, given newest first.
    #[cfg(test)]
    pub fn with_records(config: &LedgerConfig, records: Vec<TransactionRecord>) -> Self {
        let mut store = Self::new(config);

        for record in &records {
            store.ids.reserve(record.id.clone());
        }

        store.view = records.clone();
        store.all = records;
        store
    }

    /// Creates a ledger and fills it with synthetic history, seeded from the config when set.
    pub fn generated(config: &LedgerConfig) -> Self {
        let mut store = Self::new(config);

        match config.seed {
            Some(seed) => store.generate(seed),
            None => {
                let mut rng = store.rng.clone();
                store.generate_with(&mut rng);
                store.rng = rng;
            }
        }

        store
    }

    /// Replaces the history with a reproducible one for `seed`.
    pub fn generate(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate_with(&mut rng);
        self.rng = rng;
    }

    /// Replaces the history using the given random source.
    ///
    /// Identifiers issued before stay reserved, so ids remain unique for the life of the store.
    pub fn generate_with<R: Rng>(&mut self, rng: &mut R) {
        self.all = generate_history(rng, &mut self.ids, self.closing_balance);
        self.view = self.all.clone();
        self.query.clear();
        self.order = SortOrder::Newest;
        self.page_cursor = 0;

        info!("Generated {} ledger records, closing balance {}", self.all.len(), self.closing_balance);
    }

    pub fn apply_filter(&mut self, query: &str) {
        self.query = query.to_string();
        self.view = if query.is_empty() {
            self.all.clone()
        } else {
            self.all.iter()
                .filter(|record| record.matches(query))
                .cloned()
                .collect()
        };

        // `all` is always newest first, only the oldest-first order needs re-applying.
        if self.order == SortOrder::Oldest {
            sort_records(&mut self.view, self.order);
        }

        self.page_cursor = 0;

        debug!("Filter [{query}] matched {} of {} records", self.view.len(), self.all.len());
    }

    pub fn sort_by(&mut self, order: SortOrder) {
        self.order = order;
        sort_records(&mut self.view, order);
        self.page_cursor = 0;

        debug!("View sorted {order:?}");
    }

    pub fn page(&self) -> Page {
        let start = (self.page_cursor * self.page_size).min(self.view.len());
        let end = (start + self.page_size).min(self.view.len());

        Page {
            records: self.view[start..end].to_vec(),
            has_more: self.has_more(),
            page_index: self.page_cursor,
            total: self.view.len(),
            page_size: self.page_size
        }
    }

    /// Moves to the next page if there is one. Returns whether the cursor moved.
    pub fn advance_page(&mut self) -> bool {
        if !self.has_more() {
            debug!("Already on the last page [{}]", self.page_cursor);
            return false;
        }

        self.page_cursor += 1;
        true
    }

    /// Moves to the previous page unless already on the first. Returns whether the cursor moved.
    pub fn retreat_page(&mut self) -> bool {
        if self.page_cursor == 0 {
            debug!("Already on the first page");
            return false;
        }

        self.page_cursor -= 1;
        true
    }

    /// Appends a pending record dated now.
    pub fn append_live(&mut self, amount: Decimal) -> Result<TransactionRecord, LedgerError> {
        self.append_live_at(amount, Local::now().naive_local())
    }

    /// Appends a pending record at `timestamp` and returns it.
    ///
    /// The record always becomes the newest one; it is prepended to the view too, whatever
    /// the active filter or sort order, and the page cursor is left alone. A balance that
    /// would leave the `Decimal` range is rejected and the ledger stays unchanged.
    pub fn append_live_at(&mut self, amount: Decimal, timestamp: NaiveDateTime) -> Result<TransactionRecord, LedgerError> {
        let amount = amount.round_dp(2);
        let balance = self.balance();
        let running_balance = balance.checked_add(amount)
            .ok_or_else(|| LedgerError::balance_overflow(balance, amount))?;

        let is_credit = amount > Decimal::ZERO;
        let time = timestamp.format("%I:%M %p");
        let record = TransactionRecord {
            date: timestamp.date(),
            description: if is_credit { "Interest Accrual" } else { "Service Fee" }.to_string(),
            details: if is_credit {
                format!("Real-time interest at {time}")
            } else {
                format!("Real-time fee at {time}")
            },
            category: if is_credit { Category::Deposit } else { Category::Withdrawal },
            status: Status::Pending,
            amount,
            running_balance,
            id: self.ids.issue(&mut self.rng)
        };

        self.closing_balance = running_balance;
        self.all.insert(0, record.clone());
        self.view.insert(0, record.clone());

        debug!("Live record [{}] appended: {} -> balance {}", record.id, record.amount, record.running_balance);

        Ok(record)
    }

    pub fn find_by_id(&self, id: &TransactionId) -> Option<&TransactionRecord> {
        self.all.iter().find(|record| &record.id == id)
    }

    /// The `count` newest records of the whole ledger, ignoring filter and sort.
    pub fn recent(&self, count: usize) -> Vec<TransactionRecord> {
        self.all.iter().take(count).cloned().collect()
    }

    /// Current account balance: the head record's running balance, or the tracked total.
    pub fn balance(&self) -> Decimal {
        self.all.first()
            .map(|record| record.running_balance)
            .unwrap_or(self.closing_balance)
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.all
    }

    fn has_more(&self) -> bool {
        self.view.len() > (self.page_cursor + 1) * self.page_size
    }
}

#[cfg(test)]
impl LedgerStore {
    pub fn view(&self) -> &[TransactionRecord] {
        &self.view
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn page_cursor(&self) -> usize {
        self.page_cursor
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

/// Stable sort by date; records sharing a date keep their relative order.
fn sort_records(records: &mut [TransactionRecord], order: SortOrder) {
    match order {
        SortOrder::Newest => records.sort_by(|a, b| b.date.cmp(&a.date)),
        SortOrder::Oldest => records.sort_by(|a, b| a.date.cmp(&b.date))
    }
}
