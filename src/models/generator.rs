use std::collections::HashSet;

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::trace;

use crate::models::TransactionRecord;
use crate::types::{Category, Status, TransactionId};

const ID_PREFIX: &str = "TRX_";
const ID_LENGTH: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const CITIES: [&str; 6] = ["PALMDALE CA", "LOS ANGELES CA", "NEW YORK NY", "CHICAGO IL", "HOUSTON TX", "PHOENIX AZ"];

const FEE_YEAR: i32 = 2025;
const FEE_MONTH: u32 = 3;
const FEE_LAST_DAY: u32 = 29;
const FEE_COUNT: u32 = 5;
const FEE_CENTS: i64 = -10_000;

const HISTORY_YEAR: i32 = 2024;
const HISTORY_MONTH: u32 = 11;
const HISTORY_DAYS: u32 = 30;
const INTEREST_DAY: u32 = 15;
const INTEREST_CENTS: i64 = 1_245_000;

const CREDIT_PROBABILITY: f64 = 0.3;
const CREDIT_CENTS: std::ops::Range<i64> = 100_000..600_000;
const DEBIT_CENTS: std::ops::Range<i64> = 1_000..51_000;

/// Hands out record identifiers and remembers them so none is ever reused by the same ledger.
#[derive(Debug, Clone, Default)]
pub struct IdIssuer {
    issued: HashSet<TransactionId>
}

impl IdIssuer {
    pub fn issue<R: Rng>(&mut self, rng: &mut R) -> TransactionId {
        loop {
            let suffix: String = (0..ID_LENGTH)
                .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
                .collect();
            let id = TransactionId::new(format!("{ID_PREFIX}{suffix}"));

            if self.issued.insert(id.clone()) {
                return id;
            }

            trace!("Transaction id [{id}] collided, drawing another");
        }
    }

    /// Marks an externally created id as taken. Returns false if it already was.
    #[cfg(test)]
    pub fn reserve(&mut self, id: TransactionId) -> bool {
        self.issued.insert(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.issued.len()
    }
}

/// Stand-in for a weekday check: only the day of month is looked at, `day % 7` of 0 or 6
/// counts as a weekend regardless of the real calendar.
pub fn is_business_day(day: u32) -> bool {
    !matches!(day % 7, 0 | 6)
}

struct Draft {
    date: NaiveDate,
    description: &'static str,
    details: String,
    category: Category,
    amount: Decimal
}

/// Builds the synthetic account history, newest first.
///
/// The newest record carries `closing_balance`; every older balance is derived backward so
/// that, read oldest to newest, each balance equals the previous one plus the record amount.
pub fn generate_history<R: Rng>(rng: &mut R, ids: &mut IdIssuer, closing_balance: Decimal) -> Vec<TransactionRecord> {
    let mut drafts = Vec::new();

    for offset in 0..FEE_COUNT {
        drafts.push(Draft {
            date: calendar_date(FEE_YEAR, FEE_MONTH, FEE_LAST_DAY - offset),
            description: "Daily Service Charge",
            details: "Automatic monthly maintenance fee".to_string(),
            category: Category::Fee,
            amount: Decimal::new(FEE_CENTS, 2)
        });
    }

    for day in (1..=HISTORY_DAYS).rev() {
        let date = calendar_date(HISTORY_YEAR, HISTORY_MONTH, day);

        if day == INTEREST_DAY {
            drafts.push(Draft {
                date,
                description: "Interest Payment",
                details: "Monthly interest deposit".to_string(),
                category: Category::Deposit,
                amount: Decimal::new(INTEREST_CENTS, 2)
            });
            continue;
        }

        if !is_business_day(day) {
            continue;
        }

        for _ in 0..rng.random_range(1..=3) {
            drafts.push(random_draft(rng, date));
        }
    }

    // Already emitted newest first; the stable sort only pins the ordering contract.
    drafts.sort_by(|a, b| b.date.cmp(&a.date));

    let mut balance = closing_balance;

    drafts.into_iter()
        .map(|draft| {
            let record = TransactionRecord {
                date: draft.date,
                description: draft.description.to_string(),
                details: draft.details,
                category: draft.category,
                status: Status::Cleared,
                amount: draft.amount,
                running_balance: balance,
                id: ids.issue(&mut *rng)
            };

            balance -= draft.amount;
            record
        })
        .collect()
}

fn random_draft<R: Rng>(rng: &mut R, date: NaiveDate) -> Draft {
    let details = CITIES[rng.random_range(0..CITIES.len())].to_string();

    if rng.random_bool(CREDIT_PROBABILITY) {
        Draft {
            date,
            description: "Deposit",
            details,
            category: Category::Deposit,
            amount: Decimal::new(rng.random_range(CREDIT_CENTS), 2)
        }
    } else {
        let category = Category::PURCHASES[rng.random_range(0..Category::PURCHASES.len())];

        Draft {
            date,
            description: "Purchase",
            details,
            category,
            amount: Decimal::new(-rng.random_range(DEBIT_CENTS), 2)
        }
    }
}

fn calendar_date(year: i32, month: u32, day: u32) -> NaiveDate {
    // Only called with the fixed, valid dates above.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
