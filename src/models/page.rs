use crate::models::TransactionRecord;

/// One page of the active view.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<TransactionRecord>,
    pub has_more: bool,
    pub page_index: usize,
    /// Number of records in the whole view, not just this page.
    pub total: usize,
    pub page_size: usize
}

impl Page {
    /// Records left after this page ("Load More Transactions (n remaining)").
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub((self.page_index + 1) * self.page_size)
    }

    /// Groups the page into monthly statements.
    ///
    /// A statement separator dated after the first record of each month precedes the rows
    /// of that month, and a new one is emitted whenever consecutive rows change month.
    pub fn rows(&self) -> Vec<PageRow<'_>> {
        let mut rows = Vec::with_capacity(self.records.len() + 2);
        let mut last_month = None;

        for record in &self.records {
            let month = record.statement_month();

            if last_month != Some(month) {
                rows.push(PageRow::Statement { as_of: record.formatted_date() });
                last_month = Some(month);
            }

            rows.push(PageRow::Transaction(record));
        }

        rows
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageRow<'a> {
    Statement {
        as_of: String
    },
    Transaction(&'a TransactionRecord)
}
