use std::fs;
use std::process::{Command, Output};
use anyhow::{anyhow, Result};
use csv::StringRecord;
use tempfile::NamedTempFile;

const HEADER: [&str; 8] = ["date", "description", "details", "category", "status", "amount", "balance", "id"];

fn run(args: &[&str]) -> Result<Output> {
    let binary_path = env!("CARGO_BIN_EXE_ledger-engine");

    Ok(Command::new(binary_path).args(args).output()?)
}

fn parse_rows(csv_text: &str) -> Result<Vec<StringRecord>> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());

    assert_eq!(reader.headers()?, &StringRecord::from(HEADER.to_vec()));

    Ok(reader.records().collect::<Result<Vec<_>, _>>()?)
}

fn run_rows(args: &[&str]) -> Result<Vec<StringRecord>> {
    let output = run(args)?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    parse_rows(&String::from_utf8(output.stdout)?)
}

#[test]
fn test_cli_prints_the_first_page_newest_first() -> Result<()> {
    let rows = run_rows(&["--seed", "42"])?;

    assert_eq!(rows.len(), 20);

    for row in &rows {
        assert_eq!(row.len(), 8);
        assert!(row[6].parse::<f64>().is_ok());
        assert!(row[7].starts_with("TRX_"));
    }

    let head = &rows[0];

    assert_eq!(&head[0], "03/29/2025");
    assert_eq!(&head[1], "Daily Service Charge");
    assert_eq!(&head[3], "fee");
    assert_eq!(&head[4], "C");
    assert_eq!(&head[5], "-100.00");
    assert_eq!(&head[6], "2568914.37");

    Ok(())
}

#[test]
fn test_cli_output_is_reproducible_for_a_seed() -> Result<()> {
    let first = run(&["--seed", "7"])?;
    let second = run(&["--seed", "7"])?;

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    Ok(())
}

#[test]
fn test_cli_filters_by_description() -> Result<()> {
    let rows = run_rows(&["--seed", "3", "--query", "interest payment"])?;

    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "11/15/2024");
    assert_eq!(&rows[0][5], "12450.00");

    Ok(())
}

#[test]
fn test_cli_unmatched_filter_prints_only_the_header() -> Result<()> {
    let rows = run_rows(&["--seed", "3", "--query", "no such merchant"])?;

    assert!(rows.is_empty());

    Ok(())
}

#[test]
fn test_cli_paging_past_the_end_stays_on_the_last_page() -> Result<()> {
    let rows = run_rows(&["--seed", "5", "--sort", "oldest", "--page", "99"])?;
    let last = rows.last().ok_or_else(|| anyhow!("last page is empty"))?;

    assert!(!rows.is_empty() && rows.len() <= 20);
    assert_eq!(&last[0], "03/29/2025");
    assert_eq!(&last[1], "Daily Service Charge");

    Ok(())
}

#[test]
fn test_cli_appends_live_records_to_the_head() -> Result<()> {
    let file = NamedTempFile::new()?;
    let path = file.path().to_str().ok_or_else(|| anyhow!("temporary path is not utf-8"))?;

    let output = run(&["--seed", "1", "--append", "150.00", "--append=-20", "--output", path])?;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let rows = parse_rows(&fs::read_to_string(path)?)?;

    assert_eq!(&rows[0][1], "Service Fee");
    assert_eq!(&rows[0][3], "withdrawal");
    assert_eq!(&rows[0][4], "P");
    assert_eq!(&rows[0][5], "-20.00");
    assert_eq!(&rows[0][6], "2569044.37");

    assert_eq!(&rows[1][1], "Interest Accrual");
    assert_eq!(&rows[1][3], "deposit");
    assert_eq!(&rows[1][5], "150.00");
    assert_eq!(&rows[1][6], "2569064.37");

    assert_eq!(&rows[2][6], "2568914.37");

    Ok(())
}

#[test]
fn test_cli_rejects_malformed_amounts() -> Result<()> {
    let output = run(&["--append", "12.345"])?;

    assert!(!output.status.success());

    Ok(())
}

#[test]
fn test_cli_reports_an_append_that_overflows_the_balance() -> Result<()> {
    let output = run(&["--seed", "2", "--append", "79228162514264337593543950335"])?;
    let stderr = String::from_utf8(output.stderr)?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("overflows the ledger"), "stderr: {stderr}");
    assert!(!stderr.contains("panicked"), "stderr: {stderr}");

    Ok(())
}

#[test]
fn test_cli_keeps_the_ledger_usable_at_large_balances() -> Result<()> {
    let rows = run_rows(&["--seed", "2", "--append", "1000000000000.00", "--append=-1000000000000.00"])?;

    assert_eq!(&rows[0][6], "2568914.37");
    assert_eq!(&rows[1][6], "1000002568914.37");

    Ok(())
}

#[test]
fn test_cli_rejects_an_unknown_log_level() -> Result<()> {
    let output = run(&["--seed", "2", "--log-level", "verbose"])?;

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)?.contains("verbose"));

    Ok(())
}

#[test]
fn test_cli_describes_a_known_transaction() -> Result<()> {
    let rows = run_rows(&["--seed", "9"])?;
    let id = rows[0][7].to_string();

    let output = run(&["--seed", "9", "--describe", &id])?;
    let text = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert!(text.contains(&format!("ID: {id}")));
    assert!(text.contains("Description: Daily Service Charge"));

    let missing = run(&["--seed", "9", "--describe", "TRX_UNKNOWN00"])?;

    assert!(!missing.status.success());

    Ok(())
}

#[test]
fn test_cli_table_groups_rows_into_statements() -> Result<()> {
    let output = run(&["--seed", "11", "--format", "table"])?;
    let text = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert!(text.starts_with("Current balance: $2,568,914.37"));
    assert!(text.contains("Statement as of 03/29/2025 (view statements)"));
    assert!(text.contains("Statement as of 11/"));
    assert!(text.contains("Load More Transactions ("));
    assert!(text.contains("-$100.00"));

    Ok(())
}
