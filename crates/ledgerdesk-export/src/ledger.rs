//! General-ledger workbook: a summary sheet plus one sheet per account

use ledgerdesk_core::{LedgerGroup, LedgerSummary};
use ledgerdesk_utils::SheetNames;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::ExportResult;
use crate::{new_sheet, num, ExportOptions, Styles};

const SUMMARY_SHEET: &str = "Accounts Summary";
const SUMMARY_HEADER: [&str; 4] = ["Account", "Total Debit", "Total Credit", "Balance"];
const ACCOUNT_HEADER: [&str; 5] = ["Description", "Debit", "Credit", "Balance", "Date"];

/// Build the ledger workbook for one project
///
/// Group balances follow the policy the summary was aggregated with.
pub fn ledger_workbook(project: &str, summary: &LedgerSummary, options: &ExportOptions) -> ExportResult<Vec<u8>> {
    let styles = Styles::new(options);
    let mut names = SheetNames::new();
    let mut workbook = Workbook::new();

    let summary_name = names.claim(SUMMARY_SHEET);
    workbook.push_worksheet(summary_sheet(&summary_name, project, summary, &styles, options)?);

    for group in &summary.groups {
        let name = names.claim(&group.account_name);
        workbook.push_worksheet(account_sheet(&name, group, &styles, options)?);
    }

    let bytes = workbook.save_to_buffer()?;
    log::debug!(
        "ledger workbook for {}: {} account sheets, {} bytes",
        project,
        summary.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn summary_sheet(
    name: &str,
    project: &str,
    summary: &LedgerSummary,
    styles: &Styles,
    options: &ExportOptions,
) -> ExportResult<Worksheet> {
    let mut sheet = new_sheet(name, options)?;
    sheet.merge_range(0, 0, 1, 3, &format!("Accounts summary - {}", project), &styles.title)?;

    let header_row = 3;
    for (col, label) in SUMMARY_HEADER.iter().enumerate() {
        sheet.write_string_with_format(header_row, col as u16, *label, &styles.header)?;
    }

    let mut row = header_row + 1;
    for group in &summary.groups {
        sheet.write_string_with_format(row, 0, &group.account_name, &styles.text)?;
        sheet.write_number_with_format(row, 1, num(group.total_debit), &styles.amount)?;
        sheet.write_number_with_format(row, 2, num(group.total_credit), &styles.amount)?;
        sheet.write_number_with_format(row, 3, num(group.balance), &styles.amount)?;
        row += 1;
    }

    row += 1;
    let total = &summary.grand_total;
    sheet.write_string_with_format(row, 0, "Grand Total", &styles.grand_total)?;
    sheet.write_number_with_format(row, 1, num(total.total_debit), &styles.grand_total_amount)?;
    sheet.write_number_with_format(row, 2, num(total.total_credit), &styles.grand_total_amount)?;
    sheet.write_number_with_format(row, 3, num(total.balance), &styles.grand_total_amount)?;

    sheet.set_column_width(0, 30)?;
    for col in 1..4 {
        sheet.set_column_width(col, 18)?;
    }
    Ok(sheet)
}

fn account_sheet(name: &str, group: &LedgerGroup, styles: &Styles, options: &ExportOptions) -> ExportResult<Worksheet> {
    let mut sheet = new_sheet(name, options)?;
    sheet.merge_range(
        0,
        0,
        1,
        4,
        &format!("Account details: {}", group.account_name),
        &styles.account_title,
    )?;

    let header_row = 3;
    for (col, label) in ACCOUNT_HEADER.iter().enumerate() {
        sheet.write_string_with_format(header_row, col as u16, *label, &styles.header)?;
    }

    let mut row = header_row + 1;
    for entry in &group.rows {
        let date = entry
            .date_naive()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| entry.date.clone());
        sheet.write_string_with_format(row, 0, &entry.description, &styles.text)?;
        sheet.write_number_with_format(row, 1, num(entry.debit), &styles.amount)?;
        sheet.write_number_with_format(row, 2, num(entry.credit), &styles.amount)?;
        sheet.write_number_with_format(row, 3, num(entry.balance), &styles.amount)?;
        sheet.write_string_with_format(row, 4, &date, &styles.text)?;
        row += 1;
    }

    sheet.write_string_with_format(row, 0, "Total", &styles.total)?;
    sheet.write_number_with_format(row, 1, num(group.total_debit), &styles.total_amount)?;
    sheet.write_number_with_format(row, 2, num(group.total_credit), &styles.total_amount)?;
    sheet.write_number_with_format(row, 3, num(group.balance), &styles.total_amount)?;
    sheet.write_string_with_format(row, 4, "", &styles.total)?;

    sheet.set_column_width(0, 36)?;
    for col in 1..5 {
        sheet.set_column_width(col, 16)?;
    }
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerdesk_core::{aggregate, BalancePolicy, LedgerRow};
    use rust_decimal::Decimal;

    fn row(account: &str, debit: i64, credit: i64, date: &str) -> LedgerRow {
        LedgerRow {
            account_name: account.to_string(),
            account_type: "Asset".to_string(),
            description: format!("{} movement", account),
            debit: Decimal::from(debit),
            credit: Decimal::from(credit),
            balance: Decimal::from(debit - credit),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_ledger_workbook_is_xlsx() {
        let summary = aggregate(
            &[
                row("Cash", 100, 0, "2024-01-01T00:00:00"),
                row("Bank", 0, 40, "2024-01-02"),
                row("Cash", 0, 25, "not a date"),
            ],
            BalancePolicy::NetMovement,
        );
        let bytes = ledger_workbook("Alpha", &summary, &ExportOptions::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_awkward_account_names_still_export() {
        // names that clash with the summary sheet or differ only in case or
        // forbidden characters
        let summary = aggregate(
            &[
                row("Accounts Summary", 1, 0, "2024-01-01"),
                row("Loans: long term / bank [A]", 0, 1, "2024-01-01"),
                row("Loans long term  bank A", 5, 0, "2024-01-01"),
                row("cash", 1, 0, "2024-01-01"),
                row("CASH", 0, 1, "2024-01-01"),
                row("A very long account name that Excel would never accept", 2, 2, "2024-01-01"),
                row("Partners capital - Mohamed Ali's share", 0, 3, "2024-01-01"),
                row("Partners capital - Mohamed Ali's loan", 3, 0, "2024-01-01"),
            ],
            BalancePolicy::LastSeen,
        );
        let options = ExportOptions {
            right_to_left: true,
            ..ExportOptions::default()
        };
        let bytes = ledger_workbook("Tower B", &summary, &options).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_empty_ledger_exports_summary_only() {
        let summary = aggregate(&[], BalancePolicy::LastSeen);
        let bytes = ledger_workbook("Empty", &summary, &ExportOptions::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
