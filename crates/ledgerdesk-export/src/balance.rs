//! General-balance workbook
//!
//! Three sheets: the balance sheet with assets on the left and liabilities
//! and equity on the right, the income statement, and a chart sheet with a
//! native column chart of the headline figures.

use ledgerdesk_core::{AccountType, BalanceAccount, GeneralBalance};
use rust_xlsxwriter::{Chart, ChartType, Workbook, Worksheet};

use crate::error::ExportResult;
use crate::{new_sheet, num, ExportOptions, Styles};

const BALANCE_SHEET: &str = "Balance Sheet";
const INCOME_SHEET: &str = "Income Statement";
const CHART_SHEET: &str = "Chart";

/// Assets split the way the balance sheet lays them out
#[derive(Debug, Default)]
pub struct AssetBlocks<'a> {
    /// Shown beside the liabilities
    pub fixed: Vec<&'a BalanceAccount>,
    pub current: Vec<&'a BalanceAccount>,
    pub contra: Vec<&'a BalanceAccount>,
}

impl<'a> AssetBlocks<'a> {
    /// Accounts whose type is unknown stay with the fixed assets
    pub fn split(assets: &'a [BalanceAccount]) -> Self {
        let mut blocks = Self::default();
        for account in assets {
            match account.typed() {
                Some(AccountType::CurrentAsset) => blocks.current.push(account),
                Some(AccountType::ContraAsset) => blocks.contra.push(account),
                _ => blocks.fixed.push(account),
            }
        }
        blocks
    }
}

/// Build the general-balance workbook for one project, or for a
/// consolidated balance under [`crate::ALL_PROJECTS`]
pub fn general_balance_workbook(
    project: &str,
    balance: &GeneralBalance,
    options: &ExportOptions,
) -> ExportResult<Vec<u8>> {
    let styles = Styles::new(options);
    let mut workbook = Workbook::new();
    workbook.push_worksheet(balance_sheet(project, balance, &styles, options)?);
    workbook.push_worksheet(income_sheet(project, balance, &styles, options)?);
    workbook.push_worksheet(chart_sheet(balance, &styles, options)?);

    let bytes = workbook.save_to_buffer()?;
    log::debug!("general balance workbook for {}: {} bytes", project, bytes.len());
    Ok(bytes)
}

fn balance_sheet(
    project: &str,
    balance: &GeneralBalance,
    styles: &Styles,
    options: &ExportOptions,
) -> ExportResult<Worksheet> {
    let mut sheet = new_sheet(BALANCE_SHEET, options)?;
    let section = &balance.balance_sheet;
    let assets = AssetBlocks::split(&section.assets);

    sheet.merge_range(0, 0, 1, 7, &format!("Balance sheet - {}", project), &styles.title)?;

    let mut row = 4;
    sheet.write_string_with_format(row, 0, "Assets", &styles.header)?;
    sheet.write_string_with_format(row, 4, "Liabilities & Equity", &styles.header)?;
    row += 1;

    let pairs = assets.fixed.len().max(section.liabilities.len());
    for i in 0..pairs {
        if let Some(asset) = assets.fixed.get(i) {
            sheet.write_string_with_format(row, 0, &asset.account_name, &styles.bold)?;
            sheet.write_number_with_format(row, 3, num(asset.final_balance), &styles.bold_amount)?;
        }
        if let Some(liability) = section.liabilities.get(i) {
            sheet.write_string_with_format(row, 4, &liability.account_name, &styles.bold)?;
            sheet.write_number_with_format(row, 7, num(liability.final_balance), &styles.bold_amount)?;
        }
        row += 1;
    }

    row += 1;
    sheet.write_string_with_format(row, 4, "Equity", &styles.header)?;
    row += 1;
    sheet.write_string_with_format(row, 4, "Net Profit", &styles.bold)?;
    sheet.write_number_with_format(row, 7, num(balance.step2.net_profit), &styles.bold_amount)?;
    row += 2;

    if !assets.current.is_empty() || !assets.contra.is_empty() {
        sheet.write_string_with_format(row, 0, "Current & Contra Assets", &styles.header)?;
        row += 1;
        for account in assets.current.iter().chain(assets.contra.iter()) {
            sheet.write_string_with_format(row, 0, &account.account_name, &styles.bold)?;
            sheet.write_number_with_format(row, 3, num(account.final_balance), &styles.bold_amount)?;
            row += 1;
        }
        row += 1;
    }

    sheet.write_string_with_format(row, 0, "Total Assets", &styles.total)?;
    sheet.write_number_with_format(row, 3, num(section.total_assets), &styles.total_amount)?;
    sheet.write_string_with_format(row, 4, "Total Liabilities & Equity", &styles.total)?;
    sheet.write_number_with_format(row, 7, num(balance.liabilities_and_equity()), &styles.total_amount)?;

    for col in [0, 4] {
        sheet.set_column_width(col, 32)?;
    }
    for col in [3, 7] {
        sheet.set_column_width(col, 18)?;
    }
    Ok(sheet)
}

fn income_sheet(
    project: &str,
    balance: &GeneralBalance,
    styles: &Styles,
    options: &ExportOptions,
) -> ExportResult<Worksheet> {
    let mut sheet = new_sheet(INCOME_SHEET, options)?;
    let (step1, step2) = (&balance.step1, &balance.step2);

    sheet.merge_range(0, 0, 1, 3, &format!("Income statement - {}", project), &styles.title)?;
    let mut row = 3;
    for (col, label) in ["Item", "Amount", "Item", "Amount"].iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *label, &styles.header)?;
    }
    row += 1;

    account_block(&mut sheet, &mut row, "Revenues", &step1.revenues, 0, styles)?;
    account_block(&mut sheet, &mut row, "Cost of Goods Sold", &step1.cogs, 2, styles)?;
    sheet.write_string_with_format(row, 0, "Total Revenue after COGS", &styles.total)?;
    sheet.write_number_with_format(row, 1, num(step1.total_revenue), &styles.total_amount)?;
    row += 1;

    account_block(&mut sheet, &mut row, "Diversified Revenue", &step2.diversified_revenue, 0, styles)?;
    sheet.write_string_with_format(row, 0, "Total Revenue after Diversified Revenue", &styles.total)?;
    sheet.write_number_with_format(row, 1, num(balance.revenue_after_diversified()), &styles.total_amount)?;
    row += 1;

    account_block(&mut sheet, &mut row, "Expenses", &step2.expenses, 2, styles)?;
    sheet.write_string_with_format(row, 0, "Net Profit", &styles.grand_total)?;
    sheet.write_number_with_format(row, 1, num(step2.net_profit), &styles.grand_total_amount)?;

    for col in [0, 2] {
        sheet.set_column_width(col, 40)?;
    }
    for col in [1, 3] {
        sheet.set_column_width(col, 18)?;
    }
    Ok(sheet)
}

/// Titled list of accounts; credits go in the first pair of columns, debits
/// in the second
fn account_block(
    sheet: &mut Worksheet,
    row: &mut u32,
    title: &str,
    accounts: &[BalanceAccount],
    col: u16,
    styles: &Styles,
) -> ExportResult<()> {
    sheet.write_string_with_format(*row, 0, title, &styles.bold)?;
    *row += 1;
    for account in accounts {
        sheet.write_string_with_format(*row, col, &account.account_name, &styles.text)?;
        sheet.write_number_with_format(*row, col + 1, num(account.final_balance), &styles.amount)?;
        *row += 1;
    }
    Ok(())
}

/// Figures plotted on the chart sheet, in order
pub fn chart_figures(balance: &GeneralBalance) -> [(&'static str, f64); 4] {
    [
        ("Total Revenue", num(balance.step1.total_revenue)),
        ("Diversified Revenue", num(balance.diversified_total())),
        ("Expenses", num(balance.expenses_sum())),
        ("Net Profit", num(balance.step2.net_profit)),
    ]
}

fn chart_sheet(balance: &GeneralBalance, styles: &Styles, options: &ExportOptions) -> ExportResult<Worksheet> {
    let mut sheet = new_sheet(CHART_SHEET, options)?;
    sheet.write_string_with_format(0, 0, "Category", &styles.header)?;
    sheet.write_string_with_format(0, 1, "Value", &styles.header)?;

    let figures = chart_figures(balance);
    for (i, (label, value)) in figures.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string_with_format(row, 0, *label, &styles.text)?;
        sheet.write_number_with_format(row, 1, *value, &styles.amount)?;
    }
    let last = figures.len() as u32;

    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_name("Value")
        .set_categories((CHART_SHEET, 1, 0, last, 0))
        .set_values((CHART_SHEET, 1, 1, last, 1));
    chart.title().set_name("General Balance");
    chart.legend().set_hidden();
    sheet.insert_chart(0, 3, &chart)?;

    sheet.set_column_width(0, 24)?;
    sheet.set_column_width(1, 18)?;
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerdesk_core::{BalanceSheetSection, ProfitStep, RevenueStep};
    use rust_decimal::Decimal;

    fn account(name: &str, kind: &str, amount: i64) -> BalanceAccount {
        BalanceAccount {
            account_name: name.to_string(),
            account_type: kind.to_string(),
            final_balance: Decimal::from(amount),
        }
    }

    fn sample() -> GeneralBalance {
        GeneralBalance {
            step1: RevenueStep {
                total_revenue: Decimal::from(800),
                revenues: vec![account("Sales", "Revenue", 1000)],
                cogs: vec![account("Materials", "Expense", 200)],
                cogs_total: Decimal::from(200),
            },
            step2: ProfitStep {
                diversified_revenue: vec![account("Rent income", "Revenue", 50)],
                diversified_revenue_total: Decimal::from(50),
                expenses: vec![account("Salaries", "Expense", 300), account("Power", "Expense", 20)],
                expenses_total: Decimal::from(320),
                net_profit: Decimal::from(530),
            },
            balance_sheet: BalanceSheetSection {
                assets: vec![
                    account("Buildings", "Asset", 4000),
                    account("Cash", "Current Asset", 900),
                    account("Depreciation", "contra asset", -400),
                    account("Unclassified", "", 30),
                ],
                liabilities: vec![account("Loans", "Liability", 3000)],
                total_assets: Decimal::from(4530),
                total_liabilities: Decimal::from(4000),
            },
        }
    }

    #[test]
    fn test_asset_blocks() {
        let balance = sample();
        let blocks = AssetBlocks::split(&balance.balance_sheet.assets);
        let names = |v: &[&BalanceAccount]| v.iter().map(|a| a.account_name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&blocks.fixed), vec!["Buildings", "Unclassified"]);
        assert_eq!(names(&blocks.current), vec!["Cash"]);
        assert_eq!(names(&blocks.contra), vec!["Depreciation"]);
    }

    #[test]
    fn test_chart_figures() {
        let figures = chart_figures(&sample());
        assert_eq!(figures[0], ("Total Revenue", 800.0));
        assert_eq!(figures[1], ("Diversified Revenue", 50.0));
        assert_eq!(figures[2], ("Expenses", 320.0));
        assert_eq!(figures[3], ("Net Profit", 530.0));
    }

    #[test]
    fn test_general_balance_workbook_is_xlsx() {
        let bytes = general_balance_workbook("Alpha", &sample(), &ExportOptions::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_consolidated_and_empty_balances_export() {
        let combined = GeneralBalance::consolidate([&sample(), &GeneralBalance::default()]);
        let options = ExportOptions {
            right_to_left: true,
            ..ExportOptions::default()
        };
        let bytes = general_balance_workbook(crate::ALL_PROJECTS, &combined, &options).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let empty = general_balance_workbook("Empty", &GeneralBalance::default(), &options).unwrap();
        assert!(empty.starts_with(b"PK"));
    }
}
