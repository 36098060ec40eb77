//! Data models exchanged with the accounting backend
//!
//! Field names follow the backend's camelCase JSON. Amounts are decoded
//! leniently: `null`, a missing field or a non-numeric value reads as zero,
//! and numeric strings are parsed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::AccountType;

/// Read the calendar date from an ISO-8601 date or date-time string
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10)?;
    if raw.len() > 10 && !matches!(raw.as_bytes()[10], b'T' | b' ') {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Decode a JSON value as an amount, falling back to zero
pub fn amount_from_value(value: &serde_json::Value) -> Decimal {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return Decimal::ZERO,
    };
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .unwrap_or(Decimal::ZERO)
}

/// Lenient amount field: reads anything, writes a JSON number
pub mod lenient_amount {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(super::amount_from_value).unwrap_or_default())
    }
}

// ==================== Journals ====================

/// One debit/credit line of a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLine {
    pub account_id: i64,
    #[serde(default, with = "lenient_amount")]
    pub debit: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub credit: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: i64,
    #[serde(default)]
    pub entry_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl JournalEntry {
    pub fn date_naive(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// Draft while unposted, Posted after the post action
    pub fn status(&self) -> &'static str {
        if self.posted {
            "posted"
        } else {
            "draft"
        }
    }
}

/// Entry with its lines, as returned by the detail endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalWithLines {
    pub entry: JournalEntry,
    #[serde(default)]
    pub lines: Vec<JournalLine>,
}

/// Create/update payload; lines travel as a serialized JSON string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJournalDto {
    pub entry_number: String,
    pub date: String,
    pub description: String,
    #[serde(rename = "PhotoUrl", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(rename = "LinesJson")]
    pub lines_json: String,
}

// ==================== Chart of accounts ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOfAccount {
    #[serde(default)]
    pub id: i64,
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_account_id: Option<i64>,
    #[serde(default)]
    pub is_detail: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub opening_balance: Option<Decimal>,
}

/// Entry of the parent-account picker list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountListItem {
    pub id: i64,
    #[serde(default)]
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_code: Option<String>,
}

// ==================== Projects ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectDto {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProjectDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ==================== Reports ====================

/// Flat general-ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "lenient_amount")]
    pub debit: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub credit: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub balance: Decimal,
    #[serde(default)]
    pub date: String,
}

impl LedgerRow {
    pub fn date_naive(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceRow {
    #[serde(default)]
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(default, with = "lenient_amount")]
    pub debit: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub credit: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    #[serde(default, with = "lenient_amount")]
    pub total_revenue: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub total_expense: Decimal,
}

impl IncomeStatement {
    pub fn net_profit(&self) -> Decimal {
        self.total_revenue - self.total_expense
    }
}

/// Account with its closing balance, used by the balance-sheet reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAccount {
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default, with = "lenient_amount")]
    pub final_balance: Decimal,
}

impl BalanceAccount {
    pub fn typed(&self) -> Option<AccountType> {
        self.account_type.parse().ok()
    }
}

/// First step of the general balance: revenue and cost of goods sold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStep {
    #[serde(default, with = "lenient_amount")]
    pub total_revenue: Decimal,
    #[serde(default)]
    pub revenues: Vec<BalanceAccount>,
    #[serde(default)]
    pub cogs: Vec<BalanceAccount>,
    #[serde(default, with = "lenient_amount")]
    pub cogs_total: Decimal,
}

/// Second step: diversified revenue, expenses and net profit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitStep {
    #[serde(default)]
    pub diversified_revenue: Vec<BalanceAccount>,
    #[serde(default, with = "lenient_amount")]
    pub diversified_revenue_total: Decimal,
    #[serde(default)]
    pub expenses: Vec<BalanceAccount>,
    #[serde(default, with = "lenient_amount")]
    pub expenses_total: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub net_profit: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetSection {
    #[serde(default)]
    pub assets: Vec<BalanceAccount>,
    #[serde(default)]
    pub liabilities: Vec<BalanceAccount>,
    #[serde(default, with = "lenient_amount")]
    pub total_assets: Decimal,
    #[serde(default, with = "lenient_amount")]
    pub total_liabilities: Decimal,
}

/// Payload of the general-balance report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralBalance {
    #[serde(default)]
    pub step1: RevenueStep,
    #[serde(default)]
    pub step2: ProfitStep,
    #[serde(default)]
    pub balance_sheet: BalanceSheetSection,
}

impl GeneralBalance {
    pub fn diversified_total(&self) -> Decimal {
        self.step2.diversified_revenue.iter().map(|a| a.final_balance).sum()
    }

    pub fn expenses_sum(&self) -> Decimal {
        self.step2.expenses.iter().map(|a| a.final_balance).sum()
    }

    /// Revenue after COGS plus diversified revenue
    pub fn revenue_after_diversified(&self) -> Decimal {
        self.step1.total_revenue + self.diversified_total()
    }

    /// Right-hand total of the balance sheet: liabilities plus net profit
    pub fn liabilities_and_equity(&self) -> Decimal {
        self.balance_sheet.total_liabilities + self.step2.net_profit
    }

    /// Combine several projects' general balances into one
    ///
    /// Account lists are concatenated in project order and every total is
    /// summed.
    pub fn consolidate<'a>(balances: impl IntoIterator<Item = &'a GeneralBalance>) -> GeneralBalance {
        let mut combined = GeneralBalance::default();
        for balance in balances {
            let step1 = &mut combined.step1;
            step1.total_revenue += balance.step1.total_revenue;
            step1.cogs_total += balance.step1.cogs_total;
            step1.revenues.extend(balance.step1.revenues.iter().cloned());
            step1.cogs.extend(balance.step1.cogs.iter().cloned());

            let step2 = &mut combined.step2;
            step2.diversified_revenue_total += balance.step2.diversified_revenue_total;
            step2.expenses_total += balance.step2.expenses_total;
            step2.net_profit += balance.step2.net_profit;
            step2
                .diversified_revenue
                .extend(balance.step2.diversified_revenue.iter().cloned());
            step2.expenses.extend(balance.step2.expenses.iter().cloned());

            let sheet = &mut combined.balance_sheet;
            sheet.total_assets += balance.balance_sheet.total_assets;
            sheet.total_liabilities += balance.balance_sheet.total_liabilities;
            sheet.assets.extend(balance.balance_sheet.assets.iter().cloned());
            sheet
                .liabilities
                .extend(balance.balance_sheet.liabilities.iter().cloned());
        }
        combined
    }
}
