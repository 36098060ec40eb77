//! General-ledger aggregation and the ledger table view
//!
//! [`aggregate`] groups flat ledger rows by exact account name in the order
//! accounts first appear. [`LedgerQuery`] holds the search text, date
//! bounds, sort key and page used to display the rows.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use ledgerdesk_config::BalancePolicy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::Totals;
use crate::models::LedgerRow;
use crate::period::{Period, PeriodFilter};
use crate::types::SortDirection;

/// Rows of one account with their totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerGroup {
    pub account_name: String,
    pub account_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_debit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_credit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub rows: Vec<LedgerRow>,
}

impl LedgerGroup {
    pub fn totals(&self) -> Totals {
        Totals::new(self.total_debit, self.total_credit)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrandTotal {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_debit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_credit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// Groups in first-seen order, lookup by name, grand total
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub groups: Vec<LedgerGroup>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    pub grand_total: GrandTotal,
    pub policy: BalancePolicy,
}

impl LedgerSummary {
    pub fn group(&self, account_name: &str) -> Option<&LedgerGroup> {
        self.index.get(account_name).map(|&i| &self.groups[i])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group rows by account name
///
/// Under [`BalancePolicy::LastSeen`] a group's balance is the balance column
/// of its last row. Under [`BalancePolicy::NetMovement`] it is total debit
/// minus total credit.
pub fn aggregate(rows: &[LedgerRow], policy: BalancePolicy) -> LedgerSummary {
    let mut groups: Vec<LedgerGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.account_name.clone()).or_insert_with(|| {
            groups.push(LedgerGroup {
                account_name: row.account_name.clone(),
                account_type: row.account_type.clone(),
                total_debit: Decimal::ZERO,
                total_credit: Decimal::ZERO,
                balance: Decimal::ZERO,
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.total_debit += row.debit;
        group.total_credit += row.credit;
        group.balance = row.balance;
        group.rows.push(row.clone());
    }

    if policy == BalancePolicy::NetMovement {
        for group in &mut groups {
            group.balance = group.total_debit - group.total_credit;
        }
    }

    let grand_total = groups.iter().fold(GrandTotal::default(), |mut acc, g| {
        acc.total_debit += g.total_debit;
        acc.total_credit += g.total_credit;
        acc.balance += g.balance;
        acc
    });

    log::debug!(
        "aggregated {} ledger rows into {} accounts",
        rows.len(),
        groups.len()
    );

    LedgerSummary {
        groups,
        index,
        grand_total,
        policy,
    }
}

/// Sortable ledger columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerSortKey {
    AccountName,
    AccountType,
    Description,
    Debit,
    Credit,
    Balance,
    Date,
}

impl std::str::FromStr for LedgerSortKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(|c: char| c == '-' || c == '_', "").as_str() {
            "accountname" | "account" => Ok(LedgerSortKey::AccountName),
            "accounttype" | "type" => Ok(LedgerSortKey::AccountType),
            "description" => Ok(LedgerSortKey::Description),
            "debit" => Ok(LedgerSortKey::Debit),
            "credit" => Ok(LedgerSortKey::Credit),
            "balance" => Ok(LedgerSortKey::Balance),
            "date" => Ok(LedgerSortKey::Date),
            _ => Err(format!("Invalid ledger sort key: {}", s)),
        }
    }
}

impl LedgerSortKey {
    fn compare(self, a: &LedgerRow, b: &LedgerRow) -> Ordering {
        match self {
            LedgerSortKey::AccountName => a.account_name.cmp(&b.account_name),
            LedgerSortKey::AccountType => a.account_type.cmp(&b.account_type),
            LedgerSortKey::Description => a.description.cmp(&b.description),
            LedgerSortKey::Debit => a.debit.cmp(&b.debit),
            LedgerSortKey::Credit => a.credit.cmp(&b.credit),
            LedgerSortKey::Balance => a.balance.cmp(&b.balance),
            LedgerSortKey::Date => match (a.date_naive(), b.date_naive()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.date.cmp(&b.date),
            },
        }
    }
}

/// One page of filtered rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows matching the filter, across all pages
    pub total: usize,
    pub page_index: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }
}

/// Slice out page `page_index` of `items`
pub fn paginate<T: Clone>(items: &[T], page_index: usize, page_size: usize) -> Page<T> {
    let start = page_index.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        total: items.len(),
        page_index,
        page_size,
    }
}

/// Search, date range, sort and page for the ledger table
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerQuery {
    pub search: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub sort: Option<(LedgerSortKey, SortDirection)>,
    pub page_index: usize,
    pub page_size: usize,
}

impl LedgerQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            start: None,
            end: None,
            sort: None,
            page_index: 0,
            page_size,
        }
    }

    /// Changing the search or dates goes back to the first page
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self.page_index = 0;
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self.page_index = 0;
        self
    }

    pub fn with_page(mut self, page_index: usize, page_size: usize) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }

    /// Choosing the current key again flips the direction
    pub fn sort_by(&mut self, key: LedgerSortKey) {
        self.sort = match self.sort {
            Some((current, direction)) if current == key => Some((key, direction.reversed())),
            _ => Some((key, SortDirection::Asc)),
        };
    }

    fn period(&self) -> Period {
        Period::custom(self.start, self.end)
    }

    pub fn matches(&self, row: &LedgerRow) -> bool {
        let term = self.search.to_lowercase();
        let matches_text = term.is_empty()
            || row.account_name.to_lowercase().contains(&term)
            || row.account_type.to_lowercase().contains(&term)
            || row.description.to_lowercase().contains(&term)
            || row.date.contains(&term);
        matches_text && row.in_period(&self.period())
    }

    /// Filtered and sorted rows, all pages
    pub fn filter(&self, rows: &[LedgerRow]) -> Vec<LedgerRow> {
        let mut filtered: Vec<LedgerRow> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        if let Some((key, direction)) = self.sort {
            filtered.sort_by(|a, b| direction.apply(key.compare(a, b)));
        }
        filtered
    }

    pub fn page(&self, rows: &[LedgerRow]) -> Page<LedgerRow> {
        paginate(&self.filter(rows), self.page_index, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(account: &str, debit: &str, credit: &str, balance: &str, date: &str) -> LedgerRow {
        LedgerRow {
            account_name: account.to_string(),
            account_type: "Asset".to_string(),
            description: format!("{} movement", account),
            debit: dec(debit),
            credit: dec(credit),
            balance: dec(balance),
            date: date.to_string(),
        }
    }

    fn sample() -> Vec<LedgerRow> {
        vec![
            row("Cash", "100", "0", "100", "2024-01-05"),
            row("Bank", "0", "40", "-40", "2024-01-10"),
            row("Cash", "0", "30", "70", "2024-02-01"),
            row("cash", "5", "0", "5", "2024-02-03"),
            row("Bank", "10", "0", "-30", "2024-03-15"),
        ]
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let summary = aggregate(&sample(), BalancePolicy::LastSeen);
        let names: Vec<&str> = summary.groups.iter().map(|g| g.account_name.as_str()).collect();
        assert_eq!(names, vec!["Cash", "Bank", "cash"]);
    }

    #[test]
    fn test_group_totals_sum_to_row_totals() {
        let rows = sample();
        let summary = aggregate(&rows, BalancePolicy::LastSeen);
        let rows_total = balance::calculate(&rows);
        assert_eq!(summary.grand_total.total_debit, rows_total.total_debit);
        assert_eq!(summary.grand_total.total_credit, rows_total.total_credit);

        let group_debits: Decimal = summary.groups.iter().map(|g| g.total_debit).sum();
        assert_eq!(group_debits, rows_total.total_debit);
    }

    #[test]
    fn test_last_seen_balance() {
        let summary = aggregate(&sample(), BalancePolicy::LastSeen);
        let cash = summary.group("Cash").unwrap();
        assert_eq!(cash.total_debit, dec("100"));
        assert_eq!(cash.total_credit, dec("30"));
        assert_eq!(cash.balance, dec("70"));
        assert_eq!(cash.rows.len(), 2);
        assert_eq!(summary.group("Bank").unwrap().balance, dec("-30"));
        assert_eq!(summary.grand_total.balance, dec("45"));
    }

    #[test]
    fn test_net_movement_balance() {
        let summary = aggregate(&sample(), BalancePolicy::NetMovement);
        assert_eq!(summary.group("Bank").unwrap().balance, dec("-30"));
        assert_eq!(summary.group("Cash").unwrap().balance, dec("70"));
        assert_eq!(summary.group("cash").unwrap().balance, dec("5"));
    }

    #[test]
    fn test_empty_rows() {
        let summary = aggregate(&[], BalancePolicy::LastSeen);
        assert!(summary.is_empty());
        assert_eq!(summary.grand_total, GrandTotal::default());
        assert!(summary.group("Cash").is_none());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = LedgerQuery::new(5).with_search("BANK");
        assert_eq!(query.filter(&sample()).len(), 2);

        let by_date = LedgerQuery::new(5).with_search("2024-02");
        assert_eq!(by_date.filter(&sample()).len(), 2);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let query = LedgerQuery::new(5).with_dates(
            NaiveDate::from_ymd_opt(2024, 1, 10),
            NaiveDate::from_ymd_opt(2024, 2, 3),
        );
        let filtered = query.filter(&sample());
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered[0].date, "2024-01-10");
        assert_eq!(filtered[2].date, "2024-02-03");
    }

    #[test]
    fn test_sort_toggles_direction() {
        let mut query = LedgerQuery::new(10);
        query.sort_by(LedgerSortKey::Debit);
        assert_eq!(query.filter(&sample())[0].debit, Decimal::ZERO);
        query.sort_by(LedgerSortKey::Debit);
        assert_eq!(query.sort, Some((LedgerSortKey::Debit, SortDirection::Desc)));
        assert_eq!(query.filter(&sample())[0].debit, dec("100"));
        query.sort_by(LedgerSortKey::Date);
        assert_eq!(query.sort, Some((LedgerSortKey::Date, SortDirection::Asc)));
    }

    #[test]
    fn test_pagination() {
        let query = LedgerQuery::new(2).with_page(2, 2);
        let page = query.page(&sample());
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 5);
        assert_eq!(page.page_count(), 3);

        let past_end = LedgerQuery::new(2).with_page(9, 2).page(&sample());
        assert!(past_end.items.is_empty());
    }

    #[test]
    fn test_grand_total_of_filtered_rows() {
        let query = LedgerQuery::new(5).with_search("cash");
        let summary = aggregate(&query.filter(&sample()), BalancePolicy::LastSeen);
        assert_eq!(summary.grand_total.total_debit, dec("105"));
        assert_eq!(summary.grand_total.total_credit, dec("30"));
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("account-name".parse::<LedgerSortKey>().unwrap(), LedgerSortKey::AccountName);
        assert!("amount".parse::<LedgerSortKey>().is_err());
    }
}
