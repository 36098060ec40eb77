//! Chart-ready series for the ledger and dashboard views
//!
//! Labels are translation keys; rendering is left to the caller.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerSummary;
use crate::models::IncomeStatement;

pub const REVENUE_COLOR: &str = "#4ade80";
pub const EXPENSE_COLOR: &str = "#f87171";
pub const DEBIT_COLOR: &str = "#60a5fa";
pub const CREDIT_COLOR: &str = "#fbbf24";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<f64>,
}

/// Series, categories and colors for one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub title: String,
    /// X-axis categories, or slice labels for a pie
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
}

impl ChartData {
    fn new(kind: ChartKind, title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            labels: Vec::new(),
            series: Vec::new(),
            colors: Vec::new(),
        }
    }

    fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    fn series(mut self, name: &str, data: Vec<f64>) -> Self {
        self.series.push(ChartSeries {
            name: name.to_string(),
            data,
        });
        self
    }

    fn colors(mut self, colors: &[&str]) -> Self {
        self.colors = colors.iter().map(|c| c.to_string()).collect();
        self
    }
}

fn num(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Pie of total debit per account
pub fn ledger_debit_pie(summary: &LedgerSummary) -> ChartData {
    ChartData::new(ChartKind::Pie, "TOTAL_DEBIT_PER_ACCOUNT")
        .labels(summary.groups.iter().map(|g| g.account_name.clone()))
        .series("DEBIT", summary.groups.iter().map(|g| num(g.total_debit)).collect())
}

/// Debit, credit and balance per account
pub fn ledger_comparison(summary: &LedgerSummary) -> ChartData {
    let groups = &summary.groups;
    ChartData::new(ChartKind::Line, "DEBIT_CREDIT_BALANCE_PER_ACCOUNT")
        .labels(groups.iter().map(|g| g.account_name.clone()))
        .series("DEBIT", groups.iter().map(|g| num(g.total_debit)).collect())
        .series("CREDIT", groups.iter().map(|g| num(g.total_credit)).collect())
        .series("BALANCE", groups.iter().map(|g| num(g.balance)).collect())
        .colors(&[DEBIT_COLOR, CREDIT_COLOR, REVENUE_COLOR])
}

pub fn project_revenue_bar(income: &IncomeStatement) -> ChartData {
    ChartData::new(ChartKind::Bar, "REVENUE_VS_EXPENSE")
        .labels([""])
        .series("REVENUE", vec![num(income.total_revenue)])
        .series("EXPENSE", vec![num(income.total_expense)])
        .colors(&[REVENUE_COLOR, EXPENSE_COLOR])
}

pub fn project_revenue_pie(income: &IncomeStatement) -> ChartData {
    ChartData::new(ChartKind::Pie, "REVENUE_VS_EXPENSE")
        .labels(["REVENUE", "EXPENSE"])
        .series("AMOUNT", vec![num(income.total_revenue), num(income.total_expense)])
        .colors(&[REVENUE_COLOR, EXPENSE_COLOR])
}

/// Trial-balance debit against credit
pub fn project_balance_bar(total_debit: Decimal, total_credit: Decimal) -> ChartData {
    ChartData::new(ChartKind::Bar, "TRIAL_BALANCE")
        .labels(["DEBIT", "CREDIT"])
        .series("AMOUNT", vec![num(total_debit), num(total_credit)])
        .colors(&[DEBIT_COLOR, CREDIT_COLOR])
}

pub fn global_revenue_bar(total_revenue: Decimal, total_expenses: Decimal) -> ChartData {
    ChartData::new(ChartKind::Bar, "ALL_PROJECTS")
        .labels(["ALL_PROJECTS"])
        .series("REVENUE", vec![num(total_revenue)])
        .series("EXPENSE", vec![num(total_expenses)])
        .colors(&[REVENUE_COLOR, EXPENSE_COLOR])
}

pub fn global_revenue_pie(total_revenue: Decimal, total_expenses: Decimal) -> ChartData {
    ChartData::new(ChartKind::Pie, "ALL_PROJECTS")
        .labels(["TOTAL_REVENUE", "TOTAL_EXPENSES"])
        .series("AMOUNT", vec![num(total_revenue), num(total_expenses)])
        .colors(&[REVENUE_COLOR, EXPENSE_COLOR])
}

/// Revenue and expense per project; projects without reports plot as zero
pub fn global_trend<'a, I>(projects: I) -> ChartData
where
    I: IntoIterator<Item = (&'a str, Option<&'a IncomeStatement>)>,
{
    let mut names = Vec::new();
    let mut revenue = Vec::new();
    let mut expense = Vec::new();
    for (name, income) in projects {
        names.push(name.to_string());
        revenue.push(income.map(|i| num(i.total_revenue)).unwrap_or(0.0));
        expense.push(income.map(|i| num(i.total_expense)).unwrap_or(0.0));
    }
    ChartData::new(ChartKind::Line, "ALL_PROJECTS")
        .labels(names)
        .series("REVENUE", revenue)
        .series("EXPENSE", expense)
        .colors(&[REVENUE_COLOR, EXPENSE_COLOR])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::aggregate;
    use crate::models::LedgerRow;
    use ledgerdesk_config::BalancePolicy;

    fn row(account: &str, debit: i64, credit: i64) -> LedgerRow {
        LedgerRow {
            account_name: account.to_string(),
            account_type: "Asset".to_string(),
            description: String::new(),
            debit: Decimal::from(debit),
            credit: Decimal::from(credit),
            balance: Decimal::from(debit - credit),
            date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn test_ledger_charts_follow_group_order() {
        let summary = aggregate(
            &[row("Cash", 100, 0), row("Bank", 20, 5), row("Cash", 50, 0)],
            BalancePolicy::LastSeen,
        );
        let pie = ledger_debit_pie(&summary);
        assert_eq!(pie.labels, vec!["Cash", "Bank"]);
        assert_eq!(pie.series[0].data, vec![150.0, 20.0]);

        let comparison = ledger_comparison(&summary);
        assert_eq!(comparison.series.len(), 3);
        assert_eq!(comparison.series[1].data, vec![0.0, 5.0]);
        assert_eq!(comparison.series[2].data, vec![50.0, 15.0]);
    }

    #[test]
    fn test_trend_plots_missing_reports_as_zero() {
        let income = IncomeStatement {
            total_revenue: Decimal::from(900),
            total_expense: Decimal::from(400),
        };
        let chart = global_trend([("A", Some(&income)), ("B", None)]);
        assert_eq!(chart.labels, vec!["A", "B"]);
        assert_eq!(chart.series[0].data, vec![900.0, 0.0]);
        assert_eq!(chart.series[1].data, vec![400.0, 0.0]);
    }

    #[test]
    fn test_balance_bar_colors() {
        let chart = project_balance_bar(Decimal::from(10), Decimal::from(8));
        assert_eq!(chart.colors, vec![DEBIT_COLOR, CREDIT_COLOR]);
        assert_eq!(chart.labels, vec!["DEBIT", "CREDIT"]);
    }
}
