//! Debit/credit totals over any set of lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{JournalLine, LedgerRow, TrialBalanceRow};

/// Largest debit/credit difference still treated as balanced (0.01)
pub const BALANCE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Anything with a debit and a credit column
pub trait LineAmounts {
    fn debit(&self) -> Decimal;
    fn credit(&self) -> Decimal;
}

impl LineAmounts for JournalLine {
    fn debit(&self) -> Decimal {
        self.debit
    }
    fn credit(&self) -> Decimal {
        self.credit
    }
}

impl LineAmounts for LedgerRow {
    fn debit(&self) -> Decimal {
        self.debit
    }
    fn credit(&self) -> Decimal {
        self.credit
    }
}

impl LineAmounts for TrialBalanceRow {
    fn debit(&self) -> Decimal {
        self.debit
    }
    fn credit(&self) -> Decimal {
        self.credit
    }
}

impl<T: LineAmounts + ?Sized> LineAmounts for &T {
    fn debit(&self) -> Decimal {
        (**self).debit()
    }
    fn credit(&self) -> Decimal {
        (**self).credit()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_debit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_credit: Decimal,
}

impl Totals {
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
        }
    }

    /// Debit minus credit
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }

    pub fn is_balanced(&self) -> bool {
        is_balanced(self.total_debit, self.total_credit)
    }

    pub fn add(&mut self, other: Totals) {
        self.total_debit += other.total_debit;
        self.total_credit += other.total_credit;
    }
}

/// `|debit - credit| < 0.01`
pub fn is_balanced(total_debit: Decimal, total_credit: Decimal) -> bool {
    (total_debit - total_credit).abs() < BALANCE_EPSILON
}

/// Sum the debit and credit columns, in order
pub fn calculate<I>(lines: I) -> Totals
where
    I: IntoIterator,
    I::Item: LineAmounts,
{
    lines.into_iter().fold(Totals::default(), |mut totals, line| {
        totals.total_debit += line.debit();
        totals.total_credit += line.credit();
        totals
    })
}
