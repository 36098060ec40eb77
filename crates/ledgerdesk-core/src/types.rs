//! Basic types shared across the core modules

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Account type as used by the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Asset,
    ContraAsset,
    CurrentAsset,
    Liability,
    ContraLiability,
    CurrentLiability,
    Equity,
    Revenue,
    Expense,
}

/// Top-level grouping of account types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    Assets,
    Liabilities,
    Equity,
    Revenue,
    Expenses,
}

impl AccountType {
    pub const ALL: [AccountType; 9] = [
        AccountType::Asset,
        AccountType::ContraAsset,
        AccountType::CurrentAsset,
        AccountType::Liability,
        AccountType::ContraLiability,
        AccountType::CurrentLiability,
        AccountType::Equity,
        AccountType::Revenue,
        AccountType::Expense,
    ];

    /// Translation key for the UI dictionary
    pub fn translation_key(&self) -> &'static str {
        match self {
            AccountType::Asset => "ASSET",
            AccountType::ContraAsset => "CONTRA_ASSET",
            AccountType::CurrentAsset => "CURRENT_ASSET",
            AccountType::Liability => "LIABILITY",
            AccountType::ContraLiability => "CONTRA_LIABILITY",
            AccountType::CurrentLiability => "CURRENT_LIABILITY",
            AccountType::Equity => "EQUITY",
            AccountType::Revenue => "REVENUE",
            AccountType::Expense => "EXPENSE",
        }
    }

    pub fn category(&self) -> AccountCategory {
        match self {
            AccountType::Asset | AccountType::ContraAsset | AccountType::CurrentAsset => {
                AccountCategory::Assets
            }
            AccountType::Liability
            | AccountType::ContraLiability
            | AccountType::CurrentLiability => AccountCategory::Liabilities,
            AccountType::Equity => AccountCategory::Equity,
            AccountType::Revenue => AccountCategory::Revenue,
            AccountType::Expense => AccountCategory::Expenses,
        }
    }
}

impl Default for AccountType {
    fn default() -> Self {
        AccountType::Asset
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
            .replace('_', " ");
        match normalized.as_str() {
            "asset" | "assets" => Ok(AccountType::Asset),
            "contra asset" => Ok(AccountType::ContraAsset),
            "current asset" => Ok(AccountType::CurrentAsset),
            "liability" | "liabilities" => Ok(AccountType::Liability),
            "contra liability" => Ok(AccountType::ContraLiability),
            "current liability" => Ok(AccountType::CurrentLiability),
            "equity" => Ok(AccountType::Equity),
            "revenue" | "revenues" => Ok(AccountType::Revenue),
            "expense" | "expenses" => Ok(AccountType::Expense),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Asset => write!(f, "Asset"),
            AccountType::ContraAsset => write!(f, "Contra Asset"),
            AccountType::CurrentAsset => write!(f, "Current Asset"),
            AccountType::Liability => write!(f, "Liability"),
            AccountType::ContraLiability => write!(f, "Contra Liability"),
            AccountType::CurrentLiability => write!(f, "Current Liability"),
            AccountType::Equity => write!(f, "Equity"),
            AccountType::Revenue => write!(f, "Revenue"),
            AccountType::Expense => write!(f, "Expense"),
        }
    }
}

impl Serialize for AccountType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Load state of one project's reports on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportState {
    Loading,
    Loaded,
    Errored,
}

impl Default for ReportState {
    fn default() -> Self {
        ReportState::Loading
    }
}

impl std::fmt::Display for ReportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportState::Loading => write!(f, "loading"),
            ReportState::Loaded => write!(f, "loaded"),
            ReportState::Errored => write!(f, "errored"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Apply the direction to an ascending comparison
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid sort direction: {}", s)),
        }
    }
}
