//! Backend seams
//!
//! The HTTP client implements these traits; tests substitute in-memory
//! fakes.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{BackendError, CoreResult};
use crate::models::{
    BalanceAccount, GeneralBalance, IncomeStatement, JournalEntry, JournalWithLines, LedgerRow,
    Project, TrialBalanceRow,
};
use crate::period::Period;
use crate::validation::SubmissionEnvelope;

/// Per-project financial reports
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, BackendError>;

    async fn income_statement(&self, project: &str, period: &Period) -> Result<IncomeStatement, BackendError>;

    async fn balance_sheet(&self, project: &str) -> Result<Vec<BalanceAccount>, BackendError>;

    async fn trial_balance(&self, project: &str) -> Result<Vec<TrialBalanceRow>, BackendError>;

    async fn available_cash(&self, project: &str) -> Result<Decimal, BackendError>;

    async fn general_balance(&self, project: &str) -> Result<GeneralBalance, BackendError>;
}

/// General-ledger rows of a project
#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn general_ledger(&self, project: &str) -> Result<Vec<LedgerRow>, BackendError>;
}

/// Journal persistence
#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn list_journals(&self, project: &str) -> CoreResult<Vec<JournalEntry>>;

    async fn get_journal(&self, project: &str, id: i64) -> CoreResult<JournalWithLines>;

    /// Returns the id of the created entry
    async fn create_journal(&self, project: &str, payload: &SubmissionEnvelope) -> CoreResult<i64>;

    async fn update_journal(&self, project: &str, id: i64, payload: &SubmissionEnvelope) -> CoreResult<()>;

    async fn post_journal(&self, project: &str, id: i64) -> CoreResult<()>;

    /// Returns the backend's confirmation message
    async fn unpost_journal(&self, project: &str, id: i64) -> CoreResult<String>;

    async fn delete_journal(&self, project: &str, id: i64) -> CoreResult<String>;
}
