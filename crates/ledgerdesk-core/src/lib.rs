//! Core accounting logic for ledgerdesk
//!
//! Journal drafts are validated here before they are submitted, general
//! ledger rows are grouped per account, and per-project reports are
//! assembled into the cross-project dashboard. The backend is reached only
//! through the traits in [`source`].

pub mod balance;
pub mod charts;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod models;
pub mod period;
pub mod reports;
pub mod source;
pub mod types;
pub mod validation;

pub use balance::{calculate, is_balanced, LineAmounts, Totals, BALANCE_EPSILON};
pub use error::{
    BackendError, BackendErrorKind, CoreError, CoreResult, DefaultErrorLogger, ErrorCode,
    ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity, PartialLoadError, ValidationError,
    ValidationKind,
};
pub use journal::{JournalLinesView, JournalListQuery, JournalService, JournalSortKey};
pub use ledger::{aggregate, LedgerGroup, LedgerQuery, LedgerSortKey, LedgerSummary, Page};
pub use ledgerdesk_config::{BalancePolicy, TimeRange};
pub use models::*;
pub use period::{Period, PeriodFilter};
pub use reports::{
    assemble, fetch_project_reports, load_dashboard, Dashboard, DashboardSummary, ProjectReports,
    ProjectSummary, ReloadOutcome,
};
pub use source::{JournalStore, LedgerSource, ReportSource};
pub use types::{AccountCategory, AccountType, ReportState, SortDirection};
pub use validation::{validate, Attachment, DraftLine, JournalDraft, SubmissionEnvelope, ValidPayload};
