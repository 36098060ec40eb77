//! Cross-project report assembly for the dashboard
//!
//! Every project's four reports are fetched together, and all projects are
//! fetched concurrently. A project whose fetch fails is marked `Errored`
//! and left out of the global totals; the rest of the dashboard still loads.

use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::balance::{self, BALANCE_EPSILON};
use crate::charts::{self, ChartData};
use crate::error::{BackendError, PartialLoadError};
use crate::models::{BalanceAccount, IncomeStatement, Project, TrialBalanceRow};
use crate::period::Period;
use crate::source::ReportSource;
use crate::types::ReportState;

/// Largest tilt of the balance-scale graphic, in degrees
pub const MAX_SCALE_TILT: f64 = 18.0;

/// The four reports fetched per project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReports {
    pub income_statement: IncomeStatement,
    pub balance_sheet: Vec<BalanceAccount>,
    pub trial_balance: Vec<TrialBalanceRow>,
    #[serde(with = "rust_decimal::serde::float")]
    pub available_cash: Decimal,
}

/// Fetch all four reports of one project; the first failure fails the group
pub async fn fetch_project_reports<S>(
    source: &S,
    project: &str,
    period: &Period,
) -> Result<ProjectReports, BackendError>
where
    S: ReportSource + ?Sized,
{
    let (income_statement, balance_sheet, trial_balance, available_cash) = tokio::try_join!(
        source.income_statement(project, period),
        source.balance_sheet(project),
        source.trial_balance(project),
        source.available_cash(project),
    )?;
    Ok(ProjectReports {
        income_statement,
        balance_sheet,
        trial_balance,
        available_cash,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCharts {
    pub bar: ChartData,
    pub pie: ChartData,
    pub balance: ChartData,
}

/// One project's dashboard card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project: Project,
    pub state: ReportState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PartialLoadError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_statement: Option<IncomeStatement>,
    pub balance_sheet: Vec<BalanceAccount>,
    pub trial_balance: Vec<TrialBalanceRow>,
    #[serde(with = "rust_decimal::serde::float")]
    pub available_cash: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_debit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_credit: Decimal,
    pub is_balanced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charts: Option<ProjectCharts>,
}

impl ProjectSummary {
    pub fn loading(project: Project) -> Self {
        Self {
            project,
            state: ReportState::Loading,
            error: None,
            income_statement: None,
            balance_sheet: Vec::new(),
            trial_balance: Vec::new(),
            available_cash: Decimal::ZERO,
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            is_balanced: false,
            charts: None,
        }
    }

    pub fn loading_reports(&self) -> bool {
        self.state == ReportState::Loading
    }

    pub fn error_reports(&self) -> bool {
        self.state == ReportState::Errored
    }

    pub fn net_profit(&self) -> Decimal {
        self.income_statement
            .as_ref()
            .map(IncomeStatement::net_profit)
            .unwrap_or_default()
    }

    fn load(&mut self, reports: ProjectReports) {
        let totals = balance::calculate(&reports.trial_balance);
        self.total_debit = totals.total_debit;
        self.total_credit = totals.total_credit;
        self.is_balanced = totals.is_balanced();
        self.charts = Some(ProjectCharts {
            bar: charts::project_revenue_bar(&reports.income_statement),
            pie: charts::project_revenue_pie(&reports.income_statement),
            balance: charts::project_balance_bar(totals.total_debit, totals.total_credit),
        });
        self.income_statement = Some(reports.income_statement);
        self.balance_sheet = reports.balance_sheet;
        self.trial_balance = reports.trial_balance;
        self.available_cash = reports.available_cash;
        self.error = None;
        self.state = ReportState::Loaded;
    }

    fn fail(&mut self, source: BackendError) {
        self.state = ReportState::Errored;
        self.error = Some(PartialLoadError {
            project: self.project.name.clone(),
            source,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalCharts {
    pub bar: ChartData,
    pub pie: ChartData,
    pub trend: ChartData,
}

/// Every project plus the totals over the ones that loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub projects: Vec<ProjectSummary>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_net_profit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub global_total_debit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub global_total_credit: Decimal,
    pub charts: GlobalCharts,
}

impl DashboardSummary {
    pub fn is_balanced(&self) -> bool {
        balance::is_balanced(self.global_total_debit, self.global_total_credit)
    }

    /// Rotation of the balance-scale graphic
    ///
    /// Proportional to `(debit - credit) / (debit + credit)`, clamped to
    /// ±18 degrees. A zero denominator counts as 1.
    pub fn scale_tilt_degrees(&self) -> f64 {
        let diff = self.global_total_debit - self.global_total_credit;
        let mut denominator = self.global_total_debit + self.global_total_credit;
        if denominator.is_zero() {
            denominator = Decimal::ONE;
        }
        let factor = (diff / denominator).to_f64().unwrap_or(0.0).clamp(-1.0, 1.0);
        factor * MAX_SCALE_TILT
    }

    pub fn loaded(&self) -> impl Iterator<Item = &ProjectSummary> {
        self.projects.iter().filter(|p| p.state == ReportState::Loaded)
    }

    pub fn errored(&self) -> impl Iterator<Item = &ProjectSummary> {
        self.projects.iter().filter(|p| p.state == ReportState::Errored)
    }

    pub fn project(&self, name: &str) -> Option<&ProjectSummary> {
        self.projects.iter().find(|p| p.project.name == name)
    }
}

/// Fetch every project's reports and build the dashboard
///
/// Results are matched back to projects by name. Nothing here fails: a
/// project whose reports cannot be fetched ends up `Errored`.
pub async fn assemble<S>(source: &S, projects: Vec<Project>, period: &Period) -> DashboardSummary
where
    S: ReportSource + ?Sized,
{
    let mut summaries: Vec<ProjectSummary> = projects.into_iter().map(ProjectSummary::loading).collect();

    let names: Vec<String> = summaries.iter().map(|s| s.project.name.clone()).collect();
    let fetches = names.into_iter().map(|name| {
        async move {
            let result = fetch_project_reports(source, &name, period).await;
            (name, result)
        }
    });
    let results = join_all(fetches).await;

    for (name, result) in results {
        let Some(summary) = summaries
            .iter_mut()
            .find(|s| s.project.name == name && s.state == ReportState::Loading)
        else {
            log::warn!("report result for unknown project '{}' ignored", name);
            continue;
        };
        match result {
            Ok(reports) => summary.load(reports),
            Err(e) => {
                log::warn!("reports for project '{}' failed: {}", name, e);
                summary.fail(e);
            }
        }
    }

    let mut total_revenue = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut global_total_debit = Decimal::ZERO;
    let mut global_total_credit = Decimal::ZERO;
    for summary in summaries.iter().filter(|s| s.state == ReportState::Loaded) {
        if let Some(income) = &summary.income_statement {
            total_revenue += income.total_revenue;
            total_expenses += income.total_expense;
        }
        global_total_debit += summary.total_debit;
        global_total_credit += summary.total_credit;
    }

    let charts = GlobalCharts {
        bar: charts::global_revenue_bar(total_revenue, total_expenses),
        pie: charts::global_revenue_pie(total_revenue, total_expenses),
        trend: charts::global_trend(
            summaries
                .iter()
                .map(|s| (s.project.name.as_str(), s.income_statement.as_ref())),
        ),
    };

    log::info!(
        "dashboard assembled: {} projects, {} errored, balanced within {}: {}",
        summaries.len(),
        summaries.iter().filter(|s| s.error_reports()).count(),
        BALANCE_EPSILON,
        balance::is_balanced(global_total_debit, global_total_credit)
    );

    DashboardSummary {
        projects: summaries,
        total_revenue,
        total_expenses,
        total_net_profit: total_revenue - total_expenses,
        global_total_debit,
        global_total_credit,
        charts,
    }
}

/// List the projects, then assemble; only the project list itself can fail
pub async fn load_dashboard<S>(source: &S, period: &Period) -> Result<DashboardSummary, BackendError>
where
    S: ReportSource + ?Sized,
{
    let projects = source.list_projects().await?;
    Ok(assemble(source, projects, period).await)
}

/// Result of a [`Dashboard::reload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// This reload's result is now the dashboard state
    Committed { generation: u64 },
    /// A newer reload started first; this result was dropped
    Superseded { generation: u64, latest: u64 },
}

/// Dashboard state that survives overlapping reloads
///
/// Each reload takes a new generation number and only commits if it is
/// still the newest when it completes.
pub struct Dashboard<S> {
    source: S,
    period: Period,
    generation: AtomicU64,
    state: RwLock<Option<DashboardSummary>>,
}

impl<S: ReportSource> Dashboard<S> {
    pub fn new(source: S, period: Period) -> Self {
        Self {
            source,
            period,
            generation: AtomicU64::new(0),
            state: RwLock::new(None),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Option<DashboardSummary> {
        self.state.read().await.clone()
    }

    pub async fn reload(&self) -> Result<ReloadOutcome, BackendError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            if let Some(current) = state.as_mut() {
                for project in &mut current.projects {
                    project.state = ReportState::Loading;
                }
            }
        }

        let result = load_dashboard(&self.source, &self.period).await;

        let mut state = self.state.write().await;
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            log::debug!("dashboard reload {} superseded by {}", generation, latest);
            return Ok(ReloadOutcome::Superseded { generation, latest });
        }
        match result {
            Ok(summary) => {
                *state = Some(summary);
                Ok(ReloadOutcome::Committed { generation })
            }
            Err(e) => {
                // cards marked Loading above must still end the cycle
                if let Some(current) = state.as_mut() {
                    for project in &mut current.projects {
                        project.fail(e.clone());
                    }
                }
                Err(e)
            }
        }
    }
}
