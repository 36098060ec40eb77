//! Subcommand handlers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{TimeZone, Utc};
use futures::future::join_all;
use ledgerdesk_client::{ApiClient, TokenStore};
use ledgerdesk_config::{Config, TimeRange};
use ledgerdesk_core::charts::{ledger_comparison, ledger_debit_pie};
use ledgerdesk_core::ledger::paginate;
use ledgerdesk_core::{
    aggregate, Attachment, CoreError, Dashboard, DashboardSummary, DefaultErrorLogger, ErrorContext,
    ErrorLogger, GeneralBalance, JournalDraft, JournalListQuery, JournalService, JournalSortKey,
    LedgerQuery, LedgerRow, LedgerSortKey, LedgerSource, LedgerSummary, Page, Period, ReloadOutcome,
    ReportSource,
};
use ledgerdesk_export::{
    balance_file_name, general_balance_workbook, ledger_file_name, ledger_workbook, save_to,
    ExportOptions, ALL_PROJECTS,
};
use ledgerdesk_utils::format_amount;
use rust_decimal::Decimal;

use crate::{Args, Command, JournalAction, LedgerFilter, PeriodArgs};

/// Operation name used in error logs
fn name(command: &Command) -> &'static str {
    match command {
        Command::Validate => "validate",
        Command::InitConfig { .. } => "init-config",
        Command::Login { .. } => "login",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Projects => "projects",
        Command::Accounts { .. } => "accounts",
        Command::Journals { .. } => "journals",
        Command::Journal { .. } => "journal",
        Command::Ledger { .. } => "ledger",
        Command::ExportLedger { .. } => "export-ledger",
        Command::ExportBalance { .. } => "export-balance",
        Command::Dashboard { .. } => "dashboard",
    }
}

/// Context for error logs: the operation, its project and the journal id
pub fn error_context(command: &Command) -> ErrorContext {
    let context = ErrorContext::new(name(command));
    match command {
        Command::Accounts { project }
        | Command::Journals { project, .. }
        | Command::Ledger { project, .. }
        | Command::ExportLedger { project, .. } => context.with_project(project.as_str()),
        Command::ExportBalance { project: Some(project), .. } => context.with_project(project.as_str()),
        Command::Journal { project, action } => {
            let context = context.with_project(project.as_str());
            match action {
                JournalAction::Show { id }
                | JournalAction::Update { id, .. }
                | JournalAction::Post { id }
                | JournalAction::Unpost { id }
                | JournalAction::Delete { id } => context.with_data("id", serde_json::json!(id)),
                JournalAction::Create { file, .. } => {
                    context.with_data("draft", serde_json::json!(file.display().to_string()))
                }
            }
        }
        _ => context,
    }
}

pub async fn run(args: &Args, config: &Config) -> Result<()> {
    let ctx = Ctx { args, config };
    match &args.command {
        Command::Validate => validate(&args.config),
        Command::InitConfig { force } => init_config(&args.config, *force),
        Command::Login { email, password } => ctx.login(email, password).await,
        Command::Logout => ctx.logout(),
        Command::Whoami => ctx.whoami(),
        Command::Projects => ctx.projects().await,
        Command::Accounts { project } => ctx.accounts(project).await,
        Command::Journals {
            project,
            search,
            sort,
            desc,
        } => ctx.journals(project, search.as_deref(), sort.as_deref(), *desc).await,
        Command::Journal { project, action } => ctx.journal(project, action).await,
        Command::Ledger {
            project,
            filter,
            sort,
            desc,
            page,
            page_size,
            json,
        } => {
            ctx.ledger(project, filter, sort.as_deref(), *desc, *page, *page_size, *json)
                .await
        }
        Command::ExportLedger { project, filter, out } => ctx.export_ledger(project, filter, out.as_deref()).await,
        Command::ExportBalance { project, all, out } => {
            ctx.export_balance(project.as_deref(), *all, out.as_deref()).await
        }
        Command::Dashboard { period, json } => ctx.dashboard(period, *json).await,
    }
}

fn validate(path: &Path) -> Result<()> {
    let config = Config::load(path).map_err(CoreError::from)?;
    println!("Configuration OK: {}", path.display());
    println!("  api: {}", config.api_root());
    println!("  balance policy: {}", config.ledger.balance_policy);
    println!("  default range: {}", config.ledger.default_range);
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite it", path.display());
    }
    std::fs::write(path, Config::generate_default())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn now() -> i64 {
    Utc::now().timestamp()
}

fn period_from(args: &PeriodArgs, default_range: TimeRange) -> Result<Period> {
    if args.from.is_some() || args.to.is_some() {
        return Ok(Period::custom(args.from, args.to));
    }
    let range = match &args.range {
        Some(raw) => raw.parse::<TimeRange>().map_err(anyhow::Error::msg)?,
        None => default_range,
    };
    if range == TimeRange::Custom {
        bail!("--range custom needs --from and/or --to");
    }
    Ok(Period::new(range))
}

fn read_draft(file: &Path, attachment: Option<&Path>) -> Result<JournalDraft> {
    let content = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let draft: JournalDraft =
        serde_json::from_str(&content).with_context(|| format!("{} is not a journal draft", file.display()))?;
    match attachment {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "attachment".to_string());
            Ok(draft.with_attachment(Attachment::from_bytes(file_name, bytes)))
        }
        None => Ok(draft),
    }
}

struct Ctx<'a> {
    args: &'a Args,
    config: &'a Config,
}

impl Ctx<'_> {
    fn token_store(&self) -> TokenStore {
        TokenStore::new(self.config.auth.token_file.clone())
    }

    fn amount(&self, value: Decimal) -> String {
        let currency = &self.config.currency;
        format_amount(
            value,
            currency.decimal_places,
            &currency.thousands_separator,
            &currency.decimal_separator,
        )
    }

    fn anonymous_client(&self) -> Result<ApiClient> {
        Ok(ApiClient::from_config(self.config).map_err(CoreError::from)?)
    }

    /// Client carrying the `--token` value or the stored login
    fn client(&self) -> Result<ApiClient> {
        let token = match &self.args.token {
            Some(token) => token.clone(),
            None => {
                let (token, claims) = self.token_store().session(now()).map_err(CoreError::from)?;
                log::debug!("using stored token for {}", claims.email);
                token
            }
        };
        Ok(self.anonymous_client()?.with_token(token))
    }

    fn output_dir(&self, out: Option<&Path>) -> PathBuf {
        out.map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.export.output_dir.clone())
    }

    async fn login(&self, email: &str, password: &str) -> Result<()> {
        let token = self
            .anonymous_client()?
            .login(email, password)
            .await
            .map_err(CoreError::from)?;
        let store = self.token_store();
        store.save(&token).map_err(CoreError::from)?;
        match ledgerdesk_client::decode_claims(&token) {
            Ok(claims) => println!("Logged in as {} ({})", claims.email, claims.role),
            Err(e) => log::warn!("token stored but its claims are unreadable: {}", e),
        }
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        self.token_store().clear().map_err(CoreError::from)?;
        println!("Logged out");
        Ok(())
    }

    fn whoami(&self) -> Result<()> {
        let claims = match &self.args.token {
            Some(token) => ledgerdesk_client::decode_claims(token).map_err(CoreError::from)?,
            None => self.token_store().session(now()).map_err(CoreError::from)?.1,
        };
        let expires = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| claims.exp.to_string());
        println!("user:    {}", claims.sub);
        println!("email:   {}", claims.email);
        println!("role:    {}", claims.role);
        println!("expires: {}", expires);
        if claims.is_expired_at(now()) {
            println!("(expired)");
        }
        Ok(())
    }

    async fn projects(&self) -> Result<()> {
        let projects = self.client()?.list_projects().await.map_err(CoreError::from)?;
        for project in projects {
            println!(
                "{:>5}  {}  {}",
                project.id,
                project.name,
                project.description.unwrap_or_default()
            );
        }
        Ok(())
    }

    async fn accounts(&self, project: &str) -> Result<()> {
        let accounts = self
            .client()?
            .list_accounts(project)
            .await
            .map_err(CoreError::from)?;
        for account in accounts {
            println!(
                "{:>8}  {:<32}  {:<18}  {}",
                account.account_code,
                account.account_name,
                account.account_type.translation_key(),
                if account.is_detail { "detail" } else { "group" }
            );
        }
        Ok(())
    }

    async fn journals(&self, project: &str, search: Option<&str>, sort: Option<&str>, desc: bool) -> Result<()> {
        let mut query = JournalListQuery::default().with_search(search.unwrap_or_default());
        if let Some(raw) = sort {
            let key: JournalSortKey = raw.parse().map_err(anyhow::Error::msg)?;
            query.sort_by(key);
            if desc {
                query.sort_by(key);
            }
        }
        let service = JournalService::new(self.client()?, project);
        for entry in service.list(&query).await? {
            println!(
                "{:>5}  {:<12}  {:<10}  {:<6}  {}",
                entry.id,
                entry.entry_number,
                entry.date_naive().map(|d| d.to_string()).unwrap_or(entry.date.clone()),
                entry.status(),
                entry.description
            );
        }
        Ok(())
    }

    async fn journal(&self, project: &str, action: &JournalAction) -> Result<()> {
        let service = JournalService::new(self.client()?, project);
        match action {
            JournalAction::Show { id } => {
                let view = service.lines(*id).await?;
                let entry = &view.journal.entry;
                println!("{}  {}  {}  [{}]", entry.entry_number, entry.date, entry.description, entry.status());
                for line in &view.journal.lines {
                    println!(
                        "  {:<32}  {:>14}  {:>14}  {}",
                        line.account_name.clone().unwrap_or_else(|| format!("#{}", line.account_id)),
                        self.amount(line.debit),
                        self.amount(line.credit),
                        line.description
                    );
                }
                println!(
                    "  {:<32}  {:>14}  {:>14}",
                    "Total",
                    self.amount(view.total_debit()),
                    self.amount(view.total_credit())
                );
            }
            JournalAction::Create { file, attachment } => {
                let draft = read_draft(file, attachment.as_deref())?;
                let id = service.create(&draft).await?;
                println!("Created journal {} (id {})", draft.entry_number, id);
            }
            JournalAction::Update { id, file, attachment } => {
                let draft = read_draft(file, attachment.as_deref())?;
                service.update(*id, &draft).await?;
                println!("Updated journal {}", id);
            }
            JournalAction::Post { id } => {
                service.post(*id).await?;
                println!("Posted journal {}", id);
            }
            JournalAction::Unpost { id } => println!("{}", service.unpost(*id).await?),
            JournalAction::Delete { id } => println!("{}", service.delete(*id).await?),
        }
        Ok(())
    }

    fn ledger_query(&self, filter: &LedgerFilter) -> LedgerQuery {
        LedgerQuery::new(self.config.ledger.page_size)
            .with_search(filter.search.clone().unwrap_or_default())
            .with_dates(filter.from, filter.to)
    }

    #[allow(clippy::too_many_arguments)]
    async fn ledger(
        &self,
        project: &str,
        filter: &LedgerFilter,
        sort: Option<&str>,
        desc: bool,
        page: usize,
        page_size: Option<usize>,
        json: bool,
    ) -> Result<()> {
        let rows = self
            .client()?
            .general_ledger(project)
            .await
            .map_err(CoreError::from)?;
        let mut query = self
            .ledger_query(filter)
            .with_page(page, page_size.unwrap_or(self.config.ledger.page_size));
        if let Some(raw) = sort {
            let key: LedgerSortKey = raw.parse().map_err(anyhow::Error::msg)?;
            query.sort_by(key);
            if desc {
                query.sort_by(key);
            }
        }

        let filtered = query.filter(&rows);
        let summary = aggregate(&filtered, self.config.ledger.balance_policy);
        let page = paginate(&filtered, query.page_index, query.page_size);

        if json {
            let body = ledger_json(&summary, &page);
            println!("{}", serde_json::to_string_pretty(&body)?);
            return Ok(());
        }

        for group in &summary.groups {
            println!(
                "{:<32}  {:<18}  {:>14}  {:>14}  {:>14}",
                group.account_name,
                group.account_type,
                self.amount(group.total_debit),
                self.amount(group.total_credit),
                self.amount(group.balance)
            );
        }
        let totals = &summary.grand_total;
        println!(
            "{:<32}  {:<18}  {:>14}  {:>14}  {:>14}",
            "Grand total",
            "",
            self.amount(totals.total_debit),
            self.amount(totals.total_credit),
            self.amount(totals.balance)
        );

        println!();
        for row in &page.items {
            println!(
                "{:<10}  {:<24}  {:<28}  {:>12}  {:>12}  {:>12}",
                row.date_naive().map(|d| d.to_string()).unwrap_or(row.date.clone()),
                row.account_name,
                row.description,
                self.amount(row.debit),
                self.amount(row.credit),
                self.amount(row.balance)
            );
        }
        println!(
            "page {}/{} ({} rows)",
            page.page_index + 1,
            page.page_count().max(1),
            page.total
        );
        Ok(())
    }

    async fn export_ledger(&self, project: &str, filter: &LedgerFilter, out: Option<&Path>) -> Result<()> {
        let rows = self
            .client()?
            .general_ledger(project)
            .await
            .map_err(CoreError::from)?;
        let filtered = self.ledger_query(filter).filter(&rows);
        let summary = aggregate(&filtered, self.config.ledger.balance_policy);
        let options = ExportOptions::from_config(&self.config.export);
        let bytes = ledger_workbook(project, &summary, &options).map_err(CoreError::from)?;
        let path = save_to(&self.output_dir(out), &ledger_file_name(project), &bytes).map_err(CoreError::from)?;
        println!("Exported {} accounts to {}", summary.len(), path.display());
        Ok(())
    }

    async fn export_balance(&self, project: Option<&str>, all: bool, out: Option<&Path>) -> Result<()> {
        let client = self.client()?;
        let (label, balance) = match (project, all) {
            (Some(name), false) => {
                let balance = client.general_balance(name).await.map_err(CoreError::from)?;
                (name.to_string(), balance)
            }
            (None, true) => (ALL_PROJECTS.to_string(), consolidated_balance(&client).await?),
            _ => bail!("name a project or pass --all"),
        };
        let options = ExportOptions::from_config(&self.config.export);
        let bytes = general_balance_workbook(&label, &balance, &options).map_err(CoreError::from)?;
        let path = save_to(&self.output_dir(out), &balance_file_name(&label), &bytes).map_err(CoreError::from)?;
        println!("Exported general balance to {}", path.display());
        Ok(())
    }

    async fn dashboard(&self, period: &PeriodArgs, json: bool) -> Result<()> {
        let period = period_from(period, self.config.ledger.default_range)?;
        let dashboard = Dashboard::new(self.client()?, period.clone());
        match dashboard.reload().await.map_err(CoreError::from)? {
            ReloadOutcome::Committed { generation } => log::debug!("dashboard generation {}", generation),
            ReloadOutcome::Superseded { generation, latest } => {
                log::warn!("dashboard load {} superseded by {}", generation, latest)
            }
        }
        let summary = match dashboard.snapshot().await {
            Some(summary) => summary,
            None => bail!("dashboard did not load"),
        };
        for project in summary.errored() {
            if let Some(error) = &project.error {
                let context = ErrorContext::new("dashboard").with_project(project.project.name.as_str());
                DefaultErrorLogger.log_warning(&error.source.to_string(), &context);
            }
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }
        self.print_dashboard(&summary, &period);
        Ok(())
    }

    fn print_dashboard(&self, summary: &DashboardSummary, period: &Period) {
        println!("Dashboard ({})", period.description());
        for project in &summary.projects {
            if let Some(error) = &project.error {
                println!("  {:<24}  failed: {}", project.project.name, error.source);
                continue;
            }
            println!(
                "  {:<24}  net profit {:>14}  cash {:>14}  trial balance {}",
                project.project.name,
                self.amount(project.net_profit()),
                self.amount(project.available_cash),
                if project.is_balanced { "balanced" } else { "UNBALANCED" }
            );
        }
        println!();
        println!("  revenue     {:>14}", self.amount(summary.total_revenue));
        println!("  expenses    {:>14}", self.amount(summary.total_expenses));
        println!("  net profit  {:>14}", self.amount(summary.total_net_profit));
        println!(
            "  debit {} / credit {}: {} (tilt {:+.1}°)",
            self.amount(summary.global_total_debit),
            self.amount(summary.global_total_credit),
            if summary.is_balanced() { "balanced" } else { "unbalanced" },
            summary.scale_tilt_degrees()
        );
        let failed = summary.errored().count();
        if failed > 0 {
            println!("  {} project(s) failed to load", failed);
        }
    }
}

/// `ledger --json` body: the summary, its two charts and the page
fn ledger_json(summary: &LedgerSummary, page: &Page<LedgerRow>) -> serde_json::Value {
    serde_json::json!({
        "summary": summary,
        "charts": {
            "debitPie": ledger_debit_pie(summary),
            "comparison": ledger_comparison(summary),
        },
        "page": page,
    })
}

/// Every project's general balance summed into one
///
/// Any failing project fails the whole export.
async fn consolidated_balance(client: &ApiClient) -> Result<GeneralBalance> {
    let projects = client.list_projects().await.map_err(CoreError::from)?;
    let results = join_all(projects.iter().map(|p| client.general_balance(&p.name))).await;
    let mut balances = Vec::with_capacity(results.len());
    for (project, result) in projects.iter().zip(results) {
        let balance = result.map_err(|source| {
            CoreError::from(ledgerdesk_core::PartialLoadError {
                project: project.name.clone(),
                source,
            })
        })?;
        balances.push(balance);
    }
    log::info!("consolidating {} project balances", balances.len());
    Ok(GeneralBalance::consolidate(&balances))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_explicit_dates_make_custom_period() {
        let args = PeriodArgs {
            range: Some("year".to_string()),
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: None,
        };
        let period = period_from(&args, TimeRange::All).unwrap();
        assert_eq!(period.range, TimeRange::Custom);
        assert_eq!(period.start_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(period.end_date(), None);
    }

    #[test]
    fn test_range_falls_back_to_config_default() {
        let args = PeriodArgs {
            range: None,
            from: None,
            to: None,
        };
        assert_eq!(period_from(&args, TimeRange::Quarter).unwrap().range, TimeRange::Quarter);
        let custom = PeriodArgs {
            range: Some("custom".to_string()),
            ..args
        };
        assert!(period_from(&custom, TimeRange::All).is_err());
    }

    #[test]
    fn test_error_context_names_project_and_journal() {
        let command = Command::Journal {
            project: "Tower B".to_string(),
            action: JournalAction::Post { id: 7 },
        };
        let context = error_context(&command);
        assert_eq!(context.operation, "journal");
        assert_eq!(context.project.as_deref(), Some("Tower B"));
        assert_eq!(context.data["id"], 7);

        let all = error_context(&Command::ExportBalance {
            project: None,
            all: true,
            out: None,
        });
        assert_eq!(all.operation, "export-balance");
        assert!(all.project.is_none());
    }

    #[test]
    fn test_ledger_json_carries_charts() {
        let rows: Vec<LedgerRow> = serde_json::from_value(serde_json::json!([
            {"accountName": "Cash", "accountType": "Asset", "description": "Sale",
             "debit": 100, "credit": 0, "balance": 100, "date": "2024-01-05"},
            {"accountName": "Bank", "accountType": "Asset", "description": "Fee",
             "debit": 0, "credit": 40, "balance": -40, "date": "2024-01-10"}
        ]))
        .unwrap();
        let summary = aggregate(&rows, ledgerdesk_core::BalancePolicy::LastSeen);
        let page = paginate(&rows, 0, 10);

        let body = ledger_json(&summary, &page);
        assert_eq!(body["summary"]["groups"].as_array().unwrap().len(), 2);
        assert_eq!(body["page"]["total"], 2);
        assert_eq!(body["charts"]["debitPie"], serde_json::to_value(ledger_debit_pie(&summary)).unwrap());
        assert_eq!(body["charts"]["comparison"], serde_json::to_value(ledger_comparison(&summary)).unwrap());
    }

    #[test]
    fn test_read_draft_with_attachment() {
        let dir = tempfile::TempDir::new().unwrap();
        let draft_path = dir.path().join("draft.json");
        std::fs::write(
            &draft_path,
            r#"{"entryNumber":"JE-9","date":"2024-04-01","description":"Fuel",
                "lines":[{"accountId":1,"debit":40},{"accountId":2,"credit":40}]}"#,
        )
        .unwrap();
        let receipt = dir.path().join("fuel.jpg");
        std::fs::write(&receipt, [0xFF, 0xD8]).unwrap();

        let draft = read_draft(&draft_path, Some(&receipt)).unwrap();
        assert_eq!(draft.lines.len(), 2);
        assert!(ledgerdesk_core::validate(&draft).is_ok());
        let attachment = draft.attachment.unwrap();
        assert_eq!(attachment.file_name, "fuel.jpg");
        assert_eq!(attachment.content_type, "image/jpeg");
    }
}
