//! HTTP client for the accounting backend
//!
//! Every request carries the bearer token when one is set. Project names are
//! percent-encoded into the path. Report endpoints wrap their payload in a
//! `{ list }` or `{ data }` envelope, which is unwrapped here.

pub mod auth;

use std::time::Duration;

use async_trait::async_trait;
use ledgerdesk_config::Config;
use ledgerdesk_core::{
    amount_from_value, AccountListItem, BackendError, BalanceAccount, ChartOfAccount, CoreResult,
    CreateJournalDto, CreateProjectDto, GeneralBalance, IncomeStatement, JournalEntry,
    JournalStore, JournalWithLines, LedgerRow, LedgerSource, Period, Project, ReportSource,
    SubmissionEnvelope, TrialBalanceRow, UpdateProjectDto,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use auth::{decode_claims, is_logged_in, AuthError, LoginRequest, TokenClaims, TokenStore};

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    list: Option<T>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CreatedId {
    id: i64,
}

/// Typed client for the REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        Self::new(&config.api_root(), Duration::from_secs(config.api.timeout_secs))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn project_url(&self, project: &str, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(project),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        log::debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and turn transport failures and error statuses into `BackendError`
    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(status, &body);
        log::warn!("backend answered {}: {}", status, detail);
        Err(BackendError::from_status(status.as_u16(), detail))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BackendError> {
        let response = self.dispatch(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::network(format!("unreadable response body: {}", e)))
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), BackendError> {
        self.dispatch(builder).await.map(|_| ())
    }

    /// Confirmation text from a `{ message }` body, or the raw body
    async fn send_message(&self, builder: RequestBuilder) -> Result<String, BackendError> {
        let response = self.dispatch(builder).await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok(message_from_body(&body).unwrap_or_else(|| status.to_string()))
    }

    async fn get_list<T: DeserializeOwned>(&self, url: &str) -> Result<T, BackendError> {
        let envelope: ListEnvelope<T> = self.send_json(self.request(Method::GET, url)).await?;
        envelope
            .list
            .ok_or_else(|| BackendError::server(None, format!("response from {} has no list", url)))
    }

    async fn get_data<T: DeserializeOwned>(&self, url: &str) -> Result<T, BackendError> {
        let envelope: DataEnvelope<T> = self.send_json(self.request(Method::GET, url)).await?;
        envelope
            .data
            .ok_or_else(|| BackendError::server(None, format!("response from {} has no data", url)))
    }

    fn with_body<B: Serialize + ?Sized>(&self, method: Method, url: &str, body: &B) -> RequestBuilder {
        self.request(method, url).json(body)
    }

    fn with_submission(
        &self,
        method: Method,
        url: &str,
        payload: &SubmissionEnvelope,
    ) -> Result<RequestBuilder, BackendError> {
        match payload {
            SubmissionEnvelope::Json(dto) => Ok(self.with_body(method, url, dto)),
            SubmissionEnvelope::Multipart { dto, attachment } => {
                let part = reqwest::multipart::Part::bytes(attachment.bytes.clone())
                    .file_name(attachment.file_name.clone())
                    .mime_str(&attachment.content_type)
                    .map_err(|e| BackendError::network(format!("invalid attachment type: {}", e)))?;
                let form = journal_form(dto).part(ledgerdesk_core::validation::ATTACHMENT_FIELD, part);
                Ok(self.request(method, url).multipart(form))
            }
        }
    }

    // ==================== Auth ====================

    /// Exchange credentials for a token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, BackendError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: auth::LoginResponse = self
            .send_json(self.with_body(Method::POST, &self.url("auth/login"), &request))
            .await?;
        log::info!("logged in as {}", email);
        Ok(response.token)
    }

    // ==================== Projects ====================

    pub async fn get_project(&self, id: i64) -> Result<Project, BackendError> {
        self.send_json(self.request(Method::GET, &self.url(&format!("Projects/{}", id))))
            .await
    }

    pub async fn create_project(&self, dto: &CreateProjectDto) -> Result<Project, BackendError> {
        self.send_json(self.with_body(Method::POST, &self.url("Projects"), dto))
            .await
    }

    pub async fn update_project(&self, id: i64, dto: &UpdateProjectDto) -> Result<Project, BackendError> {
        self.send_json(self.with_body(Method::PUT, &self.url(&format!("Projects/{}", id)), dto))
            .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), BackendError> {
        self.send_unit(self.request(Method::DELETE, &self.url(&format!("Projects/{}", id))))
            .await
    }

    pub async fn join_project(&self, id: i64) -> Result<(), BackendError> {
        let url = self.url(&format!("Projects/{}/join", id));
        self.send_unit(self.with_body(Method::POST, &url, &serde_json::json!({})))
            .await
    }

    // ==================== Chart of accounts ====================

    pub async fn list_accounts(&self, project: &str) -> Result<Vec<ChartOfAccount>, BackendError> {
        let url = self.project_url(project, "chart-of-accounts");
        self.send_json(self.request(Method::GET, &url)).await
    }

    /// Parent-account picker entries
    pub async fn account_list(&self, project: &str) -> Result<Vec<AccountListItem>, BackendError> {
        let url = self.project_url(project, "chart-of-accounts/List");
        self.send_json(self.request(Method::GET, &url)).await
    }

    pub async fn get_account(&self, project: &str, id: i64) -> Result<ChartOfAccount, BackendError> {
        let url = self.project_url(project, &format!("chart-of-accounts/{}", id));
        self.send_json(self.request(Method::GET, &url)).await
    }

    pub async fn create_account(&self, project: &str, account: &ChartOfAccount) -> Result<ChartOfAccount, BackendError> {
        let url = self.project_url(project, "chart-of-accounts");
        self.send_json(self.with_body(Method::POST, &url, account)).await
    }

    pub async fn update_account(&self, project: &str, id: i64, account: &ChartOfAccount) -> Result<(), BackendError> {
        let url = self.project_url(project, &format!("chart-of-accounts/{}", id));
        self.send_unit(self.with_body(Method::PUT, &url, account)).await
    }

    pub async fn delete_account(&self, project: &str, id: i64) -> Result<(), BackendError> {
        let url = self.project_url(project, &format!("chart-of-accounts/{}", id));
        self.send_unit(self.request(Method::DELETE, &url)).await
    }
}

/// Multipart form with the same fields as the JSON body
fn journal_form(dto: &CreateJournalDto) -> reqwest::multipart::Form {
    let form = reqwest::multipart::Form::new()
        .text("entryNumber", dto.entry_number.clone())
        .text("date", dto.date.clone())
        .text("description", dto.description.clone())
        .text("LinesJson", dto.lines_json.clone());
    match &dto.photo_url {
        Some(url) => form.text("PhotoUrl", url.clone()),
        None => form,
    }
}

fn message_from_body(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => ["message", "title", "error", "detail"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
            .or_else(|| value.as_str().map(str::to_string)),
        Err(_) => Some(body.to_string()),
    }
}

fn error_detail(status: StatusCode, body: &str) -> String {
    message_from_body(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    })
}

#[async_trait]
impl ReportSource for ApiClient {
    async fn list_projects(&self) -> Result<Vec<Project>, BackendError> {
        self.send_json(self.request(Method::GET, &self.url("Projects")))
            .await
    }

    async fn income_statement(&self, project: &str, period: &Period) -> Result<IncomeStatement, BackendError> {
        let url = self.project_url(project, "reports/income-statement");
        let (from, to) = period.query_bounds();
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(from) = from {
            query.push(("from", from));
        }
        if let Some(to) = to {
            query.push(("to", to));
        }
        let envelope: ListEnvelope<IncomeStatement> = self
            .send_json(self.request(Method::GET, &url).query(&query))
            .await?;
        envelope
            .list
            .ok_or_else(|| BackendError::server(None, format!("response from {} has no list", url)))
    }

    async fn balance_sheet(&self, project: &str) -> Result<Vec<BalanceAccount>, BackendError> {
        self.get_list(&self.project_url(project, "reports/balance-sheet")).await
    }

    async fn trial_balance(&self, project: &str) -> Result<Vec<TrialBalanceRow>, BackendError> {
        self.get_list(&self.project_url(project, "reports/trial-balance")).await
    }

    /// A present but null `data` reads as zero cash
    async fn available_cash(&self, project: &str) -> Result<Decimal, BackendError> {
        let url = self.project_url(project, "reports/available-cash");
        let body: serde_json::Value = self.send_json(self.request(Method::GET, &url)).await?;
        match body.get("data") {
            Some(value) => Ok(amount_from_value(value)),
            None => Err(BackendError::server(None, format!("response from {} has no data", url))),
        }
    }

    async fn general_balance(&self, project: &str) -> Result<GeneralBalance, BackendError> {
        self.get_data(&self.project_url(project, "reports/general-balance")).await
    }
}

#[async_trait]
impl LedgerSource for ApiClient {
    async fn general_ledger(&self, project: &str) -> Result<Vec<LedgerRow>, BackendError> {
        self.get_list(&self.project_url(project, "reports/generaledger")).await
    }
}

#[async_trait]
impl JournalStore for ApiClient {
    async fn list_journals(&self, project: &str) -> CoreResult<Vec<JournalEntry>> {
        let url = self.project_url(project, "journals");
        Ok(self.send_json(self.request(Method::GET, &url)).await?)
    }

    async fn get_journal(&self, project: &str, id: i64) -> CoreResult<JournalWithLines> {
        let url = self.project_url(project, &format!("journals/{}", id));
        Ok(self.send_json(self.request(Method::GET, &url)).await?)
    }

    async fn create_journal(&self, project: &str, payload: &SubmissionEnvelope) -> CoreResult<i64> {
        let url = self.project_url(project, "journals");
        let created: CreatedId = self
            .send_json(self.with_submission(Method::POST, &url, payload)?)
            .await?;
        Ok(created.id)
    }

    async fn update_journal(&self, project: &str, id: i64, payload: &SubmissionEnvelope) -> CoreResult<()> {
        let url = self.project_url(project, &format!("journals/{}", id));
        Ok(self.send_unit(self.with_submission(Method::PUT, &url, payload)?).await?)
    }

    async fn post_journal(&self, project: &str, id: i64) -> CoreResult<()> {
        let url = self.project_url(project, &format!("journals/{}/post", id));
        Ok(self
            .send_unit(self.with_body(Method::POST, &url, &serde_json::json!({})))
            .await?)
    }

    async fn unpost_journal(&self, project: &str, id: i64) -> CoreResult<String> {
        let url = self.project_url(project, &format!("journals/{}/unpost", id));
        Ok(self
            .send_message(self.with_body(Method::POST, &url, &serde_json::json!({})))
            .await?)
    }

    async fn delete_journal(&self, project: &str, id: i64) -> CoreResult<String> {
        let url = self.project_url(project, &format!("journals/{}", id));
        Ok(self.send_message(self.request(Method::DELETE, &url)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerdesk_core::{
        validate, Attachment, BackendErrorKind, DraftLine, JournalDraft, JournalService, TimeRange,
    };
    use mockito::Matcher;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn client(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(&format!("{}/api/", server.url()), Duration::from_secs(5))
            .unwrap()
            .with_token("test-token")
    }

    #[tokio::test]
    async fn test_trial_balance_unwraps_list_and_sends_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/Tower%20B/reports/trial-balance")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"list":[{"accountName":"Cash","debit":"100.50","credit":null}]}"#)
            .create_async()
            .await;

        let rows = client(&server).trial_balance("Tower B").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].debit, dec("100.50"));
        assert_eq!(rows[0].credit, Decimal::ZERO);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_list_is_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/Alpha/reports/balance-sheet")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items":[]}"#)
            .create_async()
            .await;

        let err = client(&server).balance_sheet("Alpha").await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Server);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/Alpha/reports/generaledger")
            .with_status(422)
            .with_body(r#"{"message":"bad project"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/Alpha/reports/trial-balance")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let api = client(&server);
        let err = api.general_ledger("Alpha").await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Validation);
        assert_eq!(err.status, Some(422));
        assert_eq!(err.detail, "bad project");

        let err = api.trial_balance("Alpha").await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Server);
        assert_eq!(err.detail, "maintenance");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let api = ApiClient::new("http://127.0.0.1:9/api", Duration::from_millis(500)).unwrap();
        let err = api.list_projects().await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Network);
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn test_income_statement_passes_period() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/Alpha/reports/income-statement")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".into(), "2024-01-01".into()),
                Matcher::UrlEncoded("to".into(), "2024-12-31".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"list":{"totalRevenue":1200,"totalExpense":"300"}}"#)
            .create_async()
            .await;

        let period = Period::new(TimeRange::Year)
            .as_of(chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let income = client(&server).income_statement("Alpha", &period).await.unwrap();
        assert_eq!(income.net_profit(), dec("900"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_available_cash_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/A/reports/available-cash")
            .with_status(200)
            .with_body(r#"{"data":"2500.75"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/B/reports/available-cash")
            .with_status(200)
            .with_body(r#"{"data":null}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/C/reports/available-cash")
            .with_status(200)
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let api = client(&server);
        assert_eq!(api.available_cash("A").await.unwrap(), dec("2500.75"));
        assert_eq!(api.available_cash("B").await.unwrap(), Decimal::ZERO);
        assert_eq!(api.available_cash("C").await.unwrap_err().kind, BackendErrorKind::Server);
    }

    #[tokio::test]
    async fn test_general_balance_data_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/Alpha/reports/general-balance")
            .with_status(200)
            .with_body(
                r#"{"data":{"step1":{"totalRevenue":500},"step2":{"netProfit":120},
                   "balanceSheet":{"totalAssets":900,"totalLiabilities":780}}}"#,
            )
            .create_async()
            .await;

        let balance = client(&server).general_balance("Alpha").await.unwrap();
        assert_eq!(balance.step1.total_revenue, dec("500"));
        assert_eq!(balance.liabilities_and_equity(), dec("900"));
    }

    #[tokio::test]
    async fn test_create_journal_sends_lines_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/Alpha/journals")
            .match_header("content-type", "application/json")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(serde_json::json!({
                    "entryNumber": "JE-1",
                    "date": "2024-01-01",
                    "description": "Opening"
                })),
                Matcher::Regex(r#""LinesJson":"\[\{\\"accountId\\":1"#.to_string()),
            ]))
            .with_status(201)
            .with_body(r#"{"id":31}"#)
            .create_async()
            .await;

        let service = JournalService::new(client(&server), "Alpha");
        let draft = JournalDraft::new()
            .with_header("JE-1", "2024-01-01", "Opening")
            .with_line_at(0, DraftLine::debit_line(1, dec("100")))
            .unwrap()
            .with_line(DraftLine::credit_line(2, dec("100")));
        assert_eq!(service.create(&draft).await.unwrap(), 31);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_attachment_goes_multipart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/Alpha/journals")
            .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
            .match_body(Matcher::Regex(r#"name="photo"; filename="receipt.png""#.to_string()))
            .with_status(200)
            .with_body(r#"{"id":8}"#)
            .create_async()
            .await;

        let draft = JournalDraft::new()
            .with_header("JE-2", "2024-01-02", "Receipt")
            .with_line_at(0, DraftLine::debit_line(1, dec("5")))
            .unwrap()
            .with_line(DraftLine::credit_line(2, dec("5")))
            .with_attachment(Attachment::from_bytes("receipt.png", vec![137, 80, 78, 71]));
        let payload = validate(&draft).unwrap().envelope().unwrap();
        let id = client(&server).create_journal("Alpha", &payload).await.unwrap();
        assert_eq!(id, 8);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unpost_and_delete_return_messages() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/Alpha/journals/4/unpost")
            .with_status(200)
            .with_body(r#"{"message":"Journal unposted"}"#)
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/Alpha/journals/4")
            .with_status(204)
            .create_async()
            .await;

        let api = client(&server);
        assert_eq!(api.unpost_journal("Alpha", 4).await.unwrap(), "Journal unposted");
        assert_eq!(api.delete_journal("Alpha", 4).await.unwrap(), "204 No Content");
    }

    #[tokio::test]
    async fn test_login_and_projects() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .match_body(Matcher::Json(serde_json::json!({
                "email": "amal@example.com", "password": "secret"
            })))
            .with_status(200)
            .with_body(r#"{"token":"abc.def.ghi"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/Projects")
            .with_status(200)
            .with_body(r#"[{"id":1,"name":"Alpha"},{"id":2,"name":"Tower B","description":"HQ"}]"#)
            .create_async()
            .await;
        let join = server
            .mock("POST", "/api/Projects/2/join")
            .with_status(200)
            .create_async()
            .await;

        let api = ApiClient::new(&format!("{}/api", server.url()), Duration::from_secs(5)).unwrap();
        assert_eq!(api.login("amal@example.com", "secret").await.unwrap(), "abc.def.ghi");
        let projects = api.list_projects().await.unwrap();
        assert_eq!(projects[1].description.as_deref(), Some("HQ"));
        api.join_project(2).await.unwrap();
        join.assert_async().await;
    }

    #[tokio::test]
    async fn test_chart_of_accounts_list() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/Alpha/chart-of-accounts")
            .with_status(200)
            .with_body(
                r#"[{"id":1,"accountCode":"1000","accountName":"Cash","accountType":"Current Asset","isDetail":true},
                    {"id":2,"accountCode":"2000","accountName":"Loans","accountType":"contra liability","isDetail":false,"parentAccountId":1}]"#,
            )
            .create_async()
            .await;

        let accounts = client(&server).list_accounts("Alpha").await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].account_type, ledgerdesk_core::AccountType::ContraLiability);
        assert_eq!(accounts[1].parent_account_id, Some(1));
    }

    #[tokio::test]
    async fn test_project_crud() {
        let mut server = mockito::Server::new_async().await;
        let get = server
            .mock("GET", "/api/Projects/2")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(r#"{"id":2,"name":"Tower B","description":"HQ","createdAt":"2024-03-01T10:00:00"}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/Projects")
            .match_body(Matcher::Json(serde_json::json!({"name": "Depot"})))
            .with_status(201)
            .with_body(r#"{"id":3,"name":"Depot"}"#)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/api/Projects/3")
            .match_body(Matcher::Json(serde_json::json!({"description": "North depot"})))
            .with_status(200)
            .with_body(r#"{"id":3,"name":"Depot","description":"North depot"}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/Projects/3")
            .with_status(204)
            .create_async()
            .await;

        let api = client(&server);
        let tower = api.get_project(2).await.unwrap();
        assert_eq!(tower.name, "Tower B");
        assert_eq!(tower.created_at.as_deref(), Some("2024-03-01T10:00:00"));

        let created = api
            .create_project(&CreateProjectDto {
                name: "Depot".to_string(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 3);

        let updated = api
            .update_project(
                3,
                &UpdateProjectDto {
                    description: Some("North depot".to_string()),
                    ..UpdateProjectDto::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("North depot"));

        api.delete_project(3).await.unwrap();
        for mock in [get, create, update, delete] {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_missing_project_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/Projects/99")
            .with_status(404)
            .with_body(r#"{"title":"Not Found"}"#)
            .create_async()
            .await;

        let err = client(&server).get_project(99).await.unwrap_err();
        assert_eq!(err.status, Some(404));
        assert_eq!(err.detail, "Not Found");
    }

    #[tokio::test]
    async fn test_chart_of_accounts_crud() {
        let mut server = mockito::Server::new_async().await;
        let parents = server
            .mock("GET", "/api/Tower%20B/chart-of-accounts/List")
            .with_status(200)
            .with_body(r#"[{"id":1,"accountName":"Cash","accountCode":"1000"},{"id":4}]"#)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/api/Tower%20B/chart-of-accounts/7")
            .with_status(200)
            .with_body(
                r#"{"id":7,"accountCode":"1100","accountName":"Petty cash","accountType":"CURRENT_ASSET","parentAccountId":1,"isDetail":true,"openingBalance":250.5}"#,
            )
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/Tower%20B/chart-of-accounts")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "accountCode": "1200",
                "accountName": "Bank",
                "accountType": "Current Asset",
                "parentAccountId": 1,
                "isDetail": true
            })))
            .with_status(201)
            .with_body(r#"{"id":8,"accountCode":"1200","accountName":"Bank","accountType":"Current Asset","isDetail":true}"#)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/api/Tower%20B/chart-of-accounts/8")
            .match_body(Matcher::PartialJson(serde_json::json!({"id": 8, "accountName": "Main bank"})))
            .with_status(204)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/Tower%20B/chart-of-accounts/8")
            .with_status(204)
            .create_async()
            .await;

        let api = client(&server);
        let list = api.account_list("Tower B").await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].account_code.as_deref(), Some("1000"));
        assert_eq!(list[1].account_name, "");

        let petty = api.get_account("Tower B", 7).await.unwrap();
        assert_eq!(petty.account_type, ledgerdesk_core::AccountType::CurrentAsset);
        assert_eq!(petty.opening_balance, Some(dec("250.5")));

        let mut bank = ChartOfAccount {
            id: 0,
            account_code: "1200".to_string(),
            account_name: "Bank".to_string(),
            account_type: ledgerdesk_core::AccountType::CurrentAsset,
            parent_account_id: Some(1),
            is_detail: true,
            currency: None,
            opening_balance: None,
        };
        let created = api.create_account("Tower B", &bank).await.unwrap();
        assert_eq!(created.id, 8);

        bank.id = created.id;
        bank.account_name = "Main bank".to_string();
        api.update_account("Tower B", 8, &bank).await.unwrap();
        api.delete_account("Tower B", 8).await.unwrap();

        for mock in [parents, get, create, update, delete] {
            mock.assert_async().await;
        }
    }

    #[test]
    fn test_message_from_body() {
        assert_eq!(message_from_body(r#"{"title":"Not Found"}"#).as_deref(), Some("Not Found"));
        assert_eq!(message_from_body("plain").as_deref(), Some("plain"));
        assert_eq!(message_from_body("   "), None);
        assert_eq!(
            error_detail(StatusCode::BAD_GATEWAY, ""),
            "Bad Gateway".to_string()
        );
    }
}
