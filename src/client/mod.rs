//! HTTP client for the lunch ledger API.
//!
//! [`Client`] has one method per route. [`dashboard`] loads everything a summary
//! screen needs in one go, and [`batch`] runs the multi-request writes that may
//! finish only partly.

pub mod batch;
pub mod dashboard;

use crate::{
    api::{ErrorBody, LoginRequest, LoginResponse, SessionItems, SessionState, WhoAmI},
    core::{
        employee::{EmployeePatch, NewEmployee},
        expense::{ExpenseWithTransactions, NewExpense},
        format::WIRE_DATE_FORMAT,
        menu::{FoodItemPatch, NewFoodItem},
        payment,
        report::{EmployeeReport, ExpenseStat, Summary},
        session::{NewSession, NewSessionWithExpense, SessionOrder, SessionWithExpense},
        tag::NewTag,
        transaction::{NewTransaction, TransactionFilter, TransactionPatch},
        validation::ExpenseDraft,
    },
    entities::{
        EmployeeModel, ExpenseModel, FoodItemModel, SessionModel, TagModel, TransactionModel,
    },
};
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use batch::{BatchReport, ExpenseBatch};
pub use dashboard::{Snapshot, load_snapshot};

/// Failure of a single API call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// 401 or 403
    #[error("not authorized")]
    Unauthorized,
    /// 404
    #[error("not found: {0}")]
    NotFound(String),
    /// 409
    #[error("conflict: {0}")]
    Conflict(String),
    /// 400 or 422, or a draft rejected before sending
    #[error("validation failed: {0}")]
    Validation(String),
    /// Any other non-success status
    #[error("server error: {0}")]
    Server(String),
    /// The request never completed or the reply was not the expected JSON
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The base URL or a route could not be joined
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Client result.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// API client. Cloning shares the connection pool and the cookie store.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client for the API served at `base_url`.
    ///
    /// The client keeps cookies, so a successful [`Client::login_pin`] carries over
    /// to later calls.
    ///
    /// # Errors
    /// Returns `InvalidUrl` when `base_url` does not parse.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(format!("{base_url}: {err}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { base_url, http })
    }

    /// Base URL every route is joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(format!("{path}: {err}")))?;
        Ok(self.http.request(method, endpoint))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let res = self.request(Method::GET, path)?.send().await?;
        decode(res).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let res = self.request(method, path)?.json(body).send().await?;
        decode(res).await
    }

    async fn send_empty(&self, method: Method, path: &str) -> ClientResult<()> {
        let res = self.request(method, path)?.send().await?;
        check(res).await.map(|_| ())
    }

    // Employees

    /// `GET /employee`
    pub async fn list_employees(&self) -> ClientResult<Vec<EmployeeModel>> {
        self.get("employee").await
    }

    /// `POST /employee`
    pub async fn create_employee(&self, employee: &NewEmployee) -> ClientResult<EmployeeModel> {
        self.send_json(Method::POST, "employee", employee).await
    }

    /// `GET /employee/{id}`
    pub async fn get_employee(&self, id: &str) -> ClientResult<EmployeeModel> {
        self.get(&format!("employee/{id}")).await
    }

    /// `PUT /employee/{id}`
    pub async fn update_employee(&self, id: &str, patch: &EmployeePatch) -> ClientResult<EmployeeModel> {
        self.send_json(Method::PUT, &format!("employee/{id}"), patch).await
    }

    /// `DELETE /employee/{id}`
    pub async fn delete_employee(&self, id: &str) -> ClientResult<()> {
        self.send_empty(Method::DELETE, &format!("employee/{id}")).await
    }

    /// `POST /employee/login-pin`
    pub async fn login_pin(&self, pin: &str) -> ClientResult<LoginResponse> {
        let body = LoginRequest {
            pin: pin.to_string(),
        };
        self.send_json(Method::POST, "employee/login-pin", &body).await
    }

    /// `POST /employee/logout`
    pub async fn logout(&self) -> ClientResult<()> {
        self.send_empty(Method::POST, "employee/logout").await
    }

    /// `GET /employee/whoami`
    pub async fn whoami(&self) -> ClientResult<WhoAmI> {
        self.get("employee/whoami").await
    }

    // Expenses

    /// `GET /expenses`
    pub async fn list_expenses(&self) -> ClientResult<Vec<ExpenseModel>> {
        self.get("expenses").await
    }

    /// `GET /expenses/range?startDate&endDate`
    pub async fn list_expenses_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ClientResult<Vec<ExpenseModel>> {
        let query = [
            ("startDate", start.format(WIRE_DATE_FORMAT).to_string()),
            ("endDate", end.format(WIRE_DATE_FORMAT).to_string()),
        ];
        let res = self
            .request(Method::GET, "expenses/range")?
            .query(&query)
            .send()
            .await?;
        decode(res).await
    }

    /// `POST /expenses`
    pub async fn create_expense(&self, expense: &NewExpense) -> ClientResult<ExpenseModel> {
        self.send_json(Method::POST, "expenses", expense).await
    }

    /// `POST /expenses/with-transactions`, the all-or-nothing server-side variant of
    /// [`batch::create_expense_with_selections`].
    pub async fn create_expense_with_transactions(
        &self,
        draft: &ExpenseDraft,
    ) -> ClientResult<ExpenseWithTransactions> {
        self.send_json(Method::POST, "expenses/with-transactions", draft)
            .await
    }

    /// `GET /expenses/{id}`
    pub async fn get_expense(&self, id: &str) -> ClientResult<ExpenseModel> {
        self.get(&format!("expenses/{id}")).await
    }

    /// `PUT /expenses/{id}/toggle-collected`
    pub async fn toggle_collected(&self, id: &str) -> ClientResult<ExpenseModel> {
        let res = self
            .request(Method::PUT, &format!("expenses/{id}/toggle-collected"))?
            .send()
            .await?;
        decode(res).await
    }

    /// `DELETE /expenses/{id}`
    pub async fn delete_expense(&self, id: &str) -> ClientResult<()> {
        self.send_empty(Method::DELETE, &format!("expenses/{id}")).await
    }

    // Transactions

    /// `POST /expense-transactions`
    pub async fn create_transaction(&self, transaction: &NewTransaction) -> ClientResult<TransactionModel> {
        self.send_json(Method::POST, "expense-transactions", transaction)
            .await
    }

    /// `GET /expense-transactions/filter`; an empty filter returns everything.
    pub async fn filter_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> ClientResult<Vec<TransactionModel>> {
        let res = self
            .request(Method::GET, "expense-transactions/filter")?
            .query(filter)
            .send()
            .await?;
        decode(res).await
    }

    /// `GET /expense-transactions/{id}`
    pub async fn get_transaction(&self, id: &str) -> ClientResult<TransactionModel> {
        self.get(&format!("expense-transactions/{id}")).await
    }

    /// `PUT /expense-transactions/{id}`
    pub async fn update_transaction(
        &self,
        id: &str,
        patch: &TransactionPatch,
    ) -> ClientResult<TransactionModel> {
        self.send_json(Method::PUT, &format!("expense-transactions/{id}"), patch)
            .await
    }

    /// `DELETE /expense-transactions/{id}`
    pub async fn delete_transaction(&self, id: &str) -> ClientResult<()> {
        self.send_empty(Method::DELETE, &format!("expense-transactions/{id}"))
            .await
    }

    /// `POST /expense-transactions/pay-all/{employee_id}`, settling every open charge
    /// in one server-side transaction.
    pub async fn settle_employee(&self, employee_id: &str) -> ClientResult<Vec<TransactionModel>> {
        let res = self
            .request(
                Method::POST,
                &format!("expense-transactions/pay-all/{employee_id}"),
            )?
            .send()
            .await?;
        decode(res).await
    }

    /// Flips a charge between paid and unpaid.
    pub async fn toggle_paid(&self, transaction: &TransactionModel) -> ClientResult<TransactionModel> {
        let patch = payment::toggle_paid(transaction);
        self.update_transaction(&transaction.id, &patch).await
    }

    // Menu

    /// `GET /food-items`
    pub async fn list_food_items(&self) -> ClientResult<Vec<FoodItemModel>> {
        self.get("food-items").await
    }

    /// `POST /food-items`
    pub async fn create_food_item(&self, item: &NewFoodItem) -> ClientResult<FoodItemModel> {
        self.send_json(Method::POST, "food-items", item).await
    }

    /// `GET /food-items/{id}`
    pub async fn get_food_item(&self, id: &str) -> ClientResult<FoodItemModel> {
        self.get(&format!("food-items/{id}")).await
    }

    /// `PUT /food-items/{id}`
    pub async fn update_food_item(&self, id: &str, patch: &FoodItemPatch) -> ClientResult<FoodItemModel> {
        self.send_json(Method::PUT, &format!("food-items/{id}"), patch)
            .await
    }

    /// `DELETE /food-items/{id}`
    pub async fn delete_food_item(&self, id: &str) -> ClientResult<()> {
        self.send_empty(Method::DELETE, &format!("food-items/{id}")).await
    }

    // Sessions

    /// `GET /sessions`
    pub async fn list_sessions(&self) -> ClientResult<Vec<SessionModel>> {
        self.get("sessions").await
    }

    /// `POST /sessions`
    pub async fn create_session(&self, session: &NewSession) -> ClientResult<SessionModel> {
        self.send_json(Method::POST, "sessions", session).await
    }

    /// `POST /sessions/with-expense`
    pub async fn create_session_with_expense(
        &self,
        session: &NewSessionWithExpense,
    ) -> ClientResult<SessionWithExpense> {
        self.send_json(Method::POST, "sessions/with-expense", session)
            .await
    }

    /// `GET /sessions/{id}`
    pub async fn get_session(&self, id: &str) -> ClientResult<SessionModel> {
        self.get(&format!("sessions/{id}")).await
    }

    /// `PUT /sessions/{id}/deactivate`
    pub async fn set_session_active(&self, id: &str, is_active: bool) -> ClientResult<SessionModel> {
        self.send_json(
            Method::PUT,
            &format!("sessions/{id}/deactivate"),
            &SessionState { is_active },
        )
        .await
    }

    /// `PUT /sessions/{id}/items`
    pub async fn update_session_items(&self, id: &str, items: Vec<String>) -> ClientResult<SessionModel> {
        self.send_json(
            Method::PUT,
            &format!("sessions/{id}/items"),
            &SessionItems { items },
        )
        .await
    }

    /// `POST /sessions/{id}/orders`
    pub async fn submit_order(&self, id: &str, order: &SessionOrder) -> ClientResult<TransactionModel> {
        self.send_json(Method::POST, &format!("sessions/{id}/orders"), order)
            .await
    }

    // Tags

    /// `GET /tags`
    pub async fn list_tags(&self) -> ClientResult<Vec<TagModel>> {
        self.get("tags").await
    }

    /// `POST /tags`
    pub async fn create_tag(&self, name: &str) -> ClientResult<TagModel> {
        let body = NewTag {
            name: name.to_string(),
        };
        self.send_json(Method::POST, "tags", &body).await
    }

    // Summary

    /// `GET /summary`, with the server's configured top length unless `top` is set.
    pub async fn summary(&self, top: Option<usize>) -> ClientResult<Summary> {
        let mut request = self.request(Method::GET, "summary")?;
        if let Some(top) = top {
            request = request.query(&[("top", top)]);
        }
        decode(request.send().await?).await
    }

    /// `GET /summary/expenses`
    pub async fn expense_stats(&self) -> ClientResult<Vec<ExpenseStat>> {
        self.get("summary/expenses").await
    }

    /// `GET /summary/employees/{id}`
    pub async fn employee_report(
        &self,
        employee_id: &str,
        week: Option<NaiveDate>,
    ) -> ClientResult<EmployeeReport> {
        let mut request = self.request(Method::GET, &format!("summary/employees/{employee_id}"))?;
        if let Some(week) = week {
            request = request.query(&[("week", week.format(WIRE_DATE_FORMAT).to_string())]);
        }
        decode(request.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> ClientResult<T> {
    let res = check(res).await?;
    Ok(res.json::<T>().await?)
}

async fn check(res: Response) -> ClientResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(classify(status, message))
}

fn classify(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(message),
        _ => ClientError::Server(message),
    }
}
