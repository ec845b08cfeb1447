//! Dashboard read models computed from the current records.

use super::{
    ApiResult, AppState,
    extract::{ApiPath, ApiQuery},
};
use crate::{
    core::{
        employee::list_employees,
        expense::list_expenses,
        report::{self, DateWindow, EmployeeReport, ExpenseStat, Summary, SummaryOptions},
        transaction::{TransactionFilter, filter_transactions},
    },
    errors::Error,
};
use axum::{
    Json,
    extract::State,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `GET /summary` query.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct SummaryQuery {
    /// Overrides the configured length of the top lists
    pub top: Option<usize>,
}

/// `GET /summary/employees/{id}` query.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct EmployeeReportQuery {
    /// Any day of the week to report on; the whole history when absent
    pub week: Option<NaiveDate>,
}

pub(super) async fn dashboard(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> ApiResult<Json<Summary>> {
    let employees = list_employees(&state.db).await?;
    let expenses = list_expenses(&state.db).await?;
    let transactions = filter_transactions(&state.db, &TransactionFilter::default()).await?;

    let options = SummaryOptions {
        top_n: query.top.unwrap_or(state.config.report.top_n),
        offset: state.config.report.offset()?,
    };
    Ok(Json(Summary::build(
        &employees,
        &expenses,
        &transactions,
        &options,
    )))
}

pub(super) async fn expenses(State(state): State<AppState>) -> ApiResult<Json<Vec<ExpenseStat>>> {
    let expenses = list_expenses(&state.db).await?;
    let transactions = filter_transactions(&state.db, &TransactionFilter::default()).await?;
    Ok(Json(report::expense_stats(&transactions, &expenses)))
}

pub(super) async fn employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<EmployeeReportQuery>,
) -> ApiResult<Json<EmployeeReport>> {
    let employees = list_employees(&state.db).await?;
    let expenses = list_expenses(&state.db).await?;
    let transactions = filter_transactions(&state.db, &TransactionFilter::for_employee(&id)).await?;

    if transactions.is_empty() && !employees.iter().any(|e| e.id == id) {
        return Err(Error::EmployeeNotFound { id }.into());
    }

    let window = query.week.map(DateWindow::week_of);
    Ok(Json(report::employee_report(
        &id,
        &employees,
        &transactions,
        &expenses,
        window,
    )))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::{
        core::transaction::{TransactionPatch, update_transaction},
        test_utils::{
            create_dated_expense, create_test_employee, create_test_transaction, send, test_state,
        },
    };
    use axum::http::{Method, StatusCode};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_summary_partial_scenario() {
        let state = test_state().await;
        let an = create_test_employee(&state.db, "An").await.unwrap();

        let mut ids = Vec::new();
        for (day, amount) in [(12, 100), (13, 200), (14, 300)] {
            let date = NaiveDate::from_ymd_opt(2025, 5, day).unwrap();
            let expense = create_dated_expense(&state.db, "Ăn trưa", date).await.unwrap();
            let tx = create_test_transaction(&state.db, &expense.id, &an.id, amount)
                .await
                .unwrap();
            ids.push(tx.id);
        }
        for (id, received) in ids.iter().zip([100, 200]) {
            update_transaction(
                &state.db,
                id,
                TransactionPatch {
                    received_amount: Some(received),
                    ..TransactionPatch::default()
                },
            )
            .await
            .unwrap();
        }

        let (status, summary) = send(&state, Method::GET, "/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["totalAmount"], 600);
        assert_eq!(summary["totalReceived"], 300);
        assert_eq!(summary["totalDebt"], 300);
        assert_eq!(summary["employeeStats"][0]["status"], "partial");
        assert_eq!(summary["topDebtors"][0]["debt"], 300);

        let (_, limited) = send(&state, Method::GET, "/summary?top=0", None).await;
        assert!(limited["topCollectors"].as_array().unwrap().is_empty());

        let (_, stats) = send(&state, Method::GET, "/summary/expenses", None).await;
        assert_eq!(stats.as_array().unwrap().len(), 3);
        assert_eq!(stats[0]["total"], 300);

        let (status, report) = send(
            &state,
            Method::GET,
            &format!("/summary/employees/{}?week=2025-05-13", an.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["total"], 600);
        assert_eq!(report["unpaidCount"], 1);
        assert_eq!(report["lines"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_summary_and_unknown_employee() {
        let state = test_state().await;

        let (status, summary) = send(&state, Method::GET, "/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["totalAmount"], 0);
        assert!(summary["dailyTotals"].as_array().unwrap().is_empty());

        let (status, _) = send(&state, Method::GET, "/summary/employees/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
