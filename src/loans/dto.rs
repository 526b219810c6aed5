use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::loans::repo::{Loan, LoanStatus};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub status: LoanStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub request_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub approval_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub return_date: Option<OffsetDateTime>,
    pub fine: Option<i64>,
}

impl From<Loan> for LoanResponse {
    fn from(l: Loan) -> Self {
        Self {
            id: l.id,
            book_id: l.book_id,
            user_id: l.user_id,
            status: l.status,
            request_date: l.request_date,
            approval_date: l.approval_date,
            due_date: l.due_date,
            return_date: l.return_date,
            fine: l.fine,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLoanRequest {
    pub book_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnBookRequest {
    pub book_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ReturnBookResponse {
    pub status: LoanStatus,
    pub fine: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoanListQuery {
    pub status: Option<LoanStatus>,
}

#[derive(Debug, Serialize)]
pub struct PendingCountResponse {
    pub count: i64,
}
