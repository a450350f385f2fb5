//! HTTP client for the expense backend.

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    multipart::{Form, Part},
    Response, StatusCode,
};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{ApprovalRule, Expense, ExpenseAction, NewExpense, User};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend rejected the bearer token")]
    Unauthorized,

    #[error("backend returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid bearer token")]
    InvalidToken,

    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// The backend's own error text when it sent one, `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn auth(bearer: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", bearer))
            .map_err(|_| ApiError::InvalidToken)?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    pub async fn list_users(&self, bearer: &str) -> Result<Vec<User>, ApiError> {
        let response = self
            .http
            .get(self.url("users/"))
            .headers(Self::auth(bearer)?)
            .send()
            .await?;
        decode(check(response).await?).await
    }

    pub async fn create_approval_rule(&self, bearer: &str, rule: &ApprovalRule) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("approval-rules/"))
            .headers(Self::auth(bearer)?)
            .json(rule)
            .send()
            .await?;
        check(response).await?;
        log::info!("Saved approval rule for {}", rule.username);
        Ok(())
    }

    pub async fn my_expenses(&self, bearer: &str) -> Result<Vec<Expense>, ApiError> {
        let response = self
            .http
            .get(self.url("expenses/my/"))
            .headers(Self::auth(bearer)?)
            .send()
            .await?;
        decode(check(response).await?).await
    }

    pub async fn create_expense(&self, bearer: &str, expense: NewExpense) -> Result<(), ApiError> {
        let mut form = Form::new()
            .text("amount", expense.amount.to_string())
            .text("category", expense.category.as_str())
            .text("description", expense.description)
            .text("expense_date", expense.expense_date.format("%Y-%m-%d").to_string())
            .text("paid_by", expense.paid_by.as_str())
            .text("remarks", expense.remarks);

        if let Some(receipt) = expense.receipt {
            let mut part = Part::bytes(receipt.data).file_name(receipt.file_name);
            if let Some(content_type) = receipt.content_type {
                part = part.mime_str(&content_type)?;
            }
            form = form.part("receipt", part);
        }

        let response = self
            .http
            .post(self.url("expenses/"))
            .headers(Self::auth(bearer)?)
            .multipart(form)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn pending_expenses(&self, bearer: &str) -> Result<Vec<Expense>, ApiError> {
        let response = self
            .http
            .get(self.url("expenses/pending/"))
            .headers(Self::auth(bearer)?)
            .send()
            .await?;
        decode(check(response).await?).await
    }

    pub async fn act_on_expense(
        &self,
        bearer: &str,
        expense_id: &str,
        action: ExpenseAction,
    ) -> Result<(), ApiError> {
        let path = format!("expenses/{}/{}/", urlencoding::encode(expense_id), action.as_str());
        let response = self
            .http
            .post(self.url(&path))
            .headers(Self::auth(bearer)?)
            .send()
            .await?;
        check(response).await?;
        log::info!("Expense {} {}", expense_id, action.past_tense());
        Ok(())
    }
}

/// Maps non-2xx responses to errors, pulling `error` or `detail` out of a
/// JSON body when there is one.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            ["error", "detail"]
                .iter()
                .find_map(|key| json.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_default();

    log::warn!("Backend answered {}: {}", status, body);
    Err(ApiError::Status { status, message })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
