use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{id_from_number_or_string, null_as_default, optional_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Travel,
    Meals,
    Equipment,
    Software,
    Office,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Travel,
        Category::Meals,
        Category::Equipment,
        Category::Software,
        Category::Office,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Travel => "travel",
            Category::Meals => "meals",
            Category::Equipment => "equipment",
            Category::Software => "software",
            Category::Office => "office",
            Category::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Travel => "Travel",
            Category::Meals => "Meals & Entertainment",
            Category::Equipment => "Equipment",
            Category::Software => "Software",
            Category::Office => "Office Supplies",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaidBy {
    #[default]
    Me,
    Other,
}

impl PaidBy {
    pub fn as_str(self) -> &'static str {
        match self {
            PaidBy::Me => "me",
            PaidBy::Other => "other",
        }
    }
}

impl FromStr for PaidBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "me" => Ok(PaidBy::Me),
            "other" => Ok(PaidBy::Other),
            other => Err(format!("unknown payer: {}", other)),
        }
    }
}

/// Who submitted an expense. Some endpoints nest the user, others send
/// only its primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpenseOwner {
    Named {
        #[serde(default)]
        name: Option<String>,
    },
    Other(serde_json::Value),
}

impl ExpenseOwner {
    pub fn name(&self) -> Option<&str> {
        match self {
            ExpenseOwner::Named { name } => name.as_deref().filter(|n| !n.is_empty()),
            ExpenseOwner::Other(_) => None,
        }
    }
}

/// An expense as the backend returns it. Everything except the id is
/// optional because the backend's serializers disagree on shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub employee_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expense_date: Option<String>,
    #[serde(default)]
    pub paid_by: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: Option<ExpenseOwner>,
}

/// Badge style for an expense status. Unknown or missing statuses render
/// with the pending style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub css: &'static str,
}

impl StatusBadge {
    pub fn from_status(status: Option<&str>) -> Self {
        let css = match status.map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("approved") => "badge badge-approved",
            Some("rejected") => "badge badge-rejected",
            _ => "badge badge-pending",
        };
        let label = match status.filter(|s| !s.is_empty()) {
            Some(s) => capitalize(s),
            None => "Pending".to_string(),
        };
        Self { label, css }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Row view of an expense for the dashboards.
#[derive(Debug, Clone)]
pub struct ExpenseDisplay {
    pub id: String,
    pub category: String,
    pub description: String,
    pub employee: String,
    pub amount: String,
    pub date: String,
    pub status: String,
    pub badge: StatusBadge,
}

impl From<&Expense> for ExpenseDisplay {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.clone(),
            category: expense.category.clone(),
            description: expense.description.clone().unwrap_or_default(),
            employee: expense
                .user
                .as_ref()
                .and_then(ExpenseOwner::name)
                .unwrap_or("Unknown")
                .to_string(),
            amount: expense.amount.to_string(),
            date: expense
                .created_at
                .as_deref()
                .map(display_date)
                .unwrap_or_default(),
            status: expense.status.clone().unwrap_or_default(),
            badge: StatusBadge::from_status(expense.status.as_deref()),
        }
    }
}

fn display_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.date().format("%Y-%m-%d").to_string();
    }
    raw.chars().take(10).collect()
}

/// The raw fields of the submission form, kept as typed so the form can be
/// re-rendered after a validation error.
#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub amount: String,
    pub category: String,
    pub description: String,
    pub expense_date: String,
    pub paid_by: String,
    pub remarks: String,
}

#[derive(Debug, Clone)]
pub struct Receipt {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// A validated expense ready to be sent to the backend.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: Decimal,
    pub category: Category,
    pub description: String,
    pub expense_date: NaiveDate,
    pub paid_by: PaidBy,
    pub remarks: String,
    pub receipt: Option<Receipt>,
}

impl NewExpense {
    pub fn from_form(form: &ExpenseForm, receipt: Option<Receipt>) -> Result<Self, String> {
        let amount = form.amount.trim();
        let category = form.category.trim();
        let expense_date = form.expense_date.trim();

        if amount.is_empty() || category.is_empty() || expense_date.is_empty() {
            return Err("Amount, category and date are required".to_string());
        }

        let amount = Decimal::from_str(amount).map_err(|_| "Amount must be a number".to_string())?;
        let category = category
            .parse::<Category>()
            .map_err(|_| "Please select a valid category".to_string())?;
        let expense_date = NaiveDate::parse_from_str(expense_date, "%Y-%m-%d")
            .map_err(|_| "Expense date must be in YYYY-MM-DD format".to_string())?;
        let paid_by = form
            .paid_by
            .trim()
            .parse::<PaidBy>()
            .map_err(|_| "Paid by must be me or other".to_string())?;

        Ok(Self {
            amount,
            category,
            description: form.description.clone(),
            expense_date,
            paid_by,
            remarks: form.remarks.clone(),
            receipt,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseAction {
    Approve,
    Reject,
}

impl ExpenseAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseAction::Approve => "approve",
            ExpenseAction::Reject => "reject",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            ExpenseAction::Approve => "approved",
            ExpenseAction::Reject => "rejected",
        }
    }
}

impl FromStr for ExpenseAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ExpenseAction::Approve),
            "reject" => Ok(ExpenseAction::Reject),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}
