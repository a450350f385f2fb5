use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::Multipart;
use askama::Template;
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    filters,
    middleware::{bearer_for, get_current_user, require_role, CurrentUser},
    models::{Category, ExpenseDisplay, ExpenseForm, NewExpense, Receipt, Role},
    ocr::{scan_receipt, OcrFill},
    utils::{set_flash, take_flash, Flash},
    AppState,
};

use super::{render, session_expired};

struct CategoryOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "employee.html")]
struct EmployeeTemplate {
    flash: Option<Flash>,
    title: String,
    user_name: String,
    error: String,
    form: ExpenseForm,
    categories: Vec<CategoryOption>,
    expenses: Vec<ExpenseDisplay>,
}

fn category_options(selected: &str) -> Vec<CategoryOption> {
    Category::ALL
        .into_iter()
        .map(|c| CategoryOption {
            value: c.as_str(),
            label: c.label(),
            selected: c.as_str() == selected,
        })
        .collect()
}

/// Outcome of loading the expense list for rendering.
enum Listing {
    Loaded(Vec<ExpenseDisplay>),
    Failed,
    Expired,
}

async fn load_my_expenses(state: &AppState, user: &CurrentUser) -> Listing {
    match state.backend.my_expenses(bearer_for(&state.config, user)).await {
        Ok(expenses) => Listing::Loaded(expenses.iter().map(ExpenseDisplay::from).collect()),
        Err(e) if e.is_unauthorized() => Listing::Expired,
        Err(e) => {
            log::error!("Failed to fetch expenses for {}: {}", user.email, e);
            Listing::Failed
        }
    }
}

async fn render_dashboard(
    state: &AppState,
    cookies: &Cookies,
    user: &CurrentUser,
    form: ExpenseForm,
    error: String,
    flash: Option<Flash>,
    status: StatusCode,
) -> Result<Response, AppError> {
    let mut flash = flash.or_else(|| take_flash(cookies));
    let expenses = match load_my_expenses(state, user).await {
        Listing::Loaded(rows) => rows,
        Listing::Expired => return Ok(session_expired(cookies, state, user).await),
        Listing::Failed => {
            flash = flash.or_else(|| Some(Flash::error("Could not load your expenses")));
            Vec::new()
        }
    };

    let page = render(&EmployeeTemplate {
        flash,
        title: "Employee Dashboard".to_string(),
        user_name: user.name.clone(),
        error,
        categories: category_options(&form.category),
        form,
        expenses,
    })?;
    Ok((status, page).into_response())
}

pub async fn dashboard(cookies: Cookies, State(state): State<AppState>) -> Result<Response, AppError> {
    let user = match require_role(&cookies, &state, Role::Employee) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let form = ExpenseForm {
        paid_by: "me".to_string(),
        ..Default::default()
    };
    render_dashboard(&state, &cookies, &user, form, String::new(), None, StatusCode::OK).await
}

pub async fn submit_expense(
    cookies: Cookies,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let user = match require_role(&cookies, &state, Role::Employee) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let (form, receipt) = parse_expense_multipart(multipart).await?;

    let expense = match NewExpense::from_form(&form, receipt) {
        Ok(expense) => expense,
        Err(error) => {
            return render_dashboard(&state, &cookies, &user, form, error, None, StatusCode::BAD_REQUEST)
                .await;
        }
    };

    match state
        .backend
        .create_expense(bearer_for(&state.config, &user), expense)
        .await
    {
        Ok(()) => {
            log::info!("{} submitted an expense", user.email);
            set_flash(&cookies, Flash::success("Expense submitted successfully!"));
            Ok(Redirect::to("/employee").into_response())
        }
        Err(e) if e.is_unauthorized() => Ok(session_expired(&cookies, &state, &user).await),
        Err(e) => {
            log::error!("Submit expense error: {}", e);
            let flash = Flash::error(e.user_message("Failed to submit expense"));
            render_dashboard(&state, &cookies, &user, form, String::new(), Some(flash), StatusCode::OK)
                .await
        }
    }
}

/// Fills the form from a receipt image. JSON in, JSON out; called from the
/// page when a file is picked.
pub async fn scan(
    cookies: Cookies,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrFill>, StatusCode> {
    let user = get_current_user(&cookies, &state).ok_or(StatusCode::UNAUTHORIZED)?;
    if user.role != Role::Employee {
        return Err(StatusCode::FORBIDDEN);
    }

    while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        if field.name() == Some("receipt") {
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            return Ok(Json(scan_receipt(&data, state.config.ocr_delay).await));
        }
    }

    Err(StatusCode::BAD_REQUEST)
}

async fn parse_expense_multipart(mut multipart: Multipart) -> Result<(ExpenseForm, Option<Receipt>), AppError> {
    let mut form = ExpenseForm::default();
    let mut receipt = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        if name == "receipt" {
            let file_name = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if let Some(file_name) = file_name.filter(|f| !f.is_empty()) {
                if !data.is_empty() {
                    receipt = Some(Receipt {
                        file_name,
                        content_type,
                        data: data.to_vec(),
                    });
                }
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            match name.as_str() {
                "amount" => form.amount = value,
                "category" => form.category = value,
                "description" => form.description = value,
                "expense_date" => form.expense_date = value,
                "paid_by" => form.paid_by = value,
                "remarks" => form.remarks = value,
                _ => (),
            }
        }
    }

    Ok((form, receipt))
}
