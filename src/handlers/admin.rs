use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use askama::Template;
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    middleware::{bearer_for, require_role, CurrentUser},
    models::{ApprovalRule, ApprovalRuleDraft, Role, User, UserOption},
    utils::{take_flash, Flash},
    AppState,
};

use super::{render, session_expired};

struct SelectOption {
    id: String,
    label: String,
    selected: bool,
}

struct ApproverRow {
    index: usize,
    number: usize,
    required: bool,
    options: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    flash: Option<Flash>,
    title: String,
    user_name: String,
    rule: ApprovalRule,
    managers: Vec<SelectOption>,
    approvers: Vec<ApproverRow>,
    approver_count: usize,
}

fn options(users: &[UserOption], selected: &str) -> Vec<SelectOption> {
    users
        .iter()
        .map(|u| SelectOption {
            id: u.id.clone(),
            label: u.label.clone(),
            selected: u.id == selected,
        })
        .collect()
}

fn admin_page(user: &CurrentUser, users: &[User], rule: ApprovalRule, flash: Option<Flash>) -> AdminTemplate {
    let managers: Vec<UserOption> = users.iter().filter(|u| u.is_manager()).map(UserOption::from).collect();
    let everyone: Vec<UserOption> = users.iter().map(UserOption::from).collect();

    let approvers = rule
        .approvers
        .iter()
        .enumerate()
        .map(|(index, a)| ApproverRow {
            index,
            number: index + 1,
            required: a.required,
            options: options(&everyone, &a.user),
        })
        .collect();

    AdminTemplate {
        flash,
        title: "Admin View".to_string(),
        user_name: user.name.clone(),
        managers: options(&managers, &rule.manager),
        approvers,
        approver_count: rule.approvers.len(),
        rule,
    }
}

enum Directory {
    Loaded(Vec<User>),
    Failed,
    Expired,
}

async fn load_users(state: &AppState, user: &CurrentUser) -> Directory {
    match state.backend.list_users(bearer_for(&state.config, user)).await {
        Ok(users) => Directory::Loaded(users),
        Err(e) if e.is_unauthorized() => Directory::Expired,
        Err(e) => {
            log::error!("Failed to fetch users: {}", e);
            Directory::Failed
        }
    }
}

async fn render_admin(
    state: &AppState,
    cookies: &Cookies,
    user: &CurrentUser,
    rule: ApprovalRule,
    flash: Option<Flash>,
    status: StatusCode,
) -> Result<Response, AppError> {
    let mut flash = flash.or_else(|| take_flash(cookies));
    let users = match load_users(state, user).await {
        Directory::Loaded(users) => users,
        Directory::Expired => return Ok(session_expired(cookies, state, user).await),
        Directory::Failed => {
            flash = flash.or_else(|| Some(Flash::error("Could not load users")));
            Vec::new()
        }
    };

    let page = render(&admin_page(user, &users, rule, flash))?;
    Ok((status, page).into_response())
}

pub async fn view(cookies: Cookies, State(state): State<AppState>) -> Result<Response, AppError> {
    let user = match require_role(&cookies, &state, Role::Admin) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    render_admin(&state, &cookies, &user, ApprovalRule::default(), None, StatusCode::OK).await
}

/// Handles both list edits (add/remove approver rows) and the final save.
pub async fn submit(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let user = match require_role(&cookies, &state, Role::Admin) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let mut draft = ApprovalRuleDraft::from_pairs(&pairs);
    if draft.apply() {
        return render_admin(&state, &cookies, &user, draft.rule, None, StatusCode::OK).await;
    }

    let rule = draft.rule;
    if rule.username.trim().is_empty() {
        let flash = Some(Flash::error("Enter a username"));
        return render_admin(&state, &cookies, &user, rule, flash, StatusCode::BAD_REQUEST).await;
    }

    let flash = match state
        .backend
        .create_approval_rule(bearer_for(&state.config, &user), &rule)
        .await
    {
        Ok(()) => Flash::success("Approval rule saved successfully"),
        Err(e) if e.is_unauthorized() => return Ok(session_expired(&cookies, &state, &user).await),
        Err(e) => {
            log::error!("Failed to save approval rule: {}", e);
            Flash::error("Failed to save rule")
        }
    };

    render_admin(&state, &cookies, &user, rule, Some(flash), StatusCode::OK).await
}
