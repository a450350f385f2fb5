use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    filters,
    middleware::{bearer_for, require_role},
    models::{ExpenseAction, ExpenseDisplay, ReviewQueue, Role},
    utils::{set_flash, take_flash, Flash},
    AppState,
};

use super::{render, session_expired};

#[derive(Template)]
#[template(path = "manager.html")]
struct ManagerTemplate {
    flash: Option<Flash>,
    title: String,
    user_name: String,
    requests: Vec<ExpenseDisplay>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct QueueParams {
    refresh: Option<String>,
}

pub async fn dashboard(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(params): Query<QueueParams>,
) -> Result<Response, AppError> {
    let user = match require_role(&cookies, &state, Role::Manager) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let mut flash = take_flash(&cookies);
    let cached = if params.refresh.is_some() {
        None
    } else {
        state.sessions.queue(&user.session_id).await
    };

    let queue = match cached {
        Some(queue) => queue,
        None => match state
            .backend
            .pending_expenses(bearer_for(&state.config, &user))
            .await
        {
            Ok(requests) => {
                let queue = ReviewQueue::new(requests);
                state.sessions.put_queue(&user.session_id, queue.clone()).await;
                queue
            }
            Err(e) if e.is_unauthorized() => return Ok(session_expired(&cookies, &state, &user).await),
            Err(e) => {
                log::error!("Failed to fetch expense requests: {}", e);
                flash = Some(Flash::error("Could not load expense requests."));
                ReviewQueue::default()
            }
        },
    };

    let page = render(&ManagerTemplate {
        flash,
        title: "Manager Dashboard".to_string(),
        user_name: user.name.clone(),
        requests: queue.rows(),
    })?;
    Ok(page.into_response())
}

/// Approve or reject one request. On success the row is dropped from the
/// cached queue; the backend is not asked for the list again.
pub async fn act(
    cookies: Cookies,
    State(state): State<AppState>,
    Path((expense_id, action)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let user = match require_role(&cookies, &state, Role::Manager) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect.into_response()),
    };
    let action: ExpenseAction = action.parse().map_err(|_| AppError::NotFound)?;

    match state
        .backend
        .act_on_expense(bearer_for(&state.config, &user), &expense_id, action)
        .await
    {
        Ok(()) => {
            state.sessions.remove_from_queue(&user.session_id, &expense_id).await;
            set_flash(&cookies, Flash::success(format!("Request {}", action.past_tense())));
        }
        Err(e) if e.is_unauthorized() => return Ok(session_expired(&cookies, &state, &user).await),
        Err(e) => {
            log::error!("Failed to {} expense {}: {}", action.as_str(), expense_id, e);
            set_flash(&cookies, Flash::error(format!("Failed to {} request", action.as_str())));
        }
    }

    Ok(Redirect::to("/manager").into_response())
}
