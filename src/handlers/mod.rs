pub mod admin;
pub mod auth;
pub mod employee;
pub mod manager;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use askama::Template;
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    middleware::{get_current_user, logout, CurrentUser},
    utils::{set_flash, Flash},
    AppState,
};

/// Role router: logged-in users land on their dashboard, everyone else on
/// the login page.
pub async fn home(cookies: Cookies, State(state): State<AppState>) -> Redirect {
    match get_current_user(&cookies, &state) {
        Some(user) => Redirect::to(user.role.dashboard_path()),
        None => Redirect::to("/login"),
    }
}

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// The backend refused our bearer: drop the session and start over.
pub(crate) async fn session_expired(cookies: &Cookies, state: &AppState, user: &CurrentUser) -> Response {
    log::warn!("Backend returned 401 for {}, forcing logout", user.email);
    logout(cookies, state, Some(user)).await;
    set_flash(cookies, Flash::error("Session expired. Please log in again."));
    Redirect::to("/login").into_response()
}
