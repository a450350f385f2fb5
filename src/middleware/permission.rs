use axum::response::Redirect;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::{
    models::Role,
    utils::{set_flash, verify_token, Claims, Flash},
    AppState,
};

use super::AUTH_COOKIE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
    pub session_id: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
            token: claims.token,
            session_id: claims.sid,
        }
    }
}

/// The logged-in user, if the session cookie is present and valid.
pub fn get_current_user(cookies: &Cookies, state: &AppState) -> Option<CurrentUser> {
    let token = cookies.get(AUTH_COOKIE)?.value().to_string();

    match verify_token(&token, &state.config.jwt_secret) {
        Ok(claims) => Some(CurrentUser::from(claims)),
        Err(e) => {
            log::debug!("Ignoring invalid session cookie: {}", e);
            None
        }
    }
}

/// Gate for the role dashboards: anonymous users and users of another role
/// are sent to the login page.
pub fn require_role(cookies: &Cookies, state: &AppState, role: Role) -> Result<CurrentUser, Redirect> {
    let user = get_current_user(cookies, state).ok_or_else(|| Redirect::to("/login"))?;

    if user.role != role {
        log::warn!("{} ({}) tried to open the {} dashboard", user.email, user.role, role);
        set_flash(cookies, Flash::error("You are not allowed to view that page"));
        return Err(Redirect::to("/login"));
    }

    Ok(user)
}
