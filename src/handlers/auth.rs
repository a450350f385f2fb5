use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use askama::Template;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::{self, get_current_user, CurrentUser},
    models::Role,
    utils::{password_strength, set_flash, take_flash, validate_email, Flash, PasswordStrength},
    AppState,
};

use super::render;

/// Bearer handed out by the mock login and signup.
pub const MOCK_TOKEN: &str = "fake-jwt-token";

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    flash: Option<Flash>,
    error: String,
    email: String,
}

#[derive(Template)]
#[template(path = "signup.html")]
struct SignupTemplate {
    flash: Option<Flash>,
    error: String,
    name: String,
    email: String,
    role: String,
    strength: String,
    strength_message: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SignupForm {
    name: String,
    email: String,
    password: String,
    confirm_password: String,
    role: String,
}

#[derive(Deserialize)]
pub struct StrengthRequest {
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
pub struct StrengthResponse {
    strength: &'static str,
}

pub async fn login_page(cookies: Cookies) -> Result<Html<String>, AppError> {
    render(&LoginTemplate {
        flash: take_flash(&cookies),
        error: String::new(),
        email: String::new(),
    })
}

pub async fn signup_page(cookies: Cookies) -> Result<Html<String>, AppError> {
    render(&SignupTemplate {
        flash: take_flash(&cookies),
        error: String::new(),
        name: String::new(),
        email: String::new(),
        role: Role::Employee.as_str().to_string(),
        strength: String::new(),
        strength_message: String::new(),
    })
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let login_error = |status: StatusCode, error: &str, email: &str| -> Result<Response, AppError> {
        let page = render(&LoginTemplate {
            flash: None,
            error: error.to_string(),
            email: email.to_string(),
        })?;
        Ok((status, page).into_response())
    };

    if form.email.is_empty() || form.password.is_empty() {
        return login_error(StatusCode::BAD_REQUEST, "Please fill in all fields", &form.email);
    }
    if !validate_email(&form.email) {
        return login_error(StatusCode::BAD_REQUEST, "Please enter a valid email", &form.email);
    }

    let Some(role) = state.authenticator.authenticate(&form.email, &form.password) else {
        log::info!("Failed login for {}", form.email);
        return login_error(StatusCode::UNAUTHORIZED, "Invalid email or password", &form.email);
    };

    let user = CurrentUser {
        id: "1".to_string(),
        name: form.email.split('@').next().unwrap_or_default().to_string(),
        email: form.email.clone(),
        role,
        token: MOCK_TOKEN.to_string(),
        session_id: Uuid::new_v4().to_string(),
    };
    middleware::login(&cookies, &user, &state.config.jwt_secret)?;

    Ok(Redirect::to(role.dashboard_path()).into_response())
}

pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let strength = password_strength(&form.password);
    let role = form.role.parse::<Role>().unwrap_or(Role::Employee);

    let error = if form.name.is_empty()
        || form.email.is_empty()
        || form.password.is_empty()
        || form.confirm_password.is_empty()
    {
        Some("Please fill in all fields")
    } else if !validate_email(&form.email) {
        Some("Please enter a valid email")
    } else if strength != Some(PasswordStrength::Strong) {
        Some("Password must be strong to continue")
    } else if form.password != form.confirm_password {
        Some("Passwords do not match")
    } else {
        None
    };

    if let Some(error) = error {
        let page = render(&SignupTemplate {
            flash: None,
            error: error.to_string(),
            name: form.name,
            email: form.email,
            role: role.as_str().to_string(),
            strength: strength.map(|s| s.as_str()).unwrap_or_default().to_string(),
            strength_message: strength.map(|s| s.message()).unwrap_or_default().to_string(),
        })?;
        return Ok((StatusCode::BAD_REQUEST, page).into_response());
    }

    let user = CurrentUser {
        id: Utc::now().timestamp_millis().to_string(),
        name: form.name,
        email: form.email,
        role,
        token: MOCK_TOKEN.to_string(),
        session_id: Uuid::new_v4().to_string(),
    };
    middleware::login(&cookies, &user, &state.config.jwt_secret)?;
    set_flash(&cookies, Flash::success("Signup successful!"));

    Ok(Redirect::to(role.dashboard_path()).into_response())
}

/// Live strength feedback for the signup form.
pub async fn check_password_strength(Json(request): Json<StrengthRequest>) -> Json<StrengthResponse> {
    Json(StrengthResponse {
        strength: password_strength(&request.password)
            .map(|s| s.as_str())
            .unwrap_or_default(),
    })
}

pub async fn logout(cookies: Cookies, State(state): State<AppState>) -> Redirect {
    let user = get_current_user(&cookies, &state);
    middleware::logout(&cookies, &state, user.as_ref()).await;
    Redirect::to("/login")
}
