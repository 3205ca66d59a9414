//! Authentication route handlers.
//!
//! Handles login, registration, logout, and the password-reset flow.
//! Outcomes are signalled back to the pages via query parameters, never by
//! echoing user input.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Query parameters carrying a reset token.
#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    pub token: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub authenticated: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub authenticated: bool,
    pub error: Option<String>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub authenticated: bool,
    pub success: bool,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub authenticated: bool,
    pub token: String,
    pub error: Option<String>,
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        authenticated: false,
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            // Rotate the session id on privilege change
            if session.cycle_id().await.is_err() {
                return Redirect::to("/auth/login?error=session").into_response();
            }

            let current = CurrentUser {
                id: user.id,
                email: user.email.clone(),
            };
            if set_current_user(&session, &current).await.is_err() {
                return Redirect::to("/auth/login?error=session").into_response();
            }

            set_sentry_user(&user.id, Some(user.email.as_ref()));
            Redirect::to("/").into_response()
        }
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "login failed");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "failed to clear session on logout");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        authenticated: false,
        error: query.error,
    }
}

/// Handle registration form submission.
///
/// A successful registration logs the new user straight in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/auth/register?error=password_mismatch").into_response();
    }

    match AuthService::new(state.pool())
        .register_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            if session.cycle_id().await.is_err() {
                return Redirect::to("/auth/login?error=session").into_response();
            }

            let current = CurrentUser {
                id: user.id,
                email: user.email.clone(),
            };
            if set_current_user(&session, &current).await.is_err() {
                return Redirect::to("/auth/login?error=session").into_response();
            }

            set_sentry_user(&user.id, Some(user.email.as_ref()));
            Redirect::to("/").into_response()
        }
        Err(AuthError::UserAlreadyExists) => {
            Redirect::to("/auth/register?error=email_taken").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/auth/register?error=password_too_short").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/register?error=invalid_email").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "registration failed");
            Redirect::to("/auth/register?error=failed").into_response()
        }
    }
}

// =============================================================================
// Password Reset
// =============================================================================

/// Display the forgot-password page.
pub async fn forgot_password_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ForgotPasswordTemplate {
        authenticated: false,
        success: query.success.is_some(),
    }
}

/// Handle a reset-link request.
///
/// Responds identically whether or not the email has an account, so the
/// form can't be used to probe for registered addresses.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    match AuthService::new(state.pool())
        .create_reset_token(&form.email)
        .await
    {
        Ok(Some((user, token))) => {
            let reset_url = format!(
                "{}/auth/reset-password?token={token}",
                state.config().base_url
            );

            if let Err(e) = state.mailer().send_password_reset(&user.email, &reset_url).await {
                tracing::error!(error = %e, "failed to send password reset email");
            }
        }
        Ok(None) => {
            tracing::debug!("password reset requested for unknown email");
        }
        Err(AuthError::InvalidEmail(_)) => {}
        Err(e) => {
            tracing::error!(error = %e, "failed to create password reset token");
        }
    }

    Redirect::to("/auth/forgot-password?success=1").into_response()
}

/// Display the reset-password form for a token.
pub async fn reset_password_page(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> Response {
    let Some(token) = query.token else {
        return Redirect::to("/auth/login?error=invalid_reset_link").into_response();
    };

    // Reject dead links up front instead of after the form is filled in.
    match AuthService::new(state.pool()).user_for_reset_token(&token).await {
        Ok(_) => ResetPasswordTemplate {
            authenticated: false,
            token,
            error: query.error,
        }
        .into_response(),
        Err(AuthError::InvalidResetToken) => {
            Redirect::to("/auth/login?error=invalid_reset_link").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to look up reset token");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}

/// Handle the new-password submission.
pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to(&format!(
            "/auth/reset-password?token={}&error=password_mismatch",
            form.token
        ))
        .into_response();
    }

    let auth = AuthService::new(state.pool());

    let user = match auth.user_for_reset_token(&form.token).await {
        Ok(user) => user,
        Err(AuthError::InvalidResetToken) => {
            return Redirect::to("/auth/login?error=invalid_reset_link").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to look up reset token");
            return Redirect::to("/auth/login?error=failed").into_response();
        }
    };

    match auth.reset_password(user.id, &form.password).await {
        Ok(()) => Redirect::to("/auth/login?success=password_reset").into_response(),
        Err(AuthError::WeakPassword(_)) => Redirect::to(&format!(
            "/auth/reset-password?token={}&error=password_too_short",
            form.token
        ))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to reset password");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}
