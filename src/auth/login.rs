use axum::{
    Form, debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::{AppError, AppResult, include_res, session::USER_EMAIL, store::Store};

use super::password::verify_password;

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    email: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn login_page() -> impl IntoResponse {
    Html(include_res!(str, "/pages/login.html"))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(store): State<Store>,
    session: Session,
    Form(LoginForm { email, password }): Form<LoginForm>,
) -> AppResult<Response> {
    let email = email.trim().to_lowercase();

    // same answer for unknown email and bad password
    let Some(user) = store.find_user(&email) else {
        return Err(AppError::unauthorized("Invalid email or password."));
    };
    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::unauthorized("Invalid email or password."));
    }

    session.insert(USER_EMAIL, &email).await?;
    info!(%email, "user logged in");

    Ok(Redirect::to(&format!("/dashboard?email={email}")).into_response())
}
