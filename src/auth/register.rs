use axum::{
    Form, debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::{
    AppError, AppResult,
    config::Config,
    include_res,
    model::{Role, User},
    store::Store,
};

use super::password::hash_password;

#[derive(Deserialize)]
pub(crate) struct RegisterForm {
    name: String,
    email: String,
    password: String,
    role: Role,
    #[serde(default)]
    interests: String,
}

#[debug_handler]
pub(crate) async fn register_page() -> impl IntoResponse {
    Html(include_res!(str, "/pages/register.html"))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register(
    State(store): State<Store>,
    State(config): State<Config>,
    Form(RegisterForm { name, email, password, role, interests }): Form<RegisterForm>,
) -> AppResult<Response> {
    let email = email.trim().to_lowercase();
    if !email.ends_with(&format!("@{}", config.allowed_email_domain)) {
        return Err(AppError::validation(format!(
            "Only @{} accounts can register.",
            config.allowed_email_domain
        )));
    }
    if password.len() < 8 {
        return Err(AppError::validation("Password must be at least 8 characters."));
    }

    let interests: Vec<String> = interests
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();

    store.insert_user(User {
        name: name.trim().to_owned(),
        email: email.clone(),
        password_hash: hash_password(&password)?,
        role,
        interests,
        assigned_mentors: Vec::new(),
        assigned_juniors: Vec::new(),
    })?;

    info!(%email, %role, "registered user");
    Ok(Redirect::to("/login").into_response())
}
