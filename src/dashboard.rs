use axum::{
    debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{AppError, AppResult, include_res, store::Store};

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub email: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub async fn dashboard(
    State(store): State<Store>,
    Query(DashboardQuery { email }): Query<DashboardQuery>,
) -> AppResult<Response> {
    let Some(email) = email else {
        return Err(AppError::validation("Email required to login."));
    };
    let Some(user) = store.find_user(&email) else {
        return Err(AppError::not_found(format!("no user registered as {email}")));
    };

    let mut user_items = String::new();
    for other in store.users() {
        if other.email == user.email {
            continue;
        }
        user_items += &include_res!(str, "/pages/user_item.html")
            .replace("{name}", &other.name)
            .replace("{email}", &other.email)
            .replace("{role}", &other.role.to_string())
            .replace("{interests}", &other.interests.join(", "));
    }

    Ok(Html(
        include_res!(str, "/pages/dashboard.html")
            .replace("{name}", &user.name)
            .replace("{email}", &user.email)
            .replace("{role}", &user.role.to_string())
            .replace("{interests}", &user.interests.join(", "))
            .replace("{mentors}", &user.assigned_mentors.join(", "))
            .replace("{juniors}", &user.assigned_juniors.join(", "))
            .replace("{user_items}", &user_items),
    )
    .into_response())
}
