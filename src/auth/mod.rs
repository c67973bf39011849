mod login;
mod logout;
mod password;
mod register;

pub use password::{hash_password, verify_password};

use axum::{Router, routing::get};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register::register_page).post(register::register))
        .route("/login", get(login::login_page).post(login::login))
        .route("/logout", get(logout::logout))
}
