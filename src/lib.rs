pub mod appresult;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod feedback;
pub mod interests;
pub mod matching;
pub mod model;
pub mod notify;
pub mod res;
pub mod rooms;
pub mod session;
pub mod store;

pub use appresult::{AppError, AppResult};

use axum::extract::FromRef;

use crate::{config::Config, notify::Notifier, rooms::ChatRelay, store::Store};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub relay: ChatRelay,
    pub notifier: Notifier,
}
