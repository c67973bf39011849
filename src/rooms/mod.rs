mod page;
mod relay;
mod ws;

pub use relay::{ChatRelay, room_id};

use axum::{Router, routing::get};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::chat_page))
        .route("/ws", get(ws::chat_ws))
}
