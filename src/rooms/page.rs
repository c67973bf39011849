use axum::{
    debug_handler,
    extract::Query,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{AppError, AppResult, include_res};

#[derive(Deserialize)]
pub(crate) struct ChatPageQuery {
    junior: Option<String>,
    senior: Option<String>,
}

#[debug_handler]
pub(crate) async fn chat_page(
    Query(ChatPageQuery { junior, senior }): Query<ChatPageQuery>,
) -> AppResult<Response> {
    let (Some(junior), Some(senior)) = (junior, senior) else {
        return Err(AppError::validation("Missing parameters."));
    };

    Ok(Html(
        include_res!(str, "/pages/chat.html")
            .replace("{junior}", &junior)
            .replace("{senior}", &senior),
    )
    .into_response())
}
