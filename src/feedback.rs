use axum::{
    Form, debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{AppError, AppResult, include_res, model::Feedback, store::Store};

#[derive(Deserialize)]
pub struct FeedbackPageQuery {
    senior: Option<String>,
    junior: Option<String>,
}

#[debug_handler]
pub async fn feedback_page(
    Query(FeedbackPageQuery { senior, junior }): Query<FeedbackPageQuery>,
) -> AppResult<Response> {
    let (Some(senior), Some(junior)) = (senior, junior) else {
        return Err(AppError::validation("Missing parameters."));
    };

    Ok(Html(
        include_res!(str, "/pages/feedback.html")
            .replace("{senior}", &senior)
            .replace("{junior}", &junior),
    )
    .into_response())
}

#[derive(Deserialize)]
pub struct SubmitFeedbackForm {
    senior_email: String,
    junior_email: String,
    rating: u8,
    #[serde(default)]
    comments: String,
}

#[debug_handler(state = crate::AppState)]
pub async fn submit_feedback(
    State(store): State<Store>,
    Form(SubmitFeedbackForm { senior_email, junior_email, rating, comments }): Form<SubmitFeedbackForm>,
) -> AppResult<Response> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::validation("rating must be between 1 and 5"));
    }

    store.append_feedback(Feedback {
        junior_email,
        senior_email,
        rating,
        comments,
        submitted_at: OffsetDateTime::now_utc().unix_timestamp(),
    })?;

    Ok("Feedback saved successfully".into_response())
}
