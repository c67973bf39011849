use axum::{
    Form, debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::{
    AppError, AppResult, matching,
    model::Role,
    notify::Notifier,
    store::Store,
};

#[derive(Deserialize)]
pub struct SelectInterestForm {
    email: String,
    interest: String,
}

#[debug_handler(state = crate::AppState)]
pub async fn select_interest(
    State(store): State<Store>,
    State(notifier): State<Notifier>,
    Form(SelectInterestForm { email, interest }): Form<SelectInterestForm>,
) -> AppResult<Response> {
    match matching::select_interest(&store, &email, &interest)? {
        Some(senior) => {
            info!(junior = %email, senior = %senior.email, %interest, "matched");
            notifier.notify_match(&senior, &email, &interest);
        }
        None => info!(junior = %email, %interest, "no senior covers this interest yet"),
    }

    Ok(Redirect::to(&format!("/dashboard?email={email}")).into_response())
}

#[derive(Deserialize)]
pub struct EditInterestsForm {
    email: String,
    /// Comma-separated.
    interests: String,
}

#[debug_handler(state = crate::AppState)]
pub async fn edit_interests(
    State(store): State<Store>,
    Form(EditInterestsForm { email, interests }): Form<EditInterestsForm>,
) -> AppResult<Response> {
    let interests: Vec<String> = interests
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();

    store.update_users(|users| {
        let user = users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| AppError::not_found(format!("no user registered as {email}")))?;
        if user.role != Role::Senior {
            return Err(AppError::validation("only seniors can edit their interest set"));
        }
        user.interests = interests;
        Ok(())
    })?;

    Ok(Redirect::to(&format!("/dashboard?email={email}")).into_response())
}
