use crate::{
    AppError, AppResult,
    model::{Role, User},
    store::Store,
};

/// Sets the junior's interest to the singleton `{interest}`, then scans the
/// user collection in insertion order for the first senior whose interest set
/// contains it. On a match the bidirectional assignment link is written and
/// the senior is returned so the caller can enqueue the notification email.
///
/// A junior holds at most one mentor: re-selecting drops the previous link
/// on both sides before the new scan. No match leaves the junior unlinked;
/// matching is re-attempted only on a fresh submission.
pub fn select_interest(
    store: &Store,
    junior_email: &str,
    interest: &str,
) -> AppResult<Option<User>> {
    let interest = interest.trim();
    if interest.is_empty() {
        return Err(AppError::validation("interest must not be empty"));
    }

    store.update_users(|users| {
        let junior_idx = users
            .iter()
            .position(|u| u.email == junior_email)
            .ok_or_else(|| AppError::not_found(format!("no user registered as {junior_email}")))?;
        if users[junior_idx].role != Role::Junior {
            return Err(AppError::validation("only juniors can select an interest"));
        }

        users[junior_idx].interests = vec![interest.to_owned()];

        let previous = std::mem::take(&mut users[junior_idx].assigned_mentors);
        for senior_email in previous {
            if let Some(senior) = users.iter_mut().find(|u| u.email == senior_email) {
                senior.assigned_juniors.retain(|j| j != junior_email);
            }
        }

        // first match by collection order wins; no ranking by load or rating
        let Some(senior_idx) = users
            .iter()
            .position(|u| u.role == Role::Senior && u.interests.iter().any(|i| i == interest))
        else {
            return Ok(None);
        };

        let senior_email = users[senior_idx].email.clone();
        users[senior_idx].assigned_juniors.push(junior_email.to_owned());
        users[junior_idx].assigned_mentors.push(senior_email);
        Ok(Some(users[senior_idx].clone()))
    })
}
