use axum::{
    debug_handler,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message as WsFrame, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::warn;

use crate::{
    AppError, AppResult,
    model::Message,
    session::USER_EMAIL,
    store::Store,
};

use super::relay::{ChatRelay, room_id};

#[derive(Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum ClientEvent {
    JoinRoom { junior: String, senior: String },
    ChatMessage { text: String },
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum ServerEvent {
    LoadMessages { messages: Vec<Message> },
    ChatMessage { message: Message },
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn chat_ws(
    State(store): State<Store>,
    State(relay): State<ChatRelay>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let Some(user_email) = session.get::<String>(USER_EMAIL).await? else {
        return Err(AppError::unauthorized("log in before joining a chat room"));
    };
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, store, relay, user_email)))
}

/// Connection lifecycle: Unjoined until the first frame, which must be a
/// `joinRoom`; then InRoom until the peer hangs up. There is no resume: a
/// reconnecting client rejoins from scratch and gets the full history again.
async fn handle_socket(mut socket: WebSocket, store: Store, relay: ChatRelay, user_email: String) {
    let Some(Ok(frame)) = socket.recv().await else {
        return;
    };
    let Ok(ClientEvent::JoinRoom { junior, senior }) = serde_json::from_slice(&frame.into_data())
    else {
        // anything but joinRoom while Unjoined closes the connection
        return;
    };

    let room = match authorize_join(&store, &user_email, &junior, &senior) {
        Ok(room) => room,
        Err(e) => {
            warn!(%user_email, "rejected room join: {e}");
            return;
        }
    };

    // subscribe before replaying so nothing sent in between is missed
    let mut rx = relay.subscribe(&room);

    let history = ServerEvent::LoadMessages { messages: store.messages_in_room(&room) };
    let Ok(history) = serde_json::to_string(&history) else {
        return;
    };

    let (mut sender, mut receiver) = socket.split();
    if sender.send(history.into()).await.is_err() {
        return;
    }

    let forward_task = tokio::spawn(async move {
        while let Ok(message) = rx.recv().await {
            let Ok(frame) = serde_json::to_string(&ServerEvent::ChatMessage { message }) else {
                continue;
            };
            if sender.send(frame.into()).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = receiver.next().await {
        let Ok(ClientEvent::ChatMessage { text }) = serde_json::from_slice(&frame.into_data())
        else {
            continue;
        };

        let message = Message::new(room.clone(), user_email.clone(), text);
        // persist first, then fan out; the sender hears its own message back
        if let Err(e) = store.append_message(message.clone()) {
            warn!(%room, "failed to persist chat message: {e}");
            continue;
        }
        relay.publish(&room, message);
    }

    forward_task.abort();
}

/// The session user must be one of the pair, both must exist, and the pair
/// must hold an assignment link. Checked before any history leaves the
/// server.
fn authorize_join(
    store: &Store,
    user_email: &str,
    junior: &str,
    senior: &str,
) -> AppResult<String> {
    if user_email != junior && user_email != senior {
        return Err(AppError::forbidden("not a participant of this room"));
    }

    let junior_user = store
        .find_user(junior)
        .ok_or_else(|| AppError::not_found(format!("no user registered as {junior}")))?;
    store
        .find_user(senior)
        .ok_or_else(|| AppError::not_found(format!("no user registered as {senior}")))?;

    if !junior_user.assigned_mentors.iter().any(|m| m == senior) {
        return Err(AppError::forbidden("no assignment link between these users"));
    }

    Ok(room_id(junior, senior))
}
