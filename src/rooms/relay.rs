use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::model::Message;

/// Per-room channel capacity; a receiver that lags this far drops out.
const ROOM_BUFFER: usize = 64;

/// Deterministic room key: the two participant emails sorted
/// lexicographically, so both sides derive the same id regardless of who
/// joins first.
pub fn room_id(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}-{hi}")
}

/// Room-scoped fan-out. Every room gets its own broadcast channel, created
/// lazily on first subscribe; channels for different rooms never cross.
#[derive(Clone, Default)]
pub struct ChatRelay {
    rooms: Arc<Mutex<HashMap<String, broadcast::Sender<Message>>>>,
}

impl ChatRelay {
    pub fn new() -> ChatRelay {
        ChatRelay::default()
    }

    pub fn subscribe(&self, room: &str) -> broadcast::Receiver<Message> {
        let mut rooms = self.rooms.lock();
        rooms.retain(|_, tx| tx.receiver_count() > 0);
        rooms
            .entry(room.to_owned())
            .or_insert_with(|| broadcast::channel(ROOM_BUFFER).0)
            .subscribe()
    }

    /// Fans out to every current subscriber of the room, the sender's own
    /// connection included. An empty room is not an error.
    pub fn publish(&self, room: &str, message: Message) {
        if let Some(tx) = self.rooms.lock().get(room) {
            let _ = tx.send(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn msg(room: &str, text: &str) -> Message {
        Message::new(room.to_owned(), "a@srec.ac.in".to_owned(), text.to_owned())
    }

    #[test]
    fn room_id_is_commutative() {
        assert_eq!(room_id("a@x", "b@x"), room_id("b@x", "a@x"));
        assert_eq!(room_id("a@x", "b@x"), "a@x-b@x");
        assert_eq!(room_id("z@x", "a@x"), "a@x-z@x");
    }

    #[tokio::test]
    async fn all_room_subscribers_receive_including_sender() {
        let relay = ChatRelay::new();
        let room = room_id("a@x", "b@x");
        let mut rx_a = relay.subscribe(&room);
        let mut rx_b = relay.subscribe(&room);

        relay.publish(&room, msg(&room, "hi"));

        assert_eq!(rx_a.recv().await.unwrap().text, "hi");
        assert_eq!(rx_b.recv().await.unwrap().text, "hi");
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let relay = ChatRelay::new();
        let mut rx_one = relay.subscribe("a@x-b@x");
        let mut rx_other = relay.subscribe("c@x-d@x");

        relay.publish("a@x-b@x", msg("a@x-b@x", "hi"));

        assert_eq!(rx_one.recv().await.unwrap().text, "hi");
        assert!(matches!(rx_other.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn publishing_to_an_empty_room_is_a_no_op() {
        let relay = ChatRelay::new();
        relay.publish("a@x-b@x", msg("a@x-b@x", "hi"));
        // a later subscriber starts from an empty stream
        let mut rx = relay.subscribe("a@x-b@x");
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
