//! End-to-end flows over the store, matching engine, relay, and mail queue.

use std::time::Duration;

use lettre::transport::stub::AsyncStubTransport;
use mentorlink::{
    auth::hash_password,
    config::Config,
    matching,
    model::{Message, Role, User},
    notify::Notifier,
    rooms::{ChatRelay, room_id},
    store::Store,
};

fn temp_store() -> Store {
    let dir = std::env::temp_dir().join(format!("mentorlink-flow-{}", uuid::Uuid::now_v7()));
    Store::open(dir).unwrap()
}

fn register(store: &Store, name: &str, email: &str, role: Role, interests: &[&str]) {
    store
        .insert_user(User {
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash: hash_password("hunter2hunter2").unwrap(),
            role,
            interests: interests.iter().map(|s| (*s).to_owned()).collect(),
            assigned_mentors: Vec::new(),
            assigned_juniors: Vec::new(),
        })
        .unwrap();
}

#[test]
fn junior_is_matched_to_the_preregistered_senior() {
    let store = temp_store();
    register(&store, "b", "b@srec.ac.in", Role::Senior, &["ml", "ai"]);
    register(&store, "a", "a@srec.ac.in", Role::Junior, &[]);

    let senior = matching::select_interest(&store, "a@srec.ac.in", "ml")
        .unwrap()
        .expect("senior with ml should match");
    assert_eq!(senior.email, "b@srec.ac.in");

    let junior = store.find_user("a@srec.ac.in").unwrap();
    assert_eq!(junior.assigned_mentors, vec!["b@srec.ac.in"]);
}

#[test]
fn unmatched_selection_creates_no_link() {
    let store = temp_store();
    register(&store, "a", "a@srec.ac.in", Role::Junior, &[]);

    let matched = matching::select_interest(&store, "a@srec.ac.in", "quantum").unwrap();
    assert!(matched.is_none());
    assert!(store.find_user("a@srec.ac.in").unwrap().assigned_mentors.is_empty());
}

#[tokio::test]
async fn one_send_reaches_both_clients_and_persists_once() {
    let store = temp_store();
    let relay = ChatRelay::new();
    let room = room_id("a@srec.ac.in", "b@srec.ac.in");

    // two clients joined to the same room
    let mut junior_rx = relay.subscribe(&room);
    let mut senior_rx = relay.subscribe(&room);

    // what the ws handler does per inbound frame: persist, then fan out
    let message = Message::new(room.clone(), "a@srec.ac.in".to_owned(), "hi".to_owned());
    store.append_message(message.clone()).unwrap();
    relay.publish(&room, message);

    assert_eq!(junior_rx.recv().await.unwrap().text, "hi");
    assert_eq!(senior_rx.recv().await.unwrap().text, "hi");

    // joining again replays exactly what was sent
    assert_eq!(store.messages_in_room(&room).len(), 1);
    assert_eq!(store.messages_in_room(&room).len(), 1);
}

#[tokio::test]
async fn match_notification_goes_through_the_mail_queue() {
    let store = temp_store();
    register(&store, "b", "b@srec.ac.in", Role::Senior, &["ml"]);
    register(&store, "a", "a@srec.ac.in", Role::Junior, &[]);

    let transport = AsyncStubTransport::new_ok();
    let notifier = Notifier::spawn(transport.clone(), &Config::default());

    let senior = matching::select_interest(&store, "a@srec.ac.in", "ml")
        .unwrap()
        .unwrap();
    notifier.notify_match(&senior, "a@srec.ac.in", "ml");

    // the worker consumes the queue asynchronously
    for _ in 0..100 {
        if transport.messages().await.len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let messages = transport.messages().await;
    assert_eq!(messages.len(), 1);
    let (envelope, body) = &messages[0];
    assert_eq!(envelope.to()[0].to_string(), "b@srec.ac.in");
    assert!(body.contains("your domain (ml)"));
}
