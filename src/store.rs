use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use parking_lot::RwLock;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    AppError, AppResult,
    model::{Feedback, Message, User},
};

const USERS_FILE: &str = "users.json";
const MESSAGES_FILE: &str = "messages.json";
const FEEDBACK_FILE: &str = "feedback.json";

/// The persistence collaborator: three in-memory collections, each mirrored
/// by one JSON-array file under the data directory and rewritten wholesale
/// on every mutation. Handlers receive a clone of the handle through
/// `AppState` instead of touching process-wide globals.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    dir: PathBuf,
    users: RwLock<Vec<User>>,
    messages: RwLock<Vec<Message>>,
    feedback: RwLock<Vec<Feedback>>,
}

impl Store {
    /// Loads the three collections. A missing file is an empty collection;
    /// a file that exists but does not parse is a startup error.
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Store> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;

        let users = load_collection(&dir.join(USERS_FILE))?;
        let messages = load_collection(&dir.join(MESSAGES_FILE))?;
        let feedback = load_collection(&dir.join(FEEDBACK_FILE))?;

        Ok(Store {
            inner: Arc::new(Inner {
                dir,
                users: RwLock::new(users),
                messages: RwLock::new(messages),
                feedback: RwLock::new(feedback),
            }),
        })
    }

    pub fn users(&self) -> Vec<User> {
        self.inner.users.read().clone()
    }

    pub fn find_user(&self, email: &str) -> Option<User> {
        self.inner.users.read().iter().find(|u| u.email == email).cloned()
    }

    pub fn insert_user(&self, user: User) -> AppResult<()> {
        let mut users = self.inner.users.write();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::validation(format!(
                "{} is already registered",
                user.email
            )));
        }
        users.push(user);
        persist(&self.inner.dir.join(USERS_FILE), users.as_slice())
    }

    /// Runs `f` over the user collection under the write lock, then rewrites
    /// the whole file once. `f` failing leaves the file untouched.
    pub fn update_users<T>(
        &self,
        f: impl FnOnce(&mut Vec<User>) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut users = self.inner.users.write();
        let out = f(&mut users)?;
        persist(&self.inner.dir.join(USERS_FILE), users.as_slice())?;
        Ok(out)
    }

    /// Full history for one room, in insertion order.
    pub fn messages_in_room(&self, room: &str) -> Vec<Message> {
        self.inner
            .messages
            .read()
            .iter()
            .filter(|m| m.room == room)
            .cloned()
            .collect()
    }

    pub fn append_message(&self, message: Message) -> AppResult<()> {
        let mut messages = self.inner.messages.write();
        messages.push(message);
        persist(&self.inner.dir.join(MESSAGES_FILE), messages.as_slice())
    }

    pub fn append_feedback(&self, feedback: Feedback) -> AppResult<()> {
        let mut records = self.inner.feedback.write();
        records.push(feedback);
        persist(&self.inner.dir.join(FEEDBACK_FILE), records.as_slice())
    }
}

fn load_collection<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .with_context(|| format!("corrupted collection file {}", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

/// Whole-file rewrite through a temp sibling, so a crash mid-write never
/// truncates the collection.
fn persist<T: Serialize>(path: &Path, records: &[T]) -> AppResult<()> {
    let tmp = path.with_extension("tmp");
    let file = fs::File::create(&tmp)?;
    serde_json::to_writer_pretty(file, records)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("mentorlink-store-{}", uuid::Uuid::now_v7()))
    }

    fn user(email: &str, role: Role) -> User {
        User {
            name: email.split('@').next().unwrap().to_owned(),
            email: email.to_owned(),
            password_hash: String::new(),
            role,
            interests: Vec::new(),
            assigned_mentors: Vec::new(),
            assigned_juniors: Vec::new(),
        }
    }

    #[test]
    fn missing_files_load_as_empty_collections() {
        let store = Store::open(temp_dir()).unwrap();
        assert!(store.users().is_empty());
        assert!(store.messages_in_room("a@x-b@x").is_empty());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = Store::open(temp_dir()).unwrap();
        store.insert_user(user("a@srec.ac.in", Role::Junior)).unwrap();
        let err = store.insert_user(user("a@srec.ac.in", Role::Senior)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.users().len(), 1);
    }

    #[test]
    fn collections_survive_reopen() {
        let dir = temp_dir();
        {
            let store = Store::open(&dir).unwrap();
            store.insert_user(user("a@srec.ac.in", Role::Junior)).unwrap();
            store
                .append_message(Message::new(
                    "a@x-b@x".to_owned(),
                    "a@x".to_owned(),
                    "hi".to_owned(),
                ))
                .unwrap();
        }
        let store = Store::open(&dir).unwrap();
        assert!(store.find_user("a@srec.ac.in").is_some());
        assert_eq!(store.messages_in_room("a@x-b@x").len(), 1);
    }

    #[test]
    fn corrupted_file_fails_open() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(USERS_FILE), b"not json").unwrap();
        assert!(Store::open(&dir).is_err());
    }

    #[test]
    fn history_is_scoped_to_the_room() {
        let store = Store::open(temp_dir()).unwrap();
        store
            .append_message(Message::new("a@x-b@x".to_owned(), "a@x".to_owned(), "hi".to_owned()))
            .unwrap();
        store
            .append_message(Message::new("c@x-d@x".to_owned(), "c@x".to_owned(), "yo".to_owned()))
            .unwrap();

        assert_eq!(store.messages_in_room("a@x-b@x").len(), 1);
        assert_eq!(store.messages_in_room("c@x-d@x").len(), 1);
        // reading twice replays the same history
        assert_eq!(store.messages_in_room("a@x-b@x").len(), 1);
    }

    #[test]
    fn feedback_appends() {
        let dir = temp_dir();
        let store = Store::open(&dir).unwrap();
        store
            .append_feedback(Feedback {
                junior_email: "a@srec.ac.in".to_owned(),
                senior_email: "b@srec.ac.in".to_owned(),
                rating: 5,
                comments: "great mentor".to_owned(),
                submitted_at: 0,
            })
            .unwrap();
        let raw = fs::read_to_string(dir.join(FEEDBACK_FILE)).unwrap();
        assert!(raw.contains("great mentor"));
    }
}
