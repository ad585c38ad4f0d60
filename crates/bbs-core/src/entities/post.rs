use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::enums::PostStatus;

/// A submission the caller wants made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAttempt {
    pub board: Board,
    /// Numeric key of the thread to reply to; `None` starts a new thread.
    pub thread_key: Option<String>,
    pub author: String,
    pub contact: String,
    pub body: String,
    /// Required for a new thread, ignored for a reply.
    pub subject: Option<String>,
}

impl PostAttempt {
    #[must_use]
    pub fn reply(board: Board, thread_key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            board,
            thread_key: Some(thread_key.into()),
            author: String::new(),
            contact: String::new(),
            body: body.into(),
            subject: None,
        }
    }

    #[must_use]
    pub fn new_thread(board: Board, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            board,
            thread_key: None,
            author: String::new(),
            contact: String::new(),
            body: body.into(),
            subject: Some(subject.into()),
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[must_use]
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    #[must_use]
    pub const fn is_new_thread(&self) -> bool {
        self.thread_key.is_none()
    }
}

/// Ordered form fields. Server-driven confirmation pages decide the names,
/// so this stays an opaque list rather than a struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Set `name`, replacing an existing value in place to keep its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// Definitive result of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOutcome {
    pub status: PostStatus,
    /// Raw diagnostic: page title or snippet, or the limiter's reason.
    pub detail: String,
    /// Hidden fields scraped from the last confirmation page.
    pub replay: FormFields,
    /// Network round-trips made (0 when short-circuited by the limiter).
    pub rounds: u32,
}
