use std::fmt;

mod error;
pub use error::Error;

mod profile;
pub use profile::{ProfileError, ProfileImage, ProfileResponse};

pub type Time = chrono::NaiveDateTime;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Longest comment the server accepts, in characters
pub const MAX_COMMENT_LEN: usize = 500;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Opaque identity of a message author, as known by the profile API
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct AuthorId(pub String);

impl AuthorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AuthorId {
    fn from(s: &str) -> AuthorId {
        AuthorId(String::from(s))
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Message {
    #[serde(rename = "message_id")]
    pub id: MessageId,

    #[serde(rename = "google_plus_id")]
    pub author_id: AuthorId,

    pub comment: String,

    #[serde(rename = "created_date_time")]
    pub created_at: Time,
}

/// Envelope returned by `GET /api`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub messages: Vec<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessagesResponse {
    pub fn success(messages: Vec<Message>) -> MessagesResponse {
        MessagesResponse {
            status: String::from(STATUS_SUCCESS),
            messages,
            error: None,
        }
    }

    /// The message list, unless the server set the `error` field
    pub fn into_result(self) -> Result<Vec<Message>, String> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.messages),
        }
    }
}

/// Body of `POST /api`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewMessage {
    #[serde(rename = "google_plus_id")]
    pub author_id: AuthorId,

    pub comment: String,
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), Error> {
        if self.author_id.0.is_empty()
            || !self
                .author_id
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::InvalidAuthorId(self.author_id.0.clone()));
        }
        if self.comment.contains('\0') {
            return Err(Error::NullByteInString(self.comment.clone()));
        }
        if self.comment.trim().is_empty() {
            return Err(Error::EmptyComment);
        }
        let len = self.comment.chars().count();
        if len > MAX_COMMENT_LEN {
            return Err(Error::CommentTooLong(len));
        }
        Ok(())
    }
}

/// Envelope returned by `POST /api`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PostResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Display information about an author, as cached locally
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthorMetadata {
    pub author_id: AuthorId,
    pub display_name: String,
    pub avatar_url: String,
}
