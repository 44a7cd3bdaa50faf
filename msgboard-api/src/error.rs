use anyhow::{anyhow, Context};
use serde_json::json;

use crate::STATUS_ERROR;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Comment is empty")]
    EmptyComment,

    #[error("Comment is too long ({0} characters)")]
    CommentTooLong(usize),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Invalid author id {0:?}")]
    InvalidAuthorId(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::UNAUTHORIZED,
            Error::EmptyComment => StatusCode::BAD_REQUEST,
            Error::CommentTooLong(_) => StatusCode::BAD_REQUEST,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::InvalidAuthorId(_) => StatusCode::BAD_REQUEST,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// JSON body in the board's envelope format, with the human-readable
    /// message in the `error` field
    pub fn contents(&self) -> Vec<u8> {
        let error = self.to_string();
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "status": STATUS_ERROR,
                "error": error,
                "type": "unknown",
                "message": msg,
            }),
            Error::PermissionDenied => json!({
                "status": STATUS_ERROR,
                "error": error,
                "type": "permission-denied",
            }),
            Error::EmptyComment => json!({
                "status": STATUS_ERROR,
                "error": error,
                "type": "empty-comment",
            }),
            Error::CommentTooLong(len) => json!({
                "status": STATUS_ERROR,
                "error": error,
                "type": "comment-too-long",
                "length": len,
            }),
            Error::NullByteInString(s) => json!({
                "status": STATUS_ERROR,
                "error": error,
                "type": "null-byte",
                "string": s,
            }),
            Error::InvalidAuthorId(id) => json!({
                "status": STATUS_ERROR,
                "error": error,
                "type": "invalid-author-id",
                "author_id": id,
            }),
            Error::InvalidRequest(reason) => json!({
                "status": STATUS_ERROR,
                "error": error,
                "type": "invalid-request",
                "reason": reason,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let field = |name: &str| data.get(name).and_then(|v| v.as_str());
        Ok(
            match field("type").ok_or_else(|| anyhow!("error type is not a string"))? {
                "unknown" => Error::Unknown(String::from(field("message").unwrap_or(""))),
                "permission-denied" => Error::PermissionDenied,
                "empty-comment" => Error::EmptyComment,
                "comment-too-long" => Error::CommentTooLong(
                    data.get("length")
                        .and_then(|l| l.as_u64())
                        .and_then(|l| usize::try_from(l).ok())
                        .ok_or_else(|| anyhow!("error is a too-long comment without a length"))?,
                ),
                "null-byte" => Error::NullByteInString(String::from(field("string").ok_or_else(
                    || anyhow!("error is a null-byte-in-string without a string"),
                )?)),
                "invalid-author-id" => Error::InvalidAuthorId(String::from(
                    field("author_id")
                        .ok_or_else(|| anyhow!("error is an invalid author id without an id"))?,
                )),
                "invalid-request" => Error::InvalidRequest(String::from(
                    field("reason")
                        .ok_or_else(|| anyhow!("error is an invalid request without a reason"))?,
                )),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        bolero::check!()
            .with_type::<(u8, String, usize)>()
            .for_each(|(kind, s, len)| {
                let e = match kind % 7 {
                    0 => Error::Unknown(s.clone()),
                    1 => Error::PermissionDenied,
                    2 => Error::EmptyComment,
                    3 => Error::CommentTooLong(*len),
                    4 => Error::NullByteInString(s.clone()),
                    5 => Error::InvalidAuthorId(s.clone()),
                    _ => Error::InvalidRequest(s.clone()),
                };
                assert_eq!(Error::parse(&e.contents()).unwrap(), e);
            });
    }

    #[test]
    fn body_carries_error_field() {
        let body: serde_json::Value =
            serde_json::from_slice(&Error::PermissionDenied.contents()).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Permission denied");
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(Error::parse(br#"{"type": "nope"}"#).is_err());
        assert!(Error::parse(b"garbage").is_err());
    }
}
