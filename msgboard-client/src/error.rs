#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("request failed with status {0}")]
    Transport(u16),

    #[error("server reported an error: {0}")]
    Application(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Failure of a profile lookup; same taxonomy as page fetches
pub type LookupError = FetchError;

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> FetchError {
        match e.status() {
            Some(s) => FetchError::Transport(s.as_u16()),
            None => FetchError::Network(e.to_string()),
        }
    }
}
