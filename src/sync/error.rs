use thiserror::Error;

/// Failure of a single round trip to the food service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// A required field was blank; nothing was sent.
    #[error("{0}")]
    Validation(String),
    /// The endpoint could not be reached or the body could not be read.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("{reason} ({status})")]
    Rejected { status: u16, reason: String },
    /// The server answered 2xx but the body was not what we expected.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn rejected(status: reqwest::StatusCode) -> Self {
        Self::Rejected {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown status").to_string(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(error_chain(&e))
    }
}

/// `e` followed by each of its causes, joined with `: `.
///
/// reqwest's own message stops at "error sending request"; the cause that says
/// what actually went wrong (refused, DNS, TLS) is further down the chain.
pub fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
