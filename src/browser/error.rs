use std::time::Duration;

/// Convenience alias for results of browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Failures surfaced by the browser capability
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrowserError {
    /// The browser process could not be started
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// Navigation itself failed (DNS, net error, target crashed)
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// A bounded wait expired
    #[error("{operation} timeout after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// A selector never matched, or matched nothing clickable
    #[error("Selector '{0}' not found")]
    SelectorNotFound(String),

    /// The instance or context is already gone
    #[error("Browser target closed: {0}")]
    Closed(String),

    /// Any other DevTools protocol failure
    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

impl BrowserError {
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Whether the error only says the target was already shut down.
    ///
    /// Matches closed targets and sessions and a lost connection; other
    /// protocol failures (a missing DOM node, say) are real errors.
    #[must_use]
    pub fn is_already_closed(&self) -> bool {
        match self {
            Self::Closed(_) => true,
            Self::Protocol(msg) => {
                mentions_any(msg, TARGET_GONE_MESSAGES) || mentions_any(msg, CONNECTION_LOST_MESSAGES)
            }
            _ => false,
        }
    }

    /// Whether the browser process or its CDP connection is gone, so no
    /// further command on this instance can succeed.
    #[must_use]
    pub fn is_connection_lost(&self) -> bool {
        match self {
            Self::Closed(_) => true,
            Self::Protocol(msg) => mentions_any(msg, CONNECTION_LOST_MESSAGES),
            _ => false,
        }
    }
}

/// Protocol messages saying one target or session is gone.
const TARGET_GONE_MESSAGES: &[&str] = &[
    "target closed",
    "session closed",
    "no target with given id",
    "session with given id not found",
];

/// Protocol messages saying the connection to the browser is gone.
const CONNECTION_LOST_MESSAGES: &[&str] = &[
    "channel closed",
    "connection closed",
    "closed connection",
    "receiver dropped",
    "received no response",
];

fn mentions_any(msg: &str, needles: &[&str]) -> bool {
    let msg = msg.to_lowercase();
    needles.iter().any(|needle| msg.contains(needle))
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        use chromiumoxide::error::CdpError;
        match err {
            CdpError::Timeout => Self::timeout("CDP request", Duration::ZERO),
            CdpError::NotFound => Self::SelectorNotFound("element".to_string()),
            lost @ (CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse) => {
                Self::Closed(format!("browser connection lost: {lost}"))
            }
            other => Self::Protocol(other.to_string()),
        }
    }
}
