use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The request never produced a usable response: a non-2xx/non-redirect
    /// status, or a network-level failure (`status` is `None`).
    #[error("Transport error (status {}): {body}", display_status(.status))]
    Transport { status: Option<u16>, body: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

impl BridgeError {
    /// Transport failure without an HTTP status (connection refused, timeout, abort).
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            body: reason.into(),
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        let error = BridgeError::Transport {
            status: Some(503),
            body: "unavailable".to_string(),
        };
        assert_eq!(error.to_string(), "Transport error (status 503): unavailable");

        let error = BridgeError::network("connection reset");
        assert_eq!(
            error.to_string(),
            "Transport error (status none): connection reset"
        );
    }
}
