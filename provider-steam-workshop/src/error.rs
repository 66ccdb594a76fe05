//! Error types for the Steam Workshop provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Steam Workshop provider errors
#[derive(Error, Debug)]
pub enum SteamWorkshopError {
    /// Non-2xx, non-redirect response
    #[error("Steam request to {endpoint} failed (status {status}): {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected schema
    #[error("Failed to parse {endpoint} response: {reason}")]
    ParseError { endpoint: String, reason: String },

    /// The endpoint redirected where a body was required
    #[error("{endpoint} redirected instead of returning a body")]
    Redirected { endpoint: String },

    /// Bridge error (network failures from the HTTP client)
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Steam Workshop operations
pub type Result<T> = std::result::Result<T, SteamWorkshopError>;

impl From<SteamWorkshopError> for BridgeError {
    fn from(error: SteamWorkshopError) -> Self {
        match error {
            SteamWorkshopError::HttpStatus { status, body, .. } => BridgeError::Transport {
                status: Some(status),
                body,
            },
            SteamWorkshopError::ParseError { endpoint, reason } => {
                BridgeError::MalformedResponse { endpoint, reason }
            }
            SteamWorkshopError::Redirected { endpoint } => BridgeError::MalformedResponse {
                endpoint,
                reason: "redirected with an empty body".to_string(),
            },
            SteamWorkshopError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SteamWorkshopError::HttpStatus {
            endpoint: "removechild".to_string(),
            status: 500,
            body: "Internal".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Steam request to removechild failed (status 500): Internal"
        );
    }

    #[test]
    fn test_error_conversion() {
        let error = SteamWorkshopError::HttpStatus {
            endpoint: "addchild".to_string(),
            status: 403,
            body: "denied".to_string(),
        };
        let bridge_error: BridgeError = error.into();
        assert!(matches!(
            bridge_error,
            BridgeError::Transport {
                status: Some(403),
                ..
            }
        ));

        let error = SteamWorkshopError::Redirected {
            endpoint: "GetCollectionDetails".to_string(),
        };
        let bridge_error: BridgeError = error.into();
        assert!(matches!(bridge_error, BridgeError::MalformedResponse { .. }));
    }

    #[test]
    fn test_network_error_passes_through() {
        let error = SteamWorkshopError::from(BridgeError::network("reset"));
        let bridge_error: BridgeError = error.into();
        assert!(matches!(
            bridge_error,
            BridgeError::Transport { status: None, .. }
        ));
    }
}
