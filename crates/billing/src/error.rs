//! Billing error types

use thiserror::Error;

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, Error)]
pub enum BillingError {
    /// The request never reached the billing backend (DNS, connect,
    /// timeout, body read).
    #[error("billing request failed: {0}")]
    Http(String),

    /// The billing backend answered with a non-success status. `detail`
    /// carries the server-provided error detail when the body had one.
    #[error("billing API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// The response body did not match the expected shape.
    #[error("invalid billing response: {0}")]
    InvalidResponse(String),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl BillingError {
    /// The message to surface to the viewer: the server detail when we
    /// have one, a generic failure phrase otherwise. Never a transport
    /// internals dump.
    pub fn user_message(&self) -> String {
        match self {
            BillingError::Api { detail, .. } if !detail.is_empty() => detail.clone(),
            _ => "Failed to process subscription. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        BillingError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_surfaces_server_detail() {
        let err = BillingError::Api {
            status: 402,
            detail: "Payment method required".to_string(),
        };
        assert_eq!(err.user_message(), "Payment method required");
    }

    #[test]
    fn transport_error_surfaces_generic_message() {
        let err = BillingError::Http("connection refused".to_string());
        assert_eq!(
            err.user_message(),
            "Failed to process subscription. Please try again."
        );
    }

    #[test]
    fn api_error_with_empty_detail_surfaces_generic_message() {
        let err = BillingError::Api {
            status: 500,
            detail: String::new(),
        };
        assert_eq!(
            err.user_message(),
            "Failed to process subscription. Please try again."
        );
    }
}
