//! Error type shared by every backend call.

use thiserror::Error;

/// Result alias for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a call to one of the backends, after envelope normalization.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend answered 403; the session must go back to the login route.
    #[error("access forbidden")]
    Forbidden,
    /// The backend answered `{ success: false, ... }`.
    #[error("{message}")]
    Rejected { message: String },
    /// Non-success status without a business envelope.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// Body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// A base URL or path could not be turned into a URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether this failure must send the user back to the login route.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Forbidden)
    }

    /// Text shown to the user: backend messages pass through, everything
    /// else collapses to the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected { message } if !message.trim().is_empty() => message.clone(),
            ApiError::Status { message, .. } if !message.trim().is_empty() => message.clone(),
            ApiError::Forbidden => "Sessão expirada. Faça login novamente.".to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_passes_through() {
        let err = ApiError::Rejected {
            message: "Cliente já cadastrado".to_string(),
        };
        assert_eq!(err.user_message("Erro ao cadastrar cliente."), "Cliente já cadastrado");
    }

    #[test]
    fn empty_rejection_uses_fallback() {
        let err = ApiError::Rejected {
            message: "  ".to_string(),
        };
        assert_eq!(err.user_message("Erro ao cadastrar Tintim."), "Erro ao cadastrar Tintim.");
        assert!(!err.is_forbidden());
    }

    #[test]
    fn forbidden_is_flagged() {
        assert!(ApiError::Forbidden.is_forbidden());
    }
}
