//! Process-local session state.
//!
//! Holds the bearer token for the lifetime of the process only; nothing here
//! is written to disk.

use std::sync::{Arc, RwLock};

/// Shared handle to the current bearer token.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session seeded with a token (from CLI, env or config).
    pub fn with_token(token: Option<String>) -> Self {
        let session = Self::new();
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            session.set_token(token);
        }
        session
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.into());
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_token() {
        let session = Session::new();
        let other = session.clone();
        session.set_token("abc");
        assert_eq!(other.token().as_deref(), Some("abc"));
        other.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn blank_seed_is_ignored() {
        assert!(!Session::with_token(Some("   ".to_string())).is_authenticated());
        assert!(Session::with_token(Some("t".to_string())).is_authenticated());
    }
}
