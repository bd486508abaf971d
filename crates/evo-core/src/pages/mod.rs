//! Page controllers, one per console route.
//!
//! A controller owns its page's transient state (cached rows, table, filter,
//! open dialog, messages) and exposes async actions for the frontend to run.
//! Actions only return `Err` for [`ApiError::Forbidden`], which the frontend
//! answers by going back to the login route. Every other failure becomes a
//! notice, an inline form error, or an empty list.

pub mod clientes;
pub mod monitoring;
pub mod pipelines;
pub mod portais;
pub mod sync_dashboard;
pub mod tintim;

pub use clientes::ClientesPage;
pub use monitoring::{PortaisMonitoringPage, TintimMonitoringPage};
pub use pipelines::PipelinesPage;
pub use portais::PortaisPage;
pub use sync_dashboard::SyncDashboard;
pub use tintim::TintimPage;

use crate::error::{ApiError, ApiResult};
use crate::models::Ack;

/// Informal lifecycle of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageState {
    #[default]
    Loading,
    Loaded,
    Submitting,
    Error(String),
}

/// Toast-style message produced by an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// List fetches degrade to an empty list on anything but a forbidden answer.
pub(crate) fn degrade<T>(result: ApiResult<Vec<T>>, what: &str) -> ApiResult<Vec<T>> {
    match result {
        Ok(rows) => Ok(rows),
        Err(ApiError::Forbidden) => Err(ApiError::Forbidden),
        Err(e) => {
            tracing::warn!("failed to load {what}: {e}");
            Ok(Vec::new())
        }
    }
}

/// Outcome of a mutation: the text to show on success, or the message to
/// show on failure. Forbidden still propagates.
pub(crate) fn settle(result: ApiResult<Ack>, failure: &str) -> ApiResult<Result<Ack, String>> {
    match result {
        Ok(ack) => Ok(Ok(ack)),
        Err(ApiError::Forbidden) => Err(ApiError::Forbidden),
        Err(e) => {
            tracing::error!("{failure} {e}");
            Ok(Err(e.user_message(failure)))
        }
    }
}

/// Parse a select value holding a numeric id.
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrade_keeps_forbidden() {
        let result: ApiResult<Vec<i32>> = Err(ApiError::Forbidden);
        assert!(degrade(result, "x").unwrap_err().is_forbidden());

        let result: ApiResult<Vec<i32>> = Err(ApiError::Status {
            status: 500,
            message: String::new(),
        });
        assert!(degrade(result, "x").unwrap().is_empty());
    }

    #[test]
    fn settle_uses_backend_message() {
        let result = Err(ApiError::Rejected {
            message: "Cliente já existe".into(),
        });
        assert_eq!(
            settle(result, "Erro ao cadastrar cliente.").unwrap(),
            Err("Cliente já existe".to_string())
        );
    }
}
