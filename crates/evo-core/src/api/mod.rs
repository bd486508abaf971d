//! Backend clients.
//!
//! Both backends speak JSON; [`envelope::normalize`] folds their response
//! conventions into `ApiResult`.

pub mod clientes;
pub mod envelope;
pub mod http;
pub mod sync;

pub use clientes::ClientesApi;
pub use http::HttpClient;
pub use sync::SyncApi;
