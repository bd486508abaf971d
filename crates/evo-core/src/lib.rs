//! Core models, API clients and page controllers for the evo result admin console.
//!
//! This crate provides everything the terminal frontend needs: typed access to
//! the clientes and sync backends, the generic sortable/paginated table, the
//! declarative filter form and its predicate builder, and one controller per
//! page holding that page's transient state.

pub mod api;
pub mod config;
pub mod dates;
pub mod error;
pub mod filter;
pub mod forms;
pub mod models;
pub mod pages;
pub mod phone;
pub mod picker;
pub mod routes;
pub mod session;
pub mod table;
pub mod theme;

pub use api::{ClientesApi, HttpClient, SyncApi};
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use picker::Picker;
pub use routes::Route;
pub use session::Session;
pub use table::{Cell, Column, ColumnHeader, DataTable, SortDirection, SortType};
pub use theme::{Theme, ThemeState};
