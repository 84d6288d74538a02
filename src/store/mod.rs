//! Persistence layer — libSQL-backed storage for users and tour requests.

pub mod libsql_backend;
pub mod migrations;
pub mod model;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use model::{IntakeFields, Request, RequestStatus, User};
pub use traits::RequestStore;
