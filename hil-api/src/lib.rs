pub mod api;
pub mod audit;
pub mod error;
pub mod model;
pub mod password;
pub mod rest;
pub mod store;

pub use api::Orchestrator;
pub use audit::AuditLogger;
pub use error::ApiError;
pub use store::{Store, StoreError, VlanPool, VlanRange};
