/// Connection resource types and resource-path helpers.
pub mod connection;
/// Logical-name keyword to connector mapping.
pub mod connector;
/// Create-if-absent connection provisioning.
pub mod ensure;
/// HTTP implementation of the connection admin operations.
pub mod serviceclient;

pub use connector::{ConnectorDomain, MatchMode};
pub use ensure::{ConnectionAdmin, ensure_connection};
