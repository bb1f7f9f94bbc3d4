//! Error types for herdbook
//!
//! - **CoreError**: service-layer failures with a coarse [`CoreErrorKind`]
//!   that the HTTP layer maps onto status codes.
//! - **StatusError**: per-animal data problems found while deriving a
//!   lifecycle status. The sweep logs and skips these.

pub mod core_error;
pub mod status;

pub use core_error::{CoreError, CoreErrorKind};
pub use status::StatusError;

/// Result type alias for service operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for status derivation
pub type StatusResult<T> = Result<T, StatusError>;
