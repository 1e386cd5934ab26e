//! HTTP plumbing shared by the address and student services.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request ID, trace span, timeout, metrics)
//!     → service handlers (address/, student/)
//!     → response.rs (present / absent / error → status code)
//!     → Send to client
//! ```

pub mod request;
pub mod response;

pub use request::{with_request_layers, X_REQUEST_ID};
pub use response::{found_or_not_found, lookup_response, ApiError};
