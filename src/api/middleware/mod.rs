//! API middleware components

pub mod logging;
pub mod session;

pub use logging::{REQUEST_ID_HEADER, logging_middleware};
pub use session::{Caller, bearer_token};
