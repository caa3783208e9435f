//! connect-two common library
//!
//! Wire schemas, the error taxonomy and the HTTP client shared by every part
//! of the client that talks to the remote API.

pub mod error;
pub mod http_client;
pub mod models;

pub use error::{ApiError, Result};
pub use http_client::{ApiClient, Empty};
