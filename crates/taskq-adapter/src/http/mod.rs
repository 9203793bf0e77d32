/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod metrics;
pub mod tasks;

pub use error::{Result, TaskqError};

pub use client::{ClientConfig, DEFAULT_BASE_URL, TaskqClient};
