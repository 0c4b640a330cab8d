//! Blocking HTTP client facade
//!
//! One shared client with fixed timeouts plus GET/POST helpers. Failures are
//! returned as [`HttpError`]; use [`OrLog::or_log`] where a caller only cares
//! whether a response came back.

pub mod config;
pub mod error;
pub mod http;
pub mod request;

pub use config::{ClientConfig, DEFAULT_TIMEOUT_MS};
pub use error::{HttpError, OrLog, Result};
pub use http::{global, HttpClient, Response};
pub use request::{Headers, Method, RequestBody, RequestSpec, FORM, JSON};
