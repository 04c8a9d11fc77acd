//! HTTP client wrapper and typed endpoint calls for the hrdesk API.

pub mod api;
pub mod auth;
pub mod config;
pub mod employees;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod transport;

pub use api::{ApiClient, RequestOptions};
pub use auth::AuthApi;
pub use config::ClientConfig;
pub use employees::EmployeeApi;
pub use reqwest::{Method, StatusCode};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
