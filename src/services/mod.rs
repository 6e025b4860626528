//! Backend access.

pub mod api;
pub mod http;

pub use api::DashboardApi;
pub use http::HttpDashboardApi;
