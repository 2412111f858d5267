//! HTTP API: router, bearer authentication, request/response mapping.

pub mod app;
pub mod context;
pub mod middleware;
