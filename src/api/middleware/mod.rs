//! HTTP middleware for request processing and protection.
//!
//! Provides cookie session authentication, rate limiting, security headers
//! and observability middleware.

pub mod rate_limit;
pub mod security_headers;
pub mod session;
pub mod tracing;
