//! Application layer services implementing business logic.
//!
//! This layer orchestrates store operations behind a clean API for HTTP
//! handlers. Services consume the store traits, never concrete backends.
//!
//! # Available Services
//!
//! - [`services::rate_limiter::RateLimiter`] - Per-client admission control
//! - [`services::code_allocator::CodeAllocator`] - Short code allocation and resolution

pub mod services;
