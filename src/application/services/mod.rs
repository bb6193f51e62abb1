//! Business logic services for the application layer.

pub mod code_allocator;
pub mod rate_limiter;

pub use code_allocator::CodeAllocator;
pub use rate_limiter::RateLimiter;
