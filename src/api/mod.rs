//! API Lambda handler and request processing

pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod router;

// Re-export the main handler for convenience
pub use handler::handler;
