//! Shared value types used across the wanderfield crates.

mod types;

pub use types::{AgentId, Transform};
