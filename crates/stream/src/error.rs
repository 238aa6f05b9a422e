/// Errors surfaced by the streaming core.
///
/// Normal operation never produces these: store operations are total and
/// duplicate inserts or absent removals are no-ops. They only report bad
/// configuration or observers placed where the grid cannot address them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    #[error("invalid stream config: {reason}")]
    InvalidConfig { reason: String },
    #[error("observer position ({x}, {z}) is not finite")]
    NonFinitePosition { x: f32, z: f32 },
    #[error("grid coordinate overflow for position ({x}, {z})")]
    CoordinateOverflow { x: f32, z: f32 },
}

impl StreamError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
