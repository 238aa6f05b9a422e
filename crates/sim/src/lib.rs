//! Observer world: the avatar and the autonomous agents whose positions drive
//! tile streaming.
//!
//! # Invariants
//! - Stepping is pure with respect to seed, config and input; identical runs
//!   produce identical trajectories.
//! - All pawns stay on the ground plane.
//! - The avatar is always the first observer.

mod brain;
mod config;
pub mod world;

pub use brain::WanderBrain;
pub use config::{SimConfig, SimError};
pub use world::{Agent, World};
