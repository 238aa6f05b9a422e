//! Avatar input: keys map to movement actions, held actions map to a heading.
//!
//! # Invariants
//! - The world consumes actions and headings, never raw key names.
//! - Scripted input produces the same per-frame state as live keys.

pub mod action;
pub mod script;

pub use action::{Action, InputState};
pub use script::{InputError, InputScript};
