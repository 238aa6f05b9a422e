//! Rendering adapter: the tile factory the streaming core talks to, and a
//! renderer-agnostic view of it.
//!
//! # Invariants
//! - Only the streaming manager registers or disposes tile nodes.
//! - Renderers read the scene; they never mutate it.
//!
//! # Workaround
//! Ships a debug text renderer that draws an ASCII minimap in place of a GPU
//! backend. The trait is stable; swap in a GPU implementation without
//! changing consumers.

mod renderer;
mod scene;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{SceneGraph, TileHandle, TileNode, TileStyle};

pub fn crate_info() -> &'static str {
    "wanderfield-render v0.1.0"
}
