use std::collections::HashSet;
use std::fmt::Write;

use glam::Vec3;

use crate::scene::SceneGraph;

/// What part of the ground plane to draw.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// World position the view is centered on.
    pub focus: Vec3,
    /// Half-width of the view, in tiles.
    pub radius_tiles: i32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            radius_tiles: 6,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene and the observers' positions (avatar first) and
/// produces output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, scene: &SceneGraph, observers: &[Vec3], view: &RenderView) -> Self::Output;
}

/// Debug text renderer: an ASCII minimap of the streamed ground.
///
/// `#` is a live tile, `.` empty ground, `@` the avatar and `a` an agent.
/// North (-z) is up.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneGraph, observers: &[Vec3], view: &RenderView) -> String {
        let size = scene.tile_size();
        let cell_of = |p: Vec3| ((p.x / size).floor() as i64, (p.z / size).floor() as i64);

        let live: HashSet<(i64, i64)> = scene
            .nodes()
            .map(|(_, node)| {
                (
                    (node.origin.x / size).round() as i64,
                    (node.origin.z / size).round() as i64,
                )
            })
            .collect();
        let avatar = observers.first().map(|p| cell_of(*p));
        let agents: HashSet<(i64, i64)> = observers.iter().skip(1).map(|p| cell_of(*p)).collect();

        let (cx, cz) = cell_of(view.focus);
        let r = view.radius_tiles.max(0) as i64;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Ground (tiles={}, observers={}) ===",
            scene.node_count(),
            observers.len()
        );
        let _ = writeln!(
            out,
            "Focus: ({:.1}, {:.1}) cell=({cx}, {cz})",
            view.focus.x, view.focus.z
        );
        for z in (cz - r)..=(cz + r) {
            for x in (cx - r)..=(cx + r) {
                let c = if avatar == Some((x, z)) {
                    '@'
                } else if agents.contains(&(x, z)) {
                    'a'
                } else if live.contains(&(x, z)) {
                    '#'
                } else {
                    '.'
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}
