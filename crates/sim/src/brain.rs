use glam::Vec3;
use rand::Rng;

use crate::config::SimConfig;

/// Random-walk controller for one agent.
///
/// The agent keeps a heading for a random interval, then picks a new one (or
/// stands still). Independently it rolls for short surges of speed.
#[derive(Debug, Clone, PartialEq)]
pub struct WanderBrain {
    heading: Vec3,
    since_decision: f32,
    decision_after: f32,
    surge_left: f32,
}

impl WanderBrain {
    /// A fresh brain: standing still until its first decision.
    pub fn new(rng: &mut impl Rng, config: &SimConfig) -> Self {
        Self {
            heading: Vec3::ZERO,
            since_decision: 0.0,
            decision_after: draw(rng, config.decision_interval),
            surge_left: 0.0,
        }
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn surging(&self) -> bool {
        self.surge_left > 0.0
    }

    /// Advance by `dt` seconds and return this frame's displacement.
    pub fn update(&mut self, dt: f32, rng: &mut impl Rng, config: &SimConfig) -> Vec3 {
        self.since_decision += dt;
        if self.since_decision > self.decision_after {
            self.choose_heading(rng, config);
        }

        if self.surge_left > 0.0 {
            self.surge_left = (self.surge_left - dt).max(0.0);
        } else if rng.gen_range(0.0..1.0) < dt * config.surge_chance_per_second {
            self.surge_left = draw(rng, config.surge_duration);
            tracing::trace!(duration = self.surge_left, "agent surge");
        }

        let speed = if self.surging() {
            config.agent_speed * config.surge_multiplier
        } else {
            config.agent_speed
        };
        self.heading * speed * dt
    }

    fn choose_heading(&mut self, rng: &mut impl Rng, config: &SimConfig) {
        if rng.gen_range(0.0..1.0) < config.idle_chance {
            self.heading = Vec3::ZERO;
        } else {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            self.heading = Vec3::new(angle.sin(), 0.0, angle.cos());
        }
        self.since_decision = 0.0;
        self.decision_after = draw(rng, config.decision_interval);
        tracing::trace!(heading = ?self.heading, next = self.decision_after, "agent decision");
    }
}

fn draw(rng: &mut impl Rng, (min, max): (f32, f32)) -> f32 {
    rng.gen_range(min..max)
}
