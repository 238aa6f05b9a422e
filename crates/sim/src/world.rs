use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wanderfield_common::{AgentId, Transform};
use wanderfield_input::InputState;

use crate::brain::WanderBrain;
use crate::config::{SimConfig, SimError};

/// An autonomous pawn.
#[derive(Debug, Clone)]
pub struct Agent {
    pub transform: Transform,
    pub brain: WanderBrain,
}

/// The avatar plus every agent currently roaming.
///
/// Agents live in a BTreeMap so iteration, and therefore the RNG draw order,
/// is identical across runs. Agent ids are drawn from the seeded RNG for the
/// same reason.
#[derive(Debug, Clone)]
pub struct World {
    config: SimConfig,
    avatar: Transform,
    agents: BTreeMap<AgentId, Agent>,
    rng: StdRng,
    tick: u64,
    elapsed: f32,
}

impl World {
    /// Build a world with the avatar at the origin and `agent_count` agents.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut world = Self {
            rng: StdRng::seed_from_u64(config.seed),
            avatar: Transform::default(),
            agents: BTreeMap::new(),
            tick: 0,
            elapsed: 0.0,
            config,
        };
        for _ in 0..world.config.agent_count {
            world.spawn_agent();
        }
        Ok(world)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of steps taken.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since the world was built.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn avatar(&self) -> &Transform {
        &self.avatar
    }

    /// Move the avatar directly, e.g. to teleport it.
    pub fn place_avatar(&mut self, position: Vec3) {
        self.avatar.position = Vec3::new(position.x, 0.0, position.z);
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = (&AgentId, &Agent)> {
        self.agents.iter()
    }

    /// Spawn an agent at a random spot near the origin.
    pub fn spawn_agent(&mut self) -> AgentId {
        let e = self.config.spawn_half_extent;
        let position = Vec3::new(
            self.rng.gen_range(-e..e),
            0.0,
            self.rng.gen_range(-e..e),
        );
        self.spawn_agent_at(position)
    }

    pub fn spawn_agent_at(&mut self, position: Vec3) -> AgentId {
        let id = AgentId::from_bytes(self.rng.r#gen());
        let brain = WanderBrain::new(&mut self.rng, &self.config);
        self.agents.insert(
            id,
            Agent {
                transform: Transform::at(Vec3::new(position.x, 0.0, position.z)),
                brain,
            },
        );
        tracing::debug!(agent = %id.short(), ?position, "agent spawned");
        id
    }

    /// Remove an agent. Returns its last transform if it existed.
    pub fn despawn_agent(&mut self, id: AgentId) -> Option<Transform> {
        let agent = self.agents.remove(&id)?;
        tracing::debug!(agent = %id.short(), "agent despawned");
        Some(agent.transform)
    }

    /// Advance the world by `dt` seconds with the avatar driven by `input`.
    pub fn step(&mut self, dt: f32, input: &InputState) {
        self.tick += 1;
        self.elapsed += dt;

        let heading = input.heading();
        let speed = if input.surging() {
            self.config.avatar_speed * self.config.surge_multiplier
        } else {
            self.config.avatar_speed
        };
        self.avatar.position += heading * speed * dt;
        face(&mut self.avatar, heading);

        for agent in self.agents.values_mut() {
            let delta = agent.brain.update(dt, &mut self.rng, &self.config);
            agent.transform.position += delta;
            face(&mut agent.transform, delta);
        }
    }

    /// Ground positions of every observer: the avatar first, then agents in
    /// id order.
    pub fn observer_positions(&self) -> Vec<Vec3> {
        std::iter::once(self.avatar.ground_position())
            .chain(self.agents.values().map(|a| a.transform.ground_position()))
            .collect()
    }

    /// FNV-1a over tick and pawn positions, for comparing runs.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        for p in [self.avatar.position]
            .into_iter()
            .chain(self.agents.values().map(|a| a.transform.position))
        {
            mix(&mut h, &p.x.to_le_bytes());
            mix(&mut h, &p.z.to_le_bytes());
        }
        for id in self.agents.keys() {
            mix(&mut h, id.0.as_bytes());
        }
        h
    }
}

/// Turn a pawn to face its direction of travel. Standing still keeps the
/// previous facing.
fn face(transform: &mut Transform, direction: Vec3) {
    if direction.x != 0.0 || direction.z != 0.0 {
        transform.rotation = Quat::from_rotation_y(direction.x.atan2(direction.z));
    }
}
