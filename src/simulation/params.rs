use std::path::Path;

use serde::{Deserialize, Serialize};

use super::agent::{INPUT_SIZE, OUTPUT_SIZE};
use super::collidable::CollisionMode;
use super::error::{Error, Result};
use super::mask::TextureId;
use super::vector::Vector;

/// Footprint and texture of an agent posture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posture {
    /// Collider size.
    pub size: Vector,
    /// Centre height when resting on the floor.
    pub rest_y: f64,
    /// Texture shown in this posture.
    pub texture: TextureId,
}

/// Shape, placement and texture of one obstacle kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    /// Collider size.
    pub size: Vector,
    /// Centre height.
    pub y: f64,
    /// Texture.
    pub texture: TextureId,
}

/// Simulation parameters that control the runner and its evolution.
///
/// Rates are per second; the simulation scales them by each tick's elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Agents per generation.
    pub population_size: usize,
    /// Percentage of ranked agents copied unmutated into the next generation.
    pub elite_percent: usize,
    /// Offspring parents are drawn from this many top-ranked agents.
    pub parent_pool: usize,
    /// Per-weight mutation probability.
    pub mutation_rate: f64,
    /// Neural network layer dimensions.
    pub layer_sizes: Vec<usize>,
    /// Downward acceleration.
    pub gravity: f64,
    /// Upward velocity added by a jump.
    pub jump_impulse: f64,
    /// Downward acceleration while ducking in the air.
    pub duck_pull: f64,
    /// Scroll speed at the start of a run (negative: world moves left).
    pub start_speed: f64,
    /// Most negative scroll speed.
    pub min_speed: f64,
    /// Rate at which the scroll speed grows in magnitude.
    pub speed_acceleration: f64,
    /// Shortest delay between obstacle spawns.
    pub spawn_min_interval: f64,
    /// Longest delay between obstacle spawns.
    pub spawn_max_interval: f64,
    /// Shortest delay once the scroll speed passes `fast_spawn_speed`.
    pub fast_spawn_min_interval: f64,
    /// Scroll speed below which spawns come faster.
    pub fast_spawn_speed: f64,
    /// Probability that a spawned obstacle is a bird rather than a cactus.
    pub bird_probability: f64,
    /// Ground obstacle.
    pub cactus: ObstacleSpec,
    /// Airborne obstacle.
    pub bird: ObstacleSpec,
    /// Half the visible world width; obstacles spawn at `+half` and vanish past `-half`.
    pub world_half_width: f64,
    /// Height used to normalize vertical inputs.
    pub vertical_range: f64,
    /// Floor centre.
    pub floor_position: Vector,
    /// Floor size.
    pub floor_size: Vector,
    /// Horizontal position of every agent.
    pub agent_x: f64,
    /// Upright footprint.
    pub standing: Posture,
    /// Ducked footprint.
    pub ducking: Posture,
    /// Ground probe length beyond half the body height.
    pub ground_probe_margin: f64,
    /// Overlap test used by agents.
    pub agent_collision: CollisionMode,
    /// Overlap test used by obstacles.
    pub obstacle_collision: CollisionMode,
    /// Seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            population_size: 100,
            elite_percent: 1,
            parent_pool: 50,
            mutation_rate: 0.05,
            layer_sizes: vec![INPUT_SIZE, 16, OUTPUT_SIZE],
            gravity: 3600.0,
            jump_impulse: 1200.0,
            duck_pull: 3000.0,
            start_speed: -300.0,
            min_speed: -900.0,
            speed_acceleration: 6.0,
            spawn_min_interval: 0.9,
            spawn_max_interval: 2.2,
            fast_spawn_min_interval: 0.6,
            fast_spawn_speed: -500.0,
            bird_probability: 0.25,
            cactus: ObstacleSpec {
                size: Vector::new(30.0, 60.0),
                y: 145.0,
                texture: TextureId::new("cactus"),
            },
            bird: ObstacleSpec {
                size: Vector::new(46.0, 30.0),
                y: 115.0,
                texture: TextureId::new("bird"),
            },
            world_half_width: 410.0,
            vertical_range: 200.0,
            floor_position: Vector::new(0.0, 200.0),
            floor_size: Vector::new(1000.0, 50.0),
            agent_x: 0.0,
            standing: Posture {
                size: Vector::new(50.0, 50.0),
                rest_y: 150.0,
                texture: TextureId::new("dino"),
            },
            ducking: Posture {
                size: Vector::new(60.0, 30.0),
                rest_y: 160.0,
                texture: TextureId::new("dino_duck"),
            },
            ground_probe_margin: 4.0,
            agent_collision: CollisionMode::Box,
            obstacle_collision: CollisionMode::Box,
            seed: None,
        }
    }
}

fn ensure(condition: bool, msg: &str) -> Result<()> {
    if condition { Ok(()) } else { Err(Error::invalid(msg)) }
}

impl Params {
    /// Top edge of the floor.
    pub fn floor_top(&self) -> f64 {
        self.floor_position.y - self.floor_size.y / 2.0
    }

    /// Number of elites carried into each new generation.
    pub fn elite_count(&self) -> usize {
        self.elite_percent * self.population_size / 100
    }

    /// Rejects values that cannot produce a runnable simulation.
    pub fn validate(&self) -> Result<()> {
        ensure(self.population_size > 0, "population size must be positive")?;
        ensure(self.elite_percent <= 100, "elite percent must be in [0, 100]")?;
        ensure(self.parent_pool > 0, "parent pool must be positive")?;
        ensure(
            (0.0..=1.0).contains(&self.mutation_rate),
            "mutation rate must be in [0.0, 1.0]",
        )?;
        ensure(self.layer_sizes.len() >= 2, "network needs at least two layers")?;
        ensure(
            self.layer_sizes.iter().all(|&n| n > 0),
            "every layer needs at least one neuron",
        )?;
        ensure(
            self.layer_sizes.first() == Some(&INPUT_SIZE),
            "first layer must match the agent's input count",
        )?;
        ensure(
            self.layer_sizes.last().is_some_and(|&n| n >= OUTPUT_SIZE),
            "last layer must provide jump and duck outputs",
        )?;
        ensure(self.min_speed < self.start_speed, "min speed must be below start speed")?;
        ensure(self.start_speed < 0.0, "start speed must scroll leftwards")?;
        ensure(self.jump_impulse > 0.0, "jump impulse must be positive")?;
        ensure(self.speed_acceleration >= 0.0, "speed acceleration must be non-negative")?;
        ensure(
            0.0 < self.spawn_min_interval && self.spawn_min_interval < self.spawn_max_interval,
            "spawn window must satisfy 0 < min < max",
        )?;
        ensure(
            0.0 < self.fast_spawn_min_interval && self.fast_spawn_min_interval < self.spawn_max_interval,
            "fast spawn minimum must lie in (0, max)",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.bird_probability),
            "bird probability must be in [0.0, 1.0]",
        )?;
        ensure(self.world_half_width > 0.0, "world half width must be positive")?;
        ensure(self.vertical_range > 0.0, "vertical range must be positive")?;
        ensure(
            !matches!(self.agent_collision, CollisionMode::Tilemap(_))
                && !matches!(self.obstacle_collision, CollisionMode::Tilemap(_)),
            "agents and obstacles cannot be tilemaps",
        )?;
        Ok(())
    }

    /// Parses and validates parameters from JSON. Missing fields take defaults.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    /// Loads and validates parameters from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
