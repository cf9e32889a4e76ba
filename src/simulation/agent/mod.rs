//! Runner agents: perception, decision, action and obstacle management.
//!
//! An [`Agent`] is a collidable body in the [`World`] plus the brain and run
//! state that drive it. Each tick a living agent:
//! 1. Accumulates score and speeds up the scroll
//! 2. Perceives its surroundings and asks its brain (or the player) what to do
//! 3. Jumps or ducks
//! 4. Spawns, scrolls and despawns its own obstacles
//! 5. Dies on touching any of them

mod perception;
mod spawner;

pub use perception::{Perception, Sighting};
pub use spawner::{ObstacleKind, Spawner};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::brain::NeuralNet;
use super::collidable::{Collidable, FilterMode, IgnoreList};
use super::entity::EntityId;
use super::error::{Error, Result};
use super::params::{Params, Posture};
use super::raycast::raycast;
use super::vector::Vector;
use super::world::World;

/// Number of brain inputs produced by [`Perception::to_array`].
pub const INPUT_SIZE: usize = 10;
/// Number of brain outputs read: jump, then duck.
pub const OUTPUT_SIZE: usize = 2;

/// Draw order of agent bodies.
pub const AGENT_Z: i32 = 1;
/// Draw order of obstacles.
pub const OBSTACLE_Z: i32 = 50;

/// Jump and duck requests for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInput {
    /// Jump if grounded.
    pub jump: bool,
    /// Duck, or drop faster while airborne.
    pub duck: bool,
}

/// A runner controlled by a neural network.
#[derive(Debug, Clone)]
pub struct Agent {
    body: EntityId,
    brain: NeuralNet,
    score: f64,
    speed: f64,
    alive: bool,
    ducking: bool,
    spawner: Spawner,
    obstacles: Vec<EntityId>,
}

impl Agent {
    /// Spawns an agent's body standing on the floor and wraps it around `brain`.
    ///
    /// The body only collides with `floor`. Fails without touching `world`
    /// if `params` do not validate.
    ///
    /// # Arguments
    ///
    /// * `world` - World the body is spawned into
    /// * `params` - Geometry, physics and spawn settings
    /// * `floor` - Floor the body rests on and probes for
    /// * `brain` - Network that drives this agent
    /// * `rng` - Random source for the first spawn interval
    pub fn spawn<R: Rng + ?Sized>(
        world: &mut World,
        params: &Params,
        floor: EntityId,
        brain: NeuralNet,
        rng: &mut R,
    ) -> Result<Self> {
        let spawner = Spawner::new(params, rng)?;
        let standing = &params.standing;
        let body = world.spawn_collidable(|id| {
            let mut body = Collidable::new(id, Vector::new(params.agent_x, standing.rest_y), standing.size, AGENT_Z)
                .with_texture(standing.texture.clone());
            body.set_collision(true, params.agent_collision.clone());
            body.ignore = IgnoreList::with_entries(FilterMode::Whitelist, [floor]);
            body.body.physics_enabled = true;
            body
        });

        Ok(Self {
            body,
            brain,
            score: 0.0,
            speed: params.start_speed,
            alive: true,
            ducking: false,
            spawner,
            obstacles: Vec::new(),
        })
    }

    /// Handle of the agent's body. Invalid once the agent has died and the world swept.
    pub fn body(&self) -> EntityId {
        self.body
    }

    /// The network driving this agent.
    pub fn brain(&self) -> &NeuralNet {
        &self.brain
    }

    /// Seconds survived so far.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Selection fitness: time alive.
    pub fn fitness(&self) -> f64 {
        self.score
    }

    /// Current scroll speed.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Whether the agent is still running.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether the ducking footprint is active.
    pub fn is_ducking(&self) -> bool {
        self.ducking
    }

    /// Obstacles owned by this agent, in spawn order.
    pub fn obstacles(&self) -> &[EntityId] {
        &self.obstacles
    }

    fn collider<'w>(&self, world: &'w World) -> Result<&'w Collidable> {
        world.collidable(self.body).ok_or(Error::UnknownEntity(self.body))
    }

    fn collider_mut<'w>(&self, world: &'w mut World) -> Result<&'w mut Collidable> {
        world.collidable_mut(self.body).ok_or(Error::UnknownEntity(self.body))
    }

    /// Advances the agent by `dt` seconds. Dead agents do nothing.
    ///
    /// `manual` replaces the brain's decision when present.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        params: &Params,
        dt: f64,
        rng: &mut R,
        manual: Option<ControlInput>,
    ) -> Result<()> {
        if !self.alive {
            return Ok(());
        }

        self.score += dt;
        self.speed = (self.speed - params.speed_acceleration * dt).max(params.min_speed);

        let perception = self.inputs(world, params)?;
        let control = match manual {
            Some(input) => input,
            None => self.decide(&perception)?,
        };

        if control.jump && perception.grounded {
            self.jump(world, params)?;
        }
        self.set_ducking(world, params, control.duck, perception.grounded, dt)?;

        if let Some(kind) = self.spawner.tick(dt, self.speed, params, rng) {
            self.spawn_obstacle(world, params, kind);
        }
        self.scroll_obstacles(world, params, dt)?;
        self.check_collisions(world)?;
        Ok(())
    }

    /// Reads the agent's sensors.
    pub fn inputs(&self, world: &World, params: &Params) -> Result<Perception> {
        let body = self.collider(world)?;
        let sightings: Vec<Sighting> = self
            .obstacles
            .iter()
            .filter_map(|&id| world.entity(id))
            .map(|e| Sighting { position: e.position })
            .collect();

        Ok(Perception::observe(
            body.position(),
            body.body.velocity,
            self.is_grounded(world, params)?,
            self.speed,
            &sightings,
            params,
        ))
    }

    fn decide(&self, perception: &Perception) -> Result<ControlInput> {
        let outputs = self.brain.forward(&perception.to_array())?;
        Ok(ControlInput {
            jump: outputs.get(0).is_some_and(|&v| v > 0.0),
            duck: outputs.get(1).is_some_and(|&v| v > 0.0),
        })
    }

    /// Whether a short downward probe from the body centre hits something the body collides with.
    pub fn is_grounded(&self, world: &World, params: &Params) -> Result<bool> {
        let body = self.collider(world)?;
        let reach = body.size.y / 2.0 + params.ground_probe_margin;
        Ok(raycast(world, body.position(), Vector::new(0.0, 1.0), reach, &body.ignore).is_some())
    }

    /// Applies the jump impulse. Callers check [`is_grounded`](Self::is_grounded).
    pub fn jump(&self, world: &mut World, params: &Params) -> Result<()> {
        self.collider_mut(world)?
            .body
            .add_force(Vector::new(0.0, -params.jump_impulse));
        Ok(())
    }

    /// Enters, holds or leaves the duck.
    ///
    /// Grounded ducking swaps to the ducking footprint. Airborne ducking pulls
    /// the body down instead. Releasing restores the standing footprint at
    /// its rest height.
    pub fn set_ducking(&mut self, world: &mut World, params: &Params, duck: bool, grounded: bool, dt: f64) -> Result<()> {
        if duck {
            if grounded {
                if !self.ducking {
                    self.apply_posture(world, &params.ducking)?;
                    self.ducking = true;
                }
            } else {
                self.collider_mut(world)?
                    .body
                    .add_force(Vector::new(0.0, params.duck_pull * dt));
            }
        } else if self.ducking {
            self.apply_posture(world, &params.standing)?;
            self.ducking = false;
        }
        Ok(())
    }

    fn apply_posture(&self, world: &mut World, posture: &Posture) -> Result<()> {
        let body = self.collider_mut(world)?;
        body.size = posture.size;
        body.texture = Some(posture.texture.clone());
        let x = body.position().x;
        body.body.go_to(Vector::new(x, posture.rest_y));
        Ok(())
    }

    /// Spawns an obstacle of `kind` at the leading edge of the world.
    ///
    /// Obstacles collide but block nothing, so they pass through each other.
    pub fn spawn_obstacle(&mut self, world: &mut World, params: &Params, kind: ObstacleKind) -> EntityId {
        let spec = kind.spec(params);
        let id = world.spawn_collidable(|id| {
            let mut obstacle = Collidable::new(id, Vector::new(params.world_half_width, spec.y), spec.size, OBSTACLE_Z)
                .with_texture(spec.texture.clone());
            obstacle.set_collision(true, params.obstacle_collision.clone());
            obstacle.ignore = IgnoreList::new(FilterMode::Whitelist);
            obstacle
        });
        self.obstacles.push(id);
        id
    }

    fn scroll_obstacles(&mut self, world: &mut World, params: &Params, dt: f64) -> Result<()> {
        let shift = Vector::new(self.speed * dt, 0.0);
        for &id in &self.obstacles {
            world.move_entity(id, shift)?;
            if world.entity(id).is_some_and(|e| e.position.x < -params.world_half_width) {
                world.destroy(id);
            }
        }
        self.obstacles
            .retain(|&id| world.entity(id).is_some_and(|e| !e.is_destroyed()));
        Ok(())
    }

    /// Tests the body against every owned obstacle and dies on the first hit.
    ///
    /// Returns whether the agent died.
    pub fn check_collisions(&mut self, world: &mut World) -> Result<bool> {
        if !self.alive {
            return Ok(false);
        }
        for &obstacle in &self.obstacles {
            if world.overlaps(self.body, obstacle)? {
                self.kill(world);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Ends the run: destroys every owned obstacle, then hides and destroys the body.
    pub fn kill(&mut self, world: &mut World) {
        self.alive = false;
        for id in self.obstacles.drain(..) {
            world.destroy(id);
        }
        if let Some(body) = world.collidable_mut(self.body) {
            body.visible = false;
        }
        world.destroy(self.body);
        tracing::trace!(body = ?self.body, score = self.score, "agent died");
    }

    /// Shows or hides the body and its obstacles.
    pub fn set_visible(&self, world: &mut World, visible: bool) {
        for &id in self.obstacles.iter().chain(std::iter::once(&self.body)) {
            if let Some(collidable) = world.collidable_mut(id) {
                collidable.visible = visible && !collidable.body.is_destroyed();
            }
        }
    }
}
