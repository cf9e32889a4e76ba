//! Base simulated object and its stable handle.
//!
//! Entities live in the [`World`](super::world::World) arena and are referred
//! to by [`EntityId`]. Destroying one only sets a flag; the world removes
//! flagged entities in a single sweep at the end of the tick.

use serde::{Deserialize, Serialize};

use super::vector::Vector;

/// Stable handle to an entity in the world arena.
///
/// Ids are never reused, so a handle to a swept entity stays invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Position, velocity and lifecycle state shared by every simulated object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Handle assigned by the world at spawn time.
    pub id: EntityId,
    /// Centre position in world space.
    pub position: Vector,
    /// Velocity in world units per second.
    pub velocity: Vector,
    /// Whether the world's physics step integrates this entity.
    pub physics_enabled: bool,
    destroyed: bool,
}

impl Entity {
    /// Creates a live entity at `position` with zero velocity.
    pub fn new(id: EntityId, position: Vector) -> Self {
        Self {
            id,
            position,
            velocity: Vector::ZERO,
            physics_enabled: false,
            destroyed: false,
        }
    }

    /// Teleports the entity, bypassing collision.
    pub fn go_to(&mut self, position: Vector) {
        self.position = position;
    }

    /// Translates the entity unconditionally.
    pub fn translate(&mut self, displacement: Vector) {
        self.position += displacement;
    }

    /// Replaces the velocity.
    pub fn set_velocity(&mut self, velocity: Vector) {
        self.velocity = velocity;
    }

    /// Adds an instantaneous change to the velocity.
    pub fn add_force(&mut self, force: Vector) {
        self.velocity += force;
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Flags the entity for removal at the next sweep.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }
}
