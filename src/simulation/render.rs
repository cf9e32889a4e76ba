//! Boundary with the render collaborator.
//!
//! The simulation publishes one immutable snapshot per tick. A renderer on
//! another thread only ever sees whole snapshots, never a half-updated tick.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::mask::TextureId;
use super::vector::Vector;

/// One drawable entity as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    /// Entity the item was taken from.
    pub id: EntityId,
    /// Centre position in world space.
    pub position: Vector,
    /// Width and height in world units.
    pub size: Vector,
    /// Draw order.
    pub z_index: i32,
    /// Texture to draw, if any.
    pub texture: Option<TextureId>,
}

/// Point-in-time snapshots shared between the simulation and a renderer.
#[derive(Debug, Clone, Default)]
pub struct RenderFeed {
    latest: Arc<Mutex<Arc<[RenderItem]>>>,
}

impl RenderFeed {
    /// Creates a feed holding an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current snapshot.
    pub fn publish(&self, items: Vec<RenderItem>) {
        let snapshot: Arc<[RenderItem]> = items.into();
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<[RenderItem]> {
        Arc::clone(&self.latest.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
