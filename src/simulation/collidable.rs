//! Collidable component and pairwise overlap tests.
//!
//! A [`Collidable`] wraps an [`Entity`] with a size, draw order and collision
//! settings. Which overlap test applies to a pair is decided by matching both
//! parties' [`CollisionMode`]s:
//!
//! - either party a tilemap: the other party's rectangle against the grid
//! - both boxes: strict axis-aligned rectangle overlap
//! - otherwise (at least one pixel mask): texel-by-texel opacity test

use std::collections::HashSet;

use geo::{Rect, coord};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId};
use super::mask::{MaskStore, TextureId};
use super::tilemap::TileGrid;
use super::vector::Vector;

/// How a collidable takes part in overlap tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CollisionMode {
    /// Axis-aligned bounding box.
    Box,
    /// Opaque texels of the collidable's texture mask.
    PixelMask,
    /// Solid cells of a tile grid spanning the collidable's bounds.
    Tilemap(TileGrid),
}

/// Whether an [`IgnoreList`] names the entities to skip or the only ones to test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Skip the listed entities.
    #[default]
    Blacklist,
    /// Skip every entity that is not listed.
    Whitelist,
}

/// Per-entity filter deciding which other entities collision and ray queries consider.
///
/// Entries are non-owning handles. The world purges handles of swept
/// entities from every list, so an entry never outlives its target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IgnoreList {
    /// Interpretation of `entries`.
    pub mode: FilterMode,
    entries: HashSet<EntityId>,
}

impl IgnoreList {
    /// An empty list in the given mode.
    pub fn new(mode: FilterMode) -> Self {
        Self {
            mode,
            entries: HashSet::new(),
        }
    }

    /// A list in the given mode holding `entries`.
    pub fn with_entries(mode: FilterMode, entries: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            mode,
            entries: entries.into_iter().collect(),
        }
    }

    /// Adds an entry.
    pub fn insert(&mut self, id: EntityId) {
        self.entries.insert(id);
    }

    /// Removes an entry, returning whether it was present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        self.entries.remove(&id)
    }

    /// Whether `id` is listed.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains(&id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether queries filtered by this list skip `id`.
    pub fn excludes(&self, id: EntityId) -> bool {
        match self.mode {
            FilterMode::Blacklist => self.entries.contains(&id),
            FilterMode::Whitelist => !self.entries.contains(&id),
        }
    }
}

/// An entity that participates in overlap tests and movement blocking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collidable {
    /// Position, velocity and lifecycle state.
    pub body: Entity,
    /// Width and height in world units.
    pub size: Vector,
    /// Draw order; higher values are drawn later.
    pub z_index: i32,
    /// Whether the renderer should draw it.
    pub visible: bool,
    /// Whether it blocks movement and can be hit.
    pub can_collide: bool,
    /// Overlap test used for this collidable.
    pub mode: CollisionMode,
    /// Filter applied when this collidable moves or casts rays.
    pub ignore: IgnoreList,
    /// Texture drawn by the renderer and sampled for pixel-mask tests.
    pub texture: Option<TextureId>,
}

impl Collidable {
    /// Creates a visible, non-colliding box at `position`.
    pub fn new(id: EntityId, position: Vector, size: Vector, z_index: i32) -> Self {
        Self {
            body: Entity::new(id, position),
            size,
            z_index,
            visible: true,
            can_collide: false,
            mode: CollisionMode::Box,
            ignore: IgnoreList::default(),
            texture: None,
        }
    }

    /// Creates a colliding tilemap whose size is taken from the grid.
    pub fn tilemap(id: EntityId, position: Vector, grid: TileGrid, z_index: i32) -> Self {
        let size = grid.world_size();
        let mut map = Self::new(id, position, size, z_index);
        map.can_collide = true;
        map.mode = CollisionMode::Tilemap(grid);
        map
    }

    /// Sets the texture, returning `self` for chaining.
    #[must_use]
    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Enables or disables collision and sets the overlap test.
    pub fn set_collision(&mut self, enabled: bool, mode: CollisionMode) {
        self.can_collide = enabled;
        self.mode = mode;
    }

    /// Handle of the underlying entity.
    pub fn id(&self) -> EntityId {
        self.body.id
    }

    /// Centre position.
    pub fn position(&self) -> Vector {
        self.body.position
    }

    /// Bounding rectangle if the centre were at `center`.
    pub fn bounds_at(&self, center: Vector) -> Rect<f64> {
        let half_w = self.size.x / 2.0;
        let half_h = self.size.y / 2.0;
        Rect::new(
            coord! { x: center.x - half_w, y: center.y - half_h },
            coord! { x: center.x + half_w, y: center.y + half_h },
        )
    }

    /// Bounding rectangle at the current position.
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds_at(self.body.position)
    }

    /// Whether this collidable, centred at `at`, overlaps `other` in its current place.
    ///
    /// A non-colliding `other` never overlaps.
    pub fn overlaps_at(&self, at: Vector, other: &Collidable, masks: &MaskStore) -> bool {
        if !other.can_collide {
            return false;
        }

        match (&self.mode, &other.mode) {
            (_, CollisionMode::Tilemap(grid)) => {
                let rect = self.bounds_at(at);
                grid.overlaps_rect(other.position(), to_vector(rect.min()), to_vector(rect.max()))
            }
            (CollisionMode::Tilemap(grid), _) => {
                let rect = other.bounds();
                grid.overlaps_rect(at, to_vector(rect.min()), to_vector(rect.max()))
            }
            (CollisionMode::Box, CollisionMode::Box) => box_overlap(&self.bounds_at(at), &other.bounds()),
            (CollisionMode::Box, CollisionMode::PixelMask)
            | (CollisionMode::PixelMask, CollisionMode::Box)
            | (CollisionMode::PixelMask, CollisionMode::PixelMask) => {
                pixel_overlap(self, at, other, masks)
            }
        }
    }
}

fn to_vector(c: geo::Coord<f64>) -> Vector {
    Vector::new(c.x, c.y)
}

/// Strict rectangle overlap: touching edges do not count.
pub fn box_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x < b.max().x && a.max().x > b.min().x && a.min().y < b.max().y && a.max().y > b.min().y
}

/// Texel opacity test over the integer pixels of the two rectangles' overlap.
///
/// Each world pixel is mapped into both textures by scaling from world size
/// to mask resolution. Either party lacking a texture or registered mask
/// makes the pair non-blocking.
fn pixel_overlap(a: &Collidable, at: Vector, b: &Collidable, masks: &MaskStore) -> bool {
    let (Some(mask_a), Some(mask_b)) = (
        a.texture.as_ref().and_then(|t| masks.get(t)),
        b.texture.as_ref().and_then(|t| masks.get(t)),
    ) else {
        tracing::debug!(a = ?a.id(), b = ?b.id(), "pixel-mask test without registered masks");
        return false;
    };

    let rect_a = a.bounds_at(at);
    let rect_b = b.bounds();

    let ox1 = rect_a.min().x.max(rect_b.min().x) as i64;
    let oy1 = rect_a.min().y.max(rect_b.min().y) as i64;
    let ox2 = rect_a.max().x.min(rect_b.max().x) as i64;
    let oy2 = rect_a.max().y.min(rect_b.max().y) as i64;

    if ox1 >= ox2 || oy1 >= oy2 {
        return false;
    }

    let texel = |world: f64, origin: f64, texels: usize, extent: f64| -> i64 {
        ((world - origin) * texels as f64 / extent) as i64
    };

    for y in oy1..oy2 {
        for x in ox1..ox2 {
            let (wx, wy) = (x as f64, y as f64);
            let ax = texel(wx, rect_a.min().x, mask_a.width(), a.size.x);
            let ay = texel(wy, rect_a.min().y, mask_a.height(), a.size.y);
            let bx = texel(wx, rect_b.min().x, mask_b.width(), b.size.x);
            let by = texel(wy, rect_b.min().y, mask_b.height(), b.size.y);

            if ax < 0 || ay < 0 || bx < 0 || by < 0 {
                continue;
            }

            if mask_a.is_opaque(ax as usize, ay as usize) && mask_b.is_opaque(bx as usize, by as usize) {
                return true;
            }
        }
    }

    false
}
