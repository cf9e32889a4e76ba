//! Arena of live entities, owned by the top-level driver.
//!
//! The world manages every simulated object. It handles:
//! - Spawning entities and handing out stable [`EntityId`] handles
//! - Deferred destruction: `destroy` flags, `sweep` removes once per tick
//! - Collision-resolved movement, one axis at a time
//! - Physics integration with a single downward acceleration
//! - Z-ordered render snapshots
//!
//! Collision scans borrow the arena immutably while the mover's new position
//! is computed, so a scan always sees one consistent state of the tick.

use std::collections::{HashMap, HashSet};

use super::collidable::Collidable;
use super::entity::{Entity, EntityId};
use super::error::{Error, Result};
use super::mask::MaskStore;
use super::render::RenderItem;
use super::vector::Vector;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Object(usize),
    Collidable(usize),
}

/// The simulation context: all entities plus the shared physics settings.
#[derive(Debug, Clone)]
pub struct World {
    objects: Vec<Entity>,
    collidables: Vec<Collidable>,
    lookup: HashMap<EntityId, Slot>,
    next_id: u64,
    /// Downward acceleration in world units per second squared.
    pub gravity: f64,
    /// Alpha masks used by pixel-mask collision.
    pub masks: MaskStore,
}

impl World {
    /// Creates an empty world.
    pub fn new(gravity: f64) -> Self {
        Self {
            objects: Vec::new(),
            collidables: Vec::new(),
            lookup: HashMap::new(),
            next_id: 0,
            gravity,
            masks: MaskStore::new(),
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Spawns a plain, non-collidable entity.
    pub fn spawn_entity(&mut self, position: Vector) -> EntityId {
        let id = self.allocate_id();
        self.lookup.insert(id, Slot::Object(self.objects.len()));
        self.objects.push(Entity::new(id, position));
        id
    }

    /// Spawns a collidable built by `build` from its freshly assigned handle.
    pub fn spawn_collidable(&mut self, build: impl FnOnce(EntityId) -> Collidable) -> EntityId {
        let id = self.allocate_id();
        let mut collidable = build(id);
        collidable.body.id = id;
        self.lookup.insert(id, Slot::Collidable(self.collidables.len()));
        self.collidables.push(collidable);
        id
    }

    /// Whether `id` names an entity that has not been swept yet.
    pub fn contains(&self, id: EntityId) -> bool {
        self.lookup.contains_key(&id)
    }

    /// Entity state of any kind of entity.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        match self.lookup.get(&id)? {
            Slot::Object(i) => self.objects.get(*i),
            Slot::Collidable(i) => self.collidables.get(*i).map(|c| &c.body),
        }
    }

    /// Mutable entity state of any kind of entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match *self.lookup.get(&id)? {
            Slot::Object(i) => self.objects.get_mut(i),
            Slot::Collidable(i) => self.collidables.get_mut(i).map(|c| &mut c.body),
        }
    }

    /// The collidable named by `id`, if it is one.
    pub fn collidable(&self, id: EntityId) -> Option<&Collidable> {
        match self.lookup.get(&id)? {
            Slot::Collidable(i) => self.collidables.get(*i),
            Slot::Object(_) => None,
        }
    }

    /// Mutable access to the collidable named by `id`.
    pub fn collidable_mut(&mut self, id: EntityId) -> Option<&mut Collidable> {
        match *self.lookup.get(&id)? {
            Slot::Collidable(i) => self.collidables.get_mut(i),
            Slot::Object(_) => None,
        }
    }

    /// All collidables that have not been swept, in spawn order.
    pub fn collidables(&self) -> &[Collidable] {
        &self.collidables
    }

    /// Number of entities of any kind that have not been swept.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Whether the world holds no entities.
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Flags an entity for removal at the next [`sweep`](Self::sweep).
    ///
    /// Unknown handles are ignored; destroying twice is harmless.
    pub fn destroy(&mut self, id: EntityId) {
        if let Some(entity) = self.entity_mut(id) {
            entity.destroy();
        }
    }

    /// Removes every flagged entity and purges its handle from all ignore lists.
    ///
    /// Returns the number of entities removed.
    pub fn sweep(&mut self) -> usize {
        let doomed: HashSet<EntityId> = self
            .objects
            .iter()
            .filter(|e| e.is_destroyed())
            .map(|e| e.id)
            .chain(
                self.collidables
                    .iter()
                    .filter(|c| c.body.is_destroyed())
                    .map(Collidable::id),
            )
            .collect();

        if doomed.is_empty() {
            return 0;
        }

        self.objects.retain(|e| !e.is_destroyed());
        self.collidables.retain(|c| !c.body.is_destroyed());

        for collidable in &mut self.collidables {
            for id in &doomed {
                collidable.ignore.remove(*id);
            }
        }

        self.rebuild_lookup();
        doomed.len()
    }

    fn rebuild_lookup(&mut self) {
        self.lookup.clear();
        for (i, e) in self.objects.iter().enumerate() {
            self.lookup.insert(e.id, Slot::Object(i));
        }
        for (i, c) in self.collidables.iter().enumerate() {
            self.lookup.insert(c.id(), Slot::Collidable(i));
        }
    }

    /// Whether the collidable at `index`, placed at `at`, hits anything it is not filtering out.
    fn blocked_at(&self, index: usize, at: Vector) -> bool {
        let mover = &self.collidables[index];
        self.collidables.iter().enumerate().any(|(i, other)| {
            i != index
                && !other.body.is_destroyed()
                && !mover.ignore.excludes(other.id())
                && mover.overlaps_at(at, other, &self.masks)
        })
    }

    /// Whether the collidable `id`, if centred at `at`, would hit anything its filter admits.
    pub fn is_colliding_at(&self, id: EntityId, at: Vector) -> Result<bool> {
        match self.lookup.get(&id) {
            Some(Slot::Collidable(i)) => Ok(self.collidables[*i].can_collide && self.blocked_at(*i, at)),
            Some(Slot::Object(_)) => Ok(false),
            None => Err(Error::UnknownEntity(id)),
        }
    }

    /// Moves an entity by `displacement`.
    ///
    /// Plain entities and collidables with collision disabled translate
    /// unconditionally. Otherwise X is resolved first, then Y at the
    /// already-resolved X. A blocked axis keeps its old coordinate and zeroes
    /// the velocity.
    pub fn move_entity(&mut self, id: EntityId, displacement: Vector) -> Result<()> {
        let index = match self.lookup.get(&id) {
            Some(Slot::Collidable(i)) => *i,
            Some(Slot::Object(i)) => {
                self.objects[*i].translate(displacement);
                return Ok(());
            }
            None => return Err(Error::UnknownEntity(id)),
        };

        let mover = &self.collidables[index];
        if !mover.can_collide {
            self.collidables[index].body.translate(displacement);
            return Ok(());
        }

        let start = mover.position();
        let target = start + displacement;
        let mut resolved = start;
        let mut blocked = false;

        if self.blocked_at(index, Vector::new(target.x, resolved.y)) {
            blocked = true;
        } else {
            resolved.x = target.x;
        }

        if self.blocked_at(index, Vector::new(resolved.x, target.y)) {
            blocked = true;
        } else {
            resolved.y = target.y;
        }

        let body = &mut self.collidables[index].body;
        body.go_to(resolved);
        if blocked {
            body.set_velocity(Vector::ZERO);
        }
        Ok(())
    }

    /// Whether `a`, in its current place, overlaps `b` under the pair's collision modes.
    pub fn overlaps(&self, a: EntityId, b: EntityId) -> Result<bool> {
        let first = self.collidable(a).ok_or(Error::UnknownEntity(a))?;
        let second = self.collidable(b).ok_or(Error::UnknownEntity(b))?;
        Ok(first.overlaps_at(first.position(), second, &self.masks))
    }

    /// Integrates every physics-enabled, non-destroyed entity over `dt` seconds.
    ///
    /// Each entity moves by its velocity first and is then accelerated by gravity.
    pub fn step_physics(&mut self, dt: f64) {
        let gravity = Vector::new(0.0, self.gravity * dt);

        for object in &mut self.objects {
            if object.physics_enabled && !object.is_destroyed() {
                object.translate(object.velocity * dt);
                object.add_force(gravity);
            }
        }

        let movers: Vec<EntityId> = self
            .collidables
            .iter()
            .filter(|c| c.body.physics_enabled && !c.body.is_destroyed())
            .map(Collidable::id)
            .collect();

        for id in movers {
            let Some(velocity) = self.entity(id).map(|e| e.velocity) else {
                continue;
            };
            if self.move_entity(id, velocity * dt).is_ok() {
                if let Some(body) = self.entity_mut(id) {
                    body.add_force(gravity);
                }
            }
        }
    }

    /// Visible, non-destroyed collidables ordered by z-index (stable for ties).
    pub fn render_snapshot(&self) -> Vec<RenderItem> {
        let mut items: Vec<RenderItem> = self
            .collidables
            .iter()
            .filter(|c| c.visible && !c.body.is_destroyed())
            .map(|c| RenderItem {
                id: c.id(),
                position: c.position(),
                size: c.size,
                z_index: c.z_index,
                texture: c.texture.clone(),
            })
            .collect();
        items.sort_by_key(|item| item.z_index);
        items
    }
}
