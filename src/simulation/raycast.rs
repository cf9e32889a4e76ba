//! Nearest-hit ray queries against collidable bounding boxes.
//!
//! Rays use the slab method: each axis yields an entry/exit parameter pair,
//! and the ray hits the box where the intersection of those intervals starts.

use serde::{Deserialize, Serialize};

use super::collidable::IgnoreList;
use super::entity::EntityId;
use super::vector::Vector;
use super::world::World;

/// Closest intersection found by [`raycast`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// World position where the ray enters the box.
    pub position: Vector,
    /// Outward normal of the face the ray enters through.
    pub normal: Vector,
    /// Entity that was hit.
    pub entity: EntityId,
    /// Distance from the origin along the normalized direction.
    pub distance: f64,
}

/// Entry and exit parameters along one axis, plus the entry face's normal sign.
///
/// A ray parallel to the slab either spans all of it or misses it entirely.
fn slab(origin: f64, direction: f64, lo: f64, hi: f64) -> Option<(f64, f64, f64)> {
    if direction == 0.0 {
        return (lo..=hi)
            .contains(&origin)
            .then_some((f64::NEG_INFINITY, f64::INFINITY, 0.0));
    }
    let t1 = (lo - origin) / direction;
    let t2 = (hi - origin) / direction;
    if t1 <= t2 {
        Some((t1, t2, -1.0))
    } else {
        Some((t2, t1, 1.0))
    }
}

/// Casts a ray and returns the nearest box it enters within `max_distance`.
///
/// Collidables with collision disabled, flagged for destruction, or excluded
/// by `ignore` are skipped. A zero-length `direction` never hits. Boxes that
/// contain the origin are not reported. Among equally near boxes the one
/// latest in spawn order wins.
///
/// # Arguments
///
/// * `world` - World to query
/// * `origin` - Start of the ray
/// * `direction` - Ray direction, normalized internally
/// * `max_distance` - Longest accepted hit distance
/// * `ignore` - Filter list and mode, with the same meaning as for movement
pub fn raycast(
    world: &World,
    origin: Vector,
    direction: Vector,
    max_distance: f64,
    ignore: &IgnoreList,
) -> Option<RayHit> {
    let direction = direction.normalized()?;

    let mut closest = max_distance;
    let mut best = None;

    for collidable in world.collidables() {
        if !collidable.can_collide || collidable.body.is_destroyed() {
            continue;
        }
        if ignore.excludes(collidable.id()) {
            continue;
        }

        let bounds = collidable.bounds();
        let Some((tx_near, tx_far, nx)) = slab(origin.x, direction.x, bounds.min().x, bounds.max().x) else {
            continue;
        };
        let Some((ty_near, ty_far, ny)) = slab(origin.y, direction.y, bounds.min().y, bounds.max().y) else {
            continue;
        };

        let tmin = tx_near.max(ty_near);
        let tmax = tx_far.min(ty_far);

        // box behind the ray, no overlap, or origin inside the box
        if tmax < 0.0 || tmin > tmax || tmin < 0.0 {
            continue;
        }

        if tmin <= closest {
            closest = tmin;
            let normal = if tx_near >= ty_near {
                Vector::new(nx, 0.0)
            } else {
                Vector::new(0.0, ny)
            };
            best = Some(RayHit {
                position: origin + direction * tmin,
                normal,
                entity: collidable.id(),
                distance: tmin,
            });
        }
    }

    best
}
