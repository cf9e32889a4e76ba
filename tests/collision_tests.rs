#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use proptest::prelude::*;
use runner_evo::simulation::collidable::{Collidable, CollisionMode, FilterMode, IgnoreList, box_overlap};
use runner_evo::simulation::entity::{EntityId, Entity};
use runner_evo::simulation::mask::{AlphaMask, TextureId};
use runner_evo::simulation::tilemap::TileGrid;
use runner_evo::simulation::vector::Vector;
use runner_evo::simulation::world::World;

fn spawn_box(world: &mut World, pos: Vector, size: Vector) -> EntityId {
    world.spawn_collidable(|id| {
        let mut c = Collidable::new(id, pos, size, 0);
        c.set_collision(true, CollisionMode::Box);
        c
    })
}

fn spawn_masked(world: &mut World, pos: Vector, size: Vector, texture: &str) -> EntityId {
    world.spawn_collidable(|id| {
        let mut c = Collidable::new(id, pos, size, 0).with_texture(TextureId::new(texture));
        c.set_collision(true, CollisionMode::PixelMask);
        c
    })
}

fn position(world: &World, id: EntityId) -> Vector {
    world.entity(id).unwrap().position
}

#[test]
fn test_blocked_axis_reverts_and_stops() {
    let mut world = World::new(0.0);
    spawn_box(&mut world, Vector::new(15.0, 0.0), Vector::new(10.0, 10.0));
    let mover = spawn_box(&mut world, Vector::ZERO, Vector::new(10.0, 10.0));
    world.entity_mut(mover).unwrap().set_velocity(Vector::new(6.0, 0.0));

    world.move_entity(mover, Vector::new(6.0, 0.0)).unwrap();

    let body: &Entity = world.entity(mover).unwrap();
    assert_eq!(body.position, Vector::ZERO);
    assert_eq!(body.velocity, Vector::ZERO);
}

#[test]
fn test_x_resolves_before_y_at_corner() {
    let mut world = World::new(0.0);
    // diagonal block: clear on X alone, hit once Y is applied at the new X
    spawn_box(&mut world, Vector::new(12.0, 12.0), Vector::new(10.0, 10.0));
    let mover = spawn_box(&mut world, Vector::ZERO, Vector::new(10.0, 10.0));

    world.move_entity(mover, Vector::new(5.0, 5.0)).unwrap();

    assert_eq!(position(&world, mover), Vector::new(5.0, 0.0));
    assert_eq!(world.entity(mover).unwrap().velocity, Vector::ZERO);
}

#[test]
fn test_touching_edges_do_not_block() {
    let mut world = World::new(0.0);
    spawn_box(&mut world, Vector::new(20.0, 0.0), Vector::new(10.0, 10.0));
    let mover = spawn_box(&mut world, Vector::ZERO, Vector::new(10.0, 10.0));

    world.move_entity(mover, Vector::new(5.0, 0.0)).unwrap();

    assert_eq!(position(&world, mover), Vector::new(5.0, 0.0));
}

#[test]
fn test_disabled_collision_moves_through() {
    let mut world = World::new(0.0);
    spawn_box(&mut world, Vector::new(15.0, 0.0), Vector::new(10.0, 10.0));
    let ghost = world.spawn_collidable(|id| Collidable::new(id, Vector::ZERO, Vector::new(10.0, 10.0), 0));

    world.move_entity(ghost, Vector::new(15.0, 0.0)).unwrap();

    assert_eq!(position(&world, ghost), Vector::new(15.0, 0.0));
}

#[test]
fn test_filter_modes() {
    let mut world = World::new(0.0);
    let wall = spawn_box(&mut world, Vector::new(15.0, 0.0), Vector::new(10.0, 10.0));
    let mover = spawn_box(&mut world, Vector::ZERO, Vector::new(10.0, 10.0));

    world.collidable_mut(mover).unwrap().ignore = IgnoreList::with_entries(FilterMode::Blacklist, [wall]);
    world.move_entity(mover, Vector::new(6.0, 0.0)).unwrap();
    assert_eq!(position(&world, mover), Vector::new(6.0, 0.0));

    world.entity_mut(mover).unwrap().go_to(Vector::ZERO);
    world.collidable_mut(mover).unwrap().ignore = IgnoreList::with_entries(FilterMode::Whitelist, [wall]);
    world.move_entity(mover, Vector::new(6.0, 0.0)).unwrap();
    assert_eq!(position(&world, mover), Vector::ZERO);

    // empty whitelist tests against nothing
    world.collidable_mut(mover).unwrap().ignore = IgnoreList::new(FilterMode::Whitelist);
    world.move_entity(mover, Vector::new(6.0, 0.0)).unwrap();
    assert_eq!(position(&world, mover), Vector::new(6.0, 0.0));
}

#[test]
fn test_destroyed_entities_stop_blocking_before_sweep() {
    let mut world = World::new(0.0);
    let wall = spawn_box(&mut world, Vector::new(15.0, 0.0), Vector::new(10.0, 10.0));
    let mover = spawn_box(&mut world, Vector::ZERO, Vector::new(10.0, 10.0));

    world.destroy(wall);
    world.move_entity(mover, Vector::new(6.0, 0.0)).unwrap();

    assert_eq!(position(&world, mover), Vector::new(6.0, 0.0));
}

#[test]
fn test_unknown_entity_is_an_error() {
    let mut world = World::new(0.0);
    let a = spawn_box(&mut world, Vector::ZERO, Vector::new(1.0, 1.0));
    world.destroy(a);
    world.sweep();
    assert!(world.move_entity(a, Vector::new(1.0, 0.0)).is_err());
    assert!(world.overlaps(a, a).is_err());
}

#[test]
fn test_physics_lands_on_floor() {
    let mut world = World::new(3600.0);
    spawn_box(&mut world, Vector::new(0.0, 200.0), Vector::new(1000.0, 50.0));
    let faller = spawn_box(&mut world, Vector::new(0.0, 100.0), Vector::new(50.0, 50.0));
    world.entity_mut(faller).unwrap().physics_enabled = true;

    for _ in 0..120 {
        world.step_physics(1.0 / 60.0);
    }

    let body = world.entity(faller).unwrap();
    assert!(body.position.y <= 150.0);
    assert!(body.position.y > 140.0);
}

#[test]
fn test_pixel_masks_need_opaque_texels_on_both_sides() {
    let mut world = World::new(0.0);
    // left half opaque
    world
        .masks
        .insert(TextureId::new("half"), AlphaMask::from_fn(10, 10, |x, _| if x < 5 { 255 } else { 0 }));
    world.masks.insert(TextureId::new("full"), AlphaMask::opaque(10, 10));

    let a = spawn_masked(&mut world, Vector::ZERO, Vector::new(10.0, 10.0), "half");
    let b = spawn_masked(&mut world, Vector::new(8.0, 0.0), Vector::new(10.0, 10.0), "full");

    // boxes overlap on x in [3, 5), where `a` is transparent
    assert!(!world.overlaps(a, b).unwrap());

    world.entity_mut(b).unwrap().go_to(Vector::new(2.0, 0.0));
    assert!(world.overlaps(a, b).unwrap());
}

#[test]
fn test_pixel_mask_against_box_uses_masks() {
    let mut world = World::new(0.0);
    world.masks.insert(TextureId::new("full"), AlphaMask::opaque(4, 4));
    let a = spawn_masked(&mut world, Vector::ZERO, Vector::new(10.0, 10.0), "full");
    let b = world.spawn_collidable(|id| {
        let mut c = Collidable::new(id, Vector::new(8.0, 0.0), Vector::new(10.0, 10.0), 0)
            .with_texture(TextureId::new("full"));
        c.set_collision(true, CollisionMode::Box);
        c
    });
    assert!(world.overlaps(a, b).unwrap());
    assert!(world.overlaps(b, a).unwrap());
}

#[test]
fn test_missing_mask_never_blocks() {
    let mut world = World::new(0.0);
    let a = spawn_masked(&mut world, Vector::ZERO, Vector::new(10.0, 10.0), "unregistered");
    let b = spawn_masked(&mut world, Vector::new(2.0, 0.0), Vector::new(10.0, 10.0), "unregistered");
    assert!(!world.overlaps(a, b).unwrap());
}

#[test]
fn test_tilemap_blocks_only_on_solid_tiles() {
    let mut world = World::new(0.0);
    // 4x1 row of 10-unit tiles centred at the origin; only the third is solid
    let grid = TileGrid::new(4, 1, 10.0, vec![-1, -1, 0, -1]).unwrap();
    world.spawn_collidable(|id| Collidable::tilemap(id, Vector::ZERO, grid, 0));

    let mover = spawn_box(&mut world, Vector::new(-15.0, -20.0), Vector::new(4.0, 4.0));

    // down into the empty first tile
    world.move_entity(mover, Vector::new(0.0, 20.0)).unwrap();
    assert_eq!(position(&world, mover), Vector::new(-15.0, 0.0));

    // sideways into the solid third tile is refused
    world.move_entity(mover, Vector::new(20.0, 0.0)).unwrap();
    assert_eq!(position(&world, mover), Vector::new(-15.0, 0.0));

    // the second tile is empty
    world.move_entity(mover, Vector::new(10.0, 0.0)).unwrap();
    assert_eq!(position(&world, mover), Vector::new(-5.0, 0.0));
}

#[test]
fn test_moving_tilemap_is_blocked_by_box_under_solid_tile() {
    let mut world = World::new(0.0);
    let grid = TileGrid::new(4, 1, 10.0, vec![-1, -1, 0, -1]).unwrap();
    let map = world.spawn_collidable(|id| Collidable::tilemap(id, Vector::ZERO, grid, 0));
    // below the third tile once the map has moved 20 units down
    spawn_box(&mut world, Vector::new(5.0, 20.0), Vector::new(4.0, 4.0));

    world.move_entity(map, Vector::new(0.0, 20.0)).unwrap();

    assert_eq!(position(&world, map), Vector::ZERO);
}

#[test]
fn test_moving_tilemap_passes_box_under_empty_tile() {
    let mut world = World::new(0.0);
    let grid = TileGrid::new(4, 1, 10.0, vec![-1, -1, 0, -1]).unwrap();
    let map = world.spawn_collidable(|id| Collidable::tilemap(id, Vector::ZERO, grid, 0));
    spawn_box(&mut world, Vector::new(-15.0, 20.0), Vector::new(4.0, 4.0));

    world.move_entity(map, Vector::new(0.0, 20.0)).unwrap();

    assert_eq!(position(&world, map), Vector::new(0.0, 20.0));
}

#[test]
fn test_tilemap_overlap_is_symmetric() {
    let mut world = World::new(0.0);
    let grid = TileGrid::new(4, 1, 10.0, vec![-1, -1, 0, -1]).unwrap();
    let map = world.spawn_collidable(|id| Collidable::tilemap(id, Vector::ZERO, grid, 0));
    let on_solid = spawn_box(&mut world, Vector::new(5.0, 0.0), Vector::new(4.0, 4.0));
    let on_empty = spawn_box(&mut world, Vector::new(-15.0, 0.0), Vector::new(4.0, 4.0));

    assert!(world.overlaps(map, on_solid).unwrap());
    assert!(world.overlaps(on_solid, map).unwrap());
    assert!(!world.overlaps(map, on_empty).unwrap());
    assert!(!world.overlaps(on_empty, map).unwrap());
}

fn rect_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (-50.0..50.0f64, -50.0..50.0f64, 0.1..30.0f64, 0.1..30.0f64)
}

proptest! {
    #[test]
    fn box_overlap_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
        let first = Collidable::new(EntityId(0), Vector::new(a.0, a.1), Vector::new(a.2, a.3), 0);
        let second = Collidable::new(EntityId(1), Vector::new(b.0, b.1), Vector::new(b.2, b.3), 0);
        prop_assert_eq!(
            box_overlap(&first.bounds(), &second.bounds()),
            box_overlap(&second.bounds(), &first.bounds())
        );
    }
}
