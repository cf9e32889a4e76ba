//! # Runner Evo - Neuroevolution Runner Simulation
//!
//! A population of runners, each driven by a small neural network, dodges
//! scrolling obstacles. When every runner has crashed, the population is
//! ranked by survival time and the next generation is bred from the best.
//!
//! ## Features
//!
//! - Arena world with stable entity handles and deferred destruction
//! - Axis-separated collision resolution (box, pixel-mask and tilemap tests)
//! - Slab-method ray queries for ground sensing
//! - Neural network brains (MLP with tanh activation)
//! - Elitist genetic algorithm with gaussian mutation
//! - Copy-on-read render snapshots for a concurrent renderer
//! - Save/load of trained brains
//!
//! ## Core Modules
//!
//! - [`simulation::world`] - Entity arena, movement and physics
//! - [`simulation::raycast`] - Nearest-hit ray queries
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::agent`] - Runner perception, decision and action
//! - [`simulation::evolution`] - Selection and reproduction
//! - [`simulation::population`] - Generation state machine

/// Core simulation logic and data structures.
pub mod simulation {
    /// Runner agents and their obstacles.
    pub mod agent;
    /// Neural network implementation for agent brains.
    pub mod brain;
    /// Collidable component, ignore lists and overlap tests.
    pub mod collidable;
    /// Base entity state and handles.
    pub mod entity;
    /// Error type shared by the simulation.
    pub mod error;
    /// Elitist selection and mutated reproduction.
    pub mod evolution;
    /// Texture handles and alpha masks.
    pub mod mask;
    /// Simulation parameters.
    pub mod params;
    /// Generation state machine over a population of agents.
    pub mod population;
    /// Ray queries against collidable boxes.
    pub mod raycast;
    /// Render snapshots shared with the host.
    pub mod render;
    /// Tile grids for tilemap colliders.
    ///
    /// A [`tilemap::TileGrid`] is attached to a collidable through
    /// [`collidable::CollisionMode::Tilemap`].
    pub mod tilemap;
    /// Two-dimensional vectors.
    pub mod vector;
    /// Entity arena and physics.
    pub mod world;
}
