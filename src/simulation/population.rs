//! Generation state machine driving every agent.
//!
//! The population owns the [`World`], the floor, the agents and the single
//! random source. A generation runs until every agent has died; the same
//! tick then breeds the next generation, which starts running immediately.

use std::fmt;
use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::agent::{Agent, ControlInput, INPUT_SIZE, OUTPUT_SIZE};
use super::brain::NeuralNet;
use super::collidable::{Collidable, CollisionMode};
use super::entity::EntityId;
use super::error::{Error, Result};
use super::evolution::EvolutionEngine;
use super::mask::TextureId;
use super::params::Params;
use super::render::RenderFeed;
use super::world::World;

/// Draw order of the floor.
pub const FLOOR_Z: i32 = 100;

/// One-line summary of a running population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    /// Current generation, starting at 1.
    pub generation: u32,
    /// Best fitness seen in any generation.
    pub high_score: f64,
    /// Agents still running.
    pub alive: usize,
    /// Agents in the generation.
    pub population: usize,
    /// Whether agents other than the best are drawn.
    pub show_lesser: bool,
    /// Whether the player controls every agent.
    pub manual_override: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generation: {} | High score: {:.2} | Alive: {}/{} | Show lesser: {}",
            self.generation, self.high_score, self.alive, self.population, self.show_lesser
        )?;
        if self.manual_override {
            write!(f, " | MANUAL")?;
        }
        Ok(())
    }
}

/// A generation of agents sharing one world.
#[derive(Debug)]
pub struct Population {
    params: Params,
    world: World,
    floor: EntityId,
    agents: Vec<Agent>,
    engine: EvolutionEngine,
    rng: ChaCha8Rng,
    generation: u32,
    high_score: f64,
    best: usize,
    show_lesser: bool,
    manual_override: bool,
    feed: RenderFeed,
}

impl Population {
    /// Starts generation 1 from a freshly initialized base brain.
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        let mut rng = seeded_rng(&params);
        let base = NeuralNet::new(&params.layer_sizes, params.mutation_rate, &mut rng)?;
        Self::build(params, base, 1, rng)
    }

    /// Starts at `generation` from `brain`; every agent gets its own mutated clone.
    pub fn from_brain(params: Params, brain: NeuralNet, generation: u32) -> Result<Self> {
        params.validate()?;
        let rng = seeded_rng(&params);
        Self::build(params, brain, generation, rng)
    }

    fn build(params: Params, base: NeuralNet, generation: u32, mut rng: ChaCha8Rng) -> Result<Self> {
        if base.input_size() != INPUT_SIZE {
            return Err(Error::InputLength {
                expected: INPUT_SIZE,
                found: base.input_size(),
            });
        }
        if base.layer_sizes().last().is_none_or(|&n| n < OUTPUT_SIZE) {
            return Err(Error::invalid("brain must provide jump and duck outputs"));
        }

        let mut world = World::new(params.gravity);
        let floor = world.spawn_collidable(|id| {
            let mut floor = Collidable::new(id, params.floor_position, params.floor_size, FLOOR_Z)
                .with_texture(TextureId::new("floor"));
            floor.set_collision(true, CollisionMode::Box);
            floor
        });

        let agents = (0..params.population_size)
            .map(|_| {
                let mut brain = base.clone();
                brain.mutate(&mut rng);
                Agent::spawn(&mut world, &params, floor, brain, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(generation, population = params.population_size, "population started");

        Ok(Self {
            engine: EvolutionEngine::from_params(&params),
            params,
            world,
            floor,
            agents,
            rng,
            generation,
            high_score: 0.0,
            best: 0,
            show_lesser: true,
            manual_override: false,
            feed: RenderFeed::new(),
        })
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// `input` is applied to every agent only while manual override is on.
    /// If the tick leaves no agent alive, the next generation is bred and
    /// spawned before returning.
    pub fn update(&mut self, dt: f64, input: ControlInput) -> Result<()> {
        let manual = self.manual_override.then_some(input);

        for agent in &mut self.agents {
            agent.update(&mut self.world, &self.params, dt, &mut self.rng, manual)?;
        }
        self.world.step_physics(dt);
        self.world.sweep();

        self.track_best();

        if !self.is_running() {
            self.next_generation()?;
        }
        self.apply_visibility();
        Ok(())
    }

    fn track_best(&mut self) {
        let mut best: Option<usize> = None;
        for (i, agent) in self.agents.iter().enumerate() {
            if agent.is_alive() && best.is_none_or(|b| agent.fitness() > self.agents[b].fitness()) {
                best = Some(i);
            }
        }
        if let Some(i) = best {
            self.best = i;
        }
        let top = self.agents.iter().map(Agent::fitness).fold(0.0, f64::max);
        self.high_score = self.high_score.max(top);
    }

    fn next_generation(&mut self) -> Result<()> {
        let brains = self.engine.next_generation(&self.agents, &mut self.rng);

        for agent in &mut self.agents {
            if agent.is_alive() {
                agent.kill(&mut self.world);
            }
        }
        self.world.sweep();

        self.agents = brains
            .into_iter()
            .map(|brain| Agent::spawn(&mut self.world, &self.params, self.floor, brain, &mut self.rng))
            .collect::<Result<Vec<_>>>()?;
        self.generation += 1;
        self.best = 0;

        tracing::info!(
            generation = self.generation,
            high_score = self.high_score,
            elites = self.engine.elite_count(self.agents.len()),
            "generation started"
        );
        Ok(())
    }

    fn apply_visibility(&mut self) {
        for (i, agent) in self.agents.iter().enumerate() {
            if agent.is_alive() {
                agent.set_visible(&mut self.world, self.show_lesser || i == self.best);
            }
        }
    }

    /// Whether any agent of the current generation is still alive.
    pub fn is_running(&self) -> bool {
        self.agents.iter().any(Agent::is_alive)
    }

    /// Current generation number.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Agents of the current generation.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of agents still alive.
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// The living agent with the highest fitness, first in order on ties.
    pub fn best_agent(&self) -> Option<&Agent> {
        self.agents.get(self.best)
    }

    /// Highest fitness reached in any generation so far.
    pub fn high_score(&self) -> f64 {
        self.high_score
    }

    /// Summary for the host's status line.
    pub fn status(&self) -> Status {
        Status {
            generation: self.generation,
            high_score: self.high_score,
            alive: self.alive_count(),
            population: self.agents.len(),
            show_lesser: self.show_lesser,
            manual_override: self.manual_override,
        }
    }

    /// Whether agents other than the best are drawn.
    pub fn show_lesser(&self) -> bool {
        self.show_lesser
    }

    /// Shows or hides every agent but the best. Hidden agents keep running.
    pub fn set_show_lesser(&mut self, show: bool) {
        self.show_lesser = show;
        self.apply_visibility();
    }

    /// Whether player input drives the agents.
    pub fn manual_override(&self) -> bool {
        self.manual_override
    }

    /// Hands jump/duck decisions to the player (`true`) or back to the brains.
    pub fn set_manual_override(&mut self, enabled: bool) {
        self.manual_override = enabled;
    }

    /// The simulated world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for registering masks and the host's own entities.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Handle of the floor collider.
    pub fn floor(&self) -> EntityId {
        self.floor
    }

    /// Parameters this population runs with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Feed that receives a snapshot on every [`publish`](Self::publish).
    pub fn feed(&self) -> RenderFeed {
        self.feed.clone()
    }

    /// Publishes the current render snapshot.
    pub fn publish(&self) {
        self.feed.publish(self.world.render_snapshot());
    }

    /// Saves the best agent's brain tagged with the current generation.
    pub fn save_best(&self, path: impl AsRef<Path>) -> Result<()> {
        let best = self
            .best_agent()
            .ok_or_else(|| Error::invalid("population has no agents"))?;
        best.brain().to_record(self.generation).save(path)
    }
}

fn seeded_rng(params: &Params) -> ChaCha8Rng {
    params
        .seed
        .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
}
