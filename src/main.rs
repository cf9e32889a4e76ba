use std::path::{Path, PathBuf};

use macroquad::prelude::*;
use runner_evo::simulation::agent::ControlInput;
use runner_evo::simulation::brain::{BrainRecord, NeuralNet};
use runner_evo::simulation::entity::EntityId;
use runner_evo::simulation::error::Result;
use runner_evo::simulation::params::Params;
use runner_evo::simulation::population::Population;
use runner_evo::simulation::vector::Vector;
use tracing_subscriber::EnvFilter;

mod graphics;

const PARAMS_FILE: &str = "runner.json";
const DEFAULT_BRAIN_FILE: &str = "brain.json";
/// Camera pan speed in world units per second.
const CAMERA_SPEED: f64 = 300.0;
/// Longest tick fed to the simulation.
const MAX_TICK: f64 = 1.0 / 20.0;

fn load_params() -> Params {
    let path = std::env::args().nth(1).unwrap_or_else(|| PARAMS_FILE.to_string());
    match Params::load(&path) {
        Ok(params) => params,
        Err(err) => {
            tracing::warn!(%path, %err, "using default parameters");
            Params::default()
        }
    }
}

fn brain_file_name() -> PathBuf {
    PathBuf::from(format!("brain_{}.json", chrono::Local::now().format("%Y%m%d_%H%M%S")))
}

fn load_population(params: &Params, path: &Path) -> Result<Population> {
    let record = BrainRecord::load(path)?;
    let (brain, generation) = NeuralNet::from_record(record, params.mutation_rate)?;
    Population::from_brain(params.clone(), brain, generation)
}

fn spawn_camera(population: &mut Population, at: Vector) -> EntityId {
    population.world_mut().spawn_entity(at)
}

/// Unit pan direction for the pressed arrow keys; opposite keys cancel.
fn pan_from_keys(left: bool, right: bool, up: bool, down: bool) -> Vector {
    let axis = |negative: bool, positive: bool| f64::from(i8::from(positive) - i8::from(negative));
    let mut pan = Vector::new(axis(left, right), axis(up, down));
    pan.unit();
    pan
}

fn pan_direction() -> Vector {
    pan_from_keys(
        is_key_down(KeyCode::Left),
        is_key_down(KeyCode::Right),
        is_key_down(KeyCode::Up),
        is_key_down(KeyCode::Down),
    )
}

#[macroquad::main("Runner Evo")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("runner_evo=info")))
        .init();

    let params = load_params();
    let mut population = match Population::new(params.clone()) {
        Ok(population) => population,
        Err(err) => {
            tracing::error!(%err, "cannot start simulation");
            return;
        }
    };
    let mut feed = population.feed();
    let mut camera = spawn_camera(&mut population, Vector::ZERO);
    let mut last_saved: Option<PathBuf> = None;

    tracing::info!("Starting runner simulation");

    loop {
        let dt = f64::from(get_frame_time()).min(MAX_TICK);

        if let Err(err) = population.world_mut().move_entity(camera, pan_direction() * (CAMERA_SPEED * dt)) {
            tracing::warn!(%err, "camera lost, respawning");
            camera = spawn_camera(&mut population, Vector::ZERO);
        }

        if is_key_pressed(KeyCode::M) {
            let enabled = !population.manual_override();
            population.set_manual_override(enabled);
        }
        if is_key_pressed(KeyCode::L) {
            let show = !population.show_lesser();
            population.set_show_lesser(show);
        }
        if is_key_pressed(KeyCode::S) {
            let path = brain_file_name();
            match population.save_best(&path) {
                Ok(()) => last_saved = Some(path),
                Err(err) => tracing::warn!(%err, "saving brain failed"),
            }
        }
        if is_key_pressed(KeyCode::O) {
            let path = last_saved.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_BRAIN_FILE));
            match load_population(&params, &path) {
                Ok(loaded) => {
                    let at = population.world().entity(camera).map(|e| e.position).unwrap_or_default();
                    population = loaded;
                    feed = population.feed();
                    camera = spawn_camera(&mut population, at);
                }
                Err(err) => tracing::warn!(path = %path.display(), %err, "loading brain failed"),
            }
        }

        let input = ControlInput {
            jump: is_key_down(KeyCode::Space),
            duck: is_key_down(KeyCode::LeftShift),
        };

        if let Err(err) = population.update(dt, input) {
            tracing::error!(%err, "simulation stopped");
            break;
        }
        population.publish();

        clear_background(WHITE);
        let camera_pos = population.world().entity(camera).map(|e| e.position).unwrap_or_default();
        graphics::draw_items(&feed.latest(), camera_pos);
        graphics::draw_status(&[
            population.status().to_string(),
            "space: jump  shift: duck  m: manual  l: show lesser  s: save  o: load  arrows: pan".to_string(),
        ]);

        next_frame().await
    }
}
