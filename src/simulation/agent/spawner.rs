//! Per-agent obstacle spawn timer.

use rand::Rng;

use super::super::error::Result;
use super::super::params::{ObstacleSpec, Params};

/// The two obstacle shapes an agent can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Ground obstacle, must be jumped.
    Cactus,
    /// Airborne obstacle, can be ducked under.
    Bird,
}

impl ObstacleKind {
    /// Draws a kind, bird with probability `params.bird_probability`.
    ///
    /// # Panics
    ///
    /// Panics if the bird probability lies outside `[0, 1]`; validated
    /// [`Params`] never do.
    pub fn choose<R: Rng + ?Sized>(params: &Params, rng: &mut R) -> Self {
        if rng.gen_bool(params.bird_probability) {
            Self::Bird
        } else {
            Self::Cactus
        }
    }

    /// Shape and placement of this kind.
    pub fn spec(self, params: &Params) -> &ObstacleSpec {
        match self {
            Self::Cactus => &params.cactus,
            Self::Bird => &params.bird,
        }
    }
}

/// Countdown to the next obstacle.
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    timer: f64,
    next_interval: f64,
}

impl Spawner {
    /// Starts a timer whose first interval is drawn at the start speed.
    ///
    /// Fails if `params` do not validate, so later ticks always draw from a
    /// non-empty window.
    pub fn new<R: Rng + ?Sized>(params: &Params, rng: &mut R) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            timer: 0.0,
            next_interval: draw_interval(params.start_speed, params, rng),
        })
    }

    /// Seconds elapsed since the last spawn.
    pub fn timer(&self) -> f64 {
        self.timer
    }

    /// Delay the current countdown runs to.
    pub fn next_interval(&self) -> f64 {
        self.next_interval
    }

    /// Advances the timer by `dt` and returns a kind to spawn once it elapses.
    ///
    /// On a spawn the timer restarts with a fresh interval, whose lower bound
    /// shrinks once `speed` has passed the fast-spawn threshold. `params`
    /// must be the validated set the spawner was created with.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f64, speed: f64, params: &Params, rng: &mut R) -> Option<ObstacleKind> {
        self.timer += dt;
        if self.timer < self.next_interval {
            return None;
        }
        self.timer = 0.0;
        self.next_interval = draw_interval(speed, params, rng);
        Some(ObstacleKind::choose(params, rng))
    }
}

fn draw_interval<R: Rng + ?Sized>(speed: f64, params: &Params, rng: &mut R) -> f64 {
    let min = if speed < params.fast_spawn_speed {
        params.fast_spawn_min_interval
    } else {
        params.spawn_min_interval
    };
    rng.gen_range(min..params.spawn_max_interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn interval_stays_in_window() {
        let params = Params::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let slow = draw_interval(params.start_speed, &params, &mut rng);
            assert!((params.spawn_min_interval..params.spawn_max_interval).contains(&slow));
            let fast = draw_interval(params.min_speed, &params, &mut rng);
            assert!((params.fast_spawn_min_interval..params.spawn_max_interval).contains(&fast));
        }
    }

    #[test]
    fn spawns_once_interval_elapses() {
        let params = Params::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut spawner = Spawner::new(&params, &mut rng).unwrap();
        let wait = spawner.next_interval();

        assert!(spawner.tick(wait / 2.0, params.start_speed, &params, &mut rng).is_none());
        assert!(spawner.tick(wait, params.start_speed, &params, &mut rng).is_some());
        assert_eq!(spawner.timer(), 0.0);
    }

    #[test]
    fn rejects_unsatisfiable_params() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let inverted = Params {
            spawn_min_interval: 2.5,
            spawn_max_interval: 1.0,
            ..Params::default()
        };
        let impossible_bird = Params {
            bird_probability: 1.5,
            ..Params::default()
        };
        assert!(Spawner::new(&inverted, &mut rng).is_err());
        assert!(Spawner::new(&impossible_bird, &mut rng).is_err());
    }

    #[test]
    fn certain_bird_probability_always_picks_birds() {
        let params = Params {
            bird_probability: 1.0,
            ..Params::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!((0..20).all(|_| ObstacleKind::choose(&params, &mut rng) == ObstacleKind::Bird));
    }
}
