//! Sensor readings that an agent feeds to its brain.

use super::super::params::Params;
use super::super::vector::Vector;
use super::INPUT_SIZE;

/// One tracked obstacle as seen by the agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    /// Obstacle centre.
    pub position: Vector,
}

/// Normalized sensor readings for one tick.
///
/// Obstacle-derived fields fall back to "far" (1.0) for distances and gaps
/// and to 0.0 for heights when fewer obstacles lie ahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    /// Height relative to the standing rest height.
    pub height: f64,
    /// Vertical velocity mapped so a full jump impulse spans `[0, 1]`.
    pub vertical_velocity: f64,
    /// Distance to the nearest obstacle ahead.
    pub distance1: f64,
    /// Distance to the second-nearest obstacle ahead.
    pub distance2: f64,
    /// Whether the ground probe hit the floor.
    pub grounded: bool,
    /// Scroll speed, 1.0 at the start speed and 0.0 at the floor.
    pub speed: f64,
    /// Gap between the two nearest obstacles.
    pub between: f64,
    /// Height of the nearest obstacle above the floor.
    pub height1: f64,
    /// Height of the second-nearest obstacle above the floor.
    pub height2: f64,
}

impl Perception {
    /// Builds readings from raw agent state.
    ///
    /// # Arguments
    ///
    /// * `position` - Agent centre
    /// * `velocity` - Agent velocity
    /// * `grounded` - Result of the ground probe
    /// * `speed` - Current scroll speed
    /// * `obstacles` - Tracked obstacles in list order
    /// * `params` - Geometry used for normalization
    pub fn observe(
        position: Vector,
        velocity: Vector,
        grounded: bool,
        speed: f64,
        obstacles: &[Sighting],
        params: &Params,
    ) -> Self {
        let [first, second] = nearest_ahead(position.x, obstacles);
        let span = params.world_half_width;
        let range = params.vertical_range;
        let floor_top = params.floor_top();

        let distance = |s: Option<Sighting>| s.map_or(1.0, |s| (s.position.x - position.x) / span);
        let height = |s: Option<Sighting>| s.map_or(0.0, |s| (floor_top - s.position.y) / range);

        let between = match (first, second) {
            (Some(a), Some(b)) => (b.position.x - a.position.x) / span,
            _ => 1.0,
        };

        Self {
            height: (position.y - (params.standing.rest_y - range)) / range,
            vertical_velocity: (velocity.y + params.jump_impulse) / (2.0 * params.jump_impulse),
            distance1: distance(first),
            distance2: distance(second),
            grounded,
            speed: (speed - params.min_speed) / (params.start_speed - params.min_speed),
            between,
            height1: height(first),
            height2: height(second),
        }
    }

    /// Brain input vector, bias last.
    pub fn to_array(&self) -> [f64; INPUT_SIZE] {
        [
            self.height,
            self.vertical_velocity,
            self.distance1,
            self.distance2,
            if self.grounded { 1.0 } else { 0.0 },
            self.speed,
            self.between,
            self.height1,
            self.height2,
            1.0,
        ]
    }
}

/// The two nearest sightings strictly ahead of `x`, nearest first.
///
/// Equal positions keep their list order.
fn nearest_ahead(x: f64, obstacles: &[Sighting]) -> [Option<Sighting>; 2] {
    let mut ahead: Vec<Sighting> = obstacles.iter().copied().filter(|s| s.position.x > x).collect();
    ahead.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
    [ahead.first().copied(), ahead.get(1).copied()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64) -> Sighting {
        Sighting {
            position: Vector::new(x, 145.0),
        }
    }

    #[test]
    fn obstacles_behind_are_ignored() {
        let [a, b] = nearest_ahead(0.0, &[at(-50.0), at(0.0), at(30.0)]);
        assert_eq!(a, Some(at(30.0)));
        assert_eq!(b, None);
    }

    #[test]
    fn nearest_first_regardless_of_list_order() {
        let [a, b] = nearest_ahead(0.0, &[at(300.0), at(120.0), at(200.0)]);
        assert_eq!(a, Some(at(120.0)));
        assert_eq!(b, Some(at(200.0)));
    }

    #[test]
    fn empty_view_reads_far() {
        let params = Params::default();
        let p = Perception::observe(Vector::new(0.0, 150.0), Vector::ZERO, true, params.start_speed, &[], &params);
        assert_eq!(p.distance1, 1.0);
        assert_eq!(p.distance2, 1.0);
        assert_eq!(p.between, 1.0);
        assert_eq!(p.height1, 0.0);
        assert_eq!(p.speed, 1.0);
        assert_eq!(p.vertical_velocity, 0.5);
        assert_eq!(p.to_array()[INPUT_SIZE - 1], 1.0);
    }
}
