use crate::config::CourseConfig;
use crate::course::{Course, Pipe};
use neat::StepOutcome;

/// Position of `value` inside `[lo, hi]`, clamped to `[0, 1]`.
pub fn scale(value: f64, lo: f64, hi: f64) -> f64 {
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Map a unit value onto `[lo, hi]`.
pub fn to_range(unit: f64, lo: f64, hi: f64) -> f64 {
    lo + unit * (hi - lo)
}

/// One agent's body on the course.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub radius: f64,

    /// Pixels per tick, positive is downwards.
    pub velocity: f64,
    pub alive: bool,

    /// Index of the pipe pair passed most recently.
    pub last_pair: usize,

    /// Course time of the last accepted flap.
    pub last_flap: Option<f64>,
}

impl Bird {
    pub fn new(config: &CourseConfig) -> Self {
        Self {
            x: config.bird_x,
            y: config.bird_start_y,
            radius: config.bird_radius,
            velocity: 0.0,
            alive: true,
            // The first pair to aim for is pair 0.
            last_pair: 1,
            last_flap: None,
        }
    }

    /// Kick upwards unless dead or still cooling down. Returns whether the
    /// flap was accepted.
    pub fn flap(&mut self, now: f64, config: &CourseConfig) -> bool {
        if !self.alive {
            return false;
        }
        if let Some(last) = self.last_flap {
            if now - last <= config.flap_cooldown {
                return false;
            }
        }

        self.velocity = -config.max_speed;
        self.last_flap = Some(now);
        true
    }

    /// Apply gravity, move, and resolve collisions and scoring for one tick.
    pub fn update(&mut self, course: &Course) -> StepOutcome {
        if !self.alive {
            return StepOutcome::default();
        }

        let config = course.config();
        let floor = config.world_height - self.radius;

        self.velocity = (self.velocity + config.gravity * config.dt).clamp(-config.max_speed, config.max_speed);
        self.y = (self.y + self.velocity).clamp(self.radius, floor);
        if self.y >= floor {
            self.alive = false;
        }

        let mut score_delta = 0;
        for (index, pair) in course.pairs().iter().enumerate() {
            if pair.pipes().into_iter().any(|pipe| self.overlaps(pipe)) {
                self.alive = false;
            }
            if self.x - self.radius > pair.trailing_edge() && index != self.last_pair {
                score_delta += 1;
                self.last_pair = index;
            }
        }

        StepOutcome {
            alive: self.alive,
            score_delta,
        }
    }

    /// Bounding-box overlap between the bird and a pipe.
    pub fn overlaps(&self, pipe: &Pipe) -> bool {
        let horizontal = self.x + self.radius > pipe.x && self.x - self.radius < pipe.right_edge();
        let vertical = self.y + self.radius > pipe.y && self.y - self.radius < pipe.bottom_edge();
        horizontal && vertical
    }

    /// The four network inputs: velocity, distance to the upcoming pair,
    /// and the distances to either side of its gap.
    pub fn sense(&self, course: &Course) -> Vec<f64> {
        let config = course.config();
        let pair = course.upcoming(self.last_pair);
        let height = config.world_height;

        vec![
            to_range(scale(self.velocity, -config.max_speed, config.max_speed), -1.0, 1.0),
            scale(pair.leading_edge() - self.x, 0.0, config.world_width),
            to_range(scale(pair.gap_lower() - self.y, -height, height), -1.0, 1.0),
            to_range(scale(self.y - pair.gap_upper(), -height, height), -1.0, 1.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        Course::new(CourseConfig {
            seed: Some(11),
            ..Default::default()
        })
    }

    #[test]
    fn test_scale_clamps() {
        assert_eq!(scale(5.0, 0.0, 10.0), 0.5);
        assert_eq!(scale(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(scale(30.0, 0.0, 10.0), 1.0);
        assert_eq!(to_range(0.5, -1.0, 1.0), 0.0);
        assert_eq!(to_range(1.0, -1.0, 1.0), 1.0);
    }

    #[test]
    fn test_bird_creation() {
        let config = CourseConfig::default();
        let bird = Bird::new(&config);
        assert_eq!((bird.x, bird.y), (200.0, 240.0));
        assert!(bird.alive);
        assert_eq!(bird.last_flap, None);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let course = course();
        let mut bird = Bird::new(course.config());

        let outcome = bird.update(&course);

        assert!(outcome.alive);
        assert!(bird.velocity > 0.0);
        assert!(bird.y > 240.0);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let course = course();
        let mut bird = Bird::new(course.config());
        bird.velocity = 5.0;
        bird.update(&course);
        assert_eq!(bird.velocity, course.config().max_speed);
    }

    #[test]
    fn test_first_flap_always_accepted() {
        let config = CourseConfig::default();
        let mut bird = Bird::new(&config);
        assert!(bird.flap(0.0, &config));
        assert_eq!(bird.velocity, -config.max_speed);
        assert_eq!(bird.last_flap, Some(0.0));
    }

    #[test]
    fn test_flap_cooldown() {
        let config = CourseConfig::default();
        let mut bird = Bird::new(&config);
        assert!(bird.flap(1.0, &config));
        assert!(!bird.flap(1.1, &config));
        assert!(!bird.flap(1.15, &config));
        assert!(bird.flap(1.2, &config));
    }

    #[test]
    fn test_dead_bird_cannot_flap_or_move() {
        let course = course();
        let mut bird = Bird::new(course.config());
        bird.alive = false;

        assert!(!bird.flap(0.0, course.config()));
        let outcome = bird.update(&course);
        assert_eq!(outcome, StepOutcome::default());
        assert_eq!(bird.y, 240.0);
    }

    #[test]
    fn test_ground_contact_kills() {
        let course = course();
        let mut bird = Bird::new(course.config());
        bird.y = course.config().world_height - bird.radius - 0.1;
        bird.velocity = course.config().max_speed;

        let outcome = bird.update(&course);
        assert!(!outcome.alive);
        assert_eq!(bird.y, course.config().world_height - bird.radius);
    }

    #[test]
    fn test_ceiling_clamps_without_death() {
        let course = course();
        let mut bird = Bird::new(course.config());
        bird.y = bird.radius;
        bird.velocity = -course.config().max_speed;

        let outcome = bird.update(&course);
        assert!(outcome.alive);
        assert_eq!(bird.y, bird.radius);
    }

    #[test]
    fn test_pipe_overlap_kills() {
        let mut course = course();
        let pair = &mut course.pairs_mut()[0];
        pair.top.x = 190.0;
        pair.bottom.x = 190.0;
        let gap_lower = pair.gap_lower();

        let mut bird = Bird::new(course.config());
        bird.y = gap_lower + 10.0;

        assert!(!bird.update(&course).alive);
    }

    #[test]
    fn test_flying_through_gap_survives() {
        let mut course = course();
        let pair = &mut course.pairs_mut()[0];
        pair.top.x = 190.0;
        pair.bottom.x = 190.0;
        let middle = (pair.gap_lower() + pair.gap_upper()) / 2.0;

        let mut bird = Bird::new(course.config());
        bird.y = middle;

        assert!(bird.update(&course).alive);
    }

    #[test]
    fn test_score_once_per_pair() {
        let mut course = course();
        let pair = &mut course.pairs_mut()[0];
        pair.top.x = 50.0;
        pair.bottom.x = 50.0;

        let mut bird = Bird::new(course.config());
        bird.y = 100.0;

        let first = bird.update(&course);
        let second = bird.update(&course);

        assert_eq!(first.score_delta, 1);
        assert_eq!(second.score_delta, 0);
        assert_eq!(bird.last_pair, 0);
    }

    #[test]
    fn test_sense_is_normalised() {
        let course = course();
        let bird = Bird::new(course.config());
        let vision = bird.sense(&course);

        assert_eq!(vision.len(), 4);
        assert_eq!(vision[0], 0.0);
        // Pair 0 sits at x = 500, 300 px ahead on a 500 px wide world.
        assert!((vision[1] - 0.6).abs() < 1e-9);
        for value in &vision[2..] {
            assert!((-1.0..=1.0).contains(value));
        }
        // Both gap distances are linear in y, so together they span the gap.
        let gap = course.config().gap_size / course.config().world_height;
        assert!((vision[2] + vision[3] - gap).abs() < 1e-9);
    }
}
