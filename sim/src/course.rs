use crate::config::CourseConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An axis-aligned pipe rectangle; `y` is its top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Pipe {
    pub fn right_edge(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom_edge(&self) -> f64 {
        self.y + self.height
    }
}

/// A top and bottom pipe sharing an x position, with a gap between them.
#[derive(Debug, Clone, PartialEq)]
pub struct PipePair {
    pub top: Pipe,
    pub bottom: Pipe,
    pub active: bool,
}

impl PipePair {
    /// Place a pair at the start position with a fresh random gap.
    pub fn new<R: Rng + ?Sized>(config: &CourseConfig, rng: &mut R) -> Self {
        let pipe = Pipe {
            x: config.pipe_start_x,
            y: 0.0,
            width: config.pipe_width,
            height: config.pipe_height,
        };
        let mut pair = Self {
            top: pipe.clone(),
            bottom: pipe,
            active: false,
        };
        pair.place(config.pipe_start_x, random_gap(config, rng), config);
        pair
    }

    /// Put the pair at `x` with the gap's lower bound at `gap_lower`.
    pub fn place(&mut self, x: f64, gap_lower: f64, config: &CourseConfig) {
        self.bottom.x = x;
        self.bottom.y = gap_lower;
        self.top.x = x;
        self.top.y = gap_lower - config.gap_size - self.top.height;
    }

    /// Leading (left) edge shared by both pipes.
    pub fn leading_edge(&self) -> f64 {
        self.bottom.x
    }

    pub fn trailing_edge(&self) -> f64 {
        self.bottom.right_edge()
    }

    /// Top edge of the bottom pipe.
    pub fn gap_lower(&self) -> f64 {
        self.bottom.y
    }

    /// Bottom edge of the top pipe.
    pub fn gap_upper(&self) -> f64 {
        self.top.bottom_edge()
    }

    pub fn pipes(&self) -> [&Pipe; 2] {
        [&self.top, &self.bottom]
    }

    /// Scroll left; once fully off screen, wrap back to the start with a new gap.
    fn scroll<R: Rng + ?Sized>(&mut self, dt: f64, config: &CourseConfig, rng: &mut R) {
        let x = self.leading_edge() - config.pipe_speed * dt;
        if x + self.top.width < 0.0 {
            self.place(config.pipe_start_x, random_gap(config, rng), config);
        } else {
            self.top.x = x;
            self.bottom.x = x;
        }
    }
}

fn random_gap<R: Rng + ?Sized>(config: &CourseConfig, rng: &mut R) -> f64 {
    rng.gen_range(config.gap_lower_min..=config.gap_lower_max)
}

/// The shared scrolling obstacle course: two pipe pairs, the first active
/// from the start and the second released once the first nears the middle.
#[derive(Debug, Clone)]
pub struct Course {
    config: CourseConfig,
    pairs: Vec<PipePair>,

    /// Course time in seconds since the last reset.
    elapsed: f64,
    rng: StdRng,
}

impl Course {
    pub fn new(config: CourseConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pairs = vec![PipePair::new(&config, &mut rng), PipePair::new(&config, &mut rng)];

        let mut course = Self {
            config,
            pairs,
            elapsed: 0.0,
            rng,
        };
        course.reset();
        course
    }

    pub fn config(&self) -> &CourseConfig {
        &self.config
    }

    pub fn pairs(&self) -> &[PipePair] {
        &self.pairs
    }

    pub fn pairs_mut(&mut self) -> &mut [PipePair] {
        &mut self.pairs
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The pair after `last_passed`, which is the one a bird should aim for.
    pub fn upcoming(&self, last_passed: usize) -> &PipePair {
        &self.pairs[(last_passed + 1) % self.pairs.len()]
    }

    /// Send every pair back to the start with new gaps; only the first runs.
    pub fn reset(&mut self) {
        for pair in &mut self.pairs {
            let gap = random_gap(&self.config, &mut self.rng);
            pair.place(self.config.pipe_start_x, gap, &self.config);
            pair.active = false;
        }
        self.pairs[0].active = true;
        self.elapsed = 0.0;
    }

    /// Move the course forward by one fixed tick.
    pub fn advance(&mut self) {
        let dt = self.config.dt;
        let release_at = self.config.world_width / 2.0 - 50.0;
        let count = self.pairs.len();

        for index in 0..count {
            if !self.pairs[index].active {
                continue;
            }
            if self.pairs[index].leading_edge() < release_at {
                self.pairs[(index + 1) % count].active = true;
            }
            self.pairs[index].scroll(dt, &self.config, &mut self.rng);
        }

        self.elapsed += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> Course {
        Course::new(CourseConfig {
            seed: Some(seed),
            ..Default::default()
        })
    }

    #[test]
    fn test_course_starts_with_one_active_pair() {
        let course = seeded(1);
        assert_eq!(course.pairs().len(), 2);
        assert!(course.pairs()[0].active);
        assert!(!course.pairs()[1].active);
        assert_eq!(course.elapsed(), 0.0);
    }

    #[test]
    fn test_gap_geometry() {
        let course = seeded(2);
        let config = course.config();
        for pair in course.pairs() {
            assert!(pair.gap_lower() >= config.gap_lower_min);
            assert!(pair.gap_lower() <= config.gap_lower_max);
            assert!((pair.gap_lower() - pair.gap_upper() - config.gap_size).abs() < 1e-9);
            assert_eq!(pair.leading_edge(), config.pipe_start_x);
            assert_eq!(pair.top.x, pair.bottom.x);
        }
    }

    #[test]
    fn test_only_active_pairs_scroll() {
        let mut course = seeded(3);
        course.advance();

        let config = course.config().clone();
        let moved = config.pipe_start_x - config.pipe_speed * config.dt;
        assert!((course.pairs()[0].leading_edge() - moved).abs() < 1e-9);
        assert_eq!(course.pairs()[1].leading_edge(), config.pipe_start_x);
        assert!((course.elapsed() - config.dt).abs() < 1e-12);
    }

    #[test]
    fn test_second_pair_released_past_middle() {
        let mut course = seeded(4);
        let release_at = course.config().world_width / 2.0 - 50.0;

        course.pairs_mut()[0].top.x = release_at + 1.0;
        course.pairs_mut()[0].bottom.x = release_at + 1.0;
        course.advance();
        assert!(!course.pairs()[1].active);

        course.pairs_mut()[0].top.x = release_at - 1.0;
        course.pairs_mut()[0].bottom.x = release_at - 1.0;
        course.advance();
        assert!(course.pairs()[1].active);
        assert!(course.pairs()[1].leading_edge() < course.config().pipe_start_x);
    }

    #[test]
    fn test_pair_wraps_with_new_gap() {
        let mut course = seeded(5);
        let width = course.config().pipe_width;
        course.pairs_mut()[0].top.x = -width + 0.1;
        course.pairs_mut()[0].bottom.x = -width + 0.1;

        course.advance();

        let config = course.config();
        let pair = &course.pairs()[0];
        assert_eq!(pair.leading_edge(), config.pipe_start_x);
        assert!(pair.gap_lower() >= config.gap_lower_min && pair.gap_lower() <= config.gap_lower_max);
        assert!(pair.active);
    }

    #[test]
    fn test_reset_restores_start() {
        let mut course = seeded(6);
        for _ in 0..100_000 {
            course.advance();
        }
        assert!(course.pairs()[1].active);

        course.reset();
        assert!(course.pairs()[0].active);
        assert!(!course.pairs()[1].active);
        assert_eq!(course.elapsed(), 0.0);
        for pair in course.pairs() {
            assert_eq!(pair.leading_edge(), course.config().pipe_start_x);
        }
    }

    #[test]
    fn test_upcoming_alternates() {
        let course = seeded(7);
        assert!(std::ptr::eq(course.upcoming(1), &course.pairs()[0]));
        assert!(std::ptr::eq(course.upcoming(0), &course.pairs()[1]));
    }
}
