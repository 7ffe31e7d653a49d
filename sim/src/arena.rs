use crate::bird::Bird;
use crate::config::CourseConfig;
use crate::course::Course;
use crate::error::Result;
use neat::{Environment, StepOutcome};

/// The flappy course with one bird per agent.
pub struct Arena {
    pub course: Course,
    pub birds: Vec<Bird>,
    pub ticks: u64,
}

impl Arena {
    pub fn new(config: CourseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            course: Course::new(config),
            birds: Vec::new(),
            ticks: 0,
        })
    }

    pub fn config(&self) -> &CourseConfig {
        self.course.config()
    }

    pub fn alive_count(&self) -> usize {
        self.birds.iter().filter(|bird| bird.alive).count()
    }
}

impl Environment for Arena {
    fn reset(&mut self, agents: usize) {
        self.course.reset();
        self.birds = vec![Bird::new(self.course.config()); agents];
        self.ticks = 0;
    }

    fn advance(&mut self) {
        self.course.advance();
        self.ticks += 1;
    }

    fn sense(&self, agent: usize) -> Vec<f64> {
        self.birds[agent].sense(&self.course)
    }

    fn step(&mut self, agent: usize, decision: f64) -> StepOutcome {
        let bird = &mut self.birds[agent];
        let config = self.course.config();
        if decision > config.flap_threshold {
            bird.flap(self.course.elapsed(), config);
        }
        bird.update(&self.course)
    }

    fn all_agents_dead(&self) -> bool {
        self.birds.iter().all(|bird| !bird.alive)
    }

    fn tick_limit(&self) -> Option<u64> {
        self.course.config().max_ticks
    }
}
