use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Physics and layout of the obstacle course.
///
/// Distances are in pixels. Velocity is in pixels per tick, so gravity is
/// scaled by `dt` while the position update is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    pub world_width: f64,
    pub world_height: f64,

    pub bird_x: f64,
    pub bird_start_y: f64,
    pub bird_radius: f64,
    pub gravity: f64,

    /// Velocity is clamped to `[-max_speed, max_speed]`; a flap sets it to
    /// `-max_speed`.
    pub max_speed: f64,

    /// Seconds of course time between two accepted flaps.
    pub flap_cooldown: f64,

    /// Network outputs above this value flap.
    pub flap_threshold: f64,

    pub pipe_width: f64,
    pub pipe_height: f64,
    pub pipe_speed: f64,

    /// Where pipe pairs start and where they wrap back to.
    pub pipe_start_x: f64,

    /// Vertical opening between the top and bottom pipe.
    pub gap_size: f64,

    /// Range the top edge of the bottom pipe is drawn from.
    pub gap_lower_min: f64,
    pub gap_lower_max: f64,

    /// Fixed time step in seconds.
    pub dt: f64,

    /// End a generation after this many ticks even if birds survive.
    pub max_ticks: Option<u64>,

    /// Seed for gap placement. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            world_width: 500.0,
            world_height: 720.0,
            bird_x: 200.0,
            bird_start_y: 240.0,
            bird_radius: 30.0,
            gravity: 3.0,
            max_speed: 0.8,
            flap_cooldown: 0.15,
            flap_threshold: 0.6,
            pipe_width: 100.0,
            pipe_height: 800.0,
            pipe_speed: 150.0,
            pipe_start_x: 500.0,
            gap_size: 200.0,
            gap_lower_min: 200.0,
            gap_lower_max: 520.0,
            dt: 0.0027,
            max_ticks: Some(100_000),
            seed: None,
        }
    }
}

impl CourseConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("bird_radius", self.bird_radius),
            ("max_speed", self.max_speed),
            ("pipe_width", self.pipe_width),
            ("pipe_height", self.pipe_height),
            ("dt", self.dt),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.gap_lower_min > self.gap_lower_max {
            return Err(SimError::InvalidConfig(format!(
                "gap range is empty: [{}, {}]",
                self.gap_lower_min, self.gap_lower_max
            )));
        }
        if 2.0 * self.bird_radius >= self.world_height {
            return Err(SimError::InvalidConfig(
                "bird does not fit between ceiling and ground".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CourseConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_gap_range() {
        let config = CourseConfig {
            gap_lower_min: 600.0,
            gap_lower_max: 300.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_time_step() {
        let config = CourseConfig {
            dt: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: CourseConfig =
            serde_json::from_str(r#"{ "pipe_speed": 200.0, "max_ticks": null }"#).unwrap();
        assert_eq!(config.pipe_speed, 200.0);
        assert_eq!(config.max_ticks, None);
        assert_eq!(config.world_height, 720.0);
    }
}
