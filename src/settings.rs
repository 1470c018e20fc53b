use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Controller {
    Human,
    Autoplayer,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct MatchSettings {
    /// Gravity period both sessions start with and return to after a slowdown.
    pub base_interval_ms: u32,
    pub slowdown_factor: f32,
    /// How long the scheduler keeps a slowdown active before ending it.
    pub slowdown_duration_ms: u32,
    pub seed: Option<u64>,
    /// Controller of the player side. The opposing side is always the autoplayer.
    pub player_controller: Controller,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            base_interval_ms: 300,
            slowdown_factor: 1.2,
            slowdown_duration_ms: 10_000,
            seed: None,
            player_controller: Controller::Human,
        }
    }
}

impl MatchSettings {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base_interval_ms == 0 {
            return Err("base_interval_ms must be positive".into());
        }
        if !self.slowdown_factor.is_finite() || self.slowdown_factor <= 0.0 {
            return Err(format!(
                "slowdown_factor must be a positive number, got {}",
                self.slowdown_factor
            ));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Interval after one slowdown step, rounded down to whole milliseconds.
    pub fn slowed(&self, interval_ms: u32) -> u32 {
        (interval_ms as f64 * self.slowdown_factor as f64).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = MatchSettings::from_json(r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.base_interval_ms, 300);
        assert_eq!(settings.slowdown_duration_ms, 10_000);
        assert_eq!(settings.player_controller, Controller::Human);
    }

    #[test]
    fn controller_parses_from_json() {
        let settings =
            MatchSettings::from_json(r#"{ "player_controller": "Autoplayer" }"#).unwrap();
        assert_eq!(settings.player_controller, Controller::Autoplayer);
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(MatchSettings::default().validate(), Ok(()));
    }

    #[test]
    fn zero_interval_and_bad_factors_are_rejected() {
        let zero = MatchSettings::from_json(r#"{ "base_interval_ms": 0 }"#).unwrap();
        assert!(zero.validate().is_err());

        let negative = MatchSettings::from_json(r#"{ "slowdown_factor": -1.0 }"#).unwrap();
        assert!(negative.validate().is_err());

        for factor in [0.0, f32::NAN, f32::INFINITY] {
            let settings = MatchSettings {
                slowdown_factor: factor,
                ..MatchSettings::default()
            };
            assert!(settings.validate().is_err(), "{factor}");
        }
    }

    #[test]
    fn slowdown_rounds_down() {
        let settings = MatchSettings::default();
        assert_eq!(settings.slowed(300), 360);
        assert_eq!(settings.slowed(360), 432);
        assert_eq!(settings.slowed(432), 518);
    }
}
