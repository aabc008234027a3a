//! Live tunables
//!
//! The UI owns a `Tunables` value and edits it between frames. The simulation
//! never holds on to it: every `tick` and `regenerate` call receives the
//! current values explicitly and reads each scalar once.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the integrator folds acceleration into velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IntegrationMode {
    /// `v' = v + a`, acceleration is not scaled by the frame time
    #[default]
    Legacy,
    /// `v' = v + a * dt`
    Scaled,
}

impl IntegrationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationMode::Legacy => "Legacy",
            IntegrationMode::Scaled => "Scaled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "legacy" => Some(IntegrationMode::Legacy),
            "scaled" | "dt" => Some(IntegrationMode::Scaled),
            _ => None,
        }
    }
}

/// Physics knobs read every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    /// Gravity scale (0.0 - 1.0)
    pub gravity: f32,
    /// Restitution on bounce (0.0 - 1.0)
    pub elasticity: f32,
    /// Friction scale (0.0 - 1.0)
    pub friction: f32,
    /// Mass of the next spawned ball
    pub spawn_mass: f32,
    /// Kick impulse
    pub kick_strength: f32,
    /// Impulse when the player walks into the ball
    pub push_strength: f32,
    #[serde(default)]
    pub integration: IntegrationMode,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            elasticity: 0.3,
            friction: 0.5,
            spawn_mass: 10.0,
            kick_strength: 50.0,
            push_strength: 10.0,
            integration: IntegrationMode::Legacy,
        }
    }
}

/// Cave generation knobs read when "Generate" fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PcgParams {
    /// Chance an interior cell starts as floor
    pub seed_probability: f32,
    /// Number of smoothing passes
    pub iterations: u32,
    /// Open neighbours needed to turn a cell into floor (0 - 8)
    pub threshold: u32,
}

impl Default for PcgParams {
    fn default() -> Self {
        Self {
            seed_probability: 0.4,
            iterations: 5,
            threshold: 5,
        }
    }
}

impl PcgParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.seed_probability) {
            return Err(Error::InvalidSeedProbability(self.seed_probability));
        }
        if self.threshold > 8 {
            return Err(Error::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Everything the UI can change at runtime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tunables {
    #[serde(default)]
    pub physics: PhysicsParams,
    #[serde(default)]
    pub pcg: PcgParams,
}

impl Tunables {
    /// Clamp the slider-backed values to their UI ranges.
    ///
    /// Kick and push strength are free-form inputs and stay unclamped.
    pub fn clamp_to_ui_ranges(&mut self) {
        self.physics.gravity = self.physics.gravity.clamp(0.0, 1.0);
        self.physics.elasticity = self.physics.elasticity.clamp(0.0, 1.0);
        self.physics.friction = self.physics.friction.clamp(0.0, 1.0);
        self.pcg.seed_probability = self.pcg.seed_probability.clamp(0.0, 1.0);
        self.pcg.threshold = self.pcg.threshold.min(8);
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let mass = self.physics.spawn_mass;
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidMass(mass));
        }
        self.pcg.validate()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let tunables: Self = serde_json::from_str(json)?;
        tunables.validate()?;
        log::info!("Loaded tunables: {:?}", tunables);
        Ok(tunables)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_startup_values() {
        let t = Tunables::default();
        assert_eq!(t.physics.gravity, 0.5);
        assert_eq!(t.physics.elasticity, 0.3);
        assert_eq!(t.physics.friction, 0.5);
        assert_eq!(t.physics.spawn_mass, 10.0);
        assert_eq!(t.physics.kick_strength, 50.0);
        assert_eq!(t.physics.push_strength, 10.0);
        assert_eq!(t.pcg.seed_probability, 0.4);
        assert_eq!(t.pcg.iterations, 5);
        assert_eq!(t.pcg.threshold, 5);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_clamp_leaves_strengths_alone() {
        let mut t = Tunables::default();
        t.physics.gravity = 3.0;
        t.physics.friction = -1.0;
        t.physics.kick_strength = 500.0;
        t.pcg.threshold = 12;
        t.clamp_to_ui_ranges();
        assert_eq!(t.physics.gravity, 1.0);
        assert_eq!(t.physics.friction, 0.0);
        assert_eq!(t.physics.kick_strength, 500.0);
        assert_eq!(t.pcg.threshold, 8);
    }

    #[test]
    fn test_json_round_trip() {
        let mut t = Tunables::default();
        t.pcg.iterations = 9;
        t.physics.integration = IntegrationMode::Scaled;
        let json = t.to_json().unwrap();
        let back = Tunables::from_json(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_json_missing_sections_use_defaults() {
        let t = Tunables::from_json(r#"{ "pcg": { "seed_probability": 0.6, "iterations": 2, "threshold": 4 } }"#)
            .unwrap();
        assert_eq!(t.physics, PhysicsParams::default());
        assert_eq!(t.pcg.iterations, 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut t = Tunables::default();
        t.physics.spawn_mass = 0.0;
        assert!(matches!(t.validate(), Err(Error::InvalidMass(_))));

        let mut t = Tunables::default();
        t.pcg.seed_probability = 1.5;
        assert!(matches!(t.validate(), Err(Error::InvalidSeedProbability(_))));

        let mut t = Tunables::default();
        t.pcg.threshold = 9;
        assert!(matches!(t.validate(), Err(Error::InvalidThreshold(9))));

        assert!(matches!(Tunables::from_json("{ nope"), Err(Error::Settings(_))));
    }

    #[test]
    fn test_integration_mode_from_str() {
        assert_eq!(IntegrationMode::from_str("SCALED"), Some(IntegrationMode::Scaled));
        assert_eq!(IntegrationMode::from_str("legacy"), Some(IntegrationMode::Legacy));
        assert_eq!(IntegrationMode::from_str("rk4"), None);
    }
}
