use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{self, PetError};

/// Smallest pet size multiplier accepted from settings.
const MIN_PET_SIZE: f32 = 0.25;
/// Largest pet size multiplier accepted from settings.
const MAX_PET_SIZE: f32 = 4.0;

/// Live user settings the capabilities react to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gravity_enabled: bool,
    /// Multiplier on every pet's base speed.
    pub speed_multiplier: f32,
    /// How often random behaviors fire (2.0 = twice as often).
    pub animation_frequency: f32,
    /// Bounce off other pets as well as static geometry.
    pub bounce_off_pets: bool,
    /// Sprite size multiplier (1.0 = species default).
    pub pet_size: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity_enabled: true,
            speed_multiplier: 1.0,
            animation_frequency: 1.0,
            bounce_off_pets: false,
            pet_size: 1.0,
        }
    }
}

/// A single live settings update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsChange {
    GravityEnabled(bool),
    SpeedMultiplier(f32),
    AnimationFrequency(f32),
    BounceOffPets(bool),
    PetSize(f32),
}

impl Settings {
    pub fn from_json_str(json: &str) -> error::Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> error::Result<Self> {
        let json = error::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn validate(&self) -> error::Result<()> {
        if !(self.speed_multiplier.is_finite() && self.speed_multiplier >= 0.0) {
            return Err(PetError::InvalidSettings(format!(
                "speed_multiplier must be >= 0, got {}",
                self.speed_multiplier
            )));
        }
        if !(self.animation_frequency.is_finite() && self.animation_frequency > 0.0) {
            return Err(PetError::InvalidSettings(format!(
                "animation_frequency must be > 0, got {}",
                self.animation_frequency
            )));
        }
        if !(MIN_PET_SIZE..=MAX_PET_SIZE).contains(&self.pet_size) {
            return Err(PetError::InvalidSettings(format!(
                "pet_size must be within {MIN_PET_SIZE}..={MAX_PET_SIZE}, got {}",
                self.pet_size
            )));
        }
        Ok(())
    }

    /// Apply one change, clamping numeric values into their valid ranges.
    pub fn apply(&mut self, change: SettingsChange) {
        match change {
            SettingsChange::GravityEnabled(v) => self.gravity_enabled = v,
            SettingsChange::SpeedMultiplier(v) => {
                self.speed_multiplier = if v.is_finite() { v.max(0.0) } else { 1.0 };
            }
            SettingsChange::AnimationFrequency(v) => {
                self.animation_frequency = if v.is_finite() && v > 0.0 { v } else { 1.0 };
            }
            SettingsChange::BounceOffPets(v) => self.bounce_off_pets = v,
            SettingsChange::PetSize(v) => {
                self.pet_size = if v.is_finite() {
                    v.clamp(MIN_PET_SIZE, MAX_PET_SIZE)
                } else {
                    1.0
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let s = Settings::from_json_str(r#"{ "gravity_enabled": false }"#).unwrap();
        assert!(!s.gravity_enabled);
        assert_eq!(s.speed_multiplier, 1.0);
        assert_eq!(s.pet_size, 1.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = Settings::from_json_str(r#"{ "animation_frequency": 0.0 }"#).unwrap_err();
        assert!(matches!(err, PetError::InvalidSettings(_)));
        assert!(Settings::from_json_str(r#"{ "pet_size": 9.0 }"#).is_err());
        assert!(matches!(
            Settings::from_json_str("{ nope").unwrap_err(),
            PetError::Json(_)
        ));
    }

    #[test]
    fn apply_clamps() {
        let mut s = Settings::default();
        s.apply(SettingsChange::SpeedMultiplier(-3.0));
        assert_eq!(s.speed_multiplier, 0.0);
        s.apply(SettingsChange::PetSize(100.0));
        assert_eq!(s.pet_size, MAX_PET_SIZE);
        s.apply(SettingsChange::AnimationFrequency(f32::NAN));
        assert_eq!(s.animation_frequency, 1.0);
    }
}
