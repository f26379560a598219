//! Run configuration and difficulty presets
//!
//! Loaded once at run start and read-only afterwards.

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::sim::WeaponId;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier table for this preset
    pub fn settings(&self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                enemy_health: 0.6,
                enemy_speed: 0.7,
                enemy_damage: 0.6,
                spawn_delay: 1.5,
                shoot_delay: 1.5,
            },
            Difficulty::Normal => DifficultySettings::default(),
            Difficulty::Hard => DifficultySettings {
                enemy_health: 2.2,
                enemy_speed: 1.6,
                enemy_damage: 1.8,
                spawn_delay: 0.6,
                shoot_delay: 0.6,
            },
        }
    }
}

/// Per-difficulty multipliers consumed by the spawner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    pub enemy_health: f32,
    pub enemy_speed: f32,
    pub enemy_damage: f32,
    /// Scales the delay between spawn batches (lower = more enemies)
    pub spawn_delay: f32,
    /// Scales the delay between enemy shots (lower = more fire)
    pub shoot_delay: f32,
}

impl Default for DifficultySettings {
    fn default() -> Self {
        Self {
            enemy_health: 1.0,
            enemy_speed: 1.0,
            enemy_damage: 1.0,
            spawn_delay: 1.0,
            shoot_delay: 1.0,
        }
    }
}

/// Everything needed to start a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// RNG seed (spawns, spread, drops)
    pub seed: u64,
    pub difficulty: Difficulty,
    /// Overrides the preset multipliers when present
    pub custom_multipliers: Option<DifficultySettings>,
    pub arena_width: f32,
    pub arena_height: f32,
    pub starting_weapon: WeaponId,
    /// Progression level at run start (1-based)
    pub starting_level: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            difficulty: Difficulty::Normal,
            custom_multipliers: None,
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            starting_weapon: WeaponId::Assault,
            starting_level: 1,
        }
    }
}

impl RunConfig {
    /// Default config for a given seed and preset
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self {
            seed,
            difficulty,
            ..Self::default()
        }
    }

    /// Effective multipliers (custom table wins over the preset)
    pub fn multipliers(&self) -> DifficultySettings {
        self.custom_multipliers
            .unwrap_or_else(|| self.difficulty.settings())
    }

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        log::info!(
            "Loaded run config (seed {}, {})",
            config.seed,
            config.difficulty.as_str()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
