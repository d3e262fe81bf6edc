//! Difficulty presets and the persisted difficulty store
//!
//! The difficulty level is the only generation input that survives between
//! sessions. Changing it affects rows generated from then on; rows already in
//! the level buffer keep the parameters they were generated with.

use serde::{Deserialize, Serialize};

use crate::observer::{Observers, SubscriptionId};
use crate::platform::KeyValueStore;

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(DifficultyLevel::Easy),
            "medium" | "med" => Some(DifficultyLevel::Medium),
            "hard" => Some(DifficultyLevel::Hard),
            _ => None,
        }
    }

    /// Generation parameters for this level
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            DifficultyLevel::Easy => DifficultyProfile {
                level: *self,
                car_row_probability: 0.3,
                min_speed: 60,
                max_speed: 150,
                min_vehicles: 1,
                max_vehicles: 2,
                min_safe_spacing: 5,
            },
            DifficultyLevel::Medium => DifficultyProfile {
                level: *self,
                car_row_probability: 0.5,
                min_speed: 80,
                max_speed: 250,
                min_vehicles: 1,
                max_vehicles: 4,
                min_safe_spacing: 3,
            },
            DifficultyLevel::Hard => DifficultyProfile {
                level: *self,
                car_row_probability: 0.7,
                min_speed: 120,
                max_speed: 300,
                min_vehicles: 2,
                max_vehicles: 6,
                min_safe_spacing: 2,
            },
        }
    }
}

/// Tunable generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub level: DifficultyLevel,
    /// Probability that a generated row is a car lane
    pub car_row_probability: f64,
    /// Vehicle speed range in world units per second (inclusive)
    pub min_speed: u32,
    pub max_speed: u32,
    /// Vehicles per car lane (inclusive)
    pub min_vehicles: u32,
    pub max_vehicles: u32,
    /// Preferred minimum tile gap between vehicles in one lane
    pub min_safe_spacing: i32,
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        DifficultyLevel::default().profile()
    }
}

/// Current difficulty, persisted and observable
#[derive(Debug)]
pub struct DifficultyStore {
    level: DifficultyLevel,
    profile: DifficultyProfile,
    store: Box<dyn KeyValueStore>,
    observers: Observers<DifficultyLevel>,
}

impl DifficultyStore {
    /// Storage key
    const STORAGE_KEY: &'static str = "gameDifficulty";

    /// Load the persisted level, defaulting to medium
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let level = match store.get(Self::STORAGE_KEY) {
            Ok(Some(value)) => DifficultyLevel::from_str(&value).unwrap_or_else(|| {
                log::warn!("Unknown difficulty {:?}, using default", value);
                DifficultyLevel::default()
            }),
            Ok(None) => DifficultyLevel::default(),
            Err(e) => {
                log::warn!("Failed to read difficulty: {}", e);
                DifficultyLevel::default()
            }
        };
        log::info!("Difficulty: {}", level.as_str());

        Self {
            level,
            profile: level.profile(),
            store,
            observers: Observers::new(),
        }
    }

    pub fn get(&self) -> DifficultyLevel {
        self.level
    }

    /// Parameters for the current level
    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Change level, persist it and notify subscribers
    pub fn set(&mut self, level: DifficultyLevel) {
        self.level = level;
        self.profile = level.profile();
        if let Err(e) = self.store.set(Self::STORAGE_KEY, level.as_str()) {
            log::warn!("Failed to save difficulty: {}", e);
        }
        log::info!("Difficulty set to {}", level.as_str());
        self.observers.notify(&level);
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DifficultyLevel) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}
