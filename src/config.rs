use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enemy::EnemyKind;

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        // The config is inserted at build time rather than in a startup system:
        // the level, viewport and spawn resources are built from it right after.
        // Tests insert their own EncounterConfig before adding the plugin.
        if !app.world().contains_resource::<EncounterConfig>() {
            let config = storage::load().unwrap_or_default();
            app.insert_resource(config);
        }
        app.world().resource::<EncounterConfig>().assert_valid();
    }
}

/// Every number the encounter core used to hardcode.
///
/// Loaded from `encounter.ron` when one exists. `#[serde(default)]` on the
/// struct means a file only needs the fields it wants to change; everything it
/// leaves out keeps the value from `Default`.
///
/// Durations are in frames (the game steps once per `Update`), distances in
/// world pixels.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EncounterConfig {
    pub tile_size: f32,
    pub screen_width: f32,
    pub screen_height: f32,

    /// Map size in tiles at level 0, and how many tiles each level adds.
    pub base_map_tiles: (u32, u32),
    pub map_growth_per_level: (u32, u32),

    /// `target_count(level) = min(base_enemies + level, max_enemies)`
    pub base_enemies: u32,
    pub max_enemies: u32,

    pub spawn_attempts: u32,
    pub spawn_min_player_distance: f32,
    pub spawn_delay_frames: (u32, u32),
    pub spawn_weights: SpawnWeights,

    pub regular_speed: (f32, f32),
    pub regular_health: (i32, i32),
    pub regular_damage: (i32, i32),
    pub fleeing_shadow: EnemyStats,
    pub mimic: EnemyStats,
    pub mimic_triggered_speed: f32,
    pub corrupted_thief: EnemyStats,
    pub bloodbound_spawn: EnemyStats,

    pub teleport_attempts: u32,
    pub teleport_margin: f32,
    pub teleport_cooldown_frames: u32,
    pub teleport_chance: f64,
    /// Fraction of max health at or below which a shadow flees and may teleport.
    pub flee_health_fraction: f32,

    pub mimic_trigger_distance: f32,
    pub thief_drain_per_contact: i32,
    pub bloodbound_sense_radius: f32,
    pub bloodbound_bonus_per_corpse: f32,

    pub corpse_lifetime_frames: u32,
    pub contact_attack_cooldown_frames: u32,

    /// Fixed seed for the encounter RNG. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

/// Base stats for a variant that doesn't roll its stats.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub speed: f32,
    pub health: i32,
    pub damage: f32,
}

/// Relative odds of each variant when the spawn controller picks one.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SpawnWeights {
    pub regular: f32,
    pub fleeing_shadow: f32,
    pub mimic: f32,
    pub corrupted_thief: f32,
    pub bloodbound_spawn: f32,
}

impl SpawnWeights {
    pub fn weight(&self, kind: EnemyKind) -> f32 {
        match kind {
            EnemyKind::Regular => self.regular,
            EnemyKind::FleeingShadow => self.fleeing_shadow,
            EnemyKind::Mimic => self.mimic,
            EnemyKind::CorruptedThief => self.corrupted_thief,
            EnemyKind::BloodboundSpawn => self.bloodbound_spawn,
        }
    }
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            regular: 0.50,
            fleeing_shadow: 0.15,
            mimic: 0.10,
            corrupted_thief: 0.15,
            bloodbound_spawn: 0.10,
        }
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            screen_width: 1280.0,
            screen_height: 720.0,
            base_map_tiles: (30, 20),
            map_growth_per_level: (3, 2),
            base_enemies: 2,
            max_enemies: 12,
            spawn_attempts: 10,
            spawn_min_player_distance: 300.0,
            spawn_delay_frames: (60, 180),
            spawn_weights: SpawnWeights::default(),
            regular_speed: (1.0, 2.0),
            regular_health: (80, 120),
            regular_damage: (8, 15),
            fleeing_shadow: EnemyStats {
                speed: 2.5,
                health: 70,
                damage: 10.0,
            },
            mimic: EnemyStats {
                speed: 1.0,
                health: 120,
                damage: 20.0,
            },
            mimic_triggered_speed: 3.0,
            corrupted_thief: EnemyStats {
                speed: 3.5,
                health: 60,
                damage: 5.0,
            },
            bloodbound_spawn: EnemyStats {
                speed: 1.8,
                health: 100,
                damage: 12.0,
            },
            teleport_attempts: 50,
            teleport_margin: 100.0,
            teleport_cooldown_frames: 180, // 3 seconds at 60fps
            teleport_chance: 0.03,
            flee_health_fraction: 0.4,
            mimic_trigger_distance: 60.0,
            thief_drain_per_contact: 2,
            bloodbound_sense_radius: 100.0,
            bloodbound_bonus_per_corpse: 0.2,
            corpse_lifetime_frames: 300,
            contact_attack_cooldown_frames: 60,
            rng_seed: None,
        }
    }
}

impl EncounterConfig {
    /// Side length of every enemy's square, a little smaller than a tile so
    /// enemies fit through one-tile corridors.
    pub fn enemy_size(&self) -> f32 {
        self.tile_size - 10.0
    }

    /// How many enemies a level keeps alive at once.
    ///
    /// Defined for every level: grows by one per level and never passes
    /// `max_enemies`.
    pub fn target_count(&self, level: u32) -> usize {
        self.base_enemies
            .saturating_add(level)
            .min(self.max_enemies) as usize
    }

    pub fn stats(&self, kind: EnemyKind) -> Option<EnemyStats> {
        match kind {
            EnemyKind::Regular => None,
            EnemyKind::FleeingShadow => Some(self.fleeing_shadow),
            EnemyKind::Mimic => Some(self.mimic),
            EnemyKind::CorruptedThief => Some(self.corrupted_thief),
            EnemyKind::BloodboundSpawn => Some(self.bloodbound_spawn),
        }
    }

    /// Checks for values no level could run with, naming the first one found.
    pub fn validate(&self) -> Result<(), String> {
        if self.enemy_size() <= 0.0 {
            return Err(format!("tile_size {} leaves no room for an enemy", self.tile_size));
        }
        if self.screen_width <= 0.0 || self.screen_height <= 0.0 {
            return Err("screen size must be positive".into());
        }
        if self.base_map_tiles.0 <= 4 || self.base_map_tiles.1 <= 4 {
            return Err(format!("base_map_tiles {:?} is too small", self.base_map_tiles));
        }
        if self.spawn_delay_frames.0 > self.spawn_delay_frames.1 {
            return Err(format!("spawn_delay_frames {:?} is reversed", self.spawn_delay_frames));
        }
        if self.regular_speed.0 >= self.regular_speed.1 {
            return Err(format!("regular_speed {:?} is empty", self.regular_speed));
        }
        if self.regular_health.0 <= 0 || self.regular_health.0 > self.regular_health.1 {
            return Err(format!("regular_health {:?} is invalid", self.regular_health));
        }
        if self.regular_damage.0 < 0 || self.regular_damage.0 > self.regular_damage.1 {
            return Err(format!("regular_damage {:?} is invalid", self.regular_damage));
        }
        for kind in EnemyKind::ALL {
            if let Some(stats) = self.stats(kind) {
                if stats.health <= 0 {
                    return Err(format!("{kind:?} must start with positive health"));
                }
            }
        }
        if !(0.0..=1.0).contains(&self.teleport_chance) {
            return Err(format!("teleport_chance {} is not a probability", self.teleport_chance));
        }
        Ok(())
    }

    /// Panics on a config built in code that `validate` rejects. Files on disk
    /// never get this far: `storage::load` skips them instead.
    pub fn assert_valid(&self) {
        if let Err(problem) = self.validate() {
            panic!("invalid encounter config: {problem}");
        }
    }
}

/// Parses an `encounter.ron` document.
pub fn parse(contents: &str) -> Result<EncounterConfig, ron::error::SpannedError> {
    ron::from_str::<EncounterConfig>(contents)
}

#[cfg(not(target_arch = "wasm32"))]
mod storage {
    use std::path::PathBuf;

    use super::EncounterConfig;
    use bevy::prelude::*;

    const CONFIG_FILE_NAME: &str = "encounter.ron";
    const APP_DIR: &str = "dread-encounters";

    /// Project root first, then the per-user config directory.
    fn config_file_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(APP_DIR).join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Reads the first config file that exists, or returns None.
    ///
    /// A file that exists but can't be read or parsed is logged and skipped.
    pub fn load() -> Option<EncounterConfig> {
        for path in config_file_paths() {
            if !path.exists() {
                continue;
            }

            match std::fs::read_to_string(&path) {
                Ok(contents) => match super::parse(&contents) {
                    Ok(config) => match config.validate() {
                        Ok(()) => {
                            info!("Loaded encounter config from {:?}", path);
                            return Some(config);
                        }
                        Err(problem) => {
                            error!("Unusable values in {:?}: {}. Skipping it.", path, problem);
                        }
                    },
                    Err(e) => {
                        error!("Failed to parse {:?}: {}. Skipping it.", path, e);
                    }
                },
                Err(e) => {
                    error!("Failed to read {:?}: {}. Skipping it.", path, e);
                }
            }
        }

        info!("No encounter.ron found. Using built-in encounter tuning.");
        None
    }
}

#[cfg(target_arch = "wasm32")]
mod storage {
    use super::EncounterConfig;
    use bevy::prelude::*;

    pub fn load() -> Option<EncounterConfig> {
        warn!("encounter.ron is not read on the web. Using built-in encounter tuning.");
        None
    }
}
