//! Enemy encounters for a top-down dungeon crawler.
//!
//! `EncounterPlugin` wires the whole core into a Bevy app: config loading,
//! level bookkeeping, spawning, per-frame enemy behaviour, death
//! reconciliation, corpses and the camera. Drawing lives in `render` and is
//! added separately, so the core runs headless under `MinimalPlugins`.

use bevy::prelude::*;

pub mod arena;
pub mod camera;
pub mod config;
pub mod corpse;
pub mod enemy;
pub mod health;
pub mod level;
pub mod movement;
pub mod render;
pub mod resources;
pub mod spawn_enemies;

use camera::CameraPlugin;
use config::ConfigPlugin;
use corpse::CorpsePlugin;
use health::HealthPlugin;
use level::LevelPlugin;
use movement::MovementPlugin;
use resources::{EncounterRng, Level, MapSize};
use spawn_enemies::SpawnEnemiesPlugin;

/// One frame of the encounter, in order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum EncounterSet {
    /// React to a level change before anything reads the per-level resources.
    Level,
    Spawn,
    /// Every enemy updates and attacks.
    Behaviour,
    /// Dead enemies become corpses; old corpses age out.
    Reconcile,
    Camera,
}

pub struct EncounterPlugin;

impl Plugin for EncounterPlugin {
    fn build(&self, app: &mut App) {
        // Resources built from the world need the config first, and the
        // viewport and spawner need the level and map size.
        app.add_plugins(ConfigPlugin)
            .configure_sets(
                Update,
                (
                    EncounterSet::Level,
                    EncounterSet::Spawn,
                    EncounterSet::Behaviour,
                    EncounterSet::Reconcile,
                    EncounterSet::Camera,
                )
                    .chain(),
            )
            .init_resource::<Level>()
            .init_resource::<MapSize>()
            .init_resource::<EncounterRng>()
            .add_plugins((
                LevelPlugin,
                SpawnEnemiesPlugin,
                MovementPlugin,
                HealthPlugin,
                CorpsePlugin,
                CameraPlugin,
            ));
    }
}
