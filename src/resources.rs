// resources.rs - Global encounter resources (singleton data)
// Resources exist once for the whole game, unlike components which are per-entity.

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::config::EncounterConfig;

/// The one random source every encounter system draws from.
///
/// Systems never call `rand::thread_rng()`: routing every roll through this
/// resource lets a seeded config replay the same spawns and teleports, and lets
/// tests drive the pure functions with their own RNG.
#[derive(Resource)]
pub struct EncounterRng(pub StdRng);

impl EncounterRng {
    pub fn from_config(config: &EncounterConfig) -> Self {
        match config.rng_seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

impl FromWorld for EncounterRng {
    fn from_world(world: &mut World) -> Self {
        Self::from_config(world.resource::<EncounterConfig>())
    }
}

/// The dungeon level currently being played, starting at 1.
///
/// Writing a new value here is how the rest of the game asks for a level
/// change; the level plugin rebuilds the per-level resources in response.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Level(pub u32);

impl Default for Level {
    fn default() -> Self {
        Level(1)
    }
}

/// Map dimensions in world pixels, provided by the level at load time.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MapSize(pub Vec2);

impl MapSize {
    /// Maps grow with depth: a few tiles wider and a couple taller per level.
    pub fn for_level(level: u32, config: &EncounterConfig) -> Self {
        let (base_w, base_h) = config.base_map_tiles;
        let (grow_w, grow_h) = config.map_growth_per_level;
        let tiles_w = base_w + grow_w * level;
        let tiles_h = base_h + grow_h * level;
        MapSize(Vec2::new(tiles_w as f32, tiles_h as f32) * config.tile_size)
    }

    pub fn width(&self) -> f32 {
        self.0.x
    }

    pub fn height(&self) -> f32 {
        self.0.y
    }

    /// Map size in whole tiles.
    pub fn tiles(&self, tile_size: f32) -> (u32, u32) {
        (
            (self.0.x / tile_size).floor() as u32,
            (self.0.y / tile_size).floor() as u32,
        )
    }
}

impl FromWorld for MapSize {
    fn from_world(world: &mut World) -> Self {
        let level = world.get_resource::<Level>().copied().unwrap_or_default();
        MapSize::for_level(level.0, world.resource::<EncounterConfig>())
    }
}
