use bevy::prelude::*;

use crate::{
    camera::Viewport,
    config::EncounterConfig,
    corpse::Corpse,
    enemy::Enemy,
    resources::{Level, MapSize},
    spawn_enemies::SpawnController,
    EncounterSet,
};

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, change_level_system.in_set(EncounterSet::Level));
    }
}

/// Rebuilds the per-level resources when `Level` moves on.
///
/// The spawn controller remembers which level it was built for, so comparing
/// the two is enough to notice a change. Enemies and corpses belong to the
/// old map and are cleared; the new level starts empty and the controller
/// fills it from scratch.
pub fn change_level_system(
    mut commands: Commands,
    level: Res<Level>,
    config: Res<EncounterConfig>,
    mut map: ResMut<MapSize>,
    mut viewport: ResMut<Viewport>,
    mut spawner: ResMut<SpawnController>,
    enemies: Query<Entity, With<Enemy>>,
    corpses: Query<Entity, With<Corpse>>,
) {
    if spawner.level() == level.0 {
        return;
    }

    *map = MapSize::for_level(level.0, &config);
    *viewport = Viewport::new(map.0, Vec2::new(config.screen_width, config.screen_height));
    *spawner = SpawnController::new(level.0, &config);

    for entity in enemies.iter().chain(corpses.iter()) {
        commands.entity(entity).despawn();
    }

    info!(
        "Level {} loaded: {}x{} px, up to {} enemies",
        level.0,
        map.width(),
        map.height(),
        spawner.target_count()
    );
}
