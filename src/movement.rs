use bevy::prelude::*;

use crate::{
    arena::{Player, Wall},
    config::EncounterConfig,
    enemy::{Enemy, Sibling, Surroundings},
    resources::{EncounterRng, MapSize},
    EncounterSet,
};

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, update_enemies_system.in_set(EncounterSet::Behaviour));
    }
}

/// Runs every enemy's per-frame update, then lets it hit the player.
///
/// Phase 1 snapshots what enemies read about each other and about the floor
/// (positions, alive/dead, walls). Phase 2 updates each enemy against that
/// snapshot. Updating in place is fine here because nobody reads a sibling's
/// live component mid-pass, so no enemy sees another's move from this frame.
pub fn update_enemies_system(
    mut enemies: Query<&mut Enemy>,
    mut players: Query<&mut Player>,
    walls: Query<&Wall>,
    map: Res<MapSize>,
    config: Res<EncounterConfig>,
    mut rng: ResMut<EncounterRng>,
) {
    let Ok(mut player) = players.single_mut() else {
        return;
    };

    // Phase 1: snapshot
    let wall_boxes: Vec<Rect> = walls.iter().map(|wall| wall.0).collect();
    let siblings: Vec<Sibling> = enemies.iter().map(Sibling::of).collect();
    let around = Surroundings {
        walls: &wall_boxes,
        siblings: &siblings,
        map_size: map.0,
    };

    // Phase 2: update against the snapshot
    for mut enemy in enemies.iter_mut() {
        enemy.update(&mut player, &around, &config, &mut rng.0);

        if let Some(damage) = enemy.contact_attack(&player, &config) {
            if player.take_damage(damage) {
                debug!(
                    "{:?} hit the player for {} ({} left)",
                    enemy.kind(),
                    damage,
                    player.health
                );
            }
        }
    }
}
