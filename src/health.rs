use bevy::prelude::*;

use crate::{config::EncounterConfig, corpse::Corpse, enemy::Enemy, EncounterSet};

pub struct HealthPlugin;

impl Plugin for HealthPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            reconcile_dead_enemies_system.in_set(EncounterSet::Reconcile),
        )
        .add_observer(on_enemy_hit);
    }
}

/// Something (the player's weapon, a trap, a test) hit an enemy.
///
/// Fired with `commands.trigger(EnemyHit { .. })`; `on_enemy_hit` applies it
/// immediately. The enemy only leaves the world later, in the reconciliation
/// pass.
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyHit {
    pub enemy: Entity,
    pub amount: i32,
}

fn on_enemy_hit(hit: On<EnemyHit>, mut enemies: Query<&mut Enemy>) {
    let Ok(mut enemy) = enemies.get_mut(hit.enemy) else {
        return;
    };

    if enemy.take_damage(hit.amount).killed() {
        info!("{:?} killed at {}", enemy.kind(), enemy.position);
        if enemy.stolen_sanity() > 0 {
            debug!("It carried {} stolen sanity", enemy.stolen_sanity());
        }
    }
}

/// Turns every enemy that died since the last pass into a corpse.
///
/// Runs after every enemy has updated this frame, so an enemy killed between
/// frames is still visible (as a dead sibling) to that frame's updates. That
/// one-frame window is the only time BloodboundSpawn feels the kill. The
/// despawn is deferred through Commands, so the list being iterated never
/// changes under us, and the dead enemy is gone by the next pass: one corpse
/// per death.
pub fn reconcile_dead_enemies_system(
    mut commands: Commands,
    enemies: Query<(Entity, &Enemy)>,
    config: Res<EncounterConfig>,
) {
    for (entity, enemy) in enemies.iter() {
        if enemy.active {
            continue;
        }

        commands.entity(entity).despawn();
        commands.spawn(Corpse::new(enemy.position, config.corpse_lifetime_frames));
        debug!("Corpse left at {}", enemy.position);
    }
}
