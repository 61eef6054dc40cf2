use bevy::prelude::*;

use crate::EncounterSet;

pub struct CorpsePlugin;

impl Plugin for CorpsePlugin {
    fn build(&self, app: &mut App) {
        // Corpses age before the reconciliation pass adds this frame's dead,
        // so a new corpse starts its first full frame at the full lifetime.
        app.add_systems(
            Update,
            tick_corpses_system
                .in_set(EncounterSet::Reconcile)
                .before(crate::health::reconcile_dead_enemies_system),
        );
    }
}

/// A marker left where an enemy died. It fades out over `countdown` frames and
/// is then despawned; it never comes back or merges with another.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Corpse {
    /// Where the enemy's top-left corner was when it died.
    pub position: Vec2,
    /// Frames left before this corpse disappears.
    pub countdown: u32,
}

impl Corpse {
    pub fn new(position: Vec2, lifetime: u32) -> Self {
        Self {
            position,
            countdown: lifetime,
        }
    }

    /// Ages the corpse one frame. Returns true once it has expired.
    pub fn tick(&mut self) -> bool {
        self.countdown = self.countdown.saturating_sub(1);
        self.countdown == 0
    }

    /// Opacity for drawing: fully opaque until the last 255 frames, then fading.
    pub fn alpha(&self) -> u8 {
        self.countdown.min(255) as u8
    }
}

pub fn tick_corpses_system(mut commands: Commands, mut corpses: Query<(Entity, &mut Corpse)>) {
    for (entity, mut corpse) in corpses.iter_mut() {
        if corpse.tick() {
            commands.entity(entity).despawn();
        }
    }
}
