use bevy::prelude::*;

use crate::{
    arena::{Bounded, Player},
    config::EncounterConfig,
    resources::MapSize,
    EncounterSet,
};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Viewport>()
            .add_systems(Update, follow_player_system.in_set(EncounterSet::Camera));
    }
}

/// The scrolling window into the map.
///
/// The view rectangle is always the size of the whole map; only its origin
/// moves. The origin is the offset added to world coordinates to get screen
/// coordinates, so it is zero or negative on both axes.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    origin: Vec2,
    map_size: Vec2,
    screen_size: Vec2,
}

impl Viewport {
    pub fn new(map_size: Vec2, screen_size: Vec2) -> Self {
        Self {
            origin: Vec2::ZERO,
            map_size,
            screen_size,
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    /// Centers the view on `target` without scrolling past any map edge.
    pub fn update(&mut self, target: Rect) {
        let center = target.center();
        let wanted = -center + (self.screen_size / 2.0).trunc();
        self.origin = Vec2::new(
            clamp_axis(wanted.x, self.map_size.x, self.screen_size.x),
            clamp_axis(wanted.y, self.map_size.y, self.screen_size.y),
        );
    }

    /// Screen-space box of anything with world bounds.
    pub fn apply(&self, entity: &impl Bounded) -> Rect {
        self.apply_rect(entity.bounds())
    }

    /// Screen-space version of a world rectangle.
    pub fn apply_rect(&self, rect: Rect) -> Rect {
        Rect::from_corners(rect.min + self.origin, rect.max + self.origin)
    }

    pub fn apply_point(&self, point: Vec2) -> Vec2 {
        point + self.origin
    }
}

impl FromWorld for Viewport {
    fn from_world(world: &mut World) -> Self {
        let config = world.resource::<EncounterConfig>();
        let screen = Vec2::new(config.screen_width, config.screen_height);
        Viewport::new(world.resource::<MapSize>().0, screen)
    }
}

/// Clamps one axis of the origin to `[-(map - screen), 0]`.
///
/// A map narrower than the screen has no valid scroll range (the lower bound
/// is above zero); the view is pinned to the top-left and the rest of the
/// screen stays empty.
fn clamp_axis(wanted: f32, map: f32, screen: f32) -> f32 {
    let lower = -(map - screen);
    if lower > 0.0 {
        0.0
    } else {
        wanted.clamp(lower, 0.0)
    }
}

fn follow_player_system(players: Query<&Player>, mut viewport: ResMut<Viewport>) {
    let Ok(player) = players.single() else {
        return;
    };
    viewport.update(player.bounds());
}
