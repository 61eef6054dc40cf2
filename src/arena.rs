// arena.rs - The things the encounter core reads but does not own:
// the player it hunts and the walls it collides with.

use bevy::prelude::*;

/// Anything with an axis-aligned box in world space.
///
/// World space is y-down with the origin at the map's top-left corner, the
/// same convention the tile map uses.
pub trait Bounded {
    fn bounds(&self) -> Rect;
}

/// True when two boxes share some interior area.
///
/// Boxes that only touch along an edge do not overlap, so an enemy standing
/// flush against a wall is not "inside" it.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

/// A square of side `size` whose top-left corner is `position`.
pub fn square_at(position: Vec2, size: f32) -> Rect {
    Rect::from_corners(position, position + Vec2::splat(size))
}

/// True when `area` overlaps any wall box.
pub fn hits_any_wall(area: Rect, walls: &[Rect]) -> bool {
    walls.iter().any(|wall| overlaps(area, *wall))
}

/// The player as the encounter core sees it.
///
/// Input, movement and the rest of the player's game live elsewhere; enemies
/// only need where the player is, how much sanity there is left to steal and
/// how much health there is left to hit.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Player {
    /// Top-left corner in world pixels.
    pub position: Vec2,
    pub size: f32,
    pub sanity: i32,
    pub health: i32,
    /// Skips all incoming damage. A debugging aid toggled from the keyboard.
    pub debug_immortal: bool,
}

impl Player {
    pub fn new(position: Vec2, size: f32) -> Self {
        Self {
            position,
            size,
            sanity: 100,
            health: 100,
            debug_immortal: false,
        }
    }

    /// Removes up to `amount` sanity and returns how much was actually taken.
    /// Sanity never goes below zero, so draining an empty player takes nothing.
    pub fn drain_sanity(&mut self, amount: i32) -> i32 {
        let taken = amount.clamp(0, self.sanity.max(0));
        self.sanity -= taken;
        taken
    }

    /// Take damage. Returns true if the hit landed.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.debug_immortal {
            return false;
        }
        self.health = (self.health - amount).max(0);
        true
    }

    pub fn toggle_debug_immortal(&mut self) {
        self.debug_immortal = !self.debug_immortal;
        info!(
            "Debug immortality: {}",
            if self.debug_immortal { "ON" } else { "OFF" }
        );
    }

    pub fn is_debug_immortal(&self) -> bool {
        self.debug_immortal
    }
}

impl Bounded for Player {
    fn bounds(&self) -> Rect {
        square_at(self.position, self.size)
    }
}

/// A static collision box. Enemies can't stand in one, spawn in one, or
/// teleport into one.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Wall(pub Rect);

impl Wall {
    /// The wall filling tile `(x, y)`.
    pub fn tile(x: u32, y: u32, tile_size: f32) -> Self {
        Wall(square_at(
            Vec2::new(x as f32, y as f32) * tile_size,
            tile_size,
        ))
    }
}

impl Bounded for Wall {
    fn bounds(&self) -> Rect {
        self.0
    }
}
