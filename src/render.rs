use bevy::{math::Isometry2d, prelude::*};

use crate::{
    arena::{Player, Wall},
    camera::Viewport,
    corpse::Corpse,
    enemy::{Enemy, EnemyKind},
    EncounterSet,
};

/// Draws the encounter with gizmos once the camera has settled for the frame.
///
/// Not part of `EncounterPlugin`: headless apps and tests run the core
/// without it.
pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                draw_walls_system,
                draw_corpses_system,
                draw_enemies_system,
                draw_player_system,
            )
                .chain()
                .after(EncounterSet::Camera),
        );
    }
}

pub const CHEST_BROWN: Color = Color::srgb_u8(139, 69, 19);
pub const CHEST_GOLD: Color = Color::srgb_u8(255, 215, 0);
const HEALTH_BACK: Color = Color::srgb_u8(255, 0, 0);
const HEALTH_FILL: Color = Color::srgb_u8(0, 255, 0);
const WALL_COLOR: Color = Color::srgb_u8(90, 90, 110);
const PLAYER_COLOR: Color = Color::srgb_u8(0, 120, 255);
const IMMORTAL_PLAYER_COLOR: Color = Color::srgb_u8(255, 255, 255);

const CHEST_INSET: f32 = 5.0;
const HEALTH_BAR_HEIGHT: f32 = 5.0;
const HEALTH_BAR_GAP: f32 = 10.0;
const CORPSE_RADIUS: f32 = 10.0;

/// One screen-space rectangle to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub rect: Rect,
    pub color: Color,
}

pub fn kind_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Regular | EnemyKind::Mimic => Color::srgb_u8(255, 0, 0),
        EnemyKind::FleeingShadow => Color::srgb_u8(100, 0, 100),
        EnemyKind::CorruptedThief => Color::srgb_u8(0, 100, 100),
        EnemyKind::BloodboundSpawn => Color::srgb_u8(150, 0, 0),
    }
}

/// Everything that makes up one enemy on screen, back to front.
///
/// Dead enemies draw nothing. A disguised mimic is a chest with a gold lid and
/// no health bar; everything else is a coloured square with a bar above it.
pub fn enemy_shapes(enemy: &Enemy, viewport: &Viewport) -> Vec<Shape> {
    if !enemy.active {
        return Vec::new();
    }

    let body = viewport.apply(enemy);
    if enemy.is_disguised() {
        return vec![
            Shape {
                rect: body,
                color: CHEST_BROWN,
            },
            Shape {
                rect: body.inflate(-CHEST_INSET),
                color: CHEST_GOLD,
            },
        ];
    }

    let bar_min = Vec2::new(body.min.x, body.min.y - HEALTH_BAR_GAP);
    let bar = Rect::from_corners(bar_min, bar_min + Vec2::new(enemy.size, HEALTH_BAR_HEIGHT));
    let fill_width = enemy.size * enemy.health_ratio().clamp(0.0, 1.0);
    let fill = Rect::from_corners(bar_min, bar_min + Vec2::new(fill_width, HEALTH_BAR_HEIGHT));

    vec![
        Shape {
            rect: body,
            color: kind_color(enemy.kind()),
        },
        Shape {
            rect: bar,
            color: HEALTH_BACK,
        },
        Shape {
            rect: fill,
            color: HEALTH_FILL,
        },
    ]
}

/// Screen-space centre and colour of a corpse, fading with its countdown.
pub fn corpse_mark(corpse: &Corpse, viewport: &Viewport) -> (Vec2, Color) {
    (
        viewport.apply_point(corpse.position),
        Color::srgba_u8(100, 0, 0, corpse.alpha()),
    )
}

/// The player turns white while debug immortality is on.
pub fn player_color(player: &Player) -> Color {
    if player.is_debug_immortal() {
        IMMORTAL_PLAYER_COLOR
    } else {
        PLAYER_COLOR
    }
}

/// Screen pixels (origin top-left, y down) to Bevy's 2D space (origin at the
/// window centre, y up).
fn to_bevy(point: Vec2, screen: Vec2) -> Vec2 {
    Vec2::new(point.x - screen.x / 2.0, screen.y / 2.0 - point.y)
}

fn draw_shape(gizmos: &mut Gizmos, shape: Shape, screen: Vec2) {
    if shape.rect.is_empty() {
        return;
    }
    let center = to_bevy(shape.rect.center(), screen);
    gizmos.rect_2d(
        Isometry2d::from_translation(center),
        shape.rect.size(),
        shape.color,
    );
}

fn draw_walls_system(mut gizmos: Gizmos, walls: Query<&Wall>, viewport: Res<Viewport>) {
    let screen = viewport.screen_size();
    for wall in &walls {
        let shape = Shape {
            rect: viewport.apply(wall),
            color: WALL_COLOR,
        };
        draw_shape(&mut gizmos, shape, screen);
    }
}

fn draw_corpses_system(mut gizmos: Gizmos, corpses: Query<&Corpse>, viewport: Res<Viewport>) {
    let screen = viewport.screen_size();
    for corpse in &corpses {
        let (center, color) = corpse_mark(corpse, &viewport);
        gizmos.circle_2d(
            Isometry2d::from_translation(to_bevy(center, screen)),
            CORPSE_RADIUS,
            color,
        );
    }
}

fn draw_enemies_system(mut gizmos: Gizmos, enemies: Query<&Enemy>, viewport: Res<Viewport>) {
    let screen = viewport.screen_size();
    for enemy in &enemies {
        for shape in enemy_shapes(enemy, &viewport) {
            draw_shape(&mut gizmos, shape, screen);
        }
    }
}

fn draw_player_system(mut gizmos: Gizmos, players: Query<&Player>, viewport: Res<Viewport>) {
    let Ok(player) = players.single() else {
        return;
    };
    let shape = Shape {
        rect: viewport.apply(player),
        color: player_color(player),
    };
    draw_shape(&mut gizmos, shape, viewport.screen_size());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::EncounterConfig, enemy::Behaviour};

    fn viewport() -> Viewport {
        let mut viewport = Viewport::new(Vec2::new(1000.0, 800.0), Vec2::new(400.0, 300.0));
        viewport.update(Rect::from_center_size(Vec2::new(500.0, 400.0), Vec2::splat(20.0)));
        viewport
    }

    fn shadow_at(position: Vec2) -> Enemy {
        Enemy::new(
            Behaviour::FleeingShadow {
                teleport_cooldown: 0,
            },
            position,
            2.5,
            70,
            10.0,
            22.0,
        )
    }

    #[test]
    fn enemy_is_drawn_with_its_health_bar_above_it() {
        let viewport = viewport();
        let mut enemy = shadow_at(Vec2::new(400.0, 300.0));
        enemy.health = 35;

        let shapes = enemy_shapes(&enemy, &viewport);
        assert_eq!(shapes.len(), 3);

        let body = shapes[0];
        assert_eq!(body.rect.min, Vec2::new(100.0, 50.0));
        assert_eq!(body.color, Color::srgb_u8(100, 0, 100));

        let bar = shapes[1].rect;
        assert_eq!(bar.min, Vec2::new(100.0, 40.0));
        assert_eq!(bar.size(), Vec2::new(22.0, 5.0));

        // Half health fills half the bar.
        assert_eq!(shapes[2].rect.size(), Vec2::new(11.0, 5.0));
        assert_eq!(shapes[2].color, HEALTH_FILL);
    }

    #[test]
    fn disguised_mimic_is_a_chest_without_a_bar() {
        let config = EncounterConfig::default();
        let mut rng = rand::rngs::mock::StepRng::new(0, 0);
        let mimic = Enemy::spawn(EnemyKind::Mimic, Vec2::new(400.0, 300.0), &config, &mut rng);

        let shapes = enemy_shapes(&mimic, &viewport());
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].color, CHEST_BROWN);
        assert_eq!(shapes[1].color, CHEST_GOLD);
        assert_eq!(shapes[1].rect.min, shapes[0].rect.min + Vec2::splat(5.0));
        assert_eq!(shapes[1].rect.max, shapes[0].rect.max - Vec2::splat(5.0));
    }

    #[test]
    fn dead_enemies_are_not_drawn() {
        let mut enemy = shadow_at(Vec2::new(400.0, 300.0));
        enemy.take_damage(100);
        assert!(enemy_shapes(&enemy, &viewport()).is_empty());
    }

    #[test]
    fn corpses_fade_in_their_last_frames() {
        let viewport = viewport();
        let mut corpse = Corpse::new(Vec2::new(310.0, 260.0), 300);
        let (center, color) = corpse_mark(&corpse, &viewport);
        assert_eq!(center, Vec2::new(10.0, 10.0));
        assert_eq!(color, Color::srgba_u8(100, 0, 0, 255));

        corpse.countdown = 40;
        assert_eq!(corpse_mark(&corpse, &viewport).1, Color::srgba_u8(100, 0, 0, 40));
    }

    #[test]
    fn immortal_player_is_drawn_white() {
        let mut player = Player::new(Vec2::new(10.0, 10.0), 24.0);
        assert_eq!(player_color(&player), PLAYER_COLOR);
        player.toggle_debug_immortal();
        assert_eq!(player_color(&player), IMMORTAL_PLAYER_COLOR);
    }

    #[test]
    fn screen_space_maps_to_centred_bevy_space() {
        let screen = Vec2::new(400.0, 300.0);
        assert_eq!(to_bevy(Vec2::ZERO, screen), Vec2::new(-200.0, 150.0));
        assert_eq!(to_bevy(Vec2::new(200.0, 150.0), screen), Vec2::ZERO);
    }
}
