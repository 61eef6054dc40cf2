use bevy::prelude::*;

use dread_encounters::{
    arena::{hits_any_wall, square_at, Player, Wall},
    config::EncounterConfig,
    enemy::Enemy,
    health::EnemyHit,
    level::change_level_system,
    render::RenderPlugin,
    resources::{Level, MapSize},
    EncounterPlugin, EncounterSet,
};

const PLAYER_SIZE: f32 = 24.0;
const PLAYER_SPEED: f32 = 4.0;
const STRIKE_RANGE: f32 = 50.0;
const STRIKE_DAMAGE: i32 = 25;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Dread Encounters".into(),
                    ..default()
                }),
                ..default()
            }),
            EncounterPlugin,
            RenderPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            build_arena_system
                .in_set(EncounterSet::Level)
                .after(change_level_system),
        )
        .add_systems(
            Update,
            player_input_system
                .after(EncounterSet::Level)
                .before(EncounterSet::Spawn),
        )
        .run();
}

fn setup(mut commands: Commands, config: Res<EncounterConfig>) {
    commands.spawn(Camera2d);
    commands.spawn(Player::new(start_position(&config), PLAYER_SIZE));
    info!("Arrows move, Space strikes, F1 toggles immortality, N descends");
}

fn start_position(config: &EncounterConfig) -> Vec2 {
    Vec2::splat(3.0 * config.tile_size)
}

/// Rebuilds the border walls and pillars whenever the map size changes, and
/// puts the player back at the entrance.
fn build_arena_system(
    mut commands: Commands,
    map: Res<MapSize>,
    config: Res<EncounterConfig>,
    walls: Query<Entity, With<Wall>>,
    mut players: Query<&mut Player>,
) {
    if !map.is_changed() {
        return;
    }

    for entity in &walls {
        commands.entity(entity).despawn();
    }

    let (tiles_w, tiles_h) = map.tiles(config.tile_size);
    for x in 0..tiles_w {
        for y in 0..tiles_h {
            let border = x == 0 || y == 0 || x == tiles_w - 1 || y == tiles_h - 1;
            let pillar = x % 8 == 5 && y % 6 == 4;
            if border || pillar {
                commands.spawn(Wall::tile(x, y, config.tile_size));
            }
        }
    }

    if let Ok(mut player) = players.single_mut() {
        player.position = start_position(&config);
    }
}

fn player_input_system(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    mut players: Query<&mut Player>,
    walls: Query<&Wall>,
    enemies: Query<(Entity, &Enemy)>,
    map: Res<MapSize>,
    mut level: ResMut<Level>,
) {
    let Ok(mut player) = players.single_mut() else {
        return;
    };

    if keys.just_pressed(KeyCode::F1) {
        player.toggle_debug_immortal();
    }
    if keys.just_pressed(KeyCode::KeyN) {
        level.0 += 1;
        return;
    }

    let mut direction = Vec2::ZERO;
    if keys.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }
    if keys.pressed(KeyCode::ArrowUp) {
        direction.y -= 1.0;
    }
    if keys.pressed(KeyCode::ArrowDown) {
        direction.y += 1.0;
    }

    let wall_boxes: Vec<Rect> = walls.iter().map(|wall| wall.0).collect();
    let max = map.0 - Vec2::splat(player.size);
    let step = direction * PLAYER_SPEED;
    for axis_step in [Vec2::new(step.x, 0.0), Vec2::new(0.0, step.y)] {
        let next = (player.position + axis_step).clamp(Vec2::ZERO, max);
        if !hits_any_wall(square_at(next, player.size), &wall_boxes) {
            player.position = next;
        }
    }

    if keys.just_pressed(KeyCode::Space) {
        let center = player.position + Vec2::splat(player.size / 2.0);
        for (entity, enemy) in &enemies {
            if enemy.active && enemy.distance_to(center) < STRIKE_RANGE {
                commands.trigger(EnemyHit {
                    enemy: entity,
                    amount: STRIKE_DAMAGE,
                });
            }
        }
    }
}
