use bevy::prelude::*;
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};

use crate::{
    arena::{hits_any_wall, square_at, Player, Wall},
    config::{EncounterConfig, SpawnWeights},
    enemy::{Enemy, EnemyKind},
    resources::{EncounterRng, Level, MapSize},
    EncounterSet,
};

pub struct SpawnEnemiesPlugin;

impl Plugin for SpawnEnemiesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnController>()
            .add_systems(Update, spawn_enemies_system.in_set(EncounterSet::Spawn));
    }
}

/// Keeps a level populated without burying the player.
///
/// One controller exists per level; the level plugin swaps in a new one
/// whenever the level changes.
#[derive(Resource, Debug, Clone)]
pub struct SpawnController {
    level: u32,
    /// Frames until the next spawn attempt.
    pub spawn_timer: u32,
    target_count: usize,
    weights: WeightedIndex<f32>,
}

impl SpawnController {
    pub fn new(level: u32, config: &EncounterConfig) -> Self {
        Self {
            level,
            spawn_timer: 0,
            target_count: config.target_count(level),
            weights: weight_table(&config.spawn_weights),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// One frame of spawning. Returns the enemy to add to the world, if any.
    ///
    /// At or over the target count nothing happens, not even the timer. Under
    /// it, the timer counts down first; only a timer already at zero tries to
    /// place an enemy. A failed placement leaves the timer at zero so the next
    /// frame tries again.
    pub fn tick(
        &mut self,
        enemy_count: usize,
        player: &Player,
        walls: &[Rect],
        map: MapSize,
        config: &EncounterConfig,
        rng: &mut impl Rng,
    ) -> Option<Enemy> {
        if enemy_count >= self.target_count {
            return None;
        }
        if self.spawn_timer > 0 {
            self.spawn_timer -= 1;
            return None;
        }

        let position = find_spawn_point(player, walls, map, config, rng)?;
        let kind = self.pick_kind(rng);
        let enemy = Enemy::spawn(kind, position, config, rng);

        let (min_delay, max_delay) = config.spawn_delay_frames;
        self.spawn_timer = rng.gen_range(min_delay..=max_delay);
        Some(enemy)
    }

    pub fn pick_kind(&self, rng: &mut impl Rng) -> EnemyKind {
        EnemyKind::ALL[self.weights.sample(rng)]
    }
}

impl FromWorld for SpawnController {
    fn from_world(world: &mut World) -> Self {
        let level = world.get_resource::<Level>().copied().unwrap_or_default();
        SpawnController::new(level.0, world.resource::<EncounterConfig>())
    }
}

/// Builds the weighted table in `EnemyKind::ALL` order.
///
/// Weights come from a hand-edited file; a table that can't be sampled (all
/// zero, negative, NaN) is logged and replaced with the built-in odds.
fn weight_table(weights: &SpawnWeights) -> WeightedIndex<f32> {
    let table = EnemyKind::ALL.map(|kind| weights.weight(kind));
    match WeightedIndex::new(table) {
        Ok(index) => index,
        Err(e) => {
            error!("Invalid spawn weights {:?}: {}. Using defaults.", weights, e);
            let defaults = SpawnWeights::default();
            let table = EnemyKind::ALL.map(|kind| defaults.weight(kind));
            WeightedIndex::new(table).expect("built-in spawn weights are valid")
        }
    }
}

/// Tries up to `spawn_attempts` tile-aligned spots inside the map border and
/// returns the first that is far enough from the player and clear of walls.
pub fn find_spawn_point(
    player: &Player,
    walls: &[Rect],
    map: MapSize,
    config: &EncounterConfig,
    rng: &mut impl Rng,
) -> Option<Vec2> {
    let (tiles_w, tiles_h) = map.tiles(config.tile_size);
    // Keep two tiles clear of every edge.
    if tiles_w < 4 || tiles_h < 4 {
        return None;
    }

    for _ in 0..config.spawn_attempts {
        let tile_x = rng.gen_range(2..=tiles_w - 2);
        let tile_y = rng.gen_range(2..=tiles_h - 2);
        let candidate = Vec2::new(tile_x as f32, tile_y as f32) * config.tile_size;

        if candidate.distance(player.position) <= config.spawn_min_player_distance {
            continue;
        }
        if hits_any_wall(square_at(candidate, config.enemy_size()), walls) {
            continue;
        }
        return Some(candidate);
    }
    None
}

fn spawn_enemies_system(
    mut commands: Commands,
    mut spawner: ResMut<SpawnController>,
    mut rng: ResMut<EncounterRng>,
    config: Res<EncounterConfig>,
    map: Res<MapSize>,
    players: Query<&Player>,
    walls: Query<&Wall>,
    enemies: Query<(), With<Enemy>>,
) {
    let Ok(player) = players.single() else {
        return;
    };
    let wall_boxes: Vec<Rect> = walls.iter().map(|wall| wall.0).collect();
    let enemy_count = enemies.iter().count();

    if let Some(enemy) = spawner.tick(enemy_count, player, &wall_boxes, *map, &config, &mut rng.0) {
        debug!(
            "Spawned {:?} at {} ({}/{})",
            enemy.kind(),
            enemy.position,
            enemy_count + 1,
            spawner.target_count()
        );
        commands.spawn(enemy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashMap;

    fn level_one() -> (EncounterConfig, MapSize) {
        let config = EncounterConfig::default();
        let map = MapSize::for_level(1, &config);
        (config, map)
    }

    #[test]
    fn full_level_does_nothing_at_all() {
        let (config, map) = level_one();
        let mut spawner = SpawnController::new(1, &config);
        spawner.spawn_timer = 10;
        let player = Player::new(Vec2::new(50.0, 50.0), 22.0);
        let mut rng = StdRng::seed_from_u64(1);
        let spawned = spawner.tick(3, &player, &[], map, &config, &mut rng);
        assert!(spawned.is_none());
        assert_eq!(spawner.spawn_timer, 10);
    }

    #[test]
    fn timer_counts_down_before_spawning() {
        let (config, map) = level_one();
        let mut spawner = SpawnController::new(1, &config);
        spawner.spawn_timer = 2;
        let player = Player::new(Vec2::new(50.0, 50.0), 22.0);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(spawner.tick(0, &player, &[], map, &config, &mut rng).is_none());
        assert!(spawner.tick(0, &player, &[], map, &config, &mut rng).is_none());
        assert_eq!(spawner.spawn_timer, 0);
        assert!(spawner.tick(0, &player, &[], map, &config, &mut rng).is_some());
        assert!((60..=180).contains(&spawner.spawn_timer));
    }

    #[test]
    fn blocked_map_retries_next_frame() {
        let (config, map) = level_one();
        let mut spawner = SpawnController::new(1, &config);
        let player = Player::new(Vec2::new(50.0, 50.0), 22.0);
        let everywhere = [Rect::new(0.0, 0.0, map.width(), map.height())];
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..5 {
            assert!(spawner
                .tick(0, &player, &everywhere, map, &config, &mut rng)
                .is_none());
            assert_eq!(spawner.spawn_timer, 0);
        }
        assert!(spawner.tick(0, &player, &[], map, &config, &mut rng).is_some());
    }

    #[test]
    fn weighted_choice_follows_the_table() {
        let config = EncounterConfig::default();
        let spawner = SpawnController::new(1, &config);
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<EnemyKind, u32> = HashMap::new();
        let draws = 20_000;
        for _ in 0..draws {
            *counts.entry(spawner.pick_kind(&mut rng)).or_default() += 1;
        }
        for kind in EnemyKind::ALL {
            let expected = config.spawn_weights.weight(kind);
            let seen = counts[&kind] as f32 / draws as f32;
            assert!(
                (seen - expected).abs() < 0.02,
                "{kind:?}: expected {expected}, saw {seen}"
            );
        }
    }

    #[test]
    fn invalid_weights_fall_back_to_defaults() {
        let config = EncounterConfig {
            spawn_weights: SpawnWeights {
                regular: 0.0,
                fleeing_shadow: 0.0,
                mimic: 0.0,
                corrupted_thief: 0.0,
                bloodbound_spawn: 0.0,
            },
            ..default()
        };
        let spawner = SpawnController::new(1, &config);
        let mut rng = StdRng::seed_from_u64(5);
        let kinds: Vec<EnemyKind> = (0..200).map(|_| spawner.pick_kind(&mut rng)).collect();
        assert!(kinds.contains(&EnemyKind::Regular));
    }

    #[test]
    fn single_kind_table() {
        let config = EncounterConfig {
            spawn_weights: SpawnWeights {
                regular: 0.0,
                fleeing_shadow: 0.0,
                mimic: 1.0,
                corrupted_thief: 0.0,
                bloodbound_spawn: 0.0,
            },
            ..default()
        };
        let spawner = SpawnController::new(1, &config);
        let mut rng = StdRng::seed_from_u64(5);
        assert!((0..100).all(|_| spawner.pick_kind(&mut rng) == EnemyKind::Mimic));
    }

    #[test]
    fn spawn_points_are_tile_aligned_and_inside_the_border() {
        let (config, map) = level_one();
        let player = Player::new(Vec2::new(50.0, 50.0), 22.0);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let Some(point) = find_spawn_point(&player, &[], map, &config, &mut rng) else {
                continue;
            };
            assert_eq!(point.x % config.tile_size, 0.0);
            assert_eq!(point.y % config.tile_size, 0.0);
            assert!(point.x >= 2.0 * config.tile_size);
            assert!(point.x + config.enemy_size() <= map.width() - config.tile_size);
            assert!(point.y + config.enemy_size() <= map.height() - config.tile_size);
        }
    }

    proptest! {
        #[test]
        fn every_spawn_is_clear_and_far(
            seed in any::<u64>(),
            player_x in 0.0f32..1000.0,
            player_y in 0.0f32..700.0,
            pillar_x in 2u32..30,
            pillar_y in 2u32..20,
        ) {
            let (config, map) = level_one();
            let mut spawner = SpawnController::new(1, &config);
            let player = Player::new(Vec2::new(player_x, player_y), 22.0);
            let walls = [
                Wall::tile(pillar_x, pillar_y, config.tile_size).0,
                Wall::tile(pillar_x + 1, pillar_y, config.tile_size).0,
                Rect::new(0.0, 0.0, map.width(), config.tile_size),
            ];
            let mut rng = StdRng::seed_from_u64(seed);

            let mut count = 0;
            for _ in 0..2_000 {
                if let Some(enemy) = spawner.tick(count, &player, &walls, map, &config, &mut rng) {
                    prop_assert!(!hits_any_wall(square_at(enemy.position, enemy.size), &walls));
                    prop_assert!(enemy.position.distance(player.position) > 300.0);
                    count += 1;
                }
                prop_assert!(count <= spawner.target_count());
            }
        }
    }
}
