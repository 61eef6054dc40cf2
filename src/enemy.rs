// enemy.rs - What an enemy is and the rules it follows each frame.
//
// Everything here is plain data and plain methods: no queries, no commands.
// The ECS systems in movement.rs, health.rs and spawn_enemies.rs gather the
// inputs, call into these methods, and apply the results to the world.

use bevy::prelude::*;
use rand::Rng;

use crate::{
    arena::{hits_any_wall, overlaps, square_at, Bounded, Player},
    config::{EncounterConfig, EnemyStats},
};

/// The five kinds of enemy, without their per-kind state.
///
/// Used wherever only the kind matters: spawn weights, colours, logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Regular,
    FleeingShadow,
    Mimic,
    CorruptedThief,
    BloodboundSpawn,
}

impl EnemyKind {
    /// In spawn-table order.
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Regular,
        EnemyKind::FleeingShadow,
        EnemyKind::Mimic,
        EnemyKind::CorruptedThief,
        EnemyKind::BloodboundSpawn,
    ];
}

/// Per-kind state. Each variant carries only the fields that kind uses, so a
/// thief can't have a teleport cooldown and a shadow can't be disguised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behaviour {
    /// Walks straight at the player.
    Regular,
    /// Runs away once wounded and may blink across the map.
    FleeingShadow {
        /// Frames until the next teleport is allowed.
        teleport_cooldown: u32,
    },
    /// Sits still looking like a chest until the player gets close.
    Mimic {
        disguised: bool,
        triggered: bool,
        /// Speed once the disguise drops.
        triggered_speed: f32,
    },
    /// Steals sanity on contact.
    CorruptedThief { stolen_sanity: i32 },
    /// Hits harder for every fresh kill nearby.
    BloodboundSpawn { damage_base: f32 },
}

impl Behaviour {
    pub fn kind(&self) -> EnemyKind {
        match self {
            Behaviour::Regular => EnemyKind::Regular,
            Behaviour::FleeingShadow { .. } => EnemyKind::FleeingShadow,
            Behaviour::Mimic { .. } => EnemyKind::Mimic,
            Behaviour::CorruptedThief { .. } => EnemyKind::CorruptedThief,
            Behaviour::BloodboundSpawn { .. } => EnemyKind::BloodboundSpawn,
        }
    }
}

/// What a call to [`Enemy::take_damage`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Survived,
    /// This hit brought health to zero or below. Reported exactly once.
    Killed,
    /// The enemy was already dead; nothing changed.
    AlreadyDead,
}

impl DamageOutcome {
    pub fn killed(self) -> bool {
        self == DamageOutcome::Killed
    }
}

/// Frame-start view of another enemy.
///
/// Enemies update one after another, so each reads this snapshot instead of
/// the live components; nobody sees a sibling's move from the same frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sibling {
    pub position: Vec2,
    pub active: bool,
}

impl Sibling {
    pub fn of(enemy: &Enemy) -> Self {
        Self {
            position: enemy.position,
            active: enemy.active,
        }
    }
}

/// Everything about the world an enemy reads during its update.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub walls: &'a [Rect],
    pub siblings: &'a [Sibling],
    pub map_size: Vec2,
}

/// A hostile entity.
///
/// `active` goes false the moment health reaches zero. A dead enemy stays in
/// the world, ignored by everything except BloodboundSpawn, until the
/// reconciliation pass at the end of the frame turns it into a corpse.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Enemy {
    /// Top-left corner in world pixels.
    pub position: Vec2,
    /// Pixels per frame.
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    pub damage: f32,
    pub size: f32,
    pub active: bool,
    /// Frames until contact damage can land again.
    pub attack_cooldown: u32,
    pub behaviour: Behaviour,
}

impl Enemy {
    pub fn new(
        behaviour: Behaviour,
        position: Vec2,
        speed: f32,
        health: i32,
        damage: f32,
        size: f32,
    ) -> Self {
        assert!(health > 0, "enemies start alive");
        assert!(size > 0.0, "enemies need a body");
        Self {
            position,
            speed,
            health,
            max_health: health,
            damage,
            size,
            active: true,
            attack_cooldown: 0,
            behaviour,
        }
    }

    /// Builds a fresh enemy of `kind` at `position`.
    ///
    /// Regular enemies roll their speed, health and damage; every other kind
    /// uses the fixed stats from the config.
    pub fn spawn(
        kind: EnemyKind,
        position: Vec2,
        config: &EncounterConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let size = config.enemy_size();
        let with_stats = |behaviour: Behaviour, stats: EnemyStats| {
            Enemy::new(behaviour, position, stats.speed, stats.health, stats.damage, size)
        };

        match kind {
            EnemyKind::Regular => {
                let (min_speed, max_speed) = config.regular_speed;
                let (min_health, max_health) = config.regular_health;
                let (min_damage, max_damage) = config.regular_damage;
                Enemy::new(
                    Behaviour::Regular,
                    position,
                    rng.gen_range(min_speed..max_speed),
                    rng.gen_range(min_health..=max_health),
                    rng.gen_range(min_damage..=max_damage) as f32,
                    size,
                )
            }
            EnemyKind::FleeingShadow => with_stats(
                Behaviour::FleeingShadow {
                    teleport_cooldown: 0,
                },
                config.fleeing_shadow,
            ),
            EnemyKind::Mimic => with_stats(
                Behaviour::Mimic {
                    disguised: true,
                    triggered: false,
                    triggered_speed: config.mimic_triggered_speed,
                },
                config.mimic,
            ),
            EnemyKind::CorruptedThief => with_stats(
                Behaviour::CorruptedThief { stolen_sanity: 0 },
                config.corrupted_thief,
            ),
            EnemyKind::BloodboundSpawn => with_stats(
                Behaviour::BloodboundSpawn {
                    damage_base: config.bloodbound_spawn.damage,
                },
                config.bloodbound_spawn,
            ),
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.behaviour.kind()
    }

    pub fn is_disguised(&self) -> bool {
        matches!(self.behaviour, Behaviour::Mimic { disguised: true, .. })
    }

    #[cfg(test)]
    fn is_triggered(&self) -> bool {
        matches!(self.behaviour, Behaviour::Mimic { triggered: true, .. })
    }

    /// Zero for everything that isn't a shadow.
    #[cfg(test)]
    fn teleport_cooldown(&self) -> u32 {
        match self.behaviour {
            Behaviour::FleeingShadow { teleport_cooldown } => teleport_cooldown,
            _ => 0,
        }
    }

    pub fn stolen_sanity(&self) -> i32 {
        match self.behaviour {
            Behaviour::CorruptedThief { stolen_sanity } => stolen_sanity,
            _ => 0,
        }
    }

    pub fn health_ratio(&self) -> f32 {
        (self.health.max(0) as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    /// Per-frame entry point. Dead enemies do nothing.
    ///
    /// Cooldowns tick first, so a cooldown that reaches zero this frame can
    /// already be used this frame. An untriggered mimic only watches for the
    /// player; everything else moves.
    pub fn update(
        &mut self,
        player: &mut Player,
        around: &Surroundings,
        config: &EncounterConfig,
        rng: &mut impl Rng,
    ) {
        if !self.active {
            return;
        }

        self.tick_cooldowns();

        let distance = self.distance_to(player.position);
        if let Behaviour::Mimic {
            disguised,
            triggered,
            triggered_speed,
        } = &mut self.behaviour
        {
            if !*triggered {
                if distance < config.mimic_trigger_distance {
                    *disguised = false;
                    *triggered = true;
                    self.speed = *triggered_speed;
                    debug!("Mimic at {} revealed itself", self.position);
                }
                return;
            }
        }

        self.move_step(player, around, config, rng);
    }

    /// Base movement followed by exactly one kind-specific hook.
    pub fn move_step(
        &mut self,
        player: &mut Player,
        around: &Surroundings,
        config: &EncounterConfig,
        rng: &mut impl Rng,
    ) {
        if !self.active {
            return;
        }
        if let Behaviour::Mimic {
            triggered: false, ..
        } = self.behaviour
        {
            return;
        }

        self.chase(player.position, around, config);

        match self.behaviour {
            Behaviour::FleeingShadow { teleport_cooldown } => {
                if teleport_cooldown == 0
                    && self.is_wounded(config)
                    && rng.gen_bool(config.teleport_chance)
                {
                    self.teleport(around.walls, around.map_size, config, rng);
                }
            }
            Behaviour::CorruptedThief { .. } => {
                if overlaps(self.bounds(), player.bounds()) {
                    let taken = player.drain_sanity(config.thief_drain_per_contact);
                    if let Behaviour::CorruptedThief { stolen_sanity } = &mut self.behaviour {
                        *stolen_sanity += taken;
                    }
                }
            }
            Behaviour::BloodboundSpawn { damage_base } => {
                let nearby = self.count_fresh_kills(around, config.bloodbound_sense_radius);
                self.damage =
                    damage_base * (1.0 + nearby as f32 * config.bloodbound_bonus_per_corpse);
            }
            Behaviour::Regular | Behaviour::Mimic { .. } => {}
        }
    }

    /// Subtracts `amount` from health. The hit that takes health to zero
    /// reports `Killed`; anything after that is ignored.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.active {
            return DamageOutcome::AlreadyDead;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.active = false;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Survived
        }
    }

    /// Tries up to `teleport_attempts` random spots inside the map margin and
    /// jumps to the first one clear of walls. Returns false, leaving position
    /// and cooldown alone, when every spot was blocked.
    pub fn teleport(
        &mut self,
        walls: &[Rect],
        map_size: Vec2,
        config: &EncounterConfig,
        rng: &mut impl Rng,
    ) -> bool {
        let margin = config.teleport_margin as i32;
        let max_x = map_size.x as i32 - margin;
        let max_y = map_size.y as i32 - margin;
        if max_x < margin || max_y < margin {
            return false;
        }

        for _ in 0..config.teleport_attempts {
            let candidate = Vec2::new(
                rng.gen_range(margin..=max_x) as f32,
                rng.gen_range(margin..=max_y) as f32,
            );
            if hits_any_wall(square_at(candidate, self.size), walls) {
                continue;
            }

            debug!("{:?} teleported {} -> {}", self.kind(), self.position, candidate);
            self.position = candidate;
            if let Behaviour::FleeingShadow { teleport_cooldown } = &mut self.behaviour {
                *teleport_cooldown = config.teleport_cooldown_frames;
            }
            return true;
        }
        false
    }

    /// Contact damage against the player, at most once per cooldown.
    ///
    /// Returns the damage to apply, or None when this enemy can't hit right
    /// now (dead, disguised, cooling down, or not touching the player).
    pub fn contact_attack(&mut self, player: &Player, config: &EncounterConfig) -> Option<i32> {
        if !self.active || self.is_disguised() || self.attack_cooldown > 0 {
            return None;
        }
        if !overlaps(self.bounds(), player.bounds()) {
            return None;
        }
        self.attack_cooldown = config.contact_attack_cooldown_frames;
        Some(self.damage.round() as i32)
    }

    fn tick_cooldowns(&mut self) {
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        if let Behaviour::FleeingShadow { teleport_cooldown } = &mut self.behaviour {
            *teleport_cooldown = teleport_cooldown.saturating_sub(1);
        }
    }

    fn is_wounded(&self, config: &EncounterConfig) -> bool {
        f64::from(self.health) <= f64::from(self.max_health) * f64::from(config.flee_health_fraction)
    }

    /// Wounded shadows run; everything else closes in.
    fn flees(&self, config: &EncounterConfig) -> bool {
        matches!(self.behaviour, Behaviour::FleeingShadow { .. }) && self.is_wounded(config)
    }

    /// Steps `speed` pixels toward (or away from) `target`, one axis at a
    /// time so a wall on one axis still lets the enemy slide along the other.
    fn chase(&mut self, target: Vec2, around: &Surroundings, config: &EncounterConfig) {
        let mut direction = (target - self.position).normalize_or_zero();
        if self.flees(config) {
            direction = -direction;
        }
        let step = direction * self.speed;
        let max = (around.map_size - Vec2::splat(self.size)).max(Vec2::ZERO);

        let next_x = (self.position.x + step.x).clamp(0.0, max.x);
        let moved_x = Vec2::new(next_x, self.position.y);
        if !hits_any_wall(square_at(moved_x, self.size), around.walls) {
            self.position = moved_x;
        }

        let next_y = (self.position.y + step.y).clamp(0.0, max.y);
        let moved_y = Vec2::new(self.position.x, next_y);
        if !hits_any_wall(square_at(moved_y, self.size), around.walls) {
            self.position = moved_y;
        }
    }

    /// Dead siblings within `radius` that haven't been reconciled yet.
    ///
    /// A kill is only visible here for the frame between the hit and the
    /// reconciliation pass; once it is a `Corpse` it no longer counts.
    fn count_fresh_kills(&self, around: &Surroundings, radius: f32) -> usize {
        around
            .siblings
            .iter()
            .filter(|sibling| !sibling.active && self.distance_to(sibling.position) < radius)
            .count()
    }
}

impl Bounded for Enemy {
    fn bounds(&self) -> Rect {
        square_at(self.position, self.size)
    }
}
