//! Enemy spawning and kill drops
//!
//! Both draw from the run's seeded RNG so a run replays identically for a
//! given seed and input sequence.

use glam::Vec2;
use rand::Rng;

use super::state::{Enemy, Pickup, PowerupKind, Projectile, RunState};
use crate::consts::*;
use crate::settings::DifficultySettings;
use crate::{aim_angle, ms_to_ticks};

/// What a kill drops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    Nothing,
    HealthPack,
    Powerup,
}

/// Map a uniform roll in [0, 1) onto the drop table
pub fn drop_for_roll(roll: f32) -> DropKind {
    if roll < HEALTH_DROP_CHANCE {
        DropKind::HealthPack
    } else if roll < POWERUP_DROP_CHANCE {
        DropKind::Powerup
    } else {
        DropKind::Nothing
    }
}

/// Enemies per spawn batch at `level`
pub fn enemies_per_spawn(level: u32) -> u32 {
    (1 + level / 3).min(MAX_ENEMIES_PER_SPAWN)
}

/// Ticks until the next batch (randomised)
pub fn next_spawn_delay<R: Rng>(level: u32, multipliers: &DifficultySettings, rng: &mut R) -> u32 {
    let base_ms = 1200.0_f32 - level as f32 * 50.0;
    let base_ms = base_ms.max(400.0) * multipliers.spawn_delay;
    ms_to_ticks(base_ms + rng.random::<f32>() * 300.0).max(1)
}

/// Build an enemy just outside a random arena edge
pub fn create_enemy<R: Rng>(
    id: u32,
    bounds: Vec2,
    level: u32,
    multipliers: &DifficultySettings,
    rng: &mut R,
) -> Enemy {
    let pos = match rng.random_range(0..4) {
        0 => Vec2::new(rng.random::<f32>() * bounds.x, -ENEMY_SPAWN_MARGIN),
        1 => Vec2::new(bounds.x + ENEMY_SPAWN_MARGIN, rng.random::<f32>() * bounds.y),
        2 => Vec2::new(rng.random::<f32>() * bounds.x, bounds.y + ENEMY_SPAWN_MARGIN),
        _ => Vec2::new(-ENEMY_SPAWN_MARGIN, rng.random::<f32>() * bounds.y),
    };

    let level_f = level as f32;
    let speed = (1.5 + rng.random::<f32>() * 0.8 + level_f * 0.08) * multipliers.enemy_speed;
    let base_health = (2 + level / 5) as f32;
    let health = ((base_health * multipliers.enemy_health).ceil() as i32).max(1);
    let shoot_delay = ((100.0 - level_f * 3.0).max(60.0) + rng.random::<f32>() * 60.0)
        * multipliers.shoot_delay;

    Enemy {
        id,
        pos,
        radius: ENEMY_RADIUS,
        health,
        max_health: health,
        speed,
        shoot_cooldown: 0,
        shoot_delay: (shoot_delay.round() as u32).max(1),
        contact_damage: ENEMY_BASE_CONTACT_DAMAGE * multipliers.enemy_damage,
    }
}

impl Enemy {
    /// Pursue the player and shoot when in range; true if it should be dropped
    pub fn advance<R: Rng>(&mut self, target: Vec2, rng: &mut R, out: &mut Vec<Projectile>) -> bool {
        if !self.is_alive() {
            return true;
        }

        let to_target = target - self.pos;
        let dist = to_target.length();
        if dist > ENEMY_STANDOFF {
            self.pos += to_target / dist * self.speed;
        }

        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
        if self.shoot_cooldown == 0 && dist < ENEMY_FIRE_RANGE {
            let jitter = (rng.random::<f32>() - 0.5) * ENEMY_AIM_JITTER;
            out.push(Projectile::enemy(self.pos, aim_angle(self.pos, target) + jitter));
            self.shoot_cooldown = self.shoot_delay;
        }
        false
    }
}

/// Count down to the next batch and spawn it when due
pub fn advance_spawner(state: &mut RunState) {
    state.spawn_timer = state.spawn_timer.saturating_sub(1);
    if state.spawn_timer == 0 {
        spawn_batch(state);
    }
}

/// Spawn one batch and schedule the next
pub fn spawn_batch(state: &mut RunState) {
    let count = enemies_per_spawn(state.level);
    for _ in 0..count {
        let id = state.next_entity_id();
        let enemy = create_enemy(id, state.bounds, state.level, &state.multipliers, &mut state.rng);
        state.enemies.push(enemy);
    }
    state.spawn_timer = next_spawn_delay(state.level, &state.multipliers, &mut state.rng);
    log::debug!(
        "Spawned {} enemies at level {} (next in {} ticks)",
        count,
        state.level,
        state.spawn_timer
    );
}

/// Roll the drop table for one confirmed kill
pub fn roll_drop(state: &mut RunState) {
    let roll = state.rng.random::<f32>();
    let drop = drop_for_roll(roll);
    if drop == DropKind::Nothing {
        return;
    }

    let inset = Vec2::splat(PICKUP_EDGE_INSET);
    let span = (state.bounds - inset * 2.0).max(Vec2::ZERO);
    let pos = inset + Vec2::new(state.rng.random::<f32>(), state.rng.random::<f32>()) * span;
    let id = state.next_entity_id();

    let pickup = match drop {
        DropKind::HealthPack => Pickup::health_pack(id, pos),
        _ => {
            let index = state.rng.random_range(0..PowerupKind::ALL.len());
            Pickup::powerup(id, pos, PowerupKind::ALL[index])
        }
    };
    state.pickups.push(pickup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, RunConfig};
    use crate::sim::state::{Owner, PickupKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_drop_table_bands() {
        assert_eq!(drop_for_roll(0.0), DropKind::HealthPack);
        assert_eq!(drop_for_roll(0.149), DropKind::HealthPack);
        assert_eq!(drop_for_roll(0.15), DropKind::Powerup);
        assert_eq!(drop_for_roll(0.549), DropKind::Powerup);
        assert_eq!(drop_for_roll(0.55), DropKind::Nothing);
        assert_eq!(drop_for_roll(0.99), DropKind::Nothing);
    }

    #[test]
    fn test_enemies_per_spawn_caps() {
        assert_eq!(enemies_per_spawn(1), 1);
        assert_eq!(enemies_per_spawn(3), 2);
        assert_eq!(enemies_per_spawn(6), 3);
        assert_eq!(enemies_per_spawn(30), MAX_ENEMIES_PER_SPAWN);
    }

    #[test]
    fn test_enemy_stats_scale_with_difficulty() {
        let bounds = Vec2::new(800.0, 600.0);
        let mut rng = Pcg32::seed_from_u64(3);
        let normal = create_enemy(1, bounds, 1, &Difficulty::Normal.settings(), &mut rng);
        let hard = create_enemy(2, bounds, 1, &Difficulty::Hard.settings(), &mut rng);
        let easy = create_enemy(3, bounds, 1, &Difficulty::Easy.settings(), &mut rng);

        assert_eq!(normal.health, 2);
        assert_eq!(hard.health, 5); // ceil(2 * 2.2)
        assert_eq!(easy.health, 2); // ceil(2 * 0.6)
        assert!((hard.contact_damage - 9.0).abs() < 1e-4);

        // Spawned just outside the arena
        let p = normal.pos;
        assert!(p.x < 0.0 || p.y < 0.0 || p.x > bounds.x || p.y > bounds.y);
    }

    #[test]
    fn test_spawn_delay_range() {
        let mut rng = Pcg32::seed_from_u64(11);
        let settings = DifficultySettings::default();
        for _ in 0..50 {
            let ticks = next_spawn_delay(1, &settings, &mut rng);
            assert!((69..=87).contains(&ticks), "{ticks}");
        }
    }

    #[test]
    fn test_enemy_keeps_distance_and_fires() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut enemy = create_enemy(1, Vec2::new(800.0, 600.0), 1, &DifficultySettings::default(), &mut rng);
        enemy.pos = Vec2::new(100.0, 0.0);
        let mut out = Vec::new();

        assert!(!enemy.advance(Vec2::ZERO, &mut rng, &mut out));
        assert_eq!(enemy.pos, Vec2::new(100.0, 0.0));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].owner(), Owner::Enemy);
        assert_eq!(enemy.shoot_cooldown, enemy.shoot_delay);

        enemy.advance(Vec2::ZERO, &mut rng, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_enemy_pursues_from_afar_without_firing() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut enemy = create_enemy(1, Vec2::new(800.0, 600.0), 1, &DifficultySettings::default(), &mut rng);
        enemy.pos = Vec2::new(600.0, 0.0);
        let mut out = Vec::new();
        enemy.advance(Vec2::ZERO, &mut rng, &mut out);
        assert!(enemy.pos.x < 600.0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_spawner_batches() {
        let mut state = RunState::new(RunConfig::default());
        state.spawn_timer = 1;
        advance_spawner(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.spawn_timer > 0);

        state.level = 9;
        spawn_batch(&mut state);
        assert_eq!(state.enemies.len(), 5);
    }

    #[test]
    fn test_drops_land_inside_arena() {
        let mut state = RunState::new(RunConfig::default());
        for _ in 0..200 {
            roll_drop(&mut state);
        }
        assert!(!state.pickups.is_empty());
        assert!(state.pickups.len() < 200);
        for pickup in &state.pickups {
            assert!(pickup.pos.x >= PICKUP_EDGE_INSET && pickup.pos.x <= state.bounds.x - PICKUP_EDGE_INSET);
            assert!(pickup.pos.y >= PICKUP_EDGE_INSET && pickup.pos.y <= state.bounds.y - PICKUP_EDGE_INSET);
        }
        assert!(state.pickups.iter().any(|p| p.kind == PickupKind::HealthPack));
        assert!(state.pickups.iter().any(|p| matches!(p.kind, PickupKind::Powerup(_))));
    }
}
