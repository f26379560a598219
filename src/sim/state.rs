//! Run state and entity types
//!
//! Everything one run owns lives in `RunState`; nothing outside the
//! simulation step mutates it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::is_out_of_bounds;
use super::weapon::{ProjectileKind, WeaponId};
use crate::consts::*;
use crate::settings::{DifficultySettings, RunConfig};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation suspended; no frames advance
    Paused,
    /// Magazine and reserve exhausted, waiting for a weapon pick
    Armory,
    /// Player health reached zero
    GameOver,
}

/// Timed player buffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Movement speed x1.5
    Speed,
    /// Every hit lands twice
    Damage,
    /// Incoming damage halved
    Shield,
    /// Three volleys per trigger pull
    TripleBurst,
    /// Two volleys per trigger pull
    DoubleBurst,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 5] = [
        PowerupKind::Speed,
        PowerupKind::Damage,
        PowerupKind::Shield,
        PowerupKind::TripleBurst,
        PowerupKind::DoubleBurst,
    ];
}

/// Remaining ticks for each powerup (0 = inactive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerupTimers {
    pub speed: u32,
    pub damage: u32,
    pub shield: u32,
    pub triple_burst: u32,
    pub double_burst: u32,
}

impl PowerupTimers {
    pub fn get(&self, kind: PowerupKind) -> u32 {
        match kind {
            PowerupKind::Speed => self.speed,
            PowerupKind::Damage => self.damage,
            PowerupKind::Shield => self.shield,
            PowerupKind::TripleBurst => self.triple_burst,
            PowerupKind::DoubleBurst => self.double_burst,
        }
    }

    fn slot(&mut self, kind: PowerupKind) -> &mut u32 {
        match kind {
            PowerupKind::Speed => &mut self.speed,
            PowerupKind::Damage => &mut self.damage,
            PowerupKind::Shield => &mut self.shield,
            PowerupKind::TripleBurst => &mut self.triple_burst,
            PowerupKind::DoubleBurst => &mut self.double_burst,
        }
    }

    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.get(kind) > 0
    }

    /// Reset a powerup's remaining duration (collecting again does not stack)
    pub fn activate(&mut self, kind: PowerupKind, duration: u32) {
        *self.slot(kind) = duration;
    }

    /// Count every active timer down by one tick
    pub fn tick_down(&mut self) {
        for kind in PowerupKind::ALL {
            let slot = self.slot(kind);
            *slot = slot.saturating_sub(1);
        }
    }

    /// Volleys per trigger pull
    pub fn volley_count(&self) -> u32 {
        if self.triple_burst > 0 {
            3
        } else if self.double_burst > 0 {
            2
        } else {
            1
        }
    }

    /// Discrete damage applications per enemy hit
    pub fn damage_hits(&self) -> u32 {
        if self.damage > 0 { 2 } else { 1 }
    }
}

/// Reload progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReloadState {
    #[default]
    Idle,
    Reloading { remaining: u32, total: u32 },
}

impl ReloadState {
    pub fn is_reloading(&self) -> bool {
        matches!(self, ReloadState::Reloading { .. })
    }

    /// Completed fraction in [0, 1] (0 when idle)
    pub fn progress(&self) -> f32 {
        match *self {
            ReloadState::Idle => 0.0,
            ReloadState::Reloading { remaining, total } => {
                1.0 - remaining as f32 / total.max(1) as f32
            }
        }
    }
}

/// Burst sequencing counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BurstState {
    /// Rounds still to fire in the current burst
    pub remaining: u32,
    /// Ticks until the next round
    pub delay: u32,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub base_speed: f32,
    /// Derived each tick from `base_speed` and the speed powerup
    pub speed: f32,
    pub weapon: WeaponId,
    pub ammo: u32,
    pub max_ammo: u32,
    pub reserve_ammo: u32,
    pub shoot_cooldown: u32,
    pub reload: ReloadState,
    pub burst: BurstState,
    pub powerups: PowerupTimers,
}

impl Player {
    pub fn new(pos: Vec2, weapon: WeaponId, level: u32) -> Self {
        let mut player = Self {
            pos,
            radius: PLAYER_RADIUS,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            base_speed: PLAYER_BASE_SPEED,
            speed: PLAYER_BASE_SPEED,
            weapon,
            ammo: 0,
            max_ammo: 0,
            reserve_ammo: 0,
            shoot_cooldown: 0,
            reload: ReloadState::Idle,
            burst: BurstState::default(),
            powerups: PowerupTimers::default(),
        };
        player.switch_weapon(weapon, level);
        player
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Apply incoming damage (halved by the shield), clamped at zero
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let amount = if self.powerups.is_active(PowerupKind::Shield) {
            amount * 0.5
        } else {
            amount
        };
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        amount
    }

    /// Move along a normalized input direction, staying inside `bounds`
    pub fn move_by(&mut self, direction: Vec2, bounds: Vec2) {
        let mut step = direction.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        if step.x != 0.0 && step.y != 0.0 {
            step *= DIAGONAL_SCALE;
        }
        self.pos += step * self.speed;
        let min = Vec2::splat(self.radius);
        let max = (bounds - min).max(min);
        self.pos = self.pos.clamp(min, max);
    }
}

/// A hostile unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    pub speed: f32,
    /// Ticks until the next shot is allowed
    pub shoot_cooldown: u32,
    /// Cooldown reset value after each shot
    pub shoot_delay: u32,
    /// Damage dealt to the player on direct contact
    pub contact_damage: f32,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtract health; true exactly once, on the hit that kills
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).clamp(0, self.max_health);
        self.health == 0
    }

    /// Force health to zero (contact with the player)
    pub fn destroy(&mut self) {
        self.health = 0;
    }
}

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A bullet, beam segment or rocket in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub radius: f32,
    pub kind: ProjectileKind,
    pub damage: i32,
    owner: Owner,
    /// Enemy IDs already damaged (piercing kinds only)
    hit_set: Vec<u32>,
}

impl Projectile {
    pub fn player(pos: Vec2, angle: f32, kind: ProjectileKind, damage: i32) -> Self {
        Self {
            pos,
            angle,
            speed: kind.speed(),
            radius: kind.radius(),
            kind,
            damage,
            owner: Owner::Player,
            hit_set: Vec::new(),
        }
    }

    pub fn enemy(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle,
            speed: ENEMY_BULLET_SPEED,
            radius: BULLET_RADIUS,
            kind: ProjectileKind::Normal,
            damage: ENEMY_BULLET_DAMAGE,
            owner: Owner::Enemy,
            hit_set: Vec::new(),
        }
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::from_angle(self.angle) * self.speed
    }

    pub fn has_hit(&self, enemy_id: u32) -> bool {
        self.hit_set.contains(&enemy_id)
    }

    pub fn record_hit(&mut self, enemy_id: u32) {
        if !self.has_hit(enemy_id) {
            self.hit_set.push(enemy_id);
        }
    }

    /// Move one tick; true when the projectile left the arena
    pub fn advance(&mut self, bounds: Vec2) -> bool {
        self.pos += self.velocity();
        is_out_of_bounds(self.pos, bounds, BOUNDS_MARGIN)
    }
}

/// Collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    HealthPack,
    Powerup(PowerupKind),
}

/// A pickup lying in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Ticks left before it disappears
    pub lifetime: u32,
}

impl Pickup {
    pub fn health_pack(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            kind: PickupKind::HealthPack,
            pos,
            radius: HEALTH_PACK_RADIUS,
            lifetime: HEALTH_PACK_LIFETIME,
        }
    }

    pub fn powerup(id: u32, pos: Vec2, kind: PowerupKind) -> Self {
        Self {
            id,
            kind: PickupKind::Powerup(kind),
            pos,
            radius: POWERUP_RADIUS,
            lifetime: POWERUP_LIFETIME,
        }
    }

    /// Count down one tick; true once expired
    pub fn advance(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime == 0
    }
}

/// Fire-and-forget signals for rendering, audio and UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    HitMarker { pos: Vec2 },
    DamageFlash { amount: f32 },
    KillBurst { pos: Vec2 },
    /// Every 20th kill
    MilestoneBurst { pos: Vec2, kills: u32 },
    Explosion { pos: Vec2, radius: f32 },
    PowerupBurst { pos: Vec2, kind: PowerupKind },
    HealBurst { pos: Vec2 },
    MuzzleFlash { pos: Vec2, projectiles: u32 },
}

/// Read-only HUD model taken after a frame resolves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub health: f32,
    pub max_health: f32,
    pub weapon: WeaponId,
    pub ammo: u32,
    pub max_ammo: u32,
    pub reserve_ammo: u32,
    pub kills: u32,
    pub level: u32,
    pub currency: u32,
    pub reloading: bool,
    pub reload_progress: f32,
    pub phase: GamePhase,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub config: RunConfig,
    /// Difficulty multipliers resolved at run start
    pub multipliers: DifficultySettings,
    pub rng: Pcg32,
    /// Arena size (width, height)
    pub bounds: Vec2,
    pub phase: GamePhase,
    pub time_ticks: u64,
    /// Progression level (1-based)
    pub level: u32,
    pub kills: u32,
    /// In-run currency
    pub currency: u32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    /// Signals emitted during the latest frame
    pub events: Vec<GameEvent>,
    /// Ticks until the next enemy batch
    pub spawn_timer: u32,
    next_id: u32,
}

impl RunState {
    pub fn new(config: RunConfig) -> Self {
        let bounds = Vec2::new(config.arena_width, config.arena_height);
        let level = config.starting_level.max(1);
        Self {
            multipliers: config.multipliers(),
            rng: Pcg32::seed_from_u64(config.seed),
            bounds,
            phase: GamePhase::Playing,
            time_ticks: 0,
            level,
            kills: 0,
            currency: 0,
            player: Player::new(bounds * 0.5, config.starting_weapon, level),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            events: Vec::new(),
            spawn_timer: FIRST_SPAWN_DELAY_TICKS,
            next_id: 1,
            config,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn hud(&self) -> HudSnapshot {
        let p = &self.player;
        HudSnapshot {
            health: p.health,
            max_health: p.max_health,
            weapon: p.weapon,
            ammo: p.ammo,
            max_ammo: p.max_ammo,
            reserve_ammo: p.reserve_ammo,
            kills: self.kills,
            level: self.level,
            currency: self.currency,
            reloading: p.reload.is_reloading(),
            reload_progress: p.reload.progress(),
            phase: self.phase,
        }
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}
