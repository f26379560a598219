//! Tactical Strike - combat simulation core for a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic per-frame simulation (weapons, collisions, kills, drops)
//! - `settings`: Run configuration and difficulty presets

pub mod settings;
pub mod sim;

pub use settings::{Difficulty, DifficultySettings, RunConfig};

use glam::Vec2;

/// Game configuration constants
///
/// All timers are counted in logical ticks (one tick per rendered frame).
pub mod consts {
    /// Logical ticks per second
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 1280.0;
    pub const ARENA_HEIGHT: f32 = 720.0;
    /// Projectiles are dropped once this far outside the arena
    pub const BOUNDS_MARGIN: f32 = 50.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 22.0;
    pub const PLAYER_BASE_SPEED: f32 = 5.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    /// Speed multiplier while the speed powerup is active
    pub const SPEED_BOOST: f32 = 1.5;
    /// Diagonal movement correction (~1/sqrt(2))
    pub const DIAGONAL_SCALE: f32 = 0.707;
    /// Distance from player centre to the muzzle
    pub const MUZZLE_OFFSET: f32 = 35.0;

    /// Enemy defaults
    pub const ENEMY_RADIUS: f32 = 20.0;
    pub const ENEMY_SPAWN_MARGIN: f32 = 50.0;
    /// Enemies stop advancing inside this distance
    pub const ENEMY_STANDOFF: f32 = 150.0;
    pub const ENEMY_FIRE_RANGE: f32 = 400.0;
    /// Total aim jitter (radians) applied to enemy shots
    pub const ENEMY_AIM_JITTER: f32 = 0.3;
    pub const ENEMY_BASE_CONTACT_DAMAGE: f32 = 5.0;

    /// Projectile defaults
    pub const PLAYER_BULLET_SPEED: f32 = 12.0;
    pub const ROCKET_SPEED: f32 = 8.0;
    pub const ENEMY_BULLET_SPEED: f32 = 8.0;
    pub const BULLET_RADIUS: f32 = 4.0;
    pub const HEAVY_BULLET_RADIUS: f32 = 6.0;
    /// Fixed damage dealt to the player by one enemy bullet
    pub const ENEMY_BULLET_DAMAGE: i32 = 5;
    /// Rocket splash radius around the impact point
    pub const SPLASH_RADIUS: f32 = 100.0;

    /// Pickups
    pub const HEALTH_PACK_RADIUS: f32 = 20.0;
    pub const HEALTH_PACK_LIFETIME: u32 = 600;
    pub const HEALTH_PACK_HEAL: f32 = 35.0;
    pub const POWERUP_RADIUS: f32 = 18.0;
    pub const POWERUP_LIFETIME: u32 = 450;
    /// Ticks a collected powerup stays active (10 seconds)
    pub const POWERUP_DURATION: u32 = 600;
    /// Drops never land closer than this to the arena edge
    pub const PICKUP_EDGE_INSET: f32 = 30.0;
    pub const HEALTH_DROP_CHANCE: f32 = 0.15;
    /// Upper bound of the powerup band (cumulative with the health band)
    pub const POWERUP_DROP_CHANCE: f32 = 0.55;

    /// Economy
    pub const CURRENCY_PER_KILL: u32 = 1;
    /// Every Nth kill pays a bonus
    pub const KILL_MILESTONE: u32 = 20;
    pub const MILESTONE_BONUS: u32 = 10;

    /// Spawner
    pub const FIRST_SPAWN_DELAY_TICKS: u32 = TICKS_PER_SECOND;
    pub const MAX_ENEMIES_PER_SPAWN: u32 = 4;
}

/// Angle (radians) of the ray from `from` toward `to`
#[inline]
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Convert a millisecond delay into whole ticks
#[inline]
pub fn ms_to_ticks(ms: f32) -> u32 {
    (ms.max(0.0) * consts::TICKS_PER_SECOND as f32 / 1000.0).round() as u32
}
