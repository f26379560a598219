//! Weapon registry and the per-player firing state machine
//!
//! Each `WeaponId` maps to one `WeaponStats` record; each `ProjectileKind`
//! maps to one `HitPolicy`. Nothing else in the simulation branches on the
//! weapon identifier.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{BurstState, Player, PowerupKind, Projectile, ReloadState};
use crate::aim_angle;
use crate::consts::*;

/// Available weapons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponId {
    #[default]
    Assault,
    Shotgun,
    Smg,
    DoubleShot,
    TripleShot,
    Sniper,
    Burst,
    Minigun,
    Laser,
    Rocket,
    Railgun,
    Plasma,
}

impl WeaponId {
    pub const ALL: [WeaponId; 12] = [
        WeaponId::Assault,
        WeaponId::Shotgun,
        WeaponId::Smg,
        WeaponId::DoubleShot,
        WeaponId::TripleShot,
        WeaponId::Sniper,
        WeaponId::Burst,
        WeaponId::Minigun,
        WeaponId::Laser,
        WeaponId::Rocket,
        WeaponId::Railgun,
        WeaponId::Plasma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponId::Assault => "assault",
            WeaponId::Shotgun => "shotgun",
            WeaponId::Smg => "smg",
            WeaponId::DoubleShot => "doubleshot",
            WeaponId::TripleShot => "tripleshot",
            WeaponId::Sniper => "sniper",
            WeaponId::Burst => "burst",
            WeaponId::Minigun => "minigun",
            WeaponId::Laser => "laser",
            WeaponId::Rocket => "rocket",
            WeaponId::Railgun => "railgun",
            WeaponId::Plasma => "plasma",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|w| w.as_str() == s)
    }

    /// Stat record for this weapon
    pub fn stats(&self) -> WeaponStats {
        match self {
            WeaponId::Assault => WeaponStats {
                max_ammo: 30,
                base_reserve: 90,
                cooldown: 8,
                reload_ticks: 90,
                ..WeaponStats::BASE
            },
            WeaponId::Shotgun => WeaponStats {
                max_ammo: 8,
                base_reserve: 32,
                cooldown: 25,
                reload_ticks: 120,
                pellets: 5,
                spread: 0.3,
                ..WeaponStats::BASE
            },
            WeaponId::Smg => WeaponStats {
                max_ammo: 40,
                base_reserve: 120,
                cooldown: 4,
                reload_ticks: 75,
                spread: 0.1,
                ..WeaponStats::BASE
            },
            WeaponId::DoubleShot => WeaponStats {
                max_ammo: 20,
                base_reserve: 80,
                cooldown: 10,
                reload_ticks: 85,
                pellets: 2,
                spread: 0.05,
                ..WeaponStats::BASE
            },
            WeaponId::TripleShot => WeaponStats {
                max_ammo: 18,
                base_reserve: 72,
                cooldown: 12,
                reload_ticks: 95,
                pellets: 3,
                spread: 0.08,
                ..WeaponStats::BASE
            },
            WeaponId::Sniper => WeaponStats {
                max_ammo: 5,
                base_reserve: 20,
                cooldown: 40,
                reload_ticks: 110,
                kind: ProjectileKind::Sniper,
                damage: 5,
                reserve_growth: ReserveGrowth::Divided(3),
                ..WeaponStats::BASE
            },
            WeaponId::Burst => WeaponStats {
                max_ammo: 24,
                base_reserve: 72,
                cooldown: 20,
                reload_ticks: 80,
                spread: 0.02,
                kind: ProjectileKind::Burst,
                burst_size: 3,
                burst_delay: 3,
                ..WeaponStats::BASE
            },
            WeaponId::Minigun => WeaponStats {
                max_ammo: 100,
                base_reserve: 200,
                cooldown: 2,
                reload_ticks: 150,
                spread: 0.15,
                reserve_growth: ReserveGrowth::Multiplied(2),
                ..WeaponStats::BASE
            },
            WeaponId::Laser => WeaponStats {
                max_ammo: 30,
                base_reserve: 90,
                cooldown: 10,
                reload_ticks: 85,
                kind: ProjectileKind::Laser,
                ..WeaponStats::BASE
            },
            WeaponId::Rocket => WeaponStats {
                max_ammo: 4,
                base_reserve: 12,
                cooldown: 50,
                reload_ticks: 130,
                kind: ProjectileKind::Rocket,
                reserve_growth: ReserveGrowth::Divided(4),
                ..WeaponStats::BASE
            },
            WeaponId::Railgun => WeaponStats {
                max_ammo: 3,
                base_reserve: 9,
                cooldown: 60,
                reload_ticks: 140,
                kind: ProjectileKind::Railgun,
                reserve_growth: ReserveGrowth::Divided(5),
                ..WeaponStats::BASE
            },
            WeaponId::Plasma => WeaponStats {
                max_ammo: 35,
                base_reserve: 105,
                cooldown: 5,
                reload_ticks: 80,
                spread: 0.05,
                kind: ProjectileKind::Plasma,
                ..WeaponStats::BASE
            },
        }
    }
}

/// Projectile kinds; each one fixes size, speed and hit policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectileKind {
    #[default]
    Normal,
    Sniper,
    Burst,
    Laser,
    Rocket,
    Railgun,
    Plasma,
}

/// How a player projectile interacts with enemies it overlaps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitPolicy {
    /// Damage the first overlapping enemy, then disappear
    HitOnce,
    /// Damage every overlapping enemy once, never consumed by contact
    Pierce,
    /// On first contact, damage every enemy within `radius` of the impact
    Area { radius: f32 },
}

impl ProjectileKind {
    pub fn hit_policy(self) -> HitPolicy {
        match self {
            ProjectileKind::Normal
            | ProjectileKind::Sniper
            | ProjectileKind::Burst
            | ProjectileKind::Plasma => HitPolicy::HitOnce,
            ProjectileKind::Laser | ProjectileKind::Railgun => HitPolicy::Pierce,
            ProjectileKind::Rocket => HitPolicy::Area {
                radius: SPLASH_RADIUS,
            },
        }
    }

    /// Kills any enemy it touches regardless of remaining health
    pub fn is_lethal(self) -> bool {
        self == ProjectileKind::Railgun
    }

    pub fn radius(self) -> f32 {
        match self {
            ProjectileKind::Rocket | ProjectileKind::Sniper => HEAVY_BULLET_RADIUS,
            _ => BULLET_RADIUS,
        }
    }

    pub fn speed(self) -> f32 {
        match self {
            ProjectileKind::Rocket => ROCKET_SPEED,
            _ => PLAYER_BULLET_SPEED,
        }
    }
}

/// Reserve ammo bonus scaling per progression level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveGrowth {
    Standard,
    Multiplied(u32),
    Divided(u32),
}

/// Reserve rounds granted per level past the first
pub const RESERVE_BONUS_PER_LEVEL: u32 = 30;

/// Complete stats for a weapon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    /// Magazine capacity
    pub max_ammo: u32,
    /// Reserve rounds at level 1
    pub base_reserve: u32,
    /// Ticks between trigger pulls
    pub cooldown: u32,
    pub reload_ticks: u32,
    /// Projectiles per volley
    pub pellets: u32,
    /// Total random spread (radians)
    pub spread: f32,
    pub kind: ProjectileKind,
    pub damage: i32,
    /// Rounds per trigger pull for burst weapons (0 otherwise)
    pub burst_size: u32,
    /// Ticks between burst rounds
    pub burst_delay: u32,
    pub reserve_growth: ReserveGrowth,
}

impl WeaponStats {
    const BASE: WeaponStats = WeaponStats {
        max_ammo: 0,
        base_reserve: 0,
        cooldown: 0,
        reload_ticks: 0,
        pellets: 1,
        spread: 0.0,
        kind: ProjectileKind::Normal,
        damage: 1,
        burst_size: 0,
        burst_delay: 0,
        reserve_growth: ReserveGrowth::Standard,
    };

    pub fn is_burst(&self) -> bool {
        self.burst_size > 0
    }

    /// Reserve ammo handed out when this weapon is picked at `level`
    pub fn reserve_at_level(&self, level: u32) -> u32 {
        let bonus = level.saturating_sub(1).saturating_mul(RESERVE_BONUS_PER_LEVEL);
        let bonus = match self.reserve_growth {
            ReserveGrowth::Standard => bonus,
            ReserveGrowth::Multiplied(n) => bonus.saturating_mul(n),
            ReserveGrowth::Divided(n) => bonus / n.max(1),
        };
        self.base_reserve.saturating_add(bonus)
    }

    /// Check the record is usable by the state machine
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.max_ammo == 0 {
            return Err(StatsError::EmptyMagazine);
        }
        if self.pellets == 0 {
            return Err(StatsError::NoPellets);
        }
        if self.reload_ticks == 0 {
            return Err(StatsError::InstantReload);
        }
        if self.damage <= 0 {
            return Err(StatsError::NonPositiveDamage);
        }
        if self.is_burst() != (self.kind == ProjectileKind::Burst) {
            return Err(StatsError::BurstMismatch);
        }
        if self.is_burst() && self.burst_delay == 0 {
            return Err(StatsError::NoBurstDelay);
        }
        Ok(())
    }
}

/// Why a stat record cannot drive the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsError {
    EmptyMagazine,
    NoPellets,
    InstantReload,
    NonPositiveDamage,
    /// Burst size set on a non-burst kind, or missing on a burst kind
    BurstMismatch,
    NoBurstDelay,
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            StatsError::EmptyMagazine => "magazine size must be non-zero",
            StatsError::NoPellets => "pellet count must be non-zero",
            StatsError::InstantReload => "reload time must be non-zero",
            StatsError::NonPositiveDamage => "damage must be positive",
            StatsError::BurstMismatch => "burst size must be set exactly for burst projectiles",
            StatsError::NoBurstDelay => "burst weapons need an inter-round delay",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for StatsError {}

/// Angular offset of volley `shot` out of `volleys`, fanned symmetrically
pub fn volley_offset(shot: u32, volleys: u32) -> f32 {
    match volleys {
        3 => (shot as f32 - 1.0) * 0.15,
        2 => (shot as f32 - 0.5) * 0.1,
        _ => 0.0,
    }
}

impl Player {
    /// Switch weapons, resetting magazine, timers and burst state
    pub fn switch_weapon(&mut self, weapon: WeaponId, level: u32) {
        let stats = weapon.stats();
        debug_assert!(stats.validate().is_ok(), "invalid stats for {weapon:?}");
        self.weapon = weapon;
        self.max_ammo = stats.max_ammo;
        self.ammo = stats.max_ammo;
        self.reserve_ammo = stats.reserve_at_level(level);
        self.shoot_cooldown = 0;
        self.reload = ReloadState::Idle;
        self.burst = BurstState::default();
    }

    /// Advance weapon timers by one tick
    ///
    /// May fire a scheduled burst round toward `target`.
    pub fn advance_weapon<R: Rng>(&mut self, target: Vec2, rng: &mut R, out: &mut Vec<Projectile>) {
        let boosted = self.powerups.is_active(PowerupKind::Speed);
        self.powerups.tick_down();
        self.speed = if boosted {
            self.base_speed * SPEED_BOOST
        } else {
            self.base_speed
        };

        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);

        if let ReloadState::Reloading { remaining, total } = self.reload {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                let moved = (self.max_ammo - self.ammo).min(self.reserve_ammo);
                self.ammo += moved;
                self.reserve_ammo -= moved;
                self.reload = ReloadState::Idle;
            } else {
                self.reload = ReloadState::Reloading { remaining, total };
            }
        }

        if self.burst.delay > 0 {
            self.burst.delay -= 1;
            if self.burst.delay == 0 && self.burst.remaining > 0 {
                self.fire_burst_round(target, rng, out);
            }
        }
    }

    /// Whether a fire request would be accepted this tick
    pub fn can_fire(&self) -> bool {
        self.ammo > 0
            && self.shoot_cooldown == 0
            && !self.reload.is_reloading()
            && self.burst.remaining == 0
    }

    /// Pull the trigger toward `target`; returns whether anything fired
    pub fn try_fire<R: Rng>(&mut self, target: Vec2, rng: &mut R, out: &mut Vec<Projectile>) -> bool {
        if !self.can_fire() {
            log::trace!("Fire rejected ({:?}, ammo {})", self.weapon, self.ammo);
            return false;
        }

        let stats = self.weapon.stats();
        if stats.is_burst() {
            self.burst.remaining = stats.burst_size;
            self.fire_burst_round(target, rng, out);
            self.shoot_cooldown = stats.cooldown;
            return true;
        }

        let volleys = self.powerups.volley_count();
        let angle = aim_angle(self.pos, target);
        let muzzle = self.muzzle(angle);
        for shot in 0..volleys {
            for _ in 0..stats.pellets {
                let jitter = (rng.random::<f32>() - 0.5) * stats.spread;
                let angle = angle + jitter + volley_offset(shot, volleys);
                out.push(Projectile::player(muzzle, angle, stats.kind, stats.damage));
            }
        }

        self.ammo -= 1;
        self.shoot_cooldown = stats.cooldown;
        true
    }

    /// Start a reload; ammo moves only when the countdown completes
    pub fn try_reload(&mut self) -> bool {
        if self.reload.is_reloading() || self.ammo >= self.max_ammo || self.reserve_ammo == 0 {
            log::trace!("Reload rejected ({:?}, ammo {})", self.weapon, self.ammo);
            return false;
        }
        let total = self.weapon.stats().reload_ticks;
        self.reload = ReloadState::Reloading {
            remaining: total,
            total,
        };
        true
    }

    /// True once magazine and reserve are both spent and nothing is pending
    pub fn is_out_of_ammo(&self) -> bool {
        self.ammo == 0
            && self.reserve_ammo == 0
            && !self.reload.is_reloading()
            && self.burst.remaining == 0
    }

    fn fire_burst_round<R: Rng>(&mut self, target: Vec2, rng: &mut R, out: &mut Vec<Projectile>) {
        if self.ammo == 0 {
            // Magazine ran dry mid-burst: drop the remaining rounds
            self.burst = BurstState::default();
            return;
        }
        let stats = self.weapon.stats();
        let angle = aim_angle(self.pos, target);
        let jitter = (rng.random::<f32>() - 0.5) * stats.spread;
        out.push(Projectile::player(
            self.muzzle(angle),
            angle + jitter,
            stats.kind,
            stats.damage,
        ));

        self.ammo -= 1;
        self.burst.remaining -= 1;
        if self.burst.remaining > 0 {
            self.burst.delay = stats.burst_delay;
        }
    }

    fn muzzle(&self, angle: f32) -> Vec2 {
        self.pos + Vec2::from_angle(angle) * MUZZLE_OFFSET
    }
}
