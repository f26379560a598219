//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod resolve;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod weapon;

pub use collision::{circles_overlap, is_out_of_bounds, within_radius};
pub use resolve::resolve_collisions;
pub use state::{
    Enemy, GameEvent, GamePhase, HudSnapshot, Pickup, PickupKind, Player, PowerupKind,
    Projectile, RunState,
};
pub use tick::{TickInput, advance_frame, choose_weapon, is_run_over, start_run, tick};
pub use weapon::{HitPolicy, ProjectileKind, StatsError, WeaponId, WeaponStats};
