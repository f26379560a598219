//! Per-frame collision resolution
//!
//! Runs once per frame after every entity has advanced. Turns projectile and
//! body contacts into damage, kills, currency and drops.
//!
//! Removal is mark-and-sweep: a killed enemy keeps its slot with zero health
//! (so later checks in the same pass skip it) and is swept once the
//! projectile and contact passes are done.

use glam::Vec2;

use super::collision::{circles_overlap, within_radius};
use super::spawn::roll_drop;
use super::state::{Enemy, GameEvent, Owner, Pickup, PickupKind, Player, Projectile, RunState};
use super::weapon::HitPolicy;
use crate::consts::*;

/// Resolve every contact for the current frame
pub fn resolve_collisions(state: &mut RunState) {
    let damage_hits = state.player.powerups.damage_hits();
    let mut kills: Vec<Vec2> = Vec::new();

    // 1. Projectiles vs enemies / player
    let mut projectiles = std::mem::take(&mut state.projectiles);
    projectiles.retain_mut(|projectile| match projectile.owner() {
        Owner::Player => resolve_player_projectile(
            projectile,
            &mut state.enemies,
            damage_hits,
            &mut state.events,
            &mut kills,
        ),
        Owner::Enemy => {
            resolve_enemy_projectile(projectile, &mut state.player, &mut state.events)
        }
    });
    state.projectiles = projectiles;

    // 2. Kill accounting, in kill order
    for &pos in &kills {
        record_kill(state, pos);
    }

    // 3. Direct contact
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        if circles_overlap(enemy.pos, enemy.radius, state.player.pos, state.player.radius) {
            let dealt = state.player.take_damage(enemy.contact_damage);
            state.events.push(GameEvent::DamageFlash { amount: dealt });
            enemy.destroy();
        }
    }

    // 4. Sweep
    state.enemies.retain(Enemy::is_alive);

    // 5. Pickups
    let mut pickups = std::mem::take(&mut state.pickups);
    pickups.retain(|pickup| !collect_pickup(pickup, &mut state.player, &mut state.events));
    state.pickups = pickups;

    // 6. Drops, one roll per confirmed kill
    for _ in &kills {
        roll_drop(state);
    }
}

/// Resolve one player projectile; returns whether it stays alive
fn resolve_player_projectile(
    projectile: &mut Projectile,
    enemies: &mut [Enemy],
    damage_hits: u32,
    events: &mut Vec<GameEvent>,
    kills: &mut Vec<Vec2>,
) -> bool {
    match projectile.kind.hit_policy() {
        HitPolicy::HitOnce => {
            let Some(enemy) = enemies
                .iter_mut()
                .find(|e| e.is_alive() && touches(projectile, e))
            else {
                return true;
            };
            strike(enemy, projectile.damage, damage_hits, kills);
            events.push(GameEvent::HitMarker { pos: enemy.pos });
            false
        }

        HitPolicy::Pierce => {
            for enemy in enemies.iter_mut() {
                if !enemy.is_alive() || projectile.has_hit(enemy.id) {
                    continue;
                }
                if !touches(projectile, enemy) {
                    continue;
                }
                projectile.record_hit(enemy.id);
                let amount = if projectile.kind.is_lethal() {
                    enemy.health
                } else {
                    projectile.damage
                };
                strike(enemy, amount, damage_hits, kills);
                events.push(GameEvent::HitMarker { pos: enemy.pos });
            }
            true
        }

        HitPolicy::Area { radius } => {
            if !enemies.iter().any(|e| e.is_alive() && touches(projectile, e)) {
                return true;
            }
            let impact = projectile.pos;
            events.push(GameEvent::Explosion { pos: impact, radius });
            for enemy in enemies
                .iter_mut()
                .filter(|e| e.is_alive() && within_radius(impact, e.pos, radius))
            {
                strike(enemy, projectile.damage, damage_hits, kills);
            }
            false
        }
    }
}

/// Resolve one enemy projectile against the player; returns whether it stays alive
fn resolve_enemy_projectile(
    projectile: &Projectile,
    player: &mut Player,
    events: &mut Vec<GameEvent>,
) -> bool {
    if !circles_overlap(projectile.pos, projectile.radius, player.pos, player.radius) {
        return true;
    }
    let dealt = player.take_damage(projectile.damage as f32);
    events.push(GameEvent::DamageFlash { amount: dealt });
    false
}

#[inline]
fn touches(projectile: &Projectile, enemy: &Enemy) -> bool {
    circles_overlap(projectile.pos, projectile.radius, enemy.pos, enemy.radius)
}

/// Apply one hit event as `hits` discrete damage calls, stopping at the kill
fn strike(enemy: &mut Enemy, amount: i32, hits: u32, kills: &mut Vec<Vec2>) {
    for _ in 0..hits {
        if enemy.apply_damage(amount) {
            kills.push(enemy.pos);
            break;
        }
    }
}

fn record_kill(state: &mut RunState, pos: Vec2) {
    state.kills += 1;
    state.currency += CURRENCY_PER_KILL;
    state.events.push(GameEvent::KillBurst { pos });

    if state.kills % KILL_MILESTONE == 0 {
        state.currency += MILESTONE_BONUS;
        state.events.push(GameEvent::MilestoneBurst {
            pos,
            kills: state.kills,
        });
        log::info!("Kill milestone: {} kills (+{} bonus)", state.kills, MILESTONE_BONUS);
    } else {
        log::debug!("Enemy killed ({} total)", state.kills);
    }
}

/// Apply a pickup if the player touches it; true when consumed
fn collect_pickup(pickup: &Pickup, player: &mut Player, events: &mut Vec<GameEvent>) -> bool {
    if !circles_overlap(pickup.pos, pickup.radius, player.pos, player.radius) {
        return false;
    }
    match pickup.kind {
        PickupKind::HealthPack => {
            player.heal(HEALTH_PACK_HEAL);
            events.push(GameEvent::HealBurst { pos: player.pos });
        }
        PickupKind::Powerup(kind) => {
            player.powerups.activate(kind, POWERUP_DURATION);
            events.push(GameEvent::PowerupBurst {
                pos: player.pos,
                kind,
            });
        }
    }
    true
}
