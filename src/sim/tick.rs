//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically, one frame at a time.

use glam::Vec2;

use super::resolve::resolve_collisions;
use super::spawn::advance_spawner;
use super::state::{GameEvent, GamePhase, RunState};
use super::weapon::WeaponId;
use crate::settings::RunConfig;

/// Distance under which the autopilot backs away from an enemy
const AUTOPILOT_FLEE_RADIUS: f32 = 200.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Aim point in arena coordinates
    pub target: Vec2,
    /// Trigger held
    pub firing: bool,
    /// Reload requested
    pub reload: bool,
    /// Movement direction, each axis in [-1, 1]
    pub movement: Vec2,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Begin a new run
pub fn start_run(config: RunConfig) -> RunState {
    for weapon in WeaponId::ALL {
        if let Err(e) = weapon.stats().validate() {
            log::warn!("Weapon {} has invalid stats: {}", weapon.as_str(), e);
        }
    }

    let state = RunState::new(config);
    log::info!(
        "Run started (seed {}, difficulty {}, weapon {}, level {})",
        state.config.seed,
        state.config.difficulty.as_str(),
        state.player.weapon.as_str(),
        state.level
    );
    state
}

/// Advance by one frame, taking and returning ownership of the run
pub fn advance_frame(mut state: RunState, input: &TickInput) -> RunState {
    tick(&mut state, input);
    state
}

/// Whether the run has ended
pub fn is_run_over(state: &RunState) -> bool {
    state.phase == GamePhase::GameOver
}

/// Pick the next weapon in the armory; rejected outside the armory
pub fn choose_weapon(state: &mut RunState, weapon: WeaponId) -> bool {
    if state.phase != GamePhase::Armory {
        log::trace!("Weapon pick rejected in {:?}", state.phase);
        return false;
    }

    state.player.switch_weapon(weapon, state.level);
    state.level = state.level.saturating_add(1);
    state.phase = GamePhase::Playing;
    // Next level opens with a batch on the following tick
    state.spawn_timer = 1;
    log::info!("Level {} with {}", state.level, weapon.as_str());
    true
}

/// Advance the run by one fixed timestep
pub fn tick(state: &mut RunState, input: &TickInput) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::debug!("Paused at tick {}", state.time_ticks);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::debug!("Resumed at tick {}", state.time_ticks);
            }
            _ => {}
        }
    }

    // Only a live, unpaused run advances
    if state.phase != GamePhase::Playing {
        return;
    }

    state.events.clear();
    state.time_ticks += 1;

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    advance_spawner(state);

    state.pickups.retain_mut(|pickup| !pickup.advance());

    // Player
    let bounds = state.bounds;
    let before = state.projectiles.len();
    state
        .player
        .advance_weapon(input.target, &mut state.rng, &mut state.projectiles);
    state.player.move_by(input.movement, bounds);
    if input.reload {
        state.player.try_reload();
    }
    if input.firing {
        state
            .player
            .try_fire(input.target, &mut state.rng, &mut state.projectiles);
    }
    let fired = state.projectiles.len() - before;
    if fired > 0 {
        state.events.push(GameEvent::MuzzleFlash {
            pos: state.player.pos,
            projectiles: fired as u32,
        });
    }

    // Enemies
    let target = state.player.pos;
    state
        .enemies
        .retain_mut(|enemy| !enemy.advance(target, &mut state.rng, &mut state.projectiles));

    // Projectiles
    state.projectiles.retain_mut(|p| !p.advance(bounds));

    resolve_collisions(state);
    state.normalize_order();

    if state.player.is_dead() {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over at level {} with {} kills ({} ticks)",
            state.level,
            state.kills,
            state.time_ticks
        );
    } else if state.player.is_out_of_ammo() {
        state.phase = GamePhase::Armory;
        log::info!("Out of ammo at level {}, entering armory", state.level);
    }
}

/// Replace the player's commands with a simple AI
fn autopilot(state: &RunState, input: &mut TickInput) {
    let player = &state.player;

    let nearest_enemy = state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(player.pos)
                .partial_cmp(&b.pos.distance_squared(player.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let nearest_pickup = state.pickups.iter().min_by(|a, b| {
        a.pos
            .distance_squared(player.pos)
            .partial_cmp(&b.pos.distance_squared(player.pos))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    input.firing = nearest_enemy.is_some();
    if let Some(enemy) = nearest_enemy {
        input.target = enemy.pos;
    }
    input.reload = player.ammo == 0;

    input.movement = if let Some(pickup) = nearest_pickup {
        steer(pickup.pos - player.pos)
    } else if let Some(enemy) =
        nearest_enemy.filter(|e| e.pos.distance(player.pos) < AUTOPILOT_FLEE_RADIUS)
    {
        steer(player.pos - enemy.pos)
    } else {
        Vec2::ZERO
    };
}

/// Turn an offset into a per-axis movement command
fn steer(offset: Vec2) -> Vec2 {
    let axis = |v: f32| {
        if v > 1.0 {
            1.0
        } else if v < -1.0 {
            -1.0
        } else {
            0.0
        }
    };
    Vec2::new(axis(offset.x), axis(offset.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Difficulty;
    use crate::sim::state::{Enemy, Owner, Pickup, PowerupKind};

    fn run() -> RunState {
        start_run(RunConfig::new(12345, Difficulty::Normal))
    }

    fn parked_enemy(state: &mut RunState, pos: Vec2) {
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            pos,
            radius: ENEMY_RADIUS,
            health: 3,
            max_health: 3,
            speed: 0.0,
            shoot_cooldown: 1000,
            shoot_delay: 1000,
            contact_damage: 5.0,
        });
    }

    #[test]
    fn test_tick_pause() {
        let mut state = run();
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 1);

        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.time_ticks, 1);

        // Paused runs do not advance
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 1);

        // Unpause
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_first_spawn_after_one_second() {
        let mut state = run();
        for _ in 0..FIRST_SPAWN_DELAY_TICKS - 1 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.enemies.is_empty());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_fire_through_tick() {
        let mut state = run();
        let input = TickInput {
            target: state.player.pos + Vec2::new(300.0, 0.0),
            firing: true,
            ..Default::default()
        };
        tick(&mut state, &input);

        assert_eq!(state.player.ammo, 29);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].owner(), Owner::Player);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::MuzzleFlash { projectiles: 1, .. }))
        );

        // Cooldown holds the trigger for the next few ticks
        tick(&mut state, &input);
        assert_eq!(state.player.ammo, 29);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_events_cover_one_frame() {
        let mut state = run();
        state.player.health = 50.0;
        let id = state.next_entity_id();
        state.pickups.push(Pickup::health_pack(id, state.player.pos));

        tick(&mut state, &TickInput::default());
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::HealBurst { .. })));

        tick(&mut state, &TickInput::default());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_pickup_expiring_this_frame_is_not_collected() {
        let mut state = run();
        state.player.health = 50.0;
        let id = state.next_entity_id();
        let mut pack = Pickup::health_pack(id, state.player.pos);
        pack.lifetime = 1;
        state.pickups.push(pack);

        tick(&mut state, &TickInput::default());

        assert!(state.pickups.is_empty());
        assert!((state.player.health - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_speed_powerup_moves_faster() {
        let mut state = run();
        let start = state.player.pos;
        state.player.powerups.activate(PowerupKind::Speed, 1);
        let input = TickInput {
            movement: Vec2::new(1.0, 0.0),
            ..Default::default()
        };

        tick(&mut state, &input);
        assert!((state.player.pos.x - (start.x + PLAYER_BASE_SPEED * SPEED_BOOST)).abs() < 1e-4);

        // Timer ran out during the previous tick
        tick(&mut state, &input);
        let expected = start.x + PLAYER_BASE_SPEED * SPEED_BOOST + PLAYER_BASE_SPEED;
        assert!((state.player.pos.x - expected).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_ammo_enters_armory() {
        let mut state = run();
        state.player.ammo = 0;
        state.player.reserve_ammo = 0;

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Armory);

        // The run waits for a pick
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, ticks);

        assert!(choose_weapon(&mut state, WeaponId::Shotgun));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level, 2);
        assert_eq!(state.player.weapon, WeaponId::Shotgun);
        assert_eq!(state.player.ammo, 8);
        assert_eq!(state.player.reserve_ammo, 32);

        // New level spawns straight away
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn test_extreme_starting_level_does_not_overflow() {
        let config = RunConfig {
            starting_level: 200_000_000,
            ..Default::default()
        };
        let mut state = start_run(config);
        assert_eq!(state.player.reserve_ammo, u32::MAX);

        state.level = u32::MAX;
        state.phase = GamePhase::Armory;
        assert!(choose_weapon(&mut state, WeaponId::Minigun));
        assert_eq!(state.level, u32::MAX);
        assert_eq!(state.player.reserve_ammo, u32::MAX);

        tick(&mut state, &TickInput::default());
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn test_choose_weapon_rejected_while_playing() {
        let mut state = run();
        assert!(!choose_weapon(&mut state, WeaponId::Railgun));
        assert_eq!(state.player.weapon, WeaponId::Assault);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_reload_pending_is_not_out_of_ammo() {
        let mut state = run();
        state.player.ammo = 0;
        let input = TickInput {
            reload: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.player.reload.is_reloading());
    }

    #[test]
    fn test_game_over_on_contact() {
        let mut state = run();
        state.player.health = 3.0;
        let pos = state.player.pos;
        parked_enemy(&mut state, pos);

        let state = advance_frame(state, &TickInput::default());
        assert!(is_run_over(&state));
        assert_eq!(state.player.health, 0.0);

        let ticks = state.time_ticks;
        let state = advance_frame(state, &TickInput::default());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_autopilot_engages_nearest_enemy() {
        let mut state = run();
        let pos = state.player.pos;
        parked_enemy(&mut state, pos + Vec2::new(300.0, 0.0));
        parked_enemy(&mut state, pos + Vec2::new(0.0, -150.0));

        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        tick(&mut state, &input);

        assert_eq!(state.projectiles.len(), 1);
        assert!(state.projectiles[0].velocity().y < 0.0);
        // Backs away from the close enemy
        assert!(state.player.pos.y > pos.y);
    }

    #[test]
    fn test_determinism() {
        // Two runs with the same seed and inputs should match exactly
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut state1 = run();
        let mut state2 = run();

        for _ in 0..900 {
            tick(&mut state1, &input);
            tick(&mut state2, &input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.hud(), state2.hud());
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        for (a, b) in state1.enemies.iter().zip(&state2.enemies) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.pos, b.pos);
        }
    }

    #[test]
    fn test_autopilot_soak() {
        let mut state = start_run(RunConfig::new(7, Difficulty::Easy));
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut picks = WeaponId::ALL.iter().cycle();

        for _ in 0..6000 {
            tick(&mut state, &input);

            if state.phase == GamePhase::Armory {
                let weapon = picks.next().copied().unwrap_or(WeaponId::Assault);
                assert!(choose_weapon(&mut state, weapon));
            }

            let p = &state.player;
            assert!(p.health >= 0.0 && p.health <= p.max_health);
            assert!(p.ammo <= p.max_ammo);
            assert!(state.enemies.iter().all(Enemy::is_alive));
            assert!(state.enemies.windows(2).all(|w| w[0].id < w[1].id));
            assert_eq!(
                state.currency,
                state.kills * CURRENCY_PER_KILL + (state.kills / KILL_MILESTONE) * MILESTONE_BONUS
            );

            if is_run_over(&state) {
                break;
            }
        }
        assert!(state.time_ticks > 0);
    }
}
