//! Wave/spawn director
//!
//! Each unlocked enemy type spawns on its own timer, bounded by a
//! population cap that grows with the wave. Cadence tightens with the wave
//! down to a floor fraction of the base interval.

use glam::Vec2;

use super::state::{Behavior, DashState, Enemy, EnemyKind, Facing, Flash, GameEvent, WorldState};
use crate::consts::DASHER_MIN_SPAWN_DISTANCE;
use crate::tuning::{EnemyStats, WaveScaling};
use crate::{edge_spawn_point, interior_point};

/// Attempts to find a dasher spawn far enough from the player
const DASHER_PLACEMENT_ATTEMPTS: u32 = 8;

#[inline]
fn waves_elapsed(wave: u32) -> f64 {
    wave.saturating_sub(1) as f64
}

/// Whether a type may spawn in this wave
#[inline]
pub fn is_unlocked(stats: &EnemyStats, wave: u32) -> bool {
    wave >= stats.unlock_wave
}

/// Max live enemies of a type: `floor(base * (1 + (wave-1) * growth))`
pub fn population_cap(stats: &EnemyStats, scaling: &WaveScaling, wave: u32) -> u32 {
    let factor = 1.0 + waves_elapsed(wave) * scaling.cap_growth_per_wave;
    (stats.base_max_on_screen as f64 * factor).floor() as u32
}

/// Spawn interval: `base * max(min_factor, 1 - (wave-1) * reduction)`
pub fn spawn_cadence_ms(stats: &EnemyStats, scaling: &WaveScaling, wave: u32) -> u64 {
    let factor = (1.0 - waves_elapsed(wave) * scaling.cadence_reduction_per_wave)
        .max(scaling.min_cadence_factor);
    (stats.base_spawn_interval_ms as f64 * factor).floor() as u64
}

/// Wave-scaled hit points
pub fn scaled_hp(stats: &EnemyStats, scaling: &WaveScaling, wave: u32) -> u32 {
    let elapsed = waves_elapsed(wave);
    let base = stats.base_hp as f64 + elapsed * stats.hp_per_wave as f64;
    ((base * (1.0 + elapsed * scaling.global_wave_scaling)).floor() as u32).max(1)
}

/// Wave-scaled speed (px per tick)
pub fn scaled_speed(stats: &EnemyStats, scaling: &WaveScaling, wave: u32) -> f32 {
    let elapsed = waves_elapsed(wave);
    let base = stats.base_speed as f64 + elapsed * stats.speed_per_wave as f64;
    (base * (1.0 + elapsed * scaling.global_wave_scaling)) as f32
}

/// Run the director for one tick
pub fn run_spawner(world: &mut WorldState, now: u64) {
    let wave = world.wave.index;
    let scaling = world.tuning.waves;

    for kind in EnemyKind::ALL {
        let stats = *world.tuning.enemy(kind);
        if !is_unlocked(&stats, wave) {
            continue;
        }

        let cadence = spawn_cadence_ms(&stats, &scaling, wave);
        let timer = world.wave.timers[kind];
        if now.saturating_sub(timer.last_spawn_at) < cadence {
            continue;
        }

        let cap = population_cap(&stats, &scaling, wave) as usize;
        if world.live_count(kind) >= cap {
            continue;
        }

        let enemy = spawn_enemy(world, kind, &stats, now);
        log::debug!(
            "Spawned {} #{} at ({:.0}, {:.0}) hp={} wave={}",
            kind.as_str(),
            enemy.id,
            enemy.pos.x,
            enemy.pos.y,
            enemy.hp,
            wave
        );
        world.push_event(GameEvent::EnemySpawned { id: enemy.id, kind });
        world.enemies.push(enemy);

        let timer = &mut world.wave.timers[kind];
        timer.last_spawn_at = now;
        timer.spawned += 1;
        world.wave.spawned_total += 1;
    }
}

/// Build a wave-scaled enemy placed according to its behavior
fn spawn_enemy(world: &mut WorldState, kind: EnemyKind, stats: &EnemyStats, now: u64) -> Enemy {
    let wave = world.wave.index;
    let scaling = world.tuning.waves;
    let (width, height) = (world.width, world.height);
    let hp = scaled_hp(stats, &scaling, wave);

    let mut flash = None;
    let mut dash = None;
    let pos = match kind.behavior() {
        Behavior::Chase => edge_spawn_point(&mut world.rng, width, height, stats.radius),
        Behavior::Materialize => {
            let pos = interior_point(&mut world.rng, width, height, stats.radius);
            flash = Some(Flash {
                position: pos,
                start_time: now,
            });
            pos
        }
        Behavior::LockAndDash => {
            dash = Some(DashState {
                target: None,
                cooldown_ms: stats.dash_cooldown_ms,
                last_dash_at: now,
            });
            dasher_position(world, stats.radius)
        }
    };

    Enemy {
        id: world.next_entity_id(),
        kind,
        pos,
        radius: stats.radius,
        speed: scaled_speed(stats, &scaling, wave),
        hp,
        max_hp: hp,
        damage: stats.damage,
        facing: Facing::default().toward(pos.x, world.player.pos.x),
        anim_frame: 0,
        anim_frame_at: now,
        spawned_at: now,
        dying: false,
        disappear_frame: 0,
        disappear_frame_at: now,
        flash,
        dash,
    }
}

/// Interior point away from the player (best effort)
fn dasher_position(world: &mut WorldState, radius: f32) -> Vec2 {
    let player = world.player.pos;
    let mut pos = interior_point(&mut world.rng, world.width, world.height, radius);
    for _ in 1..DASHER_PLACEMENT_ATTEMPTS {
        if pos.distance(player) >= DASHER_MIN_SPAWN_DISTANCE {
            break;
        }
        pos = interior_point(&mut world.rng, world.width, world.height, radius);
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_arena;
    use crate::sim::state::GamePhase;
    use crate::tuning::Tuning;

    fn playing_world(wave: u32) -> WorldState {
        let mut world = WorldState::new(42);
        world.phase = GamePhase::Playing;
        world.wave.index = wave;
        world.wave.reset_spawns(0);
        world
    }

    #[test]
    fn test_population_cap_grows() {
        let tuning = Tuning::default();
        let slime = tuning.enemy(EnemyKind::Slime);
        assert_eq!(population_cap(slime, &tuning.waves, 1), 8);
        // 8 * 1.2 = 9.6
        assert_eq!(population_cap(slime, &tuning.waves, 2), 9);
        // 8 * 1.6 = 12.8
        assert_eq!(population_cap(slime, &tuning.waves, 4), 12);
    }

    #[test]
    fn test_cadence_floors_at_thirty_percent() {
        let tuning = Tuning::default();
        let slime = tuning.enemy(EnemyKind::Slime);
        assert_eq!(spawn_cadence_ms(slime, &tuning.waves, 1), 1_200);
        assert_eq!(spawn_cadence_ms(slime, &tuning.waves, 3), 960);
        assert_eq!(spawn_cadence_ms(slime, &tuning.waves, 8), 360);
        assert_eq!(spawn_cadence_ms(slime, &tuning.waves, 30), 360);
    }

    #[test]
    fn test_scaled_hp() {
        let tuning = Tuning::default();
        let slime = tuning.enemy(EnemyKind::Slime);
        assert_eq!(scaled_hp(slime, &tuning.waves, 1), 10);
        // (10 + 2*4) * 1.2 = 21.6
        assert_eq!(scaled_hp(slime, &tuning.waves, 3), 21);
    }

    #[test]
    fn test_only_unlocked_types_spawn() {
        let mut world = playing_world(1);
        run_spawner(&mut world, 10_000);
        assert!(!world.enemies.is_empty());
        assert!(world.enemies.iter().all(|e| e.kind == EnemyKind::Slime));
    }

    #[test]
    fn test_spawn_waits_for_cadence() {
        let mut world = playing_world(1);
        run_spawner(&mut world, 1_199);
        assert!(world.enemies.is_empty());
        run_spawner(&mut world, 1_200);
        assert_eq!(world.enemies.len(), 1);
        // Same tick again: timer just reset
        run_spawner(&mut world, 1_200);
        assert_eq!(world.enemies.len(), 1);
    }

    #[test]
    fn test_cap_blocks_spawns() {
        let mut world = playing_world(1);
        let mut now = 0;
        for _ in 0..40 {
            now += 1_200;
            run_spawner(&mut world, now);
        }
        assert_eq!(world.live_count(EnemyKind::Slime), 8);

        // Dying enemies free a slot
        world.enemies[0].dying = true;
        run_spawner(&mut world, now + 1_200);
        assert_eq!(world.live_count(EnemyKind::Slime), 8);
        assert_eq!(world.enemies.len(), 9);
    }

    #[test]
    fn test_placement_by_behavior() {
        let mut world = playing_world(5);
        let mut now = 0;
        for _ in 0..20 {
            now += 5_000;
            run_spawner(&mut world, now);
        }
        for enemy in &world.enemies {
            match enemy.kind.behavior() {
                Behavior::Chase => assert!(!in_arena(enemy.pos, world.width, world.height)),
                Behavior::Materialize => {
                    assert!(in_arena(enemy.pos, world.width, world.height));
                    assert!(enemy.flash.is_some());
                }
                Behavior::LockAndDash => {
                    assert!(in_arena(enemy.pos, world.width, world.height));
                    assert!(enemy.dash.is_some_and(|d| d.target.is_none()));
                }
            }
        }
        assert!(world.enemies.iter().any(|e| e.kind == EnemyKind::Brute));
    }
}
