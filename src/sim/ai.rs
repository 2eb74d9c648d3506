//! Enemy behavior
//!
//! One dispatch over [`Behavior`]; facing and the walk cycle update the same
//! way for every class.

use glam::Vec2;

use super::state::{Behavior, Enemy, WorldState};
use crate::consts::*;
use crate::{clamp_to_arena, direction_to, in_arena};

/// Move every live enemy for one tick
pub fn update_enemies(world: &mut WorldState, now: u64) {
    let player_pos = world.player.pos;
    let (width, height) = (world.width, world.height);

    for enemy in world.enemies.iter_mut().filter(|e| !e.dying) {
        match enemy.kind.behavior() {
            Behavior::Chase => chase(enemy, player_pos),
            Behavior::Materialize => materialize(enemy, player_pos, now),
            Behavior::LockAndDash => lock_and_dash(enemy, player_pos, now, width, height),
        }
        enemy.facing = enemy.facing.toward(enemy.pos.x, player_pos.x);
        advance_walk_cycle(enemy, now);
    }
}

/// Step straight toward the player
fn chase(enemy: &mut Enemy, player_pos: Vec2) {
    enemy.pos += direction_to(enemy.pos, player_pos) * enemy.speed;
}

/// Frozen while flashing, then a plain chaser
fn materialize(enemy: &mut Enemy, player_pos: Vec2, now: u64) {
    if enemy.is_flashing(now) {
        return;
    }
    enemy.flash = None;
    chase(enemy, player_pos);
}

fn lock_and_dash(enemy: &mut Enemy, player_pos: Vec2, now: u64, width: f32, height: f32) {
    let Some(dash) = enemy.dash.as_mut() else {
        return;
    };

    let Some(target) = dash.target else {
        // Idle until the cooldown allows a new lock
        if now.saturating_sub(dash.last_dash_at) >= dash.cooldown_ms {
            dash.target = Some(player_pos);
        }
        return;
    };

    let step = enemy.speed * DASH_SPEED_MULTIPLIER;
    let remaining = enemy.pos.distance(target);
    enemy.pos = if step >= remaining {
        target
    } else {
        enemy.pos + direction_to(enemy.pos, target) * step
    };

    let arrived = enemy.pos.distance(target) < DASH_ARRIVAL_DISTANCE;
    if arrived || !in_arena(enemy.pos, width, height) {
        dash.target = None;
        dash.last_dash_at = now;
        enemy.pos = clamp_to_arena(enemy.pos, enemy.radius, width, height);
    }
}

/// 12-frame walk cycle
fn advance_walk_cycle(enemy: &mut Enemy, now: u64) {
    if now.saturating_sub(enemy.anim_frame_at) >= ENEMY_ANIM_FRAME_MS {
        enemy.anim_frame = (enemy.anim_frame + 1) % ENEMY_ANIM_FRAMES;
        enemy.anim_frame_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{DashState, EnemyKind, Facing, Flash};

    fn enemy(kind: EnemyKind, pos: Vec2) -> Enemy {
        Enemy {
            id: 1,
            kind,
            pos,
            radius: 10.0,
            speed: 2.0,
            hp: 10,
            max_hp: 10,
            damage: 1,
            facing: Facing::Right,
            anim_frame: 0,
            anim_frame_at: 0,
            spawned_at: 0,
            dying: false,
            disappear_frame: 0,
            disappear_frame_at: 0,
            flash: None,
            dash: None,
        }
    }

    fn world_with(enemy: Enemy, player: Vec2) -> WorldState {
        let mut world = WorldState::new(1);
        world.player.pos = player;
        world.enemies.push(enemy);
        world
    }

    #[test]
    fn test_chase_moves_toward_player_and_faces_left() {
        let mut world = world_with(enemy(EnemyKind::Slime, Vec2::new(200.0, 100.0)), Vec2::new(100.0, 100.0));
        update_enemies(&mut world, 16);
        let e = &world.enemies[0];
        assert!((e.pos.x - 198.0).abs() < 1e-4);
        assert!((e.pos.y - 100.0).abs() < 1e-4);
        assert_eq!(e.facing, Facing::Left);
    }

    #[test]
    fn test_flashing_enemy_holds_still() {
        let mut wraith = enemy(EnemyKind::Wraith, Vec2::new(300.0, 300.0));
        wraith.flash = Some(Flash {
            position: wraith.pos,
            start_time: 0,
        });
        let mut world = world_with(wraith, Vec2::new(100.0, 300.0));

        update_enemies(&mut world, 999);
        assert_eq!(world.enemies[0].pos, Vec2::new(300.0, 300.0));
        assert!(world.enemies[0].flash.is_some());

        update_enemies(&mut world, 1_000);
        assert!(world.enemies[0].pos.x < 300.0);
        assert!(world.enemies[0].flash.is_none());
    }

    #[test]
    fn test_dasher_locks_then_charges_then_cools_down() {
        let mut charger = enemy(EnemyKind::Charger, Vec2::new(400.0, 300.0));
        charger.dash = Some(DashState {
            target: None,
            cooldown_ms: 1_000,
            last_dash_at: 0,
        });
        let mut world = world_with(charger, Vec2::new(200.0, 300.0));

        // Still cooling down: stationary
        update_enemies(&mut world, 500);
        assert_eq!(world.enemies[0].pos, Vec2::new(400.0, 300.0));

        // Lock the player's current position
        update_enemies(&mut world, 1_000);
        let locked = world.enemies[0].dash.and_then(|d| d.target);
        assert_eq!(locked, Some(Vec2::new(200.0, 300.0)));

        // Player moves away; dasher keeps charging the snapshot at 8x speed
        world.player.pos = Vec2::new(200.0, 600.0);
        update_enemies(&mut world, 1_016);
        assert!((world.enemies[0].pos.x - 384.0).abs() < 1e-3);
        assert_eq!(world.enemies[0].pos.y, 300.0);

        let mut now = 1_016;
        while world.enemies[0].dash.and_then(|d| d.target).is_some() {
            now += 16;
            update_enemies(&mut world, now);
            assert!(now < 5_000, "dash never finished");
        }
        let dash = world.enemies[0].dash.expect("dash state");
        assert_eq!(dash.last_dash_at, now);
        assert!(world.enemies[0].pos.distance(Vec2::new(200.0, 300.0)) < DASH_ARRIVAL_DISTANCE);

        // Cooling down again
        let rest = world.enemies[0].pos;
        update_enemies(&mut world, now + 16);
        assert_eq!(world.enemies[0].pos, rest);
    }

    #[test]
    fn test_dash_out_of_bounds_is_clamped() {
        let mut charger = enemy(EnemyKind::Charger, Vec2::new(30.0, 300.0));
        charger.speed = 10.0;
        charger.dash = Some(DashState {
            target: Some(Vec2::new(-500.0, 300.0)),
            cooldown_ms: 1_000,
            last_dash_at: 0,
        });
        let mut world = world_with(charger, Vec2::new(600.0, 300.0));
        update_enemies(&mut world, 2_000);
        let e = &world.enemies[0];
        assert_eq!(e.pos.x, e.radius);
        assert!(e.dash.is_some_and(|d| d.target.is_none() && d.last_dash_at == 2_000));
    }

    #[test]
    fn test_walk_cycle_wraps_at_twelve() {
        let mut world = world_with(enemy(EnemyKind::Slime, Vec2::new(500.0, 500.0)), Vec2::new(500.0, 500.0));
        let mut now = 0;
        for _ in 0..12 {
            now += ENEMY_ANIM_FRAME_MS;
            update_enemies(&mut world, now);
        }
        assert_eq!(world.enemies[0].anim_frame, 0);
        update_enemies(&mut world, now + ENEMY_ANIM_FRAME_MS);
        assert_eq!(world.enemies[0].anim_frame, 1);
    }

    #[test]
    fn test_dying_enemies_do_not_move() {
        let mut corpse = enemy(EnemyKind::Slime, Vec2::new(200.0, 100.0));
        corpse.dying = true;
        let mut world = world_with(corpse, Vec2::new(100.0, 100.0));
        update_enemies(&mut world, 16);
        assert_eq!(world.enemies[0].pos, Vec2::new(200.0, 100.0));
    }
}
