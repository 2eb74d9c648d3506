//! Collision detection and response
//!
//! Everything collides as circles. Projectiles stop at the first enemy they
//! overlap; enemies hurt the player on contact.

use glam::Vec2;

use super::state::{DamageNumber, Enemy, GameEvent, PlayerAnim, Projectile, WorldState};
use crate::consts::PROJECTILE_BOUNDS_MARGIN;

/// Float speed of damage numbers (px per tick, screen up)
const DAMAGE_NUMBER_VELOCITY: Vec2 = Vec2::new(0.0, -0.6);

/// A projectile that struck an enemy this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub projectile: usize,
    pub enemy: usize,
    pub damage: u32,
}

/// Circle-circle overlap (touching counts)
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) <= a_radius + b_radius
}

/// Advance projectiles by their velocity
pub fn integrate_projectiles(projectiles: &mut [Projectile]) {
    for projectile in projectiles.iter_mut() {
        projectile.pos += projectile.vel;
    }
}

/// Apply projectile damage to enemies.
///
/// Enemies are scanned in array order and the first overlap wins; the
/// projectile is spent and checks nothing else. Dying enemies are skipped.
pub fn resolve_projectile_hits(projectiles: &mut [Projectile], enemies: &mut [Enemy]) -> Vec<Hit> {
    let mut hits = Vec::new();
    for (p_idx, projectile) in projectiles.iter_mut().enumerate() {
        if projectile.spent {
            continue;
        }
        let struck = enemies.iter().position(|e| {
            !e.dying && circles_overlap(projectile.pos, projectile.radius, e.pos, e.radius)
        });
        if let Some(e_idx) = struck {
            let enemy = &mut enemies[e_idx];
            enemy.hp = enemy.hp.saturating_sub(projectile.damage);
            projectile.spent = true;
            hits.push(Hit {
                projectile: p_idx,
                enemy: e_idx,
                damage: projectile.damage,
            });
        }
    }
    hits
}

/// Drop spent projectiles and those far outside the arena
pub fn cull_projectiles(projectiles: &mut Vec<Projectile>, width: f32, height: f32) {
    let m = PROJECTILE_BOUNDS_MARGIN;
    projectiles.retain(|p| {
        !p.spent && p.pos.x >= -m && p.pos.x <= width + m && p.pos.y >= -m && p.pos.y <= height + m
    });
}

/// Move projectiles, apply hits, spawn damage numbers, cull
pub fn update_projectiles(world: &mut WorldState, now: u64) {
    integrate_projectiles(&mut world.projectiles);
    let hits = resolve_projectile_hits(&mut world.projectiles, &mut world.enemies);

    for hit in hits {
        let enemy = &world.enemies[hit.enemy];
        let (id, pos, radius) = (enemy.id, enemy.pos, enemy.radius);
        world.damage_numbers.push(DamageNumber {
            pos: pos - Vec2::new(0.0, radius + 8.0),
            vel: DAMAGE_NUMBER_VELOCITY,
            amount: hit.damage,
            start_time: now,
        });
        world.push_event(GameEvent::EnemyHit {
            id,
            damage: hit.damage,
        });
    }

    cull_projectiles(&mut world.projectiles, world.width, world.height);
}

/// Enemy bodies hurt the player, then grant a short invulnerability.
///
/// Flashing and dying enemies are harmless. Reaching 0 hp starts the death
/// animation; the stepper turns that into gameover.
pub fn resolve_contact_damage(world: &mut WorldState, now: u64) {
    let player = &world.player;
    if player.is_dying() {
        return;
    }
    let invulnerable_ms = world.tuning.player.contact_invulnerability_ms;
    if player
        .last_hit_at
        .is_some_and(|at| now.saturating_sub(at) < invulnerable_ms)
    {
        return;
    }

    let Some(attacker) = world.enemies.iter().find(|e| {
        !e.dying && !e.is_flashing(now) && circles_overlap(player.pos, player.radius, e.pos, e.radius)
    }) else {
        return;
    };
    let (damage, kind) = (attacker.damage, attacker.kind);

    let player = &mut world.player;
    player.hp = player.hp.saturating_sub(damage);
    player.last_hit_at = Some(now);
    let fatal = player.hp == 0;
    if fatal {
        player.set_anim(PlayerAnim::Death, now);
        log::info!("Player killed by {} on wave {}", kind.as_str(), world.wave.index);
    }
    world.push_event(GameEvent::PlayerHit { damage, fatal });
}
