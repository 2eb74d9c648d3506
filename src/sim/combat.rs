//! Weapon resolution
//!
//! Every equipped weapon runs independently each tick: mount position,
//! cooldown gate, nearest-target acquisition, aim, then projectile emission.
//! O(weapons x enemies), fine for tens of entities.

use glam::Vec2;

use super::state::{Enemy, GameEvent, Projectile, WeaponKind, WorldState};
use crate::tuning::WeaponStats;
use crate::{aim_direction, mirrored_aim_angle, rotate};

/// Resolved aim for one shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSolution {
    /// Clamped angle in [-90°, +90°] before mirroring
    pub angle: f32,
    /// Target is left of the pivot
    pub mirrored: bool,
    /// Unit direction of travel
    pub direction: Vec2,
    /// Where projectiles are created
    pub muzzle: Vec2,
}

/// World position of a weapon pivot from its mount offset
#[inline]
pub fn weapon_position(player_pos: Vec2, mount: Vec2) -> Vec2 {
    player_pos + mount
}

/// Nearest live enemy within `range` of `origin`.
///
/// Strictly closer wins, so the first enemy in array order keeps exact ties.
pub fn acquire_target(enemies: &[Enemy], origin: Vec2, range: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, enemy) in enemies.iter().enumerate() {
        if enemy.dying {
            continue;
        }
        let dist = origin.distance(enemy.pos);
        if dist > range {
            continue;
        }
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}

/// Aim from a pivot at a target, offsetting the muzzle along the aim
pub fn aim(pivot: Vec2, target: Vec2, muzzle_length: f32) -> AimSolution {
    let delta = target - pivot;
    let (angle, mirrored) = mirrored_aim_angle(delta.x, delta.y);
    let direction = aim_direction(angle, mirrored);
    AimSolution {
        angle,
        mirrored,
        direction,
        muzzle: pivot + direction * muzzle_length,
    }
}

/// Pellet directions fanned evenly around `direction`
pub fn pellet_directions(direction: Vec2, count: u32, spread_rad: f32) -> Vec<Vec2> {
    let center = (count.max(1) - 1) as f32 / 2.0;
    (0..count.max(1))
        .map(|i| rotate(direction, (i as f32 - center) * spread_rad))
        .collect()
}

/// Damage after the player's attack-damage bonus
#[inline]
pub fn final_damage(base: u32, attack_damage: f32) -> u32 {
    (base as f32 * (1.0 + attack_damage)).floor().max(0.0) as u32
}

/// Build the projectiles for one shot
pub fn emit_projectiles(
    stats: &WeaponStats,
    shot: &AimSolution,
    damage: u32,
    source: WeaponKind,
) -> Vec<Projectile> {
    pellet_directions(shot.direction, stats.pellet_count, stats.pellet_spread_deg.to_radians())
        .into_iter()
        .map(|dir| Projectile {
            pos: shot.muzzle,
            vel: dir * stats.projectile_speed,
            radius: stats.projectile_radius,
            damage,
            source,
            spent: false,
        })
        .collect()
}

/// Fire every ready weapon that has a target
pub fn resolve_weapons(world: &mut WorldState, now: u64) {
    let player_pos = world.player.pos;
    let upgrades = world.player.upgrades;
    let mut events = Vec::new();

    for (slot, weapon) in world.player.weapons.iter_mut().enumerate() {
        if !weapon.ready(now, upgrades.attack_speed) {
            continue;
        }

        let pivot = weapon_position(player_pos, world.tuning.mount(slot));
        let Some(target) = acquire_target(&world.enemies, pivot, weapon.range) else {
            continue;
        };

        weapon.last_attack_at = Some(now);
        let stats = world.tuning.weapon(weapon.kind);
        let damage = final_damage(weapon.damage, upgrades.attack_damage);
        let shot = aim(pivot, world.enemies[target].pos, stats.muzzle_length);
        let projectiles = emit_projectiles(stats, &shot, damage, weapon.kind);

        log::trace!(
            "{} (slot {}) fired {} pellet(s) at enemy #{} for {}",
            weapon.kind.as_str(),
            slot,
            projectiles.len(),
            world.enemies[target].id,
            damage
        );
        events.push(GameEvent::WeaponFired {
            weapon: weapon.kind,
            pellets: projectiles.len() as u32,
        });
        world.projectiles.extend(projectiles);
    }

    for event in events {
        world.push_event(event);
    }
}
