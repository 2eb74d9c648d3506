//! Experience, levels, money and the weapon shop

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, LevelUpText, UpgradeStat, Weapon, WeaponKind, WorldState};
use crate::consts::*;
use crate::error::CommandError;
use crate::tuning::{ProgressionTuning, Tuning};

/// Float speed of the level-up banner (px per tick, screen up)
const LEVEL_UP_TEXT_VELOCITY: Vec2 = Vec2::new(0.0, -0.4);

/// Experience needed to leave `level`: `floor(base * scaling^(level-1))`, at least 1
pub fn experience_to_next(prog: &ProgressionTuning, level: u32) -> u32 {
    let exponent = level.saturating_sub(1) as i32;
    let needed = (prog.base_exp_per_level as f64 * prog.exp_scaling.powi(exponent)).floor();
    needed.clamp(1.0, u32::MAX as f64) as u32
}

/// Shop price: `base_cost + current_level * step` (level 0 when not owned)
pub fn upgrade_cost(tuning: &Tuning, kind: WeaponKind, current_level: u32) -> u32 {
    tuning.weapon(kind).base_cost + current_level * tuning.progression.upgrade_cost_per_level
}

/// Victory payout for surviving `wave`
pub fn victory_award(prog: &ProgressionTuning, wave: u32) -> u32 {
    prog.victory_base_award + wave * prog.victory_award_per_wave
}

/// Pay out freshly killed enemies and start their death animation
pub fn collect_kills(world: &mut WorldState, now: u64) {
    let mut killed = Vec::new();
    for enemy in world.enemies.iter_mut() {
        if enemy.hp == 0 && !enemy.dying {
            enemy.dying = true;
            enemy.disappear_frame = 0;
            enemy.disappear_frame_at = now;
            killed.push((enemy.id, enemy.kind));
        }
    }

    for (id, kind) in killed {
        let stats = world.tuning.enemy(kind);
        let (reward, exp) = (stats.reward, stats.exp_reward);
        world.player.money = world.player.money.saturating_add(reward);
        world.player.experience = world.player.experience.saturating_add(exp);
        world.wave.killed_total += 1;
        log::debug!("Killed {} #{} (+{} money, +{} exp)", kind.as_str(), id, reward, exp);
        world.push_event(GameEvent::EnemyKilled { id, kind });
        apply_level_ups(world, now);
    }
}

/// Spend experience on levels until it no longer covers the next one.
///
/// Terminates because every pass removes at least one point of experience.
pub fn apply_level_ups(world: &mut WorldState, now: u64) -> u32 {
    let prog = world.tuning.progression;
    let mut gained = 0;

    while world.player.experience >= world.player.experience_to_next {
        let player = &mut world.player;
        player.experience -= player.experience_to_next;
        player.level += 1;

        let heal = (player.effective_max_hp() as f32 * prog.level_up_heal_fraction).floor() as u32;
        player.max_hp += prog.level_up_max_hp_bonus;
        player.hp = (player.hp + heal).min(player.effective_max_hp());
        player.speed += prog.level_up_speed_bonus;
        player.experience_to_next = experience_to_next(&prog, player.level);

        let level = player.level;
        let text_pos = player.pos - Vec2::new(0.0, player.radius + 16.0);
        world.level_up_texts.push(LevelUpText {
            pos: text_pos,
            vel: LEVEL_UP_TEXT_VELOCITY,
            level,
            start_time: now,
        });
        log::debug!("Level up -> {}", level);
        world.push_event(GameEvent::LevelUp { level });
        gained += 1;
    }
    gained
}

/// Step death animations and remove enemies whose last frame has played
pub fn advance_death_animations(world: &mut WorldState, now: u64) {
    for enemy in world.enemies.iter_mut().filter(|e| e.dying) {
        if now.saturating_sub(enemy.disappear_frame_at) >= DISAPPEAR_FRAME_MS {
            enemy.disappear_frame += 1;
            enemy.disappear_frame_at = now;
        }
    }
    world
        .enemies
        .retain(|e| !e.dying || e.disappear_frame < DISAPPEAR_FRAMES);
}

/// Buy a weapon or upgrade an owned one.
///
/// Owned: level up, add stat bonuses, roll one unassigned trait. Not owned:
/// equip at level 1 if a slot is free. Nothing changes on `Err`.
pub fn purchase_upgrade(world: &mut WorldState, kind: WeaponKind) -> Result<(), CommandError> {
    let owned = world.player.weapons.iter().position(|w| w.kind == kind);
    let current_level = owned.map_or(0, |i| world.player.weapons[i].level);
    let cost = upgrade_cost(&world.tuning, kind, current_level);

    if world.player.money < cost {
        return Err(CommandError::InsufficientFunds {
            cost,
            money: world.player.money,
        });
    }
    if owned.is_none() && world.player.weapons.len() >= MAX_WEAPONS {
        return Err(CommandError::WeaponSlotsFull { max: MAX_WEAPONS });
    }

    world.player.money -= cost;
    let level = match owned {
        Some(index) => {
            level_up_weapon(world, index);
            world.player.selected_weapon_index = index;
            world.player.weapons[index].level
        }
        None => {
            let weapon = Weapon::new(kind, world.tuning.weapon(kind));
            world.player.weapons.push(weapon);
            world.player.selected_weapon_index = world.player.weapons.len() - 1;
            1
        }
    };

    log::info!("Bought {} level {} for {}", kind.as_str(), level, cost);
    world.push_event(GameEvent::UpgradePurchased { weapon: kind, level });
    Ok(())
}

/// Apply one level of weapon growth plus a trait roll
fn level_up_weapon(world: &mut WorldState, index: usize) {
    let weapon = &mut world.player.weapons[index];
    let stats = world.tuning.weapon(weapon.kind);

    weapon.level += 1;
    weapon.damage += stats.damage_per_level;
    weapon.range += stats.range_per_level;
    weapon.attack_interval_ms = weapon
        .attack_interval_ms
        .saturating_sub(stats.interval_reduction_ms)
        .max(stats.min_interval_ms);

    let candidates: Vec<_> = stats
        .trait_pool
        .iter()
        .filter(|t| !weapon.traits.contains(&t.kind))
        .copied()
        .collect();
    if candidates.is_empty() {
        return;
    }

    let rolled = candidates[world.rng.random_range(0..candidates.len())];
    weapon.traits.insert(rolled.kind);

    let player = &mut world.player;
    player.upgrades.add(rolled.stat, rolled.amount);
    if rolled.stat == UpgradeStat::MaxHp {
        let bonus = rolled.amount.max(0.0).round() as u32;
        player.hp = (player.hp + bonus).min(player.effective_max_hp());
    }
    log::debug!("Trait {:?} rolled ({:?} +{})", rolled.kind, rolled.stat, rolled.amount);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, EnemyKind, Facing};

    fn dead_enemy(id: u32, kind: EnemyKind) -> Enemy {
        Enemy {
            id,
            kind,
            pos: Vec2::new(100.0, 100.0),
            radius: 10.0,
            speed: 1.0,
            hp: 0,
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

    #[test]
    fn test_experience_curve() {
        let prog = ProgressionTuning::default();
        assert_eq!(experience_to_next(&prog, 1), 20);
        assert_eq!(experience_to_next(&prog, 2), 26);
        // 20 * 1.3^2 = 33.8
        assert_eq!(experience_to_next(&prog, 3), 33);
    }

    #[test]
    fn test_kill_awards_once() {
        let mut world = WorldState::new(1);
        world.enemies.push(dead_enemy(1, EnemyKind::Slime));

        collect_kills(&mut world, 100);
        assert_eq!(world.player.money, 2);
        assert_eq!(world.player.experience, 3);
        assert!(world.enemies[0].dying);

        collect_kills(&mut world, 116);
        assert_eq!(world.player.money, 2);
        assert_eq!(world.player.experience, 3);
    }

    #[test]
    fn test_huge_exp_levels_many_times_and_terminates() {
        let mut world = WorldState::new(1);
        world.player.experience = 1_000_000;
        let gained = apply_level_ups(&mut world, 0);
        assert!(gained > 1);
        assert!(world.player.experience < world.player.experience_to_next);
        assert_eq!(world.level_up_texts.len(), gained as usize);
        assert_eq!(world.player.level, 1 + gained);
    }

    #[test]
    fn test_level_up_heals_and_buffs() {
        let mut world = WorldState::new(1);
        world.player.hp = 50;
        world.player.experience = 20;
        assert_eq!(apply_level_ups(&mut world, 0), 1);
        // heal 25% of 100, then +5 max hp
        assert_eq!(world.player.hp, 75);
        assert_eq!(world.player.max_hp, 105);
        assert!((world.player.speed - 3.1).abs() < 1e-5);
        assert_eq!(world.player.experience, 0);
        assert_eq!(world.player.experience_to_next, 26);
    }

    #[test]
    fn test_death_animation_lasts_five_frames() {
        let mut world = WorldState::new(1);
        world.enemies.push(dead_enemy(1, EnemyKind::Slime));
        collect_kills(&mut world, 0);

        let mut now = 0;
        for frame in 1..DISAPPEAR_FRAMES {
            now += DISAPPEAR_FRAME_MS;
            advance_death_animations(&mut world, now);
            assert_eq!(world.enemies.len(), 1);
            assert_eq!(world.enemies[0].disappear_frame, frame);
        }
        now += DISAPPEAR_FRAME_MS;
        advance_death_animations(&mut world, now);
        assert!(world.enemies.is_empty());
    }

    #[test]
    fn test_buy_new_weapon() {
        let mut world = WorldState::new(1);
        world.player.money = 45;
        purchase_upgrade(&mut world, WeaponKind::Shotgun).expect("affordable");
        assert_eq!(world.player.money, 0);
        assert_eq!(world.player.weapons.len(), 1);
        assert_eq!(world.player.weapons[0].level, 1);
        assert_eq!(world.player.selected_weapon_index, 0);
    }

    #[test]
    fn test_insufficient_funds_is_noop() {
        let mut world = WorldState::new(1);
        world.player.money = 10;
        let err = purchase_upgrade(&mut world, WeaponKind::Sniper);
        assert_eq!(err, Err(CommandError::InsufficientFunds { cost: 60, money: 10 }));
        assert_eq!(world.player.money, 10);
        assert!(world.player.weapons.is_empty());
    }

    #[test]
    fn test_slots_full() {
        let mut world = WorldState::new(1);
        let tuning = Tuning::default();
        for _ in 0..MAX_WEAPONS {
            world
                .player
                .weapons
                .push(Weapon::new(WeaponKind::Pistol, tuning.weapon(WeaponKind::Pistol)));
        }
        world.player.money = 1_000;
        let err = purchase_upgrade(&mut world, WeaponKind::Smg);
        assert_eq!(err, Err(CommandError::WeaponSlotsFull { max: MAX_WEAPONS }));
        assert_eq!(world.player.money, 1_000);
    }

    #[test]
    fn test_upgrade_grows_stats_and_rolls_unique_traits() {
        let mut world = WorldState::new(9);
        let tuning = Tuning::default();
        world
            .player
            .weapons
            .push(Weapon::new(WeaponKind::Sniper, tuning.weapon(WeaponKind::Sniper)));
        world.player.money = 10_000;

        for _ in 0..5 {
            purchase_upgrade(&mut world, WeaponKind::Sniper).expect("affordable");
        }
        let sniper = &world.player.weapons[0];
        assert_eq!(sniper.level, 6);
        assert_eq!(sniper.damage, 35 + 5 * 12);
        // 1600 - 5*100 = 1100
        assert_eq!(sniper.attack_interval_ms, 1_100);
        // Pool of three, never repeated
        assert_eq!(sniper.traits.len(), 3);

        let up = world.player.upgrades;
        assert!((up.attack_damage - 0.20).abs() < 1e-6);
        assert!((up.move_speed - 0.05).abs() < 1e-6);
        assert!((up.max_hp - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_interval_never_below_minimum() {
        let mut world = WorldState::new(2);
        let tuning = Tuning::default();
        world
            .player
            .weapons
            .push(Weapon::new(WeaponKind::Smg, tuning.weapon(WeaponKind::Smg)));
        world.player.money = u32::MAX / 2;
        for _ in 0..20 {
            purchase_upgrade(&mut world, WeaponKind::Smg).expect("affordable");
        }
        assert_eq!(world.player.weapons[0].attack_interval_ms, 80);
    }
}
