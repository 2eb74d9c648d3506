//! Per-tick stepper
//!
//! Advances the world by one animation tick. Movement is per tick (not
//! time-scaled); every timer compares against the single `now` passed in.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ai::update_enemies;
use super::collision::{resolve_contact_damage, update_projectiles};
use super::combat::resolve_weapons;
use super::progression::{advance_death_animations, collect_kills, victory_award};
use super::spawn::run_spawner;
use super::state::{Facing, GamePhase, PlayerAnim, WorldState};
use crate::clamp_to_arena;
use crate::consts::*;

/// Held movement keys for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputIntent {
    /// Unit movement direction (zero when idle or cancelled)
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }
}

/// Advance the world by one tick at clock sample `now`
pub fn step(world: &mut WorldState, input: &InputIntent, now: u64) {
    // Clock never runs backwards
    let now = now.max(world.now_ms);
    world.now_ms = now;

    match world.phase {
        GamePhase::Playing => step_playing(world, input, now),
        GamePhase::Victory => {
            advance_player_anim(world, now);
            if world
                .victory_at
                .is_some_and(|at| now.saturating_sub(at) >= VICTORY_WINDOW_MS)
            {
                world.clear_combat();
                world.victory_at = None;
                world.set_phase(GamePhase::Shop);
            }
        }
        GamePhase::Menu | GamePhase::WeaponSelect | GamePhase::Shop | GamePhase::GameOver => {}
    }

    expire_feedback(world, now);
}

fn step_playing(world: &mut WorldState, input: &InputIntent, now: u64) {
    if world.player.is_dying() {
        advance_player_anim(world, now);
        if world.player.anim_frame >= PLAYER_DEATH_FRAMES {
            world.set_phase(GamePhase::GameOver);
            return;
        }
        // Shots already in flight still land and pay out
        update_enemies(world, now);
        update_projectiles(world, now);
        advance_death_animations(world, now);
        collect_kills(world, now);
        return;
    }

    if world.timer_end_at.is_some_and(|end| now >= end) {
        let award = victory_award(&world.tuning.progression, world.wave.index);
        world.player.money = world.player.money.saturating_add(award);
        world.player.set_anim(PlayerAnim::Victory, now);
        world.victory_at = Some(now);
        world.timer_end_at = None;
        log::info!("Wave {} survived (+{} money)", world.wave.index, award);
        world.set_phase(GamePhase::Victory);
        return;
    }

    move_player(world, input, now);
    run_spawner(world, now);
    update_enemies(world, now);
    resolve_contact_damage(world, now);
    if world.player.is_dying() {
        return;
    }
    resolve_weapons(world, now);
    update_projectiles(world, now);
    advance_death_animations(world, now);
    collect_kills(world, now);
}

fn move_player(world: &mut WorldState, input: &InputIntent, now: u64) {
    let (width, height) = (world.width, world.height);
    let player = &mut world.player;
    let dir = input.direction();

    player.pos = clamp_to_arena(
        player.pos + dir * player.effective_speed(),
        player.radius,
        width,
        height,
    );
    if dir.x < 0.0 {
        player.facing = Facing::Left;
    } else if dir.x > 0.0 {
        player.facing = Facing::Right;
    }

    let anim = if dir == Vec2::ZERO {
        PlayerAnim::Idle
    } else {
        PlayerAnim::Run
    };
    player.set_anim(anim, now);
    advance_player_anim(world, now);
}

fn advance_player_anim(world: &mut WorldState, now: u64) {
    let player = &mut world.player;
    let anim = player.anim;
    if now.saturating_sub(player.anim_frame_at) < anim.frame_ms() {
        return;
    }
    player.anim_frame_at = now;
    if anim.loops() {
        player.anim_frame = (player.anim_frame + 1) % anim.frame_count();
    } else {
        // One-shot: counts past the last frame to signal completion
        player.anim_frame = (player.anim_frame + 1).min(anim.frame_count());
    }
}

/// Drift and expire damage numbers and level-up banners
fn expire_feedback(world: &mut WorldState, now: u64) {
    world
        .damage_numbers
        .retain(|d| now.saturating_sub(d.start_time) < DAMAGE_NUMBER_TTL_MS);
    for number in world.damage_numbers.iter_mut() {
        number.pos += number.vel;
    }
    world
        .level_up_texts
        .retain(|t| now.saturating_sub(t.start_time) < LEVEL_UP_TEXT_TTL_MS);
    for text in world.level_up_texts.iter_mut() {
        text.pos += text.vel;
    }
}
