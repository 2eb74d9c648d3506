//! Discrete commands the driver issues between ticks
//!
//! Each command checks the phase first and returns [`CommandError`] without
//! touching the world when it does not apply.

use super::progression::purchase_upgrade;
use super::state::{GameEvent, GamePhase, Weapon, WeaponKind, WorldState};
use crate::consts::ROUND_DURATION_MS;
use crate::error::CommandError;

fn require_phase(world: &WorldState, phase: GamePhase) -> Result<(), CommandError> {
    if world.phase == phase {
        Ok(())
    } else {
        Err(CommandError::WrongPhase { phase: world.phase })
    }
}

/// New world in the menu phase
pub fn create_world(seed: u64) -> WorldState {
    log::info!("Created world (seed {})", seed);
    WorldState::new(seed)
}

/// Menu -> weapon select, starting from a fresh world
pub fn open_weapon_select(world: &mut WorldState) -> Result<(), CommandError> {
    require_phase(world, GamePhase::Menu)?;
    world.reset();
    world.set_phase(GamePhase::WeaponSelect);
    Ok(())
}

/// Pick the starting weapon and begin wave 1
pub fn select_weapon(world: &mut WorldState, kind: WeaponKind, now: u64) -> Result<(), CommandError> {
    require_phase(world, GamePhase::WeaponSelect)?;

    let weapon = Weapon::new(kind, world.tuning.weapon(kind));
    world.player.weapons = vec![weapon];
    world.player.selected_weapon_index = 0;
    world.wave.index = 1;
    start_round(world, now);
    log::info!("Starting weapon: {}", kind.as_str());
    Ok(())
}

/// Shop -> next wave
pub fn advance_wave(world: &mut WorldState, now: u64) -> Result<(), CommandError> {
    require_phase(world, GamePhase::Shop)?;
    world.wave.index += 1;
    start_round(world, now);
    Ok(())
}

/// Buy or upgrade a weapon in the shop
pub fn apply_upgrade(world: &mut WorldState, kind: WeaponKind) -> Result<(), CommandError> {
    require_phase(world, GamePhase::Shop)?;
    purchase_upgrade(world, kind)
}

/// Back to the menu from any phase
pub fn reset_world(world: &mut WorldState) {
    let from = world.phase;
    world.reset();
    log::info!("World reset");
    if from != GamePhase::Menu {
        world.push_event(GameEvent::PhaseChanged { from, to: GamePhase::Menu });
    }
}

fn start_round(world: &mut WorldState, now: u64) {
    world.clear_combat();
    world.wave.reset_spawns(now);
    world.victory_at = None;
    world.timer_end_at = Some(now + ROUND_DURATION_MS);
    world.now_ms = world.now_ms.max(now);
    world.set_phase(GamePhase::Playing);
}
