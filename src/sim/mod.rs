//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clock supplied by the driver, one sample per tick
//! - Seeded RNG owned by the world
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod combat;
pub mod commands;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod tick;

pub use commands::{
    advance_wave, apply_upgrade, create_world, open_weapon_select, reset_world, select_weapon,
};
pub use state::{
    Behavior, Enemy, EnemyKind, GameEvent, GamePhase, Player, PlayerAnim, Projectile, TraitKind,
    UpgradeStat, Weapon, WeaponKind, WorldState,
};
pub use tick::{InputIntent, step};
