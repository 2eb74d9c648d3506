//! Error types
//!
//! Ticking never fails. Commands report why they were refused; an `Err`
//! always means the world was left untouched.

use thiserror::Error;

use crate::sim::state::GamePhase;

/// Why a driver command was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("command not valid during {phase:?}")]
    WrongPhase { phase: GamePhase },
    #[error("upgrade costs {cost} but the player has {money}")]
    InsufficientFunds { cost: u32, money: u32 },
    #[error("all {max} weapon slots are occupied")]
    WeaponSlotsFull { max: usize },
    #[error("unknown weapon '{0}'")]
    UnknownWeapon(String),
}

/// Failure loading a balance table
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}
