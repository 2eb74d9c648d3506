//! Data-driven game balance
//!
//! Every number the designers touch lives here. Defaults are the shipped
//! balance; a JSON document can override whole sections (missing sections
//! keep their defaults, tables are replaced wholesale).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_WEAPONS;
use crate::error::TuningError;
use crate::sim::state::{EnemyKind, PerEnemy, PerWeapon, TraitKind, UpgradeStat, WeaponKind};

/// Base stats for one enemy type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// First wave this type may spawn in
    pub unlock_wave: u32,
    pub base_hp: u32,
    pub hp_per_wave: u32,
    /// px per tick
    pub base_speed: f32,
    pub speed_per_wave: f32,
    /// Contact damage
    pub damage: u32,
    pub radius: f32,
    /// Money on kill
    pub reward: u32,
    pub exp_reward: u32,
    pub base_max_on_screen: u32,
    pub base_spawn_interval_ms: u64,
    /// Only used by lock-and-dash types
    #[serde(default)]
    pub dash_cooldown_ms: u64,
}

/// A trait a weapon upgrade can roll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitDef {
    pub kind: TraitKind,
    pub stat: UpgradeStat,
    pub amount: f32,
}

impl TraitDef {
    const fn new(kind: TraitKind, stat: UpgradeStat, amount: f32) -> Self {
        Self { kind, stat, amount }
    }
}

/// Base stats and upgrade curve for one weapon type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub damage: u32,
    pub attack_interval_ms: u64,
    pub range: f32,
    /// px per tick
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub pellet_count: u32,
    /// Angle between adjacent pellets
    pub pellet_spread_deg: f32,
    pub base_cost: u32,
    /// Distance from pivot to muzzle
    pub muzzle_length: f32,
    pub damage_per_level: u32,
    pub range_per_level: f32,
    pub interval_reduction_ms: u64,
    pub min_interval_ms: u64,
    pub trait_pool: Vec<TraitDef>,
}

/// Starting player stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    /// px per tick
    pub speed: f32,
    pub max_hp: u32,
    pub contact_invulnerability_ms: u64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 20.0,
            speed: 3.0,
            max_hp: 100,
            contact_invulnerability_ms: 600,
        }
    }
}

/// Difficulty curve across waves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveScaling {
    /// Multiplier growth applied on top of per-wave stat gains
    pub global_wave_scaling: f64,
    /// Population cap growth per wave
    pub cap_growth_per_wave: f64,
    /// Spawn interval shrink per wave
    pub cadence_reduction_per_wave: f64,
    /// Spawn interval never drops below this fraction of base
    pub min_cadence_factor: f64,
}

impl Default for WaveScaling {
    fn default() -> Self {
        Self {
            global_wave_scaling: 0.1,
            cap_growth_per_wave: 0.2,
            cadence_reduction_per_wave: 0.1,
            min_cadence_factor: 0.3,
        }
    }
}

/// Experience curve and economy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    pub base_exp_per_level: u32,
    pub exp_scaling: f64,
    /// Fraction of max hp restored per level gained
    pub level_up_heal_fraction: f32,
    pub level_up_max_hp_bonus: u32,
    pub level_up_speed_bonus: f32,
    /// Upgrade cost grows by this per owned level
    pub upgrade_cost_per_level: u32,
    pub victory_base_award: u32,
    pub victory_award_per_wave: u32,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            base_exp_per_level: 20,
            exp_scaling: 1.3,
            level_up_heal_fraction: 0.25,
            level_up_max_hp_bonus: 5,
            level_up_speed_bonus: 0.1,
            upgrade_cost_per_level: 20,
            victory_base_award: 50,
            victory_award_per_wave: 10,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena_width: f32,
    pub arena_height: f32,
    pub player: PlayerTuning,
    pub enemies: PerEnemy<EnemyStats>,
    pub weapons: PerWeapon<WeaponStats>,
    pub waves: WaveScaling,
    pub progression: ProgressionTuning,
    /// Weapon pivot offsets from the player center, by slot
    pub mounts: [Vec2; MAX_WEAPONS],
}

impl Default for Tuning {
    fn default() -> Self {
        use TraitKind::*;
        use UpgradeStat::*;

        let enemies = PerEnemy {
            slime: EnemyStats {
                unlock_wave: 1,
                base_hp: 10,
                hp_per_wave: 4,
                base_speed: 1.2,
                speed_per_wave: 0.05,
                damage: 5,
                radius: 16.0,
                reward: 2,
                exp_reward: 3,
                base_max_on_screen: 8,
                base_spawn_interval_ms: 1_200,
                dash_cooldown_ms: 0,
            },
            bat: EnemyStats {
                unlock_wave: 2,
                base_hp: 6,
                hp_per_wave: 2,
                base_speed: 2.2,
                speed_per_wave: 0.08,
                damage: 4,
                radius: 12.0,
                reward: 3,
                exp_reward: 4,
                base_max_on_screen: 6,
                base_spawn_interval_ms: 1_500,
                dash_cooldown_ms: 0,
            },
            wraith: EnemyStats {
                unlock_wave: 3,
                base_hp: 18,
                hp_per_wave: 5,
                base_speed: 1.6,
                speed_per_wave: 0.05,
                damage: 8,
                radius: 18.0,
                reward: 5,
                exp_reward: 6,
                base_max_on_screen: 4,
                base_spawn_interval_ms: 2_500,
                dash_cooldown_ms: 0,
            },
            charger: EnemyStats {
                unlock_wave: 4,
                base_hp: 30,
                hp_per_wave: 8,
                base_speed: 1.0,
                speed_per_wave: 0.03,
                damage: 12,
                radius: 22.0,
                reward: 8,
                exp_reward: 10,
                base_max_on_screen: 2,
                base_spawn_interval_ms: 4_000,
                dash_cooldown_ms: 2_500,
            },
            brute: EnemyStats {
                unlock_wave: 5,
                base_hp: 60,
                hp_per_wave: 15,
                base_speed: 0.8,
                speed_per_wave: 0.02,
                damage: 15,
                radius: 28.0,
                reward: 12,
                exp_reward: 15,
                base_max_on_screen: 2,
                base_spawn_interval_ms: 5_000,
                dash_cooldown_ms: 0,
            },
        };

        let weapons = PerWeapon {
            pistol: WeaponStats {
                damage: 10,
                attack_interval_ms: 600,
                range: 350.0,
                projectile_speed: 9.0,
                projectile_radius: 4.0,
                pellet_count: 1,
                pellet_spread_deg: 0.0,
                base_cost: 30,
                muzzle_length: 22.0,
                damage_per_level: 4,
                range_per_level: 15.0,
                interval_reduction_ms: 50,
                min_interval_ms: 200,
                trait_pool: vec![
                    TraitDef::new(Marksman, AttackDamage, 0.10),
                    TraitDef::new(QuickDraw, AttackSpeed, 0.10),
                    TraitDef::new(SteadyHands, MaxHp, 10.0),
                ],
            },
            shotgun: WeaponStats {
                damage: 6,
                attack_interval_ms: 1_100,
                range: 220.0,
                projectile_speed: 8.0,
                projectile_radius: 3.0,
                pellet_count: 5,
                pellet_spread_deg: 8.0,
                base_cost: 45,
                muzzle_length: 26.0,
                damage_per_level: 2,
                range_per_level: 10.0,
                interval_reduction_ms: 80,
                min_interval_ms: 400,
                trait_pool: vec![
                    TraitDef::new(Buckshot, AttackDamage, 0.15),
                    TraitDef::new(Bulwark, MaxHp, 20.0),
                    TraitDef::new(PumpAction, AttackSpeed, 0.08),
                ],
            },
            smg: WeaponStats {
                damage: 4,
                attack_interval_ms: 180,
                range: 280.0,
                projectile_speed: 11.0,
                projectile_radius: 3.0,
                pellet_count: 1,
                pellet_spread_deg: 0.0,
                base_cost: 40,
                muzzle_length: 20.0,
                damage_per_level: 1,
                range_per_level: 10.0,
                interval_reduction_ms: 15,
                min_interval_ms: 80,
                trait_pool: vec![
                    TraitDef::new(Adrenaline, MoveSpeed, 0.08),
                    TraitDef::new(Overclock, AttackSpeed, 0.12),
                    TraitDef::new(HollowPoint, AttackDamage, 0.05),
                ],
            },
            sniper: WeaponStats {
                damage: 35,
                attack_interval_ms: 1_600,
                range: 600.0,
                projectile_speed: 16.0,
                projectile_radius: 4.0,
                pellet_count: 1,
                pellet_spread_deg: 0.0,
                base_cost: 60,
                muzzle_length: 34.0,
                damage_per_level: 12,
                range_per_level: 25.0,
                interval_reduction_ms: 100,
                min_interval_ms: 700,
                trait_pool: vec![
                    TraitDef::new(Deadeye, AttackDamage, 0.20),
                    TraitDef::new(Camouflage, MoveSpeed, 0.05),
                    TraitDef::new(Fortitude, MaxHp, 15.0),
                ],
            },
        };

        Self {
            arena_width: 1280.0,
            arena_height: 720.0,
            player: PlayerTuning::default(),
            enemies,
            weapons,
            waves: WaveScaling::default(),
            progression: ProgressionTuning::default(),
            mounts: [
                Vec2::new(-28.0, -6.0),
                Vec2::new(28.0, -6.0),
                Vec2::new(-34.0, 14.0),
                Vec2::new(34.0, 14.0),
                Vec2::new(-22.0, 30.0),
                Vec2::new(22.0, 30.0),
            ],
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON balance document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[inline]
    pub fn enemy(&self, kind: EnemyKind) -> &EnemyStats {
        &self.enemies[kind]
    }

    #[inline]
    pub fn weapon(&self, kind: WeaponKind) -> &WeaponStats {
        &self.weapons[kind]
    }

    /// Pivot offset for a weapon slot
    #[inline]
    pub fn mount(&self, slot: usize) -> Vec2 {
        self.mounts[slot % MAX_WEAPONS]
    }

    /// Reject tables that would stall or break the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: String| -> Result<(), TuningError> { Err(TuningError::Invalid(msg)) };

        if self.arena_width <= 0.0 || self.arena_height <= 0.0 {
            return invalid(format!(
                "arena must have positive size, got {}x{}",
                self.arena_width, self.arena_height
            ));
        }
        if self.player.radius <= 0.0 || self.player.max_hp == 0 {
            return invalid("player needs a positive radius and max hp".into());
        }
        if self.progression.base_exp_per_level == 0 || self.progression.exp_scaling < 1.0 {
            return invalid("experience curve must start at >= 1 and never shrink".into());
        }
        if self.waves.min_cadence_factor <= 0.0 {
            return invalid("min_cadence_factor must be positive".into());
        }
        for (kind, stats) in self.enemies.iter() {
            if stats.base_spawn_interval_ms == 0 {
                return invalid(format!("{} has a zero spawn interval", kind.as_str()));
            }
            if stats.unlock_wave == 0 {
                return invalid(format!("{} unlock_wave must be >= 1", kind.as_str()));
            }
            if stats.radius <= 0.0 {
                return invalid(format!("{} needs a positive radius", kind.as_str()));
            }
        }
        for kind in WeaponKind::ALL {
            let stats = self.weapon(kind);
            if stats.pellet_count == 0 || stats.min_interval_ms == 0 {
                return invalid(format!(
                    "{} needs at least one pellet and a non-zero min interval",
                    kind.as_str()
                ));
            }
        }
        Ok(())
    }
}
