//! World state and core simulation types
//!
//! Everything the renderer reads and the stepper writes lives here.

use std::collections::{BTreeSet, VecDeque};
use std::ops::{Index, IndexMut};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::{Tuning, WeaponStats};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Title screen
    #[default]
    Menu,
    /// Picking the starting weapon
    WeaponSelect,
    /// Active combat round
    Playing,
    /// Round survived, celebration window
    Victory,
    /// Between rounds, spending money
    Shop,
    /// Player died (terminal until reset)
    GameOver,
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Slime,
    Bat,
    Wraith,
    Charger,
    Brute,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Slime,
        EnemyKind::Bat,
        EnemyKind::Wraith,
        EnemyKind::Charger,
        EnemyKind::Brute,
    ];

    /// Movement behavior class for this type
    pub fn behavior(self) -> Behavior {
        match self {
            EnemyKind::Slime | EnemyKind::Bat | EnemyKind::Brute => Behavior::Chase,
            EnemyKind::Wraith => Behavior::Materialize,
            EnemyKind::Charger => Behavior::LockAndDash,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Slime => "slime",
            EnemyKind::Bat => "bat",
            EnemyKind::Wraith => "wraith",
            EnemyKind::Charger => "charger",
            EnemyKind::Brute => "brute",
        }
    }
}

/// Enemy behavior classes (mutually exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Walk straight at the player, spawned off-screen
    Chase,
    /// Appear inside the arena, frozen for a moment, then chase
    Materialize,
    /// Snapshot the player position and charge through it
    LockAndDash,
}

/// Weapon types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Pistol,
    Shotgun,
    Smg,
    Sniper,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Pistol,
        WeaponKind::Shotgun,
        WeaponKind::Smg,
        WeaponKind::Sniper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Pistol => "pistol",
            WeaponKind::Shotgun => "shotgun",
            WeaponKind::Smg => "smg",
            WeaponKind::Sniper => "sniper",
        }
    }
}

impl std::str::FromStr for WeaponKind {
    type Err = crate::CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pistol" => Ok(WeaponKind::Pistol),
            "shotgun" => Ok(WeaponKind::Shotgun),
            "smg" => Ok(WeaponKind::Smg),
            "sniper" => Ok(WeaponKind::Sniper),
            _ => Err(crate::CommandError::UnknownWeapon(s.to_string())),
        }
    }
}

/// Named stat modifiers unlocked by upgrading a weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    Marksman,
    QuickDraw,
    SteadyHands,
    Buckshot,
    Bulwark,
    PumpAction,
    Adrenaline,
    Overclock,
    HollowPoint,
    Deadeye,
    Camouflage,
    Fortitude,
}

/// Player stat a trait adds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeStat {
    AttackDamage,
    AttackSpeed,
    MaxHp,
    MoveSpeed,
}

/// Fixed per-enemy-type record, indexable by [`EnemyKind`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerEnemy<T> {
    pub slime: T,
    pub bat: T,
    pub wraith: T,
    pub charger: T,
    pub brute: T,
}

impl<T> PerEnemy<T> {
    pub fn from_fn(mut f: impl FnMut(EnemyKind) -> T) -> Self {
        Self {
            slime: f(EnemyKind::Slime),
            bat: f(EnemyKind::Bat),
            wraith: f(EnemyKind::Wraith),
            charger: f(EnemyKind::Charger),
            brute: f(EnemyKind::Brute),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnemyKind, &T)> {
        EnemyKind::ALL.into_iter().map(move |kind| (kind, &self[kind]))
    }
}

impl<T> Index<EnemyKind> for PerEnemy<T> {
    type Output = T;

    fn index(&self, kind: EnemyKind) -> &T {
        match kind {
            EnemyKind::Slime => &self.slime,
            EnemyKind::Bat => &self.bat,
            EnemyKind::Wraith => &self.wraith,
            EnemyKind::Charger => &self.charger,
            EnemyKind::Brute => &self.brute,
        }
    }
}

impl<T> IndexMut<EnemyKind> for PerEnemy<T> {
    fn index_mut(&mut self, kind: EnemyKind) -> &mut T {
        match kind {
            EnemyKind::Slime => &mut self.slime,
            EnemyKind::Bat => &mut self.bat,
            EnemyKind::Wraith => &mut self.wraith,
            EnemyKind::Charger => &mut self.charger,
            EnemyKind::Brute => &mut self.brute,
        }
    }
}

/// Fixed per-weapon-type record, indexable by [`WeaponKind`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerWeapon<T> {
    pub pistol: T,
    pub shotgun: T,
    pub smg: T,
    pub sniper: T,
}

impl<T> Index<WeaponKind> for PerWeapon<T> {
    type Output = T;

    fn index(&self, kind: WeaponKind) -> &T {
        match kind {
            WeaponKind::Pistol => &self.pistol,
            WeaponKind::Shotgun => &self.shotgun,
            WeaponKind::Smg => &self.smg,
            WeaponKind::Sniper => &self.sniper,
        }
    }
}

impl<T> IndexMut<WeaponKind> for PerWeapon<T> {
    fn index_mut(&mut self, kind: WeaponKind) -> &mut T {
        match kind {
            WeaponKind::Pistol => &mut self.pistol,
            WeaponKind::Shotgun => &mut self.shotgun,
            WeaponKind::Smg => &mut self.smg,
            WeaponKind::Sniper => &mut self.sniper,
        }
    }
}

/// Horizontal facing for sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing toward `target_x` from `x`; unchanged when level
    pub fn toward(self, x: f32, target_x: f32) -> Facing {
        if target_x < x {
            Facing::Left
        } else if target_x > x {
            Facing::Right
        } else {
            self
        }
    }
}

/// Player animation tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAnim {
    #[default]
    Idle,
    Run,
    Victory,
    Death,
}

impl PlayerAnim {
    pub fn frame_count(&self) -> u32 {
        match self {
            PlayerAnim::Idle => 4,
            PlayerAnim::Run => 6,
            PlayerAnim::Victory => 4,
            PlayerAnim::Death => PLAYER_DEATH_FRAMES,
        }
    }

    pub fn frame_ms(&self) -> u64 {
        match self {
            PlayerAnim::Idle | PlayerAnim::Victory => 150,
            PlayerAnim::Run => 100,
            PlayerAnim::Death => PLAYER_DEATH_FRAME_MS,
        }
    }

    /// Looping animations wrap; death plays once
    pub fn loops(&self) -> bool {
        !matches!(self, PlayerAnim::Death)
    }
}

/// Additive modifiers accumulated from traits
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Upgrades {
    /// Damage multiplier bonus (0.1 = +10%)
    pub attack_damage: f32,
    /// Fire-rate bonus (0.1 = intervals divided by 1.1)
    pub attack_speed: f32,
    /// Flat max hp bonus
    pub max_hp: f32,
    /// Move speed multiplier bonus
    pub move_speed: f32,
}

impl Upgrades {
    pub fn add(&mut self, stat: UpgradeStat, amount: f32) {
        match stat {
            UpgradeStat::AttackDamage => self.attack_damage += amount,
            UpgradeStat::AttackSpeed => self.attack_speed += amount,
            UpgradeStat::MaxHp => self.max_hp += amount,
            UpgradeStat::MoveSpeed => self.move_speed += amount,
        }
    }
}

/// An equipped weapon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub damage: u32,
    pub attack_interval_ms: u64,
    pub range: f32,
    pub level: u32,
    /// Timestamp of the last shot (None = never fired)
    pub last_attack_at: Option<u64>,
    pub traits: BTreeSet<TraitKind>,
}

impl Weapon {
    /// Level-1 weapon with base stats
    pub fn new(kind: WeaponKind, stats: &WeaponStats) -> Self {
        Self {
            kind,
            damage: stats.damage,
            attack_interval_ms: stats.attack_interval_ms,
            range: stats.range,
            level: 1,
            last_attack_at: None,
            traits: BTreeSet::new(),
        }
    }

    /// Interval after the player's attack-speed bonus
    pub fn effective_interval_ms(&self, attack_speed: f32) -> f32 {
        self.attack_interval_ms as f32 / (1.0 + attack_speed).max(f32::EPSILON)
    }

    /// Whether the cooldown has elapsed at `now`
    pub fn ready(&self, now: u64, attack_speed: f32) -> bool {
        match self.last_attack_at {
            None => true,
            Some(last) => now.saturating_sub(last) as f32 >= self.effective_interval_ms(attack_speed),
        }
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    /// Base speed in px per tick (before move-speed bonus)
    pub speed: f32,
    pub hp: u32,
    pub max_hp: u32,
    pub money: u32,
    pub experience: u32,
    pub level: u32,
    pub experience_to_next: u32,
    pub facing: Facing,
    pub anim: PlayerAnim,
    pub anim_frame: u32,
    /// When the current animation frame started
    pub anim_frame_at: u64,
    pub weapons: Vec<Weapon>,
    pub selected_weapon_index: usize,
    pub upgrades: Upgrades,
    /// Last contact hit (for invulnerability)
    pub last_hit_at: Option<u64>,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let stats = &tuning.player;
        Self {
            pos: Vec2::new(tuning.arena_width / 2.0, tuning.arena_height / 2.0),
            radius: stats.radius,
            speed: stats.speed,
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            money: 0,
            experience: 0,
            level: 1,
            experience_to_next: crate::sim::progression::experience_to_next(&tuning.progression, 1),
            facing: Facing::Right,
            anim: PlayerAnim::Idle,
            anim_frame: 0,
            anim_frame_at: 0,
            weapons: Vec::new(),
            selected_weapon_index: 0,
            upgrades: Upgrades::default(),
            last_hit_at: None,
        }
    }

    /// Max hp including trait bonuses
    pub fn effective_max_hp(&self) -> u32 {
        self.max_hp + self.upgrades.max_hp.max(0.0).round() as u32
    }

    /// Speed including the move-speed bonus
    pub fn effective_speed(&self) -> f32 {
        self.speed * (1.0 + self.upgrades.move_speed).max(0.0)
    }

    pub fn is_dying(&self) -> bool {
        self.anim == PlayerAnim::Death
    }

    pub fn weapon(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.kind == kind)
    }

    /// Switch animation, restarting the frame counter on change
    pub fn set_anim(&mut self, anim: PlayerAnim, now: u64) {
        if self.anim != anim {
            self.anim = anim;
            self.anim_frame = 0;
            self.anim_frame_at = now;
        }
    }
}

/// Pre-materialization marker for flashing enemies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub position: Vec2,
    pub start_time: u64,
}

/// Lock-and-dash bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashState {
    /// Snapshot of the player position being charged at
    pub target: Option<Vec2>,
    pub cooldown_ms: u64,
    pub last_dash_at: u64,
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub hp: u32,
    pub max_hp: u32,
    pub damage: u32,
    pub facing: Facing,
    pub anim_frame: u32,
    pub anim_frame_at: u64,
    pub spawned_at: u64,
    /// Death animation running; removed once `disappear_frame` passes the last frame
    pub dying: bool,
    pub disappear_frame: u32,
    pub disappear_frame_at: u64,
    pub flash: Option<Flash>,
    pub dash: Option<DashState>,
}

impl Enemy {
    /// Still frozen in its materialization window
    pub fn is_flashing(&self, now: u64) -> bool {
        self.flash
            .is_some_and(|f| now.saturating_sub(f.start_time) < FLASH_DURATION_MS)
    }
}

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: u32,
    pub source: WeaponKind,
    /// Hit something this tick; removed in the cull pass
    pub spent: bool,
}

/// Floating damage readout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub vel: Vec2,
    pub amount: u32,
    pub start_time: u64,
}

/// Floating "level up" banner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelUpText {
    pub pos: Vec2,
    pub vel: Vec2,
    pub level: u32,
    pub start_time: u64,
}

/// Per-type spawn bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub last_spawn_at: u64,
    /// Spawned this wave
    pub spawned: u32,
}

/// Wave progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wave {
    /// 1-based, only ever increases
    pub index: u32,
    pub timers: PerEnemy<SpawnTimer>,
    /// Aggregate counters; per-type caps govern spawning
    pub spawned_total: u32,
    pub killed_total: u32,
}

impl Default for Wave {
    fn default() -> Self {
        Self {
            index: 1,
            timers: PerEnemy::default(),
            spawned_total: 0,
            killed_total: 0,
        }
    }
}

impl Wave {
    /// Restart every per-type spawn timer at `now`
    pub fn reset_spawns(&mut self, now: u64) {
        self.timers = PerEnemy::from_fn(|_| SpawnTimer {
            last_spawn_at: now,
            spawned: 0,
        });
        self.spawned_total = 0;
        self.killed_total = 0;
    }
}

/// Notifications for the audio/render layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    EnemySpawned { id: u32, kind: EnemyKind },
    WeaponFired { weapon: WeaponKind, pellets: u32 },
    EnemyHit { id: u32, damage: u32 },
    EnemyKilled { id: u32, kind: EnemyKind },
    PlayerHit { damage: u32, fatal: bool },
    LevelUp { level: u32 },
    UpgradePurchased { weapon: WeaponKind, level: u32 },
}

/// Complete world state (single owner, single writer per tick)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    #[serde(skip)]
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub width: f32,
    pub height: f32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub damage_numbers: Vec<DamageNumber>,
    pub level_up_texts: Vec<LevelUpText>,
    pub wave: Wave,
    pub victory_at: Option<u64>,
    pub timer_end_at: Option<u64>,
    /// Clock sample of the latest tick
    pub now_ms: u64,
    #[serde(skip)]
    pub events: VecDeque<GameEvent>,
    next_id: u32,
}

impl WorldState {
    /// Fresh world in the menu phase with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            width: tuning.arena_width,
            height: tuning.arena_height,
            player: Player::new(&tuning),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            damage_numbers: Vec::new(),
            level_up_texts: Vec::new(),
            wave: Wave::default(),
            victory_at: None,
            timer_end_at: None,
            now_ms: 0,
            events: VecDeque::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Back to initial values; tuning, seed, RNG stream and undrained
    /// events carry over
    pub fn reset(&mut self) {
        let tuning = std::mem::take(&mut self.tuning);
        let events = std::mem::take(&mut self.events);
        let rng = self.rng.clone();
        let now = self.now_ms;
        *self = Self::with_tuning(self.seed, tuning);
        self.rng = rng;
        self.now_ms = now;
        self.events = events;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue an event, dropping the oldest when full
    pub fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    /// Change phase, logging and emitting an event
    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        let from = self.phase;
        log::info!("Phase {:?} -> {:?} (wave {})", from, phase, self.wave.index);
        self.phase = phase;
        self.push_event(GameEvent::PhaseChanged { from, to: phase });
    }

    /// Live (not dying) enemies of a type
    pub fn live_count(&self, kind: EnemyKind) -> usize {
        self.enemies
            .iter()
            .filter(|e| e.kind == kind && !e.dying)
            .count()
    }

    /// Round time left, if a round is running
    pub fn remaining_ms(&self) -> Option<u64> {
        self.timer_end_at.map(|end| end.saturating_sub(self.now_ms))
    }

    /// Drop combat entities (between rounds)
    pub fn clear_combat(&mut self) {
        self.enemies.clear();
        self.projectiles.clear();
    }

    /// JSON view for the render layer
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_is_in_menu() {
        let world = WorldState::new(1);
        assert_eq!(world.phase, GamePhase::Menu);
        assert_eq!(world.wave.index, 1);
        assert!(world.player.weapons.is_empty());
        assert_eq!(world.player.pos, Vec2::new(world.width / 2.0, world.height / 2.0));
    }

    #[test]
    fn test_weapon_ready_respects_attack_speed() {
        let tuning = Tuning::default();
        let mut weapon = Weapon::new(WeaponKind::Pistol, tuning.weapon(WeaponKind::Pistol));
        weapon.attack_interval_ms = 600;
        assert!(weapon.ready(0, 0.0));

        weapon.last_attack_at = Some(1_000);
        assert!(!weapon.ready(1_599, 0.0));
        assert!(weapon.ready(1_600, 0.0));
        // +50% attack speed: 600 / 1.5 = 400
        assert!(weapon.ready(1_400, 0.5));
        assert!(!weapon.ready(1_399, 0.5));
    }

    #[test]
    fn test_event_queue_is_bounded() {
        let mut world = WorldState::new(1);
        for level in 0..(MAX_EVENTS as u32 + 10) {
            world.push_event(GameEvent::LevelUp { level });
        }
        let events = world.drain_events();
        assert_eq!(events.len(), MAX_EVENTS);
        assert_eq!(events[0], GameEvent::LevelUp { level: 10 });
        assert!(world.events.is_empty());
    }

    #[test]
    fn test_reset_keeps_tuning() {
        let mut tuning = Tuning::default();
        tuning.arena_width = 500.0;
        let mut world = WorldState::with_tuning(3, tuning);
        world.player.money = 99;
        world.phase = GamePhase::Shop;
        world.push_event(GameEvent::PlayerHit { damage: 5, fatal: true });
        world.reset();
        assert_eq!(world.phase, GamePhase::Menu);
        assert_eq!(world.player.money, 0);
        assert_eq!(world.width, 500.0);
        assert_eq!(world.drain_events(), vec![GameEvent::PlayerHit { damage: 5, fatal: true }]);
    }

    #[test]
    fn test_weapon_kind_from_str() {
        assert_eq!("Shotgun".parse::<WeaponKind>(), Ok(WeaponKind::Shotgun));
        assert!("laser".parse::<WeaponKind>().is_err());
    }

    #[test]
    fn test_snapshot_serializes() {
        let world = WorldState::new(5);
        let json = world.snapshot_json().expect("snapshot");
        assert!(json.contains("\"phase\":\"menu\""));
    }
}
