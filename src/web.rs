//! Browser bridge
//!
//! The JS render/UI layer owns the animation loop and input. It calls
//! [`WebWorld::step`] once per frame with `performance.now()` and reads the
//! world back as JSON.

use wasm_bindgen::prelude::*;

use crate::sim::{self, InputIntent, WeaponKind, WorldState};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Already initialised when the module is re-instantiated
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Wave Arena core loaded");
}

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn weapon_kind(name: &str) -> Result<WeaponKind, JsValue> {
    name.parse::<WeaponKind>().map_err(to_js)
}

/// A world handle owned by JS
#[wasm_bindgen]
pub struct WebWorld {
    world: WorldState,
    input: InputIntent,
}

#[wasm_bindgen]
impl WebWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebWorld {
        WebWorld {
            world: sim::create_world(seed),
            input: InputIntent::default(),
        }
    }

    /// World with a JSON balance override
    pub fn with_tuning(seed: u64, tuning_json: &str) -> Result<WebWorld, JsValue> {
        let tuning = Tuning::from_json(tuning_json).map_err(to_js)?;
        Ok(WebWorld {
            world: WorldState::with_tuning(seed, tuning),
            input: InputIntent::default(),
        })
    }

    /// Held keys, applied on every following step until changed
    pub fn set_input(&mut self, up: bool, down: bool, left: bool, right: bool) {
        self.input = InputIntent { up, down, left, right };
    }

    pub fn step(&mut self, now_ms: f64) {
        sim::step(&mut self.world, &self.input, now_ms.max(0.0) as u64);
    }

    pub fn open_weapon_select(&mut self) -> Result<(), JsValue> {
        sim::open_weapon_select(&mut self.world).map_err(to_js)
    }

    pub fn select_weapon(&mut self, weapon: &str, now_ms: f64) -> Result<(), JsValue> {
        let kind = weapon_kind(weapon)?;
        sim::select_weapon(&mut self.world, kind, now_ms.max(0.0) as u64).map_err(to_js)
    }

    pub fn advance_wave(&mut self, now_ms: f64) -> Result<(), JsValue> {
        sim::advance_wave(&mut self.world, now_ms.max(0.0) as u64).map_err(to_js)
    }

    pub fn apply_upgrade(&mut self, weapon: &str) -> Result<(), JsValue> {
        let kind = weapon_kind(weapon)?;
        sim::apply_upgrade(&mut self.world, kind).map_err(to_js)
    }

    pub fn reset(&mut self) {
        sim::reset_world(&mut self.world);
        self.input = InputIntent::default();
    }

    /// Current world as JSON for the renderer
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.world.snapshot_json().map_err(to_js)
    }

    /// Pending events as a JSON array (drains the queue)
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.world.drain_events()).map_err(to_js)
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.world.phase)
    }
}
