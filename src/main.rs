//! Wave Arena headless driver
//!
//! Plays a session on autopilot with a simulated 60 Hz clock and logs what
//! happens. Usage: `wave-arena [seed] [waves] [tuning.json]`.
//! Set `RUST_LOG=debug` to see spawns, kills and level-ups.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use wave_arena::Tuning;
    use wave_arena::sim::{
        self, GameEvent, GamePhase, InputIntent, WeaponKind, WorldState,
    };

    /// Simulated frame length
    const FRAME_MS: u64 = 16;
    /// Safety stop for sessions that never end
    const MAX_FRAMES: u64 = 60 * 60 * 60;

    struct Options {
        seed: u64,
        waves: u32,
        tuning: Tuning,
    }

    fn parse_args() -> Result<Options, String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let seed = match args.first() {
            Some(s) => s.parse().map_err(|e| format!("bad seed {:?}: {}", s, e))?,
            None => 42,
        };
        let waves = match args.get(1) {
            Some(s) => s.parse().map_err(|e| format!("bad wave count {:?}: {}", s, e))?,
            None => 5,
        };
        let tuning = match args.get(2) {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {}", path, e))?;
                Tuning::from_json(&json).map_err(|e| format!("{}: {}", path, e))?
            }
            None => Tuning::default(),
        };
        Ok(Options { seed, waves, tuning })
    }

    /// Walk away from the nearest live enemy
    fn autopilot(world: &WorldState) -> InputIntent {
        let me = world.player.pos;
        let threat = world
            .enemies
            .iter()
            .filter(|e| !e.dying)
            .min_by(|a, b| {
                a.pos
                    .distance(me)
                    .partial_cmp(&b.pos.distance(me))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        let Some(threat) = threat else {
            return InputIntent::default();
        };
        if threat.pos.distance(me) > 220.0 {
            return InputIntent::default();
        }

        // Away from the threat, nudged back toward the centre
        let center = glam::Vec2::new(world.width, world.height) / 2.0;
        let away = (me - threat.pos).normalize_or_zero() + (center - me).normalize_or_zero() * 0.5;
        InputIntent {
            up: away.y < -0.3,
            down: away.y > 0.3,
            left: away.x < -0.3,
            right: away.x > 0.3,
        }
    }

    /// Spend money in weapon order until nothing is affordable
    fn shop(world: &mut WorldState) {
        // Bounded in case a tuning file makes upgrades free
        for _ in 0..64 {
            let bought = WeaponKind::ALL
                .into_iter()
                .any(|kind| sim::apply_upgrade(world, kind).is_ok());
            if !bought {
                break;
            }
        }
    }

    pub fn run() {
        env_logger::init();

        let opts = match parse_args() {
            Ok(opts) => opts,
            Err(msg) => {
                log::error!("{}", msg);
                eprintln!("usage: wave-arena [seed] [waves] [tuning.json]");
                std::process::exit(2);
            }
        };
        log::info!("Wave Arena (headless) seed={} waves={}", opts.seed, opts.waves);

        let mut world = WorldState::with_tuning(opts.seed, opts.tuning);
        let mut now = 0;
        let mut kills = 0u32;

        let started = sim::open_weapon_select(&mut world)
            .and_then(|_| sim::select_weapon(&mut world, WeaponKind::Pistol, now));
        if let Err(e) = started {
            log::error!("Could not start session: {}", e);
            std::process::exit(1);
        }

        for _ in 0..MAX_FRAMES {
            now += FRAME_MS;
            let input = autopilot(&world);
            sim::step(&mut world, &input, now);

            for event in world.drain_events() {
                if let GameEvent::EnemyKilled { .. } = event {
                    kills += 1;
                }
            }

            match world.phase {
                GamePhase::Shop if world.wave.index >= opts.waves => break,
                GamePhase::Shop => {
                    shop(&mut world);
                    if let Err(e) = sim::advance_wave(&mut world, now) {
                        log::error!("Could not advance: {}", e);
                        break;
                    }
                }
                GamePhase::GameOver => break,
                _ => {}
            }
        }

        let p = &world.player;
        println!(
            "wave {} | {:?} | level {} | hp {}/{} | money {} | kills {} | weapons {}",
            world.wave.index,
            world.phase,
            p.level,
            p.hp,
            p.effective_max_hp(),
            p.money,
            kills,
            p.weapons
                .iter()
                .map(|w| format!("{}:{}", w.kind.as_str(), w.level))
                .collect::<Vec<_>>()
                .join(",")
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wave_arena::web::start, this is just to satisfy the compiler
}
