use proptest::prelude::*;

use wave_arena::consts::*;
use wave_arena::sim::progression::{advance_death_animations, apply_level_ups, collect_kills};
use wave_arena::sim::spawn::population_cap;
use wave_arena::sim::{self, EnemyKind, InputIntent, WeaponKind, WorldState};

const FRAME_MS: u64 = 16;

fn intent(mask: u8) -> InputIntent {
    InputIntent {
        up: mask & 1 != 0,
        down: mask & 2 != 0,
        left: mask & 4 != 0,
        right: mask & 8 != 0,
    }
}

fn weapon_kind() -> impl Strategy<Value = WeaponKind> {
    prop::sample::select(WeaponKind::ALL.to_vec())
}

fn playing(seed: u64, weapon: WeaponKind, wave: u32) -> WorldState {
    let mut world = sim::create_world(seed);
    sim::open_weapon_select(&mut world).expect("menu");
    sim::select_weapon(&mut world, weapon, 0).expect("weapon select");
    world.wave.index = wave;
    world
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn player_stays_in_arena(
        seed in any::<u64>(),
        weapon in weapon_kind(),
        moves in prop::collection::vec((0u8..16, 1u32..30), 1..60),
    ) {
        let mut world = playing(seed, weapon, 1);
        let mut now = 0;
        for (mask, frames) in moves {
            let input = intent(mask);
            for _ in 0..frames {
                now += FRAME_MS;
                sim::step(&mut world, &input, now);
                let p = world.player.pos;
                prop_assert!(p.x >= 0.0 && p.x <= world.width);
                prop_assert!(p.y >= 0.0 && p.y <= world.height);
            }
        }
    }

    #[test]
    fn weapons_respect_cooldown(
        seed in any::<u64>(),
        weapon in weapon_kind(),
        wave in 1u32..8,
        frames in 200u32..1_200,
    ) {
        let mut world = playing(seed, weapon, wave);
        world.player.max_hp = 100_000;
        world.player.hp = 100_000;
        let mut last = world.player.weapons[0].last_attack_at;
        let mut now = 0;
        for _ in 0..frames {
            now += FRAME_MS;
            sim::step(&mut world, &InputIntent::default(), now);
            let w = &world.player.weapons[0];
            if let (Some(prev), Some(fired)) = (last, w.last_attack_at) {
                if fired != prev {
                    let interval = w.effective_interval_ms(world.player.upgrades.attack_speed);
                    prop_assert!((fired - prev) as f32 >= interval);
                }
            }
            last = w.last_attack_at;
        }
    }

    #[test]
    fn spawns_respect_unlock_and_cap(
        seed in any::<u64>(),
        wave in 1u32..7,
        frames in 100u32..1_500,
    ) {
        let mut world = playing(seed, WeaponKind::Pistol, wave);
        world.player.max_hp = 100_000;
        world.player.hp = 100_000;
        let mut now = 0;
        for _ in 0..frames {
            now += FRAME_MS;
            sim::step(&mut world, &InputIntent::default(), now);
            for kind in EnemyKind::ALL {
                let stats = world.tuning.enemy(kind);
                if wave < stats.unlock_wave {
                    prop_assert!(world.enemies.iter().all(|e| e.kind != kind));
                }
                let cap = population_cap(stats, &world.tuning.waves, wave) as usize;
                prop_assert!(world.live_count(kind) <= cap);
            }
        }
    }

    #[test]
    fn leveling_always_terminates(exp in 0u32..5_000_000, level in 1u32..40) {
        let mut world = sim::create_world(1);
        world.player.level = level;
        world.player.experience_to_next =
            sim::progression::experience_to_next(&world.tuning.progression, level);
        world.player.experience = exp;
        apply_level_ups(&mut world, 0);
        prop_assert!(world.player.experience < world.player.experience_to_next);
        prop_assert!(world.player.hp <= world.player.effective_max_hp());
    }

    #[test]
    fn killed_enemies_fade_out_exactly_once(
        seed in any::<u64>(),
        gaps in prop::collection::vec(DISAPPEAR_FRAME_MS..DISAPPEAR_FRAME_MS * 3, 5),
    ) {
        let mut world = playing(seed, WeaponKind::Pistol, 1);
        let mut now = 0;
        while world.enemies.is_empty() {
            now += FRAME_MS;
            sim::spawn::run_spawner(&mut world, now);
        }
        let id = world.enemies[0].id;
        let money = world.player.money;
        world.enemies[0].hp = 0;

        collect_kills(&mut world, now);
        prop_assert!(world.enemies[0].dying);
        let paid = world.player.money;
        prop_assert!(paid > money);

        let mut frames_seen = vec![world.enemies[0].disappear_frame];
        for gap in gaps {
            now += gap;
            advance_death_animations(&mut world, now);
            collect_kills(&mut world, now);
            prop_assert_eq!(world.player.money, paid);
            match world.enemies.iter().find(|e| e.id == id) {
                Some(e) => frames_seen.push(e.disappear_frame),
                None => break,
            }
        }
        prop_assert!(world.enemies.iter().all(|e| e.id != id));
        prop_assert_eq!(frames_seen, (0..DISAPPEAR_FRAMES).collect::<Vec<_>>());
    }
}
