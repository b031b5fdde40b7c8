use hexbinder::calendar::DayEvent;
use hexbinder::faction::{Clock, ClockOwner, ClockTrigger, Consequence, ConsequenceKind, GoalStatus};
use hexbinder::{BuiltinData, GenerationParams, WorldData, advance_day, advance_days, generate_world};
use proptest::prelude::*;

fn timed_clock(id: &str, segments: u32, days_per_tick: u32, owner: ClockOwner) -> Clock {
    Clock {
        id: id.to_string(),
        name: "Gathering Storm".to_string(),
        description: String::new(),
        segments,
        filled: 0,
        owner,
        trigger: ClockTrigger::Time { days_per_tick },
        consequences: vec![Consequence {
            description: "The storm breaks".to_string(),
            kind: ConsequenceKind::Event,
        }],
        visible: true,
        paused: false,
        completed_on: None,
    }
}

fn small_world(seed: &str) -> WorldData {
    let params = GenerationParams {
        seed: seed.to_string(),
        map_radius: 4,
        settlements: 2,
        dungeons: 2,
        landmarks: 1,
        factions: 2,
        ..GenerationParams::default()
    };
    generate_world(&params, &BuiltinData).unwrap()
}

#[test]
fn ten_days_tick_a_five_day_clock_twice() {
    let mut world = WorldData::empty("w", "Calendar", "ticks");
    world
        .clocks
        .insert(timed_clock("clock-a", 8, 5, ClockOwner::World));

    let mut current = world;
    for _ in 0..10 {
        current = advance_day(&current).unwrap();
    }
    assert_eq!(current.state.day, 11);
    assert_eq!(current.clocks.get("clock-a").unwrap().filled, 2);
    assert_eq!(current.state.log.len(), 10);
}

#[test]
fn paused_clock_does_not_tick() {
    let mut world = WorldData::empty("w", "Calendar", "paused");
    let mut clock = timed_clock("clock-p", 4, 1, ClockOwner::World);
    clock.paused = true;
    world.clocks.insert(clock);
    let next = advance_days(&world, 5);
    assert_eq!(next.clocks.get("clock-p").unwrap().filled, 0);
}

#[test]
fn completed_faction_clock_completes_a_goal() {
    let mut world = small_world("goal");
    let faction_id = world.factions.keys().next().unwrap().clone();
    let mut clock = timed_clock("clock-f", 2, 1, ClockOwner::Faction(faction_id.clone()));
    clock.filled = 1;
    world.clocks.insert(clock);

    let next = advance_day(&world).unwrap();
    let clock = next.clocks.get("clock-f").unwrap();
    assert_eq!(clock.filled, 2);
    assert_eq!(clock.completed_on, Some(2));

    let faction = next.factions.get(faction_id.as_str()).unwrap();
    assert_eq!(faction.agenda[0].status, GoalStatus::Completed);
    let events = &next.state.log.last().unwrap().events;
    assert!(events.iter().any(|e| matches!(e, DayEvent::ClockCompleted { clock_id, .. } if clock_id == "clock-f")));
    assert!(events.iter().any(|e| matches!(e, DayEvent::GoalCompleted { faction_id: id, .. } if *id == faction_id)));
}

#[test]
fn weather_depends_only_on_seed_and_day() {
    let a = advance_days(&WorldData::empty("a", "A", "skies"), 30);
    let b = advance_days(&WorldData::empty("b", "B", "skies"), 30);
    assert_eq!(a.state.weather, b.state.weather);
    assert_eq!(a.state.log, b.state.log);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn advancing_never_touches_entities(days in 0_u32..120) {
        let world = small_world("stable");
        let next = advance_days(&world, days);
        prop_assert_eq!(next.state.day, 1 + days);
        prop_assert_eq!(&next.locations, &world.locations);
        prop_assert_eq!(&next.npcs, &world.npcs);
        prop_assert_eq!(&next.hexes, &world.hexes);
        for clock in &next.clocks {
            prop_assert!(clock.filled <= clock.segments);
        }
    }
}
