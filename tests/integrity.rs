use hexbinder::faction::{Clock, ClockOwner, ClockTrigger};
use hexbinder::landmark::LandmarkKind;
use hexbinder::npc::NpcRole;
use hexbinder::settlement::{Notice, NoticeKind, Rumor};
use hexbinder::{
    BuiltinData, DungeonSize, DungeonTheme, GenerationParams, HexCoord, Location, RegenTarget,
    SettlementSize, Terrain, WorldData, check_integrity, clear_location, generate_world,
    regenerate,
};
use proptest::prelude::*;

fn world(seed: &str) -> WorldData {
    let params = GenerationParams {
        seed: seed.to_string(),
        map_radius: 4,
        settlements: 3,
        dungeons: 3,
        landmarks: 2,
        factions: 3,
        ..GenerationParams::default()
    };
    generate_world(&params, &BuiltinData).unwrap()
}

fn target(index: usize) -> RegenTarget {
    match index {
        0 => RegenTarget::Clear,
        1 => RegenTarget::Random,
        2 => RegenTarget::Dungeon {
            theme: DungeonTheme::Cave,
            size: Some(DungeonSize::Small),
        },
        3 => RegenTarget::Settlement {
            size: SettlementSize::Hamlet,
        },
        4 => RegenTarget::Landmark {
            kind: Some(LandmarkKind::Shipwreck),
        },
        _ => RegenTarget::Terrain {
            terrain: Terrain::Forest,
        },
    }
}

#[test]
fn generated_world_passes_integrity() {
    check_integrity(&world("integrity")).unwrap();
}

#[test]
fn clearing_a_settlement_removes_its_residents() {
    let world = world("clear-town");
    let settlement = world.settlements().next().unwrap().clone();
    assert!(world.npcs_at(&settlement.id).count() > 0);

    let cleared = clear_location(&world, settlement.hex_coord);
    assert_eq!(cleared.npcs_at(&settlement.id).count(), 0);
    assert!(!cleared.locations.contains(settlement.id.as_str()));
    let hex = cleared.hexes.get(&settlement.hex_coord).unwrap();
    assert!(hex.location_id.is_none());
    for faction in &cleared.factions {
        assert_ne!(faction.headquarters_id.as_deref(), Some(settlement.id.as_str()));
    }
    check_integrity(&cleared).unwrap();
}

/// Мир, где хотя бы одна фракция обосновалась в логове со своим главарём
fn world_with_lair() -> (WorldData, String) {
    (0..50)
        .find_map(|i| {
            let world = world(&format!("lair-{i}"));
            let faction_id = world
                .factions
                .iter()
                .find(|f| f.lair_id.is_some() && f.leader_id.is_some())?
                .id
                .clone();
            Some((world, faction_id))
        })
        .unwrap()
}

fn npc_clock(owner: &str) -> Clock {
    Clock {
        id: "clock-grudge".to_string(),
        name: "Old Grudge".to_string(),
        description: String::new(),
        segments: 4,
        filled: 1,
        owner: ClockOwner::Npc(owner.to_string()),
        trigger: ClockTrigger::Time { days_per_tick: 3 },
        consequences: Vec::new(),
        visible: false,
        paused: false,
        completed_on: None,
    }
}

#[test]
fn clearing_a_lair_drops_its_leader_and_their_clock() {
    let (mut world, faction_id) = world_with_lair();
    let faction = world.factions.get(faction_id.as_str()).unwrap().clone();
    let lair_id = faction.lair_id.clone().unwrap();
    let leader_id = faction.leader_id.clone().unwrap();
    let leader = world.npcs.get(leader_id.as_str()).unwrap();
    assert_eq!(leader.location_id, lair_id);
    assert_eq!(leader.role, Some(NpcRole::Leader));
    assert!(leader.room_id.is_some());

    world.clocks.insert(npc_clock(&leader_id));
    check_integrity(&world).unwrap();

    let coord = world.locations.get(lair_id.as_str()).unwrap().hex_coord();
    let cleared = clear_location(&world, coord);
    assert!(!cleared.clocks.contains("clock-grudge"));
    assert!(!cleared.npcs.contains(leader_id.as_str()));
    assert_eq!(cleared.npcs_at(&lair_id).count(), 0);
    let faction = cleared.factions.get(faction_id.as_str()).unwrap();
    assert!(faction.lair_id.is_none());
    assert!(faction.leader_id.is_none());
    for settlement in cleared.settlements() {
        assert!(settlement
            .rumors
            .iter()
            .all(|r| r.target_location_id.as_deref() != Some(lair_id.as_str())));
    }
    check_integrity(&cleared).unwrap();
}

#[test]
fn clearing_a_settlement_scrubs_rumors_and_notices_elsewhere() {
    let mut world = world("gossip");
    let (teller, target) = {
        let mut towns = world.settlements();
        let teller = towns.next().unwrap().id.clone();
        (teller, towns.next().unwrap().clone())
    };
    let poster = world.npcs_at(&target.id).next().unwrap().id.clone();

    if let Some(Location::Settlement(s)) = world.locations.get_mut(teller.as_str()) {
        s.rumors.push(Rumor {
            id: "rumor-neighbours".to_string(),
            text: "The next town over hides something".to_string(),
            is_true: true,
            source: "a traveller".to_string(),
            linked_hook_id: None,
            target_location_id: Some(target.id.clone()),
        });
        s.notices.push(Notice {
            id: "notice-visitor".to_string(),
            kind: NoticeKind::Job,
            title: "Escort wanted".to_string(),
            description: "Guard a wagon home".to_string(),
            reward: None,
            poster_id: Some(poster.clone()),
            linked_hook_id: None,
        });
    }
    check_integrity(&world).unwrap();

    let cleared = clear_location(&world, target.hex_coord);
    let teller = cleared
        .locations
        .get(teller.as_str())
        .and_then(Location::as_settlement)
        .unwrap();
    let rumor = teller.rumors.iter().find(|r| r.id == "rumor-neighbours").unwrap();
    assert!(rumor.target_location_id.is_none());
    let notice = teller.notices.iter().find(|n| n.id == "notice-visitor").unwrap();
    assert!(notice.poster_id.is_none());
    assert!(!cleared.npcs.contains(poster.as_str()));
    check_integrity(&cleared).unwrap();
}

#[test]
fn dungeon_residents_leave_with_their_dungeon() {
    let world = world("dwellers");
    let coord = HexCoord::new(1, -1);
    let target = RegenTarget::Dungeon {
        theme: DungeonTheme::Fortress,
        size: Some(DungeonSize::Large),
    };
    let regen = (0..20)
        .scan(world, |current, _| {
            let regen = regenerate(current, coord, target, &BuiltinData).unwrap();
            *current = regen.world.clone();
            Some(regen)
        })
        .find(|r| {
            r.location_id
                .as_deref()
                .is_some_and(|id| r.world.npcs_at(id).count() > 0)
        })
        .unwrap();
    let dungeon_id = regen.location_id.clone().unwrap();
    let dungeon = regen.world.locations.get(dungeon_id.as_str()).unwrap().as_dungeon().unwrap();
    for npc in regen.world.npcs_at(&dungeon_id) {
        assert!(dungeon.room(npc.room_id.as_deref().unwrap()).is_some());
    }

    let cleared = clear_location(&regen.world, coord);
    assert_eq!(cleared.npcs_at(&dungeon_id).count(), 0);
    check_integrity(&cleared).unwrap();
}

#[test]
fn shipwreck_floods_the_hex() {
    let world = world("wreck");
    let coord = HexCoord::new(0, 0);
    let before = world.hexes.get(&coord).unwrap().terrain;
    let regen = regenerate(&world, coord, target(4), &BuiltinData).unwrap();
    let after = regen.world.hexes.get(&coord).unwrap().terrain;
    assert_eq!(after, Terrain::Water);
    if before == Terrain::Water {
        assert!(regen.terrain_change.is_none());
    } else {
        assert_eq!(regen.terrain_change, Some((before, Terrain::Water)));
    }
}

#[test]
fn world_survives_json_snapshot() {
    let world = world("snapshot");
    let json = serde_json::to_string(&world).unwrap();
    let back: WorldData = serde_json::from_str(&json).unwrap();
    assert_eq!(back, world);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn regeneration_never_leaves_dangling_references(
        steps in prop::collection::vec((-2_i32..=2, -2_i32..=2, 0_usize..6), 1..8)
    ) {
        let mut current = world("churn");
        for (q, r, t) in steps {
            let regen = regenerate(&current, HexCoord::new(q, r), target(t), &BuiltinData);
            prop_assert!(regen.is_ok(), "{:?}", regen.err());
            if let Ok(regen) = regen {
                current = regen.world;
            }
            prop_assert!(check_integrity(&current).is_ok());
        }
    }

    #[test]
    fn clear_is_idempotent(q in -3_i32..=3, r in -1_i32..=1) {
        let world = world("idempotent");
        let once = clear_location(&world, HexCoord::new(q, r));
        let twice = clear_location(&once, HexCoord::new(q, r));
        prop_assert_eq!(&once, &twice);
        prop_assert!(check_integrity(&once).is_ok());
    }
}
