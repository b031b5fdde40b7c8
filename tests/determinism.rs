use hexbinder::dungeon::connectivity::{passage_graph, reachable};
use hexbinder::table::Table;
use hexbinder::{
    BuiltinData, DungeonParams, DungeonSize, DungeonTheme, GenerationParams, Hex, HexCoord,
    Terrain, generate_dungeon, generate_world, place_dungeon,
};
use proptest::prelude::*;

fn hills() -> Hex {
    Hex::new(HexCoord::new(2, -1), Terrain::Hills)
}

fn small_map() -> Table<Hex> {
    HexCoord::spiral(2)
        .enumerate()
        .map(|(i, coord)| {
            let terrain = Terrain::ALL[i % Terrain::ALL.len()];
            Hex::new(coord, terrain)
        })
        .collect()
}

#[test]
fn abc_cave_medium_is_reproducible() {
    let params = DungeonParams::new(DungeonTheme::Cave, DungeonSize::Medium);
    let a = generate_dungeon("abc", &params, &hills(), &BuiltinData).unwrap();
    let b = generate_dungeon("abc", &params, &hills(), &BuiltinData).unwrap();

    assert_eq!(a.rooms.len(), b.rooms.len());
    assert_eq!(a.rooms[0].bounds, b.rooms[0].bounds);
    let waypoints = |d: &hexbinder::SpatialDungeon| {
        d.passages
            .iter()
            .map(|p| p.waypoints.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(waypoints(&a), waypoints(&b));
    assert_eq!(a, b);
}

#[test]
fn medium_dungeons_fit_a_40_by_40_grid() {
    let (min, max) = DungeonSize::Medium.room_range();
    let params = DungeonParams::new(DungeonTheme::Tomb, DungeonSize::Medium).with_grid(40, 40);
    let total = 200;
    let within = (0..total)
        .filter(|i| {
            generate_dungeon(&format!("grid-{i}"), &params, &hills(), &BuiltinData)
                .is_ok_and(|d| (min..=max).contains(&d.rooms.len()))
        })
        .count();
    assert!(
        within * 100 >= total * 99,
        "only {within} of {total} dungeons hit the room range"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn placed_dungeon_is_reproducible(seed in "[a-z]{1,12}") {
        let map = small_map();
        let a = place_dungeon(&seed, &map, None, None, &BuiltinData).unwrap();
        let b = place_dungeon(&seed, &map, None, None, &BuiltinData).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn every_room_is_reachable(seed in "[a-z0-9]{1,16}", theme in 0_usize..14) {
        let theme = DungeonTheme::LAND_WEIGHTS[theme].0;
        let params = DungeonParams::new(theme, DungeonSize::Small);
        let d = generate_dungeon(&seed, &params, &hills(), &BuiltinData).unwrap();
        let seen = reachable(&passage_graph(&d.rooms, &d.passages), 0);
        prop_assert!(seen.iter().all(|&s| s));
        prop_assert_eq!(&d.rooms[0].id, &d.entrance_room_id);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn world_is_reproducible(seed in "[a-z]{3,10}") {
        let params = GenerationParams {
            seed,
            map_radius: 4,
            settlements: 2,
            dungeons: 2,
            landmarks: 2,
            factions: 2,
            ..GenerationParams::default()
        };
        let a = generate_world(&params, &BuiltinData).unwrap();
        let b = generate_world(&params, &BuiltinData).unwrap();
        prop_assert_eq!(a, b);
    }
}
