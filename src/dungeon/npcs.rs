//! Обитатели подземелья: соперники, пленники, отшельники и призраки
//!
//! Персонажи хранятся в таблице NPC мира: `location_id` указывает на
//! подземелье, `room_id` на комнату, где их можно встретить.

use super::{DungeonTheme, Room, RoomType, SpatialDungeon};
use crate::error::Result;
use crate::npc::{Archetype, Disposition, Npc, NpcRole, NpcSpec, NpcStatus, generate_npc};
use crate::random::{SeededRandom, derive_seed};
use tracing::debug;

const RIVAL_PARTY_CHANCE: f64 = 0.2;
const PRISONER_CHANCE: f64 = 0.6;
const HERMIT_CHANCE: f64 = 0.1;
const GHOST_CHANCE: f64 = 0.15;

const GHOST_THEMES: &[DungeonTheme] = &[
    DungeonTheme::Tomb,
    DungeonTheme::Crypt,
    DungeonTheme::Temple,
    DungeonTheme::Fortress,
    DungeonTheme::Shrine,
    DungeonTheme::CultistLair,
];

const HERMIT_THEMES: &[DungeonTheme] = &[
    DungeonTheme::Cave,
    DungeonTheme::Mine,
    DungeonTheme::Sewer,
    DungeonTheme::WitchHut,
    DungeonTheme::SeaCave,
];

const ADVENTURER_CLASSES: &[(&str, Archetype)] = &[
    ("fighter", Archetype::Knight),
    ("rogue", Archetype::Thief),
    ("wizard", Archetype::Scholar),
    ("cleric", Archetype::Priest),
    ("ranger", Archetype::Guard),
];

const PRISONER_REASONS: &[&str] = &[
    "captured while exploring",
    "held for ransom",
    "taken as a sacrifice",
    "imprisoned for trespassing",
    "kept as a hostage",
];

/// Вид отшельника, его архетип и что он знает
const HERMITS: &[(&str, Archetype, &str)] = &[
    ("mad scholar", Archetype::Scholar, "ancient lore about the dungeon"),
    ("escaped prisoner", Archetype::Commoner, "the layout and dangers within"),
    ("monster whisperer", Archetype::Witch, "the creatures' weaknesses"),
    ("treasure hunter", Archetype::Thief, "where valuables are hidden"),
    ("cult defector", Archetype::Cultist, "the inhabitants' plans"),
];

const GHOST_MOTIVATIONS: &[&str] = &[
    "seeks revenge on its killer",
    "guards its former treasure",
    "warns explorers of danger",
    "relives its final moments",
    "searches for a lost love",
];

/// Комната главаря: самая глубокая после входа, при равенстве логово или тупик
#[must_use]
pub fn boss_room(dungeon: &SpatialDungeon) -> Option<&Room> {
    dungeon
        .rooms
        .iter()
        .filter(|r| r.room_type != RoomType::Entrance)
        .max_by_key(|r| (r.depth, r.room_type == RoomType::Lair, r.dead_end))
}

/// Тупики и глубокие комнаты, подальше от входа
fn secluded_rooms(dungeon: &SpatialDungeon) -> Vec<&Room> {
    dungeon
        .rooms
        .iter()
        .filter(|r| r.room_type != RoomType::Entrance && (r.dead_end || r.depth >= 2))
        .collect()
}

fn roll_disposition(rng: &mut SeededRandom, hostile: f64, neutral: f64) -> Disposition {
    let roll = rng.next();
    if roll < hostile {
        Disposition::Hostile
    } else if roll < hostile + neutral {
        Disposition::Neutral
    } else {
        Disposition::Friendly
    }
}

fn spawn(
    rng: &SeededRandom,
    dungeon: &SpatialDungeon,
    tag: &str,
    archetype: Archetype,
    role: NpcRole,
    room: &Room,
) -> Result<Npc> {
    let mut npc_rng = rng.derive("npc", tag);
    let mut npc = generate_npc(&mut npc_rng, NpcSpec::new(archetype, Some(role), &dungeon.id))?;
    npc.room_id = Some(room.id.clone());
    Ok(npc)
}

/// Генерирует обитателей подземелья
///
/// Каждая категория бросается независимо: пленник только при наличии
/// темницы, отшельник и призрак только в подходящих темах.
pub fn generate_dungeon_npcs(seed: &str, dungeon: &SpatialDungeon) -> Result<Vec<Npc>> {
    let mut rng = SeededRandom::new(derive_seed(seed, "dungeon", "npcs"));
    let mut npcs = Vec::new();

    let cells: Vec<&Room> = dungeon
        .rooms
        .iter()
        .filter(|r| r.room_type == RoomType::Prison)
        .collect();
    if !cells.is_empty() && rng.chance(PRISONER_CHANCE) {
        let room = *rng.pick(&cells)?;
        let reason = rng.pick(PRISONER_REASONS)?;
        let mut npc = spawn(&rng, dungeon, "prisoner", Archetype::Commoner, NpcRole::Prisoner, room)?;
        npc.status = NpcStatus::Captured;
        npc.disposition = Some(Disposition::Friendly);
        npc.knows = Some(format!("Knows the dungeon from being {reason}."));
        npcs.push(npc);
    }

    let near: Vec<&Room> = dungeon.rooms.iter().filter(|r| r.depth <= 2).collect();
    if !near.is_empty() && rng.chance(RIVAL_PARTY_CHANCE) {
        let room = *rng.pick(&near)?;
        let &(class, archetype) = rng.pick(ADVENTURER_CLASSES)?;
        let party = rng.between(2, 4);
        let mut npc = spawn(&rng, dungeon, "rival", archetype, NpcRole::Adventurer, room)?;
        npc.disposition = Some(roll_disposition(&mut rng, 0.3, 0.4));
        npc.knows = Some(format!(
            "{}, a {class}, leads a party of {party} after treasure and glory.",
            npc.name
        ));
        npcs.push(npc);
    }

    let secluded = secluded_rooms(dungeon);
    if HERMIT_THEMES.contains(&dungeon.theme) && !secluded.is_empty() && rng.chance(HERMIT_CHANCE) {
        let room = *rng.pick(&secluded)?;
        let &(kind, archetype, info) = rng.pick(HERMITS)?;
        let mut npc = spawn(&rng, dungeon, "hermit", archetype, NpcRole::Hermit, room)?;
        npc.disposition = Some(if rng.chance(0.7) {
            Disposition::Friendly
        } else {
            Disposition::Neutral
        });
        npc.knows = Some(format!("A {kind} who knows {info}."));
        npcs.push(npc);
    }

    if GHOST_THEMES.contains(&dungeon.theme) && rng.chance(GHOST_CHANCE) {
        let haunts: Vec<&Room> = dungeon
            .rooms
            .iter()
            .filter(|r| matches!(r.room_type, RoomType::Shrine | RoomType::Lair) || r.dead_end)
            .filter(|r| r.room_type != RoomType::Entrance)
            .collect();
        let pool = if haunts.is_empty() { &secluded } else { &haunts };
        if !pool.is_empty() {
            let room = *rng.pick(pool)?;
            let motivation = rng.pick(GHOST_MOTIVATIONS)?;
            let mut npc = spawn(&rng, dungeon, "ghost", Archetype::Commoner, NpcRole::Ghost, room)?;
            npc.status = NpcStatus::Dead;
            npc.disposition = Some(roll_disposition(&mut rng, 0.4, 0.3));
            npc.knows = Some(format!("A restless spirit that {motivation}."));
            npcs.push(npc);
        }
    }

    debug!(dungeon = %dungeon.id, count = npcs.len(), "обитатели подземелья");
    Ok(npcs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BuiltinData;
    use crate::dungeon::{DungeonParams, DungeonSize, generate_dungeon};
    use crate::hex::{Hex, HexCoord, Terrain};

    fn dungeon(seed: &str, theme: DungeonTheme) -> SpatialDungeon {
        let hex = Hex::new(HexCoord::new(0, 0), Terrain::Hills);
        let params = DungeonParams::new(theme, DungeonSize::Medium);
        generate_dungeon(seed, &params, &hex, &BuiltinData).unwrap()
    }

    #[test]
    fn residents_live_in_their_rooms() {
        for i in 0..40 {
            let seed = format!("dwellers-{i}");
            let d = dungeon(&seed, DungeonTheme::Fortress);
            for npc in generate_dungeon_npcs(&seed, &d).unwrap() {
                assert_eq!(npc.location_id, d.id);
                let room_id = npc.room_id.as_deref().unwrap();
                assert!(d.room(room_id).is_some());
                assert!(npc.disposition.is_some());
                if npc.role == Some(NpcRole::Prisoner) {
                    assert_eq!(npc.status, NpcStatus::Captured);
                    assert_eq!(d.room(room_id).unwrap().room_type, RoomType::Prison);
                }
            }
        }
    }

    #[test]
    fn ghosts_haunt_only_fitting_themes() {
        let mut ghosts = 0;
        for i in 0..80 {
            let seed = format!("ghost-{i}");
            let tomb = dungeon(&seed, DungeonTheme::Tomb);
            let npcs = generate_dungeon_npcs(&seed, &tomb).unwrap();
            ghosts += npcs.iter().filter(|n| n.role == Some(NpcRole::Ghost)).count();
            assert!(npcs.iter().all(|n| n.role != Some(NpcRole::Hermit)));

            let cave = dungeon(&seed, DungeonTheme::Cave);
            let npcs = generate_dungeon_npcs(&seed, &cave).unwrap();
            assert!(npcs.iter().all(|n| n.role != Some(NpcRole::Ghost)));
        }
        assert!(ghosts > 0);
    }

    #[test]
    fn same_seed_same_residents() {
        let d = dungeon("twin", DungeonTheme::Crypt);
        let a = generate_dungeon_npcs("twin", &d).unwrap();
        let b = generate_dungeon_npcs("twin", &d).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn boss_room_is_deepest() {
        let d = dungeon("boss", DungeonTheme::CultistLair);
        let boss = boss_room(&d).unwrap();
        let deepest = d.rooms.iter().map(|r| r.depth).max().unwrap();
        assert_eq!(boss.depth, deepest);
        assert_ne!(boss.room_type, RoomType::Entrance);
    }
}
