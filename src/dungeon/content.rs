//! Наполнение комнат: встречи, сокровища, ловушки
//!
//! Каждая комната получает собственный поток `{seed}:room:{room_id}`, поэтому
//! содержимое комнаты не зависит от остальных.

use super::{Behavior, DungeonTheme, Encounter, Hazard, Room, RoomType, Treasure, TreasureKind};
use crate::data::DataSource;
use crate::error::Result;
use crate::hex::Terrain;
use crate::random::{SeededRandom, derive_seed};

const BEHAVIOR_WEIGHTS: [(Behavior, u32); 4] = [
    (Behavior::Hostile, 50),
    (Behavior::Neutral, 20),
    (Behavior::Negotiable, 20),
    (Behavior::Fleeing, 10),
];

const TREASURE_WEIGHTS: [(TreasureKind, u32); 5] = [
    (TreasureKind::Coins, 40),
    (TreasureKind::Gems, 20),
    (TreasureKind::Art, 15),
    (TreasureKind::Item, 20),
    (TreasureKind::MagicItem, 5),
];

const COINS: &[&str] = &["2d6 cp", "3d6 sp", "2d6 gp", "1d6 x 10 gp", "2d6 x 10 gp"];
const GEMS: &[&str] = &[
    "A small amethyst",
    "A polished agate",
    "A piece of jade",
    "A bloodstone",
    "An onyx",
];
const ART: &[&str] = &[
    "A silver goblet",
    "A silk tapestry",
    "An ivory statuette",
    "A jeweled dagger",
    "A golden candlestick",
];
const ITEMS: &[&str] = &[
    "A well-crafted longsword",
    "A suit of chainmail",
    "A hooded lantern",
    "A set of thieves' tools",
    "A healer's kit",
];
const MAGIC_ITEMS: &[&str] = &[
    "A potion of healing",
    "A scroll of protection",
    "A wand of magic missiles",
    "A cloak of elvenkind",
];

/// (название, урон, спасбросок)
const HAZARDS: &[(&str, &str, &str)] = &[
    ("Pit Trap", "2d6 fall", "DC 12 DEX"),
    ("Dart Trap", "1d4 + poison", "DC 13 DEX"),
    ("Blade Trap", "2d8 slashing", "DC 14 DEX"),
    ("Poison Gas", "2d6 poison", "DC 12 CON"),
    ("Collapsing Ceiling", "3d6 bludgeoning", "DC 14 DEX"),
    ("Glyph of Warding", "3d8 fire", "DC 15 DEX"),
];

fn encounter_chance(room_type: RoomType) -> f64 {
    match room_type {
        RoomType::Entrance | RoomType::Exit => 0.2,
        RoomType::Corridor => 0.3,
        RoomType::Chamber => 0.4,
        RoomType::Lair => 0.9,
        RoomType::TrapRoom => 0.1,
        RoomType::Treasury | RoomType::Shrine => 0.3,
        RoomType::Prison => 0.5,
    }
}

fn treasure_chance(room_type: RoomType) -> f64 {
    match room_type {
        RoomType::Entrance | RoomType::Exit | RoomType::Corridor => 0.1,
        RoomType::Chamber => 0.3,
        RoomType::Lair => 0.7,
        RoomType::TrapRoom => 0.5,
        RoomType::Treasury => 0.95,
        RoomType::Shrine => 0.4,
        RoomType::Prison => 0.2,
    }
}

fn hazard_chance(room_type: RoomType) -> f64 {
    match room_type {
        RoomType::TrapRoom => 1.0,
        RoomType::Corridor => 0.15,
        RoomType::Treasury => 0.25,
        _ => 0.05,
    }
}

pub(crate) fn random_hazard(rng: &mut SeededRandom) -> Result<Hazard> {
    let &(name, damage, save) = rng.pick(HAZARDS)?;
    Ok(Hazard {
        name: name.to_string(),
        damage: damage.to_string(),
        save: save.to_string(),
        disarmed: false,
    })
}

fn encounter(
    rng: &mut SeededRandom,
    room: &Room,
    theme: DungeonTheme,
    terrain: Terrain,
    data: &dyn DataSource,
) -> Result<Encounter> {
    let behavior = *rng.pick_weighted(&BEHAVIOR_WEIGHTS)?;
    let (lo, hi) = room.size.encounter_count();

    // Дикие логова иногда населены местной фауной
    let local = data.terrain_creatures(terrain);
    if theme.is_wilderness() && !local.is_empty() && rng.chance(0.4) {
        let weighted: Vec<_> = local.iter().map(|c| (c, c.weight)).collect();
        let entry = *rng.pick_weighted(&weighted)?;
        let count = rng.between(i32::from(entry.count.0), i32::from(entry.count.1));
        return Ok(Encounter {
            creature: entry.name.to_string(),
            count: count as u32,
            behavior,
        });
    }

    let creature = *rng.pick(data.theme_creatures(theme))?;
    Ok(Encounter {
        creature: creature.to_string(),
        count: rng.between(lo, hi) as u32,
        behavior,
    })
}

fn treasure(rng: &mut SeededRandom) -> Result<Treasure> {
    let kind = *rng.pick_weighted(&TREASURE_WEIGHTS)?;
    let pool = match kind {
        TreasureKind::Coins => COINS,
        TreasureKind::Gems => GEMS,
        TreasureKind::Art => ART,
        TreasureKind::Item => ITEMS,
        TreasureKind::MagicItem => MAGIC_ITEMS,
    };
    Ok(Treasure {
        kind,
        description: (*rng.pick(pool)?).to_string(),
    })
}

/// Заполняет комнату из потока, выведенного из её id
pub fn populate_room(
    seed: &str,
    room: &mut Room,
    theme: DungeonTheme,
    terrain: Terrain,
    data: &dyn DataSource,
) -> Result<()> {
    let mut rng = SeededRandom::new(derive_seed(seed, "room", &room.id));

    room.encounters.clear();
    if rng.chance(encounter_chance(room.room_type)) {
        let e = encounter(&mut rng, room, theme, terrain, data)?;
        room.encounters.push(e);
    }

    room.treasure.clear();
    if rng.chance(treasure_chance(room.room_type)) {
        let count = if room.room_type == RoomType::Treasury {
            rng.between(3, 6)
        } else {
            rng.between(1, 3)
        };
        for _ in 0..count {
            room.treasure.push(treasure(&mut rng)?);
        }
    }

    room.hazards.clear();
    if rng.chance(hazard_chance(room.room_type)) {
        let count = if room.room_type == RoomType::TrapRoom {
            rng.between(1, 2)
        } else {
            1
        };
        for _ in 0..count {
            room.hazards.push(random_hazard(&mut rng)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BuiltinData;
    use crate::dungeon::layout::make_room;
    use crate::dungeon::{GridRect, RoomSize};

    fn room(kind: RoomType) -> Room {
        let mut rng = SeededRandom::new("content");
        make_room(&mut rng, GridRect::new(2, 2, 5, 5), kind, RoomSize::Medium).unwrap()
    }

    #[test]
    fn trap_rooms_always_have_hazards() {
        let mut r = room(RoomType::TrapRoom);
        populate_room("seed", &mut r, DungeonTheme::Tomb, Terrain::Hills, &BuiltinData).unwrap();
        assert!(!r.hazards.is_empty());
    }

    #[test]
    fn content_depends_only_on_room_id() {
        let mut a = room(RoomType::Lair);
        let mut b = a.clone();
        populate_room("seed", &mut a, DungeonTheme::Cave, Terrain::Hills, &BuiltinData).unwrap();
        populate_room("seed", &mut b, DungeonTheme::Cave, Terrain::Hills, &BuiltinData).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn encounter_counts_follow_room_size() {
        let (lo, hi) = RoomSize::Medium.encounter_count();
        for i in 0..30 {
            let mut r = room(RoomType::Lair);
            r.id = format!("room-{i}");
            populate_room("counts", &mut r, DungeonTheme::Crypt, Terrain::Plains, &BuiltinData)
                .unwrap();
            for e in &r.encounters {
                assert!((lo as u32..=hi as u32).contains(&e.count));
            }
        }
    }
}
