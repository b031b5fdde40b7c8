//! Ключи к запертым проходам
//!
//! Замки открываются по мере продвижения от входа: ключ к очередному замку
//! кладётся в комнату, уже достижимую через открытые проходы. Поэтому
//! подземелье всегда проходимо целиком.

use super::connectivity::{passage_graph_where, reachable};
use super::{DungeonKey, DungeonTheme, Passage, Room, RoomType};
use crate::error::Result;
use crate::random::{SeededRandom, derive_seed};
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_KEYS: &[&str] = &["Iron Key", "Brass Key", "Silver Key", "Ornate Key"];

fn key_names(theme: DungeonTheme) -> &'static [&'static str] {
    match theme {
        DungeonTheme::Tomb => &["Burial Key", "Ossuary Key", "Crypt Seal", "Pharaoh's Key"],
        DungeonTheme::Temple | DungeonTheme::Shrine => {
            &["Sacred Key", "Altar Key", "Vestry Key", "Holy Symbol"]
        }
        DungeonTheme::Fortress | DungeonTheme::FloatingKeep => {
            &["Commander's Key", "Prison Key", "Gate Key"]
        }
        DungeonTheme::BanditHideout => &["Rusty Key", "Loot Room Key", "Captain's Key"],
        DungeonTheme::CultistLair => &["Ritual Key", "Blood Key", "Summoner's Key", "Dark Seal"],
        DungeonTheme::Sewer => &["Grate Key", "Maintenance Key", "Smuggler's Key"],
        DungeonTheme::Cave | DungeonTheme::Mine => &["Crude Key", "Crystal Key", "Miner's Key"],
        DungeonTheme::Crypt => &["Bone Key", "Coffin Key", "Mausoleum Key"],
        _ => DEFAULT_KEYS,
    }
}

/// Раскладывает по ключу на каждый запертый проход и записывает `key_id`
///
/// `rooms[0]` — вход. Ключи по возможности не кладутся во входную комнату.
pub fn place_keys(
    seed: &str,
    theme: DungeonTheme,
    rooms: &[Room],
    passages: &mut [Passage],
) -> Result<Vec<DungeonKey>> {
    let mut rng = SeededRandom::new(derive_seed(seed, "dungeon", "keys"));
    let index: HashMap<&str, usize> = rooms
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.as_str(), i))
        .collect();
    let mut keys = Vec::new();

    loop {
        let graph = passage_graph_where(rooms, passages, |_, p| !p.locked || p.key_id.is_some());
        let open = reachable(&graph, 0);
        let reached_by = |id: &str| index.get(id).is_some_and(|&i| open[i]);
        let Some(lock) = passages.iter().position(|p| {
            p.locked
                && p.key_id.is_none()
                && (reached_by(&p.from_room_id) || reached_by(&p.to_room_id))
        }) else {
            break;
        };

        let reached: Vec<&Room> = rooms
            .iter()
            .zip(&open)
            .filter(|&(_, &seen)| seen)
            .map(|(r, _)| r)
            .collect();
        let inner: Vec<&Room> = reached
            .iter()
            .copied()
            .filter(|r| r.room_type != RoomType::Entrance)
            .collect();
        let pool = if inner.is_empty() { &reached } else { &inner };
        let room = *rng.pick(pool)?;

        let key = DungeonKey {
            id: rng.id("key"),
            name: (*rng.pick(key_names(theme))?).to_string(),
            room_id: room.id.clone(),
            passage_id: passages[lock].id.clone(),
        };
        passages[lock].key_id = Some(key.id.clone());
        keys.push(key);
    }

    if !keys.is_empty() {
        debug!(count = keys.len(), "ключи разложены");
    }
    Ok(keys)
}

/// Можно ли пройти все комнаты, подбирая ключи по дороге
#[must_use]
pub fn fully_unlockable(rooms: &[Room], passages: &[Passage], keys: &[DungeonKey]) -> bool {
    let mut held: Vec<&str> = Vec::new();
    loop {
        let graph = passage_graph_where(rooms, passages, |_, p| {
            !p.locked || p.key_id.as_deref().is_some_and(|k| held.contains(&k))
        });
        let open = reachable(&graph, 0);
        let before = held.len();
        for key in keys {
            let in_reach = rooms
                .iter()
                .position(|r| r.id == key.room_id)
                .is_some_and(|i| open[i]);
            if in_reach && !held.contains(&key.id.as_str()) {
                held.push(&key.id);
            }
        }
        if open.iter().all(|&s| s) {
            return true;
        }
        if held.len() == before {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::layout::{connect, make_room};
    use crate::dungeon::{GridRect, RoomSize};

    fn chain(n: usize) -> (Vec<Room>, Vec<Passage>) {
        let mut rng = SeededRandom::new("chain");
        let rooms: Vec<Room> = (0..n)
            .map(|i| {
                let bounds = GridRect::new(2 + 8 * i as i32, 2, 4, 4);
                let kind = if i == 0 { RoomType::Entrance } else { RoomType::Chamber };
                make_room(&mut rng, bounds, kind, RoomSize::Medium).unwrap()
            })
            .collect();
        let passages = rooms
            .windows(2)
            .map(|pair| {
                let mut p = connect(&mut rng, DungeonTheme::Fortress, &pair[0], &pair[1]).unwrap();
                p.locked = false;
                p
            })
            .collect();
        (rooms, passages)
    }

    #[test]
    fn every_lock_gets_a_key_in_reach() {
        let (rooms, mut passages) = chain(5);
        passages[1].locked = true;
        passages[3].locked = true;
        let keys = place_keys("locks", DungeonTheme::Tomb, &rooms, &mut passages).unwrap();

        assert_eq!(keys.len(), 2);
        // До первого замка открыты только вход и первая комната
        assert_eq!(keys[0].passage_id, passages[1].id);
        assert_eq!(keys[0].room_id, rooms[1].id);
        for p in &passages {
            assert_eq!(p.locked, p.key_id.is_some());
        }
        assert!(fully_unlockable(&rooms, &passages, &keys));
    }

    #[test]
    fn lock_at_the_entrance_keeps_key_in_entrance() {
        let (rooms, mut passages) = chain(3);
        passages[0].locked = true;
        let keys = place_keys("front", DungeonTheme::Cave, &rooms, &mut passages).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].room_id, rooms[0].id);
    }

    #[test]
    fn key_behind_its_own_lock_is_unsolvable() {
        let (rooms, mut passages) = chain(3);
        passages[0].locked = true;
        passages[0].key_id = Some("key-x".into());
        let keys = vec![DungeonKey {
            id: "key-x".into(),
            name: "Iron Key".into(),
            room_id: rooms[2].id.clone(),
            passage_id: passages[0].id.clone(),
        }];
        assert!(!fully_unlockable(&rooms, &passages, &keys));
    }
}
