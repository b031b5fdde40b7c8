//! Граф проходов: связность, глубина комнат, тупики

use super::layout::connect;
use super::{DungeonTheme, Passage, Room};
use crate::error::Result;
use crate::random::SeededRandom;
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use std::collections::HashMap;
use tracing::warn;

/// Неориентированный граф: узел `i` соответствует `rooms[i]`
#[must_use]
pub fn passage_graph(rooms: &[Room], passages: &[Passage]) -> UnGraph<usize, ()> {
    passage_graph_where(rooms, passages, |_, _| true)
}

/// Граф только из проходов, для которых `keep(индекс, проход)` истинно
pub fn passage_graph_where(
    rooms: &[Room],
    passages: &[Passage],
    keep: impl Fn(usize, &Passage) -> bool,
) -> UnGraph<usize, ()> {
    let mut graph = UnGraph::<usize, ()>::with_capacity(rooms.len(), passages.len());
    for i in 0..rooms.len() {
        graph.add_node(i);
    }
    let index: HashMap<&str, usize> = rooms
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.as_str(), i))
        .collect();
    for (i, p) in passages.iter().enumerate() {
        if !keep(i, p) {
            continue;
        }
        if let (Some(&a), Some(&b)) = (
            index.get(p.from_room_id.as_str()),
            index.get(p.to_room_id.as_str()),
        ) {
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }
    }
    graph
}

/// Достижимость комнат из `start` обходом в ширину
#[must_use]
pub fn reachable(graph: &UnGraph<usize, ()>, start: usize) -> Vec<bool> {
    let mut seen = vec![false; graph.node_count()];
    if start >= seen.len() {
        return seen;
    }
    let mut bfs = Bfs::new(graph, NodeIndex::new(start));
    while let Some(node) = bfs.next(graph) {
        seen[node.index()] = true;
    }
    seen
}

fn center_distance(a: &Room, b: &Room) -> i32 {
    let (ax, ay) = a.bounds.center2();
    let (bx, by) = b.bounds.center2();
    (ax - bx).abs() + (ay - by).abs()
}

/// Подключает недостижимые от входа (индекс 0) комнаты к ближайшей достижимой
///
/// Возвращает число добавленных проходов.
pub fn ensure_connected(
    rng: &mut SeededRandom,
    theme: DungeonTheme,
    rooms: &[Room],
    passages: &mut Vec<Passage>,
) -> Result<usize> {
    let mut repaired = 0;
    loop {
        let seen = reachable(&passage_graph(rooms, passages), 0);
        let Some(orphan) = seen.iter().position(|&s| !s) else {
            break;
        };
        let nearest = (0..rooms.len())
            .filter(|&i| seen[i])
            .min_by_key(|&i| (center_distance(&rooms[i], &rooms[orphan]), i));
        let Some(anchor) = nearest else {
            break;
        };
        warn!(room = %rooms[orphan].id, "комната недостижима, добавлен проход");
        passages.push(connect(rng, theme, &rooms[anchor], &rooms[orphan])?);
        repaired += 1;
    }
    Ok(repaired)
}

/// Глубина комнаты — число переходов от входа
pub fn assign_depths(rooms: &mut [Room], passages: &[Passage]) {
    if rooms.is_empty() {
        return;
    }
    let graph = passage_graph(rooms, passages);
    let hops = dijkstra(&graph, NodeIndex::new(0), None, |_| 1u32);
    for (i, room) in rooms.iter_mut().enumerate() {
        room.depth = hops.get(&NodeIndex::new(i)).copied().unwrap_or(0);
    }
}

/// Тупик — комната ровно с одним проходом
pub fn mark_dead_ends(rooms: &mut [Room], passages: &[Passage]) {
    let mut count: HashMap<&str, usize> = HashMap::new();
    for p in passages {
        *count.entry(p.from_room_id.as_str()).or_default() += 1;
        *count.entry(p.to_room_id.as_str()).or_default() += 1;
    }
    for room in rooms.iter_mut() {
        room.dead_end = count.get(room.id.as_str()).copied() == Some(1);
    }
}

/// Самая удалённая от входа комната (первая при равенстве)
#[must_use]
pub fn farthest_room(rooms: &[Room]) -> Option<usize> {
    rooms
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|(ia, a), (ib, b)| a.depth.cmp(&b.depth).then(ib.cmp(ia)))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::layout::make_room;
    use crate::dungeon::{GridRect, RoomSize, RoomType};

    fn rooms(n: usize) -> Vec<Room> {
        let mut rng = SeededRandom::new("rooms");
        (0..n)
            .map(|i| {
                let bounds = GridRect::new(2 + 8 * i as i32, 2, 4, 4);
                let kind = if i == 0 { RoomType::Entrance } else { RoomType::Chamber };
                make_room(&mut rng, bounds, kind, RoomSize::Medium).unwrap()
            })
            .collect()
    }

    #[test]
    fn orphans_are_reconnected() {
        let mut rng = SeededRandom::new("repair");
        let mut rooms = rooms(4);
        let mut passages = vec![connect(&mut rng, DungeonTheme::Tomb, &rooms[0], &rooms[1]).unwrap()];
        let repaired =
            ensure_connected(&mut rng, DungeonTheme::Tomb, &rooms, &mut passages).unwrap();
        assert_eq!(repaired, 2);
        let seen = reachable(&passage_graph(&rooms, &passages), 0);
        assert!(seen.iter().all(|&s| s));

        assign_depths(&mut rooms, &passages);
        assert_eq!(rooms[0].depth, 0);
        assert_eq!(rooms[1].depth, 1);
        // Комната 2 подключена к ближайшей (1), комната 3 — к 2
        assert_eq!(rooms[3].depth, 3);
        assert_eq!(farthest_room(&rooms), Some(3));

        mark_dead_ends(&mut rooms, &passages);
        assert!(rooms[0].dead_end);
        assert!(!rooms[1].dead_end);
        assert!(rooms[3].dead_end);
    }
}
