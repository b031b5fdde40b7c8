//! Дорожный граф поселения

use super::{Building, Point, RoadEdge, RoadNode, Ward};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use std::collections::BTreeMap;

/// Соединяет центр с кварталами, соседние кварталы кольцом,
/// а каждое здание с ближайшим уже подключённым узлом своей области
#[must_use]
pub fn build_roads(wards: &[Ward], buildings: &[Building]) -> Vec<RoadEdge> {
    let mut edges = Vec::new();

    for ward in wards {
        edges.push(RoadEdge {
            from: RoadNode::Center,
            to: RoadNode::Ward(ward.id.clone()),
        });
    }
    // Первый квартал центральный, кольцо образуют остальные
    let ring = wards.get(1..).unwrap_or_default();
    let ring_edges = match ring.len() {
        0 | 1 => 0,
        2 => 1,
        n => n,
    };
    for (i, ward) in ring.iter().take(ring_edges).enumerate() {
        edges.push(RoadEdge {
            from: RoadNode::Ward(ward.id.clone()),
            to: RoadNode::Ward(ring[(i + 1) % ring.len()].id.clone()),
        });
    }

    // Подключённые узлы по областям: ключ — id квартала (None — без квартала)
    let mut connected: BTreeMap<Option<&str>, Vec<(RoadNode, Point)>> = BTreeMap::new();
    for ward in wards {
        connected
            .entry(Some(ward.id.as_str()))
            .or_default()
            .push((RoadNode::Ward(ward.id.clone()), ward.center));
    }

    for building in buildings {
        let region = building.ward_id.as_deref();
        let nodes = connected.entry(region).or_insert_with(|| {
            vec![(RoadNode::Center, Point::default())]
        });
        let nearest = nodes
            .iter()
            .min_by(|a, b| {
                a.1.distance(building.position)
                    .total_cmp(&b.1.distance(building.position))
            })
            .map_or(RoadNode::Center, |(node, _)| node.clone());
        let node = RoadNode::Building(building.id.clone());
        edges.push(RoadEdge {
            from: nearest,
            to: node.clone(),
        });
        nodes.push((node, building.position));
    }
    edges
}

/// Проверяет, что все кварталы и здания достижимы из центра
#[must_use]
pub fn roads_connected(wards: &[Ward], buildings: &[Building], edges: &[RoadEdge]) -> bool {
    let mut graph = UnGraph::<(), ()>::new_undirected();
    let mut index: BTreeMap<RoadNode, NodeIndex> = BTreeMap::new();

    let nodes = std::iter::once(RoadNode::Center)
        .chain(wards.iter().map(|w| RoadNode::Ward(w.id.clone())))
        .chain(buildings.iter().map(|b| RoadNode::Building(b.id.clone())));
    for node in nodes {
        index.entry(node).or_insert_with(|| graph.add_node(()));
    }
    for edge in edges {
        let (Some(&a), Some(&b)) = (index.get(&edge.from), index.get(&edge.to)) else {
            return false;
        };
        graph.add_edge(a, b, ());
    }

    let Some(&start) = index.get(&RoadNode::Center) else {
        return false;
    };
    let mut seen = 0;
    let mut bfs = Bfs::new(&graph, start);
    while bfs.next(&graph).is_some() {
        seen += 1;
    }
    seen == graph.node_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use crate::settlement::SettlementSize;
    use crate::settlement::layout::build_layout;

    #[test]
    fn roads_connect_every_building() {
        for size in SettlementSize::ALL {
            let mut rng = SeededRandom::new(format!("roads-{size}"));
            let layout = build_layout(&mut rng, size, &[]).unwrap();
            let edges = build_roads(&layout.wards, &layout.buildings);
            assert!(roads_connected(&layout.wards, &layout.buildings, &edges), "{size}");
        }
    }

    #[test]
    fn dangling_edge_breaks_connectivity() {
        let edges = vec![RoadEdge {
            from: RoadNode::Center,
            to: RoadNode::Building("ghost".into()),
        }];
        assert!(!roads_connected(&[], &[], &edges));
    }
}
