//! Проверка ссылочной целостности мира
//!
//! Каждая ссылка по id должна разрешаться, а двусторонние связи
//! (гекс ↔ локация, заведение ↔ здание) должны быть зеркальны.

use super::{Location, WorldData};
use crate::dungeon::connectivity::{passage_graph, reachable};
use crate::dungeon::{RoomType, SpatialDungeon};
use crate::error::{GenError, Result};
use crate::faction::ClockOwner;
use crate::settlement::SpatialSettlement;

/// Проверяет все инварианты мира
///
/// # Ошибки
/// `ReferenceIntegrity` с описанием первого найденного нарушения.
pub fn check_integrity(world: &WorldData) -> Result<()> {
    check_hexes(world)?;
    for location in &world.locations {
        check_location(world, location)?;
    }
    check_npcs(world)?;
    check_factions(world)?;
    check_hooks(world)?;
    check_clocks(world)
}

fn ensure(condition: bool, msg: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(GenError::integrity(msg()))
    }
}

fn ensure_location(world: &WorldData, id: &str, context: &str) -> Result<()> {
    ensure(world.locations.contains(id), || {
        format!("{context}: unknown location {id}")
    })
}

fn ensure_npc(world: &WorldData, id: &str, context: &str) -> Result<()> {
    ensure(world.npcs.contains(id), || format!("{context}: unknown npc {id}"))
}

fn ensure_faction(world: &WorldData, id: &str, context: &str) -> Result<()> {
    ensure(world.factions.contains(id), || {
        format!("{context}: unknown faction {id}")
    })
}

fn ensure_hook(world: &WorldData, id: &str, context: &str) -> Result<()> {
    ensure(world.hooks.contains(id), || format!("{context}: unknown hook {id}"))
}

fn check_hexes(world: &WorldData) -> Result<()> {
    for hex in &world.hexes {
        let Some(id) = &hex.location_id else {
            continue;
        };
        let location = world
            .locations
            .get(id.as_str())
            .ok_or_else(|| GenError::integrity(format!("hex {}: unknown location {id}", hex.coord)))?;
        ensure(location.hex_coord() == hex.coord, || {
            format!(
                "hex {} points at {id}, which stands on {}",
                hex.coord,
                location.hex_coord()
            )
        })?;
    }
    Ok(())
}

fn check_location(world: &WorldData, location: &Location) -> Result<()> {
    let id = location.id();
    let coord = location.hex_coord();
    let hex = world
        .hexes
        .get(&coord)
        .ok_or_else(|| GenError::integrity(format!("{id}: no hex at {coord}")))?;
    ensure(hex.location_id.as_deref() == Some(id), || {
        format!("{id}: hex {coord} does not point back")
    })?;
    if let Some(faction_id) = location.faction_id() {
        ensure_faction(world, faction_id, id)?;
    }
    match location {
        Location::Settlement(s) => check_settlement(world, s),
        Location::Dungeon(d) => check_dungeon(d),
        Location::Landmark(_) => Ok(()),
    }
}

/// Житель поселения: существует и привязан именно к нему
fn ensure_resident(world: &WorldData, s: &SpatialSettlement, npc_id: &str) -> Result<()> {
    let npc = world
        .npcs
        .get(npc_id)
        .ok_or_else(|| GenError::integrity(format!("{}: unknown npc {npc_id}", s.id)))?;
    ensure(npc.location_id == s.id, || {
        format!("{}: npc {npc_id} lives at {}", s.id, npc.location_id)
    })
}

fn check_settlement(world: &WorldData, s: &SpatialSettlement) -> Result<()> {
    for npc_id in s.npc_ids.iter().chain(s.mayor_npc_id.iter()) {
        ensure_resident(world, s, npc_id)?;
    }
    for building in &s.buildings {
        if let Some(owner) = &building.owner_id {
            ensure_resident(world, s, owner)?;
        }
        if let Some(ward_id) = &building.ward_id {
            ensure(s.wards.iter().any(|w| &w.id == ward_id), || {
                format!("{}: building {} in unknown ward {ward_id}", s.id, building.id)
            })?;
        }
        for site_id in &building.site_ids {
            let site = s.site(site_id).ok_or_else(|| {
                GenError::integrity(format!("{}: building {} hosts unknown site {site_id}", s.id, building.id))
            })?;
            ensure(site.building_id.as_deref() == Some(building.id.as_str()), || {
                format!("{}: site {site_id} does not point back at {}", s.id, building.id)
            })?;
        }
    }
    for site in &s.sites {
        for npc_id in site.owner_id.iter().chain(&site.staff_ids) {
            ensure_resident(world, s, npc_id)?;
        }
        if let Some(building_id) = &site.building_id {
            let building = s.building(building_id).ok_or_else(|| {
                GenError::integrity(format!("{}: site {} in unknown building {building_id}", s.id, site.id))
            })?;
            ensure(building.site_ids.contains(&site.id), || {
                format!("{}: building {building_id} does not list site {}", s.id, site.id)
            })?;
        }
    }
    for rumor in &s.rumors {
        if let Some(hook_id) = &rumor.linked_hook_id {
            ensure_hook(world, hook_id, &s.id)?;
        }
        if let Some(target) = &rumor.target_location_id {
            ensure_location(world, target, &s.id)?;
        }
    }
    for notice in &s.notices {
        if let Some(poster) = &notice.poster_id {
            ensure_npc(world, poster, &s.id)?;
        }
        if let Some(hook_id) = &notice.linked_hook_id {
            ensure_hook(world, hook_id, &s.id)?;
        }
    }
    Ok(())
}

fn check_dungeon(d: &SpatialDungeon) -> Result<()> {
    let entrance = d.room(&d.entrance_room_id).ok_or_else(|| {
        GenError::integrity(format!("{}: unknown entrance {}", d.id, d.entrance_room_id))
    })?;
    ensure(entrance.room_type == RoomType::Entrance, || {
        format!("{}: entrance room {} is {:?}", d.id, entrance.id, entrance.room_type)
    })?;

    for passage in &d.passages {
        let from = d.room(&passage.from_room_id);
        let to = d.room(&passage.to_room_id);
        let (Some(from), Some(to)) = (from, to) else {
            return Err(GenError::integrity(format!(
                "{}: passage {} joins unknown rooms",
                d.id, passage.id
            )));
        };
        ensure(from.id != to.id, || {
            format!("{}: passage {} loops on {}", d.id, passage.id, from.id)
        })?;
        let (Some(first), Some(last)) = (passage.waypoints.first(), passage.waypoints.last())
        else {
            return Err(GenError::integrity(format!(
                "{}: passage {} has no waypoints",
                d.id, passage.id
            )));
        };
        ensure(from.bounds.touches(*first) && to.bounds.touches(*last), || {
            format!("{}: passage {} does not reach its rooms", d.id, passage.id)
        })?;
        match &passage.key_id {
            Some(key_id) => {
                let key = d.key(key_id).ok_or_else(|| {
                    GenError::integrity(format!("{}: passage {} needs unknown key {key_id}", d.id, passage.id))
                })?;
                ensure(key.passage_id == passage.id, || {
                    format!("{}: key {key_id} opens {}, not {}", d.id, key.passage_id, passage.id)
                })?;
            }
            None => ensure(!passage.locked, || {
                format!("{}: locked passage {} has no key", d.id, passage.id)
            })?,
        }
    }
    for key in &d.keys {
        ensure(d.room(&key.room_id).is_some(), || {
            format!("{}: key {} lies in unknown room {}", d.id, key.id, key.room_id)
        })?;
    }

    let graph = passage_graph(&d.rooms, &d.passages);
    let start = d
        .rooms
        .iter()
        .position(|r| r.id == d.entrance_room_id)
        .unwrap_or_default();
    let visited = reachable(&graph, start);
    ensure(visited.iter().all(|&v| v), || {
        format!("{}: rooms unreachable from the entrance", d.id)
    })
}

fn check_npcs(world: &WorldData) -> Result<()> {
    for npc in &world.npcs {
        ensure_location(world, &npc.location_id, &npc.id)?;
        if let Some(room_id) = &npc.room_id {
            let dungeon = world
                .locations
                .get(npc.location_id.as_str())
                .and_then(Location::as_dungeon);
            ensure(dungeon.is_some_and(|d| d.room(room_id).is_some()), || {
                format!("{}: room {room_id} is not in {}", npc.id, npc.location_id)
            })?;
        }
        if let Some(faction_id) = &npc.faction_id {
            ensure_faction(world, faction_id, &npc.id)?;
        }
    }
    Ok(())
}

fn check_factions(world: &WorldData) -> Result<()> {
    for faction in &world.factions {
        if let Some(lair_id) = &faction.lair_id {
            let lair = world.locations.get(lair_id.as_str());
            ensure(lair.is_some_and(|l| l.as_dungeon().is_some()), || {
                format!("{}: lair {lair_id} is not a dungeon", faction.id)
            })?;
        }
        for id in faction.headquarters_id.iter().chain(&faction.territory_ids) {
            ensure_location(world, id, &faction.id)?;
        }
        if let Some(leader) = &faction.leader_id {
            ensure_npc(world, leader, &faction.id)?;
        }
    }
    Ok(())
}

fn check_hooks(world: &WorldData) -> Result<()> {
    for hook in &world.hooks {
        let locations = hook
            .source_settlement_id
            .iter()
            .chain(&hook.target_location_id)
            .chain(&hook.involved_location_ids);
        for id in locations {
            ensure_location(world, id, &hook.id)?;
        }
        for id in hook.source_npc_id.iter().chain(&hook.involved_npc_ids) {
            ensure_npc(world, id, &hook.id)?;
        }
        for id in hook.target_faction_id.iter().chain(&hook.involved_faction_ids) {
            ensure_faction(world, id, &hook.id)?;
        }
    }
    Ok(())
}

fn check_clocks(world: &WorldData) -> Result<()> {
    for clock in &world.clocks {
        ensure(clock.filled <= clock.segments, || {
            format!("{}: {} of {} segments filled", clock.id, clock.filled, clock.segments)
        })?;
        match &clock.owner {
            ClockOwner::Faction(id) => ensure_faction(world, id, &clock.id)?,
            ClockOwner::Npc(id) => ensure_npc(world, id, &clock.id)?,
            ClockOwner::World => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{Hex, HexCoord, Terrain};
    use crate::data::BuiltinData;
    use crate::dungeon::{DungeonParams, DungeonSize, DungeonTheme, generate_dungeon};
    use crate::landmark::generate_landmark;
    use crate::npc::{Archetype, NpcSpec, generate_npc};
    use crate::random::SeededRandom;

    fn world_with_landmark() -> WorldData {
        let mut world = WorldData::empty("w", "Test", "integrity");
        let hex = Hex::new(HexCoord::new(0, 0), Terrain::Plains);
        world.hexes.insert(hex.clone());
        let landmark = generate_landmark("integrity", &hex, None).unwrap();
        world.place(Location::Landmark(landmark));
        world
    }

    #[test]
    fn consistent_world_passes() {
        check_integrity(&world_with_landmark()).unwrap();
    }

    #[test]
    fn dangling_hex_reference_is_reported() {
        let mut world = world_with_landmark();
        if let Some(hex) = world.hexes.get_mut(&HexCoord::new(0, 0)) {
            hex.location_id = Some("landmark-missing".into());
        }
        let err = check_integrity(&world).unwrap_err();
        assert!(matches!(err, GenError::ReferenceIntegrity(_)));
    }

    #[test]
    fn unknown_faction_on_location_is_reported() {
        let mut world = world_with_landmark();
        for location in world.locations.iter_mut() {
            location.set_faction_id(Some("faction-ghost".into()));
        }
        assert!(check_integrity(&world).is_err());
    }

    fn world_with_dungeon() -> (WorldData, String) {
        let mut world = WorldData::empty("w", "Test", "integrity");
        let hex = Hex::new(HexCoord::new(1, 0), Terrain::Hills);
        world.hexes.insert(hex.clone());
        let params = DungeonParams::new(DungeonTheme::Fortress, DungeonSize::Small);
        let dungeon = generate_dungeon("integrity", &params, &hex, &BuiltinData).unwrap();
        let id = dungeon.id.clone();
        world.place(Location::Dungeon(dungeon));
        (world, id)
    }

    #[test]
    fn lock_without_key_is_reported() {
        let (mut world, id) = world_with_dungeon();
        check_integrity(&world).unwrap();
        if let Some(Location::Dungeon(d)) = world.locations.get_mut(id.as_str()) {
            d.keys.clear();
            for p in &mut d.passages {
                p.key_id = None;
            }
            d.passages[0].locked = true;
        }
        assert!(check_integrity(&world).is_err());
    }

    #[test]
    fn resident_room_must_belong_to_the_dungeon() {
        let (mut world, id) = world_with_dungeon();
        let mut rng = SeededRandom::new("guard");
        let mut npc = generate_npc(&mut rng, NpcSpec::new(Archetype::Guard, None, &id)).unwrap();
        let first_room = world.dungeons().next().unwrap().rooms[0].id.clone();
        npc.room_id = Some(first_room);
        world.npcs.insert(npc.clone());
        check_integrity(&world).unwrap();

        npc.room_id = Some("room-elsewhere".into());
        world.npcs.insert(npc);
        assert!(check_integrity(&world).is_err());
    }
}
