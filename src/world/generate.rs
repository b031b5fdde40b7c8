//! Сборка мира из параметров генерации
//!
//! Порядок этапов:
//! 1. Гексовая карта из полей шума
//! 2. Поселения (последовательно: вес гекса зависит от уже стоящих)
//! 3. Подземелья с обитателями (выбор гексов последовательно, генерация параллельно)
//! 4. Ориентиры
//! 5. Фракции с базами, лидерами и часами
//! 6. Крючки приключений
//! 7. Слухи и объявления поселений

use super::{Location, WorldData, check_integrity};
use crate::config::GenerationParams;
use crate::data::DataSource;
use crate::dungeon::{
    DungeonParams, SpatialDungeon, boss_room, generate_dungeon, generate_dungeon_npcs,
    pick_dungeon_site,
};
use crate::error::Result;
use crate::faction::{FactionSetup, Hook, HookSubject, generate_factions, generate_hook};
use crate::hex::{Hex, HexCoord};
use crate::landmark::place_landmark;
use crate::npc::Npc;
use crate::random::{SeededRandom, derive_seed};
use crate::settlement::{
    RumorContext, SettlementPlacement, generate_notices, generate_rumors, place_settlement,
};
use crate::terrain::generate_hexes;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Сколько ближайших подземелий попадает в слухи поселения
const NEARBY_DUNGEONS: usize = 3;

/// Генерирует мир целиком
///
/// Все сиды выводятся из `params.seed`, поэтому одни и те же параметры
/// дают один и тот же мир.
pub fn generate_world(params: &GenerationParams, data: &dyn DataSource) -> Result<WorldData> {
    let seed = params.seed.as_str();
    let id = SeededRandom::new(derive_seed(seed, "world", "id")).id("world");
    let mut world = WorldData::empty(&id, &params.name, seed);
    world.state.end_day = params.end_day;

    world.hexes = generate_hexes(seed, params.map_radius, &params.terrain, data);
    info!(hexes = world.hexes.len(), "карта сгенерирована");

    place_settlements(&mut world, params.settlements)?;
    place_dungeons(&mut world, params.dungeons, data)?;
    for i in 0..params.landmarks {
        let landmark_seed = derive_seed(seed, "landmark", i);
        match place_landmark(&landmark_seed, &world.hexes)? {
            Some(landmark) => world.place(Location::Landmark(landmark)),
            None => {
                warn!(placed = i, requested = params.landmarks, "нет свободных гексов для ориентиров");
                break;
            }
        }
    }

    let lair_ids: Vec<String> = world.dungeons().map(|d| d.id.clone()).collect();
    let settlement_ids: Vec<String> = world.settlements().map(|s| s.id.clone()).collect();
    for setup in generate_factions(seed, params.factions, &lair_ids, &settlement_ids)? {
        install_faction(&mut world, setup);
    }

    seed_hooks(&mut world)?;
    let settlement_ids: Vec<String> = world.settlements().map(|s| s.id.clone()).collect();
    for settlement_id in &settlement_ids {
        spread_rumors(&mut world, seed, settlement_id)?;
    }

    check_integrity(&world)?;
    info!(
        id = %world.id,
        locations = world.locations.len(),
        npcs = world.npcs.len(),
        factions = world.factions.len(),
        hooks = world.hooks.len(),
        "мир сгенерирован"
    );
    Ok(world)
}

/// Заносит поселение и его жителей в мир
pub(crate) fn install_settlement(world: &mut WorldData, placement: SettlementPlacement) {
    let SettlementPlacement { settlement, npcs } = placement;
    world.npcs.extend(npcs);
    world.place(Location::Settlement(settlement));
}

fn place_settlements(world: &mut WorldData, count: usize) -> Result<()> {
    let mut existing: Vec<HexCoord> = Vec::with_capacity(count);
    for i in 0..count {
        let settlement_seed = derive_seed(&world.seed, "settlement", i);
        let Some(placement) = place_settlement(&settlement_seed, &world.hexes, &existing, None, None)?
        else {
            warn!(placed = i, requested = count, "нет пригодных гексов для поселений");
            break;
        };
        existing.push(placement.settlement.hex_coord);
        install_settlement(world, placement);
    }
    Ok(())
}

/// Подземелья: гексы выбираются по очереди, генерация независима
///
/// Каждое подземелье получает собственный сид `seed:dungeon:i`, поэтому
/// порядок генерации не влияет на результат.
fn place_dungeons(world: &mut WorldData, count: usize, data: &dyn DataSource) -> Result<()> {
    let mut picks: Vec<(String, Hex, DungeonParams)> = Vec::with_capacity(count);
    for i in 0..count {
        let dungeon_seed = derive_seed(&world.seed, "dungeon", i);
        let free = world
            .hexes
            .iter()
            .filter(|h| picks.iter().all(|(_, taken, _)| taken.coord != h.coord));
        let Some((hex, params)) = pick_dungeon_site(&dungeon_seed, free, None, None)? else {
            warn!(placed = i, requested = count, "нет свободных гексов для подземелий");
            break;
        };
        let hex = hex.clone();
        picks.push((dungeon_seed, hex, params));
    }

    #[cfg(feature = "parallel")]
    let dungeons: Vec<(SpatialDungeon, Vec<Npc>)> = picks
        .par_iter()
        .map(|(dungeon_seed, hex, params)| build_dungeon(dungeon_seed, hex, params, data))
        .collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let dungeons: Vec<(SpatialDungeon, Vec<Npc>)> = picks
        .iter()
        .map(|(dungeon_seed, hex, params)| build_dungeon(dungeon_seed, hex, params, data))
        .collect::<Result<_>>()?;

    debug!(count = dungeons.len(), "подземелья сгенерированы");
    for (dungeon, npcs) in dungeons {
        install_dungeon(world, dungeon, npcs);
    }
    Ok(())
}

/// Подземелье и его обитатели из одного сида
pub(crate) fn build_dungeon(
    seed: &str,
    hex: &Hex,
    params: &DungeonParams,
    data: &dyn DataSource,
) -> Result<(SpatialDungeon, Vec<Npc>)> {
    let dungeon = generate_dungeon(seed, params, hex, data)?;
    let npcs = generate_dungeon_npcs(seed, &dungeon)?;
    Ok((dungeon, npcs))
}

/// Заносит подземелье и его обитателей в мир
pub(crate) fn install_dungeon(world: &mut WorldData, dungeon: SpatialDungeon, npcs: Vec<Npc>) {
    world.npcs.extend(npcs);
    world.place(Location::Dungeon(dungeon));
}

/// Заносит фракцию, её лидера и часы; база фракции получает `faction_id`
fn install_faction(world: &mut WorldData, setup: FactionSetup) {
    let FactionSetup {
        faction,
        leader,
        clock,
    } = setup;
    for base in faction.lair_id.iter().chain(&faction.headquarters_id) {
        if let Some(location) = world.locations.get_mut(base.as_str()) {
            location.set_faction_id(Some(faction.id.clone()));
        }
    }
    if let Some(mut leader) = leader {
        match world.locations.get_mut(leader.location_id.as_str()) {
            Some(Location::Settlement(s)) => s.npc_ids.push(leader.id.clone()),
            // В логове главарь ждёт в самой дальней комнате
            Some(Location::Dungeon(d)) => leader.room_id = boss_room(d).map(|r| r.id.clone()),
            _ => {}
        }
        world.npcs.insert(leader);
    }
    world.clocks.insert(clock);
    world.factions.insert(faction);
}

/// По крючку на каждое поселение, подземелье и фракцию, плюс один в глуши
fn seed_hooks(world: &mut WorldData) -> Result<()> {
    let seed = world.seed.clone();
    let mut hooks = Vec::new();

    for settlement in world.settlements() {
        let residents: Vec<&Npc> = world.npcs_at(&settlement.id).collect();
        hooks.push(generate_hook(&seed, HookSubject::Settlement(settlement), 0, &residents)?);
    }
    for dungeon in world.dungeons() {
        // Очевидцы из ближайшего поселения
        let nearest = world
            .settlements()
            .min_by_key(|s| s.hex_coord.distance(dungeon.hex_coord));
        let witnesses: Vec<&Npc> = match nearest {
            Some(s) => world.npcs_at(&s.id).collect(),
            None => Vec::new(),
        };
        hooks.push(generate_hook(&seed, HookSubject::Dungeon(dungeon), 0, &witnesses)?);
    }
    for faction in &world.factions {
        let members: Vec<&Npc> = world
            .npcs
            .iter()
            .filter(|n| n.faction_id.as_deref() == Some(faction.id.as_str()))
            .collect();
        hooks.push(generate_hook(&seed, HookSubject::Faction(faction), 0, &members)?);
    }
    hooks.push(generate_hook(&seed, HookSubject::Wilderness, 0, &[])?);

    debug!(count = hooks.len(), "крючки сгенерированы");
    world.hooks.extend(hooks);
    Ok(())
}

/// Контекст слухов поселения: жители, ближние подземелья, связанные крючки
fn rumor_context<'a>(world: &'a WorldData, settlement_id: &str) -> Option<RumorContext<'a>> {
    let settlement = world.locations.get(settlement_id)?.as_settlement()?;
    let mut dungeons: Vec<&SpatialDungeon> = world.dungeons().collect();
    dungeons.sort_by(|a, b| {
        let da = a.hex_coord.distance(settlement.hex_coord);
        let db = b.hex_coord.distance(settlement.hex_coord);
        da.cmp(&db).then_with(|| a.id.cmp(&b.id))
    });
    dungeons.truncate(NEARBY_DUNGEONS);

    let hooks: Vec<&Hook> = world
        .hooks
        .iter()
        .filter(|h| {
            h.source_settlement_id.as_deref() == Some(settlement.id.as_str())
                || h.target_faction_id.is_some()
                || h.target_location_id
                    .as_deref()
                    .is_some_and(|t| dungeons.iter().any(|d| d.id == t))
        })
        .collect();

    Some(RumorContext {
        settlement,
        npcs: world.npcs_at(&settlement.id).collect(),
        dungeons,
        hooks,
        factions: world.factions.iter().collect(),
    })
}

/// Заново генерирует слухи и объявления поселения
pub(crate) fn spread_rumors(world: &mut WorldData, seed: &str, settlement_id: &str) -> Result<()> {
    let (rumors, notices) = {
        let Some(ctx) = rumor_context(world, settlement_id) else {
            return Ok(());
        };
        (generate_rumors(seed, &ctx)?, generate_notices(seed, &ctx)?)
    };
    if let Some(Location::Settlement(s)) = world.locations.get_mut(settlement_id) {
        debug!(id = %s.id, rumors = rumors.len(), notices = notices.len(), "слухи разошлись");
        s.rumors = rumors;
        s.notices = notices;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BuiltinData;

    fn small_params(seed: &str) -> GenerationParams {
        GenerationParams {
            seed: seed.to_string(),
            map_radius: 5,
            settlements: 3,
            dungeons: 3,
            landmarks: 2,
            factions: 2,
            ..GenerationParams::default()
        }
    }

    #[test]
    fn world_is_deterministic() {
        let a = generate_world(&small_params("vale"), &BuiltinData).unwrap();
        let b = generate_world(&small_params("vale"), &BuiltinData).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_location_sits_on_its_hex() {
        let world = generate_world(&small_params("marches"), &BuiltinData).unwrap();
        assert!(!world.locations.is_empty());
        for location in &world.locations {
            let hex = world.hexes.get(&location.hex_coord()).unwrap();
            assert_eq!(hex.location_id.as_deref(), Some(location.id()));
        }
    }

    #[test]
    fn factions_mark_their_bases() {
        let world = generate_world(&small_params("bases"), &BuiltinData).unwrap();
        for faction in &world.factions {
            for base in faction.lair_id.iter().chain(&faction.headquarters_id) {
                let location = world.locations.get(base.as_str()).unwrap();
                assert_eq!(location.faction_id(), Some(faction.id.as_str()));
            }
        }
    }
}
