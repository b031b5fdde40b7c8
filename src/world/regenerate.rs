//! Очистка и перегенерация одного гекса
//!
//! Перегенерация всегда начинается с очистки: локация удаляется вместе со
//! своими жителями, а ссылки на них вычищаются из фракций, крючков, часов и
//! слухов других поселений. Затем на гексе строится новая локация.

use super::generate::{build_dungeon, install_dungeon, install_settlement, spread_rumors};
use super::{Location, WorldData, check_integrity};
use crate::data::DataSource;
use crate::dungeon::{DungeonParams, DungeonSize, DungeonTheme};
use crate::error::{GenError, Result};
use crate::faction::ClockOwner;
use crate::hex::{HexCoord, Terrain};
use crate::landmark::{LandmarkKind, generate_landmark};
use crate::random::{SeededRandom, derive_seed};
use crate::settlement::{SettlementPlacement, SettlementSize, generate_settlement, populate_settlement};
use crate::terrain::describe;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Что построить на гексе
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegenTarget {
    /// Только очистить
    Clear,
    /// Случайная локация, подходящая к местности
    Random,
    Dungeon {
        theme: DungeonTheme,
        #[serde(default)]
        size: Option<DungeonSize>,
    },
    Settlement {
        size: SettlementSize,
    },
    Landmark {
        #[serde(default)]
        kind: Option<LandmarkKind>,
    },
    /// Сменить местность, не ставя локацию
    Terrain {
        terrain: Terrain,
    },
}

/// Результат перегенерации
#[derive(Debug, Clone)]
pub struct Regeneration {
    pub world: WorldData,
    /// Новая локация на гексе
    pub location_id: Option<String>,
    /// Смена местности (было, стало)
    pub terrain_change: Option<(Terrain, Terrain)>,
}

/// Удаляет локацию гекса и всё, что на неё ссылается
///
/// Повторный вызов на пустом гексе ничего не меняет.
#[must_use]
pub fn clear_location(world: &WorldData, coord: HexCoord) -> WorldData {
    let mut next = world.clone();
    let Some(location_id) = next.hexes.get_mut(&coord).and_then(|h| h.location_id.take()) else {
        return next;
    };
    next.locations.remove(location_id.as_str());

    let removed: Vec<String> = next
        .npcs_at(&location_id)
        .map(|n| n.id.clone())
        .collect();
    for id in &removed {
        next.npcs.remove(id.as_str());
    }
    let gone_npc = |id: &String| removed.contains(id);
    let gone_location = |id: &String| *id == location_id;

    for faction in next.factions.iter_mut() {
        faction.lair_id = faction.lair_id.take().filter(|id| !gone_location(id));
        faction.headquarters_id = faction.headquarters_id.take().filter(|id| !gone_location(id));
        faction.territory_ids.retain(|id| !gone_location(id));
        faction.leader_id = faction.leader_id.take().filter(|id| !gone_npc(id));
    }

    for hook in next.hooks.iter_mut() {
        hook.source_settlement_id = hook.source_settlement_id.take().filter(|id| !gone_location(id));
        hook.target_location_id = hook.target_location_id.take().filter(|id| !gone_location(id));
        hook.involved_location_ids.retain(|id| !gone_location(id));
        hook.source_npc_id = hook.source_npc_id.take().filter(|id| !gone_npc(id));
        hook.involved_npc_ids.retain(|id| !gone_npc(id));
    }

    next.clocks
        .retain(|c| !matches!(&c.owner, ClockOwner::Npc(id) if removed.contains(id)));

    for location in next.locations.iter_mut() {
        let Location::Settlement(s) = location else {
            continue;
        };
        for rumor in &mut s.rumors {
            rumor.target_location_id = rumor.target_location_id.take().filter(|id| !gone_location(id));
        }
        for notice in &mut s.notices {
            notice.poster_id = notice.poster_id.take().filter(|id| !gone_npc(id));
        }
    }

    debug!(%coord, %location_id, npcs = removed.len(), "локация очищена");
    next
}

#[derive(Debug, Clone, Copy)]
enum Category {
    Settlement,
    Dungeon,
    Landmark,
}

/// Случайная цель, допустимая на местности
fn resolve_random(rng: &mut SeededRandom, terrain: Terrain) -> Result<RegenTarget> {
    let categories: &[(Category, u32)] = if terrain.is_water() {
        &[(Category::Dungeon, 60), (Category::Landmark, 40)]
    } else if terrain.is_settleable() {
        &[
            (Category::Settlement, 30),
            (Category::Dungeon, 40),
            (Category::Landmark, 30),
        ]
    } else {
        &[(Category::Dungeon, 60), (Category::Landmark, 40)]
    };
    Ok(match rng.pick_weighted(categories)? {
        Category::Settlement => RegenTarget::Settlement {
            size: *rng.pick_weighted(&SettlementSize::WEIGHTS)?,
        },
        Category::Dungeon => RegenTarget::Dungeon {
            theme: if terrain.is_water() {
                DungeonTheme::SeaCave
            } else {
                *rng.pick_weighted(&DungeonTheme::LAND_WEIGHTS)?
            },
            size: None,
        },
        Category::Landmark => RegenTarget::Landmark { kind: None },
    })
}

/// Местность, в которую нужно превратить гекс под цель
fn required_terrain(target: RegenTarget, terrain: Terrain) -> Option<Terrain> {
    let wanted = match target {
        RegenTarget::Clear | RegenTarget::Random | RegenTarget::Landmark { kind: None } => {
            return None;
        }
        RegenTarget::Terrain { terrain } => terrain,
        RegenTarget::Dungeon { theme, .. } if !theme.allowed_on(terrain) => Terrain::Hills,
        RegenTarget::Settlement { .. } if !terrain.is_settleable() => Terrain::Plains,
        RegenTarget::Landmark { kind: Some(kind) } if !kind.allowed_on(terrain) => match kind {
            LandmarkKind::Shipwreck => Terrain::Water,
            LandmarkKind::Waterfall => Terrain::Hills,
            LandmarkKind::AncientTree => Terrain::Forest,
            _ => Terrain::Plains,
        },
        _ => return None,
    };
    (wanted != terrain).then_some(wanted)
}

/// Очищает гекс и строит на нём новую локацию
///
/// Сид перегенерации `world_seed:regen:q,r:nonce`, где `nonce` — счётчик
/// перегенераций мира; каждый вызов его увеличивает. Если цель невозможна на
/// текущей местности, местность меняется, и это отражается в результате.
///
/// # Ошибки
/// - `InvalidPlacement`, если гекса нет на карте
/// - `ReferenceIntegrity`, если итоговый мир не прошёл проверку
pub fn regenerate(
    world: &WorldData,
    coord: HexCoord,
    target: RegenTarget,
    data: &dyn DataSource,
) -> Result<Regeneration> {
    if !world.hexes.contains(&coord) {
        return Err(GenError::invalid_placement(format!("no hex at {coord}")));
    }
    let mut next = clear_location(world, coord);
    let nonce = next.regen_nonce;
    next.regen_nonce += 1;
    let seed = derive_seed(&world.seed, "regen", format!("{coord}:{nonce}"));
    let mut rng = SeededRandom::new(derive_seed(&seed, "target", "random"));

    let current = next
        .hexes
        .get(&coord)
        .map(|h| h.terrain)
        .ok_or_else(|| GenError::invalid_placement(format!("no hex at {coord}")))?;
    let target = match target {
        RegenTarget::Random => resolve_random(&mut rng, current)?,
        other => other,
    };

    let mut terrain_change = None;
    if let Some(wanted) = required_terrain(target, current) {
        if let Some(hex) = next.hexes.get_mut(&coord) {
            hex.terrain = wanted;
            hex.description = describe(&world.seed, coord, wanted, data);
        }
        terrain_change = Some((current, wanted));
        debug!(%coord, from = %current, to = %wanted, "местность изменена");
    }
    let hex = next
        .hexes
        .get(&coord)
        .cloned()
        .ok_or_else(|| GenError::invalid_placement(format!("no hex at {coord}")))?;

    let location_id = match target {
        RegenTarget::Clear | RegenTarget::Random | RegenTarget::Terrain { .. } => None,
        RegenTarget::Dungeon { theme, size } => {
            let size = match size {
                Some(s) => s,
                None => *rng.pick_weighted(&DungeonSize::WEIGHTS)?,
            };
            let (dungeon, npcs) = build_dungeon(&seed, &hex, &DungeonParams::new(theme, size), data)?;
            let id = dungeon.id.clone();
            install_dungeon(&mut next, dungeon, npcs);
            Some(id)
        }
        RegenTarget::Settlement { size } => {
            let mut settlement = generate_settlement(&seed, &hex, Some(size))?;
            let npcs = populate_settlement(&seed, &mut settlement)?;
            let id = settlement.id.clone();
            install_settlement(&mut next, SettlementPlacement { settlement, npcs });
            spread_rumors(&mut next, &seed, &id)?;
            Some(id)
        }
        RegenTarget::Landmark { kind } => {
            let landmark = generate_landmark(&seed, &hex, kind)?;
            let id = landmark.id.clone();
            next.place(Location::Landmark(landmark));
            Some(id)
        }
    };

    check_integrity(&next)?;
    info!(%coord, nonce, location = ?location_id, "гекс перегенерирован");
    Ok(Regeneration {
        world: next,
        location_id,
        terrain_change,
    })
}
