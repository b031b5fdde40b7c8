use super::layout::{build_layout, link_sites_to_buildings};
use super::npcs::{SettlementNpcs, assign_npcs_to_buildings, generate_settlement_npcs};
use super::roads::{build_roads, roads_connected};
use super::sites::generate_sites;
use super::{Defenses, Folk, Government, Mood, Point, SettlementSize, SpatialSettlement};
use crate::error::{GenError, Result};
use crate::hex::{Hex, HexCoord, Terrain};
use crate::npc::Npc;
use crate::random::{SeededRandom, derive_seed};
use crate::table::Table;
use tracing::{debug, warn};

const PREFIXES: &[&str] = &[
    "North", "South", "East", "West", "Old", "New", "High", "Low", "Green", "Black", "White",
    "Red", "Grey", "Iron", "Stone", "Oak",
];

const SUFFIXES: &[&str] = &[
    "haven", "ford", "dale", "bury", "wick", "ton", "ham", "worth", "bridge", "field", "hollow",
    "crossing", "falls", "mill", "hold",
];

const TROUBLES: &[&str] = &[
    "Livestock have been found dead with strange marks",
    "Travelers have gone missing on the road",
    "Strange lights are seen in the hills at night",
    "A sickness is spreading through the village",
    "Crops have been failing despite good weather",
    "Children report seeing monsters in the woods",
    "The local well water has turned foul",
    "Bandits have been demanding tribute",
];

const QUIRKS: &[&str] = &[
    "The villagers refuse to speak after dark",
    "All the buildings face away from the forest",
    "A strange monument stands in the center of town",
    "The locals worship an unusual deity",
    "Everyone wears the same color clothing",
    "A permanent mist hangs over the settlement",
    "All the animals here are unusually docile",
];

const FOLK_WEIGHTS: [(Folk, u32); 4] = [
    (Folk::Human, 75),
    (Folk::Dwarven, 10),
    (Folk::Elven, 10),
    (Folk::Goblin, 5),
];

const GOVERNMENT_WEIGHTS: [(Government, u32); 6] = [
    (Government::Elder, 30),
    (Government::Mayor, 25),
    (Government::Council, 20),
    (Government::Lord, 15),
    (Government::Guild, 5),
    (Government::Theocracy, 5),
];

const MOOD_WEIGHTS: [(Mood, u32); 6] = [
    (Mood::Welcoming, 20),
    (Mood::Prosperous, 15),
    (Mood::Struggling, 25),
    (Mood::Fearful, 20),
    (Mood::Secretive, 15),
    (Mood::Hostile, 5),
];

const DEFENSE_WEIGHTS: [(Defenses, u32); 5] = [
    (Defenses::None, 30),
    (Defenses::Militia, 35),
    (Defenses::Guards, 25),
    (Defenses::Walls, 8),
    (Defenses::Fortified, 2),
];

fn folk_hint(terrain: Terrain) -> Option<Folk> {
    match terrain {
        Terrain::Mountains | Terrain::Hills => Some(Folk::Dwarven),
        Terrain::Forest => Some(Folk::Elven),
        Terrain::Swamp => Some(Folk::Goblin),
        Terrain::Plains | Terrain::Water => None,
    }
}

fn folk_name(folk: Folk) -> &'static str {
    match folk {
        Folk::Human => "human",
        Folk::Dwarven => "dwarven",
        Folk::Elven => "elven",
        Folk::Goblin => "goblin",
    }
}

/// Генерирует поселение на гексе: свойства, заведения, кварталы, здания, дороги
///
/// Жители не создаются (см. [`place_settlement`]), поэтому владельцы зданий
/// и заведений пусты.
///
/// # Ошибки
/// `InvalidPlacement`, если на местности гекса нельзя строить.
pub fn generate_settlement(
    seed: &str,
    hex: &Hex,
    size: Option<SettlementSize>,
) -> Result<SpatialSettlement> {
    if !hex.terrain.is_settleable() {
        return Err(GenError::invalid_placement(format!(
            "settlement cannot be placed on {:?} at {}",
            hex.terrain, hex.coord
        )));
    }
    let mut rng = SeededRandom::new(derive_seed(seed, "settlement", hex.coord));

    let hinted = if rng.chance(0.3) {
        folk_hint(hex.terrain)
    } else {
        None
    };
    let folk = match hinted {
        Some(f) => f,
        None => *rng.pick_weighted(&FOLK_WEIGHTS)?,
    };
    let name = format!("{}{}", rng.pick(PREFIXES)?, rng.pick(SUFFIXES)?);
    let size = match size {
        Some(s) => s,
        None => *rng.pick_weighted(&SettlementSize::WEIGHTS)?,
    };
    let (lo, hi) = size.population_range();

    let mut settlement = SpatialSettlement {
        id: rng.id("settlement"),
        description: format!("A {} {size} called {name}.", folk_name(folk)),
        name,
        hex_coord: hex.coord,
        faction_id: None,
        tags: vec![size.slug().to_string(), folk_name(folk).to_string()],
        size,
        folk,
        population: rng.between(lo, hi) as u32,
        government: *rng.pick_weighted(&GOVERNMENT_WEIGHTS)?,
        mood: *rng.pick_weighted(&MOOD_WEIGHTS)?,
        defenses: *rng.pick_weighted(&DEFENSE_WEIGHTS)?,
        trouble: (*rng.pick(TROUBLES)?).to_string(),
        quirk: (*rng.pick(QUIRKS)?).to_string(),
        center: Point::default(),
        radius: size.radius(),
        wards: Vec::new(),
        buildings: Vec::new(),
        sites: Vec::new(),
        roads: Vec::new(),
        npc_ids: Vec::new(),
        mayor_npc_id: None,
        rumors: Vec::new(),
        notices: Vec::new(),
    };

    let mut sites = generate_sites(seed, &settlement)?;
    let mut layout_rng = rng.derive("layout", &settlement.id);
    let mut layout = build_layout(&mut layout_rng, size, &sites)?;
    link_sites_to_buildings(&mut sites, &mut layout.buildings, settlement.center);
    let roads = build_roads(&layout.wards, &layout.buildings);
    if !roads_connected(&layout.wards, &layout.buildings, &roads) {
        warn!(id = %settlement.id, "дорожный граф поселения несвязен");
    }

    settlement.sites = sites;
    settlement.wards = layout.wards;
    settlement.buildings = layout.buildings;
    settlement.roads = roads;
    debug!(
        id = %settlement.id,
        name = %settlement.name,
        buildings = settlement.buildings.len(),
        "поселение сгенерировано"
    );
    Ok(settlement)
}

/// Заселяет поселение: жители, владельцы заведений, расселение по зданиям
pub fn populate_settlement(seed: &str, settlement: &mut SpatialSettlement) -> Result<Vec<Npc>> {
    let SettlementNpcs {
        mut npcs,
        mayor_npc_id,
        site_owners,
        site_staff,
    } = generate_settlement_npcs(seed, settlement, &settlement.sites)?;

    for site in &mut settlement.sites {
        site.owner_id = site_owners.get(&site.id).cloned();
        site.staff_ids = site_staff
            .iter()
            .filter(|(site_id, _)| site_id == &site.id)
            .map(|(_, npc_id)| npc_id.clone())
            .collect();
    }
    assign_npcs_to_buildings(&mut npcs, &settlement.sites, &mut settlement.buildings);

    settlement.npc_ids = npcs.iter().map(|n| n.id.clone()).collect();
    settlement.mayor_npc_id = mayor_npc_id;
    Ok(npcs)
}

/// Поселение вместе с его жителями
#[derive(Debug, Clone)]
pub struct SettlementPlacement {
    pub settlement: SpatialSettlement,
    pub npcs: Vec<Npc>,
}

/// Выбирает свободный гекс и строит на нём заселённое поселение
///
/// В 80% случаев выбираются равнины, иначе любая пригодная местность;
/// без равнин тоже берётся любая пригодная. Гексы дальше от `existing`
/// вероятнее. `force_coord` фиксирует гекс: занятый или непригодный даёт `None`.
pub fn place_settlement(
    seed: &str,
    hexes: &Table<Hex>,
    existing: &[HexCoord],
    force_coord: Option<HexCoord>,
    force_size: Option<SettlementSize>,
) -> Result<Option<SettlementPlacement>> {
    let mut rng = SeededRandom::new(derive_seed(seed, "settlement", "placement"));

    let hex = match force_coord {
        Some(coord) => match hexes.get(&coord) {
            Some(h) if h.location_id.is_none() && h.terrain.is_settleable() => h,
            _ => return Ok(None),
        },
        None => {
            let free = || hexes.iter().filter(|h| h.location_id.is_none());
            let varied = rng.chance(0.2);
            let mut candidates: Vec<&Hex> = free()
                .filter(|h| {
                    if varied {
                        h.terrain.is_settleable()
                    } else {
                        h.terrain == Terrain::Plains
                    }
                })
                .collect();
            if candidates.is_empty() {
                candidates = free().filter(|h| h.terrain.is_settleable()).collect();
            }
            if candidates.is_empty() {
                return Ok(None);
            }
            // Вес — расстояние до ближайшего уже стоящего поселения
            let weighted: Vec<(&Hex, f64)> = candidates
                .into_iter()
                .map(|h| {
                    let nearest = existing
                        .iter()
                        .map(|c| c.distance(h.coord))
                        .min()
                        .unwrap_or(1);
                    (h, f64::from(nearest.max(1)))
                })
                .collect();
            *rng.pick_weighted(&weighted)?
        }
    };

    let mut settlement = generate_settlement(seed, hex, force_size)?;
    let npcs = populate_settlement(seed, &mut settlement)?;
    Ok(Some(SettlementPlacement { settlement, npcs }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::roads::roads_connected;

    #[test]
    fn mountains_are_rejected() {
        let hex = Hex::new(HexCoord::new(0, 0), Terrain::Mountains);
        let err = generate_settlement("peak", &hex, None).unwrap_err();
        assert!(matches!(err, GenError::InvalidPlacement(_)));
    }

    #[test]
    fn same_seed_same_settlement() {
        let hex = Hex::new(HexCoord::new(3, -2), Terrain::Forest);
        let a = generate_settlement("twin", &hex, Some(SettlementSize::Town)).unwrap();
        let b = generate_settlement("twin", &hex, Some(SettlementSize::Town)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn placed_settlement_is_consistent() {
        let mut hexes = Table::new();
        hexes.insert(Hex::new(HexCoord::new(0, 0), Terrain::Water));
        hexes.insert(Hex::new(HexCoord::new(1, 0), Terrain::Plains));
        let placed = place_settlement("place", &hexes, &[], None, Some(SettlementSize::City))
            .unwrap()
            .unwrap();
        let s = &placed.settlement;
        assert_eq!(s.hex_coord, HexCoord::new(1, 0));
        assert!(roads_connected(&s.wards, &s.buildings, &s.roads));

        for b in &s.buildings {
            if let Some(owner) = &b.owner_id {
                let npc = placed.npcs.iter().find(|n| &n.id == owner).unwrap();
                assert_eq!(npc.location_id, s.id);
            }
            for site_id in &b.site_ids {
                assert_eq!(s.site(site_id).unwrap().building_id.as_ref(), Some(&b.id));
            }
        }
        for site in &s.sites {
            assert!(site.owner_id.is_some());
        }
        assert_eq!(s.npc_ids.len(), placed.npcs.len());
    }

    #[test]
    fn forced_coord_must_be_free() {
        let mut hexes = Table::new();
        let mut taken = Hex::new(HexCoord::new(0, 0), Terrain::Plains);
        taken.location_id = Some("dungeon-x".into());
        hexes.insert(taken);
        let none =
            place_settlement("force", &hexes, &[], Some(HexCoord::new(0, 0)), None).unwrap();
        assert!(none.is_none());
    }
}
