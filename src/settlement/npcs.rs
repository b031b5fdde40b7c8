//! Жители поселения и их дома

use super::{Building, BuildingKind, Government, Site, SiteKind, SpatialSettlement};
use crate::error::Result;
use crate::npc::{Archetype, Npc, NpcRole, NpcSpec, generate_npc};
use crate::random::{SeededRandom, derive_seed};
use std::collections::BTreeMap;

const TOWNSFOLK_ROLES: [NpcRole; 4] = [
    NpcRole::Farmer,
    NpcRole::Craftsman,
    NpcRole::Merchant,
    NpcRole::GuardCaptain,
];

const TOWNSFOLK_ARCHETYPES: [Archetype; 4] = [
    Archetype::Commoner,
    Archetype::Commoner,
    Archetype::Guard,
    Archetype::Merchant,
];

const MAX_TOWNSFOLK: i32 = 10;

/// Результат заселения
#[derive(Debug, Clone, Default)]
pub struct SettlementNpcs {
    pub npcs: Vec<Npc>,
    pub mayor_npc_id: Option<String>,
    /// id заведения → id владельца
    pub site_owners: BTreeMap<String, String>,
    /// (id заведения, id работника)
    pub site_staff: Vec<(String, String)>,
}

fn site_role(kind: SiteKind) -> NpcRole {
    match kind {
        SiteKind::Inn | SiteKind::Tavern => NpcRole::Innkeeper,
        SiteKind::Temple => NpcRole::Priest,
        SiteKind::Blacksmith => NpcRole::Blacksmith,
        SiteKind::GeneralStore => NpcRole::Shopkeeper,
        SiteKind::Market | SiteKind::GuildHall => NpcRole::Merchant,
        SiteKind::NobleEstate => NpcRole::Noble,
    }
}

fn site_owner_archetype(kind: SiteKind) -> Archetype {
    match kind {
        SiteKind::Inn | SiteKind::Tavern | SiteKind::Blacksmith => Archetype::Commoner,
        SiteKind::Temple => Archetype::Priest,
        SiteKind::GeneralStore | SiteKind::Market | SiteKind::GuildHall => Archetype::Merchant,
        SiteKind::NobleEstate => Archetype::Noble,
    }
}

/// Тип здания, естественный для роли
fn role_building(role: NpcRole) -> Option<BuildingKind> {
    match role {
        NpcRole::Innkeeper => Some(BuildingKind::Tavern),
        NpcRole::Priest | NpcRole::Healer => Some(BuildingKind::Temple),
        NpcRole::Blacksmith | NpcRole::Craftsman => Some(BuildingKind::Workshop),
        NpcRole::Shopkeeper | NpcRole::Merchant => Some(BuildingKind::Shop),
        NpcRole::Mayor | NpcRole::Elder | NpcRole::Sage => Some(BuildingKind::Hall),
        NpcRole::Noble => Some(BuildingKind::Manor),
        _ => None,
    }
}

/// Генерирует старосту, владельцев и работников заведений и горожан
///
/// Каждый персонаж берёт свой поток из id поселения и своей роли в нём,
/// поэтому добавление заведения не меняет уже существующих жителей.
pub fn generate_settlement_npcs(
    seed: &str,
    settlement: &SpatialSettlement,
    sites: &[Site],
) -> Result<SettlementNpcs> {
    let location = settlement.id.as_str();
    let mut rng = SeededRandom::new(derive_seed(seed, "settlement-npcs", location));
    let npc_rng = |who: &str| SeededRandom::new(derive_seed(seed, "npc", format!("{location}:{who}")));
    let mut out = SettlementNpcs::default();

    let (archetype, role) = match settlement.government {
        Government::Theocracy => (Archetype::Priest, NpcRole::Mayor),
        Government::Elder => (Archetype::Noble, NpcRole::Elder),
        _ => (Archetype::Noble, NpcRole::Mayor),
    };
    let mayor = generate_npc(
        &mut npc_rng("mayor"),
        NpcSpec::new(archetype, Some(role), location).aged(45, 70),
    )?;
    out.mayor_npc_id = Some(mayor.id.clone());
    out.npcs.push(mayor);

    for site in sites {
        let mut owner = generate_npc(
            &mut npc_rng(&format!("owner:{}", site.id)),
            NpcSpec::new(site_owner_archetype(site.kind), Some(site_role(site.kind)), location),
        )?;
        owner.site_id = Some(site.id.clone());
        out.site_owners.insert(site.id.clone(), owner.id.clone());
        out.npcs.push(owner);

        if rng.chance(0.5) {
            let mut staff = generate_npc(
                &mut npc_rng(&format!("staff:{}", site.id)),
                NpcSpec::new(Archetype::Commoner, None, location),
            )?;
            staff.site_id = Some(site.id.clone());
            out.site_staff.push((site.id.clone(), staff.id.clone()));
            out.npcs.push(staff);
        }
    }

    let by_population = (settlement.population / 500) as i32;
    let townsfolk = (rng.between(2, 5) + by_population).min(MAX_TOWNSFOLK);
    for i in 0..townsfolk {
        let archetype = *rng.pick(&TOWNSFOLK_ARCHETYPES)?;
        let role = *rng.pick(&TOWNSFOLK_ROLES)?;
        out.npcs.push(generate_npc(
            &mut npc_rng(&format!("townsfolk:{i}")),
            NpcSpec::new(archetype, Some(role), location),
        )?);
    }
    Ok(out)
}

/// Расселяет жителей по зданиям
///
/// Порядок: владельцы заведений занимают здание своего заведения, затем
/// персонажи с ролью берут свободное здание подходящего типа, остальные
/// получают свободные дома. Кому не хватило места, остаются только с
/// `location_id`.
pub fn assign_npcs_to_buildings(npcs: &mut [Npc], sites: &[Site], buildings: &mut [Building]) {
    fn claim(npc: &mut Npc, building: &mut Building) {
        building.owner_id = Some(npc.id.clone());
        npc.building_id = Some(building.id.clone());
    }

    for npc in npcs.iter_mut() {
        let owned_site = sites
            .iter()
            .find(|s| s.owner_id.as_deref() == Some(npc.id.as_str()));
        let Some(building_id) = owned_site.and_then(|s| s.building_id.as_deref()) else {
            continue;
        };
        if let Some(b) = buildings
            .iter_mut()
            .find(|b| b.id == building_id && b.owner_id.is_none())
        {
            claim(npc, b);
        }
    }

    for npc in npcs.iter_mut().filter(|n| n.building_id.is_none()) {
        let Some(kind) = npc.role.and_then(role_building) else {
            continue;
        };
        if let Some(b) = buildings
            .iter_mut()
            .find(|b| b.kind == kind && b.owner_id.is_none() && b.site_ids.is_empty())
        {
            claim(npc, b);
        }
    }

    for npc in npcs.iter_mut().filter(|n| n.building_id.is_none()) {
        if let Some(b) = buildings
            .iter_mut()
            .find(|b| b.kind == BuildingKind::House && b.owner_id.is_none())
        {
            claim(npc, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{Hex, HexCoord, Terrain};
    use crate::settlement::SettlementSize;
    use crate::settlement::generator::generate_settlement;

    fn town() -> SpatialSettlement {
        let hex = Hex::new(HexCoord::new(2, -1), Terrain::Plains);
        generate_settlement("npcs", &hex, Some(SettlementSize::Town)).unwrap()
    }

    #[test]
    fn every_site_has_an_owner() {
        let s = town();
        let result = generate_settlement_npcs("npcs", &s, &s.sites).unwrap();
        assert_eq!(result.site_owners.len(), s.sites.len());
        let mayor = result.mayor_npc_id.as_ref().unwrap();
        let mayor = result.npcs.iter().find(|n| &n.id == mayor).unwrap();
        assert!((45..=70).contains(&mayor.age));
        assert!(result.npcs.iter().all(|n| n.location_id == s.id));
    }

    #[test]
    fn townsfolk_are_capped() {
        let mut s = town();
        s.population = 25_000;
        let result = generate_settlement_npcs("cap", &s, &[]).unwrap();
        // староста и не больше десяти горожан
        assert!(result.npcs.len() <= 1 + MAX_TOWNSFOLK as usize);
    }

    #[test]
    fn buildings_get_distinct_owners() {
        let s = town();
        let mut buildings = s.buildings.clone();
        let mut sites = s.sites.clone();
        let mut result = generate_settlement_npcs("owners", &s, &sites).unwrap();
        for site in &mut sites {
            site.owner_id = result.site_owners.get(&site.id).cloned();
        }
        assign_npcs_to_buildings(&mut result.npcs, &sites, &mut buildings);

        for b in buildings.iter().filter(|b| b.owner_id.is_some()) {
            let owner = b.owner_id.as_ref().unwrap();
            let npc = result.npcs.iter().find(|n| &n.id == owner).unwrap();
            assert_eq!(npc.building_id.as_ref(), Some(&b.id));
        }
        for site in sites.iter().filter(|s| s.building_id.is_some()) {
            let b = buildings
                .iter()
                .find(|b| Some(&b.id) == site.building_id.as_ref())
                .unwrap();
            assert_eq!(b.owner_id, site.owner_id);
        }
    }
}
