//! Раскладка поселения: кварталы и здания на плоскости
//!
//! Здания разбрасываются внутри круговой области своего квартала с
//! минимальным расстоянием между ними. Если за отведённые попытки место не
//! находится, область расширяется, затем расстояние постепенно ослабляется.
//! Здание не отбрасывается никогда: в крайнем случае оно ставится с флагом
//! `relaxed_spacing`.

use super::{
    Building, BuildingKind, Point, SettlementSize, Site, SiteKind, Ward, WardKind,
};
use crate::error::Result;
use crate::random::SeededRandom;
use std::f64::consts::TAU;
use tracing::{debug, warn};

/// Минимальное расстояние между центрами зданий
pub const BASE_SPACING: f64 = 12.0;
const RETRIES_PER_ROUND: usize = 24;
const MAX_EXPANSIONS: usize = 4;
const EXPANSION_FACTOR: f64 = 1.25;
const RELAX_FACTOR: f64 = 0.75;
const MAX_RELAXATIONS: usize = 6;

/// Доля радиуса поселения: удаление кольцевых кварталов от центра
const RING_DISTANCE: f64 = 0.6;
/// Доля радиуса поселения: радиус квартала
const WARD_RADIUS: f64 = 0.3;
/// Доля радиуса поселения, занятая застройкой без кварталов
const OPEN_RADIUS: f64 = 0.8;
/// Во сколько раз квартал подходящего профиля вероятнее прочих
const AFFINITY_WEIGHT: u32 = 6;

const FILLER_WARDS: [(WardKind, u32); 8] = [
    (WardKind::Residential, 30),
    (WardKind::Craftsmen, 15),
    (WardKind::Merchant, 15),
    (WardKind::Slum, 10),
    (WardKind::Tavern, 8),
    (WardKind::Temple, 5),
    (WardKind::Park, 5),
    (WardKind::Castle, 4),
];

#[derive(Debug, Clone, Default)]
pub struct SettlementLayout {
    pub wards: Vec<Ward>,
    pub buildings: Vec<Building>,
}

/// Квартал, в котором обычно стоит заведение
#[must_use]
pub fn site_ward(kind: SiteKind) -> WardKind {
    match kind {
        SiteKind::Inn | SiteKind::Tavern => WardKind::Tavern,
        SiteKind::Temple => WardKind::Temple,
        SiteKind::Market => WardKind::Market,
        SiteKind::Blacksmith | SiteKind::GuildHall => WardKind::Craftsmen,
        SiteKind::GeneralStore => WardKind::Merchant,
        SiteKind::NobleEstate => WardKind::Castle,
    }
}

fn building_weights(size: SettlementSize) -> Vec<(BuildingKind, u32)> {
    let large = matches!(size, SettlementSize::Town | SettlementSize::City);
    vec![
        (BuildingKind::House, 60),
        (BuildingKind::Shop, 12),
        (BuildingKind::Workshop, 12),
        (BuildingKind::Tavern, 4),
        (BuildingKind::Temple, 2),
        (BuildingKind::Hall, if large { 3 } else { 1 }),
        (BuildingKind::Manor, if large { 3 } else { 0 }),
    ]
}

fn footprint(rng: &mut SeededRandom, kind: BuildingKind) -> (f64, f64) {
    let (lo, hi) = match kind {
        BuildingKind::House => (4.0, 6.0),
        BuildingKind::Shop | BuildingKind::Workshop => (5.0, 7.0),
        BuildingKind::Tavern => (6.0, 9.0),
        BuildingKind::Temple | BuildingKind::Hall => (8.0, 11.0),
        BuildingKind::Manor => (9.0, 12.0),
    };
    (rng.float(lo, hi), rng.float(lo, hi))
}

fn layout_wards(
    rng: &mut SeededRandom,
    size: SettlementSize,
    sites: &[Site],
) -> Result<Vec<Ward>> {
    let Some((lo, hi)) = size.ward_range() else {
        return Ok(Vec::new());
    };
    let count = rng.between(lo, hi) as usize;
    let radius = size.radius();

    let mut kinds = vec![WardKind::Market];
    for site in sites {
        let kind = site_ward(site.kind);
        if !kinds.contains(&kind) && kinds.len() < count {
            kinds.push(kind);
        }
    }
    while kinds.len() < count {
        kinds.push(*rng.pick_weighted(&FILLER_WARDS)?);
    }

    let ring = (kinds.len() - 1).max(1) as f64;
    let start = rng.float(0.0, TAU);
    let wards = kinds
        .into_iter()
        .enumerate()
        .map(|(i, kind)| {
            let center = if i == 0 {
                Point::default()
            } else {
                let angle = start + (i - 1) as f64 * TAU / ring;
                Point::new(
                    angle.cos() * radius * RING_DISTANCE,
                    angle.sin() * radius * RING_DISTANCE,
                )
            };
            Ward {
                id: rng.id("ward"),
                kind,
                center,
                radius: radius * WARD_RADIUS,
            }
        })
        .collect();
    Ok(wards)
}

fn sample_disk(rng: &mut SeededRandom, center: Point, radius: f64) -> Point {
    let angle = rng.float(0.0, TAU);
    let dist = radius * rng.next().sqrt();
    Point::new(center.x + angle.cos() * dist, center.y + angle.sin() * dist)
}

fn is_spaced(point: Point, placed: &[Building], spacing: f64) -> bool {
    placed.iter().all(|b| b.position.distance(point) >= spacing)
}

/// Ищет точку в области; возвращает позицию и признак ослабленного интервала
fn scatter(
    rng: &mut SeededRandom,
    center: Point,
    radius: f64,
    placed: &[Building],
) -> (Point, bool) {
    let mut region = radius;
    for _ in 0..=MAX_EXPANSIONS {
        for _ in 0..RETRIES_PER_ROUND {
            let p = sample_disk(rng, center, region);
            if is_spaced(p, placed, BASE_SPACING) {
                return (p, false);
            }
        }
        region *= EXPANSION_FACTOR;
    }

    let mut spacing = BASE_SPACING;
    let mut last = center;
    for _ in 0..MAX_RELAXATIONS {
        spacing *= RELAX_FACTOR;
        for _ in 0..RETRIES_PER_ROUND {
            last = sample_disk(rng, center, region);
            if is_spaced(last, placed, spacing) {
                return (last, true);
            }
        }
    }
    (last, true)
}

/// Строит кварталы и здания
///
/// Под каждое заведение гарантированно ставится здание подходящего типа.
pub fn build_layout(
    rng: &mut SeededRandom,
    size: SettlementSize,
    sites: &[Site],
) -> Result<SettlementLayout> {
    let wards = layout_wards(rng, size, sites)?;

    let (lo, hi) = size.building_range();
    let count = (rng.between(lo, hi) as usize).max(sites.len());
    let weights = building_weights(size);
    let mut kinds: Vec<BuildingKind> = sites.iter().map(|s| s.kind.building_kind()).collect();
    while kinds.len() < count {
        kinds.push(*rng.pick_weighted(&weights)?);
    }

    let mut buildings: Vec<Building> = Vec::with_capacity(count);
    for kind in kinds {
        let ward = if wards.is_empty() {
            None
        } else {
            let affinity = kind.ward_affinity();
            let weighted: Vec<(&Ward, u32)> = wards
                .iter()
                .map(|w| (w, if w.kind == affinity { AFFINITY_WEIGHT } else { 1 }))
                .collect();
            Some(*rng.pick_weighted(&weighted)?)
        };
        let (center, radius) = match ward {
            Some(w) => (w.center, w.radius),
            None => (Point::default(), size.radius() * OPEN_RADIUS),
        };

        let (position, relaxed_spacing) = scatter(rng, center, radius, &buildings);
        let id = rng.id("building");
        if relaxed_spacing {
            warn!(%id, ?kind, "здание поставлено с ослабленным интервалом");
        }
        buildings.push(Building {
            id,
            kind,
            position,
            footprint: footprint(rng, kind),
            ward_id: ward.map(|w| w.id.clone()),
            owner_id: None,
            site_ids: Vec::new(),
            relaxed_spacing,
        });
    }

    debug!(
        wards = wards.len(),
        buildings = buildings.len(),
        "раскладка поселения"
    );
    Ok(SettlementLayout { wards, buildings })
}

/// Связывает заведения со зданиями подходящего типа
///
/// Каждое заведение получает ближайшее к центру свободное здание своего типа.
/// Связь зеркальна: `site.building_id` и `building.site_ids`. Заведения без
/// подходящего здания остаются без привязки.
pub fn link_sites_to_buildings(sites: &mut [Site], buildings: &mut [Building], center: Point) {
    for site in sites.iter_mut() {
        if site.building_id.is_some() {
            continue;
        }
        let wanted = site.kind.building_kind();
        let nearest = buildings
            .iter_mut()
            .filter(|b| b.kind == wanted && b.site_ids.is_empty())
            .min_by(|a, b| {
                a.position
                    .distance(center)
                    .total_cmp(&b.position.distance(center))
            });
        if let Some(building) = nearest {
            building.site_ids.push(site.id.clone());
            site.building_id = Some(building.id.clone());
        }
    }
}
