//! Заведения поселения: трактиры, храмы, лавки

use super::{Service, SettlementSize, Site, SiteKind, SpatialSettlement};
use crate::error::Result;
use crate::random::{SeededRandom, derive_seed};

fn name_parts(kind: SiteKind) -> (&'static [&'static str], &'static [&'static str]) {
    match kind {
        SiteKind::Inn => (
            &["The Weary", "The Golden", "The Silver", "The Red", "The Black", "The Wandering"],
            &["Traveler", "Dragon", "Stag", "Lion", "Horse", "Crown", "Shield"],
        ),
        SiteKind::Tavern => (
            &["The Rusty", "The Drunken", "The Jolly", "The Dancing", "The Broken"],
            &["Tankard", "Barrel", "Goblin", "Orc", "Sailor", "Mug"],
        ),
        SiteKind::Temple => (
            &["Temple of", "Shrine of", "Chapel of", "Sanctum of"],
            &["the Light", "the Dawn", "the Flame", "the Earth", "the Storm"],
        ),
        SiteKind::Market => (
            &["Central", "Old", "Grand", "Farmer's"],
            &["Market", "Square", "Bazaar"],
        ),
        SiteKind::Blacksmith => (
            &["Iron", "Steel", "Forge of", "Hammer and"],
            &["Anvil", "Fire", "Arms", "Blades"],
        ),
        SiteKind::GeneralStore => (
            &["Honest", "Old", "Reliable", "Town"],
            &["Goods", "Provisions", "Trading Post", "Supply"],
        ),
        SiteKind::GuildHall => (
            &["Hall of", "House of"],
            &["Merchants", "Craftsmen", "Artisans", "Traders"],
        ),
        SiteKind::NobleEstate => (
            &["House", "Manor of", "Estate of"],
            &["Goldwyn", "Blackwood", "Ravencrest", "Thornwood"],
        ),
    }
}

/// (услуга, цена)
fn services(kind: SiteKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        SiteKind::Inn => &[
            ("Room (common)", "5 sp/night"),
            ("Room (private)", "2 gp/night"),
            ("Meal", "5 cp"),
            ("Stabling", "5 sp/night"),
        ],
        SiteKind::Tavern => &[("Ale", "4 cp"), ("Wine", "2 sp"), ("Meal", "1 sp")],
        SiteKind::Temple => &[
            ("Healing (1d8)", "10 gp"),
            ("Cure Disease", "50 gp"),
            ("Remove Curse", "100 gp"),
            ("Blessing", "5 gp"),
        ],
        SiteKind::Market => &[("General Goods", "Varies"), ("Food & Supplies", "Varies")],
        SiteKind::Blacksmith => &[
            ("Weapon Repair", "5 gp"),
            ("Armor Repair", "10 gp"),
            ("Horseshoes", "1 gp"),
            ("Custom Work", "Varies"),
        ],
        SiteKind::GeneralStore => &[
            ("Adventuring Gear", "Varies"),
            ("Rations", "5 sp/day"),
            ("Torches (10)", "1 gp"),
            ("Rope (50ft)", "1 gp"),
        ],
        SiteKind::GuildHall => &[("Contracts", "Varies"), ("Information", "5 gp")],
        SiteKind::NobleEstate => &[("Audience", "By appointment")],
    }
}

fn descriptions(kind: SiteKind) -> &'static [&'static str] {
    match kind {
        SiteKind::Inn => &[
            "A cozy establishment with warm beds and hot meals",
            "A well-maintained inn popular with travelers",
            "A rustic lodge with a roaring fireplace",
        ],
        SiteKind::Tavern => &[
            "A smoky drinking hall filled with locals",
            "A rowdy establishment known for its strong ale",
            "A dimly lit bar where secrets are traded",
        ],
        SiteKind::Temple => &[
            "A grand stone structure with soaring spires",
            "A humble house of worship",
            "An ancient holy site maintained by devoted clergy",
        ],
        SiteKind::Market => &[
            "A bustling open-air market",
            "A covered marketplace with permanent stalls",
            "A lively trading square",
        ],
        SiteKind::Blacksmith => &[
            "A busy forge with the ring of hammers",
            "A soot-covered workshop",
            "A well-equipped smithy",
        ],
        SiteKind::GeneralStore => &[
            "A cramped shop packed with goods",
            "A well-organized store with helpful staff",
            "A dusty emporium selling everything imaginable",
        ],
        SiteKind::GuildHall => &[
            "An impressive building adorned with guild symbols",
            "A busy hall where merchants conduct business",
            "A stately headquarters for local craftsmen",
        ],
        SiteKind::NobleEstate => &[
            "A grand manor behind iron gates",
            "An elegant townhouse with manicured grounds",
            "A fortified estate overlooking the settlement",
        ],
    }
}

const QUIRKS: &[&str] = &[
    "The owner is unusually secretive",
    "A strange smell permeates the building",
    "The staff speaks in hushed tones",
    "An unusual pet roams the premises",
    "The building creaks ominously at night",
    "Locals avoid this place for unknown reasons",
    "The prices here change with the owner's mood",
    "A faded portrait watches visitors",
];

const SECRETS: &[&str] = &[
    "A hidden cellar leads to old tunnels",
    "The owner is secretly a spy",
    "Stolen goods are hidden in a back room",
    "A cult meets here after dark",
    "A ghost haunts the upper floors",
    "The building sits atop an ancient tomb",
    "A wanted criminal hides among the staff",
    "Smuggled goods pass through here regularly",
];

fn generate_site(rng: &mut SeededRandom, kind: SiteKind) -> Result<Site> {
    let (prefixes, suffixes) = name_parts(kind);
    let name = format!("{} {}", rng.pick(prefixes)?, rng.pick(suffixes)?);
    let description = (*rng.pick(descriptions(kind))?).to_string();

    let rumor_source = matches!(kind, SiteKind::Inn | SiteKind::Tavern) || rng.chance(0.3);
    let notice_board = matches!(
        kind,
        SiteKind::Market | SiteKind::GuildHall | SiteKind::Inn
    ) || rng.chance(0.2);
    let quirk = if rng.chance(0.3) {
        Some((*rng.pick(QUIRKS)?).to_string())
    } else {
        None
    };
    let secret = if rng.chance(0.15) {
        Some((*rng.pick(SECRETS)?).to_string())
    } else {
        None
    };

    Ok(Site {
        id: rng.id("site"),
        kind,
        name,
        description,
        services: services(kind)
            .iter()
            .map(|&(name, cost)| Service {
                name: name.to_string(),
                cost: cost.to_string(),
            })
            .collect(),
        owner_id: None,
        staff_ids: Vec::new(),
        building_id: None,
        quirk,
        secret,
        rumor_source,
        notice_board,
    })
}

/// Генерирует заведения поселения по его размеру
///
/// Постоялый двор (или таверна) есть всегда, если доступен для размера.
/// В мелких поселениях виды не повторяются, в городах повторы допустимы.
pub fn generate_sites(seed: &str, settlement: &SpatialSettlement) -> Result<Vec<Site>> {
    let mut rng = SeededRandom::new(derive_seed(seed, "sites", &settlement.id));
    let available = settlement.size.site_kinds();
    let (lo, hi) = settlement.size.site_count();
    let count = rng.between(lo, hi) as usize;

    let mut sites = Vec::with_capacity(count);
    let mut used: Vec<SiteKind> = Vec::new();

    let lodging = if available.contains(&SiteKind::Inn) {
        Some(SiteKind::Inn)
    } else if available.contains(&SiteKind::Tavern) {
        Some(SiteKind::Tavern)
    } else {
        None
    };
    if let Some(kind) = lodging {
        sites.push(generate_site(&mut rng, kind)?);
        used.push(kind);
    }

    let allow_repeats = matches!(settlement.size, SettlementSize::Town | SettlementSize::City);
    while sites.len() < count {
        let candidates: Vec<SiteKind> = available
            .iter()
            .copied()
            .filter(|k| allow_repeats || !used.contains(k))
            .collect();
        let Ok(&kind) = rng.pick(&candidates) else {
            break;
        };
        sites.push(generate_site(&mut rng, kind)?);
        used.push(kind);
    }
    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{Hex, HexCoord, Terrain};
    use crate::settlement::generator::generate_settlement;

    fn settlement(size: SettlementSize) -> SpatialSettlement {
        let hex = Hex::new(HexCoord::new(0, 0), Terrain::Plains);
        generate_settlement("sites", &hex, Some(size)).unwrap()
    }

    #[test]
    fn lodging_is_always_present() {
        for size in SettlementSize::ALL {
            let s = settlement(size);
            let sites = generate_sites("sites", &s).unwrap();
            assert_eq!(sites[0].kind, SiteKind::Inn, "{size}");
            assert!(sites[0].rumor_source);
        }
    }

    #[test]
    fn small_settlements_do_not_repeat_kinds() {
        let s = settlement(SettlementSize::Village);
        let sites = generate_sites("unique", &s).unwrap();
        for (i, a) in sites.iter().enumerate() {
            for b in &sites[i + 1..] {
                assert_ne!(a.kind, b.kind);
            }
        }
    }

    #[test]
    fn site_count_within_range() {
        let s = settlement(SettlementSize::City);
        let sites = generate_sites("count", &s).unwrap();
        let (lo, hi) = SettlementSize::City.site_count();
        assert!((lo as usize..=hi as usize).contains(&sites.len()));
    }
}
