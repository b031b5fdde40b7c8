//! Ориентиры: именованные точки интереса без внутренних сущностей

use crate::error::{GenError, Result};
use crate::hex::{Hex, HexCoord, Terrain};
use crate::random::{SeededRandom, derive_seed};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkKind {
    Ruins,
    StandingStones,
    AncientTree,
    Battlefield,
    Monolith,
    Tower,
    Waterfall,
    Shipwreck,
}

impl LandmarkKind {
    pub const ALL: [LandmarkKind; 8] = [
        LandmarkKind::Ruins,
        LandmarkKind::StandingStones,
        LandmarkKind::AncientTree,
        LandmarkKind::Battlefield,
        LandmarkKind::Monolith,
        LandmarkKind::Tower,
        LandmarkKind::Waterfall,
        LandmarkKind::Shipwreck,
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            LandmarkKind::Ruins => "ruins",
            LandmarkKind::StandingStones => "standing_stones",
            LandmarkKind::AncientTree => "ancient_tree",
            LandmarkKind::Battlefield => "battlefield",
            LandmarkKind::Monolith => "monolith",
            LandmarkKind::Tower => "tower",
            LandmarkKind::Waterfall => "waterfall",
            LandmarkKind::Shipwreck => "shipwreck",
        }
    }

    #[must_use]
    pub fn allowed_on(self, terrain: Terrain) -> bool {
        match self {
            LandmarkKind::Shipwreck => terrain == Terrain::Water,
            LandmarkKind::Waterfall => matches!(terrain, Terrain::Hills | Terrain::Mountains),
            LandmarkKind::AncientTree => {
                matches!(terrain, Terrain::Forest | Terrain::Swamp | Terrain::Plains)
            }
            _ => !terrain.is_water(),
        }
    }

    fn names(self) -> &'static [&'static str] {
        match self {
            LandmarkKind::Ruins => &["Fallen Keep", "Broken Arches", "Sunken Hall"],
            LandmarkKind::StandingStones => &["Whispering Stones", "Ring of Nine", "Grey Sentinels"],
            LandmarkKind::AncientTree => &["Elder Oak", "Hanging Tree", "Weeping Ash"],
            LandmarkKind::Battlefield => &["Field of Crows", "Last Stand", "Red Meadow"],
            LandmarkKind::Monolith => &["Black Spire", "Carved Pillar", "Singing Obelisk"],
            LandmarkKind::Tower => &["Lonely Tower", "Wizard's Folly", "Signal Tower"],
            LandmarkKind::Waterfall => &["Silver Veil", "Thunder Falls", "Maiden's Tears"],
            LandmarkKind::Shipwreck => &["Drowned Galley", "Broken Keel", "Ghost Hull"],
        }
    }

    fn details(self) -> &'static [&'static str] {
        match self {
            LandmarkKind::Ruins => &[
                "Moss-covered walls hint at a forgotten lordship.",
                "Scorch marks still stain the collapsed gatehouse.",
            ],
            LandmarkKind::StandingStones => &[
                "The stones hum faintly at dusk.",
                "No bird will land inside the circle.",
            ],
            LandmarkKind::AncientTree => &[
                "Offerings hang from its lowest branches.",
                "Its roots have swallowed an old cart whole.",
            ],
            LandmarkKind::Battlefield => &[
                "Rusted blades still turn up after every rain.",
                "Locals refuse to graze their sheep here.",
            ],
            LandmarkKind::Monolith => &[
                "Its carvings shift when no one is looking.",
                "The stone is warm even in winter.",
            ],
            LandmarkKind::Tower => &[
                "A light burns at the top on moonless nights.",
                "The door has no handle on the outside.",
            ],
            LandmarkKind::Waterfall => &[
                "A cave mouth hides behind the falling water.",
                "Rainbows hang over the pool at noon.",
            ],
            LandmarkKind::Shipwreck => &[
                "The figurehead still faces the shore.",
                "At low water the hold can be reached on foot.",
            ],
        }
    }
}

impl fmt::Display for LandmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for LandmarkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.slug() == s)
            .ok_or_else(|| format!("unknown landmark kind: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: String,
    pub name: String,
    pub description: String,
    pub hex_coord: HexCoord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub kind: LandmarkKind,
}

/// Генерирует ориентир на гексе; без явного вида выбирается допустимый
pub fn generate_landmark(seed: &str, hex: &Hex, kind: Option<LandmarkKind>) -> Result<Landmark> {
    let mut rng = SeededRandom::new(derive_seed(seed, "landmark", hex.coord));
    let kind = match kind {
        Some(k) if k.allowed_on(hex.terrain) => k,
        Some(k) => {
            return Err(GenError::invalid_placement(format!(
                "{k} cannot be placed on {:?} at {}",
                hex.terrain, hex.coord
            )));
        }
        None => {
            let allowed: Vec<LandmarkKind> = LandmarkKind::ALL
                .into_iter()
                .filter(|k| k.allowed_on(hex.terrain))
                .collect();
            *rng.pick(&allowed)?
        }
    };
    Ok(Landmark {
        id: rng.id("landmark"),
        name: format!("The {}", rng.pick(kind.names())?),
        description: (*rng.pick(kind.details())?).to_string(),
        hex_coord: hex.coord,
        faction_id: None,
        tags: vec![kind.slug().to_string()],
        kind,
    })
}

/// Ставит ориентир на случайный свободный гекс
pub fn place_landmark(seed: &str, hexes: &Table<Hex>) -> Result<Option<Landmark>> {
    let mut rng = SeededRandom::new(derive_seed(seed, "landmark", "placement"));
    let free: Vec<&Hex> = hexes.iter().filter(|h| h.location_id.is_none()).collect();
    let Ok(&hex) = rng.pick(&free) else {
        return Ok(None);
    };
    generate_landmark(seed, hex, None).map(Some)
}
