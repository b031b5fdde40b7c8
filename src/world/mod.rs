//! Мир кампании: агрегат из плоских таблиц сущностей
//!
//! Сущности ссылаются друг на друга только по id. Все операции над миром
//! принимают `&WorldData` и возвращают новое значение:
//! - сборка мира из параметров ([`generate`])
//! - очистка и перегенерация одного гекса ([`regenerate`])
//! - проверка ссылочной целостности ([`integrity`])

pub mod generate;
pub mod integrity;
pub mod regenerate;

use crate::calendar::WorldState;
use crate::dungeon::SpatialDungeon;
use crate::faction::{Clock, Faction, Hook};
use crate::hex::{Hex, HexCoord};
use crate::landmark::Landmark;
use crate::npc::Npc;
use crate::settlement::SpatialSettlement;
use crate::table::{Keyed, Table};
use serde::{Deserialize, Serialize};

pub use generate::generate_world;
pub use integrity::check_integrity;
pub use regenerate::{RegenTarget, Regeneration, clear_location, regenerate};

/// Локация на гексе
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Location {
    Settlement(SpatialSettlement),
    Dungeon(SpatialDungeon),
    Landmark(Landmark),
}

impl Location {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Location::Settlement(s) => &s.id,
            Location::Dungeon(d) => &d.id,
            Location::Landmark(l) => &l.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Location::Settlement(s) => &s.name,
            Location::Dungeon(d) => &d.name,
            Location::Landmark(l) => &l.name,
        }
    }

    #[must_use]
    pub fn hex_coord(&self) -> HexCoord {
        match self {
            Location::Settlement(s) => s.hex_coord,
            Location::Dungeon(d) => d.hex_coord,
            Location::Landmark(l) => l.hex_coord,
        }
    }

    #[must_use]
    pub fn faction_id(&self) -> Option<&str> {
        match self {
            Location::Settlement(s) => s.faction_id.as_deref(),
            Location::Dungeon(d) => d.faction_id.as_deref(),
            Location::Landmark(l) => l.faction_id.as_deref(),
        }
    }

    pub fn set_faction_id(&mut self, faction_id: Option<String>) {
        match self {
            Location::Settlement(s) => s.faction_id = faction_id,
            Location::Dungeon(d) => d.faction_id = faction_id,
            Location::Landmark(l) => l.faction_id = faction_id,
        }
    }

    #[must_use]
    pub fn as_settlement(&self) -> Option<&SpatialSettlement> {
        match self {
            Location::Settlement(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_dungeon(&self) -> Option<&SpatialDungeon> {
        match self {
            Location::Dungeon(d) => Some(d),
            _ => None,
        }
    }
}

impl Keyed for Location {
    type Key = String;

    fn key(&self) -> String {
        self.id().to_string()
    }
}

/// Снимок мира кампании
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldData {
    pub id: String,
    pub name: String,
    /// Сид мира; все производные сиды строятся от него
    pub seed: String,
    #[serde(default)]
    pub state: WorldState,
    pub hexes: Table<Hex>,
    pub locations: Table<Location>,
    #[serde(default)]
    pub npcs: Table<Npc>,
    #[serde(default)]
    pub factions: Table<Faction>,
    #[serde(default)]
    pub hooks: Table<Hook>,
    #[serde(default)]
    pub clocks: Table<Clock>,
    /// Счётчик перегенераций, входит в сид каждой перегенерации
    #[serde(default)]
    pub regen_nonce: u64,
}

impl WorldData {
    /// Пустой мир без гексов
    #[must_use]
    pub fn empty(id: &str, name: &str, seed: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            seed: seed.to_string(),
            state: WorldState::default(),
            hexes: Table::new(),
            locations: Table::new(),
            npcs: Table::new(),
            factions: Table::new(),
            hooks: Table::new(),
            clocks: Table::new(),
            regen_nonce: 0,
        }
    }

    /// Локация, стоящая на гексе
    #[must_use]
    pub fn location_at(&self, coord: HexCoord) -> Option<&Location> {
        let id = self.hexes.get(&coord)?.location_id.as_deref()?;
        self.locations.get(id)
    }

    pub fn settlements(&self) -> impl Iterator<Item = &SpatialSettlement> {
        self.locations.iter().filter_map(Location::as_settlement)
    }

    pub fn dungeons(&self) -> impl Iterator<Item = &SpatialDungeon> {
        self.locations.iter().filter_map(Location::as_dungeon)
    }

    /// Жители локации
    pub fn npcs_at<'a>(&'a self, location_id: &'a str) -> impl Iterator<Item = &'a Npc> {
        self.npcs.iter().filter(move |n| n.location_id == location_id)
    }

    /// Ставит локацию на её гекс. Гекс должен существовать и быть свободным.
    pub(crate) fn place(&mut self, location: Location) {
        if let Some(hex) = self.hexes.get_mut(&location.hex_coord()) {
            hex.location_id = Some(location.id().to_string());
        }
        self.locations.insert(location);
    }
}
