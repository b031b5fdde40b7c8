//! Поселения: раскладка кварталов и зданий, дороги, заведения, жители, слухи
//!
//! Конвейер генерации поселения:
//! 1. Базовые свойства (размер, население, управление) — [`generator`]
//! 2. Заведения — [`sites`]
//! 3. Кварталы и здания с учётом заведений — [`layout`]
//! 4. Дорожный граф — [`roads`]
//! 5. Жители и их дома — [`npcs`]
//! 6. Слухи и объявления (нужен контекст мира) — [`rumors`]

pub mod generator;
pub mod layout;
pub mod npcs;
pub mod roads;
pub mod rumors;
pub mod sites;

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use generator::{
    SettlementPlacement, generate_settlement, place_settlement, populate_settlement,
};
pub use layout::link_sites_to_buildings;
pub use npcs::{SettlementNpcs, assign_npcs_to_buildings, generate_settlement_npcs};
pub use rumors::{RumorContext, generate_notices, generate_rumors};
pub use sites::generate_sites;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementSize {
    Thorpe,
    Hamlet,
    Village,
    Town,
    City,
}

impl SettlementSize {
    pub const ALL: [SettlementSize; 5] = [
        SettlementSize::Thorpe,
        SettlementSize::Hamlet,
        SettlementSize::Village,
        SettlementSize::Town,
        SettlementSize::City,
    ];

    pub const WEIGHTS: [(SettlementSize, u32); 5] = [
        (SettlementSize::Thorpe, 10),
        (SettlementSize::Hamlet, 25),
        (SettlementSize::Village, 40),
        (SettlementSize::Town, 20),
        (SettlementSize::City, 5),
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            SettlementSize::Thorpe => "thorpe",
            SettlementSize::Hamlet => "hamlet",
            SettlementSize::Village => "village",
            SettlementSize::Town => "town",
            SettlementSize::City => "city",
        }
    }

    #[must_use]
    pub fn population_range(self) -> (i32, i32) {
        match self {
            SettlementSize::Thorpe => (10, 50),
            SettlementSize::Hamlet => (50, 200),
            SettlementSize::Village => (200, 1000),
            SettlementSize::Town => (1000, 5000),
            SettlementSize::City => (5000, 25000),
        }
    }

    /// Число зданий (включительно)
    #[must_use]
    pub fn building_range(self) -> (i32, i32) {
        match self {
            SettlementSize::Thorpe => (4, 7),
            SettlementSize::Hamlet => (8, 14),
            SettlementSize::Village => (15, 30),
            SettlementSize::Town => (35, 60),
            SettlementSize::City => (70, 120),
        }
    }

    /// Число кварталов; у мелких поселений кварталов нет
    #[must_use]
    pub fn ward_range(self) -> Option<(i32, i32)> {
        match self {
            SettlementSize::Thorpe | SettlementSize::Hamlet | SettlementSize::Village => None,
            SettlementSize::Town => Some((4, 6)),
            SettlementSize::City => Some((8, 12)),
        }
    }

    /// Радиус застройки
    #[must_use]
    pub fn radius(self) -> f64 {
        match self {
            SettlementSize::Thorpe => 40.0,
            SettlementSize::Hamlet => 60.0,
            SettlementSize::Village => 90.0,
            SettlementSize::Town => 140.0,
            SettlementSize::City => 220.0,
        }
    }

    /// Виды заведений, доступные поселению этого размера
    #[must_use]
    pub fn site_kinds(self) -> &'static [SiteKind] {
        use SiteKind::{
            Blacksmith, GeneralStore, GuildHall, Inn, Market, NobleEstate, Tavern, Temple,
        };
        match self {
            SettlementSize::Thorpe => &[Inn, Market],
            SettlementSize::Hamlet => &[Inn, Tavern, Market, Blacksmith],
            SettlementSize::Village => &[Inn, Tavern, Temple, Market, Blacksmith, GeneralStore],
            SettlementSize::Town => &[
                Inn,
                Tavern,
                Temple,
                Market,
                Blacksmith,
                GeneralStore,
                GuildHall,
            ],
            SettlementSize::City => &[
                Inn,
                Tavern,
                Temple,
                Market,
                Blacksmith,
                GeneralStore,
                GuildHall,
                NobleEstate,
            ],
        }
    }

    #[must_use]
    pub fn site_count(self) -> (i32, i32) {
        match self {
            SettlementSize::Thorpe => (1, 2),
            SettlementSize::Hamlet => (2, 3),
            SettlementSize::Village => (3, 5),
            SettlementSize::Town => (5, 8),
            SettlementSize::City => (8, 12),
        }
    }
}

impl fmt::Display for SettlementSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SettlementSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.slug() == s)
            .ok_or_else(|| format!("unknown settlement size: {s}"))
    }
}

/// Народ, населяющий поселение
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Folk {
    Human,
    Dwarven,
    Elven,
    Goblin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Government {
    Elder,
    Mayor,
    Council,
    Lord,
    Guild,
    Theocracy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Welcoming,
    Prosperous,
    Struggling,
    Fearful,
    Secretive,
    Hostile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defenses {
    None,
    Militia,
    Guards,
    Walls,
    Fortified,
}

/// Точка плана поселения (центр — начало координат)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WardKind {
    Market,
    Residential,
    Craftsmen,
    Merchant,
    Temple,
    Tavern,
    Castle,
    Slum,
    Park,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ward {
    pub id: String,
    pub kind: WardKind,
    pub center: Point,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    House,
    Shop,
    Workshop,
    Tavern,
    Temple,
    Hall,
    Manor,
}

impl BuildingKind {
    /// Квартал, в котором такое здание уместнее всего
    #[must_use]
    pub fn ward_affinity(self) -> WardKind {
        match self {
            BuildingKind::House => WardKind::Residential,
            BuildingKind::Shop => WardKind::Merchant,
            BuildingKind::Workshop => WardKind::Craftsmen,
            BuildingKind::Tavern => WardKind::Tavern,
            BuildingKind::Temple => WardKind::Temple,
            BuildingKind::Hall => WardKind::Market,
            BuildingKind::Manor => WardKind::Castle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub kind: BuildingKind,
    pub position: Point,
    /// Ширина и глубина
    pub footprint: (f64, f64),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub site_ids: Vec<String>,
    /// Поставлено с ослабленным минимальным расстоянием
    #[serde(default)]
    pub relaxed_spacing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteKind {
    Inn,
    Tavern,
    Temple,
    Blacksmith,
    GeneralStore,
    Market,
    GuildHall,
    NobleEstate,
}

impl SiteKind {
    /// Тип здания, способного вместить заведение
    #[must_use]
    pub fn building_kind(self) -> BuildingKind {
        match self {
            SiteKind::Inn | SiteKind::Tavern => BuildingKind::Tavern,
            SiteKind::Temple => BuildingKind::Temple,
            SiteKind::Blacksmith => BuildingKind::Workshop,
            SiteKind::GeneralStore | SiteKind::Market => BuildingKind::Shop,
            SiteKind::GuildHall => BuildingKind::Hall,
            SiteKind::NobleEstate => BuildingKind::Manor,
        }
    }

    #[must_use]
    pub fn is_lodging(self) -> bool {
        matches!(self, SiteKind::Inn)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub kind: SiteKind,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub staff_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quirk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub rumor_source: bool,
    #[serde(default)]
    pub notice_board: bool,
}

/// Узел дорожного графа
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum RoadNode {
    Center,
    Ward(String),
    Building(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadEdge {
    pub from: RoadNode,
    pub to: RoadNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rumor {
    pub id: String,
    pub text: String,
    pub is_true: bool,
    /// Имя заведения или персонажа, от которого слышно
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_hook_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_location_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Bounty,
    Job,
    Warning,
    Announcement,
    Request,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_hook_id: Option<String>,
}

/// Поселение как локация на карте
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialSettlement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub hex_coord: HexCoord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,

    pub size: SettlementSize,
    pub folk: Folk,
    pub population: u32,
    pub government: Government,
    pub mood: Mood,
    pub defenses: Defenses,
    pub trouble: String,
    pub quirk: String,

    pub center: Point,
    pub radius: f64,
    #[serde(default)]
    pub wards: Vec<Ward>,
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub roads: Vec<RoadEdge>,
    #[serde(default)]
    pub npc_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mayor_npc_id: Option<String>,
    #[serde(default)]
    pub rumors: Vec<Rumor>,
    #[serde(default)]
    pub notices: Vec<Notice>,
}

impl SpatialSettlement {
    #[must_use]
    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn site(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }
}
