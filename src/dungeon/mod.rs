//! Пространственные подземелья
//!
//! Подземелье — набор прямоугольных комнат на клеточной сетке, соединённых
//! проходами. Генерация идёт по шагам:
//! 1. Размещение комнат от входа ([`layout`])
//! 2. Проверка связности и глубина комнат ([`connectivity`])
//! 3. Наполнение комнат встречами, сокровищами и ловушками ([`content`])
//! 4. Ключи к запертым проходам ([`keys`])
//!
//! Обитатели подземелья ([`npcs`]) создаются отдельным шагом и живут в мире.

pub mod connectivity;
pub mod content;
pub mod generator;
pub mod grid;
pub mod keys;
pub mod layout;
pub mod npcs;

use crate::hex::{HexCoord, Terrain};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use generator::{DungeonParams, generate_dungeon, pick_dungeon_site, place_dungeon};
pub use keys::place_keys;
pub use npcs::{boss_room, generate_dungeon_npcs};

/// Тема подземелья: структурные и «дикие» логова
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DungeonTheme {
    Tomb,
    Cave,
    Temple,
    Mine,
    Fortress,
    Sewer,
    Crypt,
    Lair,
    Shrine,
    BanditHideout,
    CultistLair,
    WitchHut,
    SeaCave,
    BeastDen,
    FloatingKeep,
}

impl DungeonTheme {
    pub const ALL: [DungeonTheme; 15] = [
        DungeonTheme::Tomb,
        DungeonTheme::Cave,
        DungeonTheme::Temple,
        DungeonTheme::Mine,
        DungeonTheme::Fortress,
        DungeonTheme::Sewer,
        DungeonTheme::Crypt,
        DungeonTheme::Lair,
        DungeonTheme::Shrine,
        DungeonTheme::BanditHideout,
        DungeonTheme::CultistLair,
        DungeonTheme::WitchHut,
        DungeonTheme::SeaCave,
        DungeonTheme::BeastDen,
        DungeonTheme::FloatingKeep,
    ];

    /// Веса для случайного выбора темы на суше
    pub const LAND_WEIGHTS: [(DungeonTheme, u32); 14] = [
        (DungeonTheme::Tomb, 20),
        (DungeonTheme::Cave, 20),
        (DungeonTheme::Temple, 15),
        (DungeonTheme::Mine, 10),
        (DungeonTheme::Fortress, 10),
        (DungeonTheme::Sewer, 5),
        (DungeonTheme::Crypt, 10),
        (DungeonTheme::Lair, 5),
        (DungeonTheme::Shrine, 5),
        (DungeonTheme::BanditHideout, 8),
        (DungeonTheme::CultistLair, 6),
        (DungeonTheme::WitchHut, 5),
        (DungeonTheme::BeastDen, 8),
        (DungeonTheme::FloatingKeep, 2),
    ];

    #[must_use]
    pub fn is_aquatic(self) -> bool {
        matches!(self, DungeonTheme::SeaCave)
    }

    /// Логова в дикой местности (а не рукотворные комплексы)
    #[must_use]
    pub fn is_wilderness(self) -> bool {
        matches!(
            self,
            DungeonTheme::BanditHideout
                | DungeonTheme::CultistLair
                | DungeonTheme::WitchHut
                | DungeonTheme::SeaCave
                | DungeonTheme::BeastDen
                | DungeonTheme::FloatingKeep
        )
    }

    /// На воде допустимы только водные темы
    #[must_use]
    pub fn allowed_on(self, terrain: Terrain) -> bool {
        !terrain.is_water() || self.is_aquatic()
    }

    #[must_use]
    pub fn nouns(self) -> &'static [&'static str] {
        match self {
            DungeonTheme::Tomb => &["Tomb", "Mausoleum", "Barrow", "Sepulcher"],
            DungeonTheme::Cave => &["Cavern", "Grotto", "Caves", "Chasm", "Depths"],
            DungeonTheme::Temple => &["Temple", "Sanctuary", "Chapel", "Cathedral"],
            DungeonTheme::Mine => &["Mines", "Quarry", "Pit", "Excavation"],
            DungeonTheme::Fortress => &["Fortress", "Keep", "Stronghold", "Citadel"],
            DungeonTheme::Sewer => &["Sewers", "Undercity", "Drains", "Warrens"],
            DungeonTheme::Crypt => &["Crypt", "Ossuary", "Vault", "Catacombs"],
            DungeonTheme::Lair => &["Lair", "Den", "Nest", "Burrow"],
            DungeonTheme::Shrine => &["Shrine", "Reliquary", "Oratory"],
            DungeonTheme::BanditHideout => &["Hideout", "Camp", "Refuge"],
            DungeonTheme::CultistLair => &["Conclave", "Coven", "Sanctum"],
            DungeonTheme::WitchHut => &["Hut", "Hovel", "Cottage"],
            DungeonTheme::SeaCave => &["Sea Cave", "Grotto", "Tidal Caves"],
            DungeonTheme::BeastDen => &["Den", "Hollow", "Lair"],
            DungeonTheme::FloatingKeep => &["Keep", "Spire", "Bastion"],
        }
    }

    /// Намёки на содержимое — для слухов
    #[must_use]
    pub fn hints(self) -> &'static [&'static str] {
        match self {
            DungeonTheme::Tomb => &["ancient crypt", "the dead walking", "sealed tombs"],
            DungeonTheme::Cave => &["twisting caverns", "things in the dark", "underground lake"],
            DungeonTheme::Temple => &["profane altar", "dark worship", "corrupted shrine"],
            DungeonTheme::Mine => &["abandoned tunnels", "something they dug up", "collapsed shafts"],
            DungeonTheme::Fortress => &["old battlements", "armored dead", "siege tunnels"],
            DungeonTheme::Sewer => &["flooded tunnels", "things that swim", "forgotten passages"],
            DungeonTheme::Crypt => &["bone-lined walls", "whispering dead", "sealed sarcophagi"],
            DungeonTheme::Lair => &["beast's den", "gnawed bones", "the creature's hoard"],
            DungeonTheme::Shrine => &["sacred relics", "blessed ground", "holy guardians"],
            DungeonTheme::BanditHideout => &["stolen goods", "armed thugs", "hostages"],
            DungeonTheme::CultistLair => &["ritual circles", "chanting", "robed figures"],
            DungeonTheme::WitchHut => &["strange herbs", "bubbling cauldron", "hexed land"],
            DungeonTheme::SeaCave => &["tidal chambers", "drowned dead", "smuggler's cache"],
            DungeonTheme::BeastDen => &["territorial predator", "half-eaten prey", "marked territory"],
            DungeonTheme::FloatingKeep => &["impossible architecture", "warped magic", "sky-touched stones"],
        }
    }

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            DungeonTheme::Tomb => "tomb",
            DungeonTheme::Cave => "cave",
            DungeonTheme::Temple => "temple",
            DungeonTheme::Mine => "mine",
            DungeonTheme::Fortress => "fortress",
            DungeonTheme::Sewer => "sewer",
            DungeonTheme::Crypt => "crypt",
            DungeonTheme::Lair => "lair",
            DungeonTheme::Shrine => "shrine",
            DungeonTheme::BanditHideout => "bandit_hideout",
            DungeonTheme::CultistLair => "cultist_lair",
            DungeonTheme::WitchHut => "witch_hut",
            DungeonTheme::SeaCave => "sea_cave",
            DungeonTheme::BeastDen => "beast_den",
            DungeonTheme::FloatingKeep => "floating_keep",
        }
    }
}

impl fmt::Display for DungeonTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for DungeonTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| format!("unknown dungeon theme: {s}"))
    }
}

/// Класс размера подземелья
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DungeonSize {
    Lair,
    Small,
    Medium,
    Large,
    Megadungeon,
}

impl DungeonSize {
    pub const ALL: [DungeonSize; 5] = [
        DungeonSize::Lair,
        DungeonSize::Small,
        DungeonSize::Medium,
        DungeonSize::Large,
        DungeonSize::Megadungeon,
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            DungeonSize::Lair => "lair",
            DungeonSize::Small => "small",
            DungeonSize::Medium => "medium",
            DungeonSize::Large => "large",
            DungeonSize::Megadungeon => "megadungeon",
        }
    }

    pub const WEIGHTS: [(DungeonSize, u32); 5] = [
        (DungeonSize::Lair, 30),
        (DungeonSize::Small, 35),
        (DungeonSize::Medium, 25),
        (DungeonSize::Large, 8),
        (DungeonSize::Megadungeon, 2),
    ];

    /// Диапазон числа комнат (включительно)
    #[must_use]
    pub fn room_range(self) -> (usize, usize) {
        match self {
            DungeonSize::Lair => (3, 5),
            DungeonSize::Small => (5, 8),
            DungeonSize::Medium => (8, 12),
            DungeonSize::Large => (12, 20),
            DungeonSize::Megadungeon => (20, 30),
        }
    }

    /// Сторона квадратной сетки по умолчанию
    #[must_use]
    pub fn grid_size(self) -> i32 {
        match self {
            DungeonSize::Lair => 40,
            DungeonSize::Small => 60,
            DungeonSize::Medium => 80,
            DungeonSize::Large => 100,
            DungeonSize::Megadungeon => 150,
        }
    }

    /// Только у крупных подземелий есть отдельный выход
    #[must_use]
    pub fn has_exit(self) -> bool {
        matches!(self, DungeonSize::Large | DungeonSize::Megadungeon)
    }
}

impl FromStr for DungeonSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.slug() == s)
            .ok_or_else(|| format!("unknown dungeon size: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Entrance,
    Exit,
    Corridor,
    Chamber,
    Shrine,
    Treasury,
    Prison,
    Lair,
    TrapRoom,
}

impl RoomType {
    /// Типы, которые не переопределяются геометрией комнаты
    #[must_use]
    pub fn is_special(self) -> bool {
        matches!(
            self,
            RoomType::Entrance
                | RoomType::Exit
                | RoomType::Treasury
                | RoomType::Shrine
                | RoomType::Prison
                | RoomType::TrapRoom
        )
    }

    #[must_use]
    pub fn names(self) -> &'static [&'static str] {
        match self {
            RoomType::Entrance => &["Entry Hall", "Gatehouse", "Antechamber", "Foyer"],
            RoomType::Exit => &["Secret Exit", "Escape Tunnel", "Back Door", "Hidden Egress"],
            RoomType::Corridor => &["Passage", "Hallway", "Tunnel"],
            RoomType::Chamber => &["Chamber", "Hall", "Room", "Vault"],
            RoomType::Lair => &["Lair", "Den", "Nest", "Burrow"],
            RoomType::TrapRoom => &["Death Corridor", "Gauntlet", "Testing Ground"],
            RoomType::Treasury => &["Treasury", "Vault", "Hoard Room"],
            RoomType::Shrine => &["Shrine", "Chapel", "Altar Room", "Sanctuary"],
            RoomType::Prison => &["Dungeon Cells", "Oubliette", "Prison Block"],
        }
    }
}

/// Класс размера комнаты
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomSize {
    Cramped,
    Small,
    Medium,
    Large,
    Vast,
}

impl RoomSize {
    /// Диапазон стороны комнаты в клетках
    #[must_use]
    pub fn dims(self) -> (i32, i32) {
        match self {
            RoomSize::Cramped => (2, 3),
            RoomSize::Small => (3, 4),
            RoomSize::Medium => (4, 6),
            RoomSize::Large => (5, 8),
            RoomSize::Vast => (6, 9),
        }
    }

    /// На одну ступень меньше (`Cramped` остаётся собой)
    #[must_use]
    pub fn smaller(self) -> Self {
        match self {
            RoomSize::Vast => RoomSize::Large,
            RoomSize::Large => RoomSize::Medium,
            RoomSize::Medium => RoomSize::Small,
            RoomSize::Small | RoomSize::Cramped => RoomSize::Cramped,
        }
    }

    /// Диапазон численности встречи
    #[must_use]
    pub fn encounter_count(self) -> (i32, i32) {
        match self {
            RoomSize::Cramped => (1, 2),
            RoomSize::Small => (1, 3),
            RoomSize::Medium => (2, 4),
            RoomSize::Large => (3, 6),
            RoomSize::Vast => (4, 8),
        }
    }
}

/// Форма комнаты по пропорциям
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomGeometry {
    Corridor,
    Alcove,
    Gallery,
    Chamber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Прямоугольник на сетке: `[x, x + width) × [y, y + height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl GridRect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Центр в удвоенных координатах (без дробей)
    #[must_use]
    pub fn center2(&self) -> (i32, i32) {
        (2 * self.x + self.width, 2 * self.y + self.height)
    }

    #[must_use]
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Прямоугольник, расширенный на `margin` клеток во все стороны
    #[must_use]
    pub fn inflate(&self, margin: i32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    /// Точка внутри комнаты или в соседней клетке
    #[must_use]
    pub fn touches(&self, p: GridPoint) -> bool {
        self.inflate(1).contains(p)
    }

    #[must_use]
    pub fn geometry(&self) -> RoomGeometry {
        let long = self.width.max(self.height) as f32;
        let short = self.width.min(self.height).max(1) as f32;
        let aspect = long / short;
        let area = self.area();
        if aspect >= 2.0 && area <= 12 {
            RoomGeometry::Corridor
        } else if area <= 6 {
            RoomGeometry::Alcove
        } else if aspect >= 1.5 && area >= 20 {
            RoomGeometry::Gallery
        } else {
            RoomGeometry::Chamber
        }
    }
}

/// Поведение встреченных существ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Hostile,
    Neutral,
    Negotiable,
    Fleeing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub creature: String,
    pub count: u32,
    pub behavior: Behavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreasureKind {
    Coins,
    Gems,
    Art,
    Item,
    MagicItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treasure {
    pub kind: TreasureKind,
    pub description: String,
}

/// Ловушка или опасность (в комнате или в проходе)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub name: String,
    pub damage: String,
    pub save: String,
    #[serde(default)]
    pub disarmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub size: RoomSize,
    pub geometry: RoomGeometry,
    /// Число переходов от входа
    pub depth: u32,
    pub bounds: GridRect,
    #[serde(default)]
    pub encounters: Vec<Encounter>,
    #[serde(default)]
    pub treasure: Vec<Treasure>,
    #[serde(default)]
    pub hazards: Vec<Hazard>,
    #[serde(default)]
    pub explored: bool,
    #[serde(default)]
    pub dead_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Open,
    Door,
    Secret,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub from_room_id: String,
    pub to_room_id: String,
    /// Ломаная из осевых отрезков: первая и последняя точки примыкают к комнатам
    pub waypoints: Vec<GridPoint>,
    pub connection: ConnectionType,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
    /// Ключ, открывающий запертый проход
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trap: Option<Hazard>,
}

/// Ключ к запертому проходу. Лежит в комнате, достижимой до замка.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonKey {
    pub id: String,
    pub name: String,
    pub room_id: String,
    pub passage_id: String,
}

/// Подземелье как локация на карте
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialDungeon {
    pub id: String,
    pub name: String,
    pub description: String,
    pub hex_coord: HexCoord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,

    pub theme: DungeonTheme,
    pub size: DungeonSize,
    pub grid_width: i32,
    pub grid_height: i32,
    pub rooms: Vec<Room>,
    pub passages: Vec<Passage>,
    #[serde(default)]
    pub keys: Vec<DungeonKey>,
    pub entrance_room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_room_id: Option<String>,
}

impl SpatialDungeon {
    #[must_use]
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn key(&self, id: &str) -> Option<&DungeonKey> {
        self.keys.iter().find(|k| k.id == id)
    }

    /// Сетка занятости, восстановленная по комнатам и проходам
    #[must_use]
    pub fn occupancy(&self) -> grid::OccupancyGrid {
        let mut grid = grid::OccupancyGrid::new(self.grid_width, self.grid_height);
        for room in &self.rooms {
            grid.mark_room(&room.bounds);
        }
        for passage in &self.passages {
            grid.mark_path(&passage.waypoints);
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_admits_only_aquatic_themes() {
        for theme in DungeonTheme::ALL {
            assert_eq!(theme.allowed_on(Terrain::Water), theme.is_aquatic());
            assert!(theme.allowed_on(Terrain::Hills));
        }
    }

    #[test]
    fn slugs_parse_back() {
        for theme in DungeonTheme::ALL {
            assert_eq!(theme.slug().parse::<DungeonTheme>(), Ok(theme));
        }
        assert_eq!("megadungeon".parse::<DungeonSize>(), Ok(DungeonSize::Megadungeon));
        assert!("castle".parse::<DungeonTheme>().is_err());
    }

    #[test]
    fn geometry_classification() {
        assert_eq!(GridRect::new(0, 0, 6, 2).geometry(), RoomGeometry::Corridor);
        assert_eq!(GridRect::new(0, 0, 2, 3).geometry(), RoomGeometry::Alcove);
        assert_eq!(GridRect::new(0, 0, 8, 5).geometry(), RoomGeometry::Gallery);
        assert_eq!(GridRect::new(0, 0, 5, 5).geometry(), RoomGeometry::Chamber);
    }

    #[test]
    fn touches_includes_adjacent_cells() {
        let r = GridRect::new(2, 2, 3, 3);
        assert!(r.touches(GridPoint::new(5, 3)));
        assert!(r.touches(GridPoint::new(1, 1)));
        assert!(!r.touches(GridPoint::new(6, 3)));
    }
}
