//! Статические таблицы: существа, впечатления от местности
//!
//! Генераторы читают данные только через трейт [`DataSource`], поэтому набор
//! таблиц можно подменить (например, для другого сеттинга).

use crate::dungeon::DungeonTheme;
use crate::hex::Terrain;
use serde::Serialize;

/// Запись таблицы случайных встреч
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatureEntry {
    pub name: &'static str,
    pub slug: &'static str,
    /// Примерная сложность
    pub level: u8,
    pub weight: u32,
    /// Минимум и максимум особей
    pub count: (u8, u8),
}

/// Источник статических таблиц для генераторов
pub trait DataSource: Sync {
    fn terrain_creatures(&self, terrain: Terrain) -> &[CreatureEntry];
    fn theme_creatures(&self, theme: DungeonTheme) -> &[&'static str];
    fn terrain_impressions(&self, terrain: Terrain) -> &[&'static str];
}

/// Встроенные таблицы
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinData;

const fn creature(
    name: &'static str,
    slug: &'static str,
    level: u8,
    weight: u32,
    count: (u8, u8),
) -> CreatureEntry {
    CreatureEntry {
        name,
        slug,
        level,
        weight,
        count,
    }
}

const PLAINS_CREATURES: &[CreatureEntry] = &[
    creature("Wolf Pack", "wolf", 1, 4, (1, 4)),
    creature("Wild Horses", "warhorse", 1, 3, (1, 4)),
    creature("Bandits", "bandit", 1, 3, (1, 4)),
    creature("Giant Eagle", "giant-eagle", 2, 2, (1, 2)),
    creature("Gnolls", "gnoll", 2, 2, (1, 4)),
    creature("Centaur Scout", "centaur", 3, 1, (1, 2)),
];

const FOREST_CREATURES: &[CreatureEntry] = &[
    creature("Wolf Pack", "wolf", 1, 4, (1, 4)),
    creature("Giant Spider", "giant-spider", 2, 3, (1, 2)),
    creature("Goblin Scouts", "goblin", 1, 3, (1, 4)),
    creature("Owlbear", "owlbear", 4, 1, (1, 1)),
    creature("Dryad", "dryad", 2, 2, (1, 1)),
    creature("Dire Wolf", "dire-wolf", 3, 2, (1, 2)),
];

const HILLS_CREATURES: &[CreatureEntry] = &[
    creature("Giant Goat", "giant-goat", 1, 3, (1, 4)),
    creature("Orc Raiders", "orc", 2, 3, (1, 4)),
    creature("Hippogriff", "hippogriff", 3, 2, (1, 2)),
    creature("Ogre", "ogre", 4, 1, (1, 1)),
    creature("Hobgoblins", "hobgoblin", 2, 2, (1, 4)),
];

const MOUNTAIN_CREATURES: &[CreatureEntry] = &[
    creature("Mountain Lion", "mountain-lion", 2, 3, (1, 2)),
    creature("Harpy", "harpy", 2, 3, (1, 4)),
    creature("Stone Giant", "stone-giant", 5, 1, (1, 1)),
    creature("Wyvern", "wyvern", 4, 1, (1, 1)),
];

const WATER_CREATURES: &[CreatureEntry] = &[
    creature("Giant Crab", "giant-crab", 1, 3, (1, 4)),
    creature("Merfolk", "merfolk", 1, 3, (1, 4)),
    creature("Sea Hag", "sea-hag", 3, 2, (1, 1)),
    creature("Sahuagin", "sahuagin", 2, 2, (1, 4)),
];

const SWAMP_CREATURES: &[CreatureEntry] = &[
    creature("Giant Frog", "giant-frog", 1, 4, (1, 4)),
    creature("Lizardfolk", "lizardfolk", 1, 3, (1, 4)),
    creature("Giant Crocodile", "giant-crocodile", 4, 2, (1, 1)),
    creature("Will-o'-Wisp", "will-o-wisp", 3, 2, (1, 2)),
    creature("Shambling Mound", "shambling-mound", 5, 1, (1, 1)),
];

const PLAINS_IMPRESSIONS: &[&str] = &[
    "Rolling grasslands stretch to the horizon, dotted with wildflowers.",
    "A weathered stone marker stands where two game trails cross.",
    "Tall grass ripples like waves in the steady wind.",
    "A lone oak provides the only shade for miles.",
];

const FOREST_IMPRESSIONS: &[&str] = &[
    "Dense canopy blocks most sunlight, leaving the forest floor in shadow.",
    "Moss-covered stones suggest ruins long consumed by the wood.",
    "Mushroom rings dot the forest floor near rotting stumps.",
    "A hollow tree bears old claw marks around its entrance.",
];

const HILLS_IMPRESSIONS: &[&str] = &[
    "Rocky outcrops jut from the grassy slopes like broken teeth.",
    "Stone ruins crown a distant hilltop.",
    "A cave mouth gapes dark in the hillside.",
    "Sheep trails crisscross the heather-covered slopes.",
];

const MOUNTAIN_IMPRESSIONS: &[&str] = &[
    "Jagged peaks pierce the clouds, their summits perpetually snow-capped.",
    "A treacherous path clings to the cliff face above a deadly drop.",
    "The wind howls through a narrow pass between towering peaks.",
    "Patches of snow persist in shadowed crevices year-round.",
];

const WATER_IMPRESSIONS: &[&str] = &[
    "Gentle waves lap against a rocky shoreline.",
    "Seabirds cry overhead, circling for fish.",
    "The water stretches to the horizon, deep blue and endless.",
    "A half-sunken wreck is visible in the shallows.",
];

const SWAMP_IMPRESSIONS: &[&str] = &[
    "Murky water pools between twisted, moss-draped trees.",
    "Thick fog clings to the waterlogged ground.",
    "Dead trees stand like pale sentinels in the muck.",
    "Something large slipped beneath the water as you approached.",
];

impl DataSource for BuiltinData {
    fn terrain_creatures(&self, terrain: Terrain) -> &[CreatureEntry] {
        match terrain {
            Terrain::Plains => PLAINS_CREATURES,
            Terrain::Forest => FOREST_CREATURES,
            Terrain::Hills => HILLS_CREATURES,
            Terrain::Mountains => MOUNTAIN_CREATURES,
            Terrain::Water => WATER_CREATURES,
            Terrain::Swamp => SWAMP_CREATURES,
        }
    }

    fn theme_creatures(&self, theme: DungeonTheme) -> &[&'static str] {
        match theme {
            DungeonTheme::Tomb => &["Skeleton", "Zombie", "Ghoul", "Mummy", "Wight"],
            DungeonTheme::Cave => &["Giant Bat", "Cave Bear", "Troglodyte", "Grick", "Ochre Jelly"],
            DungeonTheme::Temple => &["Cultist", "Cult Fanatic", "Gargoyle", "Shadow"],
            DungeonTheme::Mine => &["Kobold", "Duergar", "Rust Monster", "Earth Elemental"],
            DungeonTheme::Fortress => &["Hobgoblin", "Orc", "Bugbear", "Animated Armor"],
            DungeonTheme::Sewer => &["Giant Rat", "Wererat", "Otyugh", "Gray Ooze"],
            DungeonTheme::Crypt => &["Skeleton", "Specter", "Ghost", "Wight"],
            DungeonTheme::Lair => &["Owlbear", "Manticore", "Ettin", "Young Dragon"],
            DungeonTheme::Shrine => &["Guardian Statue", "Acolyte", "Couatl"],
            DungeonTheme::BanditHideout => &["Bandit", "Bandit Captain", "Thug", "Scout"],
            DungeonTheme::CultistLair => &["Cultist", "Cult Fanatic", "Imp", "Quasit"],
            DungeonTheme::WitchHut => &["Green Hag", "Twig Blight", "Raven Swarm", "Scarecrow"],
            DungeonTheme::SeaCave => &["Sahuagin", "Giant Crab", "Merrow", "Drowned Dead"],
            DungeonTheme::BeastDen => &["Dire Wolf", "Giant Boar", "Brown Bear", "Worg"],
            DungeonTheme::FloatingKeep => &["Air Elemental", "Helmed Horror", "Flying Sword", "Stirge"],
        }
    }

    fn terrain_impressions(&self, terrain: Terrain) -> &[&'static str] {
        match terrain {
            Terrain::Plains => PLAINS_IMPRESSIONS,
            Terrain::Forest => FOREST_IMPRESSIONS,
            Terrain::Hills => HILLS_IMPRESSIONS,
            Terrain::Mountains => MOUNTAIN_IMPRESSIONS,
            Terrain::Water => WATER_IMPRESSIONS,
            Terrain::Swamp => SWAMP_IMPRESSIONS,
        }
    }
}
