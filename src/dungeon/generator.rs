use super::connectivity::{assign_depths, ensure_connected, farthest_room, mark_dead_ends};
use super::content::populate_room;
use super::keys::place_keys;
use super::layout::{Layout, build_layout};
use super::{DungeonSize, DungeonTheme, RoomType, SpatialDungeon};
use crate::data::DataSource;
use crate::error::{GenError, Result};
use crate::hex::{Hex, Terrain};
use crate::random::{SeededRandom, derive_seed};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

const ADJECTIVES: &[&str] = &[
    "Forsaken", "Sunken", "Ruined", "Shadowed", "Haunted", "Lost", "Ancient", "Cursed", "Hidden",
    "Forgotten", "Blighted", "Twisted",
];

/// Параметры генерации подземелья
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonParams {
    pub theme: DungeonTheme,
    pub size: DungeonSize,
    /// Ширина и высота сетки; по умолчанию квадрат из класса размера
    #[serde(default)]
    pub grid: Option<(i32, i32)>,
}

impl DungeonParams {
    #[must_use]
    pub fn new(theme: DungeonTheme, size: DungeonSize) -> Self {
        Self {
            theme,
            size,
            grid: None,
        }
    }

    #[must_use]
    pub fn with_grid(mut self, width: i32, height: i32) -> Self {
        self.grid = Some((width, height));
        self
    }
}

/// Генерирует подземелье на гексе `hex`
///
/// Один и тот же сид и параметры дают идентичный результат: те же id комнат,
/// границы и точки проходов.
///
/// # Ошибки
/// - `InvalidPlacement`, если тема недопустима на местности гекса
/// - `GenerationExhausted`, если сетка не вмещает минимум комнат
pub fn generate_dungeon(
    seed: &str,
    params: &DungeonParams,
    hex: &Hex,
    data: &dyn DataSource,
) -> Result<SpatialDungeon> {
    let DungeonParams { theme, size, grid } = *params;
    if !theme.allowed_on(hex.terrain) {
        return Err(GenError::invalid_placement(format!(
            "{theme} dungeon cannot be placed on {:?} at {}",
            hex.terrain, hex.coord
        )));
    }
    let (grid_width, grid_height) = grid.unwrap_or((size.grid_size(), size.grid_size()));

    let mut rng = SeededRandom::new(derive_seed(seed, "dungeon", "layout"));
    let Layout {
        mut rooms,
        mut passages,
        ..
    } = build_layout(&mut rng, theme, size, grid_width, grid_height)?;

    ensure_connected(&mut rng, theme, &rooms, &mut passages)?;
    assign_depths(&mut rooms, &passages);

    let exit_room_id = match farthest_room(&rooms) {
        Some(i) if size.has_exit() => {
            let room = &mut rooms[i];
            room.room_type = RoomType::Exit;
            room.name = (*rng.pick(RoomType::Exit.names())?).to_string();
            Some(room.id.clone())
        }
        _ => None,
    };
    mark_dead_ends(&mut rooms, &passages);
    let keys = place_keys(seed, theme, &rooms, &mut passages)?;

    for room in &mut rooms {
        populate_room(seed, room, theme, hex.terrain, data)?;
    }

    let mut naming = SeededRandom::new(derive_seed(seed, "dungeon", "name"));
    let name = format!(
        "The {} {}",
        naming.pick(ADJECTIVES)?,
        naming.pick(theme.nouns())?
    );
    let description = format!(
        "Locals speak of {} here. {} rooms lie beneath.",
        naming.pick(theme.hints())?,
        rooms.len()
    );
    let id = naming.id("dungeon");
    let entrance_room_id = rooms[0].id.clone();

    debug!(%id, %name, rooms = rooms.len(), "подземелье сгенерировано");
    Ok(SpatialDungeon {
        id,
        name,
        description,
        hex_coord: hex.coord,
        faction_id: None,
        tags: vec![theme.slug().to_string()],
        theme,
        size,
        grid_width,
        grid_height,
        rooms,
        passages,
        keys,
        entrance_room_id,
        exit_room_id,
    })
}

/// Выбирает гекс и параметры будущего подземелья
///
/// Предпочитаются холмы и лес (для водных тем — вода), иначе любой допустимый
/// свободный гекс. Без явной темы на воде выбирается морская пещера.
pub fn pick_dungeon_site<'a>(
    seed: &str,
    hexes: impl IntoIterator<Item = &'a Hex>,
    theme: Option<DungeonTheme>,
    size: Option<DungeonSize>,
) -> Result<Option<(&'a Hex, DungeonParams)>> {
    let mut rng = SeededRandom::new(derive_seed(seed, "dungeon", "placement"));

    let candidates: Vec<&Hex> = hexes
        .into_iter()
        .filter(|h| h.location_id.is_none())
        .filter(|h| match theme {
            Some(t) => t.allowed_on(h.terrain),
            None => !h.terrain.is_water(),
        })
        .collect();
    let preferred: Vec<&Hex> = candidates
        .iter()
        .copied()
        .filter(|h| match theme {
            Some(t) if t.is_aquatic() => h.terrain == Terrain::Water,
            _ => matches!(h.terrain, Terrain::Hills | Terrain::Forest),
        })
        .collect();

    let pool = if preferred.is_empty() {
        &candidates
    } else {
        &preferred
    };
    let Ok(&hex) = rng.pick(pool) else {
        return Ok(None);
    };

    let theme = match theme {
        Some(t) => t,
        None if hex.terrain.is_water() => DungeonTheme::SeaCave,
        None => *rng.pick_weighted(&DungeonTheme::LAND_WEIGHTS)?,
    };
    let size = match size {
        Some(s) => s,
        None => *rng.pick_weighted(&DungeonSize::WEIGHTS)?,
    };
    Ok(Some((hex, DungeonParams::new(theme, size))))
}

/// Выбирает свободный гекс и генерирует на нём подземелье
///
/// Возвращает `None`, если подходящих свободных гексов нет.
pub fn place_dungeon(
    seed: &str,
    hexes: &Table<Hex>,
    theme: Option<DungeonTheme>,
    size: Option<DungeonSize>,
    data: &dyn DataSource,
) -> Result<Option<SpatialDungeon>> {
    match pick_dungeon_site(seed, hexes, theme, size)? {
        Some((hex, params)) => generate_dungeon(seed, &params, hex, data).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BuiltinData;
    use crate::dungeon::connectivity::{passage_graph, reachable};
    use crate::dungeon::keys::fully_unlockable;
    use crate::hex::HexCoord;

    fn hills() -> Hex {
        Hex::new(HexCoord::new(0, 0), Terrain::Hills)
    }

    #[test]
    fn same_seed_same_dungeon() {
        let params = DungeonParams::new(DungeonTheme::Cave, DungeonSize::Medium);
        let a = generate_dungeon("abc", &params, &hills(), &BuiltinData).unwrap();
        let b = generate_dungeon("abc", &params, &hills(), &BuiltinData).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn entrance_is_unique_and_first() {
        let params = DungeonParams::new(DungeonTheme::Tomb, DungeonSize::Small);
        let d = generate_dungeon("entrance", &params, &hills(), &BuiltinData).unwrap();
        let entrances: Vec<_> = d
            .rooms
            .iter()
            .filter(|r| r.room_type == RoomType::Entrance)
            .collect();
        assert_eq!(entrances.len(), 1);
        assert_eq!(entrances[0].id, d.entrance_room_id);
        assert_eq!(entrances[0].depth, 0);
        assert!(d.exit_room_id.is_none());
    }

    #[test]
    fn large_dungeon_exit_is_deepest_room() {
        let params = DungeonParams::new(DungeonTheme::Fortress, DungeonSize::Large);
        let d = generate_dungeon("exit", &params, &hills(), &BuiltinData).unwrap();
        let exit_id = d.exit_room_id.clone().unwrap();
        let exit = d.room(&exit_id).unwrap();
        assert_eq!(exit.room_type, RoomType::Exit);
        let max_depth = d.rooms.iter().map(|r| r.depth).max().unwrap();
        assert_eq!(exit.depth, max_depth);
        assert_eq!(
            d.rooms.iter().filter(|r| r.room_type == RoomType::Exit).count(),
            1
        );
    }

    #[test]
    fn locked_passages_have_reachable_keys() {
        let mut locks = 0;
        for i in 0..30 {
            let params = DungeonParams::new(DungeonTheme::Fortress, DungeonSize::Medium);
            let d = generate_dungeon(&format!("keys-{i}"), &params, &hills(), &BuiltinData).unwrap();
            for p in &d.passages {
                assert_eq!(p.locked, p.key_id.is_some(), "passage {}", p.id);
                if let Some(key_id) = &p.key_id {
                    let key = d.key(key_id).unwrap();
                    assert_eq!(key.passage_id, p.id);
                    assert!(d.room(&key.room_id).is_some());
                    locks += 1;
                }
            }
            assert!(fully_unlockable(&d.rooms, &d.passages, &d.keys));
        }
        assert!(locks > 0);
    }

    #[test]
    fn water_rejects_land_themes() {
        let water = Hex::new(HexCoord::new(1, 1), Terrain::Water);
        let params = DungeonParams::new(DungeonTheme::Tomb, DungeonSize::Lair);
        let err = generate_dungeon("wet", &params, &water, &BuiltinData).unwrap_err();
        assert!(matches!(err, GenError::InvalidPlacement(_)));

        let sea = DungeonParams::new(DungeonTheme::SeaCave, DungeonSize::Lair);
        assert!(generate_dungeon("wet", &sea, &water, &BuiltinData).is_ok());
    }

    #[test]
    fn every_room_reachable_from_entrance() {
        for seed in ["a", "b", "c", "d", "e"] {
            let params = DungeonParams::new(DungeonTheme::Mine, DungeonSize::Medium);
            let d = generate_dungeon(seed, &params, &hills(), &BuiltinData).unwrap();
            let seen = reachable(&passage_graph(&d.rooms, &d.passages), 0);
            assert!(seen.iter().all(|&s| s), "seed {seed}");
        }
    }

    #[test]
    fn placement_skips_occupied_and_water() {
        let mut hexes = Table::new();
        let mut taken = Hex::new(HexCoord::new(0, 0), Terrain::Hills);
        taken.location_id = Some("loc".into());
        hexes.insert(taken);
        hexes.insert(Hex::new(HexCoord::new(1, 0), Terrain::Water));
        hexes.insert(Hex::new(HexCoord::new(0, 1), Terrain::Plains));

        let d = place_dungeon("place", &hexes, None, Some(DungeonSize::Lair), &BuiltinData)
            .unwrap()
            .unwrap();
        assert_eq!(d.hex_coord, HexCoord::new(0, 1));

        hexes.remove(&HexCoord::new(0, 1));
        let none = place_dungeon("place", &hexes, None, None, &BuiltinData).unwrap();
        assert!(none.is_none());
    }
}
