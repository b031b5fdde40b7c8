//! Раскладка комнат и проходов на сетке
//!
//! Вход ставится у края сетки, остальные комнаты «прирастают» к уже
//! размещённым: якорь выбирается с весом `1 / (1 + связей)`, новая комната
//! ставится с зазором и боковым сдвигом в одну из четырёх сторон.

use super::content::random_hazard;
use super::grid::OccupancyGrid;
use super::{
    ConnectionType, DungeonSize, DungeonTheme, GridPoint, GridRect, Passage, Room, RoomGeometry,
    RoomSize, RoomType,
};
use crate::error::{GenError, Result};
use crate::random::SeededRandom;
use tracing::debug;

/// Подряд идущих неудач, после которых комнаты уменьшаются на ступень
const SHRINK_AFTER_FAILURES: usize = 8;
/// Бюджет попыток на одну комнату
const ATTEMPTS_PER_ROOM: usize = 40;
/// Петли соединяют только комнаты не дальше этого расстояния (в клетках)
const LOOP_RANGE: i32 = 24;

const ROOM_TYPE_WEIGHTS: [(RoomType, u32); 7] = [
    (RoomType::Corridor, 2),
    (RoomType::Chamber, 4),
    (RoomType::Lair, 1),
    (RoomType::TrapRoom, 1),
    (RoomType::Treasury, 1),
    (RoomType::Shrine, 1),
    (RoomType::Prison, 1),
];

const ROOM_SIZE_WEIGHTS: [(RoomSize, u32); 5] = [
    (RoomSize::Cramped, 2),
    (RoomSize::Small, 3),
    (RoomSize::Medium, 2),
    (RoomSize::Large, 1),
    (RoomSize::Vast, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    North,
    South,
    East,
    West,
}

const DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

/// Результат раскладки: комнаты без содержимого и проходы
#[derive(Debug, Clone)]
pub struct Layout {
    pub rooms: Vec<Room>,
    pub passages: Vec<Passage>,
    pub grid: OccupancyGrid,
}

/// Раскладывает комнаты подземелья
///
/// Число комнат — `between(min, max)` класса размера. Если за бюджет попыток
/// не удалось поставить хотя бы `min` комнат, возвращает `GenerationExhausted`.
pub fn build_layout(
    rng: &mut SeededRandom,
    theme: DungeonTheme,
    size: DungeonSize,
    grid_width: i32,
    grid_height: i32,
) -> Result<Layout> {
    let (min_rooms, max_rooms) = size.room_range();
    let target = rng.between(min_rooms as i32, max_rooms as i32) as usize;
    let budget = target * ATTEMPTS_PER_ROOM;

    let mut grid = OccupancyGrid::new(grid_width, grid_height);
    let mut rooms: Vec<Room> = Vec::with_capacity(target);
    let mut passages: Vec<Passage> = Vec::new();
    let mut links: Vec<u32> = Vec::with_capacity(target);

    let entrance_size = *rng.pick(&[RoomSize::Small, RoomSize::Medium])?;
    let Some(entrance) = place_entrance(rng, &mut grid, entrance_size)? else {
        return Err(GenError::GenerationExhausted {
            placed: 0,
            required: min_rooms,
            attempts: 1,
        });
    };
    rooms.push(entrance);
    links.push(0);

    let mut attempts = 0;
    let mut failures = 0;
    let mut shrink = 0;
    while rooms.len() < target && attempts < budget {
        attempts += 1;

        let weights: Vec<(usize, f64)> = links
            .iter()
            .enumerate()
            .map(|(i, &n)| (i, 1.0 / (1.0 + f64::from(n))))
            .collect();
        let anchor = *rng.pick_weighted(&weights)?;

        let room_type = *rng.pick_weighted(&ROOM_TYPE_WEIGHTS)?;
        let mut room_size = *rng.pick_weighted(&ROOM_SIZE_WEIGHTS)?;
        for _ in 0..shrink {
            room_size = room_size.smaller();
        }
        let (w, h) = room_dimensions(rng, room_size);

        let mut directions = DIRECTIONS;
        rng.shuffle(&mut directions);
        let anchor_bounds = rooms[anchor].bounds;
        let placed = directions.iter().find_map(|&dir| {
            let rect = adjacent_rect(rng, &anchor_bounds, w, h, dir);
            grid.is_clear(&rect).then_some(rect)
        });

        let Some(bounds) = placed else {
            failures += 1;
            if failures >= SHRINK_AFTER_FAILURES {
                shrink = (shrink + 1).min(4);
                failures = 0;
            }
            continue;
        };
        failures = 0;

        grid.mark_room(&bounds);
        let room = make_room(rng, bounds, room_type, room_size)?;
        let passage = connect(rng, theme, &rooms[anchor], &room)?;
        grid.mark_path(&passage.waypoints);
        passages.push(passage);
        rooms.push(room);
        links[anchor] += 1;
        links.push(1);
    }

    if rooms.len() < min_rooms {
        return Err(GenError::GenerationExhausted {
            placed: rooms.len(),
            required: min_rooms,
            attempts,
        });
    }

    add_loops(rng, theme, &mut grid, &rooms, &mut passages)?;

    debug!(
        rooms = rooms.len(),
        passages = passages.len(),
        attempts,
        "раскладка подземелья готова"
    );
    Ok(Layout {
        rooms,
        passages,
        grid,
    })
}

fn room_dimensions(rng: &mut SeededRandom, size: RoomSize) -> (i32, i32) {
    let (lo, hi) = size.dims();
    (rng.between(lo, hi), rng.between(lo, hi))
}

/// Вход — у одного из краёв сетки, по центру стороны
fn place_entrance(
    rng: &mut SeededRandom,
    grid: &mut OccupancyGrid,
    size: RoomSize,
) -> Result<Option<Room>> {
    let mut size = size;
    loop {
        let (w, h) = room_dimensions(rng, size);
        let mut edges = [
            (grid.width / 2 - w / 2, 1),
            (grid.width / 2 - w / 2, grid.height - h - 1),
            (1, grid.height / 2 - h / 2),
            (grid.width - w - 1, grid.height / 2 - h / 2),
        ];
        rng.shuffle(&mut edges);

        if let Some(bounds) = edges
            .iter()
            .map(|&(x, y)| GridRect::new(x.max(1), y.max(1), w, h))
            .find(|rect| grid.is_clear(rect))
        {
            grid.mark_room(&bounds);
            return make_room(rng, bounds, RoomType::Entrance, size).map(Some);
        }
        if size == RoomSize::Cramped {
            return Ok(None);
        }
        size = size.smaller();
    }
}

fn adjacent_rect(
    rng: &mut SeededRandom,
    anchor: &GridRect,
    w: i32,
    h: i32,
    dir: Direction,
) -> GridRect {
    let gap = rng.between(2, 4);
    let offset = rng.between(-2, 2);
    let (x, y) = match dir {
        Direction::North => (anchor.x + (anchor.width - w) / 2 + offset, anchor.y - gap - h),
        Direction::South => (
            anchor.x + (anchor.width - w) / 2 + offset,
            anchor.y + anchor.height + gap,
        ),
        Direction::East => (
            anchor.x + anchor.width + gap,
            anchor.y + (anchor.height - h) / 2 + offset,
        ),
        Direction::West => (anchor.x - gap - w, anchor.y + (anchor.height - h) / 2 + offset),
    };
    GridRect::new(x, y, w, h)
}

pub(crate) fn make_room(
    rng: &mut SeededRandom,
    bounds: GridRect,
    room_type: RoomType,
    size: RoomSize,
) -> Result<Room> {
    let geometry = bounds.geometry();
    // Форма решает за обычные комнаты: длинная узкая — коридор
    let room_type = match (room_type, geometry) {
        (t, _) if t.is_special() => t,
        (_, RoomGeometry::Corridor) => RoomType::Corridor,
        (RoomType::Corridor, _) => RoomType::Chamber,
        (t, _) => t,
    };
    Ok(Room {
        id: rng.id("room"),
        name: (*rng.pick(room_type.names())?).to_string(),
        room_type,
        size,
        geometry,
        depth: 0,
        bounds,
        encounters: Vec::new(),
        treasure: Vec::new(),
        hazards: Vec::new(),
        explored: false,
        dead_end: false,
    })
}

/// Точка выхода: середина стены, обращённой к цели, на клетку снаружи комнаты
#[must_use]
pub fn connection_point(room: &GridRect, target: &GridRect) -> GridPoint {
    let (cx, cy) = room.center2();
    let (tx, ty) = target.center2();
    let (dx, dy) = (tx - cx, ty - cy);
    if dx.abs() > dy.abs() {
        let y = room.y + room.height / 2;
        if dx > 0 {
            GridPoint::new(room.x + room.width, y)
        } else {
            GridPoint::new(room.x - 1, y)
        }
    } else {
        let x = room.x + room.width / 2;
        if dy > 0 {
            GridPoint::new(x, room.y + room.height)
        } else {
            GridPoint::new(x, room.y - 1)
        }
    }
}

/// Осевая ломаная с не более чем одним изгибом
#[must_use]
pub fn route(from: &GridRect, to: &GridRect) -> Vec<GridPoint> {
    let a = connection_point(from, to);
    let b = connection_point(to, from);
    if a.x == b.x || a.y == b.y {
        return vec![a, b];
    }
    // Выход через боковую стену — сначала по горизонтали
    let horizontal_exit = a.x < from.x || a.x >= from.x + from.width;
    let bend = if horizontal_exit {
        GridPoint::new(b.x, a.y)
    } else {
        GridPoint::new(a.x, b.y)
    };
    vec![a, bend, b]
}

fn connection_weights(theme: DungeonTheme) -> [(ConnectionType, u32); 3] {
    match theme {
        DungeonTheme::Cave | DungeonTheme::Lair | DungeonTheme::BeastDen | DungeonTheme::SeaCave => [
            (ConnectionType::Open, 7),
            (ConnectionType::Door, 1),
            (ConnectionType::Secret, 2),
        ],
        DungeonTheme::BanditHideout | DungeonTheme::WitchHut | DungeonTheme::CultistLair => [
            (ConnectionType::Open, 4),
            (ConnectionType::Door, 5),
            (ConnectionType::Secret, 1),
        ],
        _ => [
            (ConnectionType::Open, 3),
            (ConnectionType::Door, 6),
            (ConnectionType::Secret, 1),
        ],
    }
}

/// Создаёт проход между двумя комнатами
///
/// Проходы в сокровищницу и тюрьму чаще заперты и с ловушкой.
pub(crate) fn connect(
    rng: &mut SeededRandom,
    theme: DungeonTheme,
    from: &Room,
    to: &Room,
) -> Result<Passage> {
    let connection = *rng.pick_weighted(&connection_weights(theme))?;
    let guarded = matches!(to.room_type, RoomType::Treasury | RoomType::Prison);
    let (lock_chance, trap_chance) = if guarded { (0.5, 0.35) } else { (0.15, 0.1) };

    let locked = connection != ConnectionType::Open && rng.chance(lock_chance);
    let trap = if rng.chance(trap_chance) {
        Some(random_hazard(rng)?)
    } else {
        None
    };

    Ok(Passage {
        id: rng.id("passage"),
        from_room_id: from.id.clone(),
        to_room_id: to.id.clone(),
        waypoints: route(&from.bounds, &to.bounds),
        connection,
        locked,
        hidden: connection == ConnectionType::Secret,
        key_id: None,
        trap,
    })
}

fn manhattan(a: &GridRect, b: &GridRect) -> i32 {
    let (ax, ay) = a.center2();
    let (bx, by) = b.center2();
    ((ax - bx).abs() + (ay - by).abs()) / 2
}

/// Петли: около 30% от числа комнат, только между близкими комнатами
fn add_loops(
    rng: &mut SeededRandom,
    theme: DungeonTheme,
    grid: &mut OccupancyGrid,
    rooms: &[Room],
    passages: &mut Vec<Passage>,
) -> Result<()> {
    let linked = |passages: &[Passage], a: &str, b: &str| {
        passages.iter().any(|p| {
            (p.from_room_id == a && p.to_room_id == b) || (p.from_room_id == b && p.to_room_id == a)
        })
    };

    let loops = rooms.len() * 3 / 10;
    for _ in 0..loops {
        let a = rng.between(0, rooms.len() as i32 - 1) as usize;
        let nearest = (0..rooms.len())
            .filter(|&b| b != a && !linked(passages, &rooms[a].id, &rooms[b].id))
            .map(|b| (manhattan(&rooms[a].bounds, &rooms[b].bounds), b))
            .min();
        let Some((distance, b)) = nearest else {
            continue;
        };
        if distance > LOOP_RANGE {
            continue;
        }
        let passage = connect(rng, theme, &rooms[a], &rooms[b])?;
        grid.mark_path(&passage.waypoints);
        passages.push(passage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_is_axis_aligned_with_at_most_one_bend() {
        let a = GridRect::new(2, 2, 4, 4);
        let b = GridRect::new(10, 9, 3, 3);
        let points = route(&a, &b);
        assert!(points.len() <= 3);
        for pair in points.windows(2) {
            assert!(pair[0].x == pair[1].x || pair[0].y == pair[1].y);
        }
        assert!(a.touches(points[0]));
        assert!(b.touches(points[points.len() - 1]));
    }

    #[test]
    fn connection_point_faces_target() {
        let room = GridRect::new(5, 5, 4, 4);
        let east = GridRect::new(15, 5, 3, 3);
        let north = GridRect::new(5, 0, 3, 2);
        assert_eq!(connection_point(&room, &east), GridPoint::new(9, 7));
        assert_eq!(connection_point(&room, &north), GridPoint::new(7, 4));
    }

    #[test]
    fn layout_respects_room_range_and_margin() {
        let mut rng = SeededRandom::new("layout-test");
        let layout =
            build_layout(&mut rng, DungeonTheme::Tomb, DungeonSize::Small, 60, 60).unwrap();
        let (min, max) = DungeonSize::Small.room_range();
        assert!((min..=max).contains(&layout.rooms.len()));
        assert_eq!(layout.rooms[0].room_type, RoomType::Entrance);
        for (i, a) in layout.rooms.iter().enumerate() {
            for b in &layout.rooms[i + 1..] {
                let margin = a.bounds.inflate(1);
                let overlap = margin.x < b.bounds.x + b.bounds.width
                    && b.bounds.x < margin.x + margin.width
                    && margin.y < b.bounds.y + b.bounds.height
                    && b.bounds.y < margin.y + margin.height;
                assert!(!overlap, "{} overlaps {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn tiny_grid_exhausts() {
        let mut rng = SeededRandom::new("tiny");
        let err = build_layout(&mut rng, DungeonTheme::Cave, DungeonSize::Large, 8, 8).unwrap_err();
        assert!(matches!(err, GenError::GenerationExhausted { .. }));
    }
}
