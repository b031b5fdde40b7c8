use super::{GridPoint, GridRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Room,
    Passage,
}

/// Занятость клеток сетки подземелья
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Cell>,
}

impl OccupancyGrid {
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Cell::Empty; (width * height) as usize],
        }
    }

    /// Состояние клетки; за пределами сетки — `None`
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[(y * self.width + x) as usize])
    }

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.cells[(y * self.width + x) as usize] = cell;
        }
    }

    /// Комната вместе с рамкой в одну клетку помещается в сетку
    #[must_use]
    pub fn fits(&self, rect: &GridRect) -> bool {
        rect.x >= 1
            && rect.y >= 1
            && rect.x + rect.width < self.width
            && rect.y + rect.height < self.height
    }

    /// Можно ли поставить комнату: внутри пусто, в рамке нет других комнат
    #[must_use]
    pub fn is_clear(&self, rect: &GridRect) -> bool {
        if !self.fits(rect) {
            return false;
        }
        let outer = rect.inflate(1);
        for y in outer.y..outer.y + outer.height {
            for x in outer.x..outer.x + outer.width {
                let inside = rect.contains(GridPoint::new(x, y));
                match self.get(x, y) {
                    Some(Cell::Room) => return false,
                    Some(Cell::Passage) if inside => return false,
                    _ => {}
                }
            }
        }
        true
    }

    pub fn mark_room(&mut self, rect: &GridRect) {
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                self.set(x, y, Cell::Room);
            }
        }
    }

    /// Отмечает клетки ломаной как проход (комнаты не перезаписываются)
    ///
    /// Отрезки, не параллельные осям, пропускаются.
    pub fn mark_path(&mut self, waypoints: &[GridPoint]) {
        for pair in waypoints.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from.x != to.x && from.y != to.y {
                continue;
            }
            let dx = (to.x - from.x).signum();
            let dy = (to.y - from.y).signum();
            let (mut x, mut y) = (from.x, from.y);
            loop {
                if self.get(x, y) == Some(Cell::Empty) {
                    self.set(x, y, Cell::Passage);
                }
                if x == to.x && y == to.y {
                    break;
                }
                x += dx;
                y += dy;
            }
        }
    }

    /// ASCII-представление для отладки
    #[must_use]
    pub fn to_ascii(&self) -> String {
        self.cells
            .chunks(self.width as usize)
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Cell::Empty => '.',
                        Cell::Room => '#',
                        Cell::Passage => '+',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_blocks_touching_rooms() {
        let mut grid = OccupancyGrid::new(20, 20);
        let a = GridRect::new(2, 2, 4, 4);
        grid.mark_room(&a);
        // Вплотную: рамка задевает комнату
        assert!(!grid.is_clear(&GridRect::new(6, 2, 3, 3)));
        // Через одну пустую клетку
        assert!(grid.is_clear(&GridRect::new(7, 2, 3, 3)));
    }

    #[test]
    fn rooms_stay_inside_border() {
        let grid = OccupancyGrid::new(10, 10);
        assert!(!grid.is_clear(&GridRect::new(0, 1, 3, 3)));
        assert!(!grid.is_clear(&GridRect::new(7, 1, 3, 3)));
        assert!(grid.is_clear(&GridRect::new(6, 1, 3, 3)));
    }

    #[test]
    fn path_marks_straight_and_bent_segments() {
        let mut grid = OccupancyGrid::new(10, 10);
        grid.mark_path(&[
            GridPoint::new(1, 1),
            GridPoint::new(4, 1),
            GridPoint::new(4, 3),
        ]);
        let ascii = grid.to_ascii();
        assert_eq!(ascii.matches('+').count(), 6);
    }

    #[test]
    fn diagonal_segment_is_skipped() {
        let mut grid = OccupancyGrid::new(10, 10);
        grid.mark_path(&[
            GridPoint::new(1, 1),
            GridPoint::new(5, 4),
            GridPoint::new(5, 6),
        ]);
        assert_eq!(grid.get(1, 1), Some(Cell::Empty));
        assert_eq!(grid.to_ascii().matches('+').count(), 3);
    }
}
