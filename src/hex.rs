//! Гексы в осевых координатах и типы местности

use crate::table::Keyed;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Осевая координата гекса (q, r). Уникальный ключ клетки карты.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// Шесть направлений осевой сетки
const AXIAL_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl HexCoord {
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Третья кубическая координата
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    #[must_use]
    pub fn distance(self, other: HexCoord) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        dq.max(dr).max(ds)
    }

    pub fn neighbors(self) -> impl Iterator<Item = HexCoord> {
        AXIAL_DIRECTIONS
            .iter()
            .map(move |&(dq, dr)| HexCoord::new(self.q + dq, self.r + dr))
    }

    /// Все координаты шестиугольной карты радиуса `radius` вокруг начала
    pub fn spiral(radius: i32) -> impl Iterator<Item = HexCoord> {
        (-radius..=radius).flat_map(move |q| {
            let r_min = (-radius).max(-q - radius);
            let r_max = radius.min(-q + radius);
            (r_min..=r_max).map(move |r| HexCoord::new(q, r))
        })
    }
}

/// Разбор `q,r`
impl FromStr for HexCoord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| format!("expected q,r: {s}"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<i32>()
                .map_err(|e| format!("bad coordinate {v:?}: {e}"))
        };
        Ok(HexCoord::new(parse(q)?, parse(r)?))
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Plains,
    Forest,
    Hills,
    Mountains,
    Water,
    Swamp,
}

impl Terrain {
    pub const ALL: [Terrain; 6] = [
        Terrain::Plains,
        Terrain::Forest,
        Terrain::Hills,
        Terrain::Mountains,
        Terrain::Water,
        Terrain::Swamp,
    ];

    #[must_use]
    pub fn is_water(self) -> bool {
        matches!(self, Terrain::Water)
    }

    /// Местность, пригодная для поселения
    #[must_use]
    pub fn is_settleable(self) -> bool {
        !matches!(self, Terrain::Water | Terrain::Mountains)
    }

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Terrain::Plains => "plains",
            Terrain::Forest => "forest",
            Terrain::Hills => "hills",
            Terrain::Mountains => "mountains",
            Terrain::Water => "water",
            Terrain::Swamp => "swamp",
        }
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Terrain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| format!("unknown terrain: {s}"))
    }
}

/// Клетка карты мира
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hex {
    pub coord: HexCoord,
    pub terrain: Terrain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// Впечатление от местности (из таблиц данных)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Hex {
    #[must_use]
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            location_id: None,
            description: None,
        }
    }
}

impl Keyed for Hex {
    type Key = HexCoord;

    fn key(&self) -> HexCoord {
        self.coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, -1);
        assert_eq!(a.distance(b), 2);
        assert_eq!(b.distance(a), 2);
        assert_eq!(a.distance(a), 0);
    }

    #[test]
    fn neighbors_are_at_distance_one() {
        let c = HexCoord::new(3, -2);
        assert_eq!(c.neighbors().count(), 6);
        assert!(c.neighbors().all(|n| n.distance(c) == 1));
    }

    #[test]
    fn spiral_has_hexagonal_count() {
        // 3r(r+1) + 1
        assert_eq!(HexCoord::spiral(0).count(), 1);
        assert_eq!(HexCoord::spiral(2).count(), 19);
        assert!(HexCoord::spiral(3).all(|c| c.distance(HexCoord::new(0, 0)) <= 3));
    }

    #[test]
    fn coord_parses_from_display() {
        let c = HexCoord::new(-3, 7);
        assert_eq!(c.to_string().parse::<HexCoord>().unwrap(), c);
        assert!("3".parse::<HexCoord>().is_err());
        assert_eq!("swamp".parse::<Terrain>().unwrap(), Terrain::Swamp);
    }
}
