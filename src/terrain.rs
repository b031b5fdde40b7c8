//! Генерация местности гексовой карты из полей шума
//!
//! Высота и влажность — два независимых поля `FastNoiseLite` (`OpenSimplex2` + `FBm`),
//! сиды которых выводятся из строкового сида мира. Тип местности определяется
//! порогами из [`TerrainSettings`].

use crate::config::TerrainSettings;
use crate::data::DataSource;
use crate::hex::{Hex, HexCoord, Terrain};
use crate::random::{SeededRandom, derive_seed, hash_seed};
use crate::table::Table;
use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

/// Поле шума со значениями в [0, 1]
struct NoiseField {
    noise: FastNoiseLite,
}

impl NoiseField {
    fn new(seed: &str, frequency: f32, octaves: i32) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(hash_seed(seed) as i32));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(octaves));
        noise.set_frequency(Some(frequency));
        Self { noise }
    }

    fn sample(&self, coord: HexCoord) -> f32 {
        let (x, y) = hex_to_plane(coord);
        ((self.noise.get_noise_2d(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// Центр гекса на плоскости (pointy-top, размер 1)
fn hex_to_plane(coord: HexCoord) -> (f32, f32) {
    let q = coord.q as f32;
    let r = coord.r as f32;
    (3f32.sqrt() * (q + r / 2.0), 1.5 * r)
}

/// Классифицирует гекс по высоте и влажности
#[must_use]
pub fn classify(elevation: f32, moisture: f32, settings: &TerrainSettings) -> Terrain {
    if elevation < settings.water_level {
        Terrain::Water
    } else if elevation >= settings.mountain_level {
        Terrain::Mountains
    } else if elevation >= settings.hills_level {
        Terrain::Hills
    } else if moisture >= settings.swamp_moisture && elevation < settings.water_level + 0.12 {
        // Влажные низины у воды
        Terrain::Swamp
    } else if moisture >= settings.forest_moisture {
        Terrain::Forest
    } else {
        Terrain::Plains
    }
}

/// Генерирует гексовую карту радиуса `radius`
///
/// Описание каждого гекса выбирается из таблицы впечатлений по производному
/// сиду `seed:hex:q,r`, поэтому не зависит от порядка обхода.
pub fn generate_hexes(
    seed: &str,
    radius: i32,
    settings: &TerrainSettings,
    data: &dyn DataSource,
) -> Table<Hex> {
    let elevation = NoiseField::new(
        &derive_seed(seed, "terrain", "elevation"),
        settings.elevation_frequency,
        4,
    );
    let moisture = NoiseField::new(
        &derive_seed(seed, "terrain", "moisture"),
        settings.moisture_frequency,
        3,
    );

    HexCoord::spiral(radius)
        .map(|coord| {
            let terrain = classify(elevation.sample(coord), moisture.sample(coord), settings);
            let mut hex = Hex::new(coord, terrain);
            hex.description = describe(seed, coord, terrain, data);
            hex
        })
        .collect()
}

/// Впечатление от местности для гекса
#[must_use]
pub fn describe(
    seed: &str,
    coord: HexCoord,
    terrain: Terrain,
    data: &dyn DataSource,
) -> Option<String> {
    let mut rng = SeededRandom::new(derive_seed(seed, "hex", coord));
    rng.pick(data.terrain_impressions(terrain))
        .ok()
        .map(|s| (*s).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BuiltinData;

    #[test]
    fn classification_thresholds() {
        let s = TerrainSettings::default();
        assert_eq!(classify(0.1, 0.5, &s), Terrain::Water);
        assert_eq!(classify(0.9, 0.5, &s), Terrain::Mountains);
        assert_eq!(classify(0.7, 0.1, &s), Terrain::Hills);
        assert_eq!(classify(0.3, 0.9, &s), Terrain::Swamp);
        assert_eq!(classify(0.5, 0.6, &s), Terrain::Forest);
        assert_eq!(classify(0.5, 0.2, &s), Terrain::Plains);
    }

    #[test]
    fn map_is_deterministic() {
        let s = TerrainSettings::default();
        let a = generate_hexes("seed", 4, &s, &BuiltinData);
        let b = generate_hexes("seed", 4, &s, &BuiltinData);
        assert_eq!(a, b);
        assert_eq!(a.len(), 61);
        assert!(a.iter().all(|h| h.description.is_some()));
    }
}
